//! Cancellation handler
//!
//! Runs once the shutdown token has fired. Every outstanding job gets a stop
//! request; failures are logged and otherwise ignored. Job statuses are not
//! changed here since no further poll confirms the cancellation.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::SharedRegistry;
use crate::repository::QueryRepository;

/// Outcome of a cancellation sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CancellationSummary {
    pub requested: usize,
    pub failed: usize,
}

/// Best-effort stop of every outstanding job
pub struct CancellationHandler {
    repository: Arc<dyn QueryRepository>,
    semaphore: Arc<Semaphore>,
}

impl CancellationHandler {
    /// Creates a handler allowing at most `max_in_flight` concurrent stop requests
    pub fn new(repository: Arc<dyn QueryRepository>, max_in_flight: usize) -> Self {
        Self {
            repository,
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Sends a stop request for each outstanding job and waits for all of them
    pub async fn cancel_outstanding(&self, registry: &SharedRegistry) -> CancellationSummary {
        let ids = registry.lock().await.outstanding_ids();

        if ids.is_empty() {
            info!("No outstanding jobs to cancel");
            return CancellationSummary::default();
        }

        info!("Cancelling {} outstanding job(s)", ids.len());

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let repository = Arc::clone(&self.repository);
                let semaphore = Arc::clone(&self.semaphore);
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    if let Err(e) = repository.cancel(&id).await {
                        warn!("Failed to cancel {}: {:#}", id, e);
                        return false;
                    }
                    true
                })
            })
            .collect();

        let mut summary = CancellationSummary {
            requested: handles.len(),
            failed: 0,
        };

        for handle in handles {
            match handle.await {
                Ok(true) => {}
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    warn!("Cancellation task panicked: {}", e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Cancellation requested for {} job(s), {} request(s) failed",
            summary.requested, summary.failed
        );

        summary
    }
}
