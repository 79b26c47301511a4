//! Status polling
//!
//! Collects the identifiers of every outstanding job and asks the query
//! service about all of them in one call.

use anyhow::{Context, Result};
use quarry_core::dto::query::BatchGetQueryResponse;
use std::sync::Arc;
use tracing::debug;

use super::SharedRegistry;
use crate::repository::QueryRepository;

/// What a poll found
#[derive(Debug)]
pub enum PollOutcome {
    /// No job is queued or running; nothing was sent to the service
    Idle,
    /// The service's answer for the outstanding jobs
    Report(BatchGetQueryResponse),
}

/// Polls the query service for outstanding jobs
pub struct Poller {
    repository: Arc<dyn QueryRepository>,
}

impl Poller {
    pub fn new(repository: Arc<dyn QueryRepository>) -> Self {
        Self { repository }
    }

    /// Performs one batched status request
    ///
    /// A failure of the call itself is returned as an error and is not retried.
    pub async fn poll(&self, registry: &SharedRegistry) -> Result<PollOutcome> {
        let ids = registry.lock().await.outstanding_ids();

        if ids.is_empty() {
            debug!("No outstanding jobs");
            return Ok(PollOutcome::Idle);
        }

        debug!("Polling status of {} job(s)", ids.len());

        let response = self
            .repository
            .poll_batch(ids)
            .await
            .context("Poll cycle failed")?;

        Ok(PollOutcome::Report(response))
    }
}
