//! Run session
//!
//! Wires one run together: submit every unit, poll until done or interrupted,
//! cancel outstanding work when interrupted, then persist the results. The
//! session never exits the process; the caller decides on the exit status.

use anyhow::Result;
use quarry_core::domain::job::{Job, QueryUnit};
use quarry_core::domain::registry::{Registry, status_counts};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::repository::QueryRepository;
use crate::scheduler::{self, CancellationHandler, CycleDriver, Poller, RunOutcome, Submitter};
use crate::service::{Finalizer, ProgressRenderer};

/// What a finished run produced
#[derive(Debug)]
pub struct SessionReport {
    pub outcome: RunOutcome,
    pub jobs: Vec<Job>,
}

pub struct Session {
    config: Config,
    repository: Arc<dyn QueryRepository>,
    renderer: Arc<dyn ProgressRenderer>,
}

impl Session {
    pub fn new(
        config: Config,
        repository: Arc<dyn QueryRepository>,
        renderer: Arc<dyn ProgressRenderer>,
    ) -> Self {
        Self {
            config,
            repository,
            renderer,
        }
    }

    /// Runs `units` to completion or until `shutdown` fires
    ///
    /// Only a failed poll call or a failure to write results is an error.
    pub async fn run(
        &self,
        units: Vec<QueryUnit>,
        shutdown: CancellationToken,
    ) -> Result<SessionReport> {
        let submitter = Submitter::new(Arc::clone(&self.repository), self.config.max_in_flight);
        let jobs = submitter.submit_all(units).await;

        let registry = scheduler::shared(Registry::from_jobs(jobs));
        self.renderer.render(registry.lock().await.jobs());

        let driver = CycleDriver::new(
            Poller::new(Arc::clone(&self.repository)),
            Arc::clone(&registry),
            Arc::clone(&self.renderer),
            self.config.poll_interval,
            shutdown,
        );

        let outcome = driver.run().await?;

        if outcome == RunOutcome::Cancelled {
            let handler =
                CancellationHandler::new(Arc::clone(&self.repository), self.config.max_in_flight);
            handler.cancel_outstanding(&registry).await;
        }

        let finalizer = Finalizer::new(self.config.output_path.clone());
        let jobs = finalizer.finalize(&registry).await?;

        for (status, count) in status_counts(&jobs) {
            info!("{} job(s) {}", count, status);
        }

        Ok(SessionReport { outcome, jobs })
    }
}
