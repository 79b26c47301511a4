//! Cycle driver
//!
//! Repeats poll cycles until no job is outstanding. The next cycle is only
//! scheduled after the previous one has fully settled, so cycles never
//! overlap. The shutdown token preempts both the wait between cycles and an
//! in-flight cycle.

use anyhow::Result;
use std::sync::Arc;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::consolidator::consolidate;
use super::{PollOutcome, Poller, SharedRegistry};
use crate::service::ProgressRenderer;

/// How a run of the cycle driver ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every job reached a terminal status
    Completed,
    /// The shutdown token fired first
    Cancelled,
}

enum CycleStep {
    Continue,
    Terminal,
}

/// Drives poll cycles over the shared registry
pub struct CycleDriver {
    poller: Poller,
    registry: SharedRegistry,
    renderer: Arc<dyn ProgressRenderer>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl CycleDriver {
    pub fn new(
        poller: Poller,
        registry: SharedRegistry,
        renderer: Arc<dyn ProgressRenderer>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            poller,
            registry,
            renderer,
            interval,
            shutdown,
        }
    }

    /// Runs cycles until every job is terminal or shutdown is requested
    ///
    /// A failed poll call ends the run with that error; the registry is not
    /// touched for the failed cycle.
    pub async fn run(&self) -> Result<RunOutcome> {
        info!("Starting poll cycles (interval: {:?})", self.interval);

        let mut cycle: u64 = 0;
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return Ok(self.preempted(cycle)),
                _ = time::sleep(self.interval) => {}
            }

            cycle += 1;
            debug!("Running poll cycle {}", cycle);

            let step = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return Ok(self.preempted(cycle)),
                step = self.run_cycle() => step?,
            };

            if let CycleStep::Terminal = step {
                info!("All jobs finished after {} poll cycle(s)", cycle);
                return Ok(RunOutcome::Completed);
            }
        }
    }

    fn preempted(&self, cycle: u64) -> RunOutcome {
        info!("Poll cycles stopped by shutdown during cycle {}", cycle);
        RunOutcome::Cancelled
    }

    /// Poll, consolidate, render
    async fn run_cycle(&self) -> Result<CycleStep> {
        let report = match self.poller.poll(&self.registry).await? {
            PollOutcome::Idle => return Ok(CycleStep::Terminal),
            PollOutcome::Report(report) => report,
        };

        let mut registry = self.registry.lock().await;
        let summary = consolidate(&mut registry, &report);
        debug!(
            "Consolidated poll report: {} updated, {} unchanged, {} unprocessed, {} unknown",
            summary.updated, summary.unchanged, summary.unprocessed, summary.unknown
        );
        self.renderer.render(registry.jobs());

        Ok(CycleStep::Continue)
    }
}
