//! Poll consolidation
//!
//! Merges one poll report into the registry. Every field is overwritten, never
//! accumulated, so applying the same report twice has the same effect as
//! applying it once. Terminal jobs are left untouched.

use quarry_core::domain::job::JobState;
use quarry_core::domain::registry::{Applied, Registry};
use quarry_core::dto::query::BatchGetQueryResponse;
use tracing::warn;

/// Counts of what a consolidation did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Consolidation {
    pub updated: usize,
    pub unchanged: usize,
    pub unprocessed: usize,
    pub unknown: usize,
}

/// Applies `report` to `registry`
pub fn consolidate(registry: &mut Registry, report: &BatchGetQueryResponse) -> Consolidation {
    let mut summary = Consolidation::default();

    for execution in &report.query_executions {
        let applied = registry.apply(&execution.query_execution_id, execution.job_state());
        summary.record(applied, &execution.query_execution_id);
    }

    for entry in &report.unprocessed_query_execution_ids {
        warn!(
            "Query service could not process {}: {}",
            entry.query_execution_id,
            entry.message()
        );
        let applied = registry.apply(&entry.query_execution_id, JobState::failed(entry.message()));
        if applied == Applied::Updated {
            summary.unprocessed += 1;
        } else {
            summary.record(applied, &entry.query_execution_id);
        }
    }

    summary
}

impl Consolidation {
    fn record(&mut self, applied: Applied, id: &str) {
        match applied {
            Applied::Updated => self.updated += 1,
            Applied::Unchanged => self.unchanged += 1,
            Applied::Unknown => {
                warn!("Poll report mentions unknown query {}", id);
                self.unknown += 1;
            }
        }
    }
}
