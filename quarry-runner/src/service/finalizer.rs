//! Finalizer
//!
//! Writes the registry's jobs to the output file as one JSON array. Works on a
//! registry in any state; outstanding jobs are written as they are.

use anyhow::{Context, Result};
use quarry_core::domain::job::Job;
use std::path::PathBuf;
use tracing::info;

use crate::scheduler::SharedRegistry;

/// Persists the final snapshot of a run
pub struct Finalizer {
    output_path: PathBuf,
}

impl Finalizer {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    /// Writes the registry's jobs and returns the written snapshot
    pub async fn finalize(&self, registry: &SharedRegistry) -> Result<Vec<Job>> {
        let jobs = registry.lock().await.snapshot();

        let document =
            serde_json::to_vec_pretty(&jobs).context("Failed to serialize job results")?;

        if let Some(parent) = self.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        tokio::fs::write(&self.output_path, document)
            .await
            .with_context(|| format!("Failed to write {}", self.output_path.display()))?;

        info!(
            "Wrote {} job result(s) to {}",
            jobs.len(),
            self.output_path.display()
        );

        Ok(jobs)
    }
}
