//! Progress rendering
//!
//! Prints the registry as a table on every poll cycle.

use colored::*;
use quarry_core::domain::job::{Job, JobStatus};
use quarry_core::domain::registry::status_counts;
use std::collections::BTreeMap;

/// Receives a complete snapshot of all jobs on every tick
pub trait ProgressRenderer: Send + Sync {
    fn render(&self, jobs: &[Job]);
}

/// Colored table on stdout
#[derive(Debug, Default)]
pub struct TableRenderer;

impl TableRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressRenderer for TableRenderer {
    fn render(&self, jobs: &[Job]) {
        let width = jobs
            .iter()
            .map(|job| job.name().len())
            .max()
            .unwrap_or(0)
            .max(4);

        println!();
        println!(
            "{}",
            format!(
                "{:<width$}  {:<10}  {:>10}  {:>12}  {}",
                "Name",
                "Status",
                "Runtime",
                "Scanned",
                "Identifier",
                width = width
            )
            .bold()
        );
        println!("{}", "─".repeat(width + 60).dimmed());

        for job in jobs {
            println!("{}", format_row(job, width));
            if let Some(error) = job.state().error() {
                println!("{:<width$}  {}", "", error.red(), width = width);
            }
        }

        println!("{}", format_tally(&status_counts(jobs)).dimmed());
    }
}

fn format_row(job: &Job, width: usize) -> String {
    let stats = job.state().stats();
    let runtime = stats
        .and_then(|s| s.runtime_millis)
        .map(format_millis)
        .unwrap_or_else(|| "-".to_string());
    let scanned = stats
        .and_then(|s| s.bytes_scanned)
        .map(format_bytes)
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:<width$}  {}  {:>10}  {:>12}  {}",
        job.name(),
        colorize_status(job.status()),
        runtime,
        scanned,
        job.id().unwrap_or("-").dimmed(),
        width = width
    )
}

/// Colorize job status for display
fn colorize_status(status: JobStatus) -> ColoredString {
    let status_str = format!("{:<10}", status.as_str());
    match status {
        JobStatus::Queued => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Succeeded => status_str.green(),
        JobStatus::Failed => status_str.red(),
        JobStatus::Cancelled => status_str.dimmed(),
    }
}

fn format_tally(counts: &BTreeMap<JobStatus, usize>) -> String {
    counts
        .iter()
        .map(|(status, count)| format!("{} {}", count, status.as_str().to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_millis(millis: u64) -> String {
    if millis < 1_000 {
        format!("{}ms", millis)
    } else {
        format!("{:.1}s", millis as f64 / 1_000.0)
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Prints the final per-status counts of a run
pub fn print_summary(jobs: &[Job], output: &std::path::Path) {
    println!();
    println!(
        "{}",
        format!("{} job(s): {}", jobs.len(), format_tally(&status_counts(jobs))).bold()
    );
    println!("Results written to {}", output.display().to_string().cyan());
}
