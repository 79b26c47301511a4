//! Quarry Runner
//!
//! Submits a batch of query files to an asynchronous query service and
//! follows them until every query has finished.
//!
//! Architecture:
//! - Configuration: command-line flags with environment fallbacks
//! - Input: query files collected from files and directories
//! - Repository: HTTP communication with the query service
//! - Scheduler: submission, poll cycles, and cancellation
//! - Services: result persistence and progress rendering
//!
//! Ctrl-C stops polling, asks the service to cancel every outstanding query,
//! and still writes the results file. A second Ctrl-C aborts immediately.

mod config;
mod input;
mod interrupt;
mod repository;
mod scheduler;
mod service;
mod session;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::Parser;
use quarry_client::{QueryContext, QueryServiceClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repository::{HttpQueryRepository, QueryRepository};
use crate::scheduler::RunOutcome;
use crate::service::{TableRenderer, print_summary};
use crate::session::Session;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Run a batch of queries against an asynchronous query service", long_about = None)]
struct Cli {
    /// Query files or directories to walk for query files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Query service URL
    #[arg(long, env = "QUARRY_SERVICE_URL", default_value = "http://localhost:8080")]
    service_url: String,

    /// Milliseconds between poll cycles
    #[arg(long, env = "QUARRY_POLL_INTERVAL_MS", default_value_t = 2_000)]
    poll_interval_ms: u64,

    /// File the final results are written to
    #[arg(long, env = "QUARRY_OUTPUT", default_value = "quarry-results.json")]
    output: PathBuf,

    /// Maximum concurrent submission or cancellation requests
    #[arg(long, env = "QUARRY_MAX_IN_FLIGHT", default_value_t = 16)]
    max_in_flight: usize,

    /// Timeout for each call to the query service (no timeout if unset)
    #[arg(long, env = "QUARRY_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,

    /// Database to run the queries in
    #[arg(long, env = "QUARRY_DATABASE")]
    database: Option<String>,

    /// Workgroup to run the queries in
    #[arg(long, env = "QUARRY_WORKGROUP")]
    workgroup: Option<String>,

    /// Extension of query files inside directories
    #[arg(long, default_value = "sql")]
    extension: String,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::new(self.service_url.clone());
        config.poll_interval = Duration::from_millis(self.poll_interval_ms);
        config.output_path = self.output.clone();
        config.max_in_flight = self.max_in_flight;
        config.request_timeout = self.request_timeout_secs.map(Duration::from_secs);
        config.query_context = QueryContext {
            database: self.database.clone(),
            workgroup: self.workgroup.clone(),
        };
        config.extension = self.extension.clone();
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, the progress table to stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quarry_runner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    config.validate()?;

    info!(
        "Loaded configuration: service_url={}, poll_interval={:?}, max_in_flight={}",
        config.service_url, config.poll_interval, config.max_in_flight
    );

    let units = input::collect_query_units(&cli.paths, &config.extension)
        .context("Failed to collect queries")?;
    info!("Collected {} query unit(s)", units.len());

    let client = QueryServiceClient::with_client(&config.service_url, config.http_client()?);
    let repository: Arc<dyn QueryRepository> =
        Arc::new(HttpQueryRepository::new(client, config.query_context.clone()));

    let shutdown = CancellationToken::new();
    let _interrupt = interrupt::spawn_listener(shutdown.clone());

    let output_path = config.output_path.clone();
    let session = Session::new(config, repository, Arc::new(TableRenderer::new()));
    let report = session.run(units, shutdown).await?;

    if report.outcome == RunOutcome::Cancelled {
        warn!("Run interrupted; outstanding queries were asked to cancel");
    }
    print_summary(&report.jobs, &output_path);

    Ok(())
}
