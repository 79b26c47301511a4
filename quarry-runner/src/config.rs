//! Runner configuration
//!
//! Defines the configurable parameters of a run: where the query service
//! lives, how often to poll it, how many requests may be in flight, and where
//! results are written.

use quarry_client::QueryContext;
use std::path::PathBuf;
use std::time::Duration;

/// Runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Query service base URL (e.g., "http://localhost:8080")
    pub service_url: String,

    /// Delay between the end of one poll cycle and the start of the next
    pub poll_interval: Duration,

    /// File the final job results are written to
    pub output_path: PathBuf,

    /// Maximum concurrent submission or cancellation requests
    pub max_in_flight: usize,

    /// Timeout for each call to the query service; none waits indefinitely
    pub request_timeout: Option<Duration>,

    /// Database and workgroup sent with every submission
    pub query_context: QueryContext,

    /// File extension of query files when walking directories
    pub extension: String,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(service_url: String) -> Self {
        Self {
            service_url,
            poll_interval: Duration::from_millis(2_000),
            output_path: PathBuf::from("quarry-results.json"),
            max_in_flight: 16,
            request_timeout: None,
            query_context: QueryContext::default(),
            extension: "sql".to_string(),
        }
    }

    /// Builds the HTTP client used for the query service
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.service_url.is_empty() {
            anyhow::bail!("service_url cannot be empty");
        }

        if !self.service_url.starts_with("http://") && !self.service_url.starts_with("https://") {
            anyhow::bail!("service_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_in_flight == 0 {
            anyhow::bail!("max_in_flight must be greater than 0");
        }

        if self.output_path.as_os_str().is_empty() {
            anyhow::bail!("output_path cannot be empty");
        }

        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:8080".to_string())
    }
}
