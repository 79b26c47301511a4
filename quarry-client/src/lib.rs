//! Quarry HTTP Client
//!
//! A typed HTTP client for the asynchronous query service that executes
//! Quarry's query units.
//!
//! # Example
//!
//! ```no_run
//! use quarry_client::{QueryContext, QueryServiceClient};
//!
//! #[tokio::main]
//! async fn main() -> quarry_client::Result<()> {
//!     let client = QueryServiceClient::new("http://localhost:8080");
//!
//!     let id = client.start_query("SELECT 1", &QueryContext::default()).await?;
//!     let status = client.batch_get_queries(vec![id]).await?;
//!
//!     println!("{:?}", status.query_executions);
//!     Ok(())
//! }
//! ```

pub mod error;
mod queries;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use queries::QueryContext;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the query service API
///
/// Covers the three calls the runner needs: start a query, fetch the status
/// of a batch of executions, and stop an execution.
#[derive(Debug, Clone)]
pub struct QueryServiceClient {
    /// Base URL of the service (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl QueryServiceClient {
    /// Create a new query service client
    ///
    /// # Example
    /// ```
    /// use quarry_client::QueryServiceClient;
    ///
    /// let client = QueryServiceClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new query service client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use quarry_client::QueryServiceClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = QueryServiceClient::with_client("http://localhost:8080", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("Query service returned {}: {}", status, error_text);
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check the status code of a response without a body
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("Query service returned {}: {}", status, error_text);
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
