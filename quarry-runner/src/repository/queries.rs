//! Queries repository
//!
//! Handles communication with the query service:
//! - Starting query executions
//! - Fetching the status of a batch of executions
//! - Stopping executions

use anyhow::{Context, Result};
use async_trait::async_trait;
use quarry_client::{QueryContext, QueryServiceClient};
use quarry_core::dto::query::BatchGetQueryResponse;

/// Repository trait for query execution operations
#[async_trait]
pub trait QueryRepository: Send + Sync {
    /// Starts executing `query` and returns the identifier the service assigned
    async fn submit(&self, query: &str) -> Result<String>;

    /// Fetches the status of every execution in `ids` with a single call
    ///
    /// An error means the call as a whole failed. Identifiers the service
    /// could not report on come back in the response's unprocessed list.
    async fn poll_batch(&self, ids: Vec<String>) -> Result<BatchGetQueryResponse>;

    /// Asks the service to stop the execution `id`
    async fn cancel(&self, id: &str) -> Result<()>;
}

/// HTTP implementation of QueryRepository
pub struct HttpQueryRepository {
    client: QueryServiceClient,
    context: QueryContext,
}

impl HttpQueryRepository {
    /// Creates a new HTTP query repository
    ///
    /// # Arguments
    /// * `client` - Client for the query service
    /// * `context` - Database and workgroup sent with every submission
    pub fn new(client: QueryServiceClient, context: QueryContext) -> Self {
        Self { client, context }
    }
}

#[async_trait]
impl QueryRepository for HttpQueryRepository {
    async fn submit(&self, query: &str) -> Result<String> {
        self.client
            .start_query(query, &self.context)
            .await
            .context("Failed to start query")
    }

    async fn poll_batch(&self, ids: Vec<String>) -> Result<BatchGetQueryResponse> {
        self.client
            .batch_get_queries(ids)
            .await
            .context("Failed to fetch query status")
    }

    async fn cancel(&self, id: &str) -> Result<()> {
        self.client
            .stop_query(id)
            .await
            .with_context(|| format!("Failed to stop query {}", id))
    }
}
