//! Query execution endpoints

use crate::QueryServiceClient;
use crate::error::Result;
use quarry_core::dto::query::{
    BatchGetQueryRequest, BatchGetQueryResponse, StartQueryRequest, StartQueryResponse,
};
use uuid::Uuid;

/// Optional context sent with every query submission
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    pub database: Option<String>,
    pub workgroup: Option<String>,
}

impl QueryServiceClient {
    // =============================================================================
    // Query Lifecycle
    // =============================================================================

    /// Start executing a query
    ///
    /// Each call carries a fresh client request token.
    ///
    /// # Arguments
    /// * `query` - The query text
    /// * `context` - Database and workgroup to run the query in
    ///
    /// # Returns
    /// The identifier assigned by the service
    ///
    /// # Example
    /// ```no_run
    /// # use quarry_client::{QueryContext, QueryServiceClient};
    /// # async fn example() -> quarry_client::Result<()> {
    /// let client = QueryServiceClient::new("http://localhost:8080");
    /// let id = client.start_query("SELECT 1", &QueryContext::default()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start_query(&self, query: &str, context: &QueryContext) -> Result<String> {
        let url = format!("{}/queries", self.base_url);
        let request = StartQueryRequest {
            query_string: query.to_string(),
            client_request_token: Uuid::new_v4().to_string(),
            database: context.database.clone(),
            workgroup: context.workgroup.clone(),
        };
        let response = self.client.post(&url).json(&request).send().await?;

        let started: StartQueryResponse = self.handle_response(response).await?;
        Ok(started.query_execution_id)
    }

    /// Get the status of several executions in one call
    ///
    /// # Arguments
    /// * `ids` - Identifiers returned by `start_query`
    pub async fn batch_get_queries(&self, ids: Vec<String>) -> Result<BatchGetQueryResponse> {
        let url = format!("{}/queries/batch-get", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&BatchGetQueryRequest {
                query_execution_ids: ids,
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Request that an execution be stopped
    ///
    /// # Arguments
    /// * `id` - The execution to stop
    pub async fn stop_query(&self, id: &str) -> Result<()> {
        let url = format!("{}/queries/{}/stop", self.base_url, id);
        let response = self.client.post(&url).send().await?;

        self.handle_empty_response(response).await
    }
}
