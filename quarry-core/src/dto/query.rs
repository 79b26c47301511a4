//! Query service DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::job::{ExecutionStats, JobState, JobStatus};

/// Message recorded for unprocessed identifiers the service gave no reason for
pub const DEFAULT_UNPROCESSED_MESSAGE: &str = "unprocessed by query service";

/// Request to start executing one query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQueryRequest {
    pub query_string: String,
    pub client_request_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workgroup: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQueryResponse {
    pub query_execution_id: String,
}

/// Request for the status of several executions in one call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetQueryRequest {
    pub query_execution_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetQueryResponse {
    #[serde(default)]
    pub query_executions: Vec<QueryExecution>,
    #[serde(default)]
    pub unprocessed_query_execution_ids: Vec<UnprocessedQueryExecution>,
}

/// Reported status of one execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryExecution {
    pub query_execution_id: String,
    pub state: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_change_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_execution_time_in_millis: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_scanned_in_bytes: Option<u64>,
}

impl QueryExecution {
    /// Lifecycle state this report moves the job to
    ///
    /// Statistics are only taken for running and succeeded executions.
    pub fn job_state(&self) -> JobState {
        let stats = || ExecutionStats {
            start_time: self.submission_date_time,
            end_time: self.completion_date_time,
            runtime_millis: self.engine_execution_time_in_millis,
            bytes_scanned: self.data_scanned_in_bytes,
        };

        match self.state {
            JobStatus::Queued => JobState::Queued,
            JobStatus::Running => JobState::Running(stats()),
            JobStatus::Succeeded => JobState::Succeeded(stats()),
            JobStatus::Failed => JobState::Failed {
                error: self.state_change_reason.clone(),
            },
            JobStatus::Cancelled => JobState::Cancelled,
        }
    }
}

/// Identifier the service could not report on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnprocessedQueryExecution {
    pub query_execution_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl UnprocessedQueryExecution {
    pub fn message(&self) -> &str {
        self.error_message
            .as_deref()
            .unwrap_or(DEFAULT_UNPROCESSED_MESSAGE)
    }
}
