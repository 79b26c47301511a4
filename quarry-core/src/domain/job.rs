//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One named block of query text to be executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryUnit {
    pub name: String,
    pub text: String,
}

impl QueryUnit {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Job execution status as reported by the query service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Returns true once the status can no longer change
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing and cost figures reported for a running or finished query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub runtime_millis: Option<u64>,
    pub bytes_scanned: Option<u64>,
}

impl ExecutionStats {
    fn is_empty(&self) -> bool {
        self.start_time.is_none()
            && self.end_time.is_none()
            && self.runtime_millis.is_none()
            && self.bytes_scanned.is_none()
    }
}

/// Lifecycle state of a job
///
/// Execution statistics only exist while a query runs or after it succeeded,
/// and only a failed job carries an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running(ExecutionStats),
    Succeeded(ExecutionStats),
    Failed { error: Option<String> },
    Cancelled,
}

impl JobState {
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: Some(error.into()),
        }
    }

    pub fn status(&self) -> JobStatus {
        match self {
            Self::Queued => JobStatus::Queued,
            Self::Running(_) => JobStatus::Running,
            Self::Succeeded(_) => JobStatus::Succeeded,
            Self::Failed { .. } => JobStatus::Failed,
            Self::Cancelled => JobStatus::Cancelled,
        }
    }

    pub fn stats(&self) -> Option<&ExecutionStats> {
        match self {
            Self::Running(stats) | Self::Succeeded(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => error.as_deref(),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }
}

/// Tracked execution of one query unit
///
/// A job without an identifier never reached the query service and is
/// permanently failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "JobRecord", try_from = "JobRecord")]
pub struct Job {
    name: String,
    id: Option<String>,
    state: JobState,
}

impl Job {
    /// A job accepted by the query service
    pub fn queued(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: Some(id.into()),
            state: JobState::Queued,
        }
    }

    /// A job whose submission was rejected before an identifier was assigned
    pub fn rejected(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            state: JobState::failed(error),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Key of this job in the registry: its identifier, or its name when it has none
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// Moves the job to `state` unless it is already terminal
    ///
    /// Returns whether the job changed.
    pub fn transition(&mut self, state: JobState) -> bool {
        if self.is_terminal() || self.state == state {
            return false;
        }
        self.state = state;
        true
    }
}

/// Flat, persisted shape of a job
///
/// Absent optional fields are omitted rather than written as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_millis: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_scanned: Option<u64>,
}

impl From<Job> for JobRecord {
    fn from(job: Job) -> Self {
        let status = job.status();
        let (error, stats) = match job.state {
            JobState::Running(stats) | JobState::Succeeded(stats) => (None, stats),
            JobState::Failed { error } => (error, ExecutionStats::default()),
            JobState::Queued | JobState::Cancelled => (None, ExecutionStats::default()),
        };

        Self {
            name: job.name,
            identifier: job.id,
            status,
            error,
            start_time: stats.start_time,
            end_time: stats.end_time,
            runtime_millis: stats.runtime_millis,
            bytes_scanned: stats.bytes_scanned,
        }
    }
}

impl TryFrom<JobRecord> for Job {
    type Error = InvalidJobRecord;

    fn try_from(record: JobRecord) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| InvalidJobRecord {
            name: record.name.clone(),
            reason: reason.to_string(),
        };

        let stats = ExecutionStats {
            start_time: record.start_time,
            end_time: record.end_time,
            runtime_millis: record.runtime_millis,
            bytes_scanned: record.bytes_scanned,
        };

        if record.status != JobStatus::Failed && record.error.is_some() {
            return Err(invalid("only failed jobs carry an error"));
        }

        let state = match record.status {
            JobStatus::Running => JobState::Running(stats),
            JobStatus::Succeeded => JobState::Succeeded(stats),
            status => {
                if !stats.is_empty() {
                    return Err(invalid(&format!(
                        "{} jobs carry no execution statistics",
                        status
                    )));
                }
                match status {
                    JobStatus::Queued => JobState::Queued,
                    JobStatus::Cancelled => JobState::Cancelled,
                    _ => JobState::Failed {
                        error: record.error.clone(),
                    },
                }
            }
        };

        if record.identifier.is_none() && state.status() != JobStatus::Failed {
            return Err(invalid("a job without an identifier must be failed"));
        }

        Ok(Self {
            name: record.name,
            id: record.identifier,
            state,
        })
    }
}

/// A persisted job record whose fields contradict its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidJobRecord {
    pub name: String,
    pub reason: String,
}

impl fmt::Display for InvalidJobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid job record '{}': {}", self.name, self.reason)
    }
}

impl std::error::Error for InvalidJobRecord {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn succeeded() -> Job {
        let mut job = Job::queued("daily/revenue.sql", "q-2");
        job.transition(JobState::Succeeded(ExecutionStats {
            start_time: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 1).unwrap()),
            runtime_millis: Some(1200),
            bytes_scanned: Some(2048),
        }));
        job
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_rejected_job_is_failed_without_id() {
        let job = Job::rejected("broken.sql", "syntax error");
        assert_eq!(job.id(), None);
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.state().error(), Some("syntax error"));
        assert_eq!(job.key(), "broken.sql");
    }

    #[test]
    fn test_terminal_job_is_frozen() {
        let mut job = Job::queued("a.sql", "q-1");
        assert!(job.transition(JobState::Running(ExecutionStats::default())));
        assert!(job.transition(JobState::Cancelled));
        assert!(!job.transition(JobState::Queued));
        assert!(!job.transition(JobState::failed("late")));
        assert_eq!(job.status(), JobStatus::Cancelled);
    }

    #[test]
    fn test_record_omits_absent_fields() {
        let json = serde_json::to_value(Job::queued("a.sql", "q-1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "a.sql", "identifier": "q-1", "status": "QUEUED" })
        );

        let json = serde_json::to_value(Job::rejected("b.sql", "boom")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "b.sql", "status": "FAILED", "error": "boom" })
        );
    }

    #[test]
    fn test_record_round_trip_preserves_fields() {
        let jobs = vec![succeeded(), Job::rejected("b.sql", "boom"), Job::queued("c.sql", "q-3")];

        let json = serde_json::to_string(&jobs).unwrap();
        let parsed: Vec<Job> = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, jobs);
        assert!(json.contains("\"runtimeMillis\":1200"));
        assert!(json.contains("\"bytesScanned\":2048"));
        assert!(!json.contains("null"));
    }

    #[test]
    fn test_record_rejects_contradictions() {
        let failed_with_runtime = serde_json::json!({
            "name": "a.sql", "identifier": "q-1", "status": "FAILED", "runtimeMillis": 10
        });
        assert!(serde_json::from_value::<Job>(failed_with_runtime).is_err());

        let queued_without_id = serde_json::json!({ "name": "a.sql", "status": "QUEUED" });
        assert!(serde_json::from_value::<Job>(queued_without_id).is_err());

        let succeeded_with_error = serde_json::json!({
            "name": "a.sql", "identifier": "q-1", "status": "SUCCEEDED", "error": "x"
        });
        assert!(serde_json::from_value::<Job>(succeeded_with_error).is_err());
    }
}
