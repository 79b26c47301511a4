//! Test doubles for the scheduler

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use quarry_core::domain::job::{Job, JobStatus};
use quarry_core::dto::query::{BatchGetQueryResponse, QueryExecution, UnprocessedQueryExecution};
use tokio::sync::Notify;

use crate::repository::QueryRepository;
use crate::service::ProgressRenderer;

enum ScriptedPoll {
    Report(BatchGetQueryResponse),
    Fail(String),
}

/// In-memory query service with scripted answers
///
/// Submissions are answered by query text. Poll answers are consumed in
/// order; once they run out, polls never return.
#[derive(Default)]
pub struct MockQueryRepository {
    submissions: HashMap<String, std::result::Result<String, String>>,
    polls: Mutex<VecDeque<ScriptedPoll>>,
    failing_cancels: HashSet<String>,
    polled: Mutex<Vec<Vec<String>>>,
    cancelled: Mutex<Vec<String>>,
    stalled: Notify,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockQueryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(mut self, query: &str, id: &str) -> Self {
        self.submissions
            .insert(query.to_string(), Ok(id.to_string()));
        self
    }

    pub fn reject(mut self, query: &str, message: &str) -> Self {
        self.submissions
            .insert(query.to_string(), Err(message.to_string()));
        self
    }

    pub fn respond(self, response: BatchGetQueryResponse) -> Self {
        self.polls
            .lock()
            .unwrap()
            .push_back(ScriptedPoll::Report(response));
        self
    }

    pub fn fail_poll(self, message: &str) -> Self {
        self.polls
            .lock()
            .unwrap()
            .push_back(ScriptedPoll::Fail(message.to_string()));
        self
    }

    pub fn fail_cancel(mut self, id: &str) -> Self {
        self.failing_cancels.insert(id.to_string());
        self
    }

    /// Makes every `submit` and `cancel` call take `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Highest number of `submit` or `cancel` calls seen running at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn simulate_call(&self) {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Identifier batches received by `poll_batch`, in call order
    pub fn polled(&self) -> Vec<Vec<String>> {
        self.polled.lock().unwrap().clone()
    }

    /// Identifiers received by `cancel`, sorted
    pub fn cancelled(&self) -> Vec<String> {
        let mut ids = self.cancelled.lock().unwrap().clone();
        ids.sort();
        ids
    }

    /// Resolves once a poll has run out of scripted answers and is hanging
    pub async fn wait_for_stalled_poll(&self) {
        self.stalled.notified().await;
    }
}

#[async_trait]
impl QueryRepository for MockQueryRepository {
    async fn submit(&self, query: &str) -> Result<String> {
        self.simulate_call().await;
        match self.submissions.get(query) {
            Some(Ok(id)) => Ok(id.clone()),
            Some(Err(message)) => Err(anyhow!("{}", message)),
            None => Err(anyhow!("unexpected query: {}", query)),
        }
    }

    async fn poll_batch(&self, ids: Vec<String>) -> Result<BatchGetQueryResponse> {
        self.polled.lock().unwrap().push(ids);
        let next = self.polls.lock().unwrap().pop_front();
        match next {
            Some(ScriptedPoll::Report(response)) => Ok(response),
            Some(ScriptedPoll::Fail(message)) => Err(anyhow!("{}", message)),
            None => {
                self.stalled.notify_one();
                std::future::pending().await
            }
        }
    }

    async fn cancel(&self, id: &str) -> Result<()> {
        self.simulate_call().await;
        self.cancelled.lock().unwrap().push(id.to_string());
        if self.failing_cancels.contains(id) {
            return Err(anyhow!("cancel rejected for {}", id));
        }
        Ok(())
    }
}

/// Renderer that keeps the status of every job on every tick
#[derive(Default)]
pub struct RecordingRenderer {
    frames: Mutex<Vec<Vec<JobStatus>>>,
}

impl RecordingRenderer {
    pub fn frames(&self) -> Vec<Vec<JobStatus>> {
        self.frames.lock().unwrap().clone()
    }
}

impl ProgressRenderer for RecordingRenderer {
    fn render(&self, jobs: &[Job]) {
        self.frames
            .lock()
            .unwrap()
            .push(jobs.iter().map(Job::status).collect());
    }
}

pub fn execution(id: &str, state: JobStatus) -> QueryExecution {
    QueryExecution {
        query_execution_id: id.to_string(),
        state,
        state_change_reason: None,
        submission_date_time: None,
        completion_date_time: None,
        engine_execution_time_in_millis: None,
        data_scanned_in_bytes: None,
    }
}

pub fn unprocessed(id: &str, message: &str) -> UnprocessedQueryExecution {
    UnprocessedQueryExecution {
        query_execution_id: id.to_string(),
        error_code: None,
        error_message: Some(message.to_string()),
    }
}

pub fn report(
    executions: Vec<QueryExecution>,
    unprocessed: Vec<UnprocessedQueryExecution>,
) -> BatchGetQueryResponse {
    BatchGetQueryResponse {
        query_executions: executions,
        unprocessed_query_execution_ids: unprocessed,
    }
}
