//! Query submission
//!
//! Starts every query unit concurrently and turns each answer into a job.
//! A failed submission only fails its own job.

use quarry_core::domain::job::{Job, QueryUnit};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::repository::QueryRepository;

/// Fans query units out to the query service
pub struct Submitter {
    repository: Arc<dyn QueryRepository>,
    semaphore: Arc<Semaphore>,
}

impl Submitter {
    /// Creates a submitter allowing at most `max_in_flight` concurrent requests
    pub fn new(repository: Arc<dyn QueryRepository>, max_in_flight: usize) -> Self {
        Self {
            repository,
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Submits every unit and waits for all requests to settle
    ///
    /// Returns one job per unit, in input order.
    pub async fn submit_all(&self, units: Vec<QueryUnit>) -> Vec<Job> {
        info!("Submitting {} query unit(s)", units.len());

        let mut handles = Vec::with_capacity(units.len());
        for unit in units {
            let name = unit.name.clone();
            let handle = self.spawn_submission(unit);
            handles.push((name, handle));
        }

        let mut jobs = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            let job = match handle.await {
                Ok(job) => job,
                Err(e) => {
                    warn!("Submission task for {} panicked: {}", name, e);
                    Job::rejected(name, format!("submission task failed: {}", e))
                }
            };
            jobs.push(job);
        }

        let failed = jobs.iter().filter(|job| job.id().is_none()).count();
        info!(
            "Submitted {} job(s), {} rejected",
            jobs.len() - failed,
            failed
        );

        jobs
    }

    fn spawn_submission(&self, unit: QueryUnit) -> tokio::task::JoinHandle<Job> {
        let repository = Arc::clone(&self.repository);
        let semaphore = Arc::clone(&self.semaphore);

        tokio::spawn(async move {
            // The semaphore is never closed
            let _permit = semaphore.acquire_owned().await.ok();

            match repository.submit(&unit.text).await {
                Ok(id) => {
                    debug!("Started {} as {}", unit.name, id);
                    Job::queued(unit.name, id)
                }
                Err(e) => {
                    warn!("Failed to submit {}: {:#}", unit.name, e);
                    Job::rejected(unit.name, format!("{:#}", e))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockQueryRepository;
    use quarry_core::domain::job::JobStatus;
    use std::time::Duration;

    #[tokio::test]
    async fn test_submit_all_isolates_failures() {
        let repository = MockQueryRepository::new()
            .reject("SELECT 1", "access denied")
            .accept("SELECT 2", "q-2")
            .accept("SELECT 3", "q-3");
        let submitter = Submitter::new(Arc::new(repository), 4);

        let jobs = submitter
            .submit_all(vec![
                QueryUnit::new("one.sql", "SELECT 1"),
                QueryUnit::new("two.sql", "SELECT 2"),
                QueryUnit::new("three.sql", "SELECT 3"),
            ])
            .await;

        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].name(), "one.sql");
        assert_eq!(jobs[0].status(), JobStatus::Failed);
        assert_eq!(jobs[0].id(), None);
        assert_eq!(jobs[0].state().error(), Some("access denied"));
        assert_eq!(jobs[1].id(), Some("q-2"));
        assert_eq!(jobs[1].status(), JobStatus::Queued);
        assert_eq!(jobs[2].id(), Some("q-3"));
    }

    #[tokio::test]
    async fn test_one_job_per_unit_when_everything_fails() {
        let submitter = Submitter::new(Arc::new(MockQueryRepository::new()), 1);
        let units = (0..10)
            .map(|i| QueryUnit::new(format!("{}.sql", i), format!("SELECT {}", i)))
            .collect();

        let jobs = submitter.submit_all(units).await;

        assert_eq!(jobs.len(), 10);
        assert!(jobs.iter().all(|job| job.status() == JobStatus::Failed));
    }

    #[tokio::test]
    async fn test_submissions_respect_in_flight_limit() {
        let mut repository = MockQueryRepository::new().with_latency(Duration::from_millis(20));
        let mut units = Vec::new();
        for i in 0..8 {
            let query = format!("SELECT {}", i);
            repository = repository.accept(&query, &format!("q-{}", i));
            units.push(QueryUnit::new(format!("{}.sql", i), query));
        }
        let repository = Arc::new(repository);
        let submitter = Submitter::new(repository.clone(), 3);

        let jobs = submitter.submit_all(units).await;

        assert_eq!(jobs.len(), 8);
        assert!(jobs.iter().all(|job| job.status() == JobStatus::Queued));
        assert_eq!(repository.peak_in_flight(), 3);
    }

    #[tokio::test]
    async fn test_submit_nothing() {
        let submitter = Submitter::new(Arc::new(MockQueryRepository::new()), 4);
        assert!(submitter.submit_all(Vec::new()).await.is_empty());
    }
}
