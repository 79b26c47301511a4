//! Job registry
//!
//! The registry maps job keys to jobs for a whole run. Its set of jobs is
//! fixed at construction; afterwards only job states change.

use std::collections::{BTreeMap, HashMap};

use super::job::{Job, JobState, JobStatus};

/// Result of applying a reported state to one job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The job moved to the new state
    Updated,
    /// The job already had that state or is terminal
    Unchanged,
    /// No job carries the identifier
    Unknown,
}

/// All jobs of a run, in submission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    jobs: Vec<Job>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Builds the registry from the submitter's output
    ///
    /// Every job gets an entry, including jobs that share a name.
    pub fn from_jobs(jobs: Vec<Job>) -> Self {
        let index = jobs
            .iter()
            .enumerate()
            .filter_map(|(position, job)| job.id().map(|id| (id.to_string(), position)))
            .collect();

        Self { jobs, index }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Looks a job up by identifier, falling back to the name of jobs without one
    pub fn get(&self, key: &str) -> Option<&Job> {
        match self.index.get(key) {
            Some(&position) => self.jobs.get(position),
            None => self.jobs.iter().find(|job| job.id().is_none() && job.name() == key),
        }
    }

    /// Identifiers of every job still queued or running
    pub fn outstanding_ids(&self) -> Vec<String> {
        self.jobs
            .iter()
            .filter(|job| !job.is_terminal())
            .filter_map(|job| job.id().map(str::to_string))
            .collect()
    }

    pub fn has_outstanding(&self) -> bool {
        self.jobs
            .iter()
            .any(|job| !job.is_terminal() && job.id().is_some())
    }

    /// Applies a state reported for `id`
    pub fn apply(&mut self, id: &str, state: JobState) -> Applied {
        let Some(&position) = self.index.get(id) else {
            return Applied::Unknown;
        };

        if self.jobs[position].transition(state) {
            Applied::Updated
        } else {
            Applied::Unchanged
        }
    }

    /// Clones the current jobs for rendering or persistence
    pub fn snapshot(&self) -> Vec<Job> {
        self.jobs.clone()
    }
}

/// Number of jobs per status
pub fn status_counts(jobs: &[Job]) -> BTreeMap<JobStatus, usize> {
    let mut counts = BTreeMap::new();
    for job in jobs {
        *counts.entry(job.status()).or_insert(0) += 1;
    }
    counts
}
