use std::path::PathBuf;

use serde::Serialize;

use crate::{Job, JobError, JobIndex, JobStatus, RunPhase};

/// Read-only view of the coordinator for presentation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Snapshot {
    pub jobs: Vec<JobRowView>,
    pub completed: usize,
    pub total: usize,
    pub worker_count: usize,
    pub cancel_requested: bool,
    pub phase: RunPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRowView {
    pub index: JobIndex,
    pub identifier: String,
    pub title: String,
    pub status: JobStatus,
    pub output_path: Option<PathBuf>,
    pub error: Option<JobError>,
}

impl JobRowView {
    pub(crate) fn from_job(index: JobIndex, job: &Job) -> Self {
        Self {
            index,
            identifier: job.identifier().to_string(),
            title: job.display_title().to_string(),
            status: job.status(),
            output_path: job.output_path().map(PathBuf::from),
            error: job.error().cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedJob {
    pub title: String,
    pub identifier: String,
    pub error: JobError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSummary {
    AllSucceeded { completed: usize, skipped: usize },
    SomeFailed {
        succeeded: usize,
        failures: Vec<FailedJob>,
    },
}

impl Snapshot {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|j| j.status == status).count()
    }

    /// Outcome over the jobs folded so far. Skipped jobs count as successes.
    pub fn summary(&self) -> RunSummary {
        let failures: Vec<FailedJob> = self
            .jobs
            .iter()
            .filter_map(|row| {
                row.error.as_ref().map(|error| FailedJob {
                    title: row.title.clone(),
                    identifier: row.identifier.clone(),
                    error: error.clone(),
                })
            })
            .collect();
        let completed = self.count(JobStatus::Completed);
        let skipped = self.count(JobStatus::Skipped);

        if failures.is_empty() {
            RunSummary::AllSucceeded { completed, skipped }
        } else {
            RunSummary::SomeFailed {
                succeeded: completed + skipped,
                failures,
            }
        }
    }
}
