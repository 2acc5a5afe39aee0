use crate::job::{FailureKind, Job, JobError, JobResult};
use crate::view_model::{JobRowView, Snapshot};

/// Coordinator lifecycle: `Idle -> Running -> {Completed, Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Authoritative job list and progress counters.
///
/// Only the coordinator's receive loop mutates this, through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorState {
    jobs: Vec<Job>,
    completed_count: usize,
    worker_count: usize,
    cancel_requested: bool,
    phase: RunPhase,
}

impl Default for CoordinatorState {
    fn default() -> Self {
        Self {
            jobs: Vec::new(),
            completed_count: 0,
            worker_count: 1,
            cancel_requested: false,
            phase: RunPhase::Idle,
        }
    }
}

impl CoordinatorState {
    /// Builds one pending job per identifier. A worker count of zero would
    /// leave the queue undrained, so it is raised to one.
    pub fn new<I, S>(identifiers: I, worker_count: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            jobs: identifiers.into_iter().map(Job::new).collect(),
            worker_count: worker_count.max(1),
            ..Self::default()
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Fraction of jobs accounted for, in `0.0..=1.0`. An empty run is complete.
    pub fn percent(&self) -> f64 {
        if self.jobs.is_empty() {
            return 1.0;
        }
        self.completed_count as f64 / self.jobs.len() as f64
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            jobs: self
                .jobs
                .iter()
                .enumerate()
                .map(|(index, job)| JobRowView::from_job(index, job))
                .collect(),
            completed: self.completed_count,
            total: self.jobs.len(),
            worker_count: self.worker_count,
            cancel_requested: self.cancel_requested,
            phase: self.phase,
        }
    }

    pub(crate) fn start(&mut self) {
        self.phase = if self.jobs.is_empty() {
            RunPhase::Completed
        } else {
            RunPhase::Running
        };
    }

    /// Returns false when the index does not name a job.
    pub(crate) fn apply_result(&mut self, result: JobResult) -> bool {
        let Some(slot) = self.jobs.get_mut(result.index) else {
            return false;
        };
        *slot = result.job;
        self.completed_count = (self.completed_count + 1).min(self.jobs.len());
        if self.completed_count == self.jobs.len() {
            self.phase = RunPhase::Completed;
        }
        true
    }

    pub(crate) fn cancel(&mut self) {
        self.cancel_requested = true;
        if !self.phase.is_terminal() {
            self.phase = RunPhase::Cancelled;
        }
    }

    pub(crate) fn abandon_unreported(&mut self) {
        for job in self.jobs.iter_mut().filter(|j| !j.status().is_terminal()) {
            job.fail(JobError::new(
                FailureKind::WorkerLost,
                "no result was reported for this job",
            ));
        }
        self.completed_count = self.jobs.len();
        self.phase = RunPhase::Completed;
    }
}
