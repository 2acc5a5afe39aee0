use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Position of a job in the coordinator's job list.
pub type JobIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    ResolvingTitle,
    Fetching,
    Normalizing,
    Completed,
    Skipped,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped | Self::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::ResolvingTitle => 1,
            Self::Fetching => 2,
            Self::Normalizing => 3,
            Self::Completed | Self::Skipped | Self::Failed => 4,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::ResolvingTitle => "resolving title",
            Self::Fetching => "fetching",
            Self::Normalizing => "normalizing",
            Self::Completed => "completed",
            Self::Skipped => "skipped (exists)",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// The three sequential stages a job passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ResolveTitle,
    FetchAsset,
    Normalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ResolveTitle => "resolve title",
            Self::FetchAsset => "fetch asset",
            Self::Normalize => "normalize",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Resolution,
    IdentifierParse,
    /// The external tool could not be launched or exited unsuccessfully.
    Fetch,
    /// The external tool succeeded but left no artifact behind.
    NoContent,
    Normalize,
    Timeout { stage: Stage },
    /// The worker holding the job went away before reporting it.
    WorkerLost,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Resolution => write!(f, "title resolution failed"),
            FailureKind::IdentifierParse => write!(f, "invalid identifier"),
            FailureKind::Fetch => write!(f, "download failed"),
            FailureKind::NoContent => write!(f, "no captions available"),
            FailureKind::Normalize => write!(f, "normalization failed"),
            FailureKind::Timeout { stage } => write!(f, "timed out during {stage}"),
            FailureKind::WorkerLost => write!(f, "worker exited unexpectedly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct JobError {
    pub kind: FailureKind,
    pub message: String,
}

impl JobError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// One identifier's processing lifecycle.
///
/// The fields are only reachable through transition methods so that the
/// pairing of status with `error` and `output_path` always holds:
/// `error` is present iff the job failed, and `output_path` is present iff
/// the job completed or was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    identifier: String,
    title: String,
    status: JobStatus,
    error: Option<JobError>,
    output_path: Option<PathBuf>,
}

impl Job {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: String::new(),
            status: JobStatus::Pending,
            error: None,
            output_path: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title for presentation; falls back to the identifier before resolution.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.identifier
        } else {
            &self.title
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn error(&self) -> Option<&JobError> {
        self.error.as_ref()
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Moves an in-flight job forward. Terminal or backwards moves are ignored.
    pub fn begin(&mut self, status: JobStatus) {
        if status.is_terminal() || self.status.is_terminal() {
            return;
        }
        if status.rank() > self.status.rank() {
            self.status = status;
        }
    }

    pub fn fail(&mut self, error: JobError) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.error = Some(error);
        self.output_path = None;
    }

    pub fn skip(&mut self, existing: PathBuf) {
        self.finish(JobStatus::Skipped, existing);
    }

    pub fn complete(&mut self, output: PathBuf) {
        self.finish(JobStatus::Completed, output);
    }

    fn finish(&mut self, status: JobStatus, path: PathBuf) {
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.error = None;
        self.output_path = Some(path);
    }
}

/// A worker's report for one job, sent exactly once per queue index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub index: JobIndex,
    pub job: Job,
}

impl JobResult {
    pub fn new(index: JobIndex, job: Job) -> Self {
        Self { index, job }
    }
}
