//! Caption core: job records and the pure coordinator state machine.
mod effect;
mod job;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, ShutdownReason};
pub use job::{FailureKind, Job, JobError, JobIndex, JobResult, JobStatus, Stage};
pub use msg::Msg;
pub use state::{CoordinatorState, RunPhase};
pub use update::update;
pub use view_model::{FailedJob, JobRowView, RunSummary, Snapshot};
