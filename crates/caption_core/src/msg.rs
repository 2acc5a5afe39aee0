#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Populate the queue and launch the worker pool.
    Start,
    /// A worker finished one job, whatever the outcome.
    JobFinished(crate::JobResult),
    /// Operator asked to stop; in-flight stages are left to finish on their own.
    CancelRequested,
    /// Render tick. Carries no state change.
    Tick,
    /// Every worker dropped its results sender before all jobs reported.
    ResultsClosed,
}
