#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LaunchWorkers { worker_count: usize },
    /// Suspend until the next job result arrives.
    ReceiveNext,
    Shutdown { reason: ShutdownReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Completed,
    Cancelled,
}
