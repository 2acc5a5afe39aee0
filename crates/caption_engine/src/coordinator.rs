use caption_core::{update, CoordinatorState, Effect, Msg, ShutdownReason, Snapshot};
use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::engine::EngineHandle;
use crate::{EngineConfig, Stages};

/// Owns the authoritative coordinator state and executes the effects that
/// [`update`] asks for. Every state change goes through [`Coordinator::dispatch`],
/// so the job list has a single writer.
pub struct Coordinator {
    state: CoordinatorState,
    config: EngineConfig,
    stages: Stages,
    engine: Option<EngineHandle>,
    awaiting_result: bool,
    shutdown: Option<ShutdownReason>,
}

impl Coordinator {
    pub fn new<I, S>(identifiers: I, config: EngineConfig, stages: Stages) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = CoordinatorState::new(identifiers, config.worker_count);
        Self {
            state,
            config,
            stages,
            engine: None,
            awaiting_result: false,
            shutdown: None,
        }
    }

    /// Launches the worker pool. Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        self.dispatch(Msg::Start);
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            self.execute(effect);
        }
    }

    /// Waits for the next event from the worker pool.
    ///
    /// Pends forever while no receive is outstanding, which lets callers race
    /// it against cancellation and render ticks in `tokio::select!`.
    pub async fn next_message(&mut self) -> Msg {
        let engine = match (self.awaiting_result, self.engine.as_mut()) {
            (true, Some(engine)) => engine,
            _ => return std::future::pending().await,
        };
        let msg = match engine.recv().await {
            Some(result) => Msg::JobFinished(result),
            None => {
                engine_warn!("results channel closed before every job reported");
                Msg::ResultsClosed
            }
        };
        self.awaiting_result = false;
        msg
    }

    /// Starts the run and folds results until every job is accounted for.
    pub async fn run_to_completion(&mut self) -> Snapshot {
        self.start();
        while !self.is_finished() {
            let msg = self.next_message().await;
            self.dispatch(msg);
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.shutdown.is_some()
    }

    pub fn shutdown_reason(&self) -> Option<ShutdownReason> {
        self.shutdown
    }

    /// Hands back the worker pool so a caller can wait for in-flight jobs.
    pub fn take_engine(&mut self) -> Option<EngineHandle> {
        self.awaiting_result = false;
        self.engine.take()
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::LaunchWorkers { worker_count } => {
                self.engine = Some(EngineHandle::launch(
                    self.state.jobs(),
                    worker_count,
                    self.config.clone(),
                    self.stages.clone(),
                ));
            }
            Effect::ReceiveNext => self.awaiting_result = true,
            Effect::Shutdown { reason } => {
                self.awaiting_result = false;
                self.shutdown = Some(reason);
                match reason {
                    ShutdownReason::Completed => engine_info!(
                        "run complete: {}/{} jobs",
                        self.state.completed_count(),
                        self.state.total()
                    ),
                    ShutdownReason::Cancelled => {
                        engine_debug!(
                            "run cancelled with {}/{} jobs folded",
                            self.state.completed_count(),
                            self.state.total()
                        );
                        if let Some(engine) = self.engine.as_mut() {
                            engine.close();
                        }
                    }
                }
            }
        }
    }
}
