use crate::{CoordinatorState, Effect, Msg, RunPhase, ShutdownReason};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: CoordinatorState, msg: Msg) -> (CoordinatorState, Vec<Effect>) {
    let effects = match msg {
        Msg::Start => {
            if state.phase() != RunPhase::Idle {
                return (state, Vec::new());
            }
            state.start();
            if state.phase() == RunPhase::Completed {
                vec![Effect::Shutdown {
                    reason: ShutdownReason::Completed,
                }]
            } else {
                vec![
                    Effect::LaunchWorkers {
                        worker_count: state.worker_count(),
                    },
                    Effect::ReceiveNext,
                ]
            }
        }
        Msg::JobFinished(result) => {
            // Late results after cancellation are dropped on purpose.
            if state.phase() != RunPhase::Running {
                return (state, Vec::new());
            }
            state.apply_result(result);
            if state.phase() == RunPhase::Completed {
                vec![Effect::Shutdown {
                    reason: ShutdownReason::Completed,
                }]
            } else {
                vec![Effect::ReceiveNext]
            }
        }
        Msg::CancelRequested => {
            let was_active = !state.phase().is_terminal();
            state.cancel();
            if was_active {
                vec![Effect::Shutdown {
                    reason: ShutdownReason::Cancelled,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::ResultsClosed => {
            if state.phase() != RunPhase::Running {
                return (state, Vec::new());
            }
            state.abandon_unreported();
            vec![Effect::Shutdown {
                reason: ShutdownReason::Completed,
            }]
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
