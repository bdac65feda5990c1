use crate::engine::{ActionContext, ActionExecutor, EvaluationOutcome, TargetResolver};
use crate::session::protocol::{SessionCommand, SessionEvent};
use log::debug;
use tokio::sync::mpsc::{Receiver, Sender};

/// Run the session worker, the single owner of `context`.
///
/// Commands are applied strictly in arrival order. The context is handed back
/// when the command channel closes or `Shutdown` arrives.
pub async fn session_worker_loop<R, E>(
    mut rx: Receiver<SessionCommand>,
    tx: Sender<SessionEvent>,
    context: ActionContext,
    resolver: R,
    executor: E,
) -> ActionContext
where
    R: TargetResolver,
    E: ActionExecutor,
{
    let mut state = WorkerState {
        context,
        resolver,
        executor,
    };

    while let Some(cmd) = rx.recv().await {
        let outcome = state.handle_command(cmd);
        if let Some(event) = outcome.event {
            if tx.send(event).await.is_err() {
                break;
            }
        }

        if outcome.done {
            break;
        }
    }

    state.context
}

struct WorkerState<R, E> {
    context: ActionContext,
    resolver: R,
    executor: E,
}

impl<R: TargetResolver, E: ActionExecutor> WorkerState<R, E> {
    fn handle_command(&mut self, cmd: SessionCommand) -> HandlerOutcome {
        match cmd {
            SessionCommand::KeyPressed { code, duration } => {
                self.context.on_key_pressed(code, duration);
                HandlerOutcome::continue_without_event()
            }
            SessionCommand::KeyReleased { code } => {
                self.context.on_key_released(code);
                self.evaluate(true)
            }
            SessionCommand::Tick => self.evaluate(false),
            SessionCommand::ActionCompleted => {
                self.context.on_action_completed();
                HandlerOutcome::continue_without_event()
            }
            SessionCommand::Reload(actions) => {
                let added = self.context.reload(actions);
                HandlerOutcome::emit(SessionEvent::Reloaded { added })
            }
            SessionCommand::ResetInput => {
                self.context.reset_input();
                HandlerOutcome::continue_without_event()
            }
            SessionCommand::SetFilter { code, filtered } => {
                let tracker = self.context.tracker_mut();
                if filtered {
                    tracker.add_filter_key(code);
                } else {
                    tracker.remove_filter_key(code);
                }
                HandlerOutcome::continue_without_event()
            }
            SessionCommand::Shutdown => {
                debug!("Session worker shutting down");
                HandlerOutcome::exit()
            }
        }
    }

    fn evaluate(&mut self, triggers_on_release: bool) -> HandlerOutcome {
        let outcome = self.context.evaluate_and_perform_actions(
            triggers_on_release,
            &mut self.resolver,
            &mut self.executor,
        );
        match outcome {
            EvaluationOutcome::Fired(fired) => HandlerOutcome::emit(SessionEvent::Fired(fired)),
            EvaluationOutcome::ExecutionFailed { fired, error } => {
                HandlerOutcome::emit(SessionEvent::ExecutionFailed { fired, error })
            }
            EvaluationOutcome::Skipped | EvaluationOutcome::NoMatch => {
                HandlerOutcome::continue_without_event()
            }
        }
    }
}

struct HandlerOutcome {
    event: Option<SessionEvent>,
    done: bool,
}

impl HandlerOutcome {
    fn emit(event: SessionEvent) -> Self {
        Self {
            event: Some(event),
            done: false,
        }
    }

    fn continue_without_event() -> Self {
        Self {
            event: None,
            done: false,
        }
    }

    fn exit() -> Self {
        Self {
            event: None,
            done: true,
        }
    }
}
