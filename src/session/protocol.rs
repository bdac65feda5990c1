//! Protocol definitions shared between the host and the session worker.

use crate::action::{Action, InputCode};
use crate::engine::FiredAction;

/// Commands sent from the host to the session worker.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// `code` is down and has been for `duration` seconds.
    KeyPressed { code: InputCode, duration: f32 },
    /// `code` went up. Release-triggered actions are evaluated right away.
    KeyReleased { code: InputCode },
    /// Evaluate held actions.
    Tick,
    /// The executor finished the in-flight action.
    ActionCompleted,
    /// Replace the registry contents.
    Reload(Vec<Action>),
    /// Drop held keys, filters and pending releases.
    ResetInput,
    /// Force a code in or out of the filter set.
    SetFilter { code: InputCode, filtered: bool },
    Shutdown,
}

/// Notifications emitted by the session worker.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Fired(FiredAction),
    ExecutionFailed { fired: FiredAction, error: String },
    Reloaded { added: usize },
}
