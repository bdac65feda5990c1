//! Session: one [`ActionContext`] owned by one tokio task.
//!
//! Hosts that deliver input from several threads talk to the session through
//! a [`SessionHandle`]; the worker applies every command in order, so the
//! context itself needs no locking.

pub mod protocol;
pub mod worker;

pub use protocol::{SessionCommand, SessionEvent};
pub use worker::session_worker_loop;

use crate::action::InputCode;
use crate::engine::{ActionContext, ActionExecutor, TargetResolver};
use crate::error::{KeyActionError, Result};
use crate::input::{HoldClock, RawInputEvent, ScriptStep};
use log::debug;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Cloneable sender side of a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub async fn send(&self, cmd: SessionCommand) -> Result<()> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| KeyActionError::session_closed("session worker has stopped"))
    }

    pub async fn key_pressed(&self, code: InputCode, duration: f32) -> Result<()> {
        self.send(SessionCommand::KeyPressed { code, duration }).await
    }

    pub async fn key_released(&self, code: InputCode) -> Result<()> {
        self.send(SessionCommand::KeyReleased { code }).await
    }

    pub async fn action_completed(&self) -> Result<()> {
        self.send(SessionCommand::ActionCompleted).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(SessionCommand::Shutdown).await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Spawn a session worker owning `context`.
///
/// Returns the command handle, the event stream and the worker task, which
/// yields the context back once the session stops.
pub fn spawn_session<R, E>(
    context: ActionContext,
    resolver: R,
    executor: E,
    capacity: usize,
) -> (
    SessionHandle,
    mpsc::Receiver<SessionEvent>,
    JoinHandle<ActionContext>,
)
where
    R: TargetResolver + Send + 'static,
    E: ActionExecutor + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(capacity);
    let (event_tx, event_rx) = mpsc::channel(capacity);
    let worker = tokio::spawn(session_worker_loop(
        cmd_rx, event_tx, context, resolver, executor,
    ));
    (SessionHandle { tx: cmd_tx }, event_rx, worker)
}

/// Periodic task sending `Tick` until the session goes away.
pub fn spawn_ticker(handle: SessionHandle, tick_rate: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_rate);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if handle.send(SessionCommand::Tick).await.is_err() {
                break;
            }
        }
    })
}

/// Drive a session from a recorded trace in real time.
///
/// Key transitions go through a [`HoldClock`]; while waiting, every held key
/// is refreshed with its running duration once per `tick_rate`.
pub async fn feed_script(
    handle: &SessionHandle,
    steps: Vec<ScriptStep>,
    tick_rate: Duration,
) -> Result<()> {
    let mut clock = HoldClock::new();
    for step in steps {
        match step {
            ScriptStep::Raw(event) => {
                clock.apply(event, Instant::now());
                let cmd = match event {
                    RawInputEvent::Down(code) => SessionCommand::KeyPressed {
                        code,
                        duration: 0.0,
                    },
                    RawInputEvent::Up(code) => SessionCommand::KeyReleased { code },
                };
                handle.send(cmd).await?;
            }
            ScriptStep::Wait(total) => {
                let until = Instant::now() + total;
                while Instant::now() < until {
                    let remaining = until.saturating_duration_since(Instant::now());
                    tokio::time::sleep(tick_rate.min(remaining)).await;
                    for (code, held) in clock.held_durations(Instant::now()) {
                        handle.key_pressed(code, held).await?;
                    }
                }
            }
            ScriptStep::Reset => {
                clock.reset();
                handle.send(SessionCommand::ResetInput).await?;
            }
        }
    }
    if !clock.is_idle() {
        debug!(
            "Trace ended with {} keys still down",
            clock.held_durations(Instant::now()).len()
        );
    }
    Ok(())
}
