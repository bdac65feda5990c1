//! Low-level input collection: raw key-down/key-up transitions turned into the
//! "still held for N seconds" stream that the tracker consumes.

use crate::action::InputCode;
use std::collections::BTreeMap;
use std::time::Instant;

/// Low-level transitions reported by a device backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputEvent {
    Down(InputCode),
    Up(InputCode),
}

/// Remembers when each held key went down.
#[derive(Debug, Default, Clone)]
pub struct HoldClock {
    down_since: BTreeMap<InputCode, Instant>,
}

impl HoldClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key-down. Auto-repeat downs keep the original start.
    pub fn key_down(&mut self, code: InputCode, now: Instant) {
        self.down_since.entry(code).or_insert(now);
    }

    /// Register a key-up, returning how long the key was held if it was down.
    pub fn key_up(&mut self, code: InputCode, now: Instant) -> Option<f32> {
        self.down_since
            .remove(&code)
            .map(|since| now.saturating_duration_since(since).as_secs_f32())
    }

    /// Apply a raw transition.
    pub fn apply(&mut self, event: RawInputEvent, now: Instant) {
        match event {
            RawInputEvent::Down(code) => self.key_down(code, now),
            RawInputEvent::Up(code) => {
                self.key_up(code, now);
            }
        }
    }

    /// Held duration in seconds of every key that is down, ordered by code.
    pub fn held_durations(&self, now: Instant) -> Vec<(InputCode, f32)> {
        self.down_since
            .iter()
            .map(|(&code, &since)| (code, now.saturating_duration_since(since).as_secs_f32()))
            .collect()
    }

    /// Return true when no key is held.
    pub fn is_idle(&self) -> bool {
        self.down_since.is_empty()
    }

    /// Forget every held key (e.g. when focus is lost).
    pub fn reset(&mut self) {
        self.down_since.clear();
    }
}
