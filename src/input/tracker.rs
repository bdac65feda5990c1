//! Per-key press state.
//!
//! Two views of the held keys are maintained. The unfiltered view always
//! mirrors the physical state. The filtered view skips any code in the filter
//! set, which is how a held key is kept from firing the same press action
//! twice.

use crate::action::InputCode;
use std::collections::{HashMap, HashSet};

/// Held durations, the filter set and the single-flight latch.
#[derive(Debug, Default, Clone)]
pub struct InputTracker {
    pressed_keys: HashMap<InputCode, f32>,
    unfiltered_pressed_keys: HashMap<InputCode, f32>,
    filter_keys: HashSet<InputCode>,
    action_queued: bool,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `code` is down and has been for `duration` seconds.
    pub fn on_key_pressed(&mut self, code: InputCode, duration: f32) {
        self.unfiltered_pressed_keys.insert(code, duration);
        if self.filter_keys.contains(&code) {
            return;
        }
        self.pressed_keys.insert(code, duration);
    }

    /// Forget `code` in both views and lift any filter on it.
    pub fn on_key_released(&mut self, code: InputCode) {
        self.remove_filter_key(code);
        self.pressed_keys.remove(&code);
        self.unfiltered_pressed_keys.remove(&code);
    }

    /// A press action fired for `code`: hide it until it is released.
    pub fn on_post_press_action(&mut self, code: InputCode) {
        self.pressed_keys.remove(&code);
        self.add_filter_key(code);
    }

    pub fn clear_pressed_keys(&mut self) {
        self.unfiltered_pressed_keys.clear();
        self.pressed_keys.clear();
    }

    pub fn clear_filter_keys(&mut self) {
        self.filter_keys.clear();
    }

    pub fn add_filter_key(&mut self, code: InputCode) {
        self.filter_keys.insert(code);
    }

    pub fn remove_filter_key(&mut self, code: InputCode) {
        self.filter_keys.remove(&code);
    }

    pub fn set_action_queued(&mut self, queued: bool) {
        self.action_queued = queued;
    }

    pub fn is_action_queued(&self) -> bool {
        self.action_queued
    }

    pub fn is_filtered(&self, code: InputCode) -> bool {
        self.filter_keys.contains(&code)
    }

    /// Held duration in the filtered view.
    pub fn pressed_duration(&self, code: InputCode) -> Option<f32> {
        self.pressed_keys.get(&code).copied()
    }

    /// Held duration in the unfiltered view.
    pub fn unfiltered_duration(&self, code: InputCode) -> Option<f32> {
        self.unfiltered_pressed_keys.get(&code).copied()
    }

    pub fn pressed_keys(&self) -> &HashMap<InputCode, f32> {
        &self.pressed_keys
    }

    pub fn unfiltered_pressed_keys(&self) -> &HashMap<InputCode, f32> {
        &self.unfiltered_pressed_keys
    }

    pub fn filter_keys(&self) -> &HashSet<InputCode> {
        &self.filter_keys
    }
}
