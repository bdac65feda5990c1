//! The action context: registry, tracker and the resolution algorithm.

use crate::action::{Action, InputCode};
use crate::engine::collaborators::{
    ActionExecutor, ExecutionRequest, KeywordPolicy, PairedTarget, TargetQuery, TargetResolver,
};
use crate::input::InputTracker;
use crate::registry::ActionRegistry;
use log::{debug, info, trace, warn};

/// An action that won an evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredAction {
    pub action: Action,
    /// Code whose hold satisfied the action.
    pub trigger: InputCode,
    /// Seconds `trigger` had been held.
    pub held_for: f32,
    pub request: ExecutionRequest,
}

/// What a single evaluation did.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    /// An action is still in flight; nothing was evaluated.
    Skipped,
    /// No action was eligible.
    NoMatch,
    /// The executor accepted the winner and the latch is now set.
    Fired(FiredAction),
    /// The executor refused the winner; the latch stays clear.
    ExecutionFailed { fired: FiredAction, error: String },
}

impl EvaluationOutcome {
    pub fn fired(&self) -> Option<&FiredAction> {
        match self {
            Self::Fired(fired) => Some(fired),
            _ => None,
        }
    }
}

/// Session-owned state for one host session.
///
/// Input events, ticks and completions must all be delivered to the same
/// context, one at a time.
#[derive(Debug, Default, Clone)]
pub struct ActionContext {
    registry: ActionRegistry,
    tracker: InputTracker,
    /// Codes released since the last release evaluation, with their final hold.
    released_keys: Vec<(InputCode, f32)>,
    keyword_policy: KeywordPolicy,
}

impl ActionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyword_policy(mut self, policy: KeywordPolicy) -> Self {
        self.keyword_policy = policy;
        self
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ActionRegistry {
        &mut self.registry
    }

    pub fn tracker(&self) -> &InputTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut InputTracker {
        &mut self.tracker
    }

    pub fn add_action(&mut self, action: Action) -> bool {
        self.registry.add_action(action)
    }

    /// Replace the registry contents, returning how many actions were accepted.
    pub fn reload(&mut self, actions: impl IntoIterator<Item = Action>) -> usize {
        self.registry.clear_actions();
        let mut added = 0;
        for action in actions {
            match self.registry.try_add_action(action) {
                Ok(()) => added += 1,
                Err(err) => debug!("Action not added: {}", err),
            }
        }
        info!("Registry reloaded with {} actions", added);
        added
    }

    pub fn on_key_pressed(&mut self, code: InputCode, duration: f32) {
        self.tracker.on_key_pressed(code, duration);
    }

    /// Forward a release to the tracker, remembering the final hold for the
    /// next release evaluation.
    pub fn on_key_released(&mut self, code: InputCode) {
        if let Some(held) = self.tracker.unfiltered_duration(code) {
            match self.released_keys.iter_mut().find(|(k, _)| *k == code) {
                Some(entry) => entry.1 = held,
                None => self.released_keys.push((code, held)),
            }
        }
        self.tracker.on_key_released(code);
    }

    /// The executor finished the action that set the latch.
    pub fn on_action_completed(&mut self) {
        self.tracker.set_action_queued(false);
    }

    /// Drop all held state, e.g. when a menu takes focus.
    pub fn reset_input(&mut self) {
        self.tracker.clear_pressed_keys();
        self.tracker.clear_filter_keys();
        self.released_keys.clear();
    }

    pub fn pending_releases(&self) -> &[(InputCode, f32)] {
        &self.released_keys
    }

    /// Pick at most one action for the current input state and perform it.
    ///
    /// Held actions (`triggers_on_release == false`) are matched against the
    /// filtered press map. Release actions are matched against keys released
    /// since the previous release evaluation; that buffer is drained by every
    /// release evaluation.
    pub fn evaluate_and_perform_actions<R, E>(
        &mut self,
        triggers_on_release: bool,
        resolver: &mut R,
        executor: &mut E,
    ) -> EvaluationOutcome
    where
        R: TargetResolver + ?Sized,
        E: ActionExecutor + ?Sized,
    {
        let released = if triggers_on_release {
            std::mem::take(&mut self.released_keys)
        } else {
            Vec::new()
        };

        if self.tracker.is_action_queued() {
            trace!("Evaluation skipped, action in flight");
            return EvaluationOutcome::Skipped;
        }

        let winner = self
            .registry
            .iter()
            .filter(|action| action.triggers_on_release == triggers_on_release)
            .find_map(|action| {
                let (trigger, held_for) = if triggers_on_release {
                    first_satisfied(action, |code| {
                        released
                            .iter()
                            .find(|(released, _)| *released == code)
                            .map(|(_, held)| *held)
                    })
                } else {
                    first_satisfied(action, |code| self.tracker.pressed_duration(code))
                }?;
                Some((action.clone(), trigger, held_for))
            });

        let Some((action, trigger, held_for)) = winner else {
            return EvaluationOutcome::NoMatch;
        };
        self.perform(action, trigger, held_for, resolver, executor)
    }

    fn perform<R, E>(
        &mut self,
        action: Action,
        trigger: InputCode,
        held_for: f32,
        resolver: &mut R,
        executor: &mut E,
    ) -> EvaluationOutcome
    where
        R: TargetResolver + ?Sized,
        E: ActionExecutor + ?Sized,
    {
        // registration guarantees a form
        let Some(form) = action.action_or_idle else {
            return EvaluationOutcome::NoMatch;
        };
        let target = match TargetQuery::for_action(&action, self.keyword_policy) {
            Some(query) => match resolver.resolve(&query) {
                Some(target) => PairedTarget::Found(target),
                None => {
                    debug!(
                        "No paired target within {} ({:?})",
                        query.distance, query.mode
                    );
                    PairedTarget::NotFound
                }
            },
            None => PairedTarget::NotSearched,
        };
        let request = ExecutionRequest::new(form, action.action_assoc_idle, target);
        let result = executor.perform(&request);

        if !action.triggers_on_release {
            self.tracker.on_post_press_action(trigger);
        }

        let fired = FiredAction {
            action,
            trigger,
            held_for,
            request,
        };
        match result {
            Ok(()) => {
                self.tracker.set_action_queued(true);
                info!(
                    "Fired {} on key {} after {:.2}s",
                    fired.request.form, trigger, held_for
                );
                EvaluationOutcome::Fired(fired)
            }
            Err(err) => {
                warn!("Failed to perform {}: {}", fired.request.form, err);
                EvaluationOutcome::ExecutionFailed {
                    fired,
                    error: err.to_string(),
                }
            }
        }
    }
}

/// First bound code (keyboard, then gamepad) held at least `press_duration`.
fn first_satisfied(
    action: &Action,
    held: impl Fn(InputCode) -> Option<f32>,
) -> Option<(InputCode, f32)> {
    action.bound_codes().find_map(|code| {
        held(code)
            .filter(|&duration| duration >= action.press_duration)
            .map(|duration| (code, duration))
    })
}
