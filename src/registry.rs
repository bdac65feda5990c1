//! Ordered store of registered actions.
//!
//! Actions are kept sorted by descending priority. Within one priority the
//! order of registration is preserved, which is the tie-break the evaluation
//! engine relies on.

use crate::action::Action;
use crate::error::{KeyActionError, Result};

/// Registry of candidate actions, highest priority first.
#[derive(Debug, Default, Clone)]
pub struct ActionRegistry {
    actions: Vec<Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action, returning whether it was accepted.
    pub fn add_action(&mut self, action: Action) -> bool {
        self.try_add_action(action).is_ok()
    }

    /// Register an action, reporting why it was refused.
    ///
    /// # Errors
    /// * `NoBoundKeys` - neither keyboard nor gamepad codes are bound
    /// * `MissingActionOrIdle` - there is nothing to execute
    /// * `DuplicateAction` - a structurally equal action is already present
    pub fn try_add_action(&mut self, action: Action) -> Result<()> {
        if !action.has_bound_keys() {
            return Err(KeyActionError::NoBoundKeys);
        }
        if action.action_or_idle.is_none() {
            return Err(KeyActionError::MissingActionOrIdle);
        }
        if self.actions.contains(&action) {
            return Err(KeyActionError::DuplicateAction);
        }

        match self
            .actions
            .iter()
            .position(|existing| existing.priority < action.priority)
        {
            Some(index) => self.actions.insert(index, action),
            None => self.actions.push(action),
        }
        Ok(())
    }

    /// Drop every registered action.
    pub fn clear_actions(&mut self) {
        self.actions.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<'a> IntoIterator for &'a ActionRegistry {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::FormRef;

    fn bound(priority: i32, idle: u32) -> Action {
        Action::new(FormRef::idle(idle))
            .with_keys([30])
            .with_priority(priority)
    }

    fn priorities(registry: &ActionRegistry) -> Vec<i32> {
        registry.iter().map(|a| a.priority).collect()
    }

    #[test]
    fn rejects_action_without_keys() {
        let mut registry = ActionRegistry::new();
        let result = registry.try_add_action(Action::new(FormRef::idle(1)));
        assert!(matches!(result, Err(KeyActionError::NoBoundKeys)));
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_action_without_form() {
        let mut registry = ActionRegistry::new();
        let action = Action::default().with_gamepad_keys([4096]);
        assert!(!registry.add_action(action));
        assert!(registry.is_empty());
    }

    #[test]
    fn gamepad_keys_alone_are_enough() {
        let mut registry = ActionRegistry::new();
        let action = Action::new(FormRef::action(7)).with_gamepad_keys([4096]);
        assert!(registry.add_action(action));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut registry = ActionRegistry::new();
        assert!(registry.add_action(bound(1, 10)));
        let result = registry.try_add_action(bound(1, 10));
        assert!(matches!(result, Err(KeyActionError::DuplicateAction)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn priority_only_difference_is_not_a_duplicate() {
        let mut registry = ActionRegistry::new();
        assert!(registry.add_action(bound(1, 10)));
        assert!(registry.add_action(bound(2, 10)));
        assert_eq!(priorities(&registry), vec![2, 1]);
    }

    #[test]
    fn inserts_in_descending_priority() {
        let mut registry = ActionRegistry::new();
        for (priority, idle) in [(0, 1), (5, 2), (-3, 3), (5, 4), (2, 5)] {
            assert!(registry.add_action(bound(priority, idle)));
        }
        assert_eq!(priorities(&registry), vec![5, 5, 2, 0, -3]);

        // equal priorities keep registration order
        let fives: Vec<_> = registry
            .iter()
            .filter(|a| a.priority == 5)
            .filter_map(|a| a.action_or_idle)
            .collect();
        assert_eq!(fives, vec![FormRef::idle(2), FormRef::idle(4)]);
    }

    #[test]
    fn clear_actions_empties_registry() {
        let mut registry = ActionRegistry::new();
        registry.add_action(bound(1, 1));
        registry.add_action(bound(2, 2));
        registry.clear_actions();
        assert!(registry.is_empty());
        assert!(registry.add_action(bound(1, 1)));
    }
}
