//! Turns local key events into wire transitions.
//!
//! Terminal sessions deliver key events without releases, so a bound key
//! toggles: the first event produces `_DOWN`, the next one `_UP`. Unbound
//! keys produce nothing.

use shared::{binding_for, KeyTransition};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct InputManager {
    held: HashSet<char>,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
        }
    }

    /// Handles one key event, returning the transition to send, if any.
    pub fn toggle(&mut self, key: char) -> Option<KeyTransition> {
        let key = key.to_ascii_uppercase();
        binding_for(key)?;

        if self.held.remove(&key) {
            Some(KeyTransition::released(key))
        } else {
            self.held.insert(key);
            Some(KeyTransition::pressed(key))
        }
    }

    /// Releases everything still held, e.g. before disconnecting.
    pub fn release_all(&mut self) -> Vec<KeyTransition> {
        let mut released: Vec<char> = self.held.drain().collect();
        released.sort_unstable();
        released.into_iter().map(KeyTransition::released).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_key_toggles_down_then_up() {
        let mut input = InputManager::new();

        assert_eq!(input.toggle('w'), Some(KeyTransition::pressed('W')));
        assert_eq!(input.toggle('w'), Some(KeyTransition::released('W')));
        assert_eq!(input.toggle('W'), Some(KeyTransition::pressed('W')));
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut input = InputManager::new();
        assert_eq!(input.toggle('x'), None);
        assert!(input.release_all().is_empty());
    }

    #[test]
    fn test_release_all_covers_held_keys() {
        let mut input = InputManager::new();
        input.toggle('w');
        input.toggle('f');

        let released = input.release_all();
        assert_eq!(
            released,
            vec![KeyTransition::released('F'), KeyTransition::released('W')]
        );
        assert!(input.release_all().is_empty());
    }
}
