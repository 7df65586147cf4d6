//! Platform abstraction layer
//!
//! The simulation reads input through `InputSource` only:
//! - `is_pressed` for held keys (movement, auto-fire)
//! - `consume_key_press` for edge-triggered actions, true once per press
//!
//! `KeyState` is the in-memory implementation used by the native runner and
//! tests; a windowing backend feeds it press/release events.

use std::collections::HashSet;

use crate::sim::player::PlayerSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Fire,
}

/// Key as the game sees it, independent of the physical binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    Player(PlayerSlot, Action),
    Pause,
    /// Advance one frame while paused
    Step,
}

pub trait InputSource {
    fn is_pressed(&self, key: LogicalKey) -> bool;

    /// True at most once per physical press
    fn consume_key_press(&mut self, key: LogicalKey) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<LogicalKey>,
    /// Pressed since the last consume
    fresh: HashSet<LogicalKey>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: LogicalKey) {
        // Auto-repeat while held is not a new press
        if self.held.insert(key) {
            self.fresh.insert(key);
        }
    }

    pub fn release(&mut self, key: LogicalKey) {
        self.held.remove(&key);
    }

    pub fn release_all(&mut self) {
        self.held.clear();
        self.fresh.clear();
    }
}

impl InputSource for KeyState {
    fn is_pressed(&self, key: LogicalKey) -> bool {
        self.held.contains(&key)
    }

    fn consume_key_press(&mut self, key: LogicalKey) -> bool {
        self.fresh.remove(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRE: LogicalKey = LogicalKey::Player(PlayerSlot::One, Action::Fire);

    #[test]
    fn test_press_consumed_once() {
        let mut keys = KeyState::new();
        keys.press(FIRE);
        assert!(keys.consume_key_press(FIRE));
        assert!(!keys.consume_key_press(FIRE));
        assert!(keys.is_pressed(FIRE));
    }

    #[test]
    fn test_repeat_while_held_is_not_a_new_press() {
        let mut keys = KeyState::new();
        keys.press(FIRE);
        assert!(keys.consume_key_press(FIRE));
        keys.press(FIRE);
        assert!(!keys.consume_key_press(FIRE));

        keys.release(FIRE);
        assert!(!keys.is_pressed(FIRE));
        keys.press(FIRE);
        assert!(keys.consume_key_press(FIRE));
    }

    #[test]
    fn test_players_are_separate() {
        let mut keys = KeyState::new();
        keys.press(LogicalKey::Player(PlayerSlot::Two, Action::Left));
        assert!(!keys.is_pressed(LogicalKey::Player(PlayerSlot::One, Action::Left)));
        assert!(keys.is_pressed(LogicalKey::Player(PlayerSlot::Two, Action::Left)));
    }
}
