//! Keyboard query interface and edge-triggered key latches

use serde::{Deserialize, Serialize};

/// Keys the game monitors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Start a game, resume after losing a ship, return to the title
    Start,
    /// Toggle sound
    Mute,
    Left,
    Right,
    Fire,
}

impl Key {
    pub const ALL: [Key; 5] = [Key::Start, Key::Mute, Key::Left, Key::Right, Key::Fire];

    fn index(self) -> usize {
        match self {
            Key::Start => 0,
            Key::Mute => 1,
            Key::Left => 2,
            Key::Right => 3,
            Key::Fire => 4,
        }
    }
}

/// Polled once per frame; no buffering or key repeat
pub trait InputState {
    fn is_key_down(&self, key: Key) -> bool;
}

/// Fires only on the frame a key goes from released to pressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeTrigger {
    was_down: bool,
}

impl EdgeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this frame's key state; returns true on a fresh press
    pub fn update(&mut self, down: bool) -> bool {
        let fired = down && !self.was_down;
        self.was_down = down;
        fired
    }

    /// Poll `key` from `input` and update the latch
    pub fn poll(&mut self, input: &dyn InputState, key: Key) -> bool {
        self.update(input.is_key_down(key))
    }

    /// Forget the previous frame (next press counts as fresh)
    pub fn reset(&mut self) {
        self.was_down = false;
    }

    pub fn is_held(&self) -> bool {
        self.was_down
    }
}

/// Plain held-keys snapshot, used by headless drivers and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardState {
    down: [bool; 5],
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot with the given keys held
    pub fn with(keys: &[Key]) -> Self {
        let mut state = Self::default();
        for &key in keys {
            state.press(key);
        }
        state
    }

    pub fn press(&mut self, key: Key) {
        self.down[key.index()] = true;
    }

    pub fn release(&mut self, key: Key) {
        self.down[key.index()] = false;
    }

    pub fn set(&mut self, key: Key, down: bool) {
        self.down[key.index()] = down;
    }

    pub fn release_all(&mut self) {
        self.down = [false; 5];
    }
}

impl InputState for KeyboardState {
    fn is_key_down(&self, key: Key) -> bool {
        self.down[key.index()]
    }
}
