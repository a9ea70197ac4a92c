//! Input handling.
//!
//! Windowing and raw key events stay outside the client. This module turns
//! key presses and releases into the per-tick `MoveIntent`.

use shoreline_shared::world::MoveIntent;

/// Keys the game responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    A,
    D,
    Other,
}

impl Key {
    fn direction(self) -> Option<MoveIntent> {
        match self {
            Key::ArrowLeft | Key::A => Some(MoveIntent::Left),
            Key::ArrowRight | Key::D => Some(MoveIntent::Right),
            Key::Other => None,
        }
    }
}

/// Held-direction state.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    intent: MoveIntent,
}

impl InputState {
    /// The most recently pressed direction wins.
    pub fn key_down(&mut self, key: Key) {
        if let Some(dir) = key.direction() {
            self.intent = dir;
        }
    }

    /// Releasing a key only stops movement in that key's direction.
    pub fn key_up(&mut self, key: Key) {
        if key.direction() == Some(self.intent) {
            self.intent = MoveIntent::Idle;
        }
    }

    pub fn intent(&self) -> MoveIntent {
        self.intent
    }
}
