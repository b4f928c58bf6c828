//! Logical controls and the held-control snapshot
//!
//! Frontends translate raw key events into [`InputEvent`]s; the game loop folds
//! them into an [`InputState`] that the simulation reads once per tick.

use serde::{Deserialize, Serialize};

/// A logical control, independent of the physical key bound to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    RotateLeft,
    RotateRight,
    Thrust,
    FireSmall,
    FireLarge,
    Confirm,
    Cancel,
    Quit,
    Yes,
    No,
}

/// A discrete input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Press(Control),
    Release(Control),
    /// Raw character, only meaningful during name entry
    Char(char),
    Backspace,
}

/// Controls currently held down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub thrust: bool,
    pub fire_small: bool,
    pub fire_large: bool,
}

impl InputState {
    /// Fold one event into the held set. Non-held controls are ignored.
    pub fn apply(&mut self, event: InputEvent) {
        let (control, down) = match event {
            InputEvent::Press(c) => (c, true),
            InputEvent::Release(c) => (c, false),
            InputEvent::Char(_) | InputEvent::Backspace => return,
        };
        match control {
            Control::RotateLeft => self.rotate_left = down,
            Control::RotateRight => self.rotate_right = down,
            Control::Thrust => self.thrust = down,
            Control::FireSmall => self.fire_small = down,
            Control::FireLarge => self.fire_large = down,
            _ => {}
        }
    }

    /// Release everything (used when a game starts or ends)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn any_fire(&self) -> bool {
        self.fire_small || self.fire_large
    }
}
