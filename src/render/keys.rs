//! Terminal key translation
//!
//! Maps crossterm key events onto [`InputEvent`]s. Terminals that report key
//! releases get exact holds. Classic terminals only send presses (OS key
//! repeat shows up as repeated presses), so a held control is released
//! synthetically once no press has refreshed it for `HOLD_WINDOW`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::input::{Control, InputEvent};

/// How long a press keeps a control held without a refresh. Longer than the
/// usual OS repeat interval, shorter than a deliberate tap-pause-tap.
pub const HOLD_WINDOW: Duration = Duration::from_millis(250);

/// Physical key binding
pub fn control_for(code: KeyCode) -> Option<Control> {
    match code {
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' => Some(Control::RotateLeft),
            'd' => Some(Control::RotateRight),
            ' ' => Some(Control::Thrust),
            'j' => Some(Control::FireSmall),
            'k' => Some(Control::FireLarge),
            'q' => Some(Control::Quit),
            'y' => Some(Control::Yes),
            'n' => Some(Control::No),
            _ => None,
        },
        KeyCode::Left => Some(Control::RotateLeft),
        KeyCode::Right => Some(Control::RotateRight),
        KeyCode::Up => Some(Control::Thrust),
        KeyCode::Enter => Some(Control::Confirm),
        KeyCode::Esc => Some(Control::Cancel),
        _ => None,
    }
}

/// Controls that stay down between key events
fn is_holdable(control: Control) -> bool {
    matches!(
        control,
        Control::RotateLeft | Control::RotateRight | Control::Thrust | Control::FireSmall | Control::FireLarge
    )
}

/// What a key event asks of the process, beyond game input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Input(Vec<InputEvent>),
    /// Ctrl+C
    Interrupt,
}

/// Stateful key-to-input translator
#[derive(Debug, Default)]
pub struct KeyTranslator {
    /// Terminal reports releases; no synthetic releases needed
    release_events: bool,
    last_seen: HashMap<Control, Instant>,
}

impl KeyTranslator {
    pub fn new(release_events: bool) -> Self {
        Self {
            release_events,
            last_seen: HashMap::new(),
        }
    }

    pub fn translate(&mut self, key: KeyEvent, now: Instant) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c' | 'C')) {
            return KeyAction::Interrupt;
        }

        let control = control_for(key.code);
        let mut events = Vec::new();
        match key.kind {
            KeyEventKind::Press => {
                if let Some(control) = control {
                    if is_holdable(control) {
                        self.last_seen.insert(control, now);
                    }
                    events.push(InputEvent::Press(control));
                }
                match key.code {
                    KeyCode::Char(c) if c.is_ascii_alphabetic() => events.push(InputEvent::Char(c)),
                    KeyCode::Backspace => events.push(InputEvent::Backspace),
                    _ => {}
                }
            }
            KeyEventKind::Repeat => {
                if let Some(control) = control.filter(|&c| is_holdable(c)) {
                    self.last_seen.insert(control, now);
                }
            }
            KeyEventKind::Release => {
                if let Some(control) = control.filter(|&c| is_holdable(c)) {
                    self.last_seen.remove(&control);
                    events.push(InputEvent::Release(control));
                }
            }
        }
        KeyAction::Input(events)
    }

    /// Synthetic releases for holds that went stale. No-op when the terminal
    /// reports real releases.
    pub fn expire(&mut self, now: Instant) -> Vec<InputEvent> {
        if self.release_events {
            return Vec::new();
        }
        let mut released = Vec::new();
        self.last_seen.retain(|&control, &mut seen| {
            let live = now.saturating_duration_since(seen) <= HOLD_WINDOW;
            if !live {
                released.push(InputEvent::Release(control));
            }
            live
        });
        released
    }
}
