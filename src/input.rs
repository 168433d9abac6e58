//! Per-tick input state
//!
//! The simulation never reads the keyboard. The host samples whatever device it
//! owns, folds it into an [`InputState`] and hands that value to each tick.

use serde::{Deserialize, Serialize};

/// A gameplay control the actor responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    Left,
    Right,
    Up,
    Down,
    Jump,
}

impl Control {
    const fn bit(self) -> u8 {
        match self {
            Control::Left => 1 << 0,
            Control::Right => 1 << 1,
            Control::Up => 1 << 2,
            Control::Down => 1 << 3,
            Control::Jump => 1 << 4,
        }
    }
}

/// Set of controls currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    held: u8,
}

impl InputState {
    /// Nothing held
    pub const NONE: InputState = InputState { held: 0 };

    /// Build from a list of held controls
    pub fn holding(controls: &[Control]) -> Self {
        let mut state = Self::NONE;
        for &control in controls {
            state.press(control);
        }
        state
    }

    pub fn press(&mut self, control: Control) {
        self.held |= control.bit();
    }

    pub fn release(&mut self, control: Control) {
        self.held &= !control.bit();
    }

    /// True if any of `controls` is held
    pub fn is_down(&self, controls: &[Control]) -> bool {
        controls.iter().any(|c| self.held & c.bit() != 0)
    }
}

/// Host key code to control mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub bindings: Vec<(String, Control)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let pairs = [
            ("ArrowLeft", Control::Left),
            ("KeyA", Control::Left),
            ("ArrowRight", Control::Right),
            ("KeyD", Control::Right),
            ("ArrowUp", Control::Up),
            ("ArrowDown", Control::Down),
            ("Space", Control::Jump),
            ("KeyZ", Control::Jump),
        ];
        Self {
            bindings: pairs
                .iter()
                .map(|(code, control)| (code.to_string(), *control))
                .collect(),
        }
    }
}

impl KeyBindings {
    /// Control bound to a key code, if any
    pub fn control_for(&self, code: &str) -> Option<Control> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == code)
            .map(|(_, control)| *control)
    }

    /// Fold the host's held key codes into an input state
    pub fn sample<'a>(&self, held_codes: impl IntoIterator<Item = &'a str>) -> InputState {
        let mut state = InputState::NONE;
        for code in held_codes {
            if let Some(control) = self.control_for(code) {
                state.press(control);
            }
        }
        state
    }
}
