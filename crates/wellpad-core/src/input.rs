//! Input types and pointer state shared by the editor and the shell.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, ctrl: false, alt: false, meta: false };

    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::NONE }
    }

    pub fn shift() -> Self {
        Self { shift: true, ..Self::NONE }
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    Escape,
    Enter,
    Tab,
    Delete,
    Backspace,
    /// A printable key, lowercased.
    Char(char),
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Tracks pointer position, held buttons and clicks across events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last known pointer position in screen coordinates.
    pub pointer_position: Point,
    /// Current modifier keys state.
    pub modifiers: Modifiers,
    pressed_buttons: HashSet<PointerButton>,
    last_click: Option<(Instant, Point)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn pointer_moved(&mut self, position: Point) {
        self.pointer_position = position;
    }

    /// Record a button press. Returns true if this primary press completes a
    /// double-click.
    pub fn button_pressed(&mut self, button: PointerButton, position: Point) -> bool {
        self.button_pressed_at(button, position, Instant::now())
    }

    /// [`button_pressed`](Self::button_pressed) with an explicit timestamp.
    pub fn button_pressed_at(&mut self, button: PointerButton, position: Point, now: Instant) -> bool {
        self.pointer_position = position;
        self.pressed_buttons.insert(button);
        if button != PointerButton::Primary {
            return false;
        }

        match self.last_click {
            Some((time, pos))
                if now.duration_since(time) < DOUBLE_CLICK_TIME
                    && pos.distance(position) < DOUBLE_CLICK_DISTANCE =>
            {
                // Reset so a third click starts a new sequence.
                self.last_click = None;
                true
            }
            _ => {
                self.last_click = Some((now, position));
                false
            }
        }
    }

    pub fn button_released(&mut self, button: PointerButton, position: Point) {
        self.pointer_position = position;
        self.pressed_buttons.remove(&button);
    }

    pub fn is_button_pressed(&self, button: PointerButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Forget held buttons, e.g. after the window loses focus.
    pub fn release_all(&mut self) {
        self.pressed_buttons.clear();
        self.last_click = None;
    }
}
