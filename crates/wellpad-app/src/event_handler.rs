//! Translation of winit window events into editor input.

use kurbo::{Point, Vec2};
use wellpad_core::{EditorAction, Key, Modifiers, PointerButton, SiteEditor};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key as WinitKey, ModifiersState, NamedKey};

/// Pixels scrolled per wheel line.
pub const LINE_SCROLL_PX: f64 = 40.0;

/// Map a winit logical key to an editor key. Characters are lowercased.
pub fn map_key(key: &WinitKey) -> Option<Key> {
    match key {
        WinitKey::Named(NamedKey::Space) => Some(Key::Space),
        WinitKey::Named(NamedKey::Escape) => Some(Key::Escape),
        WinitKey::Named(NamedKey::Enter) => Some(Key::Enter),
        WinitKey::Named(NamedKey::Tab) => Some(Key::Tab),
        WinitKey::Named(NamedKey::Delete) => Some(Key::Delete),
        WinitKey::Named(NamedKey::Backspace) => Some(Key::Backspace),
        WinitKey::Character(text) => {
            let mut chars = text.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            if c == ' ' {
                return Some(Key::Space);
            }
            c.to_lowercase().next().map(Key::Char)
        }
        _ => None,
    }
}

pub fn map_modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        ctrl: state.control_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

pub fn map_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// Scroll delta in logical pixels, positive y when scrolling up.
pub fn wheel_delta(delta: MouseScrollDelta, scale_factor: f64) -> Vec2 {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => Vec2::new(x as f64 * LINE_SCROLL_PX, y as f64 * LINE_SCROLL_PX),
        MouseScrollDelta::PixelDelta(pos) => Vec2::new(pos.x / scale_factor, pos.y / scale_factor),
    }
}

/// Tracks pointer and modifier state between winit events and forwards
/// canvas input to the editor in logical coordinates.
#[derive(Debug, Clone)]
pub struct EventHandler {
    cursor: Point,
    modifiers: Modifiers,
    scale_factor: f64,
}

impl EventHandler {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            cursor: Point::ZERO,
            modifiers: Modifiers::NONE,
            scale_factor,
        }
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    /// Forward `event` to the editor.
    ///
    /// Presses over UI panels stay with egui, but an open gesture keeps
    /// receiving moves and releases wherever the pointer goes.
    pub fn handle_window_event(
        &mut self,
        editor: &mut SiteEditor,
        event: &WindowEvent,
        ui_wants_pointer: bool,
        ui_wants_keyboard: bool,
    ) -> Vec<EditorAction> {
        let pointer_free = !ui_wants_pointer || editor.is_capturing();
        match event {
            WindowEvent::ModifiersChanged(state) => {
                self.modifiers = map_modifiers(state.state());
                editor.set_modifiers(self.modifiers);
                Vec::new()
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Point::new(position.x / self.scale_factor, position.y / self.scale_factor);
                if pointer_free {
                    editor.pointer_move(self.cursor)
                } else {
                    Vec::new()
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = map_button(*button) else {
                    return Vec::new();
                };
                match state {
                    ElementState::Pressed if !ui_wants_pointer => {
                        editor.pointer_down(self.cursor, button, self.modifiers)
                    }
                    ElementState::Pressed => Vec::new(),
                    ElementState::Released => editor.pointer_up(self.cursor, button),
                }
            }
            WindowEvent::MouseWheel { delta, .. } if pointer_free => {
                editor.wheel(self.cursor, wheel_delta(*delta, self.scale_factor), self.modifiers)
            }
            WindowEvent::CursorLeft { .. } => editor.pointer_left(),
            WindowEvent::Focused(false) => editor.focus_lost(),
            WindowEvent::KeyboardInput { event, .. } => {
                let Some(key) = map_key(&event.logical_key) else {
                    return Vec::new();
                };
                match event.state {
                    // Releases always pass so a held Space cannot get stuck.
                    ElementState::Released => editor.key_up(key),
                    ElementState::Pressed if ui_wants_keyboard => Vec::new(),
                    ElementState::Pressed => editor.key_down(key, self.modifiers, event.repeat),
                }
            }
            _ => Vec::new(),
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_map_key_lowercases() {
        assert_eq!(map_key(&WinitKey::Character("V".into())), Some(Key::Char('v')));
        assert_eq!(map_key(&WinitKey::Character("a".into())), Some(Key::Char('a')));
        assert_eq!(map_key(&WinitKey::Character(" ".into())), Some(Key::Space));
        assert_eq!(map_key(&WinitKey::Named(NamedKey::Space)), Some(Key::Space));
        assert_eq!(map_key(&WinitKey::Named(NamedKey::Tab)), Some(Key::Tab));
        assert_eq!(map_key(&WinitKey::Named(NamedKey::F1)), None);
        assert_eq!(map_key(&WinitKey::Character("ab".into())), None);
    }

    #[test]
    fn test_map_modifiers() {
        let mods = map_modifiers(ModifiersState::CONTROL | ModifiersState::SHIFT);
        assert!(mods.ctrl && mods.shift && !mods.alt && !mods.meta);
        assert!(mods.command());
    }

    #[test]
    fn test_wheel_delta() {
        assert_eq!(wheel_delta(MouseScrollDelta::LineDelta(0.0, 1.0), 2.0), Vec2::new(0.0, LINE_SCROLL_PX));
        assert_eq!(
            wheel_delta(MouseScrollDelta::PixelDelta(PhysicalPosition::new(10.0, -20.0)), 2.0),
            Vec2::new(5.0, -10.0)
        );
    }

    #[test]
    fn test_map_button() {
        assert_eq!(map_button(MouseButton::Middle), Some(PointerButton::Middle));
        assert_eq!(map_button(MouseButton::Back), None);
    }
}
