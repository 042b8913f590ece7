//! Floating editors anchored to world points: the numeric overlay for
//! heights and spacings, and inline well renaming.
//!
//! Controllers only hold the pending text. Committing hands the parsed value
//! back to the caller, which applies it to the document; discarding drops it.

use crate::entities::{EntityId, LengthUnit};
use crate::input::Key;
use crate::viewport::Viewport;
use kurbo::Point;

/// What the numeric overlay edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTarget {
    /// Spacing between wells `i` and `i + 1`.
    Spacing(usize),
    /// Height of the well at index `i`.
    Height(usize),
}

/// The live numeric edit.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEdit {
    pub target: OverlayTarget,
    /// Anchor of the edited readout in world coordinates.
    pub anchor: Point,
    /// Text in the input field.
    pub text: String,
    pub unit: LengthUnit,
    /// Screen position computed when the overlay was opened.
    pub screen_position: Point,
}

impl OverlayEdit {
    /// Current screen position of the anchor.
    pub fn screen_position(&self, viewport: &Viewport) -> Point {
        viewport.world_to_screen(self.anchor)
    }
}

/// A value ready to be written to the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayCommit {
    pub target: OverlayTarget,
    pub value: f64,
    pub unit: LengthUnit,
}

/// What a key press did to a live editor.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome<T> {
    /// Enter or Tab: the edit closed and produced a value (None if the text
    /// was not valid).
    Committed(Option<T>),
    /// Escape: the edit closed without a value.
    Discarded,
    /// No live edit, or a key the editor leaves to the text field.
    Ignored,
}

/// Parse overlay text as a finite number.
pub fn parse_value(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Manages the single numeric overlay.
#[derive(Debug, Clone, Default)]
pub struct OverlayController {
    live: Option<OverlayEdit>,
}

impl OverlayController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the overlay for `target`. The screen position is computed from
    /// `viewport` now. Any edit already open is committed first and its
    /// result returned.
    pub fn open(
        &mut self,
        target: OverlayTarget,
        anchor: Point,
        value: f64,
        unit: LengthUnit,
        viewport: &Viewport,
    ) -> Option<OverlayCommit> {
        let previous = self.commit();
        self.live = Some(OverlayEdit {
            target,
            anchor,
            text: format_value(value),
            unit,
            screen_position: viewport.world_to_screen(anchor),
        });
        previous
    }

    pub fn live(&self) -> Option<&OverlayEdit> {
        self.live.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.live.is_some()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        if let Some(edit) = &mut self.live {
            edit.text = text.into();
        }
    }

    pub fn set_unit(&mut self, unit: LengthUnit) {
        if let Some(edit) = &mut self.live {
            edit.unit = unit;
        }
    }

    /// Close and return the parsed value. Invalid text commits nothing.
    pub fn commit(&mut self) -> Option<OverlayCommit> {
        let edit = self.live.take()?;
        match parse_value(&edit.text) {
            Some(value) => Some(OverlayCommit {
                target: edit.target,
                value,
                unit: edit.unit,
            }),
            None => {
                log::warn!("Ignoring non-numeric overlay input {:?}", edit.text);
                None
            }
        }
    }

    /// Close without producing a value.
    pub fn discard(&mut self) {
        self.live = None;
    }

    /// Enter and Tab commit, Escape discards. Tab is consumed here so focus
    /// does not move before the value is captured.
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome<OverlayCommit> {
        if self.live.is_none() {
            return KeyOutcome::Ignored;
        }
        match key {
            Key::Enter | Key::Tab => KeyOutcome::Committed(self.commit()),
            Key::Escape => {
                self.discard();
                KeyOutcome::Discarded
            }
            _ => KeyOutcome::Ignored,
        }
    }
}

/// Text shown when an overlay opens.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// The live inline rename.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameEdit {
    pub well: EntityId,
    pub anchor: Point,
    pub text: String,
}

/// Manages inline well renaming; same commit/discard contract as the overlay.
#[derive(Debug, Clone, Default)]
pub struct RenameController {
    live: Option<RenameEdit>,
}

impl RenameController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start renaming; an open rename is committed first and returned.
    pub fn open(&mut self, well: EntityId, anchor: Point, current: &str) -> Option<(EntityId, String)> {
        let previous = self.commit();
        self.live = Some(RenameEdit {
            well,
            anchor,
            text: current.to_string(),
        });
        previous
    }

    pub fn live(&self) -> Option<&RenameEdit> {
        self.live.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.live.is_some()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        if let Some(edit) = &mut self.live {
            edit.text = text.into();
        }
    }

    pub fn commit(&mut self) -> Option<(EntityId, String)> {
        self.live.take().map(|edit| (edit.well, edit.text))
    }

    pub fn discard(&mut self) {
        self.live = None;
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome<(EntityId, String)> {
        if self.live.is_none() {
            return KeyOutcome::Ignored;
        }
        match key {
            Key::Enter | Key::Tab => KeyOutcome::Committed(self.commit()),
            Key::Escape => {
                self.discard();
                KeyOutcome::Discarded
            }
            _ => KeyOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    fn open(controller: &mut OverlayController, viewport: &Viewport) {
        controller.open(
            OverlayTarget::Height(1),
            Point::new(100.0, 50.0),
            0.0,
            LengthUnit::Inches,
            viewport,
        );
    }

    #[test]
    fn test_open_positions_from_viewport() {
        let mut viewport = Viewport::new();
        viewport.zoom = 2.0;
        viewport.pan = Vec2::new(10.0, 20.0);
        let mut controller = OverlayController::new();
        open(&mut controller, &viewport);
        let edit = controller.live().cloned();
        assert_eq!(edit.as_ref().map(|e| e.screen_position), Some(Point::new(210.0, 120.0)));
        assert_eq!(edit.as_ref().map(|e| e.text.as_str()), Some("0"));

        // Reopening after a pan recomputes the position.
        viewport.pan = Vec2::ZERO;
        controller.discard();
        open(&mut controller, &viewport);
        assert_eq!(controller.live().map(|e| e.screen_position), Some(Point::new(200.0, 100.0)));
    }

    #[test]
    fn test_enter_commits_parsed_value() {
        let mut controller = OverlayController::new();
        open(&mut controller, &Viewport::new());
        controller.set_text(" 36 ");
        controller.set_unit(LengthUnit::Feet);
        assert_eq!(
            controller.handle_key(Key::Enter),
            KeyOutcome::Committed(Some(OverlayCommit {
                target: OverlayTarget::Height(1),
                value: 36.0,
                unit: LengthUnit::Feet,
            }))
        );
        assert!(!controller.is_open());
    }

    #[test]
    fn test_escape_discards() {
        let mut controller = OverlayController::new();
        open(&mut controller, &Viewport::new());
        controller.set_text("36");
        assert_eq!(controller.handle_key(Key::Escape), KeyOutcome::Discarded);
        assert!(controller.commit().is_none());
    }

    #[test]
    fn test_tab_commits_and_is_consumed() {
        let mut controller = OverlayController::new();
        open(&mut controller, &Viewport::new());
        controller.set_text("12.5");
        assert!(matches!(controller.handle_key(Key::Tab), KeyOutcome::Committed(Some(_))));
    }

    #[test]
    fn test_invalid_text_commits_nothing() {
        let mut controller = OverlayController::new();
        open(&mut controller, &Viewport::new());
        controller.set_text("abc");
        assert_eq!(controller.handle_key(Key::Enter), KeyOutcome::Committed(None));
        assert_eq!(parse_value("inf"), None);
    }

    #[test]
    fn test_keys_without_live_edit_are_ignored() {
        let mut controller = OverlayController::new();
        assert_eq!(controller.handle_key(Key::Enter), KeyOutcome::Ignored);
        assert!(controller.commit().is_none());
    }

    #[test]
    fn test_opening_second_overlay_commits_first() {
        let viewport = Viewport::new();
        let mut controller = OverlayController::new();
        open(&mut controller, &viewport);
        controller.set_text("7");
        let previous = controller.open(OverlayTarget::Spacing(0), Point::ZERO, 20.0, LengthUnit::Feet, &viewport);
        assert_eq!(previous.map(|c| c.value), Some(7.0));
        assert_eq!(controller.live().map(|e| e.target), Some(OverlayTarget::Spacing(0)));
    }

    #[test]
    fn test_rename_commit_and_discard() {
        let id = uuid::Uuid::new_v4();
        let mut rename = RenameController::new();
        rename.open(id, Point::ZERO, "Well 1");
        rename.set_text("Pad A");
        assert_eq!(rename.handle_key(Key::Enter), KeyOutcome::Committed(Some((id, "Pad A".to_string()))));

        rename.open(id, Point::ZERO, "Pad A");
        rename.set_text("x");
        assert_eq!(rename.handle_key(Key::Escape), KeyOutcome::Discarded);
        assert!(!rename.is_open());
    }
}
