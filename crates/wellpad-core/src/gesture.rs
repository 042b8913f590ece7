//! Pointer gesture sessions.
//!
//! A gesture runs from pointer-down through any number of moves to
//! pointer-up. While a session is open the editor routes every pointer move
//! to it, regardless of what is under the cursor; the shell uses
//! [`GestureSession::is_capturing`] to keep delivering moves from outside the
//! canvas. Every exit path (release, focus loss, cursor leaving) goes through
//! [`GestureSession::finish`], which closes the session.

use crate::entities::{EntityId, SymbolTransform};
use crate::input::PointerButton;
use crate::selection::HandleKind;
use kurbo::{Point, Vec2};

/// How an orientation-marker drag behaves; fixed when the drag starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationMode {
    Moving,
    Rotating,
}

/// The gesture in progress and the context it was started with.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveGesture {
    /// Viewport pan; the anchor lives in the viewport.
    Pan,
    /// Dragging a well. `grab` is the well center minus the pointer (world).
    MoveWell { id: EntityId, grab: Vec2 },
    /// Dragging a symbol by its body.
    MoveSymbol { id: EntityId, grab: Vec2 },
    /// Dragging a resize or rotate handle. Applied to the document on release.
    TransformSymbol {
        id: EntityId,
        handle: HandleKind,
        original: SymbolTransform,
        preview: SymbolTransform,
    },
    /// Dragging the orientation marker.
    Orientation { mode: OrientationMode, grab: Vec2 },
}

/// A gesture that has ended, handed back for committing.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedGesture {
    pub gesture: ActiveGesture,
    /// Last pointer position seen, in screen coordinates.
    pub last_pointer: Point,
    /// Whether the pointer moved after pointer-down.
    pub moved: bool,
}

#[derive(Debug, Clone)]
struct Session {
    gesture: ActiveGesture,
    button: PointerButton,
    last_pointer: Point,
    moved: bool,
}

/// Holds at most one open gesture.
#[derive(Debug, Clone, Default)]
pub struct GestureSession {
    session: Option<Session>,
}

impl GestureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a gesture. Returns false (and changes nothing) if one is already open.
    pub fn begin(&mut self, gesture: ActiveGesture, button: PointerButton, pointer: Point) -> bool {
        if self.session.is_some() {
            return false;
        }
        log::debug!("Gesture started: {:?}", gesture);
        self.session = Some(Session {
            gesture,
            button,
            last_pointer: pointer,
            moved: false,
        });
        true
    }

    /// Whether pointer moves should be routed to the open gesture.
    pub fn is_capturing(&self) -> bool {
        self.session.is_some()
    }

    pub fn active(&self) -> Option<&ActiveGesture> {
        self.session.as_ref().map(|s| &s.gesture)
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveGesture> {
        self.session.as_mut().map(|s| &mut s.gesture)
    }

    /// The button that opened the gesture.
    pub fn button(&self) -> Option<PointerButton> {
        self.session.as_ref().map(|s| s.button)
    }

    /// Record a pointer move. Returns false when no gesture is open.
    pub fn track(&mut self, pointer: Point) -> bool {
        match &mut self.session {
            Some(session) => {
                if session.last_pointer != pointer {
                    session.moved = true;
                }
                session.last_pointer = pointer;
                true
            }
            None => false,
        }
    }

    /// Close the gesture and hand it back.
    pub fn finish(&mut self) -> Option<FinishedGesture> {
        let session = self.session.take()?;
        log::debug!("Gesture finished: {:?}", session.gesture);
        Some(FinishedGesture {
            gesture: session.gesture,
            last_pointer: session.last_pointer,
            moved: session.moved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_gesture_at_a_time() {
        let mut session = GestureSession::new();
        assert!(session.begin(ActiveGesture::Pan, PointerButton::Middle, Point::ZERO));
        assert!(!session.begin(
            ActiveGesture::Orientation { mode: OrientationMode::Moving, grab: Vec2::ZERO },
            PointerButton::Primary,
            Point::ZERO,
        ));
        assert_eq!(session.active(), Some(&ActiveGesture::Pan));
    }

    #[test]
    fn test_finish_releases_capture() {
        let mut session = GestureSession::new();
        session.begin(ActiveGesture::Pan, PointerButton::Primary, Point::ZERO);
        assert!(session.is_capturing());
        session.track(Point::new(5.0, 5.0));
        let finished = session.finish();
        assert!(!session.is_capturing());
        assert_eq!(finished.map(|f| (f.last_pointer, f.moved)), Some((Point::new(5.0, 5.0), true)));
        assert!(session.finish().is_none());
        assert!(!session.track(Point::ZERO));
    }

    #[test]
    fn test_click_without_move() {
        let mut session = GestureSession::new();
        session.begin(ActiveGesture::Pan, PointerButton::Primary, Point::new(3.0, 3.0));
        session.track(Point::new(3.0, 3.0));
        assert_eq!(session.finish().map(|f| f.moved), Some(false));
    }
}
