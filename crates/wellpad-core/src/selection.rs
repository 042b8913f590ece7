//! Selection handles for placed symbols.

use crate::entities::{LibrarySymbol, SymbolTransform};
use crate::snap::{ANGLE_SNAP_INCREMENT, normalize_degrees, snap_angle};
use kurbo::{Point, Vec2};

/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 10.0;
/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;
/// Distance from the symbol's top edge to the rotation handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET: f64 = 28.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Sign of the corner along each local axis.
    fn signs(self) -> Vec2 {
        match self {
            Corner::TopLeft => Vec2::new(-1.0, -1.0),
            Corner::TopRight => Vec2::new(1.0, -1.0),
            Corner::BottomLeft => Vec2::new(-1.0, 1.0),
            Corner::BottomRight => Vec2::new(1.0, 1.0),
        }
    }
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// Resize from a corner; the opposite corner stays put.
    Corner(Corner),
    /// Rotation handle (positioned above the top edge).
    Rotate,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in world coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in world coordinates) hits this handle.
    /// `tolerance` should be adjusted for viewport zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position.distance_squared(point) <= tolerance * tolerance
    }
}

/// Handles for a transform, with screen-constant offsets converted by `zoom`.
pub fn symbol_handles(transform: &SymbolTransform, zoom: f64) -> Vec<Handle> {
    let affine = transform.affine();
    let half_w = transform.width / 2.0;
    let half_h = transform.height / 2.0;
    let local = |dx: f64, dy: f64| affine * Point::new(dx, dy);

    let mut handles: Vec<Handle> = [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight]
        .into_iter()
        .map(|corner| {
            let s = corner.signs();
            Handle::new(local(s.x * half_w, s.y * half_h), HandleKind::Corner(corner))
        })
        .collect();
    handles.push(Handle::new(
        local(0.0, -half_h - ROTATE_HANDLE_OFFSET / zoom),
        HandleKind::Rotate,
    ));
    handles
}

/// Find which handle of `symbol` (if any) is hit at `point`.
pub fn hit_test_handles(symbol: &LibrarySymbol, point: Point, zoom: f64) -> Option<HandleKind> {
    let tolerance = HANDLE_HIT_TOLERANCE / zoom;
    symbol_handles(&symbol.transform, zoom)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.kind)
}

/// Compute the transform produced by dragging `handle` to `pointer` (world).
///
/// Corner drags keep the opposite corner fixed in the symbol's local frame and
/// never produce a size below `min_size`. Rotation follows the pointer around
/// the center, snapping to 15° when `snap_rotation` is set.
pub fn apply_handle_drag(
    original: &SymbolTransform,
    handle: HandleKind,
    pointer: Point,
    min_size: f64,
    snap_rotation: bool,
) -> SymbolTransform {
    match handle {
        HandleKind::Corner(corner) => {
            let s = corner.signs();
            let opposite = Point::new(-s.x * original.width / 2.0, -s.y * original.height / 2.0);
            let local = original.to_local(pointer);

            // Size along each axis, measured in the dragged corner's direction.
            let width = ((local.x - opposite.x) * s.x).max(min_size);
            let height = ((local.y - opposite.y) * s.y).max(min_size);
            let local_center = Point::new(opposite.x + s.x * width / 2.0, opposite.y + s.y * height / 2.0);
            let center = original.affine() * local_center;

            SymbolTransform {
                x: center.x,
                y: center.y,
                width,
                height,
                rotation: original.rotation,
            }
        }
        HandleKind::Rotate => {
            let d = pointer - original.center();
            if d.hypot2() < f64::EPSILON {
                return *original;
            }
            let angle = normalize_degrees(d.y.atan2(d.x).to_degrees() + 90.0);
            SymbolTransform {
                rotation: if snap_rotation { snap_angle(angle, ANGLE_SNAP_INCREMENT) } else { angle },
                ..*original
            }
        }
    }
}
