//! Library symbol placed from the palette.

use super::EntityId;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Position, size and rotation of a placed symbol.
///
/// `x`/`y` is the symbol's center in world coordinates; `rotation` is in
/// degrees, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymbolTransform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl SymbolTransform {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Local-to-world transform; local origin is the symbol center.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.center().to_vec2()) * Affine::rotate(self.rotation.to_radians())
    }

    /// Convert a world point into the symbol's unrotated local frame.
    pub fn to_local(&self, world: Point) -> Point {
        self.affine().inverse() * world
    }

    /// Clamp width and height to at least `min_size`.
    pub fn clamped(mut self, min_size: f64) -> Self {
        self.width = self.width.max(min_size);
        self.height = self.height.max(min_size);
        self
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.rotation.is_finite()
    }

    /// Axis-aligned bounds of the rotated rectangle.
    pub fn bounds(&self) -> Rect {
        let half = Vec2::new(self.width / 2.0, self.height / 2.0);
        let local = Rect::new(-half.x, -half.y, half.x, half.y);
        self.affine().transform_rect_bbox(local)
    }
}

/// A symbol dropped onto the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarySymbol {
    #[serde(skip, default = "Uuid::new_v4")]
    pub(crate) id: EntityId,
    /// Palette key the symbol came from.
    pub key: String,
    /// Image source path.
    pub src: String,
    #[serde(flatten)]
    pub transform: SymbolTransform,
}

impl LibrarySymbol {
    pub fn new(key: impl Into<String>, src: impl Into<String>, transform: SymbolTransform) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            src: src.into(),
            transform,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.transform.center()
    }

    /// Hit test in the symbol's rotated frame.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = self.transform.to_local(point);
        local.x.abs() <= self.transform.width / 2.0 + tolerance
            && local.y.abs() <= self.transform.height / 2.0 + tolerance
    }

    pub fn bounds(&self) -> Rect {
        self.transform.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(rotation: f64) -> LibrarySymbol {
        LibrarySymbol::new(
            "tank",
            "symbols/tank.png",
            SymbolTransform { x: 100.0, y: 100.0, width: 80.0, height: 20.0, rotation },
        )
    }

    #[test]
    fn test_hit_test_unrotated() {
        let s = symbol(0.0);
        assert!(s.hit_test(Point::new(135.0, 105.0), 0.0));
        assert!(!s.hit_test(Point::new(100.0, 125.0), 0.0));
    }

    #[test]
    fn test_hit_test_rotated() {
        let s = symbol(90.0);
        // Long axis is now vertical.
        assert!(s.hit_test(Point::new(100.0, 135.0), 0.0));
        assert!(!s.hit_test(Point::new(135.0, 100.0), 0.0));
    }

    #[test]
    fn test_bounds_rotated() {
        let bounds = symbol(90.0).bounds();
        assert!((bounds.width() - 20.0).abs() < 1e-9);
        assert!((bounds.height() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamped() {
        let t = SymbolTransform { x: 0.0, y: 0.0, width: 5.0, height: -3.0, rotation: 0.0 }.clamped(32.0);
        assert!((t.width - 32.0).abs() < f64::EPSILON);
        assert!((t.height - 32.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_is_flat() {
        let value = serde_json::to_value(symbol(0.0)).unwrap();
        assert_eq!(value["key"], "tank");
        assert_eq!(value["width"], 80.0);
        assert!(value.get("transform").is_none());
    }
}
