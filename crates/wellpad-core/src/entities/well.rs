//! Well marker entity.

use super::{EntityId, LengthUnit, centered_rect};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Radius of the well marker in world units.
pub const WELL_RADIUS: f64 = 18.0;
/// Vertical distance from the well center to the height readout.
pub const HEIGHT_LABEL_OFFSET: f64 = 36.0;
/// Size of the clickable height readout.
pub const HEIGHT_LABEL_SIZE: Size = Size::new(64.0, 20.0);
/// Vertical distance from the well center to the name label (above).
pub const NAME_LABEL_OFFSET: f64 = 34.0;

/// A wellhead placed on the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Well {
    #[serde(skip, default = "Uuid::new_v4")]
    pub(crate) id: EntityId,
    /// Center in world coordinates.
    pub x: f64,
    pub y: f64,
    pub name: String,
    #[serde(default)]
    pub height_value: f64,
    #[serde(default = "default_height_unit")]
    pub height_unit: LengthUnit,
}

fn default_height_unit() -> LengthUnit {
    LengthUnit::Inches
}

impl Well {
    /// Create a new well at `position`.
    pub fn new(position: Point, name: impl Into<String>, height_value: f64, height_unit: LengthUnit) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: position.x,
            y: position.y,
            name: name.into(),
            height_value,
            height_unit,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Whether `point` is on the marker, with `tolerance` in world units.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position().distance(point) <= WELL_RADIUS + tolerance
    }

    /// World anchor of the height readout (below the marker).
    pub fn height_anchor(&self) -> Point {
        Point::new(self.x, self.y + HEIGHT_LABEL_OFFSET)
    }

    /// World anchor of the name label (above the marker).
    pub fn name_anchor(&self) -> Point {
        Point::new(self.x, self.y - NAME_LABEL_OFFSET)
    }

    /// Whether `point` is on the height readout.
    pub fn hit_test_height_label(&self, point: Point, tolerance: f64) -> bool {
        centered_rect(self.height_anchor(), HEIGHT_LABEL_SIZE)
            .inflate(tolerance, tolerance)
            .contains(point)
    }

    /// Bounds including both labels.
    pub fn bounds(&self) -> Rect {
        let marker = Rect::from_center_size(self.position(), (WELL_RADIUS * 2.0, WELL_RADIUS * 2.0));
        marker
            .union(centered_rect(self.height_anchor(), HEIGHT_LABEL_SIZE))
            .union(centered_rect(self.name_anchor(), HEIGHT_LABEL_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_test() {
        let well = Well::new(Point::new(100.0, 100.0), "Well 1", 0.0, LengthUnit::Inches);
        assert!(well.hit_test(Point::new(110.0, 105.0), 0.0));
        assert!(!well.hit_test(Point::new(130.0, 100.0), 0.0));
        assert!(well.hit_test(Point::new(120.0, 100.0), 4.0));
    }

    #[test]
    fn test_height_label_hit() {
        let well = Well::new(Point::new(0.0, 0.0), "Well 1", 0.0, LengthUnit::Inches);
        assert!(well.hit_test_height_label(Point::new(10.0, HEIGHT_LABEL_OFFSET), 0.0));
        assert!(!well.hit_test_height_label(Point::new(0.0, 0.0), 0.0));
    }

    #[test]
    fn test_json_field_names() {
        let well = Well::new(Point::new(1.0, 2.0), "A", 36.0, LengthUnit::Inches);
        let value = serde_json::to_value(&well).unwrap();
        assert_eq!(value["heightValue"], 36.0);
        assert_eq!(value["heightUnit"], "in");
        assert!(value.get("id").is_none());
    }
}
