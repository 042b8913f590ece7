//! North arrow marker.

use crate::snap::normalize_degrees;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Grab radius of the marker in world units.
pub const ORIENTATION_HIT_RADIUS: f64 = 28.0;

/// The single orientation marker. `angle` is in degrees, clockwise from up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationMarker {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub angle: f64,
}

impl Default for OrientationMarker {
    fn default() -> Self {
        Self {
            x: 60.0,
            y: 60.0,
            angle: 0.0,
        }
    }
}

impl OrientationMarker {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position().distance(point) <= ORIENTATION_HIT_RADIUS + tolerance
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(
            self.position(),
            (ORIENTATION_HIT_RADIUS * 2.0, ORIENTATION_HIT_RADIUS * 2.0),
        )
    }

    /// Angle that makes the arrow point from the marker toward `target`.
    pub fn angle_towards(&self, target: Point) -> f64 {
        let d = target - self.position();
        normalize_degrees(d.y.atan2(d.x).to_degrees() + 90.0)
    }
}
