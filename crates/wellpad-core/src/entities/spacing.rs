//! Inter-well spacing readout.

use super::{LengthUnit, format_length};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Distance above the link midpoint at which the readout is drawn.
pub const SPACING_LABEL_OFFSET: f64 = 16.0;
/// Size of the clickable spacing readout.
pub const SPACING_LABEL_SIZE: Size = Size::new(72.0, 22.0);

/// Distance between well `i` and well `i + 1`, as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Spacing {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    /// Readout text, e.g. `20 ft`.
    pub fn label(&self) -> String {
        format_length(self.value, self.unit)
    }

    /// Readout anchor for the link between `a` and `b`.
    pub fn anchor_between(a: Point, b: Point) -> Point {
        let mid = a.midpoint(b);
        Point::new(mid.x, mid.y - SPACING_LABEL_OFFSET)
    }
}

impl Default for Spacing {
    fn default() -> Self {
        Self::new(20.0, LengthUnit::Feet)
    }
}
