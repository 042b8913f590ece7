//! Site entities: wells, spacings, the orientation marker and placed symbols.

mod orientation;
mod spacing;
mod symbol;
mod well;

pub use orientation::{ORIENTATION_HIT_RADIUS, OrientationMarker};
pub use spacing::{SPACING_LABEL_OFFSET, SPACING_LABEL_SIZE, Spacing};
pub use symbol::{LibrarySymbol, SymbolTransform};
pub use well::{HEIGHT_LABEL_OFFSET, HEIGHT_LABEL_SIZE, NAME_LABEL_OFFSET, WELL_RADIUS, Well};

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for wells and placed symbols.
pub type EntityId = Uuid;

/// Display unit attached to a length value.
///
/// Units are labels only; values are never converted between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "in")]
    Inches,
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "cm")]
    Centimeters,
}

impl LengthUnit {
    /// All units, in the order the unit selector lists them.
    pub const ALL: [LengthUnit; 4] = [
        LengthUnit::Feet,
        LengthUnit::Inches,
        LengthUnit::Meters,
        LengthUnit::Centimeters,
    ];

    /// Short label used in readouts.
    pub fn label(self) -> &'static str {
        match self {
            LengthUnit::Feet => "ft",
            LengthUnit::Inches => "in",
            LengthUnit::Meters => "m",
            LengthUnit::Centimeters => "cm",
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Format a length readout such as `20 ft` or `12.5 in`.
pub fn format_length(value: f64, unit: LengthUnit) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{} {}", value as i64, unit)
    } else {
        format!("{} {}", (value * 100.0).round() / 100.0, unit)
    }
}

/// Reference to a selectable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Well(EntityId),
    Symbol(EntityId),
}

/// Rectangle of `size` centered on `center`.
pub(crate) fn centered_rect(center: Point, size: Size) -> Rect {
    Rect::from_center_size(center, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_serializes_as_short_label() {
        let json = serde_json::to_string(&LengthUnit::Inches).unwrap();
        assert_eq!(json, "\"in\"");
        let unit: LengthUnit = serde_json::from_str("\"m\"").unwrap();
        assert_eq!(unit, LengthUnit::Meters);
    }

    #[test]
    fn test_format_length() {
        assert_eq!(format_length(20.0, LengthUnit::Feet), "20 ft");
        assert_eq!(format_length(12.5, LengthUnit::Inches), "12.5 in");
        assert_eq!(format_length(1.0 / 3.0, LengthUnit::Meters), "0.33 m");
    }
}
