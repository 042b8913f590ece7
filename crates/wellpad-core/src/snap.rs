//! Snap functionality for aligning dropped entities to the grid.

use kurbo::Point;

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Snap a point to the nearest grid intersection.
///
/// A non-positive or non-finite grid size leaves the point untouched.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return point;
    }
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

/// Snap `point` when `enabled`, otherwise return it unchanged.
pub fn snap_if(point: Point, enabled: bool, grid_size: f64) -> Point {
    if enabled {
        snap_to_grid(point, grid_size)
    } else {
        point
    }
}

/// Snap an angle to the nearest increment.
/// Returns the snapped angle in degrees (0-360).
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    let snapped = (angle_degrees / increment).round() * increment;
    normalize_degrees(snapped)
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle_degrees: f64) -> f64 {
    let wrapped = angle_degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
