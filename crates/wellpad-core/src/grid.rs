//! Screen-space grid line layout.
//!
//! The grid is a pure function of the viewport: lines sit every
//! `spacing * zoom` pixels, phase-shifted by the pan offset, so the pattern
//! follows the document without being regenerated in world space.

use crate::viewport::Viewport;
use kurbo::Size;

/// Grid lines are skipped when they would be closer than this many pixels.
pub const MIN_SCREEN_STEP: f64 = 4.0;

/// Positions of visible grid lines in screen pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLines {
    /// X coordinates of vertical lines.
    pub vertical: Vec<f64>,
    /// Y coordinates of horizontal lines.
    pub horizontal: Vec<f64>,
    /// Distance between adjacent lines in pixels.
    pub step: f64,
}

/// Compute the grid lines covering `size` for the given viewport.
///
/// The first line on each axis is at `pan mod (spacing * zoom)`.
pub fn grid_lines(size: Size, spacing: f64, viewport: &Viewport) -> GridLines {
    let step = spacing * viewport.zoom;
    if !(step.is_finite() && step >= MIN_SCREEN_STEP) {
        return GridLines::default();
    }

    GridLines {
        vertical: axis_lines(viewport.pan.x, step, size.width),
        horizontal: axis_lines(viewport.pan.y, step, size.height),
        step,
    }
}

/// Offset of the first visible line for an axis.
pub fn first_line(offset: f64, step: f64) -> f64 {
    offset.rem_euclid(step)
}

fn axis_lines(offset: f64, step: f64, extent: f64) -> Vec<f64> {
    let start = first_line(offset, step);
    let count = ((extent - start) / step).floor().max(-1.0) as i64 + 1;
    (0..count.max(0)).map(|i| start + i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    #[test]
    fn test_lines_at_identity() {
        let lines = grid_lines(Size::new(100.0, 50.0), 20.0, &Viewport::new());
        assert_eq!(lines.vertical, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        assert_eq!(lines.horizontal, vec![0.0, 20.0, 40.0]);
    }

    #[test]
    fn test_lines_follow_pan_and_zoom() {
        let mut viewport = Viewport::new();
        viewport.zoom = 2.0;
        viewport.pan = Vec2::new(-15.0, 95.0);
        let lines = grid_lines(Size::new(200.0, 200.0), 20.0, &viewport);
        assert!((lines.step - 40.0).abs() < f64::EPSILON);
        assert!((lines.vertical[0] - 25.0).abs() < f64::EPSILON);
        assert!((lines.horizontal[0] - 15.0).abs() < f64::EPSILON);

        // Every line maps to a whole multiple of the world spacing.
        for x in &lines.vertical {
            let world = (x - viewport.pan.x) / viewport.zoom;
            assert!(((world / 20.0).round() * 20.0 - world).abs() < 1e-9);
        }
    }

    #[test]
    fn test_dense_grid_is_skipped() {
        let mut viewport = Viewport::new();
        viewport.zoom = 0.1;
        let lines = grid_lines(Size::new(800.0, 600.0), 20.0, &viewport);
        assert!(lines.vertical.is_empty());
        assert!(lines.horizontal.is_empty());
    }
}
