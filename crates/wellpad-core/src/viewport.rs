//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom factor the viewport accepts.
pub const MIN_ZOOM: f64 = 0.25;
/// Largest zoom factor the viewport accepts.
pub const MAX_ZOOM: f64 = 5.0;
/// Multiplicative step used by the zoom buttons and wheel notches.
pub const ZOOM_STEP: f64 = 1.15;

/// Viewport manages the view transform for the site canvas.
///
/// Screen and world coordinates are related by
/// `world = (screen - pan) / zoom`. The viewport is display state only and is
/// never written into a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current translation offset in screen pixels.
    pub pan: Vec2,
    /// Current zoom factor (1.0 = 100%).
    pub zoom: f64,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
    /// Multiplier applied by `zoom_in`/`zoom_out`.
    pub zoom_step: f64,
    /// Canvas size in logical pixels; zoom buttons anchor at its center.
    #[serde(skip)]
    pub size: Size,
    /// Offset between the cursor and `pan` captured when a pan drag starts.
    #[serde(skip)]
    pan_anchor: Option<Vec2>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            size: Size::ZERO,
            pan_anchor: None,
        }
    }
}

impl Viewport {
    /// Create a new viewport with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport with custom zoom limits and step.
    pub fn with_limits(min_zoom: f64, max_zoom: f64, zoom_step: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            zoom_step,
            ..Self::default()
        }
    }

    /// Get the affine transform for rendering (world to screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling (screen to world).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Convert a length in screen pixels to world units.
    pub fn screen_len_to_world(&self, len: f64) -> f64 {
        len / self.zoom
    }

    /// Update the canvas size after a resize.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Center of the canvas in screen coordinates.
    pub fn center(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// Zoom in by one step around the canvas center.
    pub fn zoom_in(&mut self) {
        self.zoom_at(self.center(), self.zoom_step);
    }

    /// Zoom out by one step around the canvas center.
    pub fn zoom_out(&mut self) {
        self.zoom_at(self.center(), 1.0 / self.zoom_step);
    }

    /// Zoom by `factor`, keeping the world point under `screen_point` fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Solve pan directly instead of correcting incrementally so repeated
        // zooming cannot accumulate drift.
        self.pan = Vec2::new(
            screen_point.x - world_point.x * self.zoom,
            screen_point.y - world_point.y * self.zoom,
        );
    }

    /// One wheel notch: positive `notches` zoom in, negative zoom out.
    pub fn wheel_zoom(&mut self, screen_point: Point, notches: f64) {
        if notches == 0.0 || !notches.is_finite() {
            return;
        }
        self.zoom_at(screen_point, self.zoom_step.powf(notches.signum()));
    }

    /// Reset to zoom 1 and no pan.
    pub fn reset_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
        self.pan_anchor = None;
    }

    /// Start a pan drag with the cursor at `cursor`.
    pub fn begin_pan(&mut self, cursor: Point) {
        self.pan_anchor = Some(cursor.to_vec2() - self.pan);
    }

    /// Continue a pan drag. `pan` is set from the anchor, not accumulated.
    pub fn update_pan(&mut self, cursor: Point) {
        if let Some(anchor) = self.pan_anchor {
            self.pan = cursor.to_vec2() - anchor;
        }
    }

    /// Finish a pan drag.
    pub fn end_pan(&mut self) {
        self.pan_anchor = None;
    }

    /// Pan by a delta in screen pixels (wheel scrolling).
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }
}
