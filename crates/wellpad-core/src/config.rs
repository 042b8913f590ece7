//! Editor configuration.

use crate::entities::{LengthUnit, Spacing};
use crate::snap::GRID_SIZE;
use crate::viewport::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Defaults applied when the document creates entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentDefaults {
    /// Distance east of the previous well for new and duplicated wells.
    pub well_spacing_px: f64,
    /// Position of the first well in an empty document.
    pub start_position: Point,
    /// Spacing value assigned to new links.
    pub default_spacing: Spacing,
    /// Height readout assigned to new wells.
    pub default_height: f64,
    pub default_height_unit: LengthUnit,
    /// Width placed symbols are scaled to.
    pub symbol_target_width: f64,
    /// Smallest width or height a symbol can be transformed to.
    pub symbol_min_size: f64,
}

impl Default for DocumentDefaults {
    fn default() -> Self {
        Self {
            well_spacing_px: 120.0,
            start_position: Point::new(100.0, 200.0),
            default_spacing: Spacing::new(20.0, LengthUnit::Feet),
            default_height: 0.0,
            default_height_unit: LengthUnit::Inches,
            symbol_target_width: 160.0,
            symbol_min_size: 32.0,
        }
    }
}

/// Configuration for a [`SiteEditor`](crate::editor::SiteEditor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid spacing in world units, shared by the grid and snapping.
    pub grid_size: f64,
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Pixel ratio used for PNG export regardless of on-screen zoom.
    pub export_pixel_ratio: f64,
    pub show_grid: bool,
    pub snap_to_grid: bool,
    pub show_labels: bool,
    pub document: DocumentDefaults,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            zoom_step: ZOOM_STEP,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            export_pixel_ratio: 2.0,
            show_grid: true,
            snap_to_grid: false,
            show_labels: true,
            document: DocumentDefaults::default(),
        }
    }
}
