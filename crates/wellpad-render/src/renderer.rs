//! Renderer trait abstraction.

use kurbo::{Affine, Size};
use peniko::Color;
use thiserror::Error;
use wellpad_core::entities::{LibrarySymbol, OrientationMarker, Well};
use wellpad_core::{SiteEditor, SymbolTransform};

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The editor to render.
    pub editor: &'a SiteEditor,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Background color.
    pub background_color: Color,
    /// Selection highlight color.
    pub selection_color: Color,
    /// Grid line color.
    pub grid_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(editor: &'a SiteEditor, viewport_size: Size) -> Self {
        Self {
            editor,
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            grid_color: Color::from_rgba8(200, 200, 200, 140),
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the scene/command buffer for a frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Per-entity drawing used by renderer implementations.
pub(crate) trait EntityRenderer {
    fn render_well(&mut self, well: &Well, transform: Affine, selected: bool, labels: bool);

    /// Link and readout between two adjacent wells.
    fn render_spacing(&mut self, from: &Well, to: &Well, label: &str, transform: Affine, labels: bool);

    fn render_orientation(&mut self, marker: &OrientationMarker, transform: Affine);

    /// `placement` may differ from the stored transform while a handle is dragged.
    fn render_symbol(&mut self, symbol: &LibrarySymbol, placement: &SymbolTransform, transform: Affine, selected: bool);
}
