//! Wellpad Render Library
//!
//! Rendering of site documents: a backend-neutral `Renderer` trait plus the
//! Vello implementation used by the desktop app and for PNG export.

pub mod images;
pub mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use images::{decode_symbol, ImageLoadError, SymbolImages};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::{fit_export_ratio, PngRenderResult, VelloRenderer, EXPORT_PADDING};
