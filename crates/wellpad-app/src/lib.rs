//! Wellpad Application
//!
//! The native shell around the site editor: windowing, input routing,
//! egui panels, file dialogs and PNG export.

mod app;
mod event_handler;
mod image_loader;
mod shortcuts;
mod ui;

pub use app::{encode_png, export_texture_size, App, AppConfig, AppError, ExportError, JSON_FILE_NAME, PNG_FILE_NAME, WELLS_ENV};
pub use event_handler::EventHandler;
pub use image_loader::{LoadedImage, SymbolImageLoader};
pub use shortcuts::{Shortcut, ShortcutRegistry};
pub use ui::{render_ui, UiAction, UiState};
