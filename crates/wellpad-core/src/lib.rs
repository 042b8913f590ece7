//! Wellpad Core Library
//!
//! Platform-agnostic document model and interaction logic for the Wellpad
//! site-layout editor: wells, spacings, the north marker and placed symbols,
//! plus the viewport, tools, gestures and inline editors that manipulate them.

pub mod config;
pub mod document;
pub mod editor;
pub mod entities;
pub mod gesture;
pub mod grid;
pub mod input;
pub mod overlay;
pub mod palette;
pub mod selection;
pub mod snap;
pub mod tools;
pub mod viewport;

pub use config::{DocumentDefaults, EditorConfig};
pub use document::{DocumentError, HitTarget, SiteDocument};
pub use editor::{
    EditorAction, EditorCommand, EditorHost, InitialWells, NullHost, SiteEditor, SymbolAction,
    SymbolUpdate,
};
pub use entities::{
    EntityId, EntityRef, LengthUnit, LibrarySymbol, OrientationMarker, Spacing, SymbolTransform,
    Well,
};
pub use input::{InputState, Key, Modifiers, PointerButton};
pub use overlay::{OverlayController, OverlayEdit, OverlayTarget, RenameController};
pub use palette::{Palette, PaletteItem, SYMBOL_MIME};
pub use snap::{GRID_SIZE, snap_to_grid};
pub use tools::{ToolKind, ToolManager};
pub use viewport::Viewport;
