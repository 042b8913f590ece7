//! Site editor controller.
//!
//! [`SiteEditor`] owns the document, viewport, tool state and the open
//! gesture/overlay, and turns pointer, wheel and keyboard input into document
//! mutations. Input handlers return the [`EditorAction`]s the shell must
//! carry out (redraw, export, image loading).

use crate::config::EditorConfig;
use crate::document::{HitTarget, SiteDocument};
use crate::entities::{EntityId, EntityRef, LibrarySymbol, Spacing, SymbolTransform, Well};
use crate::gesture::{ActiveGesture, GestureSession, OrientationMode};
use crate::input::{InputState, Key, Modifiers, PointerButton};
use crate::overlay::{KeyOutcome, OverlayCommit, OverlayController, OverlayTarget, RenameController};
use crate::palette::parse_payload;
use crate::selection::{apply_handle_drag, hit_test_handles};
use crate::snap::{ANGLE_SNAP_INCREMENT, snap_angle, snap_if};
use crate::tools::{ToolKind, ToolManager};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};

/// Pointer hit tolerance in screen pixels.
const HIT_TOLERANCE: f64 = 4.0;

/// What happened to a symbol, reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolAction {
    Move,
    Transform,
    Delete,
}

/// Symbol change notification.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolUpdate {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub action: SymbolAction,
    /// Full transform for `Transform`; `None` otherwise.
    pub transform: Option<SymbolTransform>,
}

/// Callbacks into the surrounding application. All methods default to no-ops.
pub trait EditorHost {
    /// Called after a committed change to wells, spacings or the marker.
    fn on_change(&mut self, _wells: &[Well], _spacings: &[Spacing], _orientation_angle: f64) {}

    /// Called after a symbol is moved, transformed or deleted.
    fn on_update_symbol(&mut self, _update: SymbolUpdate) {}

    /// Called when a drop creates a symbol.
    fn on_symbol_placed(&mut self, _symbol: &LibrarySymbol) {}

    /// Called for recoverable problems such as a repaired import.
    fn on_warning(&mut self, _message: &str) {}
}

/// Host that ignores every callback.
#[derive(Debug, Default)]
pub struct NullHost;

impl EditorHost for NullHost {}

/// Initial well content.
#[derive(Debug, Clone)]
pub enum InitialWells {
    /// Generate this many wells in a row.
    Count(usize),
    /// Use these wells; spacings get defaults.
    Explicit(Vec<Well>),
}

impl Default for InitialWells {
    fn default() -> Self {
        InitialWells::Count(4)
    }
}

/// Toolbar and shortcut commands.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    SetTool(ToolKind),
    AddWell,
    RemoveWell,
    DuplicateWell,
    ZoomIn,
    ZoomOut,
    ResetView,
    ToggleGrid,
    ToggleSnap,
    ToggleLabels,
    Undo,
    Redo,
    ExportPng,
    ExportJson,
    ImportJson(String),
    DeleteSymbol(EntityId),
    ShowHelp,
}

/// Work the shell must do after an input event.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// The scene changed and must be redrawn.
    Redraw,
    /// Rasterize the document at the export pixel ratio.
    ExportPng { pixel_ratio: f64 },
    /// Offer this document JSON for saving.
    ExportJson(String),
    /// Load the image once and report its natural size via
    /// [`SiteEditor::apply_symbol_natural_size`].
    LoadSymbolImage { id: EntityId, src: String },
    ShowHelp,
}

/// The interactive site editor.
pub struct SiteEditor {
    config: EditorConfig,
    document: SiteDocument,
    viewport: Viewport,
    tools: ToolManager,
    input: InputState,
    gesture: GestureSession,
    overlay: OverlayController,
    rename: RenameController,
    show_grid: bool,
    snap_to_grid: bool,
    show_labels: bool,
    host: Box<dyn EditorHost>,
}

impl std::fmt::Debug for SiteEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteEditor")
            .field("document", &self.document)
            .field("viewport", &self.viewport)
            .field("tool", &self.tools.current_tool)
            .finish_non_exhaustive()
    }
}

impl Default for SiteEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default(), InitialWells::default(), Box::new(NullHost))
    }
}

impl SiteEditor {
    pub fn new(config: EditorConfig, initial: InitialWells, host: Box<dyn EditorHost>) -> Self {
        let document = match initial {
            InitialWells::Count(n) => SiteDocument::with_well_count(n, config.document.clone()),
            InitialWells::Explicit(wells) => SiteDocument::from_wells(wells, config.document.clone()),
        };
        Self {
            viewport: Viewport::with_limits(config.min_zoom, config.max_zoom, config.zoom_step),
            show_grid: config.show_grid,
            snap_to_grid: config.snap_to_grid,
            show_labels: config.show_labels,
            config,
            document,
            tools: ToolManager::new(),
            input: InputState::new(),
            gesture: GestureSession::new(),
            overlay: OverlayController::new(),
            rename: RenameController::new(),
            host,
        }
    }

    pub fn set_host(&mut self, host: Box<dyn EditorHost>) {
        self.host = host;
    }

    /// Canvas size in logical pixels, after a resize.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport.set_size(size);
    }

    // --- Accessors -------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &SiteDocument {
        &self.document
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap_to_grid
    }

    pub fn show_labels(&self) -> bool {
        self.show_labels
    }

    pub fn overlay(&self) -> &OverlayController {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut OverlayController {
        &mut self.overlay
    }

    pub fn rename(&self) -> &RenameController {
        &self.rename
    }

    pub fn rename_mut(&mut self) -> &mut RenameController {
        &mut self.rename
    }

    /// Whether a gesture is open and pointer moves must be routed here even
    /// when the pointer is outside the canvas.
    pub fn is_capturing(&self) -> bool {
        self.gesture.is_capturing()
    }

    /// Live transform of the symbol being resized or rotated.
    pub fn symbol_preview(&self) -> Option<(EntityId, SymbolTransform)> {
        match self.gesture.active() {
            Some(ActiveGesture::TransformSymbol { id, preview, .. }) => Some((*id, *preview)),
            _ => None,
        }
    }

    fn world_tolerance(&self) -> f64 {
        self.viewport.screen_len_to_world(HIT_TOLERANCE)
    }

    fn snap_point(&self, point: Point) -> Point {
        snap_if(point, self.snap_to_grid, self.config.grid_size)
    }

    // --- Host notifications ----------------------------------------------

    fn notify_change(&mut self) {
        let doc = &self.document;
        self.host.on_change(doc.wells(), doc.spacings(), doc.orientation().angle);
    }

    fn notify_symbol(&mut self, id: EntityId, action: SymbolAction) {
        let Some(symbol) = self.document.symbol(id) else {
            return;
        };
        let t = symbol.transform;
        self.host.on_update_symbol(SymbolUpdate {
            id,
            x: t.x,
            y: t.y,
            action,
            transform: (action == SymbolAction::Transform).then_some(t),
        });
    }

    // --- Pointer input ---------------------------------------------------

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    pub fn pointer_down(&mut self, screen: Point, button: PointerButton, modifiers: Modifiers) -> Vec<EditorAction> {
        self.input.set_modifiers(modifiers);
        let double_click = self.input.button_pressed(button, screen);
        if self.gesture.is_capturing() {
            return Vec::new();
        }

        // Clicking the canvas blurs any open field.
        self.commit_editors();

        match button {
            PointerButton::Middle => self.begin_pan(screen, button),
            PointerButton::Primary if self.tools.is_panning_tool() => self.begin_pan(screen, button),
            PointerButton::Primary => self.select_pointer_down(screen, modifiers, double_click),
            PointerButton::Secondary => {}
        }
        vec![EditorAction::Redraw]
    }

    fn begin_pan(&mut self, screen: Point, button: PointerButton) {
        self.viewport.begin_pan(screen);
        self.gesture.begin(ActiveGesture::Pan, button, screen);
    }

    fn select_pointer_down(&mut self, screen: Point, modifiers: Modifiers, double_click: bool) {
        let world = self.viewport.screen_to_world(screen);

        if let Some(symbol) = self.document.selected_symbol() {
            if let Some(handle) = hit_test_handles(symbol, world, self.viewport.zoom) {
                let gesture = ActiveGesture::TransformSymbol {
                    id: symbol.id(),
                    handle,
                    original: symbol.transform,
                    preview: symbol.transform,
                };
                self.gesture.begin(gesture, PointerButton::Primary, screen);
                return;
            }
        }

        match self.document.hit_test(world, self.world_tolerance(), self.show_labels) {
            Some(HitTarget::WellHeight(index)) => self.open_height_overlay(index),
            Some(HitTarget::Spacing(index)) => self.open_spacing_overlay(index),
            Some(HitTarget::Well(id)) => {
                self.document.select(EntityRef::Well(id));
                if double_click {
                    self.open_rename(id);
                } else if let Some(well) = self.document.well(id) {
                    let grab = well.position() - world;
                    self.gesture.begin(ActiveGesture::MoveWell { id, grab }, PointerButton::Primary, screen);
                }
            }
            Some(HitTarget::Symbol(id)) => {
                self.document.select(EntityRef::Symbol(id));
                if let Some(symbol) = self.document.symbol(id) {
                    let grab = symbol.position() - world;
                    self.gesture.begin(ActiveGesture::MoveSymbol { id, grab }, PointerButton::Primary, screen);
                }
            }
            Some(HitTarget::Orientation) => {
                // Decided once here and held for the whole drag.
                let mode = if modifiers.shift || modifiers.alt {
                    OrientationMode::Rotating
                } else {
                    OrientationMode::Moving
                };
                let grab = self.document.orientation().position() - world;
                self.gesture.begin(ActiveGesture::Orientation { mode, grab }, PointerButton::Primary, screen);
            }
            None => self.document.clear_selection(),
        }
    }

    pub fn pointer_move(&mut self, screen: Point) -> Vec<EditorAction> {
        self.input.pointer_moved(screen);
        if !self.gesture.track(screen) {
            return Vec::new();
        }

        let world = self.viewport.screen_to_world(screen);
        let min_size = self.config.document.symbol_min_size;
        let snap = self.snap_to_grid;
        let Some(gesture) = self.gesture.active_mut() else {
            return Vec::new();
        };
        match gesture {
            ActiveGesture::Pan => self.viewport.update_pan(screen),
            ActiveGesture::MoveWell { id, grab } => {
                let (id, target) = (*id, world + *grab);
                self.document.move_well(id, target);
            }
            ActiveGesture::MoveSymbol { id, grab } => {
                let (id, target) = (*id, world + *grab);
                self.document.move_library_symbol(id, target);
            }
            ActiveGesture::TransformSymbol { handle, original, preview, .. } => {
                *preview = apply_handle_drag(original, *handle, world, min_size, snap);
            }
            ActiveGesture::Orientation { mode: OrientationMode::Moving, grab } => {
                let target = world + *grab;
                self.document.move_orientation_marker(target);
            }
            ActiveGesture::Orientation { mode: OrientationMode::Rotating, .. } => {
                let angle = self.document.orientation().angle_towards(world);
                self.document.rotate_orientation_marker(angle);
            }
        }
        vec![EditorAction::Redraw]
    }

    pub fn pointer_up(&mut self, screen: Point, button: PointerButton) -> Vec<EditorAction> {
        self.input.button_released(button, screen);
        if self.gesture.button() != Some(button) {
            return Vec::new();
        }
        self.gesture.track(screen);
        self.finish_gesture()
    }

    /// The pointer left the canvas; an open gesture ends where it last was.
    pub fn pointer_left(&mut self) -> Vec<EditorAction> {
        self.finish_gesture()
    }

    /// The window lost focus: end the gesture, drop the spacebar override and
    /// commit any open field.
    pub fn focus_lost(&mut self) -> Vec<EditorAction> {
        let mut actions = self.finish_gesture();
        self.input.release_all();
        let tool_restored = self.tools.end_temporary_pan();
        let committed = self.commit_editors();
        if tool_restored || committed {
            actions.push(EditorAction::Redraw);
        }
        actions
    }

    /// Close the open gesture and commit its result.
    fn finish_gesture(&mut self) -> Vec<EditorAction> {
        let Some(finished) = self.gesture.finish() else {
            return Vec::new();
        };
        match finished.gesture {
            ActiveGesture::Pan => {
                self.viewport.update_pan(finished.last_pointer);
                self.viewport.end_pan();
            }
            _ if !finished.moved => {}
            ActiveGesture::MoveWell { id, .. } => {
                if let Some(position) = self.document.well(id).map(Well::position) {
                    let snapped = self.snap_point(position);
                    self.document.move_well(id, snapped);
                }
                self.notify_change();
            }
            ActiveGesture::MoveSymbol { id, .. } => {
                if let Some(position) = self.document.symbol(id).map(LibrarySymbol::position) {
                    let snapped = self.snap_point(position);
                    self.document.move_library_symbol(id, snapped);
                }
                self.notify_symbol(id, SymbolAction::Move);
            }
            ActiveGesture::TransformSymbol { id, preview, .. } => {
                if self.document.transform_library_symbol(id, preview) {
                    self.notify_symbol(id, SymbolAction::Transform);
                }
            }
            ActiveGesture::Orientation { mode: OrientationMode::Moving, .. } => {
                let snapped = self.snap_point(self.document.orientation().position());
                self.document.move_orientation_marker(snapped);
                self.notify_change();
            }
            ActiveGesture::Orientation { mode: OrientationMode::Rotating, .. } => {
                if self.snap_to_grid {
                    let angle = snap_angle(self.document.orientation().angle, ANGLE_SNAP_INCREMENT);
                    self.document.rotate_orientation_marker(angle);
                }
                self.notify_change();
            }
        }
        vec![EditorAction::Redraw]
    }

    /// Scroll input. With Ctrl/Cmd held the wheel zooms at the cursor;
    /// otherwise it pans. `delta` is in pixels, positive y scrolling up.
    pub fn wheel(&mut self, screen: Point, delta: Vec2, modifiers: Modifiers) -> Vec<EditorAction> {
        self.input.set_modifiers(modifiers);
        if modifiers.command() {
            self.viewport.wheel_zoom(screen, delta.y);
        } else {
            self.viewport.pan_by(delta);
        }
        vec![EditorAction::Redraw]
    }

    // --- Keyboard --------------------------------------------------------

    /// Handle a key press. `repeat` is true for auto-repeat events.
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers, repeat: bool) -> Vec<EditorAction> {
        self.input.set_modifiers(modifiers);

        // An open field takes the keyboard.
        if self.overlay.is_open() {
            return match self.overlay.handle_key(key) {
                KeyOutcome::Committed(commit) => {
                    if let Some(commit) = commit {
                        self.apply_overlay_commit(commit);
                    }
                    vec![EditorAction::Redraw]
                }
                KeyOutcome::Discarded => vec![EditorAction::Redraw],
                KeyOutcome::Ignored => Vec::new(),
            };
        }
        if self.rename.is_open() {
            return match self.rename.handle_key(key) {
                KeyOutcome::Committed(commit) => {
                    if let Some((id, text)) = commit {
                        self.apply_rename(id, &text);
                    }
                    vec![EditorAction::Redraw]
                }
                KeyOutcome::Discarded => vec![EditorAction::Redraw],
                KeyOutcome::Ignored => Vec::new(),
            };
        }

        if key == Key::Space {
            return if self.tools.begin_temporary_pan() {
                vec![EditorAction::Redraw]
            } else {
                Vec::new()
            };
        }
        if repeat {
            return Vec::new();
        }

        let command = if modifiers.command() {
            match key {
                Key::Char('z') => Some(EditorCommand::Undo),
                Key::Char('y') => Some(EditorCommand::Redo),
                Key::Char('e') => Some(EditorCommand::ExportPng),
                _ => None,
            }
        } else {
            match key {
                Key::Char('v') => Some(EditorCommand::SetTool(ToolKind::Select)),
                Key::Char('h') => Some(EditorCommand::SetTool(ToolKind::Pan)),
                Key::Char('a') => Some(EditorCommand::AddWell),
                Key::Delete => Some(EditorCommand::RemoveWell),
                Key::Char('d') => Some(EditorCommand::DuplicateWell),
                Key::Char('g') => Some(EditorCommand::ToggleGrid),
                Key::Char('l') => Some(EditorCommand::ToggleLabels),
                Key::Escape => {
                    self.document.clear_selection();
                    return vec![EditorAction::Redraw];
                }
                _ => None,
            }
        };
        match command {
            Some(command) => self.apply(command),
            None => Vec::new(),
        }
    }

    pub fn key_up(&mut self, key: Key) -> Vec<EditorAction> {
        if key == Key::Space && self.tools.end_temporary_pan() {
            return vec![EditorAction::Redraw];
        }
        Vec::new()
    }

    // --- Commands --------------------------------------------------------

    pub fn apply(&mut self, command: EditorCommand) -> Vec<EditorAction> {
        match command {
            EditorCommand::SetTool(tool) => self.tools.set_tool(tool),
            EditorCommand::AddWell => {
                self.document.add_well();
                self.notify_change();
            }
            EditorCommand::RemoveWell => {
                if self.document.remove_well().is_some() {
                    self.overlay.discard();
                    self.rename.discard();
                    self.notify_change();
                }
            }
            EditorCommand::DuplicateWell => {
                if self.document.duplicate_well().is_some() {
                    self.notify_change();
                }
            }
            // Toolbar zoom anchors at the canvas center.
            EditorCommand::ZoomIn => self.viewport.zoom_in(),
            EditorCommand::ZoomOut => self.viewport.zoom_out(),
            EditorCommand::ResetView => self.viewport.reset_view(),
            EditorCommand::ToggleGrid => self.show_grid = !self.show_grid,
            EditorCommand::ToggleSnap => self.snap_to_grid = !self.snap_to_grid,
            EditorCommand::ToggleLabels => self.show_labels = !self.show_labels,
            EditorCommand::Undo => {
                self.document.undo();
            }
            EditorCommand::Redo => {
                self.document.redo();
            }
            EditorCommand::ExportPng => {
                return vec![EditorAction::ExportPng {
                    pixel_ratio: self.config.export_pixel_ratio,
                }];
            }
            EditorCommand::ExportJson => {
                return match self.document.to_json() {
                    Ok(json) => vec![EditorAction::ExportJson(json)],
                    Err(e) => {
                        log::error!("Failed to serialize document: {}", e);
                        Vec::new()
                    }
                };
            }
            EditorCommand::ImportJson(json) => return self.import_json(&json),
            EditorCommand::DeleteSymbol(id) => {
                if let Some(symbol) = self.document.delete_library_symbol(id) {
                    let t = symbol.transform;
                    self.host.on_update_symbol(SymbolUpdate {
                        id,
                        x: t.x,
                        y: t.y,
                        action: SymbolAction::Delete,
                        transform: None,
                    });
                }
            }
            EditorCommand::ShowHelp => return vec![EditorAction::ShowHelp],
        }
        vec![EditorAction::Redraw]
    }

    /// Replace the document from JSON. Invalid input yields an empty
    /// document; problems are reported through [`EditorHost::on_warning`].
    pub fn import_json(&mut self, json: &str) -> Vec<EditorAction> {
        self.gesture.finish();
        self.viewport.end_pan();
        self.overlay.discard();
        self.rename.discard();

        let (document, warnings) = SiteDocument::import_or_default(json, self.config.document.clone());
        self.document = document;
        for warning in &warnings {
            self.host.on_warning(warning);
        }
        self.notify_change();

        let mut actions: Vec<EditorAction> = self
            .document
            .symbols()
            .iter()
            .map(|s| EditorAction::LoadSymbolImage { id: s.id(), src: s.src.clone() })
            .collect();
        actions.push(EditorAction::Redraw);
        actions
    }

    // --- Symbols ---------------------------------------------------------

    /// Handle a palette drop at `screen`. Malformed payloads are ignored.
    pub fn drop_payload(&mut self, payload: &str, screen: Point) -> Vec<EditorAction> {
        let item = match parse_payload(payload) {
            Ok(item) => item,
            Err(e) => {
                log::warn!("Ignoring malformed symbol drop: {}", e);
                return Vec::new();
            }
        };
        let world = self.snap_point(self.viewport.screen_to_world(screen));
        let id = self.document.place_library_symbol(&item.key, &item.src, world);
        self.document.select(EntityRef::Symbol(id));
        if let Some(symbol) = self.document.symbol(id) {
            self.host.on_symbol_placed(symbol);
        }
        vec![
            EditorAction::LoadSymbolImage { id, src: item.src },
            EditorAction::Redraw,
        ]
    }

    /// Result of an image load requested by [`EditorAction::LoadSymbolImage`].
    pub fn apply_symbol_natural_size(&mut self, id: EntityId, width: f64, height: f64) -> Vec<EditorAction> {
        if self.document.apply_symbol_natural_size(id, width, height) {
            self.notify_symbol(id, SymbolAction::Transform);
            vec![EditorAction::Redraw]
        } else {
            Vec::new()
        }
    }

    // --- Overlay and rename ----------------------------------------------

    fn open_height_overlay(&mut self, index: usize) {
        let Some(well) = self.document.wells().get(index) else {
            return;
        };
        let (anchor, value, unit) = (well.height_anchor(), well.height_value, well.height_unit);
        if let Some(previous) = self.overlay.open(OverlayTarget::Height(index), anchor, value, unit, &self.viewport) {
            self.apply_overlay_commit(previous);
        }
    }

    fn open_spacing_overlay(&mut self, index: usize) {
        let (Some(anchor), Some(spacing)) = (self.document.spacing_anchor(index), self.document.spacings().get(index).copied()) else {
            return;
        };
        if let Some(previous) = self.overlay.open(OverlayTarget::Spacing(index), anchor, spacing.value, spacing.unit, &self.viewport) {
            self.apply_overlay_commit(previous);
        }
    }

    fn open_rename(&mut self, id: EntityId) {
        let Some(well) = self.document.well(id) else {
            return;
        };
        let (anchor, name) = (well.name_anchor(), well.name.clone());
        if let Some((prev_id, text)) = self.rename.open(id, anchor, &name) {
            self.apply_rename(prev_id, &text);
        }
    }

    fn apply_overlay_commit(&mut self, commit: OverlayCommit) {
        let changed = match commit.target {
            OverlayTarget::Spacing(index) => self.document.set_spacing(index, commit.value, commit.unit),
            OverlayTarget::Height(index) => match self.document.wells().get(index).map(Well::id) {
                Some(id) => self.document.set_well_height(id, commit.value, commit.unit),
                None => false,
            },
        };
        if changed {
            self.notify_change();
        }
    }

    fn apply_rename(&mut self, id: EntityId, text: &str) {
        if self.document.rename_well(id, text) {
            self.notify_change();
        }
    }

    /// Commit the open overlay or rename (the field lost focus).
    /// Returns true if anything was open.
    pub fn commit_editors(&mut self) -> bool {
        let was_open = self.overlay.is_open() || self.rename.is_open();
        if let Some(commit) = self.overlay.commit() {
            self.apply_overlay_commit(commit);
        }
        if let Some((id, text)) = self.rename.commit() {
            self.apply_rename(id, &text);
        }
        was_open
    }

    /// Close the open overlay and rename without applying them.
    pub fn discard_editors(&mut self) {
        self.overlay.discard();
        self.rename.discard();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorded {
        changes: usize,
        symbol_updates: Vec<SymbolUpdate>,
        warnings: Vec<String>,
    }

    struct RecordingHost(Rc<RefCell<Recorded>>);

    impl EditorHost for RecordingHost {
        fn on_change(&mut self, _wells: &[Well], _spacings: &[Spacing], _angle: f64) {
            self.0.borrow_mut().changes += 1;
        }

        fn on_update_symbol(&mut self, update: SymbolUpdate) {
            self.0.borrow_mut().symbol_updates.push(update);
        }

        fn on_warning(&mut self, message: &str) {
            self.0.borrow_mut().warnings.push(message.to_string());
        }
    }

    fn editor() -> (SiteEditor, Rc<RefCell<Recorded>>) {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let editor = SiteEditor::new(
            EditorConfig::default(),
            InitialWells::Count(4),
            Box::new(RecordingHost(recorded.clone())),
        );
        (editor, recorded)
    }

    fn click(editor: &mut SiteEditor, at: Point) {
        editor.pointer_down(at, PointerButton::Primary, Modifiers::NONE);
        editor.pointer_up(at, PointerButton::Primary);
    }

    #[test]
    fn test_drag_well_commits_once() {
        let (mut editor, recorded) = editor();
        let well = editor.document().wells()[0].clone();
        let start = editor.viewport().world_to_screen(well.position());

        editor.pointer_down(start, PointerButton::Primary, Modifiers::NONE);
        assert!(editor.is_capturing());
        editor.pointer_move(start + Vec2::new(10.0, 0.0));
        editor.pointer_move(start + Vec2::new(33.0, 7.0));
        assert_eq!(recorded.borrow().changes, 0);
        editor.pointer_up(start + Vec2::new(33.0, 7.0), PointerButton::Primary);

        assert!(!editor.is_capturing());
        assert_eq!(recorded.borrow().changes, 1);
        let moved = editor.document().well(well.id()).map(Well::position);
        assert_eq!(moved, Some(well.position() + Vec2::new(33.0, 7.0)));
        assert!(editor.document().is_selected(EntityRef::Well(well.id())));
    }

    #[test]
    fn test_drag_snaps_on_release_only() {
        let (mut editor, _) = editor();
        editor.apply(EditorCommand::ToggleSnap);
        let well = editor.document().wells()[0].clone();
        let start = editor.viewport().world_to_screen(well.position());

        editor.pointer_down(start, PointerButton::Primary, Modifiers::NONE);
        editor.pointer_move(start + Vec2::new(7.0, 3.0));
        let during = editor.document().well(well.id()).map(Well::position);
        assert_eq!(during, Some(well.position() + Vec2::new(7.0, 3.0)));

        editor.pointer_up(start + Vec2::new(7.0, 3.0), PointerButton::Primary);
        let after = editor.document().well(well.id()).map(Well::position);
        assert_eq!(after, Some(Point::new(100.0, 200.0)));
    }

    #[test]
    fn test_click_empty_canvas_clears_selection() {
        let (mut editor, _) = editor();
        let well = editor.document().wells()[0].position();
        click(&mut editor, well);
        assert!(editor.document().selection().is_some());
        click(&mut editor, Point::new(900.0, 900.0));
        assert!(editor.document().selection().is_none());
    }

    #[test]
    fn test_pan_tool_does_not_drag_entities() {
        let (mut editor, _) = editor();
        editor.apply(EditorCommand::SetTool(ToolKind::Pan));
        let well = editor.document().wells()[0].position();

        editor.pointer_down(well, PointerButton::Primary, Modifiers::NONE);
        editor.pointer_move(well + Vec2::new(40.0, 10.0));
        editor.pointer_up(well + Vec2::new(40.0, 10.0), PointerButton::Primary);

        assert_eq!(editor.document().wells()[0].position(), well);
        assert_eq!(editor.viewport().pan, Vec2::new(40.0, 10.0));
        assert!(editor.document().selection().is_none());
    }

    #[test]
    fn test_middle_button_pans_in_select_tool() {
        let (mut editor, _) = editor();
        editor.pointer_down(Point::new(10.0, 10.0), PointerButton::Middle, Modifiers::NONE);
        editor.pointer_move(Point::new(30.0, 50.0));
        editor.pointer_up(Point::new(30.0, 50.0), PointerButton::Middle);
        assert_eq!(editor.viewport().pan, Vec2::new(20.0, 40.0));
        assert_eq!(editor.tool(), ToolKind::Select);
    }

    #[test]
    fn test_orientation_rotate_mode_is_fixed_at_pointer_down() {
        let (mut editor, recorded) = editor();
        let marker = editor.document().orientation().position();

        editor.pointer_down(marker, PointerButton::Primary, Modifiers::shift());
        // Releasing Shift mid-drag does not switch to moving.
        editor.set_modifiers(Modifiers::NONE);
        editor.pointer_move(marker + Vec2::new(50.0, 0.0));
        editor.pointer_up(marker + Vec2::new(50.0, 0.0), PointerButton::Primary);

        let orientation = editor.document().orientation();
        assert_eq!(orientation.position(), marker);
        assert!((orientation.angle - 90.0).abs() < 1e-9);
        assert_eq!(recorded.borrow().changes, 1);
    }

    #[test]
    fn test_orientation_plain_drag_moves() {
        let (mut editor, _) = editor();
        let marker = editor.document().orientation().position();
        editor.pointer_down(marker, PointerButton::Primary, Modifiers::NONE);
        editor.pointer_move(marker + Vec2::new(25.0, 5.0));
        editor.pointer_up(marker + Vec2::new(25.0, 5.0), PointerButton::Primary);
        let orientation = editor.document().orientation();
        assert_eq!(orientation.position(), marker + Vec2::new(25.0, 5.0));
        assert!(orientation.angle.abs() < f64::EPSILON);
    }

    #[test]
    fn test_focus_lost_commits_gesture() {
        let (mut editor, recorded) = editor();
        let well = editor.document().wells()[1].clone();
        let start = well.position();
        editor.pointer_down(start, PointerButton::Primary, Modifiers::NONE);
        editor.pointer_move(start + Vec2::new(0.0, 40.0));
        editor.focus_lost();
        assert!(!editor.is_capturing());
        assert_eq!(recorded.borrow().changes, 1);
        // A late release does nothing.
        assert!(editor.pointer_up(start, PointerButton::Primary).is_empty());
    }

    #[test]
    fn test_pointer_left_ends_pan_at_last_position() {
        let (mut editor, _) = editor();
        editor.apply(EditorCommand::SetTool(ToolKind::Pan));
        editor.pointer_down(Point::new(100.0, 100.0), PointerButton::Primary, Modifiers::NONE);
        editor.pointer_move(Point::new(130.0, 80.0));
        assert!(editor.is_capturing());

        assert_eq!(editor.pointer_left(), vec![EditorAction::Redraw]);
        assert!(!editor.is_capturing());
        assert_eq!(editor.viewport().pan, Vec2::new(30.0, -20.0));

        // Later moves no longer pan.
        editor.pointer_move(Point::new(400.0, 400.0));
        assert_eq!(editor.viewport().pan, Vec2::new(30.0, -20.0));
    }

    #[test]
    fn test_pointer_left_commits_symbol_move() {
        let (mut editor, recorded) = editor();
        editor.drop_payload(r#"{"name":"Tank","src":"tank.png","key":"tank"}"#, Point::new(600.0, 600.0));
        let id = editor.document().symbols()[0].id();

        editor.pointer_down(Point::new(600.0, 600.0), PointerButton::Primary, Modifiers::NONE);
        editor.pointer_move(Point::new(620.0, 650.0));
        editor.pointer_left();

        assert!(!editor.is_capturing());
        assert_eq!(editor.document().symbols()[0].position(), Point::new(620.0, 650.0));
        let recorded = recorded.borrow();
        assert_eq!(recorded.symbol_updates.last().map(|u| (u.id, u.action)), Some((id, SymbolAction::Move)));
    }

    #[test]
    fn test_focus_lost_during_pan_releases_capture() {
        let (mut editor, _) = editor();
        editor.pointer_down(Point::new(10.0, 10.0), PointerButton::Middle, Modifiers::NONE);
        editor.pointer_move(Point::new(50.0, 10.0));
        editor.focus_lost();

        assert!(!editor.is_capturing());
        assert_eq!(editor.viewport().pan, Vec2::new(40.0, 0.0));
        assert!(editor.pointer_up(Point::new(90.0, 10.0), PointerButton::Middle).is_empty());
        assert_eq!(editor.viewport().pan, Vec2::new(40.0, 0.0));
    }

    #[test]
    fn test_focus_lost_restores_tool_and_commits_field() {
        let (mut editor, _) = editor();
        let anchor = editor.document().wells()[0].height_anchor();
        click(&mut editor, anchor);
        editor.overlay_mut().set_text("12");
        editor.tools.begin_temporary_pan();

        assert_eq!(editor.focus_lost(), vec![EditorAction::Redraw]);
        assert_eq!(editor.tool(), ToolKind::Select);
        assert!(!editor.overlay().is_open());
        assert!((editor.document().wells()[0].height_value - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_toolbar_zoom_keeps_canvas_center() {
        let (mut editor, _) = editor();
        editor.set_viewport_size(Size::new(1000.0, 800.0));
        let center = Point::new(500.0, 400.0);
        let before = editor.viewport().screen_to_world(center);

        editor.apply(EditorCommand::ZoomIn);
        assert!(editor.viewport().zoom > 1.0);
        let after = editor.viewport().screen_to_world(center);
        assert!((before - after).hypot() < 1e-9);

        editor.apply(EditorCommand::ZoomOut);
        assert!((editor.viewport().zoom - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_double_click_opens_rename() {
        let (mut editor, _) = editor();
        let well = editor.document().wells()[2].clone();
        click(&mut editor, well.position());
        click(&mut editor, well.position());
        assert_eq!(editor.rename().live().map(|r| r.well), Some(well.id()));

        editor.rename_mut().set_text("Pad C");
        editor.key_down(Key::Enter, Modifiers::NONE, false);
        assert_eq!(editor.document().wells()[2].name, "Pad C");
    }

    #[test]
    fn test_height_label_click_opens_overlay_without_selecting() {
        let (mut editor, recorded) = editor();
        let well = editor.document().wells()[0].clone();
        click(&mut editor, well.height_anchor());
        assert_eq!(editor.overlay().live().map(|o| o.target), Some(OverlayTarget::Height(0)));
        assert!(editor.document().selection().is_none());

        editor.overlay_mut().set_text("48");
        editor.key_down(Key::Tab, Modifiers::NONE, false);
        assert!((editor.document().wells()[0].height_value - 48.0).abs() < f64::EPSILON);
        assert_eq!(recorded.borrow().changes, 1);
    }

    #[test]
    fn test_spacing_overlay_blur_commits() {
        let (mut editor, _) = editor();
        let anchor = editor.document().spacing_anchor(1).unwrap_or_default();
        click(&mut editor, anchor);
        assert_eq!(editor.overlay().live().map(|o| o.target), Some(OverlayTarget::Spacing(1)));
        editor.overlay_mut().set_text("55");
        // Clicking elsewhere blurs the field.
        click(&mut editor, Point::new(900.0, 900.0));
        assert!(!editor.overlay().is_open());
        assert!((editor.document().spacings()[1].value - 55.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shortcuts() {
        let (mut editor, _) = editor();
        editor.key_down(Key::Char('a'), Modifiers::NONE, false);
        assert_eq!(editor.document().wells().len(), 5);
        editor.key_down(Key::Char('d'), Modifiers::NONE, false);
        assert_eq!(editor.document().wells().len(), 6);
        editor.key_down(Key::Delete, Modifiers::NONE, false);
        assert_eq!(editor.document().wells().len(), 5);
        editor.key_down(Key::Char('g'), Modifiers::NONE, false);
        assert!(!editor.show_grid());
        editor.key_down(Key::Char('l'), Modifiers::NONE, false);
        assert!(!editor.show_labels());
        editor.key_down(Key::Char('h'), Modifiers::NONE, false);
        assert_eq!(editor.tool(), ToolKind::Pan);
        editor.key_down(Key::Char('v'), Modifiers::NONE, false);
        assert_eq!(editor.tool(), ToolKind::Select);
        assert_eq!(
            editor.key_down(Key::Char('e'), Modifiers::ctrl(), false),
            vec![EditorAction::ExportPng { pixel_ratio: 2.0 }]
        );
        // Undo is reserved and changes nothing.
        editor.key_down(Key::Char('z'), Modifiers::ctrl(), false);
        assert_eq!(editor.document().wells().len(), 5);
    }

    #[test]
    fn test_ctrl_wheel_zooms_plain_wheel_pans() {
        let (mut editor, _) = editor();
        let cursor = Point::new(300.0, 200.0);
        let before = editor.viewport().screen_to_world(cursor);
        editor.wheel(cursor, Vec2::new(0.0, 1.0), Modifiers::ctrl());
        assert!(editor.viewport().zoom > 1.0);
        let after = editor.viewport().screen_to_world(cursor);
        assert!((before - after).hypot() < 1e-9);

        let pan = editor.viewport().pan;
        editor.wheel(cursor, Vec2::new(0.0, -30.0), Modifiers::NONE);
        assert_eq!(editor.viewport().pan, pan + Vec2::new(0.0, -30.0));
    }

    #[test]
    fn test_drop_places_symbol_and_requests_image() {
        let (mut editor, _) = editor();
        let payload = r#"{"name":"Frac Tank","src":"symbols/frac-tank.png","key":"frac-tank"}"#;
        let actions = editor.drop_payload(payload, Point::new(500.0, 500.0));
        let id = editor.document().symbols()[0].id();
        assert_eq!(
            actions[0],
            EditorAction::LoadSymbolImage { id, src: "symbols/frac-tank.png".to_string() }
        );
        editor.apply_symbol_natural_size(id, 200.0, 100.0);
        assert_eq!(editor.document().symbols()[0].transform.height, 80.0);

        assert!(editor.drop_payload("not json", Point::ZERO).is_empty());
        assert_eq!(editor.document().symbols().len(), 1);
    }

    #[test]
    fn test_symbol_resize_applies_on_release() {
        let (mut editor, recorded) = editor();
        let payload = r#"{"name":"Tank","src":"tank.png","key":"tank"}"#;
        editor.drop_payload(payload, Point::new(600.0, 600.0));
        let id = editor.document().symbols()[0].id();
        let corner = crate::selection::symbol_handles(&editor.document().symbols()[0].transform, 1.0)[3].position;

        editor.pointer_down(corner, PointerButton::Primary, Modifiers::NONE);
        editor.pointer_move(corner + Vec2::new(40.0, 40.0));
        assert!(editor.symbol_preview().is_some());
        assert_eq!(editor.document().symbols()[0].transform.width, 160.0);
        editor.pointer_up(corner + Vec2::new(40.0, 40.0), PointerButton::Primary);

        assert_eq!(editor.document().symbols()[0].transform.width, 200.0);
        let recorded = recorded.borrow();
        assert_eq!(recorded.symbol_updates.last().map(|u| (u.id, u.action)), Some((id, SymbolAction::Transform)));
    }

    #[test]
    fn test_delete_symbol_reports_delete() {
        let (mut editor, recorded) = editor();
        editor.drop_payload(r#"{"name":"Tank","src":"tank.png","key":"tank"}"#, Point::new(600.0, 600.0));
        let id = editor.document().symbols()[0].id();
        editor.apply(EditorCommand::DeleteSymbol(id));
        assert!(editor.document().symbols().is_empty());
        assert!(editor.document().selection().is_none());
        assert_eq!(recorded.borrow().symbol_updates.last().map(|u| u.action), Some(SymbolAction::Delete));
    }

    #[test]
    fn test_import_invalid_warns_host() {
        let (mut editor, recorded) = editor();
        editor.apply(EditorCommand::ImportJson("{".to_string()));
        assert!(editor.document().wells().is_empty());
        assert_eq!(recorded.borrow().warnings.len(), 1);
    }
}
