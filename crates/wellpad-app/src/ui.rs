//! UI components using egui.

use egui::{Align2, Color32, Context, CornerRadius, Frame, Margin, Pos2, Stroke, Vec2};
use wellpad_core::entities::LengthUnit;
use wellpad_core::{EditorCommand, Key, Palette, PaletteItem, SiteEditor, SYMBOL_MIME, ToolKind};

mod theme {
    use egui::Color32;

    pub const TEXT: Color32 = Color32::from_rgb(60, 60, 60);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(120, 120, 120);
    pub const BORDER: Color32 = Color32::from_rgb(220, 220, 220);
    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(250, 250, 252, 250);
    pub const WARNING_BG: Color32 = Color32::from_rgb(254, 243, 199);
    pub const PANEL_RADIUS: u8 = 8;
}

/// Drag payload carried from the palette to the canvas.
#[derive(Debug, Clone)]
pub struct SymbolDrag {
    pub mime: &'static str,
    pub data: String,
}

/// Inline numeric editor as shown on screen.
#[derive(Debug, Clone)]
pub struct OverlayView {
    pub text: String,
    pub unit: LengthUnit,
    pub position: Pos2,
}

/// Inline well-name editor as shown on screen.
#[derive(Debug, Clone)]
pub struct RenameView {
    pub text: String,
    pub position: Pos2,
}

/// UI state mirrored from the editor each frame.
pub struct UiState {
    pub current_tool: ToolKind,
    pub show_grid: bool,
    pub snap_enabled: bool,
    pub show_labels: bool,
    /// Current zoom level (1.0 = 100%).
    pub zoom_level: f64,
    pub well_count: usize,
    pub help_open: bool,
    pub palette: Palette,
    pub overlay: Option<OverlayView>,
    pub rename: Option<RenameView>,
    /// Most recent warning reported by the editor.
    pub warning: Option<String>,
    /// Move keyboard focus into the inline field on the next frame.
    focus_field: bool,
}

impl UiState {
    pub fn new(palette: Palette) -> Self {
        Self {
            current_tool: ToolKind::Select,
            show_grid: true,
            snap_enabled: false,
            show_labels: true,
            zoom_level: 1.0,
            well_count: 0,
            help_open: false,
            palette,
            overlay: None,
            rename: None,
            warning: None,
            focus_field: false,
        }
    }

    /// Refresh the mirrored state. Inline field positions are recomputed from
    /// the viewport every frame so they stay attached while panning.
    pub fn sync(&mut self, editor: &SiteEditor) {
        self.current_tool = editor.tool();
        self.show_grid = editor.show_grid();
        self.snap_enabled = editor.snap_enabled();
        self.show_labels = editor.show_labels();
        self.zoom_level = editor.viewport().zoom;
        self.well_count = editor.document().wells().len();

        let viewport = editor.viewport();
        let overlay = editor.overlay().live().map(|edit| {
            let p = edit.screen_position(viewport);
            OverlayView {
                text: edit.text.clone(),
                unit: edit.unit,
                position: Pos2::new(p.x as f32, p.y as f32),
            }
        });
        let rename = editor.rename().live().map(|edit| {
            let p = viewport.world_to_screen(edit.anchor);
            RenameView {
                text: edit.text.clone(),
                position: Pos2::new(p.x as f32, p.y as f32),
            }
        });

        let opened = (overlay.is_some() && self.overlay.is_none()) || (rename.is_some() && self.rename.is_none());
        if opened {
            self.focus_field = true;
        }
        self.overlay = overlay;
        self.rename = rename;
    }
}

/// Actions triggered by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Command(EditorCommand),
    SaveDocument,
    OpenDocument,
    OverlayText(String),
    OverlayUnit(LengthUnit),
    OverlayKey(Key),
    RenameText(String),
    RenameKey(Key),
    /// A palette item was released over the canvas at this screen position.
    DropSymbol { payload: String, position: Pos2 },
    DismissWarning,
}

/// Render the UI and return the first triggered action.
pub fn render_ui(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    let toolbar_action = render_toolbar(ctx, ui_state);
    render_palette(ctx, ui_state);
    let overlay_action = render_overlay(ctx, ui_state);
    let rename_action = render_rename(ctx, ui_state);
    let warning_action = render_warning(ctx, ui_state);

    if ui_state.help_open {
        render_shortcuts_modal(ctx, ui_state);
    }

    let drop_action = take_symbol_drop(ctx);

    overlay_action
        .or(rename_action)
        .or(toolbar_action)
        .or(drop_action)
        .or(warning_action)
}

/// Common panel frame style.
fn panel_frame() -> Frame {
    Frame::new()
        .fill(theme::PANEL_BG)
        .corner_radius(CornerRadius::same(theme::PANEL_RADIUS))
        .stroke(Stroke::new(1.0, theme::BORDER))
        .shadow(egui::epaint::Shadow {
            spread: 0,
            blur: 8,
            offset: [0, 2],
            color: Color32::from_black_alpha(15),
        })
        .inner_margin(Margin::same(8))
}

fn tool_button(ui: &mut egui::Ui, label: &str, tooltip: &str, selected: bool) -> bool {
    ui.add(egui::Button::new(label).selected(selected))
        .on_hover_text(tooltip)
        .clicked()
}

/// Render the top toolbar.
fn render_toolbar(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    fn command(cmd: EditorCommand) -> Option<UiAction> {
        Some(UiAction::Command(cmd))
    }
    let mut action = None;

    egui::Area::new(egui::Id::new("toolbar"))
        .anchor(Align2::CENTER_TOP, Vec2::new(0.0, 12.0))
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing = Vec2::new(4.0, 0.0);

                    let tool = ui_state.current_tool;
                    if tool_button(ui, "Select", "Select tool (V)", tool == ToolKind::Select) {
                        action = command(EditorCommand::SetTool(ToolKind::Select));
                    }
                    if tool_button(ui, "Pan", "Pan tool (H, hold Space)", tool == ToolKind::Pan) {
                        action = command(EditorCommand::SetTool(ToolKind::Pan));
                    }
                    ui.separator();

                    if tool_button(ui, "+ Well", "Add well (A)", false) {
                        action = command(EditorCommand::AddWell);
                    }
                    if ui
                        .add_enabled(ui_state.well_count > 0, egui::Button::new("- Well"))
                        .on_hover_text("Remove selected or last well (Delete)")
                        .clicked()
                    {
                        action = command(EditorCommand::RemoveWell);
                    }
                    if tool_button(ui, "Duplicate", "Duplicate last well (D)", false) {
                        action = command(EditorCommand::DuplicateWell);
                    }
                    ui.separator();

                    if tool_button(ui, "−", "Zoom out", false) {
                        action = command(EditorCommand::ZoomOut);
                    }
                    let zoom_label = format!("{:.0}%", ui_state.zoom_level * 100.0);
                    if tool_button(ui, &zoom_label, "Reset view", false) {
                        action = command(EditorCommand::ResetView);
                    }
                    if tool_button(ui, "+", "Zoom in", false) {
                        action = command(EditorCommand::ZoomIn);
                    }
                    ui.separator();

                    if tool_button(ui, "Grid", "Toggle grid (G)", ui_state.show_grid) {
                        action = command(EditorCommand::ToggleGrid);
                    }
                    if tool_button(ui, "Snap", "Snap to grid", ui_state.snap_enabled) {
                        action = command(EditorCommand::ToggleSnap);
                    }
                    if tool_button(ui, "Labels", "Toggle labels (L)", ui_state.show_labels) {
                        action = command(EditorCommand::ToggleLabels);
                    }
                    ui.separator();

                    if tool_button(ui, "Undo", "Undo (Ctrl+Z)", false) {
                        action = command(EditorCommand::Undo);
                    }
                    if tool_button(ui, "Redo", "Redo (Ctrl+Y)", false) {
                        action = command(EditorCommand::Redo);
                    }
                    ui.separator();

                    if tool_button(ui, "Open", "Import document JSON", false) {
                        action = Some(UiAction::OpenDocument);
                    }
                    if tool_button(ui, "Save", "Export document JSON", false) {
                        action = Some(UiAction::SaveDocument);
                    }
                    if tool_button(ui, "PNG", "Export image (Ctrl+E)", false) {
                        action = command(EditorCommand::ExportPng);
                    }
                    if tool_button(ui, "?", "Keyboard shortcuts", ui_state.help_open) {
                        action = command(EditorCommand::ShowHelp);
                    }
                });
            });
        });

    action
}

/// Render the symbol palette. Items are drag sources for the canvas.
fn render_palette(ctx: &Context, ui_state: &UiState) {
    if ui_state.palette.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("palette"))
        .anchor(Align2::RIGHT_CENTER, Vec2::new(-12.0, 0.0))
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.set_width(140.0);
                ui.label(egui::RichText::new("Symbols").size(10.0).color(theme::TEXT_MUTED));
                ui.add_space(4.0);
                egui::ScrollArea::vertical().max_height(420.0).show(ui, |ui| {
                    for item in ui_state.palette.items() {
                        palette_entry(ui, item);
                    }
                });
            });
        });
}

fn palette_entry(ui: &mut egui::Ui, item: &PaletteItem) {
    let payload = SymbolDrag {
        mime: SYMBOL_MIME,
        data: item.to_payload(),
    };
    ui.dnd_drag_source(egui::Id::new(("palette_item", &item.key)), payload, |ui| {
        ui.label(egui::RichText::new(&item.name).color(theme::TEXT));
    })
    .response
    .on_hover_text("Drag onto the site");
}

/// A palette drag released over the canvas becomes a drop.
fn take_symbol_drop(ctx: &Context) -> Option<UiAction> {
    let released = ctx.input(|i| i.pointer.any_released());
    if !released || ctx.is_pointer_over_area() {
        return None;
    }
    let drag = egui::DragAndDrop::take_payload::<SymbolDrag>(ctx)?;
    if drag.mime != SYMBOL_MIME {
        return None;
    }
    let position = ctx.input(|i| i.pointer.interact_pos())?;
    Some(UiAction::DropSymbol {
        payload: drag.data.clone(),
        position,
    })
}

/// Keys that commit or cancel an inline field.
fn field_key(ui: &egui::Ui) -> Option<Key> {
    ui.input(|i| {
        if i.key_pressed(egui::Key::Enter) {
            Some(Key::Enter)
        } else if i.key_pressed(egui::Key::Tab) {
            Some(Key::Tab)
        } else if i.key_pressed(egui::Key::Escape) {
            Some(Key::Escape)
        } else {
            None
        }
    })
}

/// Render the numeric overlay with its unit selector at the anchor.
fn render_overlay(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    let view = ui_state.overlay.clone()?;
    let mut action = None;

    egui::Area::new(egui::Id::new("value_overlay"))
        .fixed_pos(view.position)
        .pivot(Align2::CENTER_CENTER)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            panel_frame().inner_margin(Margin::same(4)).show(ui, |ui| {
                ui.horizontal(|ui| {
                    let mut text = view.text.clone();
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut text)
                            .id(egui::Id::new("overlay_value"))
                            .desired_width(56.0)
                            .lock_focus(true),
                    );
                    if ui_state.focus_field {
                        response.request_focus();
                        ui_state.focus_field = false;
                    }
                    if response.changed() {
                        action = Some(UiAction::OverlayText(text));
                    }
                    if response.has_focus() || response.lost_focus() {
                        if let Some(key) = field_key(ui) {
                            action = Some(UiAction::OverlayKey(key));
                        }
                    }

                    let mut unit = view.unit;
                    egui::ComboBox::from_id_salt("overlay_unit")
                        .width(48.0)
                        .selected_text(unit.label())
                        .show_ui(ui, |ui| {
                            for candidate in LengthUnit::ALL {
                                ui.selectable_value(&mut unit, candidate, candidate.label());
                            }
                        });
                    if unit != view.unit {
                        action = Some(UiAction::OverlayUnit(unit));
                    }
                });
            });
        });

    action
}

/// Render the well-name field above the well.
fn render_rename(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    let view = ui_state.rename.clone()?;
    let mut action = None;

    egui::Area::new(egui::Id::new("rename_overlay"))
        .fixed_pos(view.position)
        .pivot(Align2::CENTER_CENTER)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            let mut text = view.text.clone();
            let response = ui.add(
                egui::TextEdit::singleline(&mut text)
                    .id(egui::Id::new("rename_value"))
                    .desired_width(110.0)
                    .lock_focus(true),
            );
            if ui_state.focus_field {
                response.request_focus();
                ui_state.focus_field = false;
            }
            if response.changed() {
                action = Some(UiAction::RenameText(text));
            }
            if response.has_focus() || response.lost_focus() {
                if let Some(key) = field_key(ui) {
                    action = Some(UiAction::RenameKey(key));
                }
            }
        });

    action
}

fn render_warning(ctx: &Context, ui_state: &UiState) -> Option<UiAction> {
    let message = ui_state.warning.as_ref()?;
    let mut action = None;

    egui::Area::new(egui::Id::new("warning"))
        .anchor(Align2::CENTER_BOTTOM, Vec2::new(0.0, -12.0))
        .show(ctx, |ui| {
            panel_frame().fill(theme::WARNING_BG).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(message).color(theme::TEXT));
                    if ui.small_button("✕").clicked() {
                        action = Some(UiAction::DismissWarning);
                    }
                });
            });
        });

    action
}

/// Render the keyboard shortcuts modal.
fn render_shortcuts_modal(ctx: &Context, ui_state: &mut UiState) {
    use crate::shortcuts::ShortcutRegistry;

    // Backdrop
    egui::Area::new(egui::Id::new("shortcuts_backdrop"))
        .fixed_pos(Pos2::ZERO)
        .order(egui::Order::Background)
        .show(ctx, |ui| {
            let screen_rect = ctx.input(|i| i.content_rect());
            let response = ui.allocate_rect(screen_rect, egui::Sense::click());
            ui.painter().rect_filled(screen_rect, 0.0, Color32::from_black_alpha(80));
            if response.clicked() {
                ui_state.help_open = false;
            }
        });

    egui::Area::new(egui::Id::new("shortcuts_modal"))
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.set_width(420.0);
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new("Keyboard Shortcuts").size(16.0).strong());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("✕").clicked() {
                                ui_state.help_open = false;
                            }
                        });
                    });

                    ui.add_space(12.0);

                    for shortcut in ShortcutRegistry::all() {
                        ui.horizontal(|ui| {
                            ui.label(
                                egui::RichText::new(shortcut.format())
                                    .size(12.0)
                                    .family(egui::FontFamily::Monospace)
                                    .color(Color32::from_rgb(100, 116, 139)),
                            );
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                ui.label(egui::RichText::new(shortcut.description).size(12.0).color(theme::TEXT));
                            });
                        });
                        ui.add_space(4.0);
                    }
                });
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use wellpad_core::{Modifiers, PointerButton};

    #[test]
    fn test_sync_mirrors_editor() {
        let mut editor = SiteEditor::default();
        editor.apply(EditorCommand::ToggleGrid);
        editor.apply(EditorCommand::SetTool(ToolKind::Pan));

        let mut state = UiState::new(Palette::builtin("assets/symbols"));
        state.sync(&editor);
        assert_eq!(state.current_tool, ToolKind::Pan);
        assert!(!state.show_grid);
        assert_eq!(state.well_count, 4);
        assert!(state.overlay.is_none());
    }

    #[test]
    fn test_sync_tracks_overlay_position() {
        let mut editor = SiteEditor::default();
        let anchor = editor.document().wells()[0].height_anchor();
        let screen = editor.viewport().world_to_screen(anchor);
        editor.pointer_down(screen, PointerButton::Primary, Modifiers::NONE);
        editor.pointer_up(screen, PointerButton::Primary);

        let mut state = UiState::new(Palette::new(Vec::new()));
        state.sync(&editor);
        let view = state.overlay.clone().unwrap();
        assert!((view.position.x as f64 - screen.x).abs() < 1e-3);
        assert!(state.focus_field);

        editor.wheel(Point::new(0.0, 0.0), kurbo::Vec2::new(30.0, 0.0), Modifiers::NONE);
        state.sync(&editor);
        let moved = state.overlay.unwrap();
        assert!((moved.position.x - view.position.x - 30.0).abs() < 1e-3);
    }
}
