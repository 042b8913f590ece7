//! Vello-based renderer implementation.

use crate::images::SymbolImages;
use crate::renderer::{EntityRenderer, RenderContext, Renderer};
use kurbo::{Affine, BezPath, Circle, Line, Point, Rect, RoundedRect, Shape as KurboShape, Size, Stroke, Vec2};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, FontFamily, FontStack, GenericFamily, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use vello::Scene;
use wellpad_core::document::SiteDocument;
use wellpad_core::entities::{
    format_length, LibrarySymbol, OrientationMarker, Spacing, Well, HEIGHT_LABEL_SIZE, SPACING_LABEL_SIZE,
    WELL_RADIUS,
};
use wellpad_core::grid::grid_lines;
use wellpad_core::selection::{symbol_handles, Handle, HandleKind, HANDLE_SIZE};
use wellpad_core::{EntityId, EntityRef, SymbolTransform};

/// Result of PNG rendering - contains the raw RGBA pixel data and dimensions.
#[derive(Debug)]
pub struct PngRenderResult {
    /// RGBA pixel data (4 bytes per pixel).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

/// Padding around exported content, in document units.
pub const EXPORT_PADDING: f64 = 20.0;

/// Largest pixel ratio at which `content` (document units) fits in a
/// `max_dimension` square texture, capped at `requested`.
pub fn fit_export_ratio(content: Size, requested: f64, max_dimension: u32) -> f64 {
    let longest = content.width.max(content.height);
    if !(longest.is_finite() && longest > 0.0) {
        return requested;
    }
    // One pixel of slack so rounding up never exceeds the limit.
    let limit = (max_dimension.max(1) as f64 - 1.0).max(1.0) / longest;
    requested.min(limit)
}

const INK: Color = Color::from_rgba8(31, 41, 55, 255);
const WELL_FILL: Color = Color::from_rgba8(255, 255, 255, 255);
const SPACING_LINE: Color = Color::from_rgba8(107, 114, 128, 255);
const READOUT_FILL: Color = Color::from_rgba8(255, 251, 235, 255);
const READOUT_BORDER: Color = Color::from_rgba8(217, 119, 6, 255);
const MARKER_FILL: Color = Color::from_rgba8(220, 38, 38, 255);

const NAME_FONT_SIZE: f32 = 13.0;
const READOUT_FONT_SIZE: f32 = 12.0;

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Selection highlight color.
    selection_color: Color,
    /// Font context for text rendering (system fonts).
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
    /// Current zoom level (for zoom-independent UI elements).
    zoom: f64,
    /// Decoded symbol images keyed by source path.
    images: SymbolImages,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            selection_color: Color::from_rgba8(59, 130, 246, 255),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            zoom: 1.0,
            images: SymbolImages::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    pub fn images(&self) -> &SymbolImages {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut SymbolImages {
        &mut self.images
    }

    /// Build a scene for export (entities only, no grid or selection).
    /// Returns the scene and the scaled bounds (for texture dimensions).
    ///
    /// `pixel_ratio` is the export resolution multiplier. It is lowered when
    /// the document would not fit in a `max_dimension` texture.
    pub fn build_export_scene(
        &mut self,
        document: &SiteDocument,
        pixel_ratio: f64,
        show_labels: bool,
        max_dimension: u32,
    ) -> (Scene, Option<Rect>) {
        self.scene.reset();

        let Some(bounds) = document.bounds() else {
            return (std::mem::take(&mut self.scene), None);
        };
        let padded = bounds.inflate(EXPORT_PADDING, EXPORT_PADDING);
        let fitted = fit_export_ratio(padded.size(), pixel_ratio, max_dimension);
        if fitted < pixel_ratio {
            log::warn!(
                "Export reduced from {}x to {:.3}x to fit the {}px texture limit",
                pixel_ratio,
                fitted,
                max_dimension
            );
        }
        let pixel_ratio = fitted;
        self.zoom = pixel_ratio;

        let transform = Affine::scale(pixel_ratio) * Affine::translate((-padded.x0, -padded.y0));
        let scaled = Rect::new(0.0, 0.0, padded.width() * pixel_ratio, padded.height() * pixel_ratio);

        self.scene.fill(Fill::NonZero, Affine::IDENTITY, Color::WHITE, None, &scaled);
        self.render_document(document, transform, show_labels, None);

        (std::mem::take(&mut self.scene), Some(scaled))
    }

    /// Draw all entities. `preview` replaces one symbol's placement while it is being transformed.
    fn render_document(
        &mut self,
        document: &SiteDocument,
        transform: Affine,
        labels: bool,
        preview: Option<(EntityId, SymbolTransform)>,
    ) {
        let wells = document.wells();
        for (pair, spacing) in wells.windows(2).zip(document.spacings()) {
            self.render_spacing(&pair[0], &pair[1], &spacing.label(), transform, labels);
        }

        for symbol in document.symbols() {
            let placement = match preview {
                Some((id, t)) if id == symbol.id() => t,
                _ => symbol.transform,
            };
            let selected = document.is_selected(EntityRef::Symbol(symbol.id()));
            self.render_symbol(symbol, &placement, transform, selected);
        }

        for well in wells {
            let selected = document.is_selected(EntityRef::Well(well.id()));
            self.render_well(well, transform, selected, labels);
        }

        self.render_orientation(document.orientation(), transform);
    }

    /// Lay out `text` and draw it centered on `center` (document units).
    fn render_label(&mut self, text: &str, center: Point, font_size: f32, color: Color, transform: Affine) {
        if text.is_empty() {
            return;
        }
        let brush = Brush::Solid(color);

        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(font_size));
        builder.push_default(StyleProperty::Brush(brush.clone()));
        builder.push_default(StyleProperty::FontStack(FontStack::Single(FontFamily::Generic(
            GenericFamily::SansSerif,
        ))));
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());

        let size = Size::new(layout.width() as f64, layout.height() as f64);
        let text_transform =
            transform * Affine::translate((center.x - size.width / 2.0, center.y - size.height / 2.0));

        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let glyph_xform = run
                    .synthesis()
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph { id: glyph.id, x: gx, y: gy }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(run.font_size())
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }
    }

    /// Rounded pill with a centered value, used for height and spacing readouts.
    fn render_readout(&mut self, text: &str, center: Point, size: Size, transform: Affine) {
        let rect = RoundedRect::from_rect(Rect::from_center_size(center, size), 4.0);
        self.scene.fill(Fill::NonZero, transform, READOUT_FILL, None, &rect);
        self.scene.stroke(&Stroke::new(1.0), transform, READOUT_BORDER, None, &rect);
        self.render_label(text, center, READOUT_FONT_SIZE, INK, transform);
    }

    /// Render the grid in screen space.
    fn render_grid(&mut self, ctx: &RenderContext, device: Affine) {
        let editor = ctx.editor;
        let lines = grid_lines(ctx.viewport_size, editor.config().grid_size, editor.viewport());
        if lines.vertical.is_empty() && lines.horizontal.is_empty() {
            return;
        }

        let mut path = BezPath::new();
        for &x in &lines.vertical {
            path.move_to(Point::new(x, 0.0));
            path.line_to(Point::new(x, ctx.viewport_size.height));
        }
        for &y in &lines.horizontal {
            path.move_to(Point::new(0.0, y));
            path.line_to(Point::new(ctx.viewport_size.width, y));
        }
        self.scene.stroke(&Stroke::new(0.5), device, ctx.grid_color, None, &path);
    }

    /// Render a single handle.
    /// Sizes are scaled inversely with zoom to maintain constant screen size.
    fn render_handle(&mut self, handle: &Handle, transform: Affine) {
        let size = HANDLE_SIZE / self.zoom;
        let stroke = Stroke::new(1.5 / self.zoom);
        let path = match handle.kind {
            HandleKind::Rotate => Circle::new(handle.position, size / 2.0).to_path(0.1),
            HandleKind::Corner(_) => Rect::from_center_size(handle.position, (size, size)).to_path(0.1),
        };

        self.scene.fill(Fill::NonZero, transform, Color::WHITE, None, &path);
        self.scene.stroke(&stroke, transform, self.selection_color, None, &path);
    }

    fn render_symbol_selection(&mut self, placement: &SymbolTransform, transform: Affine) {
        let stroke_width = 1.0 / self.zoom;
        let dash_len = 4.0 / self.zoom;
        let local = Rect::from_center_size(Point::ZERO, (placement.width, placement.height));
        let outline = Stroke::new(stroke_width).with_dashes(0.0, [dash_len, dash_len]);
        self.scene.stroke(
            &outline,
            transform * placement.affine(),
            self.selection_color,
            None,
            &local,
        );

        let handles = symbol_handles(placement, self.zoom);
        if let Some(rotate) = handles.iter().find(|h| h.kind == HandleKind::Rotate) {
            let top_center = placement.affine() * Point::new(0.0, -placement.height / 2.0);
            self.scene.stroke(
                &Stroke::new(stroke_width),
                transform,
                self.selection_color,
                None,
                &Line::new(top_center, rotate.position),
            );
        }
        for handle in &handles {
            self.render_handle(handle, transform);
        }
    }
}

impl EntityRenderer for VelloRenderer {
    fn render_well(&mut self, well: &Well, transform: Affine, selected: bool, labels: bool) {
        let center = well.position();
        let body = Circle::new(center, WELL_RADIUS);
        self.scene.fill(Fill::NonZero, transform, WELL_FILL, None, &body);
        self.scene.stroke(&Stroke::new(2.0), transform, INK, None, &body);

        let arm = WELL_RADIUS * 0.6;
        let mut cross = BezPath::new();
        cross.move_to(center - Vec2::new(arm, 0.0));
        cross.line_to(center + Vec2::new(arm, 0.0));
        cross.move_to(center - Vec2::new(0.0, arm));
        cross.line_to(center + Vec2::new(0.0, arm));
        self.scene.stroke(&Stroke::new(1.5), transform, INK, None, &cross);

        if selected {
            let ring = Circle::new(center, WELL_RADIUS + 4.0 / self.zoom);
            self.scene
                .stroke(&Stroke::new(2.0 / self.zoom), transform, self.selection_color, None, &ring);
        }

        if labels {
            self.render_label(&well.name, well.name_anchor(), NAME_FONT_SIZE, INK, transform);
        }
        // The height readout is the click target for height edits, so it stays visible.
        let height = format_length(well.height_value, well.height_unit);
        self.render_readout(&height, well.height_anchor(), HEIGHT_LABEL_SIZE, transform);
    }

    fn render_spacing(&mut self, from: &Well, to: &Well, label: &str, transform: Affine, labels: bool) {
        let (a, b) = (from.position(), to.position());
        let span = b - a;
        let length = span.hypot();
        if length > 2.0 * WELL_RADIUS {
            let dir = span / length;
            let line = Line::new(a + dir * WELL_RADIUS, b - dir * WELL_RADIUS);
            let dashed = Stroke::new(1.5).with_dashes(0.0, [6.0, 4.0]);
            self.scene.stroke(&dashed, transform, SPACING_LINE, None, &line);
        }

        if labels {
            let anchor = Spacing::anchor_between(a, b);
            self.render_readout(label, anchor, SPACING_LABEL_SIZE, transform);
        }
    }

    fn render_orientation(&mut self, marker: &OrientationMarker, transform: Affine) {
        let center = marker.position();
        let frame = transform * Affine::translate(center.to_vec2()) * Affine::rotate(marker.angle.to_radians());

        let ring = Circle::new(Point::ZERO, 22.0);
        self.scene.fill(Fill::NonZero, frame, Color::from_rgba8(255, 255, 255, 200), None, &ring);
        self.scene.stroke(&Stroke::new(1.5), frame, INK, None, &ring);

        let mut arrow = BezPath::new();
        arrow.move_to((0.0, -20.0));
        arrow.line_to((9.0, 10.0));
        arrow.line_to((0.0, 4.0));
        arrow.line_to((-9.0, 10.0));
        arrow.close_path();
        self.scene.fill(Fill::NonZero, frame, MARKER_FILL, None, &arrow);
        self.scene.stroke(&Stroke::new(1.0), frame, INK, None, &arrow);

        // Letter stays upright; only its position follows the angle.
        let tip = Affine::rotate(marker.angle.to_radians()) * Point::new(0.0, -32.0);
        self.render_label("N", center + tip.to_vec2(), NAME_FONT_SIZE, INK, transform);
    }

    fn render_symbol(&mut self, symbol: &LibrarySymbol, placement: &SymbolTransform, transform: Affine, selected: bool) {
        if let Some(image) = self.images.get(&symbol.src) {
            let image = image.clone();
            let local = transform
                * placement.affine()
                * Affine::translate((-placement.width / 2.0, -placement.height / 2.0))
                * Affine::scale_non_uniform(
                    placement.width / image.width as f64,
                    placement.height / image.height as f64,
                );
            self.scene.draw_image(&peniko::ImageBrush::from(image), local);
        }

        if selected {
            self.render_symbol_selection(placement, transform);
        }
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();
        self.selection_color = ctx.selection_color;

        let editor = ctx.editor;
        let viewport = editor.viewport();
        self.zoom = viewport.zoom;

        let device = Affine::scale(ctx.scale_factor);
        if editor.show_grid() {
            self.render_grid(ctx, device);
        }

        let transform = device * viewport.transform();
        self.render_document(editor.document(), transform, editor.show_labels(), editor.symbol_preview());
    }
}
