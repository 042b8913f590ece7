//! Core application state and lifecycle.

use kurbo::{Point, Rect, Size};
use peniko::Color;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;
use vello::util::RenderSurface;
use vello::wgpu::{PresentMode, SurfaceTexture, TextureView};
use vello::{AaConfig, RenderParams, RendererOptions, Scene};
use wellpad_core::entities::{LibrarySymbol, Spacing, Well};
use wellpad_core::{
    EditorAction, EditorCommand, EditorConfig, EditorHost, EntityId, InitialWells, Modifiers, Palette,
    SiteEditor, SymbolUpdate,
};
use wellpad_render::{PngRenderResult, RenderContext, RenderResult, Renderer, RendererError, VelloRenderer};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use crate::event_handler::EventHandler;
use crate::image_loader::{LoadedImage, SymbolImageLoader};
use crate::shortcuts::ShortcutRegistry;
use crate::ui::{render_ui, UiAction, UiState};

/// Environment variable holding the initial well count.
pub const WELLS_ENV: &str = "WELLPAD_WELLS";

/// Default file name for raster exports.
pub const PNG_FILE_NAME: &str = "site-layout.png";

/// Default file name for document exports.
pub const JSON_FILE_NAME: &str = "site-layout.json";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    EmptyScene,
    #[error("Export of {width}x{height} exceeds the {max}px texture limit")]
    TooLarge { width: u64, height: u64, max: u32 },
    #[error("Render failed: {0}")]
    Render(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Application startup errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

#[cfg(feature = "native")]
mod file_ops {
    use super::{ExportError, JSON_FILE_NAME, PNG_FILE_NAME};
    use std::path::PathBuf;

    /// Save document JSON through a native file dialog.
    pub fn save_document(json: &str) -> Result<Option<PathBuf>, ExportError> {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Site layout", &["json"])
            .set_file_name(JSON_FILE_NAME)
            .save_file()
        else {
            return Ok(None);
        };
        std::fs::write(&path, json)?;
        Ok(Some(path))
    }

    /// Pick and read a document JSON file.
    pub fn open_document() -> Result<Option<String>, ExportError> {
        let Some(path) = rfd::FileDialog::new().add_filter("Site layout", &["json"]).pick_file() else {
            return Ok(None);
        };
        Ok(Some(std::fs::read_to_string(path)?))
    }

    /// Save PNG bytes, defaulting to `site-layout.png`.
    pub fn save_png(png_data: &[u8]) -> Result<Option<PathBuf>, ExportError> {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG image", &["png"])
            .set_file_name(PNG_FILE_NAME)
            .save_file()
        else {
            return Ok(None);
        };
        std::fs::write(&path, png_data)?;
        Ok(Some(path))
    }
}

#[cfg(not(feature = "native"))]
mod file_ops {
    use super::{ExportError, JSON_FILE_NAME, PNG_FILE_NAME};
    use std::path::PathBuf;

    // Without dialogs, files go to the working directory.

    pub fn save_document(json: &str) -> Result<Option<PathBuf>, ExportError> {
        let path = PathBuf::from(JSON_FILE_NAME);
        std::fs::write(&path, json)?;
        Ok(Some(path))
    }

    pub fn open_document() -> Result<Option<String>, ExportError> {
        match std::fs::read_to_string(JSON_FILE_NAME) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_png(png_data: &[u8]) -> Result<Option<PathBuf>, ExportError> {
        let path = PathBuf::from(PNG_FILE_NAME);
        std::fs::write(&path, png_data)?;
        Ok(Some(path))
    }
}

/// Pixel size of an export scene's bounds, checked against the device limit.
pub fn export_texture_size(bounds: Rect, max_dimension: u32) -> Result<(u32, u32), ExportError> {
    let width = bounds.width().ceil();
    let height = bounds.height().ceil();
    if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
        return Err(ExportError::EmptyScene);
    }
    let (width, height) = (width as u64, height as u64);
    if width > max_dimension as u64 || height > max_dimension as u64 {
        return Err(ExportError::TooLarge {
            width,
            height,
            max: max_dimension,
        });
    }
    Ok((width as u32, height as u32))
}

/// Render a Vello scene to RGBA pixels through an offscreen texture (blocking).
fn render_scene_to_png(
    device: &vello::wgpu::Device,
    queue: &vello::wgpu::Queue,
    vello_renderer: &mut vello::Renderer,
    scene: &Scene,
    width: u32,
    height: u32,
) -> Result<PngRenderResult, ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyScene);
    }

    let texture = device.create_texture(&vello::wgpu::TextureDescriptor {
        label: Some("png export texture"),
        size: vello::wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: vello::wgpu::TextureDimension::D2,
        format: vello::wgpu::TextureFormat::Rgba8Unorm,
        usage: vello::wgpu::TextureUsages::STORAGE_BINDING
            | vello::wgpu::TextureUsages::COPY_SRC
            | vello::wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let texture_view = texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

    let params = RenderParams {
        base_color: Color::WHITE,
        width,
        height,
        antialiasing_method: AaConfig::Area,
    };
    vello_renderer
        .render_to_texture(device, queue, scene, &texture_view, &params)
        .map_err(|e| ExportError::Render(format!("{e:?}")))?;

    // wgpu requires 256-byte aligned rows
    let row_bytes = width as u64 * 4;
    let padded_row_bytes = row_bytes.next_multiple_of(256);
    let bytes_per_row = u32::try_from(padded_row_bytes)
        .map_err(|_| ExportError::Render(format!("row of {padded_row_bytes} bytes is too wide")))?;
    let readback_buffer = device.create_buffer(&vello::wgpu::BufferDescriptor {
        label: Some("png readback buffer"),
        size: padded_row_bytes * height as u64,
        usage: vello::wgpu::BufferUsages::COPY_DST | vello::wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
        label: Some("png copy encoder"),
    });
    encoder.copy_texture_to_buffer(
        vello::wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: vello::wgpu::Origin3d::ZERO,
            aspect: vello::wgpu::TextureAspect::All,
        },
        vello::wgpu::TexelCopyBufferInfo {
            buffer: &readback_buffer,
            layout: vello::wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        vello::wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let buffer_slice = readback_buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(vello::wgpu::MapMode::Read, move |result| {
        tx.send(result).ok();
    });
    let _ = device.poll(vello::wgpu::PollType::wait_indefinitely());

    match rx.recv() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(ExportError::Render(format!("buffer map failed: {e:?}"))),
        Err(_) => return Err(ExportError::Render("buffer map callback dropped".to_string())),
    }

    let data = buffer_slice.get_mapped_range();
    let mut rgba_data = Vec::with_capacity((row_bytes * height as u64) as usize);
    for row in data.chunks(padded_row_bytes as usize).take(height as usize) {
        rgba_data.extend_from_slice(&row[..row_bytes as usize]);
    }
    drop(data);
    readback_buffer.unmap();

    Ok(PngRenderResult {
        rgba_data,
        width,
        height,
    })
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
    /// Number of wells generated at startup.
    pub initial_wells: usize,
    /// Prefix for built-in symbol image paths.
    pub symbol_base: String,
    /// Directory scanned for additional symbol images.
    pub symbol_dir: PathBuf,
    pub editor: EditorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Wellpad".to_string(),
            width: 1280,
            height: 800,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            initial_wells: 4,
            symbol_base: "assets/symbols".to_string(),
            symbol_dir: PathBuf::from("assets/symbols"),
            editor: EditorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults with overrides from the environment.
    pub fn from_env() -> Self {
        Self::default().with_well_count(std::env::var(WELLS_ENV).ok().as_deref())
    }

    /// Apply a well-count override; an unparsable value keeps the default.
    pub fn with_well_count(mut self, value: Option<&str>) -> Self {
        if let Some(value) = value {
            match value.trim().parse::<usize>() {
                Ok(count) => self.initial_wells = count,
                Err(e) => log::warn!("Ignoring {}={:?}: {}", WELLS_ENV, value, e),
            }
        }
        self
    }
}

/// Logs editor notifications and queues warnings for the UI.
struct AppHost {
    warnings: Rc<RefCell<Vec<String>>>,
}

impl EditorHost for AppHost {
    fn on_change(&mut self, wells: &[Well], spacings: &[Spacing], orientation_angle: f64) {
        log::debug!(
            "Site changed: {} wells, {} spacings, north at {:.1}°",
            wells.len(),
            spacings.len(),
            orientation_angle
        );
    }

    fn on_update_symbol(&mut self, update: SymbolUpdate) {
        log::debug!(
            "Symbol {} {:?} at ({:.1}, {:.1})",
            update.id,
            update.action,
            update.x,
            update.y
        );
    }

    fn on_symbol_placed(&mut self, symbol: &LibrarySymbol) {
        log::info!("Placed symbol '{}' at ({:.1}, {:.1})", symbol.key, symbol.transform.x, symbol.transform.y);
    }

    fn on_warning(&mut self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }
}

/// Runtime state for the application.
struct AppState {
    // Windowing
    window: Arc<Window>,
    surface: RenderSurface<'static>,

    // Rendering
    vello_renderer: vello::Renderer,
    site_renderer: VelloRenderer,
    /// Texture blitter for RGBA->surface format conversion
    texture_blitter: vello::wgpu::util::TextureBlitter,

    // egui
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    ui_state: UiState,

    // State
    editor: SiteEditor,
    event_handler: EventHandler,
    loader: Option<SymbolImageLoader>,
    warnings: Rc<RefCell<Vec<String>>>,
    /// PNG export requested at this pixel ratio; runs on the next frame.
    pending_png: Option<f64>,
    background_color: Color,
}

impl AppState {
    /// Carry out the work requested by the editor.
    fn run_actions(&mut self, actions: Vec<EditorAction>) {
        for action in actions {
            match action {
                EditorAction::Redraw => self.window.request_redraw(),
                EditorAction::ExportPng { pixel_ratio } => {
                    self.pending_png = Some(pixel_ratio);
                    self.window.request_redraw();
                }
                EditorAction::ExportJson(json) => match file_ops::save_document(&json) {
                    Ok(Some(path)) => log::info!("Saved document to {}", path.display()),
                    Ok(None) => {}
                    Err(e) => log::error!("Failed to save document: {}", e),
                },
                EditorAction::LoadSymbolImage { id, src } => self.load_symbol_image(id, src),
                EditorAction::ShowHelp => self.ui_state.help_open = !self.ui_state.help_open,
            }
        }
    }

    /// Size symbol `id` from its image, decoding `src` in the background
    /// unless it is already cached.
    fn load_symbol_image(&mut self, id: EntityId, src: String) {
        let images = self.site_renderer.images();
        if images.is_cached(&src) {
            if let Some((width, height)) = images.get(&src).map(|image| (image.width, image.height)) {
                let actions = self.editor.apply_symbol_natural_size(id, width as f64, height as f64);
                self.run_actions(actions);
            }
            return;
        }
        match &mut self.loader {
            Some(loader) => loader.request(id, src),
            None => log::warn!("No image loader; symbol {} keeps its placeholder size", id),
        }
    }

    fn handle_ui_action(&mut self, action: UiAction) {
        let actions = match action {
            UiAction::Command(command) => {
                self.editor.commit_editors();
                self.editor.apply(command)
            }
            UiAction::SaveDocument => {
                self.editor.commit_editors();
                self.editor.apply(EditorCommand::ExportJson)
            }
            UiAction::OpenDocument => match file_ops::open_document() {
                Ok(Some(json)) => self.editor.apply(EditorCommand::ImportJson(json)),
                Ok(None) => Vec::new(),
                Err(e) => {
                    log::error!("Failed to open document: {}", e);
                    Vec::new()
                }
            },
            UiAction::OverlayText(text) => {
                self.editor.overlay_mut().set_text(text);
                vec![EditorAction::Redraw]
            }
            UiAction::OverlayUnit(unit) => {
                self.editor.overlay_mut().set_unit(unit);
                vec![EditorAction::Redraw]
            }
            UiAction::RenameText(text) => {
                self.editor.rename_mut().set_text(text);
                vec![EditorAction::Redraw]
            }
            UiAction::OverlayKey(key) | UiAction::RenameKey(key) => self.editor.key_down(key, Modifiers::NONE, false),
            UiAction::DropSymbol { payload, position } => {
                self.editor.drop_payload(&payload, Point::new(position.x as f64, position.y as f64))
            }
            UiAction::DismissWarning => {
                self.ui_state.warning = None;
                Vec::new()
            }
        };
        self.run_actions(actions);
    }

    /// Apply finished image decodes and surface queued warnings.
    fn drain_background_results(&mut self) {
        let loaded = self.loader.as_mut().map(SymbolImageLoader::poll).unwrap_or_default();
        for LoadedImage { src, ids, image } in loaded {
            match image {
                Ok(image) => {
                    let (width, height) = (image.width as f64, image.height as f64);
                    self.site_renderer.images_mut().insert(src, Some(image));
                    for id in ids {
                        let actions = self.editor.apply_symbol_natural_size(id, width, height);
                        self.run_actions(actions);
                    }
                }
                Err(e) => {
                    log::warn!("Drawing symbol without its image: {}", e);
                    self.site_renderer.images_mut().insert(src, None);
                    self.window.request_redraw();
                }
            }
        }

        if let Some(last) = self.warnings.borrow_mut().drain(..).last() {
            self.ui_state.warning = Some(last);
        }
    }

    /// Rasterize the document and offer it as `site-layout.png`.
    fn export_png(
        &mut self,
        device: &vello::wgpu::Device,
        queue: &vello::wgpu::Queue,
        pixel_ratio: f64,
    ) -> Result<Option<PathBuf>, ExportError> {
        let max_dimension = device.limits().max_texture_dimension_2d;
        let (scene, bounds) = self.site_renderer.build_export_scene(
            self.editor.document(),
            pixel_ratio,
            self.editor.show_labels(),
            max_dimension,
        );
        let bounds = bounds.ok_or(ExportError::EmptyScene)?;
        let (width, height) = export_texture_size(bounds, max_dimension)?;
        log::info!("Exporting PNG: {}x{}", width, height);

        let result = render_scene_to_png(device, queue, &mut self.vello_renderer, &scene, width, height)?;
        let png_data = encode_png(&result.rgba_data, result.width, result.height)?;
        file_ops::save_png(&png_data)
    }

    /// Render the site scene and blit it onto the next surface texture.
    fn render_canvas(
        &mut self,
        device: &vello::wgpu::Device,
        queue: &vello::wgpu::Queue,
        scene: &Scene,
        width: u32,
        height: u32,
    ) -> RenderResult<(SurfaceTexture, TextureView)> {
        let surface_texture = self
            .surface
            .surface
            .get_current_texture()
            .map_err(|e| RendererError::Surface(format!("{e:?}")))?;

        let params = RenderParams {
            base_color: self.background_color,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };

        // Vello needs a StorageBinding Rgba8Unorm target; the surface may be Bgra8Unorm.
        let render_texture = device.create_texture(&vello::wgpu::TextureDescriptor {
            label: Some("vello render texture"),
            size: vello::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: vello::wgpu::TextureDimension::D2,
            format: vello::wgpu::TextureFormat::Rgba8Unorm,
            usage: vello::wgpu::TextureUsages::STORAGE_BINDING
                | vello::wgpu::TextureUsages::COPY_SRC
                | vello::wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let render_texture_view = render_texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

        self.vello_renderer
            .render_to_texture(device, queue, scene, &render_texture_view, &params)
            .map_err(|e| RendererError::RenderFailed(format!("{e:?}")))?;

        let surface_view = surface_texture
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());

        let mut blit_encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
            label: Some("blit encoder"),
        });
        self.texture_blitter
            .copy(device, &mut blit_encoder, &render_texture_view, &surface_view);
        queue.submit(std::iter::once(blit_encoder.finish()));

        Ok((surface_texture, surface_view))
    }

    fn redraw(&mut self, render_cx: &vello::util::RenderContext) {
        let width = self.surface.config.width;
        let height = self.surface.config.height;
        let scale_factor = self.window.scale_factor();
        let logical_size = Size::new(width as f64 / scale_factor, height as f64 / scale_factor);
        self.editor.set_viewport_size(logical_size);

        self.drain_background_results();
        self.ui_state.sync(&self.editor);

        // Run egui and get any action
        let egui_input = self.egui_state.take_egui_input(&self.window);
        let mut ui_action = None;
        let egui_output = self.egui_ctx.run(egui_input, |ctx| {
            ui_action = render_ui(ctx, &mut self.ui_state);
        });
        self.egui_state.handle_platform_output(&self.window, egui_output.platform_output);
        let egui_primitives = self.egui_ctx.tessellate(egui_output.shapes, egui_output.pixels_per_point);

        if let Some(action) = ui_action {
            self.handle_ui_action(action);
        }

        let device_handle = &render_cx.devices[self.surface.dev_id];
        let device = &device_handle.device;
        let queue = &device_handle.queue;

        if let Some(pixel_ratio) = self.pending_png.take() {
            match self.export_png(device, queue, pixel_ratio) {
                Ok(Some(path)) => log::info!("PNG export complete: {}", path.display()),
                Ok(None) => {}
                Err(e) => {
                    log::error!("PNG export failed: {}", e);
                    self.ui_state.warning = Some(format!("PNG export failed: {e}"));
                }
            }
        }

        let ctx = RenderContext::new(&self.editor, logical_size)
            .with_scale_factor(scale_factor)
            .with_background(self.background_color);
        self.site_renderer.build_scene(&ctx);
        let scene = self.site_renderer.take_scene();

        let (surface_texture, surface_view) = match self.render_canvas(device, queue, &scene, width, height) {
            Ok(target) => target,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };

        for (id, image_delta) in &egui_output.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: egui_output.pixels_per_point,
        };

        {
            let mut egui_encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                label: Some("egui encoder"),
            });
            self.egui_renderer.update_buffers(
                device,
                queue,
                &mut egui_encoder,
                &egui_primitives,
                &screen_descriptor,
            );

            let render_pass = egui_encoder.begin_render_pass(&vello::wgpu::RenderPassDescriptor {
                label: Some("egui render pass"),
                color_attachments: &[Some(vello::wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: vello::wgpu::Operations {
                        load: vello::wgpu::LoadOp::Load, // Keep Vello content
                        store: vello::wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // egui-wgpu wants a 'static render pass
            let mut render_pass = render_pass.forget_lifetime();
            self.egui_renderer
                .render(&mut render_pass, &egui_primitives, &screen_descriptor);
            drop(render_pass);

            queue.submit(std::iter::once(egui_encoder.finish()));
        }

        for id in &egui_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
        surface_texture.present();

        // Keep frames coming so background results are picked up.
        self.window.request_redraw();
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    state: Option<AppState>,
    render_cx: Option<vello::util::RenderContext>,
}

impl App {
    /// Create a new application with configuration from the environment.
    pub fn new() -> Self {
        Self::with_config(AppConfig::from_env())
    }

    /// Create a new application with custom configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            render_cx: None,
        }
    }

    /// Run the application.
    pub async fn run() -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        let mut app = App::new();
        event_loop.run_app(&mut app)?;
        Ok(())
    }

    /// Finish initialization after the surface is created.
    fn finish_init(&mut self, window: Arc<Window>, surface: RenderSurface<'static>) -> Result<(), RendererError> {
        let render_cx = self
            .render_cx
            .as_ref()
            .ok_or_else(|| RendererError::InitFailed("render context missing".to_string()))?;
        let device = &render_cx.devices[surface.dev_id].device;

        let vello_renderer = vello::Renderer::new(device, RendererOptions::default())
            .map_err(|e| RendererError::InitFailed(format!("{e:?}")))?;

        let texture_blitter = vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(device, surface.config.format, egui_wgpu::RendererOptions::default());

        let warnings = Rc::new(RefCell::new(Vec::new()));
        let host = AppHost {
            warnings: Rc::clone(&warnings),
        };
        let editor = SiteEditor::new(
            self.config.editor.clone(),
            InitialWells::Count(self.config.initial_wells),
            Box::new(host),
        );

        let loader = match SymbolImageLoader::spawn() {
            Ok(loader) => Some(loader),
            Err(e) => {
                log::error!("Failed to start image loader: {}", e);
                None
            }
        };

        let palette = Palette::with_directory(&self.config.symbol_base, &self.config.symbol_dir);

        log::info!("Wellpad initialized - {}x{}", surface.config.width, surface.config.height);
        ShortcutRegistry::log_all();

        self.state = Some(AppState {
            window: window.clone(),
            surface,
            vello_renderer,
            site_renderer: VelloRenderer::new(),
            texture_blitter,
            egui_ctx,
            egui_state,
            egui_renderer,
            ui_state: UiState::new(palette),
            editor,
            event_handler: EventHandler::new(window.scale_factor()),
            loader,
            warnings,
            pending_png: None,
            background_color: self.config.background_color,
        });

        window.request_redraw();
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };

        let render_cx = self.render_cx.get_or_insert_with(vello::util::RenderContext::new);
        let surface = match pollster::block_on(render_cx.create_surface(
            window.clone(),
            width,
            height,
            PresentMode::AutoVsync,
        )) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {:?}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.finish_init(window, surface) {
            log::error!("{}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        // Let egui process the event first
        let egui_response = state.egui_state.on_window_event(&state.window, &event);
        if egui_response.repaint {
            state.window.request_redraw();
        }
        let ui_wants_pointer = state.egui_ctx.is_pointer_over_area()
            || state.egui_ctx.wants_pointer_input()
            || egui::DragAndDrop::has_any_payload(&state.egui_ctx);
        let ui_wants_keyboard = state.egui_ctx.wants_keyboard_input();

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                if let Some(render_cx) = self.render_cx.as_mut() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }
                state.window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                state.event_handler.set_scale_factor(scale_factor);
                state.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                if let Some(render_cx) = self.render_cx.as_ref() {
                    state.redraw(render_cx);
                }
            }

            event => {
                let actions = state.event_handler.handle_window_event(
                    &mut state.editor,
                    &event,
                    ui_wants_pointer,
                    ui_wants_keyboard,
                );
                state.run_actions(actions);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_count_override() {
        assert_eq!(AppConfig::default().with_well_count(Some("7")).initial_wells, 7);
        assert_eq!(AppConfig::default().with_well_count(Some(" 0 ")).initial_wells, 0);
        assert_eq!(AppConfig::default().with_well_count(Some("many")).initial_wells, 4);
        assert_eq!(AppConfig::default().with_well_count(None).initial_wells, 4);
    }

    #[test]
    fn test_encode_png() {
        let rgba = vec![255u8; 3 * 2 * 4];
        let png_data = encode_png(&rgba, 3, 2).unwrap();
        assert_eq!(&png_data[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png_data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[test]
    fn test_encode_png_rejects_short_buffer() {
        assert!(matches!(encode_png(&[0u8; 4], 3, 2), Err(ExportError::Encode(_))));
    }

    #[test]
    fn test_app_host_queues_warnings() {
        let warnings = Rc::new(RefCell::new(Vec::new()));
        let mut editor = SiteEditor::new(
            EditorConfig::default(),
            InitialWells::Count(2),
            Box::new(AppHost {
                warnings: Rc::clone(&warnings),
            }),
        );
        editor.import_json("{ not json");
        assert!(!warnings.borrow().is_empty());
    }

    #[test]
    fn test_export_texture_size_limits() {
        let bounds = Rect::new(0.0, 0.0, 8680.0, 508.0);
        assert!(matches!(
            export_texture_size(bounds, 8192),
            Err(ExportError::TooLarge { width: 8680, height: 508, max: 8192 })
        ));
        assert_eq!(export_texture_size(Rect::new(0.0, 0.0, 99.2, 40.0), 8192).unwrap(), (100, 40));
        assert!(matches!(export_texture_size(Rect::ZERO, 8192), Err(ExportError::EmptyScene)));
    }

    #[test]
    fn test_long_row_exports_within_limit() {
        let editor = SiteEditor::new(EditorConfig::default(), InitialWells::Count(36), Box::new(wellpad_core::NullHost));
        let mut renderer = VelloRenderer::new();
        let (_scene, bounds) = renderer.build_export_scene(editor.document(), 2.0, true, 8192);
        let (width, height) = export_texture_size(bounds.unwrap(), 8192).unwrap();
        assert!(width <= 8192 && height <= 8192);
    }
}
