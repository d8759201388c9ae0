use anyhow::{Context, Result};
use clap::Parser;
use cubegrid_assets::{AssetManifest, LoadState, SceneTextures};
use cubegrid_common::{SceneConfig, Variant};
use cubegrid_input::{Action, Key};
use cubegrid_render::{aspect_ratio, FrameLoop, FramePlan, FrameTimer};
use cubegrid_render_wgpu::{CubeGridRenderer, GpuContext, RenderOptions};
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "cubegrid-desktop", about = "Cube grid desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the rendering variant (textured | flat)
    #[arg(long)]
    variant: Option<Variant>,

    /// Draw the cube-map skybox
    #[arg(long)]
    skybox: bool,

    /// Asset manifest (JSON); overrides the config file
    #[arg(long)]
    assets: Option<PathBuf>,
}

/// Map a physical key to a scene key. Unbound keys are ignored.
fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::PageUp => Some(Key::PageUp),
        KeyCode::PageDown => Some(Key::PageDown),
        KeyCode::ArrowLeft => Some(Key::ArrowLeft),
        KeyCode::ArrowRight => Some(Key::ArrowRight),
        KeyCode::ArrowUp => Some(Key::ArrowUp),
        KeyCode::ArrowDown => Some(Key::ArrowDown),
        KeyCode::KeyP => Some(Key::P),
        _ => None,
    }
}

fn load_state_label(state: Option<LoadState>) -> &'static str {
    match state {
        None => "off",
        Some(LoadState::Pending) => "loading",
        Some(LoadState::Ready) => "ready",
        Some(LoadState::Failed) => "failed (placeholder)",
    }
}

/// Scene state that exists before and independently of the window.
struct Scene {
    config: SceneConfig,
    frame_loop: FrameLoop,
    textures: SceneTextures,
    timer: FrameTimer,
    last_frame: Instant,
    show_hud: bool,
}

impl Scene {
    fn new(config: SceneConfig, manifest: &AssetManifest) -> Self {
        let textures = SceneTextures::spawn(manifest, config.variant.is_textured(), config.skybox);
        Self {
            frame_loop: FrameLoop::new(&config),
            textures,
            timer: FrameTimer::new(120),
            last_frame: Instant::now(),
            show_hud: true,
            config,
        }
    }
}

/// Snapshot of what the HUD shows for one frame.
struct HudInfo {
    frame: u64,
    fps: f32,
    eye: [f32; 3],
    target: [f32; 3],
    yaw: f32,
    pitch: f32,
    visible: usize,
    pointer: &'static str,
    cube_texture: &'static str,
    skybox: &'static str,
    textures: String,
}

impl HudInfo {
    fn collect(scene: &Scene, plan: &FramePlan, bound_texture: (u32, u32)) -> Self {
        let pointer = scene.frame_loop.pointer();
        Self {
            frame: plan.frame,
            fps: scene.timer.fps(),
            eye: plan.camera.eye.to_array(),
            target: plan.camera.target.to_array(),
            yaw: plan.camera.yaw(),
            pitch: plan.camera.pitch(),
            visible: plan.visible_count(),
            pointer: if !pointer.is_supported() {
                "unsupported"
            } else if pointer.is_locked() {
                "locked"
            } else {
                "free"
            },
            cube_texture: load_state_label(scene.textures.cube.as_ref().map(|l| l.state())),
            skybox: load_state_label(scene.textures.skybox.as_ref().map(|l| l.state())),
            textures: texture_summary(scene.textures.settled(), bound_texture),
        }
    }
}

fn texture_summary(settled: bool, (width, height): (u32, u32)) -> String {
    let state = if settled { "settled" } else { "loading" };
    format!("Bound: {width}x{height} ({state})")
}

fn draw_hud(ctx: &EguiContext, hud: &HudInfo) {
    egui::Window::new("Cube Grid")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("Frame {}  ({:.0} fps)", hud.frame, hud.fps));
            ui.label(format!("Visible cubes: {}", hud.visible));
            ui.separator();
            ui.label(format!(
                "Eye: ({:.2}, {:.2}, {:.2})",
                hud.eye[0], hud.eye[1], hud.eye[2]
            ));
            ui.label(format!(
                "Target: ({:.2}, {:.2}, {:.2})",
                hud.target[0], hud.target[1], hud.target[2]
            ));
            ui.label(format!("Yaw: {:.3}  Pitch: {:.3}", hud.yaw, hud.pitch));
            ui.label(format!("Pointer: {}", hud.pointer));
            ui.separator();
            ui.label(format!("Cube texture: {}", hud.cube_texture));
            ui.label(format!("Skybox: {}", hud.skybox));
            ui.label(&hud.textures);
            ui.separator();
            ui.small("Arrows/PgUp/PgDn: move | P: pointer lock | Esc: release | F1: HUD");
        });
}

/// Grab or release the cursor to match the frame loop's pointer-lock state.
///
/// Tries a true lock first and falls back to confinement. If neither works the
/// feature is marked unsupported and mouse look stays off.
fn apply_pointer_lock(window: &Window, frame_loop: &mut FrameLoop) {
    if frame_loop.pointer().is_locked() {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => window.set_cursor_visible(false),
            Err(e) => {
                tracing::warn!(error = %e, "pointer lock unavailable; mouse look disabled");
                frame_loop.pointer_mut().mark_unsupported();
            }
        }
    } else {
        if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            tracing::debug!(error = %e, "cursor release failed");
        }
        window.set_cursor_visible(true);
    }
}

/// Window-bound GPU resources, created on resume.
struct Gfx {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: CubeGridRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gfx {
    fn new(event_loop: &ActiveEventLoop, config: &SceneConfig, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.window.title.as_str())
            .with_inner_size(PhysicalSize::new(config.window.width, config.window.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        let gpu = GpuContext::new(window.clone(), size.width, size.height)?;
        let (width, height) = gpu.size();
        let renderer = CubeGridRenderer::new(
            &gpu.device,
            &gpu.queue,
            gpu.format(),
            width,
            height,
            &RenderOptions::from(config),
        )?;

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.format(), None, 1, false);

        Ok(Self {
            window,
            gpu,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        let (width, height) = self.gpu.size();
        self.renderer.resize(&self.gpu.device, width, height);
    }

    /// Run egui and paint its output over `view`.
    fn paint_ui(
        &mut self,
        ctx: &EguiContext,
        view: &wgpu::TextureView,
        run_ui: impl FnMut(&EguiContext),
    ) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = ctx.run(raw_input, run_ui);
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = self.gpu.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = &self.gpu.device;
        let queue = &self.gpu.queue;
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        self.egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct App {
    scene: Scene,
    egui_ctx: EguiContext,
    gfx: Option<Gfx>,
    /// Fatal startup error, reported once the event loop returns.
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: SceneConfig, manifest: &AssetManifest) -> Self {
        Self {
            scene: Scene::new(config, manifest),
            egui_ctx: EguiContext::default(),
            gfx: None,
            error: None,
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        let Some(gfx) = &self.gfx else {
            return;
        };
        let frame_loop = &mut self.scene.frame_loop;
        match code {
            KeyCode::F1 => self.scene.show_hud = !self.scene.show_hud,
            KeyCode::Escape => {
                frame_loop.pointer_mut().release();
                apply_pointer_lock(&gfx.window, frame_loop);
            }
            _ => {
                let Some(key) = map_key(code) else {
                    return;
                };
                if frame_loop.handle_key(key) == Action::TogglePointerLock {
                    apply_pointer_lock(&gfx.window, frame_loop);
                }
            }
        }
    }

    /// One animation frame: tick, swap in loaded textures, draw, then request the next frame.
    fn redraw(&mut self) {
        let Some(gfx) = &mut self.gfx else {
            return;
        };
        let scene = &mut self.scene;

        let now = Instant::now();
        scene.timer.record(now - scene.last_frame);
        scene.last_frame = now;

        let (width, height) = gfx.gpu.size();
        let plan = scene.frame_loop.tick(aspect_ratio(width, height));
        gfx.renderer
            .apply_textures(&gfx.gpu.device, &gfx.gpu.queue, &mut scene.textures);

        let output = match gfx.gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gfx.gpu.reconfigure();
                gfx.window.request_redraw();
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                gfx.window.request_redraw();
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        gfx.renderer
            .render(&gfx.gpu.device, &gfx.gpu.queue, &view, &plan);

        if scene.show_hud {
            let hud = HudInfo::collect(scene, &plan, gfx.renderer.cube_texture_size());
            gfx.paint_ui(&self.egui_ctx, &view, |ctx| draw_hud(ctx, &hud));
        }

        output.present();
        gfx.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() {
            return;
        }
        match Gfx::new(event_loop, &self.scene.config, &self.egui_ctx) {
            Ok(gfx) => {
                gfx.window.request_redraw();
                self.gfx = Some(gfx);
            }
            Err(e) => {
                tracing::error!("startup failed: {e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gfx) = &mut self.gfx {
            let response = gfx.egui_winit.on_window_event(&gfx.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gfx) = &mut self.gfx {
                    gfx.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::Focused(false) => {
                if let Some(gfx) = &self.gfx {
                    self.scene.frame_loop.pointer_mut().release();
                    apply_pointer_lock(&gfx.window, &mut self.scene.frame_loop);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.handle_key(code);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.scene
                .frame_loop
                .handle_mouse_motion(delta.0 as f32, delta.1 as f32);
        }
    }
}

fn load_config(cli: &Cli) -> Result<SceneConfig> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }
    if cli.skybox {
        config.skybox = true;
    }
    if let Some(assets) = &cli.assets {
        config.assets = Some(assets.clone());
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!("cubegrid-desktop starting");

    let config = load_config(&cli)?;
    let manifest = match &config.assets {
        Some(path) => AssetManifest::load(path)
            .with_context(|| format!("failed to load asset manifest {}", path.display()))?,
        None => AssetManifest::default(),
    };
    tracing::info!(variant = ?config.variant, skybox = config.skybox, "scene configured");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, &manifest);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
