mod input_map;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use modelview_common::ViewerConfig;
use modelview_input::{InputEvent, PanDirection};
use modelview_kernel::{Controller, LoadProgress};
use modelview_render::RenderView;
use modelview_render_wgpu::WgpuRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "modelview-desktop", about = "Animated glTF model viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML viewer config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model to load, overriding the config's asset_path
    #[arg(long)]
    asset: Option<PathBuf>,
}

/// Application state.
struct AppState {
    controller: Controller,
    /// Created from the window's size at startup; resizing does not change
    /// the projection.
    view: Option<RenderView>,
    config: ViewerConfig,
    show_hud: bool,
    cursor: Vec2,
    last_frame: Instant,
}

impl AppState {
    fn new(config: ViewerConfig) -> Self {
        Self {
            controller: Controller::spawn_load(&config),
            view: None,
            config,
            show_hud: true,
            cursor: Vec2::ZERO,
            last_frame: Instant::now(),
        }
    }

    fn handle(&mut self, event: InputEvent) {
        self.controller.handle(&event);
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        self.controller.tick(dt);
        let eye = self.controller.state().camera_position();
        if let Some(view) = &mut self.view {
            *view = view.at(eye);
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        let state = self.controller.state();
        egui::Window::new("Viewer")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Model: {}", self.config.asset_path.display()));
                match self.controller.progress() {
                    LoadProgress::Loading(fraction) => {
                        ui.add(egui::ProgressBar::new(*fraction).show_percentage());
                    }
                    LoadProgress::Failed(e) => {
                        ui.colored_label(egui::Color32::LIGHT_RED, format!("Load failed: {e}"));
                    }
                    other => {
                        ui.label(format!("Status: {other}"));
                    }
                }
                ui.separator();

                let p = state.camera_position();
                ui.label(format!("Camera: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                let r = state.rotation();
                ui.label(format!("Rotation: pitch {:.2}  yaw {:.2}", r.x, r.y));

                let flags = state.movement();
                let held: Vec<&str> = PanDirection::ALL
                    .iter()
                    .filter(|d| flags.get(**d))
                    .map(|d| match d {
                        PanDirection::Up => "up",
                        PanDirection::Down => "down",
                        PanDirection::Left => "left",
                        PanDirection::Right => "right",
                    })
                    .collect();
                let panning = if held.is_empty() {
                    "-".to_string()
                } else {
                    held.join(" ")
                };
                ui.label(format!("Panning: {panning}"));

                if let Some(player) = self.controller.animation() {
                    ui.label(format!(
                        "Animation: {} {:.2}/{:.2}s",
                        player.clip().name,
                        player.time(),
                        player.clip().duration
                    ));
                }

                ui.separator();
                ui.small("Drag: rotate | Wheel: zoom | Arrows/WASD: pan | F1: HUD");
            });
    }
}

/// GPU resources, created once the window exists.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(config: ViewerConfig) -> Self {
        Self {
            state: AppState::new(config),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Model Viewer")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("modelview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.view = Some(RenderView::new(
            &self.state.config.camera,
            startup_aspect(size),
        ));

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            self.state.config.light.clone(),
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.gpu = Some(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        });
        Ok(())
    }

    fn redraw(&mut self) {
        self.state.update();

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let model = self.state.controller.model();
        gpu.renderer.sync_model(&gpu.device, model);
        if let Some(render_view) = &self.state.view {
            gpu.renderer
                .render(&gpu.device, &gpu.queue, &view, render_view, model);
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
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
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialize graphics: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                // Keep the surface valid; the projection keeps its startup aspect.
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    gpu.renderer
                        .resize(&gpu.device, gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::Focused(false) => {
                self.state.handle(InputEvent::FocusLost);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::F1),
                        state: winit::event::ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state.show_hud = !self.state.show_hud;
            }
            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    logical_key, state, ..
                },
                ..
            } => {
                if let Some(e) = input_map::key_event(&logical_key, state) {
                    self.state.handle(e);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor = Vec2::new(position.x as f32, position.y as f32);
                let (x, y) = (self.state.cursor.x, self.state.cursor.y);
                self.state.handle(InputEvent::PointerMove { x, y });
            }
            WindowEvent::MouseInput { state, .. } => {
                let cursor = self.state.cursor;
                self.state.handle(input_map::button_event(state, cursor));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = input_map::wheel_delta_y(delta);
                self.state.handle(InputEvent::Wheel { delta_y });
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

/// Projection aspect from the window's size when it is created.
fn startup_aspect(size: PhysicalSize<u32>) -> f32 {
    size.width.max(1) as f32 / size.height.max(1) as f32
}

fn load_config(cli: &Cli) -> Result<ViewerConfig> {
    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if let Some(asset) = &cli.asset {
        config.asset_path = asset.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("modelview-desktop starting");
    let config = load_config(&cli)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_follows_startup_window_size() {
        assert_eq!(startup_aspect(PhysicalSize::new(1280, 720)), 1280.0 / 720.0);
        assert_eq!(startup_aspect(PhysicalSize::new(800, 800)), 1.0);
        assert_eq!(startup_aspect(PhysicalSize::new(640, 0)), 640.0);
    }

    #[test]
    fn view_waits_for_window() {
        let mut state = AppState {
            controller: Controller::new(&ViewerConfig::default()),
            view: None,
            config: ViewerConfig::default(),
            show_hud: true,
            cursor: Vec2::ZERO,
            last_frame: Instant::now(),
        };
        state.update();
        assert!(state.view.is_none());

        let aspect = startup_aspect(PhysicalSize::new(1024, 768));
        state.view = Some(RenderView::new(&state.config.camera, aspect));
        state.handle(InputEvent::key_down("ArrowLeft"));
        state.update();
        let view = state.view.unwrap();
        assert_eq!(view.aspect, 1024.0 / 768.0);
        assert!((view.eye.x + 0.01).abs() < 1e-6);
    }
}
