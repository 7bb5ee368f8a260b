//! Vista - Main Entry Point
//!
//! Opens a window and renders the configured scene: lit 3D meshes seen
//! through a keyboard-driven camera, plus flat 2D meshes in object space.
//!
//! Usage: `vista [config.toml]` (defaults to `vista.toml`, which may be absent).

mod scene;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

use vista_core::{AppConfig, FrameTimer};
use vista_platform::{InputState, Window};
use vista_renderer::{FlatRenderSystem, FrameInfo, Renderer, RendererOptions, SimpleRenderSystem};
use vista_scene::{Camera, KeyboardMovementController, Transform};

use crate::scene::{MeshCache, Scene};

const DEFAULT_CONFIG_PATH: &str = "vista.toml";
const FIELD_OF_VIEW_DEGREES: f32 = 50.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 10.0;

fn shader_hint(system: &str, shader_dir: &Path) -> String {
    format!(
        "Failed to create {system} render system (SPIR-V shaders in {} are built by \
         `cargo build` when glslc is available, or by running shaders/compile.sh)",
        shader_dir.display()
    )
}

/// GPU-side state, created once the window exists.
///
/// The renderer is declared first so it drops first: its `Drop` waits for
/// the device to go idle before pipelines and meshes are destroyed.
struct Graphics {
    renderer: Renderer,
    simple_system: SimpleRenderSystem,
    flat_system: FlatRenderSystem,
    scene: Scene,
}

impl Graphics {
    fn new(window: &mut Window, config: &AppConfig) -> Result<Self> {
        let renderer = Renderer::new(
            window,
            RendererOptions {
                enable_validation: config.enable_validation,
                prefer_mailbox: config.prefer_mailbox,
            },
        )
        .context("Failed to create renderer")?;

        let device = renderer.device();
        let simple_system =
            SimpleRenderSystem::new(device.clone(), renderer.render_pass(), &config.shader_dir)
                .with_context(|| shader_hint("3D", &config.shader_dir))?;
        let flat_system =
            FlatRenderSystem::new(device.clone(), renderer.render_pass(), &config.shader_dir)
                .with_context(|| shader_hint("2D", &config.shader_dir))?;

        let mut meshes = MeshCache::new(device.clone());
        let scene = Scene::from_config(&config.objects, &mut meshes)?;
        info!(
            "Scene loaded: {} 3D objects, {} 2D objects",
            scene.objects.len(),
            scene.flat_objects.len()
        );

        Ok(Self {
            renderer,
            simple_system,
            flat_system,
            scene,
        })
    }
}

struct App {
    config: AppConfig,
    window: Option<Window>,
    graphics: Option<Graphics>,
    input: InputState,
    timer: FrameTimer,
    camera: Camera,
    viewer: Transform,
    controller: KeyboardMovementController,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            window: None,
            graphics: None,
            input: InputState::new(),
            timer: FrameTimer::new(),
            camera: Camera::new(),
            viewer: Transform::default(),
            controller: KeyboardMovementController::default(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.config.window;
        let mut window = Window::new(
            event_loop,
            window_config.width,
            window_config.height,
            &window_config.title,
        )?;
        let graphics = Graphics::new(&mut window, &self.config)?;

        info!("Initialization complete, entering main loop");
        self.graphics = Some(graphics);
        self.window = Some(window);
        self.timer = FrameTimer::new();
        Ok(())
    }

    /// One tick: input, camera, then both render systems.
    fn draw_frame(&mut self) -> Result<()> {
        let (Some(window), Some(graphics)) = (self.window.as_mut(), self.graphics.as_mut()) else {
            return Ok(());
        };
        if window.is_minimized() {
            return Ok(());
        }

        let frame_time = self.timer.tick();
        self.controller
            .move_in_plane_xz(&self.input, frame_time, &mut self.viewer);
        self.camera
            .set_view_euler(self.viewer.translation, self.viewer.rotation);
        self.camera.set_perspective_projection(
            FIELD_OF_VIEW_DEGREES.to_radians(),
            graphics.renderer.aspect_ratio(),
            NEAR_PLANE,
            FAR_PLANE,
        );

        let renderer = &mut graphics.renderer;
        if renderer.begin_frame(window)? {
            let cmd = renderer.current_command_buffer();
            let frame = FrameInfo {
                frame_index: renderer.frame_index(),
                frame_time,
                command_buffer: cmd,
                camera: &self.camera,
            };

            renderer.begin_swapchain_render_pass(cmd);
            graphics
                .flat_system
                .draw_game_objects(&frame, &graphics.scene.flat_objects);
            graphics
                .simple_system
                .draw_game_objects(&frame, &graphics.scene.objects)?;
            renderer.end_swapchain_render_pass(cmd);

            renderer.end_frame(window)?;
        }

        self.input.begin_frame();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{:#}", err);
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none()
            && let Err(e) = self.init(event_loop)
        {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                if let Some(graphics) = &self.graphics
                    && let Err(e) = graphics.renderer.device().wait_idle()
                {
                    self.fail(event_loop, e.into());
                    return;
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(window) = self.window.as_mut() {
                    window.mark_resized(size.width, size.height);
                }
            }
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.input.handle_key(key, event.state.is_pressed());
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.draw_frame() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    vista_core::init_logging();
    info!("Starting Vista");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    // Tear down GPU state before the window it presents to.
    app.graphics = None;
    app.window = None;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_constants() {
        assert!(NEAR_PLANE > 0.0 && NEAR_PLANE < FAR_PLANE);
        assert!((FIELD_OF_VIEW_DEGREES.to_radians() - 0.872_664_6).abs() < 1e-6);
    }

    #[test]
    fn test_shader_hint_points_at_compile_step() {
        let hint = shader_hint("3D", Path::new("shaders"));
        assert!(hint.contains("3D render system"));
        assert!(hint.contains("shaders/compile.sh"));
        assert!(hint.contains("glslc"));
    }

    #[test]
    fn test_app_starts_without_window() {
        let app = App::new(AppConfig::default());
        assert!(app.window.is_none());
        assert!(app.graphics.is_none());
        assert!(app.error.is_none());
        assert_eq!(app.viewer, Transform::default());
    }
}
