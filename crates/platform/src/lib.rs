//! Platform layer: windowing & event loop.
//!
//! - The cube demo redraws on a fixed timer tick.
//! - The model viewer redraws only when mouse input changes the view.
//! - Resize/surface loss are handled here, drawing is left to `renderer`.

pub mod input;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use asset::{Model, cube::cube_model};
use corelib::{Camera, Mat4, OrbitCamera, Spin};
use renderer::{GpuState, RenderStyle};
use wgpu::SurfaceError;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Cube demo timer period (~60 FPS).
pub const TICK: Duration = Duration::from_millis(16);

/// Window and GPU settings shared by both demos.
#[derive(Clone, Debug)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub backends: wgpu::Backends,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "meshview".to_owned(),
            width: 800,
            height: 600,
            backends: wgpu::Backends::all(),
        }
    }
}

/// How the model moves between frames.
#[derive(Clone, Copy, Debug)]
enum Motion {
    Spin(Spin),
    Orbit(OrbitCamera),
}

impl Motion {
    fn view(&self) -> (Camera, Mat4) {
        match self {
            // aspect is filled in by the renderer
            Self::Spin(spin) => (Camera::looking_at_origin(5.0, 1.0), spin.matrix()),
            Self::Orbit(orbit) => (orbit.camera(1.0), orbit.model_matrix()),
        }
    }
}

/// Opens a window with the procedural cube spinning on a timer.
pub fn run_cube_demo(config: WindowConfig) -> Result<()> {
    run(App::new(
        config,
        cube_model(),
        RenderStyle::cube(),
        Motion::Spin(Spin::new()),
    ))
}

/// Opens a window showing `model` with mouse orbit (left drag) and wheel zoom.
pub fn run_model_viewer(model: Model, config: WindowConfig) -> Result<()> {
    if model.is_empty() {
        log::warn!("Model has nothing to draw; showing an empty scene");
    }
    run(App::new(
        config,
        model,
        RenderStyle::viewer(),
        Motion::Orbit(OrbitCamera::new()),
    ))
}

fn run(mut app: App) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow::anyhow!("Event loop error: {e:?}"))?;
    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    config: WindowConfig,
    model: Model,
    style: RenderStyle,
    motion: Motion,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    cursor: (f32, f32),
    next_tick: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: WindowConfig, model: Model, style: RenderStyle, motion: Motion) -> Self {
        Self {
            config,
            model,
            style,
            motion,
            window: None,
            gpu: None,
            cursor: (0.0, 0.0),
            next_tick: Instant::now() + TICK,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create window")?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let gpu = pollster::block_on(GpuState::new(
            window.clone(),
            self.config.backends,
            &self.model,
            self.style,
        ))?;
        self.gpu = Some(gpu);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let (camera, model) = self.motion.view();
        match gpu.render(&camera, model) {
            Ok(()) => {}
            Err(e) if GpuState::is_surface_lost(&e) => {
                log::warn!("Surface {e:?}; reconfiguring");
                gpu.recreate_surface();
                self.request_redraw();
            }
            Err(SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow::anyhow!("GPU out of memory"));
            }
            Err(e) => log::warn!("Frame skipped: {e:?}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if !matches!(cause, StartCause::ResumeTimeReached { .. }) {
            return;
        }
        if let Motion::Spin(spin) = &mut self.motion {
            spin.tick();
            self.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::debug!("Resized: {}x{}", size.width, size.height);
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size.width, size.height);
                }
                self.request_redraw();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::info!("Scale factor changed: {scale_factor:.3}");
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                if let Motion::Orbit(orbit) = &mut self.motion {
                    if orbit.drag_to(self.cursor.0, self.cursor.1) {
                        self.request_redraw();
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                if let Motion::Orbit(orbit) = &mut self.motion {
                    match state {
                        ElementState::Pressed => orbit.begin_drag(self.cursor.0, self.cursor.1),
                        ElementState::Released => orbit.end_drag(),
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Motion::Orbit(orbit) = &mut self.motion {
                    if orbit.zoom(input::scroll_amount(delta)) {
                        log::trace!("Camera distance {:.2}", orbit.distance);
                        self.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match self.motion {
            Motion::Spin(_) => {
                let now = Instant::now();
                if self.next_tick <= now {
                    self.next_tick = now + TICK;
                }
                event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
            }
            Motion::Orbit(_) => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
