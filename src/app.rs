//! Window, event loop and per-frame orchestration.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::config::VisualizerConfig;
use crate::error::VisualizerError;
use crate::gpu::GpuState;
use crate::kernel::MotionKernel;
use crate::params::{ParamStore, Params};
use crate::time::Clock;

#[cfg(feature = "egui")]
use crate::gpu::egui_integration::EguiIntegration;

/// Builder for the figure-8 particle window.
///
/// ```no_run
/// use figure8::{Params, Visualizer};
///
/// Visualizer::new()
///     .with_params(Params { particle_count: 50_000, ..Default::default() })
///     .with_title("figure8 demo")
///     .run()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Visualizer {
    config: VisualizerConfig,
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole launch configuration.
    pub fn with_config(mut self, config: VisualizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the starting parameter values.
    pub fn with_params(mut self, params: Params) -> Self {
        self.config.params = params.sanitized();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.window.title = title.into();
        self
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), VisualizerError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct App {
    config: VisualizerConfig,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    #[cfg(feature = "egui")]
    egui: Option<EguiIntegration>,
    kernel: MotionKernel,
    params: ParamStore,
    clock: Clock,
    left_pressed: bool,
    right_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    error: Option<VisualizerError>,
}

impl App {
    fn new(config: VisualizerConfig) -> Self {
        let params = ParamStore::new(config.params);
        Self {
            config,
            window: None,
            gpu_state: None,
            #[cfg(feature = "egui")]
            egui: None,
            kernel: MotionKernel::new(),
            params,
            clock: Clock::new(),
            left_pressed: false,
            right_pressed: false,
            last_mouse_pos: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), VisualizerError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu_state = pollster::block_on(GpuState::new(window.clone(), &self.config))?;

        #[cfg(feature = "egui")]
        {
            self.egui = Some(EguiIntegration::new(
                gpu_state.device(),
                gpu_state.config.format,
                &window,
            ));
        }

        log::info!("window ready at {}x{}", gpu_state.config.width, gpu_state.config.height);

        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        rebuild_if_needed(&mut self.params, &mut self.kernel);
        self.clock.reset();
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            Key::Named(NamedKey::Space) => {
                self.clock.toggle_pause();
                let state = if self.clock.is_paused() { "paused" } else { "resumed" };
                log::info!("{state}");
            }
            _ => {}
        }
    }

    fn handle_cursor(&mut self, x: f64, y: f64) {
        if !(self.left_pressed || self.right_pressed) {
            return;
        }
        if let (Some((last_x, last_y)), Some(gpu_state)) =
            (self.last_mouse_pos, &mut self.gpu_state)
        {
            let dx = (x - last_x) as f32;
            let dy = (y - last_y) as f32;
            if self.left_pressed {
                gpu_state.camera.rotate(dx, dy);
            } else {
                gpu_state.camera.pan(dx, dy);
            }
        }
        self.last_mouse_pos = Some((x, y));
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Self {
            window,
            gpu_state,
            kernel,
            params,
            clock,
            #[cfg(feature = "egui")]
            egui,
            ..
        } = self;
        let (Some(window), Some(gpu_state)) = (window.as_ref(), gpu_state.as_mut()) else {
            return;
        };

        let (elapsed, _) = clock.update();

        #[cfg(feature = "egui")]
        let ui_output = egui.as_mut().map(|egui| {
            let mut edited = *params.params();
            let fps = clock.fps();
            let paused = clock.is_paused();
            let mut changed = false;
            let output = egui.run(window, |ctx| {
                changed = crate::ui::control_panel(ctx, &mut edited);
                crate::ui::fps_overlay(ctx, fps, paused);
            });
            if changed {
                for kind in params.apply(edited) {
                    log::debug!("{:?} set to {}", kind, params.params().get(kind));
                }
            }
            output
        });

        rebuild_if_needed(params, kernel);

        let current = *params.params();
        if kernel.update(elapsed, current.speed).is_some() {
            if let Some(particles) = kernel.particles() {
                gpu_state.upload_positions(particles.position_bytes());
            }
        }

        #[cfg(feature = "egui")]
        let result = {
            let size = [gpu_state.config.width, gpu_state.config.height];
            gpu_state.render(&current, |device, queue, encoder, view| {
                if let (Some(egui), Some(output)) = (egui.as_mut(), ui_output) {
                    egui.paint(device, queue, encoder, view, size, output);
                }
            })
        };
        #[cfg(not(feature = "egui"))]
        let result = gpu_state.render(&current, |_, _, _, _| {});

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {e:?}"),
        }

        window.request_redraw();
    }
}

/// Rebuild the kernel if particle count or noise changed since the last build.
fn rebuild_if_needed(params: &mut ParamStore, kernel: &mut MotionKernel) {
    if let Some((count, noise)) = params.take_rebuild() {
        log::info!("rebuilding {count} particles with noise {noise:.2}");
        kernel.rebuild(count, noise);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("{e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        let consumed = match (&mut self.egui, &self.window) {
            (Some(egui), Some(window)) => egui.on_window_event(window, &event),
            _ => false,
        };
        #[cfg(not(feature = "egui"))]
        let consumed = false;

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if !consumed => {
                self.handle_key(event_loop, &event);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed && !consumed;
                match button {
                    MouseButton::Left => self.left_pressed = pressed,
                    MouseButton::Right => self.right_pressed = pressed,
                    _ => {}
                }
                if !(self.left_pressed || self.right_pressed) {
                    self.last_mouse_pos = None;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
