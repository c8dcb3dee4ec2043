//! Standalone visualization window backed by winit.
//!
//! The window layer normalizes platform events into [`InputEvent`]s and
//! schedules redraws only while the engine is dirty, so an idle viewer
//! issues no draws.
//!
//! ```no_run
//! # use mirador::Viewer;
//! Viewer::builder()
//!     .with_model("assets/models/turbine.json")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::engine::{RenderEngine, ViewerCommand};
use crate::error::MiradorError;
use crate::geometry::{load_mesh, section_quad, uv_sphere};
use crate::gpu::{RenderContext, WgpuBackend};
use crate::input::{InputEvent, PointerButton, TouchPoint};
use crate::options::ViewerOptions;
use crate::util::FrameTiming;

/// Approximate pixels represented by one wheel line-delta notch.
const WHEEL_LINE_PIXELS: f32 = 40.0;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    model_path: Option<String>,
    options: Option<ViewerOptions>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            model_path: None,
            options: None,
            title: "Mirador".into(),
        }
    }

    /// Set the JSON model file to display.
    #[must_use]
    pub fn with_model(mut self, path: impl Into<String>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: ViewerOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            model_path: self.model_path,
            options: self.options,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window that displays a model with orbit controls.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop. `S` toggles section mode (the wheel then slides
/// the cutting plane), `F` re-frames the camera on the scene.
pub struct Viewer {
    model_path: Option<String>,
    options: Option<ViewerOptions>,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`MiradorError::Viewer`] if the event loop cannot be
    /// created or fails while running.
    pub fn run(self) -> Result<(), MiradorError> {
        let event_loop = EventLoop::new().map_err(|e| MiradorError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            model_path: self.model_path,
            options: self.options,
            title: self.title,
            last_cursor: (0.0, 0.0),
            touches: Vec::new(),
            frame_timing: FrameTiming::new(),
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| MiradorError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Internal winit application handler.
struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine<WgpuBackend>>,
    model_path: Option<String>,
    options: Option<ViewerOptions>,
    title: String,
    /// Last cursor position, for button events that carry no position.
    last_cursor: (f32, f32),
    /// Active touch contacts in press order.
    touches: Vec<(u64, TouchPoint)>,
    frame_timing: FrameTiming,
}

impl ViewerApp {
    /// Feed an event to the engine and schedule a redraw if it dirtied
    /// anything.
    fn forward(&mut self, event: InputEvent) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        engine.handle_input(event);
        if engine.is_dirty() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    /// Execute a command directly (key bindings) and schedule a redraw.
    fn run_command(&mut self, command: ViewerCommand) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        engine.execute(command);
        if engine.is_dirty() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    /// Current touch contacts as the (primary, secondary) pair the input
    /// contract expects.
    fn touch_pair(&self) -> Option<(TouchPoint, Option<TouchPoint>)> {
        let primary = self.touches.first().map(|(_, p)| *p)?;
        let secondary = self.touches.get(1).map(|(_, p)| *p);
        Some((primary, secondary))
    }

    /// Populate the scene: the model file if one was given (falling back
    /// to the demo sphere on load failure), plus a sectioning plane sized
    /// to the scene.
    fn populate_scene(engine: &mut RenderEngine<WgpuBackend>, model_path: Option<&str>) {
        let mesh = model_path.map_or_else(
            || uv_sphere(2.0, 32, 48),
            |path| match load_mesh(std::path::Path::new(path)) {
                Ok(mesh) => mesh,
                Err(e) => {
                    log::error!("{e}; showing the demo sphere instead");
                    uv_sphere(2.0, 32, 48)
                }
            },
        );
        if let Err(e) = engine.add_mesh(mesh) {
            log::error!("model rejected: {e}");
        }

        let plane_extent = engine
            .scene()
            .bounds()
            .map_or(3.0, |bounds| bounds.radius * 1.2);
        if let Err(e) = engine.add_section_plane(section_quad(plane_extent)) {
            log::error!("sectioning plane rejected: {e}");
        }

        engine.frame_scene();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (mon_size.width as f64 / scale * 0.75) as u32;
            let logical_h = (mon_size.height as f64 / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(logical_w, logical_h))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let inner = window.inner_size();
        let size = (inner.width.max(1), inner.height.max(1));

        let context = match pollster::block_on(RenderContext::new(window.clone(), size)) {
            Ok(context) => context,
            Err(e) => {
                log::error!("failed to initialize GPU context: {e}");
                event_loop.exit();
                return;
            }
        };

        let options = self.options.take().unwrap_or_default();
        let mut engine = match RenderEngine::new(WgpuBackend::new(context), size, options) {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("failed to initialize engine: {e}");
                event_loop.exit();
                return;
            }
        };

        Self::populate_scene(&mut engine, self.model_path.as_deref());

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        // Guard: both window and engine must be initialised.
        if self.window.is_none() || self.engine.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width.max(1), size.height.max(1));
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let inner = self.window.as_ref().map(|w| w.inner_size());
                if let (Some(engine), Some(inner)) = (&mut self.engine, inner) {
                    engine.resize(inner.width.max(1), inner.height.max(1));
                }
            }

            WindowEvent::RedrawRequested => {
                let inner = self.window.as_ref().map(|w| w.inner_size());
                if let Some(engine) = &mut self.engine {
                    match engine.render() {
                        Ok(true) => {
                            let _ = self.frame_timing.tick();
                            log::trace!("frame drawn, {:.1} fps", self.frame_timing.fps());
                        }
                        Ok(false) => {}
                        Err(MiradorError::SurfaceLost) => {
                            if let Some(inner) = inner {
                                engine.resize(inner.width.max(1), inner.height.max(1));
                            }
                            if let Some(window) = &self.window {
                                window.request_redraw();
                            }
                        }
                        Err(e) => {
                            log::error!("render error: {e}");
                        }
                    }
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                let event = if state == ElementState::Pressed {
                    InputEvent::PointerDown {
                        button: PointerButton::from(button),
                        x: self.last_cursor.0,
                        y: self.last_cursor.1,
                    }
                } else {
                    InputEvent::PointerUp
                };
                self.forward(event);
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.last_cursor = (position.x as f32, position.y as f32);
                self.forward(InputEvent::PointerMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y * WHEEL_LINE_PIXELS,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                self.forward(InputEvent::Wheel { delta });
            }

            WindowEvent::Touch(touch) => {
                let point = TouchPoint {
                    x: touch.location.x as f32,
                    y: touch.location.y as f32,
                };
                match touch.phase {
                    TouchPhase::Started => {
                        self.touches.push((touch.id, point));
                        if let Some((primary, secondary)) = self.touch_pair() {
                            self.forward(InputEvent::TouchStart { primary, secondary });
                        }
                    }
                    TouchPhase::Moved => {
                        if let Some(entry) =
                            self.touches.iter_mut().find(|(id, _)| *id == touch.id)
                        {
                            entry.1 = point;
                        }
                        if let Some((primary, secondary)) = self.touch_pair() {
                            self.forward(InputEvent::TouchMoved { primary, secondary });
                        }
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.touches.retain(|(id, _)| *id != touch.id);
                        if let Some((primary, secondary)) = self.touch_pair() {
                            // Re-anchor the remaining contact so the next
                            // move does not jump.
                            self.forward(InputEvent::TouchStart { primary, secondary });
                        } else {
                            self.forward(InputEvent::TouchEnd);
                        }
                    }
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                match code {
                    KeyCode::KeyS => self.run_command(ViewerCommand::ToggleSectionMode),
                    KeyCode::KeyF => self.run_command(ViewerCommand::FrameScene),
                    _ => {}
                }
            }

            _ => (),
        }
    }
}
