//! The viewer engine: command execution and the dirty-flag render loop.
//!
//! `RenderEngine` owns every piece of mutable viewer state — scene, orbit
//! camera, projection, gesture controller, programs, and the sectioning
//! position — and is generic over the [`RenderBackend`] doing the actual
//! GPU work. Input flows in as [`InputEvent`]s, becomes [`ViewerCommand`]s,
//! and each executed command raises a dirty flag consumed by exactly one
//! [`render`](RenderEngine::render) pass.

use glam::Vec2;

use crate::camera::{OrbitCamera, Projection};
use crate::error::MiradorError;
use crate::geometry::{Geometry, MeshData, SectioningPlane};
use crate::gpu::{self, ProgramHandle, RenderBackend, UniformValue};
use crate::input::{InputController, InputEvent};
use crate::options::ViewerOptions;
use crate::scene::Scene;

/// Keeps the plane quad a hair past the shader's discard threshold so the
/// quad itself survives the cut.
const SECTION_PLANE_BIAS: f32 = 1e-7;

/// A discrete mutation of viewer state, produced by the input controller
/// or a host key binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerCommand {
    /// Orbit by a pixel delta.
    Rotate {
        /// Pixel delta since the last sample.
        delta: Vec2,
    },
    /// Pan the target by a pixel delta.
    Pan {
        /// Pixel delta since the last sample.
        delta: Vec2,
    },
    /// Adjust the camera offset by a wheel delta.
    Zoom {
        /// Wheel delta.
        delta: f32,
    },
    /// Slide the sectioning plane by a wheel delta.
    Section {
        /// Wheel delta.
        delta: f32,
    },
    /// Re-frame the camera around the scene bounds.
    FrameScene,
    /// Flip whether the wheel drives the sectioning plane.
    ToggleSectionMode,
}

/// Owns the scene, camera, and programs; executes commands and renders
/// when dirty.
pub struct RenderEngine<B: RenderBackend> {
    backend: B,
    scene: Scene,
    camera: OrbitCamera,
    projection: Projection,
    input: InputController,
    options: ViewerOptions,
    basic_program: ProgramHandle,
    /// `None` when the section shader was rejected; the plane then renders
    /// with the basic program.
    section_program: Option<ProgramHandle>,
    /// Current world X of the cut, fed to both the shader uniform and the
    /// plane quad.
    x_section: f32,
    dirty: bool,
}

impl<B: RenderBackend> RenderEngine<B> {
    /// Create an engine over an initialized backend.
    ///
    /// Compiles the basic and sectioning programs. The basic program is
    /// required; a sectioning-shader failure is surfaced through
    /// `log::error!` and the engine falls back to the basic program for
    /// the plane rather than rendering with a broken one.
    ///
    /// # Errors
    ///
    /// Returns [`MiradorError::ShaderCompile`] if the basic program is
    /// rejected.
    pub fn new(
        mut backend: B,
        (width, height): (u32, u32),
        options: ViewerOptions,
    ) -> Result<Self, MiradorError> {
        let projection = Projection::new(
            options.camera.fov_degrees.to_radians(),
            width,
            height,
            options.camera.znear,
            options.camera.zfar,
        );

        let basic_program =
            backend.create_program(gpu::BASIC_VERTEX_SHADER, gpu::BASIC_FRAGMENT_SHADER)?;
        let section_program = match backend
            .create_program(gpu::SECTION_VERTEX_SHADER, gpu::SECTION_FRAGMENT_SHADER)
        {
            Ok(program) => Some(program),
            Err(e) => {
                log::error!("section shader unavailable, falling back to basic: {e}");
                None
            }
        };

        Ok(Self {
            backend,
            scene: Scene::new(),
            camera: OrbitCamera::new(),
            projection,
            input: InputController::new(),
            options,
            basic_program,
            section_program,
            x_section: 0.0,
            dirty: true,
        })
    }

    // -- Scene population --

    /// Upload a mesh and add it to the scene. Returns its id.
    ///
    /// # Errors
    ///
    /// Propagates [`MiradorError::InvalidGeometry`] from geometry
    /// validation.
    pub fn add_mesh(&mut self, mesh: MeshData) -> Result<u32, MiradorError> {
        let color = self.options.display.default_color;
        let geometry = Geometry::from_mesh(&mut self.backend, mesh, color)?;
        self.dirty = true;
        Ok(self.scene.add_mesh(geometry))
    }

    /// Upload the sectioning plane quad and add it to the scene. Returns
    /// its id.
    ///
    /// # Errors
    ///
    /// Propagates [`MiradorError::InvalidGeometry`] (including the
    /// exactly-4-vertices check).
    pub fn add_section_plane(&mut self, mesh: MeshData) -> Result<u32, MiradorError> {
        let color = mesh.color.unwrap_or(self.options.display.section_color);
        let plane = SectioningPlane::new(
            &mut self.backend,
            mesh.vertices,
            mesh.normals,
            mesh.indices,
            color,
        )?;
        self.dirty = true;
        Ok(self.scene.add_plane(plane))
    }

    /// Center the camera on the scene bounds and back it off far enough
    /// that everything fits in view. No-op on an empty scene.
    pub fn frame_scene(&mut self) {
        if let Some(bounds) = self.scene.bounds() {
            self.camera.frame(&bounds, &self.projection);
            self.dirty = true;
        }
    }

    // -- Input --

    /// Feed one normalized input event through the gesture controller.
    pub fn handle_input(&mut self, event: InputEvent) {
        if let Some(command) = self.input.handle_event(event) {
            self.execute(command);
        }
    }

    /// Execute a viewer command, mutating camera or geometry state and
    /// raising the dirty flag.
    pub fn execute(&mut self, command: ViewerCommand) {
        match command {
            ViewerCommand::Rotate { delta } => {
                self.camera.rotate(delta, self.options.camera.rotate_speed);
                self.dirty = true;
            }
            ViewerCommand::Pan { delta } => {
                let view = self.camera.view_matrix();
                self.camera.pan(delta, &view, self.options.camera.pan_speed);
                self.dirty = true;
            }
            ViewerCommand::Zoom { delta } => {
                self.camera.zoom(delta, self.options.camera.zoom_speed);
                self.dirty = true;
            }
            ViewerCommand::Section { delta } => {
                self.x_section -= delta * self.options.camera.section_speed;
                let x = self.x_section + SECTION_PLANE_BIAS;
                if let Some(plane) = self.scene.plane_mut() {
                    plane.update_axis(&mut self.backend, x);
                }
                self.dirty = true;
            }
            ViewerCommand::FrameScene => self.frame_scene(),
            ViewerCommand::ToggleSectionMode => {
                // Switching modes swaps the active program, so the scene
                // must redraw even though no parameter moved.
                self.input.toggle_section_mode();
                self.dirty = true;
            }
        }
    }

    /// The program the whole scene draws with: the sectioning program
    /// while section mode is active (and it compiled), the basic program
    /// otherwise.
    fn active_program(&self) -> ProgramHandle {
        if self.input.section_mode() {
            self.section_program.unwrap_or(self.basic_program)
        } else {
            self.basic_program
        }
    }

    // -- Rendering --

    /// Draw one frame if anything changed since the last one.
    ///
    /// Returns `Ok(true)` when a frame was drawn, `Ok(false)` when the
    /// viewer was clean and no draw was issued. All camera transforms are
    /// recomputed from scratch; nothing persists across parameter changes.
    ///
    /// # Errors
    ///
    /// Returns [`MiradorError::SurfaceLost`] when the host should resize
    /// and retry, or another error for non-recoverable backend failures.
    pub fn render(&mut self) -> Result<bool, MiradorError> {
        if !self.dirty && !self.scene.is_dirty() {
            return Ok(false);
        }

        let transforms = self.camera.transforms(&self.projection);
        let program = self.active_program();

        self.backend.begin_frame(self.options.display.background);
        self.backend.use_program(program);
        self.backend
            .set_uniform(program, "view_proj", UniformValue::Mat4(transforms.view_proj));
        self.backend
            .set_uniform(program, "view", UniformValue::Mat4(transforms.view));
        self.backend.set_uniform(
            program,
            "normal_matrix",
            UniformValue::Mat3(transforms.normal_matrix),
        );
        self.backend.set_uniform(
            program,
            "camera_position",
            UniformValue::Vec3(transforms.eye),
        );
        self.backend
            .set_uniform(program, "x_section", UniformValue::Float(self.x_section));

        for object in self.scene.objects() {
            let geometry = object.geometry();
            self.backend
                .set_uniform(program, "color", UniformValue::Vec4(geometry.color()));
            self.backend.draw_indexed(
                geometry.vertex_buffer(),
                geometry.normal_buffer(),
                geometry.index_buffer(),
                geometry.index_count(),
            );
        }

        self.backend.end_frame()?;
        self.dirty = false;
        self.scene.mark_rendered();
        Ok(true)
    }

    /// Whether the next [`render`](Self::render) call will draw.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.scene.is_dirty()
    }

    /// Adapt the projection and backend to a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
        self.backend.resize(width, height);
        self.dirty = true;
    }

    // -- Accessors --

    /// The orbit camera.
    #[must_use]
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Mutable camera access. Raises the dirty flag.
    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        self.dirty = true;
        &mut self.camera
    }

    /// The perspective projection.
    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The gesture controller.
    #[must_use]
    pub fn input(&self) -> &InputController {
        &self.input
    }

    /// Mutable gesture-controller access (section-mode toggling).
    pub fn input_mut(&mut self) -> &mut InputController {
        &mut self.input
    }

    /// Current viewer options.
    #[must_use]
    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Replace the options, re-deriving the projection parameters.
    pub fn set_options(&mut self, options: ViewerOptions) {
        self.projection.set_vfov(options.camera.fov_degrees.to_radians());
        self.options = options;
        self.dirty = true;
    }

    /// Current world X position of the cut.
    #[must_use]
    pub fn x_section(&self) -> f32 {
        self.x_section
    }

    /// The rendering backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use crate::geometry::{cube, section_quad, uv_sphere};
    use crate::gpu::recording::{Op, RecordingBackend};
    use crate::input::{PointerButton, TouchPoint};

    use super::*;

    fn engine() -> RenderEngine<RecordingBackend> {
        RenderEngine::new(RecordingBackend::new(), (800, 600), ViewerOptions::default())
            .unwrap()
    }

    fn engine_with_scene() -> RenderEngine<RecordingBackend> {
        let mut e = engine();
        let _ = e.add_mesh(uv_sphere(2.0, 8, 12)).unwrap();
        let _ = e.add_mesh(cube(1.0)).unwrap();
        let _ = e.add_section_plane(section_quad(3.0)).unwrap();
        e
    }

    #[test]
    fn first_render_draws_every_object_once() {
        let mut e = engine_with_scene();
        assert!(e.render().unwrap());
        assert_eq!(e.backend().frame_count(), 1);
        assert_eq!(e.backend().draw_count(), 3);
    }

    #[test]
    fn clean_engine_issues_no_draws() {
        let mut e = engine_with_scene();
        assert!(e.render().unwrap());
        let ops = e.backend().ops.len();

        assert!(!e.render().unwrap());
        assert!(!e.render().unwrap());
        assert_eq!(e.backend().ops.len(), ops);
    }

    #[test]
    fn burst_of_mutations_coalesces_into_one_frame() {
        let mut e = engine_with_scene();
        assert!(e.render().unwrap());
        let frames_before = e.backend().frame_count();

        // A drag burst: press, five moves, a wheel tick.
        e.handle_input(InputEvent::PointerDown {
            button: PointerButton::Primary,
            x: 0.0,
            y: 0.0,
        });
        for i in 1..=5 {
            e.handle_input(InputEvent::PointerMoved {
                x: i as f32 * 3.0,
                y: i as f32,
            });
        }
        e.handle_input(InputEvent::Wheel { delta: 1.0 });

        assert!(e.render().unwrap());
        assert_eq!(e.backend().frame_count(), frames_before + 1);
        // And the burst is fully consumed.
        assert!(!e.render().unwrap());
    }

    #[test]
    fn rotate_command_applies_the_sensitivity_constant() {
        let mut e = engine();
        let alpha = e.camera().alpha;
        let theta = e.camera().theta;
        let k = e.options().camera.rotate_speed;

        e.execute(ViewerCommand::Rotate {
            delta: Vec2::new(10.0, -6.0),
        });
        assert!((e.camera().alpha - (alpha - 10.0 * k)).abs() < 1e-6);
        assert!((e.camera().theta - (theta + 6.0 * k)).abs() < 1e-6);
    }

    #[test]
    fn pan_command_moves_the_target() {
        let mut e = engine();
        let before = e.camera().target;
        e.execute(ViewerCommand::Pan {
            delta: Vec2::new(40.0, 0.0),
        });
        assert_ne!(e.camera().target, before);
    }

    #[test]
    fn zoom_command_changes_the_offset() {
        let mut e = engine();
        let before = e.camera().offset();
        e.execute(ViewerCommand::Zoom { delta: 10.0 });
        assert!(e.camera().offset() < before);
    }

    #[test]
    fn section_command_slides_the_plane_and_reuploads() {
        let mut e = engine_with_scene();
        let handle = {
            let plane = e.scene_mut().plane_mut().unwrap();
            plane.geometry().vertex_buffer()
        };

        e.handle_input(InputEvent::Wheel { delta: 4.0 });
        // Wheel zooms until section mode is toggled on.
        assert_eq!(e.backend().upload_count(handle), 0);

        e.execute(ViewerCommand::ToggleSectionMode);
        e.handle_input(InputEvent::Wheel { delta: 4.0 });
        assert_eq!(e.backend().upload_count(handle), 1);

        let expected_x = -4.0 * e.options().camera.section_speed + SECTION_PLANE_BIAS;
        let data = e.backend().last_vertex_data(handle).unwrap();
        assert!((data[0] - expected_x).abs() < 1e-9);

        // The shader-side threshold tracks the unbiased value.
        assert!((e.x_section() - (-4.0 * e.options().camera.section_speed)).abs() < 1e-9);
    }

    #[test]
    fn frame_scene_centers_on_the_merged_bounds() {
        let mut e = engine_with_scene();
        e.execute(ViewerCommand::FrameScene);

        let bounds = e.scene().bounds().unwrap();
        assert_eq!(e.camera().target, bounds.center);
        let expected = e.projection().fit_distance(bounds.radius);
        assert!((e.camera().offset() - expected).abs() < 1e-5);
    }

    #[test]
    fn frame_scene_on_an_empty_scene_is_a_no_op() {
        let mut e = engine();
        let camera = *e.camera();
        e.execute(ViewerCommand::FrameScene);
        assert_eq!(*e.camera(), camera);
    }

    #[test]
    fn resize_dirties_and_reaches_the_backend() {
        let mut e = engine_with_scene();
        assert!(e.render().unwrap());

        e.resize(1024, 768);
        assert!(e.is_dirty());
        assert!(e.backend().ops.contains(&Op::Resize(1024, 768)));
        assert!((e.projection().aspect() - 1024.0 / 768.0).abs() < 1e-6);
    }

    #[test]
    fn section_mode_switches_the_active_program() {
        let mut e = engine_with_scene();
        assert!(e.render().unwrap());
        let section = e.section_program.unwrap();
        assert!(!e.backend().ops.contains(&Op::UseProgram(section)));

        // With section mode on, the whole scene draws with the sectioning
        // program — the cut applies to the model, not just the plane quad.
        e.execute(ViewerCommand::ToggleSectionMode);
        assert!(e.is_dirty());
        assert!(e.render().unwrap());
        assert_eq!(e.backend().ops.last(), Some(&Op::EndFrame));
        assert!(e.backend().ops.contains(&Op::UseProgram(section)));

        // Toggling back returns to the basic program.
        e.execute(ViewerCommand::ToggleSectionMode);
        assert!(e.render().unwrap());
        let last_use = e
            .backend()
            .ops
            .iter()
            .rev()
            .find_map(|op| match op {
                Op::UseProgram(p) => Some(*p),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_use, e.basic_program);
    }

    #[test]
    fn rejected_section_shader_falls_back_to_basic() {
        // Basic mints program slot 0, section mints slot 1: fail slot 1.
        let mut backend = RecordingBackend::new();
        backend.fail_program_index = Some(1);

        let mut e =
            RenderEngine::new(backend, (800, 600), ViewerOptions::default()).unwrap();
        assert!(e.section_program.is_none());

        let _ = e.add_section_plane(section_quad(1.0)).unwrap();
        e.execute(ViewerCommand::ToggleSectionMode);
        assert!(e.render().unwrap());

        // Every draw went through the basic program, never a broken one.
        let programs: Vec<_> = e
            .backend()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::UseProgram(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(programs, vec![e.basic_program]);
        assert_eq!(e.backend().draw_count(), 1);
    }

    #[test]
    fn rejected_basic_shader_fails_construction() {
        let mut backend = RecordingBackend::new();
        backend.fail_program_index = Some(0);
        let result = RenderEngine::new(backend, (800, 600), ViewerOptions::default());
        assert!(matches!(result, Err(MiradorError::ShaderCompile { .. })));
    }

    #[test]
    fn color_reaches_the_shader_as_a_draw_time_uniform() {
        let mut e = engine_with_scene();
        assert!(e.render().unwrap());

        let id = e.scene().objects()[1].id();
        e.scene_mut()
            .object_mut(id)
            .unwrap()
            .geometry_mut()
            .set_transparent();
        assert!(e.render().unwrap());

        // The second frame carries the translucent alpha; no buffer was
        // re-uploaded for it.
        let colors = e.backend().uniform_values("color");
        assert!(colors.iter().any(
            |v| matches!(v, UniformValue::Vec4(c) if (c[3] - 0.1).abs() < 1e-6)
        ));
        assert!(!e
            .backend()
            .ops
            .iter()
            .any(|op| matches!(op, Op::UploadVertexBuffer(_))));
    }

    #[test]
    fn touch_gestures_reach_the_camera() {
        let mut e = engine();
        let alpha = e.camera().alpha;

        e.handle_input(InputEvent::TouchStart {
            primary: TouchPoint { x: 10.0, y: 10.0 },
            secondary: None,
        });
        e.handle_input(InputEvent::TouchMoved {
            primary: TouchPoint { x: 30.0, y: 10.0 },
            secondary: None,
        });
        assert_ne!(e.camera().alpha, alpha);

        e.handle_input(InputEvent::TouchEnd);
        let settled = e.camera().alpha;
        e.handle_input(InputEvent::TouchMoved {
            primary: TouchPoint { x: 90.0, y: 90.0 },
            secondary: None,
        });
        assert_eq!(e.camera().alpha, settled);
    }

    #[test]
    fn eye_distance_matches_offset_end_to_end() {
        let mut e = engine();
        e.camera_mut().alpha = std::f32::consts::FRAC_PI_4;
        e.camera_mut().theta = std::f32::consts::FRAC_PI_4;
        e.camera_mut().target = Vec3::ZERO;
        e.camera_mut().set_offset(10.0);

        let t = e.camera().transforms(e.projection());
        assert!((t.eye.length() - 10.0).abs() < 1e-4);
    }
}
