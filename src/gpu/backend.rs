//! The abstract contract between the viewer core and a rendering backend.

use glam::{Mat3, Mat4, Vec3};

use crate::error::MiradorError;

/// Opaque handle to a GPU vertex or index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(u32);

impl BufferHandle {
    /// Wrap a backend-assigned slot index.
    #[must_use]
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// The backend-assigned slot index.
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Opaque handle to a compiled and linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(u32);

impl ProgramHandle {
    /// Wrap a backend-assigned slot index.
    #[must_use]
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// The backend-assigned slot index.
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A value assignable to a named shader uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Scalar float.
    Float(f32),
    /// 3-component vector.
    Vec3(Vec3),
    /// 4-component vector (colors).
    Vec4([f32; 4]),
    /// 3x3 matrix (normal matrix).
    Mat3(Mat3),
    /// 4x4 matrix.
    Mat4(Mat4),
}

/// Everything the viewer core needs from a rendering backend.
///
/// Buffers are upload-once except where [`upload_vertex_buffer`] is used
/// for the sectioning plane's live rewrites. Frames are bracketed by
/// [`begin_frame`]/[`end_frame`]; uniform assignments and draws between
/// the brackets form one frame.
///
/// [`upload_vertex_buffer`]: RenderBackend::upload_vertex_buffer
/// [`begin_frame`]: RenderBackend::begin_frame
/// [`end_frame`]: RenderBackend::end_frame
pub trait RenderBackend {
    /// Upload vertex-attribute data (stride 3 floats) into a new buffer.
    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferHandle;

    /// Upload triangle-list indices into a new buffer.
    fn create_index_buffer(&mut self, data: &[u32]) -> BufferHandle;

    /// Replace the full contents of an existing vertex buffer.
    fn upload_vertex_buffer(&mut self, handle: BufferHandle, data: &[f32]);

    /// Compile and link a program from WGSL vertex and fragment sources.
    ///
    /// # Errors
    ///
    /// Returns [`MiradorError::ShaderCompile`] with the offending stage and
    /// the full diagnostic log if either stage fails to parse or validate.
    fn create_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramHandle, MiradorError>;

    /// Select the program used by subsequent uniform assignments and draws.
    fn use_program(&mut self, program: ProgramHandle);

    /// Assign a named uniform on the given program. Unknown names are
    /// logged and ignored.
    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue);

    /// Start a frame, clearing color and depth.
    fn begin_frame(&mut self, clear_color: [f32; 4]);

    /// Draw an indexed triangle list from the given vertex/normal/index
    /// buffers with the current program and uniforms.
    fn draw_indexed(
        &mut self,
        vertices: BufferHandle,
        normals: BufferHandle,
        indices: BufferHandle,
        index_count: u32,
    );

    /// Finish and present the frame.
    ///
    /// # Errors
    ///
    /// Returns [`MiradorError::SurfaceLost`] when the presentation surface
    /// needs a resize before the next frame, or [`MiradorError::Viewer`]
    /// for non-recoverable surface failures.
    fn end_frame(&mut self) -> Result<(), MiradorError>;

    /// Adapt to a new viewport size in physical pixels.
    fn resize(&mut self, width: u32, height: u32);
}
