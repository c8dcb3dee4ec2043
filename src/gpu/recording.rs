//! Operation-recording backend for tests.

use crate::error::{MiradorError, ShaderStage};
use crate::gpu::backend::{BufferHandle, ProgramHandle, RenderBackend, UniformValue};

/// One recorded backend operation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    CreateVertexBuffer(BufferHandle),
    CreateIndexBuffer(BufferHandle),
    UploadVertexBuffer(BufferHandle),
    UseProgram(ProgramHandle),
    BeginFrame,
    Draw { index_count: u32 },
    EndFrame,
    Resize(u32, u32),
}

/// A [`RenderBackend`] that records operations instead of touching a GPU.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    next_buffer: u32,
    next_program: u32,
    pub ops: Vec<Op>,
    /// Last data written per vertex-buffer handle (creation or re-upload).
    pub vertex_data: Vec<(BufferHandle, Vec<f32>)>,
    /// Uniform assignments in order, with the active program.
    pub uniforms: Vec<(ProgramHandle, String, UniformValue)>,
    /// When set, the `create_program` call that would mint this slot
    /// index fails instead.
    pub fail_program_index: Option<u32>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, Op::Draw { .. })).count()
    }

    pub fn frame_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, Op::BeginFrame)).count()
    }

    pub fn upload_count(&self, handle: BufferHandle) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::UploadVertexBuffer(h) if *h == handle))
            .count()
    }

    pub fn last_vertex_data(&self, handle: BufferHandle) -> Option<&[f32]> {
        self.vertex_data
            .iter()
            .rev()
            .find(|(h, _)| *h == handle)
            .map(|(_, data)| data.as_slice())
    }

    pub fn uniform_values(&self, name: &str) -> Vec<UniformValue> {
        self.uniforms
            .iter()
            .filter(|(_, n, _)| n == name)
            .map(|(_, _, v)| *v)
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferHandle {
        let handle = BufferHandle::new(self.next_buffer);
        self.next_buffer += 1;
        self.ops.push(Op::CreateVertexBuffer(handle));
        self.vertex_data.push((handle, data.to_vec()));
        handle
    }

    fn create_index_buffer(&mut self, _data: &[u32]) -> BufferHandle {
        let handle = BufferHandle::new(self.next_buffer);
        self.next_buffer += 1;
        self.ops.push(Op::CreateIndexBuffer(handle));
        handle
    }

    fn upload_vertex_buffer(&mut self, handle: BufferHandle, data: &[f32]) {
        self.ops.push(Op::UploadVertexBuffer(handle));
        self.vertex_data.push((handle, data.to_vec()));
    }

    fn create_program(
        &mut self,
        _vertex_src: &str,
        _fragment_src: &str,
    ) -> Result<ProgramHandle, MiradorError> {
        if self.fail_program_index == Some(self.next_program) {
            return Err(MiradorError::ShaderCompile {
                stage: ShaderStage::Fragment,
                log: "synthetic rejection".to_owned(),
            });
        }
        let handle = ProgramHandle::new(self.next_program);
        self.next_program += 1;
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.ops.push(Op::UseProgram(program));
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue) {
        self.uniforms.push((program, name.to_owned(), value));
    }

    fn begin_frame(&mut self, _clear_color: [f32; 4]) {
        self.ops.push(Op::BeginFrame);
    }

    fn draw_indexed(
        &mut self,
        _vertices: BufferHandle,
        _normals: BufferHandle,
        _indices: BufferHandle,
        index_count: u32,
    ) {
        self.ops.push(Op::Draw { index_count });
    }

    fn end_frame(&mut self) -> Result<(), MiradorError> {
        self.ops.push(Op::EndFrame);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.ops.push(Op::Resize(width, height));
    }
}
