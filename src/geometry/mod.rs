//! Scene geometry: vertex/normal/index data with its GPU buffer lifecycle
//! and draw-time color state.

mod model;
mod section;
mod shapes;

pub use model::{load_mesh, MeshData};
pub use section::SectioningPlane;
pub use shapes::{cube, section_quad, uv_sphere};

use crate::bounds::BoundingVolume;
use crate::error::MiradorError;
use crate::gpu::{BufferHandle, RenderBackend};

/// Alpha channel applied by [`Geometry::set_transparent`].
pub const TRANSPARENT_ALPHA: f32 = 0.1;

/// A triangle mesh with uploaded GPU buffers and mutable color state.
///
/// Buffers are uploaded once at construction and never touched again;
/// color changes only affect the uniform set at draw time. The sectioning
/// plane (the one mesh whose vertices are rewritten live) wraps this type
/// via [`SectioningPlane`].
#[derive(Debug)]
pub struct Geometry {
    vertices: Vec<f32>,
    normals: Vec<f32>,
    indices: Vec<u32>,
    color: [f32; 4],
    original_color: [f32; 4],
    bounds: BoundingVolume,
    vertex_buffer: BufferHandle,
    normal_buffer: BufferHandle,
    index_buffer: BufferHandle,
}

impl Geometry {
    /// Validate the mesh data, compute its bounds, and upload vertex,
    /// normal, and index buffers.
    ///
    /// # Errors
    ///
    /// Returns [`MiradorError::InvalidGeometry`] before any upload if the
    /// vertex array is empty or not stride-3, the normal count does not
    /// match the vertex count, the index list is not triangulated, or an
    /// index is out of range.
    pub fn new<B: RenderBackend>(
        backend: &mut B,
        vertices: Vec<f32>,
        normals: Vec<f32>,
        indices: Vec<u32>,
        color: [f32; 4],
    ) -> Result<Self, MiradorError> {
        validate_mesh(&vertices, &normals, &indices)?;
        let bounds = BoundingVolume::from_flat(&vertices)?;

        let vertex_buffer = backend.create_vertex_buffer(&vertices);
        let normal_buffer = backend.create_vertex_buffer(&normals);
        let index_buffer = backend.create_index_buffer(&indices);

        Ok(Self {
            vertices,
            normals,
            indices,
            color,
            original_color: color,
            bounds,
            vertex_buffer,
            normal_buffer,
            index_buffer,
        })
    }

    /// Construct from a [`MeshData`] record, using its embedded color or
    /// the given fallback.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Geometry::new`].
    pub fn from_mesh<B: RenderBackend>(
        backend: &mut B,
        mesh: MeshData,
        fallback_color: [f32; 4],
    ) -> Result<Self, MiradorError> {
        let color = mesh.color.unwrap_or(fallback_color);
        Self::new(backend, mesh.vertices, mesh.normals, mesh.indices, color)
    }

    /// Current draw color (RGBA).
    #[must_use]
    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Replace the draw color. No GPU calls.
    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }

    /// Force the alpha channel to [`TRANSPARENT_ALPHA`], preserving RGB.
    /// No GPU calls.
    pub fn set_transparent(&mut self) {
        self.color[3] = TRANSPARENT_ALPHA;
    }

    /// Restore the color captured at construction.
    pub fn restore_color(&mut self) {
        self.color = self.original_color;
    }

    /// Bounds computed at construction (or at the last explicit
    /// [`recompute_bounds`](Self::recompute_bounds)).
    #[must_use]
    pub fn bounds(&self) -> &BoundingVolume {
        &self.bounds
    }

    /// Re-derive bounds from the current vertex data. In-place vertex
    /// edits (the sectioning plane) do not do this implicitly.
    ///
    /// # Errors
    ///
    /// Returns [`MiradorError::EmptyPointSet`] if the mesh somehow holds
    /// no vertices (impossible for meshes built via [`Geometry::new`]).
    pub fn recompute_bounds(&mut self) -> Result<(), MiradorError> {
        self.bounds = BoundingVolume::from_flat(&self.vertices)?;
        Ok(())
    }

    /// Vertex coordinate array (stride 3).
    #[must_use]
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Number of indices in the triangle list.
    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Handle of the uploaded vertex buffer.
    #[must_use]
    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }

    /// Handle of the uploaded normal buffer.
    #[must_use]
    pub fn normal_buffer(&self) -> BufferHandle {
        self.normal_buffer
    }

    /// Handle of the uploaded index buffer.
    #[must_use]
    pub fn index_buffer(&self) -> BufferHandle {
        self.index_buffer
    }
}

fn validate_mesh(vertices: &[f32], normals: &[f32], indices: &[u32]) -> Result<(), MiradorError> {
    if vertices.is_empty() || vertices.len() % 3 != 0 {
        return Err(MiradorError::InvalidGeometry(format!(
            "vertex array length {} is not a non-empty multiple of 3",
            vertices.len()
        )));
    }
    if normals.len() != vertices.len() {
        return Err(MiradorError::InvalidGeometry(format!(
            "normal count {} does not match vertex count {}",
            normals.len() / 3,
            vertices.len() / 3
        )));
    }
    if indices.len() % 3 != 0 {
        return Err(MiradorError::InvalidGeometry(format!(
            "index list length {} is not a multiple of 3",
            indices.len()
        )));
    }
    let vertex_count = (vertices.len() / 3) as u32;
    if let Some(bad) = indices.iter().find(|&&i| i >= vertex_count) {
        return Err(MiradorError::InvalidGeometry(format!(
            "index {bad} out of range for {vertex_count} vertices"
        )));
    }
    Ok(())
}
