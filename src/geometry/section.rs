//! The sectioning plane: the one mesh whose vertices are rewritten after
//! construction.

use crate::error::MiradorError;
use crate::geometry::Geometry;
use crate::gpu::RenderBackend;

/// A movable cross-section plane.
///
/// Wraps a plain [`Geometry`] that must be a quad (exactly 4 vertices).
/// [`update_axis`](Self::update_axis) slides the quad along the world X
/// axis by rewriting each vertex's X component and re-uploading the whole
/// vertex buffer; the other coordinates stay fixed at their construction
/// values. Every other mesh in the scene is upload-once.
#[derive(Debug)]
pub struct SectioningPlane {
    geometry: Geometry,
}

impl SectioningPlane {
    /// Vertex count a sectioning plane must have.
    pub const VERTEX_COUNT: usize = 4;

    /// Validate and upload the plane quad.
    ///
    /// # Errors
    ///
    /// Returns [`MiradorError::InvalidGeometry`] if the mesh is not
    /// exactly 4 vertices, or for any of the [`Geometry::new`] invariant
    /// violations.
    pub fn new<B: RenderBackend>(
        backend: &mut B,
        vertices: Vec<f32>,
        normals: Vec<f32>,
        indices: Vec<u32>,
        color: [f32; 4],
    ) -> Result<Self, MiradorError> {
        if vertices.len() != Self::VERTEX_COUNT * 3 {
            return Err(MiradorError::InvalidGeometry(format!(
                "sectioning plane needs exactly {} vertices, got {}",
                Self::VERTEX_COUNT,
                vertices.len() / 3
            )));
        }
        Ok(Self {
            geometry: Geometry::new(backend, vertices, normals, indices, color)?,
        })
    }

    /// Move the plane to the given world X position and re-upload its
    /// vertex buffer.
    pub fn update_axis<B: RenderBackend>(&mut self, backend: &mut B, x: f32) {
        for i in (0..self.geometry.vertices.len()).step_by(3) {
            self.geometry.vertices[i] = x;
        }
        backend.upload_vertex_buffer(self.geometry.vertex_buffer, &self.geometry.vertices);
    }

    /// Current world X position of the plane.
    #[must_use]
    pub fn axis(&self) -> f32 {
        self.geometry.vertices[0]
    }

    /// The underlying quad geometry.
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Mutable access for color changes.
    pub fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::section_quad;
    use crate::gpu::recording::RecordingBackend;

    use super::*;

    fn make_plane(backend: &mut RecordingBackend) -> SectioningPlane {
        let quad = section_quad(2.0);
        SectioningPlane::new(
            backend,
            quad.vertices,
            quad.normals,
            quad.indices,
            [0.3, 0.3, 0.9, 0.5],
        )
        .unwrap()
    }

    #[test]
    fn non_quad_meshes_are_rejected() {
        let mut backend = RecordingBackend::new();
        let cube = crate::geometry::cube(1.0);
        let result = SectioningPlane::new(
            &mut backend,
            cube.vertices,
            cube.normals,
            cube.indices,
            [1.0; 4],
        );
        assert!(matches!(result, Err(MiradorError::InvalidGeometry(_))));
        assert!(backend.ops.is_empty());
    }

    #[test]
    fn update_axis_rewrites_only_x_and_reuploads_once() {
        let mut backend = RecordingBackend::new();
        let mut plane = make_plane(&mut backend);
        let handle = plane.geometry().vertex_buffer();
        let before = plane.geometry().vertices().to_vec();
        assert_eq!(backend.upload_count(handle), 0);

        plane.update_axis(&mut backend, 3.25);

        assert_eq!(backend.upload_count(handle), 1);
        assert_eq!(plane.axis(), 3.25);

        let after = backend.last_vertex_data(handle).unwrap();
        for (i, (old, new)) in before.iter().zip(after.iter()).enumerate() {
            if i % 3 == 0 {
                assert_eq!(*new, 3.25);
            } else {
                assert_eq!(new, old);
            }
        }
    }

    #[test]
    fn repeated_updates_each_reupload() {
        let mut backend = RecordingBackend::new();
        let mut plane = make_plane(&mut backend);
        let handle = plane.geometry().vertex_buffer();

        plane.update_axis(&mut backend, -1.0);
        plane.update_axis(&mut backend, 0.5);
        plane.update_axis(&mut backend, 0.75);
        assert_eq!(backend.upload_count(handle), 3);
        assert_eq!(plane.axis(), 0.75);
    }
}
