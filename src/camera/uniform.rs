use glam::{Mat3, Mat4, Vec3};

/// GPU uniform block for one draw: shared camera matrices plus the
/// per-object color and sectioning-plane position.
///
/// Laid out to match the WGSL `Uniforms` struct and padded to 256 bytes so
/// consecutive blocks can be bound at dynamic offsets with the default
/// uniform-offset alignment.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    /// Combined projection * view matrix.
    pub view_proj: [[f32; 4]; 4],
    /// World-to-camera matrix.
    pub view: [[f32; 4]; 4],
    /// Normal matrix, columns padded to vec4 per WGSL mat3x3 layout.
    pub normal_matrix: [[f32; 4]; 3],
    /// Camera world-space position.
    pub camera_position: [f32; 3],
    /// Sectioning-plane X position (world space).
    pub x_section: f32,
    /// Object color (RGBA).
    pub color: [f32; 4],
    /// Padding up to the 256-byte dynamic-offset alignment.
    pub(crate) _pad: [f32; 12],
}

impl Default for DrawUniforms {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawUniforms {
    /// Identity matrices, white color, section plane at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            normal_matrix: mat3_padded(Mat3::IDENTITY),
            camera_position: [0.0; 3],
            x_section: 0.0,
            color: [1.0; 4],
            _pad: [0.0; 12],
        }
    }

    /// Store the normal matrix with per-column vec4 padding.
    pub fn set_normal_matrix(&mut self, value: Mat3) {
        self.normal_matrix = mat3_padded(value);
    }

    /// Store the camera position.
    pub fn set_camera_position(&mut self, value: Vec3) {
        self.camera_position = value.to_array();
    }
}

fn mat3_padded(m: Mat3) -> [[f32; 4]; 3] {
    [
        m.x_axis.extend(0.0).to_array(),
        m.y_axis.extend(0.0).to_array(),
        m.z_axis.extend(0.0).to_array(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_matches_the_dynamic_offset_alignment() {
        assert_eq!(size_of::<DrawUniforms>(), 256);
    }

    #[test]
    fn normal_matrix_columns_are_vec4_padded() {
        let mut u = DrawUniforms::new();
        u.set_normal_matrix(Mat3::from_cols(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(7.0, 8.0, 9.0),
        ));
        assert_eq!(u.normal_matrix[0], [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(u.normal_matrix[2], [7.0, 8.0, 9.0, 0.0]);
    }
}
