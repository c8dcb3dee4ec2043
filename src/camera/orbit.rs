use std::f32::consts::FRAC_PI_4;

use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::bounds::BoundingVolume;
use crate::camera::Projection;

/// Smallest permitted orbit distance. Mutations that would push the eye
/// onto the target are clamped here instead of degenerating the view
/// matrix.
pub const MIN_OFFSET: f32 = 1e-4;

/// Orbit camera parametrized by two cumulative angles, a look-at target,
/// and a distance offset.
///
/// `alpha` and `theta` are unbounded radians: there is no wraparound
/// normalization and no pitch clamp, so full 360°+ orbits and gimbal flips
/// are permitted. `target` follows the same negated-translation convention
/// as [`BoundingVolume::center`] — it is the translation that brings the
/// look-at point to the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Cumulative yaw angle in radians (rotation about the evolving local
    /// Y axis).
    pub alpha: f32,
    /// Cumulative pitch angle in radians (rotation about the evolving
    /// local X axis).
    pub theta: f32,
    /// Translation bringing the look-at point to the origin.
    pub target: Vec3,
    /// Eye distance from the target, always `>= MIN_OFFSET`.
    offset: f32,
}

/// Matrices and camera-space data derived from the orbit parameters for
/// one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransforms {
    /// World-to-camera matrix.
    pub view: Mat4,
    /// Combined projection * view matrix.
    pub view_proj: Mat4,
    /// Camera-to-world matrix.
    pub inverse_view: Mat4,
    /// Eye position in world space (translation column of `inverse_view`).
    pub eye: Vec3,
    /// Transposed inverse of the view matrix's upper-left 3x3, for
    /// transforming normals.
    pub normal_matrix: Mat3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            alpha: -FRAC_PI_4,
            theta: FRAC_PI_4,
            target: Vec3::ZERO,
            offset: 5.0,
        }
    }
}

impl OrbitCamera {
    /// Camera with the default start pose (quarter-turn orbit, offset 5).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Eye distance from the target.
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Set the eye distance, clamping to [`MIN_OFFSET`].
    pub fn set_offset(&mut self, offset: f32) {
        if offset < MIN_OFFSET {
            log::warn!("camera offset {offset} clamped to {MIN_OFFSET}");
        }
        self.offset = offset.max(MIN_OFFSET);
    }

    /// Build the view matrix from the current orbit parameters.
    ///
    /// The rotations compose in the matrix's own evolving frame: first
    /// `alpha` about the current Y basis row, then `theta` about the
    /// resulting X basis row. The target translation follows, and finally
    /// the eye is pushed back along the matrix's own look axis (the Z
    /// basis row) by `offset` units.
    ///
    /// The result is a pure function of `(alpha, theta, target, offset)`;
    /// nothing is cached across parameter changes.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        let mut m = Mat4::IDENTITY;

        let yaw_axis = basis_row(&m, 1);
        m *= Mat4::from_axis_angle(yaw_axis.normalize(), self.alpha);
        let pitch_axis = basis_row(&m, 0);
        m *= Mat4::from_axis_angle(pitch_axis.normalize(), self.theta);

        m *= Mat4::from_translation(self.target);

        let back = basis_row(&m, 2).normalize() * -self.offset;
        m * Mat4::from_translation(back)
    }

    /// Derive the full per-frame transform set from the current
    /// parameters and the given projection.
    #[must_use]
    pub fn transforms(&self, projection: &Projection) -> ViewTransforms {
        let view = self.view_matrix();
        let inverse_view = view.inverse();
        ViewTransforms {
            view,
            view_proj: projection.matrix() * view,
            eye: inverse_view.w_axis.truncate(),
            normal_matrix: Mat3::from_mat4(view).inverse().transpose(),
            inverse_view,
        }
    }

    /// Apply a rotate gesture: pixel deltas scaled by the sensitivity
    /// constant accumulate into the orbit angles.
    pub fn rotate(&mut self, delta: Vec2, speed: f32) {
        self.alpha -= delta.x * speed;
        self.theta -= delta.y * speed;
    }

    /// Apply a pan gesture: the target moves along the camera-local right
    /// and up axes, read from the given view matrix's basis rows.
    pub fn pan(&mut self, delta: Vec2, view: &Mat4, speed: f32) {
        let right = basis_row(view, 0).normalize();
        let up = basis_row(view, 1).normalize();
        self.target += right * (delta.x * speed) - up * (delta.y * speed);
    }

    /// Apply a wheel/pinch zoom: positive deltas pull the eye toward the
    /// target. Clamps at [`MIN_OFFSET`].
    pub fn zoom(&mut self, delta: f32, speed: f32) {
        self.set_offset(self.offset - delta * speed);
    }

    /// Frame the given bounds: center the target on the volume and back
    /// the eye off far enough that the bounding sphere fits the narrower
    /// view angle, then reset to the canonical quarter-turn orbit pose.
    pub fn frame(&mut self, bounds: &BoundingVolume, projection: &Projection) {
        self.target = bounds.center;
        self.set_offset(projection.fit_distance(bounds.radius));
        self.alpha = FRAC_PI_4;
        self.theta = FRAC_PI_4;
    }
}

/// First three components of a matrix row: the basis vectors the orbit
/// math steers by.
fn basis_row(m: &Mat4, row: usize) -> Vec3 {
    m.row(row).truncate()
}
