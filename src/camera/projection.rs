use glam::Mat4;

/// Perspective projection defined by vertical field of view, viewport
/// aspect ratio, and clip planes.
///
/// The horizontal field of view is derived from the vertical one and the
/// aspect ratio; both feed the fit-distance computation used to auto-frame
/// a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    vfov: f32,
    /// Viewport aspect ratio (width / height).
    aspect: f32,
    /// Near clipping plane distance.
    znear: f32,
    /// Far clipping plane distance.
    zfar: f32,
}

impl Projection {
    /// Create a projection for the given viewport size.
    #[must_use]
    pub fn new(vfov: f32, width: u32, height: u32, znear: f32, zfar: f32) -> Self {
        Self {
            vfov,
            aspect: aspect_ratio(width, height),
            znear,
            zfar,
        }
    }

    /// Recompute the aspect ratio for a new viewport size.
    ///
    /// The horizontal FOV and the projection matrix are derived lazily, so
    /// this is the only state the resize has to touch.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// Vertical field of view in radians.
    #[must_use]
    pub fn vfov(&self) -> f32 {
        self.vfov
    }

    /// Set the vertical field of view in radians.
    pub fn set_vfov(&mut self, vfov: f32) {
        self.vfov = vfov;
    }

    /// Viewport aspect ratio (width / height).
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Horizontal field of view in radians, derived from the vertical FOV
    /// and aspect ratio.
    #[must_use]
    pub fn hfov(&self) -> f32 {
        2.0 * ((self.vfov * 0.5).tan() * self.aspect).atan()
    }

    /// Build the perspective matrix.
    pub fn matrix(&self) -> Mat4 {
        // perspective_rh already uses [0,1] depth range (wgpu/Vulkan
        // convention)
        Mat4::perspective_rh(self.vfov, self.aspect, self.znear, self.zfar)
    }

    /// Camera distance at which a sphere of the given radius fills the
    /// narrower of the two view angles.
    #[must_use]
    pub fn fit_distance(&self, radius: f32) -> f32 {
        radius / (self.vfov * 0.5).sin().min((self.hfov() * 0.5).sin())
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use super::*;

    #[test]
    fn square_viewport_has_equal_fovs() {
        let p = Projection::new(FRAC_PI_4, 512, 512, 0.001, 1000.0);
        assert!((p.hfov() - p.vfov()).abs() < 1e-6);
    }

    #[test]
    fn resize_recomputes_aspect_and_hfov() {
        let mut p = Projection::new(FRAC_PI_4, 800, 600, 0.001, 1000.0);
        let narrow_hfov = p.hfov();
        p.resize(1600, 600);
        assert!((p.aspect() - 1600.0 / 600.0).abs() < 1e-6);
        assert!(p.hfov() > narrow_hfov);
    }

    #[test]
    fn zero_sized_viewport_is_clamped() {
        let p = Projection::new(FRAC_PI_4, 0, 0, 0.001, 1000.0);
        assert_eq!(p.aspect(), 1.0);
    }

    #[test]
    fn fit_distance_contains_the_sphere() {
        // At the fit distance, the sphere subtends exactly the narrower
        // view angle: distance * sin(half-angle) == radius.
        let p = Projection::new(FRAC_PI_4, 800, 600, 0.001, 1000.0);
        let radius = 7.5;
        let d = p.fit_distance(radius);
        let half = (p.vfov() * 0.5).min(p.hfov() * 0.5);
        assert!((d * half.sin() - radius).abs() < 1e-4);

        // Wider-than-tall viewport: the vertical angle is the narrow one.
        assert!((d - radius / (p.vfov() * 0.5).sin()).abs() < 1e-4);
    }
}
