//! Axis-aligned bounds and enclosing spheres for point sets.
//!
//! Bounds are computed once per point set and merged per object for scene
//! framing, so the scene-level aggregate is O(objects), not O(vertices).

use glam::Vec3;

use crate::error::MiradorError;

/// Axis-aligned box plus the sphere enclosing it.
///
/// `center` carries a negated sign convention: it is `-(min + max) / 2`,
/// so it can be applied directly as the translation that brings the
/// volume's midpoint to the origin. The midpoint in world space is
/// `-center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingVolume {
    /// Component-wise minimum of the point set.
    pub min: Vec3,
    /// Component-wise maximum of the point set.
    pub max: Vec3,
    /// Negated box midpoint (translation-to-origin).
    pub center: Vec3,
    /// Radius of the sphere through the box corners.
    pub radius: f32,
}

impl BoundingVolume {
    /// Compute bounds over a point set in a single scan.
    ///
    /// # Errors
    ///
    /// Returns [`MiradorError::EmptyPointSet`] for zero points rather than
    /// producing infinite bounds silently.
    pub fn from_points(points: &[Vec3]) -> Result<Self, MiradorError> {
        let (first, rest) = points.split_first().ok_or(MiradorError::EmptyPointSet)?;
        let mut min = *first;
        let mut max = *first;
        for p in rest {
            min = min.min(*p);
            max = max.max(*p);
        }
        Ok(Self::from_min_max(min, max))
    }

    /// Compute bounds over a flat `x, y, z` coordinate array (stride 3).
    ///
    /// A trailing partial triple is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MiradorError::EmptyPointSet`] if the array holds no
    /// complete point.
    pub fn from_flat(coords: &[f32]) -> Result<Self, MiradorError> {
        let mut chunks = coords.chunks_exact(3);
        let first = chunks.next().ok_or(MiradorError::EmptyPointSet)?;
        let mut min = Vec3::new(first[0], first[1], first[2]);
        let mut max = min;
        for c in chunks {
            let p = Vec3::new(c[0], c[1], c[2]);
            min = min.min(p);
            max = max.max(p);
        }
        Ok(Self::from_min_max(min, max))
    }

    /// Union of two volumes: min/max merged, center and radius re-derived.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        Self::from_min_max(self.min.min(other.min), self.max.max(other.max))
    }

    fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            center: -(min + max) / 2.0,
            radius: (max - min).length() / 2.0,
        }
    }
}
