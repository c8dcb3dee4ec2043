//! Flat scene storage with merged bounds and the dirty-generation flag.

use crate::bounds::BoundingVolume;
use crate::geometry::{Geometry, SectioningPlane};

/// What a scene slot holds: a plain mesh, or the mutable sectioning
/// plane.
///
/// The tagged union replaces subclassing — the only behavioral difference
/// between the variants is that the plane's vertices may be rewritten
/// after construction.
#[derive(Debug)]
pub enum ObjectKind {
    /// Upload-once triangle mesh.
    Mesh(Geometry),
    /// Live cross-section plane.
    Plane(SectioningPlane),
}

/// A scene object: a scene-assigned id plus its geometry variant.
#[derive(Debug)]
pub struct SceneObject {
    id: u32,
    kind: ObjectKind,
}

impl SceneObject {
    /// Scene-assigned identifier.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The geometry variant.
    #[must_use]
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Whether this object is the sectioning plane.
    #[must_use]
    pub fn is_plane(&self) -> bool {
        matches!(self.kind, ObjectKind::Plane(_))
    }

    /// The underlying geometry, for either variant.
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        match &self.kind {
            ObjectKind::Mesh(g) => g,
            ObjectKind::Plane(p) => p.geometry(),
        }
    }

    /// Mutable geometry access (color state).
    pub fn geometry_mut(&mut self) -> &mut Geometry {
        match &mut self.kind {
            ObjectKind::Mesh(g) => g,
            ObjectKind::Plane(p) => p.geometry_mut(),
        }
    }

    /// The sectioning plane, if this object is one.
    pub fn as_plane_mut(&mut self) -> Option<&mut SectioningPlane> {
        match &mut self.kind {
            ObjectKind::Plane(p) => Some(p),
            ObjectKind::Mesh(_) => None,
        }
    }
}

/// The authoritative scene. Owns all objects in a flat list.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    next_id: u32,
    /// Monotonically increasing generation; bumped on any mutation.
    generation: u64,
    /// Generation that was last consumed by the renderer.
    rendered_generation: u64,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Dirty tracking --

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Whether scene data changed since the last `mark_rendered()`.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.generation != self.rendered_generation
    }

    /// Force the scene dirty (e.g. when draw state changed outside the
    /// scene's own mutators).
    pub fn force_dirty(&mut self) {
        self.invalidate();
    }

    /// Mark the current generation as rendered.
    pub fn mark_rendered(&mut self) {
        self.rendered_generation = self.generation;
    }

    // -- Object management --

    /// Add a plain mesh. Returns its scene-assigned id.
    pub fn add_mesh(&mut self, geometry: Geometry) -> u32 {
        self.add(ObjectKind::Mesh(geometry))
    }

    /// Add the sectioning plane. Returns its scene-assigned id.
    pub fn add_plane(&mut self, plane: SectioningPlane) -> u32 {
        self.add(ObjectKind::Plane(plane))
    }

    fn add(&mut self, kind: ObjectKind) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.push(SceneObject { id, kind });
        self.invalidate();
        id
    }

    /// Remove an object by id. Returns the removed object, if any.
    pub fn remove(&mut self, id: u32) -> Option<SceneObject> {
        let idx = self.objects.iter().position(|o| o.id == id)?;
        let object = self.objects.remove(idx);
        self.invalidate();
        Some(object)
    }

    /// Read access to an object.
    #[must_use]
    pub fn object(&self, id: u32) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Mutable access to an object. Marks the scene dirty.
    pub fn object_mut(&mut self, id: u32) -> Option<&mut SceneObject> {
        self.invalidate();
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// All objects in insertion order.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Mutable access to the first sectioning plane. Marks the scene
    /// dirty.
    pub fn plane_mut(&mut self) -> Option<&mut SectioningPlane> {
        self.invalidate();
        self.objects.iter_mut().find_map(SceneObject::as_plane_mut)
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Merged bounds over all objects' per-object bounds — O(objects),
    /// never re-derived from raw vertices. `None` for an empty scene.
    #[must_use]
    pub fn bounds(&self) -> Option<BoundingVolume> {
        self.objects
            .iter()
            .map(|o| *o.geometry().bounds())
            .reduce(|a, b| a.merged(&b))
    }
}
