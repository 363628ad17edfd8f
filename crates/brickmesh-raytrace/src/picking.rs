//! Ray picking over a set of scene objects.

use brickmesh_math::Aabb3;
use brickmesh_model::{world_buffers, ObjectId, RenderOptions, SceneObject};
use tracing::debug;

use crate::octree::Octree;
use crate::ray::Ray;
use crate::triangle::{RaycastHit, Triangle};

/// Picking settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickOptions {
    /// Octree subdivision depth.
    pub octree_depth: u32,
    /// Drop hits with negative distance. When off, the whole line through
    /// the ray is searched.
    pub cull_behind_origin: bool,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            octree_depth: 3,
            cull_behind_origin: true,
        }
    }
}

/// An octree over the world-space triangles of a fixed set of objects.
///
/// Built once per picking session; rebuild it when the candidate objects
/// move.
#[derive(Debug, Clone)]
pub struct PickingSession {
    octree: Option<Octree>,
    options: PickOptions,
}

impl PickingSession {
    /// Collect every triangle of `objects` (studs included) in world space
    /// and index them.
    pub fn new<'a>(objects: impl IntoIterator<Item = &'a SceneObject>, options: PickOptions) -> Self {
        let mut triangles = Vec::new();
        let mut bounds = Aabb3::empty();
        let render = RenderOptions::default();
        for object in objects {
            let world = world_buffers(&object.root, &object.world_state(), &render);
            for i in 0..world.num_triangles() {
                let [p0, p1, p2] = world.triangle_points(i);
                let tri = Triangle::new(p0, p1, p2, object.id);
                bounds.include_aabb(&tri.aabb());
                triangles.push(tri);
            }
        }

        let octree = (!triangles.is_empty()).then(|| {
            let mut octree = Octree::build(&bounds, options.octree_depth);
            for tri in triangles {
                octree.insert(tri);
            }
            octree
        });
        debug!(
            triangles = octree.as_ref().map_or(0, Octree::len),
            depth = options.octree_depth,
            "built picking octree"
        );
        Self { octree, options }
    }

    /// The index, if any triangle was collected.
    pub fn octree(&self) -> Option<&Octree> {
        self.octree.as_ref()
    }

    /// Every hit along `ray`, nearest first.
    pub fn raycast(&self, ray: &Ray) -> Vec<RaycastHit> {
        let Some(octree) = &self.octree else {
            return Vec::new();
        };
        if self.options.cull_behind_origin {
            let mut hits = octree.query(ray);
            hits.retain(|hit| hit.distance >= 0.0);
            hits
        } else {
            octree.query_line(ray)
        }
    }

    /// Nearest hit along `ray`.
    pub fn pick(&self, ray: &Ray) -> Option<RaycastHit> {
        self.raycast(ray).into_iter().next()
    }

    /// Nearest object along `ray`.
    pub fn pick_object(&self, ray: &Ray) -> Option<ObjectId> {
        self.pick(ray).map(|hit| hit.object)
    }
}
