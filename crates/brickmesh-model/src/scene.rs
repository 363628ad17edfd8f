//! Placed models and their bounding volumes.

use brickmesh_math::{Aabb3, Point3, Rotation, Transform, Vec3};

use crate::node::{InstanceState, MeshNode};

/// Caller-assigned identity of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A model tree placed in the world.
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Identity reported by picking.
    pub id: ObjectId,
    /// Display name.
    pub name: String,
    /// The model tree.
    pub root: MeshNode,
    /// World position.
    pub position: Vec3,
    /// World rotation.
    pub rotation: Rotation,
    /// Per-axis scale.
    pub scale: Vec3,
    /// Collision box in the object's local frame, if the host has one.
    pub collider: Option<Aabb3>,
    /// World box of the object's static batch, if the host has one.
    pub static_batch: Option<Aabb3>,
}

impl SceneObject {
    /// Object at the origin with unit scale and no extra boxes.
    pub fn new(id: ObjectId, name: impl Into<String>, root: MeshNode) -> Self {
        Self {
            id,
            name: name.into(),
            root,
            position: Vec3::zeros(),
            rotation: Rotation::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            collider: None,
            static_batch: None,
        }
    }

    /// Full placement: `T * R * S`.
    pub fn world_transform(&self) -> Transform {
        Transform::from_trs(&self.position, &self.rotation, &self.scale)
    }

    /// Placement with the rotation left out.
    pub fn unrotated_transform(&self) -> Transform {
        Transform::from_trs(&self.position, &Rotation::identity(), &self.scale)
    }

    /// Instance state of the object's parent frame.
    pub fn world_state(&self) -> InstanceState {
        InstanceState {
            transform: self.world_transform(),
            ..InstanceState::default()
        }
    }
}

/// Where a bounding box may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundsSource {
    /// The object's local collider box.
    Collider,
    /// The object's world static-batch box.
    StaticBatch,
    /// The mesh geometry itself.
    Mesh,
}

/// Default source preference.
pub const DEFAULT_BOUNDS_SOURCES: [BoundsSource; 3] = [
    BoundsSource::Collider,
    BoundsSource::StaticBatch,
    BoundsSource::Mesh,
];

/// An axis-aligned box computed without the object's rotation, plus the
/// rotation (about `pivot`) that orients it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectBounds {
    /// Unrotated box.
    pub aabb: Aabb3,
    /// Rotation to apply about `pivot`.
    pub rotation: Rotation,
    /// The object's position.
    pub pivot: Point3,
    /// Which source produced the box.
    pub source: BoundsSource,
}

impl ObjectBounds {
    /// The rotated box.
    pub fn oriented(&self) -> OrientedBox {
        OrientedBox {
            center: self.aabb.center(),
            extents: self.aabb.extents(),
            rotation: self.rotation,
            pivot: self.pivot,
        }
    }
}

/// Box of the first source in `sources` that yields a non-degenerate result.
///
/// Collider boxes are placed with the object's position and scale. The
/// static-batch box is already in world space and is returned unrotated.
/// Mesh bounds cover the root's own geometry, and with `include_children`
/// every descendant, each through its full placement chain with the object's
/// rotation replaced by identity.
pub fn compute_bounds(
    object: &SceneObject,
    sources: &[BoundsSource],
    include_children: bool,
) -> Option<ObjectBounds> {
    let pivot = Point3::from(object.position);
    sources.iter().find_map(|&source| {
        let (aabb, rotation) = match source {
            BoundsSource::Collider => (
                object.collider?.transformed(&object.unrotated_transform()),
                object.rotation,
            ),
            BoundsSource::StaticBatch => (object.static_batch?, Rotation::identity()),
            BoundsSource::Mesh => (mesh_bounds(object, include_children)?, object.rotation),
        };
        (!aabb.is_degenerate()).then_some(ObjectBounds {
            aabb,
            rotation,
            pivot,
            source,
        })
    })
}

fn mesh_bounds(object: &SceneObject, include_children: bool) -> Option<Aabb3> {
    let parent = InstanceState {
        transform: object.unrotated_transform(),
        ..InstanceState::default()
    };
    if !include_children {
        let state = parent.child(&object.root);
        return object
            .root
            .local_bounds()
            .map(|b| b.transformed(&state.transform));
    }
    let mut total: Option<Aabb3> = None;
    object.root.walk(&parent, &mut |node, state| {
        if let Some(local) = node.local_bounds() {
            let world = local.transformed(&state.transform);
            match &mut total {
                Some(t) => t.include_aabb(&world),
                None => total = Some(world),
            }
        }
    });
    total
}

/// A box rotated about a pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// Centre before rotation.
    pub center: Point3,
    /// Half-sizes.
    pub extents: Vec3,
    /// Rotation about `pivot`.
    pub rotation: Rotation,
    /// Rotation pivot.
    pub pivot: Point3,
}

/// Corner index pairs of the 12 box edges: 4 bottom, 4 top, 4 vertical.
pub const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 5),
    (5, 4),
    (4, 0),
    (2, 3),
    (3, 7),
    (7, 6),
    (6, 2),
    (0, 2),
    (1, 3),
    (5, 7),
    (4, 6),
];

impl OrientedBox {
    /// The 8 corners. Bit 0 of the index selects +x, bit 1 +y, bit 2 +z.
    pub fn corners(&self) -> [Point3; 8] {
        let unrotated = Aabb3::from_center_extents(self.center, self.extents).corners();
        unrotated.map(|c| self.pivot + self.rotation * (c - self.pivot))
    }

    /// The 12 edges as corner pairs.
    pub fn edges(&self) -> [(Point3, Point3); 12] {
        let c = self.corners();
        BOX_EDGES.map(|(a, b)| (c[a], c[b]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brickmesh_library::PartKind;
    use brickmesh_mesh::MeshBuffers;
    use std::f64::consts::FRAC_PI_2;
    use std::sync::Arc;

    fn cube_node(name: &str, half: f64) -> MeshNode {
        let mut m = MeshBuffers::new();
        m.push_vertex(Point3::new(-half, -half, -half), 1);
        m.push_vertex(Point3::new(half, half, half), 1);
        m.push_vertex(Point3::new(half, -half, half), 1);
        m.push_triangle([0, 1, 2]);
        let mut n = MeshNode::new(name, PartKind::Part);
        n.geometry = Arc::new(m);
        n
    }

    fn object() -> SceneObject {
        let mut root = cube_node("root", 1.0);
        root.children
            .push(cube_node("child", 1.0).instance(Transform::translation(10.0, 0.0, 0.0), 4, false));
        let mut obj = SceneObject::new(ObjectId(7), "obj", root);
        obj.position = Vec3::new(0.0, 5.0, 0.0);
        obj.rotation = Rotation::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2);
        obj
    }

    #[test]
    fn test_mesh_bounds_ignore_rotation() {
        let obj = object();
        let b = compute_bounds(&obj, &[BoundsSource::Mesh], true).unwrap();
        assert_eq!(b.source, BoundsSource::Mesh);
        assert_relative_eq!(b.aabb.min, Point3::new(-1.0, 4.0, -1.0), epsilon = 1e-12);
        assert_relative_eq!(b.aabb.max, Point3::new(11.0, 6.0, 1.0), epsilon = 1e-12);
        assert_eq!(b.rotation, obj.rotation);
        assert_eq!(b.pivot, Point3::new(0.0, 5.0, 0.0));

        let own = compute_bounds(&obj, &[BoundsSource::Mesh], false).unwrap();
        assert_relative_eq!(own.aabb.max, Point3::new(1.0, 6.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_source_preference() {
        let mut obj = object();
        obj.scale = Vec3::new(2.0, 2.0, 2.0);
        obj.collider = Some(Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)));
        obj.static_batch = Some(Aabb3::new(Point3::new(-3.0, -3.0, -3.0), Point3::new(3.0, 3.0, 3.0)));

        let b = compute_bounds(&obj, &DEFAULT_BOUNDS_SOURCES, true).unwrap();
        assert_eq!(b.source, BoundsSource::Collider);
        assert_relative_eq!(b.aabb.max, Point3::new(2.0, 7.0, 2.0), epsilon = 1e-12);

        let b = compute_bounds(&obj, &[BoundsSource::StaticBatch, BoundsSource::Mesh], true).unwrap();
        assert_eq!(b.source, BoundsSource::StaticBatch);
        assert_eq!(b.rotation, Rotation::identity());
    }

    #[test]
    fn test_degenerate_sources_are_skipped() {
        let mut obj = object();
        let flat = Aabb3::new(Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 1.0));
        obj.collider = Some(flat);
        obj.static_batch = Some(flat);
        let b = compute_bounds(&obj, &DEFAULT_BOUNDS_SOURCES, true).unwrap();
        assert_eq!(b.source, BoundsSource::Mesh);

        let empty = SceneObject::new(ObjectId(1), "empty", MeshNode::new("e", PartKind::Model));
        assert!(compute_bounds(&empty, &DEFAULT_BOUNDS_SOURCES, true).is_none());
    }

    #[test]
    fn test_oriented_corners_and_edges() {
        let b = ObjectBounds {
            aabb: Aabb3::new(Point3::new(1.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0)),
            rotation: Rotation::from_axis_angle(&Vec3::z_axis(), FRAC_PI_2),
            pivot: Point3::origin(),
            source: BoundsSource::Mesh,
        };
        let obb = b.oriented();
        let corners = obb.corners();
        // (1, 0, 0) rotated a quarter turn about z
        assert_relative_eq!(corners[0], Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(corners[7], Point3::new(-1.0, 3.0, 1.0), epsilon = 1e-12);

        let edges = obb.edges();
        assert_eq!(edges.len(), 12);
        for (a, b) in edges {
            let len = (b - a).norm();
            assert!(
                [1.0, 2.0].iter().any(|l| (len - l).abs() < 1e-9),
                "edge length {len}"
            );
        }
    }
}
