//! World-space triangles and the exact ray/triangle test.

use brickmesh_math::{Aabb3, Point3};
use brickmesh_model::ObjectId;

use crate::ray::Ray;

/// Smallest accepted determinant. Smaller (or negative) values mean the ray
/// is parallel to the triangle or sees its back face.
pub const DET_EPSILON: f64 = 1e-7;

/// A world-space triangle tagged with its owning object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First corner.
    pub p0: Point3,
    /// Second corner.
    pub p1: Point3,
    /// Third corner.
    pub p2: Point3,
    /// Object the triangle belongs to.
    pub object: ObjectId,
}

impl Triangle {
    /// New triangle.
    pub fn new(p0: Point3, p1: Point3, p2: Point3, object: ObjectId) -> Self {
        Self { p0, p1, p2, object }
    }

    /// Axis-aligned bounds of the three corners.
    pub fn aabb(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for p in [&self.p0, &self.p1, &self.p2] {
            aabb.include_point(p);
        }
        aabb
    }

    /// Centroid.
    pub fn centroid(&self) -> Point3 {
        Point3::from((self.p0.coords + self.p1.coords + self.p2.coords) / 3.0)
    }
}

/// One ray/triangle intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Signed distance along the ray.
    pub distance: f64,
    /// Object owning the hit triangle.
    pub object: ObjectId,
    /// Barycentric `(u, v)` weights of the second and third corners.
    pub barycentric: (f64, f64),
    /// World-space hit point.
    pub point: Point3,
}

/// Möller–Trumbore intersection of `ray` with the front face of `tri`.
///
/// The determinant is not taken by absolute value: a triangle is only hit
/// from the side its `p0, p1, p2` winding faces. The returned distance is
/// signed, so hits behind the origin are reported with `distance < 0`.
pub fn intersect_triangle(tri: &Triangle, ray: &Ray) -> Option<RaycastHit> {
    let dir = ray.direction.as_ref();
    let edge1 = tri.p1 - tri.p0;
    let edge2 = tri.p2 - tri.p0;
    let p_vec = dir.cross(&edge2);
    let det = edge1.dot(&p_vec);
    if det < DET_EPSILON {
        return None;
    }

    let t_vec = ray.origin - tri.p0;
    let u = t_vec.dot(&p_vec);
    if u < 0.0 || u > det {
        return None;
    }

    let q_vec = t_vec.cross(&edge1);
    let v = dir.dot(&q_vec);
    if v < 0.0 || u + v > det {
        return None;
    }

    let distance = edge2.dot(&q_vec) / det;
    let (u, v) = (u / det, v / det);
    Some(RaycastHit {
        distance,
        object: tri.object,
        barycentric: (u, v),
        point: tri.p0 + edge1 * u + edge2 * v,
    })
}
