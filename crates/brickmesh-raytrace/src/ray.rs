//! Ray representation and the ray/box slab test.

use brickmesh_math::{Aabb3, Dir3, Point3, Vec3};

/// A ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
    /// Reciprocal of the direction components.
    inv_direction: Vec3,
    /// Per axis: 1 if the direction component is negative.
    sign: [usize; 3],
}

impl Ray {
    /// Create a new ray from origin and direction. The direction is
    /// normalized.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        let dir = Dir3::new_normalize(direction);
        let inv = Vec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);
        let sign = [
            usize::from(inv.x < 0.0),
            usize::from(inv.y < 0.0),
            usize::from(inv.z < 0.0),
        ];
        Self {
            origin,
            direction: dir,
            inv_direction: inv,
            sign,
        }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Slab test against `aabb`.
    ///
    /// Returns the entry and exit parameters, entry clamped to 0, or `None`
    /// if the box is missed or lies entirely behind the origin.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        let (t_min, t_max) = self.slabs(aabb);
        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min.max(0.0), t_max))
        } else {
            None
        }
    }

    /// Slab test of the whole line through the ray against `aabb`.
    ///
    /// Like [`intersect_aabb`](Self::intersect_aabb) but boxes behind the
    /// origin count too, with negative parameters.
    #[inline]
    pub fn intersect_line_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        let (t_min, t_max) = self.slabs(aabb);
        (t_max >= t_min).then_some((t_min, t_max))
    }

    fn slabs(&self, aabb: &Aabb3) -> (f64, f64) {
        let bounds = [aabb.min, aabb.max];

        let tx1 = (bounds[self.sign[0]].x - self.origin.x) * self.inv_direction.x;
        let tx2 = (bounds[1 - self.sign[0]].x - self.origin.x) * self.inv_direction.x;

        let mut t_min = tx1;
        let mut t_max = tx2;

        let ty1 = (bounds[self.sign[1]].y - self.origin.y) * self.inv_direction.y;
        let ty2 = (bounds[1 - self.sign[1]].y - self.origin.y) * self.inv_direction.y;

        t_min = t_min.max(ty1);
        t_max = t_max.min(ty2);

        let tz1 = (bounds[self.sign[2]].z - self.origin.z) * self.inv_direction.z;
        let tz2 = (bounds[1 - self.sign[2]].z - self.origin.z) * self.inv_direction.z;

        t_min = t_min.max(tz1);
        t_max = t_max.min(tz2);

        (t_min, t_max)
    }
}
