//! Axis-aligned bounding boxes.

use crate::{Point3, Transform, Vec3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from its center and half-size.
    pub fn from_center_extents(center: Point3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(p);
        }
        (!aabb.is_empty()).then_some(aabb)
    }

    /// True if nothing has been included yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this AABB to enclose another one.
    pub fn include_aabb(&mut self, other: &Aabb3) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Center point.
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Half-size along each axis.
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Full size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// A box with no volume and no area: empty, or collapsed to a point.
    pub fn is_degenerate(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        let size = self.size();
        size.x <= 0.0 && size.y <= 0.0 && size.z <= 0.0
    }

    /// Test if two AABBs overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Test if `other` lies entirely inside this box.
    pub fn contains_aabb(&self, other: &Aabb3) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.min.z <= other.min.z
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
            && self.max.z >= other.max.z
    }

    /// The eight corners, bit 0 selecting max x, bit 1 max y, bit 2 max z.
    pub fn corners(&self) -> [Point3; 8] {
        std::array::from_fn(|i| {
            Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// Axis-aligned box enclosing this box after `transform`.
    pub fn transformed(&self, transform: &Transform) -> Aabb3 {
        if self.is_empty() {
            return *self;
        }
        let mut out = Aabb3::empty();
        for corner in self.corners() {
            out.include_point(&transform.apply_point(&corner));
        }
        out
    }
}

impl Default for Aabb3 {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_and_center() {
        let mut aabb = Aabb3::empty();
        assert!(aabb.is_empty());
        aabb.include_point(&Point3::new(-1.0, 0.0, 2.0));
        aabb.include_point(&Point3::new(3.0, 4.0, 6.0));
        assert!(!aabb.is_empty());
        assert!((aabb.center() - Point3::new(1.0, 2.0, 4.0)).norm() < 1e-12);
        assert!((aabb.extents() - Vec3::new(2.0, 2.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn test_degenerate() {
        let point = Aabb3::new(Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 1.0));
        assert!(point.is_degenerate());
        assert!(Aabb3::empty().is_degenerate());
        // A flat plate still has area and is usable
        let plate = Aabb3::new(Point3::origin(), Point3::new(2.0, 0.0, 2.0));
        assert!(!plate.is_degenerate());
    }

    #[test]
    fn test_transformed_rotation_grows_box() {
        let aabb = Aabb3::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let rotated = aabb.transformed(&Transform::rotation_y(std::f64::consts::FRAC_PI_4));
        let expected = 2.0_f64.sqrt();
        assert!((rotated.max.x - expected).abs() < 1e-12);
        assert!((rotated.max.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_contains_and_overlaps() {
        let outer = Aabb3::new(Point3::origin(), Point3::new(10.0, 10.0, 10.0));
        let inner = Aabb3::new(Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 2.0, 2.0));
        let apart = Aabb3::new(Point3::new(11.0, 0.0, 0.0), Point3::new(12.0, 1.0, 1.0));
        assert!(outer.contains_aabb(&inner));
        assert!(!inner.contains_aabb(&outer));
        assert!(outer.overlaps(&inner));
        assert!(!outer.overlaps(&apart));
    }
}
