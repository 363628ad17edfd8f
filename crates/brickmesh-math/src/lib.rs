#![warn(missing_docs)]

//! Math types for brickmesh.
//!
//! Thin wrappers around nalgebra providing the types shared by every
//! brickmesh crate: points, vectors, directions, affine transforms and
//! axis-aligned boxes, plus the conversion from the right-handed source
//! convention of model files to the left-handed target convention.

mod aabb;
mod handedness;

pub use aabb::Aabb3;
pub use handedness::{convert_point, convert_reference_matrix};

use nalgebra::{Matrix3, Matrix4, Unit, UnitQuaternion, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A unit quaternion rotation.
pub type Rotation = UnitQuaternion<f64>;

/// A 4x4 affine transformation matrix (no perspective row).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Build from a 3x3 linear part and a translation.
    pub fn from_parts(linear: &Matrix3<f64>, translation: &Vec3) -> Self {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(linear);
        m[(0, 3)] = translation.x;
        m[(1, 3)] = translation.y;
        m[(2, 3)] = translation.z;
        Self { matrix: m }
    }

    /// Translation, then rotation, then scale, as a scene object places
    /// its geometry: `T * R * S`.
    pub fn from_trs(position: &Vec3, rotation: &Rotation, scale: &Vec3) -> Self {
        let linear = rotation.to_rotation_matrix().into_inner() * Matrix3::from_diagonal(scale);
        Self::from_parts(&linear, position)
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// Applying the result to a point applies `other` first, then `self`,
    /// so `parent.then(&child_local)` yields the child's world transform.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation, applies rotation/scale).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// The upper-left 3x3 (rotation and scale) part.
    pub fn linear(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// The translation column.
    pub fn translation_part(&self) -> Vec3 {
        Vec3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    /// Determinant of the linear part. Negative means the transform mirrors.
    pub fn determinant(&self) -> f64 {
        self.linear().determinant()
    }

    /// Whether the transform flips handedness.
    pub fn is_mirroring(&self) -> bool {
        self.determinant() < 0.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        let result = t.apply_point(&p);
        assert!((result - p).norm() < 1e-12);
    }

    #[test]
    fn test_translation() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let p = Point3::new(1.0, 2.0, 3.0);
        let result = t.apply_point(&p);
        assert!((result.x - 11.0).abs() < 1e-12);
        assert!((result.y - 22.0).abs() < 1e-12);
        assert!((result.z - 33.0).abs() < 1e-12);
        let v = t.apply_vec(&Vec3::new(1.0, 0.0, 0.0));
        assert!((v - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_then_applies_right_operand_first() {
        let parent = Transform::scale(2.0, 2.0, 2.0);
        let child = Transform::translation(1.0, 0.0, 0.0);
        // scale(translate(origin)) = (2, 0, 0)
        let world = parent.then(&child);
        let result = world.apply_point(&Point3::origin());
        assert!((result.x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_determinant_sign() {
        assert!(!Transform::rotation_y(PI / 3.0).is_mirroring());
        assert!(Transform::scale(1.0, -1.0, 1.0).is_mirroring());
        assert!((Transform::scale(2.0, 3.0, 4.0).determinant() - 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_trs() {
        let rot = Rotation::from_axis_angle(&Vec3::y_axis(), PI / 2.0);
        let t = Transform::from_trs(&Vec3::new(0.0, 5.0, 0.0), &rot, &Vec3::new(2.0, 2.0, 2.0));
        let p = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        // x axis rotated 90 degrees about y points to -z
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 5.0).abs() < 1e-12);
        assert!((p.z + 2.0).abs() < 1e-12);
    }
}
