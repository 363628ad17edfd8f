//! Conversion from the right-handed, Y-down source convention of model files
//! to the left-handed, Y-up target convention.
//!
//! The conversion is a reflection `S = diag(1, -1, 1)`. Points become `S·p`,
//! reference matrices become `S·M·S`. The reflection preserves the
//! determinant of the linear part, so a mirroring reference stays mirroring.

use nalgebra::Matrix3;

use crate::{Point3, Transform, Vec3};

/// Convert a source vertex to the target convention (negate Y).
pub fn convert_point(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, -y, z)
}

/// Convert the 12 numbers of a sub-part reference line
/// (`x y z a b c d e f g h i`) into a target-convention transform.
///
/// Source layout:
///
/// ```text
/// | a b c x |
/// | d e f y |
/// | g h i z |
/// ```
///
/// Target: entries b, d, f, h and the Y translation change sign.
pub fn convert_reference_matrix(fields: &[f64; 12]) -> Transform {
    let [x, y, z, a, b, c, d, e, f, g, h, i] = *fields;
    #[rustfmt::skip]
    let linear = Matrix3::new(
         a, -b,  c,
        -d,  e, -f,
         g, -h,  i,
    );
    Transform::from_parts(&linear, &Vec3::new(x, -y, z))
}
