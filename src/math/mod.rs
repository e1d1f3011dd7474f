pub mod arc_2d;
pub mod polygon_3d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns `true` if `a` and `b` differ by no more than `eps`.
#[inline]
#[must_use]
pub fn is_nearly_equal(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Applies a homogeneous transform to a point.
#[must_use]
pub fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    matrix.transform_point(point)
}

/// Returns `true` if the transform flips handedness (a mirror).
#[must_use]
pub fn is_mirroring(matrix: &Matrix4) -> bool {
    matrix.fixed_view::<3, 3>(0, 0).into_owned().determinant() < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_respects_eps() {
        assert!(is_nearly_equal(0.0, 1e-7, 1e-6));
        assert!(!is_nearly_equal(0.0, 1e-5, 1e-6));
    }

    #[test]
    fn mirror_detection() {
        let mirror = Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0));
        assert!(is_mirroring(&mirror));
        assert!(!is_mirroring(&Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0))));
    }
}
