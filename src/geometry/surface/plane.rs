use crate::error::{GeometryError, Result};
use crate::math::{Matrix4, Point3, Vector3, TOLERANCE};

/// An infinite plane in 3D space.
///
/// Defined by an origin point, and two orthogonal direction vectors
/// (`u_dir`, `v_dir`). The normal is `u_dir × v_dir`.
///
/// Parametric form: `P(u, v) = origin + u * u_dir + v * v_dir`.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a plane whose U axis follows `u_dir` and whose V axis is the
    /// component of `v_hint` orthogonal to it.
    ///
    /// Wall side faces use this with the footprint edge direction and +Z.
    ///
    /// # Errors
    ///
    /// Returns an error if either vector is zero-length or they are parallel.
    pub fn new(origin: Point3, u_dir: Vector3, v_hint: Vector3) -> Result<Self> {
        let u_dir = u_dir.try_normalize(TOLERANCE).ok_or(GeometryError::ZeroVector)?;
        let v_dir = (v_hint - u_dir * v_hint.dot(&u_dir))
            .try_normalize(TOLERANCE)
            .ok_or_else(|| GeometryError::Degenerate("plane directions are parallel".into()))?;
        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal: u_dir.cross(&v_dir),
        })
    }

    /// Creates a plane from an origin and a normal vector.
    ///
    /// The U and V directions are computed automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let normal = normal.try_normalize(TOLERANCE).ok_or(GeometryError::ZeroVector)?;

        // Choose a reference vector not parallel to the normal
        let reference = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };

        let v_dir = normal.cross(&reference).normalize();
        let u_dir = v_dir.cross(&normal);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the normal vector of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Signed distance of `point` from the plane along its normal.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.normal)
    }

    /// Returns `true` if `point` is within `tol` of the plane.
    #[must_use]
    pub fn contains_point(&self, point: &Point3, tol: f64) -> bool {
        self.signed_distance(point).abs() <= tol
    }

    /// Returns a copy moved by a rigid or mirroring transform.
    ///
    /// The normal follows the transformed geometry, so a mirrored face keeps
    /// pointing to the same (mirrored) side of the solid.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform collapses the plane.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        let u_dir = matrix.transform_vector(&self.u_dir);
        let normal = matrix.transform_vector(&self.normal);
        let normal = normal.try_normalize(TOLERANCE).ok_or(GeometryError::ZeroVector)?;
        Self::new(matrix.transform_point(&self.origin), u_dir, normal.cross(&u_dir))
    }
}
