use crate::error::{GeometryError, Result};
use crate::math::{Matrix4, Point3, Vector3, TOLERANCE};

/// The side surface of an arc footprint edge swept along its axis.
///
/// `ref_dir` is the radial direction of the sweep's angle zero; it is kept
/// so a mirror or rotation carries the angular frame along.
#[derive(Debug, Clone)]
pub struct Cylinder {
    center: Point3,
    radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
}

impl Cylinder {
    /// # Errors
    ///
    /// Returns an error if the radius is not positive, a direction is zero or
    /// `ref_dir` is not perpendicular to `axis`.
    pub fn new(center: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("cylinder radius must be positive".into()).into());
        }
        let axis = axis.try_normalize(TOLERANCE).ok_or(GeometryError::ZeroVector)?;
        let ref_dir = ref_dir.try_normalize(TOLERANCE).ok_or(GeometryError::ZeroVector)?;
        if axis.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate("cylinder reference direction leaves the radial plane".into()).into());
        }
        Ok(Self {
            center,
            radius,
            axis,
            ref_dir,
        })
    }

    /// A point on the axis.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Unit axis direction.
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Outward unit normal at `point`, i.e. the direction from the axis to
    /// the point. `None` when the point lies on the axis.
    #[must_use]
    pub fn normal_at(&self, point: &Point3) -> Option<Vector3> {
        let offset = point - self.center;
        let radial = offset - self.axis * offset.dot(&self.axis);
        radial.try_normalize(TOLERANCE)
    }

    /// Returns a copy moved by a similarity transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform collapses the axis or radius.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        let radial = matrix.transform_vector(&(self.ref_dir * self.radius));
        let binormal = matrix.transform_vector(&self.axis.cross(&self.ref_dir));
        let ref_dir = radial.try_normalize(TOLERANCE).ok_or(GeometryError::ZeroVector)?;
        let binormal = binormal.try_normalize(TOLERANCE).ok_or(GeometryError::ZeroVector)?;
        Self::new(
            matrix.transform_point(&self.center),
            radial.norm(),
            ref_dir.cross(&binormal),
            ref_dir,
        )
    }
}
