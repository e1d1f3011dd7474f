use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::arc_2d::{discrete_arc_2d, ArcSpan};
use crate::math::{Matrix4, Point2, Point3, Vector3, TOLERANCE};

use super::Curve;

/// A circular arc in 3D space.
///
/// Defined by a center, radius, normal axis, and a reference direction
/// for the zero-angle. The parametric form sweeps from `start_angle`
/// to `end_angle` (in radians, `end_angle > start_angle`) counter-clockwise
/// around the normal axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    center: Point3,
    radius: f64,
    normal: Vector3,
    ref_dir: Vector3,
    start_angle: f64,
    end_angle: f64,
}

impl Arc {
    /// Creates a new arc.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the arc circle
    /// * `radius` - Radius (must be positive)
    /// * `normal` - Normal vector defining the arc plane
    /// * `ref_dir` - Reference direction for angle = 0 (must be perpendicular to normal)
    /// * `start_angle` - Start angle in radians
    /// * `end_angle` - End angle in radians, greater than `start_angle`
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the normal is zero-length,
    /// the reference direction is not perpendicular to the normal, or the
    /// angular range is empty.
    pub fn new(
        center: Point3,
        radius: f64,
        normal: Vector3,
        ref_dir: Vector3,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }

        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / normal_len;

        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let ref_dir = ref_dir / ref_len;

        if normal.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to normal".into(),
            )
            .into());
        }

        if end_angle - start_angle < TOLERANCE || end_angle - start_angle > TAU + TOLERANCE {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "sweep",
                value: end_angle - start_angle,
                min: 0.0,
                max: TAU,
            }
            .into());
        }

        Ok(Self {
            center,
            radius,
            normal,
            ref_dir,
            start_angle,
            end_angle,
        })
    }

    /// Creates a horizontal arc from a plan-view description.
    ///
    /// `start_angle` is measured from +X in the XY plane and `sweep` is signed:
    /// positive runs counter-clockwise seen from +Z.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive or the sweep is zero.
    pub fn in_xy(center: Point3, radius: f64, start_angle: f64, sweep: f64) -> Result<Self> {
        if sweep >= 0.0 {
            Self::new(
                center,
                radius,
                Vector3::z(),
                Vector3::x(),
                start_angle,
                start_angle + sweep,
            )
        } else {
            // With normal -Z the binormal is -Y, so world angle θ maps to -θ.
            Self::new(
                center,
                radius,
                -Vector3::z(),
                Vector3::x(),
                -start_angle,
                -start_angle - sweep,
            )
        }
    }

    /// Returns the center of the arc.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius of the arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the normal vector of the arc plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the reference direction (angle zero).
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    /// Returns the angular extent of the arc.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Returns the arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.radius * self.sweep()
    }

    /// Computes the second axis direction (perpendicular to both normal and `ref_dir`).
    fn binormal(&self) -> Vector3 {
        self.normal.cross(&self.ref_dir)
    }

    fn point_at_angle(&self, t: f64) -> Point3 {
        let binormal = self.binormal();
        self.center + self.ref_dir * (self.radius * t.cos()) + binormal * (self.radius * t.sin())
    }

    /// Returns the start point.
    #[must_use]
    pub fn start_point(&self) -> Point3 {
        self.point_at_angle(self.start_angle)
    }

    /// Returns the end point.
    #[must_use]
    pub fn end_point(&self) -> Point3 {
        self.point_at_angle(self.end_angle)
    }

    /// Returns the point at `fraction` of the sweep.
    #[must_use]
    pub fn point_at_fraction(&self, fraction: f64) -> Point3 {
        self.point_at_angle(self.start_angle + self.sweep() * fraction)
    }

    /// Raw angle of `point` in the arc frame, in `(-π, π]`.
    fn raw_angle(&self, point: &Point3) -> f64 {
        let d = point - self.center;
        d.dot(&self.binormal()).atan2(d.dot(&self.ref_dir))
    }

    /// Angle of `point` unwrapped into `[start_angle, start_angle + TAU)`.
    #[must_use]
    pub fn angle_of(&self, point: &Point3) -> f64 {
        self.start_angle + (self.raw_angle(point) - self.start_angle).rem_euclid(TAU)
    }

    /// Returns `true` if `point` lies on the arc within `tol`.
    #[must_use]
    pub fn contains_point(&self, point: &Point3, tol: f64) -> bool {
        let d = point - self.center;
        if d.dot(&self.normal).abs() > tol {
            return false;
        }
        let planar = d - self.normal * d.dot(&self.normal);
        if (planar.norm() - self.radius).abs() > tol {
            return false;
        }
        if (point - self.start_point()).norm() <= tol || (point - self.end_point()).norm() <= tol {
            return true;
        }
        self.angle_of(point) <= self.end_angle
    }

    /// Reverses the traversal direction while keeping the same point set.
    pub fn reverse(&mut self) {
        self.normal = -self.normal;
        let start = self.start_angle;
        self.start_angle = -self.end_angle;
        self.end_angle = -start;
    }

    /// Applies a similarity transform (rigid motion, uniform scale or mirror).
    ///
    /// # Errors
    ///
    /// Returns an error if the transform collapses the arc plane.
    pub fn transform(&mut self, matrix: &Matrix4) -> Result<()> {
        let binormal = self.binormal();
        let radial = matrix.transform_vector(&(self.ref_dir * self.radius));
        let radius = radial.norm();
        let ref_dir = radial.try_normalize(TOLERANCE).ok_or(GeometryError::ZeroVector)?;
        let binormal = matrix
            .transform_vector(&binormal)
            .try_normalize(TOLERANCE)
            .ok_or(GeometryError::ZeroVector)?;
        *self = Self::new(
            matrix.transform_point(&self.center),
            radius,
            ref_dir.cross(&binormal),
            ref_dir,
            self.start_angle,
            self.end_angle,
        )?;
        Ok(())
    }

    /// Splits the arc at an interior point.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::PointNotOnCurve`] if `point` is not on the arc,
    /// or a degenerate-geometry error if it coincides with an endpoint.
    pub fn split_at(&self, point: &Point3, tol: f64) -> Result<(Arc, Arc)> {
        if !self.contains_point(point, tol) {
            return Err(GeometryError::PointNotOnCurve.into());
        }
        let angle = self.angle_of(point).min(self.end_angle);
        let first = Self::new(
            self.center,
            self.radius,
            self.normal,
            self.ref_dir,
            self.start_angle,
            angle,
        )?;
        let second = Self::new(
            self.center,
            self.radius,
            self.normal,
            self.ref_dir,
            angle,
            self.end_angle,
        )?;
        Ok((first, second))
    }

    /// Expresses another arc on the same circle as a span in this arc's frame.
    fn span_of(&self, other: &Arc) -> ArcSpan {
        let sign = self.normal.dot(&other.normal).signum();
        ArcSpan::new(self.raw_angle(&other.start_point()), sign * other.sweep())
    }

    /// Returns `true` if `other` lies on the same circle.
    #[must_use]
    pub fn is_cocircular(&self, other: &Arc, tol: f64) -> bool {
        (self.center - other.center).norm() <= tol
            && (self.radius - other.radius).abs() <= tol
            && self.normal.cross(&other.normal).norm() <= tol
    }

    /// Discretizes the arc into points from start to end (inclusive).
    ///
    /// With a cocircular `mapping` arc, shared portions reuse the mapping's
    /// sample points.
    #[must_use]
    pub fn discretize(&self, tol: f64, mapping: Option<&Arc>) -> Vec<Point3> {
        let span = ArcSpan::new(self.start_angle, self.sweep());
        let mapping = mapping
            .filter(|m| self.is_cocircular(m, tol))
            .map(|m| self.span_of(m));
        let binormal = self.binormal();
        discrete_arc_2d(&Point2::origin(), self.radius, span, mapping, tol)
            .into_iter()
            .map(|p| self.center + self.ref_dir * p.x + binormal * p.y)
            .collect()
    }
}

impl From<Arc> for Curve {
    fn from(arc: Arc) -> Self {
        Curve::Arc(arc)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOL: f64 = 1e-9;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn xy_arc_counter_clockwise_endpoints() {
        let arc = Arc::in_xy(p(0.0, 0.0, 0.0), 2.0, 0.0, FRAC_PI_2).unwrap();
        assert!((arc.start_point() - p(2.0, 0.0, 0.0)).norm() < TOL);
        assert!((arc.end_point() - p(0.0, 2.0, 0.0)).norm() < TOL);
    }

    #[test]
    fn xy_arc_clockwise_endpoints() {
        let arc = Arc::in_xy(p(0.0, 0.0, 0.0), 1.0, FRAC_PI_2, -FRAC_PI_2).unwrap();
        assert!((arc.start_point() - p(0.0, 1.0, 0.0)).norm() < TOL);
        assert!((arc.end_point() - p(1.0, 0.0, 0.0)).norm() < TOL);
        // Passes through the first quadrant.
        let mid = arc.point_at_fraction(0.5);
        assert!(mid.x > 0.0 && mid.y > 0.0);
    }

    #[test]
    fn reverse_swaps_endpoints() {
        let mut arc = Arc::in_xy(p(1.0, 1.0, 0.0), 1.0, 0.0, PI).unwrap();
        let (s, e) = (arc.start_point(), arc.end_point());
        let mid = arc.point_at_fraction(0.5);
        arc.reverse();
        assert!((arc.start_point() - e).norm() < TOL);
        assert!((arc.end_point() - s).norm() < TOL);
        assert!((arc.point_at_fraction(0.5) - mid).norm() < TOL);
    }

    #[test]
    fn split_keeps_both_halves_on_circle() {
        let arc = Arc::in_xy(p(0.0, 0.0, 0.0), 1.0, 0.0, PI).unwrap();
        let (a, b) = arc.split_at(&p(0.0, 1.0, 0.0), 1e-9).unwrap();
        assert!((a.sweep() - FRAC_PI_2).abs() < TOL);
        assert!((b.sweep() - FRAC_PI_2).abs() < TOL);
        assert!((a.end_point() - b.start_point()).norm() < TOL);
    }

    #[test]
    fn contains_point_rejects_other_half_of_circle() {
        let arc = Arc::in_xy(p(0.0, 0.0, 0.0), 1.0, 0.0, PI).unwrap();
        assert!(arc.contains_point(&p(0.0, 1.0, 0.0), 1e-9));
        assert!(!arc.contains_point(&p(0.0, -1.0, 0.0), 1e-9));
    }

    #[test]
    fn mirror_preserves_point_set() {
        let mut arc = Arc::in_xy(p(2.0, 0.0, 0.0), 1.0, 0.0, FRAC_PI_2).unwrap();
        let mirror = Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0));
        let mid = arc.point_at_fraction(0.5);
        arc.transform(&mirror).unwrap();
        let expected = p(-mid.x, mid.y, mid.z);
        assert!((arc.point_at_fraction(0.5) - expected).norm() < TOL);
        assert!((arc.start_point() - p(-3.0, 0.0, 0.0)).norm() < TOL);
    }

    #[test]
    fn reversed_partner_discretizes_to_same_points() {
        let arc = Arc::in_xy(p(0.0, 0.0, 0.0), 4.0, 0.0, PI).unwrap();
        let mut partner = arc.clone();
        partner.reverse();
        let forward = arc.discretize(1e-3, Some(&partner));
        let mut backward = partner.discretize(1e-3, Some(&arc));
        backward.reverse();
        assert_eq!(forward.len(), backward.len());
        for (a, b) in forward.iter().zip(&backward) {
            assert!((a - b).norm() < 1e-9, "{a:?} vs {b:?}");
        }
    }
}
