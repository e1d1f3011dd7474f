use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::polygon_3d::distance_to_segment;
use crate::math::{Matrix4, Point3, Vector3, TOLERANCE};

/// A bounded line segment.
///
/// The parametric form is `P(t) = start + t * direction` with `t` in
/// `[0, length]` and a unit `direction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    start: Point3,
    end: Point3,
}

impl Line {
    /// Creates a segment between two points. Zero-length segments are
    /// representable; callers decide whether they are acceptable.
    #[must_use]
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Returns the start point of the segment.
    #[must_use]
    pub fn start(&self) -> &Point3 {
        &self.start
    }

    /// Returns the end point of the segment.
    #[must_use]
    pub fn end(&self) -> &Point3 {
        &self.end
    }

    /// Returns the segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Returns the unit direction, or `None` for a zero-length segment.
    #[must_use]
    pub fn direction(&self) -> Option<Vector3> {
        let d = self.end - self.start;
        let len = d.norm();
        (len >= TOLERANCE).then(|| d / len)
    }

    /// Returns the point at `fraction` of the way from start to end.
    #[must_use]
    pub fn point_at_fraction(&self, fraction: f64) -> Point3 {
        self.start + (self.end - self.start) * fraction
    }

    /// Returns `true` if `point` lies on the segment within `tol`.
    #[must_use]
    pub fn contains_point(&self, point: &Point3, tol: f64) -> bool {
        distance_to_segment(point, &self.start, &self.end) <= tol
    }

    /// Swaps start and end.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
    }

    /// Applies a homogeneous transform to both endpoints.
    pub fn transform(&mut self, matrix: &Matrix4) {
        self.start = matrix.transform_point(&self.start);
        self.end = matrix.transform_point(&self.end);
    }

    /// Splits the segment at an interior point.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::PointNotOnCurve`] if `point` is not on the segment.
    pub fn split_at(&self, point: &Point3, tol: f64) -> Result<(Line, Line)> {
        if !self.contains_point(point, tol) {
            return Err(GeometryError::PointNotOnCurve.into());
        }
        Ok((Line::new(self.start, *point), Line::new(*point, self.end)))
    }
}
