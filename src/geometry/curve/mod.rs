mod arc;
mod line;

pub use arc::Arc;
pub use line::Line;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::{Matrix4, Point3, Vector3};

/// A bounded curve used by footprints, co-edges and split curves.
///
/// This is the full capability set the kernel needs from curve geometry:
/// endpoints, length, reversal, rigid/mirror transforms and a JSON dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Curve {
    /// A straight segment.
    Line(Line),
    /// A circular arc.
    Arc(Arc),
}

impl From<Line> for Curve {
    fn from(line: Line) -> Self {
        Curve::Line(line)
    }
}

impl Curve {
    /// Shorthand for a straight segment.
    #[must_use]
    pub fn line(start: Point3, end: Point3) -> Self {
        Curve::Line(Line::new(start, end))
    }

    /// Returns the start point.
    #[must_use]
    pub fn start_point(&self) -> Point3 {
        match self {
            Curve::Line(line) => *line.start(),
            Curve::Arc(arc) => arc.start_point(),
        }
    }

    /// Returns the end point.
    #[must_use]
    pub fn end_point(&self) -> Point3 {
        match self {
            Curve::Line(line) => *line.end(),
            Curve::Arc(arc) => arc.end_point(),
        }
    }

    /// Returns the curve length.
    #[must_use]
    pub fn length(&self) -> f64 {
        match self {
            Curve::Line(line) => line.length(),
            Curve::Arc(arc) => arc.length(),
        }
    }

    /// Returns the point at `fraction` of the curve's length.
    #[must_use]
    pub fn point_at(&self, fraction: f64) -> Point3 {
        match self {
            Curve::Line(line) => line.point_at_fraction(fraction),
            Curve::Arc(arc) => arc.point_at_fraction(fraction),
        }
    }

    /// Returns the midpoint of the curve.
    #[must_use]
    pub fn midpoint(&self) -> Point3 {
        self.point_at(0.5)
    }

    /// Reverses the curve in place.
    pub fn reverse(&mut self) {
        match self {
            Curve::Line(line) => line.reverse(),
            Curve::Arc(arc) => arc.reverse(),
        }
    }

    /// Returns a reversed copy.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut curve = self.clone();
        curve.reverse();
        curve
    }

    /// Applies a homogeneous transform in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform degenerates an arc.
    pub fn transform(&mut self, matrix: &Matrix4) -> Result<()> {
        match self {
            Curve::Line(line) => {
                line.transform(matrix);
                Ok(())
            }
            Curve::Arc(arc) => arc.transform(matrix),
        }
    }

    /// Translates the curve in place.
    pub fn translate(&mut self, offset: &Vector3) {
        let matrix = Matrix4::new_translation(offset);
        // A translation never degenerates an arc.
        let _ = self.transform(&matrix);
    }

    /// Returns a translated copy.
    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Self {
        let mut curve = self.clone();
        curve.translate(offset);
        curve
    }

    /// Returns `true` if `point` lies on the curve within `tol`.
    #[must_use]
    pub fn contains_point(&self, point: &Point3, tol: f64) -> bool {
        match self {
            Curve::Line(line) => line.contains_point(point, tol),
            Curve::Arc(arc) => arc.contains_point(point, tol),
        }
    }

    /// Splits the curve at an interior point into two curves that keep the
    /// original direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not on the curve or coincides with an
    /// endpoint of an arc.
    pub fn split_at(&self, point: &Point3, tol: f64) -> Result<(Curve, Curve)> {
        match self {
            Curve::Line(line) => {
                let (a, b) = line.split_at(point, tol)?;
                Ok((a.into(), b.into()))
            }
            Curve::Arc(arc) => {
                let (a, b) = arc.split_at(point, tol)?;
                Ok((a.into(), b.into()))
            }
        }
    }

    /// Returns the points approximating the curve, start and end included.
    ///
    /// Arcs use `mapping` (a cocircular arc, usually the partner edge's curve)
    /// so that both sides of a shared boundary sample identical points.
    #[must_use]
    pub fn discretize(&self, tol: f64, mapping: Option<&Curve>) -> Vec<Point3> {
        match self {
            Curve::Line(line) => vec![*line.start(), *line.end()],
            Curve::Arc(arc) => {
                let mapping = match mapping {
                    Some(Curve::Arc(m)) => Some(m),
                    _ => None,
                };
                arc.discretize(tol, mapping)
            }
        }
    }

    /// Serializes the curve to its JSON dump.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve cannot be represented as JSON.
    pub fn dump(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Restores a curve from its JSON dump.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a curve dump.
    pub fn load(value: &serde_json::Value) -> Result<Self> {
        Ok(Curve::deserialize(value)?)
    }
}
