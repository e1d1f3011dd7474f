use crate::math::Point3;

use super::Disjoint;

/// Welds points that lie within a tolerance of each other.
///
/// Each call to [`MergePoint::merge`] registers a point and returns the
/// class it was welded into. A class is named by the index of one of its
/// registered points, and a later point may bridge two classes into one.
#[derive(Debug, Clone)]
pub struct MergePoint {
    tol: f64,
    points: Vec<Point3>,
    disjoint: Disjoint,
}

impl MergePoint {
    #[must_use]
    pub fn new(tol: f64) -> Self {
        Self {
            tol,
            points: Vec::new(),
            disjoint: Disjoint::default(),
        }
    }

    /// Registers `point`, returning the representative class index.
    pub fn merge(&mut self, point: Point3) -> usize {
        let id = self.disjoint.add();
        self.points.push(point);
        for other in 0..id {
            if (self.points[other] - point).norm() <= self.tol {
                self.disjoint.merge(other, id);
            }
        }
        self.disjoint.find(id).unwrap_or(id)
    }

    /// Representative class of the `i`-th registered point, `None` if fewer
    /// points were registered.
    pub fn class_of(&mut self, i: usize) -> Option<usize> {
        self.disjoint.find(i)
    }

    /// Position of the class representative.
    #[must_use]
    pub fn point(&self, class: usize) -> Option<Point3> {
        self.points.get(class).copied()
    }

    /// Number of registered points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
