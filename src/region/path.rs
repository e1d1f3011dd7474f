use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Curve;
use crate::math::polygon_3d::signed_area_3d;
use crate::math::{is_mirroring, Matrix4, Point3, Vector3};
use crate::naming::TopoName;

/// A footprint co-edge: a named, directed curve in the XY plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoEdge2d {
    /// Persistent id, unique within a region's path.
    pub id: String,
    /// Geometry in traversal direction, at z = 0.
    pub curve: Curve,
    /// Whether traversal opposes the direction of the authored edge.
    pub is_rev: bool,
    pub topo_name: TopoName,
}

impl CoEdge2d {
    #[must_use]
    pub fn new(id: impl Into<String>, curve: Curve, topo_name: TopoName) -> Self {
        Self {
            id: id.into(),
            curve,
            is_rev: false,
            topo_name,
        }
    }

    fn reverse(&mut self) {
        self.curve.reverse();
        self.is_rev = !self.is_rev;
    }
}

/// Closed footprint of a region: one outer loop (counter-clockwise seen
/// from +Z) and any number of holes (clockwise).
///
/// Group 0 is the outer loop; group `i > 0` is hole `i - 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoEdgePath {
    pub outer: Vec<CoEdge2d>,
    pub holes: Vec<Vec<CoEdge2d>>,
}

impl CoEdgePath {
    #[must_use]
    pub fn new(outer: Vec<CoEdge2d>, holes: Vec<Vec<CoEdge2d>>) -> Self {
        Self { outer, holes }
    }

    /// Outer loop followed by the holes.
    pub fn groups(&self) -> impl Iterator<Item = &[CoEdge2d]> {
        std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    #[must_use]
    pub fn group(&self, index: usize) -> Option<&[CoEdge2d]> {
        match index {
            0 => Some(self.outer.as_slice()),
            i => self.holes.get(i - 1).map(Vec::as_slice),
        }
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        1 + self.holes.len()
    }

    /// Position `(group, index)` of the co-edge with `id`.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<(usize, usize)> {
        self.groups()
            .enumerate()
            .find_map(|(g, group)| group.iter().position(|c| c.id == id).map(|i| (g, i)))
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&CoEdge2d> {
        self.groups().flatten().find(|c| c.id == id)
    }

    /// Path with the holes dropped.
    #[must_use]
    pub fn outer_only(&self) -> Self {
        Self::new(self.outer.clone(), Vec::new())
    }

    /// Every loop is non-empty, every edge is longer than `min_length`, and
    /// consecutive edges meet within `tol`.
    #[must_use]
    pub fn is_valid(&self, min_length: f64, tol: f64) -> bool {
        self.groups().all(|group| {
            !group.is_empty()
                && group.iter().all(|c| c.curve.length() > min_length)
                && group.iter().zip(group.iter().cycle().skip(1)).all(|(a, b)| {
                    (b.curve.start_point() - a.curve.end_point()).norm() <= tol
                })
        })
    }

    /// Signed area of a group seen from +Z (positive when counter-clockwise).
    #[must_use]
    pub fn signed_area(&self, group: usize, chord: f64) -> f64 {
        let Some(group) = self.group(group) else {
            return 0.0;
        };
        let mut points: Vec<Point3> = Vec::new();
        for coedge in group {
            let mut samples = coedge.curve.discretize(chord, None);
            samples.pop();
            points.extend(samples);
        }
        signed_area_3d(&points, &Vector3::z())
    }

    /// Applies a transform to every curve. A mirror also reverses every
    /// loop so outer loops stay counter-clockwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform degenerates a curve.
    pub fn transform(&mut self, matrix: &Matrix4) -> Result<()> {
        let mirror = is_mirroring(matrix);
        for group in std::iter::once(&mut self.outer).chain(self.holes.iter_mut()) {
            for coedge in group.iter_mut() {
                coedge.curve.transform(matrix)?;
            }
            if mirror {
                group.reverse();
                group.iter_mut().for_each(CoEdge2d::reverse);
            }
        }
        Ok(())
    }

    pub fn translate(&mut self, offset: &Vector3) {
        for coedge in self.outer.iter_mut().chain(self.holes.iter_mut().flatten()) {
            coedge.curve.translate(offset);
        }
    }
}
