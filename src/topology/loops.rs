use crate::error::{OperationError, Result, TopologyError};
use crate::geometry::Curve;
use crate::math::Point3;

use super::coedge::CoEdgeId;
use super::face::FaceId;
use super::vertex::VertexId;
use super::TopologyStore;

slotmap::new_key_type! {
    /// Unique identifier for a loop in the topology store.
    pub struct LoopId;
}

/// A closed, circular sequence of co-edges.
///
/// The loop owns its co-edges; `root` is the traversal entry point and is
/// `None` only for a cleared loop.
#[derive(Debug, Clone, Default)]
pub struct LoopData {
    pub root: Option<CoEdgeId>,
    pub face: Option<FaceId>,
}

impl TopologyStore {
    /// Creates an empty loop.
    pub fn create_loop(&mut self) -> LoopId {
        self.loops.insert(LoopData::default())
    }

    /// Builds a closed polygon loop through `points`.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than three points are given or two
    /// consecutive points coincide within `tol`.
    pub fn create_loop_from_points(&mut self, points: &[Point3], tol: f64) -> Result<LoopId> {
        if points.len() < 3 {
            return Err(OperationError::InvalidInput("a loop needs at least 3 points".into()).into());
        }
        let n = points.len();
        let mut curves = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (points[i], points[(i + 1) % n]);
            if (b - a).norm() <= tol {
                return Err(OperationError::InvalidInput(format!("points {i} and {} coincide", (i + 1) % n)).into());
            }
            curves.push(Curve::line(a, b));
        }
        self.create_loop_from_curves(&curves, tol)
    }

    /// Builds a loop from curves that already run head-to-tail.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::LoopNotClosed`] if any curve's end does not
    /// meet the next curve's start within `tol`.
    pub fn create_loop_from_curves(&mut self, curves: &[Curve], tol: f64) -> Result<LoopId> {
        if curves.is_empty() {
            return Err(TopologyError::LoopNotClosed.into());
        }
        let n = curves.len();
        for i in 0..n {
            let gap = (curves[(i + 1) % n].start_point() - curves[i].end_point()).norm();
            if gap > tol {
                return Err(TopologyError::LoopNotClosed.into());
            }
        }
        let vertices: Vec<VertexId> = curves.iter().map(|c| self.add_vertex(c.start_point())).collect();
        self.create_loop_on_vertices(curves, &vertices)
    }

    /// Builds a loop whose co-edge `i` runs from `vertices[i]` to
    /// `vertices[i + 1]` (wrapping), reusing existing vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the slices differ in length or a vertex is missing.
    pub fn create_loop_on_vertices(&mut self, curves: &[Curve], vertices: &[VertexId]) -> Result<LoopId> {
        if curves.is_empty() || curves.len() != vertices.len() {
            return Err(OperationError::InvalidInput("one vertex per curve expected".into()).into());
        }
        let lp = self.create_loop();
        let n = curves.len();
        for (i, curve) in curves.iter().enumerate() {
            let coedge = self.insert_coedge(lp, curve.clone(), false, vertices[i], vertices[(i + 1) % n])?;
            self.append_coedge(lp, coedge)?;
        }
        Ok(lp)
    }

    /// Appends a detached co-edge at the end of the loop (before the root).
    ///
    /// # Errors
    ///
    /// Returns an error if the loop or co-edge is missing.
    pub fn append_coedge(&mut self, lp: LoopId, coedge: CoEdgeId) -> Result<()> {
        match self.loop_data(lp)?.root {
            Some(root) => {
                let last = self.coedge(root)?.prev;
                self.insert_coedge_after(last, coedge)
            }
            None => {
                self.loop_mut(lp)?.root = Some(coedge);
                let data = self.coedge_mut(coedge)?;
                data.owner = lp;
                data.next = coedge;
                data.prev = coedge;
                Ok(())
            }
        }
    }

    /// Splices `coedge` into the loop right after `after`. O(1).
    ///
    /// # Errors
    ///
    /// Returns an error if either co-edge is missing.
    pub fn insert_coedge_after(&mut self, after: CoEdgeId, coedge: CoEdgeId) -> Result<()> {
        let (owner, next) = {
            let a = self.coedge(after)?;
            (a.owner, a.next)
        };
        {
            let c = self.coedge_mut(coedge)?;
            c.owner = owner;
            c.prev = after;
            c.next = next;
        }
        self.coedge_mut(next)?.prev = coedge;
        self.coedge_mut(after)?.next = coedge;
        Ok(())
    }

    /// Returns the loop's co-edges in traversal order starting at the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the circular links are broken.
    pub fn loop_coedges(&self, lp: LoopId) -> Result<Vec<CoEdgeId>> {
        let Some(root) = self.loop_data(lp)?.root else {
            return Ok(Vec::new());
        };
        let mut out = vec![root];
        let mut current = self.coedge(root)?.next;
        while current != root {
            if out.len() > self.coedges.len() {
                return Err(TopologyError::InvalidTopology("loop links do not return to root".into()).into());
            }
            out.push(current);
            current = self.coedge(current)?.next;
        }
        Ok(out)
    }

    /// Start points of the loop's co-edges in traversal order.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop is broken.
    pub fn loop_points(&self, lp: LoopId) -> Result<Vec<Point3>> {
        self.loop_coedges(lp)?
            .into_iter()
            .map(|c| self.coedge_start_point(c))
            .collect()
    }

    /// Rebuilds the loop's circular links from an ordered co-edge list and
    /// takes ownership of every co-edge in it.
    pub(crate) fn relink_loop(&mut self, lp: LoopId, coedges: &[CoEdgeId]) -> Result<()> {
        let n = coedges.len();
        for (i, &c) in coedges.iter().enumerate() {
            let data = self.coedge_mut(c)?;
            data.owner = lp;
            data.next = coedges[(i + 1) % n];
            data.prev = coedges[(i + n - 1) % n];
        }
        self.loop_mut(lp)?.root = coedges.first().copied();
        Ok(())
    }

    /// Removes every co-edge of the loop. The loop itself stays, empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop is missing or broken.
    pub fn clear_loop(&mut self, lp: LoopId) -> Result<()> {
        for coedge in self.loop_coedges(lp)? {
            self.drop_coedge(coedge);
        }
        self.loop_mut(lp)?.root = None;
        Ok(())
    }

    pub(crate) fn remove_loop(&mut self, lp: LoopId) -> Result<()> {
        self.clear_loop(lp)?;
        self.loops.remove(lp);
        Ok(())
    }

    /// Drops the loop record only. Its co-edges must already belong to
    /// another loop.
    pub(crate) fn discard_loop(&mut self, lp: LoopId) {
        self.loops.remove(lp);
    }

    /// Reverses the traversal direction of the loop in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop is missing or broken.
    pub fn reverse_loop(&mut self, lp: LoopId) -> Result<()> {
        for coedge in self.loop_coedges(lp)? {
            let data = self.coedge_mut(coedge)?;
            std::mem::swap(&mut data.next, &mut data.prev);
            std::mem::swap(&mut data.start, &mut data.end);
            data.curve.reverse();
            data.reversed = !data.reversed;
        }
        Ok(())
    }

    /// Verifies the loop invariants: `next.prev == self`, ownership, and
    /// head-to-tail traversal within `tol`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidTopology`] or
    /// [`TopologyError::LoopNotClosed`] describing the first violation.
    pub fn check_loop(&self, lp: LoopId, tol: f64) -> Result<()> {
        for coedge in self.loop_coedges(lp)? {
            let data = self.coedge(coedge)?;
            let next = self.coedge(data.next)?;
            if next.prev != coedge {
                return Err(TopologyError::InvalidTopology("next.prev does not point back".into()).into());
            }
            if data.owner != lp {
                return Err(TopologyError::InvalidTopology("co-edge owned by another loop".into()).into());
            }
            if data.end != next.start {
                let gap = (self.vertex_point(next.start)? - self.vertex_point(data.end)?).norm();
                if gap > tol {
                    return Err(TopologyError::LoopNotClosed.into());
                }
            }
        }
        Ok(())
    }
}
