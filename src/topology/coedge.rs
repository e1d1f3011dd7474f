use crate::error::{Result, TopologyError};
use crate::geometry::Curve;
use crate::math::Point3;
use crate::naming::TopoName;

use super::loops::LoopId;
use super::vertex::VertexId;
use super::TopologyStore;

slotmap::new_key_type! {
    /// Unique identifier for a co-edge in the topology store.
    pub struct CoEdgeId;
}

/// A directed use of a curve inside a loop.
///
/// `curve` is stored in traversal direction, running from `start` to `end`.
/// `reversed` records whether that opposes the natural direction of the
/// shared edge, so of two partners exactly one is reversed.
#[derive(Debug, Clone)]
pub struct CoEdgeData {
    pub curve: Curve,
    pub reversed: bool,
    pub start: VertexId,
    pub end: VertexId,
    pub next: CoEdgeId,
    pub prev: CoEdgeId,
    /// The co-edge on the adjacent face running the other way. A relation,
    /// never ownership.
    pub partner: Option<CoEdgeId>,
    pub owner: LoopId,
    pub topo_name: Option<TopoName>,
}

impl TopologyStore {
    /// Creates a detached co-edge (linked to itself) owned by `owner`.
    pub(crate) fn insert_coedge(
        &mut self,
        owner: LoopId,
        curve: Curve,
        reversed: bool,
        start: VertexId,
        end: VertexId,
    ) -> Result<CoEdgeId> {
        self.retain_vertex(start)?;
        self.retain_vertex(end)?;
        Ok(self.coedges.insert_with_key(|id| CoEdgeData {
            curve,
            reversed,
            start,
            end,
            next: id,
            prev: id,
            partner: None,
            owner,
            topo_name: None,
        }))
    }

    /// Removes a co-edge without touching its neighbours' links.
    pub(crate) fn drop_coedge(&mut self, id: CoEdgeId) {
        if let Some(data) = self.coedges.remove(id) {
            if let Some(partner) = data.partner {
                if let Some(p) = self.coedges.get_mut(partner) {
                    if p.partner == Some(id) {
                        p.partner = None;
                    }
                }
            }
            self.release_vertex(data.start);
            self.release_vertex(data.end);
        }
    }

    /// Start point of the co-edge in traversal direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the co-edge or its vertex is missing.
    pub fn coedge_start_point(&self, id: CoEdgeId) -> Result<Point3> {
        self.vertex_point(self.coedge(id)?.start)
    }

    /// End point of the co-edge in traversal direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the co-edge or its vertex is missing.
    pub fn coedge_end_point(&self, id: CoEdgeId) -> Result<Point3> {
        self.vertex_point(self.coedge(id)?.end)
    }

    /// Pairs two co-edges as partners.
    ///
    /// # Errors
    ///
    /// Returns an error if either co-edge is missing.
    pub fn set_partner(&mut self, a: CoEdgeId, b: CoEdgeId) -> Result<()> {
        self.coedge(b)?;
        self.coedge_mut(a)?.partner = Some(b);
        self.coedge_mut(b)?.partner = Some(a);
        Ok(())
    }

    /// Attaches a topology name to a co-edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the co-edge is missing.
    pub fn set_coedge_name(&mut self, id: CoEdgeId, name: Option<TopoName>) -> Result<()> {
        self.coedge_mut(id)?.topo_name = name;
        Ok(())
    }

    /// Splits a co-edge at `point`, inserting the second half right after it
    /// in the same loop. The partner, if any, is split at the same shared
    /// vertex and partners are re-paired crosswise.
    ///
    /// Returns the new co-edge and the new vertex. Nothing is modified when
    /// the point does not lie on the curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not on the co-edge's curve or the
    /// co-edge is missing.
    pub fn split_coedge(
        &mut self,
        id: CoEdgeId,
        point: &Point3,
        tol: f64,
    ) -> Result<(CoEdgeId, VertexId)> {
        let data = self.coedge(id)?;
        let halves = data.curve.split_at(point, tol)?;
        let partner = data.partner;
        let partner_halves = match partner {
            Some(p) => Some((p, self.coedge(p)?.curve.split_at(point, tol)?)),
            None => None,
        };

        let vertex = self.add_vertex(*point);
        let second = self.split_with(id, vertex, halves)?;
        if let Some((p, p_halves)) = partner_halves {
            let p_second = self.split_with(p, vertex, p_halves)?;
            // id: S->v pairs with p_second: v->S, second: v->E with p: E->v.
            self.set_partner(id, p_second)?;
            self.set_partner(second, p)?;
        }
        Ok((second, vertex))
    }

    fn split_with(
        &mut self,
        id: CoEdgeId,
        vertex: VertexId,
        (first, second): (Curve, Curve),
    ) -> Result<CoEdgeId> {
        let data = self.coedge(id)?.clone();
        let tail = self.insert_coedge(data.owner, second, data.reversed, vertex, data.end)?;
        self.coedge_mut(tail)?.topo_name = data.topo_name;

        self.retain_vertex(vertex)?;
        {
            let head = self.coedge_mut(id)?;
            head.curve = first;
            head.end = vertex;
        }
        self.release_vertex(data.end);
        self.insert_coedge_after(id, tail)?;
        Ok(tail)
    }

    /// Returns the co-edge's partner or a topology error when the edge is a
    /// free boundary.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidTopology`] if the co-edge has no partner.
    pub fn require_partner(&self, id: CoEdgeId) -> Result<CoEdgeId> {
        Ok(self
            .coedge(id)?
            .partner
            .ok_or_else(|| TopologyError::InvalidTopology("co-edge has no partner".into()))?)
    }
}
