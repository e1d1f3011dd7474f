use std::collections::{HashMap, HashSet};

use crate::error::{OperationError, Result, TopologyError};
use crate::math::polygon_3d::{newell_normal, polygon_area_3d, signed_area_3d};
use crate::math::Point3;
use crate::topology::{CoEdgeId, FaceId, LoopId, SurfaceId, TopologyStore, VertexId};

/// Returns the surface shared by all `faces`.
///
/// # Errors
///
/// Returns [`TopologyError::EmptySurfaceList`] for an empty slice and
/// [`TopologyError::InvalidTopology`] if the faces lie on different surfaces.
pub fn merge_surface(store: &TopologyStore, faces: &[FaceId]) -> Result<SurfaceId> {
    let (first, rest) = faces.split_first().ok_or(TopologyError::EmptySurfaceList)?;
    let surface = store.face(*first)?.surface;
    let key = store.surface(surface)?.key();
    for face in rest {
        if store.face_surface(*face)?.key() != key {
            return Err(TopologyError::InvalidTopology("faces lie on different surfaces".into()).into());
        }
    }
    Ok(surface)
}

/// Discretizes a loop into a closed polyline (last point not repeated).
///
/// Arc co-edges are sampled against their partner's arc so that both
/// faces along a curved boundary produce identical points.
///
/// # Errors
///
/// Returns an error if the loop is broken.
pub fn discrete_loop(store: &TopologyStore, lp: LoopId, tol: f64) -> Result<Vec<Point3>> {
    let mut out = Vec::new();
    for coedge in store.loop_coedges(lp)? {
        let data = store.coedge(coedge)?;
        let mapping = match data.partner {
            Some(partner) => Some(&store.coedge(partner)?.curve),
            None => None,
        };
        let mut points = data.curve.discretize(tol, mapping);
        points.pop();
        out.extend(points);
    }
    Ok(out)
}

/// Area of a planar face, holes subtracted.
///
/// # Errors
///
/// Returns [`OperationError::Unsupported`] for non-planar faces.
pub fn face_area(store: &TopologyStore, face: FaceId, tol: f64) -> Result<f64> {
    let normal = match store.face_surface(face)?.as_plane() {
        Some(plane) => *plane.plane_normal(),
        None => return Err(OperationError::Unsupported("area of a non-planar face".into()).into()),
    };
    let sign = if store.face(face)?.same_sense { 1.0 } else { -1.0 };
    let mut area = 0.0;
    for lp in store.face_loops(face)? {
        area += signed_area_3d(&discrete_loop(store, lp, tol)?, &normal) * sign;
    }
    Ok(area)
}

fn loop_size(points: &[Point3]) -> f64 {
    newell_normal(points).map_or(0.0, |n| polygon_area_3d(points, &n))
}

/// Merges adjacent faces on one surface back into a single face.
///
/// Co-edges shared between two of the faces cancel; the rest are chained
/// into loops, the largest of which becomes the outer boundary. Split
/// vertices along the former boundary are kept.
///
/// # Errors
///
/// Returns an error if the faces do not share a surface, or the remaining
/// co-edges cannot be chained into closed loops. The store is unchanged on
/// error.
pub fn merge_faces(store: &mut TopologyStore, faces: &[FaceId], tol: f64) -> Result<FaceId> {
    let surface = merge_surface(store, faces)?;
    if let [only] = faces {
        return Ok(*only);
    }
    let first = store.face(faces[0])?.clone();

    let mut all = Vec::new();
    let mut old_loops = Vec::new();
    for &face in faces {
        old_loops.extend(store.face_loops(face)?);
        all.extend(store.face_coedges(face)?);
    }
    let members: HashSet<CoEdgeId> = all.iter().copied().collect();
    let mut cancelled = HashSet::new();
    for &c in &all {
        if let Some(partner) = store.coedge(c)?.partner {
            if members.contains(&partner) {
                cancelled.insert(c);
                cancelled.insert(partner);
            }
        }
    }
    let kept: Vec<CoEdgeId> = all.iter().copied().filter(|c| !cancelled.contains(c)).collect();

    let mut by_start: HashMap<VertexId, Vec<CoEdgeId>> = HashMap::new();
    for &c in &kept {
        by_start.entry(store.coedge(c)?.start).or_default().push(c);
    }
    let mut used = HashSet::new();
    let mut chains = Vec::new();
    for &seed in &kept {
        if used.contains(&seed) {
            continue;
        }
        let mut chain = vec![seed];
        used.insert(seed);
        let start = store.coedge(seed)?.start;
        let mut end = store.coedge(seed)?.end;
        while end != start {
            let next = by_start
                .get(&end)
                .and_then(|cands| cands.iter().copied().find(|c| !used.contains(c)))
                .ok_or(TopologyError::LoopNotClosed)?;
            used.insert(next);
            chain.push(next);
            end = store.coedge(next)?.end;
        }
        chains.push(chain);
    }
    if chains.is_empty() {
        return Err(TopologyError::InvalidTopology("merged faces leave no boundary".into()).into());
    }

    let mut sizes = Vec::with_capacity(chains.len());
    for chain in &chains {
        let mut points = Vec::new();
        for &c in chain {
            let mut samples = store.coedge(c)?.curve.discretize(tol, None);
            samples.pop();
            points.extend(samples);
        }
        sizes.push(loop_size(&points));
    }
    let outer_index = sizes
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(i, _)| i);

    // Everything fallible is done; rebuild.
    let shell = first.shell;
    for &face in faces {
        store.detach_face(face)?;
    }
    for &c in &cancelled {
        store.drop_coedge(c);
    }
    for lp in old_loops {
        store.discard_loop(lp);
    }
    let mut outer = None;
    let mut inners = Vec::new();
    for (i, chain) in chains.iter().enumerate() {
        let lp = store.create_loop();
        store.relink_loop(lp, chain)?;
        if i == outer_index {
            outer = Some(lp);
        } else {
            inners.push(lp);
        }
    }
    let outer = outer.ok_or(TopologyError::LoopNotClosed)?;
    let merged = store.create_face(surface, outer, inners, first.same_sense)?;
    if let Some(shell) = shell {
        store.add_face_to_shell(shell, merged)?;
    }
    Ok(merged)
}
