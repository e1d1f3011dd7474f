use std::collections::HashMap;

use crate::error::{OperationError, Result};
use crate::geometry::{Curve, FaceSurface, Plane};
use crate::math::polygon_3d::{distance_to_segment, point_in_polygon_3d};
use crate::math::Point3;
use crate::support::face_util::discrete_loop;
use crate::topology::{CoEdgeId, FaceId, LoopId, ShellId, TopologyStore, VertexId};

/// Faces created in one shell by an edge insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellModification {
    pub add_faces: Option<Vec<FaceId>>,
}

/// Result of [`ShellEditor::add_edges`], keyed by modified shell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddEdgesResult {
    pub modified_shells: HashMap<ShellId, ShellModification>,
}

impl AddEdgesResult {
    /// Faces created in `shell`, or an empty slice.
    #[must_use]
    pub fn added_faces(&self, shell: ShellId) -> &[FaceId] {
        self.modified_shells
            .get(&shell)
            .and_then(|m| m.add_faces.as_deref())
            .unwrap_or(&[])
    }
}

/// Shell-editing primitive: inserts curves into existing shells.
///
/// `surface_hint` restricts the candidate faces to those lying on an
/// equivalent surface. Implementations leave the store untouched when they
/// return an error.
pub trait ShellEditor {
    /// Inserts `curves` into `shells` and reports the faces created.
    ///
    /// # Errors
    ///
    /// Returns an error if a curve cannot be inserted.
    fn add_edges(
        &mut self,
        store: &mut TopologyStore,
        curves: &[Curve],
        shells: &[ShellId],
        surface_hint: Option<&FaceSurface>,
    ) -> Result<AddEdgesResult>;
}

/// Built-in edge insertion for straight cuts across planar faces.
///
/// Each line must start and end on the outer boundary of one planar face
/// and run through its interior; the face is replaced by the two faces on
/// either side. Neighbouring faces gain the new boundary vertices, so the
/// shell stays closed.
#[derive(Debug, Clone)]
pub struct AddEdges {
    tol: f64,
}

/// Where a cut endpoint meets a face boundary.
enum Anchor {
    Vertex(VertexId),
    OnCoEdge(CoEdgeId),
}

/// Interior samples along the chord that must fall inside the face.
const CHORD_SAMPLES: u32 = 8;

impl AddEdges {
    #[must_use]
    pub fn new(tol: f64) -> Self {
        Self { tol }
    }

    fn locate(&self, store: &TopologyStore, lp: LoopId, point: &Point3) -> Result<Option<Anchor>> {
        let coedges = store.loop_coedges(lp)?;
        for &c in &coedges {
            let start = store.coedge(c)?.start;
            if (store.vertex_point(start)? - point).norm() <= self.tol {
                return Ok(Some(Anchor::Vertex(start)));
            }
        }
        for &c in &coedges {
            if store.coedge(c)?.curve.contains_point(point, self.tol) {
                return Ok(Some(Anchor::OnCoEdge(c)));
            }
        }
        Ok(None)
    }

    fn inside(&self, store: &TopologyStore, face: FaceId, plane: &Plane, point: &Point3) -> Result<bool> {
        let data = store.face(face)?;
        if !point_in_polygon_3d(point, &discrete_loop(store, data.outer, self.tol)?, plane) {
            return Ok(false);
        }
        for &hole in &data.inners {
            if point_in_polygon_3d(point, &discrete_loop(store, hole, self.tol)?, plane) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Returns `true` if the chord can split `face`.
    fn accepts(
        &self,
        store: &TopologyStore,
        face: FaceId,
        hint: Option<&FaceSurface>,
        a: &Point3,
        b: &Point3,
    ) -> Result<bool> {
        let surface = store.face_surface(face)?;
        if hint.is_some_and(|h| h.key() != surface.key()) {
            return Ok(false);
        }
        let Some(plane) = surface.as_plane() else {
            return Ok(false);
        };
        if !plane.contains_point(a, self.tol) || !plane.contains_point(b, self.tol) {
            return Ok(false);
        }
        let outer = store.face(face)?.outer;
        let (Some(anchor_a), Some(anchor_b)) = (self.locate(store, outer, a)?, self.locate(store, outer, b)?) else {
            return Ok(false);
        };
        if let (Anchor::OnCoEdge(ca), Anchor::OnCoEdge(cb)) = (&anchor_a, &anchor_b) {
            if ca == cb {
                return Ok(false);
            }
        }
        for k in 1..CHORD_SAMPLES {
            let t = f64::from(k) / f64::from(CHORD_SAMPLES);
            let sample = a + (b - a) * t;
            if !self.inside(store, face, plane, &sample)? {
                return Ok(false);
            }
        }
        // A chord running along an edge also passes the sampling above.
        for c in store.loop_coedges(outer)? {
            let (s, e) = (store.coedge_start_point(c)?, store.coedge_end_point(c)?);
            let mid = a + (b - a) * 0.5;
            if matches!(store.coedge(c)?.curve, Curve::Line(_)) && distance_to_segment(&mid, &s, &e) <= self.tol {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Makes `point` a vertex of the loop and returns it.
    fn anchor_vertex(&self, store: &mut TopologyStore, lp: LoopId, point: &Point3) -> Result<VertexId> {
        match self.locate(store, lp, point)? {
            Some(Anchor::Vertex(v)) => Ok(v),
            Some(Anchor::OnCoEdge(c)) => Ok(store.split_coedge(c, point, self.tol)?.1),
            None => Err(OperationError::Failed("cut endpoint left the face boundary".into()).into()),
        }
    }

    /// Splits `face` along the chord `a -> b`, returning the two new faces.
    fn split_face(&self, store: &mut TopologyStore, face: FaceId, a: &Point3, b: &Point3) -> Result<[FaceId; 2]> {
        let outer = store.face(face)?.outer;
        let va = self.anchor_vertex(store, outer, a)?;
        let vb = self.anchor_vertex(store, outer, b)?;

        let ring = store.loop_coedges(outer)?;
        let starts = ring
            .iter()
            .map(|c| store.coedge(*c).map(|d| d.start))
            .collect::<Result<Vec<_>>>()?;
        let ia = starts
            .iter()
            .position(|v| *v == va)
            .ok_or_else(|| OperationError::Failed("cut start is not on the loop".into()))?;
        let ib = starts
            .iter()
            .position(|v| *v == vb)
            .ok_or_else(|| OperationError::Failed("cut end is not on the loop".into()))?;
        let n = ring.len();
        let walk = |from: usize, to: usize| -> Vec<CoEdgeId> {
            let mut out = Vec::new();
            let mut i = from;
            while i != to {
                out.push(ring[i]);
                i = (i + 1) % n;
            }
            out
        };
        let mut first = walk(ia, ib);
        let mut second = walk(ib, ia);

        let (pa, pb) = (store.vertex_point(va)?, store.vertex_point(vb)?);
        let back = store.insert_coedge(outer, Curve::line(pb, pa), true, vb, va)?;
        let new_loop = store.create_loop();
        let forth = store.insert_coedge(new_loop, Curve::line(pa, pb), false, va, vb)?;
        store.set_partner(back, forth)?;
        first.push(back);
        second.push(forth);

        let data = store.detach_face(face)?;
        store.relink_loop(outer, &first)?;
        store.relink_loop(new_loop, &second)?;

        let plane = store
            .surface(data.surface)?
            .as_plane()
            .cloned()
            .ok_or_else(|| OperationError::Unsupported("splitting a non-planar face".into()))?;
        let first_polygon = discrete_loop(store, outer, self.tol)?;
        let (mut first_inners, mut second_inners) = (Vec::new(), Vec::new());
        for hole in data.inners {
            let probe = store.loop_points(hole)?.first().copied();
            if probe.is_some_and(|p| point_in_polygon_3d(&p, &first_polygon, &plane)) {
                first_inners.push(hole);
            } else {
                second_inners.push(hole);
            }
        }

        let f1 = store.create_face(data.surface, outer, first_inners, data.same_sense)?;
        let f2 = store.create_face(data.surface, new_loop, second_inners, data.same_sense)?;
        if let Some(shell) = data.shell {
            store.add_face_to_shell(shell, f1)?;
            store.add_face_to_shell(shell, f2)?;
        }
        Ok([f1, f2])
    }

    fn apply(
        &self,
        store: &mut TopologyStore,
        curves: &[Curve],
        shells: &[ShellId],
        hint: Option<&FaceSurface>,
    ) -> Result<AddEdgesResult> {
        let mut result = AddEdgesResult::default();
        for curve in curves {
            let Curve::Line(line) = curve else {
                return Err(OperationError::Unsupported("only straight edges can be inserted".into()).into());
            };
            let (a, b) = (*line.start(), *line.end());
            if (b - a).norm() <= self.tol {
                return Err(OperationError::InvalidInput("edge is shorter than tolerance".into()).into());
            }
            let mut target = None;
            'search: for &shell in shells {
                for face in store.shell_faces(shell)? {
                    if self.accepts(store, face, hint, &a, &b)? {
                        target = Some((shell, face));
                        break 'search;
                    }
                }
            }
            let (shell, face) = target.ok_or_else(|| OperationError::Failed("edge does not cut any face".into()))?;
            let parts = self.split_face(store, face, &a, &b)?;

            let added = result
                .modified_shells
                .entry(shell)
                .or_default()
                .add_faces
                .get_or_insert_with(Vec::new);
            added.retain(|f| *f != face);
            added.extend(parts);
        }
        Ok(result)
    }
}

impl ShellEditor for AddEdges {
    fn add_edges(
        &mut self,
        store: &mut TopologyStore,
        curves: &[Curve],
        shells: &[ShellId],
        surface_hint: Option<&FaceSurface>,
    ) -> Result<AddEdgesResult> {
        let snapshot = store.clone();
        let result = self.apply(store, curves, shells, surface_hint);
        if result.is_err() {
            *store = snapshot;
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::shaping::ExtrudePath;
    use crate::region::path::tests::rect_loop;
    use crate::region::path::CoEdgePath;
    use crate::support::face_util::face_area;
    use approx::assert_relative_eq;

    fn wall_box(store: &mut TopologyStore) -> crate::operations::shaping::ShellWrapper {
        let path = CoEdgePath::new(rect_loop("o", "w", 0.0, 0.0, 4.0, 0.2, true), Vec::new());
        ExtrudePath::new(&path, 0.0, 3.0).execute(store).unwrap()
    }

    #[test]
    fn horizontal_cut_splits_wall_face() {
        let mut store = TopologyStore::new();
        let wrapper = wall_box(&mut store);
        let front = wrapper.side_faces[0][0];
        let hint = store.face_surface(front).unwrap().clone();
        let cut = Curve::line(Point3::new(0.0, 0.0, 1.0), Point3::new(4.0, 0.0, 1.0));

        let result = AddEdges::new(1e-6)
            .add_edges(&mut store, &[cut], &[wrapper.shell], hint.as_hint())
            .unwrap();
        let added = result.added_faces(wrapper.shell);
        assert_eq!(added.len(), 2);
        assert!(!store.contains_face(front));
        let areas: f64 = added.iter().map(|f| face_area(&store, *f, 1e-3).unwrap()).sum();
        assert_relative_eq!(areas, 12.0, epsilon = 1e-9);
        for &f in added {
            store.check_loop(store.face(f).unwrap().outer, 1e-9).unwrap();
        }
        // Neighbouring end walls picked up the cut vertices; the shell stays closed.
        for face in store.shell_faces(wrapper.shell).unwrap() {
            for c in store.face_coedges(face).unwrap() {
                assert!(store.coedge(c).unwrap().partner.is_some());
            }
        }
        assert_eq!(store.shell_faces(wrapper.shell).unwrap().len(), 7);
    }

    #[test]
    fn cut_outside_face_fails_and_keeps_store() {
        let mut store = TopologyStore::new();
        let wrapper = wall_box(&mut store);
        let faces = store.face_count();
        let vertices = store.vertex_count();
        let cut = Curve::line(Point3::new(10.0, 5.0, 1.0), Point3::new(12.0, 5.0, 1.0));
        assert!(AddEdges::new(1e-6).add_edges(&mut store, &[cut], &[wrapper.shell], None).is_err());
        assert_eq!(store.face_count(), faces);
        assert_eq!(store.vertex_count(), vertices);
    }

    #[test]
    fn hint_excludes_other_surfaces() {
        let mut store = TopologyStore::new();
        let wrapper = wall_box(&mut store);
        let back_hint = store.face_surface(wrapper.side_faces[0][2]).unwrap().clone();
        let cut = Curve::line(Point3::new(0.0, 0.0, 1.0), Point3::new(4.0, 0.0, 1.0));
        assert!(AddEdges::new(1e-6)
            .add_edges(&mut store, &[cut], &[wrapper.shell], back_hint.as_hint())
            .is_err());
    }

    #[test]
    fn second_cut_replaces_first_part_in_result() {
        let mut store = TopologyStore::new();
        let wrapper = wall_box(&mut store);
        let cuts = [
            Curve::line(Point3::new(0.0, 0.0, 1.0), Point3::new(4.0, 0.0, 1.0)),
            Curve::line(Point3::new(2.0, 0.0, 0.0), Point3::new(2.0, 0.0, 1.0)),
        ];
        let hint = store.face_surface(wrapper.side_faces[0][0]).unwrap().clone();
        let result = AddEdges::new(1e-6)
            .add_edges(&mut store, &cuts, &[wrapper.shell], hint.as_hint())
            .unwrap();
        let added = result.added_faces(wrapper.shell);
        assert_eq!(added.len(), 3);
        assert!(added.iter().all(|f| store.contains_face(*f)));
    }

    #[test]
    fn arcs_are_unsupported() {
        let mut store = TopologyStore::new();
        let wrapper = wall_box(&mut store);
        let arc: Curve = crate::geometry::Arc::in_xy(Point3::new(2.0, 0.1, 3.0), 0.05, 0.0, 1.0)
            .unwrap()
            .into();
        assert!(AddEdges::new(1e-6).add_edges(&mut store, &[arc], &[wrapper.shell], None).is_err());
    }
}
