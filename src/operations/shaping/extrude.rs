use std::collections::HashMap;

use crate::config::Tolerances;
use crate::error::{OperationError, Result};
use crate::geometry::{Curve, Cylinder, FaceSurface, Plane};
use crate::math::{Point3, Vector3};
use crate::region::path::{CoEdge2d, CoEdgePath};
use crate::support::MergePoint;
use crate::topology::{FaceId, LoopId, ShellId, TopologyStore, VertexId};

/// Options for [`ExtrudePath`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtrudeOptions {
    /// Treat holes as separately capped top regions instead of voids: the
    /// body is the full outer prism and its top is split into one cap with
    /// the hole loops plus one cap per hole.
    pub cap_holes: bool,
}

/// The shell produced by an extrusion, with its faces by role.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellWrapper {
    pub shell: ShellId,
    pub bottom_face: FaceId,
    /// The single top face, when holes are not capped separately.
    pub top_face: Option<FaceId>,
    /// Disjoint top caps: the outer cap first, then one per hole.
    pub extra_top_faces: Option<Vec<FaceId>>,
    /// Side faces per path group, in loop order.
    pub side_faces: Vec<Vec<FaceId>>,
}

impl ShellWrapper {
    /// Top faces in cap order.
    #[must_use]
    pub fn top_faces(&self) -> Vec<FaceId> {
        match (&self.extra_top_faces, self.top_face) {
            (Some(extra), _) => extra.clone(),
            (None, Some(top)) => vec![top],
            (None, None) => Vec::new(),
        }
    }

    /// Every face of the shell: bottom, tops, then sides.
    #[must_use]
    pub fn all_faces(&self) -> Vec<FaceId> {
        let mut faces = vec![self.bottom_face];
        faces.extend(self.top_faces());
        faces.extend(self.side_faces.iter().flatten().copied());
        faces
    }
}

/// Extrudes a footprint path vertically into a closed shell.
///
/// The bottom face points down (-Z), top faces point up and each footprint
/// co-edge yields one side face: planar for lines, cylindrical for arcs.
pub struct ExtrudePath<'a> {
    path: &'a CoEdgePath,
    start: f64,
    end: f64,
    options: ExtrudeOptions,
    tolerances: Tolerances,
}

/// Welds footprint corners per elevation and hands out shared vertices.
struct CornerWelder {
    welder: MergePoint,
    registrations: HashMap<(usize, usize, bool), usize>,
    vertices: HashMap<usize, VertexId>,
}

impl CornerWelder {
    fn new(path: &CoEdgePath, start: f64, end: f64, tol: f64) -> Self {
        let mut welder = MergePoint::new(tol);
        let mut registrations = HashMap::new();
        for (g, group) in path.groups().enumerate() {
            for (i, coedge) in group.iter().enumerate() {
                let p = coedge.curve.start_point();
                for (top, z) in [(false, start), (true, end)] {
                    welder.merge(Point3::new(p.x, p.y, z));
                    registrations.insert((g, i, top), welder.len() - 1);
                }
            }
        }
        Self {
            welder,
            registrations,
            vertices: HashMap::new(),
        }
    }

    /// Vertex at the start of co-edge `i` of group `g`. `i` wraps.
    fn vertex(&mut self, store: &mut TopologyStore, g: usize, i: usize, len: usize, top: bool) -> Result<VertexId> {
        let reg = self
            .registrations
            .get(&(g, i % len, top))
            .copied()
            .ok_or_else(|| OperationError::Failed("corner was not registered".into()))?;
        let class = self
            .welder
            .class_of(reg)
            .ok_or_else(|| OperationError::Failed("corner was not welded".into()))?;
        if let Some(v) = self.vertices.get(&class) {
            return Ok(*v);
        }
        let point = self
            .welder
            .point(class)
            .ok_or_else(|| OperationError::Failed("corner class has no point".into()))?;
        let v = store.add_vertex(point);
        self.vertices.insert(class, v);
        Ok(v)
    }
}

fn lifted(curve: &Curve, z: f64) -> Curve {
    curve.translated(&Vector3::new(0.0, 0.0, z))
}

/// Planar cap bounded by `loops`, the first being the outer boundary.
fn cap(store: &mut TopologyStore, shell: ShellId, plane: Plane, loops: Vec<LoopId>) -> Result<FaceId> {
    let mut loops = loops.into_iter();
    let outer = loops
        .next()
        .ok_or_else(|| OperationError::Failed("cap without boundary".into()))?;
    let surface = store.add_surface(FaceSurface::Plane(plane));
    let face = store.create_face(surface, outer, loops.collect(), true)?;
    store.add_face_to_shell(shell, face)?;
    Ok(face)
}

impl<'a> ExtrudePath<'a> {
    /// Creates a new `ExtrudePath` operation between two elevations.
    #[must_use]
    pub fn new(path: &'a CoEdgePath, start: f64, end: f64) -> Self {
        Self {
            path,
            start,
            end,
            options: ExtrudeOptions::default(),
            tolerances: Tolerances::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ExtrudeOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    fn validate(&self) -> Result<()> {
        let tol = &self.tolerances;
        if self.end - self.start <= tol.length {
            return Err(OperationError::InvalidInput(format!(
                "extrusion height {} is not positive",
                self.end - self.start
            ))
            .into());
        }
        if !self.path.is_valid(tol.length, tol.coincidence) {
            return Err(OperationError::InvalidInput("footprint path is not a valid closed path".into()).into());
        }
        if self.path.signed_area(0, tol.chord) <= 0.0 {
            return Err(OperationError::InvalidInput("outer loop must be counter-clockwise".into()).into());
        }
        for g in 1..self.path.group_count() {
            if self.path.signed_area(g, tol.chord) >= 0.0 {
                return Err(OperationError::InvalidInput(format!("hole {} must be clockwise", g - 1)).into());
            }
        }
        Ok(())
    }

    /// Executes the extrusion, creating the shell in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the height is not positive,
    /// the path is invalid or a loop has the wrong orientation, and
    /// [`OperationError::Failed`] if the resulting shell is not closed.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<ShellWrapper> {
        self.validate()?;
        let mut corners = CornerWelder::new(self.path, self.start, self.end, self.tolerances.coincidence);
        let groups: Vec<&[CoEdge2d]> = self.path.groups().collect();
        let side_groups = if self.options.cap_holes { 1 } else { groups.len() };

        let shell = store.add_shell();

        // Bottom: loops run backwards so the face looks down.
        let mut bottom_loops = Vec::new();
        for (g, group) in groups.iter().enumerate().take(side_groups) {
            bottom_loops.push(self.level_loop(store, &mut corners, g, group, false, true)?);
        }
        let bottom_plane = Plane::from_normal(Point3::new(0.0, 0.0, self.start), -Vector3::z())?;
        let bottom_face = cap(store, shell, bottom_plane, bottom_loops)?;

        // Top.
        let top_plane = Plane::from_normal(Point3::new(0.0, 0.0, self.end), Vector3::z())?;
        let mut top_loops = Vec::new();
        for (g, group) in groups.iter().enumerate() {
            top_loops.push(self.level_loop(store, &mut corners, g, group, true, false)?);
        }
        let (top_face, extra_top_faces) = if self.options.cap_holes && groups.len() > 1 {
            let mut caps = vec![cap(store, shell, top_plane.clone(), top_loops)?];
            for (g, group) in groups.iter().enumerate().skip(1) {
                let lp = self.level_loop(store, &mut corners, g, group, true, true)?;
                caps.push(cap(store, shell, top_plane.clone(), vec![lp])?);
            }
            (None, Some(caps))
        } else {
            if self.options.cap_holes {
                top_loops.truncate(1);
            }
            (Some(cap(store, shell, top_plane, top_loops)?), None)
        };

        // Sides.
        let mut side_faces = Vec::with_capacity(side_groups);
        for (g, group) in groups.iter().enumerate().take(side_groups) {
            let mut faces = Vec::with_capacity(group.len());
            for i in 0..group.len() {
                faces.push(self.side(store, &mut corners, shell, g, group, i)?);
            }
            side_faces.push(faces);
        }

        let unmatched = store.link_partners(shell, self.tolerances.coincidence)?;
        if unmatched > 0 {
            return Err(OperationError::Failed(format!("extruded shell has {unmatched} free edges")).into());
        }

        let wrapper = ShellWrapper {
            shell,
            bottom_face,
            top_face,
            extra_top_faces,
            side_faces,
        };
        tracing::debug!(
            faces = wrapper.all_faces().len(),
            groups = groups.len(),
            cap_holes = self.options.cap_holes,
            "extruded footprint"
        );
        Ok(wrapper)
    }

    /// Loop of group `g` lifted to the bottom or top elevation.
    fn level_loop(
        &self,
        store: &mut TopologyStore,
        corners: &mut CornerWelder,
        g: usize,
        group: &[CoEdge2d],
        top: bool,
        backwards: bool,
    ) -> Result<LoopId> {
        let z = if top { self.end } else { self.start };
        let n = group.len();
        let mut curves = Vec::with_capacity(n);
        let mut vertices = Vec::with_capacity(n);
        if backwards {
            for k in (0..n).rev() {
                curves.push(lifted(&group[k].curve, z).reversed());
                vertices.push(corners.vertex(store, g, k + 1, n, top)?);
            }
        } else {
            for (k, coedge) in group.iter().enumerate() {
                curves.push(lifted(&coedge.curve, z));
                vertices.push(corners.vertex(store, g, k, n, top)?);
            }
        }
        store.create_loop_on_vertices(&curves, &vertices)
    }

    /// Side face of co-edge `i`: bottom edge forward, top edge backward.
    fn side(
        &self,
        store: &mut TopologyStore,
        corners: &mut CornerWelder,
        shell: ShellId,
        g: usize,
        group: &[CoEdge2d],
        i: usize,
    ) -> Result<FaceId> {
        let n = group.len();
        let curve = &group[i].curve;
        let p0 = corners.vertex(store, g, i, n, false)?;
        let q0 = corners.vertex(store, g, i + 1, n, false)?;
        let q1 = corners.vertex(store, g, i + 1, n, true)?;
        let p1 = corners.vertex(store, g, i, n, true)?;
        let (pp0, pq0, pq1, pp1) = (
            store.vertex_point(p0)?,
            store.vertex_point(q0)?,
            store.vertex_point(q1)?,
            store.vertex_point(p1)?,
        );
        let curves = [
            lifted(curve, self.start),
            Curve::line(pq0, pq1),
            lifted(curve, self.end).reversed(),
            Curve::line(pp1, pp0),
        ];
        let lp = store.create_loop_on_vertices(&curves, &[p0, q0, q1, p1])?;
        let ring = store.loop_coedges(lp)?;
        for k in [0, 2] {
            store.set_coedge_name(ring[k], Some(group[i].topo_name.clone()))?;
        }

        let (surface, same_sense) = match curve {
            Curve::Line(line) => {
                let dir = line
                    .direction()
                    .ok_or_else(|| OperationError::InvalidInput("zero-length footprint edge".into()))?;
                (FaceSurface::Plane(Plane::new(pp0, dir, Vector3::z())?), true)
            }
            Curve::Arc(arc) => {
                let c = arc.center();
                let cylinder = Cylinder::new(
                    Point3::new(c.x, c.y, self.start),
                    arc.radius(),
                    Vector3::z(),
                    Vector3::x(),
                )?;
                (FaceSurface::Cylinder(cylinder), arc.normal().z > 0.0)
            }
        };
        let surface = store.add_surface(surface);
        let face = store.create_face(surface, lp, Vec::new(), same_sense)?;
        store.add_face_to_shell(shell, face)?;
        Ok(face)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Arc;
    use crate::naming::{TopoName, TopoRole};
    use crate::region::path::tests::rect_loop;
    use crate::support::face_util::face_area;
    use approx::assert_relative_eq;

    fn box_path() -> CoEdgePath {
        CoEdgePath::new(rect_loop("o", "w", 0.0, 0.0, 4.0, 2.0, true), Vec::new())
    }

    #[test]
    fn box_has_six_faces_and_shared_vertices() {
        let mut store = TopologyStore::new();
        let path = box_path();
        let wrapper = ExtrudePath::new(&path, 0.0, 3.0).execute(&mut store).unwrap();
        assert_eq!(wrapper.all_faces().len(), 6);
        assert_eq!(wrapper.side_faces.len(), 1);
        assert_eq!(wrapper.side_faces[0].len(), 4);
        assert_eq!(store.vertex_count(), 8);
        assert!(wrapper.top_face.is_some());
        assert!(wrapper.extra_top_faces.is_none());
        for face in wrapper.all_faces() {
            for lp in store.face_loops(face).unwrap() {
                store.check_loop(lp, 1e-9).unwrap();
            }
            for c in store.face_coedges(face).unwrap() {
                assert!(store.coedge(c).unwrap().partner.is_some());
            }
        }
    }

    #[test]
    fn side_edges_carry_footprint_names() {
        let mut store = TopologyStore::new();
        let path = box_path();
        let wrapper = ExtrudePath::new(&path, 0.0, 3.0).execute(&mut store).unwrap();
        let ring = store.face_coedges(wrapper.side_faces[0][1]).unwrap();
        let expected = Some(TopoName::new("w", TopoRole::Side, 1));
        assert_eq!(store.coedge(ring[0]).unwrap().topo_name, expected);
        assert_eq!(store.coedge(ring[2]).unwrap().topo_name, expected);
        assert_eq!(store.coedge(ring[1]).unwrap().topo_name, None);
    }

    #[test]
    fn cap_normals_point_outward() {
        let mut store = TopologyStore::new();
        let path = box_path();
        let wrapper = ExtrudePath::new(&path, 0.0, 3.0).execute(&mut store).unwrap();
        let down = store.face_normal(wrapper.bottom_face).unwrap().unwrap();
        let up = store.face_normal(wrapper.top_face.unwrap()).unwrap().unwrap();
        assert!((down + Vector3::z()).norm() < 1e-12);
        assert!((up - Vector3::z()).norm() < 1e-12);
        // First footprint edge runs +X along y = 0, so its wall faces -Y.
        let side = store.face_normal(wrapper.side_faces[0][0]).unwrap().unwrap();
        assert!((side + Vector3::y()).norm() < 1e-12);
        assert_relative_eq!(face_area(&store, wrapper.bottom_face, 1e-3).unwrap(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(face_area(&store, wrapper.side_faces[0][0], 1e-3).unwrap(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn holes_become_inner_loops_and_side_faces() {
        let mut store = TopologyStore::new();
        let path = CoEdgePath::new(
            rect_loop("o", "w", 0.0, 0.0, 4.0, 4.0, true),
            vec![rect_loop("h", "w", 1.0, 1.0, 2.0, 2.0, false)],
        );
        let wrapper = ExtrudePath::new(&path, 0.0, 1.0).execute(&mut store).unwrap();
        assert_eq!(wrapper.side_faces.len(), 2);
        assert_eq!(store.face(wrapper.bottom_face).unwrap().inners.len(), 1);
        assert_relative_eq!(face_area(&store, wrapper.top_face.unwrap(), 1e-3).unwrap(), 15.0, epsilon = 1e-9);
        // Hole edge 0 runs +X along y = 2 with the void below it.
        let hole_wall = store.face_normal(wrapper.side_faces[1][0]).unwrap().unwrap();
        assert!((hole_wall + Vector3::y()).norm() < 1e-12);
    }

    #[test]
    fn capped_holes_give_extra_tops() {
        let mut store = TopologyStore::new();
        let path = CoEdgePath::new(
            rect_loop("o", "w", 0.0, 0.0, 4.0, 4.0, true),
            vec![rect_loop("h", "w", 1.0, 1.0, 2.0, 2.0, false)],
        );
        let wrapper = ExtrudePath::new(&path, -0.2, 0.0)
            .with_options(ExtrudeOptions { cap_holes: true })
            .execute(&mut store)
            .unwrap();
        assert!(wrapper.top_face.is_none());
        let caps = wrapper.extra_top_faces.clone().unwrap();
        assert_eq!(caps.len(), 2);
        assert_eq!(wrapper.side_faces.len(), 1);
        assert!(store.face(wrapper.bottom_face).unwrap().inners.is_empty());
        let total: f64 = caps.iter().map(|f| face_area(&store, *f, 1e-3).unwrap()).sum();
        assert_relative_eq!(total, 16.0, epsilon = 1e-9);
    }

    #[test]
    fn arc_edge_gives_cylinder_side() {
        let mut store = TopologyStore::new();
        let arc: Curve = Arc::in_xy(Point3::origin(), 1.0, 0.0, std::f64::consts::PI).unwrap().into();
        let chord = Curve::line(arc.end_point(), arc.start_point());
        let path = CoEdgePath::new(
            vec![
                CoEdge2d::new("a", arc, TopoName::new("w", TopoRole::Side, 0)),
                CoEdge2d::new("b", chord, TopoName::new("w", TopoRole::Side, 1)),
            ],
            Vec::new(),
        );
        let wrapper = ExtrudePath::new(&path, 0.0, 2.0).execute(&mut store).unwrap();
        let curved = wrapper.side_faces[0][0];
        assert!(store.face_surface(curved).unwrap().is_cylinder());
        assert!(store.face(curved).unwrap().same_sense);
        assert_eq!(store.vertex_count(), 4);
    }

    #[test]
    fn clockwise_outer_is_rejected() {
        let mut store = TopologyStore::new();
        let path = CoEdgePath::new(rect_loop("o", "w", 0.0, 0.0, 4.0, 2.0, false), Vec::new());
        assert!(ExtrudePath::new(&path, 0.0, 3.0).execute(&mut store).is_err());
        assert_eq!(store.face_count(), 0);
    }

    #[test]
    fn flat_extrusion_is_rejected() {
        let mut store = TopologyStore::new();
        let path = box_path();
        assert!(ExtrudePath::new(&path, 1.0, 1.0).execute(&mut store).is_err());
    }
}
