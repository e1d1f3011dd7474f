use crate::error::{Result, TopologyError};
use crate::geometry::FaceSurface;
use crate::math::{is_nearly_equal, Point3, Vector3};

use super::coedge::CoEdgeId;
use super::loops::LoopId;
use super::shell::ShellId;
use super::TopologyStore;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
    /// Unique identifier for a surface in the topology store.
    pub struct SurfaceId;
}

/// Data associated with a topological face.
///
/// A face is a bounded region on a surface, defined by an outer loop
/// (counter-clockwise seen from the face normal) and optionally inner
/// loops (holes, clockwise).
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The surface on which this face lies. Faces split from one another
    /// share it.
    pub surface: SurfaceId,
    pub outer: LoopId,
    pub inners: Vec<LoopId>,
    pub shell: Option<ShellId>,
    /// If `true`, the face normal agrees with the surface normal.
    pub same_sense: bool,
}

impl TopologyStore {
    /// Stores a surface for faces to reference.
    pub fn add_surface(&mut self, surface: FaceSurface) -> SurfaceId {
        self.surfaces.insert(surface)
    }

    /// Creates a face bounded by existing loops.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface or a loop is missing, or a loop
    /// already bounds another face.
    pub fn create_face(
        &mut self,
        surface: SurfaceId,
        outer: LoopId,
        inners: Vec<LoopId>,
        same_sense: bool,
    ) -> Result<FaceId> {
        self.surface(surface)?;
        for &lp in std::iter::once(&outer).chain(&inners) {
            if self.loop_data(lp)?.face.is_some() {
                return Err(TopologyError::InvalidTopology("loop already bounds a face".into()).into());
            }
        }
        let face = self.faces.insert(FaceData {
            surface,
            outer,
            inners: inners.clone(),
            shell: None,
            same_sense,
        });
        for lp in std::iter::once(outer).chain(inners) {
            self.loop_mut(lp)?.face = Some(face);
        }
        Ok(face)
    }

    /// Returns the surface of a face.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or its surface is missing.
    pub fn face_surface(&self, face: FaceId) -> Result<&FaceSurface> {
        self.surface(self.face(face)?.surface)
    }

    /// Outer loop followed by the inner loops.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is missing.
    pub fn face_loops(&self, face: FaceId) -> Result<Vec<LoopId>> {
        let data = self.face(face)?;
        Ok(std::iter::once(data.outer).chain(data.inners.iter().copied()).collect())
    }

    /// Every co-edge of every loop of the face.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its loops is broken.
    pub fn face_coedges(&self, face: FaceId) -> Result<Vec<CoEdgeId>> {
        let mut out = Vec::new();
        for lp in self.face_loops(face)? {
            out.extend(self.loop_coedges(lp)?);
        }
        Ok(out)
    }

    /// Vertex positions of all loops of the face.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its loops is broken.
    pub fn face_points(&self, face: FaceId) -> Result<Vec<Point3>> {
        let mut out = Vec::new();
        for lp in self.face_loops(face)? {
            out.extend(self.loop_points(lp)?);
        }
        Ok(out)
    }

    /// Returns `true` if any vertex of the face lies at elevation `z`.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is broken.
    pub fn face_touches_elevation(&self, face: FaceId, z: f64, eps: f64) -> Result<bool> {
        Ok(self.face_points(face)?.iter().any(|p| is_nearly_equal(p.z, z, eps)))
    }

    /// Outward normal of the face at one of its vertices, if the surface
    /// kind defines one.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is broken.
    pub fn face_normal(&self, face: FaceId) -> Result<Option<Vector3>> {
        let data = self.face(face)?;
        let Some(root) = self.loop_data(data.outer)?.root else {
            return Ok(None);
        };
        let point = self.coedge_start_point(root)?;
        let sign = if data.same_sense { 1.0 } else { -1.0 };
        Ok(self.surface(data.surface)?.normal_at(&point).map(|n| n * sign))
    }

    /// Removes a face together with its loops. The surface is dropped when
    /// no other face references it.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is missing.
    pub fn remove_face(&mut self, face: FaceId) -> Result<()> {
        let data = self.face(face)?.clone();
        for lp in std::iter::once(data.outer).chain(data.inners.iter().copied()) {
            self.remove_loop(lp)?;
        }
        if let Some(shell) = data.shell {
            if let Ok(shell) = self.shell_mut(shell) {
                shell.faces.retain(|f| *f != face);
            }
        }
        self.faces.remove(face);
        if !self.faces.values().any(|f| f.surface == data.surface) {
            self.surfaces.remove(data.surface);
        }
        Ok(())
    }

    /// Removes the face record and detaches it from its shell, leaving its
    /// loops and surface in place for reuse.
    pub(crate) fn detach_face(&mut self, face: FaceId) -> Result<FaceData> {
        let data = self
            .faces
            .remove(face)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))?;
        if let Some(shell) = data.shell {
            if let Ok(shell) = self.shell_mut(shell) {
                shell.faces.retain(|f| *f != face);
            }
        }
        for lp in std::iter::once(data.outer).chain(data.inners.iter().copied()) {
            if let Ok(lp) = self.loop_mut(lp) {
                lp.face = None;
            }
        }
        Ok(data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Plane;

    fn square_face(store: &mut TopologyStore, z: f64) -> FaceId {
        let lp = store
            .create_loop_from_points(
                &[
                    Point3::new(0.0, 0.0, z),
                    Point3::new(1.0, 0.0, z),
                    Point3::new(1.0, 1.0, z),
                    Point3::new(0.0, 1.0, z),
                ],
                1e-9,
            )
            .unwrap();
        let plane = Plane::from_normal(Point3::new(0.0, 0.0, z), Vector3::z()).unwrap();
        let surface = store.add_surface(FaceSurface::Plane(plane));
        store.create_face(surface, lp, Vec::new(), true).unwrap()
    }

    #[test]
    fn touches_elevation_within_tolerance() {
        let mut store = TopologyStore::new();
        let low = square_face(&mut store, 1e-8);
        let high = square_face(&mut store, 3.0);
        assert!(store.face_touches_elevation(low, 0.0, 1e-6).unwrap());
        assert!(!store.face_touches_elevation(high, 0.0, 1e-6).unwrap());
    }

    #[test]
    fn remove_face_frees_everything() {
        let mut store = TopologyStore::new();
        let face = square_face(&mut store, 0.0);
        store.remove_face(face).unwrap();
        assert_eq!(store.face_count(), 0);
        assert_eq!(store.vertex_count(), 0);
        assert!(store.face(face).is_err());
    }

    #[test]
    fn loop_cannot_bound_two_faces() {
        let mut store = TopologyStore::new();
        let face = square_face(&mut store, 0.0);
        let outer = store.face(face).unwrap().outer;
        let surface = store.face(face).unwrap().surface;
        assert!(store.create_face(surface, outer, Vec::new(), true).is_err());
    }

    #[test]
    fn normal_follows_sense() {
        let mut store = TopologyStore::new();
        let face = square_face(&mut store, 0.0);
        let n = store.face_normal(face).unwrap().unwrap();
        assert!((n - Vector3::z()).norm() < 1e-12);
    }
}
