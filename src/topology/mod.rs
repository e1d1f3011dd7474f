pub mod coedge;
pub mod face;
pub mod loops;
pub mod shell;
pub mod vertex;

pub use coedge::{CoEdgeData, CoEdgeId};
pub use face::{FaceData, FaceId, SurfaceId};
pub use loops::{LoopData, LoopId};
pub use shell::{ShellData, ShellId};
pub use vertex::{VertexData, VertexId};

use crate::error::{Result, TopologyError};
use crate::geometry::FaceSurface;
use crate::math::{is_mirroring, Matrix4};
use slotmap::SlotMap;

/// Central arena that owns all topological entities.
///
/// Entities reference each other via typed IDs (generational indices).
/// `next`/`prev`/`partner` links are plain IDs, so loops can be spliced in
/// O(1) and a removed entity simply stops resolving.
#[derive(Debug, Clone, Default)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    coedges: SlotMap<CoEdgeId, CoEdgeData>,
    loops: SlotMap<LoopId, LoopData>,
    faces: SlotMap<FaceId, FaceData>,
    surfaces: SlotMap<SurfaceId, FaceSurface>,
    shells: SlotMap<ShellId, ShellData>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData> {
        Ok(self
            .vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))?)
    }

    /// Returns a reference to the co-edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn coedge(&self, id: CoEdgeId) -> Result<&CoEdgeData> {
        Ok(self
            .coedges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("coedge".into()))?)
    }

    /// Returns a mutable reference to the co-edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn coedge_mut(&mut self, id: CoEdgeId) -> Result<&mut CoEdgeData> {
        Ok(self
            .coedges
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("coedge".into()))?)
    }

    /// Returns a reference to the loop data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn loop_data(&self, id: LoopId) -> Result<&LoopData> {
        Ok(self
            .loops
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("loop".into()))?)
    }

    fn loop_mut(&mut self, id: LoopId) -> Result<&mut LoopData> {
        Ok(self
            .loops
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("loop".into()))?)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData> {
        Ok(self
            .faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))?)
    }

    fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceData> {
        Ok(self
            .faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))?)
    }

    /// Returns a reference to a stored surface, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn surface(&self, id: SurfaceId) -> Result<&FaceSurface> {
        Ok(self
            .surfaces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("surface".into()))?)
    }

    /// Returns a reference to the shell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn shell(&self, id: ShellId) -> Result<&ShellData> {
        Ok(self
            .shells
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("shell".into()))?)
    }

    fn shell_mut(&mut self, id: ShellId) -> Result<&mut ShellData> {
        Ok(self
            .shells
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("shell".into()))?)
    }

    /// Returns `true` if the face is still present.
    #[must_use]
    pub fn contains_face(&self, id: FaceId) -> bool {
        self.faces.contains_key(id)
    }

    /// Number of live faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of live vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Applies a homogeneous transform to every entity in the store.
    ///
    /// A mirroring transform flips the handedness of every loop, so all
    /// loops are reversed to keep outer boundaries counter-clockwise about
    /// the (transformed) face normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform degenerates a curve or surface.
    pub fn transform(&mut self, matrix: &Matrix4) -> Result<()> {
        for vertex in self.vertices.values_mut() {
            vertex.point = matrix.transform_point(&vertex.point);
        }
        for coedge in self.coedges.values_mut() {
            coedge.curve.transform(matrix)?;
        }
        for surface in self.surfaces.values_mut() {
            *surface = surface.transformed(matrix)?;
        }
        if is_mirroring(matrix) {
            let loops: Vec<LoopId> = self.loops.keys().collect();
            for id in loops {
                self.reverse_loop(id)?;
            }
        }
        Ok(())
    }
}
