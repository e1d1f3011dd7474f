use crate::error::{Result, TopologyError};
use crate::math::Point3;

use super::TopologyStore;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the topology store.
    pub struct VertexId;
}

/// Data associated with a topological vertex.
///
/// Vertices are shared by every co-edge that starts or ends at them and
/// live exactly as long as at least one co-edge references them.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 3D position of the vertex.
    pub point: Point3,
    uses: usize,
}

impl VertexData {
    /// Number of co-edge endpoints referencing this vertex.
    #[must_use]
    pub fn uses(&self) -> usize {
        self.uses
    }
}

impl TopologyStore {
    /// Inserts an unreferenced vertex. It is dropped again unless a co-edge
    /// picks it up before the next release.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        self.vertices.insert(VertexData { point, uses: 0 })
    }

    /// Returns the position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn vertex_point(&self, id: VertexId) -> Result<Point3> {
        Ok(self.vertex(id)?.point)
    }

    pub(crate) fn retain_vertex(&mut self, id: VertexId) -> Result<()> {
        let vertex = self
            .vertices
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))?;
        vertex.uses += 1;
        Ok(())
    }

    /// Drops one reference; the vertex is removed when none remain.
    pub(crate) fn release_vertex(&mut self, id: VertexId) {
        if let Some(vertex) = self.vertices.get_mut(id) {
            vertex.uses = vertex.uses.saturating_sub(1);
            if vertex.uses == 0 {
                self.vertices.remove(id);
            }
        }
    }
}
