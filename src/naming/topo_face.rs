use crate::region::CoEdge2d;
use crate::topology::FaceId;

use super::TopoName;

/// A generated 3D face together with its persistent name and linkage.
#[derive(Debug, Clone, PartialEq)]
pub struct TopoFace {
    pub face: FaceId,
    pub topo_name: TopoName,
    /// Footprint owners (walls) that produced this face.
    pub link_wall_ids: Vec<String>,
    /// Set on the non-visible part of a split.
    pub is_aux: bool,
    /// Footprint co-edge that generated a side face.
    pub co_edge: Option<CoEdge2d>,
    /// Grouping id assigned from the surfaces of the face's name family.
    pub group_index: Option<u32>,
}

impl TopoFace {
    #[must_use]
    pub fn new(face: FaceId, topo_name: TopoName) -> Self {
        Self {
            face,
            topo_name,
            link_wall_ids: Vec::new(),
            is_aux: false,
            co_edge: None,
            group_index: None,
        }
    }

    #[must_use]
    pub fn with_link_wall_ids(mut self, ids: Vec<String>) -> Self {
        self.link_wall_ids = ids;
        self
    }

    #[must_use]
    pub fn with_co_edge(mut self, co_edge: CoEdge2d) -> Self {
        self.co_edge = Some(co_edge);
        self
    }

    /// Builds a split part that inherits this face's name and co-edge.
    pub(crate) fn derive_part(&self, face: FaceId, is_aux: bool, exclude_ids: &[String]) -> Self {
        let link_wall_ids = if is_aux {
            self.link_wall_ids.clone()
        } else {
            self.link_wall_ids
                .iter()
                .filter(|id| !exclude_ids.contains(id))
                .cloned()
                .collect()
        };
        Self {
            face,
            topo_name: self.topo_name.clone(),
            link_wall_ids,
            is_aux,
            co_edge: self.co_edge.clone(),
            group_index: None,
        }
    }
}
