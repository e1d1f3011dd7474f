//! Footprint-to-shell extrusion owners.
//!
//! A [`Region`] keeps the 2D co-edge path of a wall or room, the shell built
//! from it by the last extrusion and one [`TopoFace`] per generated face.
//! [`WallRegion`] and [`RoomRegion`] add the naming and editing rules of
//! their hosts.

mod io;
pub mod path;
mod room;
mod split;
mod wall;

use std::collections::BTreeMap;

use crate::config::Tolerances;
use crate::error::{Result, TopologyError};
use crate::math::{transform_point, Matrix4, Point3, Vector3};
use crate::naming::{TopoFace, TopoName, TopoRole};
use crate::operations::{ExtrudeOptions, ExtrudePath, ShellWrapper};
use crate::support::face_util::merge_faces;
use crate::support::HierarchicalIdGenerator;
use crate::topology::{FaceId, TopologyStore};

pub use io::{AnchorDump, LoadContext, RegionDump, SplitCurveDump};
pub use path::{CoEdge2d, CoEdgePath};
pub use room::{RoomRegion, RoomRegionType, RoomSplitCurve, SplitAnchor};
pub use split::SplitOutcome;
pub use wall::{FirstLinkedWall, LinkInfo, TargetWallPolicy, WallRegion};

/// How an extrusion names its bottom and top faces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyNaming {
    /// Owner of the bottom face and of a single top face.
    pub target_id: String,
    pub target_index: u32,
    /// Owner of separately capped tops; joined ids for merged fronts.
    pub cap_id: String,
    /// Copied onto every generated face.
    pub link_wall_ids: Vec<String>,
}

/// A footprint path and the shell extruded from it.
#[derive(Debug, Clone)]
pub struct Region {
    co_edge_path: CoEdgePath,
    store: TopologyStore,
    shell_wrapper: Option<ShellWrapper>,
    topo_faces: Vec<TopoFace>,
    tolerances: Tolerances,
    id_generator: HierarchicalIdGenerator,
    base_elevation: f64,
    top_elevation: f64,
}

impl Region {
    #[must_use]
    pub fn new(co_edge_path: CoEdgePath, tolerances: Tolerances) -> Self {
        Self {
            co_edge_path,
            store: TopologyStore::new(),
            shell_wrapper: None,
            topo_faces: Vec::new(),
            tolerances,
            id_generator: HierarchicalIdGenerator::new(),
            base_elevation: 0.0,
            top_elevation: 0.0,
        }
    }

    #[must_use]
    pub fn co_edge_path(&self) -> &CoEdgePath {
        &self.co_edge_path
    }

    /// Replaces the footprint. Faces keep describing the old shell until the
    /// next extrusion.
    pub fn set_co_edge_path(&mut self, path: CoEdgePath) {
        self.co_edge_path = path;
    }

    #[must_use]
    pub fn store(&self) -> &TopologyStore {
        &self.store
    }

    #[must_use]
    pub fn shell_wrapper(&self) -> Option<&ShellWrapper> {
        self.shell_wrapper.as_ref()
    }

    #[must_use]
    pub fn topo_faces(&self) -> &[TopoFace] {
        &self.topo_faces
    }

    #[must_use]
    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    /// Lower elevation of the last extrusion.
    #[must_use]
    pub fn base_elevation(&self) -> f64 {
        self.base_elevation
    }

    /// Upper elevation of the last extrusion.
    #[must_use]
    pub fn top_elevation(&self) -> f64 {
        self.top_elevation
    }

    /// `true` when no footprint edge is shorter than the length tolerance
    /// and every loop is closed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.co_edge_path
            .is_valid(self.tolerances.length, self.tolerances.coincidence)
    }

    /// Looks up a footprint co-edge by persistent id.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::CoEdgeNotFound`] if no group holds the id;
    /// the path is stale or corrupted.
    pub fn get_co_edge(&self, id: &str) -> Result<&CoEdge2d> {
        self.co_edge_path
            .find(id)
            .ok_or_else(|| TopologyError::CoEdgeNotFound(id.to_owned()).into())
    }

    #[must_use]
    pub fn topo_face(&self, face: FaceId) -> Option<&TopoFace> {
        self.topo_faces.iter().find(|f| f.face == face)
    }

    /// Every face carrying `name`: one for a whole face, several after a
    /// split.
    #[must_use]
    pub fn topo_faces_named(&self, name: &TopoName) -> Vec<&TopoFace> {
        self.topo_faces.iter().filter(|f| &f.topo_name == name).collect()
    }

    /// Extrudes the path between two elevations and renames every face.
    ///
    /// The previous shell and faces are replaced only when the extrusion
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be extruded.
    pub fn extrude_with(&mut self, start: f64, end: f64, options: ExtrudeOptions, naming: &BodyNaming) -> Result<()> {
        let mut store = TopologyStore::new();
        let wrapper = ExtrudePath::new(&self.co_edge_path, start, end)
            .with_options(options)
            .with_tolerances(self.tolerances)
            .execute(&mut store)?;

        let name = |role, sub: Option<u32>| {
            let id = if sub.is_some() { &naming.cap_id } else { &naming.target_id };
            let topo = TopoName::new(id.clone(), role, naming.target_index);
            match sub {
                Some(sub) => topo.with_sub_index(sub),
                None => topo,
            }
        };
        let links = || naming.link_wall_ids.clone();

        let mut faces = vec![TopoFace::new(wrapper.bottom_face, name(TopoRole::Bottom, None)).with_link_wall_ids(links())];
        match (&wrapper.extra_top_faces, wrapper.top_face) {
            (Some(caps), _) => {
                for (k, &cap) in caps.iter().enumerate() {
                    let sub = u32::try_from(k).map_err(|_| TopologyError::InvalidTopology("too many top caps".into()))?;
                    faces.push(TopoFace::new(cap, name(TopoRole::Top, Some(sub))).with_link_wall_ids(links()));
                }
            }
            (None, Some(top)) => faces.push(TopoFace::new(top, name(TopoRole::Top, None)).with_link_wall_ids(links())),
            (None, None) => {}
        }

        let edge_path = if wrapper.extra_top_faces.is_some() {
            self.co_edge_path.outer_only()
        } else {
            self.co_edge_path.clone()
        };
        for (group, side_faces) in edge_path.groups().zip(&wrapper.side_faces) {
            for (coedge, &face) in group.iter().zip(side_faces) {
                faces.push(
                    TopoFace::new(face, coedge.topo_name.clone())
                        .with_co_edge(coedge.clone())
                        .with_link_wall_ids(links()),
                );
            }
        }

        self.store = store;
        self.shell_wrapper = Some(wrapper);
        self.topo_faces = faces;
        self.base_elevation = start;
        self.top_elevation = end;
        self.assign_groups()
    }

    /// Reassigns `group_index` of every face from the surfaces of its name
    /// family.
    fn assign_groups(&mut self) -> Result<()> {
        let mut families: BTreeMap<TopoName, Vec<usize>> = BTreeMap::new();
        for (i, face) in self.topo_faces.iter().enumerate() {
            families.entry(face.topo_name.clone()).or_default().push(i);
        }
        for members in families.values() {
            let keys = members
                .iter()
                .map(|&i| self.store.face_surface(self.topo_faces[i].face).map(|s| s.key()))
                .collect::<Result<Vec<_>>>()?;
            let id = self.id_generator.generate(&keys);
            for &i in members {
                self.topo_faces[i].group_index = Some(id);
            }
        }
        Ok(())
    }

    /// Merges every part carrying `name` back into one face.
    ///
    /// Returns `None` when the name has fewer than two parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the parts do not share a surface or do not form a
    /// connected region.
    pub fn unsplit_face(&mut self, name: &TopoName) -> Result<Option<FaceId>> {
        let parts: Vec<TopoFace> = self.topo_faces.iter().filter(|f| &f.topo_name == name).cloned().collect();
        if parts.len() < 2 {
            return Ok(None);
        }
        let faces: Vec<FaceId> = parts.iter().map(|p| p.face).collect();
        let merged = merge_faces(&mut self.store, &faces, self.tolerances.chord)?;

        let mut link_wall_ids: Vec<String> = Vec::new();
        for id in parts.iter().flat_map(|p| &p.link_wall_ids) {
            if !link_wall_ids.contains(id) {
                link_wall_ids.push(id.clone());
            }
        }
        let template = parts.iter().find(|p| !p.is_aux).unwrap_or(&parts[0]);
        let mut whole = TopoFace::new(merged, template.topo_name.clone()).with_link_wall_ids(link_wall_ids);
        whole.co_edge.clone_from(&template.co_edge);

        self.topo_faces.retain(|f| &f.topo_name != name);
        self.topo_faces.push(whole);
        self.assign_groups()?;
        Ok(Some(merged))
    }

    /// Applies a transform to the path and the shell. A mirror keeps every
    /// loop correctly oriented.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform degenerates a curve or a co-edge of
    /// a face no longer exists in the path.
    pub fn mirror(&mut self, matrix: &Matrix4) -> Result<()> {
        self.co_edge_path.transform(matrix)?;
        self.store.transform(matrix)?;
        let base = transform_point(matrix, &Point3::new(0.0, 0.0, self.base_elevation));
        let top = transform_point(matrix, &Point3::new(0.0, 0.0, self.top_elevation));
        self.base_elevation = base.z.min(top.z);
        self.top_elevation = base.z.max(top.z);
        self.refresh_co_edges()
    }

    /// # Errors
    ///
    /// Returns an error if a co-edge of a face no longer exists in the path.
    pub fn translate(&mut self, offset: &Vector3) -> Result<()> {
        self.co_edge_path.translate(offset);
        self.store.transform(&Matrix4::new_translation(offset))?;
        self.base_elevation += offset.z;
        self.top_elevation += offset.z;
        self.refresh_co_edges()
    }

    /// Re-reads the footprint co-edge of every side face from the path.
    fn refresh_co_edges(&mut self) -> Result<()> {
        for i in 0..self.topo_faces.len() {
            if let Some(id) = self.topo_faces[i].co_edge.as_ref().map(|c| c.id.clone()) {
                let fresh = self.get_co_edge(&id)?.clone();
                self.topo_faces[i].co_edge = Some(fresh);
            }
        }
        Ok(())
    }
}
