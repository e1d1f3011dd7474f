use serde::{Deserialize, Serialize};

use crate::config::Tolerances;
use crate::error::{OperationError, Result};
use crate::geometry::Curve;
use crate::operations::{ExtrudeOptions, ShellEditor};
use crate::topology::FaceId;

use super::{BodyNaming, CoEdgePath, Region, SplitOutcome};

/// Separator of merged wall ids in a top-cap name.
pub const JOINED_ID_SEPARATOR: &str = "|";

/// A wall contributing to a region, with its naming index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInfo {
    pub wall_id: String,
    pub index: u32,
}

impl LinkInfo {
    #[must_use]
    pub fn new(wall_id: impl Into<String>, index: u32) -> Self {
        Self {
            wall_id: wall_id.into(),
            index,
        }
    }
}

/// Chooses the wall whose id anchors the names of a merged region.
pub trait TargetWallPolicy {
    fn target<'a>(&self, links: &'a [LinkInfo]) -> Option<&'a LinkInfo>;
}

/// Picks the first linked wall.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstLinkedWall;

impl TargetWallPolicy for FirstLinkedWall {
    fn target<'a>(&self, links: &'a [LinkInfo]) -> Option<&'a LinkInfo> {
        links.first()
    }
}

/// Region of one wall or of several walls merged into one body.
#[derive(Debug, Clone)]
pub struct WallRegion {
    region: Region,
    link_info: Vec<LinkInfo>,
}

impl WallRegion {
    #[must_use]
    pub fn new(path: CoEdgePath, link_info: Vec<LinkInfo>, tolerances: Tolerances) -> Self {
        Self {
            region: Region::new(path, tolerances),
            link_info,
        }
    }

    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn region_mut(&mut self) -> &mut Region {
        &mut self.region
    }

    #[must_use]
    pub fn link_info(&self) -> &[LinkInfo] {
        &self.link_info
    }

    pub fn set_link_info(&mut self, link_info: Vec<LinkInfo>) {
        self.link_info = link_info;
    }

    /// Distinct contributing wall ids in link order.
    #[must_use]
    pub fn link_wall_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.link_info.len());
        for link in &self.link_info {
            if !ids.contains(&link.wall_id) {
                ids.push(link.wall_id.clone());
            }
        }
        ids
    }

    /// Extrudes the wall body from `start` to `end`.
    ///
    /// Bottom and single top faces are named after the target wall chosen by
    /// `policy`. Separately capped tops take the joined ids of every linked
    /// wall when more than one wall feeds the region.
    ///
    /// # Errors
    ///
    /// Returns an error if no target wall can be chosen or the path cannot be
    /// extruded.
    pub fn extrude_body(
        &mut self,
        start: f64,
        end: f64,
        options: ExtrudeOptions,
        policy: &dyn TargetWallPolicy,
    ) -> Result<()> {
        let target = policy
            .target(&self.link_info)
            .ok_or_else(|| OperationError::InvalidInput("wall region has no linked wall".into()))?;
        let link_wall_ids = self.link_wall_ids();
        let cap_id = if link_wall_ids.len() > 1 {
            link_wall_ids.join(JOINED_ID_SEPARATOR)
        } else {
            target.wall_id.clone()
        };
        let naming = BodyNaming {
            target_id: target.wall_id.clone(),
            target_index: target.index,
            cap_id,
            link_wall_ids,
        };
        self.region.extrude_with(start, end, options, &naming)
    }

    /// See [`Region::split_face_by_curve`].
    ///
    /// # Errors
    ///
    /// Returns an error if `face` is not a face of this wall.
    pub fn split_face_by_curve(
        &mut self,
        face: FaceId,
        curve: &Curve,
        exclude_ids: &[String],
        editor: &mut dyn ShellEditor,
    ) -> Result<SplitOutcome> {
        self.region.split_face_by_curve(face, curve, exclude_ids, editor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::naming::{TopoName, TopoRole};
    use crate::region::path::tests::rect_loop;

    struct LastLinkedWall;

    impl TargetWallPolicy for LastLinkedWall {
        fn target<'a>(&self, links: &'a [LinkInfo]) -> Option<&'a LinkInfo> {
            links.last()
        }
    }

    fn merged() -> WallRegion {
        let path = CoEdgePath::new(
            rect_loop("o", "wa", 0.0, 0.0, 6.0, 0.2, true),
            vec![rect_loop("h", "wa", 1.0, 0.05, 1.5, 0.15, false)],
        );
        WallRegion::new(
            path,
            vec![LinkInfo::new("wa", 3), LinkInfo::new("wb", 7), LinkInfo::new("wa", 4)],
            Tolerances::default(),
        )
    }

    #[test]
    fn target_wall_names_bottom_and_top() {
        let mut wall = merged();
        wall.extrude_body(0.0, 2.8, ExtrudeOptions::default(), &FirstLinkedWall).unwrap();
        let faces = wall.region().topo_faces();
        assert_eq!(faces[0].topo_name, TopoName::new("wa", TopoRole::Bottom, 3));
        assert_eq!(faces[1].topo_name, TopoName::new("wa", TopoRole::Top, 3));
        assert_eq!(faces[0].link_wall_ids, vec!["wa".to_owned(), "wb".to_owned()]);
        // Outer and hole sides.
        assert_eq!(faces.len(), 2 + 4 + 4);
    }

    #[test]
    fn policy_changes_anchor() {
        let mut wall = merged();
        wall.extrude_body(0.0, 2.8, ExtrudeOptions::default(), &LastLinkedWall).unwrap();
        assert_eq!(wall.region().topo_faces()[0].topo_name, TopoName::new("wa", TopoRole::Bottom, 4));
    }

    #[test]
    fn merged_front_caps_use_joined_ids() {
        let mut wall = merged();
        wall.extrude_body(0.0, 2.8, ExtrudeOptions { cap_holes: true }, &FirstLinkedWall)
            .unwrap();
        let caps: Vec<_> = wall
            .region()
            .topo_faces()
            .iter()
            .filter(|f| f.topo_name.role == TopoRole::Top)
            .map(|f| f.topo_name.clone())
            .collect();
        assert_eq!(caps.len(), 2);
        assert_eq!(caps[1], TopoName::new("wa|wb", TopoRole::Top, 3).with_sub_index(1));
    }

    #[test]
    fn missing_links_are_rejected() {
        let path = CoEdgePath::new(rect_loop("o", "w", 0.0, 0.0, 1.0, 1.0, true), Vec::new());
        let mut wall = WallRegion::new(path, Vec::new(), Tolerances::default());
        assert!(wall
            .extrude_body(0.0, 1.0, ExtrudeOptions::default(), &FirstLinkedWall)
            .is_err());
    }
}
