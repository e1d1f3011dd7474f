use serde::{Deserialize, Serialize};

use crate::config::Tolerances;
use crate::error::{OperationError, Result, TopoformError};
use crate::geometry::Curve;
use crate::math::polygon_3d::point_in_polygon_3d;
use crate::math::{Point3, Vector3};
use crate::naming::{TopoName, TopoRole};
use crate::operations::{ExtrudeOptions, ShellEditor};
use crate::support::face_util::discrete_loop;
use crate::topology::FaceId;

use super::{BodyNaming, CoEdgePath, Region, SplitOutcome};

/// Kind of a room region, persisted as a small integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RoomRegionType {
    #[default]
    Deprecated,
    Space,
    Slab,
}

impl RoomRegionType {
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        *self == RoomRegionType::Deprecated
    }
}

impl From<RoomRegionType> for u8 {
    fn from(kind: RoomRegionType) -> Self {
        match kind {
            RoomRegionType::Deprecated => 0,
            RoomRegionType::Space => 1,
            RoomRegionType::Slab => 2,
        }
    }
}

impl TryFrom<u8> for RoomRegionType {
    type Error = TopoformError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(RoomRegionType::Deprecated),
            1 => Ok(RoomRegionType::Space),
            2 => Ok(RoomRegionType::Slab),
            other => Err(OperationError::InvalidInput(format!("unknown room region type {other}")).into()),
        }
    }
}

/// Where a split curve meets the footprint: the named co-edge and the
/// fraction of its length from its start.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitAnchor {
    pub topo_name: TopoName,
    pub percent: f64,
}

impl SplitAnchor {
    #[must_use]
    pub fn new(topo_name: TopoName, percent: f64) -> Self {
        Self { topo_name, percent }
    }
}

/// A curve dividing a room footprint into sub-spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSplitCurve {
    pub curve: Curve,
    pub start_data: Option<SplitAnchor>,
    pub end_data: Option<SplitAnchor>,
    pub kind: RoomRegionType,
}

impl RoomSplitCurve {
    #[must_use]
    pub fn new(curve: Curve) -> Self {
        Self {
            curve,
            start_data: None,
            end_data: None,
            kind: RoomRegionType::Deprecated,
        }
    }

    #[must_use]
    pub fn with_start(mut self, anchor: SplitAnchor) -> Self {
        self.start_data = Some(anchor);
        self
    }

    #[must_use]
    pub fn with_end(mut self, anchor: SplitAnchor) -> Self {
        self.end_data = Some(anchor);
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: RoomRegionType) -> Self {
        self.kind = kind;
        self
    }
}

/// Region of a room floor or slab, optionally divided by split curves.
#[derive(Debug, Clone)]
pub struct RoomRegion {
    region: Region,
    room_id: String,
    kind: RoomRegionType,
    split_curves: Vec<RoomSplitCurve>,
}

impl RoomRegion {
    #[must_use]
    pub fn new(room_id: impl Into<String>, path: CoEdgePath, kind: RoomRegionType, tolerances: Tolerances) -> Self {
        Self {
            region: Region::new(path, tolerances),
            room_id: room_id.into(),
            kind,
            split_curves: Vec::new(),
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
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    #[must_use]
    pub fn kind(&self) -> RoomRegionType {
        self.kind
    }

    pub fn set_kind(&mut self, kind: RoomRegionType) {
        self.kind = kind;
    }

    #[must_use]
    pub fn split_curves(&self) -> &[RoomSplitCurve] {
        &self.split_curves
    }

    pub(crate) fn set_split_curves(&mut self, curves: Vec<RoomSplitCurve>) {
        self.split_curves = curves;
    }

    /// Appends a split curve and returns its index.
    pub fn add_split_curve(&mut self, curve: RoomSplitCurve) -> usize {
        self.split_curves.push(curve);
        self.split_curves.len() - 1
    }

    pub fn remove_split_curve(&mut self, index: usize) -> Option<RoomSplitCurve> {
        (index < self.split_curves.len()).then(|| self.split_curves.remove(index))
    }

    fn anchor_point(&self, anchor: &SplitAnchor) -> Option<Point3> {
        let coedge = self
            .region
            .co_edge_path()
            .groups()
            .flatten()
            .find(|c| c.topo_name == anchor.topo_name)?;
        Some(coedge.curve.point_at(anchor.percent.clamp(0.0, 1.0)))
    }

    /// Moves the ends of anchored straight split curves onto the current
    /// footprint. Returns the number of curves that changed.
    ///
    /// Anchors naming a co-edge that no longer exists leave their end in
    /// place.
    pub fn refresh_split_curves(&mut self) -> usize {
        let mut changed = 0;
        for i in 0..self.split_curves.len() {
            let split = &self.split_curves[i];
            let Curve::Line(line) = &split.curve else {
                continue;
            };
            let mut start = *line.start();
            let mut end = *line.end();
            for (anchor, point) in [(&split.start_data, &mut start), (&split.end_data, &mut end)] {
                let Some(anchor) = anchor else { continue };
                match self.anchor_point(anchor) {
                    Some(p) => *point = p,
                    None => tracing::warn!(anchor = %anchor.topo_name, "split anchor names no footprint edge"),
                }
            }
            let curve = Curve::line(start, end);
            if curve != self.split_curves[i].curve {
                self.split_curves[i].curve = curve;
                changed += 1;
            }
        }
        changed
    }

    /// Extrudes the room body; faces are named after the room.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be extruded.
    pub fn extrude_body(&mut self, start: f64, end: f64, options: ExtrudeOptions) -> Result<()> {
        let naming = BodyNaming {
            target_id: self.room_id.clone(),
            target_index: 0,
            cap_id: self.room_id.clone(),
            link_wall_ids: Vec::new(),
        };
        self.region.extrude_with(start, end, options, &naming)
    }

    /// Top face whose interior holds `point`.
    fn top_face_at(&self, point: &Point3) -> Result<Option<FaceId>> {
        let store = self.region.store();
        let chord = self.region.tolerances().chord;
        for topo in self.region.topo_faces() {
            if topo.topo_name.role != TopoRole::Top {
                continue;
            }
            let Some(plane) = store.face_surface(topo.face)?.as_plane() else {
                continue;
            };
            let data = store.face(topo.face)?;
            if !point_in_polygon_3d(point, &discrete_loop(store, data.outer, chord)?, plane) {
                continue;
            }
            let mut in_hole = false;
            for &hole in &data.inners {
                in_hole |= point_in_polygon_3d(point, &discrete_loop(store, hole, chord)?, plane);
            }
            if !in_hole {
                return Ok(Some(topo.face));
            }
        }
        Ok(None)
    }

    /// Splits the top of the extruded body by every split curve, lifted to
    /// the top elevation. Returns one outcome per curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the region's face list is inconsistent with its
    /// shell.
    pub fn apply_split_curves(&mut self, editor: &mut dyn ShellEditor) -> Result<Vec<SplitOutcome>> {
        let top = self.region.top_elevation();
        let mut outcomes = Vec::with_capacity(self.split_curves.len());
        for split in self.split_curves.clone() {
            let lift = top - split.curve.start_point().z;
            let curve = split.curve.translated(&Vector3::new(0.0, 0.0, lift));
            let Some(face) = self.top_face_at(&curve.midpoint())? else {
                tracing::warn!(?curve, "split curve lies outside every top face");
                outcomes.push(SplitOutcome::Skipped);
                continue;
            };
            outcomes.push(self.region.split_face_by_curve(face, &curve, &[], editor)?);
        }
        Ok(outcomes)
    }
}
