use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::Tolerances;
use crate::error::{Result, TopologyError};
use crate::geometry::Curve;
use crate::naming::TopoName;

use super::{
    CoEdge2d, CoEdgePath, LinkInfo, Region, RoomRegion, RoomRegionType, RoomSplitCurve, SplitAnchor, WallRegion,
};

/// Persisted anchor: an opaque name dump and the fraction along the edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorDump {
    pub n: serde_json::Value,
    pub p: f64,
}

/// Persisted room split curve. Default type and absent anchors are elided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitCurveDump {
    pub c: serde_json::Value,
    #[serde(rename = "sData", default, skip_serializing_if = "Option::is_none")]
    pub start_data: Option<AnchorDump>,
    #[serde(rename = "eData", default, skip_serializing_if = "Option::is_none")]
    pub end_data: Option<AnchorDump>,
    #[serde(rename = "type", default, skip_serializing_if = "RoomRegionType::is_deprecated")]
    pub kind: RoomRegionType,
}

/// Persisted region.
///
/// `topoIds` lists the outer co-edges in loop order. `fIds` lists every hole
/// co-edge, loop after loop; holes are told apart again on load by chaining
/// co-edges head to tail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionDump {
    #[serde(rename = "topoIds")]
    pub topo_ids: Vec<String>,
    #[serde(rename = "fIds", default, skip_serializing_if = "Vec::is_empty")]
    pub hole_ids: Vec<String>,
    #[serde(rename = "sCs", default, skip_serializing_if = "Vec::is_empty")]
    pub split_curves: Vec<SplitCurveDump>,
    #[serde(rename = "lI", default, skip_serializing_if = "Vec::is_empty")]
    pub link_info: Vec<LinkInfo>,
}

impl RegionDump {
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    ///
    /// Returns an error if `json` is not a region dump.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Resolves persisted co-edge ids to footprint co-edges while loading.
#[derive(Debug, Clone, Default)]
pub struct LoadContext {
    coedges: HashMap<String, CoEdge2d>,
}

impl LoadContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coedge: CoEdge2d) {
        self.coedges.insert(coedge.id.clone(), coedge);
    }

    /// # Errors
    ///
    /// Returns [`TopologyError::CoEdgeNotFound`] for an unknown id.
    pub fn resolve(&self, id: &str) -> Result<CoEdge2d> {
        self.coedges
            .get(id)
            .cloned()
            .ok_or_else(|| TopologyError::CoEdgeNotFound(id.to_owned()).into())
    }

    fn path(&self, dump: &RegionDump, tol: f64) -> Result<CoEdgePath> {
        let outer = dump
            .topo_ids
            .iter()
            .map(|id| self.resolve(id))
            .collect::<Result<Vec<_>>>()?;

        let mut holes = Vec::new();
        let mut current: Vec<CoEdge2d> = Vec::new();
        for id in &dump.hole_ids {
            let coedge = self.resolve(id)?;
            if let Some(last) = current.last() {
                if (coedge.curve.start_point() - last.curve.end_point()).norm() > tol {
                    return Err(TopologyError::LoopNotClosed.into());
                }
            }
            current.push(coedge);
            let closes = match (current.first(), current.last()) {
                (Some(first), Some(last)) => (first.curve.start_point() - last.curve.end_point()).norm() <= tol,
                _ => false,
            };
            if closes {
                holes.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            return Err(TopologyError::LoopNotClosed.into());
        }
        Ok(CoEdgePath::new(outer, holes))
    }
}

impl From<&CoEdgePath> for LoadContext {
    fn from(path: &CoEdgePath) -> Self {
        let mut ctx = Self::new();
        for coedge in path.groups().flatten() {
            ctx.insert(coedge.clone());
        }
        ctx
    }
}

fn dump_anchor(anchor: &SplitAnchor) -> Result<AnchorDump> {
    Ok(AnchorDump {
        n: anchor.topo_name.dump()?,
        p: anchor.percent,
    })
}

fn load_anchor(dump: &AnchorDump) -> Result<SplitAnchor> {
    Ok(SplitAnchor::new(TopoName::load(&dump.n)?, dump.p))
}

impl Region {
    /// Persisted form of the footprint.
    #[must_use]
    pub fn dump(&self) -> RegionDump {
        let path = self.co_edge_path();
        RegionDump {
            topo_ids: path.outer.iter().map(|c| c.id.clone()).collect(),
            hole_ids: path.holes.iter().flatten().map(|c| c.id.clone()).collect(),
            ..RegionDump::default()
        }
    }

    /// Rebuilds a region from its dump. The shell is not rebuilt; extrude
    /// again to get faces.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is unknown or the holes do not chain into
    /// closed loops.
    pub fn load(dump: &RegionDump, ctx: &LoadContext, tolerances: Tolerances) -> Result<Self> {
        let path = ctx.path(dump, tolerances.coincidence)?;
        Ok(Self::new(path, tolerances))
    }
}

impl WallRegion {
    #[must_use]
    pub fn dump(&self) -> RegionDump {
        RegionDump {
            link_info: self.link_info().to_vec(),
            ..self.region().dump()
        }
    }

    /// # Errors
    ///
    /// See [`Region::load`].
    pub fn load(dump: &RegionDump, ctx: &LoadContext, tolerances: Tolerances) -> Result<Self> {
        let path = ctx.path(dump, tolerances.coincidence)?;
        Ok(Self::new(path, dump.link_info.clone(), tolerances))
    }
}

impl RoomRegion {
    /// # Errors
    ///
    /// Returns an error if a split curve or anchor name cannot be dumped.
    pub fn dump(&self) -> Result<RegionDump> {
        let split_curves = self
            .split_curves()
            .iter()
            .map(|s| -> Result<SplitCurveDump> {
                Ok(SplitCurveDump {
                    c: s.curve.dump()?,
                    start_data: s.start_data.as_ref().map(dump_anchor).transpose()?,
                    end_data: s.end_data.as_ref().map(dump_anchor).transpose()?,
                    kind: s.kind,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RegionDump {
            split_curves,
            ..self.region().dump()
        })
    }

    /// # Errors
    ///
    /// Returns an error if an id is unknown, the holes do not chain, or a
    /// split curve or anchor dump is malformed.
    pub fn load(
        room_id: impl Into<String>,
        kind: RoomRegionType,
        dump: &RegionDump,
        ctx: &LoadContext,
        tolerances: Tolerances,
    ) -> Result<Self> {
        let path = ctx.path(dump, tolerances.coincidence)?;
        let mut room = Self::new(room_id, path, kind, tolerances);
        let curves = dump
            .split_curves
            .iter()
            .map(|s| -> Result<RoomSplitCurve> {
                Ok(RoomSplitCurve {
                    curve: Curve::load(&s.c)?,
                    start_data: s.start_data.as_ref().map(load_anchor).transpose()?,
                    end_data: s.end_data.as_ref().map(load_anchor).transpose()?,
                    kind: s.kind,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        room.set_split_curves(curves);
        Ok(room)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::TopoformError;
    use crate::math::Point3;
    use crate::naming::TopoRole;
    use crate::region::path::tests::rect_loop;

    fn holed_path() -> CoEdgePath {
        CoEdgePath::new(
            rect_loop("o", "r1", 0.0, 0.0, 8.0, 4.0, true),
            vec![
                rect_loop("a", "r1", 1.0, 1.0, 2.0, 2.0, false),
                rect_loop("b", "r1", 5.0, 1.0, 6.0, 3.0, false),
            ],
        )
    }

    fn anchor(index: u32, p: f64) -> SplitAnchor {
        SplitAnchor::new(TopoName::new("r1", TopoRole::Side, index), p)
    }

    #[test]
    fn empty_optional_keys_are_elided() {
        let path = CoEdgePath::new(rect_loop("o", "r1", 0.0, 0.0, 1.0, 1.0, true), Vec::new());
        let room = RoomRegion::new("r1", path, RoomRegionType::Space, Tolerances::default());
        let json: serde_json::Value = serde_json::from_str(&room.dump().unwrap().to_json().unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({ "topoIds": ["o0", "o1", "o2", "o3"] }));
    }

    #[test]
    fn holes_regroup_on_load() {
        let path = holed_path();
        let region = Region::new(path.clone(), Tolerances::default());
        let dump = region.dump();
        assert_eq!(dump.hole_ids.len(), 8);
        let loaded = Region::load(&dump, &LoadContext::from(&path), Tolerances::default()).unwrap();
        assert_eq!(loaded.co_edge_path(), &path);
    }

    #[test]
    fn broken_hole_chain_is_rejected() {
        let path = holed_path();
        let mut dump = Region::new(path.clone(), Tolerances::default()).dump();
        dump.hole_ids.pop();
        assert!(matches!(
            Region::load(&dump, &LoadContext::from(&path), Tolerances::default()),
            Err(TopoformError::Topology(TopologyError::LoopNotClosed))
        ));
    }

    #[test]
    fn unknown_id_fails_fast() {
        let path = holed_path();
        let mut dump = Region::new(path.clone(), Tolerances::default()).dump();
        dump.topo_ids[1] = "gone".into();
        assert!(matches!(
            Region::load(&dump, &LoadContext::from(&path), Tolerances::default()),
            Err(TopoformError::Topology(TopologyError::CoEdgeNotFound(id))) if id == "gone"
        ));
    }

    #[test]
    fn split_curves_round_trip() {
        let path = holed_path();
        let mut room = RoomRegion::new("r1", path.clone(), RoomRegionType::Slab, Tolerances::default());
        let line = |x: f64| Curve::line(Point3::new(x, 0.0, 0.0), Point3::new(x, 4.0, 0.0));
        room.add_split_curve(RoomSplitCurve::new(line(3.0)).with_start(anchor(0, 0.375)));
        room.add_split_curve(
            RoomSplitCurve::new(line(4.0))
                .with_end(anchor(2, 0.5))
                .with_kind(RoomRegionType::Space),
        );
        room.add_split_curve(RoomSplitCurve::new(line(7.0)).with_kind(RoomRegionType::Slab));

        let json = room.dump().unwrap().to_json().unwrap();
        let dump = RegionDump::from_json(&json).unwrap();
        assert!(dump.split_curves[0].end_data.is_none());
        let loaded = RoomRegion::load("r1", RoomRegionType::Slab, &dump, &LoadContext::from(&path), Tolerances::default()).unwrap();
        assert_eq!(loaded.split_curves(), room.split_curves());
        assert_eq!(loaded.region().co_edge_path(), &path);
    }

    #[test]
    fn absent_type_defaults_to_deprecated() {
        let c = Curve::line(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)).dump().unwrap();
        let json = serde_json::json!({ "topoIds": [], "sCs": [{ "c": c }] }).to_string();
        let dump = RegionDump::from_json(&json).unwrap();
        assert_eq!(dump.split_curves[0].kind, RoomRegionType::Deprecated);
        assert!(dump.split_curves[0].start_data.is_none());
        let rewritten: serde_json::Value = serde_json::from_str(&dump.to_json().unwrap()).unwrap();
        assert!(rewritten["sCs"][0].get("type").is_none());
    }

    #[test]
    fn link_info_round_trip() {
        let path = CoEdgePath::new(rect_loop("o", "w1", 0.0, 0.0, 4.0, 0.2, true), Vec::new());
        let wall = WallRegion::new(
            path.clone(),
            vec![LinkInfo::new("w1", 0), LinkInfo::new("w2", 1)],
            Tolerances::default(),
        );
        let json = wall.dump().to_json().unwrap();
        assert!(json.contains(r#""lI":[{"wallId":"w1","index":0}"#));
        let loaded = WallRegion::load(&RegionDump::from_json(&json).unwrap(), &LoadContext::from(&path), Tolerances::default()).unwrap();
        assert_eq!(loaded.link_info(), wall.link_info());
    }
}
