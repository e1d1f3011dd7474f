use crate::error::Result;
use crate::geometry::Curve;
use crate::naming::TopoFace;
use crate::operations::ShellEditor;
use crate::topology::{FaceId, TopologyStore};

use super::Region;

const MODULE: &str = "region::split";

/// Result of [`Region::split_face_by_curve`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum SplitOutcome {
    /// The curve is too short or the region is currently invalid.
    Skipped,
    /// The shell edit failed or gave an ambiguous result; nothing changed.
    Failed,
    Split {
        visible: Vec<FaceId>,
        auxiliary: Vec<FaceId>,
    },
}

impl SplitOutcome {
    #[must_use]
    pub fn is_split(&self) -> bool {
        matches!(self, SplitOutcome::Split { .. })
    }
}

/// Elevation a face must touch to count as a bottom part.
const GROUND: f64 = 0.0;

/// Marks which of the new faces are auxiliary.
///
/// Two faces always give one of each: the first is auxiliary when it touches
/// the ground, otherwise the second is. With more faces exactly one must touch
/// the ground; anything else returns `None`.
fn classify(store: &TopologyStore, faces: &[FaceId], eps: f64) -> Result<Option<Vec<bool>>> {
    if let [first, _] = faces {
        let first_aux = store.face_touches_elevation(*first, GROUND, eps)?;
        return Ok(Some(vec![first_aux, !first_aux]));
    }
    let touches = faces
        .iter()
        .map(|f| store.face_touches_elevation(*f, GROUND, eps))
        .collect::<Result<Vec<_>>>()?;
    let bottoms = touches.iter().filter(|t| **t).count();
    if bottoms == 1 {
        Ok(Some(touches))
    } else {
        tracing::error!(
            module = MODULE,
            faces = faces.len(),
            bottom_faces = bottoms,
            "ambiguous split result"
        );
        Ok(None)
    }
}

impl Region {
    /// Splits a generated face by `curve`.
    ///
    /// The new faces replace the original in the face list. Each inherits the
    /// original name and co-edge. Parts touching world Z = 0 are auxiliary and
    /// keep every wall link; a two-face split always yields exactly one
    /// auxiliary part. Visible parts drop `exclude_ids` from their wall links.
    ///
    /// A failed or ambiguous shell edit is logged and leaves the region
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `face` is not a generated face of this region or
    /// its footprint co-edge is missing from the path.
    pub fn split_face_by_curve(
        &mut self,
        face: FaceId,
        curve: &Curve,
        exclude_ids: &[String],
        editor: &mut dyn ShellEditor,
    ) -> Result<SplitOutcome> {
        if curve.length() < self.tolerances.length || !self.is_valid() {
            return Ok(SplitOutcome::Skipped);
        }
        let Some(index) = self.topo_faces.iter().position(|f| f.face == face) else {
            tracing::warn!(module = MODULE, ?face, "split requested for a stale face");
            return Err(crate::error::TopologyError::EntityNotFound("topo face".into()).into());
        };
        let mut parent = self.topo_faces[index].clone();
        if let Some(id) = parent.co_edge.as_ref().map(|c| c.id.clone()) {
            parent.co_edge = Some(self.get_co_edge(&id)?.clone());
        }
        let Some(shell) = self.shell_wrapper.as_ref().map(|w| w.shell) else {
            return Ok(SplitOutcome::Skipped);
        };
        let hint = self.store.face_surface(face)?.as_hint().cloned();

        let curve_dump = curve.dump().map_or_else(|e| e.to_string(), |v| v.to_string());
        let snapshot = self.store.clone();
        let result = match editor.add_edges(&mut self.store, std::slice::from_ref(curve), &[shell], hint.as_ref()) {
            Ok(result) => result,
            Err(error) => {
                self.store = snapshot;
                let shell_dump = self.store.dump_shell(shell).unwrap_or_else(|e| e.to_string());
                tracing::error!(
                    module = MODULE,
                    curve = %curve_dump,
                    shell = %shell_dump,
                    %error,
                    "failed to insert split curve"
                );
                return Ok(SplitOutcome::Failed);
            }
        };

        let added = result.added_faces(shell).to_vec();
        if added.len() < 2 || self.store.contains_face(face) {
            tracing::error!(
                module = MODULE,
                faces = added.len(),
                curve = %curve_dump,
                "split curve did not divide the face"
            );
            self.store = snapshot;
            return Ok(SplitOutcome::Failed);
        }
        let Some(aux_flags) = classify(&self.store, &added, self.tolerances.elevation)? else {
            self.store = snapshot;
            return Ok(SplitOutcome::Failed);
        };

        let mut parts: Vec<TopoFace> = Vec::with_capacity(added.len());
        let (mut visible, mut auxiliary) = (Vec::new(), Vec::new());
        for (&part, &is_aux) in added.iter().zip(&aux_flags) {
            parts.push(parent.derive_part(part, is_aux, exclude_ids));
            if is_aux {
                auxiliary.push(part);
            } else {
                visible.push(part);
            }
        }

        self.topo_faces.remove(index);
        self.topo_faces.extend(parts);
        self.assign_groups()?;
        Ok(SplitOutcome::Split { visible, auxiliary })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Tolerances;
    use crate::error::OperationError;
    use crate::geometry::FaceSurface;
    use crate::math::Point3;
    use crate::operations::{AddEdges, AddEdgesResult, ExtrudeOptions};
    use crate::region::path::tests::rect_loop;
    use crate::region::tests::{naming, wall_region};
    use crate::region::{BodyNaming, CoEdgePath};
    use crate::support::face_util::face_area;
    use crate::topology::ShellId;
    use approx::assert_relative_eq;

    fn init_logs() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    /// Inserts the requested curve followed by fixed extra cuts.
    struct ExtraCuts(Vec<Curve>);

    impl ShellEditor for ExtraCuts {
        fn add_edges(
            &mut self,
            store: &mut TopologyStore,
            curves: &[Curve],
            shells: &[ShellId],
            surface_hint: Option<&FaceSurface>,
        ) -> Result<AddEdgesResult> {
            let all: Vec<Curve> = curves.iter().chain(&self.0).cloned().collect();
            AddEdges::new(1e-6).add_edges(store, &all, shells, surface_hint)
        }
    }

    struct Refuse;

    impl ShellEditor for Refuse {
        fn add_edges(
            &mut self,
            _store: &mut TopologyStore,
            _curves: &[Curve],
            _shells: &[ShellId],
            _surface_hint: Option<&FaceSurface>,
        ) -> Result<AddEdgesResult> {
            Err(OperationError::Failed("refused".into()).into())
        }
    }

    fn front(region: &Region) -> FaceId {
        region.topo_faces()[2].face
    }

    fn horizontal(z: f64) -> Curve {
        Curve::line(Point3::new(0.0, 0.0, z), Point3::new(4.0, 0.0, z))
    }

    #[test]
    fn horizontal_cut_leaves_one_auxiliary_part() {
        let mut region = wall_region();
        let face = front(&region);
        let name = region.topo_faces()[2].topo_name.clone();
        let outcome = region
            .split_face_by_curve(face, &horizontal(1.0), &[], &mut AddEdges::new(1e-6))
            .unwrap();
        let SplitOutcome::Split { visible, auxiliary } = outcome else {
            panic!("expected a split");
        };
        assert_eq!((visible.len(), auxiliary.len()), (1, 1));
        assert!(region.topo_face(face).is_none());
        assert_eq!(region.topo_faces().len(), 7);

        let parts = region.topo_faces_named(&name);
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| p.co_edge.as_ref().unwrap().id == "c0"));
        let store = region.store();
        assert!(store.face_touches_elevation(auxiliary[0], 0.0, 1e-9).unwrap());
        let total = face_area(store, visible[0], 1e-3).unwrap() + face_area(store, auxiliary[0], 1e-3).unwrap();
        assert_relative_eq!(total, 12.0, epsilon = 1e-9);
        assert_relative_eq!(face_area(store, visible[0], 1e-3).unwrap(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn excluded_walls_leave_visible_part_only() {
        let path = CoEdgePath::new(rect_loop("c", "w1", 0.0, 0.0, 4.0, 0.2, true), Vec::new());
        let mut region = Region::new(path, Tolerances::default());
        let naming = BodyNaming {
            link_wall_ids: vec!["w1".into(), "w2".into()],
            ..naming("w1")
        };
        region.extrude_with(0.0, 3.0, ExtrudeOptions::default(), &naming).unwrap();
        let face = front(&region);
        let outcome = region
            .split_face_by_curve(face, &horizontal(1.0), &["w2".to_owned()], &mut AddEdges::new(1e-6))
            .unwrap();
        let SplitOutcome::Split { visible, auxiliary } = outcome else {
            panic!("expected a split");
        };
        assert_eq!(region.topo_face(visible[0]).unwrap().link_wall_ids, vec!["w1".to_owned()]);
        let aux = region.topo_face(auxiliary[0]).unwrap();
        assert!(aux.is_aux);
        assert_eq!(aux.link_wall_ids, vec!["w1".to_owned(), "w2".to_owned()]);
    }

    #[test]
    fn short_curve_is_a_no_op() {
        let mut region = wall_region();
        let before = region.topo_faces().to_vec();
        let tiny = Curve::line(Point3::new(1.0, 0.0, 1.0), Point3::new(1.0 + 1e-6, 0.0, 1.0));
        let outcome = region
            .split_face_by_curve(front(&region), &tiny, &[], &mut AddEdges::new(1e-6))
            .unwrap();
        assert_eq!(outcome, SplitOutcome::Skipped);
        assert_eq!(region.topo_faces(), before.as_slice());
    }

    #[test]
    fn invalid_region_defers_split() {
        let mut region = wall_region();
        let mut path = region.co_edge_path().clone();
        path.outer.pop();
        region.set_co_edge_path(path);
        let outcome = region
            .split_face_by_curve(front(&region), &horizontal(1.0), &[], &mut AddEdges::new(1e-6))
            .unwrap();
        assert_eq!(outcome, SplitOutcome::Skipped);
        assert_eq!(region.topo_faces().len(), 6);
    }

    #[test]
    fn editor_failure_keeps_faces() {
        init_logs();
        let mut region = wall_region();
        let before = region.topo_faces().to_vec();
        let faces = region.store().face_count();
        let outcome = region
            .split_face_by_curve(front(&region), &horizontal(1.0), &[], &mut Refuse)
            .unwrap();
        assert_eq!(outcome, SplitOutcome::Failed);
        assert_eq!(region.topo_faces(), before.as_slice());
        assert_eq!(region.store().face_count(), faces);
    }

    #[test]
    fn three_parts_with_single_bottom_face() {
        let mut region = wall_region();
        let mut editor = ExtraCuts(vec![Curve::line(Point3::new(2.0, 0.0, 1.0), Point3::new(2.0, 0.0, 3.0))]);
        let outcome = region
            .split_face_by_curve(front(&region), &horizontal(1.0), &[], &mut editor)
            .unwrap();
        let SplitOutcome::Split { visible, auxiliary } = outcome else {
            panic!("expected a split");
        };
        assert_eq!((visible.len(), auxiliary.len()), (2, 1));
        assert_eq!(region.topo_faces().len(), 8);
    }

    #[test]
    fn ambiguous_bottom_faces_abort() {
        init_logs();
        let mut region = wall_region();
        let before = region.topo_faces().to_vec();
        let faces = region.store().face_count();
        let mut editor = ExtraCuts(vec![Curve::line(Point3::new(2.0, 0.0, 0.0), Point3::new(2.0, 0.0, 1.0))]);
        let outcome = region
            .split_face_by_curve(front(&region), &horizontal(1.0), &[], &mut editor)
            .unwrap();
        assert_eq!(outcome, SplitOutcome::Failed);
        assert_eq!(region.topo_faces(), before.as_slice());
        assert_eq!(region.store().face_count(), faces);
    }

    #[test]
    fn split_parts_can_be_split_again() {
        let mut region = wall_region();
        let outcome = region
            .split_face_by_curve(front(&region), &horizontal(1.0), &[], &mut AddEdges::new(1e-6))
            .unwrap();
        let SplitOutcome::Split { visible, .. } = outcome else {
            panic!("expected a split");
        };
        let again = region
            .split_face_by_curve(visible[0], &horizontal(2.0), &[], &mut AddEdges::new(1e-6))
            .unwrap();
        let SplitOutcome::Split { visible, auxiliary } = again else {
            panic!("expected a second split");
        };
        assert_eq!((visible.len(), auxiliary.len()), (1, 1));
        assert_eq!(region.topo_faces().len(), 8);
        let store = region.store();
        assert!(!store.face_touches_elevation(visible[0], 0.0, 1e-9).unwrap());
        assert!(!store.face_touches_elevation(auxiliary[0], 0.0, 1e-9).unwrap());
        assert!(region.topo_face(auxiliary[0]).unwrap().is_aux);
        assert!(!region.topo_face(visible[0]).unwrap().is_aux);
    }

    #[test]
    fn vertical_cut_marks_one_part_auxiliary() {
        let mut region = wall_region();
        let cut = Curve::line(Point3::new(2.0, 0.0, 0.0), Point3::new(2.0, 0.0, 3.0));
        let outcome = region
            .split_face_by_curve(front(&region), &cut, &[], &mut AddEdges::new(1e-6))
            .unwrap();
        let SplitOutcome::Split { visible, auxiliary } = outcome else {
            panic!("expected a split");
        };
        assert_eq!((visible.len(), auxiliary.len()), (1, 1));
        let store = region.store();
        assert!(store.face_touches_elevation(visible[0], 0.0, 1e-9).unwrap());
        assert!(store.face_touches_elevation(auxiliary[0], 0.0, 1e-9).unwrap());
        assert_relative_eq!(face_area(store, visible[0], 1e-3).unwrap(), 6.0, epsilon = 1e-9);
        assert_relative_eq!(face_area(store, auxiliary[0], 1e-3).unwrap(), 6.0, epsilon = 1e-9);
        assert_eq!(region.topo_faces().iter().filter(|f| f.is_aux).count(), 1);
    }

    #[test]
    fn raised_wall_is_classified_against_ground() {
        let path = CoEdgePath::new(rect_loop("c", "w1", 0.0, 0.0, 4.0, 0.2, true), Vec::new());
        let mut region = Region::new(path, Tolerances::default());
        region.extrude_with(1.0, 4.0, ExtrudeOptions::default(), &naming("w1")).unwrap();
        let outcome = region
            .split_face_by_curve(front(&region), &horizontal(2.0), &[], &mut AddEdges::new(1e-6))
            .unwrap();
        let SplitOutcome::Split { visible, auxiliary } = outcome else {
            panic!("expected a split");
        };
        assert_eq!((visible.len(), auxiliary.len()), (1, 1));
        let store = region.store();
        assert!(!store.face_touches_elevation(visible[0], 0.0, 1e-9).unwrap());
        assert!(!store.face_touches_elevation(auxiliary[0], 0.0, 1e-9).unwrap());
    }

    #[test]
    fn stale_face_is_an_error() {
        let mut region = wall_region();
        let face = front(&region);
        region
            .split_face_by_curve(face, &horizontal(1.0), &[], &mut AddEdges::new(1e-6))
            .unwrap();
        assert!(region
            .split_face_by_curve(face, &horizontal(2.0), &[], &mut AddEdges::new(1e-6))
            .is_err());
    }

    #[test]
    fn unsplit_restores_whole_face() {
        let mut region = wall_region();
        let name = region.topo_faces()[2].topo_name.clone();
        region
            .split_face_by_curve(front(&region), &horizontal(1.0), &[], &mut AddEdges::new(1e-6))
            .unwrap();
        let merged = region.unsplit_face(&name).unwrap().unwrap();
        assert_eq!(region.topo_faces().len(), 6);
        let whole = region.topo_face(merged).unwrap();
        assert!(!whole.is_aux);
        assert_eq!(whole.co_edge.as_ref().unwrap().id, "c0");
        assert_relative_eq!(face_area(region.store(), merged, 1e-3).unwrap(), 12.0, epsilon = 1e-9);
        assert_eq!(region.unsplit_face(&name).unwrap(), None);
    }
}
