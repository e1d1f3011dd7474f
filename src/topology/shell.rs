use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::{Result, TopologyError};

use super::coedge::CoEdgeId;
use super::face::FaceId;
use super::vertex::VertexId;
use super::TopologyStore;

slotmap::new_key_type! {
    /// Unique identifier for a shell in the topology store.
    pub struct ShellId;
}

/// A connected set of faces forming a solid boundary.
#[derive(Debug, Clone, Default)]
pub struct ShellData {
    pub faces: Vec<FaceId>,
}

impl TopologyStore {
    /// Creates an empty shell.
    pub fn add_shell(&mut self) -> ShellId {
        self.shells.insert(ShellData::default())
    }

    /// Adds a face to a shell.
    ///
    /// # Errors
    ///
    /// Returns an error if the face already belongs to a shell.
    pub fn add_face_to_shell(&mut self, shell: ShellId, face: FaceId) -> Result<()> {
        if self.face(face)?.shell.is_some() {
            return Err(TopologyError::InvalidTopology("face already belongs to a shell".into()).into());
        }
        self.shell_mut(shell)?.faces.push(face);
        self.face_mut(face)?.shell = Some(shell);
        Ok(())
    }

    /// Faces of a shell in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell is missing.
    pub fn shell_faces(&self, shell: ShellId) -> Result<Vec<FaceId>> {
        Ok(self.shell(shell)?.faces.clone())
    }

    /// Pairs every co-edge of the shell with the co-edge running between
    /// the same vertices in the opposite direction along the same curve.
    ///
    /// Returns the number of co-edges left without a partner.
    ///
    /// # Errors
    ///
    /// Returns an error if a face of the shell is broken.
    pub fn link_partners(&mut self, shell: ShellId, tol: f64) -> Result<usize> {
        let mut coedges = Vec::new();
        for face in self.shell_faces(shell)? {
            coedges.extend(self.face_coedges(face)?);
        }

        let mut by_ends: HashMap<(VertexId, VertexId), Vec<CoEdgeId>> = HashMap::new();
        for &c in &coedges {
            let data = self.coedge(c)?;
            by_ends.entry((data.start, data.end)).or_default().push(c);
        }

        let mut unmatched = 0;
        for &c in &coedges {
            let data = self.coedge(c)?;
            if data.partner.is_some() {
                continue;
            }
            let mid = data.curve.midpoint();
            let candidates = by_ends.get(&(data.end, data.start)).cloned().unwrap_or_default();
            let mut found = None;
            for other in candidates {
                let o = self.coedge(other)?;
                if other != c && o.partner.is_none() && (o.curve.midpoint() - mid).norm() <= tol {
                    found = Some(other);
                    break;
                }
            }
            match found {
                Some(other) => self.set_partner(c, other)?,
                None => unmatched += 1,
            }
        }
        Ok(unmatched)
    }

    /// Human-readable description of a shell, used in diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell or one of its faces is broken.
    pub fn dump_shell(&self, shell: ShellId) -> Result<String> {
        let mut out = String::new();
        let faces = self.shell_faces(shell)?;
        let _ = writeln!(out, "shell faces={}", faces.len());
        for (i, face) in faces.iter().enumerate() {
            let kind = self.face_surface(*face)?.kind();
            let _ = write!(out, "  face[{i}] {kind:?}");
            for lp in self.face_loops(*face)? {
                let _ = write!(out, " [");
                for p in self.loop_points(lp)? {
                    let _ = write!(out, "({:.4},{:.4},{:.4})", p.x, p.y, p.z);
                }
                let _ = write!(out, "]");
            }
            let _ = writeln!(out);
        }
        Ok(out)
    }
}
