use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tolerances used by extrusion, splitting and discretization.
///
/// Hosts usually keep a single instance per document and hand a copy to
/// every region they create.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tolerances {
    /// Minimum length of a split curve or of a footprint boundary edge.
    pub length: f64,
    /// Distance under which two points are the same vertex.
    pub coincidence: f64,
    /// Tolerance of the bottom-vertex test used to classify split results.
    pub elevation: f64,
    /// Maximum sagitta allowed when an arc is approximated by a polyline.
    pub chord: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            length: 2e-6,
            coincidence: 1e-6,
            elevation: 1e-6,
            chord: 1e-3,
        }
    }
}

impl Tolerances {
    /// Parses tolerances from a JSON object. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
