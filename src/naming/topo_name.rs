use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Role of a face within an extruded body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopoRole {
    Bottom,
    Top,
    Side,
}

/// Stable identifier of a generated face or footprint co-edge.
///
/// Two faces regenerated from the same footprint edge of the same owner
/// compare equal. `Clone` is a plain value copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopoName {
    /// Owning entity id, or several ids joined with `|` for merged fronts.
    pub id: String,
    #[serde(rename = "type")]
    pub role: TopoRole,
    pub index: u32,
    #[serde(rename = "subIndex", default, skip_serializing_if = "Option::is_none")]
    pub sub_index: Option<u32>,
}

impl TopoName {
    #[must_use]
    pub fn new(id: impl Into<String>, role: TopoRole, index: u32) -> Self {
        Self {
            id: id.into(),
            role,
            index,
            sub_index: None,
        }
    }

    /// Returns a copy carrying `sub_index`.
    #[must_use]
    pub fn with_sub_index(mut self, sub_index: u32) -> Self {
        self.sub_index = Some(sub_index);
        self
    }

    /// Serializes the name to its JSON dump.
    ///
    /// # Errors
    ///
    /// Returns an error if the name cannot be represented as JSON.
    pub fn dump(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Restores a name from its JSON dump.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a name dump.
    pub fn load(value: &serde_json::Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }
}

impl fmt::Display for TopoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:?}/{}", self.id, self.role, self.index)?;
        if let Some(sub) = self.sub_index {
            write!(f, ".{sub}")?;
        }
        Ok(())
    }
}
