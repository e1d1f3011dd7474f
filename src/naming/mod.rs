//! Persistent names for generated topology.
//!
//! A [`TopoName`] ties a face or footprint co-edge back to the entity and
//! footprint feature that produced it, so regenerated geometry can be
//! matched against previously authored data. [`TopoFace`] is the face
//! wrapper a region hands out after extrusion or splitting.

mod topo_face;
mod topo_name;

pub use topo_face::TopoFace;
pub use topo_name::{TopoName, TopoRole};
