//! Support structures shared by extrusion, splitting and merging.

mod disjoint;
pub mod face_util;
mod id_generator;
mod merge_point;

pub use disjoint::Disjoint;
pub use id_generator::HierarchicalIdGenerator;
pub use merge_point::MergePoint;
