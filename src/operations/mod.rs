//! Operations on a [`TopologyStore`](crate::topology::TopologyStore):
//! building shells from footprints and editing existing shells.

pub mod modification;
pub mod shaping;

pub use modification::{AddEdges, AddEdgesResult, ShellEditor, ShellModification};
pub use shaping::{ExtrudeOptions, ExtrudePath, ShellWrapper};
