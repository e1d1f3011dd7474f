mod add_edges;

pub use add_edges::{AddEdges, AddEdgesResult, ShellEditor, ShellModification};
