mod extrude;

pub use extrude::{ExtrudeOptions, ExtrudePath, ShellWrapper};
