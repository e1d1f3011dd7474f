pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod naming;
pub mod operations;
pub mod region;
pub mod support;
pub mod topology;

pub use config::Tolerances;
pub use error::{Result, TopoformError};
