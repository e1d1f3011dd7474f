use thiserror::Error;

/// Top-level error type for the topoform kernel.
#[derive(Debug, Error)]
pub enum TopoformError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("point does not lie on the curve")]
    PointNotOnCurve,
}

/// Errors raised when the topology graph or a caller contract is broken.
///
/// These are programming errors: no retry can fix them.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("co-edge `{0}` not found in region path")]
    CoEdgeNotFound(String),

    #[error("loop is not closed")]
    LoopNotClosed,

    #[error("cannot merge an empty surface list")]
    EmptySurfaceList,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to modelling operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Convenience type alias for results using [`TopoformError`].
pub type Result<T> = std::result::Result<T, TopoformError>;
