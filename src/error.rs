use thiserror::Error;

/// Top-level error type for the brush kernel.
#[derive(Debug, Error)]
pub enum BrushError {
    /// The three defining points of a face do not span a plane.
    #[error("Brush has invalid face")]
    InvalidFace,

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Errors related to building and querying the half-edge polyhedron.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("polyhedron is not closed")]
    NotClosed,

    #[error("brush is empty")]
    EmptyBrush,
}

/// Convenience type alias for results using [`BrushError`].
pub type Result<T> = std::result::Result<T, BrushError>;
