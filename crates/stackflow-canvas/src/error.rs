//! Error types for stackflow-canvas.

use thiserror::Error;

/// Result type for canvas operations.
pub type Result<T> = std::result::Result<T, CanvasError>;

/// Errors returned by canvas commands.
///
/// Display inconsistencies (unresolved nodes, foreign pointer ids, stale
/// timer tickets) are not errors; they degrade silently.
#[derive(Debug, Error, PartialEq)]
pub enum CanvasError {
    /// The node id is not in the catalog.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The simulation id is not in the catalog.
    #[error("unknown simulation: {0}")]
    UnknownSimulation(String),

    /// The container reported an unusable size.
    #[error("invalid container size {width}x{height}")]
    InvalidContainer { width: f64, height: f64 },

    /// The canvas tunables are inconsistent.
    #[error("invalid canvas config: {0}")]
    InvalidConfig(String),
}
