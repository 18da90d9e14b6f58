//! Error types for stackflow-catalog.

use thiserror::Error;

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while loading or validating step scripts.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A step names a node that is not in the node catalog.
    #[error("simulation {simulation:?} step {step} references unknown node {node:?}")]
    UnknownNode {
        simulation: String,
        step: u32,
        node: String,
    },

    /// A simulation has no steps.
    #[error("simulation {0:?} has no steps")]
    EmptySimulation(String),

    /// Two simulations share an id.
    #[error("duplicate simulation id {0:?}")]
    DuplicateSimulation(String),

    /// Script file could not be parsed.
    #[error("invalid step script: {0}")]
    Parse(#[from] serde_json::Error),

    /// Script file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
