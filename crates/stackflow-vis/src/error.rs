//! Error types for the Stackflow host server.

use axum::http::StatusCode;
use stackflow_canvas::CanvasError;
use stackflow_catalog::CatalogError;
use thiserror::Error;

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, VisError>;

/// Errors that can occur while starting or running the server.
#[derive(Debug, Error)]
pub enum VisError {
    /// Simulation scripts failed to load
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A canvas command was rejected
    #[error("Canvas error: {0}")]
    Canvas(#[from] CanvasError),

    /// Bind or socket failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP status for a rejected canvas command.
pub(crate) fn status_for(err: &CanvasError) -> StatusCode {
    match err {
        CanvasError::UnknownNode(_) | CanvasError::UnknownSimulation(_) => StatusCode::NOT_FOUND,
        CanvasError::InvalidContainer { .. } => StatusCode::BAD_REQUEST,
        CanvasError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_map_to_not_found() {
        let err = CanvasError::UnknownSimulation("x".into());
        assert_eq!(status_for(&err), StatusCode::NOT_FOUND);
        let err = CanvasError::InvalidContainer {
            width: 0.0,
            height: 1.0,
        };
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn wraps_canvas_errors() {
        let err: VisError = CanvasError::UnknownNode("db".into()).into();
        assert_eq!(err.to_string(), "Canvas error: unknown node: db");
    }
}
