//! Error types for catalog access

use thiserror::Error;

/// Failures reported by catalog, entity store and mapping service
/// implementations.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    Invalid(String),
}

impl CatalogError {
    /// Errors a caller may reasonably retry.
    pub fn is_transport(&self) -> bool {
        matches!(self, CatalogError::Transport(_) | CatalogError::Io(_))
    }
}

/// Result type alias using CatalogError
pub type Result<T> = std::result::Result<T, CatalogError>;
