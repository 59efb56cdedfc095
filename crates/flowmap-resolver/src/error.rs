//! Error types for flow resolution

use flowmap_catalog::CatalogError;
use thiserror::Error;

/// Why a query could not be resolved. No mapping entry is written in any of
/// these cases.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("No matching flow for {0}")]
    NoCandidate(String),

    #[error("Failed to create flow '{name}': {source}")]
    CreateFailed {
        name: String,
        #[source]
        source: CatalogError,
    },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl ResolveError {
    /// Failures of the catalog transport; the whole resolution may be retried.
    pub fn is_transport(&self) -> bool {
        match self {
            ResolveError::Catalog(e) | ResolveError::CreateFailed { source: e, .. } => e.is_transport(),
            _ => false,
        }
    }
}

/// Result type alias using ResolveError
pub type Result<T> = std::result::Result<T, ResolveError>;
