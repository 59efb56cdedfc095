//! Error types for parsing core values

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown flow type: {0}")]
    UnknownFlowType(String),

    #[error("unknown model type: {0}")]
    UnknownModelType(String),
}
