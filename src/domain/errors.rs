//! Domain errors for the tagview display layer.

use thiserror::Error;

/// Domain-level errors that can occur in the display layer.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Variable not resolved: {project}/{variable}")]
    LookupFailed { project: String, variable: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
