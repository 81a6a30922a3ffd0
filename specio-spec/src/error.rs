//! Specification loading errors.

use thiserror::Error;

/// Result type for specification operations.
pub type Result<T> = std::result::Result<T, SpecError>;

/// Errors raised while reading a specification document.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The document is not valid JSON or does not match the model.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is not valid YAML or does not match the model.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file extension does not name a known format.
    #[error("Unsupported specification format: {0}")]
    UnsupportedFormat(String),
}
