//! Error types for encoders, models and artifacts

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, validating or persisting model artifacts
#[derive(Error, Debug)]
pub enum ModelError {
    /// An encoder was fitted on no values or loaded with an invalid class list
    #[error("invalid encoder for column '{column}': {reason}")]
    InvalidEncoder { column: String, reason: String },

    /// The encoder set does not cover a categorical column
    #[error("no encoder stored for column '{0}'")]
    MissingEncoder(String),

    /// Coefficients do not line up with the feature layout
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Artifact could not be read or written
    #[error("artifact I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact content could not be (de)serialized
    #[error("artifact serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
