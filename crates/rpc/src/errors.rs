//! Request-level error kinds

use choco_model::ModelError;
use choco_storage::StorageError;
use thiserror::Error;

/// Why a request failed.
///
/// The kinds are kept apart for logs and callers of [`crate::AppContext`];
/// over HTTP they are all reported the same way.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Body is not JSON, or a field is missing or has the wrong type
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Loaded artifacts could not encode or evaluate the order
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Prediction log could not be written or read
    #[error("persistence failure: {0}")]
    Persistence(#[from] StorageError),
}
