//! Errors raised while reading a request body.

use thiserror::Error;

use crate::ValidationError;

/// Why a request body was rejected.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Body is not valid JSON for the shape
    #[error("malformed request body: {0}")]
    Json(#[from] serde_json::Error),

    /// Body parsed but a field failed validation
    #[error("invalid request: {0}")]
    Invalid(#[from] ValidationError),
}
