//! Error types for vibrance operations.

use thiserror::Error;

/// Error type for vibrance operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Buffer too small for the requested region.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),
}

/// Result type for vibrance operations.
pub type OpsResult<T> = Result<T, OpsError>;
