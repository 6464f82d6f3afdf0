//! Error types for canopy-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Structure configuration rejected at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Subset splitting requested for an octree structure
    #[error("Unsupported split: {0}")]
    UnsupportedSplit3d(String),

    /// Bounding region violates the min <= max invariant
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    /// JSON parsing error (serde_json)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Create an unsupported 3d split error
    pub fn unsupported_split_3d(msg: impl Into<String>) -> Self {
        Error::UnsupportedSplit3d(msg.into())
    }

    /// Create an invalid bounds error
    pub fn invalid_bounds(msg: impl Into<String>) -> Self {
        Error::InvalidBounds(msg.into())
    }
}
