//! Error types for canopy-ingest

use thiserror::Error;

/// Result type for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Ingest errors
#[derive(Error, Debug)]
pub enum IngestError {
    /// Error from canopy-core
    #[error("Core error: {0}")]
    Core(#[from] canopy_core::Error),

    /// No format driver recognizes the source path
    #[error("No reader driver for: {0}")]
    DriverUnknown(String),

    /// Reprojection requested but no input SRS was supplied or inferred
    #[error("No default SRS supplied, and none inferred")]
    ReprojectionUnresolved,

    /// Malformed source content
    #[error("Malformed source: {0}")]
    Parse(String),

    /// I/O error from the underlying reader
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        IngestError::Parse(msg.into())
    }
}
