//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading the host manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file not found at the expected path.
    #[error("manifest not found: {0}")]
    FileNotFound(PathBuf),

    /// Failed to read the manifest file.
    #[error("failed to read manifest: {0}")]
    ReadError(#[from] std::io::Error),
}

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;
