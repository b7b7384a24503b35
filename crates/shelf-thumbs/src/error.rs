//! Derivation-path error taxonomy.
//!
//! None of these propagate to the upload caller; the orchestrator logs them
//! and terminates. They exist so log lines and tests can tell the failure
//! stages apart.

use shelf_vfs::VfsError;

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("Source object unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Frame extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Derived artifact is empty")]
    EmptyArtifact,

    #[error("Derived artifact is not a valid WebP image: {0}")]
    CorruptArtifact(String),

    #[error("Failed to publish thumbnail: {0}")]
    PublishFailed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] VfsError),

    #[error("Derivation cancelled")]
    Cancelled,
}
