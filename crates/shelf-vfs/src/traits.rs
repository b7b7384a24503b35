//! Virtual filesystem abstraction trait
//!
//! This module defines the `Vfs` trait that all storage backends must
//! implement, plus the payload type that carries one upload through it.

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

use shelf_core::models::{ObjectMeta, UploadDescriptor};
use shelf_core::AppError;

/// Virtual filesystem operation errors
#[derive(Debug, Error)]
pub enum VfsError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Directory creation failed: {0}")]
    CreateDirFailed(String),

    #[error("Upload task queue is full")]
    QueueFull,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for VFS operations
pub type VfsResult<T> = Result<T, VfsError>;

impl From<VfsError> for AppError {
    fn from(err: VfsError) -> Self {
        match err {
            VfsError::NotFound(path) => AppError::NotFound(path),
            VfsError::AlreadyExists(path) => AppError::AlreadyExists(path),
            VfsError::InvalidPath(path) => AppError::PermissionDenied(path),
            other => AppError::StorageFailure(other.to_string()),
        }
    }
}

/// One upload travelling through the write path: descriptor plus content.
///
/// The reader is consumed exactly once by the backend write; the payload
/// cannot be reused afterwards.
pub struct UploadPayload {
    pub descriptor: UploadDescriptor,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl UploadPayload {
    pub fn new(
        descriptor: UploadDescriptor,
        reader: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        Self {
            descriptor,
            reader: Box::new(reader),
        }
    }
}

impl std::fmt::Debug for UploadPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadPayload")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Virtual filesystem trait
///
/// All storage backends must implement this trait. The upload path and the
/// thumbnail pipeline work against it without coupling to backend details.
#[async_trait]
pub trait Vfs: Send + Sync {
    /// Look up an object by virtual path.
    async fn get(&self, path: &str) -> VfsResult<ObjectMeta>;

    /// Create a directory, including missing ancestors. Existing directories
    /// are tolerated.
    async fn make_dir(&self, path: &str) -> VfsResult<()>;

    /// Write an object into `dir`, consuming the payload reader fully.
    ///
    /// With `overwrite` disabled the write fails with `AlreadyExists` when
    /// the destination is occupied.
    async fn put_directly(
        &self,
        dir: &str,
        payload: UploadPayload,
        overwrite: bool,
    ) -> VfsResult<()>;
}
