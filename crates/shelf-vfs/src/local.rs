use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;

use shelf_core::models::ObjectMeta;
use shelf_core::paths;

use crate::traits::{UploadPayload, Vfs, VfsError, VfsResult};

/// Local filesystem backend
#[derive(Clone)]
pub struct LocalVfs {
    root: PathBuf,
}

impl LocalVfs {
    /// Create a new LocalVfs instance rooted at `root`.
    ///
    /// The root directory is created if it does not exist.
    pub async fn new(root: impl Into<PathBuf>) -> VfsResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            VfsError::Backend(format!(
                "Failed to create storage root {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalVfs { root })
    }

    /// Map a virtual path onto the storage root with traversal validation.
    fn resolve(&self, virtual_path: &str) -> VfsResult<PathBuf> {
        let normalized = paths::normalize(virtual_path)
            .ok_or_else(|| VfsError::InvalidPath(virtual_path.to_string()))?;

        let mut path = self.root.clone();
        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> VfsResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Vfs for LocalVfs {
    async fn get(&self, path: &str) -> VfsResult<ObjectMeta> {
        let disk_path = self.resolve(path)?;

        let meta = match fs::metadata(&disk_path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VfsError::NotFound(path.to_string()));
            }
            Err(e) => {
                return Err(VfsError::ReadFailed(format!(
                    "Failed to stat {}: {}",
                    disk_path.display(),
                    e
                )));
            }
        };

        let (_, name) = paths::split(path);
        let modified: DateTime<Utc> = meta
            .modified()
            .map(DateTime::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(ObjectMeta {
            name,
            size: meta.len(),
            modified,
            is_dir: meta.is_dir(),
            local_path: Some(disk_path),
        })
    }

    async fn make_dir(&self, path: &str) -> VfsResult<()> {
        let disk_path = self.resolve(path)?;

        fs::create_dir_all(&disk_path).await.map_err(|e| {
            VfsError::CreateDirFailed(format!("Failed to create {}: {}", disk_path.display(), e))
        })?;

        tracing::debug!(path = %path, "Directory ensured");
        Ok(())
    }

    async fn put_directly(
        &self,
        dir: &str,
        mut payload: UploadPayload,
        overwrite: bool,
    ) -> VfsResult<()> {
        let target = paths::join(dir, &payload.descriptor.name);
        let disk_path = self.resolve(&target)?;

        if !overwrite && fs::try_exists(&disk_path).await.unwrap_or(false) {
            return Err(VfsError::AlreadyExists(target));
        }

        self.ensure_parent_dir(&disk_path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&disk_path).await.map_err(|e| {
            VfsError::WriteFailed(format!("Failed to create file {}: {}", disk_path.display(), e))
        })?;

        let bytes_copied = tokio::io::copy(&mut payload.reader, &mut file)
            .await
            .map_err(|e| {
                VfsError::WriteFailed(format!(
                    "Failed to write stream to {}: {}",
                    disk_path.display(),
                    e
                ))
            })?;

        file.sync_all().await.map_err(|e| {
            VfsError::WriteFailed(format!("Failed to sync {}: {}", disk_path.display(), e))
        })?;

        tracing::info!(
            path = %target,
            mime_type = %payload.descriptor.mime_type,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object written"
        );

        Ok(())
    }
}
