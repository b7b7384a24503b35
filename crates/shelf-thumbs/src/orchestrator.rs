//! Derivation orchestration: existence check, staging, extraction,
//! validation, publish, cleanup.
//!
//! One orchestration run per uploaded video. The run is detached from the
//! request that triggered it and owns its own cancellation scope; outcomes
//! are logged and never surfaced to the uploader.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use shelf_core::models::{HashInfo, Principal, UploadDescriptor};
use shelf_core::{paths, ThumbnailConfig};
use shelf_vfs::{UploadPayload, Vfs, VfsError};

use crate::error::ThumbnailError;
use crate::extract::FrameExtractor;
use crate::tool::ToolRunner;
use crate::validate::validate_webp;

/// Hidden sibling collection thumbnails are published into.
const THUMBNAIL_DIR_NAME: &str = ".thumbnails";
const THUMBNAIL_EXT: &str = "webp";
const THUMBNAIL_MIME: &str = "image/webp";

/// Derive the (directory, file name) a source object's thumbnail lives at.
///
/// The layout is fixed for interoperating tooling: a hidden `.thumbnails`
/// directory next to the source, holding `<base name>.webp`.
pub fn thumbnail_target(source_path: &str) -> (String, String) {
    let (dir, name) = paths::split(source_path);
    (
        paths::join(&dir, THUMBNAIL_DIR_NAME),
        format!("{}.{}", paths::stem(&name), THUMBNAIL_EXT),
    )
}

/// Terminal result of one derivation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeriveOutcome {
    Published { target: String },
    SkippedExisting { target: String },
}

pub struct Thumbnailer {
    vfs: Arc<dyn Vfs>,
    extractor: FrameExtractor,
    config: ThumbnailConfig,
}

impl Thumbnailer {
    pub fn new(vfs: Arc<dyn Vfs>, runner: Arc<dyn ToolRunner>, config: ThumbnailConfig) -> Self {
        let extractor = FrameExtractor::new(runner, config.clone());
        Self {
            vfs,
            extractor,
            config,
        }
    }

    /// Fire-and-forget derivation on an execution context independent of the
    /// caller's. The spawned run carries its own cancellation scope with the
    /// configured deadline, so client disconnection never cancels it.
    pub fn spawn(self: &Arc<Self>, source_path: String, principal: Principal) {
        let thumbnailer = self.clone();
        let deadline = Duration::from_secs(self.config.timeout_secs);

        tokio::spawn(async move {
            let cancel = CancellationToken::new();
            tokio::select! {
                _ = thumbnailer.derive(&source_path, &principal, &cancel) => {}
                _ = tokio::time::sleep(deadline) => {
                    cancel.cancel();
                    tracing::warn!(
                        source = %source_path,
                        timeout_secs = deadline.as_secs(),
                        "Thumbnail derivation timed out"
                    );
                }
            }
        });
    }

    /// Run one derivation to completion. Every outcome is terminal here:
    /// failures are logged and swallowed, the upload has already succeeded
    /// independently of them.
    pub async fn derive(&self, source_path: &str, principal: &Principal, cancel: &CancellationToken) {
        match self.run(source_path, cancel).await {
            Ok(DeriveOutcome::Published { target }) => {
                tracing::info!(
                    source = %source_path,
                    target = %target,
                    principal = %principal.name,
                    "Thumbnail published"
                );
            }
            Ok(DeriveOutcome::SkippedExisting { target }) => {
                tracing::debug!(
                    source = %source_path,
                    target = %target,
                    "Thumbnail already exists, skipping"
                );
            }
            Err(e) => {
                tracing::error!(
                    source = %source_path,
                    principal = %principal.name,
                    error = %e,
                    "Thumbnail derivation failed"
                );
            }
        }
    }

    pub async fn run(
        &self,
        source_path: &str,
        cancel: &CancellationToken,
    ) -> Result<DeriveOutcome, ThumbnailError> {
        let source = self.vfs.get(source_path).await.map_err(|e| match e {
            VfsError::NotFound(path) => ThumbnailError::SourceUnavailable(path),
            other => ThumbnailError::Storage(other),
        })?;

        let video_path = source.local_path.ok_or_else(|| {
            ThumbnailError::SourceUnavailable(format!("{} has no local path", source_path))
        })?;

        let (thumb_dir, thumb_name) = thumbnail_target(source_path);
        let target = paths::join(&thumb_dir, &thumb_name);

        // Unlocked check-then-publish: two concurrent runs for the same
        // source may both pass this check and both publish. Last writer wins;
        // the artifact is a best-effort cache, not authoritative data.
        match self.vfs.get(&target).await {
            Ok(_) => return Ok(DeriveOutcome::SkippedExisting { target }),
            Err(VfsError::NotFound(_)) => {}
            Err(e) => return Err(ThumbnailError::Storage(e)),
        }

        // Staged on local disk; removed on every exit path when it drops.
        let staged = tempfile::Builder::new()
            .prefix("video-thumb-")
            .suffix(".webp")
            .tempfile()
            .map_err(|e| {
                ThumbnailError::ExtractionFailed(format!("failed to create staging file: {}", e))
            })?
            .into_temp_path();

        let attempt = self
            .extractor
            .extract_poster(&video_path, &staged, cancel)
            .await?;
        tracing::debug!(source = %source_path, strategy = ?attempt, "Frame extracted");

        validate_webp(&staged).await?;

        self.vfs
            .make_dir(&thumb_dir)
            .await
            .map_err(|e| ThumbnailError::PublishFailed(e.to_string()))?;

        let file = tokio::fs::File::open(&staged)
            .await
            .map_err(|e| ThumbnailError::PublishFailed(format!("failed to open staged file: {}", e)))?;
        let size = file.metadata().await.map(|m| m.len()).unwrap_or(0);

        let payload = UploadPayload::new(
            UploadDescriptor {
                name: thumb_name,
                size,
                modified: Utc::now(),
                mime_type: THUMBNAIL_MIME.to_string(),
                hashes: HashInfo::new(),
            },
            file,
        );

        self.vfs
            .put_directly(&thumb_dir, payload, true)
            .await
            .map_err(|e| ThumbnailError::PublishFailed(e.to_string()))?;

        Ok(DeriveOutcome::Published { target })
    }
}
