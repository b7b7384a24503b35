//! Upload handlers.
//!
//! Two transports (raw stream, multipart form) normalize into the single
//! canonical ingest path below. Transport-specific parsing stays in the
//! handler modules; everything after the content reader exists is shared.

pub mod form;
pub mod stream;

use std::io::SeekFrom;

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncSeekExt};

use shelf_core::models::{Principal, UploadDescriptor};
use shelf_core::{mime, paths, AppError};
use shelf_vfs::{TaskHandle, UploadPayload};

use crate::headers::UploadMeta;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskHandle>,
}

/// Canonical write path shared by both transports.
///
/// Resolves the destination against the principal, enforces the overwrite
/// flag, writes through the storage abstraction (directly or as an enqueued
/// task), and schedules thumbnail derivation for video content. The reader
/// is always fully consumed or drained before returning so the transport
/// connection stays reusable.
pub(crate) async fn ingest(
    state: &AppState,
    principal: &Principal,
    meta: UploadMeta,
    reader: Box<dyn AsyncRead + Send + Unpin>,
) -> Result<UploadResponse, AppError> {
    let path = match principal.resolve_path(&meta.raw_path) {
        Ok(path) => path,
        Err(e) => {
            drain(reader).await;
            return Err(e);
        }
    };

    if !meta.overwrite && state.fs.get(&path).await.is_ok() {
        drain(reader).await;
        return Err(AppError::AlreadyExists(path));
    }

    let (dir, name) = paths::split(&path);
    let mime_type = meta
        .mime_type
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| mime::guess_mime_type(&name).to_string());

    let descriptor = UploadDescriptor {
        name,
        size: meta.size,
        modified: meta.modified,
        mime_type: mime_type.clone(),
        hashes: meta.hashes,
    };

    let task = if meta.as_task {
        // The transport reader dies with the request; spool the content to an
        // anonymous temp file so the queued write owns its input.
        let spooled = spool(reader).await?;
        let payload = UploadPayload::new(descriptor, spooled);
        Some(state.fs.put_as_task(&dir, payload)?)
    } else {
        let payload = UploadPayload::new(descriptor, reader);
        state.fs.put_directly(&dir, payload, true).await?;
        None
    };

    // Detached handoff: derivation outlives this request and is bounded by
    // its own deadline, never by the client connection.
    if mime::is_video(&mime_type) {
        state.thumbnailer.spawn(path, principal.clone());
    }

    Ok(UploadResponse {
        message: "success",
        task,
    })
}

/// Discard any unread content so the connection can be reused.
pub(crate) async fn drain(mut reader: Box<dyn AsyncRead + Send + Unpin>) {
    let _ = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
}

async fn spool(
    mut reader: Box<dyn AsyncRead + Send + Unpin>,
) -> Result<tokio::fs::File, AppError> {
    let file = tempfile::tempfile()
        .map_err(|e| AppError::Internal(format!("failed to create spool file: {}", e)))?;
    let mut file = tokio::fs::File::from_std(file);

    tokio::io::copy(&mut reader, &mut file)
        .await
        .map_err(|e| AppError::StorageFailure(format!("failed to spool upload: {}", e)))?;

    file.seek(SeekFrom::Start(0))
        .await
        .map_err(|e| AppError::Internal(format!("failed to rewind spool file: {}", e)))?;

    Ok(file)
}
