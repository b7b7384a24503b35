//! Multipart-form upload transport.
//!
//! `PUT /api/fs/form` carries the file content in the `file` field of a
//! `multipart/form-data` body; metadata still travels in headers. The part
//! is read to completion, then handed to the shared ingest path.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Extension, Json,
};

use shelf_core::models::Principal;
use shelf_core::AppError;

use super::{ingest, UploadResponse};
use crate::error::HttpAppError;
use crate::headers::UploadMeta;
use crate::state::AppState;

pub async fn upload_form(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let mut meta = UploadMeta::from_headers(&headers)?;

    let mut content: Option<(Vec<u8>, Option<String>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") && content.is_none() {
            let field_mime = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("failed to read file field: {}", e)))?;
            content = Some((bytes.to_vec(), field_mime));
        }
        // Remaining fields are read and discarded to finish the body.
    }

    let (data, field_mime) = content
        .ok_or_else(|| AppError::InvalidInput("missing file field in form".to_string()))?;

    // The request-level Content-Type is the multipart envelope; the file's
    // type comes from the part header, with extension guessing as fallback.
    meta.size = data.len() as u64;
    meta.mime_type = field_mime;

    let reader = Box::new(std::io::Cursor::new(data));
    let response = ingest(&state, &principal, meta, reader).await?;
    Ok(Json(response))
}
