//! Raw-body upload transport.
//!
//! `PUT /api/fs/stream` carries the file content as the request body and all
//! metadata in headers. The body is wrapped into an async reader and handed
//! to the shared ingest path without buffering.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Extension, Json,
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

use shelf_core::models::Principal;

use super::{ingest, UploadResponse};
use crate::error::HttpAppError;
use crate::headers::UploadMeta;
use crate::state::AppState;

pub async fn upload_stream(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    request: Request,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let (parts, body) = request.into_parts();
    let meta = UploadMeta::from_headers(&parts.headers)?;

    let stream = body.into_data_stream().map_err(std::io::Error::other);
    let reader = Box::new(StreamReader::new(stream));

    let response = ingest(&state, &principal, meta, reader).await?;
    Ok(Json(response))
}
