//! Upload metadata parsing.
//!
//! Both upload transports carry their metadata in request headers; this
//! module normalizes them into one [`UploadMeta`] so the handlers share a
//! single canonical ingest path.

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;

use shelf_core::models::{HashAlg, HashInfo};
use shelf_core::AppError;

pub const HEADER_FILE_PATH: &str = "File-Path";
pub const HEADER_AS_TASK: &str = "As-Task";
pub const HEADER_OVERWRITE: &str = "Overwrite";
pub const HEADER_LAST_MODIFIED: &str = "Last-Modified";
pub const HEADER_HASH_MD5: &str = "X-File-Md5";
pub const HEADER_HASH_SHA1: &str = "X-File-Sha1";
pub const HEADER_HASH_SHA256: &str = "X-File-Sha256";

/// Transport-independent upload metadata, parsed from request headers.
#[derive(Debug, Clone)]
pub struct UploadMeta {
    /// Client-supplied destination path, still unresolved.
    pub raw_path: String,
    pub as_task: bool,
    pub overwrite: bool,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub hashes: HashInfo,
    /// Client-declared MIME type; handlers fall back to extension guessing.
    pub mime_type: Option<String>,
}

impl UploadMeta {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        Ok(Self {
            raw_path: file_path(headers)?,
            as_task: header_str(headers, HEADER_AS_TASK) == Some("true"),
            // Overwrite defaults on; only the literal "false" disables it
            overwrite: header_str(headers, HEADER_OVERWRITE) != Some("false"),
            size: content_length(headers)?,
            modified: last_modified(headers),
            hashes: collect_hashes(headers),
            mime_type: header_str(headers, "Content-Type").map(str::to_string),
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Destination path from the percent-encoded `File-Path` header.
fn file_path(headers: &HeaderMap) -> Result<String, AppError> {
    let raw = header_str(headers, HEADER_FILE_PATH)
        .ok_or_else(|| AppError::InvalidInput(format!("missing {} header", HEADER_FILE_PATH)))?;

    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|e| AppError::InvalidInput(format!("invalid {} header: {}", HEADER_FILE_PATH, e)))?;

    Ok(decoded.into_owned())
}

fn content_length(headers: &HeaderMap) -> Result<u64, AppError> {
    match header_str(headers, "Content-Length") {
        None | Some("") => Ok(0),
        Some(value) => value
            .parse::<u64>()
            .map_err(|e| AppError::InvalidInput(format!("invalid Content-Length: {}", e))),
    }
}

/// `Last-Modified` as milliseconds since the epoch; anything unparseable
/// falls back to the current time.
fn last_modified(headers: &HeaderMap) -> DateTime<Utc> {
    header_str(headers, HEADER_LAST_MODIFIED)
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|millis| DateTime::from_timestamp_millis(millis))
        .unwrap_or_else(Utc::now)
}

fn collect_hashes(headers: &HeaderMap) -> HashInfo {
    let mut hashes = HashInfo::new();
    for (header, alg) in [
        (HEADER_HASH_MD5, HashAlg::Md5),
        (HEADER_HASH_SHA1, HashAlg::Sha1),
        (HEADER_HASH_SHA256, HashAlg::Sha256),
    ] {
        if let Some(value) = header_str(headers, header) {
            if !value.is_empty() {
                hashes.insert(alg, value.to_string());
            }
        }
    }
    hashes
}
