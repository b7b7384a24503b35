//! MIME type guessing for clients that omit `Content-Type`.

/// Guess a MIME type from a file name's extension.
///
/// Falls back to `application/octet-stream` for unknown extensions, which
/// keeps header-less uploads storable while excluding them from media
/// post-processing.
pub fn guess_mime_type(filename: &str) -> &'static str {
    let extension = crate::paths::extension(filename).unwrap_or_default();

    match extension.as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        // Videos
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "m4v" => "video/x-m4v",
        "ts" => "video/mp2t",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        // Documents
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",
        _ => "application/octet-stream",
    }
}

/// Whether a MIME type denotes video content eligible for thumbnail derivation.
pub fn is_video(mime_type: &str) -> bool {
    mime_type.starts_with("video/")
}
