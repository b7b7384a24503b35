//! Artifact validation.
//!
//! A staged frame is never exposed to storage until it has passed here: the
//! file must be non-empty and decode as a structurally valid WebP image.

use std::path::Path;

use image::ImageFormat;

use crate::error::ThumbnailError;

/// Validate a staged thumbnail artifact on local disk.
pub async fn validate_webp(path: &Path) -> Result<(), ThumbnailError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| ThumbnailError::CorruptArtifact(format!("failed to stat artifact: {}", e)))?;

    if meta.len() == 0 {
        return Err(ThumbnailError::EmptyArtifact);
    }

    let data = tokio::fs::read(path)
        .await
        .map_err(|e| ThumbnailError::CorruptArtifact(format!("failed to read artifact: {}", e)))?;

    image::load_from_memory_with_format(&data, ImageFormat::WebP)
        .map_err(|e| ThumbnailError::CorruptArtifact(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::tiny_webp;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rejects_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.webp");
        std::fs::write(&path, b"").unwrap();

        let result = validate_webp(&path).await;
        assert!(matches!(result, Err(ThumbnailError::EmptyArtifact)));
    }

    #[tokio::test]
    async fn test_rejects_non_image_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.webp");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let result = validate_webp(&path).await;
        assert!(matches!(result, Err(ThumbnailError::CorruptArtifact(_))));
    }

    #[tokio::test]
    async fn test_rejects_missing_file() {
        let dir = tempdir().unwrap();
        let result = validate_webp(&dir.path().join("nope.webp")).await;
        assert!(matches!(result, Err(ThumbnailError::CorruptArtifact(_))));
    }

    #[tokio::test]
    async fn test_accepts_valid_webp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ok.webp");
        std::fs::write(&path, tiny_webp()).unwrap();

        validate_webp(&path).await.unwrap();
    }
}
