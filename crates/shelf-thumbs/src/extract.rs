//! Extraction strategy chain.
//!
//! Ordered fallback for obtaining a representative frame: the embedded cover
//! frame first, then a frame seeked to a fixed percentage of the probed
//! duration. Many videos have no usable cover frame at position zero, so the
//! offset fallback is what makes derivation succeed for almost any decodable
//! input. Both strategies request the same WebP encoding so validation is
//! uniform.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use shelf_core::ThumbnailConfig;

use crate::error::ThumbnailError;
use crate::tool::{ToolError, ToolRunner};

const WEBP_QUALITY: &str = "80";
const WEBP_COMPRESSION_LEVEL: &str = "6";

/// Which strategy produced the frame, reported for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionAttempt {
    CoverFrame,
    OffsetFrame,
}

pub struct FrameExtractor {
    runner: Arc<dyn ToolRunner>,
    config: ThumbnailConfig,
}

impl FrameExtractor {
    pub fn new(runner: Arc<dyn ToolRunner>, config: ThumbnailConfig) -> Self {
        Self { runner, config }
    }

    /// Run the fallback chain against `video`, writing the frame to `output`.
    pub async fn extract_poster(
        &self,
        video: &Path,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<ExtractionAttempt, ThumbnailError> {
        match self.extract_cover(video, output, cancel).await {
            Ok(()) => return Ok(ExtractionAttempt::CoverFrame),
            Err(ToolError::Cancelled { .. }) => return Err(ThumbnailError::Cancelled),
            Err(e) => {
                tracing::debug!(
                    video = %video.display(),
                    error = %e,
                    "Cover frame extraction failed, trying offset frame"
                );
            }
        }

        self.extract_at_percentage(video, output, self.config.seek_percent, cancel)
            .await?;
        Ok(ExtractionAttempt::OffsetFrame)
    }

    /// Extract the embedded cover / first video frame.
    async fn extract_cover(
        &self,
        video: &Path,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        let args = vec![
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-map".to_string(),
            "0:v:0".to_string(),
            "-vframes".to_string(),
            "1".to_string(),
            "-c:v".to_string(),
            "libwebp".to_string(),
            "-q:v".to_string(),
            WEBP_QUALITY.to_string(),
            "-lossless".to_string(),
            "0".to_string(),
            "-compression_level".to_string(),
            WEBP_COMPRESSION_LEVEL.to_string(),
            "-preset".to_string(),
            "default".to_string(),
            "-y".to_string(),
            output.to_string_lossy().to_string(),
        ];

        self.runner
            .run(&self.config.ffmpeg_path, &args, cancel)
            .await
            .map(|_| ())
    }

    /// Probe the duration and extract a scaled frame at `percent` of it.
    async fn extract_at_percentage(
        &self,
        video: &Path,
        output: &Path,
        percent: f64,
        cancel: &CancellationToken,
    ) -> Result<(), ThumbnailError> {
        let duration = self.probe_duration(video, cancel).await?;

        let seek = duration * (percent / 100.0);
        let seek_str = format_timestamp(seek);

        let args = vec![
            "-ss".to_string(),
            seek_str.clone(),
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-vframes".to_string(),
            "1".to_string(),
            "-vf".to_string(),
            format!("scale={}:-1", self.config.scale_width),
            "-c:v".to_string(),
            "libwebp".to_string(),
            "-q:v".to_string(),
            WEBP_QUALITY.to_string(),
            "-lossless".to_string(),
            "0".to_string(),
            "-compression_level".to_string(),
            WEBP_COMPRESSION_LEVEL.to_string(),
            "-preset".to_string(),
            "default".to_string(),
            "-update".to_string(),
            "1".to_string(),
            "-y".to_string(),
            output.to_string_lossy().to_string(),
        ];

        tracing::debug!(video = %video.display(), seek = %seek_str, "Extracting offset frame");

        self.runner
            .run(&self.config.ffmpeg_path, &args, cancel)
            .await
            .map(|_| ())
            .map_err(map_tool_error)
    }

    /// Total duration of `video` in seconds.
    async fn probe_duration(
        &self,
        video: &Path,
        cancel: &CancellationToken,
    ) -> Result<f64, ThumbnailError> {
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            video.to_string_lossy().to_string(),
        ];

        let output = self
            .runner
            .run(&self.config.ffprobe_path, &args, cancel)
            .await
            .map_err(map_tool_error)?;

        let text = output.stdout_utf8();
        text.trim().parse::<f64>().map_err(|_| {
            ThumbnailError::ExtractionFailed(format!(
                "duration probe returned unparseable output: {:?}",
                text.trim()
            ))
        })
    }
}

fn map_tool_error(err: ToolError) -> ThumbnailError {
    match err {
        ToolError::Cancelled { .. } => ThumbnailError::Cancelled,
        other => ThumbnailError::ExtractionFailed(other.to_string()),
    }
}

/// Format a seek offset in seconds as `HH:MM:SS.mmm`.
pub(crate) fn format_timestamp(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as u64;
    let remaining = seconds - (hours as f64) * 3600.0;
    let minutes = (remaining / 60.0) as u64;
    let secs = remaining - (minutes as f64) * 60.0;
    format!("{:02}:{:02}:{:06.3}", hours, minutes, secs)
}
