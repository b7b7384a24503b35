//! Configuration module
//!
//! This module provides the application configuration, loaded once at startup
//! from the environment. The thumbnail subset is snapshotted into
//! [`ThumbnailConfig`] and injected into the derivation pipeline so the core
//! never reads ambient global state.

use std::env;
use std::path::PathBuf;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_BODY_SIZE_MB: usize = 1024;
const UPLOAD_TASK_WORKERS: usize = 4;
const UPLOAD_TASK_QUEUE_SIZE: usize = 1000;
const THUMBNAIL_TIMEOUT_SECS: u64 = 120;
const THUMBNAIL_SEEK_PERCENT: f64 = 3.0;
const THUMBNAIL_SCALE_WIDTH: u32 = 320;

/// Thumbnail derivation configuration (frame extraction tooling).
#[derive(Clone, Debug)]
pub struct ThumbnailConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Upper bound on one whole derivation run, subprocesses included.
    pub timeout_secs: u64,
    /// Fallback seek offset as a percentage of the probed duration.
    pub seek_percent: f64,
    /// Width the fallback frame is scaled to (aspect ratio preserved).
    pub scale_width: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            timeout_secs: THUMBNAIL_TIMEOUT_SECS,
            seek_percent: THUMBNAIL_SEEK_PERCENT,
            scale_width: THUMBNAIL_SCALE_WIDTH,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    /// Root directory backing the virtual filesystem.
    pub storage_root: PathBuf,
    pub max_body_size_mb: usize,
    pub upload_task_workers: usize,
    pub upload_task_queue_size: usize,
    pub thumbnails: ThumbnailConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let storage_root = env::var("SHELF_ROOT").unwrap_or_else(|_| "./data".to_string());

        let thumbnails = ThumbnailConfig {
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            timeout_secs: env::var("THUMBNAIL_TIMEOUT_SECS")
                .unwrap_or_else(|_| THUMBNAIL_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(THUMBNAIL_TIMEOUT_SECS),
            seek_percent: env::var("THUMBNAIL_SEEK_PERCENT")
                .unwrap_or_else(|_| THUMBNAIL_SEEK_PERCENT.to_string())
                .parse()
                .unwrap_or(THUMBNAIL_SEEK_PERCENT),
            scale_width: env::var("THUMBNAIL_SCALE_WIDTH")
                .unwrap_or_else(|_| THUMBNAIL_SCALE_WIDTH.to_string())
                .parse()
                .unwrap_or(THUMBNAIL_SCALE_WIDTH),
        };

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            storage_root: PathBuf::from(storage_root),
            max_body_size_mb: env::var("MAX_BODY_SIZE_MB")
                .unwrap_or_else(|_| MAX_BODY_SIZE_MB.to_string())
                .parse()
                .unwrap_or(MAX_BODY_SIZE_MB),
            upload_task_workers: env::var("UPLOAD_TASK_WORKERS")
                .unwrap_or_else(|_| UPLOAD_TASK_WORKERS.to_string())
                .parse()
                .unwrap_or(UPLOAD_TASK_WORKERS),
            upload_task_queue_size: env::var("UPLOAD_TASK_QUEUE_SIZE")
                .unwrap_or_else(|_| UPLOAD_TASK_QUEUE_SIZE.to_string())
                .parse()
                .unwrap_or(UPLOAD_TASK_QUEUE_SIZE),
            thumbnails,
        })
    }

    pub fn max_body_size_bytes(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}
