//! Error types module
//!
//! This module provides the core error types used throughout the Shelf
//! application. Ingest-path errors are unified under the `AppError` enum,
//! which can represent permission, conflict, storage, and input errors.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like conflicts
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PERMISSION_DENIED")
    fn error_code(&self) -> &'static str;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Storage error: {0}")]
    StorageFailure(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, log_level).
/// Client_message stays per-variant for dynamic content.
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, LogLevel) {
    match err {
        AppError::PermissionDenied(_) => (403, "PERMISSION_DENIED", LogLevel::Debug),
        AppError::AlreadyExists(_) => (403, "ALREADY_EXISTS", LogLevel::Debug),
        AppError::StorageFailure(_) => (500, "STORAGE_ERROR", LogLevel::Error),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", LogLevel::Debug),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::PermissionDenied(ref msg) => format!("Permission denied: {}", msg),
            AppError::AlreadyExists(_) => "file exists".to_string(),
            AppError::StorageFailure(_) => "Failed to access storage".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
