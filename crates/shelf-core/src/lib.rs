//! Shelf Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! path utilities shared across all Shelf components.

pub mod config;
pub mod error;
pub mod mime;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use config::{Config, ThumbnailConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{HashAlg, HashInfo, ObjectMeta, Principal, UploadDescriptor};
