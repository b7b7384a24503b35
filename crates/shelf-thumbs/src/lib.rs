//! Shelf Thumbs Library
//!
//! Post-ingest thumbnail derivation for video objects: decide whether a
//! thumbnail is needed, extract a representative frame through an external
//! tool fallback chain, validate the result, and publish it back into the
//! virtual filesystem. Runs detached from the upload request that triggered
//! it; every outcome is terminal and logged, never surfaced to the uploader.

pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod tool;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export commonly used types
pub use error::ThumbnailError;
pub use extract::{ExtractionAttempt, FrameExtractor};
pub use orchestrator::{thumbnail_target, DeriveOutcome, Thumbnailer};
pub use tool::{SystemToolRunner, ToolError, ToolOutput, ToolRunner};
