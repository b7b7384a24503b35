//! Shelf VFS Library
//!
//! This crate provides the virtual-filesystem abstraction and its local
//! backend. It includes the `Vfs` trait, the `LocalVfs` implementation, the
//! background upload task queue, and the `FileSystem` facade the API wires
//! together.
//!
//! # Virtual paths
//!
//! All paths crossing this boundary are rooted, `/`-separated virtual paths.
//! They must normalize cleanly (no `..` escaping the root); backends reject
//! anything that resolves outside their storage root.

pub mod fs;
pub mod local;
pub mod tasks;
pub mod traits;

// Re-export commonly used types
pub use fs::FileSystem;
pub use local::LocalVfs;
pub use tasks::{TaskHandle, UploadTaskQueue};
pub use traits::{UploadPayload, Vfs, VfsError, VfsResult};
