//! The `FileSystem` facade: one entry point for ingress and derivation.
//!
//! Bundles a storage backend with the upload task queue so callers choose
//! between a synchronous direct write and an enqueued asynchronous one
//! without touching either mechanism directly.

use std::sync::Arc;

use crate::tasks::{TaskHandle, UploadTaskQueue};
use crate::traits::{UploadPayload, Vfs, VfsResult};

use shelf_core::models::ObjectMeta;

#[derive(Clone)]
pub struct FileSystem {
    backend: Arc<dyn Vfs>,
    tasks: Arc<UploadTaskQueue>,
}

impl FileSystem {
    pub fn new(backend: Arc<dyn Vfs>, task_workers: usize, task_queue_size: usize) -> Self {
        let tasks = Arc::new(UploadTaskQueue::new(
            backend.clone(),
            task_workers,
            task_queue_size,
        ));
        Self { backend, tasks }
    }

    /// The underlying backend, for collaborators that only read and publish
    /// (the thumbnail pipeline).
    pub fn backend(&self) -> Arc<dyn Vfs> {
        self.backend.clone()
    }

    pub async fn get(&self, path: &str) -> VfsResult<ObjectMeta> {
        self.backend.get(path).await
    }

    pub async fn make_dir(&self, path: &str) -> VfsResult<()> {
        self.backend.make_dir(path).await
    }

    pub async fn put_directly(
        &self,
        dir: &str,
        payload: UploadPayload,
        overwrite: bool,
    ) -> VfsResult<()> {
        self.backend.put_directly(dir, payload, overwrite).await
    }

    pub fn put_as_task(&self, dir: &str, payload: UploadPayload) -> VfsResult<TaskHandle> {
        self.tasks.submit(dir.to_string(), payload)
    }
}
