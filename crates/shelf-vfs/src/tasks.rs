//! Background upload task queue.
//!
//! Task-based uploads are accepted immediately and executed by a bounded
//! worker pool. The caller gets a [`TaskHandle`] back; the write itself runs
//! detached from the request that enqueued it.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use uuid::Uuid;

use shelf_core::paths;

use crate::traits::{UploadPayload, Vfs, VfsError, VfsResult};

/// Handle to an enqueued upload, surfaced to the submitting client.
#[derive(Debug, Clone, Serialize)]
pub struct TaskHandle {
    pub id: Uuid,
    pub name: String,
}

struct UploadJob {
    handle: TaskHandle,
    dir: String,
    payload: UploadPayload,
}

/// Bounded queue executing enqueued writes through the backend write path.
pub struct UploadTaskQueue {
    tx: mpsc::Sender<UploadJob>,
}

impl UploadTaskQueue {
    /// Create a queue draining into `backend` with at most `max_concurrent`
    /// writes in flight. `queue_size` bounds the backlog; a full queue
    /// rejects new submissions instead of blocking the request handler.
    pub fn new(backend: Arc<dyn Vfs>, max_concurrent: usize, queue_size: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_size.max(1));

        tokio::spawn(Self::worker_pool(rx, backend, max_concurrent.max(1)));

        tracing::info!(
            queue_size = queue_size.max(1),
            max_concurrent = max_concurrent.max(1),
            "Upload task queue initialized"
        );

        Self { tx }
    }

    async fn worker_pool(
        mut rx: mpsc::Receiver<UploadJob>,
        backend: Arc<dyn Vfs>,
        max_concurrent: usize,
    ) {
        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        while let Some(job) = rx.recv().await {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let backend = backend.clone();

            tokio::spawn(async move {
                let _permit = permit;
                let task_id = job.handle.id;
                match backend.put_directly(&job.dir, job.payload, true).await {
                    Ok(()) => {
                        tracing::info!(task_id = %task_id, task = %job.handle.name, "Upload task completed");
                    }
                    Err(e) => {
                        tracing::error!(task_id = %task_id, task = %job.handle.name, error = %e, "Upload task failed");
                    }
                }
            });
        }
    }

    /// Enqueue one write. Fails fast with `QueueFull` when the backlog bound
    /// is hit.
    pub fn submit(&self, dir: String, payload: UploadPayload) -> VfsResult<TaskHandle> {
        let target = paths::join(&dir, &payload.descriptor.name);
        let handle = TaskHandle {
            id: Uuid::new_v4(),
            name: format!("upload {}", target),
        };

        tracing::info!(task_id = %handle.id, path = %target, "Enqueuing upload task");

        let job = UploadJob {
            handle: handle.clone(),
            dir,
            payload,
        };

        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!("Upload task queue is full, rejecting task");
                VfsError::QueueFull
            }
            mpsc::error::TrySendError::Closed(_) => {
                VfsError::Backend("Upload task queue is shut down".to_string())
            }
        })?;

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalVfs;
    use chrono::Utc;
    use shelf_core::models::{HashInfo, UploadDescriptor};
    use std::time::Duration;
    use tempfile::tempdir;

    fn payload(name: &str, data: &[u8]) -> UploadPayload {
        UploadPayload::new(
            UploadDescriptor {
                name: name.to_string(),
                size: data.len() as u64,
                modified: Utc::now(),
                mime_type: "application/octet-stream".to_string(),
                hashes: HashInfo::new(),
            },
            std::io::Cursor::new(data.to_vec()),
        )
    }

    #[tokio::test]
    async fn test_submitted_task_eventually_writes() {
        let dir = tempdir().unwrap();
        let backend: Arc<dyn Vfs> = Arc::new(LocalVfs::new(dir.path()).await.unwrap());
        let queue = UploadTaskQueue::new(backend.clone(), 2, 16);

        let handle = queue
            .submit("/inbox".to_string(), payload("a.bin", b"queued"))
            .unwrap();
        assert!(handle.name.contains("/inbox/a.bin"));

        // Poll until the detached worker has published the object.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            if let Ok(meta) = backend.get("/inbox/a.bin").await {
                assert_eq!(meta.size, 6);
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "task never completed");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Backend whose writes never finish, for exercising backpressure.
    struct StalledVfs;

    #[async_trait::async_trait]
    impl Vfs for StalledVfs {
        async fn get(&self, path: &str) -> VfsResult<shelf_core::models::ObjectMeta> {
            Err(VfsError::NotFound(path.to_string()))
        }

        async fn make_dir(&self, _path: &str) -> VfsResult<()> {
            Ok(())
        }

        async fn put_directly(
            &self,
            _dir: &str,
            _payload: UploadPayload,
            _overwrite: bool,
        ) -> VfsResult<()> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_full_queue_rejects() {
        let backend: Arc<dyn Vfs> = Arc::new(StalledVfs);
        let queue = UploadTaskQueue::new(backend, 1, 1);

        // The single worker slot and the single queue slot both fill with
        // stalled writes; a bounded number of submissions must hit QueueFull.
        let mut saw_full = false;
        for i in 0..64 {
            let name = format!("f{}.bin", i);
            match queue.submit("/".to_string(), payload(&name, b"x")) {
                Ok(_) => tokio::task::yield_now().await,
                Err(VfsError::QueueFull) => {
                    saw_full = true;
                    break;
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert!(saw_full, "queue never reported backpressure");
    }
}
