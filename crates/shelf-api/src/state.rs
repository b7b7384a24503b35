//! Application state wiring.

use std::sync::Arc;

use anyhow::{Context, Result};

use shelf_core::models::Principal;
use shelf_core::Config;
use shelf_thumbs::{SystemToolRunner, Thumbnailer};
use shelf_vfs::{FileSystem, LocalVfs, Vfs};

pub struct AppState {
    pub config: Config,
    pub fs: FileSystem,
    pub thumbnailer: Arc<Thumbnailer>,
    /// Principal installed for requests until an auth layer replaces it.
    pub root_principal: Principal,
}

impl AppState {
    pub async fn build(config: Config) -> Result<Arc<Self>> {
        let backend: Arc<dyn Vfs> = Arc::new(
            LocalVfs::new(config.storage_root.clone())
                .await
                .context("Failed to initialize storage backend")?,
        );

        let fs = FileSystem::new(
            backend.clone(),
            config.upload_task_workers,
            config.upload_task_queue_size,
        );

        let thumbnailer = Arc::new(Thumbnailer::new(
            backend,
            Arc::new(SystemToolRunner),
            config.thumbnails.clone(),
        ));

        Ok(Arc::new(AppState {
            config,
            fs,
            thumbnailer,
            root_principal: Principal::new("admin", "/"),
        }))
    }
}
