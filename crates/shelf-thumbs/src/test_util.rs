//! Shared test doubles for the derivation pipeline.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use shelf_core::models::ObjectMeta;
use shelf_core::paths;
use shelf_vfs::{UploadPayload, Vfs, VfsError, VfsResult};

use crate::tool::{ToolError, ToolOutput, ToolRunner};

/// A minimal but structurally valid WebP image, encoded in-process.
pub fn tiny_webp() -> Vec<u8> {
    let mut buf = Vec::new();
    let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut buf);
    let pixels = vec![128u8; 4 * 4 * 3];
    encoder
        .encode(&pixels, 4, 4, image::ExtendedColorType::Rgb8)
        .expect("encoding fixture webp");
    buf
}

/// Tool runner with scripted per-strategy behavior. Cover and offset ffmpeg
/// invocations are told apart by the presence of `-ss`; probe invocations by
/// the program name.
pub struct ScriptedRunner {
    duration: f64,
    probe_output: Option<String>,
    fail_cover: bool,
    fail_offset: bool,
    hang: bool,
    artifact: Vec<u8>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedRunner {
    pub fn succeeding(duration: f64) -> Self {
        Self {
            duration,
            probe_output: None,
            fail_cover: false,
            fail_offset: false,
            hang: false,
            artifact: tiny_webp(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_failing_cover(mut self) -> Self {
        self.fail_cover = true;
        self
    }

    pub fn with_failing_offset(mut self) -> Self {
        self.fail_offset = true;
        self
    }

    pub fn with_probe_output(mut self, output: &str) -> Self {
        self.probe_output = Some(output.to_string());
        self
    }

    /// Successful invocations write these bytes to the output path.
    pub fn with_artifact_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.artifact = bytes;
        self
    }

    /// Every invocation blocks until the token cancels.
    pub fn with_hang(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn failed(program: &str) -> ToolError {
        ToolError::Failed {
            program: program.to_string(),
            status: 1,
            output: "scripted failure".to_string(),
        }
    }
}

#[async_trait]
impl ToolRunner for ScriptedRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, ToolError> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));

        if self.hang {
            cancel.cancelled().await;
            return Err(ToolError::Cancelled {
                program: program.to_string(),
            });
        }

        if program.contains("ffprobe") {
            let stdout = self
                .probe_output
                .clone()
                .unwrap_or_else(|| format!("{}\n", self.duration));
            return Ok(ToolOutput {
                stdout: stdout.into_bytes(),
                stderr: Vec::new(),
            });
        }

        let is_offset = args.iter().any(|a| a == "-ss");
        if (is_offset && self.fail_offset) || (!is_offset && self.fail_cover) {
            return Err(Self::failed(program));
        }

        let output_path = args.last().expect("output path argument");
        std::fs::write(output_path, &self.artifact).expect("writing scripted artifact");
        Ok(ToolOutput::default())
    }
}

/// In-memory virtual filesystem recording directory creations and writes.
#[derive(Default)]
pub struct MemoryVfs {
    objects: Mutex<HashMap<String, ObjectMeta>>,
    data: Mutex<HashMap<String, Vec<u8>>>,
    dirs: Mutex<Vec<String>>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_file(&self, path: &str, size: u64, local_path: Option<PathBuf>) {
        let (_, name) = paths::split(path);
        self.objects.lock().unwrap().insert(
            path.to_string(),
            ObjectMeta {
                name,
                size,
                modified: Utc::now(),
                is_dir: false,
                local_path,
            },
        );
    }

    pub fn object_data(&self, path: &str) -> Option<Vec<u8>> {
        self.data.lock().unwrap().get(path).cloned()
    }

    pub fn created_dirs(&self) -> Vec<String> {
        self.dirs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Vfs for MemoryVfs {
    async fn get(&self, path: &str) -> VfsResult<ObjectMeta> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }

    async fn make_dir(&self, path: &str) -> VfsResult<()> {
        self.dirs.lock().unwrap().push(path.to_string());
        Ok(())
    }

    async fn put_directly(
        &self,
        dir: &str,
        mut payload: UploadPayload,
        _overwrite: bool,
    ) -> VfsResult<()> {
        let mut bytes = Vec::new();
        payload.reader.read_to_end(&mut bytes).await?;

        let target = paths::join(dir, &payload.descriptor.name);
        let meta = ObjectMeta {
            name: payload.descriptor.name.clone(),
            size: bytes.len() as u64,
            modified: payload.descriptor.modified,
            is_dir: false,
            local_path: None,
        };
        self.objects.lock().unwrap().insert(target.clone(), meta);
        self.data.lock().unwrap().insert(target, bytes);
        Ok(())
    }
}
