//! External tool invocation.
//!
//! Frame extraction and duration probing both shell out to external codec
//! tooling. This module runs one command to completion, captures its output
//! for diagnostics, and maps failures into [`ToolError`]. Execution is bound
//! to a cancellation token so a caller-imposed deadline terminates the
//! subprocess instead of leaking it.

use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {status}: {output}")]
    Failed {
        program: String,
        status: i32,
        output: String,
    },

    #[error("{program} invocation was cancelled")]
    Cancelled { program: String },
}

/// Captured output of one completed invocation.
#[derive(Debug, Default, Clone)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn stdout_utf8(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Stderr followed by stdout, lossily decoded, for diagnostics.
    pub fn combined(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.stderr).into_owned();
        if !self.stdout.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&String::from_utf8_lossy(&self.stdout));
        }
        text
    }
}

/// Seam for subprocess execution so the extraction chain can be exercised
/// without real codec tooling installed.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run `program` with `args` to completion, bounded by `cancel`.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, ToolError>;
}

/// Production runner backed by `tokio::process`.
pub struct SystemToolRunner;

#[async_trait]
impl ToolRunner for SystemToolRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, ToolError> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future must not leave the subprocess running.
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::Spawn {
                program: program.to_string(),
                source: e,
            })?;

        let output = tokio::select! {
            result = child.wait_with_output() => result.map_err(|e| ToolError::Spawn {
                program: program.to_string(),
                source: e,
            })?,
            _ = cancel.cancelled() => {
                tracing::debug!(program = %program, "Tool invocation cancelled");
                return Err(ToolError::Cancelled {
                    program: program.to_string(),
                });
            }
        };

        let captured = ToolOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        };

        if !output.status.success() {
            let status = output.status.code().unwrap_or(-1);
            tracing::debug!(
                program = %program,
                status,
                output = %captured.combined(),
                "Tool exited with non-zero status"
            );
            return Err(ToolError::Failed {
                program: program.to_string(),
                status,
                output: captured.combined(),
            });
        }

        Ok(captured)
    }
}
