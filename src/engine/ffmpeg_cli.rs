//! ffmpeg command-line engine

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use super::{EngineOutput, MediaEngine, RenderRequest};
use crate::config::EngineConfig;
use crate::error::{MixError, Result};

/// Diagnostics that mean the output could not be written, as opposed to
/// the input or codec setup being at fault.
const OUTPUT_WRITE_MARKERS: &[&str] = &["No space left on device", "Permission denied"];

/// Runs mix plans through the `ffmpeg` binary.
#[derive(Debug, Clone, Default)]
pub struct FfmpegCli {
    config: EngineConfig,
}

impl FfmpegCli {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the ffmpeg argument list for a request.
    ///
    /// The first video stream that is not an attached picture is
    /// stream-copied (`V` rather than `v` skips cover art), the plan's
    /// filter graph produces the only audio stream, and container metadata
    /// is carried over from the input.
    pub fn build_args(&self, request: &RenderRequest) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
            "-y".to_string(),
        ];

        args.push("-i".to_string());
        args.push(request.input_path.to_string_lossy().to_string());

        args.push("-filter_complex".to_string());
        args.push(request.plan.filter_graph());

        args.extend(["-map".to_string(), "0:V:0".to_string()]);
        args.extend(["-map".to_string(), format!("[{}]", request.plan.output_label())]);

        args.extend(["-c:v".to_string(), "copy".to_string()]);
        args.extend(["-c:a".to_string(), request.encoding.audio_codec.clone()]);
        if !request.encoding.audio_bitrate.is_empty() {
            args.extend(["-b:a".to_string(), request.encoding.audio_bitrate.clone()]);
        }

        args.extend(["-map_metadata".to_string(), "0".to_string()]);

        args.push(request.output_path.to_string_lossy().to_string());

        args
    }
}

impl MediaEngine for FfmpegCli {
    async fn run(
        &self,
        request: &RenderRequest,
        cancel: &CancellationToken,
    ) -> Result<EngineOutput> {
        let args = self.build_args(request);
        tracing::debug!(job_id = %request.job_id, "{} {:?}", self.config.ffmpeg_path, args);

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MixError::EngineUnavailable(format!(
                        "{} not found: {}",
                        self.config.ffmpeg_path, e
                    ))
                } else {
                    MixError::Io(e)
                }
            })?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| MixError::EngineUnavailable("stderr not captured".to_string()))?;
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await.map(|_| buf)
        });

        let status = tokio::select! {
            status = child.wait() => status?,
            _ = cancel.cancelled() => {
                tracing::info!(job_id = %request.job_id, "Cancelling engine process");
                return Err(stopped(child.kill().await, request));
            }
        };

        let stderr = stderr_task
            .await
            .map_err(|e| MixError::Io(std::io::Error::other(e)))??;
        let stderr = String::from_utf8_lossy(&stderr).into_owned();

        if !status.success() {
            return Err(classify_failure(status, stderr, &request.output_path));
        }

        Ok(EngineOutput { stderr })
    }
}

/// A cancelled run is reported as cancelled even when the kill fails;
/// `kill_on_drop` still reaps the child.
fn stopped(kill: std::io::Result<()>, request: &RenderRequest) -> MixError {
    if let Err(e) = kill {
        tracing::warn!(job_id = %request.job_id, "Failed to kill engine process: {}", e);
    }
    MixError::Cancelled
}

/// Map a failed ffmpeg exit to the error the caller sees.
pub fn classify_failure(status: ExitStatus, stderr: String, output_path: &Path) -> MixError {
    if OUTPUT_WRITE_MARKERS.iter().any(|m| stderr.contains(m)) {
        return MixError::OutputWrite {
            path: output_path.to_path_buf(),
            reason: stderr.trim().to_string(),
        };
    }

    MixError::EngineExecution {
        status: status.to_string(),
        stderr,
    }
}
