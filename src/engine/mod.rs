//! Media engine capability
//!
//! The orchestrator never spawns processes itself. It hands a
//! [`RenderRequest`] to a [`MediaEngine`], which renders the mixed container
//! and returns once the work has finished, failed or been cancelled.

pub mod ffmpeg_cli;

use std::future::Future;
use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::audio_plan::MixPlan;
use crate::config::EncodingConfig;
use crate::error::Result;

pub use ffmpeg_cli::FfmpegCli;

/// Everything an engine needs to render one mixdown
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub job_id: Uuid,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub plan: MixPlan,
    pub encoding: EncodingConfig,
}

/// Diagnostics from a successful engine run
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// Whatever the engine printed to its diagnostic stream
    pub stderr: String,
}

/// Renders a mix plan into an output container.
///
/// `run` must return `MixError::Cancelled` once `cancel` fires, after the
/// underlying work has stopped. Non-zero engine exits map to
/// `MixError::EngineExecution` with the engine's diagnostics verbatim.
pub trait MediaEngine: Send + Sync {
    fn run(
        &self,
        request: &RenderRequest,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<EngineOutput>> + Send;
}
