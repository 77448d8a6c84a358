//! Mix orchestrator
//!
//! Runs one [`MixJob`] end to end: re-inspects the input, validates gains,
//! plans the graph, drives the engine, checks the result, and removes any
//! partial output when something goes wrong after the output was touched.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::audio_plan::plan_mix;
use crate::config::MixerConfig;
use crate::engine::{FfmpegCli, MediaEngine, RenderRequest};
use crate::error::{MixError, Result};
use crate::index::{ContainerInfo, LibavProbe, MediaProbe};
use crate::inspect::{describe_audio_streams, ensure_readable, Inspector};
use crate::types::{GainSpec, MixJob};

/// Mix `input_path` down with `gains` into `output_path` using the default
/// ffmpeg engine and configuration.
pub async fn mix(
    input_path: impl AsRef<Path>,
    gains: Vec<GainSpec>,
    output_path: impl AsRef<Path>,
) -> Result<PathBuf> {
    let job = MixJob::new(input_path, gains, output_path);
    Mixer::from_config(MixerConfig::default()).mix(&job).await
}

/// Orchestrates mix jobs over a media engine and a probe.
///
/// Holds no per-job state; one `Mixer` can run any number of jobs, and
/// concurrent jobs only need distinct output paths.
pub struct Mixer<E, P = LibavProbe> {
    engine: E,
    inspector: Inspector<P>,
    config: MixerConfig,
    cancel: CancellationToken,
}

impl Mixer<FfmpegCli, LibavProbe> {
    /// ffmpeg engine and libav probe, configured from `config`.
    pub fn from_config(config: MixerConfig) -> Self {
        let engine = FfmpegCli::new(config.engine.clone());
        Self::new(engine, LibavProbe, config)
    }
}

impl<E: MediaEngine, P: MediaProbe> Mixer<E, P> {
    pub fn new(engine: E, probe: P, config: MixerConfig) -> Self {
        Self {
            engine,
            inspector: Inspector::new(probe),
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` to cancel running jobs.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels every job this mixer is running.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Run one job. Returns the output path on success.
    pub async fn mix(&self, job: &MixJob) -> Result<PathBuf> {
        tracing::info!(
            job_id = %job.job_id,
            "Mixing {:?} -> {:?} with gains {:?}",
            job.input_path,
            job.output_path,
            job.gains.iter().map(|g| g.gain_percent).collect::<Vec<_>>()
        );

        let input_info = self.inspector.container(&job.input_path)?;
        let streams = describe_audio_streams(&input_info);
        if streams.is_empty() {
            return Err(MixError::NoAudioStreams(job.input_path.clone()));
        }
        if input_info.video_count() == 0 {
            return Err(MixError::UnsupportedFormat(format!(
                "{:?} has no video stream to carry over",
                job.input_path
            )));
        }

        let plan = plan_mix(&streams, &job.gains)?;
        tracing::debug!(job_id = %job.job_id, "Filter graph: {}", plan.filter_graph());

        prepare_output(&job.input_path, &job.output_path)?;
        let partial = PartialOutput::new(&job.output_path);

        let request = RenderRequest {
            job_id: job.job_id,
            input_path: job.input_path.clone(),
            output_path: job.output_path.clone(),
            plan,
            encoding: self.config.encoding.clone(),
        };

        match self.execute(&request, &input_info).await {
            Ok(()) => {
                partial.keep();
                tracing::info!(job_id = %job.job_id, "Mix finished: {:?}", job.output_path);
                Ok(job.output_path.clone())
            }
            Err(e) => {
                tracing::error!(job_id = %job.job_id, "Mix failed: {}", e);
                Err(e)
            }
        }
    }

    async fn execute(&self, request: &RenderRequest, input_info: &ContainerInfo) -> Result<()> {
        let token = self.cancel.child_token();
        let run = self.engine.run(request, &token);
        tokio::pin!(run);

        let output = match self.config.engine.timeout() {
            Some(limit) => {
                tokio::select! {
                    result = &mut run => result?,
                    _ = tokio::time::sleep(limit) => {
                        tracing::warn!("Engine exceeded {:?}, cancelling", limit);
                        token.cancel();
                        if let Err(e) = run.await {
                            tracing::debug!("Engine stopped: {}", e);
                        }
                        return Err(MixError::Cancelled);
                    }
                }
            }
            None => run.await?,
        };

        if !output.stderr.trim().is_empty() {
            tracing::debug!("Engine diagnostics: {}", output.stderr.trim());
        }

        if self.config.validation.enabled {
            self.validate_output(&request.output_path, input_info)?;
        }

        Ok(())
    }

    /// Check the rendered container has exactly one video and one audio
    /// stream, and that the video kept the input's duration.
    fn validate_output(&self, output_path: &Path, input_info: &ContainerInfo) -> Result<()> {
        let output_info = self
            .inspector
            .container(output_path)
            .map_err(|e| MixError::InvalidOutput(format!("cannot probe output: {}", e)))?;

        let (video, audio) = (output_info.video_count(), output_info.audio_count());
        if video != 1 || audio != 1 {
            return Err(MixError::InvalidOutput(format!(
                "expected 1 video and 1 audio stream, found {} video and {} audio",
                video, audio
            )));
        }

        if let Some((expected, actual)) = comparable_durations(input_info, &output_info) {
            let tolerance = self.config.validation.duration_tolerance_secs;
            if (expected - actual).abs() > tolerance {
                return Err(MixError::InvalidOutput(format!(
                    "duration {:.3}s differs from input {:.3}s",
                    actual, expected
                )));
            }
        }

        Ok(())
    }
}

/// Input and output durations of the same kind.
///
/// Video stream durations when both sides record one; container durations
/// when neither does. A mixed pair (e.g. MP4 in, Matroska out) is not
/// comparable, since the container duration also covers longer audio.
fn comparable_durations(input: &ContainerInfo, output: &ContainerInfo) -> Option<(f64, f64)> {
    let video = |info: &ContainerInfo| info.video_streams().next().and_then(|v| v.duration_secs);

    match (video(input), video(output)) {
        (Some(expected), Some(actual)) => Some((expected, actual)),
        (None, None) => input.duration_secs.zip(output.duration_secs),
        _ => None,
    }
}

/// Removes the output file when dropped, unless the job kept it.
///
/// Also covers callers that drop the `mix` future, e.g. an outer timeout.
struct PartialOutput<'a> {
    path: &'a Path,
    keep: bool,
}

impl<'a> PartialOutput<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, keep: false }
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for PartialOutput<'_> {
    fn drop(&mut self) {
        if !self.keep {
            remove_partial_output(self.path);
        }
    }
}

/// Confirm the input still exists and the output can be created.
fn prepare_output(input_path: &Path, output_path: &Path) -> Result<()> {
    ensure_readable(input_path)?;

    let output_write = |reason: String| MixError::OutputWrite {
        path: output_path.to_path_buf(),
        reason,
    };

    if is_same_file(input_path, output_path) {
        return Err(output_write("output path is the input file".to_string()));
    }

    match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            return Err(output_write(format!(
                "parent directory {:?} does not exist",
                parent
            )));
        }
        _ => {}
    }

    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(output_path)
        .map_err(|e| output_write(e.to_string()))?;

    Ok(())
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    matches!((a.canonicalize(), b.canonicalize()), (Ok(x), Ok(y)) if x == y)
}

/// Remove whatever is left at `path` after a failed job.
pub fn remove_partial_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed partial output {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove partial output {:?}: {}", path, e),
    }
}
