//! Request/response data passed between the caller and the core.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Highest gain a caller may request, in percent.
pub const MAX_GAIN_PERCENT: u32 = 200;

/// Gain that leaves a stream unchanged, in percent.
pub const UNITY_GAIN_PERCENT: u32 = 100;

/// One audio stream of a container, as discovered by the inspector.
///
/// `index` is the stream's position among the container's audio streams and
/// is the address every [`GainSpec`] refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStreamDescriptor {
    pub index: usize,
    pub channel_count: u16,
    pub sample_rate: u32,
    pub codec_name: String,
    /// Absolute stream index in the container (counts video/subtitle streams too)
    pub container_index: usize,
    /// Engine channel layout name, e.g. "stereo" or "5.1"
    pub channel_layout: Option<String>,
    pub language: Option<String>,
    pub title: Option<String>,
    pub duration_secs: Option<f64>,
}

impl AudioStreamDescriptor {
    /// Human-readable label for a gain control.
    pub fn display_name(&self) -> String {
        let mut parts = vec![format!("Stream {}", self.index)];

        if let Some(title) = &self.title {
            parts.push(format!("({})", title));
        }
        if let Some(language) = &self.language {
            parts.push(format!("[{}]", language.to_uppercase()));
        }

        parts.push(format!("- {}", self.codec_name.to_uppercase()));
        parts.push(format!("{}ch", self.channel_count));

        if self.sample_rate > 0 {
            parts.push(format!("@ {}kHz", self.sample_rate / 1000));
        }

        parts.join(" ")
    }
}

/// Gain for one audio stream, in percent of the original amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GainSpec {
    pub stream_index: usize,
    pub gain_percent: u32,
}

impl GainSpec {
    pub fn new(stream_index: usize, gain_percent: u32) -> Self {
        Self {
            stream_index,
            gain_percent,
        }
    }

    /// A gain that passes the stream through at its original level.
    pub fn unity(stream_index: usize) -> Self {
        Self::new(stream_index, UNITY_GAIN_PERCENT)
    }

    /// Linear amplitude multiplier (100% -> 1.0).
    pub fn multiplier(&self) -> f64 {
        self.gain_percent as f64 / 100.0
    }

    /// Build positional gains from a plain list of percentages.
    pub fn from_percentages(percentages: &[u32]) -> Vec<GainSpec> {
        percentages
            .iter()
            .enumerate()
            .map(|(i, &pct)| GainSpec::new(i, pct))
            .collect()
    }
}

/// A single mix request. Owned by one orchestrator call and never persisted.
#[derive(Debug, Clone)]
pub struct MixJob {
    /// Correlates log lines for this job
    pub job_id: Uuid,
    pub input_path: PathBuf,
    pub gains: Vec<GainSpec>,
    pub output_path: PathBuf,
}

impl MixJob {
    pub fn new(
        input_path: impl AsRef<Path>,
        gains: Vec<GainSpec>,
        output_path: impl AsRef<Path>,
    ) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            input_path: input_path.as_ref().to_path_buf(),
            gains,
            output_path: output_path.as_ref().to_path_buf(),
        }
    }

    /// A job that mixes every stream at 100%.
    pub fn with_unity_gains(
        input_path: impl AsRef<Path>,
        streams: &[AudioStreamDescriptor],
        output_path: impl AsRef<Path>,
    ) -> Self {
        let gains = streams.iter().map(|s| GainSpec::unity(s.index)).collect();
        Self::new(input_path, gains, output_path)
    }
}
