//! Mix planner - decides how each stream is scaled and summed

use std::collections::HashSet;
use std::fmt::Write;
use std::path::PathBuf;

use crate::error::{MixError, Result};
use crate::index::audio::default_layout_for_channels;
use crate::types::{AudioStreamDescriptor, GainSpec, MAX_GAIN_PERCENT};

/// Label of the single mixed audio stream in the filter graph
pub const MIX_OUTPUT_LABEL: &str = "aout";

/// Sample format every stream is converted to before summation
pub const MIX_SAMPLE_FORMAT: &str = "fltp";

/// Common format all streams are brought to before they are summed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixTarget {
    pub sample_rate: u32,
    pub channel_layout: String,
}

impl MixTarget {
    /// The first stream's rate and layout.
    ///
    /// An empty list is `NoAudioStreams`; the planner never sees the file path.
    pub fn from_first_stream(streams: &[AudioStreamDescriptor]) -> Result<Self> {
        let first = streams
            .first()
            .ok_or_else(|| MixError::NoAudioStreams(PathBuf::new()))?;

        if first.sample_rate == 0 || first.channel_count == 0 {
            return Err(MixError::UnsupportedFormat(format!(
                "audio stream 0 ({}) has no usable sample rate or channel layout",
                first.codec_name
            )));
        }

        let channel_layout = first
            .channel_layout
            .clone()
            .unwrap_or_else(|| default_layout_for_channels(first.channel_count));

        Ok(Self {
            sample_rate: first.sample_rate,
            channel_layout,
        })
    }
}

/// Scaling chain for one input stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChain {
    pub stream_index: usize,
    pub multiplier: f64,
    /// Whether the stream must be resampled or remapped to reach the target
    pub needs_conversion: bool,
}

impl StreamChain {
    /// Input pad, addressing the stream by its audio-relative index
    pub fn input_label(&self) -> String {
        format!("0:a:{}", self.stream_index)
    }

    pub fn output_label(&self) -> String {
        format!("a{}", self.stream_index)
    }
}

/// Complete plan for one mixdown
#[derive(Debug, Clone, PartialEq)]
pub struct MixPlan {
    pub target: MixTarget,
    pub chains: Vec<StreamChain>,
}

impl MixPlan {
    /// Whether a summing stage is needed (more than one input stream)
    pub fn has_summing_stage(&self) -> bool {
        self.chains.len() > 1
    }

    pub fn output_label(&self) -> &'static str {
        MIX_OUTPUT_LABEL
    }

    /// Render the plan as a `-filter_complex` graph.
    ///
    /// Each stream is resampled and remapped to the target, then scaled.
    /// Multiple streams are summed by `amix` with normalisation disabled,
    /// so the result is the plain sum of the scaled streams.
    pub fn filter_graph(&self) -> String {
        let mut graph = String::new();
        let single = !self.has_summing_stage();

        for chain in &self.chains {
            let out = if single {
                MIX_OUTPUT_LABEL.to_string()
            } else {
                chain.output_label()
            };
            let _ = write!(
                graph,
                "[{input}]aresample={rate},aformat=sample_fmts={fmt}:sample_rates={rate}:channel_layouts={layout},volume={gain:.2}:precision=float[{out}];",
                input = chain.input_label(),
                rate = self.target.sample_rate,
                fmt = MIX_SAMPLE_FORMAT,
                layout = self.target.channel_layout,
                gain = chain.multiplier,
                out = out,
            );
        }

        if single {
            graph.pop();
            return graph;
        }

        for chain in &self.chains {
            let _ = write!(graph, "[{}]", chain.output_label());
        }
        let _ = write!(
            graph,
            "amix=inputs={}:duration=longest:dropout_transition=0:normalize=0[{}]",
            self.chains.len(),
            MIX_OUTPUT_LABEL
        );

        graph
    }
}

/// Check that `gains` addresses streams `0..stream_count` exactly once, in order,
/// with every gain inside 0..=200%.
pub fn validate_gains(gains: &[GainSpec], stream_count: usize) -> Result<()> {
    if gains.len() != stream_count {
        return Err(MixError::GainMismatch(format!(
            "{} gain(s) supplied for {} audio stream(s)",
            gains.len(),
            stream_count
        )));
    }

    let mut seen = HashSet::with_capacity(gains.len());
    for (position, gain) in gains.iter().enumerate() {
        if gain.stream_index >= stream_count {
            return Err(MixError::GainMismatch(format!(
                "stream index {} is out of range 0..={}",
                gain.stream_index,
                stream_count.saturating_sub(1)
            )));
        }
        if !seen.insert(gain.stream_index) {
            return Err(MixError::GainMismatch(format!(
                "duplicate gain for stream {}",
                gain.stream_index
            )));
        }
        if gain.stream_index != position {
            return Err(MixError::GainMismatch(format!(
                "gain at position {} addresses stream {}",
                position, gain.stream_index
            )));
        }
    }

    if let Some(gain) = gains.iter().find(|g| g.gain_percent > MAX_GAIN_PERCENT) {
        return Err(MixError::GainOutOfRange {
            stream_index: gain.stream_index,
            gain_percent: gain.gain_percent,
        });
    }

    Ok(())
}

/// Plan the mixdown of `streams` with `gains`.
pub fn plan_mix(streams: &[AudioStreamDescriptor], gains: &[GainSpec]) -> Result<MixPlan> {
    validate_gains(gains, streams.len())?;
    let target = MixTarget::from_first_stream(streams)?;

    let chains = streams
        .iter()
        .zip(gains)
        .map(|(stream, gain)| {
            let layout = stream
                .channel_layout
                .clone()
                .unwrap_or_else(|| default_layout_for_channels(stream.channel_count));
            let needs_conversion =
                stream.sample_rate != target.sample_rate || layout != target.channel_layout;
            if needs_conversion {
                tracing::debug!(
                    "Stream {} ({}Hz, {}) converted to {}Hz, {}",
                    stream.index,
                    stream.sample_rate,
                    layout,
                    target.sample_rate,
                    target.channel_layout
                );
            }
            StreamChain {
                stream_index: stream.index,
                multiplier: gain.multiplier(),
                needs_conversion,
            }
        })
        .collect();

    Ok(MixPlan { target, chains })
}
