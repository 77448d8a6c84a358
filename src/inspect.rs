//! Stream inspector
//!
//! Turns a container's metadata into the ordered list of audio stream
//! descriptors that gain specs are addressed against.

use std::fs::File;
use std::path::Path;

use crate::error::{MixError, Result};
use crate::index::{ContainerInfo, LibavProbe, MediaProbe};
use crate::types::AudioStreamDescriptor;

/// Inspect a container with the libav-backed probe.
pub fn inspect(input_path: impl AsRef<Path>) -> Result<Vec<AudioStreamDescriptor>> {
    Inspector::new(LibavProbe).inspect(input_path.as_ref())
}

/// Probe a container and return its full stream layout.
pub fn inspect_container(input_path: impl AsRef<Path>) -> Result<ContainerInfo> {
    Inspector::new(LibavProbe).container(input_path.as_ref())
}

/// Stream inspector over any [`MediaProbe`].
#[derive(Debug, Clone)]
pub struct Inspector<P> {
    probe: P,
}

impl<P: MediaProbe> Inspector<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Audio streams of `input_path`, numbered in container order.
    pub fn inspect(&self, input_path: &Path) -> Result<Vec<AudioStreamDescriptor>> {
        let info = self.container(input_path)?;
        let streams = describe_audio_streams(&info);

        if streams.is_empty() {
            return Err(MixError::NoAudioStreams(input_path.to_path_buf()));
        }

        tracing::info!(
            "Inspected {:?}: {} audio stream(s)",
            input_path,
            streams.len()
        );

        Ok(streams)
    }

    /// Full container layout, after checking the path is readable.
    pub fn container(&self, input_path: &Path) -> Result<ContainerInfo> {
        ensure_readable(input_path)?;
        self.probe.probe(input_path)
    }
}

/// Fail with `NotFound` unless `path` is a regular file we can open.
pub fn ensure_readable(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(MixError::NotFound(path.to_path_buf()));
    }
    File::open(path).map_err(|_| MixError::NotFound(path.to_path_buf()))?;
    Ok(())
}

/// Build descriptors for the audio streams of a probed container.
pub fn describe_audio_streams(info: &ContainerInfo) -> Vec<AudioStreamDescriptor> {
    info.audio_streams()
        .enumerate()
        .map(|(index, stream)| {
            if stream.sample_rate == 0 || stream.channels == 0 {
                tracing::warn!(
                    "Audio stream {} (container stream {}) reports {}Hz / {} channels",
                    index,
                    stream.container_index,
                    stream.sample_rate,
                    stream.channels
                );
            }

            AudioStreamDescriptor {
                index,
                channel_count: stream.channels,
                sample_rate: stream.sample_rate,
                codec_name: stream.codec_name.clone(),
                container_index: stream.container_index,
                channel_layout: stream.channel_layout.clone(),
                language: stream.language.clone(),
                title: stream.title.clone(),
                duration_secs: stream.duration_secs,
            }
        })
        .collect()
}
