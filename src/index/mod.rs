//! Container probing module
//!
//! This module reads container metadata without decoding payload:
//! - Audio stream detection (codec, sample rate, channels, layout, language)
//! - Video stream detection (codec, dimensions), excluding cover art
//! - Container format name and duration
//!
//! The [`MediaProbe`] trait is the seam the inspector and the output
//! validator probe through, so both can run against a substitute in tests.

pub mod audio;
pub mod scanner;
pub mod video;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use audio::analyze_audio_stream;
pub use scanner::LibavProbe;
pub use video::analyze_video_stream;

/// Kind of a stream inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Other,
}

/// Metadata of one stream, as read from the container header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbedStream {
    pub container_index: usize,
    pub kind: StreamKind,
    pub codec_name: String,
    pub channels: u16,
    pub sample_rate: u32,
    pub channel_layout: Option<String>,
    pub width: u32,
    pub height: u32,
    pub language: Option<String>,
    pub title: Option<String>,
    pub duration_secs: Option<f64>,
}

impl ProbedStream {
    /// A stream of the given kind with every optional field unset.
    pub fn new(container_index: usize, kind: StreamKind, codec_name: impl Into<String>) -> Self {
        Self {
            container_index,
            kind,
            codec_name: codec_name.into(),
            channels: 0,
            sample_rate: 0,
            channel_layout: None,
            width: 0,
            height: 0,
            language: None,
            title: None,
            duration_secs: None,
        }
    }
}

/// Metadata of a whole container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub path: PathBuf,
    pub format_name: String,
    pub duration_secs: Option<f64>,
    pub streams: Vec<ProbedStream>,
}

impl ContainerInfo {
    /// Audio streams in container order
    pub fn audio_streams(&self) -> impl Iterator<Item = &ProbedStream> {
        self.streams_of(StreamKind::Audio)
    }

    /// Video streams in container order
    pub fn video_streams(&self) -> impl Iterator<Item = &ProbedStream> {
        self.streams_of(StreamKind::Video)
    }

    pub fn audio_count(&self) -> usize {
        self.audio_streams().count()
    }

    pub fn video_count(&self) -> usize {
        self.video_streams().count()
    }

    fn streams_of(&self, kind: StreamKind) -> impl Iterator<Item = &ProbedStream> {
        self.streams.iter().filter(move |s| s.kind == kind)
    }
}

/// Reads container metadata.
///
/// Implementations must not decode payload or modify the file.
pub trait MediaProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<ContainerInfo>;
}
