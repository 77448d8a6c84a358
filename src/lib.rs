//! Audio mixdown core
//!
//! Mixes the audio streams of a video container down to a single track with
//! an independent gain per stream, stream-copying the video:
//! - [`inspect`] lists the audio streams a container holds
//! - [`mix`] / [`Mixer`] scale, sum and re-mux them through ffmpeg

pub mod audio_plan;
pub mod config;
pub mod config_file;
pub mod engine;
pub mod error;
pub mod ffmpeg_utils;
pub mod index;
pub mod inspect;
pub mod mixer;
pub mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use config::MixerConfig;
pub use engine::{FfmpegCli, MediaEngine, RenderRequest};
pub use error::{FfmpegError, MixError, Result};
pub use ffmpeg_utils::version_info as ffmpeg_version_info;
pub use ffmpeg_utils::{init, install_log_filter};
pub use inspect::{inspect, inspect_container, Inspector};
pub use mixer::{mix, Mixer};
pub use types::{AudioStreamDescriptor, GainSpec, MixJob};
pub use tokio_util::sync::CancellationToken;
