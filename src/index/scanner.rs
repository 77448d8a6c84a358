//! File scanner - reads container metadata through libavformat

use std::path::Path;

use ffmpeg_next as ffmpeg;

use super::{analyze_audio_stream, analyze_video_stream, ContainerInfo, MediaProbe, ProbedStream, StreamKind};
use crate::error::{MixError, Result};
use crate::ffmpeg_utils::helpers::{codec_name, container_duration_secs};

/// Probe backed by the linked libavformat.
///
/// Opening an input reads the header and, for formats without one, a short
/// probe window; packets are never decoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibavProbe;

impl MediaProbe for LibavProbe {
    fn probe(&self, path: &Path) -> Result<ContainerInfo> {
        scan_file(path)
    }
}

/// Scan a media file and extract its stream layout
pub fn scan_file<P: AsRef<Path>>(path: P) -> Result<ContainerInfo> {
    let path = path.as_ref().to_path_buf();

    if !path.is_file() {
        return Err(MixError::NotFound(path));
    }

    crate::ffmpeg_utils::init()?;

    let context = ffmpeg::format::input(&path).map_err(|e| {
        MixError::UnsupportedFormat(format!("Failed to open {:?}: {}", path, e))
    })?;

    let mut info = ContainerInfo {
        path: path.clone(),
        format_name: context.format().name().to_string(),
        duration_secs: container_duration_secs(&context),
        streams: Vec::new(),
    };

    for (i, stream) in context.streams().enumerate() {
        let medium = stream.parameters().medium();

        match medium {
            ffmpeg::media::Type::Video => match analyze_video_stream(&stream, i) {
                Some(video) => {
                    tracing::debug!(
                        "Found video stream {}: {}x{}, codec={}",
                        i,
                        video.width,
                        video.height,
                        video.codec_name
                    );
                    info.streams.push(video);
                }
                None => {
                    tracing::debug!("Skipping attached picture in stream {}", i);
                }
            },
            ffmpeg::media::Type::Audio => {
                let audio = analyze_audio_stream(&stream, i);
                tracing::debug!(
                    "Found audio stream {}: {}Hz, {} channels, codec={}",
                    i,
                    audio.sample_rate,
                    audio.channels,
                    audio.codec_name
                );
                info.streams.push(audio);
            }
            ffmpeg::media::Type::Subtitle => {
                info.streams.push(ProbedStream::new(
                    i,
                    StreamKind::Subtitle,
                    codec_name(stream.parameters().id()),
                ));
            }
            _ => {
                tracing::debug!("Stream {} (type={:?}) recorded as other", i, medium);
                info.streams.push(ProbedStream::new(
                    i,
                    StreamKind::Other,
                    codec_name(stream.parameters().id()),
                ));
            }
        }
    }

    tracing::debug!(
        "Probed {:?}: format={}, duration={:?}, video={}, audio={}",
        path,
        info.format_name,
        info.duration_secs,
        info.video_count(),
        info.audio_count()
    );

    Ok(info)
}
