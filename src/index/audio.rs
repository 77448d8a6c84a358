//! Audio stream analysis

use ffmpeg_next as ffmpeg;

use super::{ProbedStream, StreamKind};
use crate::ffmpeg_utils::helpers::{
    codec_name, codec_params_channel_layout, codec_params_channels, codec_params_sample_rate,
    stream_duration_secs, stream_language, stream_title,
};

/// Analyze an audio stream and extract metadata
pub fn analyze_audio_stream(stream: &ffmpeg::Stream, index: usize) -> ProbedStream {
    let params = stream.parameters();

    let mut info = ProbedStream::new(index, StreamKind::Audio, codec_name(params.id()));
    info.sample_rate = codec_params_sample_rate(&params);
    info.channels = codec_params_channels(&params);
    info.channel_layout = codec_params_channel_layout(&params);
    info.language = stream_language(stream);
    info.title = stream_title(stream);
    info.duration_secs = stream_duration_secs(stream);
    info
}

/// Engine layout name to use when the container does not name one.
pub fn default_layout_for_channels(channels: u16) -> String {
    match channels {
        1 => "mono".to_string(),
        2 => "stereo".to_string(),
        n => format!("{}c", n),
    }
}
