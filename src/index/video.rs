//! Video stream analysis

use ffmpeg_next as ffmpeg;

use super::{ProbedStream, StreamKind};
use crate::ffmpeg_utils::helpers::{
    codec_name, codec_params_dimensions, is_attached_picture, stream_duration_secs,
    stream_language, stream_title,
};

/// Analyze a video stream and extract metadata.
///
/// Returns `None` for attached pictures (cover art), which are not
/// carried into the mixed output.
pub fn analyze_video_stream(stream: &ffmpeg::Stream, index: usize) -> Option<ProbedStream> {
    if is_attached_picture(stream) {
        return None;
    }

    let params = stream.parameters();

    let (width, height) = codec_params_dimensions(&params);

    let mut info = ProbedStream::new(index, StreamKind::Video, codec_name(params.id()));
    info.width = width;
    info.height = height;
    info.language = stream_language(stream);
    info.title = stream_title(stream);
    info.duration_secs = stream_duration_secs(stream);
    Some(info)
}
