//! Safe wrappers around FFmpeg FFI calls.
//!
//! All `unsafe` needed to read codec parameters and stream metadata lives
//! here. Callers outside this module never write `unsafe`.

use ffmpeg_next as ffmpeg;

// ── Codec-parameter field accessors ─────────────────────────────────────────

/// Read `sample_rate` from an `AVCodecParameters` struct.
///
/// `ffmpeg-next` does not expose this field through a safe accessor.
pub fn codec_params_sample_rate(params: &ffmpeg::codec::parameters::Parameters) -> u32 {
    // SAFETY: `params.as_ptr()` returns a valid non-null pointer for the
    // lifetime of `params`.  `sample_rate` is a plain i32 field.
    let rate = unsafe { (*params.as_ptr()).sample_rate };
    rate.max(0) as u32
}

/// Read `ch_layout.nb_channels` from an `AVCodecParameters` struct.
pub fn codec_params_channels(params: &ffmpeg::codec::parameters::Parameters) -> u16 {
    // SAFETY: same as `codec_params_sample_rate`.
    let channels = unsafe { (*params.as_ptr()).ch_layout.nb_channels };
    channels.max(0) as u16
}

/// Read `width` and `height` from an `AVCodecParameters` struct.
pub fn codec_params_dimensions(params: &ffmpeg::codec::parameters::Parameters) -> (u32, u32) {
    // SAFETY: same as `codec_params_sample_rate`; both are plain i32 fields.
    let (width, height) = unsafe {
        let ptr = params.as_ptr();
        ((*ptr).width, (*ptr).height)
    };
    (width.max(0) as u32, height.max(0) as u32)
}

/// Describe the channel layout the way the engine names it ("stereo", "5.1(side)").
///
/// Returns `None` when the container leaves the channel order unspecified,
/// in which case only the channel count is known.
pub fn codec_params_channel_layout(
    params: &ffmpeg::codec::parameters::Parameters,
) -> Option<String> {
    use std::ffi::CStr;

    // SAFETY: `ch_layout` is embedded in the parameters struct and lives as
    // long as `params`.  `av_channel_layout_describe` writes at most
    // `buf.len()` bytes including the NUL terminator.
    unsafe {
        let layout = &(*params.as_ptr()).ch_layout;
        if layout.order == ffmpeg::ffi::AVChannelOrder::AV_CHANNEL_ORDER_UNSPEC
            || layout.nb_channels <= 0
        {
            return None;
        }

        let mut buf = [0 as std::ffi::c_char; 64];
        let ret = ffmpeg::ffi::av_channel_layout_describe(layout, buf.as_mut_ptr(), buf.len());
        if ret < 0 {
            return None;
        }

        let name = CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

/// Short codec name, or "unknown" when libav has no codec for the stream.
pub fn codec_name(codec_id: ffmpeg::codec::Id) -> String {
    if codec_id == ffmpeg::codec::Id::None {
        "unknown".to_string()
    } else {
        codec_id.name().to_string()
    }
}

// ── Stream accessors ────────────────────────────────────────────────────────

/// Extract language from stream metadata
pub fn stream_language(stream: &ffmpeg::Stream) -> Option<String> {
    stream
        .metadata()
        .get("language")
        .filter(|l| !l.is_empty() && *l != "und")
        .map(|s| s.to_string())
}

/// Get the title from stream metadata
pub fn stream_title(stream: &ffmpeg::Stream) -> Option<String> {
    stream
        .metadata()
        .get("title")
        .filter(|t| !t.is_empty())
        .map(|s| s.to_string())
}

/// Stream duration in seconds, if the container records one.
pub fn stream_duration_secs(stream: &ffmpeg::Stream) -> Option<f64> {
    let duration = stream.duration();
    // AV_NOPTS_VALUE in rust is i64::MIN
    if duration == i64::MIN || duration <= 0 {
        return None;
    }
    Some(pts_to_seconds(duration, stream.time_base()))
}

/// Whether the stream is embedded cover art rather than real video.
pub fn is_attached_picture(stream: &ffmpeg::Stream) -> bool {
    stream
        .disposition()
        .contains(ffmpeg::format::stream::Disposition::ATTACHED_PIC)
}

/// Container duration in seconds, if known.
pub fn container_duration_secs(context: &ffmpeg::format::context::Input) -> Option<f64> {
    let duration = context.duration();
    if duration == i64::MIN || duration <= 0 {
        return None;
    }
    Some(duration as f64 / ffmpeg::ffi::AV_TIME_BASE as f64)
}

/// Convert PTS to seconds using timebase
pub fn pts_to_seconds(pts: i64, timebase: ffmpeg::Rational) -> f64 {
    let num = timebase.numerator() as f64;
    let den = timebase.denominator() as f64;
    if den == 0.0 {
        return 0.0;
    }
    (pts as f64 * num) / den
}
