//! FFmpeg module - libav access used for container probing
//!
//! This module handles:
//! - FFmpeg initialization
//! - Routing libav log output into `tracing`
//! - Safe accessors for codec parameters and stream metadata

pub mod helpers;

pub use ffmpeg_next as ffmpeg;

/// Initialize the FFmpeg library.
///
/// Safe to call more than once; the probe calls it before every open.
pub fn init() -> Result<(), crate::error::FfmpegError> {
    ffmpeg::init().map_err(|e| {
        crate::error::FfmpegError::InitFailed(format!("ffmpeg::init() failed: {}", e))
    })?;

    tracing::debug!("FFmpeg initialized");

    Ok(())
}

/// Install a libav log callback that forwards messages to `tracing`.
///
/// Must be called after `init()` and before any threads start probing,
/// because the log callback is global libav state.
pub fn install_log_filter() {
    // SAFETY: both functions modify global FFmpeg state and are called once at
    // startup, before any probing thread exists.
    unsafe {
        ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_WARNING as i32);
        ffmpeg_next::ffi::av_log_set_callback(Some(ffmpeg_log_callback));
    }
}

/// Probe-time messages that carry no information for a mix job.
const SUPPRESSED_MESSAGES: &[&str] = &[
    "Estimating duration from bitrate, this may be inaccurate",
    "Discarding ID3 tags because more suitable tags were found",
    "decoding for stream",
    "Could not find codec parameters for stream",
];

/// Whether a libav log line should be dropped.
pub fn is_suppressed(message: &str) -> bool {
    SUPPRESSED_MESSAGES.iter().any(|s| message.contains(s))
}

unsafe extern "C" fn ffmpeg_log_callback(
    avcl: *mut std::ffi::c_void,
    level: std::ffi::c_int,
    fmt: *const std::ffi::c_char,
    vl: ffmpeg_next::ffi::va_list,
) {
    use std::ffi::CStr;

    if level > unsafe { ffmpeg_next::ffi::av_log_get_level() } {
        return;
    }

    let mut buf = [0 as std::ffi::c_char; 1024];
    let mut print_prefix: std::ffi::c_int = 1;
    ffmpeg_next::ffi::av_log_format_line(
        avcl,
        level,
        fmt,
        vl,
        buf.as_mut_ptr(),
        buf.len() as std::ffi::c_int,
        &mut print_prefix,
    );

    let msg = CStr::from_ptr(buf.as_ptr()).to_string_lossy();
    let msg = msg.trim_end();

    if msg.is_empty() || is_suppressed(msg) {
        return;
    }

    if level <= ffmpeg_next::ffi::AV_LOG_ERROR as std::ffi::c_int {
        tracing::error!(target: "libav", "{}", msg);
    } else if level <= ffmpeg_next::ffi::AV_LOG_WARNING as std::ffi::c_int {
        tracing::warn!(target: "libav", "{}", msg);
    } else {
        tracing::debug!(target: "libav", "{}", msg);
    }
}

/// Get the version information of the linked FFmpeg libraries.
pub fn version_info() -> String {
    let version = unsafe { ffmpeg_next::ffi::avformat_version() };
    format!(
        "libavformat {}.{}.{}",
        version >> 16,
        (version >> 8) & 0xff,
        version & 0xff
    )
}
