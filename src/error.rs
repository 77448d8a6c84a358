use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the mixdown core
#[derive(Error, Debug)]
pub enum MixError {
    /// The input path does not exist or cannot be read
    #[error("Input not found or unreadable: {}", .0.display())]
    NotFound(PathBuf),

    /// The container could not be parsed as a known media format
    #[error("Unsupported media format: {0}")]
    UnsupportedFormat(String),

    /// The container holds no audio streams, so there is nothing to mix
    #[error("No audio streams found in {}", .0.display())]
    NoAudioStreams(PathBuf),

    /// The supplied gains do not correspond one-to-one with the discovered streams
    #[error("Gain list does not match audio streams: {0}")]
    GainMismatch(String),

    /// A gain outside the allowed 0..=200 percent range
    #[error("Gain for stream {stream_index} is {gain_percent}%, expected 0-200%")]
    GainOutOfRange {
        stream_index: usize,
        gain_percent: u32,
    },

    /// The engine process exited unsuccessfully; `stderr` is its diagnostic output verbatim
    #[error("Engine exited with {status}: {stderr}")]
    EngineExecution { status: String, stderr: String },

    /// The engine binary could not be started
    #[error("Media engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The output path could not be created or written
    #[error("Cannot write output {}: {reason}", .path.display())]
    OutputWrite { path: PathBuf, reason: String },

    /// The job was cancelled or its timeout expired
    #[error("Mix job cancelled")]
    Cancelled,

    /// The engine reported success but the output does not have the expected shape
    #[error("Invalid output container: {0}")]
    InvalidOutput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error originating from the underlying FFmpeg library
    #[error("FFmpeg error: {0}")]
    Ffmpeg(#[from] FfmpegError),

    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// FFmpeg-specific errors
#[derive(Error, Debug)]
pub enum FfmpegError {
    /// Failure during global FFmpeg initialization
    #[error("FFmpeg initialization failed: {0}")]
    InitFailed(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_keeps_stderr_verbatim() {
        let err = MixError::EngineExecution {
            status: "exit status: 1".to_string(),
            stderr: "Invalid data found when processing input\n".to_string(),
        };
        assert!(err
            .to_string()
            .contains("Invalid data found when processing input\n"));
    }
}
