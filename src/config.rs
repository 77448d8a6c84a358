//! Mixer configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{MixError, Result};

/// External engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path or name of the ffmpeg binary
    pub ffmpeg_path: String,

    /// Value passed to `-loglevel`; stderr at this level is surfaced on failure
    pub log_level: String,

    /// Optional wall-clock limit for a single mix, in seconds. Expiry is treated as cancellation.
    pub timeout_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            log_level: "error".to_string(),
            timeout_secs: None,
        }
    }
}

impl EngineConfig {
    /// Get the configured timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Encoding of the mixed audio track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Encoder name for the mixed track
    pub audio_codec: String,

    /// Audio bitrate, in the engine's notation (e.g. "192k")
    pub audio_bitrate: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
        }
    }
}

/// Post-mix output validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Re-probe the output after the engine exits
    pub enabled: bool,

    /// Allowed difference between input and output duration
    pub duration_tolerance_secs: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_tolerance_secs: 1.0,
        }
    }
}

/// Mixer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MixerConfig {
    /// Engine configuration
    pub engine: EngineConfig,

    /// Encoding configuration
    pub encoding: EncodingConfig,

    /// Validation configuration
    pub validation: ValidationConfig,
}

impl MixerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| MixError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| MixError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
