//! Configuration file support
//!
//! Loads mixer configuration from TOML files. Every section and field is
//! optional; anything left out falls back to the `MixerConfig` defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{EncodingConfig, EngineConfig, MixerConfig, ValidationConfig};
use crate::error::{MixError, Result};

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Engine settings
    pub engine: Option<EngineSettings>,
    /// Encoding settings
    pub encoding: Option<EncodingSettings>,
    /// Validation settings
    pub validation: Option<ValidationSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Path or name of the ffmpeg binary
    pub ffmpeg_path: Option<String>,
    /// ffmpeg `-loglevel`
    pub log_level: Option<String>,
    /// Per-job timeout in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncodingSettings {
    /// Encoder for the mixed track
    pub audio_codec: Option<String>,
    /// Bitrate for the mixed track
    pub audio_bitrate: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Re-probe the output after mixing
    pub enabled: Option<bool>,
    /// Allowed duration drift in seconds
    pub duration_tolerance_secs: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Some("pretty".to_string()),
        }
    }
}

impl LoggingSettings {
    /// Whether JSON log lines were requested
    pub fn is_json(&self) -> bool {
        self.format.as_deref() == Some("json")
    }
}

impl ConfigFile {
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

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let defaults = MixerConfig::default();
        Self {
            engine: Some(EngineSettings {
                ffmpeg_path: Some(defaults.engine.ffmpeg_path),
                log_level: Some(defaults.engine.log_level),
                timeout_secs: defaults.engine.timeout_secs,
            }),
            encoding: Some(EncodingSettings {
                audio_codec: Some(defaults.encoding.audio_codec),
                audio_bitrate: Some(defaults.encoding.audio_bitrate),
            }),
            validation: Some(ValidationSettings {
                enabled: Some(defaults.validation.enabled),
                duration_tolerance_secs: Some(defaults.validation.duration_tolerance_secs),
            }),
            logging: Some(LoggingSettings::default()),
        }
    }

    /// Logging settings, defaulted when the section is absent
    pub fn logging(&self) -> LoggingSettings {
        self.logging.clone().unwrap_or_default()
    }

    /// Convert to MixerConfig
    pub fn into_mixer_config(self) -> MixerConfig {
        let engine_defaults = EngineConfig::default();
        let encoding_defaults = EncodingConfig::default();
        let validation_defaults = ValidationConfig::default();

        let engine = self.engine.unwrap_or_default();
        let encoding = self.encoding.unwrap_or_default();
        let validation = self.validation.unwrap_or_default();

        MixerConfig {
            engine: EngineConfig {
                ffmpeg_path: engine.ffmpeg_path.unwrap_or(engine_defaults.ffmpeg_path),
                log_level: engine.log_level.unwrap_or(engine_defaults.log_level),
                timeout_secs: engine.timeout_secs.or(engine_defaults.timeout_secs),
            },
            encoding: EncodingConfig {
                audio_codec: encoding.audio_codec.unwrap_or(encoding_defaults.audio_codec),
                audio_bitrate: encoding
                    .audio_bitrate
                    .unwrap_or(encoding_defaults.audio_bitrate),
            },
            validation: ValidationConfig {
                enabled: validation.enabled.unwrap_or(validation_defaults.enabled),
                duration_tolerance_secs: validation
                    .duration_tolerance_secs
                    .unwrap_or(validation_defaults.duration_tolerance_secs),
            },
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    ConfigFile::default_config().to_file(path)
}
