//! Audio Mixdown
//!
//! Command-line front end: lists the audio streams of a video file and mixes
//! them down to one track with per-stream gains.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audio_mixdown::config_file::{generate_default_config, ConfigFile, LoggingSettings};
use audio_mixdown::{
    inspect, inspect_container, GainSpec, MixError, MixJob, Mixer, MixerConfig, Result,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "audio-mixdown";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML); defaults are used when it does not exist
    #[arg(short, long, default_value = "audio-mixdown.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the audio streams of a container
    Inspect {
        input: PathBuf,
        /// Print JSON instead of one line per stream
        #[arg(long)]
        json: bool,
        /// Include every stream of the container, not only audio
        #[arg(long)]
        all: bool,
    },
    /// Mix all audio streams into one track, copying the video
    Mix {
        input: PathBuf,
        output: PathBuf,
        /// Gain in percent (0-200), one per audio stream in order; all 100 when omitted
        #[arg(short, long = "gain", value_parser = clap::value_parser!(u32).range(0..=200))]
        gains: Vec<u32>,
    },
    /// Write a configuration file with default values
    InitConfig { path: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config_file = load_config_file(&args.config);
    init_logging(&config_file.logging());

    tracing::info!("{} v{} starting", APP_NAME, VERSION);

    if let Err(e) = audio_mixdown::init() {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }
    audio_mixdown::install_log_filter();
    tracing::debug!("FFmpeg version: {}", audio_mixdown::ffmpeg_version_info());

    let config = config_file.into_mixer_config();
    tracing::debug!("Configuration loaded: {:?}", config);

    match run(args.command, config, &args.config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: MixerConfig, config_path: &Path) -> Result<()> {
    match command {
        Command::Inspect { input, json, all } => {
            if all {
                let info = inspect_container(&input)?;
                println!("{}", to_json(&info)?);
                return Ok(());
            }

            let streams = inspect(&input)?;
            if json {
                println!("{}", to_json(&streams)?);
            } else {
                for stream in &streams {
                    println!("{}", stream.display_name());
                }
            }
            Ok(())
        }
        Command::Mix {
            input,
            output,
            gains,
        } => {
            let job = if gains.is_empty() {
                let streams = inspect(&input)?;
                MixJob::with_unity_gains(&input, &streams, &output)
            } else {
                MixJob::new(&input, GainSpec::from_percentages(&gains), &output)
            };

            if job.gains.iter().any(|g| g.gain_percent > 100) {
                tracing::warn!("Gains above 100% may distort");
            }

            let mixer = Mixer::from_config(config);
            let cancel = mixer.cancellation_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, cancelling mix");
                    cancel.cancel();
                }
            });

            let path = mixer.mix(&job).await?;
            println!("{}", path.display());
            Ok(())
        }
        Command::InitConfig { path } => {
            let path = path.unwrap_or_else(|| config_path.to_path_buf());
            generate_default_config(&path)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| MixError::Config(e.to_string()))
}

/// Load the configuration file, falling back to defaults.
fn load_config_file(path: &Path) -> ConfigFile {
    if !path.exists() {
        return ConfigFile::default();
    }
    match ConfigFile::from_file(path) {
        Ok(cf) => cf,
        Err(e) => {
            // Logging is not up yet.
            eprintln!(
                "warning: failed to load config file {}: {}. Using defaults.",
                path.display(),
                e
            );
            ConfigFile::default()
        }
    }
}

/// Initialize logging with tracing
fn init_logging(settings: &LoggingSettings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("audio_mixdown={},libav=warn", settings.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if settings.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
