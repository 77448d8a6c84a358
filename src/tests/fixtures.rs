//! Test fixtures for integration tests
//!
//! Provides container layouts, a probe that answers from them, and an engine
//! whose behaviour is scripted per test, so the orchestrator can be driven
//! without media files or an ffmpeg binary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::engine::{EngineOutput, MediaEngine, RenderRequest};
use crate::error::{MixError, Result};
use crate::index::{ContainerInfo, MediaProbe, ProbedStream, StreamKind};

/// One audio stream of a fixture container
#[derive(Debug, Clone)]
pub struct TestAudio {
    pub codec: &'static str,
    pub sample_rate: u32,
    pub channels: u16,
    pub layout: Option<&'static str>,
    pub language: Option<&'static str>,
}

impl TestAudio {
    pub fn stereo(codec: &'static str) -> Self {
        Self {
            codec,
            sample_rate: 48000,
            channels: 2,
            layout: Some("stereo"),
            language: None,
        }
    }

    pub fn surround() -> Self {
        Self {
            codec: "ac3",
            sample_rate: 48000,
            channels: 6,
            layout: Some("5.1(side)"),
            language: None,
        }
    }

    pub fn mono_44k() -> Self {
        Self {
            codec: "mp3",
            sample_rate: 44100,
            channels: 1,
            layout: Some("mono"),
            language: None,
        }
    }
}

/// Test container layout
#[derive(Debug, Clone)]
pub struct TestMediaInfo {
    pub name: &'static str,
    #[allow(dead_code)]
    pub description: &'static str,
    pub has_video: bool,
    pub has_subtitles: bool,
    pub audio: Vec<TestAudio>,
    /// Video duration
    pub duration_secs: f64,
    /// How much longer than the video the audio runs
    pub audio_tail_secs: f64,
}

impl TestMediaInfo {
    /// One stereo AAC track
    pub fn single_audio() -> Self {
        Self {
            name: "single_audio",
            description: "MKV with one AAC stereo track",
            has_video: true,
            has_subtitles: false,
            audio: vec![TestAudio::stereo("aac")],
            duration_secs: 30.0,
            audio_tail_secs: 0.0,
        }
    }

    /// Game capture: game audio, microphone, and a chat track
    pub fn three_tracks() -> Self {
        let mut mic = TestAudio::stereo("aac");
        mic.language = Some("eng");
        Self {
            name: "three_tracks",
            description: "MKV with three AAC stereo tracks and subtitles",
            has_video: true,
            has_subtitles: true,
            audio: vec![TestAudio::stereo("aac"), mic, TestAudio::stereo("opus")],
            duration_secs: 30.0,
            audio_tail_secs: 0.0,
        }
    }

    /// Tracks with different rates and layouts
    pub fn mixed_formats() -> Self {
        Self {
            name: "mixed_formats",
            description: "MKV with 5.1 AC-3 and mono MP3 tracks",
            has_video: true,
            has_subtitles: false,
            audio: vec![TestAudio::surround(), TestAudio::mono_44k()],
            duration_secs: 30.0,
            audio_tail_secs: 0.0,
        }
    }

    /// Video without any audio
    pub fn video_only() -> Self {
        Self {
            name: "video_only",
            description: "MKV with a single H.264 stream",
            has_video: true,
            has_subtitles: false,
            audio: vec![],
            duration_secs: 30.0,
            audio_tail_secs: 0.0,
        }
    }

    /// Capture whose audio keeps running after the video stops
    pub fn audio_outlasts_video() -> Self {
        Self {
            name: "audio_outlasts_video",
            description: "MP4 with 30s of video and two 32.5s AAC tracks",
            has_video: true,
            has_subtitles: false,
            audio: vec![TestAudio::stereo("aac"), TestAudio::stereo("aac")],
            duration_secs: 30.0,
            audio_tail_secs: 2.5,
        }
    }

    /// Audio without a video stream
    pub fn audio_only() -> Self {
        Self {
            name: "audio_only",
            description: "MKA with two AAC tracks",
            has_video: false,
            has_subtitles: false,
            audio: vec![TestAudio::stereo("aac"), TestAudio::stereo("aac")],
            duration_secs: 30.0,
            audio_tail_secs: 0.0,
        }
    }

    /// Probe result for this layout, video first, then audio, then subtitles.
    pub fn container_info(&self, path: &Path) -> ContainerInfo {
        let mut streams = Vec::new();

        if self.has_video {
            let mut video = ProbedStream::new(streams.len(), StreamKind::Video, "h264");
            video.width = 1920;
            video.height = 1080;
            video.duration_secs = Some(self.duration_secs);
            streams.push(video);
        }

        for audio in &self.audio {
            let mut stream = ProbedStream::new(streams.len(), StreamKind::Audio, audio.codec);
            stream.sample_rate = audio.sample_rate;
            stream.channels = audio.channels;
            stream.channel_layout = audio.layout.map(str::to_string);
            stream.language = audio.language.map(str::to_string);
            stream.duration_secs = Some(self.duration_secs + self.audio_tail_secs);
            streams.push(stream);
        }

        if self.has_subtitles {
            streams.push(ProbedStream::new(
                streams.len(),
                StreamKind::Subtitle,
                "subrip",
            ));
        }

        ContainerInfo {
            path: path.to_path_buf(),
            format_name: "matroska,webm".to_string(),
            duration_secs: Some(self.duration_secs + self.audio_tail_secs),
            streams,
        }
    }

    /// What a correct mixdown of this layout looks like: one video, one audio.
    pub fn mixed_output_info(&self, path: &Path) -> ContainerInfo {
        let mut mixed = self.clone();
        mixed.has_subtitles = false;
        mixed.audio = vec![TestAudio::stereo("aac")];
        if let Some(first) = self.audio.first() {
            mixed.audio[0].sample_rate = first.sample_rate;
            mixed.audio[0].channels = first.channels;
            mixed.audio[0].layout = first.layout;
        }
        mixed.container_info(path)
    }

    /// A correct mixdown written to Matroska, which records no per-stream
    /// durations, only the container's.
    pub fn mixed_matroska_info(&self, path: &Path) -> ContainerInfo {
        let mut info = self.mixed_output_info(path);
        for stream in &mut info.streams {
            stream.duration_secs = None;
        }
        info
    }
}

/// Probe that answers from a fixed table of paths
#[derive(Debug, Default)]
pub struct MockProbe {
    containers: HashMap<PathBuf, ContainerInfo>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &Path, info: ContainerInfo) -> Self {
        self.containers.insert(path.to_path_buf(), info);
        self
    }
}

impl MediaProbe for MockProbe {
    fn probe(&self, path: &Path) -> Result<ContainerInfo> {
        self.containers
            .get(path)
            .cloned()
            .ok_or_else(|| MixError::UnsupportedFormat(format!("no fixture for {:?}", path)))
    }
}

/// How the mock engine responds to a run
#[derive(Debug, Clone)]
pub enum EngineBehavior {
    /// Write the output and exit cleanly
    Succeed,
    /// Write a partial output, then exit with the given diagnostics
    Fail { stderr: String },
    /// Write a partial output and block until cancelled
    WaitForCancel,
}

/// Engine that records requests and follows a scripted behaviour
#[derive(Debug)]
pub struct MockEngine {
    behavior: EngineBehavior,
    requests: Mutex<Vec<RenderRequest>>,
    invocations: AtomicUsize,
}

impl MockEngine {
    pub fn new(behavior: EngineBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
            invocations: AtomicUsize::new(0),
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RenderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl MediaEngine for MockEngine {
    async fn run(&self, request: &RenderRequest, cancel: &CancellationToken) -> Result<EngineOutput> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        std::fs::write(&request.output_path, b"partial")?;

        match &self.behavior {
            EngineBehavior::Succeed => {
                std::fs::write(&request.output_path, b"mixed")?;
                Ok(EngineOutput::default())
            }
            EngineBehavior::Fail { stderr } => Err(MixError::EngineExecution {
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
            EngineBehavior::WaitForCancel => {
                cancel.cancelled().await;
                Err(MixError::Cancelled)
            }
        }
    }
}

/// A readable file standing in for an input container.
pub fn input_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"not really a container").unwrap();
    path
}

/// Path to a working ffmpeg binary, if there is one.
pub fn ffmpeg_binary() -> Option<String> {
    let path = std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string());
    let ok = Command::new(&path)
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    ok.then_some(path)
}

/// One audio stream of a generated fixture
#[derive(Debug, Clone, Copy)]
pub struct TestTone {
    /// Sine frequency in Hz; 0 is silence
    pub frequency: u32,
    /// Linear level applied to the source (1.0 leaves lavfi's default amplitude)
    pub level: f64,
}

impl TestTone {
    pub fn sine(frequency: u32) -> Self {
        Self {
            frequency,
            level: 1.0,
        }
    }

    pub fn silence() -> Self {
        Self {
            frequency: 0,
            level: 1.0,
        }
    }

    pub fn at(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    fn lavfi_source(&self, duration_secs: u32) -> String {
        if self.frequency == 0 {
            return format!(
                "anullsrc=channel_layout=stereo:sample_rate=48000,atrim=duration={}",
                duration_secs
            );
        }
        format!(
            "sine=frequency={}:sample_rate=48000:duration={},volume={}",
            self.frequency, duration_secs, self.level
        )
    }
}

/// Generate a short Matroska file with a test-pattern video stream and one
/// audio stream per entry of `tones`.
pub fn generate_fixture(ffmpeg: &str, path: &Path, tones: &[TestTone], duration_secs: u32) -> bool {
    let mut cmd = Command::new(ffmpeg);
    cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]);
    cmd.args([
        "-f",
        "lavfi",
        "-i",
        &format!("testsrc=size=160x120:rate=10:duration={}", duration_secs),
    ]);
    for tone in tones {
        cmd.args(["-f", "lavfi", "-i", &tone.lavfi_source(duration_secs)]);
    }

    cmd.args(["-map", "0:v"]);
    for i in 0..tones.len() {
        cmd.args(["-map", &format!("{}:a", i + 1)]);
    }
    cmd.args(["-c:v", "mpeg4", "-c:a", "aac", "-b:a", "96k"]);
    cmd.arg(path);

    cmd.output().map(|o| o.status.success()).unwrap_or(false)
}
