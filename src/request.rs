use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_TTS_SAMPLE_RATE: u32 = 24_000;
pub const DEFAULT_HIGHPASS_HZ: u32 = 80;
pub const DEFAULT_LOWPASS_HZ: u32 = 11_000;
pub const DEFAULT_TARGET_LUFS: f64 = -16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Mono, band-limited, loudness-normalised audio for TTS voice references.
    #[default]
    Speech,
    /// Keep source channels and rate unless overridden.
    PassThrough,
}

impl Mode {
    pub fn suffix(&self) -> &'static str {
        match self {
            Mode::Speech => "_tts",
            Mode::PassThrough => "_out",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Speech => write!(f, "speech"),
            Mode::PassThrough => write!(f, "pass-through"),
        }
    }
}

/// Filter settings used in speech mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechTuning {
    pub sample_rate: u32,
    pub highpass_hz: u32,
    pub lowpass_hz: u32,
    pub target_lufs: f64,
}

impl Default for SpeechTuning {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_TTS_SAMPLE_RATE,
            highpass_hz: DEFAULT_HIGHPASS_HZ,
            lowpass_hz: DEFAULT_LOWPASS_HZ,
            target_lufs: DEFAULT_TARGET_LUFS,
        }
    }
}

/// Everything one invocation asks for, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ExtractionRequest {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
    pub ffmpeg_path: Option<PathBuf>,
    pub mode: Mode,
    pub tuning: SpeechTuning,
    pub force: bool,
    pub autoplay: bool,
    pub verbose: bool,
    pub show_progress: bool,
}

impl ExtractionRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }
}

/// Parsed bounds of the requested segment, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeRange {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub duration: Option<f64>,
}

impl TimeRange {
    /// Length of the segment when it can be known without probing.
    pub fn segment_seconds(&self) -> Option<f64> {
        match (self.duration, self.start, self.end) {
            (Some(d), _, _) => Some(d),
            (None, Some(s), Some(e)) => Some(e - s),
            _ => None,
        }
    }

    /// Expected output length given the probed media length.
    pub fn expected_seconds(&self, media: Option<f64>) -> Option<f64> {
        self.segment_seconds().or_else(|| {
            let media = media?;
            Some((media - self.start.unwrap_or(0.0)).max(0.0))
        })
    }
}

/// A request that passed every check in [`crate::validate::validate`].
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub request: ExtractionRequest,
    pub range: TimeRange,
}
