use audio_extract::filters::{validate_lufs, validate_positive_hz};
use audio_extract::request::{
    DEFAULT_HIGHPASS_HZ, DEFAULT_LOWPASS_HZ, DEFAULT_TARGET_LUFS, DEFAULT_TTS_SAMPLE_RATE,
};
use audio_extract::{ExtractError, ExtractionRequest, Mode, SpeechTuning};
use clap::{ArgAction, Parser, ValueHint};
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "audio_extract",
    version,
    about = "Extract an audio segment from a media file with ffmpeg (speech-optimised WAV by default)"
)]
pub struct Cli {
    /// Input media file
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Start time (SS, MM:SS or HH:MM:SS, optional .fff)
    #[arg(short = 's', long)]
    pub start: Option<String>,

    /// End time (requires --start, excludes --duration)
    #[arg(short = 'e', long)]
    pub end: Option<String>,

    /// Segment length (requires --start, excludes --end)
    #[arg(short = 'd', long)]
    pub duration: Option<String>,

    /// Output file (default: <input>_tts[_s.._e.._d..].wav next to the input)
    #[arg(short = 'o', long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Plain PCM extraction without speech filtering
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_tts: bool,

    /// Output sample rate (--no-tts only)
    #[arg(long, value_parser = validate_positive_hz)]
    pub sample_rate: Option<u32>,

    /// Output channels, 1 or 2 (--no-tts only)
    #[arg(long)]
    pub channels: Option<u8>,

    /// Path to ffmpeg binary or its directory (overrides PATH lookup)
    #[arg(long, env = "AUDIO_EXTRACT_FFMPEG", value_hint = ValueHint::ExecutablePath)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Overwrite the output instead of picking a numbered name
    #[arg(short = 'f', long, action = ArgAction::SetTrue)]
    pub force: bool,

    /// Open the result in the default player
    #[arg(long, action = ArgAction::SetTrue)]
    pub autoplay: bool,

    /// Print the ffmpeg command and debug logs
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Speech mode sample rate
    #[arg(long, default_value_t = DEFAULT_TTS_SAMPLE_RATE, value_parser = validate_positive_hz)]
    pub tts_sample_rate: u32,

    /// Speech mode high-pass cutoff (Hz)
    #[arg(long, default_value_t = DEFAULT_HIGHPASS_HZ, value_parser = validate_positive_hz)]
    pub tts_highpass_hz: u32,

    /// Speech mode low-pass cutoff (Hz)
    #[arg(long, default_value_t = DEFAULT_LOWPASS_HZ, value_parser = validate_positive_hz)]
    pub tts_lowpass_hz: u32,

    /// Speech mode loudness target (LUFS)
    #[arg(long, default_value_t = DEFAULT_TARGET_LUFS, value_parser = validate_lufs, allow_negative_numbers = true)]
    pub target_lufs: f64,

    /// Ask for every option with prompts
    #[arg(long, action = ArgAction::SetTrue)]
    pub interactive: bool,
}

impl Cli {
    pub fn into_request(self, show_progress: bool) -> Result<ExtractionRequest, ExtractError> {
        let input = self.input.ok_or(ExtractError::MissingInput)?;
        Ok(ExtractionRequest {
            input,
            output: self.output,
            start: self.start,
            end: self.end,
            duration: self.duration,
            sample_rate: self.sample_rate,
            channels: self.channels,
            ffmpeg_path: self.ffmpeg_path,
            mode: if self.no_tts {
                Mode::PassThrough
            } else {
                Mode::Speech
            },
            tuning: SpeechTuning {
                sample_rate: self.tts_sample_rate,
                highpass_hz: self.tts_highpass_hz,
                lowpass_hz: self.tts_lowpass_hz,
                target_lufs: self.target_lufs,
            },
            force: self.force,
            autoplay: self.autoplay,
            verbose: self.verbose,
            show_progress,
        })
    }
}

/// Draw a progress bar only on an interactive stderr and never with `--verbose`.
pub fn progress_wanted(verbose: bool) -> bool {
    progress_enabled(verbose, std::io::stderr().is_terminal())
}

fn progress_enabled(verbose: bool, terminal: bool) -> bool {
    !verbose && terminal
}

/// PowerShell-style names (`-Start`, `-NoTts`, ...) and their long flags.
/// `None` marks a name for the positional input.
const POWERSHELL_ALIASES: &[(&str, Option<&str>)] = &[
    ("inputfile", None),
    ("input", None),
    ("start", Some("--start")),
    ("end", Some("--end")),
    ("duration", Some("--duration")),
    ("output", Some("--output")),
    ("outputfile", Some("--output")),
    ("notts", Some("--no-tts")),
    ("samplerate", Some("--sample-rate")),
    ("channels", Some("--channels")),
    ("ffmpegpath", Some("--ffmpeg-path")),
    ("force", Some("--force")),
    ("autoplay", Some("--autoplay")),
    ("verbose", Some("--verbose")),
    ("ttssamplerate", Some("--tts-sample-rate")),
    ("ttshighpasshz", Some("--tts-highpass-hz")),
    ("ttslowpasshz", Some("--tts-lowpass-hz")),
    ("targetlufs", Some("--target-lufs")),
    ("interactive", Some("--interactive")),
    ("help", Some("--help")),
];

/// Rewrite single-dash PowerShell-style flags to the long flags clap knows.
/// The first element (program name) and anything after `--` are left alone.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;
    for (idx, arg) in args.into_iter().enumerate() {
        if idx == 0 || passthrough {
            out.push(arg);
            continue;
        }
        if arg == "--" {
            passthrough = true;
            out.push(arg);
            continue;
        }
        match powershell_flag(&arg) {
            Some(Some(long)) => out.push(long.into()),
            Some(None) => {}
            None => out.push(arg),
        }
    }
    out
}

fn powershell_flag(arg: &OsString) -> Option<Option<&'static str>> {
    let text = arg.to_str()?;
    let name = text.strip_prefix('-')?;
    if name.starts_with('-') || name.len() < 2 {
        return None;
    }
    let key: String = name
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();
    POWERSHELL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, long)| *long)
}
