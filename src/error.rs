use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No input file given (see --help)")]
    MissingInput,

    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Channel count must be 1 or 2, got {0}")]
    InvalidChannelCount(u8),

    #[error("{0} is only supported together with --no-tts")]
    PassThroughOnly(&'static str),

    #[error("--end and --duration cannot be used together")]
    ConflictingRange,

    #[error("--end and --duration require --start")]
    MissingStart,

    #[error("Invalid {field} time `{value}` (expected SS, MM:SS or HH:MM:SS, optional .fff)")]
    Format { field: &'static str, value: String },

    #[error("Duration must be greater than zero")]
    NonPositiveDuration,

    #[error("End ({end:.3}s) must be after start ({start:.3}s)")]
    EndBeforeStart { start: f64, end: f64 },

    #[error("Requested {bound} ({requested:.3}s) exceeds media duration ({media:.3}s)")]
    RangeExceedsMedia {
        bound: &'static str,
        requested: f64,
        media: f64,
    },

    #[error("`{0}` not found (pass --ffmpeg-path or add it to PATH)")]
    ToolNotFound(String),

    #[error("ffmpeg failed with {}", describe_exit(.code))]
    ToolExecutionFailed { code: Option<i32> },

    #[error("{0}")]
    Unexpected(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Unexpected(err.to_string())
    }
}

impl ExtractError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ExtractError::MissingInput => 1,
            ExtractError::ToolExecutionFailed { .. } => 10,
            _ => 2,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
