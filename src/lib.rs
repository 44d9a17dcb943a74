pub mod command;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod filters;
pub mod naming;
pub mod open;
pub mod pipeline;
pub mod progress;
pub mod request;
pub mod timecode;
pub mod validate;

pub use error::{ExtractError, Result};
pub use pipeline::{ConsoleReporter, ExtractionResult, Pipeline, Reporter};
pub use request::{ExtractionRequest, Mode, SpeechTuning};
