use crate::filters::build_speech_filters;
use crate::request::{Mode, ValidatedRequest};
use std::ffi::OsString;
use std::path::Path;

pub const PCM_CODEC: &str = "pcm_s16le";

/// Build the ffmpeg argument vector for a validated request.
///
/// With `progress`, ffmpeg also writes `key=value` progress lines to stdout.
pub fn build_args(validated: &ValidatedRequest, output: &Path, progress: bool) -> Vec<OsString> {
    let req = &validated.request;
    let range = &validated.range;
    let mut args: Vec<OsString> = ["-hide_banner", "-nostats", "-loglevel", "error"]
        .map(OsString::from)
        .to_vec();
    if progress {
        args.push("-progress".into());
        args.push("pipe:1".into());
    }

    if let Some(start) = req.start.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        args.push("-ss".into());
        args.push(start.into());
    }
    args.push("-i".into());
    args.push(req.input.clone().into_os_string());

    // -ss sits before -i, so an absolute -to would be off by the seek;
    // always hand ffmpeg a length instead
    if let Some(duration) = req.duration.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        args.push("-t".into());
        args.push(duration.into());
    } else if let (Some(start), Some(end)) = (range.start, range.end) {
        args.push("-t".into());
        args.push(format!("{:.3}", end - start).into());
    }

    args.push("-vn".into());
    args.push("-acodec".into());
    args.push(PCM_CODEC.into());

    match req.mode {
        Mode::PassThrough => {
            if let Some(rate) = req.sample_rate {
                args.push("-ar".into());
                args.push(rate.to_string().into());
            }
            if let Some(ch) = req.channels {
                args.push("-ac".into());
                args.push(ch.to_string().into());
            }
        }
        Mode::Speech => {
            args.push("-af".into());
            args.push(build_speech_filters(&req.tuning).into());
            args.push("-ac".into());
            args.push("1".into());
            args.push("-ar".into());
            args.push(req.tuning.sample_rate.to_string().into());
        }
    }

    args.push(if req.force { "-y" } else { "-n" }.into());
    args.push(output.as_os_str().to_os_string());
    args
}

/// Render a command line for display, quoting arguments that need it.
pub fn render_command_line(tool: &Path, args: &[OsString]) -> String {
    std::iter::once(tool.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|a| quote_arg(&a.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_arg(arg: &str) -> String {
    let needs_quotes =
        arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'');
    if needs_quotes {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}
