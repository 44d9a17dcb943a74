use crate::error::{ExtractError, Result};
use crate::pipeline::{DurationProbe, ResolvedPlan, Runner, ToolResolver};
use crate::progress::{ExtractProgress, spawn_progress_reader};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, warn};
use which::which;

/// Locate ffmpeg: the explicit path (a file, or a directory holding the
/// binary) when it exists, otherwise PATH.
pub fn resolve_ffmpeg(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        if path.is_dir() {
            if let Some(found) = binary_in_dir(path, "ffmpeg") {
                return Ok(found);
            }
        }
        warn!(
            "ffmpeg path {} does not exist, falling back to PATH",
            path.display()
        );
    }
    search_path("ffmpeg").ok_or_else(|| ExtractError::ToolNotFound("ffmpeg".into()))
}

/// [`ToolResolver`] backed by [`resolve_ffmpeg`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegLocator;

impl ToolResolver for FfmpegLocator {
    fn resolve(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        resolve_ffmpeg(explicit)
    }
}

fn binary_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    [name.to_string(), format!("{name}.exe")]
        .into_iter()
        .map(|file| dir.join(file))
        .find(|candidate| candidate.is_file())
}

fn search_path(name: &str) -> Option<PathBuf> {
    which(name)
        .or_else(|_| {
            if cfg!(windows) {
                which(format!("{name}.exe"))
            } else {
                Err(which::Error::CannotFindBinaryPath)
            }
        })
        .ok()
}

/// Duration probe backed by ffprobe. Any failure reads as "unknown".
#[derive(Debug, Clone, Default)]
pub struct FfprobeDuration {
    explicit: Option<PathBuf>,
}

impl FfprobeDuration {
    /// Prefer the ffprobe shipped with the user's ffmpeg, given as the
    /// binary or its directory. Falls back to PATH.
    pub fn beside(ffmpeg: Option<&Path>) -> Self {
        let dir = ffmpeg.and_then(|p| if p.is_dir() { Some(p) } else { p.parent() });
        Self {
            explicit: dir.and_then(|dir| binary_in_dir(dir, "ffprobe")),
        }
    }

    fn locate(&self) -> Option<PathBuf> {
        self.explicit.clone().or_else(|| search_path("ffprobe"))
    }
}

impl DurationProbe for FfprobeDuration {
    fn probe(&self, input: &Path) -> Option<f64> {
        let Some(ffprobe) = self.locate() else {
            debug!("ffprobe not found, skipping duration check");
            return None;
        };
        let out = Command::new(&ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(input)
            .stdin(Stdio::null())
            .output()
            .inspect_err(|e| debug!("failed to run ffprobe: {e}"))
            .ok()?;
        if !out.status.success() {
            debug!("ffprobe error (status {})", out.status);
            return None;
        }
        parse_probe_output(&String::from_utf8_lossy(&out.stdout))
    }
}

pub(crate) fn parse_probe_output(stdout: &str) -> Option<f64> {
    let value = stdout.lines().next()?.trim();
    match value.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Some(secs),
        _ => {
            debug!("cannot parse ffprobe duration `{value}`");
            None
        }
    }
}

/// Runs ffmpeg as a child process and blocks until it exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegRunner;

impl Runner for FfmpegRunner {
    fn run(&self, plan: &ResolvedPlan) -> Result<()> {
        let mut cmd = Command::new(&plan.tool);
        cmd.args(&plan.args).stdin(Stdio::null());

        let status = match plan.progress_total {
            Some(total_secs) => {
                let mut child = cmd
                    .stdout(Stdio::piped())
                    .spawn()
                    .map_err(|e| spawn_error(&plan.tool, e))?;
                let stdout = child.stdout.take().ok_or_else(|| {
                    ExtractError::Unexpected("failed to capture ffmpeg stdout".into())
                })?;
                let progress = ExtractProgress::new(total_ms(total_secs), plan.mode);
                let reader = spawn_progress_reader(stdout, progress);
                let status = child.wait()?;
                if let Ok(Err(e)) = reader.join() {
                    debug!("progress reader stopped: {e}");
                }
                status
            }
            None => cmd.status().map_err(|e| spawn_error(&plan.tool, e))?,
        };

        check_status(status)
    }
}

fn spawn_error(tool: &Path, err: std::io::Error) -> ExtractError {
    ExtractError::Unexpected(format!("failed to spawn {}: {err}", tool.display()))
}

fn check_status(status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(ExtractError::ToolExecutionFailed {
            code: status.code(),
        })
    }
}

pub fn total_ms(seconds: f64) -> u64 {
    (seconds * 1000.0).max(1.0) as u64
}
