use crate::request::Mode;
use chrono::Local;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const MAX_NUMBERED_SUFFIX: u32 = 9999;

/// Default output: `<stem><mode>[_s.._e.._d..].wav` next to the input.
pub fn default_output(
    input: &Path,
    mode: Mode,
    start: Option<&str>,
    end: Option<&str>,
    duration: Option<&str>,
) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("output");
    let parent = input.parent().unwrap_or(Path::new("."));

    let tags: Vec<String> = [("s", start), ("e", end), ("d", duration)]
        .into_iter()
        .filter_map(|(prefix, raw)| {
            let token = time_token(raw?);
            (!token.is_empty()).then(|| format!("{prefix}{token}"))
        })
        .collect();
    let tags = if tags.is_empty() {
        String::new()
    } else {
        format!("_{}", tags.join("_"))
    };

    parent.join(format!("{stem}{}{tags}.wav", mode.suffix()))
}

/// Filename-safe rendering of a time expression.
pub fn time_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ':' { '-' } else { c })
        .collect()
}

/// Pick a name that does not exist yet: `name_001.wav`, `name_002.wav`, ...
pub fn avoid_collision(path: &Path) -> PathBuf {
    next_free_path(path, |p| p.exists(), || {
        Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
    })
}

pub(crate) fn next_free_path(
    path: &Path,
    exists: impl Fn(&Path) -> bool,
    timestamp: impl FnOnce() -> String,
) -> PathBuf {
    if !exists(path) {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = path.parent().unwrap_or(Path::new(""));

    for n in 1..=MAX_NUMBERED_SUFFIX {
        let candidate = parent.join(format!("{stem}_{n:03}{ext}"));
        if !exists(&candidate) {
            debug!(from = %path.display(), to = %candidate.display(), "output exists, renamed");
            return candidate;
        }
    }

    // may still collide if several runs land in the same second
    let fallback = parent.join(format!("{stem}_{}{ext}", timestamp()));
    warn!(
        "all {MAX_NUMBERED_SUFFIX} numbered names are taken, using {}",
        fallback.display()
    );
    fallback
}
