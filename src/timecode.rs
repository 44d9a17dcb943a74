use crate::error::{ExtractError, Result};
use regex::Regex;
use std::sync::LazyLock;

static WHOLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());
static SECONDS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+\.?\d*|\.\d+)$").unwrap());

/// Parse `SS[.fff]`, `MM:SS[.fff]` or `HH:MM:SS[.fff]` into seconds.
///
/// Blank or missing input is `Ok(None)`. `field` names the option in the error.
pub fn parse_time(raw: Option<&str>, field: &'static str) -> Result<Option<f64>> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let invalid = || ExtractError::Format {
        field,
        value: text.to_string(),
    };

    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() > 3 {
        return Err(invalid());
    }

    let (leading, last) = parts.split_at(parts.len() - 1);
    let seconds = last[0];
    if !SECONDS_RE.is_match(seconds) {
        return Err(invalid());
    }
    let seconds: f64 = seconds.parse().map_err(|_| invalid())?;

    // leading components are minutes, or hours then minutes
    let mut total = 0.0;
    for part in leading {
        if !WHOLE_RE.is_match(part) {
            return Err(invalid());
        }
        let value: u64 = part.parse().map_err(|_| invalid())?;
        total = total * 60.0 + value as f64;
    }

    Ok(Some(total * 60.0 + seconds))
}

/// Whether a raw time option carries a value.
pub fn is_set(raw: Option<&str>) -> bool {
    raw.is_some_and(|t| !t.trim().is_empty())
}
