use crate::error::{ExtractError, Result};
use crate::request::{ExtractionRequest, Mode, TimeRange, ValidatedRequest};
use crate::timecode::{is_set, parse_time};
use tracing::debug;

/// Slack allowed when comparing a range against the probed media length.
pub const MEDIA_EPSILON: f64 = 1e-4;

/// Check a raw request. The order of the checks decides which error is
/// reported, so it must not change.
pub fn validate(request: ExtractionRequest) -> Result<ValidatedRequest> {
    if !request.input.is_file() {
        return Err(ExtractError::InputNotFound(request.input));
    }

    if let Some(ch) = request.channels {
        if ch != 1 && ch != 2 {
            return Err(ExtractError::InvalidChannelCount(ch));
        }
    }

    if request.mode == Mode::Speech {
        if request.sample_rate.is_some() {
            return Err(ExtractError::PassThroughOnly("--sample-rate"));
        }
        if request.channels.is_some() {
            return Err(ExtractError::PassThroughOnly("--channels"));
        }
    }

    let has_start = is_set(request.start.as_deref());
    let has_end = is_set(request.end.as_deref());
    let has_duration = is_set(request.duration.as_deref());

    if has_end && has_duration {
        return Err(ExtractError::ConflictingRange);
    }
    if (has_end || has_duration) && !has_start {
        return Err(ExtractError::MissingStart);
    }

    let range = TimeRange {
        start: parse_time(request.start.as_deref(), "start")?,
        end: parse_time(request.end.as_deref(), "end")?,
        duration: parse_time(request.duration.as_deref(), "duration")?,
    };

    if let Some(d) = range.duration {
        if d <= 0.0 {
            return Err(ExtractError::NonPositiveDuration);
        }
    }
    if let (Some(start), Some(end)) = (range.start, range.end) {
        if end <= start {
            return Err(ExtractError::EndBeforeStart { start, end });
        }
    }

    debug!(?range, mode = %request.mode, "request validated");
    Ok(ValidatedRequest { request, range })
}

/// Best-effort guard against ranges past the end of the media.
pub fn check_media_bounds(range: &TimeRange, media: f64) -> Result<()> {
    let exceeds = |bound: &'static str, requested: f64| {
        if media + MEDIA_EPSILON < requested {
            Err(ExtractError::RangeExceedsMedia {
                bound,
                requested,
                media,
            })
        } else {
            Ok(())
        }
    };

    if let Some(start) = range.start {
        exceeds("start", start)?;
        if let Some(d) = range.duration {
            exceeds("start + duration", start + d)?;
        }
    }
    if let Some(end) = range.end {
        exceeds("end", end)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn request_in(dir: &TempDir) -> ExtractionRequest {
        let input = dir.path().join("clip.mp4");
        fs::write(&input, b"fake").unwrap();
        ExtractionRequest::new(input)
    }

    #[test]
    fn test_missing_input_wins_over_everything() {
        let mut req = ExtractionRequest::new("/definitely/not/here.mp4");
        req.channels = Some(7);
        req.end = Some("1".into());
        req.duration = Some("1".into());
        assert!(matches!(validate(req), Err(ExtractError::InputNotFound(_))));
    }

    #[test]
    fn test_directory_is_not_an_input() {
        let dir = TempDir::new().unwrap();
        let req = ExtractionRequest::new(dir.path());
        assert!(matches!(validate(req), Err(ExtractError::InputNotFound(_))));
    }

    #[test]
    fn test_channel_count() {
        let dir = TempDir::new().unwrap();
        let mut req = request_in(&dir);
        req.mode = Mode::PassThrough;
        req.channels = Some(3);
        req.end = Some("5".into());
        req.duration = Some("5".into());
        assert!(matches!(
            validate(req),
            Err(ExtractError::InvalidChannelCount(3))
        ));
    }

    #[test]
    fn test_speech_mode_rejects_format_overrides() {
        let dir = TempDir::new().unwrap();
        let mut req = request_in(&dir);
        req.sample_rate = Some(44_100);
        assert!(matches!(
            validate(req.clone()),
            Err(ExtractError::PassThroughOnly("--sample-rate"))
        ));

        req.sample_rate = None;
        req.channels = Some(2);
        assert!(matches!(
            validate(req.clone()),
            Err(ExtractError::PassThroughOnly("--channels"))
        ));

        req.mode = Mode::PassThrough;
        req.sample_rate = Some(44_100);
        assert!(validate(req).is_ok());
    }

    #[test]
    fn test_conflicting_range_before_parsing() {
        let dir = TempDir::new().unwrap();
        let mut req = request_in(&dir);
        req.end = Some("garbage".into());
        req.duration = Some("also garbage".into());
        assert!(matches!(validate(req), Err(ExtractError::ConflictingRange)));
    }

    #[test]
    fn test_missing_start() {
        let dir = TempDir::new().unwrap();
        let mut req = request_in(&dir);
        req.end = Some("00:00:10".into());
        assert!(matches!(validate(req.clone()), Err(ExtractError::MissingStart)));

        req.end = None;
        req.duration = Some("10".into());
        req.start = Some("   ".into());
        assert!(matches!(validate(req), Err(ExtractError::MissingStart)));
    }

    #[test]
    fn test_format_error_names_field() {
        let dir = TempDir::new().unwrap();
        let mut req = request_in(&dir);
        req.start = Some("1".into());
        req.end = Some("1:xx".into());
        match validate(req) {
            Err(ExtractError::Format { field, .. }) => assert_eq!(field, "end"),
            other => panic!("expected Format error, got {other:?}"),
        }
    }

    #[test]
    fn test_speech_override_before_range_conflict() {
        let dir = TempDir::new().unwrap();
        let mut req = request_in(&dir);
        req.sample_rate = Some(16_000);
        req.end = Some("10".into());
        req.duration = Some("5".into());
        assert!(matches!(
            validate(req),
            Err(ExtractError::PassThroughOnly("--sample-rate"))
        ));
    }

    #[test]
    fn test_missing_start_before_format() {
        let dir = TempDir::new().unwrap();
        let mut req = request_in(&dir);
        req.end = Some("garbage".into());
        assert!(matches!(validate(req), Err(ExtractError::MissingStart)));
    }

    #[test]
    fn test_format_before_non_positive_duration() {
        let dir = TempDir::new().unwrap();
        let mut req = request_in(&dir);
        req.start = Some("x".into());
        req.duration = Some("0".into());
        match validate(req) {
            Err(ExtractError::Format { field, value }) => {
                assert_eq!(field, "start");
                assert_eq!(value, "x");
            }
            other => panic!("expected Format error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_duration() {
        let dir = TempDir::new().unwrap();
        let mut req = request_in(&dir);
        req.start = Some("0".into());
        req.duration = Some("00:00:00".into());
        assert!(matches!(
            validate(req),
            Err(ExtractError::NonPositiveDuration)
        ));
    }

    #[test]
    fn test_end_before_start() {
        let dir = TempDir::new().unwrap();
        let mut req = request_in(&dir);
        req.start = Some("00:01:00".into());
        req.end = Some("00:00:59".into());
        assert!(matches!(
            validate(req.clone()),
            Err(ExtractError::EndBeforeStart { .. })
        ));

        req.end = Some("00:01:00".into());
        assert!(matches!(
            validate(req),
            Err(ExtractError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn test_valid_range() {
        let dir = TempDir::new().unwrap();
        let mut req = request_in(&dir);
        req.start = Some("00:05:30".into());
        req.duration = Some("00:00:20".into());
        let v = validate(req).unwrap();
        assert_eq!(v.range.start, Some(330.0));
        assert_eq!(v.range.duration, Some(20.0));
        assert_eq!(v.range.end, None);
    }

    #[test]
    fn test_start_only_is_valid() {
        let dir = TempDir::new().unwrap();
        let mut req = request_in(&dir);
        req.start = Some("12.5".into());
        let v = validate(req).unwrap();
        assert_eq!(v.range.start, Some(12.5));
    }

    #[test]
    fn test_media_bounds() {
        let range = TimeRange {
            start: Some(10.0),
            end: None,
            duration: Some(5.0),
        };
        assert!(check_media_bounds(&range, 15.0).is_ok());
        assert!(check_media_bounds(&range, 15.0 - MEDIA_EPSILON / 2.0).is_ok());
        match check_media_bounds(&range, 14.0) {
            Err(ExtractError::RangeExceedsMedia { bound, .. }) => {
                assert_eq!(bound, "start + duration")
            }
            other => panic!("expected RangeExceedsMedia, got {other:?}"),
        }

        let range = TimeRange {
            start: Some(10.0),
            end: Some(20.0),
            duration: None,
        };
        assert!(check_media_bounds(&range, 20.0).is_ok());
        assert!(matches!(
            check_media_bounds(&range, 9.0),
            Err(ExtractError::RangeExceedsMedia { bound: "start", .. })
        ));
        assert!(matches!(
            check_media_bounds(&range, 19.0),
            Err(ExtractError::RangeExceedsMedia { bound: "end", .. })
        ));
    }
}
