use crate::request::SpeechTuning;

/// Loudnorm true-peak ceiling (dBTP).
pub const LOUDNORM_TRUE_PEAK: f64 = -1.5;
/// Loudnorm loudness range target (LU).
pub const LOUDNORM_RANGE: f64 = 11.0;

pub fn validate_positive_hz(raw: &str) -> Result<u32, String> {
    let parsed: u32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` must be a positive integer"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".into());
    }
    Ok(parsed)
}

pub fn validate_lufs(raw: &str) -> Result<f64, String> {
    let parsed: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` must be a number (e.g., -16)"))?;
    // loudnorm accepts I in [-70, -5]
    if !(-70.0..=-5.0).contains(&parsed) {
        return Err("target loudness must be between -70 and -5 LUFS".into());
    }
    Ok(parsed)
}

/// Band-pass, resample, then loudness-normalise. Order matters to ffmpeg.
pub fn build_speech_filters(tuning: &SpeechTuning) -> String {
    let parts = [
        format!("highpass=f={}", tuning.highpass_hz),
        format!("lowpass=f={}", tuning.lowpass_hz),
        format!("aresample={}", tuning.sample_rate),
        format!(
            "loudnorm=I={}:TP={}:LRA={}",
            tuning.target_lufs, LOUDNORM_TRUE_PEAK, LOUDNORM_RANGE
        ),
    ];
    parts.join(",")
}
