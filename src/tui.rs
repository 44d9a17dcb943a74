use anyhow::Result;
use audio_extract::config::Settings;
use audio_extract::naming::default_output;
use audio_extract::timecode::parse_time;
use audio_extract::{ExtractionRequest, Mode, SpeechTuning};
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::path::PathBuf;

pub fn interactive_request(settings: &Settings) -> Result<ExtractionRequest> {
    println!("Interactive Audio Extractor");
    println!("Press Enter to accept defaults or leave options unset.\n");

    let theme = ColorfulTheme::default();
    let input = loop {
        let mut prompt = Input::<String>::with_theme(&theme).with_prompt("Input media file path");
        if let Some(dir) = &settings.last_directory {
            prompt = prompt.with_initial_text(format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR));
        }
        let raw = prompt.interact_text()?;
        let path = PathBuf::from(raw.trim());
        if path.is_file() {
            break path;
        } else {
            println!("File not found, please try again.");
        }
    };

    let mode = match Select::with_theme(&theme)
        .with_prompt("Processing mode")
        .items(&["Speech (mono, filtered, loudness-normalised)", "Pass-through (plain PCM)"])
        .default(0)
        .interact()?
    {
        0 => Mode::Speech,
        _ => Mode::PassThrough,
    };

    let start = prompt_optional_time(&theme, "Start time (blank = beginning)", "start")?;
    let (end, duration) = if start.is_some() {
        match Select::with_theme(&theme)
            .with_prompt("Stop at")
            .items(&["End of file", "An end time", "After a duration"])
            .default(0)
            .interact()?
        {
            1 => (prompt_required_time(&theme, "End time", "end")?, None),
            2 => (None, prompt_required_time(&theme, "Duration", "duration")?),
            _ => (None, None),
        }
    } else {
        (None, None)
    };

    let (sample_rate, channels) = match mode {
        Mode::PassThrough => (
            prompt_optional_number::<u32>(&theme, "Sample rate (blank = keep source)")?,
            prompt_channels(&theme)?,
        ),
        Mode::Speech => (None, None),
    };

    let default_out = default_output(
        &input,
        mode,
        start.as_deref(),
        end.as_deref(),
        duration.as_deref(),
    );
    let raw_out: String = Input::with_theme(&theme)
        .with_prompt(format!(
            "Output file path [{}]",
            default_out.as_os_str().to_string_lossy()
        ))
        .allow_empty(true)
        .interact_text()?;
    let output = (!raw_out.trim().is_empty()).then(|| PathBuf::from(raw_out.trim()));

    let force = Confirm::with_theme(&theme)
        .with_prompt("Overwrite the output if it exists?")
        .default(false)
        .interact()?;
    let autoplay = Confirm::with_theme(&theme)
        .with_prompt("Open the result when done?")
        .default(false)
        .interact()?;
    let verbose = Confirm::with_theme(&theme)
        .with_prompt("Show the ffmpeg command and debug logs?")
        .default(false)
        .interact()?;

    let ffmpeg_path = prompt_ffmpeg_path(&theme, settings.ffmpeg_path.as_ref())?;

    Ok(ExtractionRequest {
        input,
        output,
        start,
        end,
        duration,
        sample_rate,
        channels,
        ffmpeg_path,
        mode,
        tuning: SpeechTuning::default(),
        force,
        autoplay,
        verbose,
        show_progress: crate::cli::progress_wanted(verbose),
    })
}

/// Remember the tool path and the input folder for next time.
pub fn remember(settings: &mut Settings, request: &ExtractionRequest) {
    if request.ffmpeg_path.is_some() {
        settings.ffmpeg_path = request.ffmpeg_path.clone();
    }
    if let Some(dir) = request.input.parent().filter(|d| !d.as_os_str().is_empty()) {
        settings.last_directory = Some(dir.to_path_buf());
    }
}

fn prompt_optional_time(
    theme: &ColorfulTheme,
    prompt: &str,
    field: &'static str,
) -> Result<Option<String>> {
    loop {
        let raw: String = Input::with_theme(theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        match parse_time(Some(raw.as_str()), field) {
            Ok(None) => return Ok(None),
            Ok(Some(_)) => return Ok(Some(raw.trim().to_string())),
            Err(err) => println!("{err}"),
        }
    }
}

fn prompt_required_time(
    theme: &ColorfulTheme,
    prompt: &str,
    field: &'static str,
) -> Result<Option<String>> {
    loop {
        if let Some(value) = prompt_optional_time(theme, prompt, field)? {
            return Ok(Some(value));
        }
        println!("A value is required here.");
    }
}

fn prompt_optional_number<T: std::str::FromStr>(
    theme: &ColorfulTheme,
    prompt: &str,
) -> Result<Option<T>> {
    loop {
        let raw: String = Input::with_theme(theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        match trimmed.parse() {
            Ok(val) => return Ok(Some(val)),
            Err(_) => println!("Invalid number. Please try again or leave blank."),
        }
    }
}

fn prompt_channels(theme: &ColorfulTheme) -> Result<Option<u8>> {
    let choice = Select::with_theme(theme)
        .with_prompt("Channels")
        .items(&["Keep source", "Mono (1)", "Stereo (2)"])
        .default(0)
        .interact()?;
    Ok(match choice {
        1 => Some(1),
        2 => Some(2),
        _ => None,
    })
}

fn prompt_ffmpeg_path(theme: &ColorfulTheme, remembered: Option<&PathBuf>) -> Result<Option<PathBuf>> {
    let initial = remembered
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    loop {
        let raw: String = Input::with_theme(theme)
            .with_prompt("Custom ffmpeg path (blank = PATH)")
            .with_initial_text(initial.clone())
            .allow_empty(true)
            .interact_text()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let path = PathBuf::from(trimmed);
        if path.exists() {
            return Ok(Some(path));
        } else {
            println!("Path not found. Leave blank to use PATH or enter a valid path.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remember_updates_settings() {
        let mut settings = Settings::default();
        let mut req = ExtractionRequest::new("/videos/talk.mp4");
        remember(&mut settings, &req);
        assert_eq!(settings.ffmpeg_path, None);
        assert_eq!(settings.last_directory, Some(PathBuf::from("/videos")));

        req.ffmpeg_path = Some(PathBuf::from("/opt/ffmpeg"));
        remember(&mut settings, &req);
        assert_eq!(settings.ffmpeg_path, Some(PathBuf::from("/opt/ffmpeg")));
    }

    #[test]
    fn test_remember_ignores_bare_file_name() {
        let mut settings = Settings {
            last_directory: Some(PathBuf::from("/keep")),
            ..Settings::default()
        };
        remember(&mut settings, &ExtractionRequest::new("talk.mp4"));
        assert_eq!(settings.last_directory, Some(PathBuf::from("/keep")));
    }
}
