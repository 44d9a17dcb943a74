use crate::error::{ExtractError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Preferences remembered between interactive sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_directory: Option<PathBuf>,
}

impl Settings {
    /// Read the settings file. Missing or unreadable files give defaults.
    pub fn load() -> Self {
        Self::settings_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("no settings at {}: {e}", path.display());
                return Self::default();
            }
        };
        toml::from_str(&contents).unwrap_or_else(|e| {
            debug!("ignoring corrupt settings {}: {e}", path.display());
            Self::default()
        })
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path()
            .ok_or_else(|| ExtractError::Unexpected("no config directory".into()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let contents =
            toml::to_string_pretty(self).map_err(|e| ExtractError::Unexpected(e.to_string()))?;
        std::fs::write(path, contents)?;
        debug!("settings saved to {}", path.display());
        Ok(())
    }

    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("audio_extract").join("settings.toml"))
    }
}
