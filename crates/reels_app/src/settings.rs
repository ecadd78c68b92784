use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use reels_engine::{PipelineSettings, WebDriverSettings};
use reels_logging::{reels_info, Lane};
use serde::{Deserialize, Serialize};

/// Everything the runner reads from its settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub pipeline: PipelineSettings,
    pub webdriver: WebDriverSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize settings: {0}")]
    Serialize(String),
    #[error("failed to write settings to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loads settings from a RON file. A missing file yields the defaults; fields
/// the file leaves out keep their default values.
pub fn load(path: &Path) -> Result<AppSettings, SettingsError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            reels_info!(Lane::Controller, "no settings at {:?}; using defaults", path);
            return Ok(AppSettings::default());
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let settings = ron::from_str(&content).map_err(|err| SettingsError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    reels_info!(Lane::Controller, "loaded settings from {:?}", path);
    Ok(settings)
}

/// Writes `settings` as pretty RON, replacing whatever was at `path`.
pub fn save(path: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(settings, pretty)
        .map_err(|err| SettingsError::Serialize(err.to_string()))?;
    fs::write(path, content).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}
