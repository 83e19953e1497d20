//! Last-used folders, persisted between runs as JSON

use crate::error::{DvhError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file name in the user's home directory
pub const SETTINGS_FILE_NAME: &str = ".dvh_converter_config.json";

/// Persisted driver settings
///
/// Serialized as `{"input_folder": "...", "output_folder": "..."}`. Missing
/// keys read as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input_folder: String,
    pub output_folder: String,
}

impl Settings {
    /// Creates settings from a pair of folders
    pub fn new(input_folder: impl Into<String>, output_folder: impl Into<String>) -> Self {
        Self {
            input_folder: input_folder.into(),
            output_folder: output_folder.into(),
        }
    }

    /// Default settings location, `~/.dvh_converter_config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(SETTINGS_FILE_NAME))
    }

    /// Loads settings, falling back to defaults
    ///
    /// A missing, unreadable or corrupt file is never an error.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("No settings file at {}", path.display());
            return Self::default();
        }

        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()));

        match parsed {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to read the settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Writes settings as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DvhError::Settings(e.to_string()))?;
        fs::write(path, json).map_err(|e| {
            DvhError::Settings(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    /// Input folder, if one was saved
    pub fn input_dir(&self) -> Option<PathBuf> {
        non_empty_path(&self.input_folder)
    }

    /// Output folder, if one was saved
    pub fn output_dir(&self) -> Option<PathBuf> {
        non_empty_path(&self.output_folder)
    }
}

fn non_empty_path(folder: &str) -> Option<PathBuf> {
    (!folder.is_empty()).then(|| PathBuf::from(folder))
}
