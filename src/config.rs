//! Save system configuration
//!
//! Defaults work out of the box. A JSON file can override any subset of
//! fields; missing fields keep their defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Directory holding the save file (created on demand)
    pub save_directory: PathBuf,
    pub file_name: String,
    pub autosave_enabled: bool,
    /// Seconds of play between autosaves
    pub autosave_interval_secs: u64,
    /// Write to a temp file and rename over the save
    pub atomic_writes: bool,
}

impl Default for SaveConfig {
    fn default() -> Self {
        SaveConfig {
            save_directory: default_save_directory(),
            file_name: "savegame.json".to_string(),
            autosave_enabled: true,
            autosave_interval_secs: 300, // 5 minutes
            atomic_writes: true,
        }
    }
}

impl SaveConfig {
    /// Reads a config file, falling back to defaults when it is missing
    /// or malformed
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(_) => {
                debug!(path = %path.display(), "no save config file, using defaults");
                return SaveConfig::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "save config unreadable, using defaults");
                SaveConfig::default()
            }
        }
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    pub fn save_path(&self) -> PathBuf {
        self.save_directory.join(&self.file_name)
    }
}

/// Platform data directory, or `./saves` when there is none
fn default_save_directory() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .map(|p| p.join("game1").join("saves"))
        .unwrap_or_else(|| PathBuf::from("./saves"))
}
