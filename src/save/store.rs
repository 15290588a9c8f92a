//! Save store for reading and writing the save document
//!
//! This module provides the SaveStore struct which handles:
//! - Writing the whole document as pretty JSON
//! - Reading it back with a schema version check
//! - Existence checks and deletion
//! - Cheap summaries for the load screen

use serde::Deserialize;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::error::{DeleteError, LoadError, SaveError};
use super::types::*;
use crate::config::SaveConfig;

/// One save slot at a fixed path
pub struct SaveStore {
    path: PathBuf,
    atomic_writes: bool,
}

impl SaveStore {
    /// Creates a store for the configured save file
    ///
    /// The save directory will be created if it doesn't exist.
    pub fn new(config: &SaveConfig) -> Result<Self, SaveError> {
        let save_dir = &config.save_directory;

        if !save_dir.exists() {
            fs::create_dir_all(save_dir).map_err(|source| SaveError::Io {
                path: save_dir.clone(),
                source,
            })?;
        }

        Ok(SaveStore {
            path: save_dir.join(&config.file_name),
            atomic_writes: config.atomic_writes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save the document, replacing any previous save
    ///
    /// With atomic writes the JSON goes to a sibling temp file first and is
    /// renamed over the save, so a failed write leaves the old save intact.
    pub fn save(&self, document: &SaveDocument) -> Result<(), SaveError> {
        // Serialize to JSON (pretty format for readability/debugging)
        let json = serde_json::to_string_pretty(document)?;

        if self.atomic_writes {
            let temp_path = self.temp_path();
            fs::write(&temp_path, &json).map_err(|source| SaveError::Io {
                path: temp_path.clone(),
                source,
            })?;
            if let Err(source) = fs::rename(&temp_path, &self.path) {
                let _ = fs::remove_file(&temp_path);
                return Err(SaveError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        } else {
            fs::write(&self.path, &json).map_err(|source| SaveError::Io {
                path: self.path.clone(),
                source,
            })?;
        }

        info!(
            path = %self.path.display(),
            bytes = json.len(),
            trigger = %document.trigger,
            "game saved"
        );
        Ok(())
    }

    /// Load the save document
    pub fn load(&self) -> Result<SaveDocument, LoadError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                return Err(LoadError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(LoadError::Io(e)),
        };

        let document: SaveDocument = serde_json::from_str(&json).map_err(LoadError::Corrupt)?;
        check_schema_version(&document.schema_version)?;

        debug!(
            version = %document.schema_version,
            saved_at = %document.saved_at,
            "save loaded"
        );
        Ok(document)
    }

    /// Check if a save file exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn delete(&self) -> Result<(), DeleteError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "save deleted");
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Err(DeleteError::NotFound(self.path.clone())),
            Err(e) => Err(DeleteError::Io(e)),
        }
    }

    /// Reads only the document header for display
    ///
    /// Returns None when there is no save or it can't be read.
    pub fn describe(&self) -> Option<SaveSummary> {
        let file_size = fs::metadata(&self.path).ok()?.len();
        let json = fs::read_to_string(&self.path).ok()?;

        let header: DocumentHeader = match serde_json::from_str(&json) {
            Ok(header) => header,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "save header unreadable");
                return None;
            }
        };

        Some(SaveSummary {
            saved_at: header.saved_at,
            elapsed_play_time: header.elapsed_play_time,
            active_scene_id: header.active_scene_id,
            schema_version: header.schema_version,
            trigger: header.trigger,
            file_size,
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Top-level document fields; entity sections are skipped
#[derive(Deserialize)]
struct DocumentHeader {
    schema_version: String,
    saved_at: chrono::DateTime<chrono::Utc>,
    elapsed_play_time: f64,
    active_scene_id: String,
    #[serde(default)]
    trigger: SaveTrigger,
}

/// Accepts any version with the current major number
///
/// Older minors decode best-effort (missing fields take their defaults);
/// newer minors load with a warning and unknown fields are ignored.
pub fn check_schema_version(version: &str) -> Result<SchemaVersion, LoadError> {
    let parsed: SchemaVersion = version
        .parse()
        .map_err(|_| LoadError::UnsupportedVersion(version.to_string()))?;
    let current = SchemaVersion::current();

    if parsed.major != current.major {
        return Err(LoadError::UnsupportedVersion(version.to_string()));
    }
    if parsed.minor > current.minor {
        warn!(
            save_version = %parsed,
            current = %current,
            "save written by a newer build; unknown fields will be ignored"
        );
    }
    Ok(parsed)
}
