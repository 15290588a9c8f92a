//! Error types for save/load operations
//!
//! Each operation family has its own enum. All of them map onto the
//! `ErrorKind` set through `kind()`, which is what UI code branches on.

use std::path::PathBuf;
use thiserror::Error;

use crate::host::HostError;
use crate::save::saveable::EntityKind;

/// Coarse classification of every failure the save system can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    CorruptContent,
    IoFailure,
    ParticipantExportFailure,
    ParticipantRecreateFailure,
    CatalogResolutionFailure,
    MissingPlayerFailure,
}

/// Writing a document failed. Any previous save is left in place.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SaveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SaveError::Io { .. } => ErrorKind::IoFailure,
            SaveError::Serialize(_) => ErrorKind::CorruptContent,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Save file not found: {0}")]
    NotFound(PathBuf),

    #[error("Corrupted save data: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Unsupported save version: {0}")]
    UnsupportedVersion(String),

    #[error("IO error reading save: {0}")]
    Io(#[source] std::io::Error),
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::NotFound(_) => ErrorKind::NotFound,
            LoadError::Corrupt(_) | LoadError::UnsupportedVersion(_) => ErrorKind::CorruptContent,
            LoadError::Io(_) => ErrorKind::IoFailure,
        }
    }
}

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("No save file to delete at {0}")]
    NotFound(PathBuf),

    #[error("IO error deleting save: {0}")]
    Io(#[source] std::io::Error),
}

impl DeleteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeleteError::NotFound(_) => ErrorKind::NotFound,
            DeleteError::Io(_) => ErrorKind::IoFailure,
        }
    }
}

/// A single item reference could not be turned back into an item
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ItemRefError {
    #[error("Unknown item catalog id {0} and no legacy data")]
    UnknownCatalogId(u32),

    #[error("Legacy item reference has no name")]
    MissingLegacyName,

    #[error("Item reference has zero quantity")]
    EmptyStack,
}

impl ItemRefError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::CatalogResolutionFailure
    }
}

/// A participant could not export or import its state
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParticipantError {
    #[error("{kind} '{identity}' is in an invalid state: {reason}")]
    InvalidState {
        identity: String,
        kind: EntityKind,
        reason: String,
    },

    #[error("{expected} cannot import a {found} record")]
    KindMismatch {
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("Item resolution failed: {0}")]
    Catalog(#[from] ItemRefError),
}

impl ParticipantError {
    pub fn invalid_state(identity: impl Into<String>, kind: EntityKind, reason: impl Into<String>) -> Self {
        ParticipantError::InvalidState {
            identity: identity.into(),
            kind,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParticipantError::InvalidState { .. } => ErrorKind::ParticipantExportFailure,
            ParticipantError::KindMismatch { .. } => ErrorKind::ParticipantRecreateFailure,
            ParticipantError::Catalog(_) => ErrorKind::CatalogResolutionFailure,
        }
    }
}

/// An enemy or pickup could not be rebuilt from its record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecreateError {
    #[error("{kind} #{index}: host refused to create it: {source}")]
    Host {
        kind: EntityKind,
        index: usize,
        #[source]
        source: HostError,
    },

    #[error("{kind} #{index}: no rigid body could be attached: {source}")]
    MissingPhysics {
        kind: EntityKind,
        index: usize,
        #[source]
        source: HostError,
    },

    #[error("{kind} #{index}: import failed: {source}")]
    Import {
        kind: EntityKind,
        index: usize,
        #[source]
        source: ParticipantError,
    },

    #[error("{kind} #{index}: entity {entity} vanished after instantiation")]
    Vanished {
        kind: EntityKind,
        index: usize,
        entity: u64,
    },
}

impl RecreateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecreateError::Import {
                source: ParticipantError::Catalog(_),
                ..
            } => ErrorKind::CatalogResolutionFailure,
            _ => ErrorKind::ParticipantRecreateFailure,
        }
    }
}

/// A reconciliation pass could not run or could not finish
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconcileError {
    #[error("No player entity in the scene; nothing was changed")]
    MissingPlayer,

    #[error("Scene '{scene}' could not be loaded: {source}")]
    SceneLoad {
        scene: String,
        #[source]
        source: HostError,
    },

    #[error("A load is already being applied")]
    Busy,

    #[error("No document has been handed to the reconciler")]
    NotStarted,
}

impl ReconcileError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ReconcileError::MissingPlayer => Some(ErrorKind::MissingPlayerFailure),
            _ => None,
        }
    }
}

/// Failures surfaced by the `SaveSystem` load entry points
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_error_kinds() {
        let io = SaveError::Io {
            path: PathBuf::from("save.json"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(io.kind(), ErrorKind::IoFailure);

        let bad = serde_json::from_str::<u32>("not a number").unwrap_err();
        assert_eq!(SaveError::Serialize(bad).kind(), ErrorKind::CorruptContent);
    }
}
