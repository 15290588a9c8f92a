//! Persistable trait for entities that take part in save/load
//!
//! Any entity whose state goes into the save file implements this trait.
//! The save system never inspects concrete entity types: it asks each
//! participant for a `Record` and dispatches on the variant.

use std::fmt;

use super::error::ParticipantError;
use super::types::{EnemyRecord, ItemPickupRecord, PlayerRecord};
use crate::item::ItemCatalog;

/// The kinds of entity the save file knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Enemy,
    ItemPickup,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Player => "player",
            EntityKind::Enemy => "enemy",
            EntityKind::ItemPickup => "item pickup",
        };
        f.write_str(label)
    }
}

/// Exported state of one participant
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Player(PlayerRecord),
    Enemy(EnemyRecord),
    ItemPickup(ItemPickupRecord),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Player(_) => EntityKind::Player,
            Record::Enemy(_) => EntityKind::Enemy,
            Record::ItemPickup(_) => EntityKind::ItemPickup,
        }
    }
}

/// Non-fatal side effects of an import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOutcome {
    /// Inventory slots that could not be resolved and were dropped
    pub dropped_items: usize,
    /// Item units cut off because a stack cap was smaller than the saved
    /// quantity
    pub truncated_items: u32,
}

/// Trait for entities that can be saved and loaded
///
/// # Example
///
/// ```ignore
/// impl Persistable for Enemy {
///     fn export(&self, _catalog: &ItemCatalog) -> Result<Record, ParticipantError> {
///         Ok(Record::Enemy(EnemyRecord { /* ... */ }))
///     }
///
///     fn import(&mut self, record: &Record, _catalog: &ItemCatalog)
///         -> Result<ImportOutcome, ParticipantError> {
///         let Record::Enemy(data) = record else { /* kind mismatch */ };
///         // overwrite live fields
///     }
/// }
/// ```
pub trait Persistable {
    fn kind(&self) -> EntityKind;

    /// Key for logs: kind plus position (plus instance id for enemies).
    /// Not stable across restarts for spawned entities.
    fn identify(&self) -> String;

    /// Snapshot of current state. Must not mutate; fails instead of
    /// returning partial data.
    fn export(&self, catalog: &ItemCatalog) -> Result<Record, ParticipantError>;

    /// Overwrite live state from a record of the same kind
    ///
    /// Transient timers go back to safe defaults rather than the values at
    /// save time.
    fn import(&mut self, record: &Record, catalog: &ItemCatalog) -> Result<ImportOutcome, ParticipantError>;
}

/// Shorthand for the mismatch error an `import` returns
pub(crate) fn kind_mismatch(expected: EntityKind, record: &Record) -> ParticipantError {
    ParticipantError::KindMismatch {
        expected,
        found: record.kind(),
    }
}

/// Fails on the first field that is not finite
///
/// serde_json writes NaN and infinities as `null`, which the loader then
/// rejects for the whole document, so such a participant must not export.
pub(crate) fn check_finite<P: Persistable + ?Sized>(
    participant: &P,
    fields: &[(&str, bool)],
) -> Result<(), ParticipantError> {
    match fields.iter().find(|(_, finite)| !finite) {
        Some((name, _)) => Err(ParticipantError::invalid_state(
            participant.identify(),
            participant.kind(),
            format!("{name} is not finite"),
        )),
        None => Ok(()),
    }
}
