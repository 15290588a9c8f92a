//! Collector: gathers every participant's state into one document
//!
//! One participant failing to export never stops the others. Failures are
//! logged with the participant's identity and kind and handed back to the
//! caller alongside the document.

use chrono::Utc;
use tracing::{info, warn};

use super::error::ParticipantError;
use super::saveable::{Persistable, Record};
use super::types::{CURRENT_SCHEMA_VERSION, GameSettings, SaveDocument, SaveTrigger};
use crate::host::SceneHost;
use crate::item::ItemCatalog;

/// Session values stamped onto every document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectContext {
    pub elapsed_play_time: f64,
    pub settings: GameSettings,
    pub trigger: SaveTrigger,
}

impl Default for CollectContext {
    fn default() -> Self {
        CollectContext {
            elapsed_play_time: 0.0,
            settings: GameSettings::default(),
            trigger: SaveTrigger::Manual,
        }
    }
}

/// Result of a collection pass
#[derive(Debug, Clone)]
pub struct Collection {
    pub document: SaveDocument,
    /// Participants that were skipped, in enumeration order
    pub failures: Vec<ParticipantError>,
}

impl Collection {
    pub fn warning_count(&self) -> usize {
        self.failures.len()
    }
}

/// Collects from every participant the host knows about
pub fn collect<H: SceneHost + ?Sized>(host: &H, context: &CollectContext, catalog: &ItemCatalog) -> Collection {
    collect_from(host.participants(), host.active_scene_id(), context, catalog)
}

/// Collects from an explicit participant list
pub fn collect_from<'p>(
    participants: impl IntoIterator<Item = &'p dyn Persistable>,
    scene_id: &str,
    context: &CollectContext,
    catalog: &ItemCatalog,
) -> Collection {
    let elapsed_play_time = if context.elapsed_play_time.is_finite() {
        context.elapsed_play_time.max(0.0)
    } else {
        warn!(play_time = context.elapsed_play_time, "play time is not finite, saving 0");
        0.0
    };

    let mut document = SaveDocument {
        schema_version: CURRENT_SCHEMA_VERSION.to_string(),
        saved_at: Utc::now(),
        elapsed_play_time,
        active_scene_id: scene_id.to_string(),
        trigger: context.trigger,
        settings: context.settings.sanitized(),
        player: None,
        enemies: Vec::new(),
        item_pickups: Vec::new(),
    };
    let mut failures = Vec::new();

    for participant in participants {
        let record = match participant.export(catalog) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    identity = %participant.identify(),
                    kind = %participant.kind(),
                    error = %e,
                    "export failed, participant skipped"
                );
                failures.push(e);
                continue;
            }
        };

        match record {
            Record::Player(player) => {
                if document.player.is_some() {
                    warn!(
                        identity = %participant.identify(),
                        "second player record dropped"
                    );
                    continue;
                }
                document.player = Some(player);
            }
            Record::Enemy(enemy) => document.enemies.push(enemy),
            Record::ItemPickup(pickup) => document.item_pickups.push(pickup),
        }
    }

    if document.player.is_none() {
        warn!(scene = %scene_id, "no player state collected");
    }

    info!(
        scene = %scene_id,
        enemies = document.enemies.len(),
        pickups = document.item_pickups.len(),
        failures = failures.len(),
        "collected save state"
    );

    Collection { document, failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::{Enemy, EnemyBlueprint};
    use crate::geometry::{Vec2, Vec3};
    use crate::player::Player;
    use crate::save::saveable::{EntityKind, ImportOutcome};

    /// Participant whose export always fails
    struct Broken;

    impl Persistable for Broken {
        fn kind(&self) -> EntityKind {
            EntityKind::Enemy
        }

        fn identify(&self) -> String {
            "broken".to_string()
        }

        fn export(&self, _catalog: &ItemCatalog) -> Result<Record, ParticipantError> {
            Err(ParticipantError::invalid_state("broken", EntityKind::Enemy, "always fails"))
        }

        fn import(&mut self, _record: &Record, _catalog: &ItemCatalog) -> Result<ImportOutcome, ParticipantError> {
            Ok(ImportOutcome::default())
        }
    }

    fn enemy(id: u64, x: f32) -> Enemy {
        Enemy::from_blueprint(id, &EnemyBlueprint::minimal(), Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_collect_on_empty_scene() {
        let catalog = ItemCatalog::create_default();
        let collection = collect_from(Vec::new(), "forest", &CollectContext::default(), &catalog);

        assert!(collection.document.player.is_none());
        assert!(collection.document.enemies.is_empty());
        assert!(collection.document.item_pickups.is_empty());
        assert_eq!(collection.warning_count(), 0);
        assert_eq!(collection.document.active_scene_id, "forest");
    }

    #[test]
    fn test_one_failure_yields_n_minus_one_records() {
        let catalog = ItemCatalog::create_default();
        let player = Player::new(Vec2::new(1.0, 2.0));
        let a = enemy(1, 10.0);
        let b = enemy(2, 20.0);
        let broken = Broken;

        let participants: Vec<&dyn Persistable> = vec![&player, &a, &broken, &b];
        let collection = collect_from(participants, "forest", &CollectContext::default(), &catalog);

        let records = collection.document.enemies.len() + usize::from(collection.document.player.is_some());
        assert_eq!(records, 3);
        assert_eq!(collection.warning_count(), 1);
        assert_eq!(collection.document.enemies[1].position.x, 20.0);
    }

    #[test]
    fn test_second_player_dropped() {
        let catalog = ItemCatalog::create_default();
        let first = Player::new(Vec2::new(1.0, 0.0));
        let second = Player::new(Vec2::new(2.0, 0.0));

        let participants: Vec<&dyn Persistable> = vec![&first, &second];
        let collection = collect_from(participants, "forest", &CollectContext::default(), &catalog);

        assert_eq!(collection.document.player.map(|p| p.position.x), Some(1.0));
    }

    #[test]
    fn test_context_is_stamped() {
        let catalog = ItemCatalog::create_default();
        let context = CollectContext {
            elapsed_play_time: 321.5,
            settings: GameSettings {
                master_volume: 0.25,
                fullscreen: true,
            },
            trigger: SaveTrigger::Autosave,
        };

        let collection = collect_from(Vec::new(), "cave", &context, &catalog);
        let doc = collection.document;
        assert_eq!(doc.elapsed_play_time, 321.5);
        assert_eq!(doc.settings, context.settings);
        assert_eq!(doc.trigger, SaveTrigger::Autosave);
        assert_eq!(doc.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_non_finite_session_values_are_sanitized() {
        let catalog = ItemCatalog::create_default();
        let context = CollectContext {
            elapsed_play_time: f64::INFINITY,
            settings: GameSettings {
                master_volume: f32::NAN,
                fullscreen: true,
            },
            trigger: SaveTrigger::Manual,
        };

        let doc = collect_from(Vec::new(), "forest", &context, &catalog).document;
        assert_eq!(doc.elapsed_play_time, 0.0);
        assert_eq!(doc.settings.master_volume, GameSettings::default().master_volume);
        assert!(doc.settings.fullscreen);
    }

    #[test]
    fn test_non_finite_enemy_is_skipped() {
        let catalog = ItemCatalog::create_default();
        let player = Player::new(Vec2::new(1.0, 2.0));
        let steady = enemy(1, 10.0);
        let mut far_sighted = enemy(2, 20.0);
        far_sighted.tunables.detection_range = f32::INFINITY;

        let participants: Vec<&dyn Persistable> = vec![&player, &steady, &far_sighted];
        let collection = collect_from(participants, "forest", &CollectContext::default(), &catalog);

        assert_eq!(collection.warning_count(), 1);
        assert_eq!(collection.document.enemies.len(), 1);
        assert!(serde_json::to_string(&collection.document).is_ok());
    }
}
