//! Reconciler: turns a loaded document back into live entities
//!
//! # State Machine
//!
//! ```text
//! Idle -> SceneCheck -> DirectApply -> Done
//!              |             ^
//!              v             |
//!         AwaitSceneLoad ----+
//! ```
//!
//! `poll` is called once per tick. While the host is loading the saved
//! scene it returns `Poll::Pending`; nothing blocks. Everything after the
//! scene check happens inside a single `poll` call, so no gameplay update
//! can observe a half-applied world.

use std::task::Poll;
use tracing::{debug, info, warn};

use super::error::{ReconcileError, RecreateError};
use super::saveable::{EntityKind, ImportOutcome, Persistable, Record};
use super::types::{EnemyRecord, ItemPickupRecord, SaveDocument};
use crate::enemy::EnemyBlueprint;
use crate::host::SceneHost;
use crate::item::ItemCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    Idle,
    SceneCheck,
    AwaitSceneLoad,
    DirectApply,
    Done,
}

/// Where a recreated enemy's structure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource {
    Prefab,
    LivingEnemy,
    Synthesized,
}

/// What a finished pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub scene_changed: bool,
    pub destroyed: usize,
    pub enemies_recreated: usize,
    pub pickups_recreated: usize,
    /// Pickups not recreated because they were already picked up
    pub pickups_skipped: usize,
    /// Template used for each recreated enemy, in record order
    pub enemy_templates: Vec<TemplateSource>,
    pub dropped_inventory_slots: usize,
    /// Item units cut off because a stack exceeded its cap, player and
    /// pickups together
    pub truncated_items: u32,
    pub failures: Vec<RecreateError>,
}

pub struct Reconciler {
    state: ReconcileState,
    document: Option<SaveDocument>,
    scene_changed: bool,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Reconciler {
            state: ReconcileState::Idle,
            document: None,
            scene_changed: false,
        }
    }

    pub fn state(&self) -> ReconcileState {
        self.state
    }

    /// True while a pass is in flight
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            ReconcileState::SceneCheck | ReconcileState::AwaitSceneLoad | ReconcileState::DirectApply
        )
    }

    /// Hands a document to the reconciler
    ///
    /// Refused while another pass is still running.
    pub fn begin(&mut self, document: SaveDocument) -> Result<(), ReconcileError> {
        if self.is_busy() {
            return Err(ReconcileError::Busy);
        }

        debug!(scene = %document.active_scene_id, "reconcile started");
        self.document = Some(document);
        self.scene_changed = false;
        self.state = ReconcileState::SceneCheck;
        Ok(())
    }

    /// Advances the pass by one tick
    pub fn poll<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        catalog: &ItemCatalog,
    ) -> Poll<Result<ApplyReport, ReconcileError>> {
        loop {
            match self.state {
                ReconcileState::Idle | ReconcileState::Done => {
                    return Poll::Ready(Err(ReconcileError::NotStarted));
                }
                ReconcileState::SceneCheck => {
                    let Some(target) = self.document.as_ref().map(|d| d.active_scene_id.clone()) else {
                        self.state = ReconcileState::Idle;
                        return Poll::Ready(Err(ReconcileError::NotStarted));
                    };

                    if host.active_scene_id() == target {
                        self.state = ReconcileState::DirectApply;
                        continue;
                    }

                    if !host.scene_has_player(&target) {
                        warn!(scene = %target, "saved scene has no player, load aborted");
                        return Poll::Ready(Err(self.fail(ReconcileError::MissingPlayer)));
                    }

                    info!(from = %host.active_scene_id(), to = %target, "loading saved scene");
                    if let Err(source) = host.begin_scene_load(&target) {
                        warn!(scene = %target, error = %source, "scene load refused");
                        return Poll::Ready(Err(self.fail(ReconcileError::SceneLoad {
                            scene: target,
                            source,
                        })));
                    }
                    self.scene_changed = true;
                    self.state = ReconcileState::AwaitSceneLoad;
                    return Poll::Pending;
                }
                ReconcileState::AwaitSceneLoad => {
                    let arrived = self
                        .document
                        .as_ref()
                        .is_some_and(|d| host.scene_load_complete() && host.active_scene_id() == d.active_scene_id);
                    if !arrived {
                        return Poll::Pending;
                    }
                    debug!("saved scene finished loading");
                    self.state = ReconcileState::DirectApply;
                }
                ReconcileState::DirectApply => {
                    let Some(document) = self.document.take() else {
                        self.state = ReconcileState::Idle;
                        return Poll::Ready(Err(ReconcileError::NotStarted));
                    };

                    let result = apply(host, &document, catalog).map(|mut report| {
                        report.scene_changed = self.scene_changed;
                        report
                    });
                    self.state = ReconcileState::Done;
                    return Poll::Ready(result);
                }
            }
        }
    }

    fn fail(&mut self, error: ReconcileError) -> ReconcileError {
        self.document = None;
        self.state = ReconcileState::Done;
        error
    }
}

/// Destroys transients, recreates them from the document, then updates the
/// player
///
/// The player check happens before any entity of the current scene is
/// destroyed. A scene switch has already happened by then; hosts avoid that
/// case by answering `scene_has_player` before the switch.
fn apply<H: SceneHost + ?Sized>(
    host: &mut H,
    document: &SaveDocument,
    catalog: &ItemCatalog,
) -> Result<ApplyReport, ReconcileError> {
    if !host.has_player() {
        warn!("no player entity in scene, load aborted");
        return Err(ReconcileError::MissingPlayer);
    }

    let mut report = ApplyReport::default();

    // Step 1: clear transients (keep a living enemy's shape as a template)
    let mut fallback_template = host.living_enemy_blueprint();
    for id in host.enemy_ids().into_iter().chain(host.pickup_ids()) {
        host.destroy(id);
        report.destroyed += 1;
    }

    // Step 2: enemies
    for (index, record) in document.enemies.iter().enumerate() {
        match recreate_enemy(host, index, record, &mut fallback_template, catalog) {
            Ok(source) => {
                report.enemies_recreated += 1;
                report.enemy_templates.push(source);
            }
            Err(e) => {
                warn!(error = %e, "enemy not recreated");
                report.failures.push(e);
            }
        }
    }

    // Step 3: pickups
    for (index, record) in document.item_pickups.iter().enumerate() {
        if record.picked_up {
            report.pickups_skipped += 1;
            continue;
        }
        match recreate_pickup(host, index, record, catalog) {
            Ok(outcome) => {
                report.pickups_recreated += 1;
                report.truncated_items += outcome.truncated_items;
            }
            Err(e) => {
                warn!(error = %e, "item pickup not recreated");
                report.failures.push(e);
            }
        }
    }

    // Step 4: player
    if let Some(record) = &document.player {
        let player = host.player_mut().ok_or(ReconcileError::MissingPlayer)?;
        match player.import(&Record::Player(record.clone()), catalog) {
            Ok(outcome) => {
                report.dropped_inventory_slots = outcome.dropped_items;
                report.truncated_items += outcome.truncated_items;
            }
            Err(e) => warn!(error = %e, "player state not applied"),
        }
    } else {
        warn!("save has no player record, player left as is");
    }

    host.apply_settings(&document.settings);

    info!(
        destroyed = report.destroyed,
        enemies = report.enemies_recreated,
        pickups = report.pickups_recreated,
        skipped = report.pickups_skipped,
        truncated = report.truncated_items,
        failures = report.failures.len(),
        "save applied"
    );
    Ok(report)
}

/// Prefab, then living template, then a primitive enemy
fn pick_enemy_template<H: SceneHost + ?Sized>(
    host: &H,
    fallback: &Option<EnemyBlueprint>,
) -> (EnemyBlueprint, TemplateSource) {
    if let Some(prefab) = host.enemy_prefab() {
        return (prefab, TemplateSource::Prefab);
    }
    if let Some(template) = fallback.clone().or_else(|| host.living_enemy_blueprint()) {
        return (template, TemplateSource::LivingEnemy);
    }
    (EnemyBlueprint::minimal(), TemplateSource::Synthesized)
}

fn recreate_enemy<H: SceneHost + ?Sized>(
    host: &mut H,
    index: usize,
    record: &EnemyRecord,
    fallback: &mut Option<EnemyBlueprint>,
    catalog: &ItemCatalog,
) -> Result<TemplateSource, RecreateError> {
    let kind = EntityKind::Enemy;
    let (blueprint, source) = pick_enemy_template(host, fallback);

    let id = host
        .instantiate_enemy(&blueprint)
        .map_err(|source| RecreateError::Host { kind, index, source })?;

    let has_body = host.enemy_mut(id).map(|enemy| enemy.parts.has_physics());
    match has_body {
        None => return Err(RecreateError::Vanished { kind, index, entity: id }),
        Some(false) => {
            if let Err(source) = host.attach_rigid_body(id) {
                host.destroy(id);
                return Err(RecreateError::MissingPhysics { kind, index, source });
            }
        }
        Some(true) => {}
    }

    let Some(enemy) = host.enemy_mut(id) else {
        return Err(RecreateError::Vanished { kind, index, entity: id });
    };
    if let Err(source) = enemy.import(&Record::Enemy(record.clone()), catalog) {
        host.destroy(id);
        return Err(RecreateError::Import { kind, index, source });
    }

    if fallback.is_none() && record.alive {
        *fallback = Some(EnemyBlueprint::from_enemy(enemy));
    }

    debug!(index, entity = id, ?source, "enemy recreated");
    Ok(source)
}

fn recreate_pickup<H: SceneHost + ?Sized>(
    host: &mut H,
    index: usize,
    record: &ItemPickupRecord,
    catalog: &ItemCatalog,
) -> Result<ImportOutcome, RecreateError> {
    let kind = EntityKind::ItemPickup;

    let id = host
        .instantiate_pickup()
        .map_err(|source| RecreateError::Host { kind, index, source })?;

    let Some(pickup) = host.pickup_mut(id) else {
        return Err(RecreateError::Vanished { kind, index, entity: id });
    };
    match pickup.import(&Record::ItemPickup(record.clone()), catalog) {
        Ok(outcome) => Ok(outcome),
        Err(source) => {
            host.destroy(id);
            Err(RecreateError::Import { kind, index, source })
        }
    }
}
