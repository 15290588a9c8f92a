// GameWorld struct and entity management
//
// GameWorld owns every entity in the active scene and plays the engine's
// role for the save system: it hands out participants, creates and destroys
// entities, loads scenes over several updates and enforces a physics body
// budget.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::scene::{PendingLoad, SceneLayout};
use crate::components::RigidBody;
use crate::enemy::{Enemy, EnemyBlueprint};
use crate::geometry::{Vec2, Vec3};
use crate::host::{EntityId, HostError, SceneHost};
use crate::item::ItemStack;
use crate::item_pickup::ItemPickup;
use crate::player::Player;
use crate::save::GameSettings;
use crate::save::saveable::Persistable;

pub struct GameWorld {
    active_scene: String,
    pub player: Option<Player>,
    pub enemies: Vec<Enemy>,
    pub pickups: Vec<ItemPickup>,
    next_entity_id: EntityId,
    enemy_prefab: Option<EnemyBlueprint>,
    scenes: HashMap<String, SceneLayout>,
    pending_load: Option<PendingLoad>,
    /// Maximum number of rigid bodies alive at once
    body_budget: Option<usize>,
    settings: GameSettings,
}

impl GameWorld {
    /// Empty world showing `scene_id`, with no player yet
    pub fn new(scene_id: impl Into<String>) -> Self {
        GameWorld {
            active_scene: scene_id.into(),
            player: None,
            enemies: Vec::new(),
            pickups: Vec::new(),
            next_entity_id: 1,
            enemy_prefab: None,
            scenes: HashMap::new(),
            pending_load: None,
            body_budget: None,
            settings: GameSettings::default(),
        }
    }

    pub fn with_body_budget(mut self, budget: usize) -> Self {
        self.body_budget = Some(budget);
        self
    }

    pub fn set_enemy_prefab(&mut self, prefab: Option<EnemyBlueprint>) {
        self.enemy_prefab = prefab;
    }

    pub fn register_scene(&mut self, scene_id: impl Into<String>, layout: SceneLayout) {
        self.scenes.insert(scene_id.into(), layout);
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    fn bodies_in_use(&self) -> usize {
        self.enemies.iter().filter(|e| e.parts.has_physics()).count()
    }

    fn body_available(&self) -> bool {
        self.body_budget.is_none_or(|budget| self.bodies_in_use() < budget)
    }

    pub fn spawn_player(&mut self, position: Vec2) -> &mut Player {
        self.player.insert(Player::new(position))
    }

    /// Spawns an enemy from the prefab (or the built-in slime)
    pub fn spawn_enemy(&mut self, position: Vec3) -> Result<EntityId, HostError> {
        let blueprint = self.enemy_prefab.clone().unwrap_or_else(EnemyBlueprint::minimal);
        let id = self.instantiate_enemy(&blueprint)?;
        if let Some(enemy) = self.enemy_mut(id) {
            enemy.position = position;
        }
        Ok(id)
    }

    pub fn spawn_pickup(&mut self, origin: Vec3, item: ItemStack) -> EntityId {
        let id = self.allocate_id();
        self.pickups.push(ItemPickup::new(id, origin, item));
        id
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id() == id)
    }

    /// Advances a pending scene load, then every entity
    pub fn update(&mut self, delta_time: f32) {
        self.advance_scene_load();

        let player_position = self.player.as_ref().filter(|p| p.is_alive()).map(|p| p.position);

        if let Some(player) = self.player.as_mut() {
            player.update(delta_time);
        }

        for enemy in self.enemies.iter_mut() {
            if let Some(damage) = enemy.update(delta_time, player_position) {
                if let Some(player) = self.player.as_mut() {
                    let hit = player.take_damage(damage);
                    if hit.damage_dealt > 0.0 {
                        debug!(enemy = enemy.id(), damage = hit.damage_dealt, fatal = hit.is_fatal, "player hit");
                    }
                }
            }
        }

        self.update_pickups(delta_time);
    }

    /// Bobs pickups and moves any the player touches into the inventory
    fn update_pickups(&mut self, delta_time: f32) {
        for pickup in self.pickups.iter_mut() {
            pickup.update(delta_time);

            let Some(player) = self.player.as_mut() else {
                continue;
            };
            if pickup.is_picked_up() || !pickup.in_reach(player.position) {
                continue;
            }
            let Some(item) = pickup.item().cloned() else {
                continue;
            };
            // Only collect what fits entirely
            match player.pick_up(item) {
                Ok(0) => {
                    pickup.collect();
                }
                Ok(overflow) => debug!(overflow, "inventory full, pickup left in place"),
                Err(e) => debug!(error = %e, "pickup not collected"),
            }
        }

        self.pickups.retain(|p| !p.should_despawn());
    }

    fn advance_scene_load(&mut self) {
        let Some(pending) = self.pending_load.as_mut() else {
            return;
        };
        if pending.ticks_left > 0 {
            pending.ticks_left -= 1;
            return;
        }

        let scene_id = pending.scene_id.clone();
        self.pending_load = None;
        self.enter_scene(&scene_id);
    }

    /// Swaps in a registered scene's layout
    fn enter_scene(&mut self, scene_id: &str) {
        let Some(layout) = self.scenes.get(scene_id).cloned() else {
            warn!(scene = %scene_id, "scene vanished while loading");
            return;
        };

        self.enemies.clear();
        self.pickups.clear();
        self.player = layout.player_spawn.map(Player::new);
        self.active_scene = scene_id.to_string();

        for position in layout.enemy_spawns {
            if let Err(e) = self.spawn_enemy(position) {
                warn!(scene = %scene_id, error = %e, "layout enemy not spawned");
            }
        }
        for (origin, item) in layout.pickup_spawns {
            self.spawn_pickup(origin, item);
        }

        info!(scene = %scene_id, "scene loaded");
    }
}

impl SceneHost for GameWorld {
    fn active_scene_id(&self) -> &str {
        &self.active_scene
    }

    fn participants(&self) -> Vec<&dyn Persistable> {
        let mut participants: Vec<&dyn Persistable> = Vec::new();

        if let Some(player) = &self.player {
            participants.push(player);
        }
        for enemy in &self.enemies {
            participants.push(enemy);
        }
        for pickup in &self.pickups {
            participants.push(pickup);
        }

        participants
    }

    fn has_player(&self) -> bool {
        self.player.is_some()
    }

    fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }

    fn enemy_ids(&self) -> Vec<EntityId> {
        self.enemies.iter().map(Enemy::id).collect()
    }

    fn pickup_ids(&self) -> Vec<EntityId> {
        self.pickups.iter().map(ItemPickup::id).collect()
    }

    fn destroy(&mut self, id: EntityId) {
        self.enemies.retain(|e| e.id() != id);
        self.pickups.retain(|p| p.id() != id);
    }

    fn enemy_prefab(&self) -> Option<EnemyBlueprint> {
        self.enemy_prefab.clone()
    }

    fn living_enemy_blueprint(&self) -> Option<EnemyBlueprint> {
        self.enemies
            .iter()
            .find(|e| e.is_alive())
            .map(EnemyBlueprint::from_enemy)
    }

    /// Creates an enemy from a blueprint
    ///
    /// When the body budget is spent the enemy is still created, just
    /// without its rigid body.
    fn instantiate_enemy(&mut self, blueprint: &EnemyBlueprint) -> Result<EntityId, HostError> {
        let id = self.allocate_id();
        let mut enemy = Enemy::from_blueprint(id, blueprint, Vec3::default());

        if enemy.parts.rigid_body.is_some() && !self.body_available() {
            debug!(entity = id, "body budget spent, enemy created without rigid body");
            enemy.parts.rigid_body = None;
        }

        self.enemies.push(enemy);
        Ok(id)
    }

    fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id() == id)
    }

    fn attach_rigid_body(&mut self, id: EntityId) -> Result<(), HostError> {
        if !self.body_available() {
            return Err(HostError::PhysicsBudgetExhausted(self.body_budget.unwrap_or_default()));
        }

        let enemy = self.enemy_mut(id).ok_or(HostError::UnknownEntity(id))?;
        enemy.parts.rigid_body.get_or_insert_with(RigidBody::character);
        Ok(())
    }

    fn instantiate_pickup(&mut self) -> Result<EntityId, HostError> {
        let id = self.allocate_id();
        self.pickups.push(ItemPickup::empty(id));
        Ok(id)
    }

    fn pickup_mut(&mut self, id: EntityId) -> Option<&mut ItemPickup> {
        self.pickups.iter_mut().find(|p| p.id() == id)
    }

    fn begin_scene_load(&mut self, scene_id: &str) -> Result<(), HostError> {
        if let Some(pending) = &self.pending_load {
            return Err(HostError::LoadInProgress(pending.scene_id.clone()));
        }
        let layout = self
            .scenes
            .get(scene_id)
            .ok_or_else(|| HostError::UnknownScene(scene_id.to_string()))?;

        self.pending_load = Some(PendingLoad {
            scene_id: scene_id.to_string(),
            ticks_left: layout.load_ticks,
        });
        debug!(scene = %scene_id, ticks = layout.load_ticks, "scene load queued");
        Ok(())
    }

    fn scene_load_complete(&self) -> bool {
        self.pending_load.is_none()
    }

    fn scene_has_player(&self, scene_id: &str) -> bool {
        // unknown scenes are reported by begin_scene_load
        self.scenes
            .get(scene_id)
            .is_none_or(|layout| layout.player_spawn.is_some())
    }

    fn apply_settings(&mut self, settings: &GameSettings) {
        self.settings = *settings;
    }
}
