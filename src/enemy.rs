use crate::components::{Collider, EntityParts, RigidBody, Visual};
use crate::geometry::{Vec2, Vec3};
use crate::host::EntityId;
use crate::item::ItemCatalog;
use crate::save::saveable::{EntityKind, ImportOutcome, Persistable, Record, check_finite, kind_mismatch};
use crate::save::{EnemyRecord, EnemyTunables, ParticipantError};
use crate::stats::{DamageResult, Health};

/// Everything needed to build an enemy, minus its saved state
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyBlueprint {
    pub name: String,
    pub max_health: f32,
    pub tunables: EnemyTunables,
    pub parts: EntityParts,
}

impl EnemyBlueprint {
    /// Enemy assembled from primitives: a red square with a body and a box
    /// collider. Used when no prefab or living template exists.
    pub fn minimal() -> Self {
        EnemyBlueprint {
            name: "slime".to_string(),
            max_health: 30.0,
            tunables: EnemyTunables::default(),
            parts: EntityParts {
                visual: Some(Visual::placeholder([255, 0, 0, 255], 32.0)),
                rigid_body: Some(RigidBody::character()),
                collider: Some(Collider::Box {
                    width: 28.0,
                    height: 20.0,
                }),
            },
        }
    }

    /// Structural copy of an existing enemy (not its state)
    pub fn from_enemy(enemy: &Enemy) -> Self {
        EnemyBlueprint {
            name: enemy.name.clone(),
            max_health: enemy.health.max(),
            tunables: enemy.tunables,
            parts: enemy.parts.clone(),
        }
    }
}

pub struct Enemy {
    id: EntityId,
    pub name: String,
    pub position: Vec3,
    pub facing_right: bool,
    health: Health,
    alive: bool,
    pub active: bool,
    player_detected: bool,
    pub tunables: EnemyTunables,
    /// Seconds until the next attack is allowed
    attack_timer: f32,
    /// Set once death effects ran (or were restored as already run)
    death_handled: bool,
    death_effects_fired: u32,
    pub parts: EntityParts,
}

impl Enemy {
    pub fn from_blueprint(id: EntityId, blueprint: &EnemyBlueprint, position: Vec3) -> Self {
        Enemy {
            id,
            name: blueprint.name.clone(),
            position,
            facing_right: true,
            health: Health::new(blueprint.max_health),
            alive: true,
            active: true,
            player_detected: false,
            tunables: blueprint.tunables,
            attack_timer: 0.0,
            death_handled: false,
            death_effects_fired: 0,
            parts: blueprint.parts.clone(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn player_detected(&self) -> bool {
        self.player_detected
    }

    pub fn attack_ready(&self) -> bool {
        self.attack_timer <= 0.0
    }

    /// How many times death effects (loot, sound, corpse) were triggered
    pub fn death_effects_fired(&self) -> u32 {
        self.death_effects_fired
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageResult {
        if !self.alive {
            return DamageResult::no_damage();
        }

        let result = self.health.take_damage(amount);
        if result.is_fatal {
            self.die();
        }
        result
    }

    fn die(&mut self) {
        self.alive = false;
        self.active = false;
        if !self.death_handled {
            self.death_handled = true;
            self.death_effects_fired += 1;
        }
    }

    /// Chases the player when in detection range and attacks when close
    ///
    /// Returns the damage dealt this frame, if an attack landed.
    pub fn update(&mut self, delta_time: f32, player_position: Option<Vec2>) -> Option<f32> {
        self.attack_timer = (self.attack_timer - delta_time).max(0.0);

        if !self.alive || !self.active {
            return None;
        }

        let target = player_position?;
        let here = self.position.xy();
        let distance = here.distance(target);
        self.player_detected = distance <= self.tunables.detection_range;

        if !self.player_detected {
            return None;
        }

        self.facing_right = target.x >= here.x;

        if distance <= self.tunables.attack_range {
            if self.attack_ready() {
                self.attack_timer = self.tunables.attack_cooldown;
                return Some(self.tunables.attack_damage);
            }
            return None;
        }

        let step = (self.tunables.move_speed * delta_time).min(distance);
        self.position.x += (target.x - here.x) / distance * step;
        self.position.y += (target.y - here.y) / distance * step;
        None
    }
}

impl Persistable for Enemy {
    fn kind(&self) -> EntityKind {
        EntityKind::Enemy
    }

    fn identify(&self) -> String {
        format!(
            "enemy#{}@{:.1},{:.1},{:.1}",
            self.id, self.position.x, self.position.y, self.position.z
        )
    }

    fn export(&self, _catalog: &ItemCatalog) -> Result<Record, ParticipantError> {
        check_finite(
            self,
            &[
                ("position", self.position.is_finite()),
                ("current health", self.health.current().is_finite()),
                ("max health", self.health.max().is_finite()),
                ("tunables", self.tunables.is_finite()),
            ],
        )?;
        if self.health.max() <= 0.0 {
            return Err(ParticipantError::invalid_state(
                self.identify(),
                EntityKind::Enemy,
                "max health must be positive",
            ));
        }

        Ok(Record::Enemy(EnemyRecord {
            position: self.position,
            current_health: self.health.current(),
            max_health: self.health.max(),
            alive: self.alive,
            active: self.active,
            facing_right: self.facing_right,
            player_detected: self.player_detected,
            tunables: self.tunables,
        }))
    }

    fn import(&mut self, record: &Record, _catalog: &ItemCatalog) -> Result<ImportOutcome, ParticipantError> {
        let Record::Enemy(data) = record else {
            return Err(kind_mismatch(EntityKind::Enemy, record));
        };

        self.position = data.position;
        self.health = Health::restore(data.current_health, data.max_health);
        self.alive = data.alive;
        self.active = data.active;
        self.facing_right = data.facing_right;
        self.player_detected = data.player_detected;
        self.tunables = data.tunables;
        self.attack_timer = 0.0;
        // A dead enemy arrives dead; its death already happened before the save
        self.death_handled = !data.alive;

        Ok(ImportOutcome::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy() -> Enemy {
        Enemy::from_blueprint(7, &EnemyBlueprint::minimal(), Vec3::new(0.0, 0.0, 0.0))
    }

    #[test]
    fn test_death_effects_fire_once() {
        let mut slime = enemy();
        slime.take_damage(100.0);
        slime.take_damage(100.0);

        assert!(!slime.is_alive());
        assert_eq!(slime.death_effects_fired(), 1);
    }

    #[test]
    fn test_import_dead_state_does_not_fire_death_effects() {
        let catalog = ItemCatalog::create_default();
        let mut slime = enemy();
        let mut record = match slime.export(&catalog).unwrap() {
            Record::Enemy(r) => r,
            _ => unreachable!(),
        };
        record.alive = false;
        record.active = false;
        record.current_health = 0.0;

        slime.import(&Record::Enemy(record), &catalog).unwrap();
        slime.take_damage(10.0);

        assert!(!slime.is_alive());
        assert_eq!(slime.death_effects_fired(), 0);
    }

    #[test]
    fn test_import_resets_attack_cooldown() {
        let catalog = ItemCatalog::create_default();
        let mut slime = enemy();
        let player = Some(Vec2::new(5.0, 0.0));

        assert_eq!(slime.update(0.1, player), Some(10.0));
        assert!(!slime.attack_ready());

        let record = slime.export(&catalog).unwrap();
        slime.import(&record, &catalog).unwrap();
        assert!(slime.attack_ready());
    }

    #[test]
    fn test_tunables_survive_round_trip() {
        let catalog = ItemCatalog::create_default();
        let mut slime = enemy();
        slime.tunables.move_speed = 200.0;
        slime.tunables.attack_damage = 3.5;

        let record = slime.export(&catalog).unwrap();
        let mut fresh = enemy();
        fresh.import(&record, &catalog).unwrap();

        assert_eq!(fresh.tunables, slime.tunables);
    }

    #[test]
    fn test_chases_detected_player() {
        let mut slime = enemy();
        slime.update(1.0, Some(Vec2::new(100.0, 0.0)));

        assert!(slime.player_detected());
        assert!(slime.facing_right);
        assert_eq!(slime.position.x, 60.0);
    }

    #[test]
    fn test_identity_includes_instance_id() {
        let slime = enemy();
        assert!(slime.identify().starts_with("enemy#7@"));
    }

    #[test]
    fn test_export_rejects_non_finite_values() {
        let catalog = ItemCatalog::create_default();

        let mut buffed = enemy();
        buffed.tunables.detection_range = f32::INFINITY;
        let err = buffed.export(&catalog).unwrap_err();
        assert!(matches!(err, ParticipantError::InvalidState { ref reason, .. } if reason == "tunables is not finite"));

        let mut broken = enemy();
        broken.health = Health::new(f32::NAN);
        assert!(broken.export(&catalog).is_err());
    }
}
