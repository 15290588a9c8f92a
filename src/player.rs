use tracing::debug;

use crate::geometry::Vec2;
use crate::inventory::{Inventory, InventoryError};
use crate::item::{ItemCatalog, ItemStack};
use crate::save::item_ref::{ItemReference, decode_all};
use crate::save::saveable::{EntityKind, ImportOutcome, Persistable, Record, check_finite, kind_mismatch};
use crate::save::{ParticipantError, PlayerRecord};
use crate::stats::{DamageResult, Health};

/// Seconds of invulnerability after taking a hit
const INVULNERABILITY_SECONDS: f32 = 1.0;

pub struct Player {
    pub position: Vec2,
    pub speed: f32,
    pub facing_right: bool,
    health: Health,
    alive: bool,
    pub inventory: Inventory,
    pub current_ammo: u32,
    pub max_ammo: u32,
    pub has_weapon: bool,
    invulnerability_timer: f32,
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        Player {
            position,
            speed: 120.0,
            facing_right: true,
            health: Health::new(100.0),
            alive: true,
            inventory: Inventory::new(20),
            current_ammo: 0,
            max_ammo: 30,
            has_weapon: false,
            invulnerability_timer: 0.0,
        }
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerability_timer > 0.0
    }

    pub fn update(&mut self, delta_time: f32) {
        self.invulnerability_timer = (self.invulnerability_timer - delta_time).max(0.0);
    }

    /// Moves by a direction vector scaled by speed; horizontal input turns
    /// the player around.
    pub fn move_by(&mut self, direction: Vec2, delta_time: f32) {
        if !self.alive {
            return;
        }

        self.position.x += direction.x * self.speed * delta_time;
        self.position.y += direction.y * self.speed * delta_time;

        if direction.x > 0.0 {
            self.facing_right = true;
        } else if direction.x < 0.0 {
            self.facing_right = false;
        }
    }

    /// Applies damage unless the player is dead or still invulnerable
    pub fn take_damage(&mut self, amount: f32) -> DamageResult {
        if !self.alive || self.is_invulnerable() {
            return DamageResult::no_damage();
        }

        let result = self.health.take_damage(amount);
        self.invulnerability_timer = INVULNERABILITY_SECONDS;
        if result.is_fatal {
            self.alive = false;
        }
        result
    }

    /// Picks up a weapon; ammo starts full
    pub fn equip_weapon(&mut self) {
        self.has_weapon = true;
        self.current_ammo = self.max_ammo;
    }

    /// Fires one round. Returns false when there is nothing to fire.
    pub fn fire(&mut self) -> bool {
        if !self.alive || !self.has_weapon || self.current_ammo == 0 {
            return false;
        }
        self.current_ammo -= 1;
        true
    }

    /// Adds an item to the inventory, returning the overflow count
    pub fn pick_up(&mut self, item: ItemStack) -> Result<u32, InventoryError> {
        self.inventory.add_stack(item)
    }
}

impl Persistable for Player {
    fn kind(&self) -> EntityKind {
        EntityKind::Player
    }

    fn identify(&self) -> String {
        format!("player@{:.1},{:.1}", self.position.x, self.position.y)
    }

    fn export(&self, catalog: &ItemCatalog) -> Result<Record, ParticipantError> {
        check_finite(
            self,
            &[
                ("position", self.position.is_finite()),
                ("current health", self.health.current().is_finite()),
                ("max health", self.health.max().is_finite()),
            ],
        )?;
        if self.health.max() <= 0.0 {
            return Err(ParticipantError::invalid_state(
                self.identify(),
                EntityKind::Player,
                "max health must be positive",
            ));
        }

        Ok(Record::Player(PlayerRecord {
            position: self.position,
            current_health: self.health.current(),
            max_health: self.health.max(),
            alive: self.alive,
            facing_right: self.facing_right,
            inventory_items: self
                .inventory
                .iter_items()
                .map(|stack| ItemReference::encode(stack, catalog))
                .collect(),
            max_inventory_slots: self.inventory.capacity() as u32,
            current_ammo: self.current_ammo,
            max_ammo: self.max_ammo,
            has_weapon: self.has_weapon,
        }))
    }

    fn import(&mut self, record: &Record, catalog: &ItemCatalog) -> Result<ImportOutcome, ParticipantError> {
        let Record::Player(data) = record else {
            return Err(kind_mismatch(EntityKind::Player, record));
        };

        let decoded = decode_all(&data.inventory_items, catalog);
        let (inventory, overflow) = Inventory::restore(data.max_inventory_slots as usize, decoded.items);
        if !overflow.is_empty() {
            debug!(count = overflow.len(), "saved inventory larger than its slot count");
        }

        self.position = data.position;
        self.health = Health::restore(data.current_health, data.max_health);
        self.alive = data.alive;
        self.facing_right = data.facing_right;
        self.inventory = inventory;
        self.max_ammo = data.max_ammo;
        self.current_ammo = data.current_ammo.min(data.max_ammo);
        self.has_weapon = data.has_weapon;
        self.invulnerability_timer = 0.0;

        Ok(ImportOutcome {
            dropped_items: decoded.failures.len() + overflow.len(),
            truncated_items: decoded.truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PlayerRecord {
        PlayerRecord {
            position: Vec2::new(10.0, 20.0),
            current_health: 40.0,
            max_health: 100.0,
            alive: true,
            facing_right: false,
            inventory_items: vec![ItemReference::catalog(5, 3), ItemReference::catalog(999, 1)],
            max_inventory_slots: 12,
            current_ammo: 7,
            max_ammo: 30,
            has_weapon: true,
        }
    }

    #[test]
    fn test_import_restores_state_and_drops_bad_slot() {
        let catalog = ItemCatalog::create_default();
        let mut player = Player::new(Vec2::default());

        let outcome = player.import(&Record::Player(record()), &catalog).unwrap();

        assert_eq!(outcome.dropped_items, 1);
        assert_eq!(player.health().current(), 40.0);
        assert_eq!(player.health().max(), 100.0);
        assert!(!player.facing_right);
        assert_eq!(player.inventory.capacity(), 12);
        let items: Vec<_> = player.inventory.iter_items().collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].catalog_id, Some(5));
        assert_eq!(items[0].quantity, 3);
    }

    #[test]
    fn test_import_clears_invulnerability() {
        let catalog = ItemCatalog::create_default();
        let mut player = Player::new(Vec2::default());
        player.take_damage(5.0);
        assert!(player.is_invulnerable());

        player.import(&Record::Player(record()), &catalog).unwrap();
        assert!(!player.is_invulnerable());
    }

    #[test]
    fn test_export_import_preserves_record() {
        let catalog = ItemCatalog::create_default();
        let mut player = Player::new(Vec2::default());
        let mut data = record();
        data.inventory_items.pop();
        player.import(&Record::Player(data.clone()), &catalog).unwrap();

        assert_eq!(player.export(&catalog).unwrap(), Record::Player(data));
    }

    #[test]
    fn test_export_rejects_non_finite_position() {
        let catalog = ItemCatalog::create_default();
        let mut player = Player::new(Vec2::default());
        player.position.x = f32::NAN;

        let err = player.export(&catalog).unwrap_err();
        assert!(matches!(err, ParticipantError::InvalidState { .. }));
    }

    #[test]
    fn test_import_rejects_other_kind() {
        let catalog = ItemCatalog::create_default();
        let mut player = Player::new(Vec2::default());
        let enemy = crate::enemy::Enemy::from_blueprint(1, &crate::enemy::EnemyBlueprint::minimal(), Default::default());
        let record = enemy.export(&catalog).unwrap();

        let err = player.import(&record, &catalog).unwrap_err();
        assert_eq!(
            err,
            ParticipantError::KindMismatch {
                expected: EntityKind::Player,
                found: EntityKind::Enemy
            }
        );
    }

    #[test]
    fn test_fire_consumes_ammo() {
        let mut player = Player::new(Vec2::default());
        assert!(!player.fire());
        player.equip_weapon();
        assert!(player.fire());
        assert_eq!(player.current_ammo, 29);
    }

    #[test]
    fn test_export_rejects_nan_health() {
        let catalog = ItemCatalog::create_default();
        let mut player = Player::new(Vec2::default());
        player.health = Health::new(f32::NAN);

        let err = player.export(&catalog).unwrap_err();
        assert_eq!(err.kind(), crate::save::ErrorKind::ParticipantExportFailure);
    }

    #[test]
    fn test_import_reports_truncated_units() {
        let catalog = ItemCatalog::create_default();
        let mut player = Player::new(Vec2::default());
        let mut data = record();
        // pistol stacks to 1
        data.inventory_items = vec![ItemReference::catalog(4, 3)];

        let outcome = player.import(&Record::Player(data), &catalog).unwrap();
        assert_eq!(outcome.truncated_items, 2);
        assert_eq!(outcome.dropped_items, 0);
    }
}
