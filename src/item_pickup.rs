use crate::components::{Collider, EntityParts, Visual};
use crate::geometry::{Vec2, Vec3};
use crate::host::EntityId;
use crate::item::{ItemCatalog, ItemStack};
use crate::save::item_ref::ItemReference;
use crate::save::saveable::{EntityKind, ImportOutcome, Persistable, Record, check_finite, kind_mismatch};
use crate::save::{ItemPickupRecord, ParticipantError, PickupTunables};

/// An item lying in the world, bobbing until the player walks over it
pub struct ItemPickup {
    id: EntityId,
    pub position: Vec3,
    /// Point the bob animation oscillates around
    pub origin: Vec3,
    item: Option<ItemStack>,
    picked_up: bool,
    pub tunables: PickupTunables,
    bob_time: f32,
    pub pickup_radius: f32,
    pub parts: EntityParts,
}

impl ItemPickup {
    /// Pickup as the engine prefab creates it: no item yet
    pub fn empty(id: EntityId) -> Self {
        ItemPickup {
            id,
            position: Vec3::default(),
            origin: Vec3::default(),
            item: None,
            picked_up: false,
            tunables: PickupTunables::default(),
            bob_time: 0.0,
            pickup_radius: 24.0,
            parts: EntityParts {
                visual: Some(Visual::placeholder([255, 215, 0, 255], 16.0)),
                rigid_body: None,
                collider: Some(Collider::Circle { radius: 24.0 }),
            },
        }
    }

    pub fn new(id: EntityId, origin: Vec3, item: ItemStack) -> Self {
        let mut pickup = ItemPickup::empty(id);
        pickup.position = origin;
        pickup.origin = origin;
        if let Some(visual) = pickup.parts.visual.as_mut() {
            visual.sprite_path = Some(item.sprite_path.clone());
        }
        pickup.item = Some(item);
        pickup
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn item(&self) -> Option<&ItemStack> {
        self.item.as_ref()
    }

    pub fn is_picked_up(&self) -> bool {
        self.picked_up
    }

    /// True when a picked-up pickup should be removed from the world
    pub fn should_despawn(&self) -> bool {
        self.picked_up && self.tunables.destroy_on_pickup
    }

    pub fn update(&mut self, delta_time: f32) {
        if !self.tunables.bobbing_enabled || self.picked_up {
            return;
        }

        self.bob_time += delta_time;
        self.position.y =
            self.origin.y + (self.bob_time * self.tunables.bob_speed).sin() * self.tunables.bob_height;
    }

    pub fn in_reach(&self, point: Vec2) -> bool {
        self.origin.xy().distance(point) <= self.pickup_radius
    }

    /// Hands out the item once; later calls return None
    pub fn collect(&mut self) -> Option<ItemStack> {
        if self.picked_up {
            return None;
        }
        let item = self.item.clone()?;
        self.picked_up = true;
        Some(item)
    }
}

impl Persistable for ItemPickup {
    fn kind(&self) -> EntityKind {
        EntityKind::ItemPickup
    }

    fn identify(&self) -> String {
        format!(
            "item_pickup@{:.1},{:.1},{:.1}",
            self.origin.x, self.origin.y, self.origin.z
        )
    }

    fn export(&self, catalog: &ItemCatalog) -> Result<Record, ParticipantError> {
        let Some(item) = &self.item else {
            return Err(ParticipantError::invalid_state(
                self.identify(),
                EntityKind::ItemPickup,
                "pickup holds no item",
            ));
        };
        check_finite(
            self,
            &[
                ("position", self.position.is_finite()),
                ("origin", self.origin.is_finite()),
                ("tunables", self.tunables.is_finite()),
            ],
        )?;

        Ok(Record::ItemPickup(ItemPickupRecord {
            position: self.position,
            picked_up: self.picked_up,
            item: ItemReference::encode(item, catalog),
            tunables: self.tunables,
            origin: self.origin,
        }))
    }

    fn import(&mut self, record: &Record, catalog: &ItemCatalog) -> Result<ImportOutcome, ParticipantError> {
        let Record::ItemPickup(data) = record else {
            return Err(kind_mismatch(EntityKind::ItemPickup, record));
        };

        let item = data.item.decode(catalog)?;
        let truncated_items = item.excess_of(data.item.quantity);

        if let Some(visual) = self.parts.visual.as_mut() {
            visual.sprite_path = Some(item.sprite_path.clone());
        }
        self.item = Some(item);
        self.position = data.position;
        self.origin = data.origin;
        self.picked_up = data.picked_up;
        self.tunables = data.tunables;
        self.bob_time = 0.0;

        Ok(ImportOutcome {
            truncated_items,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::ItemRefError;

    fn coin_pickup() -> ItemPickup {
        let catalog = ItemCatalog::create_default();
        let coin = ItemStack::from_definition(catalog.get(5).unwrap(), 2);
        ItemPickup::new(3, Vec3::new(50.0, 40.0, 0.0), coin)
    }

    #[test]
    fn test_collect_only_once() {
        let mut pickup = coin_pickup();
        assert_eq!(pickup.collect().map(|i| i.quantity), Some(2));
        assert!(pickup.collect().is_none());
        assert!(pickup.should_despawn());
    }

    #[test]
    fn test_bobbing_stays_within_height() {
        let mut pickup = coin_pickup();
        for _ in 0..50 {
            pickup.update(0.05);
            assert!((pickup.position.y - pickup.origin.y).abs() <= pickup.tunables.bob_height + f32::EPSILON);
        }
    }

    #[test]
    fn test_export_without_item_fails() {
        let catalog = ItemCatalog::create_default();
        let pickup = ItemPickup::empty(1);
        let err = pickup.export(&catalog).unwrap_err();
        assert!(matches!(err, ParticipantError::InvalidState { .. }));
    }

    #[test]
    fn test_import_resolves_item_and_restarts_bob() {
        let catalog = ItemCatalog::create_default();
        let mut source = coin_pickup();
        source.tunables.bob_height = 8.0;
        source.update(0.3);
        let record = source.export(&catalog).unwrap();

        let mut target = ItemPickup::empty(9);
        target.import(&record, &catalog).unwrap();

        assert_eq!(target.item().map(|i| i.name.as_str()), Some("Gold Coin"));
        assert_eq!(target.tunables.bob_height, 8.0);
        assert_eq!(target.origin, source.origin);
        assert_eq!(target.bob_time, 0.0);
    }

    #[test]
    fn test_import_unknown_item_fails() {
        let catalog = ItemCatalog::create_default();
        let record = Record::ItemPickup(ItemPickupRecord {
            position: Vec3::default(),
            picked_up: false,
            item: ItemReference::catalog(404, 1),
            tunables: PickupTunables::default(),
            origin: Vec3::default(),
        });

        let mut pickup = ItemPickup::empty(1);
        let err = pickup.import(&record, &catalog).unwrap_err();
        assert_eq!(err, ParticipantError::Catalog(ItemRefError::UnknownCatalogId(404)));
    }

    #[test]
    fn test_export_rejects_non_finite_bob() {
        let catalog = ItemCatalog::create_default();
        let mut pickup = coin_pickup();
        pickup.tunables.bob_speed = f32::NAN;

        assert!(matches!(
            pickup.export(&catalog),
            Err(ParticipantError::InvalidState { .. })
        ));
    }
}
