use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::definition::ItemDefinition;

/// Central catalog of all item definitions
///
/// This is the single source of truth for what items exist in the game.
/// Save files refer to items by `catalog_id`, and those ids are resolved
/// here at load time.
///
/// The catalog is built once at startup and is read-only afterwards: there
/// is no `register` after construction. Everything that needs it borrows it.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: BTreeMap<u32, ItemDefinition>,
}

impl ItemCatalog {
    /// Builds a catalog from every known item definition
    ///
    /// Duplicate ids keep the first definition; later ones are logged and
    /// dropped. Id 0 is reserved for "no catalog entry" and is rejected.
    pub fn build(definitions: impl IntoIterator<Item = ItemDefinition>) -> Self {
        let mut items: BTreeMap<u32, ItemDefinition> = BTreeMap::new();

        for definition in definitions {
            if definition.catalog_id == 0 {
                warn!(
                    key = %definition.key,
                    "item definition uses reserved catalog id 0, dropped"
                );
                continue;
            }

            if let Some(existing) = items.get(&definition.catalog_id) {
                warn!(
                    catalog_id = definition.catalog_id,
                    kept = %existing.key,
                    dropped = %definition.key,
                    "duplicate item catalog id"
                );
                continue;
            }

            items.insert(definition.catalog_id, definition);
        }

        debug!(count = items.len(), "item catalog built");
        ItemCatalog { items }
    }

    /// Creates a catalog with all base game items
    ///
    /// This is called once at game startup.
    pub fn create_default() -> Self {
        Self::build(base_items())
    }

    /// Gets an item definition by catalog id
    pub fn get(&self, catalog_id: u32) -> Option<&ItemDefinition> {
        self.items.get(&catalog_id)
    }

    /// Finds a definition by its string key (used for legacy saves)
    pub fn find_by_key(&self, key: &str) -> Option<&ItemDefinition> {
        self.items.values().find(|item| item.key == key)
    }

    pub fn contains(&self, catalog_id: u32) -> bool {
        self.items.contains_key(&catalog_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates definitions in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.items.values()
    }
}

// ======================================================================
// Base Game Items
// ======================================================================

/// All built-in items. Ids are part of the save format: never renumber.
fn base_items() -> Vec<ItemDefinition> {
    vec![
        ItemDefinition::new(
            1,
            "slime_ball",
            "Slime Ball",
            "A bouncy ball of slime. Used in crafting.",
            "assets/items/slime_ball.png",
            64,
        ),
        ItemDefinition::new(
            2,
            "health_potion",
            "Health Potion",
            "Restores 50 health when consumed.",
            "assets/items/health_potion.png",
            16,
        ),
        ItemDefinition::new(
            3,
            "ammo_box",
            "Ammo Box",
            "A box of pistol rounds.",
            "assets/items/ammo_box.png",
            10,
        ),
        ItemDefinition::new(
            4,
            "pistol",
            "Pistol",
            "A reliable sidearm.",
            "assets/items/pistol.png",
            1,
        ),
        ItemDefinition::new(
            5,
            "gold_coin",
            "Gold Coin",
            "Shiny. Merchants like these.",
            "assets/items/gold_coin.png",
            99,
        ),
    ]
}
