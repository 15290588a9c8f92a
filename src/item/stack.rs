use super::definition::ItemDefinition;

/// An instance of an item with quantity
///
/// This represents a specific amount of an item type. It's stored in
/// inventory slots and carried by item pickups.
///
/// Items created from the catalog carry their `catalog_id`. Items restored
/// from pre-catalog saves only have the legacy fields (name, legacy id,
/// sprite path, stack cap) and `catalog_id` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStack {
    /// Catalog id, if this item is backed by a catalog definition
    pub catalog_id: Option<u32>,

    /// Display name
    pub name: String,

    /// Id used by saves written before the catalog existed
    pub legacy_id: i32,

    /// Icon path
    pub sprite_path: String,

    /// Stack cap copied from the definition (or the legacy bundle)
    pub max_stack_size: u32,

    /// How many of this item (1 to max_stack_size)
    pub quantity: u32,
}

impl ItemStack {
    /// Creates a stack of a catalog item
    ///
    /// The quantity is clamped to the definition's stack cap.
    pub fn from_definition(definition: &ItemDefinition, quantity: u32) -> Self {
        ItemStack {
            catalog_id: Some(definition.catalog_id),
            name: definition.name.clone(),
            legacy_id: 0,
            sprite_path: definition.sprite_path.clone(),
            max_stack_size: definition.max_stack_size,
            quantity: quantity.min(definition.max_stack_size.max(1)),
        }
    }

    /// Creates a stack that is not backed by the catalog
    ///
    /// A `max_stack_size` of 0 means the cap is unknown; the stack is then
    /// sized to hold the whole quantity.
    pub fn legacy(
        name: impl Into<String>,
        legacy_id: i32,
        quantity: u32,
        max_stack_size: u32,
        sprite_path: impl Into<String>,
    ) -> Self {
        let max_stack_size = match max_stack_size {
            0 => quantity.max(1),
            cap => cap,
        };
        ItemStack {
            catalog_id: None,
            name: name.into(),
            legacy_id,
            sprite_path: sprite_path.into(),
            max_stack_size,
            quantity: quantity.min(max_stack_size),
        }
    }

    /// Returns true if this stack can merge with another
    ///
    /// Catalog items merge by id; legacy items merge by name.
    pub fn can_merge_with(&self, other: &ItemStack) -> bool {
        match (self.catalog_id, other.catalog_id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.name == other.name,
            _ => false,
        }
    }

    /// Adds items to this stack
    ///
    /// Returns how many items couldn't fit (overflow)
    pub fn add(&mut self, amount: u32) -> u32 {
        let total = self.quantity + amount;

        if total <= self.max_stack_size {
            self.quantity = total;
            0
        } else {
            self.quantity = self.max_stack_size;
            total - self.max_stack_size
        }
    }

    /// How many of `requested` did not fit into this stack
    pub fn excess_of(&self, requested: u32) -> u32 {
        requested.saturating_sub(self.quantity)
    }
}
