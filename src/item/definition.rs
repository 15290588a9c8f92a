use serde::{Deserialize, Serialize};

/// The blueprint for an item type
///
/// This defines the static properties of an item that are shared across
/// all instances. Think of it as the "class" and `ItemStack` as the
/// "instance".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Stable numeric id written into save files (0 is reserved for "none")
    pub catalog_id: u32,

    /// Human-readable key, e.g. "slime_ball"
    pub key: String,

    /// Display name shown in UI
    pub name: String,

    /// Description shown in tooltips
    pub description: String,

    /// Path to the item icon
    pub sprite_path: String,

    /// Maximum stack size (1 = non-stackable)
    pub max_stack_size: u32,
}

impl ItemDefinition {
    /// Creates a new item definition
    pub fn new(
        catalog_id: u32,
        key: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        sprite_path: impl Into<String>,
        max_stack_size: u32,
    ) -> Self {
        ItemDefinition {
            catalog_id,
            key: key.into(),
            name: name.into(),
            description: description.into(),
            sprite_path: sprite_path.into(),
            max_stack_size,
        }
    }
}
