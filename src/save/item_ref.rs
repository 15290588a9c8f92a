//! Item reference codec
//!
//! Saves never store a full item. They store an `ItemReference`: the
//! catalog id plus a quantity. Saves written before the catalog existed
//! carry a legacy bundle instead (name, old id, stack cap, sprite path),
//! and decoding falls back to it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::ItemRefError;
use crate::item::{ItemCatalog, ItemStack};

/// Compact pointer to an inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemReference {
    /// 0 when the item is not in the catalog
    #[serde(default)]
    pub catalog_id: u32,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy: Option<LegacyItemBundle>,
}

/// Pre-catalog description of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LegacyItemBundle {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub legacy_id: i32,
    #[serde(default)]
    pub max_stack: u32,
    #[serde(default)]
    pub sprite_path: String,
}

impl ItemReference {
    pub fn catalog(catalog_id: u32, quantity: u32) -> Self {
        ItemReference {
            catalog_id,
            quantity,
            legacy: None,
        }
    }

    pub fn legacy(bundle: LegacyItemBundle, quantity: u32) -> Self {
        ItemReference {
            catalog_id: 0,
            quantity,
            legacy: Some(bundle),
        }
    }

    /// Encodes a live item
    ///
    /// The catalog id is written when the item resolves in the catalog;
    /// anything else keeps its legacy fields so it survives the round trip.
    pub fn encode(stack: &ItemStack, catalog: &ItemCatalog) -> Self {
        match stack.catalog_id {
            Some(id) if catalog.contains(id) => ItemReference::catalog(id, stack.quantity),
            _ => ItemReference::legacy(
                LegacyItemBundle {
                    name: stack.name.clone(),
                    legacy_id: stack.legacy_id,
                    max_stack: stack.max_stack_size,
                    sprite_path: stack.sprite_path.clone(),
                },
                stack.quantity,
            ),
        }
    }

    /// Resolves this reference into a live item
    ///
    /// Order: known catalog id, then legacy bundle with a name, else error.
    /// A failure affects only this reference. A quantity above the stack cap
    /// is clamped; `ItemStack::excess_of` tells how much was cut.
    pub fn decode(&self, catalog: &ItemCatalog) -> Result<ItemStack, ItemRefError> {
        let stack = self.resolve(catalog)?;

        let excess = stack.excess_of(self.quantity);
        if excess > 0 {
            warn!(
                item = %stack.name,
                saved = self.quantity,
                cap = stack.max_stack_size,
                excess,
                "saved quantity exceeds stack cap, clamped"
            );
        }
        Ok(stack)
    }

    fn resolve(&self, catalog: &ItemCatalog) -> Result<ItemStack, ItemRefError> {
        if self.quantity == 0 {
            return Err(ItemRefError::EmptyStack);
        }

        if self.catalog_id > 0 {
            if let Some(definition) = catalog.get(self.catalog_id) {
                return Ok(ItemStack::from_definition(definition, self.quantity));
            }
            warn!(
                catalog_id = self.catalog_id,
                "item catalog id not found, trying legacy data"
            );
        }

        match &self.legacy {
            Some(bundle) if !bundle.name.trim().is_empty() => Ok(ItemStack::legacy(
                bundle.name.clone(),
                bundle.legacy_id,
                self.quantity,
                bundle.max_stack,
                bundle.sprite_path.clone(),
            )),
            _ if self.catalog_id > 0 => Err(ItemRefError::UnknownCatalogId(self.catalog_id)),
            _ => Err(ItemRefError::MissingLegacyName),
        }
    }
}

/// Result of decoding a batch of references
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedItems {
    /// Resolved items, in reference order
    pub items: Vec<ItemStack>,
    pub failures: Vec<ItemRefError>,
    /// Units cut off by stack caps across the batch
    pub truncated: u32,
}

/// Decodes a batch of references, dropping the ones that fail
pub fn decode_all(references: &[ItemReference], catalog: &ItemCatalog) -> DecodedItems {
    let mut decoded = DecodedItems {
        items: Vec::with_capacity(references.len()),
        ..Default::default()
    };

    for (slot, reference) in references.iter().enumerate() {
        match reference.decode(catalog) {
            Ok(item) => {
                decoded.truncated += item.excess_of(reference.quantity);
                decoded.items.push(item);
            }
            Err(e) => {
                warn!(slot, error = %e, "dropping inventory slot");
                decoded.failures.push(e);
            }
        }
    }

    decoded
}
