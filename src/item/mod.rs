// Item system module
//
// This module provides the item data the save system resolves against:
// - Item definitions (the "class" of an item)
// - The item catalog, keyed by stable numeric ids
// - Item stacks, the live "instance" held in inventories and pickups

pub mod catalog;
pub mod definition;
pub mod stack;

// Re-export main types for convenient access
pub use catalog::ItemCatalog;
pub use definition::ItemDefinition;
pub use stack::ItemStack;
