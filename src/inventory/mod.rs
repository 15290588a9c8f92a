// Inventory system module
//
// Slot-based storage for the player's items. Save records list the
// occupied slots in order; restoring rebuilds the slots from that list.

pub mod error;
pub mod inventory;

// Re-export main types
pub use error::InventoryError;
pub use inventory::Inventory;
