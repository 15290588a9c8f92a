use super::error::InventoryError;
use crate::item::ItemStack;

/// Generic inventory container with slots
///
/// This is the storage used by the player. It handles slot management and
/// stacking; it knows nothing about the catalog because every `ItemStack`
/// already carries its own stack cap.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    /// Slots that can hold item stacks (None = empty)
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    /// Creates a new empty inventory with the specified capacity
    pub fn new(capacity: usize) -> Self {
        Inventory {
            slots: vec![None; capacity],
        }
    }

    /// Rebuilds an inventory from an ordered list of stacks
    ///
    /// Stacks beyond `capacity` do not fit and are returned as overflow.
    pub fn restore(capacity: usize, stacks: Vec<ItemStack>) -> (Self, Vec<ItemStack>) {
        let mut inventory = Inventory::new(capacity);
        let mut overflow = Vec::new();

        for (index, stack) in stacks.into_iter().enumerate() {
            if index < capacity {
                inventory.slots[index] = Some(stack);
            } else {
                overflow.push(stack);
            }
        }

        (inventory, overflow)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the inventory has no items
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Finds the first empty slot index
    pub fn find_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.is_none())
    }

    /// Gets the stack in a slot
    pub fn slot(&self, index: usize) -> Result<Option<&ItemStack>, InventoryError> {
        self.slots
            .get(index)
            .map(|slot| slot.as_ref())
            .ok_or(InventoryError::InvalidSlot(index))
    }

    /// Adds a stack to the inventory
    ///
    /// Returns the number of items that couldn't fit.
    ///
    /// # Strategy
    /// 1. Try to stack with existing items first
    /// 2. Put the remainder in the first empty slot
    /// 3. Report overflow if inventory is full
    pub fn add_stack(&mut self, mut incoming: ItemStack) -> Result<u32, InventoryError> {
        // Phase 1: Try to add to existing stacks
        for slot in self.slots.iter_mut().flatten() {
            if incoming.quantity == 0 {
                break;
            }

            if slot.can_merge_with(&incoming) && slot.quantity < slot.max_stack_size {
                incoming.quantity = slot.add(incoming.quantity);
            }
        }

        if incoming.quantity == 0 {
            return Ok(0);
        }

        // Phase 2: New stack in an empty slot
        match self.find_empty_slot() {
            Some(empty_index) => {
                let overflow = incoming.quantity.saturating_sub(incoming.max_stack_size);
                incoming.quantity -= overflow;
                self.slots[empty_index] = Some(incoming);
                Ok(overflow)
            }
            None if incoming.quantity > 0 => Err(InventoryError::InventoryFull),
            None => Ok(0),
        }
    }

    /// Clears all items from the inventory
    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    /// Returns an iterator over all non-empty item stacks, in slot order
    pub fn iter_items(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDefinition;

    fn potion(quantity: u32) -> ItemStack {
        let def = ItemDefinition::new(2, "health_potion", "Health Potion", "", "p.png", 16);
        ItemStack::from_definition(&def, quantity)
    }

    #[test]
    fn test_add_merges_before_new_slot() {
        let mut inventory = Inventory::new(3);
        inventory.add_stack(potion(10)).unwrap();
        let overflow = inventory.add_stack(potion(4)).unwrap();

        assert_eq!(overflow, 0);
        assert_eq!(inventory.iter_items().count(), 1);
        assert_eq!(inventory.slot(0).unwrap().map(|s| s.quantity), Some(14));
    }

    #[test]
    fn test_add_spills_into_empty_slot() {
        let mut inventory = Inventory::new(3);
        inventory.add_stack(potion(15)).unwrap();
        inventory.add_stack(potion(5)).unwrap();

        let quantities: Vec<u32> = inventory.iter_items().map(|s| s.quantity).collect();
        assert_eq!(quantities, vec![16, 4]);
    }

    #[test]
    fn test_full_inventory_rejects() {
        let mut inventory = Inventory::new(1);
        inventory.add_stack(ItemStack::legacy("Rock", 1, 1, 1, "")).unwrap();
        let result = inventory.add_stack(ItemStack::legacy("Stick", 2, 1, 1, ""));
        assert_eq!(result, Err(InventoryError::InventoryFull));
    }

    #[test]
    fn test_restore_returns_overflow() {
        let (inventory, overflow) = Inventory::restore(1, vec![potion(1), potion(2)]);
        assert_eq!(inventory.iter_items().count(), 1);
        assert_eq!(overflow.len(), 1);
    }
}
