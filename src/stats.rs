//! Health tracking shared by the player and enemies
//!
//! Health is tracked separately from max health so that:
//! - damage reduces current health without touching the cap
//! - a save can restore both values exactly

/// Represents a character's health points
///
/// # Example
///
/// ```
/// use game1_save::stats::Health;
///
/// let mut health = Health::new(100.0);
/// health.take_damage(30.0);
/// assert_eq!(health.current(), 70.0);
/// assert!(health.is_alive());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Health {
    /// Creates a new Health instance with full health
    pub fn new(max: f32) -> Self {
        Health { current: max, max }
    }

    /// Restores an exact (current, max) pair, as read from a save
    ///
    /// Current health is clamped into `0.0..=max`.
    pub fn restore(current: f32, max: f32) -> Self {
        let max = max.max(0.0);
        Health {
            current: current.clamp(0.0, max),
            max,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Checks if the owner is alive (health > 0)
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Applies damage to health
    ///
    /// Returns a `DamageResult` with the damage actually dealt and whether
    /// it was fatal.
    pub fn take_damage(&mut self, amount: f32) -> DamageResult {
        let old_health = self.current;
        self.current = (self.current - amount).max(0.0);

        DamageResult {
            damage_dealt: old_health - self.current,
            is_fatal: self.current <= 0.0,
        }
    }

}

/// Result of a damage operation
#[derive(Debug, Clone, PartialEq)]
pub struct DamageResult {
    /// Actual damage dealt (may be less than requested if target had less health)
    pub damage_dealt: f32,
    /// Whether this damage killed the target
    pub is_fatal: bool,
}

impl DamageResult {
    /// Creates a result representing no damage dealt
    pub fn no_damage() -> Self {
        DamageResult {
            damage_dealt: 0.0,
            is_fatal: false,
        }
    }
}
