//! Save data types
//!
//! This module defines all the data structures written to the save file.
//! They are plain values: nothing here references a live entity, so a
//! document can be built, written, read and compared on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::item_ref::ItemReference;
use crate::geometry::{Vec2, Vec3};

/// Schema version stamped on every document this build writes
pub const CURRENT_SCHEMA_VERSION: &str = "1.1";

/// The root save file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub schema_version: String,
    pub saved_at: DateTime<Utc>,
    /// Total play time in seconds
    pub elapsed_play_time: f64,
    pub active_scene_id: String,
    #[serde(default)]
    pub trigger: SaveTrigger,
    #[serde(default)]
    pub settings: GameSettings,
    #[serde(default)]
    pub player: Option<PlayerRecord>,
    #[serde(default)]
    pub enemies: Vec<EnemyRecord>,
    #[serde(default)]
    pub item_pickups: Vec<ItemPickupRecord>,
}

impl SaveDocument {
    /// An empty document for the given scene, stamped now
    pub fn new(active_scene_id: impl Into<String>) -> Self {
        SaveDocument {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            saved_at: Utc::now(),
            elapsed_play_time: 0.0,
            active_scene_id: active_scene_id.into(),
            trigger: SaveTrigger::default(),
            settings: GameSettings::default(),
            player: None,
            enemies: Vec::new(),
            item_pickups: Vec::new(),
        }
    }
}

/// What caused a save
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveTrigger {
    #[default]
    Manual,
    Autosave,
    SceneExit,
    PauseMenu,
    AppQuit,
    FocusLost,
}

impl fmt::Display for SaveTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SaveTrigger::Manual => "manual",
            SaveTrigger::Autosave => "autosave",
            SaveTrigger::SceneExit => "scene exit",
            SaveTrigger::PauseMenu => "pause menu",
            SaveTrigger::AppQuit => "app quit",
            SaveTrigger::FocusLost => "focus lost",
        };
        f.write_str(label)
    }
}

/// Player-facing settings carried alongside the game state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    /// 0.0 to 1.0
    pub master_volume: f32,
    pub fullscreen: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            master_volume: 0.8,
            fullscreen: false,
        }
    }
}

impl GameSettings {
    /// Volume clamped into `0.0..=1.0`; a non-finite volume falls back to
    /// the default
    pub fn sanitized(self) -> Self {
        let master_volume = if self.master_volume.is_finite() {
            self.master_volume.clamp(0.0, 1.0)
        } else {
            GameSettings::default().master_volume
        };
        GameSettings { master_volume, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub position: Vec2,
    pub current_health: f32,
    pub max_health: f32,
    pub alive: bool,
    pub facing_right: bool,
    #[serde(default)]
    pub inventory_items: Vec<ItemReference>,
    pub max_inventory_slots: u32,
    pub current_ammo: u32,
    pub max_ammo: u32,
    pub has_weapon: bool,
}

/// Enemy behavior knobs. Persisted so buffs and debuffs applied at runtime
/// survive a save/load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyTunables {
    pub detection_range: f32,
    pub attack_range: f32,
    pub move_speed: f32,
    pub attack_damage: f32,
    /// Seconds between attacks
    pub attack_cooldown: f32,
}

impl EnemyTunables {
    pub fn is_finite(&self) -> bool {
        [
            self.detection_range,
            self.attack_range,
            self.move_speed,
            self.attack_damage,
            self.attack_cooldown,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

impl Default for EnemyTunables {
    fn default() -> Self {
        EnemyTunables {
            detection_range: 160.0,
            attack_range: 24.0,
            move_speed: 60.0,
            attack_damage: 10.0,
            attack_cooldown: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyRecord {
    pub position: Vec3,
    pub current_health: f32,
    pub max_health: f32,
    pub alive: bool,
    pub active: bool,
    pub facing_right: bool,
    pub player_detected: bool,
    #[serde(default)]
    pub tunables: EnemyTunables,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupTunables {
    pub destroy_on_pickup: bool,
    pub bobbing_enabled: bool,
    pub bob_speed: f32,
    pub bob_height: f32,
}

impl PickupTunables {
    pub fn is_finite(&self) -> bool {
        self.bob_speed.is_finite() && self.bob_height.is_finite()
    }
}

impl Default for PickupTunables {
    fn default() -> Self {
        PickupTunables {
            destroy_on_pickup: true,
            bobbing_enabled: true,
            bob_speed: 4.0,
            bob_height: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPickupRecord {
    pub position: Vec3,
    pub picked_up: bool,
    pub item: ItemReference,
    #[serde(default)]
    pub tunables: PickupTunables,
    /// Point the bobbing animation oscillates around
    pub origin: Vec3,
}

/// `major.minor` schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    /// Must match `CURRENT_SCHEMA_VERSION`
    pub fn current() -> Self {
        SchemaVersion { major: 1, minor: 1 }
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s.trim().split_once('.').unwrap_or((s.trim(), "0"));
        let major = major
            .parse()
            .map_err(|_| format!("bad major version in '{}'", s))?;
        let minor = minor
            .parse()
            .map_err(|_| format!("bad minor version in '{}'", s))?;
        Ok(SchemaVersion { major, minor })
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Cheap summary of a save file for load/continue screens
#[derive(Debug, Clone, PartialEq)]
pub struct SaveSummary {
    pub saved_at: DateTime<Utc>,
    pub elapsed_play_time: f64,
    pub active_scene_id: String,
    pub schema_version: String,
    pub trigger: SaveTrigger,
    /// Size of the save file in bytes
    pub file_size: u64,
}

impl SaveSummary {
    /// Play time as `h:mm:ss`
    pub fn play_time_label(&self) -> String {
        let total = self.elapsed_play_time.max(0.0) as u64;
        format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
    }
}
