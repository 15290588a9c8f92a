// Scene layouts
//
// A layout is what the world contains right after a scene finishes loading:
// the authored player spawn, enemies and pickups. Loads are not instant;
// `load_ticks` is how many world updates the load takes.

use crate::geometry::{Vec2, Vec3};
use crate::item::ItemStack;

#[derive(Debug, Clone, Default)]
pub struct SceneLayout {
    /// World updates before the scene becomes active
    pub load_ticks: u32,
    /// None for scenes without a player (menus, cutscenes)
    pub player_spawn: Option<Vec2>,
    pub enemy_spawns: Vec<Vec3>,
    pub pickup_spawns: Vec<(Vec3, ItemStack)>,
}

impl SceneLayout {
    pub fn new(load_ticks: u32) -> Self {
        SceneLayout {
            load_ticks,
            ..Default::default()
        }
    }

    pub fn with_player(mut self, spawn: Vec2) -> Self {
        self.player_spawn = Some(spawn);
        self
    }

    pub fn with_enemy(mut self, position: Vec3) -> Self {
        self.enemy_spawns.push(position);
        self
    }

    pub fn with_pickup(mut self, position: Vec3, item: ItemStack) -> Self {
        self.pickup_spawns.push((position, item));
        self
    }
}

/// A scene load in flight
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PendingLoad {
    pub scene_id: String,
    pub ticks_left: u32,
}
