//! What the save system needs from the game engine
//!
//! The engine owns entities, scenes and physics. The collector and the
//! reconciler only ever talk to it through `SceneHost`, so they can run
//! against the real game world or a test double.

use thiserror::Error;

use crate::enemy::{Enemy, EnemyBlueprint};
use crate::item_pickup::ItemPickup;
use crate::player::Player;
use crate::save::saveable::Persistable;
use crate::save::GameSettings;

/// Process-local entity handle. Not stable across restarts.
pub type EntityId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("unknown scene '{0}'")]
    UnknownScene(String),

    #[error("scene '{0}' is already loading")]
    LoadInProgress(String),

    #[error("physics body budget of {0} exhausted")]
    PhysicsBudgetExhausted(usize),

    #[error("no entity with id {0}")]
    UnknownEntity(EntityId),
}

pub trait SceneHost {
    /// Id of the scene currently shown
    fn active_scene_id(&self) -> &str;

    /// Every live participant, in a stable order
    fn participants(&self) -> Vec<&dyn Persistable>;

    fn has_player(&self) -> bool;

    fn player_mut(&mut self) -> Option<&mut Player>;

    fn enemy_ids(&self) -> Vec<EntityId>;

    fn pickup_ids(&self) -> Vec<EntityId>;

    /// Removes an enemy or pickup. Unknown ids are ignored.
    fn destroy(&mut self, id: EntityId);

    /// Prefab registered for enemies, if the scene has one
    fn enemy_prefab(&self) -> Option<EnemyBlueprint>;

    /// Structural copy of any living enemy, for use as a template
    fn living_enemy_blueprint(&self) -> Option<EnemyBlueprint>;

    fn instantiate_enemy(&mut self, blueprint: &EnemyBlueprint) -> Result<EntityId, HostError>;

    fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy>;

    /// Adds a default rigid body to an entity that lacks one
    fn attach_rigid_body(&mut self, id: EntityId) -> Result<(), HostError>;

    /// Creates an empty pickup from the engine's pickup prefab
    fn instantiate_pickup(&mut self) -> Result<EntityId, HostError>;

    fn pickup_mut(&mut self, id: EntityId) -> Option<&mut ItemPickup>;

    /// Whether the scene, once loaded, contains a player
    ///
    /// Asked before a load switches scenes. Hosts that cannot tell answer
    /// true and leave the check to the apply step.
    fn scene_has_player(&self, _scene_id: &str) -> bool {
        true
    }

    /// Starts loading a scene. Completion is observed through
    /// `scene_load_complete`.
    fn begin_scene_load(&mut self, scene_id: &str) -> Result<(), HostError>;

    /// True once no scene load is pending
    fn scene_load_complete(&self) -> bool;

    fn apply_settings(&mut self, _settings: &GameSettings) {}
}
