// Game module - the world the save system runs against
//
// This module contains:
// - world.rs: GameWorld struct, entity management and the SceneHost impl
// - scene.rs: Scene layouts and pending scene loads

// Module declarations
pub mod scene;
pub mod world;

// Re-export types for convenience
pub use scene::SceneLayout;
pub use world::GameWorld;
