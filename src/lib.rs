//! Save/load engine for Game1
//!
//! Persists the player, enemies and item pickups of the active scene to a
//! single JSON file and rebuilds the scene from it. Game code talks to
//! [`save::SaveSystem`]; the world it saves is anything implementing
//! [`host::SceneHost`], with [`game::GameWorld`] as the in-process engine.

pub mod components;
pub mod config;
pub mod enemy;
pub mod game;
pub mod geometry;
pub mod host;
pub mod inventory;
pub mod item;
pub mod item_pickup;
pub mod player;
pub mod save;
pub mod stats;
