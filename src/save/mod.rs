//! Save/Load system for Game1
//!
//! One JSON document per save, holding the player, every enemy and every
//! item pickup in the active scene.
//!
//! # Architecture
//!
//! - `types`: document and record structures
//! - `item_ref`: catalog-id item references with a legacy fallback
//! - `saveable`: the `Persistable` trait entities implement
//! - `collector`: gathers records from a scene
//! - `store`: file operations (atomic write, load, delete, describe)
//! - `reconciler`: rebuilds the scene from a document, tick by tick
//! - `session`: `SaveSystem`, the facade game code uses
//!
//! # Example Usage
//!
//! ```ignore
//! let catalog = ItemCatalog::create_default();
//! let mut saves = SaveSystem::new(&SaveConfig::default(), &catalog)?;
//!
//! saves.save(&world, SaveTrigger::Manual)?;
//!
//! saves.begin_load()?;
//! // once per frame:
//! if let Poll::Ready(report) = saves.poll_load(&mut world) { /* ... */ }
//! ```

pub mod collector;
pub mod error;
pub mod item_ref;
pub mod reconciler;
pub mod saveable;
pub mod session;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use collector::{CollectContext, Collection};
pub use error::*;
pub use item_ref::{ItemReference, LegacyItemBundle};
pub use reconciler::{ApplyReport, ReconcileState, Reconciler, TemplateSource};
pub use saveable::{EntityKind, Persistable, Record};
pub use session::SaveSystem;
pub use store::SaveStore;
pub use types::*;
