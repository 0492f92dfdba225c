//! # Skirmish Core
//!
//! Turn-based tactical combat engine for Skirmish: a party against monsters
//! on a grid, one combatant at a time.
//!
//! ## Architecture
//!
//! - **Arena**: combatant records indexed by [`EntityId`](entity::EntityId),
//!   replaced whole on every write
//! - **Resolver**: pure dice math (attack rolls, AC, damage, the resistance
//!   pipeline, area footprints)
//! - **Effects**: one resolution strategy per effect kind
//! - **AI**: one strategy per behavior tag, acting through the same entry
//!   points as the player
//! - **Scheduler**: initiative, the active cursor, the action economy, and
//!   victory/defeat detection
//! - **Session**: ties it together and records the log and playback
//!
//! Movement queries come from [`skirmish_grid`].
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::scenario::BattlePackage;
//!
//! let json = r#"{
//!     "terrain": { "grid": { "width": 6, "depth": 6 } },
//!     "entities": [
//!         { "name": "Hero", "side": "PLAYER", "position": [0, 0], "behavior": "melee" },
//!         { "name": "Rat", "side": "ENEMY", "position": [4, 4], "behavior": "melee" }
//!     ],
//!     "config": { "seed": 5, "autopilotPlayers": true }
//! }"#;
//!
//! let mut session = BattlePackage::from_json(json).unwrap().start().unwrap();
//! while session.outcome().is_none() {
//!     session.advance();
//!     session.take_playback();
//! }
//! println!("{}", session.outcome().unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ai;
pub mod arena;
pub mod config;
pub mod content;
pub mod dice;
pub mod effect;
pub mod entity;
pub mod error;
pub mod output;
pub mod playback;
pub mod resolver;
pub mod scenario;
pub mod scheduler;
pub mod session;

pub use skirmish_grid::Tile;

// Re-exports for convenience
pub use arena::Arena;
pub use config::BattleConfig;
pub use content::{ActionId, Catalog};
pub use entity::{Entity, EntityDef, EntityId, Side};
pub use error::{ActionError, AiError, SetupError};
pub use output::{BattleOutcome, CombatEvent, CombatLog};
pub use scenario::BattlePackage;
pub use scheduler::{BattlePhase, TurnScheduler};
pub use session::{BattleSession, PendingActionContext, SelectedAction, TerrainContext};

#[cfg(test)]
mod tests;
