//! AI decision module.
//!
//! Each [`Behavior`] maps to one strategy function. A strategy reads an
//! immutable snapshot of the battle ([`AiContext`]) and issues at most one
//! move and one act through an [`ActionSink`], the same narrow interface a
//! player's input goes through. Strategies never mutate the battle
//! themselves.
//!
//! A strategy returns `Err` when the rules reject one of its requests. The
//! session treats that as a pass; see
//! [`BattleSession::advance`](crate::session::BattleSession::advance).

mod movement;
mod strategy;

use skirmish_grid::{Grid, TerrainCostTable, Tile};
use tracing::debug;

use crate::arena::Arena;
use crate::content::{ActionId, Catalog};
use crate::entity::{Behavior, Entity};
use crate::error::{ActionError, AiError};

pub use movement::{approach, nearest_foe};

/// The callbacks a strategy acts through.
pub trait ActionSink {
    /// Walks the actor along `path` (start excluded, destination last).
    ///
    /// # Errors
    ///
    /// Any [`ActionError`] the rules raise; nothing moves on error.
    fn move_along(&mut self, path: &[Tile]) -> Result<(), ActionError>;

    /// Attacks `target` with the equipped weapon.
    ///
    /// # Errors
    ///
    /// Any [`ActionError`] the rules raise; the act is not spent on error.
    fn attack(&mut self, target: crate::entity::EntityId) -> Result<(), ActionError>;

    /// Uses spell or skill `action` aimed at `at`.
    ///
    /// # Errors
    ///
    /// Any [`ActionError`] the rules raise; nothing is spent on error.
    fn cast(&mut self, action: &ActionId, at: Tile) -> Result<(), ActionError>;

    /// Appends a line to the combat log.
    fn log(&mut self, line: String);
}

/// Read-only view of the battle for one AI turn.
#[derive(Debug, Clone, Copy)]
pub struct AiContext<'a> {
    /// The acting entity, as of the start of its turn.
    pub actor: &'a Entity,
    /// Every combatant.
    pub arena: &'a Arena,
    /// The battlefield.
    pub grid: &'a Grid,
    /// Spell and skill definitions.
    pub catalog: &'a Catalog,
    /// Terrain-cost overrides for movement.
    pub terrain: &'a TerrainCostTable,
    /// Allies below this hp fraction need healing.
    pub healer_threshold: f64,
}

/// Runs the actor's strategy for one turn.
///
/// # Errors
///
/// [`AiError::NoBehavior`] if the actor has no behavior tag, or
/// [`AiError::Rejected`] if a request was refused.
pub fn take_turn(ctx: &AiContext<'_>, sink: &mut dyn ActionSink) -> Result<(), AiError> {
    let behavior = ctx
        .actor
        .behavior()
        .ok_or(AiError::NoBehavior(ctx.actor.id()))?;
    debug!(actor = %ctx.actor, %behavior, "ai turn");
    match behavior {
        Behavior::Melee => strategy::melee(ctx, sink),
        Behavior::Ranged => strategy::ranged(ctx, sink),
        Behavior::Healer => strategy::healer(ctx, sink),
        Behavior::Spellcaster => strategy::spellcaster(ctx, sink),
    }
}
