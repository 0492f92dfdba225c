//! Error types.
//!
//! - [`ActionError`]: an illegal request. Rejected before any state
//!   changes and never consumes the turn.
//! - [`AiError`]: a fault inside an AI strategy. Caught by the session and
//!   treated as a pass.
//! - [`SetupError`]: a battle that cannot be built from its inputs.
//!
//! Misses, failed flee attempts and resisted spells are normal outcomes and
//! never show up here.

use skirmish_grid::{GridError, Tile};
use thiserror::Error;

use crate::content::ActionId;
use crate::entity::EntityId;

/// A rejected player or AI request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The actor is not the active entity.
    #[error("it is not {actor}'s turn")]
    NotYourTurn {
        /// Who tried to act
        actor: EntityId,
    },
    /// The move for this turn is spent.
    #[error("already moved this turn")]
    AlreadyMoved,
    /// The act for this turn is spent.
    #[error("already acted this turn")]
    AlreadyActed,
    /// Target is farther than the action reaches.
    #[error("target out of range ({distance} > {range})")]
    OutOfRange {
        /// Chebyshev distance to the target
        distance: i32,
        /// Reach of the action
        range: u32,
    },
    /// Not enough spell slots.
    #[error("not enough spell slots (need {needed}, have {available})")]
    NoSpellSlots {
        /// Cost
        needed: u32,
        /// Remaining
        available: u32,
    },
    /// Not enough stamina.
    #[error("not enough stamina (need {needed}, have {available})")]
    NoStamina {
        /// Cost
        needed: u32,
        /// Remaining
        available: u32,
    },
    /// The action is still cooling down.
    #[error("{action} is on cooldown for {turns} more turn(s)")]
    OnCooldown {
        /// The action
        action: ActionId,
        /// Turns left
        turns: u32,
    },
    /// The actor does not know this action.
    #[error("unknown action {0}")]
    UnknownAction(ActionId),
    /// No legal path to the destination within the movement budget.
    #[error("no path to {0}")]
    NoPath(Tile),
    /// Another combatant stands on the destination.
    #[error("{0} is occupied")]
    Occupied(Tile),
    /// Nothing valid to target at the tile.
    #[error("no valid target at {0}")]
    InvalidTarget(Tile),
    /// A sight-blocking cell lies between caster and target.
    #[error("no line of sight to {0}")]
    NoLineOfSight(Tile),
    /// Playback of the previous action has not finished.
    #[error("busy resolving the previous action")]
    Busy,
    /// The battle has already ended.
    #[error("the battle is over")]
    BattleOver,
    /// A tile was clicked with nothing selected.
    #[error("no action selected")]
    NoActionSelected,
    /// The entity id is not in the battle.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
}

/// A fault raised inside an AI strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    /// The strategy issued a request the rules rejected.
    #[error("rejected request: {0}")]
    Rejected(#[from] ActionError),
    /// The acting entity has no behavior tag.
    #[error("entity {0} has no behavior")]
    NoBehavior(EntityId),
    /// The acting entity vanished from the snapshot.
    #[error("entity {0} is missing from the battle")]
    MissingActor(EntityId),
}

/// A battle that cannot be started.
#[derive(Debug, Error)]
pub enum SetupError {
    /// One side has no living combatants.
    #[error("no living {0} combatants")]
    EmptySide(crate::entity::Side),
    /// Two combatants start on the same tile.
    #[error("two combatants start on {0}")]
    DuplicatePosition(Tile),
    /// A combatant starts off the grid or inside an obstacle.
    #[error("{name} starts on impassable tile {tile}")]
    BadStart {
        /// Entity name
        name: String,
        /// Start tile
        tile: Tile,
    },
    /// The forced encounter id is not in the catalog.
    #[error("unknown encounter `{0}`")]
    UnknownEncounter(String),
    /// The terrain is invalid.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// A package or catalog did not parse.
    #[error("invalid battle data: {0}")]
    Json(#[from] serde_json::Error),
    /// A package or catalog file could not be read.
    #[error("cannot read battle data: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_read_well() {
        let err = ActionError::OutOfRange {
            distance: 4,
            range: 1,
        };
        assert_eq!(err.to_string(), "target out of range (4 > 1)");
        let err = ActionError::OnCooldown {
            action: ActionId::new("rage"),
            turns: 2,
        };
        assert_eq!(err.to_string(), "rage is on cooldown for 2 more turn(s)");
    }

    #[test]
    fn ai_error_wraps_action_error() {
        let err: AiError = ActionError::AlreadyActed.into();
        assert_eq!(err, AiError::Rejected(ActionError::AlreadyActed));
        assert!(err.to_string().contains("already acted"));
    }
}
