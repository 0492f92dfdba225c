//! Turn scheduler: initiative order, the active cursor, the per-turn action
//! economy, and battle termination.
//!
//! The scheduler owns no entities. It holds [`EntityId`] handles into the
//! [`Arena`] and reads the arena whenever it needs to know who is alive.
//!
//! # Phases
//!
//! ```text
//! Init -> Active(a) -> Resolving(a) -> Active(a) -> Active(b) -> ... -> Victory | Defeat | Fled
//! ```
//!
//! `Resolving` covers the window in which an action's playback is still
//! queued. Terminal phases never change again.
//!
//! # Example
//!
//! ```
//! use skirmish_core::arena::Arena;
//! use skirmish_core::dice::SeededDice;
//! use skirmish_core::entity::{EntityDef, Side};
//! use skirmish_core::scheduler::{BattlePhase, TurnScheduler};
//! use skirmish_core::Tile;
//!
//! let mut arena = Arena::new();
//! arena.spawn(EntityDef::new("Hero", Side::Player, Tile::new(0, 0)));
//! arena.spawn(EntityDef::new("Rat", Side::Enemy, Tile::new(3, 0)));
//!
//! let mut scheduler = TurnScheduler::roll_initiative(&arena, &mut SeededDice::new(1));
//! scheduler.start(&arena);
//! assert!(matches!(scheduler.phase(), BattlePhase::Active(_)));
//! assert_eq!(scheduler.round(), 1);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::arena::Arena;
use crate::dice::{Dice, DiceSource};
use crate::entity::{Ability, EntityId, Side};
use crate::output::{BattleOutcome, Rewards};

// =============================================================================
// BattlePhase
// =============================================================================

/// Where the battle is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattlePhase {
    /// Initiative rolled, no turn taken yet
    Init,
    /// Waiting for the given entity to act
    Active(EntityId),
    /// The given entity's action is still playing back
    Resolving(EntityId),
    /// Every enemy is down
    Victory(Rewards),
    /// Every party member is down
    Defeat,
    /// The party escaped
    Fled,
}

impl BattlePhase {
    /// Returns true once the battle has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self, Self::Victory(_) | Self::Defeat | Self::Fled)
    }

    /// The entity whose turn it is, if any.
    #[must_use]
    pub const fn actor(&self) -> Option<EntityId> {
        match self {
            Self::Active(id) | Self::Resolving(id) => Some(*id),
            _ => None,
        }
    }

    /// The terminal outcome, if the battle has ended.
    #[must_use]
    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self {
            Self::Victory(rewards) => Some(BattleOutcome::Victory(rewards.clone())),
            Self::Defeat => Some(BattleOutcome::Defeat),
            Self::Fled => Some(BattleOutcome::Fled),
            Self::Init | Self::Active(_) | Self::Resolving(_) => None,
        }
    }
}

// =============================================================================
// TurnScheduler
// =============================================================================

/// Initiative order plus the active cursor and action economy.
///
/// The order is fixed when the battle starts. Dead entities stay in it and
/// are skipped when the cursor moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnScheduler {
    order: Vec<EntityId>,
    initiative: BTreeMap<EntityId, i32>,
    cursor: usize,
    round: u32,
    has_moved: bool,
    has_acted: bool,
    phase: BattlePhase,
}

impl TurnScheduler {
    /// Builds a scheduler from an explicit order, first to act first.
    #[must_use]
    pub fn from_order(order: Vec<EntityId>) -> Self {
        Self {
            order,
            initiative: BTreeMap::new(),
            cursor: 0,
            round: 0,
            has_moved: false,
            has_acted: false,
            phase: BattlePhase::Init,
        }
    }

    /// Rolls d20 + DEX modifier + initiative bonus for every entity and sorts
    /// the order highest first. Ties keep arena (id) order.
    #[must_use]
    pub fn roll_initiative(arena: &Arena, dice: &mut dyn DiceSource) -> Self {
        let mut rolls: Vec<(EntityId, i32)> = arena
            .iter()
            .map(|e| {
                let stats = e.stats();
                let natural = i32::try_from(Dice::D20.roll(dice)).unwrap_or(1);
                let total = natural + stats.modifier(Ability::Dexterity) + stats.initiative_bonus;
                debug!(entity = %e, natural, total, "initiative");
                (e.id(), total)
            })
            .collect();
        rolls.sort_by_key(|&(_, total)| std::cmp::Reverse(total));

        let mut scheduler = Self::from_order(rolls.iter().map(|&(id, _)| id).collect());
        scheduler.initiative = rolls.into_iter().collect();
        scheduler
    }

    /// The full turn order.
    #[must_use]
    pub fn order(&self) -> &[EntityId] {
        &self.order
    }

    /// Initiative total rolled for `id`.
    #[must_use]
    pub fn initiative(&self, id: EntityId) -> Option<i32> {
        self.initiative.get(&id).copied()
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> &BattlePhase {
        &self.phase
    }

    /// The entity whose turn it is.
    #[must_use]
    pub const fn active(&self) -> Option<EntityId> {
        self.phase.actor()
    }

    /// Round number; 0 before the first turn.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Whether the active entity has used its move.
    #[must_use]
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Whether the active entity has used its act.
    #[must_use]
    pub const fn has_acted(&self) -> bool {
        self.has_acted
    }

    /// Records the move as spent.
    pub fn mark_moved(&mut self) {
        self.has_moved = true;
    }

    /// Records the act as spent.
    pub fn mark_acted(&mut self) {
        self.has_acted = true;
    }

    /// Enters `Resolving` for the active entity. No effect in other phases.
    pub fn begin_resolving(&mut self) {
        if let BattlePhase::Active(id) = self.phase {
            self.phase = BattlePhase::Resolving(id);
        }
    }

    /// Leaves `Resolving` back to `Active`. No effect in other phases.
    pub fn finish_resolving(&mut self) {
        if let BattlePhase::Resolving(id) = self.phase {
            self.phase = BattlePhase::Active(id);
        }
    }

    /// Moves from `Init` to the first living entity's turn.
    ///
    /// Termination is checked first, so a battle that starts with one side
    /// already down ends immediately.
    pub fn start(&mut self, arena: &Arena) -> &BattlePhase {
        if self.phase != BattlePhase::Init {
            return &self.phase;
        }
        if self.check_termination(arena) {
            return &self.phase;
        }
        self.round = 1;
        match (0..self.order.len()).find(|&i| arena.is_alive(self.order[i])) {
            Some(i) => self.activate(i),
            None => self.phase = BattlePhase::Defeat,
        }
        &self.phase
    }

    /// Ends the current turn.
    ///
    /// Checks for victory or defeat before anything else; otherwise moves
    /// the cursor to the next living entity (wrapping, which starts a new
    /// round) and resets the move and act flags.
    pub fn advance(&mut self, arena: &Arena) -> &BattlePhase {
        if self.phase.is_over() {
            return &self.phase;
        }
        if self.phase == BattlePhase::Init {
            return self.start(arena);
        }
        if self.check_termination(arena) {
            return &self.phase;
        }

        let len = self.order.len();
        for step in 1..=len {
            let index = (self.cursor + step) % len;
            if arena.is_alive(self.order[index]) {
                if index <= self.cursor {
                    self.round += 1;
                }
                self.activate(index);
                return &self.phase;
            }
        }
        self.phase = BattlePhase::Defeat;
        &self.phase
    }

    /// Ends the battle as fled.
    pub fn flee(&mut self) {
        if !self.phase.is_over() {
            info!("party fled");
            self.phase = BattlePhase::Fled;
        }
    }

    /// Victory or defeat if either side has no living member.
    #[must_use]
    pub fn check_outcome(arena: &Arena) -> Option<BattlePhase> {
        if !arena.any_alive(Side::Player) {
            return Some(BattlePhase::Defeat);
        }
        if !arena.any_alive(Side::Enemy) {
            return Some(BattlePhase::Victory(collect_rewards(arena)));
        }
        None
    }

    /// Moves to `Victory` or `Defeat` if the arena decides the battle.
    /// Returns true if the battle is over, including by flight.
    pub fn check_termination(&mut self, arena: &Arena) -> bool {
        if self.phase.is_over() {
            return true;
        }
        match Self::check_outcome(arena) {
            Some(terminal) => {
                info!(outcome = ?terminal, "battle decided");
                self.phase = terminal;
                true
            }
            None => false,
        }
    }

    fn activate(&mut self, index: usize) {
        self.cursor = index;
        self.has_moved = false;
        self.has_acted = false;
        let id = self.order[index];
        debug!(entity = %id, round = self.round, "turn starts");
        self.phase = BattlePhase::Active(id);
    }
}

/// Sums the bounty of every defeated enemy.
#[must_use]
pub fn collect_rewards(arena: &Arena) -> Rewards {
    arena
        .iter()
        .filter(|e| e.side() == Side::Enemy && !e.is_alive())
        .fold(Rewards::default(), |mut acc, e| {
            let bounty = e.bounty();
            acc.xp += bounty.xp;
            acc.gold += bounty.gold;
            acc.items.extend(bounty.items.iter().cloned());
            acc
        })
}
