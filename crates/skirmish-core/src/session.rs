//! The battle session: one battle from initiative to outcome.
//!
//! [`BattleSession`] owns the arena, the scheduler, the dice and the logs.
//! Player input arrives through [`BattleSession::handle_tile_interaction`]
//! with an explicit [`PendingActionContext`]; AI turns run inside
//! [`BattleSession::advance`] through the same move/attack/cast entry points,
//! so both follow one set of rules.
//!
//! Every request is validated completely before anything changes. A
//! rejected request leaves the battle untouched, logs a line, and returns
//! the [`ActionError`].
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::BattleConfig;
//! use skirmish_core::content::Catalog;
//! use skirmish_core::entity::{Behavior, EntityDef, Side};
//! use skirmish_core::session::{BattleSession, TerrainContext};
//! use skirmish_core::Tile;
//! use skirmish_grid::Grid;
//!
//! let party = vec![
//!     EntityDef::new("Hero", Side::Player, Tile::new(0, 0)).with_behavior(Behavior::Melee),
//!     EntityDef::new("Rat", Side::Enemy, Tile::new(5, 0)).with_behavior(Behavior::Melee),
//! ];
//! let config = BattleConfig::default().with_seed(3).with_autopilot();
//! let mut session = BattleSession::start_battle(
//!     party,
//!     TerrainContext::from(Grid::flat(8, 3)),
//!     None,
//!     Catalog::standard(),
//!     config,
//! )
//! .unwrap();
//!
//! while session.outcome().is_none() {
//!     session.advance();
//!     session.take_playback();
//! }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skirmish_grid::{
    chebyshev, has_line_of_sight, reachable_tiles, Grid, Reachability, TerrainCostTable, Tile,
};
use tracing::{debug, info, warn};

use crate::ai::{take_turn, ActionSink, AiContext};
use crate::arena::Arena;
use crate::config::BattleConfig;
use crate::content::{ActionDef, ActionId, Catalog, EffectKind};
use crate::dice::{DiceSource, SeededDice};
use crate::effect::{resolve_effect, resolve_weapon_attack, EffectContext, EffectOutcome};
use crate::entity::{Entity, EntityDef, EntityId, Side};
use crate::error::{ActionError, AiError, SetupError};
use crate::output::{BattleOutcome, CombatEvent, CombatLog};
use crate::playback::{PlaybackQueue, PlaybackStep};
use crate::resolver::{aoe_tiles, hit_probability, Advantage};
use crate::scheduler::{BattlePhase, TurnScheduler};

// =============================================================================
// Inputs
// =============================================================================

/// The battlefield a session is fought on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainContext {
    /// Cells
    pub grid: Grid,
    /// Per-class terrain costs
    #[serde(default)]
    pub costs: TerrainCostTable,
}

impl From<Grid> for TerrainContext {
    fn from(grid: Grid) -> Self {
        Self {
            grid,
            costs: TerrainCostTable::default(),
        }
    }
}

/// What a tile click means.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectedAction {
    /// Walk to the tile
    Move,
    /// Weapon attack on the tile's occupant
    Attack,
    /// Cast a known spell at the tile
    Magic(ActionId),
    /// Use a known skill at the tile
    Skill(ActionId),
}

/// The player's current selection, passed explicitly with every click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingActionContext {
    /// Who is acting
    pub actor: EntityId,
    /// Selected action; `None` after a deselect
    pub selected: Option<SelectedAction>,
}

impl PendingActionContext {
    /// A context with nothing selected.
    #[must_use]
    pub const fn new(actor: EntityId) -> Self {
        Self {
            actor,
            selected: None,
        }
    }

    /// Same context with `action` selected.
    #[must_use]
    pub fn with(mut self, action: SelectedAction) -> Self {
        self.selected = Some(action);
        self
    }

    /// Clears the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }
}

// =============================================================================
// BattleSession
// =============================================================================

/// A battle in progress.
pub struct BattleSession {
    arena: Arena,
    grid: Arc<Grid>,
    costs: TerrainCostTable,
    catalog: Arc<Catalog>,
    config: BattleConfig,
    scheduler: TurnScheduler,
    dice: Box<dyn DiceSource>,
    log: CombatLog,
    playback: PlaybackQueue,
    outcome: Option<BattleOutcome>,
}

impl fmt::Debug for BattleSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattleSession")
            .field("arena", &self.arena)
            .field("grid", &format!("{}x{}", self.grid.width(), self.grid.depth()))
            .field("catalog", &format!("[{} actions]", self.catalog.actions.len()))
            .field("config", &self.config)
            .field("scheduler", &self.scheduler)
            .field("playback", &self.playback.len())
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl BattleSession {
    /// Starts a battle.
    ///
    /// With `forced_encounter`, the catalog's encounter roster replaces every
    /// enemy in `entities`. Dice are seeded from `config.seed`, or from
    /// entropy when it is absent.
    ///
    /// # Errors
    ///
    /// [`SetupError`] if the encounter is unknown, a side is empty, two
    /// combatants share a tile, or someone starts on an impassable tile.
    pub fn start_battle(
        entities: Vec<EntityDef>,
        terrain: TerrainContext,
        forced_encounter: Option<&str>,
        catalog: Catalog,
        config: BattleConfig,
    ) -> Result<Self, SetupError> {
        let dice: Box<dyn DiceSource> = match config.seed {
            Some(seed) => Box::new(SeededDice::new(seed)),
            None => Box::new(SeededDice::from_entropy()),
        };
        Self::with_dice(entities, terrain, forced_encounter, catalog, config, dice)
    }

    /// Starts a battle drawing from an explicit dice source.
    ///
    /// # Errors
    ///
    /// As [`start_battle`](Self::start_battle).
    pub fn with_dice(
        mut entities: Vec<EntityDef>,
        terrain: TerrainContext,
        forced_encounter: Option<&str>,
        catalog: Catalog,
        config: BattleConfig,
        dice: Box<dyn DiceSource>,
    ) -> Result<Self, SetupError> {
        if let Some(id) = forced_encounter {
            let roster = catalog
                .encounter(id)
                .ok_or_else(|| SetupError::UnknownEncounter(id.to_string()))?;
            info!(encounter = id, enemies = roster.len(), "forced encounter");
            entities.retain(|d| d.side != Side::Enemy);
            entities.extend(roster.iter().cloned());
        }
        validate_roster(&entities, &terrain.grid)?;

        let mut arena = Arena::new();
        for def in entities {
            arena.spawn(def);
        }

        let mut session = Self {
            arena,
            grid: Arc::new(terrain.grid),
            costs: terrain.costs,
            catalog: Arc::new(catalog),
            config,
            scheduler: TurnScheduler::from_order(Vec::new()),
            dice,
            log: CombatLog::new(),
            playback: PlaybackQueue::new(),
            outcome: None,
        };
        session.roll_initiative();
        session.scheduler.start(&session.arena);
        if session.announce_outcome() {
            return Ok(session);
        }
        session.begin_turn();
        session.run_auto_turns();
        session.settle_playback();
        Ok(session)
    }

    fn roll_initiative(&mut self) {
        self.scheduler = TurnScheduler::roll_initiative(&self.arena, self.dice.as_mut());
        let order = self.scheduler.order().to_vec();
        let listing = order
            .iter()
            .filter_map(|&id| {
                let entity = self.arena.get(id)?;
                let roll = self.scheduler.initiative(id)?;
                Some(format!("{} ({roll})", entity.name()))
            })
            .collect::<Vec<_>>()
            .join(", ");
        info!(combatants = order.len(), "battle started");
        self.log.line(format!("Initiative: {listing}."));
        self.log.event(CombatEvent::BattleStarted { order });
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Every combatant, living and dead.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// One combatant.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.arena.get(id)
    }

    /// The battlefield.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Spell and skill definitions in use.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> &BattlePhase {
        self.scheduler.phase()
    }

    /// Turn order, first to act first.
    #[must_use]
    pub fn turn_order(&self) -> &[EntityId] {
        self.scheduler.order()
    }

    /// Whose turn it is.
    #[must_use]
    pub const fn active(&self) -> Option<EntityId> {
        self.scheduler.active()
    }

    /// Round number.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.scheduler.round()
    }

    /// Whether the active entity has moved this turn.
    #[must_use]
    pub const fn has_moved(&self) -> bool {
        self.scheduler.has_moved()
    }

    /// Whether the active entity has acted this turn.
    #[must_use]
    pub const fn has_acted(&self) -> bool {
        self.scheduler.has_acted()
    }

    /// Player-facing log.
    #[must_use]
    pub const fn log(&self) -> &CombatLog {
        &self.log
    }

    /// The outcome, once the battle has ended.
    #[must_use]
    pub const fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    /// Returns true while playback is queued; player input is refused.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self.scheduler.phase(), BattlePhase::Resolving(_))
    }

    /// Percent chance that `attacker`'s weapon hits `target`, for previews.
    #[must_use]
    pub fn hit_probability(&self, attacker: EntityId, target: EntityId) -> Option<u32> {
        Some(hit_probability(self.arena.get(attacker)?, self.arena.get(target)?))
    }

    /// Tiles `actor` could walk to this turn.
    #[must_use]
    pub fn reachable(&self, actor: EntityId) -> Option<Reachability> {
        let entity = self.arena.get(actor)?;
        Some(self.reach_of(entity))
    }

    /// Tiles an area action from `actor` aimed at `at` would cover.
    #[must_use]
    pub fn area_preview(&self, actor: EntityId, action: &ActionId, at: Tile) -> Vec<Tile> {
        let (Some(entity), Some(def)) = (self.arena.get(actor), self.catalog.action(action)) else {
            return Vec::new();
        };
        def.area
            .map(|area| aoe_tiles(entity.position(), at, area.shape, area.radius))
            .unwrap_or_default()
    }

    /// Hands every queued playback step to the front end and clears busy.
    pub fn take_playback(&mut self) -> Vec<PlaybackStep> {
        let steps = self.playback.drain();
        self.scheduler.finish_resolving();
        steps
    }

    // -------------------------------------------------------------------------
    // Player input
    // -------------------------------------------------------------------------

    /// Applies a tile click under the given selection.
    ///
    /// # Errors
    ///
    /// The [`ActionError`] that rejected the request. The battle is left
    /// exactly as it was and a line explaining why is logged.
    pub fn handle_tile_interaction(
        &mut self,
        ctx: &PendingActionContext,
        tile: Tile,
    ) -> Result<(), ActionError> {
        let result = self.interact(ctx, tile);
        match &result {
            Ok(()) => {
                self.announce_outcome();
                self.settle_playback();
            }
            Err(err) => self.reject(ctx.actor, err),
        }
        result
    }

    fn interact(&mut self, ctx: &PendingActionContext, tile: Tile) -> Result<(), ActionError> {
        self.check_input(ctx.actor)?;
        let selected = ctx.selected.as_ref().ok_or(ActionError::NoActionSelected)?;
        match selected {
            SelectedAction::Move => self.do_move(ctx.actor, tile),
            SelectedAction::Attack => {
                let target = self
                    .arena
                    .occupant_at(tile)
                    .ok_or(ActionError::InvalidTarget(tile))?;
                self.do_attack(ctx.actor, target)
            }
            SelectedAction::Magic(id) => {
                self.require_known(ctx.actor, id, |e| e.stats().spells.as_slice())?;
                self.do_cast(ctx.actor, id, tile)
            }
            SelectedAction::Skill(id) => {
                self.require_known(ctx.actor, id, |e| e.stats().skills.as_slice())?;
                self.do_cast(ctx.actor, id, tile)
            }
        }
    }

    /// Ends `actor`'s turn and runs any automatic turns that follow.
    ///
    /// # Errors
    ///
    /// [`ActionError::BattleOver`], [`ActionError::Busy`] or
    /// [`ActionError::NotYourTurn`].
    pub fn end_turn(&mut self, actor: EntityId) -> Result<(), ActionError> {
        if let Err(err) = self.check_input(actor) {
            self.reject(actor, &err);
            return Err(err);
        }
        self.advance();
        Ok(())
    }

    /// Rolls to escape. Success ends the battle as fled; failure spends the
    /// turn. Returns whether the party got away.
    ///
    /// # Errors
    ///
    /// [`ActionError::BattleOver`], [`ActionError::Busy`] or
    /// [`ActionError::NotYourTurn`].
    pub fn attempt_flee(&mut self, actor: EntityId) -> Result<bool, ActionError> {
        if let Err(err) = self.check_input(actor) {
            self.reject(actor, &err);
            return Err(err);
        }
        let success = self.dice.chance(self.config.flee_chance);
        info!(%actor, success, "flee attempt");
        self.log.event(CombatEvent::FleeAttempted { success });
        if success {
            self.log.line("The party escapes!");
            self.scheduler.flee();
            self.announce_outcome();
        } else {
            self.log.line("The party fails to escape.");
            self.advance();
        }
        Ok(success)
    }

    // -------------------------------------------------------------------------
    // Turn flow
    // -------------------------------------------------------------------------

    /// Ends the current turn, then runs automatic turns until a manually
    /// controlled entity is up, the battle ends, or the per-call turn limit
    /// is reached.
    ///
    /// If the active entity is automatic (for example after the limit was
    /// reached) its turn is played instead of skipped.
    pub fn advance(&mut self) -> &BattlePhase {
        if self.outcome.is_some() {
            return self.scheduler.phase();
        }
        let automatic = self.active().is_some_and(|id| self.is_automatic(id));
        if !automatic {
            self.next_turn();
        }
        self.run_auto_turns();
        self.settle_playback();
        self.scheduler.phase()
    }

    fn next_turn(&mut self) {
        self.scheduler.advance(&self.arena);
        if !self.announce_outcome() {
            self.begin_turn();
        }
    }

    fn begin_turn(&mut self) {
        let Some(id) = self.active() else {
            return;
        };
        let round = self.round();
        let Some(entity) = self.arena.get(id) else {
            return;
        };
        let mut updated = entity.clone();
        let expired = updated.stats_mut().tick();
        info!(entity = %updated, round, "turn started");
        self.log.event(CombatEvent::TurnStarted { entity: id, round });
        for status in expired {
            self.log.line(format!("{} is no longer {status}.", updated.name()));
            self.log.event(CombatEvent::StatusExpired { entity: id, status });
        }
        self.arena.replace(updated);
    }

    fn is_automatic(&self, id: EntityId) -> bool {
        self.arena.get(id).is_some_and(|e| match e.side() {
            Side::Enemy => true,
            Side::Player => self.config.autopilot_players,
        })
    }

    fn run_auto_turns(&mut self) {
        let mut turns = 0;
        while let Some(id) = self.active() {
            if !self.is_automatic(id) {
                break;
            }
            if turns >= self.config.max_auto_turns {
                warn!(limit = self.config.max_auto_turns, "automatic turn limit reached");
                break;
            }
            turns += 1;
            self.run_ai_turn(id);
            if self.announce_outcome() {
                break;
            }
            self.next_turn();
        }
    }

    fn run_ai_turn(&mut self, id: EntityId) {
        let snapshot = self.arena.clone();
        let grid = Arc::clone(&self.grid);
        let catalog = Arc::clone(&self.catalog);
        let costs = self.costs.clone();
        let healer_threshold = self.config.healer_threshold;

        let result = match snapshot.get(id) {
            Some(actor) => {
                let ctx = AiContext {
                    actor,
                    arena: &snapshot,
                    grid: &grid,
                    catalog: &catalog,
                    terrain: &costs,
                    healer_threshold,
                };
                take_turn(&ctx, &mut SessionSink { session: self, actor: id })
            }
            None => Err(AiError::MissingActor(id)),
        };

        if let Err(err) = result {
            warn!(entity = %id, error = %err, "ai fault, passing");
            let name = snapshot.get(id).map_or_else(|| id.to_string(), |e| e.name().to_string());
            self.log.line(format!("{name} hesitates."));
            self.log.event(CombatEvent::AiFault {
                entity: id,
                message: err.to_string(),
            });
        }
    }

    /// Emits the outcome once the scheduler reaches a terminal phase, or
    /// moves it there if the arena already decides the battle. Returns true
    /// if the battle is over.
    fn announce_outcome(&mut self) -> bool {
        if self.outcome.is_some() {
            return true;
        }
        self.scheduler.check_termination(&self.arena);
        let Some(outcome) = self.scheduler.phase().outcome() else {
            return false;
        };
        info!(%outcome, "battle ended");
        self.log.line(match &outcome {
            BattleOutcome::Victory(r) => format!("Victory! {} xp and {} gold.", r.xp, r.gold),
            BattleOutcome::Defeat => "The party has fallen.".to_string(),
            BattleOutcome::Fled => "The battle is over.".to_string(),
        });
        self.log.event(CombatEvent::BattleEnded(outcome.clone()));
        self.outcome = Some(outcome);
        true
    }

    fn settle_playback(&mut self) {
        if !self.playback.is_empty() {
            self.scheduler.begin_resolving();
        }
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    fn check_turn(&self, actor: EntityId) -> Result<(), ActionError> {
        if self.outcome.is_some() || self.scheduler.phase().is_over() {
            return Err(ActionError::BattleOver);
        }
        if self.scheduler.active() != Some(actor) {
            return Err(ActionError::NotYourTurn { actor });
        }
        Ok(())
    }

    fn check_input(&self, actor: EntityId) -> Result<(), ActionError> {
        if self.outcome.is_some() {
            return Err(ActionError::BattleOver);
        }
        if self.is_busy() {
            return Err(ActionError::Busy);
        }
        self.check_turn(actor)
    }

    fn require_known(
        &self,
        actor: EntityId,
        id: &ActionId,
        list: impl Fn(&Entity) -> &[ActionId],
    ) -> Result<(), ActionError> {
        let entity = self.arena.get(actor).ok_or(ActionError::UnknownEntity(actor))?;
        if list(entity).contains(id) {
            Ok(())
        } else {
            Err(ActionError::UnknownAction(id.clone()))
        }
    }

    fn reject(&mut self, actor: EntityId, err: &ActionError) {
        warn!(%actor, error = %err, "request rejected");
        self.log.line(format!("Cannot do that: {err}."));
        self.log.event(CombatEvent::Rejected {
            actor,
            reason: err.to_string(),
        });
    }

    fn reach_of(&self, entity: &Entity) -> Reachability {
        let occupied: HashSet<Tile> = self.arena.occupied_tiles_except(entity.id());
        #[allow(clippy::cast_precision_loss)]
        let budget = entity.stats().speed as f32;
        reachable_tiles(
            &self.grid,
            entity.position(),
            budget,
            &occupied,
            entity.stats().mover_class,
            &self.costs,
        )
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    fn do_move(&mut self, actor: EntityId, dest: Tile) -> Result<(), ActionError> {
        self.check_turn(actor)?;
        if self.scheduler.has_moved() {
            return Err(ActionError::AlreadyMoved);
        }
        let entity = self.arena.get(actor).ok_or(ActionError::UnknownEntity(actor))?;
        if self.arena.occupant_at(dest).is_some_and(|o| o != actor) {
            return Err(ActionError::Occupied(dest));
        }
        let path = self
            .reach_of(entity)
            .path_to(dest)
            .ok_or(ActionError::NoPath(dest))?;

        let from = entity.position();
        let mut updated = entity.clone();
        updated.set_position(dest);
        debug!(entity = %updated, %from, to = %dest, steps = path.len(), "move");
        self.log.line(format!("{} moves to ({}, {}).", updated.name(), dest.x, dest.y));
        self.log.event(CombatEvent::Moved {
            entity: actor,
            from,
            to: dest,
        });
        self.arena.replace(updated);
        self.playback.walk(actor, &path);
        self.scheduler.mark_moved();
        Ok(())
    }

    fn do_attack(&mut self, actor: EntityId, target: EntityId) -> Result<(), ActionError> {
        self.check_turn(actor)?;
        if self.scheduler.has_acted() {
            return Err(ActionError::AlreadyActed);
        }
        let attacker = self.arena.get(actor).ok_or(ActionError::UnknownEntity(actor))?;
        let defender = self.arena.get(target).ok_or(ActionError::UnknownEntity(target))?;
        if !defender.is_alive() || !defender.is_hostile_to(attacker) {
            return Err(ActionError::InvalidTarget(defender.position()));
        }
        let weapon = &attacker.equipment().weapon;
        let distance = chebyshev(attacker.position(), defender.position());
        if u32::try_from(distance).map_or(true, |d| d > weapon.range) {
            return Err(ActionError::OutOfRange {
                distance,
                range: weapon.range,
            });
        }
        if weapon.ranged && !has_line_of_sight(&self.grid, attacker.position(), defender.position())
        {
            return Err(ActionError::NoLineOfSight(defender.position()));
        }

        let (from, to, ranged) = (attacker.position(), defender.position(), weapon.ranged);
        let outcome =
            resolve_weapon_attack(attacker, defender, Advantage::Normal, self.dice.as_mut());
        self.commit(outcome);
        if ranged {
            self.playback.volley(from, to, &[to]);
        } else {
            self.playback.strike(to);
        }
        self.scheduler.mark_acted();
        Ok(())
    }

    fn do_cast(&mut self, actor: EntityId, id: &ActionId, at: Tile) -> Result<(), ActionError> {
        self.check_turn(actor)?;
        if self.scheduler.has_acted() {
            return Err(ActionError::AlreadyActed);
        }
        let caster = self.arena.get(actor).ok_or(ActionError::UnknownEntity(actor))?;
        let stats = caster.stats();
        if !stats.spells.contains(id) && !stats.skills.contains(id) {
            return Err(ActionError::UnknownAction(id.clone()));
        }
        let catalog = Arc::clone(&self.catalog);
        let def = catalog
            .action(id)
            .ok_or_else(|| ActionError::UnknownAction(id.clone()))?;
        def.check_affordable(id, stats)?;

        let origin = caster.position();
        let aim = if def.is_self_only() { origin } else { at };
        if !self.grid.in_bounds(aim) {
            return Err(ActionError::InvalidTarget(aim));
        }
        let distance = chebyshev(origin, aim);
        if u32::try_from(distance).map_or(true, |d| d > def.range) {
            return Err(ActionError::OutOfRange {
                distance,
                range: def.range,
            });
        }
        let (targets, impacts) = self.select_targets(caster, def, aim)?;

        let mut paid = caster.clone();
        def.pay(id, paid.stats_mut());
        self.arena.replace(paid);
        info!(%actor, action = %id, at = %aim, targets = targets.len(), "action used");
        self.log.event(CombatEvent::ActionUsed {
            actor,
            action: id.clone(),
            at: aim,
        });
        if targets.is_empty() {
            let name = self.name_of(actor);
            self.log.line(format!("{name} uses {}, but it hits nothing.", def.name));
        }

        for target in targets {
            let (Some(caster), Some(target)) = (self.arena.get(actor), self.arena.get(target)) else {
                continue;
            };
            let ctx = EffectContext {
                caster,
                action: def,
                is_area: def.area.is_some(),
                status_duration: self.config.status_duration,
            };
            let outcome = resolve_effect(&ctx, target, self.dice.as_mut());
            self.commit(outcome);
        }

        if def.is_self_only() {
            self.playback.strike(origin);
        } else {
            self.playback.volley(origin, aim, &impacts);
        }
        self.scheduler.mark_acted();
        Ok(())
    }

    /// Who an action aimed at `aim` affects, plus the tiles to flash.
    ///
    /// Damage affects only the caster's foes; everything else only its allies.
    fn select_targets(
        &self,
        caster: &Entity,
        def: &ActionDef,
        aim: Tile,
    ) -> Result<(Vec<EntityId>, Vec<Tile>), ActionError> {
        let wanted = |e: &Entity| {
            e.is_alive()
                && if def.is_offensive() {
                    e.is_hostile_to(caster)
                } else {
                    e.side() == caster.side()
                }
        };

        if matches!(def.effect, EffectKind::HealSelf) {
            return Ok((vec![caster.id()], vec![caster.position()]));
        }

        if let Some(area) = def.area {
            let tiles = aoe_tiles(caster.position(), aim, area.shape, area.radius);
            let targets = tiles
                .iter()
                .filter_map(|&t| self.arena.occupant_at(t))
                .filter(|&id| self.arena.get(id).is_some_and(|e| wanted(e)))
                .collect();
            return Ok((targets, tiles));
        }

        let target = self
            .arena
            .occupant_at(aim)
            .and_then(|id| self.arena.get(id))
            .filter(|e| wanted(*e))
            .ok_or(ActionError::InvalidTarget(aim))?;
        if def.is_offensive() && !has_line_of_sight(&self.grid, caster.position(), aim) {
            return Err(ActionError::NoLineOfSight(aim));
        }
        Ok((vec![target.id()], vec![aim]))
    }

    fn commit(&mut self, outcome: EffectOutcome) {
        let EffectOutcome {
            target,
            line,
            events,
        } = outcome;
        self.log.line(line);
        self.log.extend_events(events);
        self.arena.replace(target);
    }

    fn name_of(&self, id: EntityId) -> String {
        self.arena
            .get(id)
            .map_or_else(|| id.to_string(), |e| e.name().to_string())
    }
}

/// Routes an AI strategy's requests into the session.
struct SessionSink<'s> {
    session: &'s mut BattleSession,
    actor: EntityId,
}

impl ActionSink for SessionSink<'_> {
    fn move_along(&mut self, path: &[Tile]) -> Result<(), ActionError> {
        match path.last() {
            Some(&dest) => self.session.do_move(self.actor, dest),
            None => Ok(()),
        }
    }

    fn attack(&mut self, target: EntityId) -> Result<(), ActionError> {
        self.session.do_attack(self.actor, target)
    }

    fn cast(&mut self, action: &ActionId, at: Tile) -> Result<(), ActionError> {
        self.session.do_cast(self.actor, action, at)
    }

    fn log(&mut self, line: String) {
        self.session.log.line(line);
    }
}

fn validate_roster(entities: &[EntityDef], grid: &Grid) -> Result<(), SetupError> {
    for side in [Side::Player, Side::Enemy] {
        if !entities.iter().any(|d| d.side == side && d.stats.hp > 0) {
            return Err(SetupError::EmptySide(side));
        }
    }
    let mut seen = HashSet::new();
    for def in entities {
        if !grid.in_bounds(def.position) || grid.is_obstacle(def.position) {
            return Err(SetupError::BadStart {
                name: def.name.clone(),
                tile: def.position,
            });
        }
        if !seen.insert(def.position) {
            return Err(SetupError::DuplicatePosition(def.position));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::entity::Behavior;

    fn roster() -> Vec<EntityDef> {
        vec![
            EntityDef::new("Hero", Side::Player, Tile::new(0, 0)),
            EntityDef::new("Rat", Side::Enemy, Tile::new(4, 0)).with_behavior(Behavior::Melee),
        ]
    }

    fn start(defs: Vec<EntityDef>, rolls: Vec<u32>) -> BattleSession {
        BattleSession::with_dice(
            defs,
            TerrainContext::from(Grid::flat(8, 4)),
            None,
            Catalog::standard(),
            BattleConfig::default(),
            Box::new(ScriptedDice::new(rolls)),
        )
        .unwrap()
    }

    mod setup_tests {
        use super::*;

        #[test]
        fn empty_side_is_rejected() {
            let defs = vec![EntityDef::new("Hero", Side::Player, Tile::new(0, 0))];
            let err = BattleSession::start_battle(
                defs,
                TerrainContext::from(Grid::flat(4, 4)),
                None,
                Catalog::standard(),
                BattleConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, SetupError::EmptySide(Side::Enemy)));
        }

        #[test]
        fn shared_tile_is_rejected() {
            let mut defs = roster();
            defs[1].position = Tile::new(0, 0);
            let err = BattleSession::start_battle(
                defs,
                TerrainContext::from(Grid::flat(4, 4)),
                None,
                Catalog::standard(),
                BattleConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, SetupError::DuplicatePosition(_)));
        }

        #[test]
        fn start_in_wall_is_rejected() {
            let grid = Grid::new(4, 4, vec![skirmish_grid::GridCell::wall(0, 0)]).unwrap();
            let err = BattleSession::start_battle(
                roster(),
                TerrainContext::from(grid),
                None,
                Catalog::standard(),
                BattleConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, SetupError::BadStart { .. }));
        }

        #[test]
        fn unknown_encounter_is_rejected() {
            let err = BattleSession::start_battle(
                roster(),
                TerrainContext::from(Grid::flat(8, 8)),
                Some("dragon_lair"),
                Catalog::standard(),
                BattleConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, SetupError::UnknownEncounter(id) if id == "dragon_lair"));
        }

        #[test]
        fn forced_encounter_replaces_enemies() {
            let session = BattleSession::start_battle(
                roster(),
                TerrainContext::from(Grid::flat(12, 12)),
                Some("bone_patrol"),
                Catalog::standard(),
                BattleConfig::default().with_seed(1),
            )
            .unwrap();
            let enemies: Vec<_> = session
                .arena()
                .iter()
                .filter(|e| e.side() == Side::Enemy)
                .map(Entity::name)
                .collect();
            assert_eq!(enemies.len(), 3);
            assert!(!enemies.contains(&"Rat"));
        }

        #[test]
        fn initiative_is_logged() {
            // Hero 15, rat 3: the hero opens and the rat does not act yet.
            let session = start(roster(), vec![15, 3]);
            assert_eq!(session.turn_order()[0], EntityId::new(0));
            assert_eq!(session.active(), Some(EntityId::new(0)));
            assert!(session.log().lines()[0].starts_with("Initiative: Hero (15)"));
            assert!(matches!(session.log().events()[0], CombatEvent::BattleStarted { .. }));
        }
    }

    mod input_tests {
        use super::*;

        fn hero_first() -> BattleSession {
            start(roster(), vec![15, 3])
        }

        #[test]
        fn nothing_selected_is_rejected() {
            let mut session = hero_first();
            let hero = EntityId::new(0);
            let err = session
                .handle_tile_interaction(&PendingActionContext::new(hero), Tile::new(1, 0))
                .unwrap_err();
            assert_eq!(err, ActionError::NoActionSelected);
            assert!(matches!(session.log().events().last(), Some(CombatEvent::Rejected { .. })));
        }

        #[test]
        fn wrong_actor_is_rejected() {
            let mut session = hero_first();
            let rat = EntityId::new(1);
            let ctx = PendingActionContext::new(rat).with(SelectedAction::Move);
            assert_eq!(
                session.handle_tile_interaction(&ctx, Tile::new(3, 0)),
                Err(ActionError::NotYourTurn { actor: rat })
            );
        }

        #[test]
        fn move_then_busy_then_second_move_refused() {
            let mut session = hero_first();
            let hero = EntityId::new(0);
            let ctx = PendingActionContext::new(hero).with(SelectedAction::Move);
            session.handle_tile_interaction(&ctx, Tile::new(2, 0)).unwrap();
            assert_eq!(session.entity(hero).unwrap().position(), Tile::new(2, 0));
            assert!(session.is_busy());
            assert_eq!(
                session.handle_tile_interaction(&ctx, Tile::new(3, 1)),
                Err(ActionError::Busy)
            );

            let steps = session.take_playback();
            assert_eq!(steps.len(), 2);
            assert!(!session.is_busy());
            assert_eq!(
                session.handle_tile_interaction(&ctx, Tile::new(3, 1)),
                Err(ActionError::AlreadyMoved)
            );
            assert_eq!(session.entity(hero).unwrap().position(), Tile::new(2, 0));
        }

        #[test]
        fn move_onto_occupant_refused() {
            let mut session = hero_first();
            let ctx = PendingActionContext::new(EntityId::new(0)).with(SelectedAction::Move);
            assert_eq!(
                session.handle_tile_interaction(&ctx, Tile::new(4, 0)),
                Err(ActionError::Occupied(Tile::new(4, 0)))
            );
            assert!(!session.has_moved());
        }

        #[test]
        fn move_beyond_speed_refused() {
            let mut defs = roster();
            defs[0].stats.speed = 2;
            let mut session = start(defs, vec![15, 3]);
            let ctx = PendingActionContext::new(EntityId::new(0)).with(SelectedAction::Move);
            assert_eq!(
                session.handle_tile_interaction(&ctx, Tile::new(3, 0)),
                Err(ActionError::NoPath(Tile::new(3, 0)))
            );
        }

        #[test]
        fn attack_out_of_range_refused() {
            let mut session = hero_first();
            let ctx = PendingActionContext::new(EntityId::new(0)).with(SelectedAction::Attack);
            assert_eq!(
                session.handle_tile_interaction(&ctx, Tile::new(4, 0)),
                Err(ActionError::OutOfRange { distance: 4, range: 1 })
            );
            assert!(!session.has_acted());
        }

        #[test]
        fn unknown_spell_refused() {
            let mut session = hero_first();
            let ctx = PendingActionContext::new(EntityId::new(0))
                .with(SelectedAction::Magic(ActionId::new("fireball")));
            assert_eq!(
                session.handle_tile_interaction(&ctx, Tile::new(4, 0)),
                Err(ActionError::UnknownAction(ActionId::new("fireball")))
            );
        }

        #[test]
        fn end_turn_hands_over_to_ai_and_back() {
            // Initiative 15/3, then the rat walks up and attacks (roll 2 misses).
            let mut session = start(roster(), vec![15, 3, 2]);
            let hero = EntityId::new(0);
            session.end_turn(hero).unwrap();
            assert_eq!(session.active(), Some(hero));
            assert_eq!(session.round(), 2);
            assert_eq!(session.entity(EntityId::new(1)).unwrap().position(), Tile::new(1, 0));
            assert!(session.is_busy());
            assert_eq!(session.end_turn(hero), Err(ActionError::Busy));
        }
    }

    mod flee_tests {
        use super::*;

        #[test]
        fn successful_flee_ends_battle() {
            let dice = ScriptedDice::new(vec![15, 3]).with_coins(vec![true]);
            let mut session = BattleSession::with_dice(
                roster(),
                TerrainContext::from(Grid::flat(8, 4)),
                None,
                Catalog::standard(),
                BattleConfig::default(),
                Box::new(dice),
            )
            .unwrap();
            assert_eq!(session.attempt_flee(EntityId::new(0)), Ok(true));
            assert_eq!(session.outcome(), Some(&BattleOutcome::Fled));
            assert_eq!(session.phase(), &BattlePhase::Fled);
            assert_eq!(
                session.attempt_flee(EntityId::new(0)),
                Err(ActionError::BattleOver)
            );
            let ended = session
                .log()
                .events()
                .iter()
                .filter(|e| matches!(e, CombatEvent::BattleEnded(_)))
                .count();
            assert_eq!(ended, 1);
        }

        #[test]
        fn failed_flee_spends_the_turn() {
            let dice = ScriptedDice::new(vec![15, 3, 1]).with_coins(vec![false]);
            let mut session = BattleSession::with_dice(
                roster(),
                TerrainContext::from(Grid::flat(8, 4)),
                None,
                Catalog::standard(),
                BattleConfig::default(),
                Box::new(dice),
            )
            .unwrap();
            assert_eq!(session.attempt_flee(EntityId::new(0)), Ok(false));
            assert!(session.outcome().is_none());
            // The rat took its turn and it is the hero's again.
            assert_eq!(session.round(), 2);
            assert_eq!(session.active(), Some(EntityId::new(0)));
        }
    }

    #[test]
    fn hit_probability_preview() {
        let session = start(roster(), vec![15, 3]);
        let chance = session.hit_probability(EntityId::new(0), EntityId::new(1)).unwrap();
        assert!((5..=95).contains(&chance));
        assert_eq!(session.hit_probability(EntityId::new(0), EntityId::new(9)), None);
    }

    #[test]
    fn reachable_preview_respects_speed() {
        let session = start(roster(), vec![15, 3]);
        let reach = session.reachable(EntityId::new(0)).unwrap();
        assert!(reach.contains(Tile::new(3, 0)));
        assert!(!reach.contains(Tile::new(4, 0)));
    }
}
