//! Roster and session builders shared by the battle tests.

use skirmish_grid::{Grid, GridCell, TerrainKind};

use crate::config::BattleConfig;
use crate::content::{ActionId, Catalog};
use crate::dice::{Dice, ScriptedDice};
use crate::entity::{
    Behavior, CombatStats, DamageKind, EntityDef, EntityId, Equipment, Side, Weapon,
};
use crate::error::ActionError;
use crate::session::{BattleSession, PendingActionContext, SelectedAction, TerrainContext};
use crate::Tile;

// =============================================================================
// Rosters
// =============================================================================

/// A plain fighter with a longsword (1d8 slashing), all abilities 10.
pub fn fighter(name: &str, x: i32, y: i32) -> EntityDef {
    EntityDef::new(name, Side::Player, Tile::new(x, y)).with_equipment(Equipment {
        weapon: Weapon {
            name: "longsword".into(),
            damage: Dice::new(1, 8),
            kind: DamageKind::Slashing,
            ..Weapon::unarmed()
        },
        ..Equipment::default()
    })
}

/// A player caster knowing `spells`, with three spell slots.
pub fn caster(name: &str, x: i32, y: i32, spells: &[&str]) -> EntityDef {
    EntityDef::new(name, Side::Player, Tile::new(x, y)).with_stats(CombatStats {
        spell_slots: 3,
        max_spell_slots: 3,
        spells: spells.iter().map(|s| ActionId::new(s)).collect(),
        ..CombatStats::default()
    })
}

/// A melee goblin with the given hp and AC.
pub fn goblin(x: i32, y: i32, hp: u32, armor_class: i32) -> EntityDef {
    EntityDef::new("Goblin", Side::Enemy, Tile::new(x, y))
        .with_behavior(Behavior::Melee)
        .with_stats(CombatStats {
            hp,
            max_hp: hp,
            armor_class,
            ..CombatStats::default()
        })
}

/// A grid whose every cell is forest costing `cost`.
pub fn forest(width: u32, depth: u32, cost: f32) -> Grid {
    let mut cells = Vec::new();
    for z in 0..depth {
        for x in 0..width {
            cells.push(
                GridCell::open(i32::try_from(x).unwrap(), i32::try_from(z).unwrap())
                    .with_terrain(TerrainKind::Forest, cost),
            );
        }
    }
    Grid::new(width, depth, cells).unwrap()
}

// =============================================================================
// Sessions
// =============================================================================

/// Starts a battle on `grid` with scripted dice. The first rolls go to
/// initiative, one per entity in roster order.
pub fn scripted(defs: Vec<EntityDef>, grid: Grid, rolls: Vec<u32>) -> BattleSession {
    scripted_with(defs, grid, ScriptedDice::new(rolls), BattleConfig::default())
}

/// Same as [`scripted`] with an explicit dice source and config.
pub fn scripted_with(
    defs: Vec<EntityDef>,
    grid: Grid,
    dice: ScriptedDice,
    config: BattleConfig,
) -> BattleSession {
    BattleSession::with_dice(
        defs,
        TerrainContext::from(grid),
        None,
        Catalog::standard(),
        config,
        Box::new(dice),
    )
    .unwrap()
}

/// Clicks `tile` as `actor` with `action` selected, then drains playback so
/// the next input is accepted.
pub fn act(
    session: &mut BattleSession,
    actor: EntityId,
    action: SelectedAction,
    tile: Tile,
) -> Result<(), ActionError> {
    let ctx = PendingActionContext::new(actor).with(action);
    let result = session.handle_tile_interaction(&ctx, tile);
    session.take_playback();
    result
}

/// Ends `actor`'s turn and drains whatever the automatic turns queued.
pub fn pass(session: &mut BattleSession, actor: EntityId) {
    session.end_turn(actor).unwrap();
    session.take_playback();
}

/// Current hp of `id`.
pub fn hp(session: &BattleSession, id: EntityId) -> u32 {
    session.entity(id).unwrap().stats().hp
}

/// Shorthand for a spell selection.
pub fn magic(id: &str) -> SelectedAction {
    SelectedAction::Magic(ActionId::new(id))
}
