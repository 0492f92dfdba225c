//! Target selection and approach movement shared by the strategies.

use skirmish_grid::{chebyshev, find_path_for, reachable_tiles, Tile};
use tracing::debug;

use super::{ActionSink, AiContext};
use crate::entity::Entity;
use crate::error::AiError;

/// The living hostile closest to `from` (Chebyshev), lowest id on ties.
#[must_use]
pub fn nearest_foe<'a>(ctx: &AiContext<'a>, from: Tile) -> Option<&'a Entity> {
    let actor = ctx.actor;
    ctx.arena
        .living()
        .filter(|e| e.is_hostile_to(actor))
        .min_by_key(|e| (chebyshev(from, e.position()), e.id()))
}

/// Returns true if `target` is within `range` tiles of `from`.
pub(super) fn in_range(from: Tile, target: Tile, range: u32) -> bool {
    u32::try_from(chebyshev(from, target)).is_ok_and(|d| d <= range)
}

/// Moves the actor from `from` toward `target` until it is within
/// `stop_within` tiles or out of movement, returning where it ended up.
///
/// Follows the A* route around other combatants, priced for the actor's
/// mover class, and stops at the last tile
/// of that route the actor can afford this turn. If no route exists it
/// settles for the affordable tile nearest the target. Standing still is a
/// valid result and issues no move.
///
/// # Errors
///
/// [`AiError::Rejected`] if the sink refuses the move.
pub fn approach(
    ctx: &AiContext<'_>,
    sink: &mut dyn ActionSink,
    from: Tile,
    target: Tile,
    stop_within: u32,
) -> Result<Tile, AiError> {
    if in_range(from, target, stop_within) {
        return Ok(from);
    }

    let actor = ctx.actor;
    let occupied = ctx.arena.occupied_tiles_except(actor.id());
    #[allow(clippy::cast_precision_loss)]
    let budget = actor.stats().speed as f32;
    let class = actor.stats().mover_class;
    let reach = reachable_tiles(ctx.grid, from, budget, &occupied, class, ctx.terrain);

    let mut dest = None;
    if let Some(route) = find_path_for(ctx.grid, from, target, &occupied, class, ctx.terrain) {
        for tile in route {
            if tile == target || !reach.contains(tile) {
                break;
            }
            dest = Some(tile);
            if in_range(tile, target, stop_within) {
                break;
            }
        }
    } else {
        let current = chebyshev(from, target);
        dest = reach
            .tiles()
            .into_iter()
            .filter(|&t| chebyshev(t, target) < current)
            .min_by(|&a, &b| {
                chebyshev(a, target).cmp(&chebyshev(b, target)).then_with(|| {
                    reach
                        .cost_to(a)
                        .unwrap_or(f32::MAX)
                        .total_cmp(&reach.cost_to(b).unwrap_or(f32::MAX))
                })
            });
    }

    let Some(dest) = dest else {
        debug!(actor = %actor, %target, "no affordable step toward target");
        return Ok(from);
    };
    let path = reach.path_to(dest).unwrap_or_else(|| vec![dest]);
    sink.move_along(&path)?;
    Ok(dest)
}
