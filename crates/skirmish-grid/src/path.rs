//! A* shortest path over the 8-connected grid.
//!
//! Step cost is the destination cell's movement cost (after any
//! [`TerrainCostTable`] override for the mover's class), multiplied by
//! [`DIAGONAL_COST`] for diagonal steps. Obstacles and steps whose height
//! difference exceeds [`MAX_STEP_HEIGHT`](crate::MAX_STEP_HEIGHT) are
//! impassable. The search is bounded by [`MAX_SEARCH_ITERATIONS`]; running
//! out of iterations is reported the same way as "no path".

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::debug;

use crate::grid::Grid;
use crate::terrain::{MoverClass, TerrainCostTable};
use crate::{is_diagonal, Tile, DIAGONAL_COST, NEIGHBOR_OFFSETS};

/// Maximum number of node expansions before A* gives up.
pub const MAX_SEARCH_ITERATIONS: usize = 4096;

/// Open-set entry ordered as a min-heap on `priority`.
///
/// Ties break on the tile coordinate so expansion order never depends on
/// hash iteration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frontier {
    pub priority: f32,
    pub cost: f32,
    pub tile: Tile,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.tile.x.cmp(&self.tile.x))
            .then_with(|| other.tile.y.cmp(&self.tile.y))
    }
}

/// Cost of stepping from `from` into the adjacent `to` at the given base cost.
pub(crate) fn step_cost(from: Tile, to: Tile, base: f32) -> f32 {
    if is_diagonal(from, to) {
        base * DIAGONAL_COST
    } else {
        base
    }
}

/// Octile distance scaled by the grid's cheapest cell, never overestimates.
fn heuristic(from: Tile, to: Tile, min_cost: f32) -> f32 {
    let d = (to - from).abs();
    let (lo, hi) = (d.x.min(d.y), d.x.max(d.y));
    #[allow(clippy::cast_precision_loss)]
    let octile = (hi - lo) as f32 + lo as f32 * DIAGONAL_COST;
    octile * min_cost
}

/// Finds the cheapest path from `start` to `goal`.
///
/// Returns the ordered tiles after `start` up to and including `goal`,
/// an empty path when `start == goal`, or `None` when the goal is
/// impassable, unreachable, or the search exceeds its iteration cap.
///
/// # Example
///
/// ```
/// use skirmish_grid::{find_path, Grid, GridCell, Tile};
///
/// // Wall across x = 1 except at the top row.
/// let grid = Grid::new(3, 3, vec![GridCell::wall(1, 0), GridCell::wall(1, 1)]).unwrap();
/// let path = find_path(&grid, Tile::new(0, 0), Tile::new(2, 0)).unwrap();
///
/// assert_eq!(path.last(), Some(&Tile::new(2, 0)));
/// assert!(path.contains(&Tile::new(1, 2)));
/// ```
#[must_use]
pub fn find_path(grid: &Grid, start: Tile, goal: Tile) -> Option<Vec<Tile>> {
    find_path_avoiding(grid, start, goal, &HashSet::new())
}

/// Like [`find_path`], but tiles in `blocked` are impassable unless they are
/// the goal itself. Used to route around other combatants while still
/// targeting an occupied tile.
#[must_use]
pub fn find_path_avoiding(
    grid: &Grid,
    start: Tile,
    goal: Tile,
    blocked: &HashSet<Tile>,
) -> Option<Vec<Tile>> {
    find_path_for(
        grid,
        start,
        goal,
        blocked,
        MoverClass::Standard,
        &TerrainCostTable::empty(),
    )
}

/// Like [`find_path_avoiding`], but each step pays what `table` charges
/// `class` for the cell entered.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use skirmish_grid::{find_path_for, Grid, GridCell, MoverClass, TerrainCostTable, TerrainKind, Tile};
///
/// // A forest band across the middle row, open ground above it.
/// let forest = (1..4)
///     .map(|x| GridCell::open(x, 1).with_terrain(TerrainKind::Forest, 4.0))
///     .collect();
/// let grid = Grid::new(5, 3, forest).unwrap();
/// let table = TerrainCostTable::default();
///
/// let path = find_path_for(
///     &grid, Tile::new(0, 1), Tile::new(4, 1), &HashSet::new(),
///     MoverClass::NatureAttuned, &table,
/// ).unwrap();
/// assert!(path.contains(&Tile::new(2, 1)));
/// ```
#[must_use]
pub fn find_path_for(
    grid: &Grid,
    start: Tile,
    goal: Tile,
    blocked: &HashSet<Tile>,
    class: MoverClass,
    table: &TerrainCostTable,
) -> Option<Vec<Tile>> {
    if !grid.in_bounds(start) || grid.is_obstacle(goal) {
        return None;
    }
    if start == goal {
        return Some(Vec::new());
    }

    let min_cost = table
        .cheapest_override(class)
        .map_or(grid.min_cost(), |c| c.min(grid.min_cost()));
    let mut open = BinaryHeap::new();
    let mut best: HashMap<Tile, f32> = HashMap::new();
    let mut came_from: HashMap<Tile, Tile> = HashMap::new();

    best.insert(start, 0.0);
    open.push(Frontier {
        priority: heuristic(start, goal, min_cost),
        cost: 0.0,
        tile: start,
    });

    let mut iterations = 0;
    while let Some(Frontier { cost, tile, .. }) = open.pop() {
        if tile == goal {
            return Some(reconstruct(&came_from, start, goal));
        }
        if best.get(&tile).is_some_and(|&known| cost > known) {
            continue;
        }

        iterations += 1;
        if iterations > MAX_SEARCH_ITERATIONS {
            debug!(%start, %goal, iterations, "path search exceeded iteration cap");
            return None;
        }

        for offset in NEIGHBOR_OFFSETS {
            let next = tile + offset;
            if !grid.can_step(tile, next) || (next != goal && blocked.contains(&next)) {
                continue;
            }
            let Some(cell) = grid.cell(next) else {
                continue;
            };
            let tentative = cost + step_cost(tile, next, table.cost(cell, class));
            if best.get(&next).map_or(true, |&known| tentative < known) {
                best.insert(next, tentative);
                came_from.insert(next, tile);
                open.push(Frontier {
                    priority: tentative + heuristic(next, goal, min_cost),
                    cost: tentative,
                    tile: next,
                });
            }
        }
    }

    None
}

/// Walks predecessor links back from `goal`, excluding `start`.
pub(crate) fn reconstruct(came_from: &HashMap<Tile, Tile>, start: Tile, goal: Tile) -> Vec<Tile> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
