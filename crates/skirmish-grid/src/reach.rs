//! Movement-budget reachability (uniform-cost / Dijkstra expansion).

use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::grid::Grid;
use crate::path::{reconstruct, step_cost, Frontier};
use crate::terrain::{MoverClass, TerrainCostTable};
use crate::{Tile, NEIGHBOR_OFFSETS};

/// Result of a reachability query.
///
/// Holds the cheapest known cost and predecessor for every tile reachable
/// within the budget. The start tile is never part of the reachable set.
#[derive(Debug, Clone)]
pub struct Reachability {
    start: Tile,
    costs: HashMap<Tile, f32>,
    came_from: HashMap<Tile, Tile>,
}

impl Reachability {
    /// The tile the expansion started from.
    #[must_use]
    pub const fn start(&self) -> Tile {
        self.start
    }

    /// Returns true if `tile` can be reached within the budget.
    #[must_use]
    pub fn contains(&self, tile: Tile) -> bool {
        self.costs.contains_key(&tile)
    }

    /// Cheapest cost to reach `tile`, if reachable.
    #[must_use]
    pub fn cost_to(&self, tile: Tile) -> Option<f32> {
        self.costs.get(&tile).copied()
    }

    /// Reachable tiles, sorted row-major.
    #[must_use]
    pub fn tiles(&self) -> Vec<Tile> {
        let mut tiles: Vec<Tile> = self.costs.keys().copied().collect();
        tiles.sort_by_key(|t| (t.y, t.x));
        tiles
    }

    /// Number of reachable tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// Returns true if nothing is reachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// The cheapest path from the start to `tile`, excluding the start.
    #[must_use]
    pub fn path_to(&self, tile: Tile) -> Option<Vec<Tile>> {
        self.contains(tile)
            .then(|| reconstruct(&self.came_from, self.start, tile))
    }
}

/// Expands outward from `start`, collecting every tile whose cumulative
/// cost stays within `budget`.
///
/// A step costs the destination's effective cost (from `table` for `class`),
/// times the diagonal multiplier for diagonal steps. Obstacles, illegal
/// height steps, and `occupied` tiles are neither included nor expanded
/// through.
#[must_use]
pub fn reachable_tiles(
    grid: &Grid,
    start: Tile,
    budget: f32,
    occupied: &HashSet<Tile>,
    class: MoverClass,
    table: &TerrainCostTable,
) -> Reachability {
    let mut best: HashMap<Tile, f32> = HashMap::new();
    let mut came_from: HashMap<Tile, Tile> = HashMap::new();
    let mut open = BinaryHeap::new();

    best.insert(start, 0.0);
    open.push(Frontier {
        priority: 0.0,
        cost: 0.0,
        tile: start,
    });

    while let Some(Frontier { cost, tile, .. }) = open.pop() {
        if best.get(&tile).is_some_and(|&known| cost > known) {
            continue;
        }
        for offset in NEIGHBOR_OFFSETS {
            let next = tile + offset;
            if next == start || occupied.contains(&next) || !grid.can_step(tile, next) {
                continue;
            }
            let Some(cell) = grid.cell(next) else {
                continue;
            };
            let total = cost + step_cost(tile, next, table.cost(cell, class));
            if total > budget {
                continue;
            }
            if best.get(&next).map_or(true, |&known| total < known) {
                best.insert(next, total);
                came_from.insert(next, tile);
                open.push(Frontier {
                    priority: total,
                    cost: total,
                    tile: next,
                });
            }
        }
    }

    best.remove(&start);
    Reachability {
        start,
        costs: best,
        came_from,
    }
}
