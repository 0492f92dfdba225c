//! # Skirmish Grid
//!
//! Battlefield substrate for Skirmish: an immutable occupancy grid of terrain
//! cells plus the movement queries the combat engine asks of it.
//!
//! - **Cells**: height, obstacle and sight-blocking flags, movement cost
//! - **Terrain cost table**: the single override point for per-class costs
//! - **A\***: 8-directional shortest path with a bounded search
//! - **Reachability**: Dijkstra expansion under a movement budget
//! - **Line of sight**: Bresenham traversal over sight-blocking cells
//!
//! ## Quick Start
//!
//! ```
//! use skirmish_grid::{find_path, reachable_tiles, Grid, MoverClass, TerrainCostTable, Tile};
//! use std::collections::HashSet;
//!
//! let grid = Grid::flat(8, 8);
//! let path = find_path(&grid, Tile::new(0, 0), Tile::new(3, 0)).unwrap();
//! assert_eq!(path.last(), Some(&Tile::new(3, 0)));
//!
//! let reach = reachable_tiles(
//!     &grid,
//!     Tile::new(0, 0),
//!     2.0,
//!     &HashSet::new(),
//!     MoverClass::Standard,
//!     &TerrainCostTable::default(),
//! );
//! assert!(reach.contains(Tile::new(2, 0)));
//! assert!(!reach.contains(Tile::new(0, 0)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cell;
pub mod error;
pub mod grid;
pub mod path;
pub mod reach;
pub mod sight;
pub mod terrain;

// Re-exports for convenience
pub use cell::{GridCell, TerrainKind};
pub use error::GridError;
pub use grid::Grid;
pub use path::{find_path, find_path_avoiding, find_path_for, MAX_SEARCH_ITERATIONS};
pub use reach::{reachable_tiles, Reachability};
pub use sight::{has_line_of_sight, line_between};
pub use terrain::{MoverClass, TerrainCostTable};

/// Integer grid coordinate. `x` is the cell's x, `y` is the cell's z.
pub type Tile = glam::IVec2;

/// Cost multiplier for a diagonal step.
pub const DIAGONAL_COST: f32 = 1.41;

/// Largest height difference a single step may climb or drop.
pub const MAX_STEP_HEIGHT: f32 = 1.2;

/// The eight neighbour offsets, orthogonals first.
pub const NEIGHBOR_OFFSETS: [Tile; 8] = [
    Tile::new(1, 0),
    Tile::new(-1, 0),
    Tile::new(0, 1),
    Tile::new(0, -1),
    Tile::new(1, 1),
    Tile::new(1, -1),
    Tile::new(-1, 1),
    Tile::new(-1, -1),
];

/// Returns true if the offset between two adjacent tiles is diagonal.
#[must_use]
pub fn is_diagonal(from: Tile, to: Tile) -> bool {
    let d = to - from;
    d.x != 0 && d.y != 0
}

/// Chebyshev (king-move) distance, the grid's notion of "tiles away".
#[must_use]
pub fn chebyshev(a: Tile, b: Tile) -> i32 {
    let d = (a - b).abs();
    d.x.max(d.y)
}

/// Straight-line distance between tile centres.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn euclidean(a: Tile, b: Tile) -> f32 {
    (a - b).as_vec2().length()
}
