//! The battle grid: a bounded, immutable rectangle of cells.

use serde::{Deserialize, Serialize};

use crate::cell::GridCell;
use crate::error::GridError;
use crate::{Tile, MAX_STEP_HEIGHT};

/// Serialized form of a grid. Cells not listed default to open plain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of columns
    pub width: u32,
    /// Number of rows
    pub depth: u32,
    /// Explicit cells
    #[serde(default)]
    pub cells: Vec<GridCell>,
}

/// Immutable battle grid.
///
/// Cells are stored row-major. The grid is validated on construction so that
/// every coordinate inside the bounds has exactly one cell.
///
/// # Example
///
/// ```
/// use skirmish_grid::{Grid, GridCell, Tile};
///
/// let grid = Grid::new(4, 4, vec![GridCell::wall(1, 1)]).unwrap();
/// assert!(grid.is_obstacle(Tile::new(1, 1)));
/// assert!(!grid.is_obstacle(Tile::new(0, 0)));
/// assert!(grid.is_obstacle(Tile::new(9, 9))); // out of bounds
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridSpec", into = "GridSpec")]
pub struct Grid {
    width: u32,
    depth: u32,
    cells: Vec<GridCell>,
    /// Cheapest movement cost on the grid, scales the A* heuristic.
    min_cost: f32,
}

impl Grid {
    /// Builds a grid from explicit cells; unlisted coordinates become open plain.
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] if the dimensions are zero or too large, a
    /// cell is out of bounds or duplicated, or a movement cost is negative or non-finite.
    pub fn new(width: u32, depth: u32, cells: Vec<GridCell>) -> Result<Self, GridError> {
        if width == 0 || depth == 0 {
            return Err(GridError::EmptyDimensions { width, depth });
        }

        let area = width
            .checked_mul(depth)
            .filter(|_| i32::try_from(width.max(depth)).is_ok())
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(GridError::TooLarge { width, depth })?;

        let mut slots: Vec<Option<GridCell>> = vec![None; area];
        for cell in cells {
            let tile = cell.tile();
            let index = index_of(width, depth, tile).ok_or(GridError::OutOfBounds {
                tile,
                width,
                depth,
            })?;
            if !cell.movement_cost.is_finite() || cell.movement_cost < 0.0 {
                return Err(GridError::InvalidCost {
                    tile,
                    cost: cell.movement_cost,
                });
            }
            if slots[index].replace(cell).is_some() {
                return Err(GridError::DuplicateCell(tile));
            }
        }

        #[allow(clippy::cast_possible_wrap)]
        let cells: Vec<GridCell> = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.unwrap_or_else(|| {
                    let x = (i as u32 % width) as i32;
                    let z = (i as u32 / width) as i32;
                    GridCell::open(x, z)
                })
            })
            .collect();

        let min_cost = cells
            .iter()
            .filter(|c| !c.is_obstacle)
            .map(|c| c.movement_cost)
            .fold(f32::INFINITY, f32::min);

        Ok(Self {
            width,
            depth,
            cells,
            min_cost: if min_cost.is_finite() { min_cost } else { 1.0 },
        })
    }

    /// An open, flat grid of plain cells.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn flat(width: u32, depth: u32) -> Self {
        let (width, depth) = (width.max(1), depth.max(1));
        let cells = (0..depth)
            .flat_map(|z| (0..width).map(move |x| GridCell::open(x as i32, z as i32)))
            .collect();
        Self {
            width,
            depth,
            cells,
            min_cost: 1.0,
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Cheapest passable movement cost on the grid.
    #[must_use]
    pub const fn min_cost(&self) -> f32 {
        self.min_cost
    }

    /// Returns true if the tile lies inside the grid.
    #[must_use]
    pub fn in_bounds(&self, tile: Tile) -> bool {
        index_of(self.width, self.depth, tile).is_some()
    }

    /// Returns the cell at a tile, if in bounds.
    #[must_use]
    pub fn cell(&self, tile: Tile) -> Option<&GridCell> {
        index_of(self.width, self.depth, tile).map(|i| &self.cells[i])
    }

    /// Returns true for obstacle cells and for anything off the grid.
    #[must_use]
    pub fn is_obstacle(&self, tile: Tile) -> bool {
        self.cell(tile).map_or(true, |c| c.is_obstacle)
    }

    /// Returns true if a single step between two tiles is legal terrain-wise:
    /// both in bounds, destination not an obstacle, and the height difference
    /// within [`MAX_STEP_HEIGHT`].
    #[must_use]
    pub fn can_step(&self, from: Tile, to: Tile) -> bool {
        let (Some(src), Some(dst)) = (self.cell(from), self.cell(to)) else {
            return false;
        };
        !dst.is_obstacle && (dst.height - src.height).abs() <= MAX_STEP_HEIGHT
    }

    /// Iterates over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> + '_ {
        self.cells.iter()
    }
}

impl TryFrom<GridSpec> for Grid {
    type Error = GridError;

    fn try_from(spec: GridSpec) -> Result<Self, Self::Error> {
        Self::new(spec.width, spec.depth, spec.cells)
    }
}

impl From<Grid> for GridSpec {
    fn from(grid: Grid) -> Self {
        Self {
            width: grid.width,
            depth: grid.depth,
            cells: grid.cells,
        }
    }
}

#[allow(clippy::cast_sign_loss)]
fn index_of(width: u32, depth: u32, tile: Tile) -> Option<usize> {
    if tile.x < 0 || tile.y < 0 {
        return None;
    }
    let (x, z) = (tile.x as u32, tile.y as u32);
    (x < width && z < depth).then(|| (z * width + x) as usize)
}
