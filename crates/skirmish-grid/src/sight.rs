//! Line of sight over sight-blocking cells.

use crate::grid::Grid;
use crate::Tile;

/// Bresenham line from `from` to `to`, both endpoints included.
#[must_use]
pub fn line_between(from: Tile, to: Tile) -> Vec<Tile> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };

    let mut err = dx + dy;
    let mut current = from;
    let mut points = vec![current];

    while current != to {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            current.x += sx;
        }
        if e2 <= dx {
            err += dx;
            current.y += sy;
        }
        points.push(current);
    }
    points
}

/// Returns true if no cell strictly between `from` and `to` blocks sight.
///
/// The endpoints themselves never block: a caster standing in smoke can
/// still target out of it, and a target behind nothing is visible.
///
/// # Example
///
/// ```
/// use skirmish_grid::{has_line_of_sight, Grid, GridCell, Tile};
///
/// let grid = Grid::new(5, 1, vec![GridCell::wall(2, 0)]).unwrap();
/// assert!(!has_line_of_sight(&grid, Tile::new(0, 0), Tile::new(4, 0)));
/// assert!(has_line_of_sight(&grid, Tile::new(0, 0), Tile::new(1, 0)));
/// ```
#[must_use]
pub fn has_line_of_sight(grid: &Grid, from: Tile, to: Tile) -> bool {
    let line = line_between(from, to);
    line.iter()
        .skip(1)
        .take(line.len().saturating_sub(2))
        .all(|&tile| grid.cell(tile).map_or(false, |c| !c.blocks_sight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::GridCell;

    #[test]
    fn line_includes_endpoints() {
        let line = line_between(Tile::new(0, 0), Tile::new(3, 0));
        assert_eq!(line.first(), Some(&Tile::new(0, 0)));
        assert_eq!(line.last(), Some(&Tile::new(3, 0)));
        assert_eq!(line.len(), 4);
    }

    #[test]
    fn diagonal_line() {
        let line = line_between(Tile::new(0, 0), Tile::new(3, 3));
        assert_eq!(
            line,
            vec![Tile::new(0, 0), Tile::new(1, 1), Tile::new(2, 2), Tile::new(3, 3)]
        );
    }

    #[test]
    fn single_point_line() {
        assert_eq!(line_between(Tile::new(2, 2), Tile::new(2, 2)), vec![Tile::new(2, 2)]);
    }

    #[test]
    fn reverse_direction_reaches_target() {
        let line = line_between(Tile::new(4, 3), Tile::new(0, 1));
        assert_eq!(line.last(), Some(&Tile::new(0, 1)));
    }

    #[test]
    fn sight_blocker_without_obstacle_blocks() {
        let mut smoke = GridCell::open(1, 1);
        smoke.blocks_sight = true;
        let grid = Grid::new(3, 3, vec![smoke]).unwrap();
        assert!(!has_line_of_sight(&grid, Tile::new(0, 0), Tile::new(2, 2)));
        assert!(has_line_of_sight(&grid, Tile::new(0, 0), Tile::new(2, 0)));
    }

    #[test]
    fn blocked_endpoints_do_not_block() {
        let grid = Grid::new(2, 1, vec![GridCell::wall(1, 0)]).unwrap();
        assert!(has_line_of_sight(&grid, Tile::new(0, 0), Tile::new(1, 0)));
    }
}
