//! Grid cells: the per-tile contract consumed from terrain generation.
//!
//! Cells never change during a battle. The serialized form matches the
//! terrain collaborator's contract: `{x, z, height, isObstacle, blocksSight,
//! movementCost}` plus an optional terrain kind used by the cost table.

use serde::{Deserialize, Serialize};

use crate::Tile;

/// Terrain classification of a cell.
///
/// Only consulted by [`TerrainCostTable`](crate::TerrainCostTable) overrides;
/// the cell's own `movement_cost` is authoritative otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    /// Open ground
    #[default]
    Plain,
    /// Tall grass
    Grass,
    /// Woodland
    Forest,
    /// Shallow water
    Water,
    /// Sand or loose soil
    Sand,
    /// Rock or rubble
    Rock,
    /// Paved road
    Road,
}

/// A single terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    /// Column
    pub x: i32,
    /// Row
    pub z: i32,
    /// Terrain height in world units
    pub height: f32,
    /// Impassable cell
    pub is_obstacle: bool,
    /// Cell blocks line of sight
    pub blocks_sight: bool,
    /// Movement-cost multiplier for entering this cell
    pub movement_cost: f32,
    /// Terrain kind, for class-specific cost overrides
    #[serde(default)]
    pub terrain: TerrainKind,
}

impl GridCell {
    /// Creates an open, flat plain cell.
    #[must_use]
    pub fn open(x: i32, z: i32) -> Self {
        Self {
            x,
            z,
            height: 0.0,
            is_obstacle: false,
            blocks_sight: false,
            movement_cost: 1.0,
            terrain: TerrainKind::Plain,
        }
    }

    /// Creates an obstacle that also blocks sight (a wall or boulder).
    #[must_use]
    pub fn wall(x: i32, z: i32) -> Self {
        Self {
            is_obstacle: true,
            blocks_sight: true,
            terrain: TerrainKind::Rock,
            ..Self::open(x, z)
        }
    }

    /// Returns a copy with the given terrain and movement cost.
    #[must_use]
    pub fn with_terrain(mut self, terrain: TerrainKind, movement_cost: f32) -> Self {
        self.terrain = terrain;
        self.movement_cost = movement_cost;
        self
    }

    /// Returns a copy raised to the given height.
    #[must_use]
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// The cell's coordinate.
    #[must_use]
    pub fn tile(&self) -> Tile {
        Tile::new(self.x, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_is_obstacle_and_blocks_sight() {
        let cell = GridCell::wall(2, 3);
        assert!(cell.is_obstacle);
        assert!(cell.blocks_sight);
        assert_eq!(cell.tile(), Tile::new(2, 3));
    }

    #[test]
    fn contract_field_names() {
        let json = r#"{"x":1,"z":2,"height":0.5,"isObstacle":false,"blocksSight":true,"movementCost":2.0}"#;
        let cell: GridCell = serde_json::from_str(json).unwrap();
        assert_eq!(cell.tile(), Tile::new(1, 2));
        assert!(cell.blocks_sight);
        assert_eq!(cell.terrain, TerrainKind::Plain);
        assert!((cell.movement_cost - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn terrain_kind_snake_case() {
        let kind: TerrainKind = serde_json::from_str("\"forest\"").unwrap();
        assert_eq!(kind, TerrainKind::Forest);
    }
}
