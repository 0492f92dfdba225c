//! Terrain cost table: per-mover-class overrides of cell movement costs.
//!
//! This is the only place class-specific terrain rules live. Pathfinding
//! asks the table for a cell's effective cost instead of special-casing
//! movers at call sites.

use serde::{Deserialize, Serialize};

use crate::cell::{GridCell, TerrainKind};

/// Movement class of a mover, selecting which overrides apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoverClass {
    /// Pays every cell's listed cost
    #[default]
    Standard,
    /// Moves through forest and grass without penalty
    NatureAttuned,
}

/// A single table row: `class` pays `cost` on `terrain`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostOverride {
    /// Mover class this row applies to
    pub class: MoverClass,
    /// Terrain kind this row applies to
    pub terrain: TerrainKind,
    /// Effective movement cost
    pub cost: f32,
}

/// Table of movement-cost overrides.
///
/// # Example
///
/// ```
/// use skirmish_grid::{GridCell, MoverClass, TerrainCostTable, TerrainKind};
///
/// let table = TerrainCostTable::default();
/// let forest = GridCell::open(0, 0).with_terrain(TerrainKind::Forest, 2.0);
///
/// assert_eq!(table.cost(&forest, MoverClass::Standard), 2.0);
/// assert_eq!(table.cost(&forest, MoverClass::NatureAttuned), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainCostTable {
    overrides: Vec<CostOverride>,
}

impl TerrainCostTable {
    /// An empty table: every mover pays listed costs.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            overrides: Vec::new(),
        }
    }

    /// Adds or replaces an override row.
    #[must_use]
    pub fn with_override(mut self, class: MoverClass, terrain: TerrainKind, cost: f32) -> Self {
        self.overrides
            .retain(|o| !(o.class == class && o.terrain == terrain));
        self.overrides.push(CostOverride {
            class,
            terrain,
            cost,
        });
        self
    }

    /// Effective cost for `class` to enter `cell`.
    #[must_use]
    pub fn cost(&self, cell: &GridCell, class: MoverClass) -> f32 {
        self.overrides
            .iter()
            .find(|o| o.class == class && o.terrain == cell.terrain)
            .map_or(cell.movement_cost, |o| o.cost)
    }

    /// Cheapest override cost that applies to `class`, if it has any rows.
    #[must_use]
    pub fn cheapest_override(&self, class: MoverClass) -> Option<f32> {
        self.overrides
            .iter()
            .filter(|o| o.class == class)
            .map(|o| o.cost)
            .reduce(f32::min)
    }
}

impl Default for TerrainCostTable {
    /// Nature-attuned movers ignore forest and grass penalties.
    fn default() -> Self {
        Self::empty()
            .with_override(MoverClass::NatureAttuned, TerrainKind::Forest, 1.0)
            .with_override(MoverClass::NatureAttuned, TerrainKind::Grass, 1.0)
    }
}
