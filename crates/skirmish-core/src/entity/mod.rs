//! Combatants.
//!
//! - [`EntityId`]: stable handle into the [`Arena`](crate::arena::Arena)
//! - [`Side`]: player party or enemy roster
//! - [`Behavior`]: AI strategy tag for non-player entities
//! - [`Entity`]: the full combatant record
//! - [`EntityDef`]: the definition handed over by the character and enemy
//!   pipelines, turned into an [`Entity`] when the battle starts
//!
//! # Example
//!
//! ```
//! use skirmish_core::entity::{Entity, EntityDef, EntityId, Side};
//! use skirmish_core::Tile;
//!
//! let def = EntityDef::new("Aria", Side::Player, Tile::new(1, 2));
//! let aria = Entity::from_def(EntityId::new(0), def);
//!
//! assert_eq!(aria.name(), "Aria");
//! assert!(aria.is_alive());
//! ```

pub mod components;

use std::fmt;

use serde::{Deserialize, Serialize};
use skirmish_grid::Tile;

pub use components::{
    Ability, AbilityScores, ArmorWeight, Bounty, CombatStats, CreatureType, DamageKind,
    DamageKinds, Equipment, RaceTrait, Status, Weapon,
};

/// Unique identifier for a combatant within one battle.
///
/// Ordered by numeric value so arena iteration is deterministic.
///
/// # Example
///
/// ```
/// use skirmish_core::entity::EntityId;
///
/// let a = EntityId::new(1);
/// let b = EntityId::new(2);
/// assert!(a < b);
/// assert_eq!(b.as_u64(), 2);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an `EntityId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Which side of the battle an entity fights for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    /// The party
    Player,
    /// The monsters
    Enemy,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Enemy => write!(f, "enemy"),
        }
    }
}

/// AI strategy selector.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// Close in and hit the nearest foe
    Melee,
    /// Hold at weapon range and shoot
    Ranged,
    /// Keep allies alive, otherwise cast
    Healer,
    /// Blast the nearest foe with spells
    Spellcaster,
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Melee => write!(f, "melee"),
            Self::Ranged => write!(f, "ranged"),
            Self::Healer => write!(f, "healer"),
            Self::Spellcaster => write!(f, "spellcaster"),
        }
    }
}

/// Definition of a combatant as supplied by the party or enemy roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDef {
    /// Display name
    pub name: String,
    /// Side
    pub side: Side,
    /// Starting tile as `[x, z]`
    pub position: Tile,
    /// AI behavior (enemies, or autopiloted players)
    #[serde(default)]
    pub behavior: Option<Behavior>,
    /// Combat stats
    #[serde(default)]
    pub stats: CombatStats,
    /// Equipment
    #[serde(default)]
    pub equipment: Equipment,
    /// Reward for defeating this entity
    #[serde(default)]
    pub bounty: Bounty,
}

impl EntityDef {
    /// A definition with default stats and equipment.
    #[must_use]
    pub fn new(name: impl Into<String>, side: Side, position: Tile) -> Self {
        Self {
            name: name.into(),
            side,
            position,
            behavior: None,
            stats: CombatStats::default(),
            equipment: Equipment::default(),
            bounty: Bounty::default(),
        }
    }

    /// Sets the AI behavior.
    #[must_use]
    pub const fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Replaces the stats.
    #[must_use]
    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.stats = stats;
        self
    }

    /// Replaces the equipment.
    #[must_use]
    pub fn with_equipment(mut self, equipment: Equipment) -> Self {
        self.equipment = equipment;
        self
    }

    /// Replaces the bounty.
    #[must_use]
    pub fn with_bounty(mut self, bounty: Bounty) -> Self {
        self.bounty = bounty;
        self
    }
}

/// A combatant.
///
/// Entities are replaced whole in the arena after every resolved action;
/// resolution code works on clones and hands back the updated record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    name: String,
    side: Side,
    position: Tile,
    behavior: Option<Behavior>,
    stats: CombatStats,
    equipment: Equipment,
    bounty: Bounty,
}

impl Entity {
    /// Builds an entity from its definition.
    ///
    /// Stats are clamped to their invariants and the corruption max-hp
    /// penalty is applied.
    #[must_use]
    pub fn from_def(id: EntityId, def: EntityDef) -> Self {
        let mut stats = def.stats;
        stats.apply_corruption_penalty();
        Self {
            id,
            name: def.name,
            side: def.side,
            position: def.position,
            behavior: def.behavior,
            stats,
            equipment: def.equipment,
            bounty: def.bounty,
        }
    }

    /// Unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Side.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Current tile.
    #[must_use]
    pub const fn position(&self) -> Tile {
        self.position
    }

    /// Moves the entity. Occupancy is the arena's concern.
    pub fn set_position(&mut self, tile: Tile) {
        self.position = tile;
    }

    /// AI behavior tag.
    #[must_use]
    pub const fn behavior(&self) -> Option<Behavior> {
        self.behavior
    }

    /// Combat stats.
    #[must_use]
    pub const fn stats(&self) -> &CombatStats {
        &self.stats
    }

    /// Mutable combat stats.
    pub fn stats_mut(&mut self) -> &mut CombatStats {
        &mut self.stats
    }

    /// Equipment.
    #[must_use]
    pub const fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    /// Reward for defeating this entity.
    #[must_use]
    pub const fn bounty(&self) -> &Bounty {
        &self.bounty
    }

    /// Returns true while hp is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    /// Returns true if `other` fights for the opposing side.
    #[must_use]
    pub fn is_hostile_to(&self, other: &Self) -> bool {
        self.side != other.side
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.name, self.id)
    }
}
