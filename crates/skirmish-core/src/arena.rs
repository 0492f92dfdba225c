//! The arena: every combatant in one battle, keyed by [`EntityId`].
//!
//! Storage is a `BTreeMap` so iteration order is the id order, which keeps
//! AI target selection and reward tallies deterministic. Alongside it the
//! arena keeps an occupancy index from tile to living occupant.
//!
//! # Whole-record replacement
//!
//! The arena never hands out `&mut Entity`. Callers clone, mutate the copy
//! and write it back with [`Arena::replace`], which also re-indexes the
//! occupancy. Readers never see a half-applied update.
//!
//! # Example
//!
//! ```
//! use skirmish_core::arena::Arena;
//! use skirmish_core::entity::{EntityDef, Side};
//! use skirmish_core::Tile;
//!
//! let mut arena = Arena::new();
//! let hero = arena.spawn(EntityDef::new("Hero", Side::Player, Tile::new(0, 0)));
//!
//! let mut moved = arena.get(hero).unwrap().clone();
//! moved.set_position(Tile::new(3, 1));
//! arena.replace(moved);
//!
//! assert_eq!(arena.occupant_at(Tile::new(3, 1)), Some(hero));
//! assert_eq!(arena.occupant_at(Tile::new(0, 0)), None);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use skirmish_grid::Tile;

use crate::entity::{Entity, EntityDef, EntityId, Side};

/// Container for all combatants in a battle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing id counter.
    next_id: u64,
    /// Entity storage in id order.
    entities: BTreeMap<EntityId, Entity>,
    /// Living occupant of each tile.
    #[serde(skip)]
    occupancy: HashMap<Tile, EntityId>,
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a combatant built from `def`, returning its new id.
    pub fn spawn(&mut self, def: EntityDef) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let entity = Entity::from_def(id, def);
        if entity.is_alive() {
            self.occupancy.insert(entity.position(), id);
        }
        self.entities.insert(id, entity);
        id
    }

    /// Returns the entity with `id`.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Writes back a full entity record, replacing the stored one.
    ///
    /// Records for ids the arena never spawned are ignored and returned.
    pub fn replace(&mut self, entity: Entity) -> Option<Entity> {
        let id = entity.id();
        let Some(old) = self.entities.get(&id) else {
            return Some(entity);
        };
        if self.occupancy.get(&old.position()) == Some(&id) {
            self.occupancy.remove(&old.position());
        }
        if entity.is_alive() {
            self.occupancy.insert(entity.position(), id);
        }
        self.entities.insert(id, entity);
        None
    }

    /// Iterates all entities, dead or alive, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Iterates all ids in order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Iterates living entities in id order.
    pub fn living(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values().filter(|e| e.is_alive())
    }

    /// Iterates living entities on `side` in id order.
    pub fn living_on(&self, side: Side) -> impl Iterator<Item = &Entity> + '_ {
        self.living().filter(move |e| e.side() == side)
    }

    /// Returns true if any entity on `side` is still alive.
    #[must_use]
    pub fn any_alive(&self, side: Side) -> bool {
        self.living_on(side).next().is_some()
    }

    /// Returns true if the entity exists and is alive.
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(Entity::is_alive)
    }

    /// The living entity standing on `tile`.
    #[must_use]
    pub fn occupant_at(&self, tile: Tile) -> Option<EntityId> {
        self.occupancy.get(&tile).copied()
    }

    /// Tiles held by living entities other than `except`.
    #[must_use]
    pub fn occupied_tiles_except(&self, except: EntityId) -> HashSet<Tile> {
        self.occupancy
            .iter()
            .filter(|&(_, &id)| id != except)
            .map(|(&tile, _)| tile)
            .collect()
    }

    /// Number of entities, dead ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Rebuilds the occupancy index from the stored entities.
    ///
    /// Needed after deserializing, since the index is not persisted.
    pub fn reindex(&mut self) {
        self.occupancy = self
            .entities
            .values()
            .filter(|e| e.is_alive())
            .map(|e| (e.position(), e.id()))
            .collect();
    }
}
