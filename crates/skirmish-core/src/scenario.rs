//! Battle packages: everything needed to start a battle, in one JSON file.
//!
//! ```json
//! {
//!   "terrain": { "grid": { "width": 8, "depth": 8 } },
//!   "entities": [
//!     { "name": "Hero", "side": "PLAYER", "position": [0, 0] },
//!     { "name": "Rat", "side": "ENEMY", "position": [5, 5], "behavior": "melee" }
//!   ],
//!   "forcedEncounter": null,
//!   "config": { "seed": 7 }
//! }
//! ```
//!
//! A package may carry its own catalog. It is merged over the standard one,
//! so a package only lists what it adds or changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BattleConfig;
use crate::content::Catalog;
use crate::entity::EntityDef;
use crate::error::SetupError;
use crate::session::{BattleSession, TerrainContext};

/// A serialized battle setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattlePackage {
    /// Battlefield
    pub terrain: TerrainContext,
    /// Party and enemy definitions
    pub entities: Vec<EntityDef>,
    /// Scripted roster that replaces the enemies
    #[serde(default)]
    pub forced_encounter: Option<String>,
    /// Settings
    #[serde(default)]
    pub config: BattleConfig,
    /// Extra or overriding actions and encounters
    #[serde(default)]
    pub catalog: Option<Catalog>,
}

impl BattlePackage {
    /// Parses a package from JSON.
    ///
    /// # Errors
    ///
    /// [`SetupError::Json`] if the text is not a valid package, including an
    /// invalid grid.
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a package file.
    ///
    /// # Errors
    ///
    /// [`SetupError::Io`] if the file cannot be read, or
    /// [`SetupError::Json`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading battle package");
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// The standard catalog with this package's catalog merged over it.
    #[must_use]
    pub fn effective_catalog(&self) -> Catalog {
        let mut catalog = Catalog::standard();
        if let Some(extra) = &self.catalog {
            catalog.merge(extra.clone());
        }
        catalog
    }

    /// Starts the battle this package describes.
    ///
    /// # Errors
    ///
    /// Any [`SetupError`] from [`BattleSession::start_battle`].
    pub fn start(self) -> Result<BattleSession, SetupError> {
        let catalog = self.effective_catalog();
        BattleSession::start_battle(
            self.entities,
            self.terrain,
            self.forced_encounter.as_deref(),
            catalog,
            self.config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ActionId;
    use crate::entity::Side;
    use crate::Tile;

    const MINIMAL: &str = r#"{
        "terrain": { "grid": { "width": 8, "depth": 8 } },
        "entities": [
            { "name": "Hero", "side": "PLAYER", "position": [0, 0] },
            { "name": "Rat", "side": "ENEMY", "position": [5, 5], "behavior": "melee" }
        ]
    }"#;

    #[test]
    fn minimal_package_parses() {
        let package = BattlePackage::from_json(MINIMAL).unwrap();
        assert_eq!(package.entities.len(), 2);
        assert_eq!(package.entities[1].position, Tile::new(5, 5));
        assert_eq!(package.entities[1].side, Side::Enemy);
        assert_eq!(package.config, BattleConfig::default());
        assert!(package.forced_encounter.is_none());
    }

    #[test]
    fn package_catalog_merges_over_standard() {
        let json = r#"{
            "terrain": { "grid": { "width": 4, "depth": 4 } },
            "entities": [],
            "catalog": {
                "actions": {
                    "ember": { "name": "Ember", "category": "spell", "effect": "damage", "dice": "1d4", "range": 3 }
                }
            }
        }"#;
        let catalog = BattlePackage::from_json(json).unwrap().effective_catalog();
        assert!(catalog.action(&ActionId::new("ember")).is_some());
        assert!(catalog.action(&ActionId::new("fireball")).is_some());
    }

    #[test]
    fn invalid_grid_is_a_json_error() {
        let json = r#"{ "terrain": { "grid": { "width": 0, "depth": 4 } }, "entities": [] }"#;
        assert!(matches!(BattlePackage::from_json(json), Err(SetupError::Json(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            BattlePackage::load("/nonexistent/battle.json"),
            Err(SetupError::Io(_))
        ));
    }

    #[test]
    fn package_starts_a_battle() {
        let mut package = BattlePackage::from_json(MINIMAL).unwrap();
        package.config.seed = Some(11);
        let session = package.start().unwrap();
        assert_eq!(session.turn_order().len(), 2);
    }

    #[test]
    fn bundled_crypt_demo_loads() {
        let package = BattlePackage::from_json(include_str!("../../../demos/crypt.json")).unwrap();
        assert_eq!(package.forced_encounter.as_deref(), Some("crypt_king"));
        let session = package.start().unwrap();
        let enemies = session.arena().iter().filter(|e| e.side() == Side::Enemy).count();
        assert_eq!(enemies, 3);
        assert!(session.grid().is_obstacle(Tile::new(5, 4)));
    }
}
