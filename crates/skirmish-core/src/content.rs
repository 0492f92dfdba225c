//! Action and encounter definitions.
//!
//! Spells and skills are data, not code: each [`ActionDef`] names the
//! [`EffectKind`] it resolves through, and the effect module dispatches on
//! that kind alone. Adding a spell means adding a definition to a
//! [`Catalog`]; the action pipeline does not change.
//!
//! # Example
//!
//! ```
//! use skirmish_core::content::{ActionId, Catalog, EffectKind};
//!
//! let catalog = Catalog::standard();
//! let fireball = catalog.action(&ActionId::new("fireball")).unwrap();
//! assert_eq!(fireball.effect, EffectKind::Damage);
//! assert!(fireball.area.is_some());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_grid::Tile;

use crate::dice::Dice;
use crate::entity::{
    Ability, Behavior, Bounty, CombatStats, CreatureType, DamageKind, DamageKinds, EntityDef,
    Equipment, Side, Status, Weapon,
};
use crate::error::{ActionError, SetupError};
use crate::resolver::AreaShape;

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier of a spell or skill.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    /// Creates an id from a string.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// Action definitions
// =============================================================================

/// How an action's outcome is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Attack roll (unless area), damage, resistance pipeline
    Damage,
    /// Restore hp on a target
    Heal,
    /// Restore hp on the caster, plus caster level
    HealSelf,
    /// Apply a timed status
    ApplyEffect,
}

/// Whether an action draws on spell slots or stamina.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    /// Cast from the spell list
    Spell,
    /// Used from the skill list
    Skill,
}

/// Footprint of an area action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSpec {
    /// Shape
    pub shape: AreaShape,
    /// Radius (or length, for lines) in tiles
    pub radius: u32,
}

/// A spell or skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDef {
    /// Display name
    pub name: String,
    /// Spell or skill
    pub category: ActionCategory,
    /// Resolution strategy
    pub effect: EffectKind,
    /// Damage or healing dice
    #[serde(default)]
    pub dice: Option<Dice>,
    /// Damage kind for damage effects
    #[serde(default = "default_damage_kind")]
    pub damage_kind: DamageKind,
    /// Reach in tiles (0 = self only)
    #[serde(default)]
    pub range: u32,
    /// Area footprint, if any
    #[serde(default)]
    pub area: Option<AreaSpec>,
    /// Spell slots spent
    #[serde(default)]
    pub slot_cost: u32,
    /// Stamina spent
    #[serde(default)]
    pub stamina_cost: u32,
    /// Turns before reuse
    #[serde(default)]
    pub cooldown: u32,
    /// Status applied by `apply_effect`
    #[serde(default)]
    pub status: Option<Status>,
    /// Casting ability for spell attacks
    #[serde(default = "default_ability")]
    pub ability: Ability,
}

const fn default_damage_kind() -> DamageKind {
    DamageKind::Force
}

const fn default_ability() -> Ability {
    Ability::Intelligence
}

impl ActionDef {
    fn new(name: &str, category: ActionCategory, effect: EffectKind) -> Self {
        Self {
            name: name.to_string(),
            category,
            effect,
            dice: None,
            damage_kind: DamageKind::Force,
            range: 0,
            area: None,
            slot_cost: 0,
            stamina_cost: 0,
            cooldown: 0,
            status: None,
            ability: Ability::Intelligence,
        }
    }

    /// Returns true if the action is aimed at foes: damage, or a harmful
    /// status.
    #[must_use]
    pub const fn is_offensive(&self) -> bool {
        match self.effect {
            EffectKind::Damage => true,
            EffectKind::ApplyEffect => matches!(self.status, Some(s) if s.is_harmful()),
            EffectKind::Heal | EffectKind::HealSelf => false,
        }
    }

    /// Returns true if the action only ever affects its user.
    #[must_use]
    pub const fn is_self_only(&self) -> bool {
        matches!(self.effect, EffectKind::HealSelf) || self.range == 0
    }

    /// Checks that `stats` can pay for this action right now.
    ///
    /// # Errors
    ///
    /// [`ActionError::OnCooldown`], [`ActionError::NoSpellSlots`] or
    /// [`ActionError::NoStamina`], checked in that order.
    pub fn check_affordable(&self, id: &ActionId, stats: &CombatStats) -> Result<(), ActionError> {
        let turns = stats.cooldown(id);
        if turns > 0 {
            return Err(ActionError::OnCooldown {
                action: id.clone(),
                turns,
            });
        }
        if stats.spell_slots < self.slot_cost {
            return Err(ActionError::NoSpellSlots {
                needed: self.slot_cost,
                available: stats.spell_slots,
            });
        }
        if stats.stamina < self.stamina_cost {
            return Err(ActionError::NoStamina {
                needed: self.stamina_cost,
                available: stats.stamina,
            });
        }
        Ok(())
    }

    /// Spends the action's costs and starts its cooldown.
    ///
    /// Call only after [`check_affordable`](Self::check_affordable) passed.
    pub fn pay(&self, id: &ActionId, stats: &mut CombatStats) {
        stats.spell_slots = stats.spell_slots.saturating_sub(self.slot_cost);
        stats.stamina = stats.stamina.saturating_sub(self.stamina_cost);
        if self.cooldown > 0 {
            stats.cooldowns.insert(id.clone(), self.cooldown);
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// All spells, skills and scripted encounters available to a battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Spells and skills by id
    pub actions: BTreeMap<ActionId, ActionDef>,
    /// Scripted enemy rosters by encounter id
    pub encounters: BTreeMap<String, Vec<EntityDef>>,
}

impl Catalog {
    /// Looks up an action.
    #[must_use]
    pub fn action(&self, id: &ActionId) -> Option<&ActionDef> {
        self.actions.get(id)
    }

    /// Looks up a scripted encounter roster.
    #[must_use]
    pub fn encounter(&self, id: &str) -> Option<&[EntityDef]> {
        self.encounters.get(id).map(Vec::as_slice)
    }

    /// Parses a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Json`] if the text is not a valid catalog.
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Io`] if the file cannot be read, or
    /// [`SetupError::Json`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Adds every action and encounter from `other`, replacing duplicates.
    pub fn merge(&mut self, other: Self) {
        self.actions.extend(other.actions);
        self.encounters.extend(other.encounters);
    }

    /// The built-in catalog.
    #[must_use]
    pub fn standard() -> Self {
        let mut actions = BTreeMap::new();
        for (id, def) in standard_spells().into_iter().chain(standard_skills()) {
            actions.insert(ActionId::new(id), def);
        }
        Self {
            actions,
            encounters: standard_encounters(),
        }
    }
}

fn spell(name: &str, effect: EffectKind) -> ActionDef {
    ActionDef::new(name, ActionCategory::Spell, effect)
}

fn skill(name: &str, effect: EffectKind) -> ActionDef {
    ActionDef::new(name, ActionCategory::Skill, effect)
}

fn standard_spells() -> Vec<(&'static str, ActionDef)> {
    use EffectKind::{ApplyEffect, Damage, Heal};

    vec![
        (
            "fire_bolt",
            ActionDef {
                dice: Some(Dice::new(1, 10)),
                damage_kind: DamageKind::Fire,
                range: 6,
                ..spell("Fire Bolt", Damage)
            },
        ),
        (
            "sacred_flame",
            ActionDef {
                dice: Some(Dice::new(1, 8)),
                damage_kind: DamageKind::Radiant,
                range: 6,
                ability: Ability::Wisdom,
                ..spell("Sacred Flame", Damage)
            },
        ),
        (
            "poison_spray",
            ActionDef {
                dice: Some(Dice::new(1, 12)),
                damage_kind: DamageKind::Poison,
                range: 2,
                ..spell("Poison Spray", Damage)
            },
        ),
        (
            "fireball",
            ActionDef {
                dice: Some(Dice::new(8, 6)),
                damage_kind: DamageKind::Fire,
                range: 8,
                area: Some(AreaSpec {
                    shape: AreaShape::Circle,
                    radius: 2,
                }),
                slot_cost: 1,
                cooldown: 2,
                ..spell("Fireball", Damage)
            },
        ),
        (
            "burning_hands",
            ActionDef {
                dice: Some(Dice::new(3, 6)),
                damage_kind: DamageKind::Fire,
                range: 3,
                area: Some(AreaSpec {
                    shape: AreaShape::Cone,
                    radius: 3,
                }),
                slot_cost: 1,
                ..spell("Burning Hands", Damage)
            },
        ),
        (
            "lightning_bolt",
            ActionDef {
                dice: Some(Dice::new(8, 6)),
                damage_kind: DamageKind::Lightning,
                range: 6,
                area: Some(AreaSpec {
                    shape: AreaShape::Line,
                    radius: 6,
                }),
                slot_cost: 1,
                cooldown: 2,
                ..spell("Lightning Bolt", Damage)
            },
        ),
        (
            "cure_wounds",
            ActionDef {
                dice: Some(Dice::new(1, 8)),
                range: 1,
                slot_cost: 1,
                ability: Ability::Wisdom,
                ..spell("Cure Wounds", Heal)
            },
        ),
        (
            "healing_word",
            ActionDef {
                dice: Some(Dice::new(1, 4)),
                range: 6,
                slot_cost: 1,
                ability: Ability::Wisdom,
                ..spell("Healing Word", Heal)
            },
        ),
        (
            "shield",
            ActionDef {
                status: Some(Status::Shielded),
                slot_cost: 1,
                ..spell("Shield", ApplyEffect)
            },
        ),
        (
            "bless",
            ActionDef {
                status: Some(Status::Blessed),
                range: 6,
                slot_cost: 1,
                ability: Ability::Wisdom,
                ..spell("Bless", ApplyEffect)
            },
        ),
        (
            "stoneskin",
            ActionDef {
                status: Some(Status::Stoneskin),
                range: 1,
                slot_cost: 1,
                cooldown: 3,
                ..spell("Stoneskin", ApplyEffect)
            },
        ),
    ]
}

fn standard_skills() -> Vec<(&'static str, ActionDef)> {
    use EffectKind::{ApplyEffect, HealSelf};

    vec![
        (
            "second_wind",
            ActionDef {
                dice: Some(Dice::new(1, 10)),
                stamina_cost: 2,
                cooldown: 3,
                ability: Ability::Constitution,
                ..skill("Second Wind", HealSelf)
            },
        ),
        (
            "rage",
            ActionDef {
                status: Some(Status::Raging),
                stamina_cost: 3,
                cooldown: 5,
                ability: Ability::Strength,
                ..skill("Rage", ApplyEffect)
            },
        ),
        (
            "hunters_mark",
            ActionDef {
                status: Some(Status::Marked),
                range: 8,
                stamina_cost: 1,
                ability: Ability::Wisdom,
                ..skill("Hunter's Mark", ApplyEffect)
            },
        ),
        (
            "poison_blade",
            ActionDef {
                status: Some(Status::PoisonedWeapon),
                stamina_cost: 1,
                cooldown: 2,
                ability: Ability::Dexterity,
                ..skill("Poison Blade", ApplyEffect)
            },
        ),
        (
            "inspire",
            ActionDef {
                status: Some(Status::Inspired),
                range: 6,
                stamina_cost: 1,
                ability: Ability::Charisma,
                ..skill("Inspire", ApplyEffect)
            },
        ),
        (
            "venom_spit",
            ActionDef {
                status: Some(Status::Poisoned),
                range: 3,
                stamina_cost: 1,
                cooldown: 2,
                ability: Ability::Constitution,
                ..skill("Venom Spit", ApplyEffect)
            },
        ),
    ]
}

fn skeleton(name: &str, x: i32, y: i32) -> EntityDef {
    EntityDef::new(name, Side::Enemy, Tile::new(x, y))
        .with_behavior(Behavior::Melee)
        .with_stats(CombatStats {
            hp: 13,
            max_hp: 13,
            armor_class: 13,
            speed: 5,
            creature_type: CreatureType::Undead,
            vulnerabilities: DamageKinds::BLUDGEONING,
            ..CombatStats::default()
        })
        .with_equipment(Equipment {
            weapon: Weapon {
                name: "shortsword".into(),
                damage: Dice::new(1, 6),
                kind: DamageKind::Piercing,
                ..Weapon::unarmed()
            },
            ..Equipment::default()
        })
        .with_bounty(Bounty {
            xp: 50,
            gold: 2,
            items: Vec::new(),
        })
}

fn standard_encounters() -> BTreeMap<String, Vec<EntityDef>> {
    let lich = EntityDef::new("Hollow King", Side::Enemy, Tile::new(9, 5))
        .with_behavior(Behavior::Spellcaster)
        .with_stats(CombatStats {
            level: 7,
            hp: 60,
            max_hp: 60,
            armor_class: 12,
            speed: 4,
            spell_slots: 4,
            max_spell_slots: 4,
            creature_type: CreatureType::Undead,
            immunities: DamageKinds::NECROTIC | DamageKinds::MUNDANE_PHYSICAL,
            spells: vec![ActionId::new("fire_bolt"), ActionId::new("fireball")],
            abilities: crate::entity::AbilityScores {
                intelligence: 18,
                ..crate::entity::AbilityScores::default()
            },
            ..CombatStats::default()
        })
        .with_bounty(Bounty {
            xp: 1200,
            gold: 300,
            items: vec!["crown of hollows".to_string()],
        });

    let mut encounters = BTreeMap::new();
    encounters.insert(
        "crypt_king".to_string(),
        vec![lich, skeleton("Skeleton Guard", 8, 3), skeleton("Skeleton Guard", 8, 7)],
    );
    encounters.insert(
        "bone_patrol".to_string(),
        vec![skeleton("Skeleton", 7, 2), skeleton("Skeleton", 7, 4), skeleton("Skeleton", 7, 6)],
    );
    encounters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_lookups() {
        let catalog = Catalog::standard();
        let cure = catalog.action(&ActionId::new("cure_wounds")).unwrap();
        assert_eq!(cure.effect, EffectKind::Heal);
        assert_eq!(cure.category, ActionCategory::Spell);
        let rage = catalog.action(&"rage".into()).unwrap();
        assert!(rage.is_self_only());
        assert!(catalog.action(&ActionId::new("wish")).is_none());
        assert_eq!(catalog.encounter("crypt_king").map(<[EntityDef]>::len), Some(3));
    }

    #[test]
    fn offensive_means_aimed_at_foes() {
        let catalog = Catalog::standard();
        let offensive = |id: &str| catalog.action(&ActionId::new(id)).unwrap().is_offensive();
        assert!(offensive("fire_bolt"));
        assert!(offensive("hunters_mark"));
        assert!(offensive("venom_spit"));
        assert!(!offensive("bless"));
        assert!(!offensive("cure_wounds"));
    }

    #[test]
    fn apply_effects_name_a_status() {
        let catalog = Catalog::standard();
        for def in catalog.actions.values() {
            if def.effect == EffectKind::ApplyEffect {
                assert!(def.status.is_some(), "{} lacks a status", def.name);
            } else {
                assert!(def.dice.is_some(), "{} lacks dice", def.name);
            }
        }
    }

    #[test]
    fn json_round_trip_and_merge() {
        let json = r#"{
            "actions": {
                "frost_ray": {
                    "name": "Frost Ray",
                    "category": "spell",
                    "effect": "damage",
                    "dice": "2d8",
                    "damageKind": "cold",
                    "range": 5
                }
            }
        }"#;
        let extra = Catalog::from_json(json).unwrap();
        let ray = extra.action(&ActionId::new("frost_ray")).unwrap();
        assert_eq!(ray.dice, Some(Dice::new(2, 8)));
        assert_eq!(ray.ability, Ability::Intelligence);

        let mut catalog = Catalog::standard();
        let before = catalog.actions.len();
        catalog.merge(extra);
        assert_eq!(catalog.actions.len(), before + 1);

        let text = serde_json::to_string(&catalog).unwrap();
        assert_eq!(Catalog::from_json(&text).unwrap(), catalog);
    }

    #[test]
    fn affordability_and_payment() {
        let catalog = Catalog::standard();
        let id = ActionId::new("fireball");
        let fireball = catalog.action(&id).unwrap();
        let mut stats = CombatStats::default();
        assert_eq!(
            fireball.check_affordable(&id, &stats),
            Err(ActionError::NoSpellSlots {
                needed: 1,
                available: 0
            })
        );

        stats.spell_slots = 2;
        stats.max_spell_slots = 2;
        assert_eq!(fireball.check_affordable(&id, &stats), Ok(()));
        fireball.pay(&id, &mut stats);
        assert_eq!(stats.spell_slots, 1);
        assert!(matches!(
            fireball.check_affordable(&id, &stats),
            Err(ActionError::OnCooldown { turns: 2, .. })
        ));
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(matches!(Catalog::from_json("{ nope"), Err(SetupError::Json(_))));
    }
}
