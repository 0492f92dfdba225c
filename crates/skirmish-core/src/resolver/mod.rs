//! Action resolver: pure combat math.
//!
//! Nothing in this module touches the arena. Functions take stats and dice
//! and return numbers; callers decide what to write back.
//!
//! # Contents
//!
//! - Modifiers: [`ability_modifier`], [`proficiency_bonus`]
//! - [`attack`]: attack rolls, damage rolls, hit-probability previews
//! - [`defense`]: armor class and the resistance pipeline
//! - [`area`]: area-of-effect tile footprints
//!
//! # Example
//!
//! ```
//! use skirmish_core::resolver::{ability_modifier, proficiency_bonus};
//!
//! assert_eq!(ability_modifier(15), 2);
//! assert_eq!(ability_modifier(7), -2);
//! assert_eq!(proficiency_bonus(5), 3);
//! ```

pub mod area;
pub mod attack;
pub mod defense;

use serde::{Deserialize, Serialize};

pub use area::{aoe_tiles, within_radius, AreaShape, CONE_HALF_ANGLE_DEG};
pub use attack::{
    attack_advantage, attack_roll, damage_roll, hit_probability, spell_attack_roll,
    weapon_ability_modifier, weapon_attack_bonus, weapon_extras, AttackRoll, ExtraDamage,
};
pub use defense::{apply_resistance_pipeline, armor_class, effective_ac, DefenseProfile};

/// Modifier for an ability score: `floor((score - 10) / 2)`.
#[must_use]
pub const fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Proficiency bonus for a level: `floor((level - 1) / 4) + 2`.
///
/// Level 0 is treated as level 1.
#[must_use]
pub fn proficiency_bonus(level: u32) -> i32 {
    let steps = i32::try_from(level.saturating_sub(1) / 4).unwrap_or(i32::MAX - 2);
    steps + 2
}

/// Roll-twice modifier on a d20.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advantage {
    /// One die
    #[default]
    Normal,
    /// Two dice, keep the higher
    Advantage,
    /// Two dice, keep the lower
    Disadvantage,
}

impl Advantage {
    /// Combines two sources; advantage and disadvantage cancel.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Normal, x) | (x, Self::Normal) => x,
            (Self::Advantage, Self::Advantage) => Self::Advantage,
            (Self::Disadvantage, Self::Disadvantage) => Self::Disadvantage,
            _ => Self::Normal,
        }
    }
}
