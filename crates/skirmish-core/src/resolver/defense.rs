//! Armor class and the damage resistance pipeline.

use std::collections::BTreeMap;

use crate::entity::components::corruption_tier;
use crate::entity::{ArmorWeight, CombatStats, DamageKind, DamageKinds, Entity, Status};

use super::ability_modifier;

/// AC bonus from carrying a shield.
pub const SHIELD_AC_BONUS: i32 = 2;

/// Computes armor class.
///
/// DEX applies in full for light armor (or none), capped at +2 for medium
/// and not at all for heavy. A shield adds 2, active statuses add their flat
/// bonuses, and each corruption tier crossed subtracts 1. Never below 0.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use skirmish_core::entity::ArmorWeight;
/// use skirmish_core::resolver::armor_class;
///
/// // Chain mail (16), shield, DEX 14.
/// let ac = armor_class(14, 16, true, ArmorWeight::Heavy, &BTreeMap::new(), None);
/// assert_eq!(ac, 18);
/// ```
#[must_use]
pub fn armor_class(
    dex_score: i32,
    base_armor_ac: i32,
    has_shield: bool,
    weight: ArmorWeight,
    statuses: &BTreeMap<Status, u32>,
    corruption: Option<u32>,
) -> i32 {
    let dex = weight.dex_contribution(ability_modifier(dex_score));
    let shield = if has_shield { SHIELD_AC_BONUS } else { 0 };
    let status_bonus: i32 = statuses.keys().map(|s| s.ac_bonus()).sum();
    let penalty = i32::try_from(corruption_tier(corruption)).unwrap_or(0);
    (base_armor_ac + dex + shield + status_bonus - penalty).max(0)
}

/// The AC an entity currently defends with.
#[must_use]
pub fn effective_ac(entity: &Entity) -> i32 {
    let stats = entity.stats();
    let equipment = entity.equipment();
    armor_class(
        stats.abilities.dexterity,
        stats.armor_class,
        equipment.shield,
        equipment.armor_weight,
        &stats.statuses,
        stats.corruption,
    )
}

/// Everything about a target that shapes incoming damage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefenseProfile {
    /// Kinds that deal no damage
    pub immunities: DamageKinds,
    /// Kinds halved
    pub resistances: DamageKinds,
    /// Kinds doubled
    pub vulnerabilities: DamageKinds,
    /// Physical damage halved again while raging
    pub raging: bool,
    /// Subtracted after multipliers
    pub flat_reduction: i32,
}

impl DefenseProfile {
    /// Builds the profile from a stat record, creature immunities included.
    #[must_use]
    pub fn of(stats: &CombatStats) -> Self {
        Self {
            immunities: stats.effective_immunities(),
            resistances: stats.resistances,
            vulnerabilities: stats.vulnerabilities,
            raging: stats.has_status(Status::Raging),
            flat_reduction: stats.statuses.keys().map(|s| s.damage_reduction()).sum(),
        }
    }
}

/// Converts raw damage into the damage actually taken.
///
/// 1. Immune to the kind: 0.
/// 2. Non-magical physical damage against mundane-physical immunity: 0.
/// 3. Multiplier starts at 1: ×0.5 for a matching resistance, ×0.5 for
///    physical damage while raging, then ×2 for a matching vulnerability.
/// 4. Subtract flat reduction, floor at 0, round down.
///
/// # Example
///
/// ```
/// use skirmish_core::entity::{DamageKind, DamageKinds};
/// use skirmish_core::resolver::{apply_resistance_pipeline, DefenseProfile};
///
/// let target = DefenseProfile {
///     resistances: DamageKinds::FIRE,
///     ..DefenseProfile::default()
/// };
/// assert_eq!(apply_resistance_pipeline(9, DamageKind::Fire, &target, true), 4);
/// assert_eq!(apply_resistance_pipeline(9, DamageKind::Cold, &target, true), 9);
/// ```
#[must_use]
pub fn apply_resistance_pipeline(
    amount: u32,
    kind: DamageKind,
    target: &DefenseProfile,
    is_magical: bool,
) -> u32 {
    if target.immunities.has(kind) {
        return 0;
    }
    if kind.is_physical() && !is_magical && target.immunities.contains(DamageKinds::MUNDANE_PHYSICAL)
    {
        return 0;
    }

    let mut multiplier = 1.0_f64;
    if target.resistances.has(kind) {
        multiplier *= 0.5;
    }
    if target.raging && kind.is_physical() {
        multiplier *= 0.5;
    }
    if target.vulnerabilities.has(kind) {
        multiplier *= 2.0;
    }

    let reduced = f64::from(amount) * multiplier - f64::from(target.flat_reduction);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let taken = reduced.max(0.0).floor() as u32;
    taken
}
