//! Attack and damage rolls.

use tracing::debug;

use super::{defense::effective_ac, proficiency_bonus, Advantage};
use crate::dice::{Dice, DiceSource};
use crate::entity::{Ability, CombatStats, Entity, RaceTrait, Status, Weapon};
use crate::entity::components::RAGE_DAMAGE_BONUS;

/// Outcome of a d20 attack roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRoll {
    /// The kept die
    pub natural: u32,
    /// Die plus every bonus
    pub total: i32,
    /// Lowest natural roll that crits
    pub crit_threshold: u32,
}

impl AttackRoll {
    /// Natural roll at or above the crit threshold.
    #[must_use]
    pub const fn is_crit(&self) -> bool {
        self.natural >= self.crit_threshold
    }

    /// Natural 1.
    #[must_use]
    pub const fn is_fumble(&self) -> bool {
        self.natural == 1
    }

    /// Whether the roll beats `armor_class`.
    ///
    /// A fumble always misses and a crit always hits; otherwise the total
    /// must meet or exceed the AC.
    #[must_use]
    pub const fn hits(&self, armor_class: i32) -> bool {
        if self.is_fumble() {
            false
        } else {
            self.is_crit() || self.total >= armor_class
        }
    }
}

/// An additive contribution to a damage roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraDamage {
    /// Extra dice (doubled on a crit like the base dice)
    Dice(Dice),
    /// A flat bonus
    Flat(i32),
}

/// Advantage state an attacker rolls with from its own statuses.
#[must_use]
pub fn attack_advantage(attacker: &CombatStats) -> Advantage {
    if attacker.has_status(Status::Poisoned) {
        Advantage::Disadvantage
    } else {
        Advantage::Normal
    }
}

/// Ability modifier a weapon attacks with.
///
/// Ranged weapons use DEX, finesse weapons the better of STR and DEX,
/// everything else STR.
#[must_use]
pub fn weapon_ability_modifier(stats: &CombatStats, weapon: &Weapon) -> i32 {
    let strength = stats.modifier(Ability::Strength);
    let dexterity = stats.modifier(Ability::Dexterity);
    if weapon.ranged {
        dexterity
    } else if weapon.finesse {
        strength.max(dexterity)
    } else {
        strength
    }
}

/// Static to-hit bonus with `weapon`: ability modifier, proficiency and
/// magic bonus. Situational dice are not included.
#[must_use]
pub fn weapon_attack_bonus(stats: &CombatStats, weapon: &Weapon) -> i32 {
    weapon_ability_modifier(stats, weapon) + proficiency_bonus(stats.level) + weapon.magic_bonus
}

/// Draws the kept natural d20 for an attack.
fn roll_natural(
    advantage: Advantage,
    race_trait: Option<RaceTrait>,
    dice: &mut dyn DiceSource,
) -> u32 {
    let mut draw = || {
        let roll = dice.roll_die(20);
        if roll == 1 && race_trait == Some(RaceTrait::Lucky) {
            dice.roll_die(20)
        } else {
            roll
        }
    };
    match advantage {
        Advantage::Normal => draw(),
        Advantage::Advantage => {
            let (a, b) = (draw(), draw());
            a.max(b)
        }
        Advantage::Disadvantage => {
            let (a, b) = (draw(), draw());
            a.min(b)
        }
    }
}

/// Rolls the attacker's situational bonus dice (bless, inspiration).
fn situational_bonus(stats: &CombatStats, dice: &mut dyn DiceSource) -> i32 {
    stats
        .statuses
        .keys()
        .filter_map(|status| status.attack_die())
        .map(|die| i32::try_from(die.roll(dice)).unwrap_or(i32::MAX))
        .sum()
}

fn roll_with_bonus(
    stats: &CombatStats,
    bonus: i32,
    advantage: Advantage,
    dice: &mut dyn DiceSource,
) -> AttackRoll {
    let advantage = advantage.combine(attack_advantage(stats));
    let natural = roll_natural(advantage, stats.race_trait, dice);
    let situational = situational_bonus(stats, dice);
    let total = i32::try_from(natural).unwrap_or(20) + bonus + situational;
    AttackRoll {
        natural,
        total,
        crit_threshold: RaceTrait::crit_threshold(stats.race_trait),
    }
}

/// Rolls a weapon attack.
///
/// `advantage` is the situational state; the attacker's own poisoned status
/// is folded in.
///
/// # Example
///
/// ```
/// use skirmish_core::dice::SeededDice;
/// use skirmish_core::entity::{CombatStats, Weapon};
/// use skirmish_core::resolver::{attack_roll, Advantage};
///
/// let mut dice = SeededDice::new(1);
/// let roll = attack_roll(&CombatStats::default(), &Weapon::unarmed(), Advantage::Normal, &mut dice);
/// assert!((1..=20).contains(&roll.natural));
/// assert_eq!(roll.total, roll.natural as i32 + 2);
/// ```
pub fn attack_roll(
    attacker: &CombatStats,
    weapon: &Weapon,
    advantage: Advantage,
    dice: &mut dyn DiceSource,
) -> AttackRoll {
    let roll = roll_with_bonus(attacker, weapon_attack_bonus(attacker, weapon), advantage, dice);
    debug!(natural = roll.natural, total = roll.total, weapon = %weapon.name, "attack roll");
    roll
}

/// Rolls a spell attack with the given casting ability.
pub fn spell_attack_roll(
    caster: &CombatStats,
    ability: Ability,
    advantage: Advantage,
    dice: &mut dyn DiceSource,
) -> AttackRoll {
    let bonus = caster.modifier(ability) + proficiency_bonus(caster.level);
    let roll = roll_with_bonus(caster, bonus, advantage, dice);
    debug!(natural = roll.natural, total = roll.total, ?ability, "spell attack roll");
    roll
}

/// Extra damage sources that ride on a weapon hit.
///
/// - Sneak attack d6s for finesse or ranged weapons
/// - +1d6 against a marked target
/// - Flat rage bonus on melee hits
/// - +1d4 from a poisoned weapon
#[must_use]
pub fn weapon_extras(attacker: &CombatStats, target: &CombatStats, weapon: &Weapon) -> Vec<ExtraDamage> {
    let mut extras = Vec::new();
    if attacker.sneak_attack_dice > 0 && (weapon.finesse || weapon.ranged) {
        extras.push(ExtraDamage::Dice(Dice::new(attacker.sneak_attack_dice, 6)));
    }
    if target.has_status(Status::Marked) {
        extras.push(ExtraDamage::Dice(Dice::new(1, 6)));
    }
    if attacker.has_status(Status::Raging) && !weapon.ranged {
        extras.push(ExtraDamage::Flat(RAGE_DAMAGE_BONUS));
    }
    if attacker.has_status(Status::PoisonedWeapon) {
        extras.push(ExtraDamage::Dice(Dice::new(1, 4)));
    }
    extras
}

/// Rolls damage: `base` dice plus `modifier` plus every extra, additively.
///
/// On a crit every die count is doubled (never the sides). The result is
/// floored at zero.
pub fn damage_roll(
    base: Dice,
    modifier: i32,
    is_crit: bool,
    extras: &[ExtraDamage],
    dice: &mut dyn DiceSource,
) -> u32 {
    let crit = |d: Dice| if is_crit { d.doubled() } else { d };
    let mut total = i64::from(crit(base).roll(dice)) + i64::from(modifier);
    for extra in extras {
        total += match *extra {
            ExtraDamage::Dice(d) => i64::from(crit(d).roll(dice)),
            ExtraDamage::Flat(n) => i64::from(n),
        };
    }
    u32::try_from(total.max(0)).unwrap_or(u32::MAX)
}

/// Chance, in whole percent, that `attacker` hits `target` with its weapon.
///
/// Preview only; real attacks always roll.
#[must_use]
pub fn hit_probability(attacker: &Entity, target: &Entity) -> u32 {
    let stats = attacker.stats();
    let bonus = weapon_attack_bonus(stats, &attacker.equipment().weapon);
    let ac = effective_ac(target);
    let threshold = RaceTrait::crit_threshold(stats.race_trait);

    let hits = (1..=20u32)
        .filter(|&natural| {
            AttackRoll {
                natural,
                total: i32::try_from(natural).unwrap_or(20) + bonus,
                crit_threshold: threshold,
            }
            .hits(ac)
        })
        .count();
    #[allow(clippy::cast_precision_loss)]
    let single = hits as f64 / 20.0;
    let p = match attack_advantage(stats) {
        Advantage::Normal => single,
        Advantage::Advantage => 1.0 - (1.0 - single).powi(2),
        Advantage::Disadvantage => single * single,
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (p * 100.0).round() as u32;
    percent
}
