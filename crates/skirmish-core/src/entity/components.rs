//! Combat-stat components carried by every combatant.
//!
//! These are the already-computed combat numbers handed over by the
//! character and enemy pipelines. Nothing here derives stats from race,
//! class or gear; the battle only reads and mutates them.

use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use skirmish_grid::MoverClass;

use crate::content::ActionId;
use crate::dice::Dice;
use crate::resolver::ability_modifier;

// =============================================================================
// Abilities
// =============================================================================

/// One of the six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    /// Melee attacks and carrying
    Strength,
    /// Ranged and finesse attacks, AC
    Dexterity,
    /// Hit points
    Constitution,
    /// Arcane casting
    Intelligence,
    /// Divine casting and healing
    Wisdom,
    /// Bardic casting
    Charisma,
}

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityScores {
    /// Strength score
    pub strength: i32,
    /// Dexterity score
    pub dexterity: i32,
    /// Constitution score
    pub constitution: i32,
    /// Intelligence score
    pub intelligence: i32,
    /// Wisdom score
    pub wisdom: i32,
    /// Charisma score
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::uniform(10)
    }
}

impl AbilityScores {
    /// All six scores set to `score`.
    #[must_use]
    pub const fn uniform(score: i32) -> Self {
        Self {
            strength: score,
            dexterity: score,
            constitution: score,
            intelligence: score,
            wisdom: score,
            charisma: score,
        }
    }

    /// Returns the score for `ability`.
    #[must_use]
    pub const fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    /// Returns the modifier for `ability`.
    #[must_use]
    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.get(ability))
    }
}

// =============================================================================
// Damage kinds
// =============================================================================

/// The type of a damage instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageKind {
    /// Blades
    Slashing,
    /// Arrows, spears
    Piercing,
    /// Clubs, falls
    Bludgeoning,
    /// Fire
    Fire,
    /// Cold
    Cold,
    /// Lightning
    Lightning,
    /// Thunder
    Thunder,
    /// Poison
    Poison,
    /// Acid
    Acid,
    /// Necrotic
    Necrotic,
    /// Radiant
    Radiant,
    /// Psychic
    Psychic,
    /// Force
    Force,
}

impl DamageKind {
    /// Returns true for slashing, piercing and bludgeoning.
    #[must_use]
    pub const fn is_physical(self) -> bool {
        matches!(self, Self::Slashing | Self::Piercing | Self::Bludgeoning)
    }

    /// The flag for this kind in a [`DamageKinds`] set.
    #[must_use]
    pub const fn flag(self) -> DamageKinds {
        match self {
            Self::Slashing => DamageKinds::SLASHING,
            Self::Piercing => DamageKinds::PIERCING,
            Self::Bludgeoning => DamageKinds::BLUDGEONING,
            Self::Fire => DamageKinds::FIRE,
            Self::Cold => DamageKinds::COLD,
            Self::Lightning => DamageKinds::LIGHTNING,
            Self::Thunder => DamageKinds::THUNDER,
            Self::Poison => DamageKinds::POISON,
            Self::Acid => DamageKinds::ACID,
            Self::Necrotic => DamageKinds::NECROTIC,
            Self::Radiant => DamageKinds::RADIANT,
            Self::Psychic => DamageKinds::PSYCHIC,
            Self::Force => DamageKinds::FORCE,
        }
    }
}

impl fmt::Display for DamageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Slashing => "slashing",
            Self::Piercing => "piercing",
            Self::Bludgeoning => "bludgeoning",
            Self::Fire => "fire",
            Self::Cold => "cold",
            Self::Lightning => "lightning",
            Self::Thunder => "thunder",
            Self::Poison => "poison",
            Self::Acid => "acid",
            Self::Necrotic => "necrotic",
            Self::Radiant => "radiant",
            Self::Psychic => "psychic",
            Self::Force => "force",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// A set of damage kinds (resistances, vulnerabilities, immunities).
    ///
    /// `MUNDANE_PHYSICAL` is not a damage kind of its own: as an immunity it
    /// covers physical damage from non-magical sources.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DamageKinds: u16 {
        const SLASHING = 1 << 0;
        const PIERCING = 1 << 1;
        const BLUDGEONING = 1 << 2;
        const FIRE = 1 << 3;
        const COLD = 1 << 4;
        const LIGHTNING = 1 << 5;
        const THUNDER = 1 << 6;
        const POISON = 1 << 7;
        const ACID = 1 << 8;
        const NECROTIC = 1 << 9;
        const RADIANT = 1 << 10;
        const PSYCHIC = 1 << 11;
        const FORCE = 1 << 12;
        const MUNDANE_PHYSICAL = 1 << 13;
        const PHYSICAL = Self::SLASHING.bits() | Self::PIERCING.bits() | Self::BLUDGEONING.bits();
    }
}

impl DamageKinds {
    /// Returns true if `kind` is in the set.
    #[must_use]
    pub const fn has(self, kind: DamageKind) -> bool {
        self.contains(kind.flag())
    }
}

// =============================================================================
// Statuses
// =============================================================================

/// Flat AC bonus granted by the shielded status.
pub const SHIELDED_AC_BONUS: i32 = 5;
/// Flat damage bonus on melee hits while raging.
pub const RAGE_DAMAGE_BONUS: i32 = 2;
/// Flat reduction on every damage instance while stoneskinned.
pub const STONESKIN_REDUCTION: i32 = 3;

/// A timed status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// +5 AC
    Shielded,
    /// Resists physical damage, +2 melee damage
    Raging,
    /// +1d4 to attack rolls
    Blessed,
    /// +1d6 to attack rolls
    Inspired,
    /// Attackers deal +1d6 damage
    Marked,
    /// Weapon hits deal +1d4 damage
    PoisonedWeapon,
    /// Flat damage reduction
    Stoneskin,
    /// Attacks at disadvantage
    Poisoned,
}

impl Status {
    /// AC granted while active.
    #[must_use]
    pub const fn ac_bonus(self) -> i32 {
        match self {
            Self::Shielded => SHIELDED_AC_BONUS,
            _ => 0,
        }
    }

    /// Extra die added to the bearer's attack rolls.
    #[must_use]
    pub const fn attack_die(self) -> Option<Dice> {
        match self {
            Self::Blessed => Some(Dice::new(1, 4)),
            Self::Inspired => Some(Dice::new(1, 6)),
            _ => None,
        }
    }

    /// Flat reduction applied to damage the bearer takes.
    #[must_use]
    pub const fn damage_reduction(self) -> i32 {
        match self {
            Self::Stoneskin => STONESKIN_REDUCTION,
            _ => 0,
        }
    }

    /// Returns true for statuses inflicted on foes rather than granted to
    /// allies.
    #[must_use]
    pub const fn is_harmful(self) -> bool {
        matches!(self, Self::Marked | Self::Poisoned)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Shielded => "shielded",
            Self::Raging => "raging",
            Self::Blessed => "blessed",
            Self::Inspired => "inspired",
            Self::Marked => "marked",
            Self::PoisonedWeapon => "poisoned weapon",
            Self::Stoneskin => "stoneskin",
            Self::Poisoned => "poisoned",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Creature traits
// =============================================================================

/// Broad creature category, used for immunity rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatureType {
    /// People of the realm
    #[default]
    Humanoid,
    /// Animals
    Beast,
    /// Risen dead
    Undead,
    /// Animated objects, golems
    Construct,
    /// Demons and devils
    Fiend,
    /// Living elements
    Elemental,
}

impl CreatureType {
    /// Damage kinds this creature type is always immune to.
    #[must_use]
    pub const fn innate_immunities(self) -> DamageKinds {
        match self {
            Self::Undead => DamageKinds::POISON,
            Self::Construct => DamageKinds::POISON.union(DamageKinds::PSYCHIC),
            _ => DamageKinds::empty(),
        }
    }

    /// Healing harms these creatures instead of restoring them.
    #[must_use]
    pub const fn is_heal_immune(self) -> bool {
        matches!(self, Self::Undead | Self::Construct)
    }
}

/// Racial trait relevant to attack rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceTrait {
    /// Rerolls a natural 1 once
    Lucky,
    /// Crits on 19-20
    KeenEyed,
}

impl RaceTrait {
    /// Lowest natural roll that counts as a critical hit.
    #[must_use]
    pub const fn crit_threshold(trait_: Option<Self>) -> u32 {
        match trait_ {
            Some(Self::KeenEyed) => 19,
            _ => 20,
        }
    }
}

// =============================================================================
// Equipment
// =============================================================================

/// Armor weight class, governing how much DEX adds to AC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorWeight {
    /// No armor: full DEX
    #[default]
    Unarmored,
    /// Full DEX
    Light,
    /// DEX capped at +2
    Medium,
    /// No DEX
    Heavy,
}

impl ArmorWeight {
    /// The portion of `dex_mod` that applies to AC.
    #[must_use]
    pub fn dex_contribution(self, dex_mod: i32) -> i32 {
        match self {
            Self::Unarmored | Self::Light => dex_mod,
            Self::Medium => dex_mod.min(2),
            Self::Heavy => 0,
        }
    }
}

/// A wielded weapon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    /// Display name
    pub name: String,
    /// Damage dice
    pub damage: Dice,
    /// Damage kind
    pub kind: DamageKind,
    /// Reach in tiles (1 for melee)
    #[serde(default = "default_reach")]
    pub range: u32,
    /// Uses DEX
    #[serde(default)]
    pub ranged: bool,
    /// Uses the better of STR and DEX
    #[serde(default)]
    pub finesse: bool,
    /// Enchantment bonus to attack rolls
    #[serde(default)]
    pub magic_bonus: i32,
}

const fn default_reach() -> u32 {
    1
}

impl Weapon {
    /// Bare fists.
    #[must_use]
    pub fn unarmed() -> Self {
        Self {
            name: "fists".to_string(),
            damage: Dice::new(1, 4),
            kind: DamageKind::Bludgeoning,
            range: 1,
            ranged: false,
            finesse: false,
            magic_bonus: 0,
        }
    }

    /// Returns true if the weapon counts as magical for resistance purposes.
    #[must_use]
    pub const fn is_magical(&self) -> bool {
        self.magic_bonus > 0
    }
}

impl Default for Weapon {
    fn default() -> Self {
        Self::unarmed()
    }
}

/// Equipment slots that matter in combat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Equipment {
    /// Main-hand weapon
    pub weapon: Weapon,
    /// Worn armor class
    pub armor_weight: ArmorWeight,
    /// Shield in the off hand
    pub shield: bool,
}

/// What the party receives for defeating this entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounty {
    /// Experience
    pub xp: u32,
    /// Gold pieces
    pub gold: u32,
    /// Dropped item names
    pub items: Vec<String>,
}

// =============================================================================
// Combat stats
// =============================================================================

/// Corruption thresholds and the AC penalty each one adds.
const CORRUPTION_TIERS: [u32; 3] = [25, 50, 75];

/// Number of corruption tiers crossed by `corruption`.
#[must_use]
pub fn corruption_tier(corruption: Option<u32>) -> u32 {
    let value = corruption.unwrap_or(0);
    #[allow(clippy::cast_possible_truncation)]
    let tier = CORRUPTION_TIERS.iter().filter(|&&t| value >= t).count() as u32;
    tier
}

/// The full combat-stat record of one entity.
///
/// Invariants: `hp <= max_hp`, `stamina <= max_stamina`,
/// `spell_slots <= max_spell_slots`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CombatStats {
    /// Character level
    pub level: u32,
    /// Current ability scores (after buffs/drains)
    pub abilities: AbilityScores,
    /// Unmodified ability scores
    pub base_abilities: AbilityScores,
    /// Current hit points
    pub hp: u32,
    /// Maximum hit points
    pub max_hp: u32,
    /// Current stamina
    pub stamina: u32,
    /// Maximum stamina
    pub max_stamina: u32,
    /// Base AC of the worn armor (10 when unarmored)
    pub armor_class: i32,
    /// Movement budget per turn
    pub speed: u32,
    /// Remaining spell slots
    pub spell_slots: u32,
    /// Maximum spell slots
    pub max_spell_slots: u32,
    /// Active statuses and their remaining turns
    pub statuses: BTreeMap<Status, u32>,
    /// Halved damage kinds
    pub resistances: DamageKinds,
    /// Doubled damage kinds
    pub vulnerabilities: DamageKinds,
    /// Ignored damage kinds
    pub immunities: DamageKinds,
    /// Known spells
    pub spells: Vec<ActionId>,
    /// Known skills
    pub skills: Vec<ActionId>,
    /// Remaining cooldown per action
    pub cooldowns: BTreeMap<ActionId, u32>,
    /// Creature category
    pub creature_type: CreatureType,
    /// Accumulated corruption
    pub corruption: Option<u32>,
    /// Racial attack trait
    pub race_trait: Option<RaceTrait>,
    /// Added to the initiative roll
    pub initiative_bonus: i32,
    /// Terrain-cost class for movement
    pub mover_class: MoverClass,
    /// Sneak attack d6s added to finesse and ranged hits
    pub sneak_attack_dice: u32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            level: 1,
            abilities: AbilityScores::default(),
            base_abilities: AbilityScores::default(),
            hp: 10,
            max_hp: 10,
            stamina: 0,
            max_stamina: 0,
            armor_class: 10,
            speed: 5,
            spell_slots: 0,
            max_spell_slots: 0,
            statuses: BTreeMap::new(),
            resistances: DamageKinds::empty(),
            vulnerabilities: DamageKinds::empty(),
            immunities: DamageKinds::empty(),
            spells: Vec::new(),
            skills: Vec::new(),
            cooldowns: BTreeMap::new(),
            creature_type: CreatureType::default(),
            corruption: None,
            race_trait: None,
            initiative_bonus: 0,
            mover_class: MoverClass::default(),
            sneak_attack_dice: 0,
        }
    }
}

impl CombatStats {
    /// Returns true while hp is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Current hp as a fraction of max hp.
    #[must_use]
    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp == 0 {
            0.0
        } else {
            f64::from(self.hp) / f64::from(self.max_hp)
        }
    }

    /// Returns true if `status` is active.
    #[must_use]
    pub fn has_status(&self, status: Status) -> bool {
        self.statuses.contains_key(&status)
    }

    /// Modifier for `ability` from current scores.
    #[must_use]
    pub fn modifier(&self, ability: Ability) -> i32 {
        self.abilities.modifier(ability)
    }

    /// Own immunities plus those innate to the creature type.
    #[must_use]
    pub const fn effective_immunities(&self) -> DamageKinds {
        self.immunities.union(self.creature_type.innate_immunities())
    }

    /// Removes up to `amount` hp, returning how much was removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Restores up to `amount` hp without exceeding max hp, returning how
    /// much was restored.
    pub fn restore_hp(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp.saturating_sub(self.hp));
        self.hp += healed;
        healed
    }

    /// Inserts `status` or refreshes it to `turns`, whichever is longer.
    pub fn apply_status(&mut self, status: Status, turns: u32) {
        let entry = self.statuses.entry(status).or_insert(0);
        *entry = (*entry).max(turns);
    }

    /// Remaining cooldown on `action`, zero when ready.
    #[must_use]
    pub fn cooldown(&self, action: &ActionId) -> u32 {
        self.cooldowns.get(action).copied().unwrap_or(0)
    }

    /// Ticks statuses and cooldowns down by one turn, returning the statuses
    /// that expired.
    pub fn tick(&mut self) -> Vec<Status> {
        let mut expired = Vec::new();
        self.statuses.retain(|&status, turns| {
            *turns = turns.saturating_sub(1);
            if *turns == 0 {
                expired.push(status);
                false
            } else {
                true
            }
        });
        self.cooldowns.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });
        expired
    }

    /// Applies the corruption max-hp penalty (10% per tier) and clamps hp.
    pub fn apply_corruption_penalty(&mut self) {
        let tier = corruption_tier(self.corruption);
        if tier > 0 {
            let penalty = u64::from(self.max_hp) * u64::from(tier) / 10;
            let penalty = u32::try_from(penalty).unwrap_or(self.max_hp);
            self.max_hp = self.max_hp.saturating_sub(penalty).max(1);
        }
        self.clamp();
    }

    /// Restores the record invariants after external edits.
    pub fn clamp(&mut self) {
        self.hp = self.hp.min(self.max_hp);
        self.stamina = self.stamina.min(self.max_stamina);
        self.spell_slots = self.spell_slots.min(self.max_spell_slots);
        self.armor_class = self.armor_class.max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod ability_tests {
        use super::*;

        #[test]
        fn scores_default_to_ten() {
            let scores = AbilityScores::default();
            assert_eq!(scores.get(Ability::Wisdom), 10);
            assert_eq!(scores.modifier(Ability::Wisdom), 0);
        }

        #[test]
        fn modifier_reads_the_right_score() {
            let scores = AbilityScores {
                dexterity: 16,
                strength: 7,
                ..AbilityScores::default()
            };
            assert_eq!(scores.modifier(Ability::Dexterity), 3);
            assert_eq!(scores.modifier(Ability::Strength), -2);
        }
    }

    mod damage_kind_tests {
        use super::*;

        #[test]
        fn physical_kinds() {
            assert!(DamageKind::Slashing.is_physical());
            assert!(!DamageKind::Fire.is_physical());
            assert!(DamageKinds::PHYSICAL.has(DamageKind::Piercing));
        }

        #[test]
        fn kind_sets_serialize_by_name() {
            let set = DamageKinds::FIRE | DamageKinds::COLD;
            let json = serde_json::to_string(&set).unwrap();
            let back: DamageKinds = serde_json::from_str(&json).unwrap();
            assert_eq!(back, set);
        }
    }

    mod creature_tests {
        use super::*;

        #[test]
        fn undead_and_constructs_resist_poison() {
            assert!(CreatureType::Undead.innate_immunities().has(DamageKind::Poison));
            assert!(CreatureType::Construct.innate_immunities().has(DamageKind::Psychic));
            assert!(CreatureType::Humanoid.innate_immunities().is_empty());
        }

        #[test]
        fn effective_immunities_merge_creature_type() {
            let stats = CombatStats {
                creature_type: CreatureType::Undead,
                immunities: DamageKinds::NECROTIC,
                ..CombatStats::default()
            };
            let immune = stats.effective_immunities();
            assert!(immune.has(DamageKind::Poison));
            assert!(immune.has(DamageKind::Necrotic));
        }

        #[test]
        fn keen_eyed_crits_on_nineteen() {
            assert_eq!(RaceTrait::crit_threshold(Some(RaceTrait::KeenEyed)), 19);
            assert_eq!(RaceTrait::crit_threshold(Some(RaceTrait::Lucky)), 20);
            assert_eq!(RaceTrait::crit_threshold(None), 20);
        }
    }

    mod stats_tests {
        use super::*;

        #[test]
        fn damage_and_healing_clamp() {
            let mut stats = CombatStats {
                hp: 5,
                max_hp: 12,
                ..CombatStats::default()
            };
            assert_eq!(stats.take_damage(8), 5);
            assert_eq!(stats.hp, 0);
            assert!(!stats.is_alive());
            assert_eq!(stats.restore_hp(20), 12);
            assert_eq!(stats.hp, 12);
        }

        #[test]
        fn tick_expires_statuses_and_cooldowns() {
            let mut stats = CombatStats::default();
            stats.apply_status(Status::Shielded, 1);
            stats.apply_status(Status::Blessed, 3);
            stats.cooldowns.insert(ActionId::from("rage"), 1);

            let expired = stats.tick();
            assert_eq!(expired, vec![Status::Shielded]);
            assert_eq!(stats.statuses.get(&Status::Blessed), Some(&2));
            assert!(stats.cooldowns.is_empty());
        }

        #[test]
        fn apply_status_keeps_longer_duration() {
            let mut stats = CombatStats::default();
            stats.apply_status(Status::Marked, 5);
            stats.apply_status(Status::Marked, 3);
            assert_eq!(stats.statuses[&Status::Marked], 5);
        }

        #[test]
        fn corruption_cuts_max_hp_by_tier() {
            let mut stats = CombatStats {
                hp: 40,
                max_hp: 40,
                corruption: Some(55),
                ..CombatStats::default()
            };
            stats.apply_corruption_penalty();
            assert_eq!(stats.max_hp, 32);
            assert_eq!(stats.hp, 32);
        }

        #[test]
        fn corruption_penalty_handles_huge_max_hp() {
            let mut stats = CombatStats {
                hp: u32::MAX,
                max_hp: u32::MAX,
                corruption: Some(80),
                ..CombatStats::default()
            };
            stats.apply_corruption_penalty();
            assert_eq!(stats.max_hp, u32::MAX - 1_288_490_188);
            assert_eq!(stats.hp, stats.max_hp);
        }

        #[test]
        fn corruption_tiers() {
            assert_eq!(corruption_tier(None), 0);
            assert_eq!(corruption_tier(Some(24)), 0);
            assert_eq!(corruption_tier(Some(25)), 1);
            assert_eq!(corruption_tier(Some(80)), 3);
        }
    }

    #[test]
    fn stats_deserialize_with_defaults() {
        let stats: CombatStats =
            serde_json::from_str(r#"{"hp": 7, "maxHp": 9, "creatureType": "undead"}"#).unwrap();
        assert_eq!(stats.hp, 7);
        assert_eq!(stats.max_hp, 9);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.creature_type, CreatureType::Undead);
    }
}
