//! Effect resolution: one strategy per [`EffectKind`].
//!
//! [`resolve_effect`] is the single entry point for spells and skills. It
//! matches on the definition's effect kind, never on the action's identity,
//! and returns the updated target record plus the log line and events that
//! describe what happened. Nothing here writes to the arena.
//!
//! Weapon attacks go through [`resolve_weapon_attack`], which shares the
//! damage half of the pipeline.

use tracing::debug;

use crate::content::{ActionDef, EffectKind};
use crate::dice::{Dice, DiceSource};
use crate::entity::{DamageKind, Entity, Status};
use crate::output::{CombatEvent, DamageEvent, PopupKind};
use crate::resolver::{
    apply_resistance_pipeline, attack_roll, damage_roll, effective_ac, spell_attack_roll,
    weapon_ability_modifier, weapon_extras, Advantage, AttackRoll, DefenseProfile, ExtraDamage,
};

/// Result of resolving one effect against one target.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectOutcome {
    /// The target's full record after the effect.
    pub target: Entity,
    /// Player-facing description.
    pub line: String,
    /// Structured events, in order.
    pub events: Vec<CombatEvent>,
}

impl EffectOutcome {
    fn new(target: Entity, line: String) -> Self {
        Self {
            target,
            line,
            events: Vec::new(),
        }
    }
}

/// Inputs shared by every effect strategy.
#[derive(Debug, Clone, Copy)]
pub struct EffectContext<'a> {
    /// Who is using the action.
    pub caster: &'a Entity,
    /// The action being resolved.
    pub action: &'a ActionDef,
    /// Area effects skip the attack roll.
    pub is_area: bool,
    /// Duration for applied statuses.
    pub status_duration: u32,
}

/// Resolves `ctx.action` against `target`.
///
/// For [`EffectKind::HealSelf`] the caller passes the caster as `target`.
pub fn resolve_effect(
    ctx: &EffectContext<'_>,
    target: &Entity,
    dice: &mut dyn DiceSource,
) -> EffectOutcome {
    debug!(
        caster = %ctx.caster,
        target = %target,
        action = %ctx.action.name,
        kind = ?ctx.action.effect,
        "resolving effect"
    );
    match ctx.action.effect {
        EffectKind::Damage => resolve_spell_damage(ctx, target, dice),
        EffectKind::Heal => resolve_heal(ctx, target, 0, dice),
        EffectKind::HealSelf => {
            let bonus = i32::try_from(ctx.caster.stats().level).unwrap_or(0);
            resolve_heal(ctx, target, bonus, dice)
        }
        EffectKind::ApplyEffect => resolve_status(ctx, target),
    }
}

fn resolve_spell_damage(
    ctx: &EffectContext<'_>,
    target: &Entity,
    dice: &mut dyn DiceSource,
) -> EffectOutcome {
    let caster = ctx.caster;
    let action = ctx.action;
    let mut events = Vec::new();

    let crit = if ctx.is_area {
        false
    } else {
        let roll = spell_attack_roll(caster.stats(), action.ability, Advantage::Normal, dice);
        let ac = effective_ac(target);
        events.push(attack_event(caster, target, &roll, ac));
        if !roll.hits(ac) {
            let line = format!("{}'s {} misses {}.", caster.name(), action.name, target.name());
            return missed(target, events, line);
        }
        roll.is_crit()
    };

    let mut extras = Vec::new();
    if target.stats().has_status(Status::Marked) {
        extras.push(ExtraDamage::Dice(Dice::new(1, 6)));
    }
    let modifier = caster.stats().modifier(action.ability);
    let raw = action
        .dice
        .map_or(0, |d| damage_roll(d, modifier, crit, &extras, dice));

    let mut outcome = apply_damage(target, raw, action.damage_kind, true, crit);
    events.append(&mut outcome.events);
    outcome.events = events;
    outcome.line = format!("{}'s {}: {}", caster.name(), action.name, outcome.line);
    outcome
}

fn resolve_heal(
    ctx: &EffectContext<'_>,
    target: &Entity,
    bonus: i32,
    dice: &mut dyn DiceSource,
) -> EffectOutcome {
    let caster = ctx.caster;
    let action = ctx.action;
    let amount = action.dice.map_or(0, |d| damage_roll(d, bonus, false, &[], dice));

    if target.stats().creature_type.is_heal_immune() {
        let mut outcome = apply_damage(target, amount, DamageKind::Radiant, true, false);
        outcome.line = format!(
            "{}'s {} sears {}: {}",
            caster.name(),
            action.name,
            target.name(),
            outcome.line
        );
        return outcome;
    }

    let mut updated = target.clone();
    let healed = updated.stats_mut().restore_hp(amount);
    let line = format!(
        "{}'s {} heals {} for {} ({}/{}).",
        caster.name(),
        action.name,
        target.name(),
        healed,
        updated.stats().hp,
        updated.stats().max_hp
    );
    let mut outcome = EffectOutcome::new(updated, line);
    outcome.events.push(CombatEvent::Popup(DamageEvent {
        target: target.id(),
        amount: healed,
        kind: PopupKind::Heal,
        crit: false,
    }));
    outcome
}

fn resolve_status(ctx: &EffectContext<'_>, target: &Entity) -> EffectOutcome {
    let caster = ctx.caster;
    let action = ctx.action;
    let mut updated = target.clone();

    let Some(status) = action.status else {
        let line = format!("{}'s {} fizzles.", caster.name(), action.name);
        return EffectOutcome::new(updated, line);
    };

    updated.stats_mut().apply_status(status, ctx.status_duration);
    let line = format!(
        "{} uses {}: {} is {} for {} turns.",
        caster.name(),
        action.name,
        target.name(),
        status,
        ctx.status_duration
    );
    let mut outcome = EffectOutcome::new(updated, line);
    outcome.events.push(CombatEvent::StatusApplied {
        target: target.id(),
        status,
        turns: ctx.status_duration,
    });
    outcome
}

/// Resolves a weapon attack from `attacker` against `target`.
///
/// Rolls to hit against the target's AC; on a hit rolls weapon damage with
/// every riding extra and runs it through the resistance pipeline.
pub fn resolve_weapon_attack(
    attacker: &Entity,
    target: &Entity,
    advantage: Advantage,
    dice: &mut dyn DiceSource,
) -> EffectOutcome {
    let weapon = &attacker.equipment().weapon;
    let roll = attack_roll(attacker.stats(), weapon, advantage, dice);
    let ac = effective_ac(target);
    let mut events = vec![attack_event(attacker, target, &roll, ac)];

    if !roll.hits(ac) {
        let line = format!(
            "{} attacks {} with {} ({} vs AC {}) and misses.",
            attacker.name(),
            target.name(),
            weapon.name,
            roll.total,
            ac
        );
        return missed(target, events, line);
    }

    let extras = weapon_extras(attacker.stats(), target.stats(), weapon);
    let modifier = weapon_ability_modifier(attacker.stats(), weapon);
    let raw = damage_roll(weapon.damage, modifier, roll.is_crit(), &extras, dice);

    let mut outcome = apply_damage(target, raw, weapon.kind, weapon.is_magical(), roll.is_crit());
    events.append(&mut outcome.events);
    outcome.events = events;
    outcome.line = format!(
        "{} attacks {} with {} ({} vs AC {}): {}",
        attacker.name(),
        target.name(),
        weapon.name,
        roll.total,
        ac,
        outcome.line
    );
    outcome
}

fn attack_event(attacker: &Entity, target: &Entity, roll: &AttackRoll, ac: i32) -> CombatEvent {
    CombatEvent::AttackRolled {
        attacker: attacker.id(),
        target: target.id(),
        natural: roll.natural,
        total: roll.total,
        armor_class: ac,
        hit: roll.hits(ac),
    }
}

fn missed(target: &Entity, mut events: Vec<CombatEvent>, line: String) -> EffectOutcome {
    events.push(CombatEvent::Popup(DamageEvent {
        target: target.id(),
        amount: 0,
        kind: PopupKind::Miss,
        crit: false,
    }));
    EffectOutcome {
        target: target.clone(),
        line,
        events,
    }
}

/// Runs `raw` through the target's defenses and writes the new hp.
fn apply_damage(
    target: &Entity,
    raw: u32,
    kind: DamageKind,
    is_magical: bool,
    crit: bool,
) -> EffectOutcome {
    let profile = DefenseProfile::of(target.stats());
    let taken = apply_resistance_pipeline(raw, kind, &profile, is_magical);
    let mut updated = target.clone();
    let dealt = updated.stats_mut().take_damage(taken);

    let crit_note = if crit { " Critical hit!" } else { "" };
    let line = if taken == 0 && raw > 0 {
        format!("{} shrugs off the {} damage.{}", target.name(), kind, crit_note)
    } else {
        format!(
            "{} takes {} {} damage ({}/{}).{}",
            target.name(),
            dealt,
            kind,
            updated.stats().hp,
            updated.stats().max_hp,
            crit_note
        )
    };

    let mut outcome = EffectOutcome::new(updated, line);
    outcome.events.push(CombatEvent::Popup(DamageEvent {
        target: target.id(),
        amount: dealt,
        kind: if taken == 0 && raw > 0 {
            PopupKind::Immune
        } else {
            PopupKind::Damage
        },
        crit,
    }));
    if target.is_alive() && !outcome.target.is_alive() {
        outcome.line = format!("{} {} falls!", outcome.line, target.name());
        outcome.events.push(CombatEvent::Died { entity: target.id() });
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ActionCategory, ActionDef};
    use crate::dice::ScriptedDice;
    use crate::entity::{
        Ability, AbilityScores, CombatStats, CreatureType, DamageKinds, EntityDef, EntityId, Side,
        Weapon,
    };
    use skirmish_grid::Tile;

    fn entity(id: u64, side: Side, stats: CombatStats) -> Entity {
        Entity::from_def(
            EntityId::new(id),
            EntityDef::new(format!("e{id}"), side, Tile::new(0, 0)).with_stats(stats),
        )
    }

    fn caster() -> Entity {
        entity(
            0,
            Side::Player,
            CombatStats {
                level: 3,
                abilities: AbilityScores {
                    intelligence: 16,
                    wisdom: 14,
                    ..AbilityScores::default()
                },
                ..CombatStats::default()
            },
        )
    }

    fn bolt(kind: DamageKind) -> ActionDef {
        serde_json::from_value(serde_json::json!({
            "name": "Bolt",
            "category": "spell",
            "effect": "damage",
            "dice": "2d6",
            "damageKind": kind,
            "range": 6
        }))
        .unwrap()
    }

    fn ctx<'a>(caster: &'a Entity, action: &'a ActionDef, is_area: bool) -> EffectContext<'a> {
        EffectContext {
            caster,
            action,
            is_area,
            status_duration: 3,
        }
    }

    mod damage_tests {
        use super::*;

        #[test]
        fn spell_hit_runs_pipeline() {
            let c = caster();
            let action = bolt(DamageKind::Fire);
            let target = entity(
                1,
                Side::Enemy,
                CombatStats {
                    hp: 30,
                    max_hp: 30,
                    resistances: DamageKinds::FIRE,
                    ..CombatStats::default()
                },
            );
            // d20 = 15 (+3 int +2 prof = 20 vs AC 10), damage 4 + 6 + 3 = 13, halved to 6.
            let mut dice = ScriptedDice::new([15, 4, 6]);
            let out = resolve_effect(&ctx(&c, &action, false), &target, &mut dice);
            assert_eq!(out.target.stats().hp, 24);
            assert!(matches!(out.events[0], CombatEvent::AttackRolled { hit: true, .. }));
        }

        #[test]
        fn spell_miss_leaves_target() {
            let c = caster();
            let action = bolt(DamageKind::Fire);
            let target = entity(
                1,
                Side::Enemy,
                CombatStats {
                    armor_class: 30,
                    ..CombatStats::default()
                },
            );
            let mut dice = ScriptedDice::new([10]);
            let out = resolve_effect(&ctx(&c, &action, false), &target, &mut dice);
            assert_eq!(out.target, target);
            assert!(out.line.contains("misses"));
        }

        #[test]
        fn area_skips_attack_roll() {
            let c = caster();
            let action = bolt(DamageKind::Cold);
            let target = entity(
                1,
                Side::Enemy,
                CombatStats {
                    hp: 20,
                    max_hp: 20,
                    armor_class: 30,
                    ..CombatStats::default()
                },
            );
            // No d20: damage dice 2 + 3, +3 int.
            let mut dice = ScriptedDice::new([2, 3]);
            let out = resolve_effect(&ctx(&c, &action, true), &target, &mut dice);
            assert_eq!(out.target.stats().hp, 12);
            assert!(!out
                .events
                .iter()
                .any(|e| matches!(e, CombatEvent::AttackRolled { .. })));
        }

        #[test]
        fn undead_ignore_poison() {
            let c = caster();
            let action = bolt(DamageKind::Poison);
            let target = entity(
                1,
                Side::Enemy,
                CombatStats {
                    hp: 10,
                    max_hp: 10,
                    creature_type: CreatureType::Undead,
                    ..CombatStats::default()
                },
            );
            let mut dice = ScriptedDice::new([6, 6]);
            let out = resolve_effect(&ctx(&c, &action, true), &target, &mut dice);
            assert_eq!(out.target.stats().hp, 10);
            assert!(out.events.iter().any(|e| matches!(
                e,
                CombatEvent::Popup(DamageEvent {
                    kind: PopupKind::Immune,
                    ..
                })
            )));
        }

        #[test]
        fn lethal_damage_emits_death() {
            let c = caster();
            let action = bolt(DamageKind::Force);
            let target = entity(
                1,
                Side::Enemy,
                CombatStats {
                    hp: 3,
                    max_hp: 10,
                    ..CombatStats::default()
                },
            );
            let mut dice = ScriptedDice::new([6, 6]);
            let out = resolve_effect(&ctx(&c, &action, true), &target, &mut dice);
            assert_eq!(out.target.stats().hp, 0);
            assert!(out.events.contains(&CombatEvent::Died {
                entity: EntityId::new(1)
            }));
        }
    }

    mod heal_tests {
        use super::*;

        fn mend() -> ActionDef {
            let base: ActionDef = serde_json::from_value(serde_json::json!({
                "name": "Mend",
                "category": "spell",
                "effect": "heal"
            }))
            .unwrap();
            ActionDef {
                dice: Some(Dice::new(1, 8)),
                range: 1,
                ability: Ability::Wisdom,
                ..base
            }
        }

        #[test]
        fn heal_clamps_to_max() {
            let c = caster();
            let action = mend();
            let ally = entity(
                1,
                Side::Player,
                CombatStats {
                    hp: 8,
                    max_hp: 10,
                    ..CombatStats::default()
                },
            );
            let mut dice = ScriptedDice::new([7]);
            let out = resolve_effect(&ctx(&c, &action, false), &ally, &mut dice);
            assert_eq!(out.target.stats().hp, 10);
        }

        #[test]
        fn self_heal_adds_level() {
            let c = entity(
                0,
                Side::Player,
                CombatStats {
                    level: 4,
                    hp: 1,
                    max_hp: 30,
                    ..CombatStats::default()
                },
            );
            let action = ActionDef {
                effect: EffectKind::HealSelf,
                category: ActionCategory::Skill,
                ability: Ability::Constitution,
                ..mend()
            };
            let mut dice = ScriptedDice::new([5]);
            let out = resolve_effect(&ctx(&c, &action, false), &c, &mut dice);
            assert_eq!(out.target.stats().hp, 1 + 5 + 4);
        }

        #[test]
        fn heal_immune_takes_radiant() {
            let c = caster();
            let action = mend();
            let golem = entity(
                1,
                Side::Enemy,
                CombatStats {
                    hp: 20,
                    max_hp: 20,
                    creature_type: CreatureType::Construct,
                    ..CombatStats::default()
                },
            );
            let mut dice = ScriptedDice::new([6]);
            let out = resolve_effect(&ctx(&c, &action, false), &golem, &mut dice);
            assert_eq!(out.target.stats().hp, 14);
            assert!(out.line.contains("radiant"));
        }

        #[test]
        fn heal_ignores_casting_ability() {
            // WIS 14 caster: only the die counts.
            let c = caster();
            assert_eq!(c.stats().modifier(Ability::Wisdom), 2);
            let action = mend();
            let ally = entity(
                1,
                Side::Player,
                CombatStats {
                    hp: 1,
                    max_hp: 30,
                    ..CombatStats::default()
                },
            );
            let mut dice = ScriptedDice::new([5]);
            let out = resolve_effect(&ctx(&c, &action, false), &ally, &mut dice);
            assert_eq!(out.target.stats().hp, 6);
        }

        #[test]
        fn self_heal_adds_level_not_ability() {
            let c = entity(
                0,
                Side::Player,
                CombatStats {
                    level: 2,
                    hp: 1,
                    max_hp: 30,
                    abilities: AbilityScores {
                        constitution: 18,
                        ..AbilityScores::default()
                    },
                    ..CombatStats::default()
                },
            );
            let action = ActionDef {
                effect: EffectKind::HealSelf,
                category: ActionCategory::Skill,
                ability: Ability::Constitution,
                ..mend()
            };
            let mut dice = ScriptedDice::new([3]);
            let out = resolve_effect(&ctx(&c, &action, false), &c, &mut dice);
            assert_eq!(out.target.stats().hp, 1 + 3 + 2);
        }
    }

    mod status_tests {
        use super::*;

        #[test]
        fn applies_default_duration() {
            let c = caster();
            let action = ActionDef {
                status: Some(Status::Shielded),
                effect: EffectKind::ApplyEffect,
                ..bolt(DamageKind::Force)
            };
            let mut dice = ScriptedDice::default();
            let out = resolve_effect(&ctx(&c, &action, false), &c, &mut dice);
            assert_eq!(out.target.stats().statuses.get(&Status::Shielded), Some(&3));
            assert_eq!(
                out.events,
                vec![CombatEvent::StatusApplied {
                    target: c.id(),
                    status: Status::Shielded,
                    turns: 3
                }]
            );
        }
    }

    mod weapon_tests {
        use super::*;

        fn swordsman() -> Entity {
            Entity::from_def(
                EntityId::new(0),
                EntityDef::new("Brom", Side::Player, Tile::ZERO)
                    .with_stats(CombatStats {
                        abilities: AbilityScores {
                            strength: 14,
                            ..AbilityScores::default()
                        },
                        ..CombatStats::default()
                    })
                    .with_equipment(crate::entity::Equipment {
                        weapon: Weapon {
                            name: "mace".into(),
                            damage: Dice::new(1, 6),
                            kind: DamageKind::Bludgeoning,
                            ..Weapon::unarmed()
                        },
                        ..Default::default()
                    }),
            )
        }

        #[test]
        fn mundane_immune_target_takes_nothing() {
            let ghost = entity(
                1,
                Side::Enemy,
                CombatStats {
                    hp: 9,
                    max_hp: 9,
                    immunities: DamageKinds::MUNDANE_PHYSICAL,
                    ..CombatStats::default()
                },
            );
            let mut dice = ScriptedDice::new([18, 6]);
            let out = resolve_weapon_attack(&swordsman(), &ghost, Advantage::Normal, &mut dice);
            assert_eq!(out.target.stats().hp, 9);
        }

        #[test]
        fn critical_doubles_weapon_dice() {
            let target = entity(
                1,
                Side::Enemy,
                CombatStats {
                    hp: 30,
                    max_hp: 30,
                    ..CombatStats::default()
                },
            );
            // nat 20, 2d6 = 3 + 4, +2 str
            let mut dice = ScriptedDice::new([20, 3, 4]);
            let out = resolve_weapon_attack(&swordsman(), &target, Advantage::Normal, &mut dice);
            assert_eq!(out.target.stats().hp, 21);
            assert!(out.line.contains("Critical"));
        }
    }
}
