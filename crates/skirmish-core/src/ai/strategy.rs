//! The four behavior strategies.

use skirmish_grid::{chebyshev, has_line_of_sight};

use super::movement::{approach, in_range, nearest_foe};
use super::{ActionSink, AiContext};
use crate::content::{ActionDef, ActionId, EffectKind};
use crate::error::AiError;

/// First known spell of `kind` the actor can pay for right now.
fn ready_spell<'a>(ctx: &AiContext<'a>, kind: EffectKind) -> Option<(&'a ActionId, &'a ActionDef)> {
    let stats = ctx.actor.stats();
    stats.spells.iter().find_map(|id| {
        let def = ctx.catalog.action(id)?;
        (def.effect == kind && def.check_affordable(id, stats).is_ok()).then_some((id, def))
    })
}

/// Closes on the nearest foe and hits it.
pub(super) fn melee(ctx: &AiContext<'_>, sink: &mut dyn ActionSink) -> Result<(), AiError> {
    let me = ctx.actor;
    let Some(foe) = nearest_foe(ctx, me.position()) else {
        sink.log(format!("{} looks for a fight.", me.name()));
        return Ok(());
    };
    let reach = me.equipment().weapon.range;
    let pos = approach(ctx, sink, me.position(), foe.position(), reach)?;
    if in_range(pos, foe.position(), reach) {
        sink.attack(foe.id())?;
    } else {
        sink.log(format!("{} cannot reach {}.", me.name(), foe.name()));
    }
    Ok(())
}

/// Holds just inside weapon range and shoots; never retreats.
pub(super) fn ranged(ctx: &AiContext<'_>, sink: &mut dyn ActionSink) -> Result<(), AiError> {
    let me = ctx.actor;
    let Some(foe) = nearest_foe(ctx, me.position()) else {
        sink.log(format!("{} scans for targets.", me.name()));
        return Ok(());
    };
    let range = me.equipment().weapon.range;
    if in_range(me.position(), foe.position(), range) {
        sink.attack(foe.id())?;
        return Ok(());
    }

    let preferred = range.saturating_sub(1).max(1);
    let pos = approach(ctx, sink, me.position(), foe.position(), preferred)?;
    if in_range(pos, foe.position(), range) {
        sink.attack(foe.id())?;
    } else {
        sink.log(format!("{} has no shot at {}.", me.name(), foe.name()));
    }
    Ok(())
}

/// Heals the most wounded ally below the threshold; otherwise casts.
pub(super) fn healer(ctx: &AiContext<'_>, sink: &mut dyn ActionSink) -> Result<(), AiError> {
    let me = ctx.actor;
    let patient = ctx
        .arena
        .living_on(me.side())
        .filter(|e| e.stats().hp_fraction() < ctx.healer_threshold)
        .min_by_key(|e| (e.stats().hp, e.id()));

    let (Some(patient), Some((spell_id, spell))) = (patient, ready_spell(ctx, EffectKind::Heal))
    else {
        return spellcaster(ctx, sink);
    };

    let pos = approach(ctx, sink, me.position(), patient.position(), spell.range)?;
    if in_range(pos, patient.position(), spell.range) {
        sink.cast(spell_id, patient.position())?;
    } else {
        sink.log(format!("{} hurries toward {}.", me.name(), patient.name()));
    }
    Ok(())
}

/// Blasts the nearest foe with a damage spell; melee once out of spells.
pub(super) fn spellcaster(ctx: &AiContext<'_>, sink: &mut dyn ActionSink) -> Result<(), AiError> {
    let me = ctx.actor;
    let Some(foe) = nearest_foe(ctx, me.position()) else {
        sink.log(format!("{} lowers their hands.", me.name()));
        return Ok(());
    };
    let Some((spell_id, spell)) = ready_spell(ctx, EffectKind::Damage) else {
        return melee(ctx, sink);
    };

    let clear_shot = |from| {
        in_range(from, foe.position(), spell.range)
            && (spell.area.is_some() || has_line_of_sight(ctx.grid, from, foe.position()))
    };

    let pos = if clear_shot(me.position()) {
        me.position()
    } else {
        approach(ctx, sink, me.position(), foe.position(), spell.range)?
    };

    if clear_shot(pos) {
        sink.cast(spell_id, foe.position())?;
    } else {
        sink.log(format!(
            "{} has no clear line to {} ({} tiles).",
            me.name(),
            foe.name(),
            chebyshev(pos, foe.position())
        ));
    }
    Ok(())
}
