//! Battle outputs: structured events, the player-facing log, and the final
//! outcome handed to the overworld.
//!
//! Events are display records. The authoritative state is always the
//! entity records in the arena; nothing reads events back to decide rules.

use std::fmt;

use serde::{Deserialize, Serialize};
use skirmish_grid::Tile;

use crate::content::ActionId;
use crate::entity::{EntityId, Status};

// =============================================================================
// Outcome
// =============================================================================

/// What the party earns for a victory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    /// Experience
    pub xp: u32,
    /// Gold pieces
    pub gold: u32,
    /// Item names
    pub items: Vec<String>,
}

/// How a battle ended. Exactly one is emitted per battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattleOutcome {
    /// Every enemy is down
    Victory(Rewards),
    /// Every party member is down
    Defeat,
    /// The party escaped
    Fled,
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Victory(r) => write!(f, "victory ({} xp, {} gold, {} items)", r.xp, r.gold, r.items.len()),
            Self::Defeat => write!(f, "defeat"),
            Self::Fled => write!(f, "fled"),
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// Display category of a number popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupKind {
    /// Red
    Damage,
    /// Green
    Heal,
    /// Grey "miss"
    Miss,
    /// Damage fully absorbed by immunity
    Immune,
}

/// A floating number over a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Who the number floats over
    pub target: EntityId,
    /// Amount shown
    pub amount: u32,
    /// Colour category
    pub kind: PopupKind,
    /// Critical hit flourish
    pub crit: bool,
}

/// Something that happened during the battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    /// Initiative rolled.
    BattleStarted {
        /// Turn order, first to act first
        order: Vec<EntityId>,
    },
    /// A combatant's turn began.
    TurnStarted {
        /// Active entity
        entity: EntityId,
        /// Round number, starting at 1
        round: u32,
    },
    /// A combatant walked.
    Moved {
        /// Mover
        entity: EntityId,
        /// Start tile
        from: Tile,
        /// End tile
        to: Tile,
    },
    /// A weapon or spell attack was rolled.
    AttackRolled {
        /// Attacker
        attacker: EntityId,
        /// Target
        target: EntityId,
        /// Kept die
        natural: u32,
        /// Total with bonuses
        total: i32,
        /// Target AC
        armor_class: i32,
        /// Whether it landed
        hit: bool,
    },
    /// A number popup.
    Popup(DamageEvent),
    /// A spell or skill was used.
    ActionUsed {
        /// User
        actor: EntityId,
        /// Action
        action: ActionId,
        /// Target tile
        at: Tile,
    },
    /// A status was applied or refreshed.
    StatusApplied {
        /// Bearer
        target: EntityId,
        /// Status
        status: Status,
        /// Duration
        turns: u32,
    },
    /// A status ran out.
    StatusExpired {
        /// Former bearer
        entity: EntityId,
        /// Status
        status: Status,
    },
    /// A combatant dropped to 0 hp.
    Died {
        /// The fallen
        entity: EntityId,
    },
    /// A request was refused.
    Rejected {
        /// Requester
        actor: EntityId,
        /// Why
        reason: String,
    },
    /// A flee check was rolled.
    FleeAttempted {
        /// Whether the party got away
        success: bool,
    },
    /// An AI strategy faulted; the turn passed.
    AiFault {
        /// Entity whose strategy failed
        entity: EntityId,
        /// Fault description
        message: String,
    },
    /// The battle ended.
    BattleEnded(BattleOutcome),
}

// =============================================================================
// Log
// =============================================================================

/// Player-facing battle log: human-readable lines plus the structured events
/// they describe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatLog {
    lines: Vec<String>,
    events: Vec<CombatEvent>,
}

impl CombatLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line.
    pub fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    /// Appends an event.
    pub fn event(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    /// Appends a batch of events in order.
    pub fn extend_events(&mut self, events: impl IntoIterator<Item = CombatEvent>) {
        self.events.extend(events);
    }

    /// Appends everything from `other`.
    pub fn extend(&mut self, other: Self) {
        self.lines.extend(other.lines);
        self.events.extend(other.events);
    }

    /// All lines so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All events so far.
    #[must_use]
    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// The most recent line.
    #[must_use]
    pub fn last_line(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    /// Returns true if any line contains `needle`.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_collects_lines_and_events() {
        let mut log = CombatLog::new();
        log.line("Aria attacks!");
        log.event(CombatEvent::Died {
            entity: EntityId::new(2),
        });
        assert_eq!(log.last_line(), Some("Aria attacks!"));
        assert!(log.mentions("attacks"));
        assert_eq!(log.events().len(), 1);

        let mut other = CombatLog::new();
        other.line("more");
        log.extend(other);
        assert_eq!(log.lines().len(), 2);
    }

    #[test]
    fn event_batches_keep_their_order() {
        let mut log = CombatLog::new();
        log.event(CombatEvent::FleeAttempted { success: false });
        log.extend_events(vec![
            CombatEvent::Died {
                entity: EntityId::new(4),
            },
            CombatEvent::FleeAttempted { success: true },
        ]);
        assert_eq!(
            log.events(),
            &[
                CombatEvent::FleeAttempted { success: false },
                CombatEvent::Died {
                    entity: EntityId::new(4),
                },
                CombatEvent::FleeAttempted { success: true },
            ]
        );
        assert!(log.lines().is_empty());
    }

    #[test]
    fn outcome_serializes_tagged() {
        let victory = BattleOutcome::Victory(Rewards {
            xp: 100,
            gold: 5,
            items: vec!["dagger".into()],
        });
        let json = serde_json::to_value(&victory).unwrap();
        assert_eq!(json["result"], "VICTORY");
        assert_eq!(json["xp"], 100);
        let back: BattleOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, victory);
        assert_eq!(BattleOutcome::Fled.to_string(), "fled");
    }
}
