//! Presentation pacing for resolved actions.
//!
//! Resolution is instant: by the time a step lands here the arena already
//! holds the outcome. The queue only tells a front end what to animate and
//! how long to wait between frames. The core never sleeps on it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use skirmish_grid::Tile;

use crate::entity::EntityId;

/// Pause after each tile of a walk.
pub const STEP_DELAY_MS: u32 = 150;
/// Flight time of a spell or arrow.
pub const PROJECTILE_DELAY_MS: u32 = 400;
/// Pause on an impact before the next input.
pub const IMPACT_DELAY_MS: u32 = 250;

/// One animation beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PlaybackStep {
    /// Slide an entity one tile.
    StepTo {
        /// Who walks
        entity: EntityId,
        /// Tile reached
        tile: Tile,
        /// Pause afterwards
        delay_ms: u32,
    },
    /// Send a missile from one tile to another.
    Projectile {
        /// Launch tile
        from: Tile,
        /// Landing tile
        to: Tile,
        /// Flight time
        delay_ms: u32,
    },
    /// Flash a tile.
    Impact {
        /// Tile hit
        tile: Tile,
        /// Pause afterwards
        delay_ms: u32,
    },
}

impl PlaybackStep {
    /// How long the front end should wait after this step.
    #[must_use]
    pub const fn delay_ms(&self) -> u32 {
        match self {
            Self::StepTo { delay_ms, .. }
            | Self::Projectile { delay_ms, .. }
            | Self::Impact { delay_ms, .. } => *delay_ms,
        }
    }
}

/// FIFO of steps waiting to be shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackQueue {
    steps: VecDeque<PlaybackStep>,
}

impl PlaybackQueue {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one `StepTo` per tile of `path`.
    pub fn walk(&mut self, entity: EntityId, path: &[Tile]) {
        self.steps.extend(path.iter().map(|&tile| PlaybackStep::StepTo {
            entity,
            tile,
            delay_ms: STEP_DELAY_MS,
        }));
    }

    /// Queues a projectile from `from` to `to` followed by impacts on every
    /// tile in `impacts`.
    pub fn volley(&mut self, from: Tile, to: Tile, impacts: &[Tile]) {
        self.steps.push_back(PlaybackStep::Projectile {
            from,
            to,
            delay_ms: PROJECTILE_DELAY_MS,
        });
        self.steps.extend(impacts.iter().map(|&tile| PlaybackStep::Impact {
            tile,
            delay_ms: IMPACT_DELAY_MS,
        }));
    }

    /// Queues a single impact, for melee blows.
    pub fn strike(&mut self, tile: Tile) {
        self.steps.push_back(PlaybackStep::Impact {
            tile,
            delay_ms: IMPACT_DELAY_MS,
        });
    }

    /// Removes and returns every queued step.
    pub fn drain(&mut self) -> Vec<PlaybackStep> {
        self.steps.drain(..).collect()
    }

    /// Queued step count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total delay of everything queued.
    #[must_use]
    pub fn total_delay_ms(&self) -> u32 {
        self.steps.iter().map(PlaybackStep::delay_ms).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_emits_one_step_per_tile() {
        let mut queue = PlaybackQueue::new();
        let path = [Tile::new(1, 0), Tile::new(2, 0), Tile::new(3, 1)];
        queue.walk(EntityId::new(4), &path);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.total_delay_ms(), 3 * STEP_DELAY_MS);
        let steps = queue.drain();
        assert_eq!(
            steps[2],
            PlaybackStep::StepTo {
                entity: EntityId::new(4),
                tile: Tile::new(3, 1),
                delay_ms: STEP_DELAY_MS,
            }
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn volley_is_projectile_then_impacts() {
        let mut queue = PlaybackQueue::new();
        queue.volley(Tile::ZERO, Tile::new(5, 5), &[Tile::new(5, 5), Tile::new(5, 6)]);
        let steps = queue.drain();
        assert!(matches!(steps[0], PlaybackStep::Projectile { .. }));
        assert_eq!(steps[1..].iter().filter(|s| matches!(s, PlaybackStep::Impact { .. })).count(), 2);
    }

    #[test]
    fn step_serializes_tagged() {
        let json = serde_json::to_value(PlaybackStep::Impact {
            tile: Tile::new(2, 3),
            delay_ms: 10,
        })
        .unwrap();
        assert_eq!(json["step"], "impact");
        assert_eq!(json["delay_ms"], 10);
    }
}
