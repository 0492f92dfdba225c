//! Battle tuning knobs.

use serde::{Deserialize, Serialize};

/// Settings for one battle. Every field has a default, so partial JSON
/// objects are valid.
///
/// # Example
///
/// ```
/// use skirmish_core::config::BattleConfig;
///
/// let config: BattleConfig = serde_json::from_str(r#"{ "seed": 7 }"#).unwrap();
/// assert_eq!(config.seed, Some(7));
/// assert!((config.flee_chance - 0.5).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BattleConfig {
    /// Probability that a flee attempt succeeds.
    pub flee_chance: f64,
    /// Turns a status lasts when applied by an action.
    pub status_duration: u32,
    /// Allies below this hp fraction draw a healer's attention.
    pub healer_threshold: f64,
    /// Dice seed; entropy when absent.
    pub seed: Option<u64>,
    /// Let the AI play the party too (players need a behavior tag).
    pub autopilot_players: bool,
    /// Most automatic turns a single `advance` call will run.
    pub max_auto_turns: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            flee_chance: 0.5,
            status_duration: 3,
            healer_threshold: 0.6,
            seed: None,
            autopilot_players: false,
            max_auto_turns: 200,
        }
    }
}

impl BattleConfig {
    /// Same config with a fixed dice seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Same config with the party on autopilot.
    #[must_use]
    pub const fn with_autopilot(mut self) -> Self {
        self.autopilot_players = true;
        self
    }
}
