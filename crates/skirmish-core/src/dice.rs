//! Dice notation and the randomness seam.
//!
//! All combat randomness flows through [`DiceSource`]. Production code uses
//! [`SeededDice`], a ChaCha-backed source; tests script exact rolls.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A pool of identical dice, written `NdM` (e.g. `2d6`).
///
/// # Example
///
/// ```
/// use skirmish_core::dice::Dice;
///
/// let dice: Dice = "3d8".parse().unwrap();
/// assert_eq!(dice, Dice::new(3, 8));
/// assert_eq!(dice.to_string(), "3d8");
/// assert_eq!(dice.max(), 24);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dice {
    /// Number of dice
    pub count: u32,
    /// Faces per die
    pub sides: u32,
}

impl Dice {
    /// A single d20.
    pub const D20: Self = Self::new(1, 20);

    /// Creates a dice pool.
    #[must_use]
    pub const fn new(count: u32, sides: u32) -> Self {
        Self { count, sides }
    }

    /// The same pool with its dice count doubled (critical hits).
    #[must_use]
    pub const fn doubled(self) -> Self {
        Self::new(self.count.saturating_mul(2), self.sides)
    }

    /// Highest possible total.
    #[must_use]
    pub const fn max(self) -> u32 {
        self.count.saturating_mul(self.sides)
    }

    /// Rolls every die and sums them, saturating at `u32::MAX`.
    pub fn roll(self, dice: &mut dyn DiceSource) -> u32 {
        (0..self.count).fold(0, |total, _| total.saturating_add(dice.roll_die(self.sides)))
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// Error parsing dice notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid dice notation `{0}` (expected NdM)")]
pub struct DiceParseError(String);

impl FromStr for Dice {
    type Err = DiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DiceParseError(s.to_string());
        let (count, sides) = s.trim().split_once(['d', 'D']).ok_or_else(err)?;
        let count = if count.is_empty() {
            1
        } else {
            count.parse().map_err(|_| err())?
        };
        let sides: u32 = sides.parse().map_err(|_| err())?;
        if sides == 0 {
            return Err(err());
        }
        Ok(Self::new(count, sides))
    }
}

impl TryFrom<String> for Dice {
    type Error = DiceParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Dice> for String {
    fn from(dice: Dice) -> Self {
        dice.to_string()
    }
}

/// Source of random outcomes for combat resolution.
pub trait DiceSource {
    /// Rolls one die with `sides` faces, returning a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Returns true with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
}

/// ChaCha-backed dice, reproducible from a seed.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    /// Dice seeded deterministically.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Dice seeded from system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl DiceSource for SeededDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides.max(1))
    }

    fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }
}

/// Dice that replay a fixed script, for tests.
///
/// Die rolls are taken from the front of `rolls` (clamped to the die size);
/// when exhausted every die shows 1. `chance` consumes from `coins`,
/// defaulting to failure.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: std::collections::VecDeque<u32>,
    coins: std::collections::VecDeque<bool>,
}

#[cfg(test)]
impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            coins: std::collections::VecDeque::new(),
        }
    }

    pub fn with_coins(mut self, coins: impl IntoIterator<Item = bool>) -> Self {
        self.coins = coins.into_iter().collect();
        self
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

#[cfg(test)]
impl DiceSource for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rolls.pop_front().unwrap_or(1).clamp(1, sides.max(1))
    }

    fn chance(&mut self, _p: f64) -> bool {
        self.coins.pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod notation_tests {
        use super::*;

        #[test]
        fn parses_standard_notation() {
            assert_eq!("2d6".parse::<Dice>(), Ok(Dice::new(2, 6)));
            assert_eq!("1D20".parse::<Dice>(), Ok(Dice::D20));
            assert_eq!("d4".parse::<Dice>(), Ok(Dice::new(1, 4)));
        }

        #[test]
        fn rejects_garbage() {
            assert!("2x6".parse::<Dice>().is_err());
            assert!("2d0".parse::<Dice>().is_err());
            assert!("d".parse::<Dice>().is_err());
        }

        #[test]
        fn serializes_as_string() {
            let json = serde_json::to_string(&Dice::new(4, 10)).unwrap();
            assert_eq!(json, "\"4d10\"");
            let back: Dice = serde_json::from_str(&json).unwrap();
            assert_eq!(back, Dice::new(4, 10));
        }

        #[test]
        fn doubling_keeps_sides() {
            assert_eq!(Dice::new(2, 8).doubled(), Dice::new(4, 8));
        }
    }

    mod source_tests {
        use super::*;

        #[test]
        fn seeded_dice_stay_in_range() {
            let mut dice = SeededDice::new(7);
            for _ in 0..500 {
                let v = dice.roll_die(6);
                assert!((1..=6).contains(&v));
            }
        }

        #[test]
        fn same_seed_same_rolls() {
            let mut a = SeededDice::new(42);
            let mut b = SeededDice::new(42);
            let ra: Vec<u32> = (0..20).map(|_| a.roll_die(20)).collect();
            let rb: Vec<u32> = (0..20).map(|_| b.roll_die(20)).collect();
            assert_eq!(ra, rb);
        }

        #[test]
        fn pool_sums_scripted_rolls() {
            let mut dice = ScriptedDice::new([3, 5, 6]);
            assert_eq!(Dice::new(3, 6).roll(&mut dice), 14);
            assert_eq!(dice.remaining(), 0);
        }

        #[test]
        fn huge_pools_saturate() {
            let huge = Dice::new(u32::MAX, u32::MAX);
            assert_eq!(huge.max(), u32::MAX);
            assert_eq!(huge.doubled(), Dice::new(u32::MAX, u32::MAX));

            let mut dice = ScriptedDice::new([u32::MAX, u32::MAX]);
            assert_eq!(Dice::new(2, u32::MAX).roll(&mut dice), u32::MAX);
        }
    }
}
