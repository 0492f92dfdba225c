//! Cross-module battle tests.
//!
//! - `scenarios.rs`: the reference combat scenarios, end to end through a
//!   session with scripted dice
//! - `integration.rs`: whole battles, termination, AI faults, statuses
//! - `helpers.rs`: roster and session builders

mod helpers;

pub use helpers::*;
