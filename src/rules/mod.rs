//! Rules of play.
//!
//! `RulesEngine` is the seam the simulation loop drives; `SplendorRules`
//! implements the standard game. Every illegal action is reported as a
//! `RuleViolation`.

pub mod engine;
pub mod error;
pub mod splendor;

pub use engine::{GameResult, RulesEngine, WinMargin};
pub use error::RuleViolation;
pub use splendor::{payment, rank, SplendorRules, DOUBLE_TAKE_MIN_BANK, MAX_TOKENS, WINNING_SCORE};
