//! Rules engine trait and game results.
//!
//! The simulation loop only talks to the rules through `RulesEngine`:
//! - Whether an action is legal
//! - How an action transforms the state
//! - How a forfeited turn advances play
//! - Who won

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{GameAction, GameState, PlayerId};

use super::error::RuleViolation;

/// How an outright winner was decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WinMargin {
    /// Strictly higher score.
    Points,
    /// Equal score, fewer purchased cards.
    TieBreaker,
}

/// Result of a completed game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner { player: PlayerId, margin: WinMargin },
    /// Draw (no winner).
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameResult::Winner { player: p, .. } if *p == player)
    }

    /// The winning seat, if any.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            GameResult::Winner { player, .. } => Some(*player),
            GameResult::Draw => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Winner {
                player,
                margin: WinMargin::Points,
            } => write!(f, "{player} won on points."),
            GameResult::Winner {
                player,
                margin: WinMargin::TieBreaker,
            } => write!(f, "{player} won on tie-breaker (fewer cards)."),
            GameResult::Draw => f.write_str("It's a draw!"),
        }
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `validate` must not change anything
/// - `apply` consumes the state and returns its successor; it re-checks
///   legality, so an unvalidated action can never corrupt a state
/// - `finalize_turn` runs after every applied action
/// - `forfeit_turn` advances play exactly like the rotation step of
///   `finalize_turn`, with no action applied
/// - `result` returns `None` while the game continues
pub trait RulesEngine {
    /// Check an action against the current state.
    fn validate(&self, state: &GameState, action: &GameAction) -> Result<(), RuleViolation>;

    /// Apply a legal action, then finalize the turn.
    fn apply(&self, state: GameState, action: &GameAction) -> Result<GameState, RuleViolation>;

    /// Post-action bookkeeping: noble visit, end trigger, rotation, official end.
    fn finalize_turn(&self, state: GameState) -> GameState;

    /// Skip the current player's turn.
    fn forfeit_turn(&self, state: GameState) -> GameState;

    /// The result of a finished game.
    fn result(&self, state: &GameState) -> Option<GameResult>;
}
