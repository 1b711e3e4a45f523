//! Event log record kinds.
//!
//! Each record serializes to one self-describing JSON object whose `event`
//! field names the kind (`GAME_STARTED`, `TURN_STARTED`, ...). Field names
//! are part of the log format and must stay stable.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::{GameAction, GameState};

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One line of the event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    GameStarted {
        timestamp_ms: u64,
        game_id: String,
        /// Model identifier per seat.
        models: Vec<String>,
        initial_state: GameState,
    },
    TurnStarted {
        timestamp_ms: u64,
        turn: u32,
        player_index: usize,
        game_state: GameState,
    },
    Reasoning {
        timestamp_ms: u64,
        player_index: usize,
        reasoning: String,
    },
    /// `action` is absent for a forfeited turn.
    Action {
        timestamp_ms: u64,
        player_index: usize,
        action: Option<GameAction>,
        success: bool,
    },
    Retry {
        timestamp_ms: u64,
        player_index: usize,
        attempt: u32,
        error: String,
    },
    GameEnded {
        timestamp_ms: u64,
        winner_index: Option<usize>,
        winner_reason: Option<String>,
        /// Score per seat.
        final_scores: Vec<u32>,
    },
}

impl GameEvent {
    #[must_use]
    pub fn game_started(game_id: impl Into<String>, models: Vec<String>, state: &GameState) -> Self {
        GameEvent::GameStarted {
            timestamp_ms: now_ms(),
            game_id: game_id.into(),
            models,
            initial_state: state.clone(),
        }
    }

    #[must_use]
    pub fn turn_started(state: &GameState) -> Self {
        GameEvent::TurnStarted {
            timestamp_ms: now_ms(),
            turn: state.turn,
            player_index: state.current_player.index(),
            game_state: state.clone(),
        }
    }

    #[must_use]
    pub fn reasoning(player_index: usize, reasoning: impl Into<String>) -> Self {
        GameEvent::Reasoning {
            timestamp_ms: now_ms(),
            player_index,
            reasoning: reasoning.into(),
        }
    }

    #[must_use]
    pub fn action(player_index: usize, action: Option<GameAction>, success: bool) -> Self {
        GameEvent::Action {
            timestamp_ms: now_ms(),
            player_index,
            action,
            success,
        }
    }

    #[must_use]
    pub fn retry(player_index: usize, attempt: u32, error: impl Into<String>) -> Self {
        GameEvent::Retry {
            timestamp_ms: now_ms(),
            player_index,
            attempt,
            error: error.into(),
        }
    }

    #[must_use]
    pub fn game_ended(
        winner_index: Option<usize>,
        winner_reason: Option<String>,
        final_scores: Vec<u32>,
    ) -> Self {
        GameEvent::GameEnded {
            timestamp_ms: now_ms(),
            winner_index,
            winner_reason,
            final_scores,
        }
    }

    /// Record kind as written in the `event` field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            GameEvent::GameStarted { .. } => "GAME_STARTED",
            GameEvent::TurnStarted { .. } => "TURN_STARTED",
            GameEvent::Reasoning { .. } => "REASONING",
            GameEvent::Action { .. } => "ACTION",
            GameEvent::Retry { .. } => "RETRY",
            GameEvent::GameEnded { .. } => "GAME_ENDED",
        }
    }

    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        match self {
            GameEvent::GameStarted { timestamp_ms, .. }
            | GameEvent::TurnStarted { timestamp_ms, .. }
            | GameEvent::Reasoning { timestamp_ms, .. }
            | GameEvent::Action { timestamp_ms, .. }
            | GameEvent::Retry { timestamp_ms, .. }
            | GameEvent::GameEnded { timestamp_ms, .. } => *timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;

    #[test]
    fn test_action_record_format() {
        let event = GameEvent::Action {
            timestamp_ms: 5,
            player_index: 1,
            action: Some(GameAction::take_two(Color::Red)),
            success: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"event":"ACTION","timestamp_ms":5,"player_index":1,"action":{"type":"TAKE_TOKENS","tokens":{"RED":2}},"success":true}"#
        );
    }

    #[test]
    fn test_forfeit_record_has_null_action() {
        let event = GameEvent::action(0, None, false);
        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "ACTION");
        assert!(value["action"].is_null());
        assert_eq!(value["success"], false);
    }

    #[test]
    fn test_game_ended_round_trip() {
        let event = GameEvent::game_ended(None, Some("It's a draw!".into()), vec![15, 15]);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""winner_index":null"#));
        assert!(json.contains(r#""final_scores":[15,15]"#));

        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.kind(), "GAME_ENDED");
    }

    #[test]
    fn test_timestamps_are_recent() {
        let event = GameEvent::retry(0, 2, "boom");
        assert!(event.timestamp_ms() > 1_600_000_000_000);
    }
}
