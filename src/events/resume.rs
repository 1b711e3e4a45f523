//! Rebuild a resumable game from its event log.
//!
//! One sequential pass. The preferred resume point is the `TURN_STARTED`
//! snapshot that directly follows the last successful `ACTION`: that state
//! already includes the action. When the log stops between a successful
//! action and the next turn record, the last `TURN_STARTED` seen is used
//! instead and that turn is replayed.
//!
//! A malformed final line is treated as a torn write and ignored; a
//! malformed line anywhere else is an error.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::GameState;

use super::record::GameEvent;

/// Resume failures. All are fatal for the resume attempt.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    #[error("cannot read game log: {0}")]
    Io(#[from] io::Error),
    #[error("malformed record on line {line}: {message}")]
    MalformedRecord { line: usize, message: String },
    #[error("game log has no GAME_STARTED record")]
    NoStartRecord,
    #[error("game log has no TURN_STARTED record to resume from")]
    NoTurnRecord,
}

/// Which snapshot the resume point came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResumeSource {
    /// The turn record following the last successful action.
    AfterSuccessfulAction,
    /// The last turn record in the log; that turn is replayed.
    LastTurnStarted,
}

/// Everything needed to continue a logged game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResumePoint {
    pub game_id: String,
    /// Model identifier per seat.
    pub models: Vec<String>,
    pub state: GameState,
    pub source: ResumeSource,
}

impl ResumePoint {
    /// Id for the continuation log: `{original}_resumed_{unix_seconds}`.
    #[must_use]
    pub fn resumed_game_id(&self) -> String {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.resumed_game_id_at(secs)
    }

    #[must_use]
    pub fn resumed_game_id_at(&self, unix_seconds: u64) -> String {
        format!("{}_resumed_{unix_seconds}", self.game_id)
    }
}

/// Reconstruct from a log file.
pub fn reconstruct(path: &Path) -> Result<ResumePoint, ReconstructionError> {
    let file = File::open(path)?;
    info!(path = %path.display(), "reconstructing game from log");
    reconstruct_from_reader(BufReader::new(file))
}

/// Reconstruct from any line source.
pub fn reconstruct_from_reader<R: BufRead>(reader: R) -> Result<ResumePoint, ReconstructionError> {
    let mut start: Option<(String, Vec<String>)> = None;
    let mut after_success: Option<GameState> = None;
    let mut last_turn: Option<GameState> = None;
    let mut action_succeeded = false;
    let mut torn_line: Option<(usize, String)> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        // A bad line followed by more records is real corruption.
        if let Some((line, message)) = torn_line.take() {
            return Err(ReconstructionError::MalformedRecord { line, message });
        }

        let event: GameEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(err) => {
                torn_line = Some((line_no, err.to_string()));
                continue;
            }
        };

        match event {
            GameEvent::GameStarted {
                game_id, models, ..
            } => {
                debug!(%game_id, ?models, "found game start");
                start = Some((game_id, models));
            }
            GameEvent::TurnStarted {
                turn,
                player_index,
                game_state,
                ..
            } => {
                debug!(turn, player_index, "found turn start");
                if game_state.current_player.index() >= game_state.players.player_count() {
                    return Err(ReconstructionError::MalformedRecord {
                        line: line_no,
                        message: format!(
                            "{} is not seated in a {}-player game",
                            game_state.current_player,
                            game_state.players.player_count()
                        ),
                    });
                }
                if action_succeeded {
                    after_success = Some(game_state.clone());
                    action_succeeded = false;
                }
                last_turn = Some(game_state);
            }
            GameEvent::Action { success: true, .. } => action_succeeded = true,
            GameEvent::Action { .. }
            | GameEvent::Reasoning { .. }
            | GameEvent::Retry { .. }
            | GameEvent::GameEnded { .. } => {}
        }
    }

    if let Some((line, message)) = torn_line {
        warn!(line, %message, "ignoring truncated final record");
    }

    let (game_id, models) = start.ok_or(ReconstructionError::NoStartRecord)?;
    let (state, source) = match (after_success, last_turn) {
        (Some(state), _) => (state, ResumeSource::AfterSuccessfulAction),
        (None, Some(state)) => (state, ResumeSource::LastTurnStarted),
        (None, None) => return Err(ReconstructionError::NoTurnRecord),
    };

    info!(
        turn = state.turn,
        player = %state.current_player,
        ?source,
        "resume point found"
    );
    Ok(ResumePoint {
        game_id,
        models,
        state,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::setup_game;
    use crate::core::{GameRng, PlayerId};

    fn lines(events: &[GameEvent]) -> String {
        events
            .iter()
            .map(|e| serde_json::to_string(e).unwrap() + "\n")
            .collect()
    }

    fn start(state: &GameState) -> GameEvent {
        GameEvent::game_started("g1", vec!["m0".into(), "m1".into()], state)
    }

    #[test]
    fn test_requires_start_record() {
        let state = setup_game(&GameRng::new(1)).unwrap();
        let log = lines(&[GameEvent::turn_started(&state)]);

        let err = reconstruct_from_reader(log.as_bytes()).unwrap_err();
        assert!(matches!(err, ReconstructionError::NoStartRecord));
    }

    #[test]
    fn test_requires_turn_record() {
        let state = setup_game(&GameRng::new(1)).unwrap();
        let log = lines(&[start(&state)]);

        let err = reconstruct_from_reader(log.as_bytes()).unwrap_err();
        assert!(matches!(err, ReconstructionError::NoTurnRecord));
    }

    #[test]
    fn test_torn_tail_is_ignored() {
        let state = setup_game(&GameRng::new(1)).unwrap();
        let mut log = lines(&[start(&state), GameEvent::turn_started(&state)]);
        log.push_str(r#"{"event":"REASONING","timestamp_ms":1,"player_"#);

        let point = reconstruct_from_reader(log.as_bytes()).unwrap();
        assert_eq!(point.source, ResumeSource::LastTurnStarted);
        assert_eq!(point.models, vec!["m0", "m1"]);
        assert_eq!(point.game_id, "g1");
        assert_eq!(point.resumed_game_id_at(1_700_000_000), "g1_resumed_1700000000");
        assert!(point.resumed_game_id().starts_with("g1_resumed_"));
    }

    #[test]
    fn test_corrupt_middle_line_is_error() {
        let state = setup_game(&GameRng::new(1)).unwrap();
        let mut log = lines(&[start(&state)]);
        log.push_str("not json\n");
        log.push_str(&lines(&[GameEvent::turn_started(&state)]));

        let err = reconstruct_from_reader(log.as_bytes()).unwrap_err();
        assert!(matches!(err, ReconstructionError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let state = setup_game(&GameRng::new(1)).unwrap();
        let log = format!(
            "\n{}\n\n{}",
            serde_json::to_string(&start(&state)).unwrap(),
            serde_json::to_string(&GameEvent::turn_started(&state)).unwrap()
        );
        assert!(reconstruct_from_reader(log.as_bytes()).is_ok());
    }

    #[test]
    fn test_unseated_player_to_move_is_error() {
        let state = setup_game(&GameRng::new(1)).unwrap();
        let mut bad = state.clone();
        bad.current_player = PlayerId::new(5);
        let log = lines(&[start(&state), GameEvent::turn_started(&bad)]);

        let err = reconstruct_from_reader(log.as_bytes()).unwrap_err();
        assert!(matches!(err, ReconstructionError::MalformedRecord { line: 2, .. }));
        assert!(err.to_string().contains("Player 5 is not seated in a 2-player game"));
    }
}
