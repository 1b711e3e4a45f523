//! Resuming games from event log files.

use std::fs;

use tempfile::tempdir;

use ai_splendor::core::{Color, GameAction, GameRng, GameState, PlayerId};
use ai_splendor::events::{reconstruct, EventLog, GameEvent, ReconstructionError, ResumeSource};
use ai_splendor::provider::{MoveProvider, ScriptedProvider};
use ai_splendor::rules::{RulesEngine, SplendorRules};
use ai_splendor::setup_game;
use ai_splendor::sim::{SimulationLoop, SimulationOptions};

fn models() -> Vec<String> {
    vec!["model-a".to_string(), "model-b".to_string()]
}

fn opening() -> (GameState, GameAction, GameState) {
    let state = setup_game(&GameRng::new(7)).unwrap();
    let action = GameAction::take([Color::Red, Color::Green, Color::Blue]);
    let after = SplendorRules::new().apply(state.clone(), &action).unwrap();
    (state, action, after)
}

#[test]
fn test_resume_after_successful_action() {
    let dir = tempdir().unwrap();
    let (state, action, after) = opening();

    let mut log = EventLog::create(dir.path(), "g42").unwrap();
    log.append(&GameEvent::game_started("g42", models(), &state)).unwrap();
    log.append(&GameEvent::turn_started(&state)).unwrap();
    log.append(&GameEvent::reasoning(0, "three colors")).unwrap();
    log.append(&GameEvent::action(0, Some(action), true)).unwrap();
    log.append(&GameEvent::turn_started(&after)).unwrap();
    drop(log);

    let point = reconstruct(&dir.path().join("g42.json")).unwrap();
    assert_eq!(point.game_id, "g42");
    assert_eq!(point.models, models());
    assert_eq!(point.source, ResumeSource::AfterSuccessfulAction);
    assert_eq!(point.state, after);
    assert_eq!(point.state.current_player, PlayerId::new(1));
    assert_eq!(point.state.turn, 1);
}

#[test]
fn test_resume_replays_unfinished_turn() {
    let dir = tempdir().unwrap();
    let (state, _, _) = opening();

    let mut log = EventLog::create(dir.path(), "g43").unwrap();
    log.append(&GameEvent::game_started("g43", models(), &state)).unwrap();
    log.append(&GameEvent::turn_started(&state)).unwrap();
    drop(log);

    let point = reconstruct(&dir.path().join("g43.json")).unwrap();
    assert_eq!(point.source, ResumeSource::LastTurnStarted);
    assert_eq!(point.state, state);
    assert_eq!(point.state.current_player, PlayerId::new(0));
}

#[test]
fn test_action_without_following_turn_replays_last_turn() {
    let dir = tempdir().unwrap();
    let (state, action, _) = opening();

    let mut log = EventLog::create(dir.path(), "g44").unwrap();
    log.append(&GameEvent::game_started("g44", models(), &state)).unwrap();
    log.append(&GameEvent::turn_started(&state)).unwrap();
    log.append(&GameEvent::action(0, Some(action), true)).unwrap();
    drop(log);

    let point = reconstruct(&dir.path().join("g44.json")).unwrap();
    assert_eq!(point.source, ResumeSource::LastTurnStarted);
    assert_eq!(point.state, state);
}

#[test]
fn test_missing_records_are_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.json");
    fs::write(&path, "").unwrap();
    assert!(matches!(reconstruct(&path), Err(ReconstructionError::NoStartRecord)));

    assert!(matches!(
        reconstruct(&dir.path().join("absent.json")),
        Err(ReconstructionError::Io(_))
    ));
}

fn scripted(first: GameAction, second: GameAction) -> Vec<Box<dyn MoveProvider>> {
    vec![
        Box::new(ScriptedProvider::new("model-a").then_move("a", first)),
        Box::new(ScriptedProvider::new("model-b").then_move("b", second)),
    ]
}

#[test]
fn test_resume_continues_logged_game_in_new_file() {
    let dir = tempdir().unwrap();
    let state = setup_game(&GameRng::new(12)).unwrap();

    // Round 1 is played; round 2 is all forfeits before the round limit.
    let log = EventLog::create(dir.path(), "orig").unwrap();
    let providers = scripted(
        GameAction::take([Color::Red, Color::Green, Color::Blue]),
        GameAction::take([Color::White, Color::Black, Color::Red]),
    );
    let mut sim = SimulationLoop::new(SplendorRules::new(), providers, log)
        .with_options(SimulationOptions::default().with_max_rounds(2));
    let outcome = sim.run("orig", state).unwrap();
    assert_eq!(outcome.forfeited_turns, 2);
    drop(sim);

    let original_path = dir.path().join("orig.json");
    let original_bytes = fs::read(&original_path).unwrap();
    let point = reconstruct(&original_path).unwrap();
    assert_eq!(point.source, ResumeSource::AfterSuccessfulAction);
    assert_eq!(point.state.turn, 2);
    assert_eq!(point.state.current_player, PlayerId::new(0));
    for seat in [0, 1] {
        let player = &point.state.players[PlayerId::new(seat)];
        assert_eq!(player.tokens.total(), 3);
        assert_eq!(player.reasoning_history.len(), 1);
    }

    let resumed_id = point.resumed_game_id_at(1_700_000_000);
    assert_eq!(resumed_id, "orig_resumed_1700000000");
    let log = EventLog::create(dir.path(), &resumed_id).unwrap();
    let providers = scripted(
        GameAction::take([Color::White, Color::Green, Color::Blue]),
        GameAction::take([Color::Red, Color::Black, Color::Green]),
    );
    let mut sim = SimulationLoop::new(SplendorRules::new(), providers, log)
        .with_options(SimulationOptions::default().with_max_rounds(1));
    let outcome = sim.run(&resumed_id, point.state.clone()).unwrap();
    assert_eq!(outcome.final_state.turn, 3);
    assert_eq!(outcome.forfeited_turns, 0);
    drop(sim);

    assert_eq!(fs::read(&original_path).unwrap(), original_bytes);
    let resumed = reconstruct(&dir.path().join(format!("{resumed_id}.json"))).unwrap();
    assert_eq!(resumed.game_id, resumed_id);
    assert_eq!(resumed.models, models());
    assert!(EventLog::create(dir.path(), "orig").is_err());
}
