//! Simulation loop tests with scripted providers.
//!
//! Every test runs against an in-memory event log and inspects the records
//! the loop wrote, in order.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use ai_splendor::core::{Color, GameAction, GameRng, GameState, PlayerId};
use ai_splendor::events::{EventLog, GameEvent};
use ai_splendor::provider::{parse_move, MoveProvider, ProviderError, ScriptedProvider};
use ai_splendor::rules::SplendorRules;
use ai_splendor::setup_game;
use ai_splendor::sim::{ManualClock, RetryPolicy, SimulationLoop, SimulationOptions, TurnGate};

fn fresh() -> GameState {
    setup_game(&GameRng::new(99)).unwrap()
}

fn take(a: Color, b: Color, c: Color) -> GameAction {
    GameAction::take([a, b, c])
}

fn decode(log: &EventLog<Vec<u8>>) -> Vec<GameEvent> {
    std::str::from_utf8(log.get_ref())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn kinds(events: &[GameEvent]) -> Vec<&'static str> {
    events.iter().map(GameEvent::kind).collect()
}

fn one_round(providers: Vec<Box<dyn MoveProvider>>) -> SimulationLoop<SplendorRules, Vec<u8>> {
    SimulationLoop::new(SplendorRules::new(), providers, EventLog::new(Vec::new()))
        .with_options(SimulationOptions::default().with_max_rounds(1))
}

#[test]
fn test_clean_round_record_order() {
    let providers: Vec<Box<dyn MoveProvider>> = vec![
        Box::new(ScriptedProvider::new("m0").then_move("first", take(Color::Red, Color::Blue, Color::Green))),
        Box::new(ScriptedProvider::new("m1").then_move("second", take(Color::White, Color::Black, Color::Red))),
    ];
    let mut sim = one_round(providers);
    let outcome = sim.run("clean", fresh()).unwrap();

    let events = decode(sim.log());
    assert_eq!(
        kinds(&events),
        vec![
            "GAME_STARTED",
            "TURN_STARTED",
            "REASONING",
            "ACTION",
            "TURN_STARTED",
            "REASONING",
            "ACTION",
            "GAME_ENDED",
        ]
    );
    match &events[0] {
        GameEvent::GameStarted { game_id, models, .. } => {
            assert_eq!(game_id, "clean");
            assert_eq!(models, &vec!["m0".to_string(), "m1".to_string()]);
        }
        other => panic!("unexpected first record {other:?}"),
    }
    assert_eq!(outcome.forfeited_turns, 0);
    assert_eq!(outcome.final_state.turn, 2);
    assert_eq!(outcome.final_state.players[PlayerId::new(1)].tokens.total(), 3);
}

#[test]
fn test_rationale_recorded_before_apply() {
    let providers: Vec<Box<dyn MoveProvider>> = vec![
        Box::new(ScriptedProvider::new("m0").then_move("go red", take(Color::Red, Color::Blue, Color::Green))),
        Box::new(ScriptedProvider::new("m1").then_move("go white", take(Color::White, Color::Black, Color::Red))),
    ];
    let mut sim = one_round(providers);
    sim.run("history", fresh()).unwrap();

    let snapshots: Vec<GameState> = decode(sim.log())
        .into_iter()
        .filter_map(|event| match event {
            GameEvent::TurnStarted { game_state, .. } => Some(game_state),
            _ => None,
        })
        .collect();
    let p0 = &snapshots[1].players[PlayerId::new(0)];
    assert_eq!(p0.reasoning_history.iter().collect::<Vec<_>>(), vec!["go red"]);
    assert_eq!(p0.tokens.total(), 3);
}

#[test]
fn test_illegal_move_is_retried_with_error() {
    let p0 = ScriptedProvider::new("m0")
        .then_move("greedy", GameAction::take_two(Color::Gold))
        .then_move("fixed", take(Color::Red, Color::Blue, Color::Green));
    let transcript = p0.transcript();
    let providers: Vec<Box<dyn MoveProvider>> = vec![
        Box::new(p0),
        Box::new(ScriptedProvider::new("m1").then_move("ok", take(Color::White, Color::Black, Color::Red))),
    ];
    let mut sim = one_round(providers);
    let outcome = sim.run("retry", fresh()).unwrap();
    assert_eq!(outcome.forfeited_turns, 0);

    let events = decode(sim.log());
    assert_eq!(
        &kinds(&events)[1..7],
        &["TURN_STARTED", "REASONING", "ACTION", "RETRY", "REASONING", "ACTION"]
    );
    assert!(matches!(events[3], GameEvent::Action { success: false, player_index: 0, .. }));
    match &events[4] {
        GameEvent::Retry { attempt, error, .. } => {
            assert_eq!(*attempt, 1);
            assert!(error.starts_with("Invalid action:"), "{error}");
        }
        other => panic!("expected retry, got {other:?}"),
    }
    assert!(matches!(events[6], GameEvent::Action { success: true, .. }));

    let prompts = transcript.borrow();
    assert_eq!(prompts.len(), 2);
    assert!(!prompts[0].contains("ILLEGAL MOVE ERROR"));
    assert!(prompts[1].contains("ILLEGAL MOVE ERROR"));
}

#[test]
fn test_overflowing_counts_are_retried_not_fatal() {
    let reply = r#"{"reasoning":"all of it","action_type":"TAKE_TOKENS",
        "take_RED":4294967295,"take_BLUE":4294967295,"take_GREEN":5}"#;
    let greedy = parse_move(reply).unwrap();
    let providers: Vec<Box<dyn MoveProvider>> = vec![
        Box::new(
            ScriptedProvider::new("m0")
                .then_move(greedy.rationale, greedy.action)
                .then_move("sane", take(Color::Red, Color::Blue, Color::Green)),
        ),
        Box::new(ScriptedProvider::new("m1").then_move("ok", take(Color::White, Color::Black, Color::Red))),
    ];
    let mut sim = one_round(providers);
    let outcome = sim.run("overflow", fresh()).unwrap();
    assert_eq!(outcome.forfeited_turns, 0);
    assert_eq!(outcome.final_state.players[PlayerId::new(0)].tokens.total(), 3);

    let events = decode(sim.log());
    assert!(matches!(events[3], GameEvent::Action { success: false, player_index: 0, .. }));
    match &events[4] {
        GameEvent::Retry { attempt, error, .. } => {
            assert_eq!(*attempt, 1);
            assert!(error.starts_with("Invalid action:"), "{error}");
        }
        other => panic!("expected retry, got {other:?}"),
    }
}

#[test]
fn test_exhausted_attempts_forfeit_the_turn() {
    let state = fresh();
    let providers: Vec<Box<dyn MoveProvider>> = vec![
        Box::new(
            ScriptedProvider::new("m0")
                .then_fail(ProviderError::format("expected value at line 1"))
                .then_move("bad", GameAction::purchase("L3_999"))
                .then_fail(ProviderError::Status {
                    code: 400,
                    message: "bad request".into(),
                }),
        ),
        Box::new(ScriptedProvider::new("m1").then_move("ok", take(Color::White, Color::Black, Color::Red))),
    ];
    let mut sim = one_round(providers);
    let outcome = sim.run("forfeit", state.clone()).unwrap();
    assert_eq!(outcome.forfeited_turns, 1);

    let events = decode(sim.log());
    let retries = events
        .iter()
        .filter(|e| matches!(e, GameEvent::Retry { player_index: 0, .. }))
        .count();
    assert_eq!(retries, 2);
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::Action { player_index: 0, action: None, success: false, .. }
    )));

    // Player 1's snapshot shows nothing changed but the seat to move.
    let after = events
        .iter()
        .find_map(|e| match e {
            GameEvent::TurnStarted { player_index: 1, game_state, .. } => Some(game_state.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(after.board, state.board);
    assert_eq!(after.players, state.players);
    assert_eq!(after.turn, state.turn);
    assert_eq!(after.current_player, PlayerId::new(1));
}

#[test]
fn test_transient_failures_back_off_without_using_attempts() {
    let clock = ManualClock::new();
    let providers: Vec<Box<dyn MoveProvider>> = vec![
        Box::new(
            ScriptedProvider::new("m0")
                .then_fail(ProviderError::transport("connection reset by peer"))
                .then_fail(ProviderError::Status {
                    code: 503,
                    message: "unavailable".into(),
                })
                .then_fail(ProviderError::transport("operation timed out"))
                .then_move("finally", take(Color::Red, Color::Blue, Color::Green)),
        ),
        Box::new(ScriptedProvider::new("m1").then_move("ok", take(Color::White, Color::Black, Color::Red))),
    ];
    let policy = RetryPolicy::default()
        .with_backoff(Duration::from_millis(1000), Duration::from_millis(30_000))
        .with_network_wait(Duration::from_secs(600));
    let mut sim = SimulationLoop::new(SplendorRules::new(), providers, EventLog::new(Vec::new()))
        .with_policy(policy)
        .with_clock(&clock)
        .with_options(SimulationOptions::default().with_max_rounds(1));

    let outcome = sim.run("backoff", fresh()).unwrap();
    assert_eq!(outcome.forfeited_turns, 0);
    assert_eq!(
        clock.sleeps(),
        vec![
            Duration::from_millis(1000),
            Duration::from_millis(2000),
            Duration::from_millis(4000)
        ]
    );
    let events = decode(sim.log());
    assert!(!events.iter().any(|e| matches!(e, GameEvent::Retry { .. })));
}

#[test]
fn test_game_ends_with_winner_record() {
    let mut state = fresh();
    state.players[PlayerId::new(1)].score = 15;
    let providers: Vec<Box<dyn MoveProvider>> = vec![
        Box::new(ScriptedProvider::new("m0").then_move("a", take(Color::Red, Color::Blue, Color::Green))),
        Box::new(ScriptedProvider::new("m1").then_move("b", take(Color::White, Color::Black, Color::Red))),
    ];
    let mut sim = SimulationLoop::new(SplendorRules::new(), providers, EventLog::new(Vec::new()));
    let outcome = sim.run("ending", state).unwrap();

    assert!(!outcome.aborted);
    assert!(outcome.final_state.game_over);
    assert_eq!(outcome.result.and_then(|r| r.winner()), Some(PlayerId::new(1)));

    match decode(sim.log()).pop().unwrap() {
        GameEvent::GameEnded {
            winner_index,
            winner_reason,
            final_scores,
            ..
        } => {
            assert_eq!(winner_index, Some(1));
            assert_eq!(winner_reason.as_deref(), Some("Player 1 won on points."));
            assert_eq!(final_scores, vec![0, 15]);
        }
        other => panic!("unexpected last record {other:?}"),
    }
}

struct CountingGate(Rc<Cell<u32>>);

impl TurnGate for CountingGate {
    fn wait(&mut self, _player: PlayerId, _turn: u32) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn test_gate_waits_once_per_turn() {
    let count = Rc::new(Cell::new(0));
    let providers: Vec<Box<dyn MoveProvider>> = vec![
        Box::new(
            ScriptedProvider::new("m0")
                .then_move("bad", GameAction::take_two(Color::Gold))
                .then_move("ok", take(Color::Red, Color::Blue, Color::Green)),
        ),
        Box::new(ScriptedProvider::new("m1").then_move("ok", take(Color::White, Color::Black, Color::Red))),
    ];
    let mut sim = one_round(providers).with_gate(Box::new(CountingGate(Rc::clone(&count))));
    sim.run("gate", fresh()).unwrap();

    assert_eq!(count.get(), 2);
}
