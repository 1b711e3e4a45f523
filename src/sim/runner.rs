//! The simulation loop.
//!
//! One thread of control per game. Each turn the loop logs a snapshot,
//! asks the acting seat's provider for a move, validates it and applies it.
//! Every record is flushed to the event log before the loop moves on, so the
//! log is always a safe point to resume from.
//!
//! ## Failure handling
//!
//! - Illegal or unparsable moves use up one logic attempt; the next attempt
//!   quotes the error back to the provider.
//! - Transient provider failures back off and retry within the same logic
//!   attempt until its network window is spent.
//! - With no logic attempts left the turn is forfeited: play rotates and
//!   nothing else changes.

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::{GameConfig, GameState, MoveProposal, PlayerId, PublicGameState};
use crate::events::{EventLog, EventLogError, GameEvent};
use crate::provider::{instructions, MoveProvider, ProviderError};
use crate::rules::{GameResult, RuleViolation, RulesEngine};

use super::retry::{Clock, RetryPolicy, SystemClock};

/// Errors that stop a run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    EventLog(#[from] EventLogError),
    #[error("{providers} providers for {players} players")]
    SeatCount { providers: usize, players: usize },
    /// A validated action was rejected on apply.
    #[error("validated action failed to apply: {0}")]
    Apply(#[from] RuleViolation),
}

/// Pause point before a seat's turn is requested.
pub trait TurnGate {
    fn wait(&mut self, player: PlayerId, turn: u32);
}

/// Never waits.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGate;

impl TurnGate for NoGate {
    fn wait(&mut self, _player: PlayerId, _turn: u32) {}
}

/// Waits for the operator to press Enter.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdinGate;

impl TurnGate for StdinGate {
    fn wait(&mut self, player: PlayerId, turn: u32) {
        info!(turn, player = %player, "press Enter to request the next move");
        let mut line = String::new();
        if let Err(err) = io::stdin().lock().read_line(&mut line) {
            warn!(error = %err, "failed to read from stdin");
        }
    }
}

/// Loop options outside the retry budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationOptions {
    /// Rounds this run may play before it is aborted.
    pub max_rounds: u32,
    /// Log the full state as pretty JSON each turn.
    pub debug: bool,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            max_rounds: crate::core::config::DEFAULT_MAX_ROUNDS,
            debug: false,
        }
    }
}

impl SimulationOptions {
    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            max_rounds: config.max_rounds,
            debug: config.debug,
        }
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationOutcome {
    pub final_state: GameState,
    /// `None` when the run was aborted.
    pub result: Option<GameResult>,
    pub forfeited_turns: u32,
    pub rounds_played: u32,
    pub aborted: bool,
}

/// Drives one game from a state to its end.
pub struct SimulationLoop<R: RulesEngine, W: Write, C: Clock = SystemClock> {
    rules: R,
    providers: Vec<Box<dyn MoveProvider>>,
    log: EventLog<W>,
    policy: RetryPolicy,
    clock: C,
    gate: Box<dyn TurnGate>,
    options: SimulationOptions,
}

impl<R: RulesEngine, W: Write> SimulationLoop<R, W, SystemClock> {
    /// One provider per seat, in seat order.
    pub fn new(rules: R, providers: Vec<Box<dyn MoveProvider>>, log: EventLog<W>) -> Self {
        Self {
            rules,
            providers,
            log,
            policy: RetryPolicy::default(),
            clock: SystemClock,
            gate: Box::new(NoGate),
            options: SimulationOptions::default(),
        }
    }
}

impl<R: RulesEngine, W: Write, C: Clock> SimulationLoop<R, W, C> {
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_gate(mut self, gate: Box<dyn TurnGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_options(mut self, options: SimulationOptions) -> Self {
        self.options = options;
        self
    }

    /// Swap the time source used for backoff.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> SimulationLoop<R, W, C2> {
        SimulationLoop {
            rules: self.rules,
            providers: self.providers,
            log: self.log,
            policy: self.policy,
            clock,
            gate: self.gate,
            options: self.options,
        }
    }

    #[must_use]
    pub fn log(&self) -> &EventLog<W> {
        &self.log
    }

    /// Play `state` to the end under `game_id`.
    ///
    /// `state` may be a fresh setup or a resumed snapshot; either way a new
    /// `GAME_STARTED` record opens the log.
    pub fn run(
        &mut self,
        game_id: &str,
        mut state: GameState,
    ) -> Result<SimulationOutcome, SimulationError> {
        if self.providers.len() != state.player_count() {
            return Err(SimulationError::SeatCount {
                providers: self.providers.len(),
                players: state.player_count(),
            });
        }

        let models: Vec<String> = self.providers.iter().map(|p| p.model().to_string()).collect();
        info!(game_id, ?models, turn = state.turn, player = %state.current_player, "game started");
        self.log
            .append(&GameEvent::game_started(game_id, models, &state))?;

        let first_turn = state.turn;
        let mut forfeited_turns = 0;
        let mut aborted = false;

        while !state.game_over {
            if state.turn.saturating_sub(first_turn) >= self.options.max_rounds {
                aborted = true;
                break;
            }
            let (next, forfeited) = self.play_turn(state)?;
            forfeited_turns += u32::from(forfeited);
            state = next;
        }

        let rounds_played = state.turn.saturating_sub(first_turn);
        let result = if aborted {
            None
        } else {
            self.rules.result(&state)
        };

        let (winner_index, winner_reason) = if aborted {
            let reason = format!("Game aborted after {rounds_played} rounds");
            error!(game_id, rounds = rounds_played, "round limit reached, aborting game");
            (None, Some(reason))
        } else {
            let winner = result.and_then(|r| r.winner()).map(PlayerId::index);
            let reason = state
                .winner_reason
                .clone()
                .or_else(|| result.map(|r| r.to_string()));
            (winner, reason)
        };

        for player in state.players.values() {
            info!(player = %player.id, score = player.score, cards = player.purchased.len(), "final score");
        }
        info!(game_id, reason = ?winner_reason, forfeited_turns, "game over");
        self.log.append(&GameEvent::game_ended(
            winner_index,
            winner_reason,
            state.scores(),
        ))?;

        Ok(SimulationOutcome {
            final_state: state,
            result,
            forfeited_turns,
            rounds_played,
            aborted,
        })
    }

    /// Play the acting seat's turn. Returns the next state and whether the
    /// turn was forfeited.
    fn play_turn(&mut self, mut state: GameState) -> Result<(GameState, bool), SimulationError> {
        let seat = state.current_player;
        let turn = state.turn;
        {
            let player = state.current();
            info!(
                turn,
                player = %seat,
                score = player.score,
                tokens = %player.tokens,
                cards = player.purchased.len(),
                reserved = player.reserved.len(),
                "turn started"
            );
        }
        self.log.append(&GameEvent::turn_started(&state))?;

        if self.options.debug {
            match serde_json::to_string_pretty(&state) {
                Ok(json) => debug!(turn, "game state:\n{json}"),
                Err(err) => warn!(error = %err, "failed to serialize game state"),
            }
        }

        self.gate.wait(seat, turn);

        match self.request_valid_move(&state)? {
            Some(proposal) => {
                state.players[seat]
                    .reasoning_history
                    .push(proposal.rationale);
                let next = self.rules.apply(state, &proposal.action)?;
                debug!(turn, player = %seat, scores = ?next.scores(), "action applied");
                Ok((next, false))
            }
            None => {
                error!(
                    turn,
                    player = %seat,
                    attempts = self.policy.max_logic_attempts,
                    "no valid move, forfeiting turn"
                );
                self.log
                    .append(&GameEvent::action(seat.index(), None, false))?;
                Ok((self.rules.forfeit_turn(state), true))
            }
        }
    }

    /// Spend the logic attempts on getting one legal move.
    ///
    /// The successful `ACTION` record is written here, before the caller
    /// applies the move.
    fn request_valid_move(
        &mut self,
        state: &GameState,
    ) -> Result<Option<MoveProposal>, SimulationError> {
        let seat = state.current_player;
        let public = state.public_view();
        let history = &state.current().reasoning_history;
        let mut last_error: Option<String> = None;

        for attempt in 1..=self.policy.max_logic_attempts {
            if let Some(error) = &last_error {
                let retry = attempt - 1;
                warn!(turn = state.turn, player = %seat, attempt = retry, %error, "retrying move request");
                self.log
                    .append(&GameEvent::retry(seat.index(), retry, error.as_str()))?;
            }

            let prompt = instructions(history, last_error.as_deref());
            let proposal = match self.request_with_backoff(seat, &public, &prompt) {
                Ok(proposal) => proposal,
                Err(err) => {
                    warn!(turn = state.turn, player = %seat, attempt, error = %err, "move request failed");
                    last_error = Some(err);
                    continue;
                }
            };

            info!(player = %seat, reasoning = %proposal.rationale, "reasoning");
            info!(player = %seat, action = %proposal.action, "action");
            self.log
                .append(&GameEvent::reasoning(seat.index(), proposal.rationale.as_str()))?;

            match self.rules.validate(state, &proposal.action) {
                Ok(()) => {
                    self.log.append(&GameEvent::action(
                        seat.index(),
                        Some(proposal.action.clone()),
                        true,
                    ))?;
                    return Ok(Some(proposal));
                }
                Err(violation) => {
                    warn!(player = %seat, attempt, %violation, "illegal action");
                    self.log.append(&GameEvent::action(
                        seat.index(),
                        Some(proposal.action),
                        false,
                    ))?;
                    last_error = Some(format!("Invalid action: {violation}"));
                }
            }
        }

        Ok(None)
    }

    /// One logic attempt: call the provider, backing off on transient
    /// failures until the attempt's network window is spent.
    fn request_with_backoff(
        &mut self,
        seat: PlayerId,
        state: &PublicGameState,
        prompt: &str,
    ) -> Result<MoveProposal, String> {
        let started = self.clock.now();
        let mut backoff = self.policy.backoff();
        let provider = &mut self.providers[seat.index()];

        loop {
            let err = match provider.propose_move(state, prompt) {
                Ok(proposal) => return Ok(proposal),
                Err(err) => err,
            };
            if !err.is_transient() {
                return Err(describe(&err));
            }

            let waited = self.clock.now().saturating_duration_since(started);
            if waited >= self.policy.max_network_wait {
                return Err(format!("Network timeout after {}s: {err}", waited.as_secs()));
            }
            let delay = backoff
                .next_delay()
                .min(self.policy.max_network_wait - waited);
            warn!(
                player = %seat,
                backoff_ms = delay.as_millis() as u64,
                error = %err,
                "transient provider failure, backing off"
            );
            self.clock.sleep(delay);
        }
    }
}

fn describe(err: &ProviderError) -> String {
    match err {
        ProviderError::Format { message } => format!("Malformed JSON response: {message}"),
        other => format!("Provider error: {other}"),
    }
}
