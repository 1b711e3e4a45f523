//! # ai-splendor
//!
//! Splendor played between language-model agents.
//!
//! ## Design Principles
//!
//! 1. **Values In, Values Out**: `GameState` is owned by the simulation loop,
//!    passed by value into the rules and returned as a new value. Nothing is
//!    shared or locked.
//!
//! 2. **The Log Is the Truth**: every transition is flushed to an NDJSON
//!    event log before the loop proceeds. An interrupted game resumes from
//!    the log alone.
//!
//! 3. **Agents Are Untrusted**: every proposed move is validated; bad or
//!    missing moves cost retries, then the turn, never the game.
//!
//! ## Modules
//!
//! - `core`: Tokens, cards, players, state, actions, RNG, configuration
//! - `cards`: Standard catalog and opening setup
//! - `rules`: `RulesEngine` trait and the Splendor rules
//! - `events`: Event records, the log writer and resume reconstruction
//! - `provider`: Move providers, prompts, reply parsing, HTTP client
//! - `sim`: The simulation loop and its retry budgets

pub mod core;
pub mod cards;
pub mod rules;
pub mod events;
pub mod provider;
pub mod sim;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    Color, TokenBank, TokenCounts,
    CardLevel, DevelopmentCard, NobleTile,
    PlayerId, PlayerMap, Player, ReasoningHistory,
    Board, GameState, PublicGameState,
    GameAction, MoveProposal,
    GameRng,
    GameConfig, ProviderCredentials,
};

pub use crate::cards::{setup_game, setup_game_with};

pub use crate::rules::{GameResult, RuleViolation, RulesEngine, SplendorRules};

pub use crate::events::{reconstruct, EventLog, GameEvent, ResumePoint};

pub use crate::provider::{LlmMoveProvider, MoveProvider, OpenRouterClient, ProviderError};

pub use crate::sim::{RetryPolicy, SimulationLoop, SimulationOptions, SimulationOutcome};

pub use crate::error::{Error, Result};
