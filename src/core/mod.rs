//! Core game types: tokens, cards, players, state, actions, RNG, configuration.
//!
//! These are plain value types. Rule enforcement lives in `rules`; the
//! types here only guard their own structural invariants (non-negative
//! token counts, bounded rationale history).

pub mod tokens;
pub mod cards;
pub mod player;
pub mod state;
pub mod action;
pub mod rng;
pub mod config;

pub use tokens::{Color, TokenBank, TokenCounts, TokenError};
pub use cards::{ByLevel, CardLevel, DevelopmentCard, NobleTile};
pub use player::{Player, PlayerId, PlayerMap, ReasoningHistory, MAX_RESERVED, REASONING_HISTORY_CAPACITY};
pub use state::{Board, GameState, PublicGameState, FACE_UP_PER_LEVEL};
pub use action::{GameAction, MoveProposal};
pub use rng::GameRng;
pub use config::{ConfigError, GameConfig, PlayerConfig, ProviderCredentials, ReasoningConfig, RetryConfig};
