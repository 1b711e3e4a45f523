//! Rule violations.
//!
//! Every variant is recoverable: the move source gets the message back and
//! may try again.

use thiserror::Error;

use crate::core::{CardLevel, Color, TokenError};

/// Why an action is illegal in the current state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("the game is already over")]
    GameOver,

    #[error("GOLD tokens cannot be taken directly")]
    WildcardTaken,

    #[error("must take 3 different or 2 matching tokens, not {total}")]
    InvalidTakeCount { total: u32 },

    #[error("taking 3 tokens requires 3 different colors, got {distinct}")]
    NotThreeDistinct { distinct: usize },

    #[error("taking 2 tokens requires a single color, got {distinct}")]
    TwoTakeMultipleColors { distinct: usize },

    #[error("cannot take 2 {color} tokens: only {available} available (need 4)")]
    InsufficientBankForDouble { color: Color, available: u32 },

    #[error("no {color} tokens left in the bank")]
    BankEmpty { color: Color },

    #[error(
        "cannot hold more than {limit} tokens at end of turn \
         (current {current}, gaining {gained}, returning {returned})"
    )]
    TokenLimitExceeded {
        limit: u32,
        current: u32,
        gained: u32,
        returned: u32,
    },

    #[error("cannot return {requested} {color} tokens: only {available} held")]
    ReturnExceedsHoldings {
        color: Color,
        requested: u32,
        available: u32,
    },

    #[error("cannot reserve more than {limit} cards")]
    ReserveLimitReached { limit: usize },

    #[error("card {card_id} is not on the board")]
    CardNotOnBoard { card_id: String },

    #[error("deck {level} is empty")]
    DeckEmpty { level: CardLevel },

    #[error("reserve needs either a card_id or a deck_level")]
    MissingReserveTarget,

    #[error("card {card_id} is not on the board or in the reserved hand")]
    CardNotAvailable { card_id: String },

    #[error("cannot afford {card_id}: needs {needed} GOLD, holding {held}")]
    InsufficientWildcards {
        card_id: String,
        needed: u32,
        held: u32,
    },

    #[error(transparent)]
    Tokens(#[from] TokenError),
}
