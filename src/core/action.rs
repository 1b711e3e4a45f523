//! Actions a player can propose.
//!
//! The action set is closed: take tokens, reserve a card, purchase a card.
//! `GameAction` is a tagged union and every consumer matches on it
//! exhaustively.

use serde::{Deserialize, Serialize};

use super::cards::CardLevel;
use super::tokens::{Color, TokenCounts};

/// A single player action.
///
/// ## Example
///
/// ```
/// use ai_splendor::core::{Color, GameAction};
///
/// let take = GameAction::take([Color::Red, Color::Blue, Color::Green]);
/// let json = serde_json::to_string(&take).unwrap();
/// assert!(json.starts_with(r#"{"type":"TAKE_TOKENS""#));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameAction {
    /// Take 3 distinct colors or 2 of one color, optionally returning some.
    TakeTokens {
        tokens: TokenCounts,
        #[serde(default, skip_serializing_if = "TokenCounts::is_empty")]
        returns: TokenCounts,
    },
    /// Reserve a face-up card by id, or blind-draw from a deck.
    ReserveCard {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        card_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deck_level: Option<CardLevel>,
        #[serde(default, skip_serializing_if = "TokenCounts::is_empty")]
        returns: TokenCounts,
    },
    /// Purchase a face-up or reserved card.
    PurchaseCard { card_id: String },
}

impl GameAction {
    /// Take one token of each listed color.
    #[must_use]
    pub fn take(colors: impl IntoIterator<Item = Color>) -> Self {
        let mut tokens = TokenCounts::new();
        for color in colors {
            *tokens.entry(color).or_insert(0) += 1;
        }
        GameAction::TakeTokens {
            tokens,
            returns: TokenCounts::new(),
        }
    }

    /// Take two tokens of one color.
    #[must_use]
    pub fn take_two(color: Color) -> Self {
        GameAction::TakeTokens {
            tokens: TokenCounts::from([(color, 2)]),
            returns: TokenCounts::new(),
        }
    }

    /// Reserve a face-up card.
    #[must_use]
    pub fn reserve(card_id: impl Into<String>) -> Self {
        GameAction::ReserveCard {
            card_id: Some(card_id.into()),
            deck_level: None,
            returns: TokenCounts::new(),
        }
    }

    /// Reserve the top card of a deck.
    #[must_use]
    pub fn reserve_blind(level: CardLevel) -> Self {
        GameAction::ReserveCard {
            card_id: None,
            deck_level: Some(level),
            returns: TokenCounts::new(),
        }
    }

    #[must_use]
    pub fn purchase(card_id: impl Into<String>) -> Self {
        GameAction::PurchaseCard {
            card_id: card_id.into(),
        }
    }

    /// Replace the returns of a take or reserve.
    #[must_use]
    pub fn with_returns(self, new_returns: impl IntoIterator<Item = (Color, u32)>) -> Self {
        let new_returns: TokenCounts = new_returns.into_iter().filter(|&(_, n)| n > 0).collect();
        match self {
            GameAction::TakeTokens { tokens, .. } => GameAction::TakeTokens {
                tokens,
                returns: new_returns,
            },
            GameAction::ReserveCard {
                card_id,
                deck_level,
                ..
            } => GameAction::ReserveCard {
                card_id,
                deck_level,
                returns: new_returns,
            },
            purchase @ GameAction::PurchaseCard { .. } => purchase,
        }
    }

    /// Short label of the action kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            GameAction::TakeTokens { .. } => "TAKE_TOKENS",
            GameAction::ReserveCard { .. } => "RESERVE_CARD",
            GameAction::PurchaseCard { .. } => "PURCHASE_CARD",
        }
    }
}

impl std::fmt::Display for GameAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn counts(c: &TokenCounts) -> String {
            c.iter()
                .map(|(color, n)| format!("{color}:{n}"))
                .collect::<Vec<_>>()
                .join(" ")
        }
        match self {
            GameAction::TakeTokens { tokens, returns } if returns.is_empty() => {
                write!(f, "take {}", counts(tokens))
            }
            GameAction::TakeTokens { tokens, returns } => {
                write!(f, "take {} return {}", counts(tokens), counts(returns))
            }
            GameAction::ReserveCard {
                card_id, deck_level, ..
            } => match (card_id, deck_level) {
                (Some(id), _) => write!(f, "reserve {id}"),
                (None, Some(level)) => write!(f, "reserve top of {level}"),
                (None, None) => f.write_str("reserve (no target)"),
            },
            GameAction::PurchaseCard { card_id } => write!(f, "purchase {card_id}"),
        }
    }
}

/// A provider's answer: an action plus its free-text rationale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveProposal {
    pub rationale: String,
    pub action: GameAction,
}

impl MoveProposal {
    #[must_use]
    pub fn new(rationale: impl Into<String>, action: GameAction) -> Self {
        Self {
            rationale: rationale.into(),
            action,
        }
    }
}
