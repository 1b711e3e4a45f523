//! Token colors and the non-negative token multiset.
//!
//! ## Color
//!
//! Five gem colors plus `Gold`, the wildcard. Gold can only be gained by
//! reserving a card and only spent as a substitute when paying a cost.
//!
//! ## TokenBank
//!
//! Immutable mapping color -> count. Counts are validated at construction
//! (negative counts are rejected) and every update returns a new bank, so a
//! bank never aliases storage owned by a caller or by an earlier state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    White,
    Blue,
    Green,
    Red,
    Black,
    /// Wildcard. Never taken directly.
    Gold,
}

impl Color {
    /// All colors, wildcard last.
    pub const ALL: [Color; 6] = [
        Color::White,
        Color::Blue,
        Color::Green,
        Color::Red,
        Color::Black,
        Color::Gold,
    ];

    /// The five gem colors that can be taken and that cards grant as bonuses.
    pub const GEMS: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Green,
        Color::Red,
        Color::Black,
    ];

    /// Check if this is the wildcard color.
    #[must_use]
    pub const fn is_wildcard(self) -> bool {
        matches!(self, Color::Gold)
    }

    /// Upper-case name used in logs and provider payloads.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Color::White => "WHITE",
            Color::Blue => "BLUE",
            Color::Green => "GREEN",
            Color::Red => "RED",
            Color::Black => "BLACK",
            Color::Gold => "GOLD",
        }
    }

    /// Parse a color name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Color> {
        let name = name.trim();
        Color::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Plain per-color counts, as carried by actions, costs and bonuses.
///
/// Zero entries are allowed here; `TokenBank` is the validated form.
pub type TokenCounts = BTreeMap<Color, u32>;

/// Sum all counts in a `TokenCounts` map, saturating at `u32::MAX`.
#[must_use]
pub fn total(counts: &TokenCounts) -> u32 {
    counts.values().fold(0, |acc, &n| acc.saturating_add(n))
}

/// Token arithmetic errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token count for {color} cannot be negative: {count}")]
    Negative { color: Color, count: i64 },
    #[error("token count for {color} is too large: {count}")]
    Overflow { color: Color, count: i64 },
    #[error("cannot remove {requested} {color} tokens: only {available} held")]
    Insufficient {
        color: Color,
        requested: u32,
        available: u32,
    },
}

/// Immutable non-negative multiset of tokens.
///
/// ## Example
///
/// ```
/// use ai_splendor::core::{Color, TokenBank};
///
/// let bank = TokenBank::new([(Color::Red, 4), (Color::Gold, 5)]).unwrap();
/// let after = bank.withdraw(Color::Red, 2).unwrap();
///
/// assert_eq!(bank.count(Color::Red), 4); // original untouched
/// assert_eq!(after.count(Color::Red), 2);
/// assert!(TokenBank::new([(Color::Blue, -1)]).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Color, i64>", into = "BTreeMap<Color, i64>")]
pub struct TokenBank {
    counts: BTreeMap<Color, u32>,
}

impl TokenBank {
    /// Build a bank from (color, count) pairs, rejecting negative counts.
    ///
    /// The input is copied; zero entries are dropped. Repeated colors add up.
    pub fn new<I>(counts: I) -> Result<Self, TokenError>
    where
        I: IntoIterator<Item = (Color, i64)>,
    {
        let mut out = BTreeMap::new();
        for (color, count) in counts {
            if count < 0 {
                return Err(TokenError::Negative { color, count });
            }
            let count = u32::try_from(count).map_err(|_| TokenError::Overflow { color, count })?;
            if count > 0 {
                let slot = out.entry(color).or_insert(0u32);
                *slot = slot.checked_add(count).ok_or(TokenError::Overflow {
                    color,
                    count: i64::from(count),
                })?;
            }
        }
        Ok(Self { counts: out })
    }

    /// An empty bank.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a bank from already non-negative counts.
    #[must_use]
    pub fn from_counts(counts: &TokenCounts) -> Self {
        Self {
            counts: counts
                .iter()
                .filter(|(_, &n)| n > 0)
                .map(|(&c, &n)| (c, n))
                .collect(),
        }
    }

    /// Count of a color (0 when absent).
    #[must_use]
    pub fn count(&self, color: Color) -> u32 {
        self.counts.get(&color).copied().unwrap_or(0)
    }

    /// Total tokens across all colors.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Check if the bank holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over non-zero (color, count) pairs in color order.
    pub fn iter(&self) -> impl Iterator<Item = (Color, u32)> + '_ {
        self.counts.iter().map(|(&c, &n)| (c, n))
    }

    /// New bank with `amount` more tokens of `color`.
    #[must_use]
    pub fn deposit(&self, color: Color, amount: u32) -> Self {
        let mut counts = self.counts.clone();
        if amount > 0 {
            *counts.entry(color).or_insert(0) += amount;
        }
        Self { counts }
    }

    /// New bank with `amount` fewer tokens of `color`.
    pub fn withdraw(&self, color: Color, amount: u32) -> Result<Self, TokenError> {
        let available = self.count(color);
        if amount > available {
            return Err(TokenError::Insufficient {
                color,
                requested: amount,
                available,
            });
        }
        let mut counts = self.counts.clone();
        if amount == available {
            counts.remove(&color);
        } else if let Some(n) = counts.get_mut(&color) {
            *n -= amount;
        }
        Ok(Self { counts })
    }

    /// New bank with every count of `other` added.
    #[must_use]
    pub fn deposit_all(&self, other: &TokenCounts) -> Self {
        other
            .iter()
            .fold(self.clone(), |bank, (&color, &n)| bank.deposit(color, n))
    }

    /// New bank with every count of `other` removed.
    pub fn withdraw_all(&self, other: &TokenCounts) -> Result<Self, TokenError> {
        other
            .iter()
            .try_fold(self.clone(), |bank, (&color, &n)| bank.withdraw(color, n))
    }
}

impl TryFrom<BTreeMap<Color, i64>> for TokenBank {
    type Error = TokenError;

    fn try_from(value: BTreeMap<Color, i64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TokenBank> for BTreeMap<Color, i64> {
    fn from(bank: TokenBank) -> Self {
        bank.counts
            .into_iter()
            .map(|(c, n)| (c, i64::from(n)))
            .collect()
    }
}

impl fmt::Display for TokenBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.counts.is_empty() {
            return f.write_str("-");
        }
        let parts: Vec<String> = self.iter().map(|(c, n)| format!("{c}:{n}")).collect();
        f.write_str(&parts.join(" "))
    }
}
