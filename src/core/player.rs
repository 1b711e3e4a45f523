//! Player identification, per-player storage and player state.
//!
//! ## PlayerId
//!
//! Type-safe player identifier. Indices are 0-based and the acting order
//! follows the index.
//!
//! ## PlayerMap
//!
//! Per-player data storage backed by `Vec` for O(1) access, indexed by
//! `PlayerId`. Serializes as a plain JSON array.
//!
//! ## Player
//!
//! Everything a seat owns: tokens, purchased and reserved cards, visited
//! nobles, score, bonus counts and the bounded rationale history.

use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::cards::{DevelopmentCard, NobleTile};
use super::tokens::{Color, TokenBank, TokenCounts};

/// Player identifier.
///
/// Player indices are 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The player after this one, wrapping at `player_count`.
    #[must_use]
    pub fn next(self, player_count: usize) -> Self {
        let next = (self.index() + 1) % player_count.max(1);
        Self(next as u8)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use ai_splendor::core::{PlayerId, PlayerMap};
///
/// let mut scores: PlayerMap<u32> = PlayerMap::new(2, |_| 0);
/// scores[PlayerId::new(1)] = 15;
///
/// assert_eq!(scores[PlayerId::new(0)], 0);
/// assert_eq!(scores[PlayerId::new(1)], 15);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    ///
    /// The factory receives the `PlayerId` for each player.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        let data = (0..player_count as u8)
            .map(|i| factory(PlayerId(i)))
            .collect();

        Self { data }
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a player's data, if the player exists.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    /// Iterate over values in seat order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}

/// Rationales kept per player.
pub const REASONING_HISTORY_CAPACITY: usize = 5;

/// Bounded FIFO of a player's most recent rationales, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ReasoningHistory {
    entries: VecDeque<String>,
}

impl ReasoningHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rationale, evicting the oldest when full.
    pub fn push(&mut self, rationale: impl Into<String>) {
        if self.entries.len() == REASONING_HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(rationale.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for ReasoningHistory {
    fn from(entries: Vec<String>) -> Self {
        let mut history = Self::new();
        for entry in entries {
            history.push(entry);
        }
        history
    }
}

impl From<ReasoningHistory> for Vec<String> {
    fn from(history: ReasoningHistory) -> Self {
        history.entries.into_iter().collect()
    }
}

/// Maximum cards in a reserved hand.
pub const MAX_RESERVED: usize = 3;

/// A seat's complete state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub tokens: TokenBank,
    /// Purchase order.
    pub purchased: Vector<DevelopmentCard>,
    pub reserved: SmallVec<[DevelopmentCard; MAX_RESERVED]>,
    /// Visit order.
    pub nobles: Vector<NobleTile>,
    pub score: u32,
    pub bonuses: TokenCounts,
    #[serde(default)]
    pub reasoning_history: ReasoningHistory,
}

impl Player {
    /// A fresh seat with no tokens, cards or score.
    #[must_use]
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            tokens: TokenBank::empty(),
            purchased: Vector::new(),
            reserved: SmallVec::new(),
            nobles: Vector::new(),
            score: 0,
            bonuses: TokenCounts::new(),
            reasoning_history: ReasoningHistory::new(),
        }
    }

    /// Permanent discount for a color.
    #[must_use]
    pub fn bonus(&self, color: Color) -> u32 {
        self.bonuses.get(&color).copied().unwrap_or(0)
    }
}
