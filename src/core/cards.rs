//! Development cards, noble tiles and per-level storage.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::tokens::{Color, TokenCounts};

/// Card tier. Each level has its own deck and face-up row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardLevel {
    #[serde(rename = "LEVEL_1")]
    Level1,
    #[serde(rename = "LEVEL_2")]
    Level2,
    #[serde(rename = "LEVEL_3")]
    Level3,
}

impl CardLevel {
    /// All levels, lowest first.
    pub const ALL: [CardLevel; 3] = [CardLevel::Level1, CardLevel::Level2, CardLevel::Level3];

    /// Numeric tier (1-3).
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            CardLevel::Level1 => 1,
            CardLevel::Level2 => 2,
            CardLevel::Level3 => 3,
        }
    }

    /// Level from its numeric tier.
    #[must_use]
    pub const fn from_number(n: u8) -> Option<CardLevel> {
        match n {
            1 => Some(CardLevel::Level1),
            2 => Some(CardLevel::Level2),
            3 => Some(CardLevel::Level3),
            _ => None,
        }
    }

    /// Parse `LEVEL_2`, `level_2` or a bare `2`.
    #[must_use]
    pub fn parse(s: &str) -> Option<CardLevel> {
        let s = s.trim();
        let digits = match s.get(..6) {
            Some(prefix) if prefix.eq_ignore_ascii_case("LEVEL_") => &s[6..],
            _ => s,
        };
        digits.parse::<u8>().ok().and_then(CardLevel::from_number)
    }
}

impl fmt::Display for CardLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LEVEL_{}", self.number())
    }
}

/// One value per card level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByLevel<T> {
    #[serde(rename = "LEVEL_1")]
    pub level_1: T,
    #[serde(rename = "LEVEL_2")]
    pub level_2: T,
    #[serde(rename = "LEVEL_3")]
    pub level_3: T,
}

impl<T> ByLevel<T> {
    /// Build from a factory called once per level.
    pub fn new(mut factory: impl FnMut(CardLevel) -> T) -> Self {
        Self {
            level_1: factory(CardLevel::Level1),
            level_2: factory(CardLevel::Level2),
            level_3: factory(CardLevel::Level3),
        }
    }

    /// Iterate over (level, &value) pairs, lowest level first.
    pub fn iter(&self) -> impl Iterator<Item = (CardLevel, &T)> {
        CardLevel::ALL.into_iter().map(move |l| (l, &self[l]))
    }

    /// Map every entry to a new value.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> ByLevel<U> {
        ByLevel {
            level_1: f(&self.level_1),
            level_2: f(&self.level_2),
            level_3: f(&self.level_3),
        }
    }
}

impl<T> Index<CardLevel> for ByLevel<T> {
    type Output = T;

    fn index(&self, level: CardLevel) -> &T {
        match level {
            CardLevel::Level1 => &self.level_1,
            CardLevel::Level2 => &self.level_2,
            CardLevel::Level3 => &self.level_3,
        }
    }
}

impl<T> IndexMut<CardLevel> for ByLevel<T> {
    fn index_mut(&mut self, level: CardLevel) -> &mut T {
        match level {
            CardLevel::Level1 => &mut self.level_1,
            CardLevel::Level2 => &mut self.level_2,
            CardLevel::Level3 => &mut self.level_3,
        }
    }
}

/// A purchasable card: grants one permanent bonus and some prestige.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DevelopmentCard {
    pub id: String,
    pub level: CardLevel,
    /// Bonus color granted on purchase.
    pub bonus: Color,
    pub points: u32,
    /// Only positive amounts are stored.
    pub cost: TokenCounts,
}

impl DevelopmentCard {
    /// Create a card, dropping zero cost entries.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        level: CardLevel,
        bonus: Color,
        points: u32,
        cost: impl IntoIterator<Item = (Color, u32)>,
    ) -> Self {
        Self {
            id: id.into(),
            level,
            bonus,
            points,
            cost: cost.into_iter().filter(|&(_, n)| n > 0).collect(),
        }
    }
}

impl fmt::Display for DevelopmentCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cost: Vec<String> = self.cost.iter().map(|(c, n)| format!("{c}:{n}")).collect();
        write!(
            f,
            "{} [{} {}pt] cost {}",
            self.id,
            self.bonus,
            self.points,
            cost.join(" ")
        )
    }
}

/// A noble, awarded automatically once a player's bonuses meet its requirement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NobleTile {
    pub id: String,
    pub points: u32,
    /// Minimum bonus count per color.
    pub requirement: TokenCounts,
}

impl NobleTile {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        points: u32,
        requirement: impl IntoIterator<Item = (Color, u32)>,
    ) -> Self {
        Self {
            id: id.into(),
            points,
            requirement: requirement.into_iter().filter(|&(_, n)| n > 0).collect(),
        }
    }

    /// Check if the given bonus counts satisfy every requirement.
    #[must_use]
    pub fn is_satisfied_by(&self, bonuses: &TokenCounts) -> bool {
        self.requirement
            .iter()
            .all(|(color, &need)| bonuses.get(color).copied().unwrap_or(0) >= need)
    }
}
