//! Standard card catalog and initial game setup.
//!
//! Development cards come from a CSV table
//! (`level,color,points,black,blue,green,red,white`), embedded at build time.
//! Card ids are `L{level}_{row}` where `row` is the 1-based data-row index,
//! so ids are stable across runs regardless of shuffling.

use im::Vector;
use thiserror::Error;
use tracing::debug;

use crate::core::{
    Board, ByLevel, CardLevel, Color, DevelopmentCard, GameRng, GameState, NobleTile, Player,
    PlayerMap, TokenBank, FACE_UP_PER_LEVEL,
};

const STANDARD_CARDS_CSV: &str = include_str!("../../data/development_cards.csv");

/// Gem tokens per color in a two-player bank.
pub const BANK_GEMS_PER_COLOR: u32 = 4;
/// Wildcard tokens in the bank.
pub const BANK_WILDCARDS: u32 = 5;

/// Catalog loading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("line {line}: invalid {field} {value:?}")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("catalog has no level {0} cards")]
    EmptyLevel(CardLevel),
    #[error("need {needed} nobles but the catalog has {available}")]
    NotEnoughNobles { needed: usize, available: usize },
}

/// Parse a card table.
///
/// The first line is a header. Rows with fewer than 8 columns are skipped;
/// unparsable values are errors.
pub fn parse_cards(csv: &str) -> Result<Vec<DevelopmentCard>, CatalogError> {
    let mut cards = Vec::new();

    for (idx, raw) in csv.lines().enumerate().skip(1) {
        let line = idx + 1;
        let parts: Vec<&str> = raw.trim_end_matches('\r').split(',').map(str::trim).collect();
        if parts.len() < 8 {
            continue;
        }

        let level = parts[0]
            .parse::<u8>()
            .ok()
            .and_then(CardLevel::from_number)
            .ok_or_else(|| invalid(line, "level", parts[0]))?;
        let bonus = Color::parse(parts[1])
            .filter(|c| !c.is_wildcard())
            .ok_or_else(|| invalid(line, "color", parts[1]))?;
        let points = number(line, "points", parts[2])?;

        // Column order is fixed by the table header.
        let cost = [
            (Color::Black, number(line, "black", parts[3])?),
            (Color::Blue, number(line, "blue", parts[4])?),
            (Color::Green, number(line, "green", parts[5])?),
            (Color::Red, number(line, "red", parts[6])?),
            (Color::White, number(line, "white", parts[7])?),
        ];

        let id = format!("L{}_{}", level.number(), idx);
        cards.push(DevelopmentCard::new(id, level, bonus, points, cost));
    }

    Ok(cards)
}

fn number(line: usize, field: &'static str, value: &str) -> Result<u32, CatalogError> {
    value.parse().map_err(|_| invalid(line, field, value))
}

fn invalid(line: usize, field: &'static str, value: &str) -> CatalogError {
    CatalogError::InvalidField {
        line,
        field,
        value: value.to_string(),
    }
}

/// The 90 standard development cards, in table order.
pub fn standard_cards() -> Result<Vec<DevelopmentCard>, CatalogError> {
    parse_cards(STANDARD_CARDS_CSV)
}

/// The 10 standard nobles, 3 points each.
#[must_use]
pub fn standard_nobles() -> Vec<NobleTile> {
    use Color::{Black, Blue, Green, Red, White};

    vec![
        NobleTile::new("N1", 3, [(White, 4), (Blue, 4)]),
        NobleTile::new("N2", 3, [(Green, 4), (Red, 4)]),
        NobleTile::new("N3", 3, [(Black, 4), (White, 4)]),
        NobleTile::new("N4", 3, [(Blue, 4), (Green, 4)]),
        NobleTile::new("N5", 3, [(Red, 4), (Black, 4)]),
        NobleTile::new("N6", 3, [(White, 3), (Blue, 3), (Black, 3)]),
        NobleTile::new("N7", 3, [(Green, 3), (Red, 3), (Black, 3)]),
        NobleTile::new("N8", 3, [(White, 3), (Blue, 3), (Green, 3)]),
        NobleTile::new("N9", 3, [(Red, 3), (Green, 3), (Blue, 3)]),
        NobleTile::new("N10", 3, [(White, 3), (Red, 3), (Black, 3)]),
    ]
}

/// Split cards into per-level decks, each shuffled with its own stream.
pub fn build_decks(
    cards: Vec<DevelopmentCard>,
    rng: &GameRng,
) -> Result<ByLevel<Vector<DevelopmentCard>>, CatalogError> {
    let mut by_level: ByLevel<Vec<DevelopmentCard>> = ByLevel::default();
    for card in cards {
        by_level[card.level].push(card);
    }

    let mut decks = ByLevel::default();
    for level in CardLevel::ALL {
        let mut cards = std::mem::take(&mut by_level[level]);
        if cards.is_empty() {
            return Err(CatalogError::EmptyLevel(level));
        }
        rng.for_context(&format!("deck:{}", level.number()))
            .shuffle(&mut cards);
        decks[level] = Vector::from(cards);
    }
    Ok(decks)
}

/// Build the opening state for `player_count` players.
///
/// Bank of 4 per gem color plus 5 wildcards, 4 face-up cards per level,
/// `player_count + 1` nobles, turn 1 with player 0 to move.
pub fn setup_game_with(
    cards: Vec<DevelopmentCard>,
    nobles: Vec<NobleTile>,
    player_count: usize,
    rng: &GameRng,
) -> Result<GameState, CatalogError> {
    let mut decks = build_decks(cards, rng)?;

    let mut face_up: ByLevel<Vector<DevelopmentCard>> = ByLevel::default();
    for level in CardLevel::ALL {
        while face_up[level].len() < FACE_UP_PER_LEVEL {
            match decks[level].pop_front() {
                Some(card) => face_up[level].push_back(card),
                None => break,
            }
        }
    }

    let needed = player_count + 1;
    if nobles.len() < needed {
        return Err(CatalogError::NotEnoughNobles {
            needed,
            available: nobles.len(),
        });
    }
    let mut nobles = nobles;
    rng.for_context("nobles").shuffle(&mut nobles);
    nobles.truncate(needed);

    let bank = Color::GEMS
        .into_iter()
        .map(|c| (c, BANK_GEMS_PER_COLOR))
        .chain([(Color::Gold, BANK_WILDCARDS)])
        .fold(TokenBank::empty(), |bank, (c, n)| bank.deposit(c, n));

    debug!(seed = rng.seed(), player_count, "dealt opening board");

    let board = Board {
        bank,
        face_up,
        decks,
        nobles: Vector::from(nobles),
    };
    Ok(GameState::new(board, PlayerMap::new(player_count, Player::new)))
}

/// Build the standard two-player opening state.
pub fn setup_game(rng: &GameRng) -> Result<GameState, CatalogError> {
    setup_game_with(standard_cards()?, standard_nobles(), 2, rng)
}
