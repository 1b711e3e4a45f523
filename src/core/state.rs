//! Game state: board, players and turn metadata.
//!
//! ## Board
//!
//! Shared table: token bank, face-up rows, remaining decks and available
//! nobles. Rows and decks are `im::Vector`, so a state clone shares
//! structure and an update copies only what it changes.
//!
//! ## GameState
//!
//! The complete aggregate. Transitions take a state by value and return a
//! new one; nothing mutates a state another holder can observe.
//!
//! ## PublicGameState
//!
//! What a move provider is shown: everything except deck contents, which
//! are replaced by their sizes.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::cards::{ByLevel, CardLevel, DevelopmentCard, NobleTile};
use super::player::{Player, PlayerId, PlayerMap};
use super::tokens::{Color, TokenBank};

/// Face-up cards per level.
pub const FACE_UP_PER_LEVEL: usize = 4;

/// Shared table state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub bank: TokenBank,
    pub face_up: ByLevel<Vector<DevelopmentCard>>,
    /// Drawn from the front.
    pub decks: ByLevel<Vector<DevelopmentCard>>,
    pub nobles: Vector<NobleTile>,
}

impl Board {
    /// Locate a face-up card by id.
    #[must_use]
    pub fn find_face_up(&self, card_id: &str) -> Option<(CardLevel, usize)> {
        CardLevel::ALL.into_iter().find_map(|level| {
            self.face_up[level]
                .iter()
                .position(|c| c.id == card_id)
                .map(|pos| (level, pos))
        })
    }

    /// Remove the face-up card at `pos` of `level`, refilling the slot from
    /// that level's deck when it still has cards.
    pub fn take_face_up(&mut self, level: CardLevel, pos: usize) -> Option<DevelopmentCard> {
        if pos >= self.face_up[level].len() {
            return None;
        }
        let card = self.face_up[level].remove(pos);
        if let Some(replacement) = self.decks[level].pop_front() {
            self.face_up[level].insert(pos, replacement);
        }
        Some(card)
    }

    /// Draw the top card of a deck.
    pub fn draw(&mut self, level: CardLevel) -> Option<DevelopmentCard> {
        self.decks[level].pop_front()
    }
}

/// Complete game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub players: PlayerMap<Player>,
    pub current_player: PlayerId,
    /// Starts at 1; increments when play wraps back to the first seat.
    pub turn: u32,
    pub game_over: bool,
    /// Set once any score reaches the target; never cleared.
    #[serde(default)]
    pub end_triggered: bool,
    pub winner_reason: Option<String>,
}

impl GameState {
    /// Create a state at the start of turn 1 with player 0 to move.
    #[must_use]
    pub fn new(board: Board, players: PlayerMap<Player>) -> Self {
        Self {
            board,
            players,
            current_player: PlayerId::new(0),
            turn: 1,
            game_over: false,
            end_triggered: false,
            winner_reason: None,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn current(&self) -> &Player {
        &self.players[self.current_player]
    }

    /// Tokens in the bank plus every player's holdings, per color.
    #[must_use]
    pub fn token_total(&self, color: Color) -> u32 {
        self.board.bank.count(color)
            + self
                .players
                .values()
                .map(|p| p.tokens.count(color))
                .sum::<u32>()
    }

    /// Scores in seat order.
    #[must_use]
    pub fn scores(&self) -> Vec<u32> {
        self.players.values().map(|p| p.score).collect()
    }

    /// The provider-visible view of this state.
    #[must_use]
    pub fn public_view(&self) -> PublicGameState {
        PublicGameState {
            bank: self.board.bank.clone(),
            face_up: self.board.face_up.clone(),
            deck_sizes: self.board.decks.map(Vector::len),
            nobles: self.board.nobles.clone(),
            players: self.players.clone(),
            current_player: self.current_player,
            turn: self.turn,
            game_over: self.game_over,
        }
    }
}

/// Game state without hidden deck contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicGameState {
    pub bank: TokenBank,
    pub face_up: ByLevel<Vector<DevelopmentCard>>,
    pub deck_sizes: ByLevel<usize>,
    pub nobles: Vector<NobleTile>,
    pub players: PlayerMap<Player>,
    pub current_player: PlayerId,
    pub turn: u32,
    pub game_over: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, level: CardLevel) -> DevelopmentCard {
        DevelopmentCard::new(id, level, Color::Red, 0, [(Color::Blue, 1)])
    }

    fn board() -> Board {
        let mut face_up: ByLevel<Vector<DevelopmentCard>> = ByLevel::default();
        face_up.level_1 = (0..4).map(|i| card(&format!("L1_{i}"), CardLevel::Level1)).collect();
        let mut decks: ByLevel<Vector<DevelopmentCard>> = ByLevel::default();
        decks.level_1 = Vector::from(vec![card("L1_9", CardLevel::Level1)]);
        Board {
            bank: TokenBank::new([(Color::Red, 4), (Color::Gold, 5)]).unwrap(),
            face_up,
            decks,
            nobles: Vector::new(),
        }
    }

    fn state() -> GameState {
        GameState::new(board(), PlayerMap::new(2, Player::new))
    }

    #[test]
    fn test_take_face_up_refills_in_place() {
        let mut board = board();
        let taken = board.take_face_up(CardLevel::Level1, 1).unwrap();

        assert_eq!(taken.id, "L1_1");
        assert_eq!(board.face_up.level_1.len(), 4);
        assert_eq!(board.face_up.level_1[1].id, "L1_9");
        assert!(board.decks.level_1.is_empty());

        // Deck exhausted: row shrinks.
        board.take_face_up(CardLevel::Level1, 0).unwrap();
        assert_eq!(board.face_up.level_1.len(), 3);
    }

    #[test]
    fn test_clone_does_not_alias_rows() {
        let original = state();
        let mut next = original.clone();
        next.board.take_face_up(CardLevel::Level1, 0);

        assert_eq!(original.board.face_up.level_1[0].id, "L1_0");
        assert_eq!(original.board.decks.level_1.len(), 1);
    }

    #[test]
    fn test_find_face_up() {
        let board = board();
        assert_eq!(board.find_face_up("L1_2"), Some((CardLevel::Level1, 2)));
        assert!(board.find_face_up("L1_9").is_none());
    }

    #[test]
    fn test_public_view_hides_decks() {
        let view = state().public_view();
        assert_eq!(view.deck_sizes.level_1, 1);

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("L1_9"));
    }

    #[test]
    fn test_token_total() {
        let mut state = state();
        state.players[PlayerId::new(0)].tokens = TokenBank::new([(Color::Red, 2)]).unwrap();
        assert_eq!(state.token_total(Color::Red), 6);
        assert_eq!(state.token_total(Color::Gold), 5);
    }

    #[test]
    fn test_state_round_trips_json() {
        let state = state();
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
