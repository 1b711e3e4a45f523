//! Splendor rules: validation, state transitions and end-of-turn bookkeeping.
//!
//! ## Turn finalization
//!
//! After every applied action:
//! 1. The acting player is visited by the first reachable noble in board
//!    order, at most one per turn.
//! 2. Any score at or above 15 sets the sticky end trigger.
//! 3. Play rotates; the turn counter increments when it wraps to seat 0.
//! 4. The game ends only when the trigger is set and play has just
//!    wrapped, so the round that reached 15 is always completed.

use tracing::debug;

use crate::core::{
    tokens, CardLevel, Color, DevelopmentCard, GameAction, GameState, Player, PlayerId, TokenCounts,
    MAX_RESERVED,
};

use super::engine::{GameResult, RulesEngine, WinMargin};
use super::error::RuleViolation;

/// Most tokens a player may hold at the end of a turn.
pub const MAX_TOKENS: u32 = 10;
/// Score that triggers the final round.
pub const WINNING_SCORE: u32 = 15;
/// Bank count a color needs before two of it may be taken.
pub const DOUBLE_TAKE_MIN_BANK: u32 = 4;

/// The standard rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct SplendorRules;

/// Where a purchasable card currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CardSource {
    Board(CardLevel, usize),
    Reserved(usize),
}

impl SplendorRules {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_take(
        &self,
        state: &GameState,
        tokens: &TokenCounts,
        returns: &TokenCounts,
    ) -> Result<(), RuleViolation> {
        let taking = positive(tokens);
        if taking.keys().any(|c| c.is_wildcard()) {
            return Err(RuleViolation::WildcardTaken);
        }

        let bank = &state.board.bank;
        let total = tokens::total(&taking);
        let distinct = taking.len();
        match total {
            3 => {
                if distinct != 3 {
                    return Err(RuleViolation::NotThreeDistinct { distinct });
                }
                if let Some(&color) = taking.keys().find(|&&c| bank.count(c) < 1) {
                    return Err(RuleViolation::BankEmpty { color });
                }
            }
            2 => {
                if distinct != 1 {
                    return Err(RuleViolation::TwoTakeMultipleColors { distinct });
                }
                if let Some(&color) = taking.keys().next() {
                    let available = bank.count(color);
                    if available < DOUBLE_TAKE_MIN_BANK {
                        return Err(RuleViolation::InsufficientBankForDouble { color, available });
                    }
                }
            }
            _ => return Err(RuleViolation::InvalidTakeCount { total }),
        }

        check_returns(state.current(), &taking, returns)
    }

    fn validate_reserve(
        &self,
        state: &GameState,
        card_id: Option<&str>,
        deck_level: Option<CardLevel>,
        returns: &TokenCounts,
    ) -> Result<(), RuleViolation> {
        let player = state.current();
        if player.reserved.len() >= MAX_RESERVED {
            return Err(RuleViolation::ReserveLimitReached {
                limit: MAX_RESERVED,
            });
        }

        match (card_id, deck_level) {
            (Some(id), _) => {
                if state.board.find_face_up(id).is_none() {
                    return Err(RuleViolation::CardNotOnBoard {
                        card_id: id.to_string(),
                    });
                }
            }
            (None, Some(level)) => {
                if state.board.decks[level].is_empty() {
                    return Err(RuleViolation::DeckEmpty { level });
                }
            }
            (None, None) => return Err(RuleViolation::MissingReserveTarget),
        }

        check_returns(player, &wildcard_grant(state), returns)
    }

    fn validate_purchase(&self, state: &GameState, card_id: &str) -> Result<(), RuleViolation> {
        let player = state.current();
        let card = find_purchasable(state, card_id)
            .and_then(|source| card_at(state, source))
            .ok_or_else(|| RuleViolation::CardNotAvailable {
                card_id: card_id.to_string(),
            })?;

        let (_, needed) = payment(player, card);
        let held = player.tokens.count(Color::Gold);
        if needed > held {
            return Err(RuleViolation::InsufficientWildcards {
                card_id: card_id.to_string(),
                needed,
                held,
            });
        }
        Ok(())
    }

    /// Rotate to the next seat and close the game at a round boundary.
    fn advance(&self, mut state: GameState) -> GameState {
        let next = state.current_player.next(state.player_count());
        state.current_player = next;
        if next.index() == 0 {
            state.turn += 1;
            if state.end_triggered && !state.game_over {
                let result = rank(&state);
                debug!(turn = state.turn, %result, "game over");
                state.game_over = true;
                state.winner_reason = Some(result.to_string());
            }
        }
        state
    }
}

impl RulesEngine for SplendorRules {
    fn validate(&self, state: &GameState, action: &GameAction) -> Result<(), RuleViolation> {
        if state.game_over {
            return Err(RuleViolation::GameOver);
        }
        match action {
            GameAction::TakeTokens { tokens, returns } => {
                self.validate_take(state, tokens, returns)
            }
            GameAction::ReserveCard {
                card_id,
                deck_level,
                returns,
            } => self.validate_reserve(state, card_id.as_deref(), *deck_level, returns),
            GameAction::PurchaseCard { card_id } => self.validate_purchase(state, card_id),
        }
    }

    fn apply(&self, mut state: GameState, action: &GameAction) -> Result<GameState, RuleViolation> {
        self.validate(&state, action)?;
        let seat = state.current_player;

        match action {
            GameAction::TakeTokens { tokens, returns } => {
                let taking = positive(tokens);
                state.board.bank = state.board.bank.withdraw_all(&taking)?;
                let player = &mut state.players[seat];
                player.tokens = player.tokens.deposit_all(&taking);
                settle_returns(&mut state, seat, returns)?;
            }
            GameAction::ReserveCard {
                card_id,
                deck_level,
                returns,
            } => {
                let card = match (card_id, deck_level) {
                    (Some(id), _) => state
                        .board
                        .find_face_up(id)
                        .and_then(|(level, pos)| state.board.take_face_up(level, pos))
                        .ok_or_else(|| RuleViolation::CardNotOnBoard {
                            card_id: id.clone(),
                        })?,
                    (None, Some(level)) => state
                        .board
                        .draw(*level)
                        .ok_or(RuleViolation::DeckEmpty { level: *level })?,
                    (None, None) => return Err(RuleViolation::MissingReserveTarget),
                };
                state.players[seat].reserved.push(card);

                if state.board.bank.count(Color::Gold) > 0 {
                    state.board.bank = state.board.bank.withdraw(Color::Gold, 1)?;
                    let player = &mut state.players[seat];
                    player.tokens = player.tokens.deposit(Color::Gold, 1);
                }
                settle_returns(&mut state, seat, returns)?;
            }
            GameAction::PurchaseCard { card_id } => {
                let source = find_purchasable(&state, card_id).ok_or_else(|| {
                    RuleViolation::CardNotAvailable {
                        card_id: card_id.clone(),
                    }
                })?;
                let card = match source {
                    CardSource::Board(level, pos) => state.board.take_face_up(level, pos),
                    CardSource::Reserved(idx) => Some(state.players[seat].reserved.remove(idx)),
                }
                .ok_or_else(|| RuleViolation::CardNotAvailable {
                    card_id: card_id.clone(),
                })?;

                let (paid, deficit) = payment(&state.players[seat], &card);
                let player = &mut state.players[seat];
                player.tokens = player
                    .tokens
                    .withdraw_all(&paid)?
                    .withdraw(Color::Gold, deficit)?;
                state.board.bank = state
                    .board
                    .bank
                    .deposit_all(&paid)
                    .deposit(Color::Gold, deficit);

                *player.bonuses.entry(card.bonus).or_insert(0) += 1;
                player.score += card.points;
                player.purchased.push_back(card);
            }
        }

        Ok(self.finalize_turn(state))
    }

    fn finalize_turn(&self, mut state: GameState) -> GameState {
        let seat = state.current_player;

        let bonuses = &state.players[seat].bonuses;
        let reachable = state
            .board
            .nobles
            .iter()
            .position(|noble| noble.is_satisfied_by(bonuses));
        if let Some(pos) = reachable {
            let noble = state.board.nobles.remove(pos);
            debug!(player = %seat, noble = %noble.id, "noble visit");
            let player = &mut state.players[seat];
            player.score += noble.points;
            player.nobles.push_back(noble);
        }

        if state.players.values().any(|p| p.score >= WINNING_SCORE) {
            state.end_triggered = true;
        }

        self.advance(state)
    }

    fn forfeit_turn(&self, state: GameState) -> GameState {
        self.advance(state)
    }

    fn result(&self, state: &GameState) -> Option<GameResult> {
        state.game_over.then(|| rank(state))
    }
}

/// Rank players by score, then by fewest purchased cards.
///
/// Only the top two seats matter: an unresolved tie between them is a draw.
#[must_use]
pub fn rank(state: &GameState) -> GameResult {
    let mut order: Vec<&Player> = state.players.values().collect();
    order.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.purchased.len().cmp(&b.purchased.len()))
    });

    match order.as_slice() {
        [] => GameResult::Draw,
        [only] => GameResult::Winner {
            player: only.id,
            margin: WinMargin::Points,
        },
        [first, second, ..] => {
            if first.score > second.score {
                GameResult::Winner {
                    player: first.id,
                    margin: WinMargin::Points,
                }
            } else if first.purchased.len() < second.purchased.len() {
                GameResult::Winner {
                    player: first.id,
                    margin: WinMargin::TieBreaker,
                }
            } else {
                GameResult::Draw
            }
        }
    }
}

/// Per-color token payment and wildcard deficit for buying `card`.
///
/// For each cost color: `payable = max(0, cost - bonus)`,
/// `paid = min(payable, held)`, `deficit = payable - paid`.
#[must_use]
pub fn payment(player: &Player, card: &DevelopmentCard) -> (TokenCounts, u32) {
    let mut paid = TokenCounts::new();
    let mut deficit = 0;
    for (&color, &cost) in &card.cost {
        let payable = cost.saturating_sub(player.bonus(color));
        let used = payable.min(player.tokens.count(color));
        if used > 0 {
            paid.insert(color, used);
        }
        deficit += payable - used;
    }
    (paid, deficit)
}

fn positive(counts: &TokenCounts) -> TokenCounts {
    counts
        .iter()
        .filter(|(_, &n)| n > 0)
        .map(|(&c, &n)| (c, n))
        .collect()
}

/// The wildcard a reserve would grant, given the bank.
fn wildcard_grant(state: &GameState) -> TokenCounts {
    let mut grant = TokenCounts::new();
    if state.board.bank.count(Color::Gold) > 0 {
        grant.insert(Color::Gold, 1);
    }
    grant
}

/// Check the end-of-turn token limit and that every return is covered by
/// current holdings plus what this action gains.
fn check_returns(
    player: &Player,
    gained: &TokenCounts,
    returns: &TokenCounts,
) -> Result<(), RuleViolation> {
    let current = player.tokens.total();
    let gained_total = tokens::total(gained);
    let returned = tokens::total(returns);

    if current.saturating_add(gained_total).saturating_sub(returned) > MAX_TOKENS {
        return Err(RuleViolation::TokenLimitExceeded {
            limit: MAX_TOKENS,
            current,
            gained: gained_total,
            returned,
        });
    }

    for (&color, &requested) in returns {
        let available = player
            .tokens
            .count(color)
            .saturating_add(gained.get(&color).copied().unwrap_or(0));
        if requested > available {
            return Err(RuleViolation::ReturnExceedsHoldings {
                color,
                requested,
                available,
            });
        }
    }
    Ok(())
}

/// Move returned tokens from the player back to the bank.
fn settle_returns(
    state: &mut GameState,
    seat: PlayerId,
    returns: &TokenCounts,
) -> Result<(), RuleViolation> {
    let returns = positive(returns);
    if returns.is_empty() {
        return Ok(());
    }
    let player = &mut state.players[seat];
    player.tokens = player.tokens.withdraw_all(&returns)?;
    state.board.bank = state.board.bank.deposit_all(&returns);
    Ok(())
}

/// Board first, then the acting player's reserved hand.
fn find_purchasable(state: &GameState, card_id: &str) -> Option<CardSource> {
    state
        .board
        .find_face_up(card_id)
        .map(|(level, pos)| CardSource::Board(level, pos))
        .or_else(|| {
            state
                .current()
                .reserved
                .iter()
                .position(|c| c.id == card_id)
                .map(CardSource::Reserved)
        })
}

fn card_at(state: &GameState, source: CardSource) -> Option<&DevelopmentCard> {
    match source {
        CardSource::Board(level, pos) => state.board.face_up[level].get(pos),
        CardSource::Reserved(idx) => state.current().reserved.get(idx),
    }
}
