//! Instructions sent to a language-model player.

use crate::core::ReasoningHistory;

const RULES_AND_FORMAT: &str = r#"You are a Grandmaster Splendor AI player. Your goal is to reach 15 prestige points as efficiently as possible while preventing your opponent from doing the same.

### GAME RULES:

**TAKE_TOKENS:**
- Take EXACTLY 3 tokens of 3 DIFFERENT colors (set each to 1), OR
- Take EXACTLY 2 tokens of the SAME color (set one color to 2, only if 4+ available on board)
- INVALID: 1 token total, 2 different colors, or any other combination
- If total tokens would exceed 10, set return_* fields for tokens to discard

**RESERVE_CARD:**
- Set card_id to reserve a visible card (e.g., "L1_25")
- OR set deck_level to draw blind from a deck ("LEVEL_1", "LEVEL_2", "LEVEL_3")
- You receive 1 GOLD token if available; it counts toward the 10-token limit

**PURCHASE_CARD:**
- Set card_id to buy a card from the board or your reserved hand
- Your bonuses reduce the cost, GOLD tokens substitute any color

### CRITICAL MISTAKES TO AVOID:

1. **VERIFY CARDS EXIST**: Before specifying a card_id, confirm it appears in the current game state under "face_up" or your "reserved" list. Cards your opponent reserved, cards already purchased, or cards still in a deck are NOT available.

2. **COUNT YOUR TOKENS**: Before taking tokens, count your current total. Calculate: current + taking - returning <= 10.

3. **CHECK BOARD TOKEN SUPPLY**: Only take colors that have tokens in the bank. A color missing from the bank has 0 tokens.

4. **AVOID RETURNING TOKENS**: Returning tokens should be a last resort. At 10 tokens, prefer purchasing any affordable card or reserving one.

5. **SCORE POINTS, NOT JUST BONUSES**: Build bonuses early, then transition to buying prestige cards.

### RESPONSE FORMAT:

Respond with a single JSON object containing:
- "reasoning": Your strategic analysis (think step-by-step)
- "action_type": One of "TAKE_TOKENS", "RESERVE_CARD", "PURCHASE_CARD"
- Token fields: "take_WHITE", "take_BLUE", "take_GREEN", "take_RED", "take_BLACK" (each 0, 1, or 2)
- Return fields: "return_WHITE", "return_BLUE", "return_GREEN", "return_RED", "return_BLACK", "return_GOLD" (use if exceeding 10 tokens)
- "card_id": The exact card ID string (e.g., "L1_25") for reserve/purchase, or "" if not applicable
- "deck_level": "LEVEL_1", "LEVEL_2", "LEVEL_3" for blind reserve, or "" if not applicable

The action fields must EXACTLY match what you concluded in your reasoning.
"#;

/// System instructions, including the player's recent rationales.
#[must_use]
pub fn system_prompt(history: &ReasoningHistory) -> String {
    let mut prompt = String::from(RULES_AND_FORMAT);
    if !history.is_empty() {
        prompt.push_str(&format!(
            "\n### YOUR PREVIOUS REASONINGS (Last {} turns):\n",
            history.len()
        ));
        for (i, entry) in history.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, entry));
        }
    }
    prompt.push_str("\nCurrent game state follows below in JSON format.\n");
    prompt
}

/// Section appended after a rejected or unparsable move.
#[must_use]
pub fn retry_prompt(error: &str) -> String {
    format!(
        r#"
### ILLEGAL MOVE ERROR
Your previous action was **INVALID**. The game engine returned this error:
> {error}

COMMON MISTAKES:
- TAKE_TOKENS: Must set EXACTLY 3 colors to 1 each, OR set ONE color to 2. Not 1 token, not 2 different colors.
- RESERVE_CARD: card_id must be the exact ID like "L1_25", not empty when reserving a visible card
- PURCHASE_CARD: card_id must exactly match a card on the board or in your reserved hand

Re-analyze the game state and provide a corrected response. Make sure your action fields match your reasoning.
"#
    )
}

/// Full instructions for one attempt.
#[must_use]
pub fn instructions(history: &ReasoningHistory, retry_error: Option<&str>) -> String {
    let mut text = system_prompt(history);
    if let Some(error) = retry_error {
        text.push_str(&retry_prompt(error));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_numbered_oldest_first() {
        let mut history = ReasoningHistory::new();
        history.push("go blue");
        history.push("buy L1_3");

        let prompt = system_prompt(&history);
        assert!(prompt.contains("Last 2 turns"));
        let first = prompt.find("1. go blue").unwrap();
        let second = prompt.find("2. buy L1_3").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_no_history_section_when_empty() {
        let prompt = system_prompt(&ReasoningHistory::new());
        assert!(!prompt.contains("PREVIOUS REASONINGS"));
        assert!(prompt.ends_with("JSON format.\n"));
    }

    #[test]
    fn test_retry_section_quotes_error() {
        let text = instructions(&ReasoningHistory::new(), Some("deck LEVEL_3 is empty"));
        assert!(text.contains("ILLEGAL MOVE ERROR"));
        assert!(text.contains("> deck LEVEL_3 is empty"));

        let first_try = instructions(&ReasoningHistory::new(), None);
        assert!(!first_try.contains("ILLEGAL MOVE ERROR"));
    }
}
