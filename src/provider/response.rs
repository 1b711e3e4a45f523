//! Parsing a language-model reply into a move.
//!
//! The reply is a flat JSON object (`action_type`, `take_<COLOR>`,
//! `return_<COLOR>`, `card_id`, `deck_level`, `reasoning`). A flat shape is
//! easier for models to fill in reliably than a nested tagged action.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::{CardLevel, Color, GameAction, MoveProposal, TokenCounts};

use super::ProviderError;

const NO_REASONING: &str = "No reasoning provided.";

#[derive(Debug, Deserialize)]
struct FlatResponse {
    #[serde(default)]
    reasoning: Option<String>,
    action_type: String,
    #[serde(default, rename = "take_WHITE")]
    take_white: Option<i64>,
    #[serde(default, rename = "take_BLUE")]
    take_blue: Option<i64>,
    #[serde(default, rename = "take_GREEN")]
    take_green: Option<i64>,
    #[serde(default, rename = "take_RED")]
    take_red: Option<i64>,
    #[serde(default, rename = "take_BLACK")]
    take_black: Option<i64>,
    #[serde(default, rename = "return_WHITE")]
    return_white: Option<i64>,
    #[serde(default, rename = "return_BLUE")]
    return_blue: Option<i64>,
    #[serde(default, rename = "return_GREEN")]
    return_green: Option<i64>,
    #[serde(default, rename = "return_RED")]
    return_red: Option<i64>,
    #[serde(default, rename = "return_BLACK")]
    return_black: Option<i64>,
    #[serde(default, rename = "return_GOLD")]
    return_gold: Option<i64>,
    #[serde(default)]
    card_id: Option<String>,
    #[serde(default)]
    deck_level: Option<String>,
}

impl FlatResponse {
    fn takes(&self) -> TokenCounts {
        positive_counts([
            (Color::White, self.take_white),
            (Color::Blue, self.take_blue),
            (Color::Green, self.take_green),
            (Color::Red, self.take_red),
            (Color::Black, self.take_black),
        ])
    }

    fn returns(&self) -> TokenCounts {
        positive_counts([
            (Color::White, self.return_white),
            (Color::Blue, self.return_blue),
            (Color::Green, self.return_green),
            (Color::Red, self.return_red),
            (Color::Black, self.return_black),
            (Color::Gold, self.return_gold),
        ])
    }

    fn card_id(&self) -> Option<String> {
        self.card_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    fn deck_level(&self) -> Result<Option<CardLevel>, ProviderError> {
        match self.deck_level.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => CardLevel::parse(raw)
                .map(Some)
                .ok_or_else(|| ProviderError::format(format!("unknown deck_level {raw:?}"))),
        }
    }

    fn into_proposal(self) -> Result<MoveProposal, ProviderError> {
        let action = match self.action_type.trim().to_ascii_uppercase().as_str() {
            "TAKE_TOKENS" => GameAction::TakeTokens {
                tokens: self.takes(),
                returns: self.returns(),
            },
            "RESERVE_CARD" => GameAction::ReserveCard {
                card_id: self.card_id(),
                deck_level: self.deck_level()?,
                returns: self.returns(),
            },
            "PURCHASE_CARD" => GameAction::PurchaseCard {
                card_id: self
                    .card_id()
                    .ok_or_else(|| ProviderError::format("PURCHASE_CARD requires a card_id"))?,
            },
            other => {
                return Err(ProviderError::format(format!(
                    "unknown action_type {other:?}"
                )))
            }
        };

        let rationale = self
            .reasoning
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| NO_REASONING.to_string());
        Ok(MoveProposal { rationale, action })
    }
}

fn positive_counts<const N: usize>(fields: [(Color, Option<i64>); N]) -> TokenCounts {
    fields
        .into_iter()
        .filter_map(|(color, n)| {
            let n = u32::try_from(n?).ok()?;
            (n > 0).then_some((color, n))
        })
        .collect()
}

/// Remove surrounding markdown code fences.
fn strip_code_fences(raw: &str) -> &str {
    let mut content = raw.trim();
    if let Some(rest) = content.strip_prefix("```json") {
        content = rest;
    } else if let Some(rest) = content.strip_prefix("```") {
        content = rest;
    }
    if let Some(rest) = content.strip_suffix("```") {
        content = rest;
    }
    content.trim()
}

fn extract_json_block(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    raw.get(start..=end)
}

/// Parse model output into a move proposal.
pub fn parse_move(content: &str) -> Result<MoveProposal, ProviderError> {
    let content = strip_code_fences(content);
    let parsed: FlatResponse = match serde_json::from_str(content) {
        Ok(parsed) => parsed,
        Err(first_err) => extract_json_block(content)
            .and_then(|block| serde_json::from_str(block).ok())
            .ok_or_else(|| ProviderError::format(first_err.to_string()))?,
    };
    parsed.into_proposal()
}

/// Strict JSON schema for the flat reply, sent as the response format.
#[must_use]
pub fn response_schema() -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert("reasoning".into(), json!({ "type": "string" }));
    properties.insert(
        "action_type".into(),
        json!({ "type": "string", "enum": ["TAKE_TOKENS", "RESERVE_CARD", "PURCHASE_CARD"] }),
    );
    for color in Color::GEMS {
        properties.insert(format!("take_{color}"), json!({ "type": "integer" }));
    }
    for color in Color::ALL {
        properties.insert(format!("return_{color}"), json!({ "type": "integer" }));
    }
    properties.insert("card_id".into(), json!({ "type": "string" }));
    properties.insert(
        "deck_level".into(),
        json!({ "type": "string", "enum": ["", "LEVEL_1", "LEVEL_2", "LEVEL_3"] }),
    );
    let required: Vec<String> = properties.keys().cloned().collect();

    json!({
        "name": "game_action",
        "strict": true,
        "schema": {
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        }
    })
}
