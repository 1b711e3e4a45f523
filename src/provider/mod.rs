//! Move providers: the external decision makers behind each seat.
//!
//! ## Key Types
//!
//! - `MoveProvider`: proposes one move for a given state and instructions
//! - `ProviderError`: transport, HTTP status or format failure, classified
//!   as transient (retry with backoff) or not (counts as a logic failure)
//! - `LlmMoveProvider`: a `MoveProvider` over any `CompletionClient`
//! - `OpenRouterClient`: the HTTP `CompletionClient`
//! - `ScriptedProvider`: replays canned replies

pub mod prompt;
pub mod response;
pub mod openrouter;
pub mod scripted;

use thiserror::Error;

use crate::core::{MoveProposal, PublicGameState};

pub use openrouter::{CompletionClient, CompletionRequest, LlmMoveProvider, OpenRouterClient};
pub use prompt::{instructions, retry_prompt, system_prompt};
pub use response::{parse_move, response_schema};
pub use scripted::{ScriptedProvider, Transcript};

/// Provider failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Timeout or connection-level failure.
    #[error("transport error: {message}")]
    Transport { message: String },
    /// Non-success HTTP status.
    #[error("http status {code}: {message}")]
    Status { code: u16, message: String },
    /// Reply not parsable into a move.
    #[error("response format error: {message}")]
    Format { message: String },
}

const NETWORK_HINTS: [&str; 5] = ["connection", "timeout", "timed out", "unknown host", "network"];

impl ProviderError {
    pub fn transport(message: impl Into<String>) -> Self {
        ProviderError::Transport {
            message: message.into(),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        ProviderError::Format {
            message: message.into(),
        }
    }

    /// Check if this failure indicates a network problem worth waiting out.
    ///
    /// Transport errors always are. HTTP 408, 429 and 5xx are. Anything
    /// else is transient only when its message mentions a network symptom.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Transport { .. } => true,
            ProviderError::Status { code, message } => {
                matches!(code, 408 | 429 | 500..=599) || mentions_network(message)
            }
            ProviderError::Format { message } => mentions_network(message),
        }
    }
}

fn mentions_network(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    NETWORK_HINTS.iter().any(|hint| lower.contains(hint))
}

/// A source of moves for one seat.
pub trait MoveProvider {
    /// Model identifier recorded in the event log.
    fn model(&self) -> &str;

    /// Propose a move for the acting player.
    fn propose_move(
        &mut self,
        state: &PublicGameState,
        instructions: &str,
    ) -> Result<MoveProposal, ProviderError>;
}

impl<P: MoveProvider + ?Sized> MoveProvider for Box<P> {
    fn model(&self) -> &str {
        (**self).model()
    }

    fn propose_move(
        &mut self,
        state: &PublicGameState,
        instructions: &str,
    ) -> Result<MoveProposal, ProviderError> {
        (**self).propose_move(state, instructions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::transport("anything").is_transient());
        for code in [408, 429, 500, 502, 503] {
            let err = ProviderError::Status {
                code,
                message: String::new(),
            };
            assert!(err.is_transient(), "{code}");
        }

        let bad_request = ProviderError::Status {
            code: 400,
            message: "invalid schema".into(),
        };
        assert!(!bad_request.is_transient());
        assert!(!ProviderError::format("expected value at line 1").is_transient());
    }

    #[test]
    fn test_network_message_is_transient() {
        let err = ProviderError::Status {
            code: 400,
            message: "upstream Connection reset".into(),
        };
        assert!(err.is_transient());
        assert!(ProviderError::format("Unknown host api.example").is_transient());
    }
}
