//! Chat-completion transport and the language-model move provider.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::{MoveProposal, ProviderCredentials, PublicGameState, ReasoningConfig};

use super::response::{parse_move, response_schema};
use super::{MoveProvider, ProviderError};

/// One chat-completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub reasoning: ReasoningConfig,
}

/// Anything that can answer a completion request with raw text.
pub trait CompletionClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

/// OpenRouter-compatible `/chat/completions` client.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenRouterClient {
    pub fn new(credentials: &ProviderCredentials, timeout_ms: u64) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms.max(1)))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| ProviderError::transport(format!("client build failed: {err}")))?;

        Ok(Self {
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<ReasoningOptions<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: Value,
}

#[derive(Debug, Serialize)]
struct ReasoningOptions<'a> {
    effort: &'a str,
    exclude: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn request_body(request: &CompletionRequest) -> ChatCompletionRequest<'_> {
    ChatCompletionRequest {
        model: request.model.as_str(),
        messages: [
            ChatMessage {
                role: "system",
                content: request.system_prompt.as_str(),
            },
            ChatMessage {
                role: "user",
                content: request.user_prompt.as_str(),
            },
        ],
        response_format: ResponseFormat {
            kind: "json_schema",
            json_schema: response_schema(),
        },
        reasoning: request.reasoning.enabled.then(|| ReasoningOptions {
            effort: request.reasoning.effort.as_str(),
            exclude: request.reasoning.exclude,
        }),
    }
}

fn map_send_error(err: reqwest::Error) -> ProviderError {
    if err.is_decode() {
        ProviderError::format(err.to_string())
    } else {
        ProviderError::transport(err.to_string())
    }
}

impl CompletionClient for OpenRouterClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request_body(request))
            .send()
            .map_err(map_send_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().unwrap_or_else(|_| "<no body>".to_string());
            return Err(ProviderError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response.json().map_err(map_send_error)?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::format("empty completion choice"))
    }
}

/// A seat played by a language model behind a `CompletionClient`.
#[derive(Debug)]
pub struct LlmMoveProvider<C: CompletionClient> {
    model: String,
    reasoning: ReasoningConfig,
    client: C,
}

impl<C: CompletionClient> LlmMoveProvider<C> {
    pub fn new(model: impl Into<String>, reasoning: ReasoningConfig, client: C) -> Self {
        Self {
            model: model.into(),
            reasoning,
            client,
        }
    }
}

impl<C: CompletionClient> MoveProvider for LlmMoveProvider<C> {
    fn model(&self) -> &str {
        &self.model
    }

    fn propose_move(
        &mut self,
        state: &PublicGameState,
        instructions: &str,
    ) -> Result<MoveProposal, ProviderError> {
        let state_json = serde_json::to_string(state)
            .map_err(|err| ProviderError::format(format!("state serialization failed: {err}")))?;
        let request = CompletionRequest {
            model: self.model.clone(),
            system_prompt: instructions.to_string(),
            user_prompt: format!("Current game state: {state_json}"),
            reasoning: self.reasoning.clone(),
        };

        let output = self.client.complete(&request)?;
        debug!(model = %self.model, bytes = output.len(), "completion received");
        parse_move(&output)
    }
}
