//! Run configuration.
//!
//! `GameConfig` is read from an optional TOML file; any field left out takes
//! its default. The provider credential never lives in the file: it is read
//! from `OPENROUTER_API_KEY`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_BASE_URL: &str = "OPENROUTER_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_PLAYER0_MODEL: &str = "google/gemini-3-flash-preview";
pub const DEFAULT_PLAYER1_MODEL: &str = "anthropic/claude-haiku-4.5";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_MAX_ROUNDS: u32 = 500;

/// Configuration errors. All are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required credential: set the {key} environment variable")]
    MissingCredential { key: &'static str },
    #[error("read config file failed ({path}): {message}")]
    ReadConfigFile { path: String, message: String },
    #[error("parse config file failed ({path}): {message}")]
    ParseConfigFile { path: String, message: String },
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

/// Provider-side reasoning options for one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    pub enabled: bool,
    /// `low`, `medium` or `high`.
    pub effort: String,
    /// Keep the provider's reasoning trace out of the reply.
    pub exclude: bool,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            effort: "medium".to_string(),
            exclude: true,
        }
    }
}

/// One seat's model selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub model: String,
    #[serde(default)]
    pub reasoning: ReasoningConfig,
}

impl PlayerConfig {
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            reasoning: ReasoningConfig::default(),
        }
    }
}

/// Retry and timeout budget for provider calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_logic_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Cumulative transient-failure wait allowed per logic attempt.
    pub max_network_wait_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_logic_attempts: 3,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
            max_network_wait_ms: 600_000,
            request_timeout_ms: 120_000,
        }
    }
}

/// Full run configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Shuffle seed; random when absent.
    pub seed: Option<u64>,
    /// Wait for Enter before each provider call.
    pub semi_auto: bool,
    pub debug: bool,
    pub log_dir: PathBuf,
    /// Rounds before the run is aborted.
    pub max_rounds: u32,
    pub player0: PlayerConfig,
    pub player1: PlayerConfig,
    pub retry: RetryConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            semi_auto: false,
            debug: false,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            max_rounds: DEFAULT_MAX_ROUNDS,
            player0: PlayerConfig::new(DEFAULT_PLAYER0_MODEL),
            player1: PlayerConfig::new(DEFAULT_PLAYER1_MODEL),
            retry: RetryConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::ReadConfigFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|err| match err {
            ConfigError::ParseConfigFile { message, .. } => ConfigError::ParseConfigFile {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse TOML text and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig =
            toml::from_str(content).map_err(|err| ConfigError::ParseConfigFile {
                path: "<inline>".to_string(),
                message: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Model identifiers in seat order.
    #[must_use]
    pub fn models(&self) -> [String; 2] {
        [self.player0.model.clone(), self.player1.model.clone()]
    }

    /// Per-seat configuration in seat order.
    #[must_use]
    pub fn players(&self) -> [&PlayerConfig; 2] {
        [&self.player0, &self.player1]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, player) in [("player0.model", &self.player0), ("player1.model", &self.player1)] {
            if player.model.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: "model must not be empty".to_string(),
                });
            }
        }
        if self.retry.max_logic_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_logic_attempts",
                message: "at least one attempt is required".to_string(),
            });
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::InvalidValue {
                field: "retry.initial_backoff_ms",
                message: format!(
                    "{} exceeds max_backoff_ms {}",
                    self.retry.initial_backoff_ms, self.retry.max_backoff_ms
                ),
            });
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_rounds",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Provider endpoint and credential.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub api_key: String,
    pub base_url: String,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderCredentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn from_env_with<F>(mut getter: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api_key = getter(ENV_API_KEY)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingCredential { key: ENV_API_KEY })?;
        let base_url = getter(ENV_BASE_URL)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key: api_key.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.player0.model, DEFAULT_PLAYER0_MODEL);
        assert_eq!(config.player1.model, DEFAULT_PLAYER1_MODEL);
        assert_eq!(config.retry.max_logic_attempts, 3);
        assert_eq!(config.retry.initial_backoff_ms, 1_000);
        assert_eq!(config.retry.max_backoff_ms, 30_000);
        assert_eq!(config.retry.max_network_wait_ms, 600_000);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            seed = 42
            debug = true

            [player1]
            model = "openai/gpt-4o-mini"
            reasoning = { enabled = false }

            [retry]
            max_logic_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert!(config.debug);
        assert!(!config.semi_auto);
        assert_eq!(config.player0.model, DEFAULT_PLAYER0_MODEL);
        assert_eq!(config.player1.model, "openai/gpt-4o-mini");
        assert!(!config.player1.reasoning.enabled);
        assert_eq!(config.player1.reasoning.effort, "medium");
        assert_eq!(config.retry.max_logic_attempts, 5);
        assert_eq!(config.retry.max_backoff_ms, 30_000);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = GameConfig::from_toml_str("seed = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseConfigFile { .. }));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = GameConfig::from_toml_str("[retry]\nmax_logic_attempts = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "retry.max_logic_attempts",
                ..
            }
        ));

        let err = GameConfig::from_toml_str("[player0]\nmodel = \"  \"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadConfigFile { .. }));
    }

    #[test]
    fn test_credentials_from_env() {
        let creds = ProviderCredentials::from_env_with(|key| match key {
            ENV_API_KEY => Some(" sk-test ".to_string()),
            ENV_BASE_URL => Some("http://localhost:8080/v1/".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(creds.api_key, "sk-test");
        assert_eq!(creds.base_url, "http://localhost:8080/v1");
        assert!(!format!("{creds:?}").contains("sk-test"));
    }

    #[test]
    fn test_missing_credential() {
        let err = ProviderCredentials::from_env_with(|_| None).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential { key: ENV_API_KEY });

        let err = ProviderCredentials::from_env_with(|_| Some("   ".to_string())).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential { key: ENV_API_KEY });
    }
}
