//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. The provider credential only ever lives
//! here and in the server-side adapter; it is never sent to the browser.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub allowed_origin: String,
    pub openai_api_key: String,
    pub openai_api_base: String,
    pub docs_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub session_ttl: Duration,
    pub max_sessions: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("log_level", &self.log_level)
            .field("allowed_origin", &self.allowed_origin)
            .field("openai_api_key", &"<redacted>")
            .field("openai_api_base", &self.openai_api_base)
            .field("docs_model", &self.docs_model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("session_ttl", &self.session_ttl)
            .field("max_sessions", &self.max_sessions)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Load Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:3000");

        // --- Load Provider Settings ---
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
        let openai_api_base = var_or("OPENAI_API_BASE", "https://api.aimlapi.com/v1");
        let docs_model = var_or("DOCS_MODEL", "meta-llama/Llama-3-8b-chat-hf");

        let max_tokens_str = var_or("DOCS_MAX_TOKENS", "1000");
        let max_tokens = max_tokens_str
            .parse::<u32>()
            .ok()
            .filter(|tokens| *tokens > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "DOCS_MAX_TOKENS".to_string(),
                    format!("'{}' is not a positive integer", max_tokens_str),
                )
            })?;

        let temperature_str = var_or("DOCS_TEMPERATURE", "0.3");
        let temperature = temperature_str
            .parse::<f32>()
            .ok()
            .filter(|t| (0.0..=2.0).contains(t))
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "DOCS_TEMPERATURE".to_string(),
                    format!("'{}' is not a number between 0.0 and 2.0", temperature_str),
                )
            })?;

        // --- Load Session Limits ---
        let session_ttl_str = var_or("SESSION_TTL_SECS", "1800");
        let session_ttl = session_ttl_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "SESSION_TTL_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", session_ttl_str),
                )
            })?;

        let max_sessions_str = var_or("MAX_SESSIONS", "1000");
        let max_sessions = max_sessions_str
            .parse::<usize>()
            .ok()
            .filter(|max| *max > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "MAX_SESSIONS".to_string(),
                    format!("'{}' is not a positive integer", max_sessions_str),
                )
            })?;

        Ok(Self {
            bind_address,
            log_level,
            allowed_origin,
            openai_api_key,
            openai_api_base,
            docs_model,
            max_tokens,
            temperature,
            session_ttl,
            max_sessions,
        })
    }
}
