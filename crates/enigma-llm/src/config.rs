//! Configuration management for Enigma
//!
//! Handles API keys, provider endpoints, and call limits.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::adapter::DEFAULT_CALL_TIMEOUT;

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Gemini API key (env: GEMINI_API_KEY)
    pub gemini_api_key: Option<String>,
    /// Anthropic API key (env: ANTHROPIC_API_KEY)
    pub anthropic_api_key: Option<String>,
    /// Ollama base URL (default: http://localhost:11434)
    pub ollama_url: String,
    /// Per-call timeout in seconds (env: ENIGMA_CALL_TIMEOUT_SECS)
    pub call_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            anthropic_api_key: None,
            ollama_url: "http://localhost:11434".to_string(),
            call_timeout_secs: DEFAULT_CALL_TIMEOUT.as_secs(),
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let call_timeout_secs = match env::var("ENIGMA_CALL_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => DEFAULT_CALL_TIMEOUT.as_secs(),
        };

        Ok(Self {
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
            ollama_url: non_empty_var("OLLAMA_BASE_URL")
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            call_timeout_secs,
        })
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Get API key for a provider, failing if it is not set
    pub fn api_key(&self, provider: &str) -> Result<&str, ConfigError> {
        let (key, var) = match provider.to_lowercase().as_str() {
            "gemini" => (self.gemini_api_key.as_deref(), "GEMINI_API_KEY"),
            "anthropic" => (self.anthropic_api_key.as_deref(), "ANTHROPIC_API_KEY"),
            other => {
                return Err(ConfigError::Invalid(format!(
                    "provider {} takes no API key",
                    other
                )))
            }
        };
        key.ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    }

    /// Check if a provider is configured
    pub fn is_configured(&self, provider: &str) -> bool {
        match provider.to_lowercase().as_str() {
            "gemini" => self.gemini_api_key.is_some(),
            "anthropic" => self.anthropic_api_key.is_some(),
            "ollama" | "mock" => true, // Always available
            _ => false,
        }
    }

    /// List available providers
    pub fn available_providers(&self) -> Vec<&str> {
        let mut providers = vec!["mock", "ollama"];
        if self.gemini_api_key.is_some() {
            providers.push("gemini");
        }
        if self.anthropic_api_key.is_some() {
            providers.push("anthropic");
        }
        providers
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid(
            "ENIGMA_CALL_TIMEOUT_SECS must be positive".to_string(),
        )),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::Invalid(format!(
            "ENIGMA_CALL_TIMEOUT_SECS={}: {}",
            raw, e
        ))),
    }
}
