//! Anthropic Messages API provider
//!
//! Used in single-turn shape: the system prompt goes in the `system` field and
//! the conversation arrives flattened into one user message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::provider::{GenerationParams, LlmError, LlmResponse, SingleTurnBackend};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic API request format
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: String,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Anthropic provider
#[derive(Debug)]
pub struct AnthropicProvider {
    /// API key
    api_key: String,
    /// Model to use (e.g., "claude-3-5-sonnet-latest")
    model: String,
    params: GenerationParams,
    /// HTTP client
    client: reqwest::Client,
    /// Base URL
    base_url: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            params: GenerationParams::default(),
            client: reqwest::Client::new(),
            base_url: "https://api.anthropic.com".to_string(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

#[async_trait]
impl SingleTurnBackend for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn send_single_turn(
        &self,
        system_prompt: &str,
        instruction: &str,
    ) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let url = format!("{}/v1/messages", self.base_url);

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            system: system_prompt,
            messages: [Message {
                role: "user",
                content: instruction,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!(
                "Status: {}, Body: {}",
                status, body
            )));
        }

        let api_response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = api_response
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(LlmResponse {
            content,
            model: api_response.model,
            tokens_used: api_response
                .usage
                .map(|u| u.input_tokens + u.output_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires valid API key
    async fn test_anthropic() {
        let api_key = std::env::var("ANTHROPIC_API_KEY").expect("ANTHROPIC_API_KEY not set");
        let provider = AnthropicProvider::new(&api_key, "claude-3-5-haiku-latest")
            .with_params(GenerationParams::with_max_tokens(20));

        let response = provider
            .send_single_turn("Answer in one word.", "Say hello")
            .await
            .unwrap();
        assert!(!response.content.is_empty());
    }
}
