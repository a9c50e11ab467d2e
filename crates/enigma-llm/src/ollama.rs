//! Ollama LLM provider for local inference
//!
//! `/api/chat` keeps no state between requests, so the full history travels
//! with every call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::provider::{
    ChatMessage, ChatRole, GenerationParams, LlmError, LlmResponse, StatelessBackend,
};

/// Ollama API request format
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama API response format
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaReply,
    model: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaReply {
    content: String,
}

/// Ollama provider for local LLM inference
#[derive(Debug)]
pub struct OllamaProvider {
    /// Base URL for Ollama API
    base_url: String,
    /// Model to use (e.g., "llama3", "mistral")
    model: String,
    params: GenerationParams,
    /// HTTP client
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider with default settings
    pub fn new(model: &str) -> Self {
        Self::with_url("http://localhost:11434", model)
    }

    /// Create with custom base URL
    pub fn with_url(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            params: GenerationParams::default(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Check if the Ollama server answers
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        self.client.get(&url).send().await.is_ok()
    }

    fn build_request<'a>(
        &'a self,
        system_prompt: &'a str,
        history: &'a [ChatMessage],
        instruction: &'a str,
    ) -> OllamaChatRequest<'a> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(OllamaMessage {
            role: "system",
            content: system_prompt,
        });
        messages.extend(history.iter().map(|m| OllamaMessage {
            role: match m.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            },
            content: &m.content,
        }));
        messages.push(OllamaMessage {
            role: "user",
            content: instruction,
        });

        OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.params.temperature,
                num_predict: self.params.max_tokens,
            },
        }
    }
}

#[async_trait]
impl StatelessBackend for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn send_stateless(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        instruction: &str,
    ) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&self.build_request(system_prompt, history, instruction))
            .send()
            .await
            .map_err(|e| LlmError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LlmError::RequestFailed(format!(
                "Status: {}",
                response.status()
            )));
        }

        let api_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(LlmResponse {
            content: api_response.message.content,
            model: api_response.model,
            tokens_used: api_response.eval_count,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
