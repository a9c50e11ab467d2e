//! Google Gemini provider
//!
//! Gemini chats are client-held sessions: the provider keeps each session's
//! contents and replays them to `generateContent`, so callers only ever send
//! the newest message. A session opens with the system prompt as a user turn
//! followed by an acknowledgement model turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::provider::{
    ChatMessage, ChatRole, GenerationParams, LlmError, LlmResponse, SessionBackend, SessionHandle,
    SessionSeed,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Part {
    text: String,
}

impl Content {
    fn new(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: &'a [Content],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

fn wire_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "model",
    }
}

/// Gemini requires alternating roles; adjacent turns from the same side are joined.
fn push_turn(contents: &mut Vec<Content>, role: &str, text: &str) {
    match contents.last_mut() {
        Some(last) if last.role == role => {
            if let Some(part) = last.parts.last_mut() {
                part.text.push_str("\n\n");
                part.text.push_str(text);
            }
        }
        _ => contents.push(Content::new(role, text)),
    }
}

fn seed_contents(seed: &SessionSeed) -> Vec<Content> {
    let mut contents = Vec::with_capacity(seed.history.len() + 2);
    push_turn(&mut contents, "user", &seed.system_prompt);
    push_turn(&mut contents, "model", &seed.acknowledgement);
    for ChatMessage { role, content } in &seed.history {
        push_turn(&mut contents, wire_role(*role), content);
    }
    contents
}

/// Gemini provider holding chat sessions client-side
#[derive(Debug)]
pub struct GeminiProvider {
    /// API key
    api_key: String,
    /// Model to use (e.g., "gemini-pro", "gemini-1.5-flash")
    model: String,
    params: GenerationParams,
    /// HTTP client
    client: reqwest::Client,
    /// Base URL
    base_url: String,
    sessions: RwLock<HashMap<SessionHandle, Vec<Content>>>,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            params: GenerationParams::default(),
            client: reqwest::Client::new(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    async fn generate(&self, contents: &[Content]) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: self.params.temperature,
                max_output_tokens: self.params.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
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

        let api_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join(""))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            tokens_used: api_response.usage_metadata.and_then(|u| u.total_token_count),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl SessionBackend for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn open_session(&self, seed: SessionSeed) -> Result<SessionHandle, LlmError> {
        let session = SessionHandle::new();
        self.sessions
            .write()
            .await
            .insert(session, seed_contents(&seed));
        Ok(session)
    }

    async fn send_in_session(
        &self,
        session: &SessionHandle,
        text: &str,
    ) -> Result<LlmResponse, LlmError> {
        let mut contents = self
            .sessions
            .read()
            .await
            .get(session)
            .cloned()
            .ok_or(LlmError::UnknownSession(*session))?;
        push_turn(&mut contents, "user", text);

        let response = self.generate(&contents).await?;

        // Only a completed exchange becomes part of the session.
        push_turn(&mut contents, "model", &response.content);
        self.sessions.write().await.insert(*session, contents);
        Ok(response)
    }

    async fn close_session(&self, session: &SessionHandle) {
        self.sessions.write().await.remove(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_starts_with_prompt_and_acknowledgement() {
        let seed = SessionSeed {
            system_prompt: "Eres el juez".to_string(),
            acknowledgement: "Entendido. Estoy listo para juzgar.".to_string(),
            history: vec![
                ChatMessage::assistant("Un hombre aparece muerto en un campo."),
                ChatMessage::user("¿Cayó de un avión?"),
            ],
        };

        let contents = seed_contents(&seed);
        let roles: Vec<&str> = contents.iter().map(|c| c.role.as_str()).collect();

        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(
            contents[1].parts[0].text,
            "Entendido. Estoy listo para juzgar.\n\nUn hombre aparece muerto en un campo."
        );
    }

    #[test]
    fn test_adjacent_user_turns_are_joined() {
        let mut contents = vec![Content::new("model", "¿Era de noche?")];
        push_turn(&mut contents, "user", "No");
        push_turn(&mut contents, "user", "Formula otra pregunta");

        assert_eq!(contents.len(), 2);
        assert_eq!(contents[1].parts[0].text, "No\n\nFormula otra pregunta");
    }

    #[tokio::test]
    async fn test_unknown_session_fails_before_network() {
        let provider = GeminiProvider::new("key", "gemini-pro");
        let err = provider
            .send_in_session(&SessionHandle::new(), "hola")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::UnknownSession(_)));
    }

    #[tokio::test]
    async fn test_close_forgets_session() {
        let provider = GeminiProvider::new("key", "gemini-pro");
        let session = provider
            .open_session(SessionSeed {
                system_prompt: "sys".to_string(),
                acknowledgement: "ok".to_string(),
                history: Vec::new(),
            })
            .await
            .unwrap();
        provider.close_session(&session).await;

        assert!(provider.sessions.read().await.is_empty());
    }
}
