//! Backend call surfaces and common types
//!
//! Model providers disagree on who remembers the conversation. Three surfaces
//! cover the families we talk to:
//!
//! - [`SessionBackend`] keeps the history in a session; callers send one message at a time
//! - [`StatelessBackend`] remembers nothing; callers resend the whole history
//! - [`SingleTurnBackend`] takes a fixed preamble and exactly one instruction
//!
//! [`Backend`] is the tagged union the adapters are built from.

use async_trait::async_trait;
use enigma_core::{Speaker, Utterance};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::adapter::ProviderKind;

/// Errors from LLM providers
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("Unknown session: {0}")]
    UnknownSession(SessionHandle),
}

/// Wire-level role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl From<Speaker> for ChatRole {
    /// The agent's own turns are the model's turns; everything the counterpart
    /// said arrives as user input.
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::Own => Self::Assistant,
            Speaker::Other => Self::User,
        }
    }
}

/// A provider-neutral chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Utterance> for ChatMessage {
    fn from(utterance: &Utterance) -> Self {
        Self {
            role: utterance.speaker.into(),
            content: utterance.text.clone(),
        }
    }
}

/// Sampling parameters attached to a backend instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

impl GenerationParams {
    pub fn with_max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            ..Self::default()
        }
    }
}

/// Response from an LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text
    pub content: String,
    /// Model used
    pub model: String,
    /// Tokens used (if available)
    pub tokens_used: Option<u32>,
    /// Time taken in milliseconds
    pub latency_ms: u64,
}

/// Opaque reference to a backend-held conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionHandle(Uuid);

impl SessionHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a session needs at open time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSeed {
    /// Persona and rules for the agent
    pub system_prompt: String,
    /// Model-side turn confirming the system prompt
    pub acknowledgement: String,
    /// Conversation recorded before the session existed
    pub history: Vec<ChatMessage>,
}

/// Provider that keeps conversation state behind a session handle
#[async_trait]
pub trait SessionBackend: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Open a session primed with the seed
    async fn open_session(&self, seed: SessionSeed) -> Result<SessionHandle, LlmError>;

    /// Send one message into an open session
    async fn send_in_session(
        &self,
        session: &SessionHandle,
        text: &str,
    ) -> Result<LlmResponse, LlmError>;

    /// Release backend resources held for the session
    async fn close_session(&self, _session: &SessionHandle) {}
}

/// Provider that receives the full history on every call
#[async_trait]
pub trait StatelessBackend: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn send_stateless(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        instruction: &str,
    ) -> Result<LlmResponse, LlmError>;
}

/// Provider that accepts a preamble and a single instruction per call
#[async_trait]
pub trait SingleTurnBackend: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn send_single_turn(
        &self,
        system_prompt: &str,
        instruction: &str,
    ) -> Result<LlmResponse, LlmError>;
}

/// A backend tagged with its conversational-memory shape
#[derive(Debug, Clone)]
pub enum Backend {
    Session(Arc<dyn SessionBackend>),
    Stateless(Arc<dyn StatelessBackend>),
    SingleTurn(Arc<dyn SingleTurnBackend>),
}

impl Backend {
    /// The only adapter kind this backend can serve
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Session(_) => ProviderKind::StatefulSession,
            Self::Stateless(_) => ProviderKind::StatelessReplay,
            Self::SingleTurn(_) => ProviderKind::SingleTurn,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Session(b) => b.name(),
            Self::Stateless(b) => b.name(),
            Self::SingleTurn(b) => b.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_maps_to_chat_role() {
        let own = Utterance::new(Speaker::Own, "No", 3);
        let other = Utterance::new(Speaker::Other, "¿Era de noche?", 2);

        assert_eq!(ChatMessage::from(&own), ChatMessage::assistant("No"));
        assert_eq!(ChatMessage::from(&other), ChatMessage::user("¿Era de noche?"));
    }

    #[test]
    fn test_session_handles_are_unique() {
        assert_ne!(SessionHandle::new(), SessionHandle::new());
    }
}
