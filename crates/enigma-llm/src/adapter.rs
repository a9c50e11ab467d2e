//! Provider adapters
//!
//! An adapter turns an agent's canonical context (its own transcript merged
//! with the projected counterpart transcript) plus a pending instruction into
//! the call shape its backend understands, then executes that call.
//!
//! The kind is fixed when the adapter is built and never re-checked per call.
//! Building is pure ([`ProviderAdapter::build_call`]); only
//! [`ProviderAdapter::call`] touches the network.

use enigma_core::{Speaker, Utterance};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::metrics::global_metrics;
use crate::provider::{
    Backend, ChatMessage, LlmError, LlmResponse, SessionBackend, SessionHandle, SessionSeed,
    SingleTurnBackend, StatelessBackend,
};

/// Model-side reply used to confirm a session's system prompt
pub const DEFAULT_ACKNOWLEDGEMENT: &str = "Entendido.";

/// Upper bound on a single backend call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Conversational-memory shape of a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// History lives server-side behind a session handle
    StatefulSession,
    /// Full history resent on every call
    StatelessReplay,
    /// One preamble plus one instruction, no structured history
    SingleTurn,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StatefulSession => "stateful-session",
            Self::StatelessReplay => "stateless-replay",
            Self::SingleTurn => "single-turn",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stateful-session" | "stateful" | "session" => Ok(Self::StatefulSession),
            "stateless-replay" | "stateless" | "replay" => Ok(Self::StatelessReplay),
            "single-turn" | "single" => Ok(Self::SingleTurn),
            other => Err(AdapterError::UnsupportedProviderKind(other.to_string())),
        }
    }
}

/// Errors from building or executing a provider call
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Unsupported provider kind: {0}")]
    UnsupportedProviderKind(String),
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(#[from] LlmError),
    #[error("Empty response from {provider}")]
    EmptyResponse { provider: String },
}

/// A fully-shaped call, ready to execute
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderRequest {
    /// First call of a stateful agent: seed a new session, then send the message
    OpenSession {
        seed: SessionSeed,
        message: String,
        /// Last ordinal covered by the seed history
        seeded_through: Option<u64>,
        /// Last ordinal resident once the message is delivered
        resident_through: Option<u64>,
    },
    /// Later calls of a stateful agent: only what the session has not seen
    SendInSession {
        session: SessionHandle,
        message: String,
        resident_through: Option<u64>,
    },
    Stateless {
        system_prompt: String,
        history: Vec<ChatMessage>,
        instruction: String,
    },
    SingleTurn {
        system_prompt: String,
        instruction: String,
    },
}

/// Live session bookkeeping for a stateful adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSession {
    pub handle: SessionHandle,
    /// Highest context ordinal the backend already holds
    pub resident_through: Option<u64>,
}

/// Context without the pending turn.
///
/// When the instruction is the counterpart's newest utterance (it was recorded
/// before the call), it is sent once as the instruction and dropped from history.
pub fn history_before_pending<'a>(context: &'a [Utterance], instruction: &str) -> &'a [Utterance] {
    match context.split_last() {
        Some((last, rest)) if last.speaker == Speaker::Other && last.text == instruction => rest,
        _ => context,
    }
}

/// Collapse history and instruction into one prompt for single-turn providers
pub fn flatten_history(history: &[Utterance], instruction: &str) -> String {
    if history.is_empty() {
        return instruction.to_string();
    }

    let mut prompt = String::from("Conversation so far:\n");
    for utterance in history {
        let label = match utterance.speaker {
            Speaker::Own => "You",
            Speaker::Other => "Counterpart",
        };
        let _ = writeln!(prompt, "{}: {}", label, utterance.text);
    }
    prompt.push('\n');
    prompt.push_str(instruction);
    prompt
}

async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, LlmError>>,
) -> Result<T, AdapterError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(AdapterError::from),
        Err(_) => Err(AdapterError::BackendUnavailable(LlmError::Timeout(timeout))),
    }
}

fn mismatched(kind: ProviderKind, request: &ProviderRequest) -> AdapterError {
    AdapterError::UnsupportedProviderKind(format!("{} adapter cannot execute {:?}", kind, request))
}

/// Adapter for providers that keep history behind a session
#[derive(Debug)]
pub struct SessionAdapter {
    backend: Arc<dyn SessionBackend>,
    session: Option<OpenSession>,
    acknowledgement: String,
    call_timeout: Duration,
}

impl SessionAdapter {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            session: None,
            acknowledgement: DEFAULT_ACKNOWLEDGEMENT.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn session(&self) -> Option<&OpenSession> {
        self.session.as_ref()
    }

    fn build_call(
        &self,
        system_prompt: &str,
        context: &[Utterance],
        instruction: &str,
    ) -> ProviderRequest {
        let history = history_before_pending(context, instruction);
        let resident_through = context.last().map(|u| u.ordinal);

        match &self.session {
            None => ProviderRequest::OpenSession {
                seed: SessionSeed {
                    system_prompt: system_prompt.to_string(),
                    acknowledgement: self.acknowledgement.clone(),
                    history: history.iter().map(ChatMessage::from).collect(),
                },
                message: instruction.to_string(),
                seeded_through: history.last().map(|u| u.ordinal),
                resident_through,
            },
            Some(open) => {
                // Own turns past the watermark came back as replies from this
                // very session, so only counterpart turns are new to it.
                let mut parts: Vec<&str> = history
                    .iter()
                    .filter(|u| u.speaker == Speaker::Other)
                    .filter(|u| open.resident_through.map_or(true, |seen| u.ordinal > seen))
                    .map(|u| u.text.as_str())
                    .collect();
                parts.push(instruction);

                ProviderRequest::SendInSession {
                    session: open.handle,
                    message: parts.join("\n\n"),
                    resident_through: resident_through.or(open.resident_through),
                }
            }
        }
    }

    async fn execute(&mut self, request: ProviderRequest) -> Result<LlmResponse, AdapterError> {
        match request {
            ProviderRequest::OpenSession {
                seed,
                message,
                seeded_through,
                resident_through,
            } => {
                let seed_len = seed.history.len();
                let handle = bounded(self.call_timeout, self.backend.open_session(seed)).await?;
                global_metrics().record_session_opened();
                tracing::info!(
                    provider = %self.backend.name(),
                    session = %handle,
                    seed_len,
                    "Opened backend session"
                );
                self.session = Some(OpenSession {
                    handle,
                    resident_through: seeded_through,
                });

                let response =
                    bounded(self.call_timeout, self.backend.send_in_session(&handle, &message))
                        .await?;
                self.mark_resident(resident_through);
                Ok(response)
            }
            ProviderRequest::SendInSession {
                session,
                message,
                resident_through,
            } => {
                let response =
                    bounded(self.call_timeout, self.backend.send_in_session(&session, &message))
                        .await?;
                self.mark_resident(resident_through);
                Ok(response)
            }
            other => Err(mismatched(ProviderKind::StatefulSession, &other)),
        }
    }

    fn mark_resident(&mut self, ordinal: Option<u64>) {
        if let Some(open) = self.session.as_mut() {
            open.resident_through = ordinal;
        }
    }

    async fn close(&mut self) {
        if let Some(open) = self.session.take() {
            self.backend.close_session(&open.handle).await;
            tracing::debug!(
                provider = %self.backend.name(),
                session = %open.handle,
                "Closed backend session"
            );
        }
    }
}

/// Adapter for providers that need the whole history every time
#[derive(Debug)]
pub struct ReplayAdapter {
    backend: Arc<dyn StatelessBackend>,
    call_timeout: Duration,
}

impl ReplayAdapter {
    pub fn new(backend: Arc<dyn StatelessBackend>) -> Self {
        Self {
            backend,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    fn build_call(
        &self,
        system_prompt: &str,
        context: &[Utterance],
        instruction: &str,
    ) -> ProviderRequest {
        ProviderRequest::Stateless {
            system_prompt: system_prompt.to_string(),
            history: history_before_pending(context, instruction)
                .iter()
                .map(ChatMessage::from)
                .collect(),
            instruction: instruction.to_string(),
        }
    }

    async fn execute(&mut self, request: ProviderRequest) -> Result<LlmResponse, AdapterError> {
        match request {
            ProviderRequest::Stateless {
                system_prompt,
                history,
                instruction,
            } => {
                bounded(
                    self.call_timeout,
                    self.backend.send_stateless(&system_prompt, &history, &instruction),
                )
                .await
            }
            other => Err(mismatched(ProviderKind::StatelessReplay, &other)),
        }
    }
}

/// Adapter for providers that take one instruction per call
#[derive(Debug)]
pub struct SingleTurnAdapter {
    backend: Arc<dyn SingleTurnBackend>,
    call_timeout: Duration,
}

impl SingleTurnAdapter {
    pub fn new(backend: Arc<dyn SingleTurnBackend>) -> Self {
        Self {
            backend,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    fn build_call(
        &self,
        system_prompt: &str,
        context: &[Utterance],
        instruction: &str,
    ) -> ProviderRequest {
        ProviderRequest::SingleTurn {
            system_prompt: system_prompt.to_string(),
            instruction: flatten_history(history_before_pending(context, instruction), instruction),
        }
    }

    async fn execute(&mut self, request: ProviderRequest) -> Result<LlmResponse, AdapterError> {
        match request {
            ProviderRequest::SingleTurn {
                system_prompt,
                instruction,
            } => {
                bounded(
                    self.call_timeout,
                    self.backend.send_single_turn(&system_prompt, &instruction),
                )
                .await
            }
            other => Err(mismatched(ProviderKind::SingleTurn, &other)),
        }
    }
}

/// A provider adapter, one variant per [`ProviderKind`]
#[derive(Debug)]
pub enum ProviderAdapter {
    StatefulSession(SessionAdapter),
    StatelessReplay(ReplayAdapter),
    SingleTurn(SingleTurnAdapter),
}

impl ProviderAdapter {
    /// Build an adapter of the requested kind.
    ///
    /// Fails when the backend does not implement that kind.
    pub fn new(kind: ProviderKind, backend: Backend) -> Result<Self, AdapterError> {
        if backend.kind() != kind {
            return Err(AdapterError::UnsupportedProviderKind(format!(
                "{} does not implement {}",
                backend.name(),
                kind
            )));
        }
        Ok(Self::for_backend(backend))
    }

    /// Build the adapter matching the backend's own shape
    pub fn for_backend(backend: Backend) -> Self {
        match backend {
            Backend::Session(b) => Self::StatefulSession(SessionAdapter::new(b)),
            Backend::Stateless(b) => Self::StatelessReplay(ReplayAdapter::new(b)),
            Backend::SingleTurn(b) => Self::SingleTurn(SingleTurnAdapter::new(b)),
        }
    }

    /// Bound every backend call by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        match &mut self {
            Self::StatefulSession(a) => a.call_timeout = timeout,
            Self::StatelessReplay(a) => a.call_timeout = timeout,
            Self::SingleTurn(a) => a.call_timeout = timeout,
        }
        self
    }

    /// Acknowledgement turn used when seeding a session; ignored by other kinds
    pub fn with_acknowledgement(mut self, acknowledgement: impl Into<String>) -> Self {
        if let Self::StatefulSession(a) = &mut self {
            a.acknowledgement = acknowledgement.into();
        }
        self
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::StatefulSession(_) => ProviderKind::StatefulSession,
            Self::StatelessReplay(_) => ProviderKind::StatelessReplay,
            Self::SingleTurn(_) => ProviderKind::SingleTurn,
        }
    }

    pub fn backend_name(&self) -> &str {
        match self {
            Self::StatefulSession(a) => a.backend.name(),
            Self::StatelessReplay(a) => a.backend.name(),
            Self::SingleTurn(a) => a.backend.name(),
        }
    }

    /// Current session, if this is a stateful adapter with one open
    pub fn session(&self) -> Option<&OpenSession> {
        match self {
            Self::StatefulSession(a) => a.session(),
            _ => None,
        }
    }

    /// Shape the next call without executing it
    pub fn build_call(
        &self,
        system_prompt: &str,
        context: &[Utterance],
        instruction: &str,
    ) -> ProviderRequest {
        match self {
            Self::StatefulSession(a) => a.build_call(system_prompt, context, instruction),
            Self::StatelessReplay(a) => a.build_call(system_prompt, context, instruction),
            Self::SingleTurn(a) => a.build_call(system_prompt, context, instruction),
        }
    }

    /// Shape and execute the next call, returning the trimmed reply
    pub async fn call(
        &mut self,
        system_prompt: &str,
        context: &[Utterance],
        instruction: &str,
    ) -> Result<String, AdapterError> {
        let request = self.build_call(system_prompt, context, instruction);
        let kind = self.kind();
        let provider = self.backend_name().to_string();
        tracing::debug!(
            provider = %provider,
            kind = %kind,
            context_len = context.len(),
            "Dispatching backend call"
        );

        let result = match self {
            Self::StatefulSession(a) => a.execute(request).await,
            Self::StatelessReplay(a) => a.execute(request).await,
            Self::SingleTurn(a) => a.execute(request).await,
        };

        let response = match result {
            Ok(response) => {
                global_metrics()
                    .record_backend_call(response.tokens_used.unwrap_or(0) as u64, false);
                response
            }
            Err(e) => {
                global_metrics().record_backend_call(0, true);
                tracing::warn!(
                    provider = %provider,
                    kind = %kind,
                    error = %e,
                    "Backend call failed"
                );
                return Err(e);
            }
        };

        let text = response.content.trim();
        if text.is_empty() {
            global_metrics().record_empty_response();
            return Err(AdapterError::EmptyResponse { provider });
        }

        tracing::debug!(
            provider = %provider,
            model = %response.model,
            latency_ms = response.latency_ms,
            "Backend replied"
        );
        Ok(text.to_string())
    }

    /// Tear down a stateful session; the next call seeds a fresh one
    pub async fn close_session(&mut self) {
        if let Self::StatefulSession(a) = self {
            a.close().await;
        }
    }
}
