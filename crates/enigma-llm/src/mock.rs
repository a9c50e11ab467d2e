//! Mock LLM provider for testing

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::provider::{
    ChatMessage, LlmError, LlmResponse, SessionBackend, SessionHandle, SessionSeed,
    SingleTurnBackend, StatelessBackend,
};

/// A call as the mock received it
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    OpenSession {
        session: SessionHandle,
        seed: SessionSeed,
    },
    SendInSession {
        session: SessionHandle,
        text: String,
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

/// A mock LLM provider that returns predefined responses
///
/// Implements every backend surface, so one mock can stand in for any provider
/// family. All calls are recorded for inspection.
#[derive(Debug)]
pub struct MockProvider {
    /// Name of this mock
    pub name: String,
    /// Canned responses (cycles through them)
    responses: Vec<String>,
    /// Current response index
    index: AtomicUsize,
    /// Simulated latency in ms
    latency_ms: u64,
    /// Transport failure to simulate on every call
    failure: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
    sessions: Mutex<HashSet<SessionHandle>>,
}

impl MockProvider {
    /// Create a new mock provider with given responses
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            name: "mock".to_string(),
            responses,
            index: AtomicUsize::new(0),
            latency_ms: 0,
            failure: None,
            calls: Mutex::new(Vec::new()),
            sessions: Mutex::new(HashSet::new()),
        }
    }

    /// Create a mock that always returns the same response
    pub fn constant(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Create a mock that plays back a script in order, then starts over
    pub fn scripted<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self::new(responses.into_iter().map(Into::into).collect())
    }

    /// Create a mock whose transport always fails
    pub fn failing(reason: &str) -> Self {
        let mut mock = Self::new(Vec::new());
        mock.failure = Some(reason.to_string());
        mock
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Everything received so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of sessions currently open
    pub fn open_sessions(&self) -> usize {
        lock(&self.sessions).len()
    }

    fn record(&self, call: RecordedCall) {
        lock(&self.calls).push(call);
    }

    async fn respond(&self) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();

        if self.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;
        }
        if let Some(reason) = &self.failure {
            return Err(LlmError::ConnectionFailed(reason.clone()));
        }

        let content = if self.responses.is_empty() {
            String::new()
        } else {
            let idx = self.index.fetch_add(1, Ordering::Relaxed);
            self.responses[idx % self.responses.len()].clone()
        };

        Ok(LlmResponse {
            tokens_used: Some((content.len() / 4) as u32 + 1),
            content,
            model: self.name.clone(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl SessionBackend for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open_session(&self, seed: SessionSeed) -> Result<SessionHandle, LlmError> {
        if let Some(reason) = &self.failure {
            return Err(LlmError::ConnectionFailed(reason.clone()));
        }
        let session = SessionHandle::new();
        lock(&self.sessions).insert(session);
        self.record(RecordedCall::OpenSession { session, seed });
        Ok(session)
    }

    async fn send_in_session(
        &self,
        session: &SessionHandle,
        text: &str,
    ) -> Result<LlmResponse, LlmError> {
        if !lock(&self.sessions).contains(session) {
            return Err(LlmError::UnknownSession(*session));
        }
        self.record(RecordedCall::SendInSession {
            session: *session,
            text: text.to_string(),
        });
        self.respond().await
    }

    async fn close_session(&self, session: &SessionHandle) {
        lock(&self.sessions).remove(session);
    }
}

#[async_trait]
impl StatelessBackend for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send_stateless(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        instruction: &str,
    ) -> Result<LlmResponse, LlmError> {
        self.record(RecordedCall::Stateless {
            system_prompt: system_prompt.to_string(),
            history: history.to_vec(),
            instruction: instruction.to_string(),
        });
        self.respond().await
    }
}

#[async_trait]
impl SingleTurnBackend for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send_single_turn(
        &self,
        system_prompt: &str,
        instruction: &str,
    ) -> Result<LlmResponse, LlmError> {
        self.record(RecordedCall::SingleTurn {
            system_prompt: system_prompt.to_string(),
            instruction: instruction.to_string(),
        });
        self.respond().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_mock_cycles() {
        let mock = MockProvider::scripted(["Sí", "No"]);

        let first = mock.send_single_turn("sys", "a").await.unwrap();
        let second = mock.send_single_turn("sys", "b").await.unwrap();
        let third = mock.send_single_turn("sys", "c").await.unwrap();

        assert_eq!(first.content, "Sí");
        assert_eq!(second.content, "No");
        assert_eq!(third.content, "Sí");
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_session_is_rejected() {
        let mock = MockProvider::constant("Sí");
        let err = mock
            .send_in_session(&SessionHandle::new(), "hola")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::UnknownSession(_)));
    }

    #[tokio::test]
    async fn test_closed_session_is_forgotten() {
        let mock = MockProvider::constant("Sí");
        let session = mock
            .open_session(SessionSeed {
                system_prompt: "sys".to_string(),
                acknowledgement: "ok".to_string(),
                history: Vec::new(),
            })
            .await
            .unwrap();
        assert_eq!(mock.open_sessions(), 1);

        mock.close_session(&session).await;
        assert_eq!(mock.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_failing_mock_reports_connection_error() {
        let mock = MockProvider::failing("connection refused");
        let err = mock.send_stateless("sys", &[], "hola").await.unwrap_err();
        assert!(matches!(err, LlmError::ConnectionFailed(_)));
    }
}
