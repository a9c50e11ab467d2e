//! An agent: one role, one backend, one transcript

use enigma_core::{merge_context, Role, Speaker, Transcript};
use enigma_llm::ProviderAdapter;

use crate::error::GameError;
use crate::protocol;

/// A conversational agent bound to a provider adapter.
///
/// The agent is the only writer of its own replies. Utterances from the
/// counterpart are recorded by the game loop through [`Agent::record_incoming`].
#[derive(Debug)]
pub struct Agent {
    role: Role,
    system_prompt: String,
    adapter: ProviderAdapter,
    transcript: Transcript,
}

impl Agent {
    /// Create an agent; session seeding uses the role's acknowledgement
    pub fn new(role: Role, system_prompt: impl Into<String>, adapter: ProviderAdapter) -> Self {
        Self {
            role,
            system_prompt: system_prompt.into(),
            adapter: adapter.with_acknowledgement(protocol::acknowledgement(role)),
            transcript: Transcript::new(),
        }
    }

    /// Resume from a previously recorded transcript
    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn adapter(&self) -> &ProviderAdapter {
        &self.adapter
    }

    /// Produce the next utterance given the counterpart's transcript.
    ///
    /// The counterpart's log is projected into this agent's frame, merged with
    /// its own log by ordinal, and handed to the adapter. The reply is
    /// appended as `Own` before it is returned.
    pub async fn produce_utterance(
        &mut self,
        other: &Transcript,
        instruction: &str,
    ) -> Result<String, GameError> {
        let incoming = other.project();
        let context = merge_context(self.transcript.entries(), &incoming)?;

        tracing::debug!(
            role = %self.role,
            provider = %self.adapter.backend_name(),
            context_len = context.len(),
            "Producing utterance"
        );

        let reply = self
            .adapter
            .call(&self.system_prompt, &context, instruction)
            .await
            .map_err(|e| {
                tracing::error!(role = %self.role, error = %e, "Backend call failed");
                e
            })?;

        let ordinal = self.transcript.append(Speaker::Own, reply.as_str());
        tracing::debug!(role = %self.role, ordinal, "Recorded own utterance");
        Ok(reply)
    }

    /// Record something the counterpart said
    pub fn record_incoming(&mut self, text: &str) -> u64 {
        self.transcript.append(Speaker::Other, text)
    }

    /// Record an utterance this agent makes without a backend call
    pub fn record_own(&mut self, text: &str) -> u64 {
        self.transcript.append(Speaker::Own, text)
    }

    /// Release the backend session, if any
    pub async fn close(&mut self) {
        self.adapter.close_session().await;
    }
}
