//! The Detective: asks questions until it can propose a solution

use enigma_core::{Role, Transcript};
use enigma_llm::ProviderAdapter;

use crate::agent::Agent;
use crate::error::GameError;
use crate::protocol::ASK_INSTRUCTION;

#[derive(Debug)]
pub struct Detective {
    agent: Agent,
}

impl Detective {
    pub fn new(system_prompt: impl Into<String>, adapter: ProviderAdapter) -> Self {
        Self {
            agent: Agent::new(Role::Detective, system_prompt, adapter),
        }
    }

    pub fn from_agent(agent: Agent) -> Self {
        Self { agent }
    }

    /// Ask the backend for the next question or solution
    pub async fn next_move(&mut self, judge: &Transcript) -> Result<String, GameError> {
        self.agent.produce_utterance(judge, ASK_INSTRUCTION).await
    }

    pub fn transcript(&self) -> &Transcript {
        self.agent.transcript()
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }
}
