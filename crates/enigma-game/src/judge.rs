//! The Judge: holds the scenario, answers questions, rules on solutions

use enigma_core::{Role, Transcript};
use enigma_llm::ProviderAdapter;

use crate::agent::Agent;
use crate::error::GameError;
use crate::protocol::Verdict;
use crate::scenario::Scenario;

#[derive(Debug)]
pub struct Judge {
    agent: Agent,
    opening: String,
}

impl Judge {
    pub fn new(scenario: Scenario, adapter: ProviderAdapter) -> Self {
        Self {
            agent: Agent::new(Role::Judge, scenario.system_prompt, adapter),
            opening: scenario.opening,
        }
    }

    pub fn from_agent(agent: Agent, opening: impl Into<String>) -> Self {
        Self {
            agent,
            opening: opening.into(),
        }
    }

    /// Public summary of the scenario
    pub fn opening(&self) -> &str {
        &self.opening
    }

    /// Answer a yes/no question already recorded in this Judge's transcript
    pub async fn answer(
        &mut self,
        detective: &Transcript,
        question: &str,
    ) -> Result<String, GameError> {
        self.agent.produce_utterance(detective, question).await
    }

    /// Rule on a proposed solution.
    ///
    /// The proposal itself is the instruction; the Judge's system prompt
    /// carries the rule to answer with the affirmative literal when it is right.
    pub async fn verify(
        &mut self,
        detective: &Transcript,
        candidate: &str,
    ) -> Result<(String, Verdict), GameError> {
        let reply = self.agent.produce_utterance(detective, candidate).await?;
        let verdict = Verdict::classify(&reply);
        tracing::info!(verdict = ?verdict, "Judge ruled on a solution");
        Ok((reply, verdict))
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
