//! Hidden scenario and its public opening

use serde::{Deserialize, Serialize};
use thiserror::Error;

const OPENING_START: &str = "<Black Story inicial>";
const OPENING_END: &str = "</Black Story inicial>";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("Judge prompt has no <Black Story inicial> section")]
    MissingOpening,
    #[error("Opening section is empty")]
    EmptyOpening,
}

/// What the Judge knows, and what everyone is told
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Full Judge system prompt, hidden solution included
    pub system_prompt: String,
    /// The story as announced to the Detective
    pub opening: String,
}

impl Scenario {
    pub fn new(system_prompt: impl Into<String>, opening: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            opening: opening.into(),
        }
    }

    /// Read the opening out of the tagged section of a Judge prompt
    pub fn from_judge_prompt(prompt: impl Into<String>) -> Result<Self, ScenarioError> {
        let system_prompt = prompt.into();
        let start = system_prompt
            .find(OPENING_START)
            .ok_or(ScenarioError::MissingOpening)?
            + OPENING_START.len();
        let end = system_prompt[start..]
            .find(OPENING_END)
            .ok_or(ScenarioError::MissingOpening)?
            + start;

        let opening = system_prompt[start..end].trim().to_string();
        if opening.is_empty() {
            return Err(ScenarioError::EmptyOpening);
        }
        Ok(Self {
            system_prompt,
            opening,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_is_extracted_and_trimmed() {
        let prompt = "Eres el juez.\n<Black Story inicial>\n  Un hombre aparece muerto en un campo.\n\
            </Black Story inicial>\nSolución: paracaídas.";
        let scenario = Scenario::from_judge_prompt(prompt).unwrap();

        assert_eq!(scenario.opening, "Un hombre aparece muerto en un campo.");
        assert_eq!(scenario.system_prompt, prompt);
    }

    #[test]
    fn test_missing_tags() {
        assert_eq!(
            Scenario::from_judge_prompt("Eres el juez."),
            Err(ScenarioError::MissingOpening)
        );
        assert_eq!(
            Scenario::from_judge_prompt("<Black Story inicial> sin cierre"),
            Err(ScenarioError::MissingOpening)
        );
    }

    #[test]
    fn test_closing_tag_before_opening_tag_is_missing() {
        let prompt = "</Black Story inicial> x <Black Story inicial>";
        assert_eq!(
            Scenario::from_judge_prompt(prompt),
            Err(ScenarioError::MissingOpening)
        );
    }

    #[test]
    fn test_blank_opening() {
        assert_eq!(
            Scenario::from_judge_prompt("<Black Story inicial>  </Black Story inicial>"),
            Err(ScenarioError::EmptyOpening)
        );
    }
}
