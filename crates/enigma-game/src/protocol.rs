//! Game protocol literals
//!
//! The keyword and the verdict are matched as written, with no case or
//! punctuation normalization.

use enigma_core::Role;
use serde::{Deserialize, Serialize};

/// Marks a Detective move as a solution proposal (substring match)
pub const SOLUTION_KEYWORD: &str = "SOLUCIÓN:";

/// The only Judge reply that confirms a solution (exact match)
pub const AFFIRMATIVE_VERDICT: &str = "Es correcto";

/// Instruction given to the Detective on every move
pub const ASK_INSTRUCTION: &str = "Formula una pregunta de sí/no o propone una solución \
    si crees que la tienes. Si propones una solución, usa la palabra clave 'SOLUCIÓN:'.";

/// Shown after a rejected solution
pub const REJECTION_LINE: &str = "No es correcto.";

/// Model-side acknowledgement used when seeding a session for `role`
pub fn acknowledgement(role: Role) -> &'static str {
    match role {
        Role::Judge => "Entendido. Estoy listo para juzgar.",
        Role::Detective => "Entendido. Estoy listo para investigar.",
    }
}

pub fn is_solution_proposal(utterance: &str) -> bool {
    utterance.contains(SOLUTION_KEYWORD)
}

/// Outcome of a solution check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    /// Classify a Judge reply
    pub fn classify(reply: &str) -> Self {
        if reply == AFFIRMATIVE_VERDICT {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    pub fn is_correct(self) -> bool {
        self == Self::Correct
    }
}
