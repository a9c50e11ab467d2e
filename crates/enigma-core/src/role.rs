//! Agent roles

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two sides of an interrogation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Holds the hidden scenario and answers questions about it
    Judge,
    /// Asks questions and proposes solutions
    Detective,
}

impl Role {
    /// The role on the other side of the table
    pub fn counterpart(self) -> Self {
        match self {
            Self::Judge => Self::Detective,
            Self::Detective => Self::Judge,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Judge => "judge",
            Self::Detective => "detective",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
