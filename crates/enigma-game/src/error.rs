//! Error types for a game run

use enigma_core::TranscriptError;
use enigma_llm::AdapterError;
use thiserror::Error;

/// Anything that aborts a game run
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
    #[error("Judge asked to reply with no Detective move pending")]
    NoPendingMove,
    #[error("Game already terminated")]
    AlreadyTerminated,
}
