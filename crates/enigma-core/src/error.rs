//! Transcript errors

use thiserror::Error;

/// Errors raised while building or combining transcripts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("Ordinal {found} does not follow {previous}")]
    NonMonotonicOrdinal { previous: u64, found: u64 },
    #[error("Transcripts disagree at ordinal {ordinal}")]
    Desync { ordinal: u64 },
}
