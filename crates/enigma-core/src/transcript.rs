//! Canonical transcripts
//!
//! A [`Transcript`] is the provider-agnostic record of one agent's conversation.
//! Every entry is labelled relative to the owning agent: [`Speaker::Own`] for what
//! the agent said, [`Speaker::Other`] for what the counterpart said.

use serde::{Deserialize, Serialize};

use crate::error::TranscriptError;

/// Who produced an utterance, relative to the transcript's owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The agent that owns the transcript
    Own,
    /// The counterpart agent
    Other,
}

impl Speaker {
    /// Flip the frame of reference
    pub fn inverted(self) -> Self {
        match self {
            Self::Own => Self::Other,
            Self::Other => Self::Own,
        }
    }
}

/// A single immutable entry in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    /// Speaker relative to the owning agent
    pub speaker: Speaker,
    /// Verbatim text
    pub text: String,
    /// Position stamp, strictly increasing within a transcript
    pub ordinal: u64,
}

impl Utterance {
    pub fn new(speaker: Speaker, text: impl Into<String>, ordinal: u64) -> Self {
        Self {
            speaker,
            text: text.into(),
            ordinal,
        }
    }

    /// Same utterance seen from the counterpart's frame
    pub fn inverted(&self) -> Self {
        Self {
            speaker: self.speaker.inverted(),
            text: self.text.clone(),
            ordinal: self.ordinal,
        }
    }
}

/// Append-only log of utterances owned by a single agent
///
/// Serializes as the plain list of entries; deserializing goes through
/// [`Transcript::from_utterances`] so ordinals are validated on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Utterance>", into = "Vec<Utterance>")]
pub struct Transcript {
    entries: Vec<Utterance>,
    next_ordinal: u64,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a transcript from previously recorded utterances
    ///
    /// Ordinals must be strictly increasing; gaps are allowed.
    pub fn from_utterances(entries: Vec<Utterance>) -> Result<Self, TranscriptError> {
        for pair in entries.windows(2) {
            if pair[1].ordinal <= pair[0].ordinal {
                return Err(TranscriptError::NonMonotonicOrdinal {
                    previous: pair[0].ordinal,
                    found: pair[1].ordinal,
                });
            }
        }
        let next_ordinal = entries.last().map_or(0, |u| u.ordinal + 1);
        Ok(Self {
            entries,
            next_ordinal,
        })
    }

    /// Append an utterance, stamping it with the next ordinal
    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>) -> u64 {
        let ordinal = self.next_ordinal;
        self.entries.push(Utterance::new(speaker, text, ordinal));
        self.next_ordinal += 1;
        ordinal
    }

    pub fn entries(&self) -> &[Utterance] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Utterance> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Utterance> {
        self.entries.iter()
    }

    /// This transcript as the counterpart sees it
    pub fn project(&self) -> Vec<Utterance> {
        crate::projection::project(&self.entries)
    }
}

impl TryFrom<Vec<Utterance>> for Transcript {
    type Error = TranscriptError;

    fn try_from(entries: Vec<Utterance>) -> Result<Self, Self::Error> {
        Self::from_utterances(entries)
    }
}

impl From<Transcript> for Vec<Utterance> {
    fn from(transcript: Transcript) -> Self {
        transcript.entries
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Utterance;
    type IntoIter = std::slice::Iter<'a, Utterance>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
