//! History projection between the two agents' frames
//!
//! Every transcript is labelled relative to its owner, so handing one agent's
//! log to the other requires inverting each speaker. This is the only place in
//! the workspace where that inversion happens.

use std::cmp::Ordering;

use crate::error::TranscriptError;
use crate::transcript::Utterance;

/// Re-label a transcript for the counterpart agent.
///
/// Text and ordinals are untouched; only speakers flip. Inversion is its own
/// inverse, so projecting twice yields the original labels.
pub fn project(entries: &[Utterance]) -> Vec<Utterance> {
    entries.iter().map(Utterance::inverted).collect()
}

/// Interleave an agent's own log with a projected counterpart log by ordinal.
///
/// Lockstepped transcripts carry the same utterance under the same ordinal in
/// both logs; those pairs collapse into a single entry. A pair that disagrees on
/// text or speaker means the logs drifted apart.
pub fn merge_context(
    own: &[Utterance],
    incoming: &[Utterance],
) -> Result<Vec<Utterance>, TranscriptError> {
    let mut merged = Vec::with_capacity(own.len().max(incoming.len()));
    let (mut i, mut j) = (0, 0);

    while i < own.len() || j < incoming.len() {
        let next = match (own.get(i), incoming.get(j)) {
            (Some(mine), Some(theirs)) => match mine.ordinal.cmp(&theirs.ordinal) {
                Ordering::Less => {
                    i += 1;
                    mine
                }
                Ordering::Greater => {
                    j += 1;
                    theirs
                }
                Ordering::Equal => {
                    if mine.text != theirs.text || mine.speaker != theirs.speaker {
                        tracing::warn!(ordinal = mine.ordinal, "Transcript desync detected");
                        return Err(TranscriptError::Desync {
                            ordinal: mine.ordinal,
                        });
                    }
                    i += 1;
                    j += 1;
                    mine
                }
            },
            (Some(mine), None) => {
                i += 1;
                mine
            }
            (None, Some(theirs)) => {
                j += 1;
                theirs
            }
            (None, None) => break,
        };
        merged.push(next.clone());
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Speaker, Transcript};

    #[test]
    fn test_empty_projects_to_empty() {
        assert!(project(&[]).is_empty());
    }

    #[test]
    fn test_projection_inverts_speakers_only() {
        let mut judge = Transcript::new();
        judge.append(Speaker::Other, "¿El personaje murió en una isla?");
        judge.append(Speaker::Own, "No");

        let projected = judge.project();

        assert_eq!(projected[0].speaker, Speaker::Own);
        assert_eq!(projected[0].text, "¿El personaje murió en una isla?");
        assert_eq!(projected[1].speaker, Speaker::Other);
        assert_eq!(projected[1].ordinal, 1);
    }

    #[test]
    fn test_merge_collapses_lockstepped_pairs() {
        let mut detective = Transcript::new();
        let mut judge = Transcript::new();
        detective.append(Speaker::Own, "¿Había alguien más?");
        judge.append(Speaker::Other, "¿Había alguien más?");
        judge.append(Speaker::Own, "Sí");
        detective.append(Speaker::Other, "Sí");

        let merged = merge_context(detective.entries(), &judge.project()).unwrap();

        assert_eq!(merged, detective.entries());
    }

    #[test]
    fn test_merge_fills_entries_missing_from_own_log() {
        let mut judge = Transcript::new();
        judge.append(Speaker::Own, "Un hombre aparece muerto en un campo.");
        judge.append(Speaker::Other, "¿Cayó desde arriba?");

        let merged = merge_context(&[], &judge.project()).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].speaker, Speaker::Other);
        assert_eq!(merged[1].speaker, Speaker::Own);
    }

    #[test]
    fn test_merge_detects_desync() {
        let own = vec![Utterance::new(Speaker::Own, "Sí", 0)];
        let incoming = vec![Utterance::new(Speaker::Own, "No", 0)];

        assert_eq!(
            merge_context(&own, &incoming),
            Err(TranscriptError::Desync { ordinal: 0 })
        );
    }
}
