//! # Enigma Core
//!
//! Canonical conversation state shared by every Enigma agent:
//! - [`Role`]: which side of the interrogation an agent plays
//! - [`Transcript`]: append-only, ordinal-stamped log of [`Utterance`]s
//! - [`project`]: speaker inversion between the two agents' frames
//! - [`merge_context`]: ordinal interleaving of two lockstepped logs
//!
//! ```rust
//! use enigma_core::{project, Speaker, Transcript};
//!
//! let mut judge = Transcript::new();
//! judge.append(Speaker::Other, "¿Murió en una isla?");
//! judge.append(Speaker::Own, "No");
//!
//! // What the Judge recorded as its own answer is the other party's from the Detective's side.
//! let seen_by_detective = project(judge.entries());
//! assert_eq!(seen_by_detective[1].speaker, Speaker::Other);
//! ```

pub mod error;
pub mod projection;
pub mod role;
pub mod transcript;

pub use error::TranscriptError;
pub use projection::{merge_context, project};
pub use role::Role;
pub use transcript::{Speaker, Transcript, Utterance};
