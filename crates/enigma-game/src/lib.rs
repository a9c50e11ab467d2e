//! # Enigma Game
//!
//! A two-agent interrogation game. The [`Judge`] holds a hidden scenario and
//! answers yes/no questions; the [`Detective`] asks them and eventually
//! proposes a solution, marked with [`SOLUTION_KEYWORD`]. The Judge confirms a
//! solution only by replying exactly [`AFFIRMATIVE_VERDICT`].
//!
//! ## Key Types
//!
//! - [`Agent`]: role, system prompt, adapter and canonical transcript
//! - [`GameLoop`]: the move/reply state machine
//! - [`Presenter`]: receives each utterance as it happens
//!
//! ## Quick Start
//!
//! ```rust
//! use enigma_game::{Detective, GameConfig, GameLoop, Judge, NullPresenter, Scenario, TerminationReason};
//! use enigma_llm::{Backend, MockProvider, ProviderAdapter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let judge_backend = Backend::Stateless(Arc::new(MockProvider::constant("Es correcto")));
//!     let detective_backend =
//!         Backend::Stateless(Arc::new(MockProvider::constant("SOLUCIÓN: cayó de un avión")));
//!
//!     let scenario = Scenario::new("Eres el juez.", "Un hombre aparece muerto en un campo.");
//!     let judge = Judge::new(scenario, ProviderAdapter::for_backend(judge_backend));
//!     let detective = Detective::new("Eres el detective.", ProviderAdapter::for_backend(detective_backend));
//!
//!     let mut game = GameLoop::new(judge, detective, GameConfig::default(), NullPresenter);
//!     let outcome = game.run().await.unwrap();
//!     assert_eq!(outcome.reason, TerminationReason::Solved);
//! }
//! ```

pub mod agent;
pub mod detective;
pub mod error;
pub mod game;
pub mod judge;
pub mod protocol;
pub mod scenario;

pub use agent::Agent;
pub use detective::Detective;
pub use error::GameError;
pub use game::{
    GameConfig, GameLoop, GameOutcome, GameState, NullPresenter, Phase, Presenter,
    TerminationReason,
};
pub use judge::Judge;
pub use protocol::{
    acknowledgement, is_solution_proposal, Verdict, AFFIRMATIVE_VERDICT, ASK_INSTRUCTION,
    REJECTION_LINE, SOLUTION_KEYWORD,
};
pub use scenario::{Scenario, ScenarioError};
