//! # Enigma LLM
//!
//! Model backends for Enigma agents, and the adapters that reconcile a
//! canonical transcript with each backend's idea of conversational memory.
//!
//! ## Supported Backends
//!
//! | Provider | Kind | Key Required |
//! |----------|------|--------------|
//! | Gemini | Stateful session | `GEMINI_API_KEY` |
//! | Anthropic | Single turn | `ANTHROPIC_API_KEY` |
//! | Ollama | Stateless replay | None |
//! | Mock | Any | None |
//!
//! ## Quick Start
//!
//! ```rust
//! use enigma_core::{Speaker, Transcript};
//! use enigma_llm::{Backend, MockProvider, ProviderAdapter, ProviderKind};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = Backend::Stateless(Arc::new(MockProvider::constant("No")));
//!     let mut adapter = ProviderAdapter::new(ProviderKind::StatelessReplay, backend).unwrap();
//!
//!     let mut transcript = Transcript::new();
//!     transcript.append(Speaker::Other, "¿Era de noche?");
//!
//!     let reply = adapter
//!         .call("Eres el juez", transcript.entries(), "¿Era de noche?")
//!         .await
//!         .unwrap();
//!     assert_eq!(reply, "No");
//! }
//! ```
//!
//! ## Resolving a model name
//!
//! ```rust,ignore
//! use enigma_llm::{resolve_backend, GenerationParams, LlmConfig, ProviderAdapter};
//!
//! let config = LlmConfig::from_env()?;
//! let backend = resolve_backend("gemini-pro", &config, GenerationParams::with_max_tokens(100))?;
//! let adapter = ProviderAdapter::for_backend(backend).with_timeout(config.call_timeout());
//! ```

pub mod adapter;
pub mod anthropic;
pub mod config;
pub mod factory;
pub mod gemini;
pub mod metrics;
pub mod mock;
pub mod ollama;
pub mod provider;

pub use adapter::{
    flatten_history, history_before_pending, AdapterError, OpenSession, ProviderAdapter,
    ProviderKind, ProviderRequest, DEFAULT_ACKNOWLEDGEMENT, DEFAULT_CALL_TIMEOUT,
};
pub use anthropic::AnthropicProvider;
pub use config::{ConfigError, LlmConfig};
pub use factory::{resolve_backend, ProviderFamily};
pub use gemini::GeminiProvider;
pub use metrics::{global_metrics, BackendMetrics, MetricsSnapshot};
pub use mock::{MockProvider, RecordedCall};
pub use ollama::OllamaProvider;
pub use provider::{
    Backend, ChatMessage, ChatRole, GenerationParams, LlmError, LlmResponse, SessionBackend,
    SessionHandle, SessionSeed, SingleTurnBackend, StatelessBackend,
};
