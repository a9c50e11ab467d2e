//! Model-name based backend resolution

use std::sync::Arc;

use crate::adapter::AdapterError;
use crate::anthropic::AnthropicProvider;
use crate::config::{ConfigError, LlmConfig};
use crate::gemini::GeminiProvider;
use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;
use crate::provider::{Backend, GenerationParams};

/// Provider family a model name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFamily {
    Gemini,
    Anthropic,
    Ollama,
    Mock,
}

impl ProviderFamily {
    /// Model prefixes served by a local Ollama daemon
    const OLLAMA_PREFIXES: &'static [&'static str] = &["llama", "mistral", "qwen", "phi", "gemma"];

    /// Classify a model name; `None` when no family serves it
    pub fn of_model(model: &str) -> Option<Self> {
        let model = model.trim().to_lowercase();
        if model.starts_with("gemini") {
            Some(Self::Gemini)
        } else if model.starts_with("claude") {
            Some(Self::Anthropic)
        } else if model.starts_with("mock") {
            Some(Self::Mock)
        } else if Self::OLLAMA_PREFIXES.iter().any(|p| model.starts_with(p)) {
            Some(Self::Ollama)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }
}

/// Build the backend serving `model`.
///
/// Gemini is used through client-held sessions, Anthropic in single-turn
/// shape, Ollama with full replay. `mock*` names give a stateless mock that
/// always answers "No", for dry runs without network access.
pub fn resolve_backend(
    model: &str,
    config: &LlmConfig,
    params: GenerationParams,
) -> Result<Backend, AdapterError> {
    let family = ProviderFamily::of_model(model).ok_or_else(|| {
        AdapterError::UnsupportedProviderKind(format!("no provider serves model {}", model))
    })?;
    let missing_key =
        |e: ConfigError| AdapterError::UnsupportedProviderKind(format!("{}: {}", model, e));

    let backend = match family {
        ProviderFamily::Gemini => {
            let key = config.api_key("gemini").map_err(missing_key)?;
            Backend::Session(Arc::new(GeminiProvider::new(key, model).with_params(params)))
        }
        ProviderFamily::Anthropic => {
            let key = config.api_key("anthropic").map_err(missing_key)?;
            Backend::SingleTurn(Arc::new(
                AnthropicProvider::new(key, model).with_params(params),
            ))
        }
        ProviderFamily::Ollama => Backend::Stateless(Arc::new(
            OllamaProvider::with_url(&config.ollama_url, model).with_params(params),
        )),
        ProviderFamily::Mock => {
            Backend::Stateless(Arc::new(MockProvider::constant("No").named(model)))
        }
    };

    tracing::debug!(
        model,
        family = family.as_str(),
        kind = %backend.kind(),
        "Resolved backend"
    );
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ProviderKind;

    #[test]
    fn test_model_families() {
        assert_eq!(ProviderFamily::of_model("gemini-pro"), Some(ProviderFamily::Gemini));
        assert_eq!(
            ProviderFamily::of_model("claude-3-5-sonnet-latest"),
            Some(ProviderFamily::Anthropic)
        );
        assert_eq!(ProviderFamily::of_model("llama3"), Some(ProviderFamily::Ollama));
        assert_eq!(ProviderFamily::of_model("Mistral-7B"), Some(ProviderFamily::Ollama));
        assert_eq!(ProviderFamily::of_model("gpt-4o"), None);
    }

    #[test]
    fn test_resolution_picks_kind_per_family() {
        let config = LlmConfig {
            gemini_api_key: Some("g".to_string()),
            anthropic_api_key: Some("a".to_string()),
            ..LlmConfig::default()
        };
        let params = GenerationParams::default();

        let kind = |model| resolve_backend(model, &config, params).unwrap().kind();
        assert_eq!(kind("gemini-pro"), ProviderKind::StatefulSession);
        assert_eq!(kind("claude-3-haiku"), ProviderKind::SingleTurn);
        assert_eq!(kind("llama3"), ProviderKind::StatelessReplay);
    }

    #[test]
    fn test_unknown_model_is_unsupported() {
        let err = resolve_backend("gpt-4o", &LlmConfig::default(), GenerationParams::default())
            .unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedProviderKind(_)));
    }

    #[test]
    fn test_missing_key_is_reported() {
        let err = resolve_backend("gemini-pro", &LlmConfig::default(), GenerationParams::default())
            .unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
