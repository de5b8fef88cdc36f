//! Provider construction and API-key resolution.

use tracing::{info, warn};

use super::anthropic::AnthropicProvider;
use super::base::ChatProvider;
use super::echo::EchoProvider;
use super::ollama::OllamaProvider;
use super::openai_compat::OpenAICompatProvider;
use super::router::FallbackRouter;
use crate::config::schema::Config;

/// The configured backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
    OpenAiCompatible,
    Ollama,
    OpenRouter,
    Echo,
}

impl ProviderKind {
    /// Parse a provider name as used in config values.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "anthropic" => Some(Self::Anthropic),
            "openai" => Some(Self::OpenAi),
            "openai-compatible" => Some(Self::OpenAiCompatible),
            "ollama" => Some(Self::Ollama),
            "openrouter" => Some(Self::OpenRouter),
            "echo" => Some(Self::Echo),
            _ => None,
        }
    }

    /// Backend-specific API key environment variable, if any.
    fn key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::OpenAi | Self::OpenAiCompatible => Some("OPENAI_API_KEY"),
            Self::OpenRouter => Some("OPENROUTER_API_KEY"),
            Self::Ollama | Self::Echo => None,
        }
    }
}

/// Resolve the API key for a backend.
///
/// Order: backend-specific env var, `BARECLAW_API_KEY`, `API_KEY`, then
/// the config file value. Empty strings count as absent.
pub fn resolve_api_key(kind: ProviderKind, config: &Config) -> Option<String> {
    let mut candidates: Vec<Option<String>> = Vec::new();
    if let Some(var) = kind.key_env_var() {
        candidates.push(std::env::var(var).ok());
    }
    candidates.push(std::env::var("BARECLAW_API_KEY").ok());
    candidates.push(std::env::var("API_KEY").ok());
    candidates.push(Some(config.api_key.clone()));

    candidates
        .into_iter()
        .flatten()
        .find(|k| !k.trim().is_empty())
}

/// Build one provider, degrading keyed backends without credentials to Echo.
pub fn build_provider(kind: ProviderKind, config: &Config) -> Box<dyn ChatProvider> {
    match kind {
        ProviderKind::Echo => Box::new(EchoProvider::new()),
        ProviderKind::Ollama => {
            let base = std::env::var("OLLAMA_URL").ok();
            Box::new(OllamaProvider::new(base.as_deref()))
        }
        keyed => {
            let Some(key) = resolve_api_key(keyed, config) else {
                info!("no API key for {:?}, falling back to echo", keyed);
                return Box::new(EchoProvider::new());
            };
            match keyed {
                ProviderKind::Anthropic => Box::new(AnthropicProvider::new(&key)),
                ProviderKind::OpenAi => Box::new(OpenAICompatProvider::openai(&key)),
                ProviderKind::OpenRouter => Box::new(OpenAICompatProvider::openrouter(&key)),
                ProviderKind::OpenAiCompatible => {
                    let base = std::env::var("BARECLAW_API_URL")
                        .unwrap_or_else(|_| "http://localhost:8000/v1".to_string());
                    Box::new(OpenAICompatProvider::compatible(&key, &base))
                }
                ProviderKind::Echo | ProviderKind::Ollama => unreachable!(),
            }
        }
    }
}

/// Build the provider chain from config: the default provider followed by
/// the fallback list. A single-entry chain skips the router wrapper.
pub fn build_chat_provider(config: &Config) -> Box<dyn ChatProvider> {
    let mut kinds: Vec<ProviderKind> = Vec::new();

    match ProviderKind::from_name(&config.default_provider) {
        Some(kind) => kinds.push(kind),
        None => {
            warn!(
                "unknown default_provider '{}', using echo",
                config.default_provider
            );
            kinds.push(ProviderKind::Echo);
        }
    }
    for name in config.fallback_provider_names() {
        match ProviderKind::from_name(&name) {
            Some(kind) => kinds.push(kind),
            None => warn!("unknown fallback provider '{}', skipping", name),
        }
    }

    let mut providers: Vec<Box<dyn ChatProvider>> = kinds
        .into_iter()
        .map(|kind| build_provider(kind, config))
        .collect();

    if providers.len() == 1 {
        providers.remove(0)
    } else {
        Box::new(FallbackRouter::new(providers))
    }
}
