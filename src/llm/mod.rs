pub mod models;
pub mod prompts;
pub mod providers;

use crate::config::LlmConfig;
use crate::error::GenerationError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// An opaque text-completion capability: one prompt in, one completion out.
#[async_trait]
pub trait CompletionService: Send + Sync {
    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Builds the configured backend ("remote" or "ollama").
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn CompletionService>, GenerationError> {
    let provider: Arc<dyn CompletionService> = match config.backend.as_str() {
        "remote" => Arc::new(providers::remote::RemoteLlmProvider::new(config)?),
        "ollama" => Arc::new(providers::ollama::OllamaProvider::new(config)?),
        _ => {
            return Err(GenerationError::Config(format!(
                "Unsupported LLM backend: {}",
                config.backend
            )))
        }
    };

    info!(
        "Using {} completion backend (model: {}, temperature: {})",
        provider.provider_name(),
        provider.model_name(),
        config.temperature
    );
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_unknown_backend_rejected() {
        let mut config = AppConfig::default().llm;
        config.backend = "local".to_string();
        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, GenerationError::Config(_)));
    }

    #[test]
    fn test_remote_requires_api_key() {
        let config = AppConfig::default().llm;
        assert!(config.api_key.is_none());
        assert!(create_provider(&config).is_err());
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let mut config = AppConfig::default().llm;
        config.backend = "ollama".to_string();
        config.model = "sqlcoder".to_string();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.model_name(), "sqlcoder");
    }
}
