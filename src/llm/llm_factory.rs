use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use tracing::info;

use crate::config::{LlmConfig, Provider};
use crate::llm::completion_interface::CompletionService;
use crate::llm::gemini_llm::GeminiLLM;
use crate::llm::openai_compatible_llm::OpenAICompatibleLLM;

/// Factory for creating completion service instances
pub struct LLMFactory;

impl LLMFactory {
    /// Create the completion service named by `config.provider`.
    ///
    /// One HTTP client is built here and shared by every request the service makes.
    pub fn create_llm(config: &LlmConfig) -> Result<Arc<dyn CompletionService>> {
        info!("Initializing LLM: {} ({})", config.provider, config.model);

        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("LLM api key is not configured"))?;
        let client = Self::build_client(config)?;

        match config.provider {
            Provider::Gemini => Ok(Arc::new(GeminiLLM::new(
                client,
                config.base_url.clone(),
                config.model.clone(),
                api_key,
                config.temperature,
            ))),
            Provider::OpenaiCompatible => {
                let base_url = config
                    .base_url
                    .clone()
                    .ok_or_else(|| anyhow!("openai_compatible provider requires llm.base_url"))?;
                Ok(Arc::new(OpenAICompatibleLLM::new(
                    client,
                    base_url,
                    config.model.clone(),
                    api_key,
                    config.temperature,
                )))
            }
        }
    }

    fn build_client(config: &LlmConfig) -> Result<Client> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().context("Failed to build HTTP client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: Provider, base_url: Option<&str>) -> LlmConfig {
        LlmConfig {
            provider,
            api_key: Some("key".to_string()),
            base_url: base_url.map(str::to_string),
            request_timeout_secs: Some(5),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn creates_provider_by_name() {
        let gemini = LLMFactory::create_llm(&config(Provider::Gemini, None)).unwrap();
        assert_eq!(gemini.name(), "gemini");

        let openai = LLMFactory::create_llm(&config(
            Provider::OpenaiCompatible,
            Some("http://localhost:11434/v1"),
        ))
        .unwrap();
        assert_eq!(openai.name(), "openai_compatible");
    }

    #[test]
    fn missing_key_or_base_url_is_an_error() {
        let mut no_key = config(Provider::Gemini, None);
        no_key.api_key = None;
        assert!(LLMFactory::create_llm(&no_key).is_err());

        assert!(LLMFactory::create_llm(&config(Provider::OpenaiCompatible, None)).is_err());
    }
}
