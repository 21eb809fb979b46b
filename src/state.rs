use std::sync::Arc;

use crate::config::Config;
use crate::llm::{CompletionService, LLMFactory};
use crate::translate::{PromptTemplate, Translator};

/// Process-wide state, built once at startup and cloned into each handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub translator: Arc<Translator>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let llm = LLMFactory::create_llm(&config.llm)?;
        Ok(Self::with_llm(config, llm))
    }

    /// Build state around an already constructed completion service.
    pub fn with_llm(config: Config, llm: Arc<dyn CompletionService>) -> Self {
        let translator = Translator::new(
            PromptTemplate::new(config.translation.system_prompt.clone()),
            llm,
            config.llm.max_retries,
        );

        Self {
            config: Arc::new(config),
            translator: Arc::new(translator),
        }
    }
}
