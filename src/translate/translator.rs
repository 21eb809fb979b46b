use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::llm::{ChatMessage, CompletionError, CompletionService};
use crate::translate::interface::{
    SmokeTestResponse, TranslationRequest, TranslationResponse, DEFAULT_INPUT_LANGUAGE,
    DEFAULT_OUTPUT_LANGUAGE,
};
use crate::translate::prompt::PromptTemplate;

/// Fixed sentence sent by the connectivity check.
pub const SMOKE_TEST_TEXT: &str = "I like programming.";

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// Rejected before any call to the completion service.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Upstream(#[from] CompletionError),
}

/// Validates requests, fills the prompt and asks the completion service for a translation.
/// Built once at startup and shared by every request.
pub struct Translator {
    template: PromptTemplate,
    llm: Arc<dyn CompletionService>,
    max_retries: u32,
}

impl Translator {
    pub fn new(template: PromptTemplate, llm: Arc<dyn CompletionService>, max_retries: u32) -> Self {
        Self {
            template,
            llm,
            max_retries,
        }
    }

    pub async fn translate(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResponse, TranslateError> {
        if request.text.trim().is_empty() {
            return Err(TranslateError::Validation("Text cannot be empty".to_string()));
        }

        let request_id = Uuid::new_v4();
        info!(
            "Translation {} requested: {} -> {} ({} chars)",
            request_id,
            request.input_language,
            request.output_language,
            request.text.chars().count()
        );

        let messages = self.template.render(
            &request.input_language,
            &request.output_language,
            &request.text,
        );
        let completion = self.complete(&messages).await.map_err(|e| {
            error!("Translation {} failed: {}", request_id, e);
            e
        })?;

        info!("Translation {} completed", request_id);

        Ok(TranslationResponse {
            translated_text: completion.trim().to_string(),
            original_text: request.text,
            input_language: request.input_language,
            output_language: request.output_language,
        })
    }

    /// Run a fixed English to Malay translation to check the provider is reachable.
    pub async fn smoke_test(&self) -> Result<SmokeTestResponse, TranslateError> {
        let messages = self.template.render(
            DEFAULT_INPUT_LANGUAGE,
            DEFAULT_OUTPUT_LANGUAGE,
            SMOKE_TEST_TEXT,
        );

        let output = self.complete(&messages).await.map_err(|e| {
            error!("Smoke test against {} failed: {}", self.llm.name(), e);
            e
        })?;

        Ok(SmokeTestResponse {
            test_input: SMOKE_TEST_TEXT.to_string(),
            test_output: output,
            status: "success".to_string(),
        })
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let mut attempt = 0;
        loop {
            match self.llm.complete(messages).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "{} completion failed (attempt {}/{}): {}",
                        self.llm.name(),
                        attempt,
                        self.max_retries + 1,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::config::DEFAULT_SYSTEM_PROMPT;

    /// Replays queued results and records every prompt it receives.
    struct ScriptedLLM {
        replies: Mutex<VecDeque<Result<String, CompletionError>>>,
        prompts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedLLM {
        fn new(replies: Vec<Result<String, CompletionError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedLLM {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(CompletionError::NoContent("script exhausted".to_string())))
        }
    }

    fn unavailable() -> CompletionError {
        CompletionError::Status {
            status: 503,
            message: "model overloaded".to_string(),
        }
    }

    fn translator(llm: Arc<ScriptedLLM>, max_retries: u32) -> Translator {
        Translator::new(PromptTemplate::new(DEFAULT_SYSTEM_PROMPT), llm, max_retries)
    }

    #[tokio::test]
    async fn blank_text_never_reaches_the_service() {
        let llm = ScriptedLLM::new(vec![Ok("unused".to_string())]);
        let translator = translator(llm.clone(), 0);

        for text in ["", " ", "\n\t  "] {
            match translator.translate(TranslationRequest::new(text)).await {
                Err(TranslateError::Validation(msg)) => assert_eq!(msg, "Text cannot be empty"),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn echoes_request_and_trims_completion() {
        let llm = ScriptedLLM::new(vec![Ok("\n  Saya suka pengaturcaraan.  \n".to_string())]);
        let translator = translator(llm.clone(), 0);

        let request = TranslationRequest {
            text: "  I like programming. ".to_string(),
            input_language: "English".to_string(),
            output_language: "Malay".to_string(),
        };
        let response = translator.translate(request).await.unwrap();

        assert_eq!(response.original_text, "  I like programming. ");
        assert_eq!(response.translated_text, "Saya suka pengaturcaraan.");
        assert_eq!(response.translated_text.trim(), response.translated_text);
        assert_eq!(response.input_language, "English");
        assert_eq!(response.output_language, "Malay");

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0][1].content, "  I like programming. ");
    }

    #[tokio::test]
    async fn single_attempt_by_default() {
        let llm = ScriptedLLM::new(vec![Err(unavailable()), Ok("late".to_string())]);
        let translator = translator(llm.clone(), 0);

        let err = translator
            .translate(TranslationRequest::new("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::Upstream(CompletionError::Status { status: 503, .. })));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn retries_up_to_the_configured_limit() {
        let llm = ScriptedLLM::new(vec![Err(unavailable()), Ok("Selamat pagi".to_string())]);
        let response = translator(llm.clone(), 2)
            .translate(TranslationRequest::new("Good morning"))
            .await
            .unwrap();
        assert_eq!(response.translated_text, "Selamat pagi");
        assert_eq!(llm.calls(), 2);

        let llm = ScriptedLLM::new(vec![Err(unavailable()), Err(unavailable()), Err(unavailable())]);
        assert!(translator(llm.clone(), 1)
            .translate(TranslationRequest::new("Good morning"))
            .await
            .is_err());
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn smoke_test_uses_fixed_inputs() {
        let llm = ScriptedLLM::new(vec![Ok("Saya suka pengaturcaraan.".to_string())]);
        let response = translator(llm.clone(), 0).smoke_test().await.unwrap();

        assert_eq!(response.test_input, SMOKE_TEST_TEXT);
        assert_eq!(response.test_output, "Saya suka pengaturcaraan.");
        assert_eq!(response.status, "success");

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(
            prompts[0][0].content,
            "You are a helpful assistant that translates English to Malay."
        );
        assert_eq!(prompts[0][1].content, SMOKE_TEST_TEXT);
    }
}
