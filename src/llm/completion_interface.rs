use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    Human,
}

/// One entry of a prompt sent to a completion service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("request to completion service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed completion response: {0}")]
    Malformed(String),

    #[error("completion service returned no content: {0}")]
    NoContent(String),
}

/// Interface for a stateless text completion provider.
/// Each call is independent; nothing is remembered between prompts.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Send the prompt and return the generated text
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

#[derive(Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Pull `error.message` out of a provider error body, or fall back to the raw body.
pub(crate) fn provider_error_message(body: &str) -> String {
    match serde_json::from_str::<ProviderErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
