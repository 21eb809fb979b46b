use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::completion_interface::{
    provider_error_message, ChatMessage, CompletionError, CompletionService, Role,
};

/// OpenAI compatible chat completions client
/// Works with any provider exposing `/chat/completions`
pub struct OpenAICompatibleLLM {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: Option<f32>,
}

impl OpenAICompatibleLLM {
    pub fn new(
        client: Client,
        base_url: String,
        model: String,
        api_key: String,
        temperature: Option<f32>,
    ) -> Self {
        info!(
            "Initialized OpenAICompatibleLLM: model={}, base_url={}",
            model, base_url
        );
        Self {
            client,
            base_url,
            model,
            api_key,
            temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_request<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: match m.role {
                        Role::System => "system",
                        Role::Human => "user",
                    },
                    content: &m.content,
                })
                .collect(),
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl CompletionService for OpenAICompatibleLLM {
    fn name(&self) -> &str {
        "openai_compatible"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let request = self.build_request(messages);
        debug!("Chat completion request: model={}, messages={}", self.model, messages.len());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                message: provider_error_message(&body),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                CompletionError::NoContent("response missing assistant content".to_string())
            })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
