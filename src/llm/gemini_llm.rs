use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::completion_interface::{
    provider_error_message, ChatMessage, CompletionError, CompletionService, Role,
};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini implementation using the `generateContent` REST endpoint
pub struct GeminiLLM {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: Option<f32>,
}

impl GeminiLLM {
    pub fn new(
        client: Client,
        base_url: Option<String>,
        model: String,
        api_key: String,
        temperature: Option<f32>,
    ) -> Self {
        let base_url = base_url.unwrap_or_else(|| GEMINI_BASE_URL.to_string());
        info!("Initialized GeminiLLM: model={}, base_url={}", model, base_url);
        Self {
            client,
            base_url,
            model,
            api_key,
            temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn build_request(&self, messages: &[ChatMessage]) -> GenerateContentRequest {
        // Gemini takes system text out of band; everything else is a user turn.
        let system: Vec<Part> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| Part::text(&m.content))
            .collect();

        let contents = messages
            .iter()
            .filter(|m| m.role == Role::Human)
            .map(|m| Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(&m.content)],
            })
            .collect();

        GenerateContentRequest {
            system_instruction: (!system.is_empty()).then(|| Content {
                role: None,
                parts: system,
            }),
            contents,
            generation_config: self
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        }
    }
}

#[async_trait]
impl CompletionService for GeminiLLM {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let request = self.build_request(messages);
        debug!("Gemini request: model={}, turns={}", self.model, request.contents.len());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
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

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        extract_text(parsed)
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, CompletionError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked ({})", r))
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(CompletionError::NoContent(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .map(|r| format!("finish reason {}", r))
            .unwrap_or_else(|| "candidate has no text".to_string());
        return Err(CompletionError::NoContent(reason));
    }

    Ok(text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm(temperature: Option<f32>) -> GeminiLLM {
        GeminiLLM::new(
            Client::new(),
            Some("http://localhost:1/v1beta/".to_string()),
            "gemini-2.0-flash".to_string(),
            "key".to_string(),
            temperature,
        )
    }

    #[test]
    fn endpoint_joins_model_without_double_slash() {
        assert_eq!(
            llm(None).endpoint(),
            "http://localhost:1/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn system_text_goes_to_system_instruction() {
        let request = llm(Some(0.3)).build_request(&[
            ChatMessage::system("translate English to Malay"),
            ChatMessage::human("I like programming."),
        ]);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "translate English to Malay"
        );
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "I like programming.");
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn generation_config_is_omitted_without_temperature() {
        let request = llm(None).build_request(&[ChatMessage::human("hi")]);
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("generationConfig").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn text_parts_are_concatenated() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "Saya suka "}, {"text": "pengaturcaraan."}]}, "finishReason": "STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Saya suka pengaturcaraan.");
    }

    #[test]
    fn blocked_prompt_reports_reason() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        match extract_text(response) {
            Err(CompletionError::NoContent(reason)) => assert!(reason.contains("SAFETY")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn candidate_without_text_is_no_content() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(CompletionError::NoContent(_))
        ));
    }
}
