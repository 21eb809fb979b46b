//! Request and response envelopes for the translation endpoints.

use serde::{Deserialize, Serialize};

pub const DEFAULT_INPUT_LANGUAGE: &str = "English";
pub const DEFAULT_OUTPUT_LANGUAGE: &str = "Malay";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    #[serde(default = "default_input_language")]
    pub input_language: String,
    #[serde(default = "default_output_language")]
    pub output_language: String,
}

fn default_input_language() -> String {
    DEFAULT_INPUT_LANGUAGE.to_string()
}

fn default_output_language() -> String {
    DEFAULT_OUTPUT_LANGUAGE.to_string()
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_language: default_input_language(),
            output_language: default_output_language(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub original_text: String,
    pub translated_text: String,
    pub input_language: String,
    pub output_language: String,
}

/// Envelope returned by the connectivity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmokeTestResponse {
    pub test_input: String,
    pub test_output: String,
    pub status: String,
}
