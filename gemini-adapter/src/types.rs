//! Configuration, results, and wire types for the Gemini `generateContent` API.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Public REST endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for Gemini requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeminiConfig {
    /// Model name (e.g. `"gemini-1.5-flash"`).
    pub model: String,
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Maximum wall-clock duration of one request.
    pub timeout: Duration,
    /// Sampling temperature; the service default when `None`.
    pub temperature: Option<f32>,
    /// Output token cap; the service default when `None`.
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(300),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl GeminiConfig {
    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the output token cap.
    #[must_use]
    pub const fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }
}

/// Token accounting reported by the service.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_token_count: u64,
    /// Tokens across all candidates.
    #[serde(default)]
    pub candidates_token_count: u64,
    /// Prompt plus candidates.
    #[serde(default)]
    pub total_token_count: u64,
}

impl UsageMetadata {
    /// Rough accounting for responses that omit `usageMetadata`.
    #[must_use]
    pub fn estimate(prompt: &str, output: &str) -> Self {
        let prompt_token_count = estimate_tokens(prompt);
        let candidates_token_count = estimate_tokens(output);
        Self {
            prompt_token_count,
            candidates_token_count,
            total_token_count: prompt_token_count + candidates_token_count,
        }
    }
}

/// Approximates a token count at four characters per token.
#[must_use]
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}

/// Result of one `generateContent` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResult {
    /// Concatenated text parts of the first candidate.
    pub text: String,
    /// Why generation stopped (e.g. `"STOP"`, `"MAX_TOKENS"`).
    pub finish_reason: Option<String>,
    /// Token accounting, when reported.
    pub usage: Option<UsageMetadata>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Response body of `generateContent`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Present when the prompt itself was rejected.
    pub prompt_feedback: Option<PromptFeedback>,
    /// Token accounting.
    pub usage_metadata: Option<UsageMetadata>,
}

/// One generated candidate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content; absent when generation was blocked.
    pub content: Option<Content>,
    /// Why generation stopped.
    pub finish_reason: Option<String>,
}

/// Message content made of parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    /// Author role (`"user"` or `"model"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single content part; only text parts are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    /// Text of the part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Feedback about the prompt.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was blocked (e.g. `"SAFETY"`).
    pub block_reason: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error details.
    pub error: ApiErrorDetail,
}

/// Details of an API error.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Numeric HTTP-style code.
    pub code: Option<i64>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Canonical status (e.g. `"INVALID_ARGUMENT"`).
    pub status: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    #[must_use]
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Finish reason of the first candidate.
    #[must_use]
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
    }

    /// Block reason of the prompt, if it was blocked.
    #[must_use]
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "SELECT *"}, {"text": " FROM users;"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 5, "totalTokenCount": 17}
        }))
        .unwrap();

        assert_eq!(response.text(), "SELECT * FROM users;");
        assert_eq!(response.finish_reason(), Some("STOP"));
        assert_eq!(response.usage_metadata.unwrap().total_token_count, 17);
        assert_eq!(response.block_reason(), None);
    }

    #[test]
    fn test_estimated_usage() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("SELECT"), 2);
        let usage = UsageMetadata::estimate("abcdefgh", "abc");
        assert_eq!(usage.prompt_token_count, 2);
        assert_eq!(usage.candidates_token_count, 1);
        assert_eq!(usage.total_token_count, 3);
    }

    #[test]
    fn test_blocked_prompt() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();

        assert_eq!(response.block_reason(), Some("SAFETY"));
        assert_eq!(response.text(), "");
    }

    #[test]
    fn test_config_builders() {
        let config = GeminiConfig::default()
            .with_model("gemini-2.0-flash")
            .with_base_url("http://localhost:8080/v1beta/")
            .with_temperature(0.2)
            .with_max_output_tokens(256);

        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.base_url, "http://localhost:8080/v1beta");
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.max_output_tokens, Some(256));
        assert_eq!(config.timeout, Duration::from_secs(300));
    }
}
