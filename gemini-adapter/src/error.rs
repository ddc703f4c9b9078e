use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Gemini API key not found: {0}")]
    MissingApiKey(String),

    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Gemini API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        api_status: Option<String>,
        message: String,
    },

    #[error("Prompt blocked: {0}")]
    Blocked(String),

    #[error("Gemini returned no text (finish reason: {})", finish_reason.as_deref().unwrap_or("unknown"))]
    EmptyResponse { finish_reason: Option<String> },

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
