use crate::error::GeminiError;
use crate::request::{build_body, endpoint};
use crate::types::{ApiErrorBody, GeminiConfig, GenerateContentResponse, GenerateResult};
use std::time::Instant;
use tokio::time::timeout;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

pub async fn generate_content(
    http: &reqwest::Client,
    api_key: &str,
    prompt: &str,
    config: &GeminiConfig,
) -> Result<GenerateResult, GeminiError> {
    let url = endpoint(config);
    let body = build_body(prompt, config);
    let start_time = Instant::now();

    let exchange = async {
        let response = http
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok::<_, GeminiError>((status, text))
    };

    let (status, text) = match timeout(config.timeout, exchange).await {
        Ok(res) => res?,
        Err(_) => return Err(GeminiError::Timeout(config.timeout)),
    };

    let duration_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::debug!(status, duration_ms, model = %config.model, "gemini response");

    interpret_response(status, &text, duration_ms)
}

/// Turns a raw HTTP status and body into a result.
pub fn interpret_response(
    status: u16,
    body: &str,
    duration_ms: u64,
) -> Result<GenerateResult, GeminiError> {
    if !(200..300).contains(&status) {
        return Err(match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(ApiErrorBody { error }) => GeminiError::Api {
                status,
                code: error.code,
                api_status: error.status,
                message: error.message,
            },
            Err(_) => GeminiError::Api {
                status,
                code: None,
                api_status: None,
                message: body.trim().to_string(),
            },
        });
    }

    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GeminiError::JsonParseError(e.to_string()))?;

    if let Some(reason) = response.block_reason() {
        return Err(GeminiError::Blocked(reason.to_string()));
    }

    let text = response.text();
    let finish_reason = response.finish_reason().map(ToString::to_string);
    if text.trim().is_empty() {
        return Err(GeminiError::EmptyResponse { finish_reason });
    }
    if finish_reason.as_deref() == Some("MAX_TOKENS") {
        tracing::warn!("gemini response was truncated at the output token limit");
    }

    Ok(GenerateResult {
        text,
        finish_reason,
        usage: response.usage_metadata,
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"SELECT 1;"}]},"finishReason":"STOP"}]}"#;
        let result = interpret_response(200, body, 42).unwrap();
        assert_eq!(result.text, "SELECT 1;");
        assert_eq!(result.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(result.duration_ms, 42);
        assert!(result.usage.is_none());
    }

    #[test]
    fn test_api_error_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        match interpret_response(400, body, 0).unwrap_err() {
            GeminiError::Api {
                status,
                code,
                api_status,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(400));
                assert_eq!(api_status.as_deref(), Some("INVALID_ARGUMENT"));
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_json_error_body() {
        let err = interpret_response(502, "Bad Gateway\n", 0).unwrap_err();
        assert_eq!(err.to_string(), "Gemini API error 502: Bad Gateway");
    }

    #[test]
    fn test_blocked() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let err = interpret_response(200, body, 0).unwrap_err();
        assert!(matches!(err, GeminiError::Blocked(reason) if reason == "SAFETY"));
    }

    #[test]
    fn test_empty_candidate() {
        let body = r#"{"candidates":[{"finishReason":"RECITATION"}]}"#;
        let err = interpret_response(200, body, 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Gemini returned no text (finish reason: RECITATION)"
        );
    }

    #[test]
    fn test_malformed_body() {
        let err = interpret_response(200, "not json", 0).unwrap_err();
        assert!(matches!(err, GeminiError::JsonParseError(_)));
    }
}
