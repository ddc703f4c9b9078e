//! Request construction for `generateContent`.

use crate::types::GeminiConfig;
use serde_json::{Map, Value, json};

/// URL of the `generateContent` method for the configured model.
#[must_use]
pub fn endpoint(config: &GeminiConfig) -> String {
    format!(
        "{}/models/{}:generateContent",
        config.base_url.trim_end_matches('/'),
        config.model
    )
}

/// Builds the JSON body for a single-turn user prompt.
#[must_use]
pub fn build_body(prompt: &str, config: &GeminiConfig) -> Value {
    let mut body = json!({
        "contents": [
            {"role": "user", "parts": [{"text": prompt}]}
        ]
    });

    let mut generation = Map::new();
    if let Some(temperature) = config.temperature {
        generation.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(max) = config.max_output_tokens {
        generation.insert("maxOutputTokens".to_string(), json!(max));
    }
    if !generation.is_empty() {
        body["generationConfig"] = Value::Object(generation);
    }

    body
}
