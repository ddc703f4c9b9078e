//! Resolution of the Gemini API key.

use crate::error::GeminiError;

/// Environment variable consulted first for the API key.
pub const API_KEY_ENV_VAR: &str = "SQLREFINE_GEMINI_API_KEY";

/// Conventional variable used by Google tooling, consulted second.
pub const FALLBACK_API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Locates the Gemini API key.
///
/// Resolution order:
/// 1. `explicit` if provided and non-blank.
/// 2. `SQLREFINE_GEMINI_API_KEY`.
/// 3. `GEMINI_API_KEY`.
///
/// # Errors
///
/// Returns `GeminiError::MissingApiKey` when none of them holds a key, or
/// `GeminiError::InvalidConfig` for a blank explicit key.
pub fn resolve_api_key(explicit: Option<String>) -> Result<String, GeminiError> {
    resolve_with(explicit, |name| std::env::var(name).ok())
}

fn resolve_with(
    explicit: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, GeminiError> {
    if let Some(key) = explicit {
        let key = key.trim();
        if key.is_empty() {
            return Err(GeminiError::InvalidConfig(
                "explicit API key is empty".to_string(),
            ));
        }
        return Ok(key.to_string());
    }

    [API_KEY_ENV_VAR, FALLBACK_API_KEY_ENV_VAR]
        .into_iter()
        .filter_map(|name| lookup(name))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .ok_or_else(|| {
            GeminiError::MissingApiKey(format!(
                "set {API_KEY_ENV_VAR} or {FALLBACK_API_KEY_ENV_VAR}"
            ))
        })
}
