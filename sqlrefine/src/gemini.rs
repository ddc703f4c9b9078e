//! Gemini as the text oracle behind SQL generation and chart planning.

use crate::errors::Error;
use async_trait::async_trait;
use sqlrefine_core::oracle::TextOracle;
use sqlrefine_gemini::{GeminiClient, GeminiConfig};

/// [`TextOracle`] backed by a [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiOracle {
    client: GeminiClient,
}

impl GeminiOracle {
    /// Wraps an existing client.
    #[must_use]
    pub const fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    /// Builds a client, resolving the API key from `api_key` or the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] when no key is available.
    pub fn discover(api_key: Option<String>, config: GeminiConfig) -> Result<Self, Error> {
        GeminiClient::discover(api_key, config)
            .map(Self::new)
            .map_err(Error::from)
    }

    /// The wrapped client.
    #[must_use]
    pub const fn client(&self) -> &GeminiClient {
        &self.client
    }
}

#[async_trait]
impl TextOracle for GeminiOracle {
    async fn complete(&self, prompt: &str) -> Result<String, String> {
        let result = self.client.generate(prompt).await.map_err(|e| e.to_string())?;
        if let Some(usage) = result.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                duration_ms = result.duration_ms,
                "gemini completion"
            );
        }
        Ok(result.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlrefine_gemini::GeminiError;

    #[test]
    fn test_discover_with_explicit_key() {
        let oracle = GeminiOracle::discover(Some("test-key".to_string()), GeminiConfig::default())
            .unwrap();
        assert_eq!(oracle.client().config().model, "gemini-1.5-flash");
    }

    #[test]
    fn test_blank_explicit_key_is_rejected() {
        let err = GeminiOracle::discover(Some("   ".to_string()), GeminiConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::Gemini(GeminiError::InvalidConfig(_))));
    }
}
