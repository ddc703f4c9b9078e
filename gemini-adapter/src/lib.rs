//! Rust client for the Gemini `generateContent` REST API.
//!
//! This crate provides API key discovery, request construction, and a
//! bounded single-turn text completion call. It is the oracle behind the
//! SQL generator and the chart planner.

/// Discovery of the API key from explicit values and the environment.
pub mod discovery;
/// Error types returned by client operations.
pub mod error;
/// Endpoint and body construction.
pub mod request;
/// HTTP exchange with timeouts and response interpretation.
pub mod transport;
/// Configuration, results, and wire types.
pub mod types;

pub use discovery::{API_KEY_ENV_VAR, FALLBACK_API_KEY_ENV_VAR, resolve_api_key};
pub use error::GeminiError;
pub use transport::generate_content;
pub use types::*;

/// High-level client bound to one API key and configuration.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Creates a client for `api_key`.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError` if the key is blank or the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: GeminiConfig) -> Result<Self, GeminiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GeminiError::InvalidConfig("API key is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("sqlrefine/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    /// Creates a client with the key resolved by [`resolve_api_key`].
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::MissingApiKey` when no key is configured.
    pub fn discover(explicit_key: Option<String>, config: GeminiConfig) -> Result<Self, GeminiError> {
        Self::new(resolve_api_key(explicit_key)?, config)
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Sends `prompt` as a single user turn and returns the reply.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError` on transport failures, timeouts, API errors,
    /// blocked prompts, or empty replies.
    pub async fn generate(&self, prompt: &str) -> Result<GenerateResult, GeminiError> {
        let mut result = generate_content(&self.http, &self.api_key, prompt, &self.config).await?;
        if result.usage.is_none() {
            result.usage = Some(UsageMetadata::estimate(prompt, &result.text));
        }
        Ok(result)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
