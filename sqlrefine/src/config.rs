//! Client configuration.

use sqlrefine_core::refinement::RefinementConfig;
use sqlrefine_gemini::GeminiConfig;
use sqlrefine_mysql::ConnectConfig;
use std::time::Duration;

pub use sqlrefine_gemini::DEFAULT_MODEL;
pub use sqlrefine_mysql::DEFAULT_PORT;

/// Everything needed to build a [`crate::client::Client`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Gemini API key (None = `SQLREFINE_GEMINI_API_KEY`, then `GEMINI_API_KEY`).
    pub gemini_api_key: Option<String>,

    /// Model, endpoint, and request timeout for Gemini.
    pub gemini: GeminiConfig,

    /// How to reach MySQL.
    pub database: ConnectConfig,

    /// Attempt budget and per-call timeout of the refinement loop.
    ///
    /// Default: 3 attempts, 120 seconds per call.
    pub refinement: RefinementConfig,
}

impl ClientConfig {
    /// Create a new `ClientConfig` with default settings.
    ///
    /// Equivalent to `ClientConfig::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Gemini API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.gemini = self.gemini.with_model(model);
        self
    }

    /// Sets the database connection settings.
    #[must_use]
    pub fn with_database(mut self, database: ConnectConfig) -> Self {
        self.database = database;
        self
    }

    /// Sets the maximum number of execution attempts (minimum 1).
    #[must_use]
    pub fn with_max_attempts(mut self, max: usize) -> Self {
        self.refinement = self.refinement.with_max_attempts(max);
        self
    }

    /// Sets the per-call timeout of the loop; `None` disables it.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.refinement = self.refinement.with_call_timeout(timeout);
        self
    }
}
