//! Public error types for sqlrefine.

use sqlrefine_gemini::GeminiError;
use thiserror::Error;

/// Errors that can occur when building or using a [`crate::client::Client`].
///
/// Failures inside a refinement run are never errors: they come back as
/// [`sqlrefine_core::refinement::RunResult::Failure`] with the full trace.
#[derive(Debug, Error)]
pub enum Error {
    /// No Gemini API key was configured.
    #[error(
        "Gemini API key not found. Set SQLREFINE_GEMINI_API_KEY or GEMINI_API_KEY, or pass --api-key"
    )]
    MissingApiKey,

    /// Error from the Gemini client.
    #[error("{0}")]
    Gemini(GeminiError),

    /// Error from the MySQL adapter.
    #[error("{0}")]
    Database(#[from] sqlrefine_mysql::MySqlError),

    /// Schema retrieval failed.
    #[error("Schema retrieval failed: {0}")]
    Schema(String),

    /// A CSV upload could not be read.
    #[error("{0}")]
    Dataset(#[from] sqlrefine_core::visual::DatasetError),

    /// No dataset has been uploaded for the user.
    #[error("No data uploaded for user '{0}'")]
    NoDataset(String),
}

impl From<GeminiError> for Error {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::MissingApiKey(_) => Self::MissingApiKey,
            other => Self::Gemini(other),
        }
    }
}
