//! Error types for refinement runs with attempt history tracking.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Reason text for a run that spent its whole attempt budget.
pub const EXHAUSTED_REASON: &str = "maximum refinement attempts reached";

/// Which oracle request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    /// The first SQL candidate.
    Initial,
    /// A correction after a failed execution.
    Refinement,
}

/// Record of a single failed execution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// The attempt number (1-indexed).
    pub attempt_number: usize,
    /// The statement that was executed.
    pub sql: String,
    /// Execution error text returned by the database.
    pub error: String,
    /// Elapsed run time when the attempt finished.
    pub elapsed: Duration,
}

/// Terminal failures of a refinement run.
///
/// Execution errors are not terminal on their own; they are kept as
/// [`AttemptRecord`]s and only surface through [`RunError::ExhaustedRetries`].
#[derive(Debug, Clone, Error)]
pub enum RunError {
    /// Schema retrieval failed. Never retried.
    #[error("{message}")]
    Schema {
        /// Underlying error text.
        message: String,
    },

    /// The oracle failed to produce SQL. Never retried by the controller.
    #[error("{message}")]
    Generation {
        /// Whether the initial request or a refinement failed.
        stage: GenerationStage,
        /// Attempts executed before the failure (0 for the initial request).
        attempt: usize,
        /// Underlying error text.
        message: String,
    },

    /// Every execution attempt failed.
    #[error("maximum refinement attempts reached")]
    ExhaustedRetries {
        /// Number of executions made.
        attempts: usize,
        /// Configured attempt budget.
        max_attempts: usize,
        /// Error text of the final execution.
        last_error: String,
        /// Every failed attempt in order.
        history: Vec<AttemptRecord>,
    },
}

impl RunError {
    /// Short, stable name of the failure source.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Schema { .. } => "schema",
            Self::Generation { .. } => "generation",
            Self::ExhaustedRetries { .. } => "exhausted_retries",
        }
    }

    /// The error text a user should see: the last execution error when
    /// retries ran out, otherwise the first fatal error.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Schema { message } | Self::Generation { message, .. } => message,
            Self::ExhaustedRetries { last_error, .. } => last_error,
        }
    }
}
