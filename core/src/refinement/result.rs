//! Terminal value of a refinement run.

use super::error::RunError;
use super::metrics::RunMetrics;
use crate::seams::Row;
use crate::state::Trace;

/// Outcome of [`crate::refinement::RefinementController::run`].
///
/// Both variants carry the complete trace.
#[derive(Debug, Clone)]
pub enum RunResult {
    /// A statement executed.
    Success {
        /// The statement that ran.
        sql: String,
        /// Its rows (possibly none).
        rows: Vec<Row>,
        /// Every transition of the run.
        trace: Trace,
        /// Attempt and timing metrics.
        metrics: RunMetrics,
    },
    /// The run stopped without a successful execution.
    Failure {
        /// Reason text: the fatal error message, or
        /// "maximum refinement attempts reached".
        reason: String,
        /// Typed error with its payload.
        error: RunError,
        /// Every transition of the run.
        trace: Trace,
        /// Attempt and timing metrics.
        metrics: RunMetrics,
    },
}

impl RunResult {
    /// Returns `true` for [`RunResult::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The trace, whatever the outcome.
    #[must_use]
    pub const fn trace(&self) -> &Trace {
        match self {
            Self::Success { trace, .. } | Self::Failure { trace, .. } => trace,
        }
    }

    /// Metrics, whatever the outcome.
    #[must_use]
    pub const fn metrics(&self) -> &RunMetrics {
        match self {
            Self::Success { metrics, .. } | Self::Failure { metrics, .. } => metrics,
        }
    }

    /// The executed statement on success.
    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Success { sql, .. } => Some(sql),
            Self::Failure { .. } => None,
        }
    }

    /// Rows on success.
    #[must_use]
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            Self::Success { rows, .. } => Some(rows),
            Self::Failure { .. } => None,
        }
    }

    /// Failure reason.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(reason),
        }
    }

    /// Typed failure.
    #[must_use]
    pub const fn error(&self) -> Option<&RunError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}
