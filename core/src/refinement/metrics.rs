//! Metrics tracking for refinement runs.

use std::time::Duration;

/// Metrics collected during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Execution attempts made (never above the configured maximum).
    pub attempts: usize,
    /// Successful refinement requests.
    pub refinements: usize,
    /// Wall-clock time of the whole run.
    pub wall_time: Duration,
}
