//! Configuration for refinement retry behavior.

use std::time::Duration;

/// Default number of execution attempts per run.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Default upper bound for a single collaborator call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for refinement retry behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementConfig {
    /// Maximum number of execution attempts before giving up (default: 3, minimum: 1).
    pub max_attempts: usize,
    /// Upper bound for each schema, oracle, or database call (default: 120s).
    ///
    /// `None` lets a hung collaborator block the run indefinitely.
    pub call_timeout: Option<Duration>,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
        }
    }
}

impl RefinementConfig {
    /// Set the maximum number of execution attempts. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max.max(1);
        self
    }

    /// Set the per-call timeout (`None` disables it).
    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RefinementConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.call_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_max_attempts_is_at_least_one() {
        assert_eq!(RefinementConfig::default().with_max_attempts(0).max_attempts, 1);
        assert_eq!(RefinementConfig::default().with_max_attempts(10).max_attempts, 10);
    }
}
