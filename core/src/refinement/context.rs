//! Per-invocation state of a refinement run.

use tokio::time::Instant;

use super::error::{AttemptRecord, RunError};
use super::metrics::RunMetrics;
use super::result::RunResult;
use crate::seams::Row;
use crate::state::{State, Trace};

/// State owned by exactly one run: the current statement, the attempt
/// counter, and the trace.
///
/// `current_sql` is replaced, never appended to. `attempt_count` never
/// exceeds `max_attempts`.
#[derive(Debug)]
pub struct RunContext {
    current_sql: Option<String>,
    attempt_count: usize,
    max_attempts: usize,
    refinements: usize,
    history: Vec<AttemptRecord>,
    trace: Trace,
    started: Instant,
}

impl RunContext {
    pub(crate) fn new(max_attempts: usize) -> Self {
        Self {
            current_sql: None,
            attempt_count: 0,
            max_attempts,
            refinements: 0,
            history: Vec::new(),
            trace: Trace::new(),
            started: Instant::now(),
        }
    }

    /// The statement the next attempt will execute.
    #[must_use]
    pub fn current_sql(&self) -> Option<&str> {
        self.current_sql.as_deref()
    }

    /// Executions started so far.
    #[must_use]
    pub const fn attempt_count(&self) -> usize {
        self.attempt_count
    }

    /// Trace recorded so far.
    #[must_use]
    pub const fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Whether another execution fits in the budget.
    #[must_use]
    pub const fn has_attempts_left(&self) -> bool {
        self.attempt_count < self.max_attempts
    }

    pub(crate) fn emit(&mut self, state: State, message: Option<String>) {
        self.trace.record(state, message);
    }

    pub(crate) fn replace_sql(&mut self, sql: String) {
        self.current_sql = Some(sql);
    }

    pub(crate) fn count_refinement(&mut self) {
        self.refinements += 1;
    }

    /// Starts the next attempt and returns its 1-indexed number.
    pub(crate) fn begin_attempt(&mut self) -> usize {
        debug_assert!(self.has_attempts_left(), "attempt budget exceeded");
        self.attempt_count = (self.attempt_count + 1).min(self.max_attempts);
        self.attempt_count
    }

    pub(crate) fn record_failure(&mut self, sql: String, error: String) {
        self.history.push(AttemptRecord {
            attempt_number: self.attempt_count,
            sql,
            error,
            elapsed: self.started.elapsed(),
        });
    }

    pub(crate) fn exhausted(&mut self) -> RunError {
        let history = std::mem::take(&mut self.history);
        let last_error = history
            .last()
            .map(|record| record.error.clone())
            .unwrap_or_default();
        RunError::ExhaustedRetries {
            attempts: self.attempt_count,
            max_attempts: self.max_attempts,
            last_error,
            history,
        }
    }

    fn metrics(&self) -> RunMetrics {
        RunMetrics {
            attempts: self.attempt_count,
            refinements: self.refinements,
            wall_time: self.started.elapsed(),
        }
    }

    pub(crate) fn succeed(mut self, rows: Vec<Row>) -> RunResult {
        self.emit(
            State::Output,
            Some(format!("Query executed successfully ({} rows)", rows.len())),
        );
        self.emit(State::Stop, Some("Process completed successfully".to_string()));

        let metrics = self.metrics();
        RunResult::Success {
            sql: self.current_sql.unwrap_or_default(),
            rows,
            trace: self.trace,
            metrics,
        }
    }

    pub(crate) fn fail(mut self, error: RunError) -> RunResult {
        // Exhaustion already logged an ERROR for its final attempt.
        if !matches!(error, RunError::ExhaustedRetries { .. }) {
            self.emit(State::Error, Some(error.detail().to_string()));
        }
        self.emit(State::Stop, Some(format!("Process failed: {error}")));

        tracing::error!(kind = error.kind(), detail = error.detail(), "run failed");

        let metrics = self.metrics();
        RunResult::Failure {
            reason: error.to_string(),
            error,
            trace: self.trace,
            metrics,
        }
    }
}
