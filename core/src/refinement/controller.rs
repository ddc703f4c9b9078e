//! Orchestration layer for the generate, execute, refine loop.

use std::future::Future;

use tracing::Instrument;
use uuid::Uuid;

use super::config::RefinementConfig;
use super::context::RunContext;
use super::error::{GenerationStage, RunError};
use super::result::RunResult;
use crate::sanitize::sanitize_sql;
use crate::seams::{ExecutionOutcome, RunEnvironment};
use crate::state::State;

/// Drives one natural-language request to an executed statement.
///
/// The controller asks the oracle for SQL, executes it, and feeds any
/// execution error back to the oracle for a corrected statement, up to
/// [`RefinementConfig::max_attempts`] executions. Schema and oracle failures
/// end the run immediately; only execution errors are retried.
///
/// The controller holds no per-run state, so one instance can serve
/// concurrent runs as long as the collaborators in the [`RunEnvironment`] can.
#[derive(Debug, Clone, Default)]
pub struct RefinementController {
    config: RefinementConfig,
}

impl RefinementController {
    /// Creates a controller with the default configuration (3 attempts).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a controller with the given configuration.
    #[must_use]
    pub fn with_config(config: RefinementConfig) -> Self {
        let max = config.max_attempts;
        Self {
            config: config.with_max_attempts(max),
        }
    }

    /// Sets the maximum number of execution attempts (fluent builder pattern).
    #[must_use]
    pub fn max_attempts(mut self, max: usize) -> Self {
        self.config = self.config.with_max_attempts(max);
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RefinementConfig {
        &self.config
    }

    /// Runs the refinement loop for `query`.
    ///
    /// Never fails: every outcome, including collaborator errors and
    /// timeouts, is returned as a [`RunResult`] carrying the full trace.
    pub async fn run(&self, env: &RunEnvironment, query: &str) -> RunResult {
        let span = tracing::info_span!("refinement_run", run_id = %Uuid::new_v4());
        self.run_inner(env, query).instrument(span).await
    }

    async fn run_inner(&self, env: &RunEnvironment, query: &str) -> RunResult {
        let max_attempts = self.config.max_attempts;
        let mut ctx = RunContext::new(max_attempts);

        ctx.emit(State::Start, None);
        ctx.emit(State::Input, Some(format!("Received query: {query}")));

        let schema = match self
            .bounded(env.schema_provider.get_schema(), "schema retrieval")
            .await
            .and_then(std::convert::identity)
        {
            Ok(schema) => schema,
            Err(message) => return ctx.fail(RunError::Schema { message }),
        };
        tracing::debug!(tables = schema.len(), "schema loaded");

        ctx.emit(State::Process, Some("Generating initial SQL".to_string()));
        let raw = match self
            .bounded(
                env.generator.generate_initial(query, &schema),
                "initial SQL generation",
            )
            .await
            .and_then(std::convert::identity)
        {
            Ok(raw) => raw,
            Err(message) => {
                return ctx.fail(RunError::Generation {
                    stage: GenerationStage::Initial,
                    attempt: 0,
                    message,
                });
            }
        };
        let sql = sanitize_sql(&raw);
        ctx.emit(State::Observation, Some(format!("Generated initial SQL: {sql}")));
        ctx.replace_sql(sql);

        loop {
            let attempt = ctx.begin_attempt();
            let sql = ctx.current_sql().unwrap_or_default().to_string();
            tracing::debug!(attempt, max_attempts, sql = %sql, "executing candidate");

            let outcome = match self.bounded(env.executor.execute(&sql), "query execution").await
            {
                Ok(outcome) => outcome,
                Err(message) => ExecutionOutcome::failure(message),
            };

            let error_message = match outcome {
                ExecutionOutcome::Success { rows } => return ctx.succeed(rows),
                ExecutionOutcome::Failure { error_message } => error_message,
            };

            tracing::warn!(attempt, max_attempts, error = %error_message, "execution failed");
            ctx.emit(
                State::Error,
                Some(format!("Attempt {attempt}/{max_attempts} failed: {error_message}")),
            );
            ctx.record_failure(sql.clone(), error_message.clone());

            if !ctx.has_attempts_left() {
                let error = ctx.exhausted();
                return ctx.fail(error);
            }

            ctx.emit(State::Process, Some("Refining SQL based on error".to_string()));
            let raw = match self
                .bounded(
                    env.generator.refine(&sql, &error_message, &schema),
                    "SQL refinement",
                )
                .await
                .and_then(std::convert::identity)
            {
                Ok(raw) => raw,
                Err(message) => {
                    return ctx.fail(RunError::Generation {
                        stage: GenerationStage::Refinement,
                        attempt,
                        message,
                    });
                }
            };
            let refined = sanitize_sql(&raw);
            ctx.emit(State::Observation, Some(format!("Refined SQL: {refined}")));
            ctx.replace_sql(refined);
            ctx.count_refinement();
        }
    }

    /// Applies the per-call timeout to a collaborator call.
    async fn bounded<T>(&self, call: impl Future<Output = T>, what: &str) -> Result<T, String> {
        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| format!("{what} timed out after {limit:?}")),
            None => Ok(call.await),
        }
    }
}
