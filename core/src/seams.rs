//! Collaborator traits consumed by the refinement controller.
//!
//! These are the only seams the controller depends on. Concrete adapters
//! (MySQL, Gemini) implement them in their own crates; tests implement them
//! with scripted fakes.

use crate::schema::Schema;
use async_trait::async_trait;
use std::sync::Arc;

/// One result row: column name to value, in result-set column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Outcome of executing one statement. Driver errors are values, never panics.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// The statement ran. Statements without a result set yield no rows.
    Success {
        /// Returned rows.
        rows: Vec<Row>,
    },
    /// The database rejected or failed the statement.
    Failure {
        /// Driver error text, passed verbatim to the refinement prompt.
        error_message: String,
    },
}

impl ExecutionOutcome {
    /// Successful outcome with `rows`.
    #[must_use]
    pub const fn success(rows: Vec<Row>) -> Self {
        Self::Success { rows }
    }

    /// Failed outcome with the given error text.
    #[must_use]
    pub fn failure(error_message: impl Into<String>) -> Self {
        Self::Failure {
            error_message: error_message.into(),
        }
    }

    /// Returns `true` for [`ExecutionOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Supplies the schema snapshot used for one run.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Enumerates tables and their columns.
    async fn get_schema(&self) -> Result<Schema, String>;
}

/// Turns natural language (and execution feedback) into candidate SQL text.
///
/// Implementations may be non-deterministic; callers must not assume that
/// identical inputs produce identical output.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    /// Produces the first candidate statement for `query`.
    async fn generate_initial(&self, query: &str, schema: &Schema) -> Result<String, String>;

    /// Produces a corrected statement given the prior one and its execution error.
    async fn refine(
        &self,
        prior_sql: &str,
        execution_error: &str,
        schema: &Schema,
    ) -> Result<String, String>;
}

/// Runs SQL against a live connection.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes `sql`, capturing any driver error as [`ExecutionOutcome::Failure`].
    async fn execute(&self, sql: &str) -> ExecutionOutcome;
}

/// The collaborators of a run, built once and passed by reference into
/// [`crate::refinement::RefinementController::run`].
#[derive(Clone)]
pub struct RunEnvironment {
    /// SQL oracle.
    pub generator: Arc<dyn SqlGenerator>,
    /// Statement executor.
    pub executor: Arc<dyn QueryExecutor>,
    /// Schema source.
    pub schema_provider: Arc<dyn SchemaProvider>,
}

impl RunEnvironment {
    /// Bundles the three collaborators.
    #[must_use]
    pub fn new(
        generator: Arc<dyn SqlGenerator>,
        executor: Arc<dyn QueryExecutor>,
        schema_provider: Arc<dyn SchemaProvider>,
    ) -> Self {
        Self {
            generator,
            executor,
            schema_provider,
        }
    }
}

impl std::fmt::Debug for RunEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunEnvironment").finish_non_exhaustive()
    }
}
