//! MySQL adapter for the refinement loop.
//!
//! This crate provides connection resolution, schema introspection, and
//! statement execution over a `sqlx` pool, and implements the core
//! [`SchemaProvider`] and [`QueryExecutor`] seams.

/// Resolution of connection options from config and the environment.
pub mod discovery;
/// Error types returned by adapter operations.
pub mod error;
/// Statement execution and row conversion.
pub mod executor;
/// Schema introspection.
pub mod schema;
/// Connection settings and reports.
pub mod types;

pub use discovery::{DATABASE_URL_ENV_VAR, FALLBACK_DATABASE_URL_ENV_VAR, resolve_connect_options};
pub use error::MySqlError;
pub use types::*;

use async_trait::async_trait;
use sqlrefine_core::schema::Schema;
use sqlrefine_core::seams::{ExecutionOutcome, QueryExecutor, Row, SchemaProvider};
use sqlx::Row as _;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

/// A pooled MySQL connection.
#[derive(Debug, Clone)]
pub struct MySqlDatabase {
    pool: MySqlPool,
}

impl MySqlDatabase {
    /// Opens a pool, probes it, and reports the server version and database.
    ///
    /// # Errors
    ///
    /// Returns `MySqlError` if the options do not resolve or the server is unreachable.
    pub async fn connect(config: &ConnectConfig) -> Result<(Self, ConnectReport), MySqlError> {
        let (options, source) = resolve_connect_options(config)?;
        tracing::debug!(?source, host = options.get_host(), "connecting to MySQL");

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(MySqlError::Connect)?;

        let db = Self { pool };
        let report = db.probe().await.map_err(MySqlError::Connect)?;
        tracing::info!(
            server_version = %report.server_version,
            database = report.database.as_deref().unwrap_or(""),
            "connected to MySQL"
        );
        Ok((db, report))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    async fn probe(&self) -> Result<ConnectReport, sqlx::Error> {
        let row = sqlx::query("SELECT VERSION(), DATABASE()")
            .fetch_one(&self.pool)
            .await?;
        Ok(ConnectReport {
            server_version: row.try_get_unchecked::<String, _>(0)?,
            database: row.try_get_unchecked::<Option<String>, _>(1)?,
        })
    }

    /// Tables and columns of the default database.
    ///
    /// # Errors
    ///
    /// Returns `MySqlError` if the introspection query fails.
    pub async fn schema(&self) -> Result<Schema, MySqlError> {
        schema::introspect(&self.pool).await
    }

    /// Executes one statement (or a `;`-separated batch).
    ///
    /// # Errors
    ///
    /// Returns `MySqlError::Query` with the driver message.
    pub async fn execute(&self, sql: &str) -> Result<Vec<Row>, MySqlError> {
        executor::execute(&self.pool, sql).await
    }

    /// Closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl SchemaProvider for MySqlDatabase {
    async fn get_schema(&self) -> Result<Schema, String> {
        self.schema().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl QueryExecutor for MySqlDatabase {
    async fn execute(&self, sql: &str) -> ExecutionOutcome {
        match executor::execute(&self.pool, sql).await {
            Ok(rows) => ExecutionOutcome::success(rows),
            Err(e) => ExecutionOutcome::failure(e.to_string()),
        }
    }
}
