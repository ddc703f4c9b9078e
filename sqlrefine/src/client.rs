//! Connected client: one Gemini oracle, one MySQL pool, one refinement loop.
//!
//! # Example
//!
//! ```no_run
//! # use sqlrefine::prelude::*;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new()
//!     .with_database(ConnectConfig::from_url("mysql://root@localhost/shop"))
//!     .with_max_attempts(5);
//! let client = Client::connect(config).await?;
//!
//! let response = client.query("Top five products by revenue").await;
//! assert!(response.is_success());
//! # Ok(())
//! # }
//! ```

use crate::config::ClientConfig;
use crate::errors::Error;
use crate::gemini::GeminiOracle;
use crate::response::QueryResponse;
use sqlrefine_core::generator::OracleSqlGenerator;
use sqlrefine_core::oracle::TextOracle;
use sqlrefine_core::refinement::{RefinementConfig, RefinementController, RunResult};
use sqlrefine_core::schema::Schema;
use sqlrefine_core::seams::{QueryExecutor, RunEnvironment};
use sqlrefine_core::visual::{Dataset, DatasetStore, VisualizationResult, Visualizer};
use sqlrefine_mysql::{ConnectReport, MySqlDatabase};
use std::sync::Arc;

/// Text-to-SQL client.
///
/// Cheap to clone; clones share the connection pool, the oracle and the
/// dataset cache. Runs on one client may proceed concurrently.
#[derive(Clone)]
pub struct Client {
    controller: RefinementController,
    env: RunEnvironment,
    oracle: Arc<dyn TextOracle>,
    datasets: DatasetStore,
    database: Option<MySqlDatabase>,
    report: Option<ConnectReport>,
}

impl Client {
    /// Resolves the Gemini key, connects to MySQL and wires the loop.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingApiKey`] when no Gemini key is configured
    /// - [`Error::Gemini`] when the HTTP client cannot be built
    /// - [`Error::Database`] when the connection or its probe fails
    pub async fn connect(config: ClientConfig) -> Result<Self, Error> {
        let oracle = GeminiOracle::discover(config.gemini_api_key.clone(), config.gemini.clone())?;
        let oracle: Arc<dyn TextOracle> = Arc::new(oracle);

        let (database, report) = MySqlDatabase::connect(&config.database).await?;
        tracing::info!(
            server_version = %report.server_version,
            database = report.database.as_deref().unwrap_or(""),
            model = %config.gemini.model,
            "client connected"
        );

        let shared = Arc::new(database.clone());
        let env = RunEnvironment::new(
            Arc::new(OracleSqlGenerator::new(Arc::clone(&oracle))),
            Arc::clone(&shared) as Arc<dyn QueryExecutor>,
            shared,
        );

        let mut client = Self::from_parts(env, oracle, config.refinement);
        client.database = Some(database);
        client.report = Some(report);
        Ok(client)
    }

    /// Builds a client from pre-made collaborators, without any I/O.
    ///
    /// `oracle` is used for chart planning; SQL generation goes through
    /// `env.generator`.
    #[must_use]
    pub fn from_parts(
        env: RunEnvironment,
        oracle: Arc<dyn TextOracle>,
        refinement: RefinementConfig,
    ) -> Self {
        Self {
            controller: RefinementController::with_config(refinement),
            env,
            oracle,
            datasets: DatasetStore::new(),
            database: None,
            report: None,
        }
    }

    /// Runs the refinement loop for `query`.
    pub async fn run_query_loop(&self, query: &str) -> RunResult {
        self.controller.run(&self.env, query).await
    }

    /// Runs the refinement loop and wraps the outcome in a [`QueryResponse`].
    pub async fn query(&self, query: &str) -> QueryResponse {
        QueryResponse::from(self.run_query_loop(query).await)
    }

    /// Fetches the current schema through the configured provider.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] with the provider's message.
    pub async fn schema(&self) -> Result<Schema, Error> {
        self.env
            .schema_provider
            .get_schema()
            .await
            .map_err(Error::Schema)
    }

    /// Plans and renders a chart for `request` over `dataset`.
    pub async fn visualize(&self, dataset: &Dataset, request: &str) -> VisualizationResult {
        Visualizer::new(Arc::clone(&self.oracle))
            .with_call_timeout(self.controller.config().call_timeout)
            .visualize(dataset, request)
            .await
    }

    /// Parses a CSV upload and stores it for `user_id`, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dataset`] when the bytes are not usable CSV.
    pub async fn upload(&self, user_id: &str, csv: &[u8]) -> Result<Arc<Dataset>, Error> {
        let dataset = Dataset::from_csv_bytes(csv)?;
        tracing::info!(
            user_id,
            rows = dataset.len(),
            columns = dataset.columns().len(),
            "dataset uploaded"
        );
        self.datasets.insert(user_id, dataset).await;
        self.datasets
            .get(user_id)
            .await
            .ok_or_else(|| Error::NoDataset(user_id.to_string()))
    }

    /// Charts the dataset previously uploaded by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDataset`] when nothing was uploaded for the user.
    pub async fn visualize_for(
        &self,
        user_id: &str,
        request: &str,
    ) -> Result<VisualizationResult, Error> {
        let dataset = self
            .datasets
            .get(user_id)
            .await
            .ok_or_else(|| Error::NoDataset(user_id.to_string()))?;
        Ok(self.visualize(&dataset, request).await)
    }

    /// Uploaded datasets.
    #[must_use]
    pub const fn datasets(&self) -> &DatasetStore {
        &self.datasets
    }

    /// The refinement settings in use.
    #[must_use]
    pub const fn refinement(&self) -> &RefinementConfig {
        self.controller.config()
    }

    /// Server details captured by [`Client::connect`].
    #[must_use]
    pub const fn connect_report(&self) -> Option<&ConnectReport> {
        self.report.as_ref()
    }

    /// Closes the database pool, if this client owns one.
    pub async fn close(&self) {
        if let Some(database) = &self.database {
            database.close().await;
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("refinement", self.controller.config())
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}
