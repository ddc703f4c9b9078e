//! Serializable envelopes for run and chart results.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlrefine_core::refinement::RunResult;
use sqlrefine_core::seams::Row;
use sqlrefine_core::state::Trace;
use sqlrefine_core::visual::{ChartKind, VisualizationResult};

/// Outcome tag of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// The request succeeded.
    Success,
    /// The request failed; see `message`.
    Error,
}

/// Envelope for one refinement run.
///
/// `states` carries every transition with upper-case state names and
/// RFC 3339 timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Success or error.
    pub status: ResponseStatus,
    /// The statement that ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    /// Rows returned by the statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Row>>,
    /// Failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Underlying error text: the last execution error when the attempt
    /// budget ran out, otherwise the fatal error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Failure category: `schema`, `generation`, or `exhausted_retries`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Executions performed.
    pub attempts: usize,
    /// The run's trace.
    pub states: Trace,
}

impl QueryResponse {
    /// Returns `true` for a successful run.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

impl From<&RunResult> for QueryResponse {
    fn from(result: &RunResult) -> Self {
        let attempts = result.metrics().attempts;
        match result {
            RunResult::Success {
                sql, rows, trace, ..
            } => Self {
                status: ResponseStatus::Success,
                sql: Some(sql.clone()),
                result: Some(rows.clone()),
                message: None,
                detail: None,
                kind: None,
                attempts,
                states: trace.clone(),
            },
            RunResult::Failure {
                reason,
                error,
                trace,
                ..
            } => Self {
                status: ResponseStatus::Error,
                sql: None,
                result: None,
                message: Some(reason.clone()),
                detail: Some(error.detail().to_string()),
                kind: Some(error.kind().to_string()),
                attempts,
                states: trace.clone(),
            },
        }
    }
}

impl From<RunResult> for QueryResponse {
    fn from(result: RunResult) -> Self {
        Self::from(&result)
    }
}

/// Envelope for one chart request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResponse {
    /// Success or error.
    pub status: ResponseStatus,
    /// Chosen chart type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<ChartKind>,
    /// Plotted columns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    /// Vega-Lite v5 spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
    /// Failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The request's trace.
    pub states: Trace,
}

impl From<&VisualizationResult> for ChartResponse {
    fn from(result: &VisualizationResult) -> Self {
        match result {
            VisualizationResult::Success { plan, spec, trace } => Self {
                status: ResponseStatus::Success,
                visualization: Some(plan.visualization),
                columns: plan.columns.clone(),
                spec: Some(spec.clone()),
                message: None,
                states: trace.clone(),
            },
            VisualizationResult::Failure { error, trace } => Self {
                status: ResponseStatus::Error,
                visualization: None,
                columns: Vec::new(),
                spec: None,
                message: Some(error.to_string()),
                states: trace.clone(),
            },
        }
    }
}
