//! Oracle-driven chart selection.

use serde_json::Value;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use super::chart::{ChartError, ChartPlan, build_chart_prompt, parse_chart_plan};
use super::dataset::Dataset;
use super::render::render_chart;
use crate::oracle::TextOracle;
use crate::refinement::config::DEFAULT_CALL_TIMEOUT;
use crate::state::{State, Trace};

/// Outcome of [`Visualizer::visualize`].
#[derive(Debug, Clone)]
pub enum VisualizationResult {
    /// A chart was planned and rendered.
    Success {
        /// The oracle's validated plan.
        plan: ChartPlan,
        /// Vega-Lite v5 spec.
        spec: Value,
        /// Transitions of the request.
        trace: Trace,
    },
    /// No chart was produced.
    Failure {
        /// What went wrong.
        error: ChartError,
        /// Transitions of the request.
        trace: Trace,
    },
}

impl VisualizationResult {
    /// Returns `true` for [`VisualizationResult::Success`].
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

    /// Rendered spec on success.
    #[must_use]
    pub const fn spec(&self) -> Option<&Value> {
        match self {
            Self::Success { spec, .. } => Some(spec),
            Self::Failure { .. } => None,
        }
    }
}

/// Asks an oracle which chart answers a request, then renders it.
///
/// One oracle call per request; an unusable reply is not retried.
#[derive(Debug, Clone)]
pub struct Visualizer<O> {
    oracle: O,
    call_timeout: Option<Duration>,
}

impl<O: TextOracle> Visualizer<O> {
    /// Wraps `oracle` with the default call timeout.
    #[must_use]
    pub const fn new(oracle: O) -> Self {
        Self {
            oracle,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
        }
    }

    /// Sets the oracle timeout; `None` waits indefinitely.
    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Plans and renders a chart for `request` over `dataset`.
    pub async fn visualize(&self, dataset: &Dataset, request: &str) -> VisualizationResult {
        let span = tracing::info_span!("visualization", run_id = %Uuid::new_v4());
        self.visualize_inner(dataset, request).instrument(span).await
    }

    async fn visualize_inner(&self, dataset: &Dataset, request: &str) -> VisualizationResult {
        let mut trace = Trace::new();
        trace.record(State::Start, None);
        trace.record(
            State::Input,
            Some(format!("Received visualization request: {request}")),
        );

        match self.plan_and_render(dataset, request, &mut trace).await {
            Ok((plan, spec)) => {
                trace.record(State::Output, Some(format!("Rendered {}", plan.visualization)));
                trace.record(State::Stop, Some("Process completed successfully".to_string()));
                VisualizationResult::Success { plan, spec, trace }
            }
            Err(error) => {
                tracing::error!(error = %error, "visualization failed");
                trace.record(State::Error, Some(error.to_string()));
                trace.record(State::Stop, Some(format!("Process failed: {error}")));
                VisualizationResult::Failure { error, trace }
            }
        }
    }

    async fn plan_and_render(
        &self,
        dataset: &Dataset,
        request: &str,
        trace: &mut Trace,
    ) -> Result<(ChartPlan, Value), ChartError> {
        trace.record(State::Process, Some("AI interpreting query".to_string()));
        let prompt = build_chart_prompt(dataset, request);
        tracing::debug!(prompt = %prompt, "requesting chart plan");

        let call = self.oracle.complete(&prompt);
        let raw = match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                ChartError::Oracle(format!("chart planning timed out after {limit:?}"))
            })?,
            None => call.await,
        }
        .map_err(ChartError::Oracle)?;
        tracing::debug!(response = %raw, "chart plan response");

        let plan = parse_chart_plan(&raw, dataset)?;
        trace.record(
            State::Observation,
            Some(format!(
                "Chart plan: {} [{}]",
                plan.visualization,
                plan.columns.join(", ")
            )),
        );

        let spec = render_chart(&plan, dataset)?;
        Ok((plan, spec))
    }
}
