//! Chart plans: what the oracle is asked for and how its reply is checked.

use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use thiserror::Error;

use super::dataset::Dataset;
use crate::sanitize::strip_code_fences;

/// Errors that can occur while planning or rendering a chart.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChartError {
    /// The oracle returned nothing.
    #[error("AI returned an empty response")]
    EmptyResponse,

    /// The oracle reply is not JSON.
    #[error("Failed to interpret AI response: invalid JSON format ({0})")]
    InvalidJson(String),

    /// The reply is JSON but does not match the chart plan schema.
    #[error("Chart plan does not match schema: {}", errors.join("; "))]
    SchemaViolation {
        /// Every validation error, with its instance path.
        errors: Vec<String>,
    },

    /// A planned column is not in the dataset.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// The chart needs more columns than were planned.
    #[error("{kind} needs at least {required} column(s), got {got}")]
    MissingColumns {
        /// The planned chart.
        kind: ChartKind,
        /// Minimum number of columns.
        required: usize,
        /// Columns supplied.
        got: usize,
    },

    /// A column that must be numeric has no numeric values.
    #[error("Column '{0}' has no numeric values")]
    NoNumericData(String),

    /// The oracle call itself failed.
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// The plan could not be turned into a chart.
    #[error("Failed to generate plot: {0}")]
    Render(String),
}

/// Chart types the oracle may choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ChartKind {
    /// Distribution of one numeric column.
    #[serde(rename = "histogram")]
    Histogram,
    /// Two numeric columns against each other.
    #[serde(rename = "scatter plot")]
    ScatterPlot,
    /// Quartiles of one numeric column.
    #[serde(rename = "box plot")]
    BoxPlot,
    /// Value counts of one column.
    #[serde(rename = "bar chart")]
    BarChart,
    /// Numeric columns over row order.
    #[serde(rename = "line graph")]
    LineGraph,
    /// Value shares of one column.
    #[serde(rename = "pie chart")]
    PieChart,
    /// Correlation matrix of the numeric columns.
    #[serde(rename = "heatmap")]
    Heatmap,
    /// Pairwise scatter grid of the numeric columns.
    #[serde(rename = "pair plot")]
    PairPlot,
}

impl ChartKind {
    /// Every kind, in prompt order.
    pub const ALL: [Self; 8] = [
        Self::Histogram,
        Self::ScatterPlot,
        Self::BoxPlot,
        Self::BarChart,
        Self::PairPlot,
        Self::PieChart,
        Self::Heatmap,
        Self::LineGraph,
    ];

    /// Name used on the wire and in prompts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Histogram => "histogram",
            Self::ScatterPlot => "scatter plot",
            Self::BoxPlot => "box plot",
            Self::BarChart => "bar chart",
            Self::LineGraph => "line graph",
            Self::PieChart => "pie chart",
            Self::Heatmap => "heatmap",
            Self::PairPlot => "pair plot",
        }
    }

    /// Minimum number of planned columns.
    #[must_use]
    pub const fn min_columns(self) -> usize {
        match self {
            Self::ScatterPlot => 2,
            Self::Heatmap | Self::PairPlot => 0,
            Self::Histogram
            | Self::BoxPlot
            | Self::BarChart
            | Self::LineGraph
            | Self::PieChart => 1,
        }
    }

    /// Heatmaps and pair plots default to every numeric column.
    #[must_use]
    pub const fn uses_all_numeric(self) -> bool {
        matches!(self, Self::Heatmap | Self::PairPlot)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The oracle's choice of chart and columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChartPlan {
    /// Chart type.
    pub visualization: ChartKind,
    /// Columns to plot, in order.
    #[serde(default)]
    pub columns: Vec<String>,
}

/// JSON Schema of [`ChartPlan`].
#[must_use]
pub fn chart_plan_schema() -> Value {
    json!(schema_for!(ChartPlan))
}

/// Builds the classification prompt for `request` over `dataset`.
#[must_use]
pub fn build_chart_prompt(dataset: &Dataset, request: &str) -> String {
    let kinds: Vec<String> = ChartKind::ALL
        .iter()
        .map(|kind| format!("\"{kind}\""))
        .collect();

    let mut prompt = String::new();
    prompt.push_str("Given a dataset with columns ");
    prompt.push_str(&serde_json::to_string(dataset.columns()).unwrap_or_default());
    prompt.push_str(", interpret the following query:\n\"");
    prompt.push_str(request);
    prompt.push_str("\"\n\n");
    prompt.push_str("Identify the visualization type from: [");
    prompt.push_str(&kinds.join(", "));
    prompt.push_str("].\n");
    prompt.push_str(
        "Use only column names from the dataset. Give no columns for a pair plot or heatmap.\n\n",
    );
    prompt.push_str("Example:\n");
    prompt.push_str("User Query: \"Show me a bar chart of sales by category.\"\n");
    prompt.push_str("Response: {\"visualization\": \"bar chart\", \"columns\": [\"Category\", \"Sales\"]}\n\n");
    prompt.push_str("Return ONLY a JSON object in this format:\n");
    prompt.push_str("{\"visualization\": \"chosen_type\", \"columns\": [\"col1\", \"col2\"]}");
    prompt
}

/// Parses and checks an oracle reply against the schema and the dataset.
///
/// All schema errors are collected, not just the first.
pub fn parse_chart_plan(raw: &str, dataset: &Dataset) -> Result<ChartPlan, ChartError> {
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return Err(ChartError::EmptyResponse);
    }

    let value: Value =
        serde_json::from_str(&text).map_err(|e| ChartError::InvalidJson(e.to_string()))?;

    let schema = chart_plan_schema();
    let validator = jsonschema::Validator::new(&schema)
        .map_err(|e| ChartError::Render(format!("invalid chart plan schema: {e}")))?;
    let errors: Vec<String> = validator
        .iter_errors(&value)
        .map(|error| format!("At path '{}': {}", error.instance_path, error))
        .collect();
    if !errors.is_empty() {
        return Err(ChartError::SchemaViolation { errors });
    }

    let plan: ChartPlan =
        serde_json::from_value(value).map_err(|e| ChartError::InvalidJson(e.to_string()))?;
    check_plan(&plan, dataset)?;
    Ok(plan)
}

/// Checks column existence and count.
pub fn check_plan(plan: &ChartPlan, dataset: &Dataset) -> Result<(), ChartError> {
    if let Some(unknown) = plan
        .columns
        .iter()
        .find(|column| dataset.column_index(column).is_none())
    {
        return Err(ChartError::UnknownColumn(unknown.clone()));
    }

    let required = plan.visualization.min_columns();
    if plan.columns.len() < required {
        return Err(ChartError::MissingColumns {
            kind: plan.visualization,
            required,
            got: plan.columns.len(),
        });
    }
    Ok(())
}
