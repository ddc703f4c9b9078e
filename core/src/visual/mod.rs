//! Chart selection over uploaded CSV data.
//!
//! An oracle classifies a request into a [`ChartPlan`] (chart type plus
//! columns); the plan is validated against its JSON Schema and the dataset,
//! then rendered as a Vega-Lite spec.

pub mod chart;
pub mod dataset;
pub mod render;
pub mod visualizer;

pub use chart::{ChartError, ChartKind, ChartPlan, build_chart_prompt, parse_chart_plan};
pub use dataset::{Dataset, DatasetError, DatasetStore};
pub use render::render_chart;
pub use visualizer::{VisualizationResult, Visualizer};
