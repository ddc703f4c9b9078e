//! The generate, execute, refine loop.
//!
//! - [`RefinementController`] - bounded retry loop driven by execution errors
//! - [`RunError`] - typed failure per source, with attempt history
//! - [`RunMetrics`] - attempt and timing metrics
//! - [`RefinementConfig`] - attempt budget and per-call timeout
//! - [`prompt`] - prompt builders for the initial and refinement requests

pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod prompt;
pub mod result;

pub use config::RefinementConfig;
pub use context::RunContext;
pub use controller::RefinementController;
pub use error::{AttemptRecord, GenerationStage, RunError};
pub use metrics::RunMetrics;
pub use result::RunResult;
