//! Core of the sqlrefine workspace.
//!
//! This crate owns the self-correcting text-to-SQL loop and everything it is
//! built from:
//!
//! - [`refinement::RefinementController`] - generate, execute, refine until the
//!   statement runs or the attempt budget is spent
//! - [`seams`] - the collaborator traits the controller depends on
//!   ([`seams::SchemaProvider`], [`seams::SqlGenerator`], [`seams::QueryExecutor`])
//! - [`state`] - the append-only trace returned with every run
//! - [`visual`] - the secondary chart-classification and rendering feature
//!
//! No I/O happens here; database and oracle adapters live in their own crates.

pub mod generator;
pub mod oracle;
pub mod refinement;
pub mod sanitize;
pub mod schema;
pub mod seams;
pub mod state;
pub mod visual;

/// Common traits and types for ergonomic usage of the refinement loop.
pub mod prelude {
    pub use crate::generator::OracleSqlGenerator;
    pub use crate::oracle::TextOracle;
    pub use crate::refinement::{
        AttemptRecord, GenerationStage, RefinementConfig, RefinementController, RunError,
        RunMetrics, RunResult,
    };
    pub use crate::sanitize::sanitize_sql;
    pub use crate::schema::{Schema, SchemaError};
    pub use crate::seams::{
        ExecutionOutcome, QueryExecutor, Row, RunEnvironment, SchemaProvider, SqlGenerator,
    };
    pub use crate::state::{State, StateEvent, Trace};
    pub use crate::visual::{
        ChartError, ChartKind, ChartPlan, Dataset, DatasetError, DatasetStore,
        VisualizationResult, Visualizer,
    };
}
