//! Convenience re-exports for common sqlrefine types.
//!
//! ```
//! use sqlrefine::prelude::*;
//! ```

pub use crate::client::Client;
pub use crate::config::ClientConfig;
pub use crate::errors::Error;
pub use crate::gemini::GeminiOracle;
pub use crate::response::{ChartResponse, QueryResponse, ResponseStatus};

pub use sqlrefine_core::prelude::*;
pub use sqlrefine_gemini::{GeminiClient, GeminiConfig};
pub use sqlrefine_mysql::{ConnectConfig, ConnectReport, MySqlDatabase};
