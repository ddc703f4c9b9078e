//! # sqlrefine
//!
//! Ask a MySQL database questions in plain language.
//!
//! This crate wires the Gemini oracle and a MySQL connection into the
//! self-correcting refinement loop of `sqlrefine-core`: the oracle writes SQL,
//! the database runs it, and any driver error is fed back to the oracle for a
//! corrected statement until one runs or the attempt budget is spent.
//!
//! ## Example
//!
//! ```no_run
//! # use sqlrefine::prelude::*;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Connects to the database in $SQLREFINE_DATABASE_URL and reads the
//! // Gemini key from $SQLREFINE_GEMINI_API_KEY
//! let client = Client::connect(ClientConfig::default()).await?;
//!
//! let result = client.run_query_loop("How many users signed up last week?").await;
//! let response = QueryResponse::from(&result);
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

/// The connected client.
pub mod client;

/// Client configuration.
pub mod config;

/// Public error types.
pub mod errors;

/// Gemini as a [`sqlrefine_core::oracle::TextOracle`].
pub mod gemini;

/// Serializable response envelopes.
pub mod response;

/// Commonly used types and traits.
pub mod prelude;
