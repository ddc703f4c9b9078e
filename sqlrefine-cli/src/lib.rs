#![deny(missing_docs)]
//! Library half of the `sqlrefine` binary: argument parsing, subcommands and
//! text rendering, kept here so they can be tested without a process.

/// Command-line arguments.
pub mod args;
/// Subcommand handlers.
pub mod commands;
/// Error type of the binary.
pub mod errors;
/// Tracing subscriber setup.
pub mod logging;
/// Plain-text output.
pub mod render;

pub use args::{Cli, Commands, GlobalArgs, OutputFormat};
pub use errors::CliError;

use std::process::ExitCode;

/// Runs the parsed command line.
///
/// # Errors
///
/// Returns `CliError` when the client cannot be built or output cannot be written.
/// A failed query is not an error; it maps to [`ExitCode::FAILURE`].
pub async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let Cli { global, command } = cli;
    match command {
        Commands::Query { text, format } => commands::query(&global, &text, format).await,
        Commands::Repl { format } => commands::repl(&global, format).await,
        Commands::Schema => commands::schema(&global).await,
        Commands::Visualize { csv, text, out } => {
            commands::visualize(&global, &csv, &text, out.as_deref()).await
        }
    }
}
