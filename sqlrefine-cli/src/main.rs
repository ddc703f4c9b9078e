//! The `sqlrefine` binary turns plain-language questions into MySQL queries.

use clap::Parser;
use sqlrefine_cli::logging::init_tracing;
use sqlrefine_cli::Cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.log_json);

    match sqlrefine_cli::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "sqlrefine failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
