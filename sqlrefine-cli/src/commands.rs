//! Subcommand handlers.

use crate::args::{GlobalArgs, OutputFormat};
use crate::errors::CliError;
use crate::render::{render_response, render_schema, render_trace};
use anyhow::Context;
use sqlrefine::prelude::*;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Prints a response in the requested format.
fn print_response(response: &QueryResponse, format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(response)?),
        OutputFormat::Table => println!("{}", render_response(response)),
    }
    Ok(())
}

/// `sqlrefine query`: one run, exit code 1 on failure.
pub async fn query(global: &GlobalArgs, text: &str, format: OutputFormat) -> Result<ExitCode, CliError> {
    let client = Client::connect(global.client_config()).await?;
    let response = client.query(text).await;
    client.close().await;

    print_response(&response, format)?;
    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// `sqlrefine repl`: one run per stdin line until `exit` or end of input.
pub async fn repl(global: &GlobalArgs, format: OutputFormat) -> Result<ExitCode, CliError> {
    let client = Client::connect(global.client_config()).await?;
    if let Some(report) = client.connect_report() {
        println!(
            "Connected to MySQL {} (database: {})",
            report.server_version,
            report.database.as_deref().unwrap_or("none")
        );
    }
    println!("Type a question, or `exit` to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("sqlrefine> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }

        let response = client.query(line).await;
        print_response(&response, format)?;
    }

    client.close().await;
    Ok(ExitCode::SUCCESS)
}

fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// `sqlrefine schema`.
pub async fn schema(global: &GlobalArgs) -> Result<ExitCode, CliError> {
    let client = Client::connect(global.client_config()).await?;
    let schema = client.schema().await;
    client.close().await;

    println!("{}", render_schema(&schema?));
    Ok(ExitCode::SUCCESS)
}

/// `sqlrefine visualize`: no database needed, only the oracle.
pub async fn visualize(
    global: &GlobalArgs,
    csv: &Path,
    text: &str,
    out: Option<&Path>,
) -> Result<ExitCode, CliError> {
    let dataset = Dataset::from_path(csv)
        .with_context(|| format!("Failed to load CSV from {}", csv.display()))?;
    tracing::info!(
        path = %csv.display(),
        rows = dataset.len(),
        columns = dataset.columns().len(),
        "dataset loaded"
    );

    let oracle = GeminiOracle::discover(global.api_key.clone(), global.gemini_config())?;
    let result = Visualizer::new(oracle)
        .with_call_timeout(global.call_timeout())
        .visualize(&dataset, text)
        .await;

    match &result {
        VisualizationResult::Success { spec, .. } => {
            let body = serde_json::to_string_pretty(spec)?;
            match out {
                Some(path) => {
                    std::fs::write(path, format!("{body}\n"))
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("Wrote Vega-Lite spec to {}", path.display());
                }
                None => println!("{body}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        VisualizationResult::Failure { error, trace } => {
            eprintln!("Error: {error}\n\nTrace:\n{}", render_trace(trace));
            Ok(ExitCode::FAILURE)
        }
    }
}
