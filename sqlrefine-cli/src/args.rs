use clap::{Args, Parser, Subcommand, ValueEnum};
use sqlrefine::config::{DEFAULT_MODEL, DEFAULT_PORT};
use sqlrefine::prelude::{ClientConfig, ConnectConfig, GeminiConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Ask a MySQL database questions in plain language.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connection, oracle and loop settings shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted before any subcommand.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Full `mysql://` URL (falls back to SQLREFINE_DATABASE_URL, then DATABASE_URL)
    ///
    /// Cannot be combined with --host, --port, --user or --database, and a
    /// password set alongside it is ignored. A URL taken from the environment
    /// is only used when --host is absent, and then the individual connection
    /// flags are ignored.
    #[arg(
        long,
        global = true,
        conflicts_with_all = ["host", "port", "user", "database"]
    )]
    pub database_url: Option<String>,

    /// Database host, used instead of a URL
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Database port
    #[arg(long, global = true, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Database user
    #[arg(long, global = true, default_value = "root")]
    pub user: String,

    /// Database password
    #[arg(long, global = true, env = "SQLREFINE_DATABASE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Default database
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Gemini API key (falls back to SQLREFINE_GEMINI_API_KEY, then GEMINI_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Gemini model
    #[arg(long, global = true, env = "SQLREFINE_GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Executions per query before giving up
    #[arg(long, global = true, env = "SQLREFINE_MAX_ATTEMPTS", default_value_t = 3)]
    pub max_attempts: usize,

    /// Per-call timeout for schema, oracle and database calls (0 disables)
    #[arg(long, global = true, env = "SQLREFINE_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

impl GlobalArgs {
    /// Per-call timeout; zero means none.
    #[must_use]
    pub const fn call_timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }

    /// Database settings from the flags.
    #[must_use]
    pub fn connect_config(&self) -> ConnectConfig {
        let mut config = self
            .database_url
            .clone()
            .map_or_else(ConnectConfig::default, ConnectConfig::from_url)
            .with_port(self.port)
            .with_credentials(self.user.clone(), self.password.clone());
        if let Some(host) = &self.host {
            config = config.with_host(host.clone());
        }
        if let Some(database) = &self.database {
            config = config.with_database(database.clone());
        }
        config
    }

    /// Gemini settings from the flags.
    #[must_use]
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig::default().with_model(self.model.clone())
    }

    /// The full client configuration.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new()
            .with_model(self.model.clone())
            .with_database(self.connect_config())
            .with_max_attempts(self.max_attempts)
            .with_call_timeout(self.call_timeout());
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        config
    }
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Runs one natural-language query
    Query {
        /// The question to answer
        text: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Reads queries from stdin until `exit`
    Repl {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Prints the database schema
    Schema,
    /// Picks and renders a chart for a CSV file
    Visualize {
        /// CSV file with a header row
        #[arg(long)]
        csv: PathBuf,

        /// What to chart
        text: String,

        /// Write the Vega-Lite spec here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The JSON response envelope.
    Json,
    /// A text table followed by the trace.
    Table,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_query_defaults() {
        let cli = Cli::try_parse_from(["sqlrefine", "query", "How many users?"]).unwrap();
        match cli.command {
            Commands::Query { text, format } => {
                assert_eq!(text, "How many users?");
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.global.port, 3306);
        assert_eq!(cli.global.call_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sqlrefine",
            "query",
            "--format",
            "table",
            "--host",
            "db.internal",
            "--database",
            "shop",
            "--max-attempts",
            "5",
            "--timeout-secs",
            "0",
            "List orders",
        ])
        .unwrap();

        let config = cli.global.client_config();
        assert_eq!(config.refinement.max_attempts, 5);
        assert_eq!(config.refinement.call_timeout, None);
        assert_eq!(config.database.host.as_deref(), Some("db.internal"));
        assert_eq!(config.database.database.as_deref(), Some("shop"));
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_visualize_args() {
        let cli = Cli::try_parse_from([
            "sqlrefine",
            "visualize",
            "--csv",
            "sales.csv",
            "--out",
            "chart.json",
            "Sales by region",
        ])
        .unwrap();
        match cli.command {
            Commands::Visualize { csv, text, out } => {
                assert_eq!(csv, PathBuf::from("sales.csv"));
                assert_eq!(text, "Sales by region");
                assert_eq!(out, Some(PathBuf::from("chart.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_database_url_rejects_connection_flags() {
        for extra in [
            ["--host", "db.internal"],
            ["--port", "3307"],
            ["--user", "app"],
            ["--database", "shop"],
        ] {
            let err = Cli::try_parse_from(
                ["sqlrefine", "--database-url", "mysql://app@localhost/shop"]
                    .into_iter()
                    .chain(extra)
                    .chain(["schema"]),
            )
            .unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        }
    }

    #[test]
    fn test_database_url_flag() {
        let cli = Cli::try_parse_from([
            "sqlrefine",
            "--database-url",
            "mysql://app@localhost/shop",
            "schema",
        ])
        .unwrap();
        let config = cli.global.connect_config();
        assert_eq!(config.url.as_deref(), Some("mysql://app@localhost/shop"));
        assert_eq!(config.user, "root");
    }
}
