use thiserror::Error;

/// Errors surfaced by the `sqlrefine` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error from the client (configuration, connection, datasets).
    #[error(transparent)]
    Client(#[from] sqlrefine::errors::Error),

    /// Serializing output failed.
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading stdin or writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything carrying its own context.
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}
