use sqlrefine_core::schema::SchemaError;
use sqlx::mysql::MySqlDatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MySqlError {
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to connect: {}", describe(.0))]
    Connect(#[source] sqlx::Error),

    #[error("MySQL Error: {}", describe(.0))]
    Query(#[from] sqlx::Error),

    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Driver error text in the `1146 (42S02): Table 'shop.usrs' doesn't exist` form.
#[must_use]
pub fn describe(err: &sqlx::Error) -> String {
    match err
        .as_database_error()
        .and_then(|db| db.try_downcast_ref::<MySqlDatabaseError>())
    {
        Some(db) => match db.code() {
            Some(state) => format!("{} ({state}): {}", db.number(), db.message()),
            None => format!("{}: {}", db.number(), db.message()),
        },
        None => err.to_string(),
    }
}
