//! Schema introspection from `information_schema`.

use sqlrefine_core::schema::{Schema, SchemaError};
use sqlx::Row as _;
use sqlx::mysql::MySqlPool;

use crate::error::MySqlError;

/// Columns of every table in the current database, in table then ordinal order.
pub const SCHEMA_QUERY: &str = "SELECT TABLE_NAME, COLUMN_NAME \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() \
     ORDER BY TABLE_NAME, ORDINAL_POSITION";

/// Reads the schema of the connection's default database.
pub async fn introspect(pool: &MySqlPool) -> Result<Schema, MySqlError> {
    let rows = sqlx::raw_sql(SCHEMA_QUERY).fetch_all(pool).await?;

    // information_schema reports these as VARBINARY on some servers.
    let pairs = rows.iter().map(|row| {
        let text = |idx: usize| {
            row.try_get_unchecked::<Option<Vec<u8>>, _>(idx)
                .ok()
                .flatten()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default()
        };
        (text(0), text(1))
    });

    let schema = group_columns(pairs)?;
    tracing::debug!(tables = schema.len(), "introspected schema");
    Ok(schema)
}

/// Groups `(table, column)` pairs, already ordered by table, into a schema.
pub fn group_columns(
    pairs: impl IntoIterator<Item = (String, String)>,
) -> Result<Schema, SchemaError> {
    let mut schema = Schema::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for (table, column) in pairs {
        if let Some((name, columns)) = current.as_mut() {
            if *name == table {
                columns.push(column);
                continue;
            }
        }
        if let Some((name, columns)) = current.replace((table, vec![column])) {
            schema.insert_table(name, columns)?;
        }
    }
    if let Some((name, columns)) = current {
        schema.insert_table(name, columns)?;
    }
    Ok(schema)
}
