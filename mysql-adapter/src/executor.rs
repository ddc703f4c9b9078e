//! Statement execution and row conversion.
//!
//! Statements run through the text protocol, so every cell arrives as text
//! and is typed here from the column's declared type.

use serde_json::{Number, Value};
use sqlrefine_core::seams::Row;
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::{Column, Row as _, TypeInfo};

use crate::error::MySqlError;

/// Runs `sql` and converts every returned row.
///
/// Statements without a result set return no rows.
pub async fn execute(pool: &MySqlPool, sql: &str) -> Result<Vec<Row>, MySqlError> {
    let rows = sqlx::raw_sql(sql).fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_json).collect())
}

/// Converts one row into an ordered JSON map.
#[must_use]
pub fn row_to_json(row: &MySqlRow) -> Row {
    let mut out = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let raw = row
            .try_get_unchecked::<Option<Vec<u8>>, _>(idx)
            .ok()
            .flatten();
        let value = raw.map_or(Value::Null, |bytes| {
            cell_to_json(column.type_info().name(), &bytes)
        });
        out.insert(column.name().to_string(), value);
    }
    out
}

/// Types a text-protocol cell using its declared column type.
#[must_use]
pub fn cell_to_json(type_name: &str, bytes: &[u8]) -> Value {
    if is_binary(type_name) {
        return Value::String(String::from_utf8_lossy(bytes).into_owned());
    }
    let text = String::from_utf8_lossy(bytes);
    let text = text.as_ref();

    match type_name {
        "BOOLEAN" => match text {
            "0" => Value::Bool(false),
            "1" => Value::Bool(true),
            other => integer(other),
        },
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => integer(text),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => text
            .parse::<u64>()
            .map_or_else(|_| Value::String(text.to_string()), Value::from),
        "FLOAT" | "DOUBLE" => float(text),
        "DECIMAL" => decimal(text),
        "JSON" => serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())),
        _ => Value::String(text.to_string()),
    }
}

fn is_binary(type_name: &str) -> bool {
    matches!(
        type_name,
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
    )
}

fn integer(text: &str) -> Value {
    text.parse::<i64>()
        .map_or_else(|_| Value::String(text.to_string()), Value::from)
}

fn float(text: &str) -> Value {
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(text.to_string()), Value::Number)
}

/// DECIMAL becomes a number only when `f64` holds it exactly enough (15
/// significant digits); wider values stay strings.
fn decimal(text: &str) -> Value {
    let digits = text
        .trim_start_matches(['-', '+'])
        .trim_start_matches(['0', '.'])
        .chars()
        .filter(char::is_ascii_digit)
        .count();
    if digits > 15 {
        return Value::String(text.to_string());
    }
    float(text)
}
