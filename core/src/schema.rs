//! Immutable snapshot of a database's table and column layout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Violations of the schema invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A table was registered with an empty name.
    #[error("table name must not be empty")]
    EmptyTableName,

    /// A table was registered without any columns.
    #[error("table '{0}' has no columns")]
    NoColumns(String),

    /// A column name inside a table was empty.
    #[error("table '{0}' contains an empty column name")]
    EmptyColumnName(String),

    /// The same table name was registered twice.
    #[error("duplicate table '{0}'")]
    DuplicateTable(String),
}

/// Mapping from table name to its ordered column names.
///
/// Every table name is non-empty and every table has at least one column.
/// Tables iterate in name order; columns keep the order they were declared in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct Schema {
    tables: BTreeMap<String, Vec<String>>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema from `(table, columns)` pairs.
    ///
    /// # Errors
    ///
    /// Returns the first invariant violation encountered.
    pub fn from_tables<I, T, C, S>(tables: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (T, C)>,
        T: Into<String>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::new();
        for (table, columns) in tables {
            schema.insert_table(table, columns)?;
        }
        Ok(schema)
    }

    /// Adds a table with its ordered columns.
    ///
    /// # Errors
    ///
    /// Fails on an empty table name, an empty column list, an empty column
    /// name, or a table that is already present.
    pub fn insert_table<T, C, S>(&mut self, table: T, columns: C) -> Result<(), SchemaError>
    where
        T: Into<String>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = table.into();
        if table.trim().is_empty() {
            return Err(SchemaError::EmptyTableName);
        }
        if self.tables.contains_key(&table) {
            return Err(SchemaError::DuplicateTable(table));
        }

        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(SchemaError::NoColumns(table));
        }
        if columns.iter().any(|c| c.trim().is_empty()) {
            return Err(SchemaError::EmptyColumnName(table));
        }

        self.tables.insert(table, columns);
        Ok(())
    }

    /// Returns the columns of `table`, if present.
    #[must_use]
    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    /// Iterates tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.tables
            .iter()
            .map(|(name, columns)| (name.as_str(), columns.as_slice()))
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` when the database exposes no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for Schema {
    type Error = SchemaError;

    fn try_from(tables: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        Self::from_tables(tables)
    }
}

impl From<Schema> for BTreeMap<String, Vec<String>> {
    fn from(schema: Schema) -> Self {
        schema.tables
    }
}

/// Renders one line per table: `Table users (id, name)`.
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (table, columns)) in self.tables.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "Table {table} ({})", columns.join(", "))?;
        }
        Ok(())
    }
}
