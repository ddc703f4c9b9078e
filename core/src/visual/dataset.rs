//! Tabular datasets loaded from CSV and the per-user store that caches them.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors raised while loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The CSV could not be read or parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file could not be opened.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV has no header row.
    #[error("dataset has no columns")]
    NoColumns,
}

/// In-memory table of string cells with named columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Builds a dataset from headers and rows. Short rows are padded with empty cells.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::NoColumns`] when `columns` is empty.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, DatasetError> {
        if columns.is_empty() {
            return Err(DatasetError::NoColumns);
        }
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Ok(Self { columns, rows })
    }

    /// Reads a CSV with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV is malformed or has no header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(ToString::to_string)
            .collect();
        if columns.iter().all(String::is_empty) {
            return Err(DatasetError::NoColumns);
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            rows.push(record?.iter().map(ToString::to_string).collect());
        }

        Self::new(columns, rows)
    }

    /// Reads CSV bytes (for example an upload body).
    ///
    /// # Errors
    ///
    /// See [`Dataset::from_reader`].
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, DatasetError> {
        Self::from_reader(bytes)
    }

    /// Reads a CSV file.
    ///
    /// # Errors
    ///
    /// See [`Dataset::from_reader`]; also fails if the file cannot be opened.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Column names in file order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when there are no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `column`.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Raw cells of `column`.
    #[must_use]
    pub fn column_values(&self, column: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Cells of `column` that parse as numbers; blanks and text are skipped.
    #[must_use]
    pub fn numeric_values(&self, column: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(column)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| parse_number(&row[idx]))
                .collect(),
        )
    }

    /// Rows where both columns hold numbers, as `(a, b)` pairs.
    #[must_use]
    pub fn numeric_pairs(&self, a: &str, b: &str) -> Option<Vec<(f64, f64)>> {
        let ia = self.column_index(a)?;
        let ib = self.column_index(b)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| Some((parse_number(&row[ia])?, parse_number(&row[ib])?)))
                .collect(),
        )
    }

    /// Columns whose non-blank cells all parse as numbers (and have at least one).
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| {
                let mut cells = self.rows.iter().map(|row| row[*idx].as_str());
                let mut seen = false;
                let all_numeric = cells.all(|cell| {
                    if cell.is_empty() {
                        return true;
                    }
                    seen = true;
                    parse_number(cell).is_some()
                });
                seen && all_numeric
            })
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Rows as JSON objects restricted to `columns`; numeric cells become numbers.
    #[must_use]
    pub fn records(&self, columns: &[String]) -> Vec<Value> {
        let indices: Vec<(usize, &String)> = columns
            .iter()
            .filter_map(|c| self.column_index(c).map(|idx| (idx, c)))
            .collect();

        self.rows
            .iter()
            .map(|row| {
                let mut record = Map::new();
                for (idx, name) in &indices {
                    record.insert((*name).clone(), cell_to_json(&row[*idx]));
                }
                Value::Object(record)
            })
            .collect()
    }
}

pub(crate) fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn cell_to_json(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    parse_number(cell)
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(cell.to_string()), Value::Number)
}

/// Per-user cache of uploaded datasets.
#[derive(Clone, Default)]
pub struct DatasetStore {
    datasets: Arc<Mutex<HashMap<String, Arc<Dataset>>>>,
}

impl DatasetStore {
    /// Returns a new, empty `DatasetStore`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `dataset` for `user_id`, returning the dataset it replaced.
    pub async fn insert(&self, user_id: impl Into<String>, dataset: Dataset) -> Option<Arc<Dataset>> {
        self.datasets
            .lock()
            .await
            .insert(user_id.into(), Arc::new(dataset))
    }

    /// Dataset uploaded by `user_id`.
    pub async fn get(&self, user_id: &str) -> Option<Arc<Dataset>> {
        self.datasets.lock().await.get(user_id).cloned()
    }

    /// Drops the dataset of `user_id`.
    pub async fn remove(&self, user_id: &str) -> Option<Arc<Dataset>> {
        self.datasets.lock().await.remove(user_id)
    }

    /// Users with a stored dataset, sorted.
    pub async fn user_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.datasets.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for DatasetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "category,sales,region\nbooks,10,north\ntoys,,south\nbooks,7.5,north\ngames,3,\n";

    #[test]
    fn test_from_csv_bytes() {
        let ds = Dataset::from_csv_bytes(CSV.as_bytes()).unwrap();
        assert_eq!(ds.columns(), &["category", "sales", "region"]);
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.numeric_values("sales").unwrap(), vec![10.0, 7.5, 3.0]);
        assert_eq!(ds.numeric_columns(), vec!["sales".to_string()]);
        assert!(ds.numeric_values("missing").is_none());
    }

    #[test]
    fn test_records_type_cells() {
        let ds = Dataset::from_csv_bytes(CSV.as_bytes()).unwrap();
        let records = ds.records(&["category".to_string(), "sales".to_string()]);
        assert_eq!(records[0], serde_json::json!({"category": "books", "sales": 10.0}));
        assert_eq!(records[1], serde_json::json!({"category": "toys", "sales": null}));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let ds = Dataset::from_csv_bytes(b"a,b\n1\n").unwrap();
        assert_eq!(ds.column_values("b").unwrap(), vec![""]);
    }

    #[test]
    fn test_empty_input_has_no_columns() {
        assert!(matches!(
            Dataset::from_csv_bytes(b""),
            Err(DatasetError::NoColumns)
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, CSV).unwrap();

        let ds = Dataset::from_path(&path).unwrap();
        assert_eq!(ds.len(), 4);
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let store = DatasetStore::new();
        let ds = Dataset::from_csv_bytes(CSV.as_bytes()).unwrap();

        assert!(store.insert("alice", ds.clone()).await.is_none());
        assert!(store.insert("alice", ds).await.is_some());
        assert_eq!(store.get("alice").await.unwrap().len(), 4);
        assert!(store.get("bob").await.is_none());
        assert_eq!(store.user_ids().await, vec!["alice".to_string()]);

        store.remove("alice").await;
        assert!(store.user_ids().await.is_empty());
    }
}
