//! Plain-text rendering for `--format table`.

use serde_json::Value;
use sqlrefine::prelude::{QueryResponse, Row, Schema, Trace};
use std::fmt::Write;

/// Renders rows as an aligned text table; columns follow the first row.
#[must_use]
pub fn render_table(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return "(no rows)".to_string();
    };
    let columns: Vec<&String> = first.keys().collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column.as_str()).map_or_else(String::new, cell_text))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<&str> = columns.iter().map(|c| c.as_str()).collect();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(
        &mut out,
        &rule.iter().map(String::as_str).collect::<Vec<_>>(),
        &widths,
    );
    for row in &cells {
        push_line(
            &mut out,
            &row.iter().map(String::as_str).collect::<Vec<_>>(),
            &widths,
        );
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    let _ = writeln!(out, "{}", line.trim_end());
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One line per event: time, state, message.
#[must_use]
pub fn render_trace(trace: &Trace) -> String {
    let mut out = String::new();
    for event in trace.iter() {
        let _ = writeln!(
            out,
            "{} {:<11} {}",
            event.timestamp.format("%H:%M:%S%.3f"),
            event.state.as_str(),
            event.message.as_deref().unwrap_or("")
        );
    }
    out.truncate(out.trim_end().len());
    out
}

/// Human-readable form of a query response.
#[must_use]
pub fn render_response(response: &QueryResponse) -> String {
    let mut out = String::new();
    if response.is_success() {
        let _ = writeln!(out, "SQL: {}\n", response.sql.as_deref().unwrap_or(""));
        let rows = response.result.as_deref().unwrap_or_default();
        let _ = writeln!(out, "{}\n", render_table(rows));
        let _ = writeln!(
            out,
            "{} row(s), {} attempt(s)",
            rows.len(),
            response.attempts
        );
    } else {
        let _ = writeln!(
            out,
            "Error: {}",
            response.message.as_deref().unwrap_or("unknown error")
        );
        if let Some(detail) = response
            .detail
            .as_deref()
            .filter(|d| Some(*d) != response.message.as_deref())
        {
            let _ = writeln!(out, "Last error: {detail}");
        }
        let _ = writeln!(out, "{} attempt(s)", response.attempts);
    }
    let _ = write!(out, "\nTrace:\n{}", render_trace(&response.states));
    out
}

/// One line per table.
#[must_use]
pub fn render_schema(schema: &Schema) -> String {
    if schema.is_empty() {
        "(no tables)".to_string()
    } else {
        schema.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlrefine::prelude::State;

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_table_alignment() {
        let rows = vec![
            row(json!({"id": 1, "name": "Ada", "team": null})),
            row(json!({"id": 42, "name": "Grace Hopper", "team": "navy"})),
        ];
        let table = render_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "id | name         | team");
        assert_eq!(lines[1], "-- | ------------ | ----");
        assert_eq!(lines[2], "1  | Ada          | NULL");
        assert_eq!(lines[3], "42 | Grace Hopper | navy");
    }

    #[test]
    fn test_empty_result() {
        assert_eq!(render_table(&[]), "(no rows)");
    }

    #[test]
    fn test_error_response_lists_trace() {
        let mut trace = Trace::new();
        trace.record(State::Start, None);
        trace.record(State::Error, Some("connection lost".to_string()));
        trace.record(State::Stop, Some("Process failed".to_string()));
        let response = QueryResponse {
            status: sqlrefine::prelude::ResponseStatus::Error,
            sql: None,
            result: None,
            message: Some("connection lost".to_string()),
            detail: Some("connection lost".to_string()),
            kind: Some("schema".to_string()),
            attempts: 0,
            states: trace,
        };

        let text = render_response(&response);
        assert!(text.starts_with("Error: connection lost"));
        assert!(text.contains("ERROR"));
        assert!(text.trim_end().ends_with("Process failed"));
    }

    #[test]
    fn test_schema_lines() {
        let schema = Schema::from_tables([("orders", ["id", "total"]), ("users", ["id", "name"])])
            .unwrap();
        assert_eq!(
            render_schema(&schema),
            "Table orders (id, total)\nTable users (id, name)"
        );
        assert_eq!(render_schema(&Schema::default()), "(no tables)");
    }

    #[test]
    fn test_exhausted_response_shows_last_error() {
        let mut trace = Trace::new();
        trace.record(State::Stop, Some("Process failed".to_string()));
        let response = QueryResponse {
            status: sqlrefine::prelude::ResponseStatus::Error,
            sql: None,
            result: None,
            message: Some("maximum refinement attempts reached".to_string()),
            detail: Some("Unknown column 'nme'".to_string()),
            kind: Some("exhausted_retries".to_string()),
            attempts: 3,
            states: trace,
        };

        let text = render_response(&response);
        assert!(text.contains("Last error: Unknown column 'nme'"));
        assert!(text.contains("3 attempt(s)"));
    }
}
