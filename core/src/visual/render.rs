//! Renders a [`ChartPlan`] over a [`Dataset`] as a Vega-Lite v5 spec.

use serde_json::{Value, json};
use std::collections::HashMap;

use super::chart::{ChartError, ChartKind, ChartPlan};
use super::dataset::Dataset;

/// Vega-Lite schema URL stamped on every spec.
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

const WIDTH: u32 = 480;
const HEIGHT: u32 = 360;

/// Renders `plan` to a Vega-Lite spec.
///
/// Value counts and correlations are computed here so the spec is
/// self-contained.
pub fn render_chart(plan: &ChartPlan, dataset: &Dataset) -> Result<Value, ChartError> {
    let columns = &plan.columns;
    let body = match plan.visualization {
        ChartKind::Histogram => {
            let column = first(columns, plan.visualization)?;
            require_numeric(dataset, column)?;
            json!({
                "data": {"values": dataset.records(std::slice::from_ref(column))},
                "mark": "bar",
                "encoding": {
                    "x": {"field": column, "type": "quantitative", "bin": {"maxbins": 30}},
                    "y": {"aggregate": "count", "type": "quantitative", "title": "Count"}
                }
            })
        }
        ChartKind::ScatterPlot => {
            let (x, y) = pair(columns, plan.visualization)?;
            require_numeric(dataset, x)?;
            require_numeric(dataset, y)?;
            json!({
                "data": {"values": dataset.records(&[x.clone(), y.clone()])},
                "mark": "point",
                "encoding": {
                    "x": {"field": x, "type": "quantitative"},
                    "y": {"field": y, "type": "quantitative"}
                }
            })
        }
        ChartKind::BoxPlot => {
            let column = first(columns, plan.visualization)?;
            require_numeric(dataset, column)?;
            json!({
                "data": {"values": dataset.records(std::slice::from_ref(column))},
                "mark": {"type": "boxplot", "extent": 1.5},
                "encoding": {
                    "x": {"field": column, "type": "quantitative"}
                }
            })
        }
        ChartKind::BarChart => {
            let column = first(columns, plan.visualization)?;
            json!({
                "data": {"values": value_counts(dataset, column)?},
                "mark": "bar",
                "encoding": {
                    "x": {"field": "value", "type": "nominal", "title": column, "sort": "-y"},
                    "y": {"field": "count", "type": "quantitative", "title": "Count"}
                }
            })
        }
        ChartKind::PieChart => {
            let column = first(columns, plan.visualization)?;
            json!({
                "data": {"values": value_counts(dataset, column)?},
                "mark": {"type": "arc", "tooltip": true},
                "encoding": {
                    "theta": {"field": "count", "type": "quantitative", "stack": "normalize"},
                    "color": {"field": "value", "type": "nominal", "title": column}
                }
            })
        }
        ChartKind::LineGraph => {
            first(columns, plan.visualization)?;
            for column in columns {
                require_numeric(dataset, column)?;
            }
            json!({
                "data": {"values": indexed_records(dataset, columns)},
                "transform": [{"fold": columns, "as": ["series", "value"]}],
                "mark": "line",
                "encoding": {
                    "x": {"field": "index", "type": "quantitative"},
                    "y": {"field": "value", "type": "quantitative"},
                    "color": {"field": "series", "type": "nominal"}
                }
            })
        }
        ChartKind::Heatmap => {
            let numeric = numeric_selection(plan, dataset)?;
            json!({
                "data": {"values": correlation_cells(dataset, &numeric)},
                "encoding": {
                    "x": {"field": "x", "type": "nominal", "sort": numeric, "title": null},
                    "y": {"field": "y", "type": "nominal", "sort": numeric, "title": null}
                },
                "layer": [
                    {
                        "mark": "rect",
                        "encoding": {
                            "color": {
                                "field": "correlation",
                                "type": "quantitative",
                                "scale": {"scheme": "redblue", "domain": [-1, 1], "reverse": true}
                            }
                        }
                    },
                    {
                        "mark": "text",
                        "encoding": {
                            "text": {"field": "correlation", "type": "quantitative", "format": ".2f"}
                        }
                    }
                ]
            })
        }
        ChartKind::PairPlot => {
            let numeric = numeric_selection(plan, dataset)?;
            return Ok(json!({
                "$schema": VEGA_LITE_SCHEMA,
                "title": plan.visualization.as_str(),
                "data": {"values": dataset.records(&numeric)},
                "repeat": {"row": numeric, "column": numeric},
                "spec": {
                    "width": 150,
                    "height": 150,
                    "mark": "point",
                    "encoding": {
                        "x": {"field": {"repeat": "column"}, "type": "quantitative"},
                        "y": {"field": {"repeat": "row"}, "type": "quantitative"}
                    }
                }
            }));
        }
    };

    let mut spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": plan.visualization.as_str(),
        "width": WIDTH,
        "height": HEIGHT,
    });
    if let (Some(target), Value::Object(fields)) = (spec.as_object_mut(), body) {
        target.extend(fields);
    }
    Ok(spec)
}

fn first(columns: &[String], kind: ChartKind) -> Result<&String, ChartError> {
    columns.first().ok_or(ChartError::MissingColumns {
        kind,
        required: 1,
        got: 0,
    })
}

fn pair(columns: &[String], kind: ChartKind) -> Result<(&String, &String), ChartError> {
    match columns {
        [x, y, ..] => Ok((x, y)),
        _ => Err(ChartError::MissingColumns {
            kind,
            required: 2,
            got: columns.len(),
        }),
    }
}

fn require_numeric(dataset: &Dataset, column: &str) -> Result<(), ChartError> {
    let values = dataset
        .numeric_values(column)
        .ok_or_else(|| ChartError::UnknownColumn(column.to_string()))?;
    if values.is_empty() {
        return Err(ChartError::NoNumericData(column.to_string()));
    }
    Ok(())
}

/// Planned columns if any were given, otherwise every numeric column.
fn numeric_selection(plan: &ChartPlan, dataset: &Dataset) -> Result<Vec<String>, ChartError> {
    if plan.columns.is_empty() {
        let numeric = dataset.numeric_columns();
        if numeric.is_empty() {
            return Err(ChartError::Render(
                "dataset has no numeric columns".to_string(),
            ));
        }
        return Ok(numeric);
    }
    for column in &plan.columns {
        require_numeric(dataset, column)?;
    }
    Ok(plan.columns.clone())
}

/// Counts of each distinct value, most frequent first; blanks are skipped.
fn value_counts(dataset: &Dataset, column: &str) -> Result<Vec<Value>, ChartError> {
    let values = dataset
        .column_values(column)
        .ok_or_else(|| ChartError::UnknownColumn(column.to_string()))?;

    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for value in values.into_iter().filter(|v| !v.is_empty()) {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }
    if order.is_empty() {
        return Err(ChartError::Render(format!("column '{column}' is empty")));
    }
    // Stable sort keeps first-seen order among ties.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));

    Ok(order
        .into_iter()
        .map(|value| json!({"value": value, "count": counts[value]}))
        .collect())
}

fn indexed_records(dataset: &Dataset, columns: &[String]) -> Vec<Value> {
    dataset
        .records(columns)
        .into_iter()
        .enumerate()
        .map(|(index, mut record)| {
            if let Some(fields) = record.as_object_mut() {
                fields.insert("index".to_string(), json!(index));
            }
            record
        })
        .collect()
}

fn correlation_cells(dataset: &Dataset, columns: &[String]) -> Vec<Value> {
    let mut cells = Vec::with_capacity(columns.len() * columns.len());
    for y in columns {
        for x in columns {
            let correlation = dataset
                .numeric_pairs(x, y)
                .and_then(|pairs| pearson(&pairs));
            cells.push(json!({"x": x, "y": y, "correlation": correlation}));
        }
    }
    cells
}

/// Pearson correlation; `None` with fewer than two points or zero variance.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_csv_bytes(
            b"category,sales,profit,note\nbooks,10,5,a\ntoys,20,10,b\nbooks,30,15,\ngames,40,20,c\n",
        )
        .unwrap()
    }

    fn plan(kind: ChartKind, columns: &[&str]) -> ChartPlan {
        ChartPlan {
            visualization: kind,
            columns: columns.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_histogram_spec() {
        let spec = render_chart(&plan(ChartKind::Histogram, &["sales"]), &dataset()).unwrap();
        assert_eq!(spec["$schema"], VEGA_LITE_SCHEMA);
        assert_eq!(spec["mark"], "bar");
        assert_eq!(spec["encoding"]["x"]["field"], "sales");
        assert_eq!(spec["data"]["values"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_bar_counts_sorted() {
        let spec = render_chart(&plan(ChartKind::BarChart, &["category"]), &dataset()).unwrap();
        let values = spec["data"]["values"].as_array().unwrap();
        assert_eq!(values[0], json!({"value": "books", "count": 2}));
        assert_eq!(values[1], json!({"value": "toys", "count": 1}));
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_pie_uses_arc() {
        let spec = render_chart(&plan(ChartKind::PieChart, &["category"]), &dataset()).unwrap();
        assert_eq!(spec["mark"]["type"], "arc");
    }

    #[test]
    fn test_scatter_rejects_text_column() {
        let err = render_chart(&plan(ChartKind::ScatterPlot, &["sales", "note"]), &dataset())
            .unwrap_err();
        assert_eq!(err, ChartError::NoNumericData("note".to_string()));
    }

    #[test]
    fn test_line_folds_columns() {
        let spec =
            render_chart(&plan(ChartKind::LineGraph, &["sales", "profit"]), &dataset()).unwrap();
        assert_eq!(spec["transform"][0]["fold"], json!(["sales", "profit"]));
        assert_eq!(spec["data"]["values"][3]["index"], 3);
    }

    #[test]
    fn test_heatmap_defaults_to_numeric_columns() {
        let spec = render_chart(&plan(ChartKind::Heatmap, &[]), &dataset()).unwrap();
        let cells = spec["data"]["values"].as_array().unwrap();
        assert_eq!(cells.len(), 4);
        let sales_profit = cells
            .iter()
            .find(|c| c["x"] == "sales" && c["y"] == "profit")
            .unwrap();
        let r = sales_profit["correlation"].as_f64().unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pair_plot_repeats() {
        let spec = render_chart(&plan(ChartKind::PairPlot, &[]), &dataset()).unwrap();
        assert_eq!(spec["repeat"]["row"], json!(["sales", "profit"]));
        assert_eq!(spec["spec"]["mark"], "point");
    }

    #[test]
    fn test_heatmap_without_numeric_data() {
        let ds = Dataset::from_csv_bytes(b"a,b\nx,y\n").unwrap();
        let err = render_chart(&plan(ChartKind::Heatmap, &[]), &ds).unwrap_err();
        assert!(matches!(err, ChartError::Render(_)));
    }

    #[test]
    fn test_pearson() {
        assert_eq!(pearson(&[(1.0, 2.0)]), None);
        assert_eq!(pearson(&[(1.0, 2.0), (1.0, 3.0)]), None);
        let r = pearson(&[(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]).unwrap();
        assert!((r + 1.0).abs() < 1e-9);
    }
}
