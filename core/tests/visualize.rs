use async_trait::async_trait;
use sqlrefine_core::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const SALES_CSV: &str = "\
Category,Sales,Profit
Books,120,30
Toys,80,12
Books,95,20
Games,60,-5
";

struct CountingOracle {
    reply: String,
    calls: AtomicUsize,
}

impl CountingOracle {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TextOracle for CountingOracle {
    async fn complete(&self, prompt: &str) -> Result<String, String> {
        assert!(prompt.contains("Category"));
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

#[tokio::test]
async fn test_uploaded_dataset_to_bar_chart() {
    let store = DatasetStore::new();
    store
        .insert("user-1", Dataset::from_csv_bytes(SALES_CSV.as_bytes()).unwrap())
        .await;

    let oracle = CountingOracle::new(
        "```json\n{ \"visualization\": \"bar chart\", \"columns\": [\"Category\", \"Sales\"] }\n```",
    );
    let visualizer = Visualizer::new(oracle.clone());

    let dataset = store.get("user-1").await.unwrap();
    let result = visualizer
        .visualize(&dataset, "Show me a bar chart of sales by category.")
        .await;

    match &result {
        VisualizationResult::Success { plan, spec, trace } => {
            assert_eq!(plan.visualization, ChartKind::BarChart);
            assert_eq!(spec["data"]["values"][0]["value"], "Books");
            assert_eq!(spec["data"]["values"][0]["count"], 2);
            assert_eq!(trace.last().unwrap().state, State::Stop);
        }
        VisualizationResult::Failure { error, .. } => panic!("unexpected failure: {error}"),
    }
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_schema_violation_is_returned_with_trace() {
    let dataset = Dataset::from_csv_bytes(SALES_CSV.as_bytes()).unwrap();
    let oracle = CountingOracle::new(r#"{"visualization": "histogram", "columns": "Sales"}"#);

    let result = Visualizer::new(oracle).visualize(&dataset, "distribution of sales").await;

    match result {
        VisualizationResult::Failure { error, trace } => {
            assert!(matches!(error, ChartError::SchemaViolation { .. }));
            assert_eq!(trace.count(State::Error), 1);
            assert_eq!(trace.count(State::Observation), 0);
            assert!(trace.is_closed());
        }
        VisualizationResult::Success { .. } => panic!("expected schema violation"),
    }
}

#[tokio::test]
async fn test_heatmap_over_numeric_columns() {
    let dataset = Dataset::from_csv_bytes(SALES_CSV.as_bytes()).unwrap();
    let oracle = CountingOracle::new(r#"{"visualization": "heatmap", "columns": []}"#);

    let result = Visualizer::new(oracle).visualize(&dataset, "correlations").await;

    let spec = result.spec().unwrap();
    assert_eq!(spec["layer"][0]["mark"], "rect");
    assert_eq!(spec["data"]["values"].as_array().unwrap().len(), 4);
}
