use async_trait::async_trait;
use serde_json::json;
use sqlrefine::prelude::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replies in order and remembers every prompt it was given.
struct QueueOracle {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl QueueOracle {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(ToString::to_string).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextOracle for QueueOracle {
    async fn complete(&self, prompt: &str) -> Result<String, String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| "oracle exhausted".to_string())
    }
}

/// Knows one table, `users`; anything else fails like MySQL would.
struct UsersOnly;

#[async_trait]
impl QueryExecutor for UsersOnly {
    async fn execute(&self, sql: &str) -> ExecutionOutcome {
        if sql.contains("FROM users") {
            let row = json!({"id": 1, "name": "Ada"}).as_object().unwrap().clone();
            ExecutionOutcome::success(vec![row])
        } else {
            ExecutionOutcome::failure(
                "MySQL Error: 1146 (42S02): Table 'shop.usr' doesn't exist",
            )
        }
    }
}

struct FixedSchema(Result<Schema, String>);

#[async_trait]
impl SchemaProvider for FixedSchema {
    async fn get_schema(&self) -> Result<Schema, String> {
        self.0.clone()
    }
}

fn users_schema() -> Schema {
    Schema::from_tables([("users", ["id", "name"])]).unwrap()
}

fn client_with(oracle: Arc<QueueOracle>, schema: Result<Schema, String>) -> Client {
    let oracle: Arc<dyn TextOracle> = oracle;
    let env = RunEnvironment::new(
        Arc::new(OracleSqlGenerator::new(Arc::clone(&oracle))),
        Arc::new(UsersOnly),
        Arc::new(FixedSchema(schema)),
    );
    Client::from_parts(env, oracle, RefinementConfig::default())
}

#[tokio::test]
async fn test_query_refines_after_execution_error() {
    let oracle = QueueOracle::new(&["```sql\nSELECT * FROM usr;\n```", "SELECT * FROM users;"]);
    let client = client_with(oracle.clone(), Ok(users_schema()));

    let response = client.query("List all users").await;

    assert!(response.is_success());
    assert_eq!(response.sql.as_deref(), Some("SELECT * FROM users;"));
    assert_eq!(response.attempts, 2);
    assert_eq!(response.result.as_ref().unwrap()[0]["name"], "Ada");

    let prompts = oracle.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("List all users"));
    assert!(prompts[0].contains("users"));
    assert!(prompts[1].contains("SELECT * FROM usr;"));
    assert!(prompts[1].contains("1146"));

    let value = serde_json::to_value(&response).unwrap();
    let states: Vec<&str> = value["states"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["state"].as_str().unwrap())
        .collect();
    assert_eq!(states.first(), Some(&"START"));
    assert_eq!(states.last(), Some(&"STOP"));
    assert!(states.contains(&"OBSERVATION"));
    for event in value["states"].as_array().unwrap() {
        let ts = event["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }
}

#[tokio::test]
async fn test_schema_failure_is_reported_not_raised() {
    let oracle = QueueOracle::new(&[]);
    let client = client_with(oracle.clone(), Err("connection lost".to_string()));

    let response = client.query("List all users").await;

    assert!(!response.is_success());
    assert_eq!(response.kind.as_deref(), Some("schema"));
    assert_eq!(response.attempts, 0);
    assert!(oracle.prompts().is_empty());

    let err = client.schema().await.unwrap_err();
    assert!(matches!(err, Error::Schema(ref m) if m == "connection lost"));
}

#[tokio::test]
async fn test_exhausted_budget_envelope() {
    let oracle = QueueOracle::new(&["SELECT * FROM usr;"; 3]);
    let client = client_with(oracle.clone(), Ok(users_schema()));

    let result = client.run_query_loop("List all users").await;
    let response = QueryResponse::from(&result);

    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(response.kind.as_deref(), Some("exhausted_retries"));
    assert_eq!(
        response.message.as_deref(),
        Some("maximum refinement attempts reached")
    );
    assert!(response.detail.as_deref().unwrap().contains("1146"));
    assert_eq!(response.attempts, 3);
    // No refinement after the last failed attempt.
    assert_eq!(oracle.prompts().len(), 3);
}

#[tokio::test]
async fn test_upload_then_visualize_for_user() {
    let oracle = QueueOracle::new(&[r#"{"visualization": "histogram", "columns": ["age"]}"#]);
    let client = client_with(oracle.clone(), Ok(users_schema()));

    let dataset = client
        .upload("user-7", b"name,age\nAda,36\nAlan,41\nGrace,85\n")
        .await
        .unwrap();
    assert_eq!(dataset.len(), 3);
    assert_eq!(client.datasets().user_ids().await, vec!["user-7".to_string()]);

    let result = client
        .visualize_for("user-7", "How are ages distributed?")
        .await
        .unwrap();
    assert!(result.is_success());

    let response = ChartResponse::from(&result);
    assert_eq!(response.visualization, Some(ChartKind::Histogram));
    assert_eq!(response.columns, vec!["age".to_string()]);
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["visualization"], "histogram");
    assert!(value["spec"]["$schema"].as_str().unwrap().contains("vega-lite"));

    assert!(oracle.prompts()[0].contains("age"));
}

#[tokio::test]
async fn test_visualize_for_unknown_user() {
    let client = client_with(QueueOracle::new(&[]), Ok(users_schema()));

    let err = client.visualize_for("nobody", "chart it").await.unwrap_err();
    assert!(matches!(err, Error::NoDataset(ref user) if user == "nobody"));
    assert_eq!(err.to_string(), "No data uploaded for user 'nobody'");
}

#[tokio::test]
async fn test_upload_rejects_headerless_csv() {
    let client = client_with(QueueOracle::new(&[]), Ok(users_schema()));

    let err = client.upload("user-1", b"").await.unwrap_err();
    assert!(matches!(err, Error::Dataset(DatasetError::NoColumns)));
    assert!(client.datasets().get("user-1").await.is_none());
}

#[test]
fn test_from_parts_has_no_connection() {
    let client = client_with(QueueOracle::new(&[]), Ok(users_schema()));
    assert!(client.connect_report().is_none());
    assert_eq!(client.refinement().max_attempts, 3);
}
