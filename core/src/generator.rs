//! [`SqlGenerator`] backed by any [`TextOracle`].

use async_trait::async_trait;

use crate::oracle::TextOracle;
use crate::refinement::prompt::{build_initial_prompt, build_refinement_prompt, DEFAULT_DIALECT};
use crate::schema::Schema;
use crate::seams::SqlGenerator;

/// Builds SQL prompts and forwards them to an oracle.
///
/// The raw completion is returned untouched; the controller sanitizes it.
#[derive(Debug, Clone)]
pub struct OracleSqlGenerator<O> {
    oracle: O,
    dialect: String,
}

impl<O: TextOracle> OracleSqlGenerator<O> {
    /// Wraps `oracle`, prompting for MySQL.
    #[must_use]
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            dialect: DEFAULT_DIALECT.to_string(),
        }
    }

    /// Sets the SQL dialect named in prompts.
    #[must_use]
    pub fn dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    /// The wrapped oracle.
    #[must_use]
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }
}

#[async_trait]
impl<O: TextOracle> SqlGenerator for OracleSqlGenerator<O> {
    async fn generate_initial(&self, query: &str, schema: &Schema) -> Result<String, String> {
        let prompt = build_initial_prompt(query, schema, &self.dialect);
        tracing::debug!(prompt = %prompt, "requesting initial SQL");
        self.oracle.complete(&prompt).await
    }

    async fn refine(
        &self,
        prior_sql: &str,
        execution_error: &str,
        schema: &Schema,
    ) -> Result<String, String> {
        let prompt = build_refinement_prompt(prior_sql, execution_error, schema, &self.dialect);
        tracing::debug!(prompt = %prompt, "requesting refined SQL");
        self.oracle.complete(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOracle {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextOracle for RecordingOracle {
        async fn complete(&self, prompt: &str) -> Result<String, String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("```sql\nSELECT 1;\n```".to_string())
        }
    }

    #[tokio::test]
    async fn test_prompts_reach_oracle() {
        let generator = OracleSqlGenerator::new(RecordingOracle::default()).dialect("SQLite");
        let schema = Schema::from_tables([("users", vec!["id", "name"])]).unwrap();

        let raw = generator.generate_initial("list users", &schema).await.unwrap();
        assert_eq!(raw, "```sql\nSELECT 1;\n```");

        generator
            .refine("SELECT * FROM usrs", "no such table: usrs", &schema)
            .await
            .unwrap();

        let prompts = generator.oracle().prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("Generate a SQLite query"));
        assert!(prompts[0].contains("list users"));
        assert!(prompts[1].contains("no such table: usrs"));
        assert!(prompts[1].contains("SELECT * FROM usrs"));
    }
}
