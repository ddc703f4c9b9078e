//! Prompt builders for the SQL oracle.

use crate::schema::Schema;

/// SQL dialect named in prompts when none is configured.
pub const DEFAULT_DIALECT: &str = "MySQL";

/// Build the prompt for the first SQL candidate.
///
/// Includes:
/// - The schema, one `Table name (columns)` line per table
/// - The natural-language request
/// - Dialect-specific instructions and a "SQL only" constraint
///
/// # Examples
///
/// ```
/// use sqlrefine_core::refinement::prompt::build_initial_prompt;
/// use sqlrefine_core::schema::Schema;
///
/// let schema = Schema::from_tables([("users", vec!["id", "name"])]).unwrap();
/// let prompt = build_initial_prompt("list all users", &schema, "MySQL");
/// assert!(prompt.contains("Table users (id, name)"));
/// assert!(prompt.contains("list all users"));
/// ```
#[must_use]
pub fn build_initial_prompt(query: &str, schema: &Schema, dialect: &str) -> String {
    let mut prompt = String::from("**Database Schema:**\n");
    prompt.push_str(&render_schema(schema));

    prompt.push_str("\n\n**Natural Language Query:**\n");
    prompt.push_str(query.trim());

    prompt.push_str("\n\nGenerate a ");
    prompt.push_str(dialect);
    prompt.push_str(" query that satisfies the request. Consider:\n");
    prompt.push_str("1. Table relationships\n");
    prompt.push_str("2. Appropriate JOINs\n");
    prompt.push_str("3. Correct column names\n");
    prompt.push_str("4. Proper aggregation if needed\n\n");
    prompt.push_str("Return ONLY the SQL query without any explanations or formatting.");

    prompt
}

/// Build the prompt asking the oracle to correct a failed statement.
///
/// Includes the exact execution error, the statement that produced it, and
/// the schema, followed by a "SQL only" constraint.
#[must_use]
pub fn build_refinement_prompt(
    prior_sql: &str,
    execution_error: &str,
    schema: &Schema,
    dialect: &str,
) -> String {
    let mut prompt = String::from("**Previous Error:**\n");
    prompt.push_str(execution_error.trim());

    prompt.push_str("\n\n**Current SQL:**\n");
    prompt.push_str(prior_sql.trim());

    prompt.push_str("\n\n**Database Schema:**\n");
    prompt.push_str(&render_schema(schema));

    prompt.push_str("\n\nGenerate a corrected ");
    prompt.push_str(dialect);
    prompt.push_str(" query addressing the error. Return ONLY the SQL.");

    prompt
}

fn render_schema(schema: &Schema) -> String {
    if schema.is_empty() {
        "(no tables)".to_string()
    } else {
        schema.to_string()
    }
}
