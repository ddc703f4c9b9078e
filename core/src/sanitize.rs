//! Cleanup of raw oracle text before it is treated as SQL or JSON.

/// Language tags stripped together with an inline opening fence.
const FENCE_TAGS: [&str; 7] = ["sql", "mysql", "json", "sqlite", "postgres", "postgresql", "plsql"];

/// Removes Markdown code-fence markers and surrounding whitespace.
///
/// Whole fence lines (a line holding only "```" plus an optional language
/// tag such as `sql` or `json`) are dropped. Remaining "```" tokens are
/// removed in place, together with a known language tag right after them.
///
/// # Examples
///
/// ```
/// use sqlrefine_core::sanitize::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```sql\nSELECT 1;\n```"), "SELECT 1;");
/// assert_eq!(strip_code_fences("```SELECT 2;```"), "SELECT 2;");
/// assert_eq!(strip_code_fences("```sql SELECT 3;```"), "SELECT 3;");
/// ```
#[must_use]
pub fn strip_code_fences(raw: &str) -> String {
    let kept: Vec<&str> = raw.lines().filter(|line| !is_fence_line(line)).collect();
    strip_inline_fences(&kept.join("\n")).trim().to_string()
}

fn strip_inline_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        if FENCE_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(&rest[..tag_len])) {
            rest = &rest[tag_len..];
        }
    }
    out.push_str(rest);
    out
}

/// Sanitizes oracle output into a SQL statement. No syntactic validation happens.
#[must_use]
pub fn sanitize_sql(raw: &str) -> String {
    strip_code_fences(raw)
}

fn is_fence_line(line: &str) -> bool {
    line.trim()
        .strip_prefix("```")
        .is_some_and(|tag| tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_sql_fence() {
        assert_eq!(sanitize_sql("```sql\nSELECT 1;\n```"), "SELECT 1;");
    }

    #[test]
    fn test_plain_text_is_trimmed_only() {
        assert_eq!(sanitize_sql("  SELECT * FROM users;\n"), "SELECT * FROM users;");
    }

    #[test]
    fn test_keeps_multiline_statement() {
        let raw = "```mysql\nSELECT id,\n       name\nFROM users;\n```";
        assert_eq!(sanitize_sql(raw), "SELECT id,\n       name\nFROM users;");
    }

    #[test]
    fn test_inline_fences_removed() {
        assert_eq!(sanitize_sql("```SELECT 1;```"), "SELECT 1;");
    }

    #[test]
    fn test_inline_fence_with_language_tag() {
        assert_eq!(sanitize_sql("```sql SELECT * FROM users;```"), "SELECT * FROM users;");
        assert_eq!(sanitize_sql("```SQL\tSELECT 1;```"), "SELECT 1;");
        assert_eq!(strip_code_fences("```json {\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn test_statement_keyword_after_fence_is_kept() {
        assert_eq!(sanitize_sql("```SELECT sql FROM notes;```"), "SELECT sql FROM notes;");
    }

    #[test]
    fn test_only_fences_yields_empty() {
        assert_eq!(sanitize_sql("```\n```"), "");
    }

    #[test]
    fn test_json_fence() {
        assert_eq!(
            strip_code_fences("```json\n{\"a\": 1}\n```"),
            "{\"a\": 1}"
        );
    }
}
