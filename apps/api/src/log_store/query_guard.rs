//! Read-only statement guard for `LogStore::query`.
//!
//! This is a coarse lexical filter. The PostgreSQL store additionally runs the
//! statement inside a `READ ONLY` transaction, which is the real enforcement.

use super::LogStoreError;

const FORBIDDEN_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "drop", "alter", "create", "truncate", "grant", "revoke",
    "copy", "merge", "call", "vacuum", "lock",
];

/// Returns the statement with surrounding whitespace and a single trailing
/// semicolon removed, or `ReadOnlyViolation`.
pub fn validate_read_only(statement: &str) -> Result<&str, LogStoreError> {
    let trimmed = statement.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();

    if trimmed.is_empty() {
        return Err(LogStoreError::ReadOnlyViolation(
            "statement is empty".to_string(),
        ));
    }
    if trimmed.contains(';') {
        return Err(LogStoreError::ReadOnlyViolation(
            "multiple statements are not allowed".to_string(),
        ));
    }

    let lowered = trimmed.to_ascii_lowercase();
    let mut words = lowered
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty());

    let first_word = words.next().unwrap_or_default();
    if first_word != "select" && first_word != "with" {
        return Err(LogStoreError::ReadOnlyViolation(format!(
            "statement must start with SELECT or WITH, found '{first_word}'"
        )));
    }

    if let Some(keyword) = words.find(|w| FORBIDDEN_KEYWORDS.contains(w))
    {
        return Err(LogStoreError::ReadOnlyViolation(format!(
            "statement contains forbidden keyword '{keyword}'"
        )));
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_select() {
        let sql = "  SELECT * FROM interview_logs WHERE score > 5;  ";
        assert_eq!(
            validate_read_only(sql).unwrap(),
            "SELECT * FROM interview_logs WHERE score > 5"
        );
    }

    #[test]
    fn test_accepts_common_table_expressions() {
        let sql = "WITH s AS (SELECT session_id, AVG(score) a FROM interview_logs GROUP BY 1) SELECT * FROM s";
        assert!(validate_read_only(sql).is_ok());
    }

    #[test]
    fn test_rejects_mutating_statements() {
        for sql in [
            "DELETE FROM interview_logs",
            "update candidates set name = 'x'",
            "DROP TABLE candidates",
            "INSERT INTO interview_logs VALUES (1)",
        ] {
            assert!(
                matches!(
                    validate_read_only(sql),
                    Err(LogStoreError::ReadOnlyViolation(_))
                ),
                "{sql} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_stacked_statements() {
        let sql = "SELECT 1; DROP TABLE candidates";
        assert!(validate_read_only(sql).is_err());
    }

    #[test]
    fn test_rejects_writes_hidden_in_cte() {
        let sql = "WITH gone AS (DELETE FROM interview_logs RETURNING *) SELECT * FROM gone";
        assert!(validate_read_only(sql).is_err());
    }

    #[test]
    fn test_column_names_containing_keywords_are_allowed() {
        let sql = "SELECT created_at, updated_at FROM interview_sessions";
        assert!(validate_read_only(sql).is_ok());
    }

    #[test]
    fn test_accepts_select_without_whitespace_after_keyword() {
        assert!(validate_read_only("SELECT(1)").is_ok());
        assert!(validate_read_only("select*from interview_logs").is_ok());
    }

    #[test]
    fn test_rejects_empty_statement() {
        assert!(validate_read_only("   ;").is_err());
    }
}
