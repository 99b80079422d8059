/// Query Execution Module
///
/// Statement classification and the result types returned by `Driver::execute`.

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::{Value, ValueRef};
use serde::Serialize;

/// Statements routed through the exec path rather than the query path.
static WRITE_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^\s*"?(SET|INSERT|UPDATE|DELETE|REPLACE|CREATE|DROP|TRUNCATE|LOAD|COPY|ALTER|RENAME|GRANT|REVOKE|LOCK|UNLOCK|REINDEX)\s"#,
    )
    .expect("write-type pattern is valid")
});

/// Returns true when `sql` modifies data or schema.
///
/// Write statements run through the exec path and report affected rows;
/// everything else returns a row set.
pub fn is_write_type(sql: &str) -> bool {
    WRITE_TYPE.is_match(sql)
}

/// Rows returned by a read statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of raw SQLite values
    pub rows: Vec<Vec<Value>>,
    /// Number of rows returned
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let row_count = rows.len();
        QueryResult {
            columns,
            rows,
            row_count,
        }
    }

    /// Position of a column, compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    /// Value of `column` in row `row`.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Value of `column` in row `row` rendered as text; NULL yields `None`.
    pub fn text(&self, row: usize, column: &str) -> Option<String> {
        match self.value(row, column)? {
            Value::Null => None,
            Value::Text(t) => Some(t.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Real(f) => Some(f.to_string()),
            Value::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
        }
    }

    /// Value of `column` in row `row` as an integer; NULL and text yield `None`.
    pub fn integer(&self, row: usize, column: &str) -> Option<i64> {
        match self.value(row, column)? {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_json(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(value_to_json))
                    .collect()
            })
            .collect()
    }
}

/// Outcome of a successfully executed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A write statement completed; see `Driver::affected_rows`
    Success,
    /// A read statement produced rows
    Rows(QueryResult),
}

impl Outcome {
    /// Returns the row set of a read statement.
    pub fn rows(&self) -> Option<&QueryResult> {
        match self {
            Outcome::Rows(result) => Some(result),
            Outcome::Success => None,
        }
    }

    /// Consumes the outcome, returning the row set of a read statement.
    pub fn into_rows(self) -> Option<QueryResult> {
        match self {
            Outcome::Rows(result) => Some(result),
            Outcome::Success => None,
        }
    }
}

/// SQLite's message for result code 0.
pub const NO_ERROR_MESSAGE: &str = "not an error";

/// Last error reported by the native library.
///
/// A `code` of `0` means "no error"; a non-zero code always carries a
/// non-empty message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbError {
    pub code: i32,
    pub message: String,
}

impl DbError {
    /// The "no error" value.
    pub fn none() -> Self {
        DbError {
            code: 0,
            message: NO_ERROR_MESSAGE.to_string(),
        }
    }

    /// Builds the error record for a failed rusqlite call.
    pub fn from_rusqlite(error: &rusqlite::Error) -> Self {
        let (code, message) = match error {
            rusqlite::Error::SqliteFailure(native, message) => (
                native.extended_code,
                message.clone().unwrap_or_else(|| native.to_string()),
            ),
            other => (rusqlite::ffi::SQLITE_ERROR, other.to_string()),
        };
        DbError {
            code: if code == 0 { rusqlite::ffi::SQLITE_ERROR } else { code },
            message: if message.is_empty() {
                "unknown error".to_string()
            } else {
                message
            },
        }
    }

    /// True when this is the "no error" value.
    pub fn is_none(&self) -> bool {
        self.code == 0
    }
}

impl Default for DbError {
    fn default() -> Self {
        DbError::none()
    }
}

/// Represents different SQL statement types for introspection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatementType {
    /// SELECT statement
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// REPLACE statement
    Replace,
    /// CREATE statement
    Create,
    /// DROP statement
    Drop,
    /// ALTER statement
    Alter,
    /// BEGIN transaction commands
    Begin,
    /// COMMIT/END transaction commands
    Commit,
    /// ROLLBACK transaction commands
    Rollback,
    /// PRAGMA statement
    Pragma,
    /// Other statement types
    Other,
}

impl StatementType {
    /// Determines the statement type from a SQL string
    pub fn from_sql(sql: &str) -> Self {
        let sql_upper = sql
            .trim()
            .trim_start_matches('"')
            .trim_end_matches(';')
            .trim_end()
            .to_uppercase();

        if sql_upper.starts_with("SELECT") || sql_upper.starts_with("WITH") {
            StatementType::Select
        } else if sql_upper.starts_with("INSERT") {
            StatementType::Insert
        } else if sql_upper.starts_with("UPDATE") {
            StatementType::Update
        } else if sql_upper.starts_with("DELETE") {
            StatementType::Delete
        } else if sql_upper.starts_with("REPLACE") {
            StatementType::Replace
        } else if sql_upper.starts_with("CREATE") {
            StatementType::Create
        } else if sql_upper.starts_with("DROP") {
            StatementType::Drop
        } else if sql_upper.starts_with("ALTER") {
            StatementType::Alter
        } else if sql_upper.starts_with("PRAGMA") {
            StatementType::Pragma
        } else if sql_upper == "BEGIN" || sql_upper.starts_with("BEGIN ") {
            StatementType::Begin
        } else if sql_upper == "COMMIT"
            || sql_upper == "END"
            || sql_upper.starts_with("COMMIT ")
            || sql_upper.starts_with("END TRANSACTION")
        {
            StatementType::Commit
        } else if sql_upper == "ROLLBACK" || sql_upper == "ROLLBACK TRANSACTION" {
            StatementType::Rollback
        } else {
            StatementType::Other
        }
    }

    /// True for statements that change the schema.
    pub fn is_ddl(&self) -> bool {
        matches!(
            self,
            StatementType::Create | StatementType::Drop | StatementType::Alter
        )
    }
}

/// Returns true when any statement of `sql` changes the schema.
///
/// Splits naively on `;`, so a semicolon inside a literal can only cause a
/// spurious match.
pub fn touches_schema(sql: &str) -> bool {
    sql.split(';')
        .any(|statement| StatementType::from_sql(statement).is_ddl())
}

/// Formats a SQLite value for display
pub fn format_value(value: ValueRef) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}

/// Converts a SQLite value to JSON; blobs use their display form.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Value::from(*f),
        Value::Text(t) => serde_json::Value::from(t.as_str()),
        Value::Blob(_) => serde_json::Value::from(format_value(ValueRef::from(value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_type_detection() {
        assert!(is_write_type("INSERT INTO users VALUES (1)"));
        assert!(is_write_type("  update users SET name = 'x'"));
        assert!(is_write_type("DELETE FROM \"jobs\""));
        assert!(is_write_type("\"CREATE TABLE t (id INTEGER)"));
        assert!(is_write_type("DROP TABLE t"));
        assert!(is_write_type("REPLACE INTO t VALUES (1)"));
        assert!(is_write_type("TRUNCATE \"user\""));
        assert!(!is_write_type("SELECT * FROM users"));
        assert!(!is_write_type("PRAGMA foreign_keys"));
        assert!(!is_write_type("BEGIN TRANSACTION"));
        // keyword must be followed by whitespace
        assert!(!is_write_type("DELETE"));
        assert!(!is_write_type("INSERTED"));
    }

    #[test]
    fn test_statement_type_classification() {
        assert_eq!(StatementType::from_sql("SELECT * FROM users"), StatementType::Select);
        assert_eq!(StatementType::from_sql("INSERT INTO users VALUES (1, 'test')"), StatementType::Insert);
        assert_eq!(StatementType::from_sql("UPDATE users SET name = 'new'"), StatementType::Update);
        assert_eq!(StatementType::from_sql("DELETE FROM users WHERE id = 1"), StatementType::Delete);
        assert_eq!(StatementType::from_sql("CREATE TABLE test (id INTEGER)"), StatementType::Create);
        assert_eq!(StatementType::from_sql("DROP TABLE test"), StatementType::Drop);
        assert_eq!(StatementType::from_sql("BEGIN"), StatementType::Begin);
        assert_eq!(StatementType::from_sql("BEGIN TRANSACTION"), StatementType::Begin);
        assert_eq!(StatementType::from_sql("COMMIT"), StatementType::Commit);
        assert_eq!(StatementType::from_sql("END TRANSACTION;"), StatementType::Commit);
        assert_eq!(StatementType::from_sql("ROLLBACK"), StatementType::Rollback);
        assert_eq!(StatementType::from_sql("PRAGMA foreign_keys = ON"), StatementType::Pragma);
        assert_eq!(StatementType::from_sql("VACUUM"), StatementType::Other);
        assert!(StatementType::from_sql("alter table t add column c").is_ddl());
        assert!(!StatementType::from_sql("SELECT 1").is_ddl());
        assert_eq!(StatementType::from_sql("\"CREATE TABLE t (id INTEGER)"), StatementType::Create);
    }

    #[test]
    fn test_touches_schema_checks_every_statement() {
        assert!(touches_schema("CREATE TABLE t (id INTEGER)"));
        assert!(touches_schema("\"DROP TABLE t"));
        assert!(touches_schema("INSERT INTO t VALUES (1); CREATE TABLE x (id INTEGER)"));
        assert!(touches_schema("  alter table t add column c;"));
        assert!(!touches_schema("INSERT INTO t VALUES (1); UPDATE t SET id = 2"));
        assert!(!touches_schema("SELECT 1"));
    }

    #[test]
    fn test_result_accessors() {
        let result = QueryResult::new(
            vec!["cid".into(), "name".into(), "dflt_value".into()],
            vec![vec![
                Value::Integer(0),
                Value::Text("id".into()),
                Value::Null,
            ]],
        );
        assert_eq!(result.row_count, 1);
        assert_eq!(result.column_index("NAME"), Some(1));
        assert_eq!(result.text(0, "name").as_deref(), Some("id"));
        assert_eq!(result.text(0, "dflt_value"), None);
        assert_eq!(result.integer(0, "cid"), Some(0));
        assert_eq!(result.value(1, "cid"), None);

        let json = result.to_json();
        assert_eq!(json[0]["name"], serde_json::json!("id"));
        assert!(json[0]["dflt_value"].is_null());
    }

    #[test]
    fn test_db_error_codes() {
        assert!(DbError::none().is_none());
        assert_eq!(DbError::none().message, "not an error");

        let failure = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some("no such table: missing".to_string()),
        );
        let err = DbError::from_rusqlite(&failure);
        assert_ne!(err.code, 0);
        assert_eq!(err.message, "no such table: missing");

        let other = DbError::from_rusqlite(&rusqlite::Error::QueryReturnedNoRows);
        assert_ne!(other.code, 0);
        assert!(!other.message.is_empty());
    }

    #[test]
    fn test_blob_formatting() {
        let blob = Value::Blob(b"Hello".to_vec());
        assert_eq!(value_to_json(&blob), serde_json::json!("<BLOB: 5 bytes>"));
    }
}
