/// Saved queries, kept for the debug toolbar.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// One statement issued through a connection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecord {
    pub sql: String,
    pub started_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
    pub success: bool,
    /// Rows changed by a write statement
    pub affected_rows: Option<u64>,
}

impl QueryRecord {
    /// Duration in fractional milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }

    /// Start time in fractional milliseconds since the Unix epoch.
    pub fn start_ms(&self) -> f64 {
        self.started_at.timestamp_micros() as f64 / 1000.0
    }
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// Ordered log of statements for one connection.
#[derive(Debug, Clone, Default)]
pub struct QueryLog {
    records: Vec<QueryRecord>,
}

impl QueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: QueryRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[QueryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of distinct statements, ignoring surrounding whitespace.
    pub fn unique_count(&self) -> usize {
        let mut seen: Vec<&str> = self.records.iter().map(|r| r.sql.trim()).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Total time spent in logged statements.
    pub fn total_duration(&self) -> Duration {
        self.records.iter().map(|r| r.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sql: &str, micros: u64) -> QueryRecord {
        QueryRecord {
            sql: sql.to_string(),
            started_at: Utc::now(),
            duration: Duration::from_micros(micros),
            success: true,
            affected_rows: None,
        }
    }

    #[test]
    fn test_log_counts() {
        let mut log = QueryLog::new();
        assert!(log.is_empty());

        log.push(record("SELECT 1", 1500));
        log.push(record(" SELECT 1 ", 500));
        log.push(record("SELECT 2", 1000));

        assert_eq!(log.len(), 3);
        assert_eq!(log.unique_count(), 2);
        assert_eq!(log.total_duration(), Duration::from_micros(3000));
        assert!((log.records()[0].duration_ms() - 1.5).abs() < f64::EPSILON);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_record_serializes_millis() {
        let json = serde_json::to_value(record("SELECT 1", 2000)).unwrap();
        assert_eq!(json["duration"], serde_json::json!(2.0));
        assert_eq!(json["sql"], serde_json::json!("SELECT 1"));
    }
}
