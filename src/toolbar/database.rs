/// Database Collector Module
///
/// Toolbar collector listing the statements a connection ran.

use crate::core::db::QueryLog;
use crate::toolbar::collector::{Collector, CollectorFlags, TimelineEntry};
use serde_json::{json, Value};
use std::collections::HashMap;

const DATABASE: CollectorFlags = CollectorFlags::new("Database")
    .with_timeline()
    .with_tab_content();

const ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><ellipse cx="12" cy="5" rx="8" ry="3"/><path d="M4 5v14c0 1.7 3.6 3 8 3s8-1.3 8-3V5"/></svg>"#;

/// Collector over the saved queries of one connection.
pub struct DatabaseCollector<'a> {
    log: &'a QueryLog,
}

impl<'a> DatabaseCollector<'a> {
    pub fn new(log: &'a QueryLog) -> Self {
        DatabaseCollector { log }
    }
}

impl Collector for DatabaseCollector<'_> {
    fn flags(&self) -> &CollectorFlags {
        &DATABASE
    }

    fn title_details(&self) -> String {
        let total = self.log.len();
        let unique = self.log.unique_count();
        format!(
            "({} total Quer{}, {} of them unique)",
            total,
            if total == 1 { "y" } else { "ies" },
            unique
        )
    }

    fn format_timeline_data(&self) -> Vec<TimelineEntry> {
        self.log
            .records()
            .iter()
            .map(|record| TimelineEntry {
                name: "Query".to_string(),
                component: "Database".to_string(),
                start: record.start_ms(),
                duration: record.duration_ms(),
            })
            .collect()
    }

    fn display(&self) -> Value {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for record in self.log.records() {
            *seen.entry(record.sql.trim()).or_default() += 1;
        }

        let queries: Vec<Value> = self
            .log
            .records()
            .iter()
            .map(|record| {
                json!({
                    "sql": record.sql,
                    "duration": format!("{:.2} ms", record.duration_ms()),
                    "success": record.success,
                    "affectedRows": record.affected_rows,
                    "duplicate": seen.get(record.sql.trim()).copied().unwrap_or(0) > 1,
                })
            })
            .collect();

        json!({ "queries": queries })
    }

    fn badge_value(&self) -> Option<Value> {
        Some(Value::from(self.log.len()))
    }

    fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    fn icon(&self) -> String {
        ICON.to_string()
    }
}
