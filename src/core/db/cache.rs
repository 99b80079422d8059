/// Metadata Cache Module
///
/// Per-connection cache of values that are expensive to recompute: the
/// library version, the table list and per-table column metadata.

use crate::core::db::schema::FieldData;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use tracing::debug;

/// Lazily populated metadata for one connection.
#[derive(Debug, Default)]
pub struct MetadataCache {
    version: OnceCell<String>,
    table_names: Option<Vec<String>>,
    field_names: HashMap<String, Vec<String>>,
    field_data: HashMap<String, Vec<FieldData>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached version, computing it on first use.
    pub fn version_or_init(&self, init: impl FnOnce() -> String) -> &str {
        self.version.get_or_init(init)
    }

    pub fn table_names(&self) -> Option<&[String]> {
        self.table_names.as_deref()
    }

    pub fn set_table_names(&mut self, names: Vec<String>) {
        self.table_names = Some(names);
    }

    pub fn field_names(&self, table: &str) -> Option<&[String]> {
        self.field_names.get(table).map(Vec::as_slice)
    }

    pub fn set_field_names(&mut self, table: &str, names: Vec<String>) {
        self.field_names.insert(table.to_string(), names);
    }

    pub fn field_data(&self, table: &str) -> Option<&[FieldData]> {
        self.field_data.get(table).map(Vec::as_slice)
    }

    pub fn set_field_data(&mut self, table: &str, fields: Vec<FieldData>) {
        self.field_data.insert(table.to_string(), fields);
    }

    /// Drops cached schema metadata.
    ///
    /// With a table name only that table's column metadata is dropped; the
    /// table list is always dropped. The version is never invalidated.
    pub fn invalidate(&mut self, table: Option<&str>) {
        debug!(table = ?table, "invalidating metadata cache");
        self.table_names = None;
        match table {
            Some(table) => {
                self.field_names.remove(table);
                self.field_data.remove(table);
            }
            None => {
                self.field_names.clear();
                self.field_data.clear();
            }
        }
    }
}
