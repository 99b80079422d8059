/// Schema Introspection Module
///
/// Descriptors produced by the driver's introspection operations, and the
/// fixed table of result shapes used to read `PRAGMA TABLE_INFO` rows.

use crate::core::{LitebaseError, Result};
use crate::core::db::query::QueryResult;
use serde::Serialize;

/// A column of a table, as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldData {
    /// Column name
    pub name: String,
    /// Declared type (e.g., "INTEGER", "TEXT"); empty when undeclared
    #[serde(rename = "type")]
    pub type_name: String,
    /// SQLite does not report a length
    pub max_length: Option<u32>,
    /// Default value expression (if any)
    pub default: Option<String>,
    /// Whether this column is part of the primary key
    pub primary_key: bool,
    /// Whether the column allows NULL values
    pub nullable: bool,
}

/// An index and its participating columns in index order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexData {
    pub name: String,
    pub fields: Vec<String>,
}

/// One row of `PRAGMA foreign_key_list`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKeyData {
    /// Synthesized as `<from> to <table>.<to>`
    pub constraint_name: String,
    /// Table owning the foreign key
    pub table_name: String,
    pub column_name: String,
    /// Referenced table
    pub foreign_table_name: String,
    pub foreign_column_name: String,
    /// Position within a multi-column key
    pub sequence: i64,
}

impl ForeignKeyData {
    /// Builds the descriptor for a single `foreign_key_list` row.
    pub(crate) fn from_pragma_row(table: &str, result: &QueryResult, row: usize) -> Self {
        let from = result.text(row, "from").unwrap_or_default();
        let foreign_table = result.text(row, "table").unwrap_or_default();
        let to = result.text(row, "to").unwrap_or_default();

        ForeignKeyData {
            constraint_name: format!("{from} to {foreign_table}.{to}"),
            table_name: table.to_string(),
            column_name: from,
            foreign_table_name: foreign_table,
            foreign_column_name: to,
            sequence: result.integer(row, "seq").unwrap_or(0),
        }
    }
}

/// Column names of a backend's "describe table" result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInfoShape {
    pub name: &'static str,
    pub type_name: &'static str,
    pub default: &'static str,
    pub not_null: &'static str,
    pub primary_key: &'static str,
}

/// Known result shapes, keyed by driver name.
const TABLE_INFO_SHAPES: &[(&str, TableInfoShape)] = &[(
    "SQLite3",
    TableInfoShape {
        name: "name",
        type_name: "type",
        default: "dflt_value",
        not_null: "notnull",
        primary_key: "pk",
    },
)];

impl TableInfoShape {
    /// Looks up the shape for `driver`.
    pub fn for_driver(driver: &str) -> Result<Self> {
        TABLE_INFO_SHAPES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(driver))
            .map(|(_, shape)| *shape)
            .ok_or_else(|| {
                LitebaseError::Config(format!("No table info result shape known for driver '{driver}'"))
            })
    }

    /// Checks that a describe-table result carries the columns this shape reads.
    pub fn validate(&self, result: &QueryResult) -> Result<()> {
        for column in [self.name, self.type_name, self.default, self.not_null, self.primary_key] {
            if result.column_index(column).is_none() {
                return Err(LitebaseError::Schema(format!(
                    "Table info result is missing the '{column}' column"
                )));
            }
        }
        Ok(())
    }

    /// Column names in result order.
    pub fn column_names(&self, result: &QueryResult) -> Vec<String> {
        (0..result.row_count)
            .filter_map(|row| result.text(row, self.name))
            .collect()
    }

    /// Field descriptors in result order.
    pub fn field_data(&self, result: &QueryResult) -> Vec<FieldData> {
        (0..result.row_count)
            .map(|row| FieldData {
                name: result.text(row, self.name).unwrap_or_default(),
                type_name: result.text(row, self.type_name).unwrap_or_default(),
                max_length: None,
                default: result.text(row, self.default),
                primary_key: result.integer(row, self.primary_key).unwrap_or(0) != 0,
                nullable: result.integer(row, self.not_null).unwrap_or(0) == 0,
            })
            .collect()
    }
}
