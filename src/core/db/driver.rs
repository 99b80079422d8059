/// Driver Contract Module
///
/// The normalized interface a query builder or result layer uses to talk to a
/// backend: lifecycle, execution, escaping, introspection and transactions.

use crate::core::db::dialect::Dialect;
use crate::core::db::log::QueryRecord;
use crate::core::db::query::{DbError, Outcome};
use crate::core::db::schema::{FieldData, ForeignKeyData, IndexData};
use crate::core::Result;
use indexmap::IndexMap;

/// A backend adapter.
///
/// Implementations own at most one native handle at a time and are not
/// meant to be shared between threads without external synchronization.
pub trait Driver: Dialect {
    /// Identifier of the backend, e.g. `"SQLite3"`.
    fn driver_name(&self) -> &'static str;

    /// Opens the native handle.
    fn connect(&mut self, persistent: bool) -> Result<()>;

    /// Connects if no handle is open.
    fn initialize(&mut self) -> Result<()>;

    /// Closes and reopens the handle. Open transactions are lost.
    fn reconnect(&mut self) -> Result<()>;

    /// Releases the handle; closing a closed connection is a no-op.
    fn close(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;

    /// Switches the active database; returns false when unsupported.
    fn set_database(&mut self, database: &str) -> bool;

    /// Version string of the backend library.
    fn version(&self) -> String;

    /// Runs one statement.
    fn execute(&mut self, sql: &str) -> Result<Outcome>;

    /// Rows changed by the most recent write statement.
    fn affected_rows(&mut self) -> Result<u64>;

    /// Last native error; code 0 means no error.
    fn error(&self) -> DbError;

    /// Row id generated by the most recent insert.
    fn insert_id(&self) -> i64;

    fn begin_transaction(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    /// True when the backend reports foreign key enforcement.
    fn supports_foreign_keys(&mut self) -> Result<bool>;

    /// User tables, optionally restricted to the configured prefix.
    fn list_tables(&mut self, prefix_limit: bool) -> Result<Vec<String>>;

    /// Column names of `table` in declaration order.
    fn list_columns(&mut self, table: &str) -> Result<Vec<String>>;

    fn field_data(&mut self, table: &str) -> Result<Vec<FieldData>>;

    /// Indexes of `table` keyed by name, in catalog order.
    fn index_data(&mut self, table: &str) -> Result<IndexMap<String, IndexData>>;

    fn foreign_key_data(&mut self, table: &str) -> Result<Vec<ForeignKeyData>>;

    /// Statement disabling referential integrity checks; not executed.
    fn disable_foreign_key_checks(&self) -> &'static str;

    /// Statement enabling referential integrity checks; not executed.
    fn enable_foreign_key_checks(&self) -> &'static str;

    /// Statements saved by this connection.
    fn queries(&self) -> &[QueryRecord];

    /// Drops cached schema metadata for `table`, or for every table.
    fn invalidate(&mut self, table: Option<&str>);

    fn table_exists(&mut self, table: &str) -> Result<bool> {
        let table = self.prefix_table(table);
        Ok(self
            .list_tables(false)?
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&table)))
    }

    fn field_exists(&mut self, field: &str, table: &str) -> Result<bool> {
        Ok(self
            .list_columns(table)?
            .iter()
            .any(|name| name.eq_ignore_ascii_case(field)))
    }
}
