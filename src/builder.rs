/// Query Builder Module
///
/// Compiles statements that act on a whole table and, given a live driver,
/// runs them.

use crate::core::db::{Dialect, Driver, Outcome};
use crate::core::Result;
use tracing::debug;

/// Builds statements against one table of a connection.
pub struct Builder<'c, D: ?Sized> {
    db: &'c mut D,
    table: String,
}

impl<'c, D: Dialect + ?Sized> Builder<'c, D> {
    /// Targets `table`; the connection's prefix is applied when compiling.
    pub fn new(db: &'c mut D, table: impl Into<String>) -> Self {
        Builder {
            db,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn protected_table(&self) -> String {
        self.db.protect_identifiers(&self.db.prefix_table(&self.table))
    }

    /// `DELETE FROM <table>`
    pub fn compile_empty_table(&self) -> String {
        self.db.empty_table_statement(&self.protected_table())
    }

    /// The dialect's truncate statement for the table.
    pub fn compile_truncate(&self) -> String {
        self.db.truncate_statement(&self.protected_table())
    }
}

impl<'c, D: Driver + ?Sized> Builder<'c, D> {
    /// Deletes every row of the table.
    pub fn empty_table(&mut self) -> Result<Outcome> {
        let sql = self.compile_empty_table();
        debug!(table = %self.table, "emptying table");
        self.db.execute(&sql)
    }

    /// Truncates the table.
    pub fn truncate(&mut self) -> Result<Outcome> {
        let sql = self.compile_truncate();
        debug!(table = %self.table, "truncating table");
        self.db.execute(&sql)
    }
}
