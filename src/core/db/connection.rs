/// Connection Management Module
///
/// The SQLite3 adapter: owns one rusqlite handle and implements the `Driver`
/// contract over it, including transaction tracking, the metadata cache and
/// the saved-query log.

use crate::config::DatabaseConfig;
use crate::core::db::cache::MetadataCache;
use crate::core::db::dialect::Dialect;
use crate::core::db::driver::Driver;
use crate::core::db::log::{QueryLog, QueryRecord};
use crate::core::db::query::{
    is_write_type, touches_schema, DbError, Outcome, QueryResult, StatementType,
};
use crate::core::db::schema::{FieldData, ForeignKeyData, IndexData, TableInfoShape};
use crate::core::{LitebaseError, Result};
use chrono::Utc;
use indexmap::IndexMap;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};

const DISABLE_FOREIGN_KEY_CHECKS: &str = "PRAGMA foreign_keys = OFF";
const ENABLE_FOREIGN_KEY_CHECKS: &str = "PRAGMA foreign_keys = ON";

/// Represents database transaction states
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TransactionState {
    /// No active transaction (autocommit mode)
    #[default]
    Autocommit,
    /// Transaction in progress
    Transaction,
    /// A statement failed inside the open transaction
    Failed,
}

/// SQLite3 implementation of the driver contract.
#[derive(Debug)]
pub struct SqliteConnection {
    config: DatabaseConfig,
    /// Active native handle (None if closed)
    handle: Option<Connection>,
    shape: TableInfoShape,
    cache: MetadataCache,
    last_error: DbError,
    transaction_state: TransactionState,
    log: QueryLog,
}

impl SqliteConnection {
    /// Creates an unopened connection; the handle is opened on first use.
    ///
    /// Fails with `LitebaseError::Config` when the configured driver has no
    /// known result shape.
    pub fn new(config: DatabaseConfig) -> Result<Self> {
        let shape = TableInfoShape::for_driver(&config.db_driver)?;
        Ok(SqliteConnection {
            config,
            handle: None,
            shape,
            cache: MetadataCache::new(),
            last_error: DbError::none(),
            transaction_state: TransactionState::default(),
            log: QueryLog::new(),
        })
    }

    /// Creates a connection and opens its handle immediately.
    pub fn open(config: DatabaseConfig) -> Result<Self> {
        let mut connection = Self::new(config)?;
        connection.initialize()?;
        Ok(connection)
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Path handed to the native open call.
    pub fn database_path(&self) -> PathBuf {
        self.config.resolve_database_path()
    }

    pub fn transaction_state(&self) -> TransactionState {
        self.transaction_state
    }

    pub fn query_log(&self) -> &QueryLog {
        &self.log
    }

    pub fn clear_queries(&mut self) {
        self.log.clear();
    }

    /// Column names of `table`, cached for the connection's lifetime.
    pub fn get_field_names(&mut self, table: &str) -> Result<Vec<String>> {
        self.list_columns(table)
    }

    /// Foreign keys of every table in the catalog.
    pub fn foreign_key_data_all(&mut self) -> Result<Vec<ForeignKeyData>> {
        if !self.supports_foreign_keys()? {
            return Ok(Vec::new());
        }

        let mut data = Vec::new();
        for table in self.list_tables(false)? {
            data.extend(self.foreign_keys_of(&table)?);
        }
        Ok(data)
    }

    /// SQL listing user tables, optionally limited to the configured prefix.
    pub fn list_tables_sql(&self, prefix_limit: bool) -> String {
        let mut sql = String::from(
            r#"SELECT "NAME" FROM "SQLITE_MASTER" WHERE "TYPE" = 'table' AND "NAME" NOT LIKE 'sqlite!_%' ESCAPE '!'"#,
        );
        let prefix = self.db_prefix();
        if prefix_limit && !prefix.is_empty() {
            sql.push_str(&format!(
                " AND \"NAME\" LIKE '{}%' {}",
                self.escape_like_string(prefix),
                self.like_escape_clause()
            ));
        }
        sql
    }

    /// SQL describing the columns of `table`.
    pub fn list_columns_sql(&self, table: &str) -> String {
        format!(
            "PRAGMA TABLE_INFO({})",
            self.protect_identifiers(&self.prefix_table(table))
        )
    }

    /// Returns the open handle, connecting first if needed.
    fn connection(&mut self) -> Result<&Connection> {
        self.initialize()?;
        self.handle
            .as_ref()
            .ok_or_else(|| LitebaseError::Connection("SQLite3 connection is not open".to_string()))
    }

    /// Runs a statement that must produce a row set.
    fn select(&mut self, sql: &str) -> Result<QueryResult> {
        self.execute(sql)?
            .into_rows()
            .ok_or_else(|| LitebaseError::Query(format!("Statement returned no result set: {sql}")))
    }

    /// Runs `PRAGMA TABLE_INFO` and checks the result shape.
    fn table_info(&mut self, table: &str) -> Result<QueryResult> {
        let sql = self.list_columns_sql(table);
        let result = self
            .select(&sql)
            .map_err(|e| LitebaseError::Schema(format!("Unable to get field data for '{table}': {e}")))?;
        if result.row_count > 0 {
            self.shape.validate(&result)?;
        }
        Ok(result)
    }

    fn foreign_keys_of(&mut self, table: &str) -> Result<Vec<ForeignKeyData>> {
        let sql = format!("PRAGMA foreign_key_list({})", self.protect_identifiers(table));
        let result = self.select(&sql)?;
        Ok((0..result.row_count)
            .map(|row| ForeignKeyData::from_pragma_row(table, &result, row))
            .collect())
    }

    /// Keeps the transaction state in step with statements that ran.
    fn track_statement(&mut self, statement: StatementType) {
        match statement {
            StatementType::Begin => self.transaction_state = TransactionState::Transaction,
            StatementType::Commit | StatementType::Rollback => {
                self.transaction_state = TransactionState::Autocommit
            }
            _ => {}
        }
    }

    /// Follows SQLite when it ended or opened a transaction on its own,
    /// e.g. after `INSERT OR ROLLBACK` or a statement batch.
    fn sync_transaction_state(&mut self, autocommit: bool) {
        let expected = self.transaction_state == TransactionState::Autocommit;
        if autocommit == expected {
            return;
        }
        if autocommit {
            warn!(state = ?self.transaction_state, "SQLite ended the transaction");
            self.transaction_state = TransactionState::Autocommit;
        } else {
            self.transaction_state = TransactionState::Transaction;
        }
    }

    fn record(&mut self, record: QueryRecord) {
        if self.config.save_queries {
            self.log.push(record);
        }
    }
}

fn run_read(conn: &Connection, sql: &str) -> rusqlite::Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let column_count = stmt.column_count();

    let mut data = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            values.push(Value::from(row.get_ref(i)?));
        }
        data.push(values);
    }

    Ok(QueryResult::new(columns, data))
}

fn changes(conn: &Connection) -> rusqlite::Result<u64> {
    conn.query_row("SELECT changes()", [], |row| row.get::<_, i64>(0))
        .map(|count| count.max(0) as u64)
}

/// Interprets a pragma value: NULL, zero, empty text and "0" are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Integer(i) => *i != 0,
        Value::Real(f) => *f != 0.0,
        Value::Text(t) => !t.is_empty() && t != "0",
        Value::Blob(b) => !b.is_empty(),
    }
}

impl Dialect for SqliteConnection {
    fn escape_char(&self) -> char {
        '`'
    }

    fn db_prefix(&self) -> &str {
        &self.config.db_prefix
    }

    // SQLite has no TRUNCATE
    fn truncate_statement(&self, protected_table: &str) -> String {
        format!("DELETE FROM {protected_table}")
    }
}

impl Driver for SqliteConnection {
    fn driver_name(&self) -> &'static str {
        "SQLite3"
    }

    fn connect(&mut self, persistent: bool) -> Result<()> {
        if persistent && self.config.db_debug {
            return Err(LitebaseError::Config(
                "SQLite3 doesn't support persistent connections.".to_string(),
            ));
        }
        if persistent {
            warn!("SQLite3 doesn't support persistent connections; opening a regular one");
        }
        if self.handle.is_some() {
            self.close()?;
        }

        let path = self.config.resolve_database_path();
        let password = self.config.password().map(str::to_owned);
        info!(path = %path.display(), encrypted = password.is_some(), "opening SQLite3 database");

        let opened = match password {
            None => Connection::open(&path),
            Some(password) => Connection::open_with_flags(
                &path,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
            )
            .and_then(|conn| {
                conn.pragma_update(None, "key", &password)?;
                Ok(conn)
            }),
        };
        let conn = opened.map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to open SQLite3 database");
            self.last_error = DbError::from_rusqlite(&e);
            LitebaseError::Connection(format!("SQLite3 error: {e}"))
        })?;

        if self.config.foreign_keys {
            conn.execute_batch(ENABLE_FOREIGN_KEY_CHECKS)
                .map_err(|e| LitebaseError::Connection(format!("SQLite3 error: {e}")))?;
        }

        self.handle = Some(conn);
        self.last_error = DbError::none();
        self.transaction_state = TransactionState::Autocommit;
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        if self.handle.is_none() {
            self.connect(self.config.persistent)?;
        }
        Ok(())
    }

    fn reconnect(&mut self) -> Result<()> {
        if self.transaction_state != TransactionState::Autocommit {
            warn!("reconnecting with an open transaction; it will be lost");
        }
        self.close()?;
        self.initialize()
    }

    fn close(&mut self) -> Result<()> {
        let Some(conn) = self.handle.take() else {
            return Ok(());
        };
        debug!("closing SQLite3 connection");
        self.transaction_state = TransactionState::Autocommit;
        conn.close().map_err(|(_, e)| {
            self.last_error = DbError::from_rusqlite(&e);
            LitebaseError::Connection(format!("SQLite3 error: {e}"))
        })
    }

    fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    fn set_database(&mut self, _database: &str) -> bool {
        false
    }

    fn version(&self) -> String {
        self.cache
            .version_or_init(|| rusqlite::version().to_string())
            .to_string()
    }

    fn execute(&mut self, sql: &str) -> Result<Outcome> {
        let statement = StatementType::from_sql(sql);
        let write = is_write_type(sql);
        let started_at = Utc::now();
        let timer = Instant::now();

        let conn = self.connection()?;
        debug!(sql, write, "executing statement");
        let result = if write {
            conn.execute_batch(sql).map(|_| Outcome::Success)
        } else {
            run_read(conn, sql).map(Outcome::Rows)
        };
        let affected_rows = match (&result, write) {
            (Ok(_), true) => changes(conn).ok(),
            _ => None,
        };
        let autocommit = conn.is_autocommit();
        let duration = timer.elapsed();

        self.record(QueryRecord {
            sql: sql.to_string(),
            started_at,
            duration,
            success: result.is_ok(),
            affected_rows,
        });

        match result {
            Ok(outcome) => {
                self.last_error = DbError::none();
                self.track_statement(statement);
                self.sync_transaction_state(autocommit);
                if touches_schema(sql) {
                    self.cache.invalidate(None);
                }
                Ok(outcome)
            }
            Err(e) => {
                error!(sql, error = %e, "statement failed");
                self.last_error = DbError::from_rusqlite(&e);
                if self.transaction_state == TransactionState::Transaction {
                    self.transaction_state = TransactionState::Failed;
                }
                self.sync_transaction_state(autocommit);
                Err(LitebaseError::Query(e.to_string()))
            }
        }
    }

    fn affected_rows(&mut self) -> Result<u64> {
        let conn = self.connection()?;
        Ok(changes(conn)?)
    }

    fn error(&self) -> DbError {
        self.last_error.clone()
    }

    fn insert_id(&self) -> i64 {
        self.handle
            .as_ref()
            .map(Connection::last_insert_rowid)
            .unwrap_or(0)
    }

    fn begin_transaction(&mut self) -> Result<()> {
        if self.transaction_state != TransactionState::Autocommit {
            return Err(LitebaseError::Transaction(
                "Transaction already in progress".to_string(),
            ));
        }
        self.execute("BEGIN TRANSACTION").map(|_| ())
    }

    fn commit(&mut self) -> Result<()> {
        if self.transaction_state == TransactionState::Autocommit {
            return Err(LitebaseError::Transaction("No transaction in progress".to_string()));
        }
        self.execute("END TRANSACTION").map(|_| ())
    }

    fn rollback(&mut self) -> Result<()> {
        if self.transaction_state == TransactionState::Autocommit {
            return Err(LitebaseError::Transaction("No transaction in progress".to_string()));
        }
        // already rolled back by SQLite
        if self.handle.as_ref().map_or(true, Connection::is_autocommit) {
            self.transaction_state = TransactionState::Autocommit;
            return Ok(());
        }
        self.execute("ROLLBACK").map(|_| ())
    }

    fn supports_foreign_keys(&mut self) -> Result<bool> {
        let result = self.select("PRAGMA foreign_keys")?;
        Ok(result
            .rows
            .first()
            .and_then(|row| row.first())
            .map(is_truthy)
            .unwrap_or(false))
    }

    fn list_tables(&mut self, prefix_limit: bool) -> Result<Vec<String>> {
        let constrained = prefix_limit && !self.db_prefix().is_empty();
        if !constrained {
            if let Some(names) = self.cache.table_names() {
                return Ok(names.to_vec());
            }
        }

        let sql = self.list_tables_sql(prefix_limit);
        let result = self.select(&sql)?;
        let names: Vec<String> = result
            .rows
            .iter()
            .filter_map(|row| match row.first() {
                Some(Value::Text(name)) => Some(name.clone()),
                _ => None,
            })
            .collect();

        if !constrained {
            self.cache.set_table_names(names.clone());
        }
        Ok(names)
    }

    fn list_columns(&mut self, table: &str) -> Result<Vec<String>> {
        let key = self.prefix_table(table);
        if let Some(names) = self.cache.field_names(&key) {
            return Ok(names.to_vec());
        }

        let result = self.table_info(table)?;
        let names = self.shape.column_names(&result);
        self.cache.set_field_names(&key, names.clone());
        Ok(names)
    }

    fn field_data(&mut self, table: &str) -> Result<Vec<FieldData>> {
        let key = self.prefix_table(table);
        if let Some(fields) = self.cache.field_data(&key) {
            return Ok(fields.to_vec());
        }

        let result = self.table_info(table)?;
        if result.row_count == 0 {
            return Ok(Vec::new());
        }
        let fields = self.shape.field_data(&result);
        self.cache.set_field_data(&key, fields.clone());
        Ok(fields)
    }

    // Reads the catalog rather than PRAGMA index_list to keep definition order.
    fn index_data(&mut self, table: &str) -> Result<IndexMap<String, IndexData>> {
        let sql = format!(
            "SELECT name FROM sqlite_master WHERE type='index' AND tbl_name={}",
            self.escape_literal(&self.prefix_table(table).to_lowercase())
        );
        let indexes = self
            .select(&sql)
            .map_err(|e| LitebaseError::Schema(format!("Unable to get index data for '{table}': {e}")))?;

        let mut data = IndexMap::new();
        for row in 0..indexes.row_count {
            let Some(name) = indexes.text(row, "name") else {
                continue;
            };
            let sql = format!(
                "PRAGMA index_info({})",
                self.escape_literal(&name.to_lowercase())
            );
            let info = self
                .select(&sql)
                .map_err(|e| LitebaseError::Schema(format!("Unable to get index data for '{name}': {e}")))?;
            let fields = (0..info.row_count)
                .filter_map(|r| info.text(r, "name"))
                .collect();
            data.insert(name.clone(), IndexData { name, fields });
        }

        Ok(data)
    }

    // Scans the catalog and keeps the requested table; see foreign_key_data_all.
    fn foreign_key_data(&mut self, table: &str) -> Result<Vec<ForeignKeyData>> {
        if !self.supports_foreign_keys()? {
            return Ok(Vec::new());
        }

        let target = self.prefix_table(table);
        let mut data = Vec::new();
        for name in self.list_tables(false)? {
            if name.eq_ignore_ascii_case(&target) {
                data.extend(self.foreign_keys_of(&name)?);
            }
        }
        Ok(data)
    }

    fn disable_foreign_key_checks(&self) -> &'static str {
        DISABLE_FOREIGN_KEY_CHECKS
    }

    fn enable_foreign_key_checks(&self) -> &'static str {
        ENABLE_FOREIGN_KEY_CHECKS
    }

    fn queries(&self) -> &[QueryRecord] {
        self.log.records()
    }

    fn invalidate(&mut self, table: Option<&str>) {
        let key = table.map(|t| self.prefix_table(t));
        self.cache.invalidate(key.as_deref());
    }
}
