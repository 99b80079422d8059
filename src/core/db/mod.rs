/// Database Module
///
/// The database layer is split into focused submodules:
/// - **Dialect** (`dialect.rs`): identifier quoting, string escaping and table prefixing
/// - **Driver** (`driver.rs`): the normalized contract every backend adapter implements
/// - **Connection** (`connection.rs`): the SQLite3 adapter over rusqlite
/// - **Schema** (`schema.rs`): field, index and foreign key descriptors
/// - **Query** (`query.rs`): statement classification and result types
/// - **Cache** (`cache.rs`): per-connection metadata cache
/// - **Log** (`log.rs`): saved queries consumed by the debug toolbar
///
/// ## Error Handling
///
/// All database operations use `LitebaseError` for consistent error propagation.
pub mod cache;
pub mod connection;
pub mod dialect;
pub mod driver;
pub mod log;
pub mod query;
pub mod schema;

pub use cache::*;
pub use connection::*;
pub use dialect::*;
pub use driver::*;
pub use log::*;
pub use query::*;
pub use schema::*;
