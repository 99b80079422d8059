/// Core Module for litebase
///
/// Shared infrastructure: the error type and the database layer (dialect,
/// driver contract, SQLite adapter, caches and query log).

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{LitebaseError, Result};
