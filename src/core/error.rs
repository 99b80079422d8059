/// Litebase Error Module
///
/// This module defines the error types shared by the driver adapter, the
/// schema introspection helpers, the builder and the configuration layer.
use thiserror::Error;

/// Error type for every fallible operation in litebase.
///
/// The variants follow the driver's error taxonomy:
/// - configuration problems detected before any native call
/// - failures opening the native database handle
/// - statement execution and schema introspection failures
/// - transaction misuse
#[derive(Error, Debug)]
pub enum LitebaseError {
    /// Errors bubbling up from rusqlite outside of statement execution
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A statement failed to prepare or execute
    #[error("Query error: {0}")]
    Query(String),

    /// Invalid connection options or configuration files
    #[error("Configuration error: {0}")]
    Config(String),

    /// The native handle could not be opened or closed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema introspection queries failed
    #[error("Schema error: {0}")]
    Schema(String),

    /// Transaction primitives used out of order
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Type alias for Result to use LitebaseError as the error type.
pub type Result<T> = std::result::Result<T, LitebaseError>;
