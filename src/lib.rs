// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod builder;
pub mod config;
pub mod logging;
pub mod toolbar;

#[cfg(test)]
mod test_utils;

pub use crate::builder::Builder;
pub use crate::config::{Config, DatabaseConfig};
pub use crate::core::db::{Dialect, Driver, Outcome, SqliteConnection};
pub use crate::core::{LitebaseError, Result};
