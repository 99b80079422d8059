use crate::core::{LitebaseError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Database identifier that opens a private in-memory database.
pub const MEMORY_DATABASE: &str = ":memory:";

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: Option<LoggingConfig>,
}

/// Connection options.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// File path, bare filename (resolved against `writable_path`) or `:memory:`
    pub database: String,
    /// Encryption key; empty means none
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_driver")]
    pub db_driver: String,
    /// Strict-debug mode
    #[serde(default = "default_true")]
    pub db_debug: bool,
    #[serde(default)]
    pub db_prefix: String,
    #[serde(default)]
    pub persistent: bool,
    /// Issue `PRAGMA foreign_keys = ON` after opening
    #[serde(default)]
    pub foreign_keys: bool,
    /// Record statements for the debug toolbar
    #[serde(default = "default_true")]
    pub save_queries: bool,
    #[serde(default = "default_writable_path")]
    pub writable_path: PathBuf,
}

/// Logging options.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: Option<String>,
}

fn default_driver() -> String {
    "SQLite3".to_string()
}

fn default_true() -> bool {
    true
}

/// Writable storage root used for bare database filenames.
pub fn default_writable_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("litebase").join("writable"))
        .unwrap_or_else(|| PathBuf::from("writable"))
}

impl DatabaseConfig {
    /// Options for `database` with every other field defaulted.
    pub fn new(database: impl Into<String>) -> Self {
        DatabaseConfig {
            database: database.into(),
            password: String::new(),
            db_driver: default_driver(),
            db_debug: true,
            db_prefix: String::new(),
            persistent: false,
            foreign_keys: false,
            save_queries: true,
            writable_path: default_writable_path(),
        }
    }

    /// Options for a private in-memory database.
    pub fn memory() -> Self {
        Self::new(MEMORY_DATABASE)
    }

    /// Password to open the database with, if any.
    pub fn password(&self) -> Option<&str> {
        (!self.password.is_empty()).then_some(self.password.as_str())
    }

    pub fn is_memory(&self) -> bool {
        self.database == MEMORY_DATABASE
    }

    /// Path handed to the native open call.
    ///
    /// A bare filename (no path separator) is placed under `writable_path`;
    /// `:memory:` and anything containing a separator are used verbatim.
    pub fn resolve_database_path(&self) -> PathBuf {
        if self.is_memory() || self.database.contains(MAIN_SEPARATOR) {
            PathBuf::from(&self.database)
        } else {
            self.writable_path.join(&self.database)
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.database.database.trim().is_empty() {
            return Err(LitebaseError::Config("database must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Log filter from the `[logging]` table, if set.
    pub fn log_filter(&self) -> Option<&str> {
        self.logging.as_ref()?.filter.as_deref()
    }
}

/// Loads configuration from a TOML file at the given path.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Config::from_toml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
[database]
database = "app.db"
password = "secret"
db_debug = false
db_prefix = "ci_"
foreign_keys = true
writable_path = "/var/lib/app/writable"

[logging]
filter = "litebase=debug"
"#;

    #[test]
    fn test_load_config_from_str() {
        let config = Config::from_toml_str(SAMPLE_CONFIG).expect("Failed to parse sample config");
        let db = &config.database;
        assert_eq!(db.database, "app.db");
        assert_eq!(db.password(), Some("secret"));
        assert_eq!(db.db_driver, "SQLite3");
        assert!(!db.db_debug);
        assert_eq!(db.db_prefix, "ci_");
        assert!(!db.persistent);
        assert!(db.foreign_keys);
        assert!(db.save_queries);
        assert_eq!(config.log_filter(), Some("litebase=debug"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("[database]\ndatabase = \":memory:\"\n").unwrap();
        let db = config.database;
        assert!(db.is_memory());
        assert!(db.db_debug);
        assert_eq!(db.password(), None);
        assert!(config.logging.is_none());
    }

    #[test]
    fn test_empty_database_rejected() {
        let result = Config::from_toml_str("[database]\ndatabase = \"  \"\n");
        assert!(matches!(result, Err(LitebaseError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/litebase.toml");
        assert!(matches!(result, Err(LitebaseError::Io(_))));
    }

    #[test]
    fn test_resolve_database_path() {
        let mut db = DatabaseConfig::new("app.db");
        db.writable_path = PathBuf::from("/srv/writable");
        assert_eq!(db.resolve_database_path(), PathBuf::from("/srv/writable/app.db"));

        let nested = format!("data{}app.db", MAIN_SEPARATOR);
        let db = DatabaseConfig::new(nested.clone());
        assert_eq!(db.resolve_database_path(), PathBuf::from(nested));

        assert_eq!(
            DatabaseConfig::memory().resolve_database_path(),
            PathBuf::from(":memory:")
        );
    }
}
