/// # Test Utilities Module
///
/// Shared fixtures for litebase's unit tests: in-memory connections with a
/// realistic schema, and helpers for asserting on error quality.

use crate::config::DatabaseConfig;
use crate::core::db::{Driver, SqliteConnection};
use crate::core::Result;

const STANDARD_SCHEMA: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        active BOOLEAN DEFAULT TRUE,
        profile_data TEXT
    );

    CREATE TABLE posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        content TEXT,
        published BOOLEAN DEFAULT FALSE,
        FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
    );

    CREATE TABLE categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT
    );

    CREATE TABLE post_categories (
        post_id INTEGER NOT NULL,
        category_id INTEGER NOT NULL,
        PRIMARY KEY (post_id, category_id),
        FOREIGN KEY (post_id) REFERENCES posts (id) ON DELETE CASCADE,
        FOREIGN KEY (category_id) REFERENCES categories (id) ON DELETE CASCADE
    );

    CREATE INDEX idx_users_email ON users (email);
    CREATE INDEX idx_users_active ON users (active);
    CREATE INDEX idx_posts_user_id ON posts (user_id);
    CREATE UNIQUE INDEX idx_categories_name ON categories (name);
";

const SAMPLE_DATA: &str = "
    INSERT INTO users (username, email) VALUES
        ('alice', 'alice@example.com'),
        ('bob', 'bob@example.com'),
        ('charlie', 'charlie@example.com');
    INSERT INTO categories (name, description) VALUES
        ('Technology', 'Posts about technology'),
        ('Travel', 'Travel experiences');
    INSERT INTO posts (user_id, title, content, published) VALUES
        (1, 'Welcome to Rust', 'Rust is a systems programming language...', 1),
        (2, 'My Trip to Paris', 'Paris was amazing this summer...', 0);
    INSERT INTO post_categories (post_id, category_id) VALUES (1, 1), (2, 2);
";

/// Isolated in-memory database fixture
pub struct DatabaseFixture {
    pub connection: SqliteConnection,
}

impl DatabaseFixture {
    /// Empty in-memory database with foreign key enforcement on
    pub fn new() -> Result<Self> {
        let mut config = DatabaseConfig::memory();
        config.foreign_keys = true;
        Ok(DatabaseFixture {
            connection: SqliteConnection::open(config)?,
        })
    }

    /// In-memory database with the standard schema and a few rows
    pub fn with_sample_data() -> Result<Self> {
        let mut fixture = Self::new()?;
        fixture.connection.execute(STANDARD_SCHEMA)?;
        fixture.connection.execute(SAMPLE_DATA)?;
        fixture.connection.clear_queries();
        Ok(fixture)
    }
}

/// Error testing utilities
pub mod error_testing {
    /// Verify error message quality (contains helpful information)
    pub fn verify_error_message_quality<T, E>(result: &std::result::Result<T, E>, context: &str)
    where
        T: std::fmt::Debug,
        E: std::fmt::Display,
    {
        if let Err(ref error) = result {
            let error_str = error.to_string();
            assert!(!error_str.is_empty(), "Error message should not be empty in {}", context);
            assert!(error_str.len() > 10, "Error message should be descriptive in {}", context);
            assert!(
                error_str.to_lowercase().contains("error"),
                "Error should name its category: '{}' in {}",
                error_str,
                context
            );
        } else {
            panic!("Expected an error in {}", context);
        }
    }
}
