//! SQLite error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    /// A stored column value (JSON roles, room type) failed to decode
    #[error("Invalid value in column {column}: {reason}")]
    Decode {
        column: &'static str,
        reason: String,
    },
}
