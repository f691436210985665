//! SQLite connection bootstrap and schema migrations.
//!
//! # Invariants
//!
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No record data is read or written before migrations succeed.

pub mod migrations;
mod open;

pub use open::open_db;
#[cfg(test)]
pub use open::open_db_in_memory;

use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

/// Errors produced while opening or migrating the database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The on-disk schema was written by a newer binary.
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
}
