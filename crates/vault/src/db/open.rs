//! Open file or in-memory SQLite connections with migrations applied.

use std::path::Path;
use std::time::{Duration, Instant};

use rusqlite::Connection;
use tracing::{error, info};

use super::migrations::apply_migrations;
use super::DbResult;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a SQLite database file and apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, pragmas cannot be set, or a
/// migration fails.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    let conn = Connection::open(path).map_err(|e| {
        error!(mode = "file", error = %e, "database open failed");
        e
    })?;
    bootstrap(conn, "file", started_at)
}

/// Open an in-memory SQLite database and apply all pending migrations.
#[cfg(test)]
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    let conn = Connection::open_in_memory()?;
    bootstrap(conn, "memory", started_at)
}

fn bootstrap(mut conn: Connection, mode: &'static str, started_at: Instant) -> DbResult<Connection> {
    match configure(&mut conn) {
        Ok(()) => {
            info!(
                mode,
                duration_ms = started_at.elapsed().as_millis() as u64,
                "database ready"
            );
            Ok(conn)
        }
        Err(e) => {
            error!(mode, error = %e, "database bootstrap failed");
            Err(e)
        }
    }
}

fn configure(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}
