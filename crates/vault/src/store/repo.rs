//! Persistence contract for records and its SQLite implementation.
//!
//! # Invariants
//!
//! - Every statement touching a single record filters on both `id` and
//!   `owner_id`; ownership is enforced in SQL, not after the fact.
//! - All values are bound as parameters. SQL text only ever contains static
//!   column names.
//! - Each call is one statement, so a partial update lands atomically with
//!   its `updated_at` refresh.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use thiserror::Error;
use uuid::Uuid;

use super::model::{Page, RecordId};

const RECORD_COLUMNS: &str =
    "id, owner_id, title, sensitive_envelope, completed, created_at, updated_at";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from the persistence backend.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A previous holder of the connection lock panicked.
    #[error("database connection lock poisoned")]
    Poisoned,

    /// A persisted row does not match the expected shape.
    #[error("invalid persisted record data: {0}")]
    InvalidData(String),
}

/// A persisted row, envelope still sealed.
///
/// Never leaves the store layer; callers only see the decrypted `Record`.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub owner_id: String,
    pub title: String,
    pub sensitive_envelope: String,
    pub completed: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl std::fmt::Debug for StoredRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredRecord")
            .field("id", &self.id)
            .field("owner_id", &self.owner_id)
            .field("title", &self.title)
            .field("sensitive_envelope", &"[REDACTED]")
            .field("completed", &self.completed)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Write set for a partial update. Only `Some` fields are written;
/// `updated_at` is always written.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldChanges {
    pub title: Option<String>,
    pub sensitive_envelope: Option<String>,
    pub completed: Option<bool>,
    pub updated_at: i64,
}

impl std::fmt::Debug for FieldChanges {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldChanges")
            .field("title", &self.title)
            .field(
                "sensitive_envelope",
                &self.sensitive_envelope.as_ref().map(|_| "[REDACTED]"),
            )
            .field("completed", &self.completed)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Owner-scoped persistence operations over records.
#[cfg_attr(test, mockall::automock)]
pub trait RecordRepository {
    fn insert(&self, record: &StoredRecord) -> RepoResult<()>;
    /// Returns `None` when the id is absent or owned by someone else.
    fn find(&self, owner_id: &str, id: RecordId) -> RepoResult<Option<StoredRecord>>;
    /// Owner's records, `created_at DESC, id DESC`.
    fn list(&self, owner_id: &str, page: Page) -> RepoResult<Vec<StoredRecord>>;
    /// Applies `changes` in one statement and returns the row as written.
    fn update(
        &self,
        owner_id: &str,
        id: RecordId,
        changes: &FieldChanges,
    ) -> RepoResult<Option<StoredRecord>>;
    /// Returns `true` if a row was removed.
    fn delete(&self, owner_id: &str, id: RecordId) -> RepoResult<bool>;
    fn ping(&self) -> RepoResult<()>;
}

/// SQLite-backed record repository sharing one migrated connection.
#[derive(Clone)]
pub struct SqliteRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordRepository {
    /// Wrap a connection returned by [`crate::db::open_db`].
    pub fn new(conn: Connection) -> Self {
        Self::from_shared(Arc::new(Mutex::new(conn)))
    }

    pub fn from_shared(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::Poisoned)
    }
}

impl RecordRepository for SqliteRecordRepository {
    fn insert(&self, record: &StoredRecord) -> RepoResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO records (
                id,
                owner_id,
                title,
                sensitive_envelope,
                completed,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                record.id.to_string(),
                record.owner_id,
                record.title,
                record.sensitive_envelope,
                record.completed,
                record.created_at,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    fn find(&self, owner_id: &str, id: RecordId) -> RepoResult<Option<StoredRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1 AND owner_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), owner_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_record_row(row)?)),
            None => Ok(None),
        }
    }

    fn list(&self, owner_id: &str, page: Page) -> RepoResult<Vec<StoredRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM records
             WHERE owner_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let mut rows = stmt.query(params![owner_id, page.limit(), page.offset()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn update(
        &self,
        owner_id: &str,
        id: RecordId,
        changes: &FieldChanges,
    ) -> RepoResult<Option<StoredRecord>> {
        let mut assignments: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = &changes.title {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(envelope) = &changes.sensitive_envelope {
            assignments.push("sensitive_envelope = ?");
            bind_values.push(Value::Text(envelope.clone()));
        }
        if let Some(completed) = changes.completed {
            assignments.push("completed = ?");
            bind_values.push(Value::Integer(i64::from(completed)));
        }
        // Strictly advance even if another writer stamped a later time.
        assignments.push("updated_at = MAX(?, updated_at + 1)");
        bind_values.push(Value::Integer(changes.updated_at));

        bind_values.push(Value::Text(id.to_string()));
        bind_values.push(Value::Text(owner_id.to_string()));

        let sql = format!(
            "UPDATE records SET {} WHERE id = ? AND owner_id = ? RETURNING {RECORD_COLUMNS};",
            assignments.join(", ")
        );

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_record_row(row)?)),
            None => Ok(None),
        }
    }

    fn delete(&self, owner_id: &str, id: RecordId) -> RepoResult<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "DELETE FROM records WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner_id],
        )?;
        Ok(changed > 0)
    }

    fn ping(&self) -> RepoResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<StoredRecord> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{id_text}` in records.id")))?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in records.completed"
            )));
        }
    };

    Ok(StoredRecord {
        id,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        sensitive_envelope: row.get("sensitive_envelope")?,
        completed,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
