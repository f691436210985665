//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::store::SqliteRecordStore;

/// Application state shared across all request handlers.
///
/// All fields are `Arc`-wrapped so that Axum can clone the state for each
/// request without copying the store or its codec.
#[derive(Clone)]
pub struct AppState {
    /// Owner-scoped record store holding the field codec.
    pub store: Arc<SqliteRecordStore>,
    /// Name of the HTTP header carrying the verified owner id.
    pub owner_header_name: Arc<String>,
}

impl AppState {
    /// Create a new [`AppState`] around a ready store.
    pub fn new(store: SqliteRecordStore, owner_header_name: String) -> Self {
        Self {
            store: Arc::new(store),
            owner_header_name: Arc::new(owner_header_name),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory database, fixed key, default owner header.
    pub fn in_memory() -> Self {
        Self::in_memory_with_connection().0
    }

    /// Like [`AppState::in_memory`], also returning the raw connection so
    /// tests can inspect or corrupt persisted rows.
    pub fn in_memory_with_connection() -> (Self, Arc<std::sync::Mutex<rusqlite::Connection>>) {
        use crate::crypto::{FieldCodec, FieldKey};
        use crate::db::open_db_in_memory;
        use crate::store::{RecordStore, SqliteRecordRepository};

        let conn = Arc::new(std::sync::Mutex::new(open_db_in_memory().unwrap()));
        let codec = FieldCodec::new(&FieldKey::from_bytes(&[0x42u8; 32]).unwrap());
        let store = RecordStore::new(
            Arc::new(codec),
            SqliteRecordRepository::from_shared(Arc::clone(&conn)),
        );
        (Self::new(store, "X-Owner-Id".into()), conn)
    }
}
