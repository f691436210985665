//! Owner-scoped CRUD over records with an encrypted `sensitive_text` field.
//!
//! # Invariants
//!
//! - `sensitive_text` reaches persistence only as a [`FieldCodec`] envelope,
//!   and envelopes never leave this module undecrypted.
//! - A record is visible only to the owner that created it. Absence and
//!   foreign ownership both surface as [`StoreError::NotFound`].
//! - No operation retries. A corrupted envelope fails the whole call.

pub mod clock;
pub mod model;
pub mod repo;

pub use clock::MonotonicClock;
pub use model::{Page, Record, RecordId, RecordPatch};
pub use repo::{RecordRepository, RepoError, SqliteRecordRepository};

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::crypto::{CodecError, FieldCodec};
use model::{validate_sensitive_text, validate_title};
use repo::{FieldChanges, StoredRecord};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by [`RecordStore`] operations.
///
/// Display strings carry at most a record id, never plaintext or envelopes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller input is out of range.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No record visible to this owner.
    #[error("record not found")]
    NotFound,

    /// The stored envelope failed authentication.
    #[error("record {id} failed integrity verification")]
    Integrity { id: RecordId },

    /// The stored envelope could not be decoded.
    #[error("record {id} has a malformed envelope")]
    Format { id: RecordId },

    /// Sealing failed; the random source is unavailable.
    #[error("failed to seal sensitive text: {0}")]
    Sealing(#[source] CodecError),

    /// Persistence backend failure.
    #[error("backend failure: {0}")]
    Backend(#[from] RepoError),
}

/// Record store backed by SQLite.
pub type SqliteRecordStore = RecordStore<SqliteRecordRepository>;

/// CRUD service composing the codec and a repository.
pub struct RecordStore<R> {
    codec: Arc<FieldCodec>,
    repo: R,
    clock: MonotonicClock,
}

impl<R: RecordRepository> RecordStore<R> {
    pub fn new(codec: Arc<FieldCodec>, repo: R) -> Self {
        Self {
            codec,
            repo,
            clock: MonotonicClock::new(),
        }
    }

    /// Create a record and return it with `sensitive_text` as given.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] if `title` or `sensitive_text` is out of range.
    pub fn create(
        &self,
        owner_id: &str,
        title: &str,
        sensitive_text: &str,
    ) -> StoreResult<Record> {
        validate_title(title)?;
        validate_sensitive_text(sensitive_text)?;

        let now = self.clock.now_millis();
        let stored = StoredRecord {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_owned(),
            title: title.to_owned(),
            sensitive_envelope: self.seal(sensitive_text)?,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&stored)?;
        info!(record_id = %stored.id, owner_id, "record created");

        Ok(Record {
            id: stored.id,
            owner_id: stored.owner_id,
            title: stored.title,
            sensitive_text: sensitive_text.to_owned(),
            completed: stored.completed,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }

    /// List the owner's records, newest first.
    ///
    /// # Errors
    ///
    /// Fails as a whole with [`StoreError::Integrity`] or [`StoreError::Format`]
    /// if any envelope on the page cannot be opened.
    pub fn list(&self, owner_id: &str, page: Page) -> StoreResult<Vec<Record>> {
        let rows = self.repo.list(owner_id, page)?;
        debug!(owner_id, count = rows.len(), limit = page.limit(), offset = page.offset(), "records listed");
        rows.into_iter().map(|row| self.reveal(row)).collect()
    }

    pub fn get(&self, owner_id: &str, id: RecordId) -> StoreResult<Record> {
        let row = self.repo.find(owner_id, id)?.ok_or(StoreError::NotFound)?;
        self.reveal(row)
    }

    /// Apply a partial update. `updated_at` always advances, even for an
    /// empty patch.
    pub fn update(&self, owner_id: &str, id: RecordId, patch: RecordPatch) -> StoreResult<Record> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(text) = &patch.sensitive_text {
            validate_sensitive_text(text)?;
        }

        let sensitive_envelope = patch
            .sensitive_text
            .as_deref()
            .map(|text| self.seal(text))
            .transpose()?;
        let changes = FieldChanges {
            title: patch.title,
            sensitive_envelope,
            completed: patch.completed,
            updated_at: self.clock.now_millis(),
        };

        let row = self
            .repo
            .update(owner_id, id, &changes)?
            .ok_or(StoreError::NotFound)?;
        info!(record_id = %id, owner_id, "record updated");
        self.reveal(row)
    }

    /// Delete a record. A repeated delete reports [`StoreError::NotFound`].
    pub fn delete(&self, owner_id: &str, id: RecordId) -> StoreResult<()> {
        if !self.repo.delete(owner_id, id)? {
            return Err(StoreError::NotFound);
        }
        info!(record_id = %id, owner_id, "record deleted");
        Ok(())
    }

    /// Backend liveness probe.
    pub fn ping(&self) -> StoreResult<()> {
        self.repo.ping()?;
        Ok(())
    }

    fn seal(&self, plaintext: &str) -> StoreResult<String> {
        self.codec.seal(plaintext.as_bytes()).map_err(|e| {
            warn!(error = %e, "sealing failed");
            StoreError::Sealing(e)
        })
    }

    fn reveal(&self, row: StoredRecord) -> StoreResult<Record> {
        let id = row.id;
        let plaintext = self.codec.open(&row.sensitive_envelope).map_err(|e| {
            warn!(record_id = %id, owner_id = %row.owner_id, error = %e, "envelope rejected");
            match e {
                CodecError::Integrity => StoreError::Integrity { id },
                _ => StoreError::Format { id },
            }
        })?;
        // Authenticated bytes that are not UTF-8 were not sealed by this service.
        let sensitive_text =
            String::from_utf8(plaintext).map_err(|_| StoreError::Format { id })?;

        Ok(Record {
            id,
            owner_id: row.owner_id,
            title: row.title,
            sensitive_text,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
