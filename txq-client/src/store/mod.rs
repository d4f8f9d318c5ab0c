//! Durable record storage.
//!
//! Every operation is durable before it returns `Ok`. "Nothing matched" is
//! never an error: `update` and `delete_by_id` report a zero count and `get`
//! returns `None`.

mod lock;
mod sqlite;

pub use lock::PassLock;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use txq_core::DriftEntry;
use txq_types::{
    NewTransaction, TransactionId, TransactionRecord, TransactionStatus, TransactionSummary,
};

/// Storage layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error (I/O, constraint, disk full, ...).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded.
    #[error("corrupt row {id}: {reason}")]
    CorruptRow {
        /// Id of the unreadable row.
        id: TransactionId,
        /// What could not be decoded.
        reason: String,
    },

    /// The cross-process sync lock could not be taken or checked.
    #[error("sync lock {path}: {source}")]
    Lock {
        /// Lock file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Trait for transaction record storage backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record as `pending`.
    ///
    /// Returns the newly assigned id.
    async fn insert(&self, record: &NewTransaction) -> Result<TransactionId, StoreError>;

    /// Persist the mutable fields of an existing record.
    ///
    /// Writes `amount`, `counterparty_identifier` and `status` in one
    /// statement; `id` and `created_at` are never written. A settled record
    /// never changes status: the write only applies while the stored status
    /// is `pending` or equal to the new one. Returns the number of rows
    /// affected (0 when the id does not exist or the status guard refused).
    async fn update(&self, record: &TransactionRecord) -> Result<u64, StoreError>;

    /// Settle a pending record, leaving every other field alone.
    ///
    /// Returns 0 when the record is gone or no longer `pending`.
    async fn update_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<u64, StoreError>;

    /// Get one record by id.
    async fn get(&self, id: TransactionId) -> Result<Option<TransactionRecord>, StoreError>;

    /// All records whose counterparty matches exactly, ordered by id.
    async fn query_by_counterparty(
        &self,
        counterparty_identifier: &str,
    ) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Summaries of all records with the given status, ordered by id.
    async fn query_summaries_by_status(
        &self,
        status: TransactionStatus,
    ) -> Result<Vec<TransactionSummary>, StoreError>;

    /// Remove a record.
    ///
    /// Returns 1 if it was removed, 0 if it did not exist.
    async fn delete_by_id(&self, id: TransactionId) -> Result<u64, StoreError>;

    /// Durably hold a record whose remote answer was not written back.
    async fn hold_drift(&self, entry: &DriftEntry) -> Result<(), StoreError>;

    /// Stop holding a record.
    async fn release_drift(&self, id: TransactionId) -> Result<(), StoreError>;

    /// All held records, ordered by id.
    async fn held_drift(&self) -> Result<Vec<DriftEntry>, StoreError>;

    /// Lock file that serialises sync passes across processes sharing this
    /// store, if the store lives on disk.
    fn pass_lock_path(&self) -> Option<PathBuf> {
        None
    }
}
