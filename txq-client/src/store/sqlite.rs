//! SQLite storage backend.

use super::{RecordStore, StoreError};
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use txq_core::DriftEntry;
use txq_types::{
    Decimal, NewTransaction, SubmitOutcome, TransactionId, TransactionRecord, TransactionStatus,
    TransactionSummary,
};

/// SQLite-based record storage.
///
/// WAL journal with `synchronous=FULL`: a commit has reached disk before the
/// call returns. SQLite serialises writers; readers are not blocked by them.
/// A file-backed store also names a `<db>.lock` file beside the database for
/// the cross-process sync lock.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    lock_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let mut lock_name = OsString::from(path.as_os_str());
        lock_name.push(".lock");

        let store = Self {
            pool,
            lock_path: Some(PathBuf::from(lock_name)),
        };
        store.run_migrations().await?;
        tracing::debug!("Opened transaction store at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(":memory:")?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full);

        // One connection that is never recycled: the database lives and dies with it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            lock_path: None,
        };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Close the underlying pool, flushing outstanding connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        // AUTOINCREMENT keeps ids monotonic and never reused after deletes
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount TEXT NOT NULL,
                counterparty_identifier TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                status TEXT NOT NULL
                    CHECK (status IN ('pending', 'successful', 'failed'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_transactions_status ON transactions(status)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_transactions_counterparty \
             ON transactions(counterparty_identifier)",
        )
        .execute(&self.pool)
        .await?;

        // Records whose remote answer is known but not yet written back
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS drift (
                id INTEGER PRIMARY KEY,
                remote TEXT NOT NULL CHECK (remote IN ('accepted', 'rejected')),
                reason TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, record: &NewTransaction) -> Result<TransactionId, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (amount, counterparty_identifier, created_at, status)
            VALUES (?1, ?2, ?3, 'pending')
            RETURNING id
            "#,
        )
        .bind(record.amount.to_string())
        .bind(&record.counterparty_identifier)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(TransactionId::new(id))
    }

    async fn update(&self, record: &TransactionRecord) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET amount = ?1, counterparty_identifier = ?2, status = ?3
            WHERE id = ?4 AND (status = 'pending' OR status = ?3)
            "#,
        )
        .bind(record.amount.to_string())
        .bind(&record.counterparty_identifier)
        .bind(record.status.as_str())
        .bind(record.id.value())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn update_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<u64, StoreError> {
        let result =
            sqlx::query("UPDATE transactions SET status = ?1 WHERE id = ?2 AND status = 'pending'")
                .bind(status.as_str())
                .bind(id.value())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn get(&self, id: TransactionId) -> Result<Option<TransactionRecord>, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, amount, counterparty_identifier, created_at, status
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn query_by_counterparty(
        &self,
        counterparty_identifier: &str,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, amount, counterparty_identifier, created_at, status
            FROM transactions
            WHERE counterparty_identifier = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(counterparty_identifier)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn query_summaries_by_status(
        &self,
        status: TransactionStatus,
    ) -> Result<Vec<TransactionSummary>, StoreError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT id, amount, status
            FROM transactions
            WHERE status = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete_by_id(&self, id: TransactionId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn hold_drift(&self, entry: &DriftEntry) -> Result<(), StoreError> {
        sqlx::query("INSERT OR REPLACE INTO drift (id, remote, reason) VALUES (?1, ?2, ?3)")
            .bind(entry.id.value())
            .bind(encode_outcome(entry.remote))
            .bind(&entry.reason)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn release_drift(&self, id: TransactionId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM drift WHERE id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn held_drift(&self) -> Result<Vec<DriftEntry>, StoreError> {
        let rows = sqlx::query_as::<_, DriftRow>(
            "SELECT id, remote, reason FROM drift ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    fn pass_lock_path(&self) -> Option<PathBuf> {
        self.lock_path.clone()
    }
}

/// Internal row type for full-record queries.
#[derive(sqlx::FromRow)]
struct RecordRow {
    id: i64,
    amount: String,
    counterparty_identifier: String,
    created_at: i64,
    status: String,
}

/// Internal row type for summary queries.
#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    amount: String,
    status: String,
}

/// Internal row type for held drift.
#[derive(sqlx::FromRow)]
struct DriftRow {
    id: i64,
    remote: String,
    reason: String,
}

fn encode_outcome(outcome: SubmitOutcome) -> &'static str {
    match outcome {
        SubmitOutcome::Accepted => "accepted",
        SubmitOutcome::Rejected => "rejected",
    }
}

fn decode_amount(id: TransactionId, raw: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(raw).map_err(|e| StoreError::CorruptRow {
        id,
        reason: format!("amount {raw:?}: {e}"),
    })
}

fn decode_status(id: TransactionId, raw: &str) -> Result<TransactionStatus, StoreError> {
    raw.parse().map_err(|e: txq_types::ParseStatusError| StoreError::CorruptRow {
        id,
        reason: e.to_string(),
    })
}

impl TryFrom<RecordRow> for TransactionRecord {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let id = TransactionId::new(row.id);
        Ok(TransactionRecord {
            id,
            amount: decode_amount(id, &row.amount)?,
            counterparty_identifier: row.counterparty_identifier,
            created_at: row.created_at,
            status: decode_status(id, &row.status)?,
        })
    }
}

impl TryFrom<DriftRow> for DriftEntry {
    type Error = StoreError;

    fn try_from(row: DriftRow) -> Result<Self, Self::Error> {
        let id = TransactionId::new(row.id);
        let remote = match row.remote.as_str() {
            "accepted" => SubmitOutcome::Accepted,
            "rejected" => SubmitOutcome::Rejected,
            other => {
                return Err(StoreError::CorruptRow {
                    id,
                    reason: format!("drift outcome {other:?}"),
                })
            }
        };
        Ok(DriftEntry {
            id,
            remote,
            reason: row.reason,
        })
    }
}

impl TryFrom<SummaryRow> for TransactionSummary {
    type Error = StoreError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        let id = TransactionId::new(row.id);
        Ok(TransactionSummary {
            id,
            amount: decode_amount(id, &row.amount)?,
            status: decode_status(id, &row.status)?,
        })
    }
}
