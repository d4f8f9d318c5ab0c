//! Caller-facing transaction queue.
//!
//! Wires one record store, one submitter and one connectivity gate into a
//! single handle. Creation never touches the network; records wait as
//! `pending` until a sync pass delivers them.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use txq_core::{check_status_change, validate_new, DriftEntry, SyncReport, TransitionError};
use txq_types::{Decimal, TransactionId, TransactionRecord, TransactionStatus, TransactionSummary};

use crate::clock::now_millis;
use crate::engine::SyncEngine;
use crate::error::{QueueError, SyncError};
use crate::gate::ConnectivityGate;
use crate::store::RecordStore;
use crate::submitter::RemoteSubmitter;

/// Offline-first transaction queue.
pub struct TransactionQueue<S, R, G> {
    store: Arc<S>,
    engine: SyncEngine<S, R, G>,
    shutdown: CancellationToken,
}

impl<S, R, G> TransactionQueue<S, R, G>
where
    S: RecordStore,
    R: RemoteSubmitter,
    G: ConnectivityGate,
{
    /// Create a queue over an explicitly opened store.
    pub fn new(store: Arc<S>, submitter: R, gate: G) -> Self {
        let engine = SyncEngine::new(Arc::clone(&store), submitter, gate);
        Self {
            store,
            engine,
            shutdown: CancellationToken::new(),
        }
    }

    /// Validate and persist a new transaction as `pending`.
    ///
    /// Returns as soon as the record is durable; no network I/O happens here.
    pub async fn create_transaction(
        &self,
        amount: Decimal,
        counterparty_identifier: &str,
    ) -> Result<TransactionId, QueueError> {
        let record = validate_new(amount, counterparty_identifier, now_millis())?;
        let id = self.store.insert(&record).await?;
        tracing::info!("Queued transaction {} for {}", id, record.amount);
        Ok(id)
    }

    /// Run one sync pass, stopping early if [`shutdown`](Self::shutdown) is called.
    pub async fn run_sync_pass(&self) -> Result<SyncReport, SyncError> {
        self.engine.run_pass(&self.shutdown).await
    }

    /// All records for one counterparty, oldest first.
    pub async fn query_by_counterparty(
        &self,
        counterparty_identifier: &str,
    ) -> Result<Vec<TransactionRecord>, QueueError> {
        Ok(self.store.query_by_counterparty(counterparty_identifier).await?)
    }

    /// Summaries of records in one status, oldest first.
    pub async fn summaries_by_status(
        &self,
        status: TransactionStatus,
    ) -> Result<Vec<TransactionSummary>, QueueError> {
        Ok(self.store.query_summaries_by_status(status).await?)
    }

    /// Look up one record.
    pub async fn get(&self, id: TransactionId) -> Result<Option<TransactionRecord>, QueueError> {
        Ok(self.store.get(id).await?)
    }

    /// Overwrite the mutable fields of an existing record.
    ///
    /// The amount and counterparty are validated as on creation. A settled
    /// record keeps its status: asking for a different one is
    /// [`QueueError::Transition`]. Returns `false` if no record has that id.
    pub async fn update_transaction(&self, record: &TransactionRecord) -> Result<bool, QueueError> {
        validate_new(record.amount, &record.counterparty_identifier, record.created_at)?;

        let Some(current) = self.store.get(record.id).await? else {
            return Ok(false);
        };
        check_status_change(current.status, record.status)?;

        if self.store.update(record).await? > 0 {
            tracing::debug!("Updated transaction {}", record.id);
            return Ok(true);
        }

        // Settled by a sync pass between the read and the write
        match self.store.get(record.id).await? {
            None => Ok(false),
            Some(now) => Err(TransitionError::AlreadyTerminal { status: now.status }.into()),
        }
    }

    /// Delete one record. Returns `false` if it did not exist.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<bool, QueueError> {
        let removed = self.store.delete_by_id(id).await? > 0;
        if removed {
            tracing::info!("Deleted transaction {}", id);
        } else {
            tracing::debug!("Delete of transaction {}: not found", id);
        }
        Ok(removed)
    }

    /// Records the remote has answered for but the store has not yet caught up with.
    pub async fn drifted(&self) -> Vec<DriftEntry> {
        self.engine.drifted().await
    }

    /// Stop any running pass at the next record boundary and end the scheduler.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Token cancelled by [`shutdown`](Self::shutdown).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::MockGate;
    use crate::store::SqliteStore;
    use crate::submitter::{MockResponse, MockSubmitter};
    use txq_core::PassDisposition;
    use txq_types::ValidationError;

    type TestQueue = TransactionQueue<SqliteStore, MockSubmitter, MockGate>;

    async fn test_queue(reachable: bool) -> (TestQueue, MockSubmitter, MockGate) {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let submitter = MockSubmitter::new();
        let gate = MockGate::new(reachable);
        let queue = TransactionQueue::new(store, submitter.clone(), gate.clone());
        (queue, submitter, gate)
    }

    fn amount(units: i64) -> Decimal {
        Decimal::new(units, 2)
    }

    #[tokio::test]
    async fn create_is_immediately_pending() {
        let (queue, submitter, _) = test_queue(true).await;

        let id = queue.create_transaction(amount(1250), "+254700000001").await.unwrap();

        let record = queue.get(id).await.unwrap().unwrap();
        assert_eq!(record.status, TransactionStatus::Pending);
        assert_eq!(record.amount, amount(1250));
        assert_eq!(record.counterparty_identifier, "+254700000001");
        assert!(record.created_at > 0);
        assert_eq!(submitter.submit_count(), 0);
    }

    #[tokio::test]
    async fn ids_are_unique_even_after_delete() {
        let (queue, _, _) = test_queue(true).await;

        let first = queue.create_transaction(amount(100), "+1").await.unwrap();
        let second = queue.create_transaction(amount(200), "+1").await.unwrap();
        assert!(queue.delete_transaction(second).await.unwrap());
        let third = queue.create_transaction(amount(300), "+1").await.unwrap();

        assert_ne!(first, second);
        assert_ne!(third, second);
        assert!(third > second);
    }

    #[tokio::test]
    async fn invalid_input_persists_nothing() {
        let (queue, _, _) = test_queue(true).await;

        let err = queue.create_transaction(Decimal::ZERO, "+1").await.unwrap_err();
        assert!(matches!(
            err,
            QueueError::Validation(ValidationError::NonPositiveAmount(_))
        ));

        let err = queue.create_transaction(amount(100), "   ").await.unwrap_err();
        assert!(matches!(
            err,
            QueueError::Validation(ValidationError::EmptyCounterparty)
        ));

        let pending = queue
            .summaries_by_status(TransactionStatus::Pending)
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_returns_false() {
        let (queue, _, _) = test_queue(true).await;
        assert!(!queue.delete_transaction(TransactionId::new(42)).await.unwrap());
    }

    #[tokio::test]
    async fn deleted_record_leaves_all_queries() {
        let (queue, _, _) = test_queue(true).await;
        let id = queue.create_transaction(amount(100), "+1").await.unwrap();

        assert!(queue.delete_transaction(id).await.unwrap());

        assert!(queue.get(id).await.unwrap().is_none());
        assert!(queue.query_by_counterparty("+1").await.unwrap().is_empty());
        assert!(queue
            .summaries_by_status(TransactionStatus::Pending)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn update_changes_mutable_fields() {
        let (queue, _, _) = test_queue(true).await;
        let id = queue.create_transaction(amount(100), "+1").await.unwrap();
        let mut record = queue.get(id).await.unwrap().unwrap();
        record.amount = amount(150);
        record.counterparty_identifier = "+2".into();

        assert!(queue.update_transaction(&record).await.unwrap());

        let stored = queue.get(id).await.unwrap().unwrap();
        assert_eq!(stored.amount, amount(150));
        assert_eq!(stored.counterparty_identifier, "+2");
        assert_eq!(stored.created_at, record.created_at);
    }

    #[tokio::test]
    async fn update_validates_like_create() {
        let (queue, _, _) = test_queue(true).await;
        let id = queue.create_transaction(amount(100), "+1").await.unwrap();
        let mut record = queue.get(id).await.unwrap().unwrap();

        record.amount = amount(-500);
        assert!(matches!(
            queue.update_transaction(&record).await,
            Err(QueueError::Validation(ValidationError::NonPositiveAmount(_)))
        ));

        record.amount = amount(100);
        record.counterparty_identifier = " ".into();
        assert!(matches!(
            queue.update_transaction(&record).await,
            Err(QueueError::Validation(ValidationError::EmptyCounterparty))
        ));

        assert_eq!(queue.get(id).await.unwrap().unwrap().counterparty_identifier, "+1");
    }

    #[tokio::test]
    async fn settled_record_cannot_be_reopened() {
        let (queue, submitter, _) = test_queue(true).await;
        let id = queue.create_transaction(amount(100), "+1").await.unwrap();
        queue.run_sync_pass().await.unwrap();
        assert_eq!(submitter.submit_count(), 1);

        let mut record = queue.get(id).await.unwrap().unwrap();
        assert_eq!(record.status, TransactionStatus::Successful);
        record.status = TransactionStatus::Pending;
        record.amount = amount(-500);
        assert!(queue.update_transaction(&record).await.is_err());

        record.amount = amount(100);
        assert!(matches!(
            queue.update_transaction(&record).await,
            Err(QueueError::Transition(TransitionError::AlreadyTerminal {
                status: TransactionStatus::Successful
            }))
        ));

        let report = queue.run_sync_pass().await.unwrap();
        assert_eq!(report.submitted_count(), 0);
        assert_eq!(submitter.submit_count(), 1);
        assert_eq!(
            queue.get(id).await.unwrap().unwrap().status,
            TransactionStatus::Successful
        );
    }

    #[tokio::test]
    async fn update_of_missing_record_returns_false() {
        let (queue, _, _) = test_queue(true).await;
        let ghost = TransactionRecord {
            id: TransactionId::new(77),
            amount: amount(100),
            counterparty_identifier: "+1".into(),
            created_at: 1,
            status: TransactionStatus::Pending,
        };

        assert!(!queue.update_transaction(&ghost).await.unwrap());
    }

    #[tokio::test]
    async fn sync_pass_settles_queued_records() {
        let (queue, submitter, _) = test_queue(true).await;
        submitter.respond_to("+bad", MockResponse::Reject);
        queue.create_transaction(amount(100), "+good").await.unwrap();
        queue.create_transaction(amount(200), "+bad").await.unwrap();

        let report = queue.run_sync_pass().await.unwrap();

        assert_eq!(report.success_count, 1);
        assert_eq!(report.failed_count, 1);
        let good = queue.query_by_counterparty("+good").await.unwrap();
        assert_eq!(good[0].status, TransactionStatus::Successful);
        let bad = queue.query_by_counterparty("+bad").await.unwrap();
        assert_eq!(bad[0].status, TransactionStatus::Failed);
    }

    #[tokio::test]
    async fn offline_pass_keeps_everything_pending() {
        let (queue, submitter, gate) = test_queue(false).await;
        queue.create_transaction(amount(100), "+1").await.unwrap();

        let report = queue.run_sync_pass().await.unwrap();
        assert_eq!(report.disposition, PassDisposition::Unreachable);
        assert_eq!(submitter.submit_count(), 0);

        gate.set_reachable(true);
        let report = queue.run_sync_pass().await.unwrap();
        assert_eq!(report.success_count, 1);
    }

    #[tokio::test]
    async fn shutdown_cancels_passes() {
        let (queue, submitter, _) = test_queue(true).await;
        queue.create_transaction(amount(100), "+1").await.unwrap();
        let token = queue.cancellation_token();

        queue.shutdown();

        assert!(token.is_cancelled());
        let report = queue.run_sync_pass().await.unwrap();
        assert_eq!(report.disposition, PassDisposition::Cancelled);
        assert_eq!(report.pending_count, 1);
        assert_eq!(submitter.submit_count(), 0);
    }
}
