//! Sync engine - reconciles pending records with the remote authority.
//!
//! # One pass
//!
//! ```text
//! single-flight guard ─► sync lock ─► gate ─► load drift ─► heal drift ─► select pending
//!                                                                              │
//!          ┌───────────────────────────────────────────────────────────────────┘
//!          ▼
//!   for each summary: cancelled? ─► held? ─► re-read ─► submit ─► settle status
//! ```
//!
//! Per-record failures are tallied and never abort the pass. Only a failure
//! to take the sync lock or to select pending records at all is returned as
//! an error.
//!
//! The in-process guard keeps one engine from overlapping itself. The sync
//! lock is a file lock beside the database, so engines in other processes
//! over the same file are refused too.
//!
//! # Reconciliation drift
//!
//! When the remote has answered but the local status write fails, the
//! record still reads `pending` locally. Submitting it again could create a
//! second remote transaction, so the engine holds it: held records are never
//! re-submitted, and each pass first tries to write the remote's answer back.
//! Held entries are persisted by the store and reloaded at the start of every
//! pass, so a restarted process keeps holding them.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use txq_core::{next_status, settled_status, DriftEntry, PassDisposition, PassTally, SyncReport};
use txq_types::{SubmitOutcome, SubmitRequest, TransactionId, TransactionStatus};

use crate::error::SyncError;
use crate::gate::ConnectivityGate;
use crate::store::{PassLock, RecordStore};
use crate::submitter::RemoteSubmitter;

/// Drives sync passes for one record store.
pub struct SyncEngine<S, R, G> {
    store: Arc<S>,
    submitter: R,
    gate: G,
    in_flight: Mutex<()>,
    drift: Mutex<BTreeMap<TransactionId, DriftEntry>>,
}

impl<S, R, G> SyncEngine<S, R, G>
where
    S: RecordStore,
    R: RemoteSubmitter,
    G: ConnectivityGate,
{
    /// Create an engine over an explicitly constructed store.
    pub fn new(store: Arc<S>, submitter: R, gate: G) -> Self {
        Self {
            store,
            submitter,
            gate,
            in_flight: Mutex::new(()),
            drift: Mutex::new(BTreeMap::new()),
        }
    }

    /// Run one sync pass.
    ///
    /// Cancellation is checked before each submission; a submission already
    /// under way finishes together with its store update.
    pub async fn run_pass(&self, cancel: &CancellationToken) -> Result<SyncReport, SyncError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("Sync pass already in flight; skipping");
            return Ok(SyncReport::skipped(PassDisposition::AlreadyRunning));
        };

        let _pass_lock = match self.store.pass_lock_path() {
            Some(path) => match PassLock::try_acquire(&path)? {
                Some(lock) => Some(lock),
                None => {
                    tracing::info!("Another process is syncing {}; skipping", path.display());
                    return Ok(SyncReport::skipped(PassDisposition::AlreadyRunning));
                }
            },
            None => None,
        };

        if !self.gate.is_reachable().await {
            tracing::info!("Remote unreachable; sync pass skipped");
            return Ok(SyncReport::skipped(PassDisposition::Unreachable));
        }

        self.load_drift().await;
        let mut tally = PassTally::new();
        self.heal_drift(&mut tally).await;

        let pending = self
            .store
            .query_summaries_by_status(TransactionStatus::Pending)
            .await?;
        if pending.is_empty() {
            tracing::debug!("No pending transactions");
            return Ok(tally.finish(PassDisposition::Completed));
        }

        tracing::info!("Sync pass started: {} pending", pending.len());
        let held: HashSet<TransactionId> = self.drift.lock().await.keys().copied().collect();
        let mut disposition = PassDisposition::Completed;

        for (index, summary) in pending.iter().enumerate() {
            if cancel.is_cancelled() {
                tally.not_attempted(pending.len() - index);
                disposition = PassDisposition::Cancelled;
                tracing::info!(
                    "Sync pass cancelled; {} transactions left pending",
                    pending.len() - index
                );
                break;
            }
            if held.contains(&summary.id) {
                tracing::debug!("Transaction {} held by drift ledger", summary.id);
                tally.held();
                continue;
            }
            self.sync_one(summary.id, &mut tally).await;
        }

        let report = tally.finish(disposition);
        tracing::info!(
            "Sync pass finished: {} successful, {} failed, {} pending, {} transport errors",
            report.success_count,
            report.failed_count,
            report.pending_count,
            report.transport_error_count
        );
        Ok(report)
    }

    /// Entries currently held by the drift ledger, including any persisted
    /// by an earlier process.
    pub async fn drifted(&self) -> Vec<DriftEntry> {
        self.load_drift().await;
        self.drift.lock().await.values().cloned().collect()
    }

    /// Submit one record and write back the remote's answer.
    async fn sync_one(&self, id: TransactionId, tally: &mut PassTally) {
        // Re-read so the real counterparty and timestamp are what gets sent
        let record = match self.store.get(id).await {
            Ok(Some(record)) if record.status == TransactionStatus::Pending => record,
            Ok(_) => {
                tracing::debug!("Transaction {} deleted or settled since selection", id);
                tally.skipped();
                return;
            }
            Err(e) => {
                tracing::error!("Failed to read transaction {}: {}", id, e);
                tally.read_failed(id, e.to_string());
                return;
            }
        };

        let outcome = match self.submitter.submit(&SubmitRequest::from(&record)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Transaction {} not submitted: {}", id, e);
                tally.transport_failed(id, e.to_string());
                return;
            }
        };

        let status = match next_status(record.status, outcome.into()) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Transaction {}: {}", id, e);
                tally.skipped();
                return;
            }
        };

        // Status only: the caller may have edited other fields meanwhile
        match self.store.update_status(id, status).await {
            Ok(1) => {
                tracing::debug!("Transaction {} is now {}", id, status);
                tally.settled(outcome);
            }
            Ok(_) => {
                self.hold(
                    id,
                    outcome,
                    "record vanished or left pending before its status was written",
                    tally,
                )
                .await
            }
            Err(e) => self.hold(id, outcome, &e.to_string(), tally).await,
        }
    }

    async fn hold(
        &self,
        id: TransactionId,
        remote: SubmitOutcome,
        reason: &str,
        tally: &mut PassTally,
    ) {
        tracing::error!(
            "Reconciliation drift on transaction {}: remote {:?}, local write failed: {}",
            id,
            remote,
            reason
        );
        let entry = DriftEntry {
            id,
            remote,
            reason: reason.to_string(),
        };
        if let Err(e) = self.store.hold_drift(&entry).await {
            tracing::error!(
                "Drift on transaction {} held in memory only: {}",
                id,
                e
            );
        }
        self.drift.lock().await.insert(id, entry.clone());
        tally.drifted(entry);
    }

    /// Merge persisted drift into the in-memory ledger.
    async fn load_drift(&self) {
        match self.store.held_drift().await {
            Ok(entries) => {
                let mut drift = self.drift.lock().await;
                for entry in entries {
                    drift.entry(entry.id).or_insert(entry);
                }
            }
            Err(e) => tracing::warn!("Failed to load held drift: {}", e),
        }
    }

    /// Write held remote answers back to the store.
    async fn heal_drift(&self, tally: &mut PassTally) {
        let mut drift = self.drift.lock().await;
        if drift.is_empty() {
            return;
        }

        let held: Vec<DriftEntry> = drift.values().cloned().collect();
        for entry in held {
            let release = match self.store.get(entry.id).await {
                Ok(Some(record)) if record.status.is_terminal() => true,
                Ok(Some(_)) => {
                    let status = settled_status(entry.remote);
                    match self.store.update_status(entry.id, status).await {
                        Ok(1) => {
                            tracing::info!(
                                "Drift healed: transaction {} is now {}",
                                entry.id,
                                status
                            );
                            tally.healed();
                            true
                        }
                        Ok(_) => {
                            tracing::info!(
                                "Drifted transaction {} settled or removed elsewhere",
                                entry.id
                            );
                            true
                        }
                        Err(e) => {
                            tracing::warn!("Drift on transaction {} persists: {}", entry.id, e);
                            false
                        }
                    }
                }
                Ok(None) => {
                    tracing::info!("Drifted transaction {} no longer exists locally", entry.id);
                    true
                }
                Err(e) => {
                    tracing::warn!("Drift on transaction {} persists: {}", entry.id, e);
                    false
                }
            };

            if release {
                if let Err(e) = self.store.release_drift(entry.id).await {
                    // Reloaded next pass, then released once the record reads terminal
                    tracing::warn!("Failed to release drift on {}: {}", entry.id, e);
                }
                drift.remove(&entry.id);
            }
        }
    }
}
