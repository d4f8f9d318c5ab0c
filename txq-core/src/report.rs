//! Sync pass accounting.
//!
//! [`PassTally`] accumulates per-record results while a pass runs and
//! produces the [`SyncReport`] handed back to the caller. A record counts
//! toward `pending_count` whenever it was selected as pending and is still
//! pending locally when the pass ends, for whatever reason.

use serde::Serialize;
use txq_types::{SubmitOutcome, TransactionId};

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassDisposition {
    /// Every selected record was visited
    Completed,
    /// Stopped early at a record boundary on request
    Cancelled,
    /// Remote unreachable; nothing was touched
    Unreachable,
    /// Another pass was in flight; nothing was touched
    AlreadyRunning,
}

/// A record whose processing failed without settling it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    /// Record id
    pub id: TransactionId,
    /// Human-readable cause
    pub reason: String,
}

/// Remote answered but the local record could not be updated to match.
///
/// The local record still reads `pending` while the remote has already
/// decided. Re-submitting it could duplicate the transaction remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftEntry {
    /// Record id
    pub id: TransactionId,
    /// What the remote said
    pub remote: SubmitOutcome,
    /// Why the local write did not land
    pub reason: String,
}

/// Aggregate result of one sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// How the pass ended
    pub disposition: PassDisposition,
    /// Records now `successful`
    pub success_count: usize,
    /// Records now `failed`
    pub failed_count: usize,
    /// Selected records still `pending` locally
    pub pending_count: usize,
    /// Submissions that ended in a transport failure
    pub transport_error_count: usize,
    /// Selected records that were deleted or settled before submission
    pub skipped_count: usize,
    /// Records held back because of earlier drift
    pub held_count: usize,
    /// Earlier drift entries written back to the store at the start of this pass
    pub healed_count: usize,
    /// Per-record transport failures
    pub transport_failures: Vec<RecordFailure>,
    /// Per-record local read failures
    pub read_failures: Vec<RecordFailure>,
    /// New reconciliation drift detected in this pass
    pub drift: Vec<DriftEntry>,
}

impl SyncReport {
    /// A report for a pass that did no work.
    pub fn skipped(disposition: PassDisposition) -> Self {
        Self {
            disposition,
            success_count: 0,
            failed_count: 0,
            pending_count: 0,
            transport_error_count: 0,
            skipped_count: 0,
            held_count: 0,
            healed_count: 0,
            transport_failures: Vec::new(),
            read_failures: Vec::new(),
            drift: Vec::new(),
        }
    }

    /// Number of remote submissions attempted in this pass.
    pub fn submitted_count(&self) -> usize {
        self.success_count + self.failed_count + self.transport_error_count + self.drift.len()
    }

    /// Whether the pass surfaced drift the caller must alert on.
    pub fn has_drift(&self) -> bool {
        !self.drift.is_empty()
    }
}

/// Running tally for a pass in progress.
#[derive(Debug)]
pub struct PassTally {
    report: SyncReport,
    not_attempted: usize,
}

impl PassTally {
    /// Start a tally.
    pub fn new() -> Self {
        Self {
            report: SyncReport::skipped(PassDisposition::Completed),
            not_attempted: 0,
        }
    }

    /// Remote answered and the store now agrees.
    pub fn settled(&mut self, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Accepted => self.report.success_count += 1,
            SubmitOutcome::Rejected => self.report.failed_count += 1,
        }
    }

    /// Submission failed in transport; the record stays pending.
    pub fn transport_failed(&mut self, id: TransactionId, reason: impl Into<String>) {
        self.report.transport_error_count += 1;
        self.report.transport_failures.push(RecordFailure {
            id,
            reason: reason.into(),
        });
    }

    /// Record could not be read back before submission; it stays pending.
    pub fn read_failed(&mut self, id: TransactionId, reason: impl Into<String>) {
        self.report.read_failures.push(RecordFailure {
            id,
            reason: reason.into(),
        });
    }

    /// Remote answered but the store write did not land.
    pub fn drifted(&mut self, entry: DriftEntry) {
        self.report.drift.push(entry);
    }

    /// Record held back because of earlier drift.
    pub fn held(&mut self) {
        self.report.held_count += 1;
    }

    /// Record vanished or settled between selection and submission.
    pub fn skipped(&mut self) {
        self.report.skipped_count += 1;
    }

    /// Earlier drift written back to the store.
    pub fn healed(&mut self) {
        self.report.healed_count += 1;
    }

    /// Records left untouched because the pass stopped early.
    pub fn not_attempted(&mut self, count: usize) {
        self.not_attempted += count;
    }

    /// Close the tally.
    pub fn finish(mut self, disposition: PassDisposition) -> SyncReport {
        self.report.disposition = disposition;
        self.report.pending_count = self.report.transport_error_count
            + self.report.read_failures.len()
            + self.report.drift.len()
            + self.report.held_count
            + self.not_attempted;
        self.report
    }
}

impl Default for PassTally {
    fn default() -> Self {
        Self::new()
    }
}
