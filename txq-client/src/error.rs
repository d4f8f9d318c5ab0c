//! Error types for caller-facing operations.

use thiserror::Error;
use txq_core::TransitionError;
use txq_types::ValidationError;

use crate::store::StoreError;

/// Errors from single-record caller operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Caller input refused before anything was persisted.
    #[error("invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    /// The record is settled and its status can no longer change.
    #[error("status change refused: {0}")]
    Transition(#[from] TransitionError),

    /// Local persistence failed.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// Errors that stop a sync pass before any record was attempted.
///
/// Failures of individual records never surface here; they are collected
/// in the pass report.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Pending records could not be selected, or the sync lock file failed.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use txq_types::Decimal;

    #[test]
    fn validation_error_display() {
        let err = QueueError::from(ValidationError::NonPositiveAmount(Decimal::ZERO));
        assert_eq!(
            err.to_string(),
            "invalid transaction: amount must be strictly positive, got 0"
        );
    }

    #[test]
    fn transition_error_display() {
        let err = QueueError::from(TransitionError::AlreadyTerminal {
            status: txq_types::TransactionStatus::Successful,
        });
        assert!(err.to_string().starts_with("status change refused: "));
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueueError>();
        assert_send_sync::<SyncError>();
    }
}
