//! Per-record status state machine.
//!
//! ```text
//! pending --[Accepted]--------> successful   (terminal)
//! pending --[Rejected]--------> failed       (terminal)
//! pending --[TransportFailed]-> pending
//! ```
//!
//! Terminal records refuse every event. Moving a record back to `pending`
//! is not expressible here.

use thiserror::Error;
use txq_types::{SubmitOutcome, TransactionStatus};

/// What a single submission attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitEvent {
    /// Remote accepted
    Accepted,
    /// Remote rejected
    Rejected,
    /// No usable answer from the remote
    TransportFailed,
}

impl From<SubmitOutcome> for SubmitEvent {
    fn from(outcome: SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Accepted => Self::Accepted,
            SubmitOutcome::Rejected => Self::Rejected,
        }
    }
}

/// Refused transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Record already settled
    #[error("record is already {status}; no further transitions")]
    AlreadyTerminal {
        /// The terminal status the record holds
        status: TransactionStatus,
    },
}

/// Status a pending record settles into once the remote has answered.
pub fn settled_status(outcome: SubmitOutcome) -> TransactionStatus {
    match outcome {
        SubmitOutcome::Accepted => TransactionStatus::Successful,
        SubmitOutcome::Rejected => TransactionStatus::Failed,
    }
}

/// Check a status change requested by a caller update.
///
/// A pending record may move anywhere; a terminal record keeps its status.
pub fn check_status_change(
    current: TransactionStatus,
    requested: TransactionStatus,
) -> Result<(), TransitionError> {
    if current.is_terminal() && requested != current {
        return Err(TransitionError::AlreadyTerminal { status: current });
    }
    Ok(())
}

/// Compute the status after a submission event.
pub fn next_status(
    current: TransactionStatus,
    event: SubmitEvent,
) -> Result<TransactionStatus, TransitionError> {
    match (current, event) {
        (TransactionStatus::Pending, SubmitEvent::Accepted) => Ok(TransactionStatus::Successful),
        (TransactionStatus::Pending, SubmitEvent::Rejected) => Ok(TransactionStatus::Failed),
        (TransactionStatus::Pending, SubmitEvent::TransportFailed) => Ok(TransactionStatus::Pending),
        (status, _) => Err(TransitionError::AlreadyTerminal { status }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_accepted_becomes_successful() {
        assert_eq!(
            next_status(TransactionStatus::Pending, SubmitEvent::Accepted),
            Ok(TransactionStatus::Successful)
        );
    }

    #[test]
    fn pending_rejected_becomes_failed() {
        assert_eq!(
            next_status(TransactionStatus::Pending, SubmitEvent::Rejected),
            Ok(TransactionStatus::Failed)
        );
    }

    #[test]
    fn transport_failure_keeps_pending() {
        assert_eq!(
            next_status(TransactionStatus::Pending, SubmitEvent::TransportFailed),
            Ok(TransactionStatus::Pending)
        );
    }

    #[test]
    fn terminal_states_refuse_all_events() {
        for status in [TransactionStatus::Successful, TransactionStatus::Failed] {
            for event in [
                SubmitEvent::Accepted,
                SubmitEvent::Rejected,
                SubmitEvent::TransportFailed,
            ] {
                assert_eq!(
                    next_status(status, event),
                    Err(TransitionError::AlreadyTerminal { status })
                );
            }
        }
    }

    #[test]
    fn settled_status_matches_transition() {
        for outcome in [SubmitOutcome::Accepted, SubmitOutcome::Rejected] {
            assert_eq!(
                Ok(settled_status(outcome)),
                next_status(TransactionStatus::Pending, outcome.into())
            );
        }
    }

    #[test]
    fn caller_cannot_reopen_terminal_record() {
        for status in [TransactionStatus::Successful, TransactionStatus::Failed] {
            assert_eq!(
                check_status_change(status, TransactionStatus::Pending),
                Err(TransitionError::AlreadyTerminal { status })
            );
            assert_eq!(check_status_change(status, status), Ok(()));
        }
        assert_eq!(
            check_status_change(TransactionStatus::Successful, TransactionStatus::Failed),
            Err(TransitionError::AlreadyTerminal {
                status: TransactionStatus::Successful
            })
        );
    }

    #[test]
    fn caller_may_settle_pending_record() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Successful,
            TransactionStatus::Failed,
        ] {
            assert_eq!(check_status_change(TransactionStatus::Pending, status), Ok(()));
        }
    }

    #[test]
    fn outcome_maps_to_event() {
        assert_eq!(SubmitEvent::from(SubmitOutcome::Accepted), SubmitEvent::Accepted);
        assert_eq!(SubmitEvent::from(SubmitOutcome::Rejected), SubmitEvent::Rejected);
    }
}
