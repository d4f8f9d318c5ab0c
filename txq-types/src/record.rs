//! Transaction records as stored locally.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::TransactionId;

/// Lifecycle status of a transaction record.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Recorded locally, not yet confirmed by the remote
    Pending,
    /// Remote accepted the transaction
    Successful,
    /// Remote rejected the transaction
    Failed,
}

impl TransactionStatus {
    /// Stored text form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transition is allowed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Unknown status text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transaction status: {0:?}")]
pub struct ParseStatusError(pub String);

impl FromStr for TransactionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "successful" => Ok(Self::Successful),
            "failed" => Ok(Self::Failed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A stored transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Store-assigned id
    pub id: TransactionId,
    /// Positive amount, currency implicit
    pub amount: Decimal,
    /// Opaque recipient identifier (e.g. phone number)
    pub counterparty_identifier: String,
    /// Creation time in epoch milliseconds
    pub created_at: i64,
    /// Current lifecycle status
    pub status: TransactionStatus,
}

impl TransactionRecord {
    /// Copy of this record with a different status.
    pub fn with_status(&self, status: TransactionStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

/// Payload for inserting a new record.
///
/// Carries no id and no status: the store assigns the id and always starts
/// the record as [`TransactionStatus::Pending`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Positive amount
    pub amount: Decimal,
    /// Opaque recipient identifier
    pub counterparty_identifier: String,
    /// Creation time in epoch milliseconds
    pub created_at: i64,
}

/// Projection of a record returned by status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// Record id
    pub id: TransactionId,
    /// Amount
    pub amount: Decimal,
    /// Current status
    pub status: TransactionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_roundtrip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Successful,
            TransactionStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<TransactionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_parse_rejects_unknown() {
        let err = "PENDING".parse::<TransactionStatus>().unwrap_err();
        assert_eq!(err, ParseStatusError("PENDING".into()));
    }

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Successful.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
    }

    #[test]
    fn with_status_keeps_other_fields() {
        let record = TransactionRecord {
            id: TransactionId::new(3),
            amount: Decimal::new(1999, 2),
            counterparty_identifier: "+254700000001".into(),
            created_at: 1_700_000_000_000,
            status: TransactionStatus::Pending,
        };

        let settled = record.with_status(TransactionStatus::Successful);
        assert_eq!(settled.id, record.id);
        assert_eq!(settled.amount, record.amount);
        assert_eq!(settled.counterparty_identifier, record.counterparty_identifier);
        assert_eq!(settled.created_at, record.created_at);
        assert_eq!(settled.status, TransactionStatus::Successful);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&TransactionStatus::Successful).unwrap();
        assert_eq!(json, "\"successful\"");
    }
}
