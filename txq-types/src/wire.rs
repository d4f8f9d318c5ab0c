//! Wire format for the remote transactions endpoint.
//!
//! One JSON request/response exchange per transaction:
//!
//! ```text
//! POST /api/transactions
//! {"amount": 12.5, "phoneNumber": "+254700000001", "timestamp": 1700000000000}
//!
//! 200 OK
//! {"success": true}
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::TransactionRecord;

/// Path of the transactions endpoint, relative to the configured base URL.
pub const TRANSACTIONS_PATH: &str = "/api/transactions";

/// Request body for submitting one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    /// Amount, sent as a JSON number
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Counterparty identifier
    pub phone_number: String,
    /// Creation time in epoch milliseconds
    pub timestamp: i64,
}

impl From<&TransactionRecord> for SubmitRequest {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            amount: record.amount,
            phone_number: record.counterparty_identifier.clone(),
            timestamp: record.created_at,
        }
    }
}

/// Response body from the transactions endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Whether the remote accepted the transaction
    pub success: bool,
}

/// Result of a submission the remote actually answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitOutcome {
    /// Remote reported success
    Accepted,
    /// Remote responded but reported failure
    Rejected,
}

impl From<SubmitResponse> for SubmitOutcome {
    fn from(response: SubmitResponse) -> Self {
        if response.success {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TransactionId, TransactionStatus};

    #[test]
    fn request_uses_wire_field_names() {
        let request = SubmitRequest {
            amount: Decimal::new(1250, 2),
            phone_number: "+254700000001".into(),
            timestamp: 1_700_000_000_000,
        };

        let value: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["amount"], serde_json::json!(12.5));
        assert_eq!(value["phoneNumber"], "+254700000001");
        assert_eq!(value["timestamp"], 1_700_000_000_000i64);
    }

    #[test]
    fn request_carries_record_counterparty_and_timestamp() {
        let record = TransactionRecord {
            id: TransactionId::new(9),
            amount: Decimal::new(500, 0),
            counterparty_identifier: "+15550100".into(),
            created_at: 1_699_999_999_123,
            status: TransactionStatus::Pending,
        };

        let request = SubmitRequest::from(&record);
        assert_eq!(request.phone_number, "+15550100");
        assert_eq!(request.timestamp, 1_699_999_999_123);
        assert_eq!(request.amount, Decimal::new(500, 0));
    }

    #[test]
    fn response_maps_to_outcome() {
        let ok: SubmitResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        let no: SubmitResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(SubmitOutcome::from(ok), SubmitOutcome::Accepted);
        assert_eq!(SubmitOutcome::from(no), SubmitOutcome::Rejected);
    }

    #[test]
    fn response_without_success_field_is_an_error() {
        let parsed = serde_json::from_str::<SubmitResponse>(r#"{"ok":true}"#);
        assert!(parsed.is_err());
    }
}
