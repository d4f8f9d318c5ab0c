//! Error types for caller input.

use rust_decimal::Decimal;
use thiserror::Error;

/// Rejected caller input for a new transaction.
///
/// Returned before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Amount was zero or negative
    #[error("amount must be strictly positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Counterparty identifier was empty or whitespace
    #[error("counterparty identifier must not be empty")]
    EmptyCounterparty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::NonPositiveAmount(Decimal::new(-150, 2));
        assert_eq!(err.to_string(), "amount must be strictly positive, got -1.50");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ValidationError>();
    }
}
