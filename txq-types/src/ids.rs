//! Identity types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier of a transaction record.
///
/// Monotonic and never reused within one store, even after deletion.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(i64);

impl TransactionId {
    /// Wrap a raw id.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw id.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TransactionId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_ordering() {
        assert!(TransactionId::new(1) < TransactionId::new(2));
    }

    #[test]
    fn id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&TransactionId::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn id_debug_and_display() {
        let id = TransactionId::from(7);
        assert_eq!(id.to_string(), "7");
        assert_eq!(format!("{:?}", id), "TransactionId(7)");
    }
}
