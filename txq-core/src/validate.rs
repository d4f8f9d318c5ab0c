//! Create-time validation.

use txq_types::{Decimal, NewTransaction, ValidationError};

/// Check caller input and build the insert payload.
///
/// The amount is kept exactly as given; nothing is rounded or clamped.
/// The counterparty identifier is opaque and stored verbatim, but one made
/// only of whitespace counts as empty.
pub fn validate_new(
    amount: Decimal,
    counterparty_identifier: &str,
    created_at: i64,
) -> Result<NewTransaction, ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    if counterparty_identifier.trim().is_empty() {
        return Err(ValidationError::EmptyCounterparty);
    }

    Ok(NewTransaction {
        amount,
        counterparty_identifier: counterparty_identifier.to_string(),
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_amount_and_counterparty() {
        let new = validate_new(Decimal::new(1, 2), "+254700000001", 10).unwrap();
        assert_eq!(new.amount, Decimal::new(1, 2));
        assert_eq!(new.counterparty_identifier, "+254700000001");
        assert_eq!(new.created_at, 10);
    }

    #[test]
    fn rejects_zero_amount() {
        assert_eq!(
            validate_new(Decimal::ZERO, "+1", 0),
            Err(ValidationError::NonPositiveAmount(Decimal::ZERO))
        );
    }

    #[test]
    fn rejects_negative_amount() {
        let amount = Decimal::new(-5, 0);
        assert_eq!(
            validate_new(amount, "+1", 0),
            Err(ValidationError::NonPositiveAmount(amount))
        );
    }

    #[test]
    fn rejects_blank_counterparty() {
        assert_eq!(
            validate_new(Decimal::ONE, "", 0),
            Err(ValidationError::EmptyCounterparty)
        );
        assert_eq!(
            validate_new(Decimal::ONE, "   ", 0),
            Err(ValidationError::EmptyCounterparty)
        );
    }

    #[test]
    fn keeps_amount_scale() {
        let amount: Decimal = "10.500".parse().unwrap();
        let new = validate_new(amount, "+1", 0).unwrap();
        assert_eq!(new.amount.to_string(), "10.500");
    }
}
