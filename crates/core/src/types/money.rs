//! Monetary amounts as the Storefront API delivers them.
//!
//! Shopify serializes money as a decimal string plus an ISO 4217 currency
//! code. The amount is kept as the original string to preserve precision on
//! the wire; callers that need to do arithmetic parse it into a
//! [`rust_decimal::Decimal`] via [`Money::decimal`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Create a new monetary amount.
    #[must_use]
    pub fn new(amount: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency_code: currency_code.into(),
        }
    }

    /// Parse the amount into a `Decimal`.
    ///
    /// Returns `None` when the amount string is not a valid decimal; callers
    /// treat such values as contributing zero rather than failing.
    #[must_use]
    pub fn decimal(&self) -> Option<Decimal> {
        self.amount.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_parses_wire_amounts() {
        let money = Money::new("19.99", "EUR");
        assert_eq!(money.decimal(), Some(Decimal::new(1999, 2)));
    }

    #[test]
    fn test_decimal_preserves_precision() {
        // No rounding: three decimal places survive the parse
        let money = Money::new("0.125", "EUR");
        assert_eq!(money.decimal(), Some(Decimal::new(125, 3)));
    }

    #[test]
    fn test_malformed_amount_is_none() {
        let money = Money::new("not-a-price", "EUR");
        assert_eq!(money.decimal(), None);
    }
}
