//! Monetary amounts in integer minor units.
//!
//! Balances and transfer amounts are `i64` cents wrapped in [`Amount`], which
//! can never hold a negative value. All arithmetic is checked: an operation
//! that would overflow or drive a value negative returns an error instead of
//! wrapping, so rounding drift and silent underflow cannot occur no matter how
//! many debit/credit cycles a balance goes through.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative monetary amount in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Create an amount from minor units.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Negative` for negative input.
    pub const fn from_cents(cents: i64) -> Result<Self, MoneyError> {
        if cents < 0 {
            return Err(MoneyError::Negative(cents));
        }
        Ok(Self(cents))
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add another amount.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the sum exceeds `i64::MAX`.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Subtract another amount.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Underflow` if the result would be negative. This
    /// is the primitive behind every insufficient-funds check.
    pub fn checked_sub(self, other: Self) -> Result<Self, MoneyError> {
        if other.0 > self.0 {
            return Err(MoneyError::Underflow {
                balance: self.0,
                required: other.0,
            });
        }
        Ok(Self(self.0 - other.0))
    }
}

impl TryFrom<i64> for Amount {
    type Error = MoneyError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_cents(value)
    }
}

impl From<Amount> for i64 {
    fn from(a: Amount) -> Self {
        a.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Errors that can occur in monetary arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// A negative value was supplied where an amount is required.
    #[error("amount must not be negative: {0}")]
    Negative(i64),

    /// Addition overflowed the minor-unit range.
    #[error("amount overflow")]
    Overflow,

    /// Subtraction would drive the value negative.
    #[error("insufficient amount: balance={balance}, required={required}")]
    Underflow {
        /// The value being subtracted from, in minor units.
        balance: i64,
        /// The value being subtracted, in minor units.
        required: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cents_rejects_negative() {
        assert_eq!(Amount::from_cents(-1), Err(MoneyError::Negative(-1)));
    }

    #[test]
    fn checked_sub_underflow() {
        let balance = Amount::from_cents(100).unwrap();
        let amount = Amount::from_cents(300).unwrap();
        assert_eq!(
            balance.checked_sub(amount),
            Err(MoneyError::Underflow {
                balance: 100,
                required: 300
            })
        );
    }

    #[test]
    fn checked_sub_exact_balance_leaves_zero() {
        let balance = Amount::from_cents(300).unwrap();
        let amount = Amount::from_cents(300).unwrap();
        assert_eq!(balance.checked_sub(amount).unwrap(), Amount::ZERO);
    }

    #[test]
    fn checked_add_overflow() {
        let a = Amount::from_cents(i64::MAX).unwrap();
        assert_eq!(
            a.checked_add(Amount::from_cents(1).unwrap()),
            Err(MoneyError::Overflow)
        );
    }

    #[test]
    fn serde_rejects_negative_wire_value() {
        let result: Result<Amount, _> = serde_json::from_str("-500");
        assert!(result.is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let a = Amount::from_cents(1050).unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "1050");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }

    #[test]
    fn display_formats_minor_units() {
        assert_eq!(Amount::from_cents(1050).unwrap().to_string(), "10.50");
        assert_eq!(Amount::from_cents(7).unwrap().to_string(), "0.07");
    }
}
