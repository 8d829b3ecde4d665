//! Two-decimal fixed-point monetary amounts.
//!
//! Balances and charges are stored in the smallest unit (cents) as `i64`, so
//! two-decimal arithmetic is exact. Floating point never touches money.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A monetary amount in cents.
///
/// `Money` itself may be negative (it is also used for deltas); the
/// non-negative balance invariant is enforced by the account entity, not here.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Whole currency units, e.g. `Money::from_major(300)` is 300.00.
    pub const fn from_major(units: i64) -> Self {
        Self(units * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Require a strictly positive amount (purchase/funding contract).
    pub fn require_positive(self, what: &str) -> DomainResult<Money> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(DomainError::validation(format!("{what} must be positive")))
        }
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Money::from_cents(30000).to_string(), "300.00");
        assert_eq!(Money::from_cents(505).to_string(), "5.05");
        assert_eq!(Money::from_cents(-150).to_string(), "-1.50");
    }

    #[test]
    fn from_major_scales_to_cents() {
        assert_eq!(Money::from_major(500), Money::from_cents(50000));
    }

    #[test]
    fn checked_sub_detects_overflow() {
        assert_eq!(
            Money::from_cents(500).checked_sub(Money::from_cents(300)),
            Some(Money::from_cents(200))
        );
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
    }

    #[test]
    fn require_positive_rejects_zero_and_negative() {
        assert!(Money::ZERO.require_positive("amount").is_err());
        assert!(Money::from_cents(-1).require_positive("amount").is_err());
        assert!(Money::from_cents(1).require_positive("amount").is_ok());
    }
}
