//! # Amounts
//!
//! `Amount` counts the smallest indivisible unit of the settlement currency
//! (for an ether-denominated deployment, wei). Only checked arithmetic is
//! exposed: an overflowing sum is an error, never a wrapped value.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A non-negative quantity of value in base units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from a count of base units.
    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    /// The count of base units.
    pub const fn units(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Add two amounts, failing on overflow.
    pub fn checked_add(self, other: Amount) -> Result<Amount, CoreError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| CoreError::AmountOverflow(format!("{self} + {other}")))
    }

    /// Subtract `other` from `self`, failing if the result would be negative.
    pub fn checked_sub(self, other: Amount) -> Result<Amount, CoreError> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or_else(|| CoreError::AmountOverflow(format!("{self} - {other}")))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_add() {
        let a = Amount::from_units(500);
        let b = Amount::from_units(50);
        assert_eq!(a.checked_add(b).unwrap(), Amount::from_units(550));
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Amount::from_units(u128::MAX);
        assert!(matches!(
            max.checked_add(Amount::from_units(1)),
            Err(CoreError::AmountOverflow(_))
        ));
    }

    #[test]
    fn test_checked_sub_underflow() {
        let a = Amount::from_units(1);
        assert!(a.checked_sub(Amount::from_units(2)).is_err());
        assert_eq!(a.checked_sub(a).unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_zero() {
        assert!(Amount::ZERO.is_zero());
        assert!(!Amount::from_units(1).is_zero());
        assert_eq!(Amount::default(), Amount::ZERO);
    }

    #[test]
    fn test_serde_as_integer() {
        let a = Amount::from_units(550_000_000_000_000_000);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "550000000000000000");
        let parsed: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, a);
    }
}
