//! # Monetary Amounts
//!
//! `Amount` wraps an unsigned integer count of minor currency units
//! (cents, wei-scaled units — the engine does not care which). All
//! arithmetic is checked; there is no floating point anywhere in the
//! money path, and no silent wrap-around.

use serde::{Deserialize, Serialize};

use crate::error::EscrowError;

/// A quantity of value in minor currency units.
///
/// Addition and subtraction are checked: overflow and underflow surface as
/// [`EscrowError::AmountOverflow`] rather than wrapping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Zero value.
    pub const ZERO: Amount = Amount(0);

    /// Construct from a count of minor units.
    pub const fn new(minor_units: u64) -> Self {
        Self(minor_units)
    }

    /// The raw count of minor units.
    pub const fn minor_units(&self) -> u64 {
        self.0
    }

    /// Whether this amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::AmountOverflow`] on overflow.
    pub fn checked_add(self, other: Amount) -> Result<Amount, EscrowError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| EscrowError::AmountOverflow(format!("adding {other} to {self}")))
    }

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::AmountOverflow`] if `other` exceeds `self`.
    pub fn checked_sub(self, other: Amount) -> Result<Amount, EscrowError> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or_else(|| EscrowError::AmountOverflow(format!("subtracting {other} from {self}")))
    }

    /// Sum an iterator of amounts with overflow checking.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::AmountOverflow`] if the total exceeds `u64::MAX`.
    pub fn checked_sum<I: IntoIterator<Item = Amount>>(amounts: I) -> Result<Amount, EscrowError> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(a))
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
    use proptest::prelude::*;

    #[test]
    fn zero_is_zero() {
        assert!(Amount::ZERO.is_zero());
        assert!(!Amount::new(1).is_zero());
    }

    #[test]
    fn checked_add_basic() {
        let sum = Amount::new(1_000).checked_add(Amount::new(2_000)).unwrap();
        assert_eq!(sum, Amount::new(3_000));
    }

    #[test]
    fn checked_add_overflow() {
        assert!(Amount::new(u64::MAX).checked_add(Amount::new(1)).is_err());
    }

    #[test]
    fn checked_sub_basic() {
        let diff = Amount::new(3_000).checked_sub(Amount::new(1_000)).unwrap();
        assert_eq!(diff, Amount::new(2_000));
    }

    #[test]
    fn checked_sub_underflow() {
        assert!(Amount::new(1).checked_sub(Amount::new(2)).is_err());
    }

    #[test]
    fn checked_sum_of_milestone_split() {
        let parts = [Amount::new(1_000), Amount::new(1_000), Amount::new(1_000)];
        assert_eq!(Amount::checked_sum(parts).unwrap(), Amount::new(3_000));
    }

    #[test]
    fn checked_sum_empty_is_zero() {
        assert_eq!(Amount::checked_sum([]).unwrap(), Amount::ZERO);
    }

    #[test]
    fn ordering_follows_minor_units() {
        assert!(Amount::new(1) < Amount::new(2));
    }

    #[test]
    fn serde_is_transparent() {
        let json = serde_json::to_string(&Amount::new(2500)).unwrap();
        assert_eq!(json, "2500");
        let parsed: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Amount::new(2500));
    }

    proptest! {
        #[test]
        fn add_then_sub_roundtrips(a in 0u64..=u64::MAX / 2, b in 0u64..=u64::MAX / 2) {
            let total = Amount::new(a).checked_add(Amount::new(b)).unwrap();
            prop_assert_eq!(total.checked_sub(Amount::new(b)).unwrap(), Amount::new(a));
        }

        #[test]
        fn sum_is_order_independent(mut parts in proptest::collection::vec(0u64..1_000_000u64, 1..16)) {
            let forward = Amount::checked_sum(parts.iter().copied().map(Amount::new)).unwrap();
            parts.reverse();
            let backward = Amount::checked_sum(parts.iter().copied().map(Amount::new)).unwrap();
            prop_assert_eq!(forward, backward);
        }
    }
}
