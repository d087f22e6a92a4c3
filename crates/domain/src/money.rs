// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Currency amounts.
//!
//! The career currency is virtual and has no external settlement. Amounts
//! are exact decimals held at two places; every construction path rounds
//! half away from zero so stored values never carry sub-cent noise.

use crate::error::DomainError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Number of decimal places carried by every monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// A monetary amount rounded to two decimal places.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, MONEY_SCALE));

    /// Rounds an arbitrary decimal to a monetary amount.
    #[must_use]
    pub fn from_decimal(value: Decimal) -> Self {
        let mut rounded: Decimal =
            value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(MONEY_SCALE);
        Self(rounded)
    }

    /// Creates an amount from a whole number of currency units.
    #[must_use]
    pub fn units(value: i64) -> Self {
        Self::from_decimal(Decimal::from(value))
    }

    /// Creates an amount from a number of hundredths.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, MONEY_SCALE))
    }

    /// Returns the underlying decimal.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Subtracts `other`, returning `None` if the result would be negative.
    #[must_use]
    pub fn checked_debit(self, other: Self) -> Option<Self> {
        let result: Decimal = self.0.checked_sub(other.0)?;
        if result < Decimal::ZERO {
            None
        } else {
            Some(Self::from_decimal(result))
        }
    }

    /// Validates that the amount is not negative.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` naming `field` if the amount is negative.
    pub fn require_non_negative(self, field: &str) -> Result<Self, DomainError> {
        if self.is_negative() {
            return Err(DomainError::InvalidInput {
                field: field.to_string(),
                reason: String::from("must not be negative"),
            });
        }
        Ok(self)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_decimal(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_decimal(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, m| acc + m)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self::from_decimal)
            .map_err(|e| DomainError::InvalidInput {
                field: String::from("amount"),
                reason: format!("'{s}' is not a decimal amount: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(Decimal::new(12345, 3)), Money::from_cents(1235));
        assert_eq!(Money::from_decimal(Decimal::new(12344, 3)), Money::from_cents(1234));
        assert_eq!(
            Money::from_decimal(Decimal::new(-12345, 3)),
            Money::from_cents(-1235)
        );
    }

    #[test]
    fn test_display_always_two_places() {
        assert_eq!(Money::units(510).to_string(), "510.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn test_checked_debit_refuses_overdraft() {
        let balance: Money = Money::units(15_000);
        assert_eq!(balance.checked_debit(Money::units(20_000)), None);
        assert_eq!(
            balance.checked_debit(Money::units(15_000)),
            Some(Money::ZERO)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::from_str("12.5").is_ok());
        assert!(Money::from_str("twelve").is_err());
    }

    #[test]
    fn test_zero_is_not_negative() {
        assert!(!Money::ZERO.is_negative());
        assert!(!Money::from_decimal(Decimal::new(-1, 4)).is_negative());
        assert!(Money::from_cents(-1).is_negative());
    }
}
