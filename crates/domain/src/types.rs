// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifies a pilot as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PilotId(String);

impl PilotId {
    /// Creates a new `PilotId`.
    ///
    /// # Arguments
    ///
    /// * `value` - The identifier issued by the identity provider
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PilotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a persisted row identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw row identifier.
            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Identifies a flight leg.
    LegId
);
row_id!(
    /// Identifies a PIREP.
    PirepId
);
row_id!(
    /// Identifies a type rating in the catalog.
    TypeRatingId
);

/// An amount of block time, stored in whole minutes.
///
/// Minutes keep accumulated totals exact; hours are derived on demand.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FlightTime(i64);

impl FlightTime {
    /// No flight time.
    pub const ZERO: Self = Self(0);

    /// Creates a flight time from a whole number of minutes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if `minutes` is negative.
    pub fn from_minutes(minutes: i64) -> Result<Self, DomainError> {
        if minutes < 0 {
            return Err(DomainError::InvalidInput {
                field: String::from("flight_time_minutes"),
                reason: String::from("must not be negative"),
            });
        }
        Ok(Self(minutes))
    }

    /// Creates a flight time from hours and minutes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if either component is negative
    /// or the total overflows.
    pub fn from_hours_minutes(hours: i64, minutes: i64) -> Result<Self, DomainError> {
        if hours < 0 {
            return Err(DomainError::InvalidInput {
                field: String::from("flight_time_hours"),
                reason: String::from("must not be negative"),
            });
        }
        if minutes < 0 {
            return Err(DomainError::InvalidInput {
                field: String::from("flight_time_minutes"),
                reason: String::from("must not be negative"),
            });
        }
        hours
            .checked_mul(60)
            .and_then(|m| m.checked_add(minutes))
            .map(Self)
            .ok_or_else(|| DomainError::InvalidInput {
                field: String::from("flight_time_hours"),
                reason: String::from("value is too large"),
            })
    }

    /// Returns the total number of minutes.
    #[must_use]
    pub const fn minutes(&self) -> i64 {
        self.0
    }

    /// Returns the exact number of hours as a decimal.
    #[must_use]
    pub fn hours(&self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(60)
    }

    /// Adds two flight times, saturating at the maximum.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl std::fmt::Display for FlightTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:02}", self.0 / 60, self.0 % 60)
    }
}
