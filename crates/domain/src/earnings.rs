// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Earnings calculation for a single flight.
//!
//! This is a pure function of the pay rate in force when the report was
//! filed and the raw performance figures the pilot entered. It performs no
//! I/O and can be re-run at any time against a stored report to reproduce
//! its breakdown exactly.
//!
//! ```text
//! total_hours   = hours + minutes / 60
//! base          = base_rate * total_hours
//! flight        = base * multiplier
//! payload_bonus = passengers * 1 + cargo_kg * 0.1
//! gross         = flight + payload_bonus
//! deductions    = gross * 0.15
//! grand_total   = gross - deductions
//! ```
//!
//! Every monetary output is rounded independently from the unrounded
//! intermediate values, so `gross - deductions` may differ from
//! `grand_total` by one hundredth.

use crate::error::DomainError;
use crate::money::Money;
use crate::types::FlightTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Bonus paid per passenger carried.
pub const PASSENGER_BONUS: Decimal = Decimal::ONE;

/// Bonus paid per kilogram of cargo carried (0.1).
pub const CARGO_BONUS_PER_KG: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Flat deduction applied to gross earnings (15%).
pub const DEDUCTION_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Decimal places kept on the reported total hours.
const HOURS_SCALE: u32 = 4;

/// The pay terms of a type rating captured at filing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRate {
    /// Hourly base rate.
    pub base_rate: Money,
    /// Multiplier applied to the base earnings.
    pub multiplier: Decimal,
}

impl PayRate {
    /// Creates a pay rate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if either value is negative.
    pub fn new(base_rate: Money, multiplier: Decimal) -> Result<Self, DomainError> {
        base_rate.require_non_negative("base_rate")?;
        if multiplier.is_sign_negative() && !multiplier.is_zero() {
            return Err(DomainError::InvalidInput {
                field: String::from("multiplier"),
                reason: String::from("must not be negative"),
            });
        }
        Ok(Self {
            base_rate,
            multiplier,
        })
    }
}

/// Raw performance figures entered by the pilot.
///
/// Missing fields default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightReportInputs {
    /// Whole hours of block time.
    pub flight_time_hours: i64,
    /// Additional minutes of block time.
    pub flight_time_minutes: i64,
    /// Passengers carried.
    pub passengers: i64,
    /// Cargo carried, in kilograms.
    pub cargo_kg: Decimal,
    /// Fuel burned, in kilograms. Recorded only; does not affect pay.
    pub fuel_used_kg: Decimal,
}

impl FlightReportInputs {
    /// Validates that no figure is negative and the block time fits in
    /// whole minutes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        let integers: [(&str, i64); 3] = [
            ("flight_time_hours", self.flight_time_hours),
            ("flight_time_minutes", self.flight_time_minutes),
            ("passengers", self.passengers),
        ];
        for (field, value) in integers {
            if value < 0 {
                return Err(negative(field));
            }
        }

        let decimals: [(&str, Decimal); 2] = [
            ("cargo_kg", self.cargo_kg),
            ("fuel_used_kg", self.fuel_used_kg),
        ];
        for (field, value) in decimals {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(negative(field));
            }
        }

        self.flight_time()?;
        Ok(())
    }

    /// Returns the block time as a `FlightTime`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if hours or minutes are negative.
    pub fn flight_time(&self) -> Result<FlightTime, DomainError> {
        FlightTime::from_hours_minutes(self.flight_time_hours, self.flight_time_minutes)
    }
}

/// The monetary result of a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsBreakdown {
    /// Block time in hours, rounded to four places for display.
    pub total_hours: Decimal,
    /// Base rate times hours.
    pub base_earnings: Money,
    /// Base earnings after the multiplier.
    pub flight_earnings: Money,
    /// Passenger and cargo bonus.
    pub payload_bonus: Money,
    /// Flight earnings plus payload bonus.
    pub gross: Money,
    /// Flat deduction on gross.
    pub deductions: Money,
    /// Amount credited to the pilot on approval.
    pub grand_total: Money,
}

/// Computes the earnings for one flight.
///
/// # Arguments
///
/// * `rate` - The pay rate snapshotted at filing time
/// * `inputs` - The pilot's raw performance figures
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` if any input is negative or the
/// arithmetic overflows.
pub fn calculate_earnings(
    rate: &PayRate,
    inputs: &FlightReportInputs,
) -> Result<EarningsBreakdown, DomainError> {
    inputs.validate()?;
    PayRate::new(rate.base_rate, rate.multiplier)?;

    let minutes_as_hours: Decimal = Decimal::from(inputs.flight_time_minutes) / Decimal::from(60);
    let total_hours: Decimal = overflow_guard(
        Decimal::from(inputs.flight_time_hours).checked_add(minutes_as_hours),
        "flight_time_hours",
    )?;

    let base: Decimal = overflow_guard(
        rate.base_rate.value().checked_mul(total_hours),
        "base_rate",
    )?;
    let flight: Decimal = overflow_guard(base.checked_mul(rate.multiplier), "multiplier")?;

    let passenger_bonus: Decimal = overflow_guard(
        Decimal::from(inputs.passengers).checked_mul(PASSENGER_BONUS),
        "passengers",
    )?;
    let cargo_bonus: Decimal =
        overflow_guard(inputs.cargo_kg.checked_mul(CARGO_BONUS_PER_KG), "cargo_kg")?;
    let payload: Decimal = overflow_guard(passenger_bonus.checked_add(cargo_bonus), "cargo_kg")?;

    let gross: Decimal = overflow_guard(flight.checked_add(payload), "gross")?;
    let deductions: Decimal = overflow_guard(gross.checked_mul(DEDUCTION_RATE), "gross")?;
    let grand_total: Decimal = overflow_guard(gross.checked_sub(deductions), "gross")?;

    Ok(EarningsBreakdown {
        total_hours: total_hours
            .round_dp_with_strategy(HOURS_SCALE, RoundingStrategy::MidpointAwayFromZero)
            .normalize(),
        base_earnings: Money::from_decimal(base),
        flight_earnings: Money::from_decimal(flight),
        payload_bonus: Money::from_decimal(payload),
        gross: Money::from_decimal(gross),
        deductions: Money::from_decimal(deductions),
        grand_total: Money::from_decimal(grand_total),
    })
}

fn negative(field: &str) -> DomainError {
    DomainError::InvalidInput {
        field: field.to_string(),
        reason: String::from("must not be negative"),
    }
}

fn overflow_guard(value: Option<Decimal>, field: &str) -> Result<Decimal, DomainError> {
    value.ok_or_else(|| DomainError::InvalidInput {
        field: field.to_string(),
        reason: String::from("value is too large"),
    })
}
