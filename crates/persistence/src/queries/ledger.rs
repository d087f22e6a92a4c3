// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Purchase ledger, balance verification and fleet totals.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, warn};
use va_career_domain::{FleetAnalytics, FlightTime, Money, PilotId, PirepStatus, TypeRatingId};

use crate::data_models::{PurchaseRow, parse_money, parse_timestamp};
use crate::diesel_schema::{pilot_profiles, pireps, type_rating_purchases};
use crate::error::PersistenceError;

/// One entry of a pilot's purchase ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRecord {
    /// Ledger row id.
    pub purchase_id: i64,
    /// The rating bought; `None` once it has been deleted from the catalog.
    pub type_rating_id: Option<TypeRatingId>,
    /// The rating's type name at purchase time.
    pub type_name: String,
    /// The price debited.
    pub price: Money,
    /// When the purchase happened.
    pub purchased_at: OffsetDateTime,
}

impl TryFrom<PurchaseRow> for PurchaseRecord {
    type Error = PersistenceError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            purchase_id: row.purchase_id,
            type_rating_id: row.type_rating_id.map(TypeRatingId::new),
            type_name: row.type_name,
            price: parse_money("price", &row.price)?,
            purchased_at: parse_timestamp(&row.purchased_at)?,
        })
    }
}

/// The outcome of reconciling a pilot's balance against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCheck {
    /// The pilot checked.
    pub pilot_id: PilotId,
    /// The balance stored on the profile.
    pub stored_balance: Money,
    /// Sum of approved report grand totals.
    pub approved_earnings: Money,
    /// Sum of purchase prices paid.
    pub purchases: Money,
    /// `approved_earnings - purchases`.
    pub expected_balance: Money,
}

impl LedgerCheck {
    /// Returns true if the stored balance matches the ledger.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.stored_balance == self.expected_balance
    }
}

/// Lists a pilot's purchases, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be parsed.
pub fn list_purchases(
    conn: &mut SqliteConnection,
    pilot_id: &PilotId,
) -> Result<Vec<PurchaseRecord>, PersistenceError> {
    let rows: Vec<PurchaseRow> = type_rating_purchases::table
        .filter(type_rating_purchases::pilot_id.eq(pilot_id.value()))
        .select(PurchaseRow::as_select())
        .order(type_rating_purchases::purchase_id.asc())
        .load::<PurchaseRow>(conn)?;
    rows.into_iter().map(PurchaseRecord::try_from).collect()
}

fn sum_money(column: &str, values: &[String]) -> Result<Money, PersistenceError> {
    values
        .iter()
        .map(|v| parse_money(column, v))
        .sum::<Result<Money, PersistenceError>>()
}

/// Recomputes a pilot's balance from approved reports and purchases.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the pilot has no profile, or
/// another error if a query fails.
pub fn verify_ledger(
    conn: &mut SqliteConnection,
    pilot_id: &PilotId,
) -> Result<LedgerCheck, PersistenceError> {
    let balance: String = pilot_profiles::table
        .filter(pilot_profiles::pilot_id.eq(pilot_id.value()))
        .select(pilot_profiles::balance)
        .first::<String>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("pilot profile {pilot_id}")))?;

    let earnings: Vec<String> = pireps::table
        .filter(pireps::pilot_id.eq(pilot_id.value()))
        .filter(pireps::status.eq(PirepStatus::Approved.as_str()))
        .select(pireps::grand_total)
        .load::<String>(conn)?;
    let prices: Vec<String> = type_rating_purchases::table
        .filter(type_rating_purchases::pilot_id.eq(pilot_id.value()))
        .select(type_rating_purchases::price)
        .load::<String>(conn)?;

    let approved_earnings: Money = sum_money("grand_total", &earnings)?;
    let purchases: Money = sum_money("price", &prices)?;
    let check: LedgerCheck = LedgerCheck {
        pilot_id: pilot_id.clone(),
        stored_balance: parse_money("balance", &balance)?,
        approved_earnings,
        purchases,
        expected_balance: approved_earnings - purchases,
    };

    if check.is_consistent() {
        debug!(pilot = %pilot_id, balance = %check.stored_balance, "Ledger verified");
    } else {
        warn!(
            pilot = %pilot_id,
            stored = %check.stored_balance,
            expected = %check.expected_balance,
            "Ledger mismatch"
        );
    }
    Ok(check)
}

/// Computes fleet-wide career totals.
///
/// # Errors
///
/// Returns an error if a query fails or a stored value cannot be parsed.
pub fn fleet_analytics(conn: &mut SqliteConnection) -> Result<FleetAnalytics, PersistenceError> {
    let total_pilots: i64 = pilot_profiles::table.count().get_result(conn)?;
    let approved_pilots: i64 = pilot_profiles::table
        .filter(pilot_profiles::career_approved.ne(0))
        .count()
        .get_result(conn)?;

    let statuses: Vec<String> = pireps::table.select(pireps::status).load::<String>(conn)?;
    let count_status = |status: PirepStatus| -> i64 {
        let matching: usize = statuses.iter().filter(|s| *s == status.as_str()).count();
        i64::try_from(matching).unwrap_or(i64::MAX)
    };

    let approved: Vec<(String, i64, i64)> = pireps::table
        .filter(pireps::status.eq(PirepStatus::Approved.as_str()))
        .select((
            pireps::grand_total,
            pireps::flight_time_hours,
            pireps::flight_time_minutes,
        ))
        .load::<(String, i64, i64)>(conn)?;

    let mut total_earnings: Money = Money::ZERO;
    let mut total_minutes: i64 = 0;
    for (grand_total, hours, minutes) in &approved {
        total_earnings += parse_money("grand_total", grand_total)?;
        total_minutes = total_minutes.saturating_add(hours.saturating_mul(60) + minutes);
    }
    let total_flight_time: FlightTime = FlightTime::from_minutes(total_minutes)
        .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;

    Ok(FleetAnalytics {
        total_pilots,
        approved_pilots,
        total_pireps: i64::try_from(statuses.len()).unwrap_or(i64::MAX),
        pending_pireps: count_status(PirepStatus::Pending),
        approved_pireps: count_status(PirepStatus::Approved),
        rejected_pireps: count_status(PirepStatus::Rejected),
        total_earnings,
        total_flight_time,
    })
}
