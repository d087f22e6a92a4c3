// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row-level writers shared by the transition and catalog orchestrators.
//!
//! Every update and delete of a versioned row is a compare-and-set on the
//! version the caller loaded. A write that matches no row returns
//! `PersistenceError::Conflict` and the surrounding transaction rolls back.

use diesel::SqliteConnection;
use diesel::prelude::*;
use va_career::RatingPurchase;
use va_career_domain::{
    FlightLeg, LegId, PilotProfile, Pirep, PirepId, StatsAggregate, TypeRating, TypeRatingId,
    TypeRatingSpec,
};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{
    CareerStatsValues, FlightLegValues, NewPurchase, PilotProfileValues, PirepValues,
    RouteHistoryRow, TypeRatingValues, format_timestamp,
};
use crate::diesel_schema::{
    career_stats, flight_legs, pilot_profiles, pireps, route_history, type_rating_purchases,
    type_ratings,
};
use crate::error::PersistenceError;

fn require_row(
    affected: usize,
    entity: &'static str,
    id: impl std::fmt::Display,
) -> Result<(), PersistenceError> {
    if affected == 0 {
        return Err(PersistenceError::conflict(entity, id));
    }
    Ok(())
}

fn require_id<T: Copy>(id: Option<T>, entity: &'static str) -> Result<T, PersistenceError> {
    id.ok_or_else(|| PersistenceError::NotFound(format!("unsaved {entity}")))
}

// ============================================================================
// Pilot profiles and statistics
// ============================================================================

/// Overwrites a profile if its version is unchanged.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the stored version differs.
pub fn update_profile(
    conn: &mut SqliteConnection,
    profile: &PilotProfile,
) -> Result<(), PersistenceError> {
    let values: PilotProfileValues = PilotProfileValues::from(profile);
    let affected: usize = diesel::update(
        pilot_profiles::table
            .filter(pilot_profiles::pilot_id.eq(profile.pilot_id.value()))
            .filter(pilot_profiles::version.eq(profile.version)),
    )
    .set((&values, pilot_profiles::version.eq(profile.version + 1)))
    .execute(conn)?;
    require_row(affected, "pilot profile", &profile.pilot_id)
}

/// Overwrites a statistics aggregate and replaces its route history.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the stored version differs.
pub fn update_stats(
    conn: &mut SqliteConnection,
    stats: &StatsAggregate,
) -> Result<(), PersistenceError> {
    let pilot_id: &str = stats.pilot_id.value();
    let values: CareerStatsValues = CareerStatsValues::from(stats);
    let affected: usize = diesel::update(
        career_stats::table
            .filter(career_stats::pilot_id.eq(pilot_id))
            .filter(career_stats::version.eq(stats.version)),
    )
    .set((&values, career_stats::version.eq(stats.version + 1)))
    .execute(conn)?;
    require_row(affected, "career stats", &stats.pilot_id)?;

    diesel::delete(route_history::table.filter(route_history::pilot_id.eq(pilot_id)))
        .execute(conn)?;
    let rows: Vec<RouteHistoryRow> = stats
        .routes
        .iter()
        .map(|entry| RouteHistoryRow::from_domain(&stats.pilot_id, entry))
        .collect::<Result<Vec<RouteHistoryRow>, PersistenceError>>()?;
    if !rows.is_empty() {
        diesel::insert_into(route_history::table)
            .values(&rows)
            .execute(conn)?;
    }
    Ok(())
}

/// Appends a purchase to the ledger.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_purchase(
    conn: &mut SqliteConnection,
    purchase: &RatingPurchase,
) -> Result<i64, PersistenceError> {
    let row: NewPurchase = NewPurchase {
        pilot_id: purchase.pilot_id.value().to_string(),
        type_rating_id: Some(purchase.type_rating_id.value()),
        type_name: purchase.type_name.clone(),
        price: purchase.price.to_string(),
        purchased_at: format_timestamp(purchase.purchased_at)?,
    };
    diesel::insert_into(type_rating_purchases::table)
        .values(&row)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

// ============================================================================
// Flight legs
// ============================================================================

/// Inserts a new leg and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_leg(conn: &mut SqliteConnection, leg: &FlightLeg) -> Result<LegId, PersistenceError> {
    let values: FlightLegValues = FlightLegValues::try_from(leg)?;
    diesel::insert_into(flight_legs::table)
        .values(&values)
        .execute(conn)?;
    Ok(LegId::new(get_last_insert_rowid(conn)?))
}

/// Overwrites a leg if its version is unchanged.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the stored version differs.
pub fn update_leg(conn: &mut SqliteConnection, leg: &FlightLeg) -> Result<(), PersistenceError> {
    let leg_id: LegId = require_id(leg.leg_id, "flight leg")?;
    let values: FlightLegValues = FlightLegValues::try_from(leg)?;
    let affected: usize = diesel::update(
        flight_legs::table
            .filter(flight_legs::leg_id.eq(leg_id.value()))
            .filter(flight_legs::version.eq(leg.version)),
    )
    .set((&values, flight_legs::version.eq(leg.version + 1)))
    .execute(conn)?;
    require_row(affected, "flight leg", leg_id)
}

/// Bumps a leg's version without changing it.
///
/// Filing a report claims the leg this way so two reports built from the
/// same snapshot cannot both commit.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the stored version differs.
pub fn claim_leg(conn: &mut SqliteConnection, leg: &FlightLeg) -> Result<(), PersistenceError> {
    let leg_id: LegId = require_id(leg.leg_id, "flight leg")?;
    let affected: usize = diesel::update(
        flight_legs::table
            .filter(flight_legs::leg_id.eq(leg_id.value()))
            .filter(flight_legs::version.eq(leg.version)),
    )
    .set(flight_legs::version.eq(leg.version + 1))
    .execute(conn)?;
    require_row(affected, "flight leg", leg_id)
}

/// Deletes a leg if its version is unchanged.
///
/// Reports filed against it keep their snapshot and lose the link.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the stored version differs.
pub fn delete_leg(conn: &mut SqliteConnection, leg: &FlightLeg) -> Result<(), PersistenceError> {
    let leg_id: LegId = require_id(leg.leg_id, "flight leg")?;
    let affected: usize = diesel::delete(
        flight_legs::table
            .filter(flight_legs::leg_id.eq(leg_id.value()))
            .filter(flight_legs::version.eq(leg.version)),
    )
    .execute(conn)?;
    require_row(affected, "flight leg", leg_id)
}

// ============================================================================
// PIREPs
// ============================================================================

/// Inserts a new report and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_pirep(
    conn: &mut SqliteConnection,
    pirep: &Pirep,
) -> Result<PirepId, PersistenceError> {
    let values: PirepValues = PirepValues::try_from(pirep)?;
    diesel::insert_into(pireps::table)
        .values(&values)
        .execute(conn)?;
    Ok(PirepId::new(get_last_insert_rowid(conn)?))
}

/// Overwrites a report if its version is unchanged.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the stored version differs.
pub fn update_pirep(conn: &mut SqliteConnection, pirep: &Pirep) -> Result<(), PersistenceError> {
    let pirep_id: PirepId = require_id(pirep.pirep_id, "PIREP")?;
    let values: PirepValues = PirepValues::try_from(pirep)?;
    let affected: usize = diesel::update(
        pireps::table
            .filter(pireps::pirep_id.eq(pirep_id.value()))
            .filter(pireps::version.eq(pirep.version)),
    )
    .set((&values, pireps::version.eq(pirep.version + 1)))
    .execute(conn)?;
    require_row(affected, "PIREP", pirep_id)
}

/// Deletes a report if its version is unchanged.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the stored version differs.
pub fn delete_pirep(conn: &mut SqliteConnection, pirep: &Pirep) -> Result<(), PersistenceError> {
    let pirep_id: PirepId = require_id(pirep.pirep_id, "PIREP")?;
    let affected: usize = diesel::delete(
        pireps::table
            .filter(pireps::pirep_id.eq(pirep_id.value()))
            .filter(pireps::version.eq(pirep.version)),
    )
    .execute(conn)?;
    require_row(affected, "PIREP", pirep_id)
}

// ============================================================================
// Type ratings
// ============================================================================

/// Inserts a new rating and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails, including a type name clash.
pub fn insert_type_rating(
    conn: &mut SqliteConnection,
    spec: &TypeRatingSpec,
) -> Result<TypeRatingId, PersistenceError> {
    let values: TypeRatingValues = TypeRatingValues::try_from(spec)?;
    diesel::insert_into(type_ratings::table)
        .values(&values)
        .execute(conn)?;
    Ok(TypeRatingId::new(get_last_insert_rowid(conn)?))
}

/// Overwrites a rating if its version is unchanged.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the stored version differs.
pub fn update_type_rating(
    conn: &mut SqliteConnection,
    rating: &TypeRating,
) -> Result<(), PersistenceError> {
    let rating_id: TypeRatingId = require_id(rating.type_rating_id, "type rating")?;
    let values: TypeRatingValues = TypeRatingValues::try_from(&rating.spec)?;
    let affected: usize = diesel::update(
        type_ratings::table
            .filter(type_ratings::type_rating_id.eq(rating_id.value()))
            .filter(type_ratings::version.eq(rating.version)),
    )
    .set((&values, type_ratings::version.eq(rating.version + 1)))
    .execute(conn)?;
    require_row(affected, "type rating", rating_id)
}

/// Deletes a rating if its version is unchanged.
///
/// Purchases keep their type name and price; owners lose the rating.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the stored version differs.
pub fn delete_type_rating(
    conn: &mut SqliteConnection,
    rating: &TypeRating,
) -> Result<(), PersistenceError> {
    let rating_id: TypeRatingId = require_id(rating.type_rating_id, "type rating")?;
    let affected: usize = diesel::delete(
        type_ratings::table
            .filter(type_ratings::type_rating_id.eq(rating_id.value()))
            .filter(type_ratings::version.eq(rating.version)),
    )
    .execute(conn)?;
    require_row(affected, "type rating", rating_id)
}
