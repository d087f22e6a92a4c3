// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Type rating and flight leg queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use va_career_domain::{FlightLeg, LegId, LegStatus, PilotId, TypeRating, TypeRatingId};

use crate::data_models::{FlightLegRow, TypeRatingRow};
use crate::diesel_schema::{flight_legs, type_ratings};
use crate::error::PersistenceError;

/// Lists the type rating catalog, cheapest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be parsed.
pub fn list_type_ratings(conn: &mut SqliteConnection) -> Result<Vec<TypeRating>, PersistenceError> {
    let rows: Vec<TypeRatingRow> = type_ratings::table
        .select(TypeRatingRow::as_select())
        .order(type_ratings::type_name.asc())
        .load::<TypeRatingRow>(conn)?;
    let mut ratings: Vec<TypeRating> = rows
        .into_iter()
        .map(TypeRating::try_from)
        .collect::<Result<Vec<TypeRating>, PersistenceError>>()?;
    // Prices are TEXT, so ordering by value happens after parsing.
    ratings.sort_by(|a, b| {
        a.spec
            .purchase_price
            .cmp(&b.spec.purchase_price)
            .then_with(|| a.spec.type_name.cmp(&b.spec.type_name))
    });
    Ok(ratings)
}

/// Loads one type rating.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be parsed.
pub fn get_type_rating(
    conn: &mut SqliteConnection,
    type_rating_id: TypeRatingId,
) -> Result<Option<TypeRating>, PersistenceError> {
    type_ratings::table
        .filter(type_ratings::type_rating_id.eq(type_rating_id.value()))
        .select(TypeRatingRow::as_select())
        .first::<TypeRatingRow>(conn)
        .optional()?
        .map(TypeRating::try_from)
        .transpose()
}

fn into_legs(rows: Vec<FlightLegRow>) -> Result<Vec<FlightLeg>, PersistenceError> {
    rows.into_iter().map(FlightLeg::try_from).collect()
}

/// Loads one flight leg.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be parsed.
pub fn get_flight_leg(
    conn: &mut SqliteConnection,
    leg_id: LegId,
) -> Result<Option<FlightLeg>, PersistenceError> {
    flight_legs::table
        .filter(flight_legs::leg_id.eq(leg_id.value()))
        .select(FlightLegRow::as_select())
        .first::<FlightLegRow>(conn)
        .optional()?
        .map(FlightLeg::try_from)
        .transpose()
}

/// Lists every leg, ordered by flight number.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be parsed.
pub fn list_flight_legs(conn: &mut SqliteConnection) -> Result<Vec<FlightLeg>, PersistenceError> {
    let rows: Vec<FlightLegRow> = flight_legs::table
        .select(FlightLegRow::as_select())
        .order((flight_legs::flight_number.asc(), flight_legs::leg_id.asc()))
        .load::<FlightLegRow>(conn)?;
    into_legs(rows)
}

/// Lists the legs currently assigned to a pilot.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be parsed.
pub fn list_assigned_legs(
    conn: &mut SqliteConnection,
    pilot_id: &PilotId,
) -> Result<Vec<FlightLeg>, PersistenceError> {
    let rows: Vec<FlightLegRow> = flight_legs::table
        .filter(flight_legs::assigned_pilot_id.eq(pilot_id.value()))
        .select(FlightLegRow::as_select())
        .order((flight_legs::flight_number.asc(), flight_legs::leg_id.asc()))
        .load::<FlightLegRow>(conn)?;
    into_legs(rows)
}

/// Lists the legs a pilot sees on the dispatch board: open legs in their
/// active family plus every leg assigned to them.
///
/// A pilot without an active family sees only their own legs.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be parsed.
pub fn list_dispatch_board(
    conn: &mut SqliteConnection,
    pilot_id: &PilotId,
    active_family: Option<&str>,
) -> Result<Vec<FlightLeg>, PersistenceError> {
    let mut legs: Vec<FlightLeg> = match active_family {
        Some(family) => {
            let rows: Vec<FlightLegRow> = flight_legs::table
                .filter(flight_legs::status.eq(LegStatus::Available.as_str()))
                .filter(flight_legs::aircraft_family.eq(family))
                .select(FlightLegRow::as_select())
                .load::<FlightLegRow>(conn)?;
            into_legs(rows)?
        }
        None => Vec::new(),
    };
    legs.extend(list_assigned_legs(conn, pilot_id)?);
    legs.sort_by(|a, b| {
        a.spec
            .flight_number
            .cmp(&b.spec.flight_number)
            .then_with(|| a.leg_id.cmp(&b.leg_id))
    });
    Ok(legs)
}
