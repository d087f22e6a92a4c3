// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pilot profile and statistics queries.
//!
//! Owned ratings are not stored on either row; both are rebuilt from the
//! purchase ledger so the two views can never disagree.

use diesel::SqliteConnection;
use diesel::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use va_career_domain::{
    PilotId, PilotProfile, RouteHistoryEntry, StatsAggregate, TypeRatingId,
};

use crate::data_models::{CareerStatsRow, PilotProfileRow, RouteHistoryRow};
use crate::diesel_schema::{career_stats, pilot_profiles, route_history, type_rating_purchases};
use crate::error::PersistenceError;

/// Returns the ratings a pilot currently owns.
///
/// Purchases of ratings that were since deleted are not counted.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn owned_ratings(
    conn: &mut SqliteConnection,
    pilot_id: &PilotId,
) -> Result<BTreeSet<TypeRatingId>, PersistenceError> {
    let ids: Vec<Option<i64>> = type_rating_purchases::table
        .filter(type_rating_purchases::pilot_id.eq(pilot_id.value()))
        .filter(type_rating_purchases::type_rating_id.is_not_null())
        .select(type_rating_purchases::type_rating_id)
        .load::<Option<i64>>(conn)?;
    Ok(ids.into_iter().flatten().map(TypeRatingId::new).collect())
}

fn all_owned_ratings(
    conn: &mut SqliteConnection,
) -> Result<BTreeMap<String, BTreeSet<TypeRatingId>>, PersistenceError> {
    let rows: Vec<(String, Option<i64>)> = type_rating_purchases::table
        .filter(type_rating_purchases::type_rating_id.is_not_null())
        .select((
            type_rating_purchases::pilot_id,
            type_rating_purchases::type_rating_id,
        ))
        .load::<(String, Option<i64>)>(conn)?;

    let mut owned: BTreeMap<String, BTreeSet<TypeRatingId>> = BTreeMap::new();
    for (pilot_id, rating_id) in rows {
        if let Some(rating_id) = rating_id {
            owned
                .entry(pilot_id)
                .or_default()
                .insert(TypeRatingId::new(rating_id));
        }
    }
    Ok(owned)
}

/// Loads a pilot profile.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be parsed.
pub fn get_profile(
    conn: &mut SqliteConnection,
    pilot_id: &PilotId,
) -> Result<Option<PilotProfile>, PersistenceError> {
    let row: Option<PilotProfileRow> = pilot_profiles::table
        .filter(pilot_profiles::pilot_id.eq(pilot_id.value()))
        .select(PilotProfileRow::as_select())
        .first::<PilotProfileRow>(conn)
        .optional()?;

    match row {
        Some(row) => {
            let owned: BTreeSet<TypeRatingId> = owned_ratings(conn, pilot_id)?;
            Ok(Some(row.into_domain(owned)?))
        }
        None => Ok(None),
    }
}

/// Lists every profile, ordered by pilot id.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be parsed.
pub fn list_profiles(conn: &mut SqliteConnection) -> Result<Vec<PilotProfile>, PersistenceError> {
    let rows: Vec<PilotProfileRow> = pilot_profiles::table
        .select(PilotProfileRow::as_select())
        .order(pilot_profiles::pilot_id.asc())
        .load::<PilotProfileRow>(conn)?;
    let mut owned: BTreeMap<String, BTreeSet<TypeRatingId>> = all_owned_ratings(conn)?;

    rows.into_iter()
        .map(|row| {
            let ratings: BTreeSet<TypeRatingId> = owned.remove(&row.pilot_id).unwrap_or_default();
            row.into_domain(ratings)
        })
        .collect()
}

fn load_routes(
    conn: &mut SqliteConnection,
    pilot_id: &str,
) -> Result<Vec<RouteHistoryEntry>, PersistenceError> {
    let rows: Vec<RouteHistoryRow> = route_history::table
        .filter(route_history::pilot_id.eq(pilot_id))
        .select(RouteHistoryRow::as_select())
        .order((route_history::origin.asc(), route_history::destination.asc()))
        .load::<RouteHistoryRow>(conn)?;
    rows.into_iter().map(RouteHistoryRow::into_domain).collect()
}

/// Loads a pilot's statistics with route history.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be parsed.
pub fn get_stats(
    conn: &mut SqliteConnection,
    pilot_id: &PilotId,
) -> Result<Option<StatsAggregate>, PersistenceError> {
    let row: Option<CareerStatsRow> = career_stats::table
        .filter(career_stats::pilot_id.eq(pilot_id.value()))
        .select(CareerStatsRow::as_select())
        .first::<CareerStatsRow>(conn)
        .optional()?;

    match row {
        Some(row) => {
            let owned: BTreeSet<TypeRatingId> = owned_ratings(conn, pilot_id)?;
            let routes: Vec<RouteHistoryEntry> = load_routes(conn, pilot_id.value())?;
            Ok(Some(row.into_domain(owned, routes)?))
        }
        None => Ok(None),
    }
}

/// Lists every pilot's statistics without route history.
///
/// Used to build the leaderboard.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be parsed.
pub fn list_stats(conn: &mut SqliteConnection) -> Result<Vec<StatsAggregate>, PersistenceError> {
    let rows: Vec<CareerStatsRow> = career_stats::table
        .select(CareerStatsRow::as_select())
        .load::<CareerStatsRow>(conn)?;
    let mut owned: BTreeMap<String, BTreeSet<TypeRatingId>> = all_owned_ratings(conn)?;

    rows.into_iter()
        .map(|row| {
            let ratings: BTreeSet<TypeRatingId> = owned.remove(&row.pilot_id).unwrap_or_default();
            row.into_domain(ratings, Vec::new())
        })
        .collect()
}
