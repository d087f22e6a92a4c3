// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! PIREP queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use va_career_domain::{LegId, PilotId, Pirep, PirepId, PirepStatus};

use crate::data_models::PirepRow;
use crate::diesel_schema::pireps;
use crate::error::PersistenceError;

fn into_pireps(rows: Vec<PirepRow>) -> Result<Vec<Pirep>, PersistenceError> {
    rows.into_iter().map(Pirep::try_from).collect()
}

/// Loads one report.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be parsed.
pub fn get_pirep(
    conn: &mut SqliteConnection,
    pirep_id: PirepId,
) -> Result<Option<Pirep>, PersistenceError> {
    pireps::table
        .filter(pireps::pirep_id.eq(pirep_id.value()))
        .select(PirepRow::as_select())
        .first::<PirepRow>(conn)
        .optional()?
        .map(Pirep::try_from)
        .transpose()
}

/// Lists a pilot's reports, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be parsed.
pub fn list_pireps_for_pilot(
    conn: &mut SqliteConnection,
    pilot_id: &PilotId,
) -> Result<Vec<Pirep>, PersistenceError> {
    let rows: Vec<PirepRow> = pireps::table
        .filter(pireps::pilot_id.eq(pilot_id.value()))
        .select(PirepRow::as_select())
        .order((pireps::filed_at.desc(), pireps::pirep_id.desc()))
        .load::<PirepRow>(conn)?;
    into_pireps(rows)
}

/// Lists a pilot's approved reports, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be parsed.
pub fn list_approved_pireps_for_pilot(
    conn: &mut SqliteConnection,
    pilot_id: &PilotId,
) -> Result<Vec<Pirep>, PersistenceError> {
    let rows: Vec<PirepRow> = pireps::table
        .filter(pireps::pilot_id.eq(pilot_id.value()))
        .filter(pireps::status.eq(PirepStatus::Approved.as_str()))
        .select(PirepRow::as_select())
        .order((pireps::filed_at.asc(), pireps::pirep_id.asc()))
        .load::<PirepRow>(conn)?;
    into_pireps(rows)
}

/// Lists the review queue, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be parsed.
pub fn list_pending_pireps(conn: &mut SqliteConnection) -> Result<Vec<Pirep>, PersistenceError> {
    let rows: Vec<PirepRow> = pireps::table
        .filter(pireps::status.eq(PirepStatus::Pending.as_str()))
        .select(PirepRow::as_select())
        .order((pireps::filed_at.asc(), pireps::pirep_id.asc()))
        .load::<PirepRow>(conn)?;
    into_pireps(rows)
}

/// Lists every report filed against a leg.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be parsed.
pub fn list_pireps_for_leg(
    conn: &mut SqliteConnection,
    leg_id: LegId,
) -> Result<Vec<Pirep>, PersistenceError> {
    let rows: Vec<PirepRow> = pireps::table
        .filter(pireps::leg_id.eq(leg_id.value()))
        .select(PirepRow::as_select())
        .order(pireps::pirep_id.asc())
        .load::<PirepRow>(conn)?;
    into_pireps(rows)
}
