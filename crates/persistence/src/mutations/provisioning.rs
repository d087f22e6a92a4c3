// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lazy creation of a pilot's career rows.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::info;
use va_career_domain::{PilotId, PilotProfile, RankTable, StatsAggregate};

use crate::data_models::{CareerStatsValues, PilotProfileValues, format_timestamp};
use crate::diesel_schema::{career_stats, pilot_profiles};
use crate::error::PersistenceError;
use crate::queries::profiles::{get_profile, get_stats};

/// Returns the pilot's profile and statistics, creating both on first use.
///
/// Creation uses `INSERT OR IGNORE`, so two first requests racing each
/// other both end up reading the same rows instead of failing.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `pilot_id` - The pilot
/// * `callsign` - Display callsign used if the profile is created
/// * `career_approved` - Initial access flag used if the profile is created
/// * `ranks` - Rank ladder supplying the entry rank
/// * `now` - Creation time
///
/// # Errors
///
/// Returns an error if the rows cannot be written or read back.
pub fn get_or_create_career(
    conn: &mut SqliteConnection,
    pilot_id: &PilotId,
    callsign: &str,
    career_approved: bool,
    ranks: &RankTable,
    now: OffsetDateTime,
) -> Result<(PilotProfile, StatsAggregate), PersistenceError> {
    let fresh: PilotProfile =
        PilotProfile::new(pilot_id.clone(), callsign, career_approved, ranks, now);
    let profile_values: PilotProfileValues = PilotProfileValues::from(&fresh);
    let stats_values: CareerStatsValues = CareerStatsValues::from(&StatsAggregate::new(
        pilot_id.clone(),
    ));
    let created_at: String = format_timestamp(now)?;

    let inserted: usize = conn.transaction::<usize, PersistenceError, _>(|conn| {
        let inserted: usize = diesel::insert_or_ignore_into(pilot_profiles::table)
            .values((
                pilot_profiles::pilot_id.eq(pilot_id.value()),
                &profile_values,
                pilot_profiles::created_at.eq(&created_at),
                pilot_profiles::version.eq(1_i64),
            ))
            .execute(conn)?;
        diesel::insert_or_ignore_into(career_stats::table)
            .values((
                career_stats::pilot_id.eq(pilot_id.value()),
                &stats_values,
                career_stats::version.eq(1_i64),
            ))
            .execute(conn)?;
        Ok(inserted)
    })?;

    if inserted > 0 {
        info!(pilot = %pilot_id, career_approved, "Provisioned career profile");
    }

    let profile: PilotProfile = get_profile(conn, pilot_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("pilot profile {pilot_id}")))?;
    let stats: StatsAggregate = get_stats(conn, pilot_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("career stats {pilot_id}")))?;
    Ok((profile, stats))
}
