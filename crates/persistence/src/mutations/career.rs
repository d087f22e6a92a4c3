// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence of career transitions.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};
use va_career::{CareerChanges, PirepChange, TransitionResult};
use va_career_domain::PirepId;

use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::mutations::entities::{
    claim_leg, delete_pirep, insert_pirep, insert_purchase, update_leg, update_pirep,
    update_profile, update_stats,
};

/// Identifiers assigned while persisting a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistTransitionResult {
    /// The audit event recording the transition.
    pub event_id: i64,
    /// The report the transition filed, updated or deleted.
    pub pirep_id: Option<PirepId>,
}

/// Writes every entity a transition touched, plus its audit event, in one
/// database transaction.
///
/// Entities are written in credit order: profile, statistics, leg, report,
/// purchase, audit event. Any compare-and-set miss aborts the whole unit,
/// so an approval either credits the pilot and flips the report together
/// or leaves the report PENDING.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `result` - The transition result to persist
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if any touched row changed since it
/// was loaded, or another error if a write fails.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistTransitionResult, PersistenceError> {
    conn.transaction::<PersistTransitionResult, PersistenceError, _>(|conn| {
        let changes: &CareerChanges = &result.changes;

        if let Some(profile) = &changes.profile {
            update_profile(conn, profile)?;
            debug!(pilot = %profile.pilot_id, "Updated pilot profile");
        }
        if let Some(stats) = &changes.stats {
            update_stats(conn, stats)?;
            debug!(pilot = %stats.pilot_id, routes = stats.routes.len(), "Updated career stats");
        }
        if let Some(leg) = &changes.leg {
            update_leg(conn, leg)?;
            debug!(leg = leg.id_value(), status = %leg.status, "Updated flight leg");
        }

        let pirep_id: Option<PirepId> = match &changes.pirep {
            Some(PirepChange::Filed(pirep)) => {
                if changes.leg.is_none()
                    && let Some(leg) = &result.new_state.leg
                {
                    claim_leg(conn, leg)?;
                }
                let id: PirepId = insert_pirep(conn, pirep)?;
                debug!(pirep = id.value(), "Inserted PIREP");
                Some(id)
            }
            Some(PirepChange::Updated(pirep)) => {
                update_pirep(conn, pirep)?;
                debug!(pirep = pirep.id_value(), status = %pirep.status, "Updated PIREP");
                pirep.pirep_id
            }
            Some(PirepChange::Deleted(pirep)) => {
                delete_pirep(conn, pirep)?;
                debug!(pirep = pirep.id_value(), "Deleted PIREP");
                pirep.pirep_id
            }
            None => None,
        };

        if let Some(purchase) = &changes.purchase {
            let purchase_id: i64 = insert_purchase(conn, purchase)?;
            debug!(purchase_id, type_name = %purchase.type_name, "Recorded purchase");
        }

        let event_id: i64 = persist_audit_event(conn, &result.audit_event)?;

        info!(
            event_id,
            action = %result.audit_event.action.name,
            pilot = %result.new_state.profile.pilot_id,
            "Persisted career transition"
        );

        Ok(PersistTransitionResult { event_id, pirep_id })
    })
}
