// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use va_career_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use va_career_domain::PilotId;

use crate::data_models::{
    ActionData, ActorData, CauseData, StateSnapshotData, parse_timestamp,
};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Stored audit row as read back.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
struct AuditEventRow {
    event_id: i64,
    pilot_id: Option<String>,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    created_at: String,
}

impl TryFrom<AuditEventRow> for AuditEvent {
    type Error = PersistenceError;

    fn try_from(row: AuditEventRow) -> Result<Self, Self::Error> {
        let actor: ActorData = serde_json::from_str(&row.actor_json)?;
        let cause: CauseData = serde_json::from_str(&row.cause_json)?;
        let action: ActionData = serde_json::from_str(&row.action_json)?;
        let before: StateSnapshotData = serde_json::from_str(&row.before_snapshot_json)?;
        let after: StateSnapshotData = serde_json::from_str(&row.after_snapshot_json)?;

        let mut event: Self = Self::new(
            Actor::from(actor),
            Cause::from(cause),
            Action::from(action),
            StateSnapshot::from(before),
            StateSnapshot::from(after),
            row.pilot_id.as_deref().map(PilotId::new),
            parse_timestamp(&row.created_at)?,
        );
        event.event_id = Some(row.event_id);
        Ok(event)
    }
}

/// Retrieves an audit event by ID.
///
/// # Errors
///
/// Returns `PersistenceError::EventNotFound` if no such event exists, or
/// another error if it cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let row: AuditEventRow = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first::<AuditEventRow>(conn)
        .optional()?
        .ok_or(PersistenceError::EventNotFound(event_id))?;
    AuditEvent::try_from(row)
}

/// Lists audit events in commit order.
///
/// With a pilot, only events affecting that pilot's career are returned;
/// without one, every event including catalog changes.
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn list_audit_events(
    conn: &mut SqliteConnection,
    pilot_id: Option<&PilotId>,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = match pilot_id {
        Some(pilot_id) => audit_events::table
            .filter(audit_events::pilot_id.eq(pilot_id.value()))
            .select(AuditEventRow::as_select())
            .order(audit_events::event_id.asc())
            .load::<AuditEventRow>(conn)?,
        None => audit_events::table
            .select(AuditEventRow::as_select())
            .order(audit_events::event_id.asc())
            .load::<AuditEventRow>(conn)?,
    };
    rows.into_iter().map(AuditEvent::try_from).collect()
}
