// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use va_career_audit::AuditEvent;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::NewAuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Persists an audit event and returns the id the database assigned to it.
///
/// # Errors
///
/// Returns an error if a payload cannot be serialized or the insert fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let row: NewAuditEventRow = NewAuditEventRow::try_from(event)?;
    diesel::insert_into(audit_events::table)
        .values(&row)
        .execute(conn)?;

    let event_id: i64 = get_last_insert_rowid(conn)?;
    debug!(event_id, action = %event.action.name, "Persisted audit event");
    Ok(event_id)
}
