// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence of catalog changes.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;
use va_career::{CatalogChange, CatalogResult};

use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::mutations::entities::{
    delete_leg, delete_type_rating, insert_leg, insert_type_rating, update_leg,
    update_type_rating,
};

/// Identifiers assigned while persisting a catalog change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistCatalogResult {
    /// The audit event recording the change.
    pub event_id: i64,
    /// Row ids of inserted ratings or legs, in input order.
    pub created_ids: Vec<i64>,
}

/// Writes a catalog change and its audit event in one transaction.
///
/// Bulk imports insert every row or none.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if an updated or deleted row changed
/// since it was loaded, or another error if a write fails.
pub fn persist_catalog(
    conn: &mut SqliteConnection,
    result: &CatalogResult,
) -> Result<PersistCatalogResult, PersistenceError> {
    conn.transaction::<PersistCatalogResult, PersistenceError, _>(|conn| {
        let mut created_ids: Vec<i64> = Vec::new();

        match &result.change {
            CatalogChange::TypeRatingsCreated(ratings) => {
                for rating in ratings {
                    created_ids.push(insert_type_rating(conn, &rating.spec)?.value());
                }
            }
            CatalogChange::TypeRatingUpdated(rating) => update_type_rating(conn, rating)?,
            CatalogChange::TypeRatingDeleted(rating) => delete_type_rating(conn, rating)?,
            CatalogChange::FlightLegsCreated(legs) => {
                for leg in legs {
                    created_ids.push(insert_leg(conn, leg)?.value());
                }
            }
            CatalogChange::FlightLegUpdated(leg) => update_leg(conn, leg)?,
            CatalogChange::FlightLegDeleted(leg) => delete_leg(conn, leg)?,
        }

        let event_id: i64 = persist_audit_event(conn, &result.audit_event)?;

        info!(
            event_id,
            action = %result.audit_event.action.name,
            created = created_ids.len(),
            "Persisted catalog change"
        );

        Ok(PersistCatalogResult {
            event_id,
            created_ids,
        })
    })
}
