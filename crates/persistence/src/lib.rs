// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the virtual airline career mode.
//!
//! The store is `SQLite` accessed through Diesel, with migrations embedded
//! in the binary. Each career transition or catalog change is written in a
//! single database transaction together with its audit event.
//!
//! ## Concurrency
//!
//! Every mutable row carries a `version` column. Writers update with
//! `WHERE id = ? AND version = ?`; a write that matches nothing surfaces as
//! [`PersistenceError::Conflict`] and rolls the whole unit back. Callers
//! reload, re-apply the command and try again.
//!
//! ## Testing
//!
//! Tests run against [`Persistence::new_in_memory`], which gives every
//! instance its own shared-cache database.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use va_career::{CatalogResult, TransitionResult};
use va_career_audit::AuditEvent;
use va_career_domain::{
    FleetAnalytics, FlightLeg, LegId, PilotId, PilotProfile, Pirep, PirepId, RankTable,
    StatsAggregate, TypeRating, TypeRatingId,
};

pub mod backend;
pub mod data_models;
pub mod diesel_schema;
mod error;
pub mod mutations;
pub mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use mutations::{PersistCatalogResult, PersistTransitionResult};
pub use queries::{LedgerCheck, PurchaseRecord};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for the career store.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared-cache database, so instances never
    /// see each other's data.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:va_career_mem_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Lists the user tables present in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tables(&mut self) -> Result<Vec<String>, PersistenceError> {
        backend::sqlite::list_tables(&mut self.conn)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Returns the pilot's profile and statistics, creating both on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be written or read back.
    pub fn get_or_create_career(
        &mut self,
        pilot_id: &PilotId,
        callsign: &str,
        career_approved: bool,
        ranks: &RankTable,
        now: OffsetDateTime,
    ) -> Result<(PilotProfile, StatsAggregate), PersistenceError> {
        mutations::get_or_create_career(
            &mut self.conn,
            pilot_id,
            callsign,
            career_approved,
            ranks,
            now,
        )
    }

    /// Persists a career transition and its audit event atomically.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Conflict` if a touched row changed since it
    /// was loaded.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        mutations::persist_transition(&mut self.conn, result)
    }

    /// Persists a catalog change and its audit event atomically.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Conflict` if an updated or deleted row
    /// changed since it was loaded.
    pub fn persist_catalog(
        &mut self,
        result: &CatalogResult,
    ) -> Result<PersistCatalogResult, PersistenceError> {
        mutations::persist_catalog(&mut self.conn, result)
    }

    // ========================================================================
    // Profiles and statistics
    // ========================================================================

    /// Loads a pilot profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_profile(
        &mut self,
        pilot_id: &PilotId,
    ) -> Result<Option<PilotProfile>, PersistenceError> {
        queries::profiles::get_profile(&mut self.conn, pilot_id)
    }

    /// Lists every profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_profiles(&mut self) -> Result<Vec<PilotProfile>, PersistenceError> {
        queries::profiles::list_profiles(&mut self.conn)
    }

    /// Loads a pilot's statistics with route history.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_stats(
        &mut self,
        pilot_id: &PilotId,
    ) -> Result<Option<StatsAggregate>, PersistenceError> {
        queries::profiles::get_stats(&mut self.conn, pilot_id)
    }

    /// Lists every pilot's statistics, without route history.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_stats(&mut self) -> Result<Vec<StatsAggregate>, PersistenceError> {
        queries::profiles::list_stats(&mut self.conn)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Lists the type rating catalog, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_type_ratings(&mut self) -> Result<Vec<TypeRating>, PersistenceError> {
        queries::catalog::list_type_ratings(&mut self.conn)
    }

    /// Loads one type rating.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_type_rating(
        &mut self,
        type_rating_id: TypeRatingId,
    ) -> Result<Option<TypeRating>, PersistenceError> {
        queries::catalog::get_type_rating(&mut self.conn, type_rating_id)
    }

    /// Loads one flight leg.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_flight_leg(&mut self, leg_id: LegId) -> Result<Option<FlightLeg>, PersistenceError> {
        queries::catalog::get_flight_leg(&mut self.conn, leg_id)
    }

    /// Lists every flight leg.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_flight_legs(&mut self) -> Result<Vec<FlightLeg>, PersistenceError> {
        queries::catalog::list_flight_legs(&mut self.conn)
    }

    /// Lists the legs assigned to a pilot.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_assigned_legs(
        &mut self,
        pilot_id: &PilotId,
    ) -> Result<Vec<FlightLeg>, PersistenceError> {
        queries::catalog::list_assigned_legs(&mut self.conn, pilot_id)
    }

    /// Lists open legs in the active family plus the pilot's own legs.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_dispatch_board(
        &mut self,
        pilot_id: &PilotId,
        active_family: Option<&str>,
    ) -> Result<Vec<FlightLeg>, PersistenceError> {
        queries::catalog::list_dispatch_board(&mut self.conn, pilot_id, active_family)
    }

    // ========================================================================
    // PIREPs
    // ========================================================================

    /// Loads one report.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_pirep(&mut self, pirep_id: PirepId) -> Result<Option<Pirep>, PersistenceError> {
        queries::pireps::get_pirep(&mut self.conn, pirep_id)
    }

    /// Lists a pilot's reports, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_pireps_for_pilot(
        &mut self,
        pilot_id: &PilotId,
    ) -> Result<Vec<Pirep>, PersistenceError> {
        queries::pireps::list_pireps_for_pilot(&mut self.conn, pilot_id)
    }

    /// Lists a pilot's approved reports, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_approved_pireps_for_pilot(
        &mut self,
        pilot_id: &PilotId,
    ) -> Result<Vec<Pirep>, PersistenceError> {
        queries::pireps::list_approved_pireps_for_pilot(&mut self.conn, pilot_id)
    }

    /// Lists the review queue, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_pending_pireps(&mut self) -> Result<Vec<Pirep>, PersistenceError> {
        queries::pireps::list_pending_pireps(&mut self.conn)
    }

    /// Lists every report filed against a leg.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_pireps_for_leg(&mut self, leg_id: LegId) -> Result<Vec<Pirep>, PersistenceError> {
        queries::pireps::list_pireps_for_leg(&mut self.conn, leg_id)
    }

    // ========================================================================
    // Ledger, analytics and audit
    // ========================================================================

    /// Lists a pilot's purchases, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_purchases(
        &mut self,
        pilot_id: &PilotId,
    ) -> Result<Vec<PurchaseRecord>, PersistenceError> {
        queries::ledger::list_purchases(&mut self.conn, pilot_id)
    }

    /// Reconciles a pilot's stored balance against the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the pilot has no profile or a query fails.
    pub fn verify_ledger(&mut self, pilot_id: &PilotId) -> Result<LedgerCheck, PersistenceError> {
        queries::ledger::verify_ledger(&mut self.conn, pilot_id)
    }

    /// Computes fleet-wide career totals.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn fleet_analytics(&mut self) -> Result<FleetAnalytics, PersistenceError> {
        queries::ledger::fleet_analytics(&mut self.conn)
    }

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Lists audit events, optionally only those affecting one pilot.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_audit_events(
        &mut self,
        pilot_id: Option<&PilotId>,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::list_audit_events(&mut self.conn, pilot_id)
    }
}
