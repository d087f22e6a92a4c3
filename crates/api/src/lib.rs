// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the career mode economy.
//!
//! Handlers here are the operations the HTTP layer exposes. Each one:
//!
//! - checks the caller's capabilities,
//! - loads the state slice the core needs,
//! - applies the command and persists the result atomically,
//! - maps every failure onto an [`ErrorKind`].
//!
//! Identity is never established here; callers pass an already-validated
//! [`AuthenticatedActor`].

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

mod auth;
mod capabilities;
mod config;
mod csv_import;
mod error;
mod handlers;
mod notify;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role};
pub use capabilities::{Capability, capabilities_for, role_allows};
pub use config::CareerConfig;
pub use csv_import::{
    ParsedCsv, parse_flight_legs_csv, parse_rank_table_csv, parse_type_ratings_csv,
};
pub use error::{ApiError, AuthError, ErrorKind, translate_core_error, translate_domain_error};
pub use handlers::{
    CareerContext, activate_type_rating, approve_pirep, complete_leg, create_flight_leg,
    create_type_rating, delete_flight_leg, delete_pirep, delete_type_rating, dispatch_leg,
    file_pirep, fleet_analytics, get_audit_event, get_leaderboard, get_pirep, get_profile,
    get_route_history, get_stats, import_flight_legs_csv, import_type_ratings_csv,
    list_all_legs, list_audit_events, list_legs, list_my_legs, list_my_pireps,
    list_pending_pireps, list_pilots, list_type_ratings_for_pilot, purchase_type_rating,
    reject_pirep, set_career_access, update_flight_leg, update_pirep, update_type_rating,
    verify_ledger,
};
pub use notify::{CareerNotification, NotificationError, NotificationSink, TracingSink, deliver};
pub use request_response::{
    AuditEventInfo, CareerAccessResponse, CatalogActionResponse, CsvRowReport, CsvRowStatus,
    DeleteFlightLegRequest, DeletePirepRequest, FilePirepRequest, FleetAnalyticsResponse,
    FlightLegRequest, ImportCsvRequest, ImportCsvResponse, LeaderboardEntry,
    LeaderboardResponse, LedgerResponse, LegActionResponse, ListAuditEventsResponse,
    ListFlightLegsResponse, ListPilotsResponse, ListPirepsResponse, ListTypeRatingsResponse,
    PilotSummary, PirepActionResponse, PirepEdits, PirepFigures, ProfileResponse,
    RatingActionResponse, RatingOwnership, ReviewPirepRequest, RouteHistoryResponse,
    SetCareerAccessRequest, StatsResponse, TypeRatingRequest, TypeRatingView,
};
