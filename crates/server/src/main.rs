// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod identity;

use std::net::{IpAddr, SocketAddr};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};
use va_career_api::{
    ApiError, AuditEventInfo, CareerAccessResponse, CareerConfig, CareerContext,
    CatalogActionResponse, DeleteFlightLegRequest, DeletePirepRequest, ErrorKind,
    FilePirepRequest, FleetAnalyticsResponse, FlightLegRequest, ImportCsvRequest,
    ImportCsvResponse, LeaderboardResponse, LedgerResponse, LegActionResponse,
    ListAuditEventsResponse, ListFlightLegsResponse, ListPilotsResponse, ListPirepsResponse,
    ListTypeRatingsResponse, PirepActionResponse, PirepEdits, ProfileResponse,
    RatingActionResponse, ReviewPirepRequest, RouteHistoryResponse, SetCareerAccessRequest,
    StatsResponse, TracingSink, TypeRatingRequest, activate_type_rating, approve_pirep,
    complete_leg, create_flight_leg, create_type_rating, delete_flight_leg, delete_pirep,
    delete_type_rating, dispatch_leg, file_pirep, fleet_analytics, get_audit_event,
    get_leaderboard, get_pirep, get_profile, get_route_history, get_stats,
    import_flight_legs_csv, import_type_ratings_csv, list_all_legs, list_audit_events,
    list_legs, list_my_legs, list_my_pireps, list_pending_pireps, list_pilots,
    list_type_ratings_for_pilot, parse_rank_table_csv, purchase_type_rating, reject_pirep,
    set_career_access, update_flight_leg, update_pirep, update_type_rating, verify_ledger,
};
use va_career_audit::Cause;
use va_career_domain::{LegId, PilotId, Pirep, PirepId, RankTable, TypeRatingId};
use va_career_persistence::Persistence;

use crate::identity::Caller;

/// VA Career Server - HTTP server for the virtual airline career economy
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// CSV file (name, min_hours, unlock_description) replacing the standard rank ladder
    #[arg(long)]
    rank_table: Option<PathBuf>,

    /// How many times a conflicting write is reloaded and re-applied
    #[arg(long, default_value_t = 3)]
    max_conflict_retries: u32,

    /// Leaderboard size when a request does not ask for one
    #[arg(long, default_value_t = 10)]
    leaderboard_limit: usize,

    /// Largest leaderboard a request may ask for
    #[arg(long, default_value_t = 100)]
    max_leaderboard_limit: usize,
}

impl Args {
    fn career_config(&self) -> CareerConfig {
        CareerConfig {
            max_conflict_retries: self.max_conflict_retries,
            default_leaderboard_limit: self.leaderboard_limit,
            max_leaderboard_limit: self.max_leaderboard_limit,
        }
    }
}

/// Application state shared across handlers.
///
/// The store is a single connection, so every handler serializes on the
/// mutex for the duration of one operation.
#[derive(Clone)]
struct AppState {
    /// The career store.
    persistence: Arc<Mutex<Persistence>>,
    /// Rank ladder, limits and notification sink.
    context: CareerContext,
}

impl AppState {
    fn new(persistence: Persistence, context: CareerContext) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            context,
        }
    }
}

/// Error body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    /// The error kind (`NotFound`, `PolicyViolation`, ...).
    error: String,
    /// Human-readable description.
    message: String,
}

/// HTTP error carrying a status and an `ErrorResponse` body.
#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    kind: ErrorKind,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: ErrorResponse = ErrorResponse {
            error: self.kind.as_str().to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::InvalidState => StatusCode::CONFLICT,
        ErrorKind::PolicyViolation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let kind: ErrorKind = err.kind();
        if kind == ErrorKind::Internal {
            error!(error = %err, "Internal error");
        }
        Self {
            status: status_for(kind),
            kind,
            message: err.to_string(),
        }
    }
}

/// Query parameters for route history.
#[derive(Debug, Default, Deserialize)]
struct RouteHistoryQuery {
    /// `all`, `30d` or `7d`.
    window: Option<String>,
}

/// Query parameters for the leaderboard.
#[derive(Debug, Default, Deserialize)]
struct LeaderboardQuery {
    /// `earnings`, `hours` or `flights`.
    metric: Option<String>,
    limit: Option<usize>,
}

/// Query parameters for the audit trail.
#[derive(Debug, Default, Deserialize)]
struct AuditQuery {
    pilot_id: Option<String>,
}

// ============================================================================
// Profile and statistics
// ============================================================================

async fn handle_get_profile(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
) -> Result<Json<ProfileResponse>, HttpError> {
    info!(pilot_id = %caller.actor.pilot_id, "Handling get_profile request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ProfileResponse = get_profile(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_get_stats(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(pilot_id): Path<String>,
) -> Result<Json<StatsResponse>, HttpError> {
    info!(pilot_id = %pilot_id, "Handling get_stats request");

    let mut persistence = app_state.persistence.lock().await;
    let response: StatsResponse = get_stats(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        &PilotId::new(&pilot_id),
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_get_route_history(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(pilot_id): Path<String>,
    Query(query): Query<RouteHistoryQuery>,
) -> Result<Json<RouteHistoryResponse>, HttpError> {
    info!(pilot_id = %pilot_id, window = ?query.window, "Handling get_route_history request");

    let mut persistence = app_state.persistence.lock().await;
    let response: RouteHistoryResponse = get_route_history(
        &mut persistence,
        &caller.actor,
        &PilotId::new(&pilot_id),
        query.window.as_deref(),
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_verify_ledger(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(pilot_id): Path<String>,
) -> Result<Json<LedgerResponse>, HttpError> {
    info!(pilot_id = %pilot_id, "Handling verify_ledger request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LedgerResponse =
        verify_ledger(&mut persistence, &caller.actor, &PilotId::new(&pilot_id))?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_get_leaderboard(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, HttpError> {
    info!(metric = ?query.metric, limit = ?query.limit, "Handling get_leaderboard request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LeaderboardResponse = get_leaderboard(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        query.metric.as_deref(),
        query.limit,
    )?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Type ratings
// ============================================================================

async fn handle_list_type_ratings(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
) -> Result<Json<ListTypeRatingsResponse>, HttpError> {
    info!(pilot_id = %caller.actor.pilot_id, "Handling list_type_ratings request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ListTypeRatingsResponse = list_type_ratings_for_pilot(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_purchase_type_rating(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(type_rating_id): Path<i64>,
) -> Result<Json<RatingActionResponse>, HttpError> {
    info!(
        pilot_id = %caller.actor.pilot_id,
        type_rating_id,
        "Handling purchase_type_rating request"
    );

    let cause: Cause = caller.cause("Purchase type rating");
    let mut persistence = app_state.persistence.lock().await;
    let response: RatingActionResponse = purchase_type_rating(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        TypeRatingId::new(type_rating_id),
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_activate_type_rating(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(type_rating_id): Path<i64>,
) -> Result<Json<RatingActionResponse>, HttpError> {
    info!(
        pilot_id = %caller.actor.pilot_id,
        type_rating_id,
        "Handling activate_type_rating request"
    );

    let cause: Cause = caller.cause("Activate type rating");
    let mut persistence = app_state.persistence.lock().await;
    let response: RatingActionResponse = activate_type_rating(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        TypeRatingId::new(type_rating_id),
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Flight legs
// ============================================================================

async fn handle_list_legs(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
) -> Result<Json<ListFlightLegsResponse>, HttpError> {
    info!(pilot_id = %caller.actor.pilot_id, "Handling list_legs request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ListFlightLegsResponse = list_legs(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_list_my_legs(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
) -> Result<Json<ListFlightLegsResponse>, HttpError> {
    info!(pilot_id = %caller.actor.pilot_id, "Handling list_my_legs request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ListFlightLegsResponse = list_my_legs(&mut persistence, &caller.actor)?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_dispatch_leg(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(leg_id): Path<i64>,
) -> Result<Json<LegActionResponse>, HttpError> {
    info!(pilot_id = %caller.actor.pilot_id, leg_id, "Handling dispatch_leg request");

    let cause: Cause = caller.cause("Dispatch leg");
    let mut persistence = app_state.persistence.lock().await;
    let response: LegActionResponse = dispatch_leg(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        LegId::new(leg_id),
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_complete_leg(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(leg_id): Path<i64>,
) -> Result<Json<LegActionResponse>, HttpError> {
    info!(pilot_id = %caller.actor.pilot_id, leg_id, "Handling complete_leg request");

    let cause: Cause = caller.cause("Complete leg");
    let mut persistence = app_state.persistence.lock().await;
    let response: LegActionResponse = complete_leg(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        LegId::new(leg_id),
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// PIREPs
// ============================================================================

async fn handle_file_pirep(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Json(req): Json<FilePirepRequest>,
) -> Result<Json<PirepActionResponse>, HttpError> {
    info!(
        pilot_id = %caller.actor.pilot_id,
        leg_id = req.leg_id.value(),
        "Handling file_pirep request"
    );

    let cause: Cause = caller.cause("File PIREP");
    let mut persistence = app_state.persistence.lock().await;
    let response: PirepActionResponse = file_pirep(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        req,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_list_my_pireps(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
) -> Result<Json<ListPirepsResponse>, HttpError> {
    info!(pilot_id = %caller.actor.pilot_id, "Handling list_my_pireps request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ListPirepsResponse = list_my_pireps(&mut persistence, &caller.actor)?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_get_pirep(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(pirep_id): Path<i64>,
) -> Result<Json<Pirep>, HttpError> {
    info!(pirep_id, "Handling get_pirep request");

    let mut persistence = app_state.persistence.lock().await;
    let pirep: Pirep = get_pirep(&mut persistence, &caller.actor, PirepId::new(pirep_id))?;
    drop(persistence);

    Ok(Json(pirep))
}

async fn handle_update_pirep(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(pirep_id): Path<i64>,
    Json(edits): Json<PirepEdits>,
) -> Result<Json<PirepActionResponse>, HttpError> {
    info!(pilot_id = %caller.actor.pilot_id, pirep_id, "Handling update_pirep request");

    let cause: Cause = caller.cause("Update PIREP");
    let mut persistence = app_state.persistence.lock().await;
    let response: PirepActionResponse = update_pirep(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        PirepId::new(pirep_id),
        edits,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_delete_pirep(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(pirep_id): Path<i64>,
    Query(req): Query<DeletePirepRequest>,
) -> Result<Json<PirepActionResponse>, HttpError> {
    info!(
        pilot_id = %caller.actor.pilot_id,
        pirep_id,
        overridden = req.override_reason.is_some(),
        "Handling delete_pirep request"
    );

    let cause: Cause = caller.cause("Delete PIREP");
    let mut persistence = app_state.persistence.lock().await;
    let response: PirepActionResponse = delete_pirep(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        PirepId::new(pirep_id),
        req,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_list_pending_pireps(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
) -> Result<Json<ListPirepsResponse>, HttpError> {
    info!("Handling list_pending_pireps request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ListPirepsResponse = list_pending_pireps(&mut persistence, &caller.actor)?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_approve_pirep(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(pirep_id): Path<i64>,
    Json(req): Json<ReviewPirepRequest>,
) -> Result<Json<PirepActionResponse>, HttpError> {
    info!(reviewer = %caller.actor.pilot_id, pirep_id, "Handling approve_pirep request");

    let cause: Cause = caller.cause("Approve PIREP");
    let mut persistence = app_state.persistence.lock().await;
    let response: PirepActionResponse = approve_pirep(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        PirepId::new(pirep_id),
        req,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_reject_pirep(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(pirep_id): Path<i64>,
    Json(req): Json<ReviewPirepRequest>,
) -> Result<Json<PirepActionResponse>, HttpError> {
    info!(reviewer = %caller.actor.pilot_id, pirep_id, "Handling reject_pirep request");

    let cause: Cause = caller.cause("Reject PIREP");
    let mut persistence = app_state.persistence.lock().await;
    let response: PirepActionResponse = reject_pirep(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        PirepId::new(pirep_id),
        req,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Catalog administration
// ============================================================================

async fn handle_list_all_legs(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
) -> Result<Json<ListFlightLegsResponse>, HttpError> {
    info!("Handling list_all_legs request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ListFlightLegsResponse = list_all_legs(&mut persistence, &caller.actor)?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_create_flight_leg(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Json(req): Json<FlightLegRequest>,
) -> Result<Json<CatalogActionResponse>, HttpError> {
    info!(flight_number = %req.flight_number, "Handling create_flight_leg request");

    let cause: Cause = caller.cause("Create flight leg");
    let mut persistence = app_state.persistence.lock().await;
    let response: CatalogActionResponse = create_flight_leg(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        req,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_update_flight_leg(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(leg_id): Path<i64>,
    Json(req): Json<FlightLegRequest>,
) -> Result<Json<CatalogActionResponse>, HttpError> {
    info!(leg_id, "Handling update_flight_leg request");

    let cause: Cause = caller.cause("Update flight leg");
    let mut persistence = app_state.persistence.lock().await;
    let response: CatalogActionResponse = update_flight_leg(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        LegId::new(leg_id),
        req,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_delete_flight_leg(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(leg_id): Path<i64>,
    Query(req): Query<DeleteFlightLegRequest>,
) -> Result<Json<CatalogActionResponse>, HttpError> {
    info!(leg_id, "Handling delete_flight_leg request");

    let cause: Cause = caller.cause("Delete flight leg");
    let mut persistence = app_state.persistence.lock().await;
    let response: CatalogActionResponse = delete_flight_leg(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        LegId::new(leg_id),
        req,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_import_flight_legs(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Json(req): Json<ImportCsvRequest>,
) -> Result<Json<ImportCsvResponse>, HttpError> {
    info!(bytes = req.csv_content.len(), "Handling import_flight_legs request");

    let cause: Cause = caller.cause("Import flight legs");
    let mut persistence = app_state.persistence.lock().await;
    let response: ImportCsvResponse = import_flight_legs_csv(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        &req,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_create_type_rating(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Json(req): Json<TypeRatingRequest>,
) -> Result<Json<CatalogActionResponse>, HttpError> {
    info!(type_name = %req.type_name, "Handling create_type_rating request");

    let cause: Cause = caller.cause("Create type rating");
    let mut persistence = app_state.persistence.lock().await;
    let response: CatalogActionResponse = create_type_rating(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        req,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_update_type_rating(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(type_rating_id): Path<i64>,
    Json(req): Json<TypeRatingRequest>,
) -> Result<Json<CatalogActionResponse>, HttpError> {
    info!(type_rating_id, "Handling update_type_rating request");

    let cause: Cause = caller.cause("Update type rating");
    let mut persistence = app_state.persistence.lock().await;
    let response: CatalogActionResponse = update_type_rating(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        TypeRatingId::new(type_rating_id),
        req,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_delete_type_rating(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(type_rating_id): Path<i64>,
) -> Result<Json<CatalogActionResponse>, HttpError> {
    info!(type_rating_id, "Handling delete_type_rating request");

    let cause: Cause = caller.cause("Delete type rating");
    let mut persistence = app_state.persistence.lock().await;
    let response: CatalogActionResponse = delete_type_rating(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        TypeRatingId::new(type_rating_id),
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_import_type_ratings(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Json(req): Json<ImportCsvRequest>,
) -> Result<Json<ImportCsvResponse>, HttpError> {
    info!(bytes = req.csv_content.len(), "Handling import_type_ratings request");

    let cause: Cause = caller.cause("Import type ratings");
    let mut persistence = app_state.persistence.lock().await;
    let response: ImportCsvResponse = import_type_ratings_csv(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        &req,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Pilot administration and audit
// ============================================================================

async fn handle_list_pilots(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
) -> Result<Json<ListPilotsResponse>, HttpError> {
    info!("Handling list_pilots request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ListPilotsResponse = list_pilots(&mut persistence, &caller.actor)?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_set_career_access(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(pilot_id): Path<String>,
    Json(req): Json<SetCareerAccessRequest>,
) -> Result<Json<CareerAccessResponse>, HttpError> {
    info!(pilot_id = %pilot_id, approved = req.approved, "Handling set_career_access request");

    let cause: Cause = caller.cause("Set career access");
    let mut persistence = app_state.persistence.lock().await;
    let response: CareerAccessResponse = set_career_access(
        &mut persistence,
        &app_state.context,
        &caller.actor,
        &PilotId::new(&pilot_id),
        req,
        &cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_fleet_analytics(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
) -> Result<Json<FleetAnalyticsResponse>, HttpError> {
    info!("Handling fleet_analytics request");

    let mut persistence = app_state.persistence.lock().await;
    let response: FleetAnalyticsResponse = fleet_analytics(&mut persistence, &caller.actor)?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_list_audit_events(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Query(query): Query<AuditQuery>,
) -> Result<Json<ListAuditEventsResponse>, HttpError> {
    info!(pilot_id = ?query.pilot_id, "Handling list_audit_events request");

    let pilot_id: Option<PilotId> = query.pilot_id.as_deref().map(PilotId::new);
    let mut persistence = app_state.persistence.lock().await;
    let response: ListAuditEventsResponse =
        list_audit_events(&mut persistence, &caller.actor, pilot_id.as_ref())?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_get_audit_event(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    Path(event_id): Path<i64>,
) -> Result<Json<AuditEventInfo>, HttpError> {
    info!(event_id, "Handling get_audit_event request");

    let mut persistence = app_state.persistence.lock().await;
    let response: AuditEventInfo = get_audit_event(&mut persistence, &caller.actor, event_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/career/profile", get(handle_get_profile))
        .route("/career/leaderboard", get(handle_get_leaderboard))
        .route("/career/pilots/{pilot_id}/stats", get(handle_get_stats))
        .route("/career/pilots/{pilot_id}/routes", get(handle_get_route_history))
        .route("/career/pilots/{pilot_id}/ledger", get(handle_verify_ledger))
        .route("/career/type-ratings", get(handle_list_type_ratings))
        .route(
            "/career/type-ratings/{type_rating_id}/purchase",
            post(handle_purchase_type_rating),
        )
        .route(
            "/career/type-ratings/{type_rating_id}/activate",
            post(handle_activate_type_rating),
        )
        .route("/career/legs", get(handle_list_legs))
        .route("/career/legs/mine", get(handle_list_my_legs))
        .route("/career/legs/{leg_id}/dispatch", post(handle_dispatch_leg))
        .route("/career/legs/{leg_id}/complete", post(handle_complete_leg))
        .route("/career/pireps", post(handle_file_pirep))
        .route("/career/pireps/mine", get(handle_list_my_pireps))
        .route(
            "/career/pireps/{pirep_id}",
            get(handle_get_pirep)
                .put(handle_update_pirep)
                .delete(handle_delete_pirep),
        )
        .route("/admin/pireps/pending", get(handle_list_pending_pireps))
        .route("/admin/pireps/{pirep_id}/approve", post(handle_approve_pirep))
        .route("/admin/pireps/{pirep_id}/reject", post(handle_reject_pirep))
        .route(
            "/admin/legs",
            get(handle_list_all_legs).post(handle_create_flight_leg),
        )
        .route("/admin/legs/import", post(handle_import_flight_legs))
        .route(
            "/admin/legs/{leg_id}",
            put(handle_update_flight_leg).delete(handle_delete_flight_leg),
        )
        .route("/admin/type-ratings", post(handle_create_type_rating))
        .route("/admin/type-ratings/import", post(handle_import_type_ratings))
        .route(
            "/admin/type-ratings/{type_rating_id}",
            put(handle_update_type_rating).delete(handle_delete_type_rating),
        )
        .route("/admin/pilots", get(handle_list_pilots))
        .route("/admin/pilots/{pilot_id}/access", put(handle_set_career_access))
        .route("/admin/analytics", get(handle_fleet_analytics))
        .route("/admin/audit", get(handle_list_audit_events))
        .route("/admin/audit/{event_id}", get(handle_get_audit_event))
        .with_state(app_state)
}

/// Loads the rank ladder from a CSV file, or the standard ladder without one.
fn load_rank_table(path: Option<&FsPath>) -> Result<RankTable, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        info!("Using the standard rank ladder");
        return Ok(RankTable::standard());
    };
    info!(path = %path.display(), "Loading rank ladder");
    let content: String = std::fs::read_to_string(path)?;
    Ok(parse_rank_table_csv(&content)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing VA Career Server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!(path = %db_path.display(), "Using file-based database");
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let ranks: RankTable = load_rank_table(args.rank_table.as_deref())?;
    let context: CareerContext =
        CareerContext::new(ranks, args.career_config(), Arc::new(TracingSink));
    let app: Router = build_router(AppState::new(persistence, context));

    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!(%addr, "Server listening");

    let listener: tokio::net::TcpListener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
