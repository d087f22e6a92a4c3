// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! State-changing handlers follow one shape: authorize, load the slice of
//! state the command needs, apply the command through the core, and persist
//! the result. A persistence conflict means another writer committed first;
//! the handler reloads and re-applies, up to the configured retry limit, so
//! the loser sees the rule violation the winner caused.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};
use va_career::{
    CareerState, CatalogCommand, CatalogResult, CatalogState, Command, TransitionResult, apply,
    apply_catalog,
};
use va_career_audit::{AuditEvent, Cause};
use va_career_domain::{
    BodyType, Decimal, FlightLeg, FlightLegSpec, FlightReportInputs, HistoryWindow,
    LeaderboardMetric, LegId, PilotId, PilotProfile, Pirep, PirepAmendment, PirepDraft, PirepId,
    RankProgress, RankTable, RouteTally, StatsAggregate, TypeRating, TypeRatingId,
    TypeRatingSpec, fold_route_history, rank_leaderboard,
};
use va_career_persistence::{
    LedgerCheck, PersistCatalogResult, PersistTransitionResult, Persistence,
};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::capabilities::Capability;
use crate::config::CareerConfig;
use crate::csv_import::{ParsedCsv, parse_flight_legs_csv, parse_type_ratings_csv};
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::notify::{CareerNotification, NotificationSink, deliver};
use crate::request_response::{
    AuditEventInfo, CareerAccessResponse, CatalogActionResponse, DeleteFlightLegRequest,
    DeletePirepRequest, FilePirepRequest, FleetAnalyticsResponse, FlightLegRequest,
    ImportCsvRequest, ImportCsvResponse, LeaderboardEntry, LeaderboardResponse,
    LedgerResponse, LegActionResponse, ListAuditEventsResponse, ListFlightLegsResponse,
    ListPilotsResponse, ListPirepsResponse, ListTypeRatingsResponse, PilotSummary,
    PirepActionResponse, PirepEdits, PirepFigures, ProfileResponse, RatingActionResponse,
    RatingOwnership, ReviewPirepRequest, RouteHistoryResponse, SetCareerAccessRequest,
    StatsResponse, TypeRatingRequest, TypeRatingView,
};

/// Process-wide collaborators every handler needs.
#[derive(Clone)]
pub struct CareerContext {
    /// The rank ladder.
    pub ranks: RankTable,
    /// Runtime limits.
    pub config: CareerConfig,
    /// Where filing and review notifications go.
    pub notifier: Arc<dyn NotificationSink>,
}

impl std::fmt::Debug for CareerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CareerContext")
            .field("ranks", &self.ranks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CareerContext {
    /// Creates a context.
    #[must_use]
    pub const fn new(
        ranks: RankTable,
        config: CareerConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            ranks,
            config,
            notifier,
        }
    }
}

/// A committed career transition.
pub(crate) struct Committed {
    pub(crate) result: TransitionResult,
    pub(crate) persisted: PersistTransitionResult,
}

// ============================================================================
// Transaction helpers
// ============================================================================

/// Loads state, applies `command`, and persists the result, retrying on
/// conflict.
pub(crate) fn transact<F>(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    command: &Command,
    cause: &Cause,
    now: OffsetDateTime,
    mut load: F,
) -> Result<Committed, ApiError>
where
    F: FnMut(&mut Persistence) -> Result<CareerState, ApiError>,
{
    let mut attempt: u32 = 0;
    loop {
        let state: CareerState = load(persistence)?;
        let result: TransitionResult = apply(
            &state,
            &ctx.ranks,
            command.clone(),
            actor.to_audit_actor(),
            cause.clone(),
            now,
        )
        .map_err(translate_core_error)?;

        match persistence.persist_transition(&result) {
            Ok(persisted) => {
                info!(
                    action = %result.audit_event.action.name,
                    actor = %actor.pilot_id,
                    pilot = %state.profile.pilot_id,
                    event_id = persisted.event_id,
                    "Committed career transition"
                );
                return Ok(Committed { result, persisted });
            }
            Err(err) if err.is_conflict() && attempt < ctx.config.max_conflict_retries => {
                attempt += 1;
                warn!(
                    action = %result.audit_event.action.name,
                    attempt,
                    error = %err,
                    "Concurrent modification, reloading"
                );
            }
            Err(err) => return Err(ApiError::from(err)),
        }
    }
}

/// Catalog counterpart of [`transact`].
fn transact_catalog<F>(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    command: &CatalogCommand,
    cause: &Cause,
    now: OffsetDateTime,
    mut load: F,
) -> Result<PersistCatalogResult, ApiError>
where
    F: FnMut(&mut Persistence) -> Result<CatalogState, ApiError>,
{
    let mut attempt: u32 = 0;
    loop {
        let state: CatalogState = load(persistence)?;
        let result: CatalogResult = apply_catalog(
            &state,
            command.clone(),
            actor.to_audit_actor(),
            cause.clone(),
            now,
        )
        .map_err(translate_core_error)?;

        match persistence.persist_catalog(&result) {
            Ok(persisted) => {
                info!(
                    action = %result.audit_event.action.name,
                    actor = %actor.pilot_id,
                    event_id = persisted.event_id,
                    created = persisted.created_ids.len(),
                    "Committed catalog change"
                );
                return Ok(persisted);
            }
            Err(err) if err.is_conflict() && attempt < ctx.config.max_conflict_retries => {
                attempt += 1;
                warn!(
                    action = %result.audit_event.action.name,
                    attempt,
                    error = %err,
                    "Concurrent catalog modification, reloading"
                );
            }
            Err(err) => return Err(ApiError::from(err)),
        }
    }
}

// ============================================================================
// Loaders
// ============================================================================

/// Loads the caller's own career, provisioning it on first use.
fn load_own_career(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<CareerState, ApiError> {
    let (profile, stats): (PilotProfile, StatsAggregate) = persistence.get_or_create_career(
        &actor.pilot_id,
        &actor.callsign,
        actor.career_approved,
        &ctx.ranks,
        now,
    )?;
    debug!(pilot = %profile.pilot_id, version = profile.version, "Loaded career");
    Ok(CareerState::new(profile, stats))
}

/// Loads an existing career; another pilot's career is never provisioned.
fn load_career_of(
    persistence: &mut Persistence,
    pilot_id: &PilotId,
) -> Result<CareerState, ApiError> {
    let profile: PilotProfile = persistence.get_profile(pilot_id)?.ok_or_else(|| {
        ApiError::not_found("Pilot career", format!("Pilot '{pilot_id}' has no career"))
    })?;
    let stats: StatsAggregate = persistence.get_stats(pilot_id)?.ok_or_else(|| {
        ApiError::not_found("Pilot career", format!("Pilot '{pilot_id}' has no statistics"))
    })?;
    Ok(CareerState::new(profile, stats))
}

fn require_leg(persistence: &mut Persistence, leg_id: LegId) -> Result<FlightLeg, ApiError> {
    persistence
        .get_flight_leg(leg_id)?
        .ok_or_else(|| ApiError::not_found("Flight leg", format!("Leg {leg_id} does not exist")))
}

fn require_pirep(persistence: &mut Persistence, pirep_id: PirepId) -> Result<Pirep, ApiError> {
    persistence
        .get_pirep(pirep_id)?
        .ok_or_else(|| ApiError::not_found("PIREP", format!("PIREP {pirep_id} does not exist")))
}

fn require_rating(
    persistence: &mut Persistence,
    type_rating_id: TypeRatingId,
) -> Result<TypeRating, ApiError> {
    persistence.get_type_rating(type_rating_id)?.ok_or_else(|| {
        ApiError::not_found(
            "Type rating",
            format!("Type rating {type_rating_id} does not exist"),
        )
    })
}

/// Loads the filer's career with the report and, for reviews, its leg.
fn load_pirep_career(
    persistence: &mut Persistence,
    pirep_id: PirepId,
    with_leg: bool,
) -> Result<CareerState, ApiError> {
    let pirep: Pirep = require_pirep(persistence, pirep_id)?;
    let leg: Option<FlightLeg> = match pirep.leg_id {
        Some(leg_id) if with_leg => persistence.get_flight_leg(leg_id)?,
        _ => None,
    };
    Ok(load_career_of(persistence, &pirep.pilot_id)?
        .with_leg(leg)
        .with_pirep(Some(pirep)))
}

fn catalog_ratings(persistence: &mut Persistence) -> Result<CatalogState, ApiError> {
    Ok(CatalogState {
        type_ratings: persistence.list_type_ratings()?,
        leg: None,
    })
}

fn catalog_leg(persistence: &mut Persistence, leg_id: LegId) -> Result<CatalogState, ApiError> {
    Ok(CatalogState {
        type_ratings: Vec::new(),
        leg: persistence.get_flight_leg(leg_id)?,
    })
}

// ============================================================================
// Request translation
// ============================================================================

fn draft_from(figures: PirepFigures) -> PirepDraft {
    PirepDraft {
        inputs: FlightReportInputs {
            flight_time_hours: figures.flight_time_hours,
            flight_time_minutes: figures.flight_time_minutes,
            passengers: figures.passengers,
            cargo_kg: figures.cargo_kg,
            fuel_used_kg: figures.fuel_used_kg,
        },
        flight_date: figures.flight_date,
        remarks: figures.remarks,
    }
}

fn amendment_from(edits: PirepEdits) -> PirepAmendment {
    PirepAmendment {
        flight_time_hours: edits.flight_time_hours,
        flight_time_minutes: edits.flight_time_minutes,
        passengers: edits.passengers,
        cargo_kg: edits.cargo_kg,
        fuel_used_kg: edits.fuel_used_kg,
        flight_date: edits.flight_date,
        remarks: edits.remarks,
    }
}

fn rating_spec_from(request: TypeRatingRequest) -> Result<TypeRatingSpec, ApiError> {
    let body_type: BodyType = match request.body_type.as_deref() {
        Some(value) => BodyType::from_str(value).map_err(translate_domain_error)?,
        None => BodyType::default(),
    };
    Ok(TypeRatingSpec {
        type_name: request.type_name,
        aircraft_family: request.aircraft_family,
        purchase_price: request.purchase_price,
        base_rate: request.base_rate,
        multiplier: request.multiplier,
        seats: request.seats,
        description: request.description,
        body_type,
        rank_required: request.rank_required,
        is_locked: request.is_locked,
    })
}

fn leg_spec_from(request: FlightLegRequest) -> FlightLegSpec {
    FlightLegSpec {
        flight_number: request.flight_number,
        origin: request.origin,
        destination: request.destination,
        aircraft_type: request.aircraft_type,
        aircraft_family: request.aircraft_family,
        distance_nm: request.distance_nm,
        estimated_minutes: request.estimated_minutes,
        locked: request.locked,
    }
}

fn missing_id(what: &str) -> ApiError {
    ApiError::Internal {
        message: format!("Persistence did not return the {what} id"),
    }
}

// ============================================================================
// Pilot career reads
// ============================================================================

/// Returns the caller's profile with rank progression.
///
/// # Errors
///
/// Returns an error if the caller lacks `ViewCareer` or storage fails.
pub fn get_profile(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<ProfileResponse, ApiError> {
    AuthorizationService::require(actor, Capability::ViewCareer, "get_profile")?;
    let state: CareerState = load_own_career(persistence, ctx, actor, now)?;

    let rank: RankProgress = ctx.ranks.rank_for(state.profile.flight_time);
    let flown: Decimal = state.profile.flight_time.hours();
    let hours_to_next_rank: Option<Decimal> = rank
        .next_rank_hours
        .map(|hours| (Decimal::from(hours) - flown).max(Decimal::ZERO));

    Ok(ProfileResponse {
        profile: state.profile,
        rank,
        hours_to_next_rank,
        capabilities: actor.capabilities().to_vec(),
    })
}

/// Returns a pilot's statistics.
///
/// The caller's own statistics are provisioned on first use; another
/// pilot's are only visible to administrators.
///
/// # Errors
///
/// Returns an error if the caller may not view the career or it does not exist.
pub fn get_stats(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    pilot_id: &PilotId,
    now: OffsetDateTime,
) -> Result<StatsResponse, ApiError> {
    AuthorizationService::require(actor, Capability::ViewCareer, "get_stats")?;
    AuthorizationService::require_self_or_admin(actor, pilot_id, "get_stats")?;

    let stats: StatsAggregate = if *pilot_id == actor.pilot_id {
        load_own_career(persistence, ctx, actor, now)?.stats
    } else {
        load_career_of(persistence, pilot_id)?.stats
    };
    Ok(StatsResponse { stats })
}

/// Folds a pilot's approved reports into route tallies over a window.
///
/// `window` accepts `all`, `30d`, `7d`, or an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns an error if the window is malformed or the caller may not view
/// the career.
pub fn get_route_history(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    pilot_id: &PilotId,
    window: Option<&str>,
    now: OffsetDateTime,
) -> Result<RouteHistoryResponse, ApiError> {
    AuthorizationService::require(actor, Capability::ViewCareer, "get_route_history")?;
    AuthorizationService::require_self_or_admin(actor, pilot_id, "get_route_history")?;

    let window: HistoryWindow =
        HistoryWindow::from_str(window.unwrap_or("all")).map_err(translate_domain_error)?;
    let since: Option<OffsetDateTime> = window.cutoff(now);
    let approved: Vec<Pirep> = persistence.list_approved_pireps_for_pilot(pilot_id)?;
    let routes: Vec<RouteTally> = fold_route_history(&approved, since);

    Ok(RouteHistoryResponse {
        pilot_id: pilot_id.clone(),
        since,
        routes,
    })
}

/// Returns the top pilots by `metric`.
///
/// # Errors
///
/// Returns an error if the metric is unknown or storage fails.
pub fn get_leaderboard(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    metric: Option<&str>,
    limit: Option<usize>,
) -> Result<LeaderboardResponse, ApiError> {
    AuthorizationService::require(actor, Capability::ViewCareer, "get_leaderboard")?;

    let metric: LeaderboardMetric = match metric {
        Some(value) => LeaderboardMetric::from_str(value).map_err(translate_domain_error)?,
        None => LeaderboardMetric::default(),
    };
    let limit: usize = ctx.config.leaderboard_limit(limit);

    let profiles: HashMap<PilotId, PilotProfile> = persistence
        .list_profiles()?
        .into_iter()
        .map(|p| (p.pilot_id.clone(), p))
        .collect();
    let ranked: Vec<StatsAggregate> = rank_leaderboard(persistence.list_stats()?, metric, limit);

    let entries: Vec<LeaderboardEntry> = ranked
        .into_iter()
        .enumerate()
        .map(|(idx, stats)| {
            let profile: Option<&PilotProfile> = profiles.get(&stats.pilot_id);
            LeaderboardEntry {
                position: idx + 1,
                callsign: profile.map(|p| p.callsign.clone()).unwrap_or_default(),
                rank: profile.map(|p| p.rank.clone()).unwrap_or_default(),
                total_earnings: stats.total_earnings,
                total_flight_minutes: stats.total_flight_time.minutes(),
                total_flights: stats.total_flights,
                total_distance_nm: stats.total_distance_nm,
                pilot_id: stats.pilot_id,
            }
        })
        .collect();

    Ok(LeaderboardResponse { metric, entries })
}

// ============================================================================
// Type ratings (pilot)
// ============================================================================

/// Lists the catalog annotated with the caller's ownership, cheapest first.
///
/// # Errors
///
/// Returns an error if the caller lacks `ViewCareer` or storage fails.
pub fn list_type_ratings_for_pilot(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<ListTypeRatingsResponse, ApiError> {
    AuthorizationService::require(actor, Capability::ViewCareer, "list_type_ratings")?;
    let profile: PilotProfile = load_own_career(persistence, ctx, actor, now)?.profile;

    let type_ratings: Vec<TypeRatingView> = persistence
        .list_type_ratings()?
        .into_iter()
        .map(|rating| {
            let owned: bool = rating.type_rating_id.is_some_and(|id| profile.owns(id));
            let status: RatingOwnership = if owned {
                RatingOwnership::Owned
            } else if rating.spec.is_locked {
                RatingOwnership::Locked
            } else {
                RatingOwnership::Available
            };
            let is_active: bool = profile
                .active_family
                .as_deref()
                .is_some_and(|family| rating.is_in_family(family));
            TypeRatingView {
                type_rating: rating,
                status,
                is_active,
            }
        })
        .collect();

    Ok(ListTypeRatingsResponse { type_ratings })
}

fn rating_action(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    command: &Command,
    type_rating_id: TypeRatingId,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<RatingActionResponse, ApiError> {
    let committed: Committed = transact(persistence, ctx, actor, command, cause, now, |p| {
        let ratings: Vec<TypeRating> = p.list_type_ratings()?;
        let assigned: Vec<FlightLeg> = p.list_assigned_legs(&actor.pilot_id)?;
        Ok(load_own_career(p, ctx, actor, now)?
            .with_type_ratings(ratings)
            .with_assigned_legs(assigned))
    })?;

    let profile: &PilotProfile = &committed.result.new_state.profile;
    Ok(RatingActionResponse {
        event_id: committed.persisted.event_id,
        type_rating_id,
        balance: profile.balance,
        active_family: profile.active_family.clone(),
        message: committed
            .result
            .audit_event
            .action
            .details
            .clone()
            .unwrap_or_default(),
    })
}

/// Buys a type rating for the caller.
///
/// # Errors
///
/// Returns an error if the rating is unknown, already owned, locked, or
/// unaffordable, or the caller lacks career access.
pub fn purchase_type_rating(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    type_rating_id: TypeRatingId,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<RatingActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::FlyCareer, "purchase_type_rating")?;
    let command: Command = Command::PurchaseTypeRating { type_rating_id };
    rating_action(persistence, ctx, actor, &command, type_rating_id, cause, now)
}

/// Makes an owned rating's family the caller's active family.
///
/// # Errors
///
/// Returns an error if the rating is not owned or the caller has a leg in
/// flight in another family.
pub fn activate_type_rating(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    type_rating_id: TypeRatingId,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<RatingActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::FlyCareer, "activate_type_rating")?;
    let command: Command = Command::ActivateTypeRating { type_rating_id };
    rating_action(persistence, ctx, actor, &command, type_rating_id, cause, now)
}

// ============================================================================
// Flight legs (pilot)
// ============================================================================

/// Lists open legs in the caller's active family plus the caller's own legs.
///
/// # Errors
///
/// Returns an error if the caller lacks `ViewCareer` or storage fails.
pub fn list_legs(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<ListFlightLegsResponse, ApiError> {
    AuthorizationService::require(actor, Capability::ViewCareer, "list_legs")?;
    let profile: PilotProfile = load_own_career(persistence, ctx, actor, now)?.profile;
    let legs: Vec<FlightLeg> =
        persistence.list_dispatch_board(&actor.pilot_id, profile.active_family.as_deref())?;
    Ok(ListFlightLegsResponse { legs })
}

/// Lists only the legs assigned to the caller.
///
/// # Errors
///
/// Returns an error if the caller lacks `ViewCareer` or storage fails.
pub fn list_my_legs(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListFlightLegsResponse, ApiError> {
    AuthorizationService::require(actor, Capability::ViewCareer, "list_my_legs")?;
    let legs: Vec<FlightLeg> = persistence.list_assigned_legs(&actor.pilot_id)?;
    Ok(ListFlightLegsResponse { legs })
}

fn leg_action(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    command: &Command,
    leg_id: LegId,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<LegActionResponse, ApiError> {
    require_leg(persistence, leg_id)?;
    let committed: Committed = transact(persistence, ctx, actor, command, cause, now, |p| {
        let leg: Option<FlightLeg> = p.get_flight_leg(leg_id)?;
        let reports: Vec<Pirep> = p.list_pireps_for_leg(leg_id)?;
        Ok(load_own_career(p, ctx, actor, now)?
            .with_leg(leg)
            .with_leg_reports(reports))
    })?;

    Ok(LegActionResponse {
        event_id: committed.persisted.event_id,
        leg: require_leg(persistence, leg_id)?,
        message: committed
            .result
            .audit_event
            .action
            .details
            .unwrap_or_default(),
    })
}

/// Claims an available leg for the caller.
///
/// # Errors
///
/// Returns an error if the leg is unknown or not available, or its family
/// is not the caller's active family.
pub fn dispatch_leg(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    leg_id: LegId,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<LegActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::FlyCareer, "dispatch_leg")?;
    leg_action(persistence, ctx, actor, &Command::DispatchLeg, leg_id, cause, now)
}

/// Marks the caller's own dispatched leg as flown.
///
/// # Errors
///
/// Returns an error if the leg is unknown, not dispatched, assigned to
/// someone else, or has no report awaiting review.
pub fn complete_leg(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    leg_id: LegId,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<LegActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::FlyCareer, "complete_leg")?;
    leg_action(persistence, ctx, actor, &Command::CompleteLeg, leg_id, cause, now)
}

// ============================================================================
// PIREPs
// ============================================================================

/// Files a report against the caller's dispatched leg.
///
/// Earnings are computed from the catalog rating resolved for the leg's
/// aircraft; a notification is sent after commit.
///
/// # Errors
///
/// Returns an error if the leg is not dispatched to the caller, already has
/// a live report, no rating matches its aircraft, or an input is negative.
pub fn file_pirep(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    request: FilePirepRequest,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<PirepActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::FlyCareer, "file_pirep")?;
    let leg_id: LegId = request.leg_id;
    require_leg(persistence, leg_id)?;

    let command: Command = Command::FilePirep {
        draft: draft_from(request.figures),
    };
    let committed: Committed = transact(persistence, ctx, actor, &command, cause, now, |p| {
        let leg: Option<FlightLeg> = p.get_flight_leg(leg_id)?;
        let reports: Vec<Pirep> = p.list_pireps_for_leg(leg_id)?;
        let ratings: Vec<TypeRating> = p.list_type_ratings()?;
        Ok(load_own_career(p, ctx, actor, now)?
            .with_leg(leg)
            .with_leg_reports(reports)
            .with_type_ratings(ratings))
    })?;

    let pirep_id: PirepId = committed
        .persisted
        .pirep_id
        .ok_or_else(|| missing_id("PIREP"))?;
    let pirep: Pirep = require_pirep(persistence, pirep_id)?;

    deliver(
        ctx.notifier.as_ref(),
        &CareerNotification::PirepFiled {
            pirep_id,
            pilot_id: pirep.pilot_id.clone(),
            callsign: pirep.snapshot.callsign.clone(),
            flight_number: pirep.snapshot.flight_number.clone(),
            grand_total: pirep.earnings.grand_total,
        },
    );

    Ok(PirepActionResponse {
        event_id: committed.persisted.event_id,
        message: format!(
            "Filed PIREP {pirep_id} for {} with grand total {}",
            pirep.snapshot.flight_number, pirep.earnings.grand_total
        ),
        pirep: Some(pirep),
    })
}

/// Edits the figures of the caller's pending report.
///
/// Omitted fields keep their filed values. Earnings are recomputed with the
/// rate captured at filing.
///
/// # Errors
///
/// Returns an error if the report is unknown, not the caller's, or no
/// longer pending.
pub fn update_pirep(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    pirep_id: PirepId,
    edits: PirepEdits,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<PirepActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::OwnPirep, "update_pirep")?;
    let command: Command = Command::UpdatePirep {
        amendment: amendment_from(edits),
    };
    let committed: Committed = transact(persistence, ctx, actor, &command, cause, now, |p| {
        load_pirep_career(p, pirep_id, false)
    })?;

    let pirep: Pirep = require_pirep(persistence, pirep_id)?;
    Ok(PirepActionResponse {
        event_id: committed.persisted.event_id,
        message: format!(
            "Updated PIREP {pirep_id}, grand total now {}",
            pirep.earnings.grand_total
        ),
        pirep: Some(pirep),
    })
}

/// Deletes a report.
///
/// Without a reason only the filer may delete, and only while pending.
/// With a reason the deletion is an administrative override.
///
/// # Errors
///
/// Returns an error if the report is unknown, the caller may not delete
/// it, or an override is requested without `CareerAdmin`.
pub fn delete_pirep(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    pirep_id: PirepId,
    request: DeletePirepRequest,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<PirepActionResponse, ApiError> {
    if request.override_reason.is_some() {
        AuthorizationService::require(actor, Capability::CareerAdmin, "override_delete_pirep")?;
    } else {
        AuthorizationService::require(actor, Capability::OwnPirep, "delete_pirep")?;
    }

    let command: Command = Command::DeletePirep {
        override_reason: request.override_reason,
    };
    let committed: Committed = transact(persistence, ctx, actor, &command, cause, now, |p| {
        load_pirep_career(p, pirep_id, false)
    })?;

    Ok(PirepActionResponse {
        event_id: committed.persisted.event_id,
        pirep: None,
        message: committed
            .result
            .audit_event
            .action
            .details
            .unwrap_or_default(),
    })
}

fn review_pirep(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    pirep_id: PirepId,
    command: &Command,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<PirepActionResponse, ApiError> {
    let committed: Committed = transact(persistence, ctx, actor, command, cause, now, |p| {
        load_pirep_career(p, pirep_id, true)
    })?;

    let pirep: Pirep = require_pirep(persistence, pirep_id)?;
    deliver(
        ctx.notifier.as_ref(),
        &CareerNotification::PirepReviewed {
            pirep_id,
            pilot_id: pirep.pilot_id.clone(),
            status: pirep.status,
        },
    );

    Ok(PirepActionResponse {
        event_id: committed.persisted.event_id,
        message: committed
            .result
            .audit_event
            .action
            .details
            .unwrap_or_default(),
        pirep: Some(pirep),
    })
}

/// Approves a pending report, crediting the filer and completing the leg
/// in one transaction.
///
/// # Errors
///
/// Returns `InvalidState` if the report was already reviewed, so a retried
/// approval never credits twice.
pub fn approve_pirep(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    pirep_id: PirepId,
    request: ReviewPirepRequest,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<PirepActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "approve_pirep")?;
    let command: Command = Command::ApprovePirep {
        notes: request.notes,
    };
    review_pirep(persistence, ctx, actor, pirep_id, &command, cause, now)
}

/// Rejects a pending report, returning a completed leg to dispatched.
///
/// # Errors
///
/// Returns `InvalidState` if the report was already reviewed.
pub fn reject_pirep(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    pirep_id: PirepId,
    request: ReviewPirepRequest,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<PirepActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "reject_pirep")?;
    let command: Command = Command::RejectPirep {
        notes: request.notes,
    };
    review_pirep(persistence, ctx, actor, pirep_id, &command, cause, now)
}

/// Returns one report to its filer or an administrator.
///
/// # Errors
///
/// Returns an error if the report is unknown or belongs to someone else.
pub fn get_pirep(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    pirep_id: PirepId,
) -> Result<Pirep, ApiError> {
    AuthorizationService::require(actor, Capability::ViewCareer, "get_pirep")?;
    let pirep: Pirep = require_pirep(persistence, pirep_id)?;
    AuthorizationService::require_self_or_admin(actor, &pirep.pilot_id, "get_pirep")?;
    Ok(pirep)
}

/// Lists the caller's reports, newest first.
///
/// # Errors
///
/// Returns an error if the caller lacks `ViewCareer` or storage fails.
pub fn list_my_pireps(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListPirepsResponse, ApiError> {
    AuthorizationService::require(actor, Capability::ViewCareer, "list_my_pireps")?;
    let pireps: Vec<Pirep> = persistence.list_pireps_for_pilot(&actor.pilot_id)?;
    Ok(ListPirepsResponse { pireps })
}

/// Lists the review queue, oldest first.
///
/// # Errors
///
/// Returns an error if the caller lacks `CareerAdmin` or storage fails.
pub fn list_pending_pireps(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListPirepsResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "list_pending_pireps")?;
    let pireps: Vec<Pirep> = persistence.list_pending_pireps()?;
    debug!(count = pireps.len(), "Loaded review queue");
    Ok(ListPirepsResponse { pireps })
}

// ============================================================================
// Catalog administration
// ============================================================================

fn catalog_response(persisted: PersistCatalogResult, message: String) -> CatalogActionResponse {
    CatalogActionResponse {
        event_id: persisted.event_id,
        created_ids: persisted.created_ids,
        message,
    }
}

/// Lists every flight leg regardless of status.
///
/// # Errors
///
/// Returns an error if the caller lacks `CareerAdmin` or storage fails.
pub fn list_all_legs(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListFlightLegsResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "list_all_legs")?;
    let legs: Vec<FlightLeg> = persistence.list_flight_legs()?;
    Ok(ListFlightLegsResponse { legs })
}

/// Adds a type rating to the catalog.
///
/// # Errors
///
/// Returns an error if a field is invalid or the type name is taken.
pub fn create_type_rating(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    request: TypeRatingRequest,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<CatalogActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "create_type_rating")?;
    let spec: TypeRatingSpec = rating_spec_from(request)?;
    let type_name: String = spec.type_name.clone();
    let command: CatalogCommand = CatalogCommand::CreateTypeRating { spec };
    let persisted: PersistCatalogResult =
        transact_catalog(persistence, ctx, actor, &command, cause, now, catalog_ratings)?;
    Ok(catalog_response(
        persisted,
        format!("Created type rating '{type_name}'"),
    ))
}

/// Replaces a type rating's fields.
///
/// Reports already filed keep the rate captured in their snapshot.
///
/// # Errors
///
/// Returns an error if the rating is unknown, a field is invalid, or the
/// new type name is taken.
pub fn update_type_rating(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    type_rating_id: TypeRatingId,
    request: TypeRatingRequest,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<CatalogActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "update_type_rating")?;
    require_rating(persistence, type_rating_id)?;
    let command: CatalogCommand = CatalogCommand::UpdateTypeRating {
        type_rating_id,
        spec: rating_spec_from(request)?,
    };
    let persisted: PersistCatalogResult =
        transact_catalog(persistence, ctx, actor, &command, cause, now, catalog_ratings)?;
    Ok(catalog_response(
        persisted,
        format!("Updated type rating {type_rating_id}"),
    ))
}

/// Removes a type rating; owners lose it and purchase records remain.
///
/// # Errors
///
/// Returns an error if the rating is unknown.
pub fn delete_type_rating(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    type_rating_id: TypeRatingId,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<CatalogActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "delete_type_rating")?;
    require_rating(persistence, type_rating_id)?;
    let command: CatalogCommand = CatalogCommand::DeleteTypeRating { type_rating_id };
    let persisted: PersistCatalogResult =
        transact_catalog(persistence, ctx, actor, &command, cause, now, catalog_ratings)?;
    Ok(catalog_response(
        persisted,
        format!("Deleted type rating {type_rating_id}"),
    ))
}

/// Adds a flight leg.
///
/// # Errors
///
/// Returns an error if a field is invalid.
pub fn create_flight_leg(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    request: FlightLegRequest,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<CatalogActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "create_flight_leg")?;
    let spec: FlightLegSpec = leg_spec_from(request);
    let flight_number: String = spec.flight_number.clone();
    let command: CatalogCommand = CatalogCommand::CreateFlightLeg { spec };
    let persisted: PersistCatalogResult =
        transact_catalog(persistence, ctx, actor, &command, cause, now, |_| {
            Ok(CatalogState::default())
        })?;
    Ok(catalog_response(
        persisted,
        format!("Created flight leg {flight_number}"),
    ))
}

/// Replaces a leg's fields; status and assignment are kept.
///
/// # Errors
///
/// Returns an error if the leg is unknown or a field is invalid.
pub fn update_flight_leg(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    leg_id: LegId,
    request: FlightLegRequest,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<CatalogActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "update_flight_leg")?;
    require_leg(persistence, leg_id)?;
    let command: CatalogCommand = CatalogCommand::UpdateFlightLeg {
        leg_id,
        spec: leg_spec_from(request),
    };
    let persisted: PersistCatalogResult =
        transact_catalog(persistence, ctx, actor, &command, cause, now, |p| {
            catalog_leg(p, leg_id)
        })?;
    Ok(catalog_response(persisted, format!("Updated flight leg {leg_id}")))
}

/// Removes a leg; a dispatched or completed leg needs an override reason.
///
/// # Errors
///
/// Returns an error if the leg is unknown or an in-flight leg is deleted
/// without a reason.
pub fn delete_flight_leg(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    leg_id: LegId,
    request: DeleteFlightLegRequest,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<CatalogActionResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "delete_flight_leg")?;
    require_leg(persistence, leg_id)?;
    let command: CatalogCommand = CatalogCommand::DeleteFlightLeg {
        leg_id,
        override_reason: request.override_reason,
    };
    let persisted: PersistCatalogResult =
        transact_catalog(persistence, ctx, actor, &command, cause, now, |p| {
            catalog_leg(p, leg_id)
        })?;
    Ok(catalog_response(persisted, format!("Deleted flight leg {leg_id}")))
}

fn import_response<T>(
    parsed: &ParsedCsv<T>,
    persisted: Option<PersistCatalogResult>,
) -> ImportCsvResponse {
    let (event_id, created_ids): (Option<i64>, Vec<i64>) = persisted
        .map_or((None, Vec::new()), |p| (Some(p.event_id), p.created_ids));
    ImportCsvResponse {
        total_rows: parsed.rows.len(),
        imported: created_ids.len(),
        created_ids,
        rows: parsed.rows.clone(),
        event_id,
    }
}

/// Imports flight legs from CSV when every row is valid.
///
/// # Errors
///
/// Returns an error if the CSV cannot be read. Invalid rows are reported
/// in the response and nothing is imported.
pub fn import_flight_legs_csv(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    request: &ImportCsvRequest,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<ImportCsvResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "import_flight_legs_csv")?;
    let parsed: ParsedCsv<FlightLegSpec> = parse_flight_legs_csv(&request.csv_content)?;
    if !parsed.all_valid() {
        info!(rows = parsed.rows.len(), "Flight leg CSV has invalid rows, nothing imported");
        return Ok(import_response(&parsed, None));
    }

    let command: CatalogCommand = CatalogCommand::ImportFlightLegs {
        specs: parsed.specs.clone(),
    };
    let persisted: PersistCatalogResult =
        transact_catalog(persistence, ctx, actor, &command, cause, now, |_| {
            Ok(CatalogState::default())
        })?;
    Ok(import_response(&parsed, Some(persisted)))
}

/// Imports type ratings from CSV when every row is valid.
///
/// # Errors
///
/// Returns an error if the CSV cannot be read. Invalid rows, including
/// names already in the catalog, are reported and nothing is imported.
pub fn import_type_ratings_csv(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    request: &ImportCsvRequest,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<ImportCsvResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "import_type_ratings_csv")?;
    let existing: HashSet<String> = persistence
        .list_type_ratings()?
        .into_iter()
        .map(|r| r.spec.type_name)
        .collect();
    let parsed: ParsedCsv<TypeRatingSpec> =
        parse_type_ratings_csv(&request.csv_content, &existing)?;
    if !parsed.all_valid() {
        info!(rows = parsed.rows.len(), "Type rating CSV has invalid rows, nothing imported");
        return Ok(import_response(&parsed, None));
    }

    let command: CatalogCommand = CatalogCommand::ImportTypeRatings {
        specs: parsed.specs.clone(),
    };
    let persisted: PersistCatalogResult =
        transact_catalog(persistence, ctx, actor, &command, cause, now, catalog_ratings)?;
    Ok(import_response(&parsed, Some(persisted)))
}

// ============================================================================
// Pilot administration and reporting
// ============================================================================

/// Grants or revokes a provisioned pilot's career access.
///
/// # Errors
///
/// Returns an error if the caller lacks `CareerAdmin` or the pilot has no
/// career.
pub fn set_career_access(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    actor: &AuthenticatedActor,
    pilot_id: &PilotId,
    request: SetCareerAccessRequest,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<CareerAccessResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "set_career_access")?;
    let command: Command = Command::SetCareerAccess {
        approved: request.approved,
    };
    let committed: Committed = transact(persistence, ctx, actor, &command, cause, now, |p| {
        load_career_of(p, pilot_id)
    })?;

    let verb: &str = if request.approved {
        "Granted"
    } else {
        "Revoked"
    };
    Ok(CareerAccessResponse {
        event_id: committed.persisted.event_id,
        pilot_id: pilot_id.clone(),
        career_approved: committed.result.new_state.profile.career_approved,
        message: format!("{verb} career access for pilot '{pilot_id}'"),
    })
}

/// Lists every provisioned pilot.
///
/// # Errors
///
/// Returns an error if the caller lacks `CareerAdmin` or storage fails.
pub fn list_pilots(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListPilotsResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "list_pilots")?;
    let pilots: Vec<PilotSummary> = persistence
        .list_profiles()?
        .into_iter()
        .map(|p| PilotSummary {
            pilot_id: p.pilot_id,
            callsign: p.callsign,
            rank: p.rank,
            career_approved: p.career_approved,
            balance: p.balance,
        })
        .collect();
    Ok(ListPilotsResponse { pilots })
}

/// Returns fleet-wide career totals.
///
/// # Errors
///
/// Returns an error if the caller lacks `CareerAdmin` or storage fails.
pub fn fleet_analytics(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<FleetAnalyticsResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "fleet_analytics")?;
    Ok(FleetAnalyticsResponse {
        analytics: persistence.fleet_analytics()?,
    })
}

/// Reconciles a pilot's balance against approved earnings and purchases.
///
/// # Errors
///
/// Returns an error if the caller may not view the career or it does not exist.
pub fn verify_ledger(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    pilot_id: &PilotId,
) -> Result<LedgerResponse, ApiError> {
    AuthorizationService::require(actor, Capability::ViewCareer, "verify_ledger")?;
    AuthorizationService::require_self_or_admin(actor, pilot_id, "verify_ledger")?;

    let check: LedgerCheck = persistence.verify_ledger(pilot_id)?;
    let consistent: bool = check.is_consistent();
    if !consistent {
        warn!(
            pilot = %pilot_id,
            stored = %check.stored_balance,
            expected = %check.expected_balance,
            "Ledger mismatch"
        );
    }
    Ok(LedgerResponse {
        pilot_id: check.pilot_id,
        stored_balance: check.stored_balance,
        approved_earnings: check.approved_earnings,
        purchases: check.purchases,
        expected_balance: check.expected_balance,
        consistent,
    })
}

fn audit_event_info(event: AuditEvent) -> AuditEventInfo {
    AuditEventInfo {
        event_id: event.event_id,
        actor_id: event.actor.id,
        actor_type: event.actor.actor_type,
        cause_id: event.cause.id,
        action: event.action.name,
        details: event.action.details,
        before: event.before.data,
        after: event.after.data,
        pilot_id: event.pilot_id,
        recorded_at: event.recorded_at,
    }
}

/// Lists audit events in commit order, optionally for one pilot.
///
/// # Errors
///
/// Returns an error if the caller lacks `CareerAdmin` or storage fails.
pub fn list_audit_events(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    pilot_id: Option<&PilotId>,
) -> Result<ListAuditEventsResponse, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "list_audit_events")?;
    let events: Vec<AuditEventInfo> = persistence
        .list_audit_events(pilot_id)?
        .into_iter()
        .map(audit_event_info)
        .collect();
    Ok(ListAuditEventsResponse { events })
}

/// Returns one audit event.
///
/// # Errors
///
/// Returns an error if the caller lacks `CareerAdmin` or the event does
/// not exist.
pub fn get_audit_event(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    event_id: i64,
) -> Result<AuditEventInfo, ApiError> {
    AuthorizationService::require(actor, Capability::CareerAdmin, "get_audit_event")?;
    Ok(audit_event_info(persistence.get_audit_event(event_id)?))
}
