// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use va_career_domain::{
    Decimal, FleetAnalytics, FlightLeg, LeaderboardMetric, LegId, Money, PilotId, PilotProfile,
    Pirep, RankProgress, RouteTally, StatsAggregate, TypeRating, TypeRatingId,
};

use crate::capabilities::Capability;

// ============================================================================
// Requests
// ============================================================================

/// The figures a pilot reports for a flight.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PirepFigures {
    /// Whole hours flown.
    pub flight_time_hours: i64,
    /// Additional minutes flown.
    pub flight_time_minutes: i64,
    /// Passengers carried.
    pub passengers: i64,
    /// Cargo carried, in kilograms.
    pub cargo_kg: Decimal,
    /// Fuel burned, in kilograms.
    pub fuel_used_kg: Decimal,
    /// The date the flight took place.
    pub flight_date: Option<Date>,
    /// Free-text remarks.
    pub remarks: Option<String>,
}

/// API request to edit a pending report.
///
/// Only the fields present are changed; the rest keep their filed values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PirepEdits {
    pub flight_time_hours: Option<i64>,
    pub flight_time_minutes: Option<i64>,
    pub passengers: Option<i64>,
    pub cargo_kg: Option<Decimal>,
    pub fuel_used_kg: Option<Decimal>,
    pub flight_date: Option<Date>,
    pub remarks: Option<String>,
}

impl From<PirepFigures> for PirepEdits {
    fn from(figures: PirepFigures) -> Self {
        Self {
            flight_time_hours: Some(figures.flight_time_hours),
            flight_time_minutes: Some(figures.flight_time_minutes),
            passengers: Some(figures.passengers),
            cargo_kg: Some(figures.cargo_kg),
            fuel_used_kg: Some(figures.fuel_used_kg),
            flight_date: figures.flight_date,
            remarks: figures.remarks,
        }
    }
}

/// API request to file a report against a dispatched leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePirepRequest {
    /// The leg flown.
    pub leg_id: LegId,
    /// The reported figures.
    #[serde(flatten)]
    pub figures: PirepFigures,
}

/// API request to delete a report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeletePirepRequest {
    /// Required for an administrative override.
    pub override_reason: Option<String>,
}

/// API request to approve or reject a report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReviewPirepRequest {
    /// Reviewer notes.
    pub notes: Option<String>,
}

/// API request carrying a type rating's catalog fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRatingRequest {
    /// Unique type name.
    pub type_name: String,
    /// Family of interchangeable types.
    pub aircraft_family: String,
    /// Purchase price.
    pub purchase_price: Money,
    /// Hourly pay.
    pub base_rate: Money,
    /// Pay multiplier.
    pub multiplier: Decimal,
    /// Seat count.
    #[serde(default)]
    pub seats: u32,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Body type (Narrow-body, Wide-body, Regional).
    #[serde(default)]
    pub body_type: Option<String>,
    /// Rank required to fly the type.
    #[serde(default)]
    pub rank_required: Option<String>,
    /// Whether the rating is withheld from sale.
    #[serde(default)]
    pub is_locked: bool,
}

/// API request carrying a flight leg's catalog fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightLegRequest {
    /// Flight number.
    pub flight_number: String,
    /// Departure airport code.
    pub origin: String,
    /// Arrival airport code.
    pub destination: String,
    /// Aircraft type flown.
    pub aircraft_type: String,
    /// Family of the aircraft type.
    pub aircraft_family: String,
    /// Distance in nautical miles.
    pub distance_nm: i64,
    /// Estimated block time in minutes.
    pub estimated_minutes: i64,
    /// Whether the leg is withdrawn from dispatch.
    #[serde(default)]
    pub locked: bool,
}

/// API request to delete a flight leg.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteFlightLegRequest {
    /// Required when the leg is dispatched or completed.
    pub override_reason: Option<String>,
}

/// API request to grant or revoke career access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCareerAccessRequest {
    /// The new access flag.
    pub approved: bool,
}

/// API request carrying a CSV upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCsvRequest {
    /// The raw CSV text, header row first.
    pub csv_content: String,
}

// ============================================================================
// Responses
// ============================================================================

/// A pilot's profile with rank progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// The stored profile.
    pub profile: PilotProfile,
    /// Rank progression for the profile's flight time.
    pub rank: RankProgress,
    /// Hours still needed for the next rank, if there is one.
    pub hours_to_next_rank: Option<Decimal>,
    /// What the caller may do.
    pub capabilities: Vec<Capability>,
}

/// How a catalog entry relates to the viewing pilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatingOwnership {
    /// For sale.
    Available,
    /// Already bought.
    Owned,
    /// Withheld from sale.
    Locked,
}

/// A catalog entry as seen by a pilot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRatingView {
    /// The catalog entry.
    pub type_rating: TypeRating,
    /// Ownership from the pilot's point of view.
    pub status: RatingOwnership,
    /// Whether the entry belongs to the pilot's active family.
    pub is_active: bool,
}

/// API response listing type ratings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTypeRatingsResponse {
    /// Entries, cheapest first.
    pub type_ratings: Vec<TypeRatingView>,
}

/// API response listing flight legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFlightLegsResponse {
    /// The legs, ordered by flight number.
    pub legs: Vec<FlightLeg>,
}

/// API response after a leg changes state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegActionResponse {
    /// The audit event recording the change.
    pub event_id: i64,
    /// The leg as stored.
    pub leg: FlightLeg,
    /// A success message.
    pub message: String,
}

/// API response after a report changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PirepActionResponse {
    /// The audit event recording the change.
    pub event_id: i64,
    /// The report as stored; `None` once deleted.
    pub pirep: Option<Pirep>,
    /// A success message.
    pub message: String,
}

/// API response listing reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPirepsResponse {
    /// The reports.
    pub pireps: Vec<Pirep>,
}

/// API response after buying or activating a type rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingActionResponse {
    /// The audit event recording the change.
    pub event_id: i64,
    /// The rating acted on.
    pub type_rating_id: TypeRatingId,
    /// The pilot's balance afterwards.
    pub balance: Money,
    /// The pilot's active family afterwards.
    pub active_family: Option<String>,
    /// A success message.
    pub message: String,
}

/// API response after changing a pilot's career access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerAccessResponse {
    /// The audit event recording the change.
    pub event_id: i64,
    /// The pilot affected.
    pub pilot_id: PilotId,
    /// The stored flag.
    pub career_approved: bool,
    /// A success message.
    pub message: String,
}

/// API response after a catalog change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogActionResponse {
    /// The audit event recording the change.
    pub event_id: i64,
    /// Ids of created ratings or legs, in input order.
    pub created_ids: Vec<i64>,
    /// A success message.
    pub message: String,
}

/// API response carrying a pilot's statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    /// The statistics, including route history.
    pub stats: StatsAggregate,
}

/// API response for a route history query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteHistoryResponse {
    /// The pilot queried.
    pub pilot_id: PilotId,
    /// The earliest filing time included, if bounded.
    pub since: Option<OffsetDateTime>,
    /// Route tallies, most flown first.
    pub routes: Vec<RouteTally>,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// One-based position.
    pub position: usize,
    /// The pilot.
    pub pilot_id: PilotId,
    /// The pilot's callsign.
    pub callsign: String,
    /// The pilot's rank.
    pub rank: String,
    /// Approved earnings.
    pub total_earnings: Money,
    /// Approved flight time in minutes.
    pub total_flight_minutes: i64,
    /// Approved flights.
    pub total_flights: i64,
    /// Approved distance.
    pub total_distance_nm: i64,
}

/// API response for a leaderboard query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    /// The ordering applied.
    pub metric: LeaderboardMetric,
    /// The top entries.
    pub entries: Vec<LeaderboardEntry>,
}

/// A pilot as listed for administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PilotSummary {
    /// The pilot.
    pub pilot_id: PilotId,
    /// The pilot's callsign.
    pub callsign: String,
    /// The pilot's rank.
    pub rank: String,
    /// Career access.
    pub career_approved: bool,
    /// Current balance.
    pub balance: Money,
}

/// API response listing pilots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPilotsResponse {
    /// Every provisioned pilot.
    pub pilots: Vec<PilotSummary>,
}

/// API response for fleet analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetAnalyticsResponse {
    /// Fleet-wide totals.
    pub analytics: FleetAnalytics,
}

/// API response for a ledger reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerResponse {
    /// The pilot checked.
    pub pilot_id: PilotId,
    /// The balance stored on the profile.
    pub stored_balance: Money,
    /// Sum of approved report grand totals.
    pub approved_earnings: Money,
    /// Sum of purchase prices paid.
    pub purchases: Money,
    /// The balance the ledger implies.
    pub expected_balance: Money,
    /// Whether the two agree.
    pub consistent: bool,
}

/// An audit event as returned to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInfo {
    /// The event identifier.
    pub event_id: Option<i64>,
    /// Who acted.
    pub actor_id: String,
    /// The actor's type.
    pub actor_type: String,
    /// The request that caused the change.
    pub cause_id: String,
    /// The action name.
    pub action: String,
    /// Action details.
    pub details: Option<String>,
    /// State before.
    pub before: String,
    /// State after.
    pub after: String,
    /// The affected pilot, if any.
    pub pilot_id: Option<PilotId>,
    /// When the change was applied.
    pub recorded_at: OffsetDateTime,
}

/// API response listing audit events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAuditEventsResponse {
    /// Events in commit order.
    pub events: Vec<AuditEventInfo>,
}

/// Status of one CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CsvRowStatus {
    /// Row is valid and can be imported.
    Valid,
    /// Row has validation errors and cannot be imported.
    Invalid,
}

/// Validation report for one CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRowReport {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    /// The row status.
    pub status: CsvRowStatus,
    /// Zero or more validation errors.
    pub errors: Vec<String>,
}

/// API response for a CSV import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCsvResponse {
    /// Data rows read.
    pub total_rows: usize,
    /// Rows written; zero unless every row was valid.
    pub imported: usize,
    /// Ids of the created entries.
    pub created_ids: Vec<i64>,
    /// Per-row validation.
    pub rows: Vec<CsvRowReport>,
    /// The audit event recording the import, if one happened.
    pub event_id: Option<i64>,
}
