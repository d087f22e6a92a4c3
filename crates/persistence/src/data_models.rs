// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and the conversions between rows and domain values.
//!
//! Money and other decimals are stored as TEXT so that values survive a
//! round trip exactly. Timestamps are RFC 3339 TEXT and booleans are
//! INTEGER 0/1.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use va_career_domain::{
    BodyType, Decimal, EarningsBreakdown, FlightLeg, FlightLegSpec, FlightReportInputs,
    FlightTime, LegId, LegStatus, Money, PayRate, PilotId, PilotProfile, Pirep, PirepId,
    PirepSnapshot, PirepStatus, ReviewRecord, RouteHistoryEntry, StatsAggregate, TypeRating,
    TypeRatingId, TypeRatingSpec,
};

use va_career_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};

use crate::diesel_schema::{
    audit_events, career_stats, flight_legs, pilot_profiles, pireps, route_history,
    type_rating_purchases, type_ratings,
};
use crate::error::PersistenceError;

// ============================================================================
// Audit JSON payloads
// ============================================================================

/// JSON shape of an audit actor column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub actor_type: String,
}

impl From<&Actor> for ActorData {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id.clone(),
            actor_type: actor.actor_type.clone(),
        }
    }
}

impl From<ActorData> for Actor {
    fn from(data: ActorData) -> Self {
        Self::new(data.id, data.actor_type)
    }
}

/// JSON shape of an audit cause column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

impl From<&Cause> for CauseData {
    fn from(cause: &Cause) -> Self {
        Self {
            id: cause.id.clone(),
            description: cause.description.clone(),
        }
    }
}

impl From<CauseData> for Cause {
    fn from(data: CauseData) -> Self {
        Self::new(data.id, data.description)
    }
}

/// JSON shape of an audit action column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

impl From<&Action> for ActionData {
    fn from(action: &Action) -> Self {
        Self {
            name: action.name.clone(),
            details: action.details.clone(),
        }
    }
}

impl From<ActionData> for Action {
    fn from(data: ActionData) -> Self {
        Self::new(data.name, data.details)
    }
}

/// JSON shape of a before/after snapshot column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

impl From<&StateSnapshot> for StateSnapshotData {
    fn from(snapshot: &StateSnapshot) -> Self {
        Self {
            data: snapshot.data.clone(),
        }
    }
}

impl From<StateSnapshotData> for StateSnapshot {
    fn from(data: StateSnapshotData) -> Self {
        Self::new(data.data)
    }
}

/// Insertable audit row. The event id is assigned by the database.
#[derive(Insertable)]
#[diesel(table_name = audit_events)]
pub struct NewAuditEventRow {
    pub pilot_id: Option<String>,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
    pub created_at: String,
}

impl TryFrom<&AuditEvent> for NewAuditEventRow {
    type Error = PersistenceError;

    fn try_from(event: &AuditEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            pilot_id: event.pilot_id.as_ref().map(|p| p.value().to_string()),
            actor_json: serde_json::to_string(&ActorData::from(&event.actor))?,
            cause_json: serde_json::to_string(&CauseData::from(&event.cause))?,
            action_json: serde_json::to_string(&ActionData::from(&event.action))?,
            before_snapshot_json: serde_json::to_string(&StateSnapshotData::from(&event.before))?,
            after_snapshot_json: serde_json::to_string(&StateSnapshotData::from(&event.after))?,
            created_at: format_timestamp(event.recorded_at)?,
        })
    }
}

// ============================================================================
// Column codecs
// ============================================================================

/// Formats a timestamp for storage.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be represented in RFC 3339.
pub fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Formats an optional timestamp for storage.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be represented in RFC 3339.
pub fn format_optional_timestamp(
    value: Option<OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    value.map(format_timestamp).transpose()
}

/// Parses a stored timestamp.
///
/// # Errors
///
/// Returns an error if the text is not RFC 3339.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| PersistenceError::ReconstructionError(format!("timestamp '{value}': {e}")))
}

fn parse_optional_timestamp(
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(parse_timestamp).transpose()
}

fn format_date(value: Date) -> Result<String, PersistenceError> {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

fn parse_date(value: &str) -> Result<Date, PersistenceError> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::ReconstructionError(format!("date '{value}': {e}")))
}

/// Parses a stored monetary amount.
///
/// # Errors
///
/// Returns an error if the text is not a decimal.
pub fn parse_money(column: &str, value: &str) -> Result<Money, PersistenceError> {
    Money::from_str(value)
        .map_err(|e| PersistenceError::ReconstructionError(format!("{column} '{value}': {e}")))
}

fn parse_decimal(column: &str, value: &str) -> Result<Decimal, PersistenceError> {
    Decimal::from_str(value)
        .map_err(|e| PersistenceError::ReconstructionError(format!("{column} '{value}': {e}")))
}

fn parse_flight_time(column: &str, minutes: i64) -> Result<FlightTime, PersistenceError> {
    FlightTime::from_minutes(minutes)
        .map_err(|e| PersistenceError::ReconstructionError(format!("{column}: {e}")))
}

fn parse_enum<T: FromStr>(column: &str, value: &str) -> Result<T, PersistenceError>
where
    T::Err: std::fmt::Display,
{
    T::from_str(value)
        .map_err(|e| PersistenceError::ReconstructionError(format!("{column} '{value}': {e}")))
}

const fn flag(value: bool) -> i32 {
    if value { 1 } else { 0 }
}

// ============================================================================
// Pilot profiles
// ============================================================================

/// A stored pilot profile.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = pilot_profiles)]
pub struct PilotProfileRow {
    pub pilot_id: String,
    pub callsign: String,
    pub balance: String,
    pub flight_time_minutes: i64,
    pub total_distance_nm: i64,
    pub rank_name: String,
    pub career_approved: i32,
    pub active_family: Option<String>,
    pub active_type_rating_id: Option<i64>,
    pub created_at: String,
    pub version: i64,
}

impl PilotProfileRow {
    /// Rebuilds the domain profile.
    ///
    /// The owned set is not a column; it is derived from the purchase
    /// ledger and passed in.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored value cannot be parsed.
    pub fn into_domain(
        self,
        owned_ratings: BTreeSet<TypeRatingId>,
    ) -> Result<PilotProfile, PersistenceError> {
        Ok(PilotProfile {
            pilot_id: PilotId::new(&self.pilot_id),
            callsign: self.callsign,
            balance: parse_money("balance", &self.balance)?,
            flight_time: parse_flight_time("flight_time_minutes", self.flight_time_minutes)?,
            total_distance_nm: self.total_distance_nm,
            rank: self.rank_name,
            career_approved: self.career_approved != 0,
            active_family: self.active_family,
            active_type_rating: self.active_type_rating_id.map(TypeRatingId::new),
            owned_ratings,
            created_at: parse_timestamp(&self.created_at)?,
            version: self.version,
        })
    }
}

/// The mutable columns of a pilot profile.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = pilot_profiles, treat_none_as_null = true)]
pub struct PilotProfileValues {
    pub callsign: String,
    pub balance: String,
    pub flight_time_minutes: i64,
    pub total_distance_nm: i64,
    pub rank_name: String,
    pub career_approved: i32,
    pub active_family: Option<String>,
    pub active_type_rating_id: Option<i64>,
}

impl From<&PilotProfile> for PilotProfileValues {
    fn from(profile: &PilotProfile) -> Self {
        Self {
            callsign: profile.callsign.clone(),
            balance: profile.balance.to_string(),
            flight_time_minutes: profile.flight_time.minutes(),
            total_distance_nm: profile.total_distance_nm,
            rank_name: profile.rank.clone(),
            career_approved: flag(profile.career_approved),
            active_family: profile.active_family.clone(),
            active_type_rating_id: profile.active_type_rating.map(|id| id.value()),
        }
    }
}

// ============================================================================
// Career statistics
// ============================================================================

/// A stored statistics aggregate, without its route history.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = career_stats)]
pub struct CareerStatsRow {
    pub pilot_id: String,
    pub total_distance_nm: i64,
    pub total_flight_minutes: i64,
    pub total_earnings: String,
    pub total_flights: i64,
    pub version: i64,
}

impl CareerStatsRow {
    /// Rebuilds the domain aggregate.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored value cannot be parsed.
    pub fn into_domain(
        self,
        owned_ratings: BTreeSet<TypeRatingId>,
        routes: Vec<RouteHistoryEntry>,
    ) -> Result<StatsAggregate, PersistenceError> {
        Ok(StatsAggregate {
            pilot_id: PilotId::new(&self.pilot_id),
            total_distance_nm: self.total_distance_nm,
            total_flight_time: parse_flight_time(
                "total_flight_minutes",
                self.total_flight_minutes,
            )?,
            total_earnings: parse_money("total_earnings", &self.total_earnings)?,
            total_flights: self.total_flights,
            owned_ratings,
            routes,
            version: self.version,
        })
    }
}

/// The mutable columns of a statistics aggregate.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = career_stats)]
pub struct CareerStatsValues {
    pub total_distance_nm: i64,
    pub total_flight_minutes: i64,
    pub total_earnings: String,
    pub total_flights: i64,
}

impl From<&StatsAggregate> for CareerStatsValues {
    fn from(stats: &StatsAggregate) -> Self {
        Self {
            total_distance_nm: stats.total_distance_nm,
            total_flight_minutes: stats.total_flight_time.minutes(),
            total_earnings: stats.total_earnings.to_string(),
            total_flights: stats.total_flights,
        }
    }
}

/// A stored route history entry.
#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = route_history)]
pub struct RouteHistoryRow {
    pub pilot_id: String,
    pub origin: String,
    pub destination: String,
    pub flight_count: i64,
    pub last_flown: String,
}

impl RouteHistoryRow {
    /// Builds the row for one entry of a pilot's history.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp cannot be formatted.
    pub fn from_domain(
        pilot_id: &PilotId,
        entry: &RouteHistoryEntry,
    ) -> Result<Self, PersistenceError> {
        Ok(Self {
            pilot_id: pilot_id.value().to_string(),
            origin: entry.origin.clone(),
            destination: entry.destination.clone(),
            flight_count: entry.count,
            last_flown: format_timestamp(entry.last_flown)?,
        })
    }

    /// Rebuilds the domain entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp cannot be parsed.
    pub fn into_domain(self) -> Result<RouteHistoryEntry, PersistenceError> {
        Ok(RouteHistoryEntry {
            origin: self.origin,
            destination: self.destination,
            count: self.flight_count,
            last_flown: parse_timestamp(&self.last_flown)?,
        })
    }
}

// ============================================================================
// Type ratings and purchases
// ============================================================================

/// A stored type rating.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = type_ratings)]
pub struct TypeRatingRow {
    pub type_rating_id: i64,
    pub type_name: String,
    pub aircraft_family: String,
    pub purchase_price: String,
    pub base_rate: String,
    pub multiplier: String,
    pub seats: i32,
    pub description: String,
    pub body_type: String,
    pub rank_required: Option<String>,
    pub is_locked: i32,
    pub version: i64,
}

impl TryFrom<TypeRatingRow> for TypeRating {
    type Error = PersistenceError;

    fn try_from(row: TypeRatingRow) -> Result<Self, Self::Error> {
        let seats: u32 = u32::try_from(row.seats).map_err(|_| {
            PersistenceError::ReconstructionError(format!("seats '{}' out of range", row.seats))
        })?;
        Ok(Self {
            type_rating_id: Some(TypeRatingId::new(row.type_rating_id)),
            spec: TypeRatingSpec {
                type_name: row.type_name,
                aircraft_family: row.aircraft_family,
                purchase_price: parse_money("purchase_price", &row.purchase_price)?,
                base_rate: parse_money("base_rate", &row.base_rate)?,
                multiplier: parse_decimal("multiplier", &row.multiplier)?,
                seats,
                description: row.description,
                body_type: parse_enum::<BodyType>("body_type", &row.body_type)?,
                rank_required: row.rank_required,
                is_locked: row.is_locked != 0,
            },
            version: row.version,
        })
    }
}

/// The editable columns of a type rating.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = type_ratings, treat_none_as_null = true)]
pub struct TypeRatingValues {
    pub type_name: String,
    pub aircraft_family: String,
    pub purchase_price: String,
    pub base_rate: String,
    pub multiplier: String,
    pub seats: i32,
    pub description: String,
    pub body_type: String,
    pub rank_required: Option<String>,
    pub is_locked: i32,
}

impl TryFrom<&TypeRatingSpec> for TypeRatingValues {
    type Error = PersistenceError;

    fn try_from(spec: &TypeRatingSpec) -> Result<Self, Self::Error> {
        let seats: i32 = i32::try_from(spec.seats).map_err(|_| {
            PersistenceError::SerializationError(format!("seats '{}' out of range", spec.seats))
        })?;
        Ok(Self {
            type_name: spec.type_name.clone(),
            aircraft_family: spec.aircraft_family.clone(),
            purchase_price: spec.purchase_price.to_string(),
            base_rate: spec.base_rate.to_string(),
            multiplier: spec.multiplier.to_string(),
            seats,
            description: spec.description.clone(),
            body_type: spec.body_type.as_str().to_string(),
            rank_required: spec.rank_required.clone(),
            is_locked: flag(spec.is_locked),
        })
    }
}

/// A stored purchase ledger entry.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = type_rating_purchases)]
pub struct PurchaseRow {
    pub purchase_id: i64,
    pub pilot_id: String,
    pub type_rating_id: Option<i64>,
    pub type_name: String,
    pub price: String,
    pub purchased_at: String,
}

/// A purchase ledger entry to insert.
#[derive(Debug, Insertable)]
#[diesel(table_name = type_rating_purchases)]
pub struct NewPurchase {
    pub pilot_id: String,
    pub type_rating_id: Option<i64>,
    pub type_name: String,
    pub price: String,
    pub purchased_at: String,
}

// ============================================================================
// Flight legs
// ============================================================================

/// A stored flight leg.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = flight_legs)]
pub struct FlightLegRow {
    pub leg_id: i64,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub aircraft_type: String,
    pub aircraft_family: String,
    pub distance_nm: i64,
    pub estimated_minutes: i64,
    pub locked: i32,
    pub status: String,
    pub assigned_pilot_id: Option<String>,
    pub dispatched_at: Option<String>,
    pub completed_at: Option<String>,
    pub version: i64,
}

impl TryFrom<FlightLegRow> for FlightLeg {
    type Error = PersistenceError;

    fn try_from(row: FlightLegRow) -> Result<Self, Self::Error> {
        Ok(Self {
            leg_id: Some(LegId::new(row.leg_id)),
            spec: FlightLegSpec {
                flight_number: row.flight_number,
                origin: row.origin,
                destination: row.destination,
                aircraft_type: row.aircraft_type,
                aircraft_family: row.aircraft_family,
                distance_nm: row.distance_nm,
                estimated_minutes: row.estimated_minutes,
                locked: row.locked != 0,
            },
            status: parse_enum::<LegStatus>("status", &row.status)?,
            assigned_pilot: row.assigned_pilot_id.as_deref().map(PilotId::new),
            dispatched_at: parse_optional_timestamp(row.dispatched_at.as_deref())?,
            completed_at: parse_optional_timestamp(row.completed_at.as_deref())?,
            version: row.version,
        })
    }
}

/// Every writable column of a flight leg.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = flight_legs, treat_none_as_null = true)]
pub struct FlightLegValues {
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub aircraft_type: String,
    pub aircraft_family: String,
    pub distance_nm: i64,
    pub estimated_minutes: i64,
    pub locked: i32,
    pub status: String,
    pub assigned_pilot_id: Option<String>,
    pub dispatched_at: Option<String>,
    pub completed_at: Option<String>,
}

impl TryFrom<&FlightLeg> for FlightLegValues {
    type Error = PersistenceError;

    fn try_from(leg: &FlightLeg) -> Result<Self, Self::Error> {
        Ok(Self {
            flight_number: leg.spec.flight_number.clone(),
            origin: leg.spec.origin.clone(),
            destination: leg.spec.destination.clone(),
            aircraft_type: leg.spec.aircraft_type.clone(),
            aircraft_family: leg.spec.aircraft_family.clone(),
            distance_nm: leg.spec.distance_nm,
            estimated_minutes: leg.spec.estimated_minutes,
            locked: flag(leg.spec.locked),
            status: leg.status.as_str().to_string(),
            assigned_pilot_id: leg
                .assigned_pilot
                .as_ref()
                .map(|p| p.value().to_string()),
            dispatched_at: format_optional_timestamp(leg.dispatched_at)?,
            completed_at: format_optional_timestamp(leg.completed_at)?,
        })
    }
}

// ============================================================================
// PIREPs
// ============================================================================

/// A stored PIREP.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = pireps)]
pub struct PirepRow {
    pub pirep_id: i64,
    pub pilot_id: String,
    pub leg_id: Option<i64>,
    pub callsign: String,
    pub rank_name: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub aircraft_type: String,
    pub aircraft_family: String,
    pub distance_nm: i64,
    pub type_name: String,
    pub base_rate: String,
    pub multiplier: String,
    pub flight_time_hours: i64,
    pub flight_time_minutes: i64,
    pub passengers: i64,
    pub cargo_kg: String,
    pub fuel_used_kg: String,
    pub total_hours: String,
    pub base_earnings: String,
    pub flight_earnings: String,
    pub payload_bonus: String,
    pub gross: String,
    pub deductions: String,
    pub grand_total: String,
    pub flight_date: Option<String>,
    pub remarks: Option<String>,
    pub status: String,
    pub reviewer_id: Option<String>,
    pub reviewed_at: Option<String>,
    pub review_notes: Option<String>,
    pub credited_distance_nm: Option<i64>,
    pub filed_at: String,
    pub updated_at: String,
    pub version: i64,
}

impl TryFrom<PirepRow> for Pirep {
    type Error = PersistenceError;

    fn try_from(row: PirepRow) -> Result<Self, Self::Error> {
        let review: Option<ReviewRecord> = match (row.reviewer_id, row.reviewed_at) {
            (Some(reviewer), Some(reviewed_at)) => Some(ReviewRecord {
                reviewer: PilotId::new(&reviewer),
                reviewed_at: parse_timestamp(&reviewed_at)?,
                notes: row.review_notes,
            }),
            _ => None,
        };

        Ok(Self {
            pirep_id: Some(PirepId::new(row.pirep_id)),
            pilot_id: PilotId::new(&row.pilot_id),
            leg_id: row.leg_id.map(LegId::new),
            snapshot: PirepSnapshot {
                callsign: row.callsign,
                rank: row.rank_name,
                flight_number: row.flight_number,
                origin: row.origin,
                destination: row.destination,
                aircraft_type: row.aircraft_type,
                aircraft_family: row.aircraft_family,
                distance_nm: row.distance_nm,
                type_name: row.type_name,
                pay_rate: PayRate {
                    base_rate: parse_money("base_rate", &row.base_rate)?,
                    multiplier: parse_decimal("multiplier", &row.multiplier)?,
                },
            },
            inputs: FlightReportInputs {
                flight_time_hours: row.flight_time_hours,
                flight_time_minutes: row.flight_time_minutes,
                passengers: row.passengers,
                cargo_kg: parse_decimal("cargo_kg", &row.cargo_kg)?,
                fuel_used_kg: parse_decimal("fuel_used_kg", &row.fuel_used_kg)?,
            },
            earnings: EarningsBreakdown {
                total_hours: parse_decimal("total_hours", &row.total_hours)?,
                base_earnings: parse_money("base_earnings", &row.base_earnings)?,
                flight_earnings: parse_money("flight_earnings", &row.flight_earnings)?,
                payload_bonus: parse_money("payload_bonus", &row.payload_bonus)?,
                gross: parse_money("gross", &row.gross)?,
                deductions: parse_money("deductions", &row.deductions)?,
                grand_total: parse_money("grand_total", &row.grand_total)?,
            },
            flight_date: row.flight_date.as_deref().map(parse_date).transpose()?,
            remarks: row.remarks,
            status: parse_enum::<PirepStatus>("status", &row.status)?,
            review,
            credited_distance_nm: row.credited_distance_nm,
            filed_at: parse_timestamp(&row.filed_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            version: row.version,
        })
    }
}

/// Every writable column of a PIREP.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = pireps, treat_none_as_null = true)]
pub struct PirepValues {
    pub pilot_id: String,
    pub leg_id: Option<i64>,
    pub callsign: String,
    pub rank_name: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub aircraft_type: String,
    pub aircraft_family: String,
    pub distance_nm: i64,
    pub type_name: String,
    pub base_rate: String,
    pub multiplier: String,
    pub flight_time_hours: i64,
    pub flight_time_minutes: i64,
    pub passengers: i64,
    pub cargo_kg: String,
    pub fuel_used_kg: String,
    pub total_hours: String,
    pub base_earnings: String,
    pub flight_earnings: String,
    pub payload_bonus: String,
    pub gross: String,
    pub deductions: String,
    pub grand_total: String,
    pub flight_date: Option<String>,
    pub remarks: Option<String>,
    pub status: String,
    pub reviewer_id: Option<String>,
    pub reviewed_at: Option<String>,
    pub review_notes: Option<String>,
    pub credited_distance_nm: Option<i64>,
    pub filed_at: String,
    pub updated_at: String,
}

impl TryFrom<&Pirep> for PirepValues {
    type Error = PersistenceError;

    fn try_from(pirep: &Pirep) -> Result<Self, Self::Error> {
        let review: Option<&ReviewRecord> = pirep.review.as_ref();
        Ok(Self {
            pilot_id: pirep.pilot_id.value().to_string(),
            leg_id: pirep.leg_id.map(|id| id.value()),
            callsign: pirep.snapshot.callsign.clone(),
            rank_name: pirep.snapshot.rank.clone(),
            flight_number: pirep.snapshot.flight_number.clone(),
            origin: pirep.snapshot.origin.clone(),
            destination: pirep.snapshot.destination.clone(),
            aircraft_type: pirep.snapshot.aircraft_type.clone(),
            aircraft_family: pirep.snapshot.aircraft_family.clone(),
            distance_nm: pirep.snapshot.distance_nm,
            type_name: pirep.snapshot.type_name.clone(),
            base_rate: pirep.snapshot.pay_rate.base_rate.to_string(),
            multiplier: pirep.snapshot.pay_rate.multiplier.to_string(),
            flight_time_hours: pirep.inputs.flight_time_hours,
            flight_time_minutes: pirep.inputs.flight_time_minutes,
            passengers: pirep.inputs.passengers,
            cargo_kg: pirep.inputs.cargo_kg.to_string(),
            fuel_used_kg: pirep.inputs.fuel_used_kg.to_string(),
            total_hours: pirep.earnings.total_hours.to_string(),
            base_earnings: pirep.earnings.base_earnings.to_string(),
            flight_earnings: pirep.earnings.flight_earnings.to_string(),
            payload_bonus: pirep.earnings.payload_bonus.to_string(),
            gross: pirep.earnings.gross.to_string(),
            deductions: pirep.earnings.deductions.to_string(),
            grand_total: pirep.earnings.grand_total.to_string(),
            flight_date: pirep.flight_date.map(format_date).transpose()?,
            remarks: pirep.remarks.clone(),
            status: pirep.status.as_str().to_string(),
            reviewer_id: review.map(|r| r.reviewer.value().to_string()),
            reviewed_at: format_optional_timestamp(review.map(|r| r.reviewed_at))?,
            review_notes: review.and_then(|r| r.notes.clone()),
            credited_distance_nm: pirep.credited_distance_nm,
            filed_at: format_timestamp(pirep.filed_at)?,
            updated_at: format_timestamp(pirep.updated_at)?,
        })
    }
}
