// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pilot flight reports.
//!
//! A report is filed `PENDING` and reviewed exactly once, ending in
//! `APPROVED` or `REJECTED`. The pay rate and flight context are copied
//! into the report at filing time so later catalog edits never change
//! historical earnings.

use crate::earnings::{EarningsBreakdown, FlightReportInputs, PayRate, calculate_earnings};
use crate::error::DomainError;
use crate::flight_leg::FlightLeg;
use crate::pilot::PilotProfile;
use crate::type_rating::TypeRating;
use crate::types::{LegId, PilotId, PirepId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Review status of a PIREP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PirepStatus {
    /// Awaiting review.
    Pending,
    /// Accepted and paid.
    Approved,
    /// Refused.
    Rejected,
}

impl PirepStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Returns true if this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Validates a review transition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPirepTransition` unless moving from
    /// `PENDING` to a terminal status.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if *self == Self::Pending && target.is_terminal() {
            return Ok(());
        }
        Err(DomainError::InvalidPirepTransition {
            from: self.as_str().to_string(),
            to: target.as_str().to_string(),
        })
    }
}

impl FromStr for PirepStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidPirepStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for PirepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flight and pilot context frozen at filing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PirepSnapshot {
    /// Pilot callsign.
    pub callsign: String,
    /// Pilot rank.
    pub rank: String,
    /// Flight number.
    pub flight_number: String,
    /// Departure airport.
    pub origin: String,
    /// Arrival airport.
    pub destination: String,
    /// Aircraft type flown.
    pub aircraft_type: String,
    /// Aircraft family flown.
    pub aircraft_family: String,
    /// Route distance in nautical miles.
    pub distance_nm: i64,
    /// Type rating whose pay terms were used.
    pub type_name: String,
    /// Pay terms used for every computation of this report.
    pub pay_rate: PayRate,
}

/// Who reviewed a report, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// The reviewing administrator.
    pub reviewer: PilotId,
    /// Review time.
    #[serde(with = "time::serde::rfc3339")]
    pub reviewed_at: OffsetDateTime,
    /// Reviewer notes.
    pub notes: Option<String>,
}

/// A pilot flight report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pirep {
    /// The persisted identifier, if stored.
    pub pirep_id: Option<PirepId>,
    /// The filing pilot.
    pub pilot_id: PilotId,
    /// The leg flown. `None` once the leg has been deleted.
    pub leg_id: Option<LegId>,
    /// Frozen filing context.
    pub snapshot: PirepSnapshot,
    /// Raw figures entered by the pilot.
    pub inputs: FlightReportInputs,
    /// Earnings computed from `inputs` and the snapshotted pay rate.
    pub earnings: EarningsBreakdown,
    /// Date the flight was operated.
    #[serde(with = "iso_date::option")]
    pub flight_date: Option<Date>,
    /// Pilot remarks.
    pub remarks: Option<String>,
    /// Review status.
    pub status: PirepStatus,
    /// Review metadata, present once terminal.
    pub review: Option<ReviewRecord>,
    /// Distance credited to the pilot on approval.
    pub credited_distance_nm: Option<i64>,
    /// Filing time.
    #[serde(with = "time::serde::rfc3339")]
    pub filed_at: OffsetDateTime,
    /// Last edit time.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Optimistic concurrency token.
    pub version: i64,
}

/// The pilot-editable part of a report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PirepDraft {
    /// Raw performance figures.
    #[serde(flatten)]
    pub inputs: FlightReportInputs,
    /// Date the flight was operated.
    #[serde(default, with = "iso_date::option")]
    pub flight_date: Option<Date>,
    /// Pilot remarks.
    #[serde(default)]
    pub remarks: Option<String>,
}

/// A partial edit of a pending report.
///
/// Fields left `None` keep the value already on the report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PirepAmendment {
    pub flight_time_hours: Option<i64>,
    pub flight_time_minutes: Option<i64>,
    pub passengers: Option<i64>,
    pub cargo_kg: Option<Decimal>,
    pub fuel_used_kg: Option<Decimal>,
    #[serde(with = "iso_date::option")]
    pub flight_date: Option<Date>,
    pub remarks: Option<String>,
}

impl PirepAmendment {
    /// Fills the gaps from `pirep` and returns the complete figures.
    #[must_use]
    pub fn merge_onto(self, pirep: &Pirep) -> PirepDraft {
        let current: &FlightReportInputs = &pirep.inputs;
        PirepDraft {
            inputs: FlightReportInputs {
                flight_time_hours: self.flight_time_hours.unwrap_or(current.flight_time_hours),
                flight_time_minutes: self
                    .flight_time_minutes
                    .unwrap_or(current.flight_time_minutes),
                passengers: self.passengers.unwrap_or(current.passengers),
                cargo_kg: self.cargo_kg.unwrap_or(current.cargo_kg),
                fuel_used_kg: self.fuel_used_kg.unwrap_or(current.fuel_used_kg),
            },
            flight_date: self.flight_date.or(pirep.flight_date),
            remarks: self.remarks.or_else(|| pirep.remarks.clone()),
        }
    }
}

impl From<PirepDraft> for PirepAmendment {
    fn from(draft: PirepDraft) -> Self {
        Self {
            flight_time_hours: Some(draft.inputs.flight_time_hours),
            flight_time_minutes: Some(draft.inputs.flight_time_minutes),
            passengers: Some(draft.inputs.passengers),
            cargo_kg: Some(draft.inputs.cargo_kg),
            fuel_used_kg: Some(draft.inputs.fuel_used_kg),
            flight_date: draft.flight_date,
            remarks: draft.remarks,
        }
    }
}

impl Pirep {
    /// Files a new pending report.
    ///
    /// # Arguments
    ///
    /// * `profile` - The filing pilot
    /// * `leg` - The leg flown; must be stored
    /// * `rating` - The resolved type rating supplying the pay terms
    /// * `draft` - The pilot's figures
    /// * `now` - Filing time
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if the figures are invalid.
    pub fn file(
        profile: &PilotProfile,
        leg: &FlightLeg,
        rating: &TypeRating,
        draft: PirepDraft,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        let pay_rate: PayRate = rating.pay_rate();
        let earnings: EarningsBreakdown = calculate_earnings(&pay_rate, &draft.inputs)?;
        let snapshot: PirepSnapshot = PirepSnapshot {
            callsign: profile.callsign.clone(),
            rank: profile.rank.clone(),
            flight_number: leg.spec.flight_number.clone(),
            origin: leg.spec.origin.clone(),
            destination: leg.spec.destination.clone(),
            aircraft_type: leg.spec.aircraft_type.clone(),
            aircraft_family: leg.spec.aircraft_family.clone(),
            distance_nm: leg.spec.distance_nm,
            type_name: rating.spec.type_name.clone(),
            pay_rate,
        };

        Ok(Self {
            pirep_id: None,
            pilot_id: profile.pilot_id.clone(),
            leg_id: leg.leg_id,
            snapshot,
            inputs: draft.inputs,
            earnings,
            flight_date: draft.flight_date,
            remarks: normalize_notes(draft.remarks),
            status: PirepStatus::Pending,
            review: None,
            credited_distance_nm: None,
            filed_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Returns the raw identifier, or zero for an unsaved report.
    #[must_use]
    pub fn id_value(&self) -> i64 {
        self.pirep_id.map_or(0, |id| id.value())
    }

    /// Recomputes the breakdown from the stored inputs and snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if the stored inputs are invalid.
    pub fn recompute_earnings(&self) -> Result<EarningsBreakdown, DomainError> {
        calculate_earnings(&self.snapshot.pay_rate, &self.inputs)
    }

    /// Checks that `pilot_id` filed this report.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFilingPilot` otherwise.
    pub fn require_filed_by(&self, pilot_id: &PilotId) -> Result<(), DomainError> {
        if &self.pilot_id != pilot_id {
            return Err(DomainError::NotFilingPilot {
                pirep_id: self.id_value(),
                pilot_id: pilot_id.value().to_string(),
            });
        }
        Ok(())
    }

    /// Checks that the report is still pending.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PirepNotPending` otherwise.
    pub fn require_pending(&self) -> Result<(), DomainError> {
        if self.status != PirepStatus::Pending {
            return Err(DomainError::PirepNotPending {
                status: self.status.as_str().to_string(),
            });
        }
        Ok(())
    }

    /// Applies an edit to the pilot's figures and recomputes earnings with
    /// the snapshotted pay rate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PirepNotPending` if already reviewed, or
    /// `DomainError::InvalidInput` for invalid figures.
    pub fn amend(
        &self,
        amendment: PirepAmendment,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        self.require_pending()?;
        let draft: PirepDraft = amendment.merge_onto(self);
        let earnings: EarningsBreakdown =
            calculate_earnings(&self.snapshot.pay_rate, &draft.inputs)?;
        Ok(Self {
            inputs: draft.inputs,
            earnings,
            flight_date: draft.flight_date,
            remarks: normalize_notes(draft.remarks),
            updated_at: now,
            ..self.clone()
        })
    }

    /// Records the review outcome.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPirepTransition` if the report is not
    /// pending or `outcome` is not terminal.
    pub fn review(
        &self,
        outcome: PirepStatus,
        reviewer: &PilotId,
        notes: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        self.status.validate_transition(outcome)?;
        Ok(Self {
            status: outcome,
            review: Some(ReviewRecord {
                reviewer: reviewer.clone(),
                reviewed_at: now,
                notes: normalize_notes(notes),
            }),
            updated_at: now,
            ..self.clone()
        })
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}
