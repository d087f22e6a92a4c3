// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use time::OffsetDateTime;
use va_career_audit::{AuditEvent, StateSnapshot};
use va_career_domain::{
    FlightLeg, Money, PilotId, PilotProfile, Pirep, StatsAggregate, TypeRating, TypeRatingId,
};

/// The slice of persisted state a single career command operates on.
///
/// `profile` and `stats` always belong to the pilot whose career the
/// command affects. The optional entities are the command's targets and
/// are only loaded when the command needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareerState {
    /// The affected pilot's profile.
    pub profile: PilotProfile,
    /// The affected pilot's statistics.
    pub stats: StatsAggregate,
    /// The leg the command targets.
    pub leg: Option<FlightLeg>,
    /// The report the command targets.
    pub pirep: Option<Pirep>,
    /// Reports already filed against `leg`.
    pub leg_reports: Vec<Pirep>,
    /// Every leg currently assigned to the pilot.
    pub assigned_legs: Vec<FlightLeg>,
    /// The type rating catalog.
    pub type_ratings: Vec<TypeRating>,
}

impl CareerState {
    /// Creates a state holding only the pilot's profile and statistics.
    #[must_use]
    pub const fn new(profile: PilotProfile, stats: StatsAggregate) -> Self {
        Self {
            profile,
            stats,
            leg: None,
            pirep: None,
            leg_reports: Vec::new(),
            assigned_legs: Vec::new(),
            type_ratings: Vec::new(),
        }
    }

    /// Sets the targeted leg.
    #[must_use]
    pub fn with_leg(mut self, leg: Option<FlightLeg>) -> Self {
        self.leg = leg;
        self
    }

    /// Sets the targeted report.
    #[must_use]
    pub fn with_pirep(mut self, pirep: Option<Pirep>) -> Self {
        self.pirep = pirep;
        self
    }

    /// Sets the reports filed against the targeted leg.
    #[must_use]
    pub fn with_leg_reports(mut self, reports: Vec<Pirep>) -> Self {
        self.leg_reports = reports;
        self
    }

    /// Sets the legs assigned to the pilot.
    #[must_use]
    pub fn with_assigned_legs(mut self, legs: Vec<FlightLeg>) -> Self {
        self.assigned_legs = legs;
        self
    }

    /// Sets the type rating catalog.
    #[must_use]
    pub fn with_type_ratings(mut self, ratings: Vec<TypeRating>) -> Self {
        self.type_ratings = ratings;
        self
    }

    pub(crate) fn require_leg(&self) -> Result<&FlightLeg, CoreError> {
        self.leg.as_ref().ok_or(CoreError::MissingEntity("flight leg"))
    }

    pub(crate) fn require_pirep(&self) -> Result<&Pirep, CoreError> {
        self.pirep.as_ref().ok_or(CoreError::MissingEntity("PIREP"))
    }

    pub(crate) fn require_rating(&self, id: TypeRatingId) -> Result<&TypeRating, CoreError> {
        self.type_ratings
            .iter()
            .find(|r| r.type_rating_id == Some(id))
            .ok_or(CoreError::MissingEntity("type rating"))
    }

    /// Returns the state with `changes` applied.
    #[must_use]
    pub fn with_changes(&self, changes: &CareerChanges) -> Self {
        let mut next: Self = self.clone();
        if let Some(profile) = &changes.profile {
            next.profile = profile.clone();
        }
        if let Some(stats) = &changes.stats {
            next.stats = stats.clone();
        }
        if let Some(leg) = &changes.leg {
            next.leg = Some(leg.clone());
        }
        match &changes.pirep {
            Some(PirepChange::Filed(p) | PirepChange::Updated(p)) => next.pirep = Some(p.clone()),
            Some(PirepChange::Deleted(_)) => next.pirep = None,
            None => {}
        }
        next
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        let mut data: String = format!(
            "pilot={},balance={},flight_time={},rank={},active_family={},approved={},owned={}",
            self.profile.pilot_id,
            self.profile.balance,
            self.profile.flight_time,
            self.profile.rank,
            self.profile.active_family.as_deref().unwrap_or("-"),
            self.profile.career_approved,
            self.profile.owned_ratings.len(),
        );
        if let Some(leg) = &self.leg {
            data.push_str(&format!(",leg={}:{}", leg.id_value(), leg.status));
        }
        if let Some(pirep) = &self.pirep {
            data.push_str(&format!(",pirep={}:{}", pirep.id_value(), pirep.status));
        }
        StateSnapshot::new(data)
    }
}

/// How a transition changed the targeted report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PirepChange {
    /// A new report to insert.
    Filed(Pirep),
    /// An existing report to overwrite.
    Updated(Pirep),
    /// An existing report to remove.
    Deleted(Pirep),
}

/// A completed type rating purchase, recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingPurchase {
    /// The buyer.
    pub pilot_id: PilotId,
    /// The rating bought.
    pub type_rating_id: TypeRatingId,
    /// The rating's type name at purchase time.
    pub type_name: String,
    /// The price debited.
    pub price: Money,
    /// When the purchase happened.
    pub purchased_at: OffsetDateTime,
}

/// The entities a transition modified.
///
/// Only the `Some` fields need to be written; persistence applies them
/// in a single transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CareerChanges {
    /// The updated profile.
    pub profile: Option<PilotProfile>,
    /// The updated statistics.
    pub stats: Option<StatsAggregate>,
    /// The updated leg.
    pub leg: Option<FlightLeg>,
    /// The report change.
    pub pirep: Option<PirepChange>,
    /// A purchase to record.
    pub purchase: Option<RatingPurchase>,
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: CareerState,
    /// The entities to write.
    pub changes: CareerChanges,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// The shared catalog a catalog command operates on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogState {
    /// Every type rating.
    pub type_ratings: Vec<TypeRating>,
    /// The leg the command targets.
    pub leg: Option<FlightLeg>,
}

/// How a catalog command changed the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogChange {
    /// New ratings to insert.
    TypeRatingsCreated(Vec<TypeRating>),
    /// A rating to overwrite.
    TypeRatingUpdated(TypeRating),
    /// A rating to remove.
    TypeRatingDeleted(TypeRating),
    /// New legs to insert.
    FlightLegsCreated(Vec<FlightLeg>),
    /// A leg to overwrite.
    FlightLegUpdated(FlightLeg),
    /// A leg to remove.
    FlightLegDeleted(FlightLeg),
}

/// The result of a successful catalog command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogResult {
    /// The change to write.
    pub change: CatalogChange,
    /// The audit event recording this change.
    pub audit_event: AuditEvent,
}
