// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Flight legs and their dispatch lifecycle.
//!
//! ```text
//! AVAILABLE -> DISPATCHED -> COMPLETED
//!                  ^             |
//!                  +-------------+   (report rejected)
//! LOCKED: administrative, never dispatchable
//! ```
//!
//! A leg has at most one assigned pilot. Assignment exists exactly when the
//! status is `DISPATCHED` or `COMPLETED`.

use crate::error::DomainError;
use crate::types::{LegId, PilotId};
use crate::validation::{require_non_negative, require_text, validate_airport_code};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Lifecycle status of a flight leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegStatus {
    /// Open for dispatch.
    Available,
    /// Claimed by a pilot.
    Dispatched,
    /// Flown.
    Completed,
    /// Disabled by an administrator.
    Locked,
}

impl LegStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Dispatched => "DISPATCHED",
            Self::Completed => "COMPLETED",
            Self::Locked => "LOCKED",
        }
    }

    /// Returns true if a pilot must be assigned in this status.
    #[must_use]
    pub const fn requires_assignment(&self) -> bool {
        matches!(self, Self::Dispatched | Self::Completed)
    }

    /// Returns true if a pilot-driven transition to `target` is permitted.
    ///
    /// Administrative lock and unlock are handled by catalog updates, not
    /// by this lifecycle.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Available, Self::Dispatched)
                | (Self::Dispatched, Self::Completed)
                | (Self::Completed, Self::Dispatched)
        )
    }

    /// Validates a lifecycle transition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidLegTransition` if the transition is not allowed.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if self.can_transition_to(target) {
            return Ok(());
        }
        let reason: &str = match self {
            Self::Locked => "leg is locked",
            Self::Available => "leg has not been dispatched",
            Self::Dispatched if target == Self::Dispatched => "leg is already dispatched",
            Self::Completed if target == Self::Completed => "leg is already completed",
            _ => "transition not permitted by leg lifecycle rules",
        };
        Err(DomainError::InvalidLegTransition {
            from: self.as_str().to_string(),
            to: target.as_str().to_string(),
            reason: reason.to_string(),
        })
    }
}

impl FromStr for LegStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(Self::Available),
            "DISPATCHED" => Ok(Self::Dispatched),
            "COMPLETED" => Ok(Self::Completed),
            "LOCKED" => Ok(Self::Locked),
            _ => Err(DomainError::InvalidLegStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for LegStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The catalog fields of a leg, as edited by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightLegSpec {
    /// Published flight number.
    pub flight_number: String,
    /// Departure airport code.
    pub origin: String,
    /// Arrival airport code.
    pub destination: String,
    /// Aircraft type designator.
    pub aircraft_type: String,
    /// Aircraft family required to dispatch.
    pub aircraft_family: String,
    /// Route distance in nautical miles.
    pub distance_nm: i64,
    /// Scheduled block time in minutes.
    pub estimated_minutes: i64,
    /// Whether the leg is administratively locked.
    #[serde(default)]
    pub locked: bool,
}

impl FlightLegSpec {
    /// Validates and normalizes the spec.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` for empty names, malformed
    /// airport codes, or negative quantities.
    pub fn validated(mut self) -> Result<Self, DomainError> {
        self.flight_number = require_text("flight_number", &self.flight_number)?.to_uppercase();
        self.origin = validate_airport_code("origin", &self.origin)?;
        self.destination = validate_airport_code("destination", &self.destination)?;
        self.aircraft_type = require_text("aircraft_type", &self.aircraft_type)?.to_uppercase();
        self.aircraft_family = require_text("aircraft_family", &self.aircraft_family)?;
        require_non_negative("distance_nm", self.distance_nm)?;
        require_non_negative("estimated_minutes", self.estimated_minutes)?;
        Ok(self)
    }
}

/// A dispatchable unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightLeg {
    /// The persisted identifier, if stored.
    pub leg_id: Option<LegId>,
    /// Catalog fields.
    #[serde(flatten)]
    pub spec: FlightLegSpec,
    /// Lifecycle status.
    pub status: LegStatus,
    /// The pilot who dispatched the leg.
    pub assigned_pilot: Option<PilotId>,
    /// When the leg was dispatched.
    #[serde(with = "time::serde::rfc3339::option")]
    pub dispatched_at: Option<OffsetDateTime>,
    /// When the leg was completed.
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    /// Optimistic concurrency token.
    pub version: i64,
}

impl FlightLeg {
    /// Creates an unsaved leg from a validated spec.
    #[must_use]
    pub const fn new(spec: FlightLegSpec) -> Self {
        let status: LegStatus = if spec.locked {
            LegStatus::Locked
        } else {
            LegStatus::Available
        };
        Self {
            leg_id: None,
            spec,
            status,
            assigned_pilot: None,
            dispatched_at: None,
            completed_at: None,
            version: 0,
        }
    }

    /// Returns the raw identifier, or zero for an unsaved leg.
    #[must_use]
    pub fn id_value(&self) -> i64 {
        self.leg_id.map_or(0, |id| id.value())
    }

    /// Returns true if `pilot_id` is the assigned pilot.
    #[must_use]
    pub fn is_assigned_to(&self, pilot_id: &PilotId) -> bool {
        self.assigned_pilot.as_ref() == Some(pilot_id)
    }

    /// Checks that status and assignment agree.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InconsistentLeg` if a pilot is assigned to an
    /// unassignable status or missing from an assigned one.
    pub fn check_consistency(&self) -> Result<(), DomainError> {
        let assigned: bool = self.assigned_pilot.is_some();
        if assigned != self.status.requires_assignment() {
            return Err(DomainError::InconsistentLeg {
                leg_id: self.leg_id.map(|id| id.value()),
                reason: format!(
                    "status {} with {} pilot",
                    self.status,
                    if assigned { "an assigned" } else { "no" }
                ),
            });
        }
        Ok(())
    }

    /// Dispatches the leg to a pilot.
    ///
    /// # Arguments
    ///
    /// * `pilot_id` - The pilot claiming the leg
    /// * `active_family` - The pilot's active aircraft family
    /// * `now` - The dispatch time
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidLegTransition` unless the leg is
    /// `AVAILABLE`, and `DomainError::FamilyMismatch` unless the pilot's
    /// active family matches the leg.
    pub fn dispatch(
        &self,
        pilot_id: &PilotId,
        active_family: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        self.status.validate_transition(LegStatus::Dispatched)?;

        let family_matches: bool = active_family
            .is_some_and(|f| f == self.spec.aircraft_family);
        if !family_matches {
            return Err(DomainError::FamilyMismatch {
                leg_family: self.spec.aircraft_family.clone(),
                active_family: active_family.map(str::to_string),
            });
        }

        Ok(Self {
            status: LegStatus::Dispatched,
            assigned_pilot: Some(pilot_id.clone()),
            dispatched_at: Some(now),
            completed_at: None,
            ..self.clone()
        })
    }

    /// Marks a dispatched leg as completed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidLegTransition` unless the leg is `DISPATCHED`.
    pub fn complete(&self, now: OffsetDateTime) -> Result<Self, DomainError> {
        self.status.validate_transition(LegStatus::Completed)?;
        Ok(Self {
            status: LegStatus::Completed,
            completed_at: Some(now),
            ..self.clone()
        })
    }

    /// Returns a completed leg to dispatched so it can be reported again.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidLegTransition` unless the leg is `COMPLETED`.
    pub fn revert_completion(&self) -> Result<Self, DomainError> {
        if self.status != LegStatus::Completed {
            return Err(DomainError::InvalidLegTransition {
                from: self.status.as_str().to_string(),
                to: LegStatus::Dispatched.as_str().to_string(),
                reason: String::from("only completed legs can be reverted"),
            });
        }
        Ok(Self {
            status: LegStatus::Dispatched,
            completed_at: None,
            ..self.clone()
        })
    }

    /// Applies an administrative edit.
    ///
    /// Catalog fields are replaced. The lock flag may only change while the
    /// leg is unassigned.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidLegTransition` when locking or unlocking
    /// a leg that is dispatched or completed.
    pub fn with_spec(&self, spec: FlightLegSpec) -> Result<Self, DomainError> {
        let status: LegStatus = match (self.status, spec.locked) {
            (LegStatus::Available | LegStatus::Locked, true) => LegStatus::Locked,
            (LegStatus::Available | LegStatus::Locked, false) => LegStatus::Available,
            (assigned, false) => assigned,
            (assigned, true) => {
                return Err(DomainError::InvalidLegTransition {
                    from: assigned.as_str().to_string(),
                    to: LegStatus::Locked.as_str().to_string(),
                    reason: String::from("leg is assigned to a pilot"),
                });
            }
        };
        Ok(Self {
            spec: FlightLegSpec {
                locked: status == LegStatus::Locked,
                ..spec
            },
            status,
            ..self.clone()
        })
    }
}
