// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::money::Money;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A numeric or textual input was negative, empty, or malformed.
    InvalidInput {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// The rank table is empty or not strictly ascending.
    InvalidRankTable(String),
    /// A flight leg status string could not be parsed.
    InvalidLegStatus(String),
    /// A PIREP status string could not be parsed.
    InvalidPirepStatus(String),
    /// A body type string could not be parsed.
    InvalidBodyType(String),
    /// A leaderboard metric string could not be parsed.
    InvalidLeaderboardMetric(String),
    /// A history window string could not be parsed.
    InvalidHistoryWindow(String),
    /// The requested flight leg transition is not permitted.
    InvalidLegTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// The requested PIREP transition is not permitted.
    InvalidPirepTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
    /// The PIREP can no longer be edited or deleted by its pilot.
    PirepNotPending {
        /// The current status.
        status: String,
    },
    /// The leg already has a report that is pending or approved.
    LegAlreadyReported {
        /// The leg identifier.
        leg_id: i64,
    },
    /// The pilot already owns the type rating.
    AlreadyOwned {
        /// The type name.
        type_name: String,
    },
    /// The type rating is locked and cannot be purchased.
    Locked {
        /// The type name.
        type_name: String,
    },
    /// The pilot does not own the type rating.
    NotOwned {
        /// The type name.
        type_name: String,
    },
    /// The pilot cannot afford the purchase.
    InsufficientFunds {
        /// The price of the purchase.
        required: Money,
        /// The pilot's balance.
        available: Money,
    },
    /// The leg's aircraft family does not match the pilot's active family.
    FamilyMismatch {
        /// The family of the leg.
        leg_family: String,
        /// The pilot's active family, if any.
        active_family: Option<String>,
    },
    /// The pilot is not the one assigned to the leg.
    NotAssignedPilot {
        /// The leg identifier.
        leg_id: i64,
        /// The pilot attempting the operation.
        pilot_id: String,
    },
    /// The pilot did not file the PIREP.
    NotFilingPilot {
        /// The PIREP identifier.
        pirep_id: i64,
        /// The pilot attempting the operation.
        pilot_id: String,
    },
    /// Neither the type name nor the family resolve to a catalog entry.
    TypeRatingNotFound {
        /// The requested type name.
        type_name: String,
        /// The requested family.
        family: String,
    },
    /// Another type rating already uses this type name.
    DuplicateTypeName(String),
    /// The pilot has a dispatched leg in a family other than the one requested.
    ActiveDispatchInOtherFamily {
        /// The dispatched leg.
        leg_id: i64,
        /// The family of the dispatched leg.
        family: String,
    },
    /// The pilot has not been approved for career mode.
    CareerAccessRequired {
        /// The pilot identifier.
        pilot_id: String,
    },
    /// An override of a lifecycle guard was attempted without a reason.
    OverrideReasonRequired {
        /// The operation being overridden.
        operation: String,
    },
    /// A leg's status and assignment disagree.
    InconsistentLeg {
        /// The leg identifier, if known.
        leg_id: Option<i64>,
        /// What is inconsistent.
        reason: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, reason } => {
                write!(f, "Invalid input for '{field}': {reason}")
            }
            Self::InvalidRankTable(msg) => write!(f, "Invalid rank table: {msg}"),
            Self::InvalidLegStatus(s) => write!(f, "Invalid leg status: {s}"),
            Self::InvalidPirepStatus(s) => write!(f, "Invalid PIREP status: {s}"),
            Self::InvalidBodyType(s) => write!(f, "Invalid body type: {s}"),
            Self::InvalidLeaderboardMetric(s) => write!(f, "Invalid leaderboard metric: {s}"),
            Self::InvalidHistoryWindow(s) => write!(f, "Invalid history window: {s}"),
            Self::InvalidLegTransition { from, to, reason } => {
                write!(f, "Cannot move leg from {from} to {to}: {reason}")
            }
            Self::InvalidPirepTransition { from, to } => {
                write!(f, "Cannot move PIREP from {from} to {to}")
            }
            Self::PirepNotPending { status } => {
                write!(f, "PIREP is {status} and can no longer be changed")
            }
            Self::LegAlreadyReported { leg_id } => {
                write!(f, "Leg {leg_id} already has a pending or approved PIREP")
            }
            Self::AlreadyOwned { type_name } => {
                write!(f, "Type rating '{type_name}' is already owned")
            }
            Self::Locked { type_name } => write!(f, "Type rating '{type_name}' is locked"),
            Self::NotOwned { type_name } => {
                write!(f, "Type rating '{type_name}' is not owned")
            }
            Self::InsufficientFunds {
                required,
                available,
            } => write!(
                f,
                "Insufficient funds: {required} required, {available} available"
            ),
            Self::FamilyMismatch {
                leg_family,
                active_family,
            } => match active_family {
                Some(active) => write!(
                    f,
                    "Leg requires the {leg_family} family but the active family is {active}"
                ),
                None => write!(
                    f,
                    "Leg requires the {leg_family} family but no family is active"
                ),
            },
            Self::NotAssignedPilot { leg_id, pilot_id } => {
                write!(f, "Pilot '{pilot_id}' is not assigned to leg {leg_id}")
            }
            Self::NotFilingPilot { pirep_id, pilot_id } => {
                write!(f, "Pilot '{pilot_id}' did not file PIREP {pirep_id}")
            }
            Self::TypeRatingNotFound { type_name, family } => write!(
                f,
                "No type rating matches type '{type_name}' or family '{family}'"
            ),
            Self::DuplicateTypeName(name) => {
                write!(f, "Type rating '{name}' already exists")
            }
            Self::ActiveDispatchInOtherFamily { leg_id, family } => write!(
                f,
                "Leg {leg_id} is dispatched in the {family} family and must be finished first"
            ),
            Self::CareerAccessRequired { pilot_id } => {
                write!(f, "Pilot '{pilot_id}' is not approved for career mode")
            }
            Self::OverrideReasonRequired { operation } => {
                write!(f, "{operation} requires an override reason")
            }
            Self::InconsistentLeg { leg_id, reason } => match leg_id {
                Some(id) => write!(f, "Leg {id} is inconsistent: {reason}"),
                None => write!(f, "Leg is inconsistent: {reason}"),
            },
        }
    }
}

impl std::error::Error for DomainError {}
