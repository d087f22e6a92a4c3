// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use va_career::CoreError;
use va_career_domain::{DomainError, Money};
use va_career_persistence::PersistenceError;

use crate::capabilities::Capability;

/// Authorization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The caller's role lacks the capability the operation requires.
    #[error("Unauthorized: '{action}' requires the {capability} capability")]
    MissingCapability {
        /// The operation attempted.
        action: String,
        /// The capability required.
        capability: Capability,
    },
    /// The caller tried to act on another pilot's career.
    #[error("Unauthorized: '{action}' is limited to the career of pilot '{pilot_id}'")]
    NotCareerOwner {
        /// The operation attempted.
        action: String,
        /// The pilot whose career was targeted.
        pilot_id: String,
    },
    /// The identity provider supplied a role this service does not know.
    #[error("Unknown role '{0}'")]
    UnknownRole(String),
}

/// The category of an API failure.
///
/// Clients branch on the kind; the message is for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The requested entity does not exist.
    NotFound,
    /// The caller is not the owning pilot or lacks a capability.
    Unauthorized,
    /// The operation is illegal in the entity's current state.
    InvalidState,
    /// A business rule refused the operation.
    PolicyViolation,
    /// The pilot cannot afford the purchase.
    InsufficientFunds,
    /// A field was missing, negative or malformed.
    InvalidInput,
    /// A storage or other unexpected fault.
    Internal,
}

impl ErrorKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::Unauthorized => "Unauthorized",
            Self::InvalidState => "InvalidState",
            Self::PolicyViolation => "PolicyViolation",
            Self::InsufficientFunds => "InsufficientFunds",
            Self::InvalidInput => "InvalidInput",
            Self::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Authorization failed.
    #[error("{message}")]
    Unauthorized {
        /// A human-readable description of the refusal.
        message: String,
    },
    /// The entity's state does not allow the operation.
    #[error("Invalid state ({rule}): {message}")]
    InvalidState {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// A business rule refused the operation.
    #[error("Policy violation ({rule}): {message}")]
    PolicyViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// The balance does not cover a purchase.
    #[error("Insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        /// The price of the purchase.
        required: Money,
        /// The pilot's balance.
        available: Money,
    },
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A CSV upload could not be read at all.
    #[error("Invalid CSV format: {reason}")]
    InvalidCsvFormat {
        /// Why the upload was refused.
        reason: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ResourceNotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::PolicyViolation { .. } => ErrorKind::PolicyViolation,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::InvalidInput { .. } | Self::InvalidCsvFormat { .. } => ErrorKind::InvalidInput,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub(crate) fn not_found(resource_type: &str, message: String) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Unauthorized {
            message: err.to_string(),
        }
    }
}

fn invalid_state(rule: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidState {
        rule: rule.to_string(),
        message: err.to_string(),
    }
}

fn policy(rule: &str, err: &DomainError) -> ApiError {
    ApiError::PolicyViolation {
        rule: rule.to_string(),
        message: err.to_string(),
    }
}

fn invalid_input(field: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match &err {
        DomainError::InvalidInput { field, reason } => ApiError::InvalidInput {
            field: field.clone(),
            message: reason.clone(),
        },
        DomainError::InvalidRankTable(_) => invalid_input("rank_table", &err),
        DomainError::InvalidLegStatus(_) | DomainError::InvalidPirepStatus(_) => {
            invalid_input("status", &err)
        }
        DomainError::InvalidBodyType(_) => invalid_input("body_type", &err),
        DomainError::InvalidLeaderboardMetric(_) => invalid_input("metric", &err),
        DomainError::InvalidHistoryWindow(_) => invalid_input("window", &err),
        DomainError::InvalidLegTransition { .. } => invalid_state("leg_lifecycle", &err),
        DomainError::InvalidPirepTransition { .. } => invalid_state("pirep_lifecycle", &err),
        DomainError::PirepNotPending { .. } => invalid_state("pirep_pending_only", &err),
        DomainError::LegAlreadyReported { .. } => invalid_state("one_report_per_leg", &err),
        DomainError::InconsistentLeg { .. } => invalid_state("leg_assignment", &err),
        DomainError::AlreadyOwned { .. } => policy("already_owned", &err),
        DomainError::Locked { .. } => policy("rating_locked", &err),
        DomainError::NotOwned { .. } => policy("rating_not_owned", &err),
        DomainError::FamilyMismatch { .. } => policy("active_family", &err),
        DomainError::ActiveDispatchInOtherFamily { .. } => policy("family_switch", &err),
        DomainError::CareerAccessRequired { .. } => policy("career_access", &err),
        DomainError::OverrideReasonRequired { .. } => policy("override_reason", &err),
        DomainError::DuplicateTypeName(_) => policy("unique_type_name", &err),
        DomainError::NotAssignedPilot { .. } | DomainError::NotFilingPilot { .. } => {
            ApiError::Unauthorized {
                message: err.to_string(),
            }
        }
        DomainError::InsufficientFunds {
            required,
            available,
        } => ApiError::InsufficientFunds {
            required: *required,
            available: *available,
        },
        DomainError::TypeRatingNotFound { .. } => {
            ApiError::not_found("Type rating", err.to_string())
        }
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::MissingEntity(entity) => {
            ApiError::not_found(entity, format!("No {entity} was found for this request"))
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(message) => Self::not_found("Record", message),
            PersistenceError::EventNotFound(id) => {
                Self::not_found("Audit event", format!("Audit event {id} does not exist"))
            }
            PersistenceError::Conflict { .. } => Self::InvalidState {
                rule: String::from("concurrent_modification"),
                message: err.to_string(),
            },
            _ => Self::Internal {
                message: err.to_string(),
            },
        }
    }
}
