// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller identity and authorization checks.
//!
//! Identity is established upstream; the career API only receives an
//! already-validated [`AuthenticatedActor`] and decides what it may do.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use va_career_audit::Actor;
use va_career_domain::PilotId;

use crate::capabilities::{Capability, capabilities_for, role_allows};
use crate::error::AuthError;

/// Roles known to the career API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// A pilot flying their own career.
    Pilot,
    /// Staff who review reports and maintain the catalog.
    ///
    /// Career admins are pilots too and may fly their own careers.
    CareerAdmin,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pilot => "pilot",
            Self::CareerAdmin => "career_admin",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pilot" => Ok(Self::Pilot),
            "career_admin" | "admin" => Ok(Self::CareerAdmin),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

/// A caller whose identity has already been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The caller's pilot identifier.
    pub pilot_id: PilotId,
    /// The caller's callsign, used when their profile is first created.
    pub callsign: String,
    /// The caller's role.
    pub role: Role,
    /// Career access as reported by the identity provider.
    ///
    /// Only consulted when the profile is provisioned; afterwards the
    /// stored flag wins.
    pub career_approved: bool,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `pilot_id` - The caller's pilot identifier
    /// * `callsign` - The caller's callsign
    /// * `role` - The caller's role
    /// * `career_approved` - Whether the identity provider grants career access
    #[must_use]
    pub fn new(pilot_id: &str, callsign: &str, role: Role, career_approved: bool) -> Self {
        Self {
            pilot_id: PilotId::new(pilot_id),
            callsign: callsign.to_string(),
            role,
            career_approved,
        }
    }

    /// Returns true if the caller holds the capability.
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        role_allows(self.role, capability)
    }

    /// Returns the caller's capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> &'static [Capability] {
        capabilities_for(self.role)
    }

    /// Converts the caller into the actor recorded on audit events.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        match self.role {
            Role::Pilot => Actor::pilot(&self.pilot_id),
            Role::CareerAdmin => Actor::admin(&self.pilot_id),
        }
    }
}

/// Authorization checks shared by the handlers.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Requires the caller to hold a capability.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCapability` otherwise.
    pub fn require(
        actor: &AuthenticatedActor,
        capability: Capability,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.has(capability) {
            return Ok(());
        }
        Err(AuthError::MissingCapability {
            action: action.to_string(),
            capability,
        })
    }

    /// Requires the caller to be the pilot in question or a career admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotCareerOwner` otherwise.
    pub fn require_self_or_admin(
        actor: &AuthenticatedActor,
        pilot_id: &PilotId,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.pilot_id == *pilot_id || actor.has(Capability::CareerAdmin) {
            return Ok(());
        }
        Err(AuthError::NotCareerOwner {
            action: action.to_string(),
            pilot_id: pilot_id.value().to_string(),
        })
    }
}
