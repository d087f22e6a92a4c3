// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability sets derived from roles.
//!
//! Every operation declares the capability it requires; a role is only a
//! named bundle of capabilities. The set is also reported to clients so
//! they can hide actions the caller cannot perform. It never replaces the
//! checks made by the handlers.

use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// A permission to perform a family of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    /// Read profiles, statistics, leaderboards and the catalog.
    ViewCareer,
    /// Dispatch legs, file reports and buy or activate type ratings.
    FlyCareer,
    /// Edit, delete or read one's own reports.
    OwnPirep,
    /// Review reports, edit the catalog and administer pilots.
    CareerAdmin,
}

impl Capability {
    /// Returns the string representation of the capability.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ViewCareer => "ViewCareer",
            Self::FlyCareer => "FlyCareer",
            Self::OwnPirep => "OwnPirep",
            Self::CareerAdmin => "CareerAdmin",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const PILOT_CAPABILITIES: &[Capability] = &[
    Capability::ViewCareer,
    Capability::FlyCareer,
    Capability::OwnPirep,
];

const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ViewCareer,
    Capability::FlyCareer,
    Capability::OwnPirep,
    Capability::CareerAdmin,
];

/// The capabilities a role grants.
#[must_use]
pub const fn capabilities_for(role: Role) -> &'static [Capability] {
    match role {
        Role::Pilot => PILOT_CAPABILITIES,
        Role::CareerAdmin => ADMIN_CAPABILITIES,
    }
}

/// Returns true if the role grants the capability.
#[must_use]
pub fn role_allows(role: Role, capability: Capability) -> bool {
    capabilities_for(role).contains(&capability)
}
