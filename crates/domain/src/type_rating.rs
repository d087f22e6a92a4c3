// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Type rating catalog entries.
//!
//! A type rating is the purchasable qualification for an aircraft type.
//! Ratings are grouped by family; owning and activating any rating in a
//! family makes that family's legs dispatchable.

use crate::earnings::PayRate;
use crate::error::DomainError;
use crate::money::Money;
use crate::types::TypeRatingId;
use crate::validation::require_text;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Airframe category shown in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BodyType {
    /// Single-aisle aircraft.
    #[default]
    #[serde(rename = "Narrow-body")]
    NarrowBody,
    /// Twin-aisle aircraft.
    #[serde(rename = "Wide-body")]
    WideBody,
    /// Regional jets and turboprops.
    #[serde(rename = "Regional")]
    Regional,
}

impl BodyType {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NarrowBody => "Narrow-body",
            Self::WideBody => "Wide-body",
            Self::Regional => "Regional",
        }
    }
}

impl FromStr for BodyType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Narrow-body" => Ok(Self::NarrowBody),
            "Wide-body" => Ok(Self::WideBody),
            "Regional" => Ok(Self::Regional),
            other => Err(DomainError::InvalidBodyType(other.to_string())),
        }
    }
}

impl std::fmt::Display for BodyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The editable fields of a type rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRatingSpec {
    /// Unique aircraft type designator, e.g. `A320`.
    pub type_name: String,
    /// Family grouping interchangeable types, e.g. `A320 Family`.
    pub aircraft_family: String,
    /// Price to purchase the rating.
    pub purchase_price: Money,
    /// Hourly base pay.
    pub base_rate: Money,
    /// Earnings multiplier.
    pub multiplier: Decimal,
    /// Seat count shown in the catalog.
    #[serde(default)]
    pub seats: u32,
    /// Free text description.
    #[serde(default)]
    pub description: String,
    /// Airframe category.
    #[serde(default)]
    pub body_type: BodyType,
    /// Rank shown as the unlock requirement. Informational only.
    #[serde(default)]
    pub rank_required: Option<String>,
    /// Locked ratings cannot be purchased.
    #[serde(default)]
    pub is_locked: bool,
}

impl TypeRatingSpec {
    /// Validates and normalizes the spec.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if a name is empty or a price,
    /// rate or multiplier is negative.
    pub fn validated(mut self) -> Result<Self, DomainError> {
        self.type_name = require_text("type_name", &self.type_name)?.to_uppercase();
        self.aircraft_family = require_text("aircraft_family", &self.aircraft_family)?;
        self.purchase_price.require_non_negative("purchase_price")?;
        PayRate::new(self.base_rate, self.multiplier)?;
        self.description = self.description.trim().to_string();
        self.rank_required = self
            .rank_required
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        Ok(self)
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRating {
    /// The persisted identifier, if stored.
    pub type_rating_id: Option<TypeRatingId>,
    /// The catalog fields.
    #[serde(flatten)]
    pub spec: TypeRatingSpec,
    /// Optimistic concurrency token.
    pub version: i64,
}

impl TypeRating {
    /// Creates an unsaved type rating.
    #[must_use]
    pub const fn new(spec: TypeRatingSpec) -> Self {
        Self {
            type_rating_id: None,
            spec,
            version: 0,
        }
    }

    /// Returns the pay terms of this rating.
    #[must_use]
    pub const fn pay_rate(&self) -> PayRate {
        PayRate {
            base_rate: self.spec.base_rate,
            multiplier: self.spec.multiplier,
        }
    }

    /// Returns true if this rating belongs to `family`.
    ///
    /// Families are matched exactly; both sides are trimmed on validation.
    #[must_use]
    pub fn is_in_family(&self, family: &str) -> bool {
        self.spec.aircraft_family == family
    }
}

/// Resolves the rating that pays for a flight in the given aircraft.
///
/// An exact type-name match wins. Otherwise the first rating in the same
/// family is used, which covers legs flown in a variant that has no
/// catalog row of its own.
///
/// # Errors
///
/// Returns `DomainError::TypeRatingNotFound` if neither matches.
pub fn resolve_for_aircraft<'a>(
    ratings: &'a [TypeRating],
    type_name: &str,
    family: &str,
) -> Result<&'a TypeRating, DomainError> {
    let wanted: &str = type_name.trim();
    ratings
        .iter()
        .find(|r| r.spec.type_name.eq_ignore_ascii_case(wanted))
        .or_else(|| ratings.iter().find(|r| r.is_in_family(family)))
        .ok_or_else(|| DomainError::TypeRatingNotFound {
            type_name: type_name.to_string(),
            family: family.to_string(),
        })
}

/// Validates that a type name is not used by another rating.
///
/// # Errors
///
/// Returns `DomainError::DuplicateTypeName` on a clash.
pub fn validate_type_name_unique(
    ratings: &[TypeRating],
    type_name: &str,
    excluding: Option<TypeRatingId>,
) -> Result<(), DomainError> {
    let clash: bool = ratings.iter().any(|r| {
        r.spec.type_name.eq_ignore_ascii_case(type_name) && r.type_rating_id != excluding
    });
    if clash {
        return Err(DomainError::DuplicateTypeName(type_name.to_string()));
    }
    Ok(())
}
