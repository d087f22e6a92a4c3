// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-pilot career state.
//!
//! The balance always equals the sum of approved report grand totals minus
//! every purchase price paid, and is never negative. All mutations return a
//! new profile; nothing here performs I/O.

use crate::error::DomainError;
use crate::flight_leg::{FlightLeg, LegStatus};
use crate::money::Money;
use crate::rank::RankTable;
use crate::type_rating::TypeRating;
use crate::types::{FlightTime, PilotId, TypeRatingId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::OffsetDateTime;

/// A pilot's career profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PilotProfile {
    /// The pilot.
    pub pilot_id: PilotId,
    /// Display callsign.
    pub callsign: String,
    /// Spendable balance.
    pub balance: Money,
    /// Accumulated approved flight time.
    pub flight_time: FlightTime,
    /// Accumulated approved distance in nautical miles.
    pub total_distance_nm: i64,
    /// Current rank name.
    pub rank: String,
    /// Whether the pilot may use career mode.
    pub career_approved: bool,
    /// Family whose legs the pilot may dispatch.
    pub active_family: Option<String>,
    /// The rating most recently activated.
    pub active_type_rating: Option<TypeRatingId>,
    /// Ratings the pilot has purchased.
    pub owned_ratings: BTreeSet<TypeRatingId>,
    /// When the profile was provisioned.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Optimistic concurrency token.
    pub version: i64,
}

impl PilotProfile {
    /// Provisions an empty profile at the entry rank.
    ///
    /// # Arguments
    ///
    /// * `pilot_id` - The pilot
    /// * `callsign` - Display callsign
    /// * `career_approved` - Initial access flag
    /// * `ranks` - Rank ladder supplying the entry rank
    /// * `now` - Provisioning time
    #[must_use]
    pub fn new(
        pilot_id: PilotId,
        callsign: &str,
        career_approved: bool,
        ranks: &RankTable,
        now: OffsetDateTime,
    ) -> Self {
        let callsign: String = if callsign.trim().is_empty() {
            pilot_id.value().to_string()
        } else {
            callsign.trim().to_string()
        };
        Self {
            pilot_id,
            callsign,
            balance: Money::ZERO,
            flight_time: FlightTime::ZERO,
            total_distance_nm: 0,
            rank: ranks.entry_rank().name.clone(),
            career_approved,
            active_family: None,
            active_type_rating: None,
            owned_ratings: BTreeSet::new(),
            created_at: now,
            version: 0,
        }
    }

    /// Returns true if the pilot owns the rating.
    #[must_use]
    pub fn owns(&self, rating_id: TypeRatingId) -> bool {
        self.owned_ratings.contains(&rating_id)
    }

    /// Checks the career access gate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CareerAccessRequired` if the pilot is not approved.
    pub fn require_career_access(&self) -> Result<(), DomainError> {
        if !self.career_approved {
            return Err(DomainError::CareerAccessRequired {
                pilot_id: self.pilot_id.value().to_string(),
            });
        }
        Ok(())
    }

    /// Purchases a type rating.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyOwned`, `DomainError::Locked` or
    /// `DomainError::InsufficientFunds`, checked in that order. On error
    /// the profile is untouched.
    pub fn purchase(&self, rating: &TypeRating) -> Result<Self, DomainError> {
        let rating_id: TypeRatingId = stored_rating_id(rating)?;
        if self.owns(rating_id) {
            return Err(DomainError::AlreadyOwned {
                type_name: rating.spec.type_name.clone(),
            });
        }
        if rating.spec.is_locked {
            return Err(DomainError::Locked {
                type_name: rating.spec.type_name.clone(),
            });
        }
        let price: Money = rating.spec.purchase_price;
        let balance: Money =
            self.balance
                .checked_debit(price)
                .ok_or(DomainError::InsufficientFunds {
                    required: price,
                    available: self.balance,
                })?;

        let mut owned_ratings: BTreeSet<TypeRatingId> = self.owned_ratings.clone();
        owned_ratings.insert(rating_id);
        Ok(Self {
            balance,
            owned_ratings,
            ..self.clone()
        })
    }

    /// Makes an owned rating's family the active family.
    ///
    /// # Arguments
    ///
    /// * `rating` - The rating to activate
    /// * `assigned_legs` - Legs currently assigned to this pilot
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotOwned` if the rating is not owned, or
    /// `DomainError::ActiveDispatchInOtherFamily` if a leg in a different
    /// family is still dispatched to the pilot.
    pub fn activate(
        &self,
        rating: &TypeRating,
        assigned_legs: &[FlightLeg],
    ) -> Result<Self, DomainError> {
        let rating_id: TypeRatingId = stored_rating_id(rating)?;
        if !self.owns(rating_id) {
            return Err(DomainError::NotOwned {
                type_name: rating.spec.type_name.clone(),
            });
        }

        let blocking: Option<&FlightLeg> = assigned_legs.iter().find(|leg| {
            leg.status == LegStatus::Dispatched
                && leg.is_assigned_to(&self.pilot_id)
                && !rating.is_in_family(&leg.spec.aircraft_family)
        });
        if let Some(leg) = blocking {
            return Err(DomainError::ActiveDispatchInOtherFamily {
                leg_id: leg.id_value(),
                family: leg.spec.aircraft_family.clone(),
            });
        }

        Ok(Self {
            active_family: Some(rating.spec.aircraft_family.clone()),
            active_type_rating: Some(rating_id),
            ..self.clone()
        })
    }

    /// Credits an approved flight.
    ///
    /// Adds the grand total to the balance, accumulates time and distance,
    /// and recomputes the rank.
    #[must_use]
    pub fn credit_flight(
        &self,
        amount: Money,
        flight_time: FlightTime,
        distance_nm: i64,
        ranks: &RankTable,
    ) -> Self {
        let total_time: FlightTime = self.flight_time.saturating_add(flight_time);
        Self {
            balance: self.balance + amount,
            flight_time: total_time,
            total_distance_nm: self.total_distance_nm.saturating_add(distance_nm),
            rank: ranks.rank_for(total_time).rank_name,
            ..self.clone()
        }
    }

    /// Reverses the credit of a previously approved flight.
    ///
    /// Used only by administrative correction. Time and distance never drop
    /// below zero.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InsufficientFunds` if the balance no longer
    /// covers the amount.
    pub fn reverse_flight(
        &self,
        amount: Money,
        flight_time: FlightTime,
        distance_nm: i64,
        ranks: &RankTable,
    ) -> Result<Self, DomainError> {
        let balance: Money =
            self.balance
                .checked_debit(amount)
                .ok_or(DomainError::InsufficientFunds {
                    required: amount,
                    available: self.balance,
                })?;
        let remaining_minutes: i64 = (self.flight_time.minutes() - flight_time.minutes()).max(0);
        let remaining: FlightTime = FlightTime::from_minutes(remaining_minutes)?;
        Ok(Self {
            balance,
            flight_time: remaining,
            total_distance_nm: (self.total_distance_nm - distance_nm).max(0),
            rank: ranks.rank_for(remaining).rank_name,
            ..self.clone()
        })
    }

    /// Sets the career access flag.
    #[must_use]
    pub fn with_career_access(&self, approved: bool) -> Self {
        Self {
            career_approved: approved,
            ..self.clone()
        }
    }
}

fn stored_rating_id(rating: &TypeRating) -> Result<TypeRatingId, DomainError> {
    rating
        .type_rating_id
        .ok_or_else(|| DomainError::InvalidInput {
            field: String::from("type_rating_id"),
            reason: format!("type rating '{}' has not been saved", rating.spec.type_name),
        })
}
