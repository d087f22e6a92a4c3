// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Derived career statistics.
//!
//! Totals and route history are accumulated on approval only. Route
//! history is keyed by the directed `(origin, destination)` pair.

use crate::error::DomainError;
use crate::money::Money;
use crate::pirep::{Pirep, PirepStatus};
use crate::types::{FlightTime, PilotId, TypeRatingId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use time::{Duration, OffsetDateTime};

/// One entry of a pilot's route history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteHistoryEntry {
    /// Departure airport.
    pub origin: String,
    /// Arrival airport.
    pub destination: String,
    /// Number of approved flights on this route.
    pub count: i64,
    /// When the most recent approved flight was credited.
    #[serde(with = "time::serde::rfc3339")]
    pub last_flown: OffsetDateTime,
}

/// Cached per-pilot totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsAggregate {
    /// The pilot.
    pub pilot_id: PilotId,
    /// Total approved distance.
    pub total_distance_nm: i64,
    /// Total approved flight time.
    pub total_flight_time: FlightTime,
    /// Total approved earnings.
    pub total_earnings: Money,
    /// Number of approved flights.
    pub total_flights: i64,
    /// Mirror of the profile's owned ratings.
    pub owned_ratings: BTreeSet<TypeRatingId>,
    /// Route history.
    pub routes: Vec<RouteHistoryEntry>,
    /// Optimistic concurrency token.
    pub version: i64,
}

impl StatsAggregate {
    /// Creates empty statistics for a pilot.
    #[must_use]
    pub const fn new(pilot_id: PilotId) -> Self {
        Self {
            pilot_id,
            total_distance_nm: 0,
            total_flight_time: FlightTime::ZERO,
            total_earnings: Money::ZERO,
            total_flights: 0,
            owned_ratings: BTreeSet::new(),
            routes: Vec::new(),
            version: 0,
        }
    }

    /// Returns the history entry for a directed route.
    #[must_use]
    pub fn route(&self, origin: &str, destination: &str) -> Option<&RouteHistoryEntry> {
        self.routes
            .iter()
            .find(|r| r.origin == origin && r.destination == destination)
    }

    /// Accumulates one approved flight.
    ///
    /// # Arguments
    ///
    /// * `origin` - Departure airport
    /// * `destination` - Arrival airport
    /// * `distance_nm` - Distance credited
    /// * `flight_time` - Time credited
    /// * `earnings` - Grand total credited
    /// * `at` - Approval time
    #[must_use]
    pub fn record_flight(
        &self,
        origin: &str,
        destination: &str,
        distance_nm: i64,
        flight_time: FlightTime,
        earnings: Money,
        at: OffsetDateTime,
    ) -> Self {
        let mut routes: Vec<RouteHistoryEntry> = self.routes.clone();
        match routes
            .iter_mut()
            .find(|r| r.origin == origin && r.destination == destination)
        {
            Some(entry) => {
                entry.count += 1;
                entry.last_flown = at;
            }
            None => routes.push(RouteHistoryEntry {
                origin: origin.to_string(),
                destination: destination.to_string(),
                count: 1,
                last_flown: at,
            }),
        }

        Self {
            total_distance_nm: self.total_distance_nm.saturating_add(distance_nm),
            total_flight_time: self.total_flight_time.saturating_add(flight_time),
            total_earnings: self.total_earnings + earnings,
            total_flights: self.total_flights + 1,
            routes,
            ..self.clone()
        }
    }

    /// Removes one previously recorded flight.
    ///
    /// Used only by administrative correction. The route entry is dropped
    /// once its count reaches zero; totals never drop below zero.
    #[must_use]
    pub fn reverse_flight(
        &self,
        origin: &str,
        destination: &str,
        distance_nm: i64,
        flight_time: FlightTime,
        earnings: Money,
    ) -> Self {
        let mut routes: Vec<RouteHistoryEntry> = self.routes.clone();
        if let Some(entry) = routes
            .iter_mut()
            .find(|r| r.origin == origin && r.destination == destination)
        {
            entry.count -= 1;
        }
        routes.retain(|r| r.count > 0);

        let remaining_minutes: i64 =
            (self.total_flight_time.minutes() - flight_time.minutes()).max(0);
        let remaining_earnings: Money = if earnings > self.total_earnings {
            Money::ZERO
        } else {
            self.total_earnings - earnings
        };

        Self {
            total_distance_nm: (self.total_distance_nm - distance_nm).max(0),
            total_flight_time: FlightTime::from_minutes(remaining_minutes)
                .unwrap_or(FlightTime::ZERO),
            total_earnings: remaining_earnings,
            total_flights: (self.total_flights - 1).max(0),
            routes,
            ..self.clone()
        }
    }
}

/// The ordering used by the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardMetric {
    /// Total approved earnings.
    #[default]
    Earnings,
    /// Total approved flight time.
    Hours,
    /// Number of approved flights.
    Flights,
}

impl LeaderboardMetric {
    /// Returns the string representation of the metric.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Earnings => "earnings",
            Self::Hours => "hours",
            Self::Flights => "flights",
        }
    }
}

impl FromStr for LeaderboardMetric {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earnings" | "total_earnings" => Ok(Self::Earnings),
            "hours" | "flight_time" | "total_flight_time" => Ok(Self::Hours),
            "flights" | "total_flights" => Ok(Self::Flights),
            _ => Err(DomainError::InvalidLeaderboardMetric(s.to_string())),
        }
    }
}

/// Orders statistics for the leaderboard and keeps the top `limit`.
///
/// Ties are broken by pilot id so the order is stable between calls.
#[must_use]
pub fn rank_leaderboard(
    mut stats: Vec<StatsAggregate>,
    metric: LeaderboardMetric,
    limit: usize,
) -> Vec<StatsAggregate> {
    stats.sort_by(|a, b| {
        let primary = match metric {
            LeaderboardMetric::Earnings => b.total_earnings.cmp(&a.total_earnings),
            LeaderboardMetric::Hours => b.total_flight_time.cmp(&a.total_flight_time),
            LeaderboardMetric::Flights => b.total_flights.cmp(&a.total_flights),
        };
        primary.then_with(|| a.pilot_id.cmp(&b.pilot_id))
    });
    stats.truncate(limit);
    stats
}

/// Time window applied to route history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWindow {
    /// Every approved flight.
    All,
    /// Flights filed within the last N days.
    LastDays(u16),
    /// Flights filed at or after a fixed instant.
    Since(OffsetDateTime),
}

impl HistoryWindow {
    /// Returns the earliest filing time included, if bounded.
    #[must_use]
    pub fn cutoff(&self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        match self {
            Self::All => None,
            Self::LastDays(days) => Some(now - Duration::days(i64::from(*days))),
            Self::Since(instant) => Some(*instant),
        }
    }
}

impl FromStr for HistoryWindow {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(Self::All),
            "30d" | "30days" => Ok(Self::LastDays(30)),
            "7d" | "7days" => Ok(Self::LastDays(7)),
            other => OffsetDateTime::parse(other, &time::format_description::well_known::Rfc3339)
                .map(Self::Since)
                .map_err(|_| DomainError::InvalidHistoryWindow(other.to_string())),
        }
    }
}

/// Route frequency over a window of approved reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTally {
    /// Departure airport.
    pub origin: String,
    /// Arrival airport.
    pub destination: String,
    /// Approved flights in the window.
    pub count: i64,
}

/// Folds approved reports filed at or after `cutoff` into route tallies.
///
/// The result is ordered by count descending, then by route.
#[must_use]
pub fn fold_route_history<'a, I>(pireps: I, cutoff: Option<OffsetDateTime>) -> Vec<RouteTally>
where
    I: IntoIterator<Item = &'a Pirep>,
{
    let mut counts: BTreeMap<(String, String), i64> = BTreeMap::new();
    for pirep in pireps {
        if pirep.status != PirepStatus::Approved {
            continue;
        }
        if cutoff.is_some_and(|c| pirep.filed_at < c) {
            continue;
        }
        *counts
            .entry((
                pirep.snapshot.origin.clone(),
                pirep.snapshot.destination.clone(),
            ))
            .or_insert(0) += 1;
    }

    let mut tallies: Vec<RouteTally> = counts
        .into_iter()
        .map(|((origin, destination), count)| RouteTally {
            origin,
            destination,
            count,
        })
        .collect();
    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    tallies
}

/// Fleet-wide career totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetAnalytics {
    /// Provisioned career profiles.
    pub total_pilots: i64,
    /// Profiles with career access.
    pub approved_pilots: i64,
    /// All reports.
    pub total_pireps: i64,
    /// Reports awaiting review.
    pub pending_pireps: i64,
    /// Approved reports.
    pub approved_pireps: i64,
    /// Rejected reports.
    pub rejected_pireps: i64,
    /// Sum of approved grand totals.
    pub total_earnings: Money,
    /// Sum of approved flight time.
    pub total_flight_time: FlightTime,
}
