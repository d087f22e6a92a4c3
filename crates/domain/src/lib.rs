// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod earnings;
mod error;
mod flight_leg;
mod money;
mod pilot;
mod pirep;
mod rank;
mod stats;
mod type_rating;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use earnings::{
    CARGO_BONUS_PER_KG, DEDUCTION_RATE, EarningsBreakdown, FlightReportInputs, PASSENGER_BONUS,
    PayRate, calculate_earnings,
};
pub use error::DomainError;
pub use flight_leg::{FlightLeg, FlightLegSpec, LegStatus};
pub use money::{MONEY_SCALE, Money};
pub use pilot::PilotProfile;
pub use pirep::{
    Pirep, PirepAmendment, PirepDraft, PirepSnapshot, PirepStatus, ReviewRecord,
};
pub use rank::{Rank, RankProgress, RankTable};
pub use stats::{
    FleetAnalytics, HistoryWindow, LeaderboardMetric, RouteHistoryEntry, RouteTally,
    StatsAggregate, fold_route_history, rank_leaderboard,
};
pub use type_rating::{
    BodyType, TypeRating, TypeRatingSpec, resolve_for_aircraft, validate_type_name_unique,
};
pub use types::{FlightTime, LegId, PilotId, PirepId, TypeRatingId};
pub use validation::{
    require_non_negative, require_override_reason, require_text, validate_airport_code,
};

// Appears in public signatures.
pub use rust_decimal::Decimal;
