// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CareerState, Command, TransitionResult, apply};
use time::OffsetDateTime;
use time::macros::datetime;
use va_career_audit::{Actor, Cause};
use va_career_domain::{
    BodyType, Decimal, FlightLeg, FlightLegSpec, FlightReportInputs, LegId, LegStatus, Money,
    PilotId, PilotProfile, PirepDraft, RankTable, StatsAggregate, TypeRating, TypeRatingId,
    TypeRatingSpec,
};

pub const NOW: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Career request"))
}

pub fn pilot_actor(pilot: &str) -> Actor {
    Actor::pilot(&PilotId::new(pilot))
}

pub fn admin_actor() -> Actor {
    Actor::admin(&PilotId::new("chief"))
}

pub fn create_test_profile(pilot: &str, family: Option<&str>, balance: i64) -> PilotProfile {
    let mut profile: PilotProfile = PilotProfile::new(
        PilotId::new(pilot),
        &format!("WY{pilot}"),
        true,
        &RankTable::standard(),
        NOW,
    );
    profile.active_family = family.map(str::to_string);
    profile.balance = Money::units(balance);
    profile.version = 1;
    profile
}

pub fn create_test_state(pilot: &str, family: Option<&str>, balance: i64) -> CareerState {
    let mut stats: StatsAggregate = StatsAggregate::new(PilotId::new(pilot));
    stats.version = 1;
    CareerState::new(create_test_profile(pilot, family, balance), stats)
        .with_type_ratings(vec![create_test_rating(1, "A320", "A320", 20_000)])
}

pub fn create_test_rating(id: i64, type_name: &str, family: &str, price: i64) -> TypeRating {
    TypeRating {
        type_rating_id: Some(TypeRatingId::new(id)),
        spec: TypeRatingSpec {
            type_name: type_name.to_string(),
            aircraft_family: family.to_string(),
            purchase_price: Money::units(price),
            base_rate: Money::units(150),
            multiplier: Decimal::new(12, 1),
            seats: 180,
            description: String::new(),
            body_type: BodyType::NarrowBody,
            rank_required: None,
            is_locked: false,
        },
        version: 1,
    }
}

pub fn create_test_leg_spec(family: &str) -> FlightLegSpec {
    FlightLegSpec {
        flight_number: String::from("WY101"),
        origin: String::from("OOMS"),
        destination: String::from("OMDB"),
        aircraft_type: family.to_string(),
        aircraft_family: family.to_string(),
        distance_nm: 185,
        estimated_minutes: 70,
        locked: false,
    }
}

pub fn create_test_leg(id: i64, family: &str) -> FlightLeg {
    let mut leg: FlightLeg = FlightLeg::new(create_test_leg_spec(family));
    leg.leg_id = Some(LegId::new(id));
    leg.version = 1;
    leg
}

pub fn dispatched_leg(id: i64, family: &str, pilot: &str) -> FlightLeg {
    let mut leg: FlightLeg = create_test_leg(id, family);
    leg.status = LegStatus::Dispatched;
    leg.assigned_pilot = Some(PilotId::new(pilot));
    leg.dispatched_at = Some(NOW);
    leg
}

/// The figures from the reference filing: 2:30 block, 100 passengers, 500 kg cargo.
pub fn scenario_b_draft() -> PirepDraft {
    PirepDraft {
        inputs: FlightReportInputs {
            flight_time_hours: 2,
            flight_time_minutes: 30,
            passengers: 100,
            cargo_kg: Decimal::from(500),
            fuel_used_kg: Decimal::ZERO,
        },
        flight_date: None,
        remarks: None,
    }
}

pub fn run(state: &CareerState, command: Command, actor: Actor) -> TransitionResult {
    apply(
        state,
        &RankTable::standard(),
        command,
        actor,
        create_test_cause(),
        NOW,
    )
    .unwrap()
}
