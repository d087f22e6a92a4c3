// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod audit_tests;
mod concurrency_tests;

use crate::{PersistCatalogResult, PersistTransitionResult, Persistence, PersistenceError};
use time::OffsetDateTime;
use time::macros::datetime;
use va_career::{
    CareerState, CatalogCommand, CatalogState, Command, TransitionResult, apply, apply_catalog,
};
use va_career_audit::{Actor, Cause};
use va_career_domain::{
    BodyType, Decimal, FlightLegSpec, FlightReportInputs, LegId, Money, PilotId, PirepDraft,
    PirepId, RankTable, TypeRatingId, TypeRatingSpec,
};

pub const NOW: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn pilot(id: &str) -> PilotId {
    PilotId::new(id)
}

pub fn admin_actor() -> Actor {
    Actor::admin(&PilotId::new("chief"))
}

pub fn create_test_rating_spec(type_name: &str, family: &str, price: i64) -> TypeRatingSpec {
    TypeRatingSpec {
        type_name: type_name.to_string(),
        aircraft_family: family.to_string(),
        purchase_price: Money::units(price),
        base_rate: Money::units(150),
        multiplier: Decimal::new(12, 1),
        seats: 180,
        description: format!("{type_name} test rating"),
        body_type: BodyType::NarrowBody,
        rank_required: None,
        is_locked: false,
    }
}

pub fn create_test_leg_spec(flight_number: &str, family: &str) -> FlightLegSpec {
    FlightLegSpec {
        flight_number: flight_number.to_string(),
        origin: String::from("OOMS"),
        destination: String::from("OMDB"),
        aircraft_type: family.to_string(),
        aircraft_family: family.to_string(),
        distance_nm: 185,
        estimated_minutes: 70,
        locked: false,
    }
}

/// The reference filing: 2:30 block, 100 passengers, 500 kg cargo.
pub fn scenario_b_draft() -> PirepDraft {
    PirepDraft {
        inputs: FlightReportInputs {
            flight_time_hours: 2,
            flight_time_minutes: 30,
            passengers: 100,
            cargo_kg: Decimal::from(500),
            fuel_used_kg: Decimal::from(2_400),
        },
        flight_date: Some(NOW.date()),
        remarks: Some(String::from("Smooth ride")),
    }
}

pub fn run_catalog(
    persistence: &mut Persistence,
    leg_id: Option<LegId>,
    command: CatalogCommand,
) -> Result<PersistCatalogResult, PersistenceError> {
    let state: CatalogState = CatalogState {
        type_ratings: persistence.list_type_ratings().unwrap(),
        leg: leg_id.and_then(|id| persistence.get_flight_leg(id).unwrap()),
    };
    let result = apply_catalog(&state, command, admin_actor(), create_test_cause(), NOW).unwrap();
    persistence.persist_catalog(&result)
}

/// Creates a free A320 rating and one A320 leg.
pub fn seed_catalog(persistence: &mut Persistence) -> (TypeRatingId, LegId) {
    let rating: PersistCatalogResult = run_catalog(
        persistence,
        None,
        CatalogCommand::CreateTypeRating {
            spec: create_test_rating_spec("A320", "A320", 0),
        },
    )
    .unwrap();
    let leg: PersistCatalogResult = run_catalog(
        persistence,
        None,
        CatalogCommand::CreateFlightLeg {
            spec: create_test_leg_spec("WY101", "A320"),
        },
    )
    .unwrap();
    (
        TypeRatingId::new(rating.created_ids[0]),
        LegId::new(leg.created_ids[0]),
    )
}

/// Loads everything a career command may need.
pub fn load_state(
    persistence: &mut Persistence,
    pilot_id: &PilotId,
    leg_id: Option<LegId>,
    pirep_id: Option<PirepId>,
) -> CareerState {
    let (profile, stats) = persistence
        .get_or_create_career(pilot_id, "", true, &RankTable::standard(), NOW)
        .unwrap();
    let leg = leg_id.and_then(|id| persistence.get_flight_leg(id).unwrap());
    let leg_reports = leg_id
        .map(|id| persistence.list_pireps_for_leg(id).unwrap())
        .unwrap_or_default();
    CareerState::new(profile, stats)
        .with_leg(leg)
        .with_pirep(pirep_id.and_then(|id| persistence.get_pirep(id).unwrap()))
        .with_leg_reports(leg_reports)
        .with_assigned_legs(persistence.list_assigned_legs(pilot_id).unwrap())
        .with_type_ratings(persistence.list_type_ratings().unwrap())
}

pub fn transition(state: &CareerState, command: Command, actor: Actor) -> TransitionResult {
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

/// Loads, applies and persists one command.
pub fn run_career(
    persistence: &mut Persistence,
    pilot_id: &PilotId,
    leg_id: Option<LegId>,
    pirep_id: Option<PirepId>,
    command: Command,
    actor: Actor,
) -> PersistTransitionResult {
    let state: CareerState = load_state(persistence, pilot_id, leg_id, pirep_id);
    let result: TransitionResult = transition(&state, command, actor);
    persistence.persist_transition(&result).unwrap()
}

/// Takes a pilot from a fresh profile to a PENDING report on `leg_id`.
pub fn file_report(
    persistence: &mut Persistence,
    pilot_id: &PilotId,
    rating_id: TypeRatingId,
    leg_id: LegId,
) -> PirepId {
    let actor: Actor = Actor::pilot(pilot_id);
    let state: CareerState = load_state(persistence, pilot_id, None, None);
    if !state.profile.owns(rating_id) {
        run_career(
            persistence,
            pilot_id,
            None,
            None,
            Command::PurchaseTypeRating {
                type_rating_id: rating_id,
            },
            actor.clone(),
        );
        run_career(
            persistence,
            pilot_id,
            None,
            None,
            Command::ActivateTypeRating {
                type_rating_id: rating_id,
            },
            actor.clone(),
        );
    }
    run_career(
        persistence,
        pilot_id,
        Some(leg_id),
        None,
        Command::DispatchLeg,
        actor.clone(),
    );
    run_career(
        persistence,
        pilot_id,
        Some(leg_id),
        None,
        Command::FilePirep {
            draft: scenario_b_draft(),
        },
        actor,
    )
    .pirep_id
    .unwrap()
}

/// Approves a report as the chief pilot.
pub fn approve(persistence: &mut Persistence, pilot_id: &PilotId, pirep_id: PirepId) {
    let leg_id: Option<LegId> = persistence.get_pirep(pirep_id).unwrap().unwrap().leg_id;
    run_career(
        persistence,
        pilot_id,
        leg_id,
        Some(pirep_id),
        Command::ApprovePirep { notes: None },
        admin_actor(),
    );
}
