// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{
    admin_actor, file_report, load_state, pilot, run_career, scenario_b_draft, seed_catalog,
    transition,
};
use crate::{Persistence, PersistenceError};
use va_career::{CareerState, Command, TransitionResult};
use va_career_audit::Actor;
use va_career_domain::{FlightLeg, LegStatus, Money, PilotId, PilotProfile, PirepId};

#[test]
fn test_second_dispatch_from_same_snapshot_conflicts() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (rating_id, leg_id) = seed_catalog(&mut persistence);
    let first: PilotId = pilot("p1");
    let second: PilotId = pilot("p2");
    for pilot_id in [&first, &second] {
        for command in [
            Command::PurchaseTypeRating {
                type_rating_id: rating_id,
            },
            Command::ActivateTypeRating {
                type_rating_id: rating_id,
            },
        ] {
            run_career(
                &mut persistence,
                pilot_id,
                None,
                None,
                command,
                Actor::pilot(pilot_id),
            );
        }
    }

    let first_state: CareerState = load_state(&mut persistence, &first, Some(leg_id), None);
    let second_state: CareerState = load_state(&mut persistence, &second, Some(leg_id), None);
    let first_result: TransitionResult =
        transition(&first_state, Command::DispatchLeg, Actor::pilot(&first));
    let second_result: TransitionResult =
        transition(&second_state, Command::DispatchLeg, Actor::pilot(&second));

    persistence.persist_transition(&first_result).unwrap();
    let err: PersistenceError = persistence.persist_transition(&second_result).unwrap_err();
    assert!(err.is_conflict());

    let leg: FlightLeg = persistence.get_flight_leg(leg_id).unwrap().unwrap();
    assert_eq!(leg.status, LegStatus::Dispatched);
    assert_eq!(leg.assigned_pilot, Some(first));
    assert_eq!(persistence.list_audit_events(Some(&second)).unwrap().len(), 2);
}

#[test]
fn test_stale_double_approval_credits_once() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (rating_id, leg_id) = seed_catalog(&mut persistence);
    let pilot_id: PilotId = pilot("p1");
    let pirep_id: PirepId = file_report(&mut persistence, &pilot_id, rating_id, leg_id);

    let state: CareerState = load_state(&mut persistence, &pilot_id, Some(leg_id), Some(pirep_id));
    let first: TransitionResult =
        transition(&state, Command::ApprovePirep { notes: None }, admin_actor());
    let second: TransitionResult =
        transition(&state, Command::ApprovePirep { notes: None }, admin_actor());

    persistence.persist_transition(&first).unwrap();
    let err: PersistenceError = persistence.persist_transition(&second).unwrap_err();
    assert!(matches!(err, PersistenceError::Conflict { .. }));

    let profile: PilotProfile = persistence.get_profile(&pilot_id).unwrap().unwrap();
    assert_eq!(profile.balance, Money::units(510));
    assert!(persistence.verify_ledger(&pilot_id).unwrap().is_consistent());
}

#[test]
fn test_second_filing_from_same_snapshot_conflicts() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (rating_id, leg_id) = seed_catalog(&mut persistence);
    let pilot_id: PilotId = pilot("p1");
    let actor: Actor = Actor::pilot(&pilot_id);
    for command in [
        Command::PurchaseTypeRating {
            type_rating_id: rating_id,
        },
        Command::ActivateTypeRating {
            type_rating_id: rating_id,
        },
    ] {
        run_career(&mut persistence, &pilot_id, None, None, command, actor.clone());
    }
    run_career(
        &mut persistence,
        &pilot_id,
        Some(leg_id),
        None,
        Command::DispatchLeg,
        actor.clone(),
    );

    let state: CareerState = load_state(&mut persistence, &pilot_id, Some(leg_id), None);
    let file = || Command::FilePirep {
        draft: scenario_b_draft(),
    };
    let first: TransitionResult = transition(&state, file(), actor.clone());
    let second: TransitionResult = transition(&state, file(), actor);

    persistence.persist_transition(&first).unwrap();
    assert!(persistence.persist_transition(&second).unwrap_err().is_conflict());
    assert_eq!(persistence.list_pireps_for_leg(leg_id).unwrap().len(), 1);
}

#[test]
fn test_conflict_rolls_back_the_whole_transition() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (rating_id, leg_id) = seed_catalog(&mut persistence);
    let pilot_id: PilotId = pilot("p1");
    let pirep_id: PirepId = file_report(&mut persistence, &pilot_id, rating_id, leg_id);

    let state: CareerState = load_state(&mut persistence, &pilot_id, Some(leg_id), Some(pirep_id));
    let approval: TransitionResult =
        transition(&state, Command::ApprovePirep { notes: None }, admin_actor());

    // A leg edit lands between load and write; the profile write has
    // already succeeded inside the transaction when the leg check fails.
    run_career(
        &mut persistence,
        &pilot_id,
        Some(leg_id),
        None,
        Command::CompleteLeg,
        Actor::pilot(&pilot_id),
    );
    let events_before: usize = persistence.list_audit_events(None).unwrap().len();

    assert!(persistence.persist_transition(&approval).unwrap_err().is_conflict());

    let profile: PilotProfile = persistence.get_profile(&pilot_id).unwrap().unwrap();
    assert_eq!(profile.balance, Money::ZERO);
    assert_eq!(persistence.get_stats(&pilot_id).unwrap().unwrap().total_flights, 0);
    assert_eq!(persistence.list_audit_events(None).unwrap().len(), events_before);
}
