// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use va_career_domain::{
    Decimal, FlightLeg, LegId, LegStatus, Money, Pirep, PirepId, PirepStatus, TypeRatingId,
};
use va_career_persistence::Persistence;

use super::helpers::{
    NOW, create_leg, create_rating, create_second_pilot, create_test_admin, create_test_cause,
    create_test_context, create_test_persistence, create_test_pilot, equip, fly_and_file,
    rating_request, scenario_b_figures, seed_catalog, short_hop_figures,
};
use crate::{
    ApiError, CareerContext, DeletePirepRequest, ErrorKind, FilePirepRequest, PirepEdits,
    PirepFigures, ReviewPirepRequest, activate_type_rating, approve_pirep, complete_leg,
    delete_pirep, dispatch_leg, file_pirep, get_profile, get_stats, purchase_type_rating,
    reject_pirep, update_pirep, verify_ledger,
};

fn approve(persistence: &mut Persistence, ctx: &CareerContext, pirep_id: PirepId) {
    approve_pirep(
        persistence,
        ctx,
        &create_test_admin(),
        pirep_id,
        ReviewPirepRequest {
            notes: Some(String::from("Nice landing")),
        },
        &create_test_cause(),
        NOW,
    )
    .unwrap();
}

fn leg(persistence: &mut Persistence, leg_id: LegId) -> FlightLeg {
    persistence.get_flight_leg(leg_id).unwrap().unwrap()
}

fn pirep(persistence: &mut Persistence, pirep_id: PirepId) -> Pirep {
    persistence.get_pirep(pirep_id).unwrap().unwrap()
}

#[test]
fn test_dispatch_assigns_leg_to_pilot_in_active_family() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);

    let response =
        dispatch_leg(&mut persistence, &ctx, &pilot, leg_id, &create_test_cause(), NOW).unwrap();

    assert_eq!(response.leg.status, LegStatus::Dispatched);
    assert_eq!(response.leg.assigned_pilot, Some(pilot.pilot_id.clone()));
    assert_eq!(response.leg.dispatched_at, Some(NOW));
    assert!(response.event_id > 0);
}

#[test]
fn test_dispatch_outside_active_family_is_policy_violation() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, _) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let widebody_leg: LegId = create_flight_leg_in(&mut persistence, &ctx, "WY601", "B777");

    let err: ApiError = dispatch_leg(
        &mut persistence,
        &ctx,
        &pilot,
        widebody_leg,
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PolicyViolation);
    assert_eq!(leg(&mut persistence, widebody_leg).status, LegStatus::Available);
}

fn create_flight_leg_in(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    flight_number: &str,
    family: &str,
) -> LegId {
    let response = crate::create_flight_leg(
        persistence,
        ctx,
        &create_test_admin(),
        super::helpers::leg_request(flight_number, family),
        &create_test_cause(),
        NOW,
    )
    .unwrap();
    LegId::new(response.created_ids[0])
}

#[test]
fn test_dispatch_of_unknown_leg_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();

    let err: ApiError = dispatch_leg(
        &mut persistence,
        &ctx,
        &create_test_pilot(),
        LegId::new(404),
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_filing_computes_reference_breakdown() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    dispatch_leg(&mut persistence, &ctx, &pilot, leg_id, &create_test_cause(), NOW).unwrap();

    let response = file_pirep(
        &mut persistence,
        &ctx,
        &pilot,
        FilePirepRequest {
            leg_id,
            figures: scenario_b_figures(),
        },
        &create_test_cause(),
        NOW,
    )
    .unwrap();

    let filed: Pirep = response.pirep.unwrap();
    assert_eq!(filed.status, PirepStatus::Pending);
    assert_eq!(filed.earnings.base_earnings, Money::units(375));
    assert_eq!(filed.earnings.flight_earnings, Money::units(450));
    assert_eq!(filed.earnings.payload_bonus, Money::units(150));
    assert_eq!(filed.earnings.gross, Money::units(600));
    assert_eq!(filed.earnings.deductions, Money::units(90));
    assert_eq!(filed.earnings.grand_total, Money::units(510));
    assert_eq!(filed.snapshot.callsign, "VAC101");
    assert_eq!(filed.snapshot.flight_number, "WY101");

    // Filing credits nothing.
    let profile = get_profile(&mut persistence, &ctx, &pilot, NOW).unwrap();
    assert_eq!(profile.profile.balance, Money::ZERO);
}

#[test]
fn test_approval_credits_pilot_once_and_completes_leg() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());

    approve(&mut persistence, &ctx, pirep_id);

    let profile = get_profile(&mut persistence, &ctx, &pilot, NOW).unwrap();
    assert_eq!(profile.profile.balance, Money::units(510));
    assert_eq!(profile.profile.flight_time.minutes(), 150);
    assert_eq!(profile.profile.total_distance_nm, 185);

    let stats = get_stats(&mut persistence, &ctx, &pilot, &pilot.pilot_id, NOW)
        .unwrap()
        .stats;
    assert_eq!(stats.total_flights, 1);
    assert_eq!(stats.total_earnings, Money::units(510));
    assert_eq!(stats.route("OOMS", "OMDB").unwrap().count, 1);

    let completed: FlightLeg = leg(&mut persistence, leg_id);
    assert_eq!(completed.status, LegStatus::Completed);
    assert_eq!(completed.completed_at, Some(NOW));

    let approved: Pirep = pirep(&mut persistence, pirep_id);
    assert_eq!(approved.status, PirepStatus::Approved);
    let review = approved.review.unwrap();
    assert_eq!(review.reviewer.value(), "chief");
    assert_eq!(review.notes.as_deref(), Some("Nice landing"));
}

#[test]
fn test_second_approval_is_invalid_state_and_credits_nothing() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());
    approve(&mut persistence, &ctx, pirep_id);

    let err: ApiError = approve_pirep(
        &mut persistence,
        &ctx,
        &create_test_admin(),
        pirep_id,
        ReviewPirepRequest::default(),
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let rejected_err: ApiError = reject_pirep(
        &mut persistence,
        &ctx,
        &create_test_admin(),
        pirep_id,
        ReviewPirepRequest::default(),
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();
    assert_eq!(rejected_err.kind(), ErrorKind::InvalidState);

    let profile = get_profile(&mut persistence, &ctx, &pilot, NOW).unwrap();
    assert_eq!(profile.profile.balance, Money::units(510));
    let ledger = verify_ledger(&mut persistence, &pilot, &pilot.pilot_id).unwrap();
    assert!(ledger.consistent);
}

#[test]
fn test_rejecting_report_on_completed_leg_reverts_leg() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());
    complete_leg(&mut persistence, &ctx, &pilot, leg_id, &create_test_cause(), NOW).unwrap();
    assert_eq!(leg(&mut persistence, leg_id).status, LegStatus::Completed);

    let response = reject_pirep(
        &mut persistence,
        &ctx,
        &create_test_admin(),
        pirep_id,
        ReviewPirepRequest { notes: None },
        &create_test_cause(),
        NOW,
    )
    .unwrap();

    let rejected: Pirep = response.pirep.unwrap();
    assert_eq!(rejected.status, PirepStatus::Rejected);
    assert_eq!(
        rejected.review.unwrap().notes.as_deref(),
        Some("PIREP rejected")
    );

    let reverted: FlightLeg = leg(&mut persistence, leg_id);
    assert_eq!(reverted.status, LegStatus::Dispatched);
    assert_eq!(reverted.completed_at, None);
    assert_eq!(reverted.assigned_pilot, Some(pilot.pilot_id.clone()));

    let profile = get_profile(&mut persistence, &ctx, &pilot, NOW).unwrap();
    assert_eq!(profile.profile.balance, Money::ZERO);
    let stats = get_stats(&mut persistence, &ctx, &pilot, &pilot.pilot_id, NOW)
        .unwrap()
        .stats;
    assert_eq!(stats.total_flights, 0);
}

#[test]
fn test_pilot_can_refile_after_rejection() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());
    reject_pirep(
        &mut persistence,
        &ctx,
        &create_test_admin(),
        pirep_id,
        ReviewPirepRequest::default(),
        &create_test_cause(),
        NOW,
    )
    .unwrap();

    let refiled = file_pirep(
        &mut persistence,
        &ctx,
        &pilot,
        FilePirepRequest {
            leg_id,
            figures: short_hop_figures(),
        },
        &create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(
        refiled.pirep.unwrap().earnings.grand_total,
        Money::units(153)
    );
}

#[test]
fn test_second_live_report_on_leg_is_invalid_state() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());

    let err: ApiError = file_pirep(
        &mut persistence,
        &ctx,
        &pilot,
        FilePirepRequest {
            leg_id,
            figures: scenario_b_figures(),
        },
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(persistence.list_pireps_for_leg(leg_id).unwrap().len(), 1);
}

#[test]
fn test_filing_against_another_pilots_leg_is_unauthorized() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let owner = create_test_pilot();
    let intruder = create_second_pilot();
    equip(&mut persistence, &ctx, &owner, rating_id);
    dispatch_leg(&mut persistence, &ctx, &owner, leg_id, &create_test_cause(), NOW).unwrap();

    let err: ApiError = file_pirep(
        &mut persistence,
        &ctx,
        &intruder,
        FilePirepRequest {
            leg_id,
            figures: scenario_b_figures(),
        },
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn test_negative_inputs_are_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    dispatch_leg(&mut persistence, &ctx, &pilot, leg_id, &create_test_cause(), NOW).unwrap();

    let err: ApiError = file_pirep(
        &mut persistence,
        &ctx,
        &pilot,
        FilePirepRequest {
            leg_id,
            figures: PirepFigures {
                passengers: -5,
                ..scenario_b_figures()
            },
        },
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err: ApiError = file_pirep(
        &mut persistence,
        &ctx,
        &pilot,
        FilePirepRequest {
            leg_id,
            figures: PirepFigures {
                cargo_kg: Decimal::new(-1, 1),
                ..scenario_b_figures()
            },
        },
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(persistence.list_pireps_for_leg(leg_id).unwrap().is_empty());
}

#[test]
fn test_update_recomputes_with_filed_rate() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());

    let response = update_pirep(
        &mut persistence,
        &ctx,
        &pilot,
        pirep_id,
        short_hop_figures().into(),
        &create_test_cause(),
        NOW,
    )
    .unwrap();

    let updated: Pirep = response.pirep.unwrap();
    assert_eq!(updated.earnings.grand_total, Money::units(153));
    assert_eq!(updated.inputs.passengers, 0);
    assert_eq!(updated.version, 2);
}

#[test]
fn test_only_filer_may_update_or_delete() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    let other = create_second_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());

    let update_err: ApiError = update_pirep(
        &mut persistence,
        &ctx,
        &other,
        pirep_id,
        short_hop_figures().into(),
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();
    assert_eq!(update_err.kind(), ErrorKind::Unauthorized);

    let delete_err: ApiError = delete_pirep(
        &mut persistence,
        &ctx,
        &other,
        pirep_id,
        DeletePirepRequest::default(),
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();
    assert_eq!(delete_err.kind(), ErrorKind::Unauthorized);
    assert!(persistence.get_pirep(pirep_id).unwrap().is_some());
}

#[test]
fn test_filer_deletes_pending_report() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());

    let response = delete_pirep(
        &mut persistence,
        &ctx,
        &pilot,
        pirep_id,
        DeletePirepRequest::default(),
        &create_test_cause(),
        NOW,
    )
    .unwrap();

    assert!(response.pirep.is_none());
    assert!(persistence.get_pirep(pirep_id).unwrap().is_none());
    assert_eq!(leg(&mut persistence, leg_id).status, LegStatus::Dispatched);
}

#[test]
fn test_approved_report_needs_admin_override_to_delete() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());
    approve(&mut persistence, &ctx, pirep_id);

    let err: ApiError = delete_pirep(
        &mut persistence,
        &ctx,
        &pilot,
        pirep_id,
        DeletePirepRequest::default(),
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let blank_reason: ApiError = delete_pirep(
        &mut persistence,
        &ctx,
        &create_test_admin(),
        pirep_id,
        DeletePirepRequest {
            override_reason: Some(String::from("   ")),
        },
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();
    assert_eq!(blank_reason.kind(), ErrorKind::PolicyViolation);

    delete_pirep(
        &mut persistence,
        &ctx,
        &create_test_admin(),
        pirep_id,
        DeletePirepRequest {
            override_reason: Some(String::from("Duplicate of an earlier flight")),
        },
        &create_test_cause(),
        NOW,
    )
    .unwrap();

    let profile = get_profile(&mut persistence, &ctx, &pilot, NOW).unwrap();
    assert_eq!(profile.profile.balance, Money::ZERO);
    assert_eq!(profile.profile.flight_time.minutes(), 0);
    let ledger = verify_ledger(&mut persistence, &pilot, &pilot.pilot_id).unwrap();
    assert!(ledger.consistent);
}

#[test]
fn test_purchase_beyond_balance_changes_nothing() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let widebody: TypeRatingId = create_rating(
        &mut persistence,
        &ctx,
        rating_request("B777", "B777", 20_000),
    );
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());
    approve(&mut persistence, &ctx, pirep_id);

    let err: ApiError = purchase_type_rating(
        &mut persistence,
        &ctx,
        &pilot,
        widebody,
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();

    assert_eq!(
        err,
        ApiError::InsufficientFunds {
            required: Money::units(20_000),
            available: Money::units(510),
        }
    );
    let profile = get_profile(&mut persistence, &ctx, &pilot, NOW).unwrap();
    assert_eq!(profile.profile.balance, Money::units(510));
    assert!(!profile.profile.owns(widebody));
    assert_eq!(persistence.list_purchases(&pilot.pilot_id).unwrap().len(), 1);
}

#[test]
fn test_purchase_debits_balance_and_second_purchase_is_refused() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let turboprop: TypeRatingId =
        create_rating(&mut persistence, &ctx, rating_request("ATR72", "ATR", 400));
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());
    approve(&mut persistence, &ctx, pirep_id);

    let bought = purchase_type_rating(
        &mut persistence,
        &ctx,
        &pilot,
        turboprop,
        &create_test_cause(),
        NOW,
    )
    .unwrap();
    assert_eq!(bought.balance, Money::units(110));

    let again: ApiError = purchase_type_rating(
        &mut persistence,
        &ctx,
        &pilot,
        turboprop,
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();
    assert_eq!(again.kind(), ErrorKind::PolicyViolation);

    let ledger = verify_ledger(&mut persistence, &pilot, &pilot.pilot_id).unwrap();
    assert!(ledger.consistent);
    assert_eq!(ledger.purchases, Money::units(400));
    assert_eq!(ledger.approved_earnings, Money::units(510));
}

#[test]
fn test_locked_rating_cannot_be_bought() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let mut request = rating_request("A350", "A350", 0);
    request.is_locked = true;
    let locked: TypeRatingId = create_rating(&mut persistence, &ctx, request);

    let err: ApiError = purchase_type_rating(
        &mut persistence,
        &ctx,
        &create_test_pilot(),
        locked,
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PolicyViolation);
}

#[test]
fn test_activation_requires_ownership() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, _) = seed_catalog(&mut persistence, &ctx);

    let err: ApiError = activate_type_rating(
        &mut persistence,
        &ctx,
        &create_test_pilot(),
        rating_id,
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PolicyViolation);
}

#[test]
fn test_family_switch_blocked_while_leg_in_flight() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let boeing: TypeRatingId =
        create_rating(&mut persistence, &ctx, rating_request("B738", "B737", 0));
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    purchase_type_rating(&mut persistence, &ctx, &pilot, boeing, &create_test_cause(), NOW)
        .unwrap();
    dispatch_leg(&mut persistence, &ctx, &pilot, leg_id, &create_test_cause(), NOW).unwrap();

    let err: ApiError = activate_type_rating(
        &mut persistence,
        &ctx,
        &pilot,
        boeing,
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PolicyViolation);

    // Once the leg is reported and approved the switch goes through.
    let pirep_id: PirepId = file_pirep(
        &mut persistence,
        &ctx,
        &pilot,
        FilePirepRequest {
            leg_id,
            figures: scenario_b_figures(),
        },
        &create_test_cause(),
        NOW,
    )
    .unwrap()
    .pirep
    .unwrap()
    .pirep_id
    .unwrap();
    approve(&mut persistence, &ctx, pirep_id);

    let switched = activate_type_rating(
        &mut persistence,
        &ctx,
        &pilot,
        boeing,
        &create_test_cause(),
        NOW,
    )
    .unwrap();
    assert_eq!(switched.active_family.as_deref(), Some("B737"));
}

#[test]
fn test_complete_leg_requires_assignment() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    dispatch_leg(&mut persistence, &ctx, &pilot, leg_id, &create_test_cause(), NOW).unwrap();

    let err: ApiError = complete_leg(
        &mut persistence,
        &ctx,
        &create_second_pilot(),
        leg_id,
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let open_leg: LegId = create_leg(&mut persistence, &ctx, "WY102");
    let err: ApiError = complete_leg(
        &mut persistence,
        &ctx,
        &pilot,
        open_leg,
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn test_partial_update_keeps_omitted_figures() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());

    let edits: PirepEdits = PirepEdits {
        flight_time_hours: Some(1),
        flight_time_minutes: Some(0),
        ..PirepEdits::default()
    };
    let updated: Pirep = update_pirep(
        &mut persistence,
        &ctx,
        &pilot,
        pirep_id,
        edits,
        &create_test_cause(),
        NOW,
    )
    .unwrap()
    .pirep
    .unwrap();

    assert_eq!(updated.inputs.passengers, 100);
    assert_eq!(updated.inputs.cargo_kg, Decimal::from(500));
    assert_eq!(updated.remarks.as_deref(), Some("Smooth ride"));
    assert_eq!(updated.earnings.grand_total, Money::from_cents(28_050));
}

#[test]
fn test_completing_leg_requires_a_pending_report() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    dispatch_leg(&mut persistence, &ctx, &pilot, leg_id, &create_test_cause(), NOW).unwrap();

    let err: ApiError =
        complete_leg(&mut persistence, &ctx, &pilot, leg_id, &create_test_cause(), NOW)
            .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(leg(&mut persistence, leg_id).status, LegStatus::Dispatched);

    // The leg is still open for a report, after which it can be completed.
    file_pirep(
        &mut persistence,
        &ctx,
        &pilot,
        FilePirepRequest {
            leg_id,
            figures: scenario_b_figures(),
        },
        &create_test_cause(),
        NOW,
    )
    .unwrap();
    complete_leg(&mut persistence, &ctx, &pilot, leg_id, &create_test_cause(), NOW).unwrap();
    assert_eq!(leg(&mut persistence, leg_id).status, LegStatus::Completed);
}

#[test]
fn test_filing_rejects_block_time_too_large_to_credit() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    dispatch_leg(&mut persistence, &ctx, &pilot, leg_id, &create_test_cause(), NOW).unwrap();

    let err: ApiError = file_pirep(
        &mut persistence,
        &ctx,
        &pilot,
        FilePirepRequest {
            leg_id,
            figures: PirepFigures {
                flight_time_hours: i64::MAX / 2,
                ..PirepFigures::default()
            },
        },
        &create_test_cause(),
        NOW,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(persistence.list_pireps_for_leg(leg_id).unwrap().is_empty());
    assert_eq!(leg(&mut persistence, leg_id).status, LegStatus::Dispatched);
}
