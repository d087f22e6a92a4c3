// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Duration;
use va_career_domain::{
    Decimal, FlightLeg, LeaderboardMetric, LegId, Money, PirepId, TypeRatingId,
};
use va_career_persistence::Persistence;

use super::helpers::{
    NOW, create_leg, create_rating, create_second_pilot, create_test_admin, create_test_cause,
    create_test_context, create_test_persistence, create_test_pilot, equip, fly_and_file,
    leg_request, rating_request, scenario_b_figures, seed_catalog, short_hop_figures,
};
use crate::{
    ApiError, AuditEventInfo, Capability, CareerContext, ErrorKind, LeaderboardResponse,
    ListTypeRatingsResponse, ProfileResponse, RatingOwnership, ReviewPirepRequest,
    RouteHistoryResponse, approve_pirep, create_flight_leg, dispatch_leg, fleet_analytics,
    get_audit_event, get_leaderboard, get_profile, get_route_history, list_audit_events,
    list_legs, list_my_legs, list_my_pireps, list_pending_pireps, list_pilots,
    list_type_ratings_for_pilot, reject_pirep, verify_ledger,
};

fn approve(persistence: &mut Persistence, ctx: &CareerContext, pirep_id: PirepId) {
    approve_pirep(
        persistence,
        ctx,
        &create_test_admin(),
        pirep_id,
        ReviewPirepRequest::default(),
        &create_test_cause(),
        NOW,
    )
    .unwrap();
}

#[test]
fn test_first_profile_read_provisions_cadet() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();

    let response: ProfileResponse =
        get_profile(&mut persistence, &ctx, &create_test_pilot(), NOW).unwrap();

    assert_eq!(response.profile.callsign, "VAC101");
    assert_eq!(response.profile.balance, Money::ZERO);
    assert_eq!(response.rank.rank_name, "Cadet");
    assert_eq!(response.hours_to_next_rank, Some(Decimal::from(10)));
    assert!(response.capabilities.contains(&Capability::FlyCareer));
    assert!(!response.capabilities.contains(&Capability::CareerAdmin));
    assert_eq!(persistence.list_profiles().unwrap().len(), 1);
}

#[test]
fn test_profile_reports_progress_after_approval() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());
    approve(&mut persistence, &ctx, pirep_id);

    let response: ProfileResponse = get_profile(&mut persistence, &ctx, &pilot, NOW).unwrap();

    assert_eq!(response.rank.rank_name, "Cadet");
    assert_eq!(response.rank.next_rank_name.as_deref(), Some("First Officer"));
    assert_eq!(response.hours_to_next_rank, Some(Decimal::new(75, 1)));
}

#[test]
fn test_rating_list_shows_ownership() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, _) = seed_catalog(&mut persistence, &ctx);
    create_rating(&mut persistence, &ctx, rating_request("B738", "B737", 1_200));
    let mut locked = rating_request("A359", "A350", 30_000);
    locked.is_locked = true;
    create_rating(&mut persistence, &ctx, locked);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);

    let response: ListTypeRatingsResponse =
        list_type_ratings_for_pilot(&mut persistence, &ctx, &pilot, NOW).unwrap();

    let names: Vec<&str> = response
        .type_ratings
        .iter()
        .map(|view| view.type_rating.spec.type_name.as_str())
        .collect();
    assert_eq!(names, vec!["A320", "B738", "A359"]);

    let statuses: Vec<RatingOwnership> =
        response.type_ratings.iter().map(|view| view.status).collect();
    assert_eq!(
        statuses,
        vec![
            RatingOwnership::Owned,
            RatingOwnership::Available,
            RatingOwnership::Locked
        ]
    );
    assert!(response.type_ratings[0].is_active);
    assert!(!response.type_ratings[1].is_active);
}

#[test]
fn test_dispatch_board_filters_by_family_and_assignment() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let open_leg: LegId = create_leg(&mut persistence, &ctx, "WY102");
    let taken_leg: LegId = create_leg(&mut persistence, &ctx, "WY103");
    create_flight_leg(
        &mut persistence,
        &ctx,
        &create_test_admin(),
        leg_request("WY777", "B777"),
        &create_test_cause(),
        NOW,
    )
    .unwrap();
    let pilot = create_test_pilot();
    let other = create_second_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    equip(&mut persistence, &ctx, &other, rating_id);
    dispatch_leg(&mut persistence, &ctx, &pilot, leg_id, &create_test_cause(), NOW).unwrap();
    dispatch_leg(&mut persistence, &ctx, &other, taken_leg, &create_test_cause(), NOW).unwrap();

    let board: Vec<FlightLeg> = list_legs(&mut persistence, &ctx, &pilot, NOW).unwrap().legs;
    let ids: Vec<Option<LegId>> = board.iter().map(|leg| leg.leg_id).collect();
    assert_eq!(ids, vec![Some(leg_id), Some(open_leg)]);

    let mine: Vec<FlightLeg> = list_my_legs(&mut persistence, &pilot).unwrap().legs;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].leg_id, Some(leg_id));
}

#[test]
fn test_pilot_without_active_family_sees_only_own_legs() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    seed_catalog(&mut persistence, &ctx);

    let board = list_legs(&mut persistence, &ctx, &create_test_pilot(), NOW).unwrap();

    assert!(board.legs.is_empty());
}

#[test]
fn test_leaderboard_orders_by_metric() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let second_leg: LegId = create_leg(&mut persistence, &ctx, "WY102");
    let pilot = create_test_pilot();
    let other = create_second_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    equip(&mut persistence, &ctx, &other, rating_id);
    let first: PirepId =
        fly_and_file(&mut persistence, &ctx, &other, second_leg, short_hop_figures());
    let second: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());
    approve(&mut persistence, &ctx, first);
    approve(&mut persistence, &ctx, second);

    let board: LeaderboardResponse =
        get_leaderboard(&mut persistence, &ctx, &pilot, None, None).unwrap();
    assert_eq!(board.metric, LeaderboardMetric::Earnings);
    assert_eq!(board.entries.len(), 2);
    assert_eq!(board.entries[0].pilot_id, pilot.pilot_id);
    assert_eq!(board.entries[0].position, 1);
    assert_eq!(board.entries[0].callsign, "VAC101");
    assert_eq!(board.entries[0].total_earnings, Money::units(510));
    assert_eq!(board.entries[1].total_earnings, Money::units(153));

    // One flight each: ties fall back to pilot id.
    let by_flights: LeaderboardResponse =
        get_leaderboard(&mut persistence, &ctx, &pilot, Some("flights"), Some(1)).unwrap();
    assert_eq!(by_flights.entries.len(), 1);
    assert_eq!(by_flights.entries[0].pilot_id, pilot.pilot_id);
}

#[test]
fn test_unknown_leaderboard_metric_is_invalid_input() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();

    let err: ApiError =
        get_leaderboard(&mut persistence, &ctx, &create_test_pilot(), Some("landings"), None)
            .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_route_history_honours_window() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());
    approve(&mut persistence, &ctx, pirep_id);
    let later = NOW + Duration::days(10);

    let all: RouteHistoryResponse =
        get_route_history(&mut persistence, &pilot, &pilot.pilot_id, None, later).unwrap();
    assert_eq!(all.since, None);
    assert_eq!(all.routes.len(), 1);
    assert_eq!(all.routes[0].origin, "OOMS");
    assert_eq!(all.routes[0].destination, "OMDB");
    assert_eq!(all.routes[0].count, 1);

    let month: RouteHistoryResponse =
        get_route_history(&mut persistence, &pilot, &pilot.pilot_id, Some("30d"), later)
            .unwrap();
    assert_eq!(month.routes.len(), 1);

    let week: RouteHistoryResponse =
        get_route_history(&mut persistence, &pilot, &pilot.pilot_id, Some("7d"), later)
            .unwrap();
    assert_eq!(week.since, Some(later - Duration::days(7)));
    assert!(week.routes.is_empty());

    let err: ApiError = get_route_history(
        &mut persistence,
        &pilot,
        &pilot.pilot_id,
        Some("fortnight"),
        later,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_route_history_ignores_unapproved_reports() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());

    let history: RouteHistoryResponse =
        get_route_history(&mut persistence, &pilot, &pilot.pilot_id, Some("all"), NOW).unwrap();

    assert!(history.routes.is_empty());
}

#[test]
fn test_report_lists() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let second_leg: LegId = create_leg(&mut persistence, &ctx, "WY102");
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let first: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());
    fly_and_file(&mut persistence, &ctx, &pilot, second_leg, short_hop_figures());
    reject_pirep(
        &mut persistence,
        &ctx,
        &create_test_admin(),
        first,
        ReviewPirepRequest::default(),
        &create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(list_my_pireps(&mut persistence, &pilot).unwrap().pireps.len(), 2);
    let pending = list_pending_pireps(&mut persistence, &create_test_admin()).unwrap();
    assert_eq!(pending.pireps.len(), 1);
    assert_eq!(pending.pireps[0].snapshot.flight_number, "WY102");
}

#[test]
fn test_admin_reports() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    get_profile(&mut persistence, &ctx, &create_second_pilot(), NOW).unwrap();
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());
    approve(&mut persistence, &ctx, pirep_id);
    let admin = create_test_admin();

    let pilots = list_pilots(&mut persistence, &admin).unwrap().pilots;
    assert_eq!(pilots.len(), 2);
    assert_eq!(pilots[0].pilot_id, pilot.pilot_id);
    assert_eq!(pilots[0].balance, Money::units(510));

    let analytics = fleet_analytics(&mut persistence, &admin).unwrap().analytics;
    assert_eq!(analytics.total_pilots, 2);
    assert_eq!(analytics.approved_pireps, 1);
    assert_eq!(analytics.pending_pireps, 0);
    assert_eq!(analytics.total_earnings, Money::units(510));
    assert_eq!(analytics.total_flight_time.minutes(), 150);

    let ledger = verify_ledger(&mut persistence, &admin, &pilot.pilot_id).unwrap();
    assert!(ledger.consistent);
    assert_eq!(ledger.expected_balance, Money::units(510));
}

#[test]
fn test_audit_trail_records_each_transition() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let (rating_id, leg_id) = seed_catalog(&mut persistence, &ctx);
    let pilot = create_test_pilot();
    equip(&mut persistence, &ctx, &pilot, rating_id);
    let pirep_id: PirepId =
        fly_and_file(&mut persistence, &ctx, &pilot, leg_id, scenario_b_figures());
    approve(&mut persistence, &ctx, pirep_id);
    let admin = create_test_admin();

    let events: Vec<AuditEventInfo> =
        list_audit_events(&mut persistence, &admin, Some(&pilot.pilot_id))
            .unwrap()
            .events;
    let actions: Vec<&str> = events.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(
        actions,
        vec![
            "PurchaseTypeRating",
            "ActivateTypeRating",
            "DispatchLeg",
            "FilePirep",
            "ApprovePirep"
        ]
    );
    assert_eq!(events[4].actor_id, "chief");
    assert_eq!(events[4].cause_id, "api-req-456");

    let everything: Vec<AuditEventInfo> =
        list_audit_events(&mut persistence, &admin, None).unwrap().events;
    assert!(everything.len() > events.len());

    let event_id: i64 = events[0].event_id.unwrap();
    let single: AuditEventInfo = get_audit_event(&mut persistence, &admin, event_id).unwrap();
    assert_eq!(single, events[0]);

    let missing: ApiError = get_audit_event(&mut persistence, &admin, 9_999).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
}

#[test]
fn test_unowned_rating_is_available() {
    let mut persistence: Persistence = create_test_persistence();
    let ctx: CareerContext = create_test_context();
    let rating_id: TypeRatingId =
        create_rating(&mut persistence, &ctx, rating_request("A320", "A320", 0));

    let response: ListTypeRatingsResponse =
        list_type_ratings_for_pilot(&mut persistence, &ctx, &create_test_pilot(), NOW).unwrap();

    assert_eq!(response.type_ratings.len(), 1);
    assert_eq!(response.type_ratings[0].type_rating.type_rating_id, Some(rating_id));
    assert_eq!(response.type_ratings[0].status, RatingOwnership::Available);
}
