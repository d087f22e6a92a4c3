// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::{Arc, Mutex};

use time::OffsetDateTime;
use time::macros::datetime;
use va_career_audit::Cause;
use va_career_domain::{Decimal, LegId, Money, PirepId, RankTable, TypeRatingId};
use va_career_persistence::Persistence;

use crate::{
    AuthenticatedActor, CareerConfig, CareerContext, CareerNotification, FilePirepRequest,
    FlightLegRequest, NotificationError, NotificationSink, PirepFigures, Role, TracingSink,
    TypeRatingRequest, activate_type_rating, create_flight_leg, create_type_rating, dispatch_leg,
    file_pirep, purchase_type_rating,
};

pub const NOW: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

/// Sink that keeps every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub received: Mutex<Vec<CareerNotification>>,
}

impl RecordingSink {
    pub fn notifications(&self) -> Vec<CareerNotification> {
        self.received.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: &CareerNotification) -> Result<(), NotificationError> {
        self.received.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Sink whose endpoint is always down.
#[derive(Debug, Default)]
pub struct FailingSink;

impl NotificationSink for FailingSink {
    fn notify(&self, _notification: &CareerNotification) -> Result<(), NotificationError> {
        Err(NotificationError::Delivery(String::from("webhook unreachable")))
    }
}

pub fn create_test_context() -> CareerContext {
    CareerContext::new(
        RankTable::standard(),
        CareerConfig::default(),
        Arc::new(TracingSink),
    )
}

pub fn create_recording_context() -> (CareerContext, Arc<RecordingSink>) {
    let sink: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let ctx: CareerContext = CareerContext::new(
        RankTable::standard(),
        CareerConfig::default(),
        sink.clone(),
    );
    (ctx, sink)
}

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn create_test_pilot() -> AuthenticatedActor {
    AuthenticatedActor::new("pilot-1", "VAC101", Role::Pilot, true)
}

pub fn create_second_pilot() -> AuthenticatedActor {
    AuthenticatedActor::new("pilot-2", "VAC202", Role::Pilot, true)
}

pub fn create_unapproved_pilot() -> AuthenticatedActor {
    AuthenticatedActor::new("cadet-9", "VAC909", Role::Pilot, false)
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new("chief", "VAC001", Role::CareerAdmin, true)
}

pub fn rating_request(type_name: &str, family: &str, price: i64) -> TypeRatingRequest {
    TypeRatingRequest {
        type_name: type_name.to_string(),
        aircraft_family: family.to_string(),
        purchase_price: Money::units(price),
        base_rate: Money::units(150),
        multiplier: Decimal::new(12, 1),
        seats: 180,
        description: format!("{type_name} rating"),
        body_type: Some(String::from("Narrow-body")),
        rank_required: None,
        is_locked: false,
    }
}

pub fn leg_request(flight_number: &str, family: &str) -> FlightLegRequest {
    FlightLegRequest {
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

/// 2:30 block, 100 passengers, 500 kg cargo: grand total 510 at 150/h x1.2.
pub fn scenario_b_figures() -> PirepFigures {
    PirepFigures {
        flight_time_hours: 2,
        flight_time_minutes: 30,
        passengers: 100,
        cargo_kg: Decimal::from(500),
        fuel_used_kg: Decimal::from(2_400),
        flight_date: Some(NOW.date()),
        remarks: Some(String::from("Smooth ride")),
    }
}

/// One hour, no payload: grand total 153 at 150/h x1.2.
pub fn short_hop_figures() -> PirepFigures {
    PirepFigures {
        flight_time_hours: 1,
        ..PirepFigures::default()
    }
}

pub fn create_rating(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    request: TypeRatingRequest,
) -> TypeRatingId {
    let response = create_type_rating(
        persistence,
        ctx,
        &create_test_admin(),
        request,
        &create_test_cause(),
        NOW,
    )
    .unwrap();
    TypeRatingId::new(response.created_ids[0])
}

pub fn create_leg(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    flight_number: &str,
) -> LegId {
    let response = create_flight_leg(
        persistence,
        ctx,
        &create_test_admin(),
        leg_request(flight_number, "A320"),
        &create_test_cause(),
        NOW,
    )
    .unwrap();
    LegId::new(response.created_ids[0])
}

/// Creates a free A320 rating and one A320 leg.
pub fn seed_catalog(persistence: &mut Persistence, ctx: &CareerContext) -> (TypeRatingId, LegId) {
    let rating_id: TypeRatingId =
        create_rating(persistence, ctx, rating_request("A320", "A320", 0));
    let leg_id: LegId = create_leg(persistence, ctx, "WY101");
    (rating_id, leg_id)
}

/// Buys and activates a rating for the pilot.
pub fn equip(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    pilot: &AuthenticatedActor,
    rating_id: TypeRatingId,
) {
    purchase_type_rating(persistence, ctx, pilot, rating_id, &create_test_cause(), NOW).unwrap();
    activate_type_rating(persistence, ctx, pilot, rating_id, &create_test_cause(), NOW).unwrap();
}

/// Dispatches the leg to an equipped pilot and files the given figures.
pub fn fly_and_file(
    persistence: &mut Persistence,
    ctx: &CareerContext,
    pilot: &AuthenticatedActor,
    leg_id: LegId,
    figures: PirepFigures,
) -> PirepId {
    dispatch_leg(persistence, ctx, pilot, leg_id, &create_test_cause(), NOW).unwrap();
    let response = file_pirep(
        persistence,
        ctx,
        pilot,
        FilePirepRequest { leg_id, figures },
        &create_test_cause(),
        NOW,
    )
    .unwrap();
    response.pirep.unwrap().pirep_id.unwrap()
}
