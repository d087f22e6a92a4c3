// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BodyType, Decimal, FlightLeg, FlightLegSpec, LegId, Money, PilotId, PilotProfile, RankTable,
    TypeRating, TypeRatingId, TypeRatingSpec,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub const NOW: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

pub fn create_test_profile(pilot: &str) -> PilotProfile {
    PilotProfile::new(
        PilotId::new(pilot),
        &format!("WY{pilot}"),
        true,
        &RankTable::standard(),
        NOW,
    )
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

pub fn create_test_leg(id: i64, family: &str) -> FlightLeg {
    let mut leg: FlightLeg = FlightLeg::new(FlightLegSpec {
        flight_number: String::from("WY101"),
        origin: String::from("OOMS"),
        destination: String::from("OMDB"),
        aircraft_type: String::from("A320"),
        aircraft_family: family.to_string(),
        distance_nm: 185,
        estimated_minutes: 70,
        locked: false,
    });
    leg.leg_id = Some(LegId::new(id));
    leg.version = 1;
    leg
}
