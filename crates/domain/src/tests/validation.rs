// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Decimal, DomainError, FlightLegSpec, Money, TypeRatingSpec, require_override_reason,
    require_text, validate_airport_code,
};

#[test]
fn test_require_text_trims_and_rejects_blank() {
    assert_eq!(require_text("name", "  A320 ").unwrap(), "A320");
    assert!(matches!(
        require_text("name", "   "),
        Err(DomainError::InvalidInput { .. })
    ));
}

#[test]
fn test_airport_codes_are_normalized() {
    assert_eq!(validate_airport_code("origin", "ooms").unwrap(), "OOMS");
    assert_eq!(validate_airport_code("origin", "mct").unwrap(), "MCT");
    assert!(validate_airport_code("origin", "MUSCAT").is_err());
    assert!(validate_airport_code("origin", "O-M").is_err());
}

#[test]
fn test_override_reason_must_be_present() {
    assert!(matches!(
        require_override_reason("delete", None),
        Err(DomainError::OverrideReasonRequired { .. })
    ));
    assert!(require_override_reason("delete", Some("  ")).is_err());
    assert_eq!(
        require_override_reason("delete", Some(" duplicate ")).unwrap(),
        "duplicate"
    );
}

#[test]
fn test_leg_spec_validation() {
    let spec: FlightLegSpec = FlightLegSpec {
        flight_number: String::from("wy101"),
        origin: String::from("ooms"),
        destination: String::from("omdb"),
        aircraft_type: String::from("a320"),
        aircraft_family: String::from("A320 Family"),
        distance_nm: 185,
        estimated_minutes: 70,
        locked: false,
    };

    let validated: FlightLegSpec = spec.clone().validated().unwrap();
    assert_eq!(validated.flight_number, "WY101");
    assert_eq!(validated.origin, "OOMS");
    assert_eq!(validated.aircraft_type, "A320");

    let negative: FlightLegSpec = FlightLegSpec {
        distance_nm: -1,
        ..spec
    };
    assert!(negative.validated().is_err());
}

#[test]
fn test_type_rating_spec_validation() {
    let spec: TypeRatingSpec = TypeRatingSpec {
        type_name: String::from(" b738 "),
        aircraft_family: String::from("B737 Family"),
        purchase_price: Money::units(20_000),
        base_rate: Money::units(140),
        multiplier: Decimal::new(11, 1),
        seats: 162,
        description: String::new(),
        body_type: crate::BodyType::NarrowBody,
        rank_required: Some(String::from("  ")),
        is_locked: false,
    };

    let validated: TypeRatingSpec = spec.clone().validated().unwrap();
    assert_eq!(validated.type_name, "B738");
    assert_eq!(validated.rank_required, None);

    let negative_price: TypeRatingSpec = TypeRatingSpec {
        purchase_price: Money::units(-5),
        ..spec.clone()
    };
    assert!(negative_price.validated().is_err());

    let blank_family: TypeRatingSpec = TypeRatingSpec {
        aircraft_family: String::new(),
        ..spec
    };
    assert!(blank_family.validated().is_err());
}
