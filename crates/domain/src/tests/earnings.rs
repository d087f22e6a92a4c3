// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Decimal, DomainError, EarningsBreakdown, FlightReportInputs, Money, PayRate,
    calculate_earnings,
};

fn rate(base: i64, multiplier_tenths: i64) -> PayRate {
    PayRate::new(Money::units(base), Decimal::new(multiplier_tenths, 1)).unwrap()
}

#[test]
fn test_reference_flight_breakdown() {
    let inputs: FlightReportInputs = FlightReportInputs {
        flight_time_hours: 2,
        flight_time_minutes: 30,
        passengers: 100,
        cargo_kg: Decimal::from(500),
        fuel_used_kg: Decimal::from(5_400),
    };

    let result: EarningsBreakdown = calculate_earnings(&rate(150, 12), &inputs).unwrap();

    assert_eq!(result.total_hours, Decimal::new(25, 1));
    assert_eq!(result.base_earnings, Money::units(375));
    assert_eq!(result.flight_earnings, Money::units(450));
    assert_eq!(result.payload_bonus, Money::units(150));
    assert_eq!(result.gross, Money::units(600));
    assert_eq!(result.deductions, Money::units(90));
    assert_eq!(result.grand_total, Money::units(510));
}

#[test]
fn test_missing_inputs_default_to_zero() {
    let result: EarningsBreakdown =
        calculate_earnings(&rate(150, 12), &FlightReportInputs::default()).unwrap();

    assert_eq!(result.gross, Money::ZERO);
    assert_eq!(result.grand_total, Money::ZERO);
}

#[test]
fn test_fuel_does_not_affect_pay() {
    let base: FlightReportInputs = FlightReportInputs {
        flight_time_hours: 1,
        ..FlightReportInputs::default()
    };
    let with_fuel: FlightReportInputs = FlightReportInputs {
        fuel_used_kg: Decimal::from(9_000),
        ..base
    };

    assert_eq!(
        calculate_earnings(&rate(100, 10), &base).unwrap(),
        calculate_earnings(&rate(100, 10), &with_fuel).unwrap()
    );
}

#[test]
fn test_outputs_round_to_cents_half_up() {
    // 20 minutes at 100/h: base 33.333..., deductions 5.0000...
    let inputs: FlightReportInputs = FlightReportInputs {
        flight_time_minutes: 20,
        ..FlightReportInputs::default()
    };

    let result: EarningsBreakdown = calculate_earnings(&rate(100, 10), &inputs).unwrap();

    assert_eq!(result.base_earnings, Money::from_cents(3_333));
    assert_eq!(result.gross, Money::from_cents(3_333));
    assert_eq!(result.deductions, Money::from_cents(500));
    assert_eq!(result.grand_total, Money::from_cents(2_833));
    assert_eq!(result.total_hours, Decimal::new(3_333, 4));
}

#[test]
fn test_grand_total_uses_unrounded_gross() {
    // gross = 0.1 * 7 = 0.7 cargo bonus; 0.7 * 0.85 = 0.595 -> 0.60
    let inputs: FlightReportInputs = FlightReportInputs {
        cargo_kg: Decimal::from(7),
        ..FlightReportInputs::default()
    };

    let result: EarningsBreakdown = calculate_earnings(&rate(0, 10), &inputs).unwrap();

    assert_eq!(result.payload_bonus, Money::from_cents(70));
    assert_eq!(result.deductions, Money::from_cents(11));
    assert_eq!(result.grand_total, Money::from_cents(60));
}

#[test]
fn test_gross_formula_holds_for_assorted_inputs() {
    let cases: [(i64, i64, i64, i64, i64, i64); 4] = [
        (150, 12, 1, 45, 80, 1_200),
        (90, 10, 0, 54, 0, 0),
        (210, 15, 7, 6, 300, 15_000),
        (0, 10, 3, 0, 12, 33),
    ];

    for (base, mult, hours, minutes, pax, cargo) in cases {
        let inputs: FlightReportInputs = FlightReportInputs {
            flight_time_hours: hours,
            flight_time_minutes: minutes,
            passengers: pax,
            cargo_kg: Decimal::from(cargo),
            fuel_used_kg: Decimal::ZERO,
        };
        let result: EarningsBreakdown = calculate_earnings(&rate(base, mult), &inputs).unwrap();

        let total_hours: Decimal =
            Decimal::from(hours) + Decimal::from(minutes) / Decimal::from(60);
        let gross: Decimal = Decimal::from(base) * total_hours * Decimal::new(mult, 1)
            + Decimal::from(pax)
            + Decimal::from(cargo) * Decimal::new(1, 1);
        assert_eq!(result.gross, Money::from_decimal(gross));
        assert_eq!(
            result.grand_total,
            Money::from_decimal(gross - gross * Decimal::new(15, 2))
        );
    }
}

#[test]
fn test_negative_inputs_are_rejected() {
    let negative_cases: [FlightReportInputs; 4] = [
        FlightReportInputs {
            flight_time_hours: -1,
            ..FlightReportInputs::default()
        },
        FlightReportInputs {
            flight_time_minutes: -5,
            ..FlightReportInputs::default()
        },
        FlightReportInputs {
            passengers: -10,
            ..FlightReportInputs::default()
        },
        FlightReportInputs {
            cargo_kg: Decimal::from(-1),
            ..FlightReportInputs::default()
        },
    ];

    for inputs in negative_cases {
        let result = calculate_earnings(&rate(150, 12), &inputs);
        assert!(
            matches!(result, Err(DomainError::InvalidInput { .. })),
            "expected InvalidInput for {inputs:?}"
        );
    }
}

#[test]
fn test_block_time_beyond_minute_range_is_rejected() {
    let inputs: FlightReportInputs = FlightReportInputs {
        flight_time_hours: i64::MAX / 2,
        ..FlightReportInputs::default()
    };

    assert!(matches!(
        inputs.validate(),
        Err(DomainError::InvalidInput { ref field, .. }) if field == "flight_time_hours"
    ));
    assert!(calculate_earnings(&rate(150, 12), &inputs).is_err());
}

#[test]
fn test_negative_rate_is_rejected() {
    assert!(PayRate::new(Money::units(-1), Decimal::ONE).is_err());
    assert!(PayRate::new(Money::units(1), Decimal::from(-1)).is_err());

    let forged: PayRate = PayRate {
        base_rate: Money::units(-150),
        multiplier: Decimal::ONE,
    };
    assert!(calculate_earnings(&forged, &FlightReportInputs::default()).is_err());
}

#[test]
fn test_calculation_is_deterministic() {
    let inputs: FlightReportInputs = FlightReportInputs {
        flight_time_hours: 3,
        flight_time_minutes: 17,
        passengers: 143,
        cargo_kg: Decimal::new(12_345, 1),
        fuel_used_kg: Decimal::ZERO,
    };
    let first: EarningsBreakdown = calculate_earnings(&rate(175, 13), &inputs).unwrap();
    let second: EarningsBreakdown = calculate_earnings(&rate(175, 13), &inputs).unwrap();
    assert_eq!(first, second);
}
