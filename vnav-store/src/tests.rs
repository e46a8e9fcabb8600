use math::{Altitude, Length, Mass};

use crate::{AltitudeConstraint, FlightPhase, Scenario, ValidationError, sample};

fn round_trip(scenario: &Scenario) -> Scenario {
    let json = serde_json::to_string(scenario).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn sample_is_valid() { sample::scenario().validate().unwrap(); }

#[test]
fn sample_survives_json() {
    let scenario = round_trip(&sample::scenario());
    scenario.validate().unwrap();

    assert_eq!(scenario.route.waypoints.len(), 10);
    scenario
        .parameters
        .cruise_altitude
        .assert_approx(Altitude::from_feet(35000.), Length::from_feet(1e-6))
        .unwrap();
    assert_eq!(
        scenario.route.waypoints[7].altitude_constraint,
        Some(AltitudeConstraint::Range {
            low:  Altitude::from_feet(5000.),
            high: Altitude::from_feet(9000.),
        }),
    );
}

#[test]
fn omitted_tuning_uses_defaults() {
    let mut value = serde_json::to_value(sample::scenario()).unwrap();
    let object = value.as_object_mut().unwrap();
    object.remove("tuning");
    object.remove("winds");
    object.remove("meta");

    let scenario: Scenario = serde_json::from_value(value).unwrap();
    assert_eq!(scenario.tuning.integrator_max_steps, 1000);
    assert_eq!(scenario.tuning.reconcile_max_iterations, 4);
    assert_eq!(scenario.tuning.geometric_max_depth, 10);
    assert!(scenario.winds.cruise.is_empty());
}

#[test]
fn partial_tuning_keeps_other_defaults() {
    let mut value = serde_json::to_value(sample::scenario()).unwrap();
    value["tuning"] = serde_json::json!({ "integrator_max_steps": 50 });

    let scenario: Scenario = serde_json::from_value(value).unwrap();
    assert_eq!(scenario.tuning.integrator_max_steps, 50);
    scenario.tuning.step_size.assert_approx(Length::from_nm(0.1), Length::from_nm(1e-9)).unwrap();
}

#[test]
fn inverted_range_is_reported() {
    let mut scenario = sample::scenario();
    scenario.route.waypoints[7].altitude_constraint = Some(AltitudeConstraint::Range {
        low:  Altitude::from_feet(9000.),
        high: Altitude::from_feet(5000.),
    });

    let errors = scenario.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], ValidationError::InvertedRange { ident, .. } if ident == "ARR02"));
}

#[test]
fn all_errors_are_collected() {
    let mut scenario = sample::scenario();
    scenario.route.waypoints.truncate(1);
    scenario.parameters.zero_fuel_weight = Mass::ZERO;
    scenario.parameters.flight_phase = FlightPhase::Cruise;

    let errors = scenario.validate().unwrap_err();
    assert_eq!(
        errors,
        [
            ValidationError::RouteTooShort(1),
            ValidationError::NonPositiveWeight,
            ValidationError::MissingPresentPosition(FlightPhase::Cruise),
        ],
    );
}

#[test]
fn active_leg_must_exist() {
    let mut scenario = sample::scenario();
    scenario.route.active_leg_index = 10;

    let errors = scenario.validate().unwrap_err();
    assert_eq!(errors, [ValidationError::ActiveLegOutOfRange { index: 10, len: 10 }]);
}
