use math::{Altitude, Angle, Length, Mass, Speed};

use super::{EndConditions, integrate};
use crate::Status;
use crate::perf::ThrustSetting;
use crate::propagate::{ControlLaw, PitchTarget, PropagatorOptions};
use crate::state::{AircraftState, Configuration};
use crate::test_util::Fixture;
use crate::wind::WindSelector;

fn start(fixture: &Fixture) -> AircraftState {
    AircraftState::from_cas(
        &fixture.ctx().atmosphere,
        Length::from_nm(20.),
        Altitude::from_feet(5000.),
        Speed::from_knots(250.),
        Mass::from_pounds(150_000.),
        Configuration::CLEAN,
    )
}

fn options(step_nm: f64) -> PropagatorOptions {
    PropagatorOptions::new(Length::from_nm(step_nm), WindSelector::Climb)
}

const CLIMB: ControlLaw = ControlLaw::ConstantThrust(ThrustSetting::Climb);
const LEVEL: ControlLaw = ControlLaw::ConstantPitch(PitchTarget::FlightPathAngle(Angle::ZERO));

#[test]
fn terminal_state_lies_on_altitude_bound() {
    let fixture = Fixture::calm();
    let result = integrate(
        &fixture.ctx(),
        start(&fixture),
        CLIMB,
        &options(0.1),
        &EndConditions::new().altitude_max(Altitude::from_feet(8000.)),
    );

    assert_eq!(result.status, Status::Converged);
    result.last().altitude.assert_approx(Altitude::from_feet(8000.), Length::from_feet(1e-6)).unwrap();
    for pair in result.states.windows(2) {
        assert!(pair[1].distance >= pair[0].distance);
        assert!(pair[1].altitude >= pair[0].altitude);
    }
}

#[test]
fn terminal_state_lies_on_distance_bound() {
    let fixture = Fixture::calm();
    let result = integrate(
        &fixture.ctx(),
        start(&fixture),
        LEVEL,
        &options(0.3),
        &EndConditions::new().distance_max(Length::from_nm(21.)),
    );

    result.last().distance.assert_approx(Length::from_nm(21.), Length::from_feet(1e-6)).unwrap();
    assert_eq!(result.advanced_states().len(), 4);
}

#[test]
fn earliest_bound_terminates() {
    let fixture = Fixture::calm();
    let result = integrate(
        &fixture.ctx(),
        start(&fixture),
        CLIMB,
        &options(0.1),
        &EndConditions::new()
            .altitude_max(Altitude::from_feet(30000.))
            .distance_max(Length::from_nm(21.)),
    );

    result.last().distance.assert_approx(Length::from_nm(21.), Length::from_feet(1e-6)).unwrap();
    assert!(result.last().altitude < Altitude::from_feet(30000.));
}

#[test]
fn backward_integration_stops_at_minimum_distance() {
    let fixture = Fixture::calm();
    let result = integrate(
        &fixture.ctx(),
        start(&fixture),
        ControlLaw::ConstantThrust(ThrustSetting::Idle),
        &options(-0.1),
        &EndConditions::new().distance_min(Length::from_nm(18.55)),
    );

    result.last().distance.assert_approx(Length::from_nm(18.55), Length::from_feet(1e-6)).unwrap();
    for pair in result.states.windows(2) {
        assert!(pair[1].distance <= pair[0].distance);
    }
    assert!(result.last().altitude > Altitude::from_feet(5000.));
}

#[test]
fn satisfied_start_does_not_advance() {
    let fixture = Fixture::calm();
    let result = integrate(
        &fixture.ctx(),
        start(&fixture),
        CLIMB,
        &options(0.1),
        &EndConditions::new().altitude_max(Altitude::from_feet(4000.)),
    );

    assert_eq!(result.status, Status::Converged);
    assert!(!result.advanced());
    assert_eq!(result.states, vec![start(&fixture)]);
}

#[test]
fn unreachable_bound_stops_at_iteration_cap() {
    let fixture = Fixture::calm();
    let result = integrate(
        &fixture.ctx(),
        start(&fixture),
        LEVEL,
        &options(0.1),
        &EndConditions::new().altitude_max(Altitude::from_feet(20000.)),
    );

    assert_eq!(result.status, Status::IterationCapReached);
    assert_eq!(result.states.len(), 1001);
    result
        .last()
        .distance
        .assert_approx(Length::from_nm(120.), Length::from_nm(1e-9))
        .unwrap();
}

#[test]
fn iteration_cap_follows_tuning() {
    let fixture = Fixture::calm().with_tuning(|tuning| tuning.integrator_max_steps = 7);
    let result = integrate(
        &fixture.ctx(),
        start(&fixture),
        LEVEL,
        &options(0.1),
        &EndConditions::new().altitude_max(Altitude::from_feet(20000.)),
    );

    assert_eq!(result.status, Status::IterationCapReached);
    assert_eq!(result.states.len(), 8);
}

#[test]
fn end_condition_checks() {
    let fixture = Fixture::calm();
    let state = start(&fixture);
    assert!(EndConditions::new().cas_max(Speed::from_knots(250.)).is_satisfied(&state));
    assert!(EndConditions::new().cas_min(Speed::from_knots(260.)).is_satisfied(&state));
    assert!(!EndConditions::new().cas_max(Speed::from_knots(260.)).is_satisfied(&state));
    assert!(!EndConditions::new().distance_min_opt(None).is_satisfied(&state));
    assert!(!EndConditions::new().is_satisfied(&state));
    assert!(
        EndConditions::new().weight_max(Mass::from_pounds(200_000.)).mach_max(0.1).is_satisfied(&state)
    );
}
