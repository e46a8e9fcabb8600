use enum_map::EnumMap;
use math::{Altitude, Angle, Length, Mass, Speed};
use store::WindLevel;

use super::{
    ControlLaw, MIN_GROUND_SPEED, PitchTarget, PropagatorOptions, ground_speed, path_angle_between,
    propagate,
};
use crate::perf::ThrustSetting;
use crate::state::{AircraftState, Configuration};
use crate::test_util::Fixture;
use crate::wind::{HeadwindProfile, HeadwindRepository, TabulatedHeadwind, WindSelector};

fn state(fixture: &Fixture, feet: f64, knots: f64) -> AircraftState {
    AircraftState::from_cas(
        &fixture.ctx().atmosphere,
        Length::from_nm(10.),
        Altitude::from_feet(feet),
        Speed::from_knots(knots),
        Mass::from_pounds(150_000.),
        Configuration::CLEAN,
    )
}

fn forward() -> PropagatorOptions { PropagatorOptions::new(Length::from_nm(0.1), WindSelector::Climb) }

fn backward() -> PropagatorOptions {
    PropagatorOptions::new(Length::from_nm(-0.1), WindSelector::Descent)
}

#[test]
fn single_step_is_idempotent() {
    let fixture = Fixture::windy();
    let ctx = fixture.ctx();
    let start = state(&fixture, 10000., 250.);
    let law = ControlLaw::Acceleration(ThrustSetting::Climb);
    assert_eq!(propagate(&ctx, &start, law, &forward()), propagate(&ctx, &start, law, &forward()));
}

#[test]
fn climb_thrust_climbs_at_constant_cas() {
    let fixture = Fixture::calm();
    let ctx = fixture.ctx();
    let start = state(&fixture, 10000., 250.);
    let next = propagate(&ctx, &start, ControlLaw::ConstantThrust(ThrustSetting::Climb), &forward());

    next.distance.assert_approx(Length::from_nm(10.1), Length::from_nm(1e-12)).unwrap();
    assert!(next.altitude > start.altitude);
    assert!(next.time > start.time);
    assert!(next.weight < start.weight);
    next.cas.assert_approx(start.cas, Speed::from_knots(1e-9)).unwrap();
    assert!(next.mach > start.mach);
}

#[test]
fn mach_mode_holds_mach() {
    let fixture = Fixture::calm();
    let ctx = fixture.ctx();
    let start = state(&fixture, 30000., 280.);
    let next = propagate(
        &ctx,
        &start,
        ControlLaw::ConstantThrust(ThrustSetting::Climb),
        &forward().with_mach_mode(true),
    );

    assert!(next.altitude > start.altitude);
    math::assert_approx_f64(next.mach, start.mach, 1e-12).unwrap();
    assert!(next.cas < start.cas);
}

#[test]
fn level_flight_holds_altitude() {
    let fixture = Fixture::calm();
    let ctx = fixture.ctx();
    let start = state(&fixture, 35000., 270.);
    let next = propagate(
        &ctx,
        &start,
        ControlLaw::ConstantPitch(PitchTarget::FlightPathAngle(Angle::ZERO)),
        &forward(),
    );

    assert_eq!(next.altitude, start.altitude);
    assert_eq!(next.cas, start.cas);
    assert!(next.weight < start.weight);
}

#[test]
fn vertical_speed_target_sets_path_angle() {
    let tas = Speed::from_knots(300.);
    let angle = PitchTarget::VerticalSpeed(Speed::from_fpm(1000.)).path_angle(tas);
    math::assert_approx_f64(angle.tan(), Speed::from_fpm(1000.) / tas, 1e-12).unwrap();
}

#[test]
fn idle_backward_step_gains_altitude() {
    let fixture = Fixture::calm();
    let ctx = fixture.ctx();
    let start = state(&fixture, 20000., 290.);
    let prev = propagate(&ctx, &start, ControlLaw::ConstantThrust(ThrustSetting::Idle), &backward());

    prev.distance.assert_approx(Length::from_nm(9.9), Length::from_nm(1e-12)).unwrap();
    assert!(prev.altitude > start.altitude);
    assert!(prev.time < start.time);
    assert!(prev.weight > start.weight);
    assert!(path_angle_between(&prev, &start) < Angle::ZERO);
}

#[test]
fn speed_change_guarantees_acceleration() {
    let fixture = Fixture::calm();
    let ctx = fixture.ctx();
    let start = state(&fixture, 10000., 250.);
    let law = ControlLaw::SpeedChange {
        pitch:        PitchTarget::FlightPathAngle(Angle::from_degrees(30.)),
        thrust:       ThrustSetting::Climb,
        accelerating: true,
    };
    let next = propagate(&ctx, &start, law, &forward());

    let dt = next.time - start.time;
    let min_gain = Speed::from_knots(0.5 * dt.into_seconds());
    assert!(next.cas - start.cas >= min_gain - Speed::from_knots(1e-9));
}

#[test]
fn speed_change_guarantees_deceleration() {
    let fixture = Fixture::calm();
    let ctx = fixture.ctx();
    let start = state(&fixture, 10000., 300.);
    let law = ControlLaw::SpeedChange {
        pitch:        PitchTarget::FlightPathAngle(Angle::ZERO),
        thrust:       ThrustSetting::Idle,
        accelerating: false,
    };
    let next = propagate(&ctx, &start, law, &forward());

    let dt = next.time - start.time;
    let min_loss = Speed::from_knots(0.3 * dt.into_seconds());
    assert!(start.cas - next.cas >= min_loss - Speed::from_knots(1e-9));
}

#[test]
fn ground_speed_is_floored() {
    let strong = || {
        Box::new(TabulatedHeadwind::new(vec![WindLevel {
            altitude: Altitude::SEA_LEVEL,
            headwind: Speed::from_knots(1000.),
        }])) as Box<dyn HeadwindProfile + Send + Sync>
    };
    let fixture = Fixture { winds: HeadwindRepository::new(EnumMap::from_fn(|_| strong())), ..Fixture::calm() };
    let ctx = fixture.ctx();

    let speed = ground_speed(
        &ctx,
        WindSelector::Cruise,
        Length::ZERO,
        Altitude::from_feet(35000.),
        Speed::from_knots(450.),
    );
    assert_eq!(speed, MIN_GROUND_SPEED);

    let start = state(&fixture, 35000., 270.);
    let next = propagate(
        &ctx,
        &start,
        ControlLaw::ConstantPitch(PitchTarget::FlightPathAngle(Angle::ZERO)),
        &forward(),
    );
    assert!((next.time - start.time).into_seconds().is_finite());
    math::assert_approx_f64((next.time - start.time).into_seconds(), 36., 1e-9).unwrap();
}

#[test]
fn tailwind_shortens_steps() {
    let calm = Fixture::calm();
    let tail = || {
        Box::new(TabulatedHeadwind::new(vec![WindLevel {
            altitude: Altitude::SEA_LEVEL,
            headwind: Speed::from_knots(-50.),
        }])) as Box<dyn HeadwindProfile + Send + Sync>
    };
    let windy = Fixture { winds: HeadwindRepository::new(EnumMap::from_fn(|_| tail())), ..Fixture::calm() };
    let law = ControlLaw::ConstantPitch(PitchTarget::FlightPathAngle(Angle::ZERO));

    let start = state(&calm, 20000., 280.);
    let calm_step = propagate(&calm.ctx(), &start, law, &forward());
    let windy_step = propagate(&windy.ctx(), &start, law, &forward());
    assert!(windy_step.time < calm_step.time);
}

#[test]
fn acceleration_climb_share_follows_acceleration_factor() {
    let fixture = Fixture::calm();
    let ctx = fixture.ctx();
    let start = state(&fixture, 20000., 300.);
    let accel_factor = ctx.atmosphere.acceleration_factor(
        start.mach,
        start.altitude,
        math::AccelFactorMode::ConstantCas,
    );
    assert!(accel_factor > 1.01, "{accel_factor}");

    let climbing = propagate(&ctx, &start, ControlLaw::ConstantThrust(ThrustSetting::Climb), &forward());
    let accelerating = propagate(&ctx, &start, ControlLaw::Acceleration(ThrustSetting::Climb), &forward());
    let gain = |next: &AircraftState| (next.altitude - start.altitude).into_feet();
    assert!(gain(&climbing) > 0.);
    math::assert_approx_f64(gain(&accelerating) / gain(&climbing), 0.3, 1e-9).unwrap();
    assert!(accelerating.cas > start.cas);
}
