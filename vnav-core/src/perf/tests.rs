use math::{Altitude, Force, FuelFlow, Mass, Speed};
use store::FlapSetting;

use super::{ParametricPerformance, Performance, ThrustSetting};
use crate::state::Configuration;

fn performance() -> ParametricPerformance { ParametricPerformance::new(store::sample::aircraft()) }

#[test]
fn takeoff_thrust_at_sea_level_standstill() {
    let engine = performance().thrust_and_fuel_flow(ThrustSetting::Takeoff, 0., 1., 1.);
    engine.thrust.assert_approx(Force::from_pounds_force(54000.), Force::from_pounds_force(1e-6)).unwrap();
}

#[test]
fn thrust_lapses_with_altitude() {
    let perf = performance();
    let low = perf.thrust_and_fuel_flow(ThrustSetting::Climb, 0.5, 1., 1.);
    let high = perf.thrust_and_fuel_flow(ThrustSetting::Climb, 0.5, 0.3, 0.8);
    assert!(high.thrust < low.thrust);
    assert!(high.fuel_flow < low.fuel_flow);
}

#[test]
fn ratings_are_ordered() {
    let perf = performance();
    let thrust = |setting| perf.thrust_and_fuel_flow(setting, 0.4, 0.7, 0.9).thrust;
    assert!(thrust(ThrustSetting::Takeoff) > thrust(ThrustSetting::Climb));
    assert!(thrust(ThrustSetting::Climb) > thrust(ThrustSetting::Idle));
}

#[test]
fn fuel_flow_is_floored_at_idle() {
    let perf = performance();
    perf.fuel_flow_for_thrust(Force::ZERO, 0.3, 1., 1.)
        .assert_approx(FuelFlow::from_pounds_per_hour(1000.), FuelFlow::from_pounds_per_hour(1e-6))
        .unwrap();
    perf.fuel_flow_for_thrust(Force::ZERO, 0.3, 0.5, 0.9)
        .assert_approx(FuelFlow::from_pounds_per_hour(500.), FuelFlow::from_pounds_per_hour(1e-6))
        .unwrap();
}

#[test]
fn no_drag_without_airspeed() {
    let drag = performance().drag(Mass::from_pounds(150_000.), 0., 1., Configuration::CLEAN);
    assert_eq!(drag, Force::ZERO);
}

#[test]
fn configuration_adds_drag() {
    let perf = performance();
    let weight = Mass::from_pounds(140_000.);
    let drag = |config| perf.drag(weight, 0.3, 0.8, config);

    let clean = drag(Configuration::CLEAN);
    let flaps = drag(Configuration::CLEAN.with_flaps(FlapSetting::Conf2));
    let gear = drag(Configuration::CLEAN.with_flaps(FlapSetting::Conf2).with_gear_down(true));
    let brakes = drag(Configuration::CLEAN.with_speedbrakes(true));
    assert!(flaps > clean);
    assert!(gear > flaps);
    assert!(brakes > clean);
}

#[test]
fn compressibility_drag_above_critical_mach() {
    let perf = performance();
    let weight = Mass::from_pounds(140_000.);
    let coefficient = |mach: f64| {
        perf.drag(weight, mach, 0.25, Configuration::CLEAN).into_pounds_force() / (mach * mach)
    };
    // induced drag alone decreases the ratio with Mach
    assert!(coefficient(0.74) < coefficient(0.7));
    assert!(coefficient(0.95) > coefficient(0.74));
}

#[test]
fn crossover_of_managed_climb_speeds() {
    let altitude = performance().crossover_altitude(Speed::from_knots(300.), 0.78);
    assert!(altitude > Altitude::from_feet(28000.), "{altitude:?}");
    assert!(altitude < Altitude::from_feet(31000.), "{altitude:?}");
}
