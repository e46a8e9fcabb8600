//! Numeric propagators advancing the aircraft state by one step.
//!
//! Each propagator is a pure function of the state, the step and the control law.
//! Steps are measured in distance along track;
//! a negative step integrates backward, e.g. from the runway toward the top of descent.

use math::{
    AccelFactorMode, Accel, Altitude, Angle, Force, Length, Speed, EARTH_SURFACE_GRAVITY,
};

use crate::context::Context;
use crate::perf::{Performance, ThrustSetting};
use crate::state::AircraftState;
use crate::wind::WindSelector;

#[cfg(test)]
mod tests;

/// Ground speed is floored at this value to keep step durations finite.
pub const MIN_GROUND_SPEED: Speed = Speed::from_knots(10.);

/// Fraction of the available gradient spent on climbing while accelerating.
///
/// The climbing share is divided by the acceleration factor
/// like the whole gradient of a constant thrust climb.
const ACCELERATION_CLIMB_SHARE: f64 = 0.3;

/// Minimum acceleration enforced by [`ControlLaw::SpeedChange`] when accelerating.
const MIN_ACCELERATION: Accel = Accel::from_knots_per_sec(0.5);

/// Minimum deceleration enforced by [`ControlLaw::SpeedChange`] when decelerating.
const MIN_DECELERATION: Accel = Accel::from_knots_per_sec(0.3);

/// A target defining the flight path angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PitchTarget {
    VerticalSpeed(Speed),
    FlightPathAngle(Angle),
}

impl PitchTarget {
    #[must_use]
    pub fn path_angle(self, tas: Speed) -> Angle {
        match self {
            Self::VerticalSpeed(vertical_speed) => {
                Angle::from_radians((vertical_speed / tas).atan())
            }
            Self::FlightPathAngle(angle) => angle,
        }
    }
}

/// How thrust and path angle are controlled during a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlLaw {
    /// Fixed thrust rating; the path angle follows from the excess thrust.
    ConstantThrust(ThrustSetting),
    /// Fixed path angle; the thrust is solved to hold the speed.
    ConstantPitch(PitchTarget),
    /// Fixed thrust rating; the excess thrust is shared between climb and acceleration.
    Acceleration(ThrustSetting),
    /// Requested path angle at a thrust rating,
    /// adjusted to guarantee a minimum rate of speed change.
    SpeedChange { pitch: PitchTarget, thrust: ThrustSetting, accelerating: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct PropagatorOptions {
    /// Signed distance advanced by each step.
    pub step:      Length,
    pub wind:      WindSelector,
    /// Hold Mach instead of CAS when the law does not change speed explicitly.
    pub mach_mode: bool,
}

impl PropagatorOptions {
    #[must_use]
    pub fn new(step: Length, wind: WindSelector) -> Self { Self { step, wind, mach_mode: false } }

    #[must_use]
    pub fn with_mach_mode(self, mach_mode: bool) -> Self { Self { mach_mode, ..self } }

    #[must_use]
    pub fn with_step(self, step: Length) -> Self { Self { step, ..self } }
}

/// Ground speed at a position for the given true airspeed.
#[must_use]
pub fn ground_speed(
    ctx: &Context,
    wind: WindSelector,
    distance: Length,
    altitude: Altitude,
    tas: Speed,
) -> Speed {
    (tas - ctx.winds.headwind(wind, distance, altitude)).max(MIN_GROUND_SPEED)
}

/// The flight path angle of the straight line between two states, in the direction of flight.
#[must_use]
pub fn path_angle_between(from: &AircraftState, to: &AircraftState) -> Angle {
    let run = to.distance - from.distance;
    if run.abs() < Length::from_feet(1e-6) {
        return Angle::ZERO;
    }
    Angle::from_radians(((to.altitude - from.altitude) / run).atan())
}

/// Advances `state` by one step under `law`.
#[must_use]
pub fn propagate(
    ctx: &Context,
    state: &AircraftState,
    law: ControlLaw,
    options: &PropagatorOptions,
) -> AircraftState {
    let atmosphere = &ctx.atmosphere;
    let performance = ctx.performance;
    let delta = atmosphere.delta(state.altitude);
    let theta = atmosphere.theta(state.altitude);
    let drag = performance.drag(state.weight, state.mach, delta, state.config);
    let accel_factor = atmosphere.acceleration_factor(
        state.mach,
        state.altitude,
        if options.mach_mode { AccelFactorMode::ConstantMach } else { AccelFactorMode::ConstantCas },
    );

    let (path_angle, fuel_flow, accel) = match law {
        ControlLaw::ConstantThrust(setting) => {
            let engine = performance.thrust_and_fuel_flow(setting, state.mach, delta, theta);
            let gradient = (engine.thrust - drag).gradient_over(state.weight);
            (Angle::asin_clamped(gradient / accel_factor), engine.fuel_flow, None)
        }
        ControlLaw::ConstantPitch(pitch) => {
            let angle = pitch.path_angle(state.tas);
            let idle = performance.thrust_and_fuel_flow(ThrustSetting::Idle, state.mach, delta, theta);
            let required = Force::from_pounds_force(
                state.weight.into_pounds() * accel_factor * angle.sin(),
            ) + drag;
            let thrust = required.max(idle.thrust);
            (angle, performance.fuel_flow_for_thrust(thrust, state.mach, delta, theta), None)
        }
        ControlLaw::Acceleration(setting) => {
            let engine = performance.thrust_and_fuel_flow(setting, state.mach, delta, theta);
            let gradient = (engine.thrust - drag).gradient_over(state.weight);
            let sin_angle = gradient * ACCELERATION_CLIMB_SHARE / accel_factor;
            let accel = EARTH_SURFACE_GRAVITY * (gradient - sin_angle * accel_factor);
            (Angle::asin_clamped(sin_angle), engine.fuel_flow, Some(accel))
        }
        ControlLaw::SpeedChange { pitch, thrust, accelerating } => {
            let engine = performance.thrust_and_fuel_flow(thrust, state.mach, delta, theta);
            let gradient = (engine.thrust - drag).gradient_over(state.weight);
            let requested = pitch.path_angle(state.tas).sin();
            let sin_angle = if accelerating {
                requested.min(gradient - MIN_ACCELERATION / EARTH_SURFACE_GRAVITY)
            } else {
                requested.max(gradient + MIN_DECELERATION / EARTH_SURFACE_GRAVITY)
            };
            let accel = EARTH_SURFACE_GRAVITY * (gradient - sin_angle);
            (Angle::asin_clamped(sin_angle), engine.fuel_flow, Some(accel))
        }
    };

    let dt = options.step / ground_speed(ctx, options.wind, state.distance, state.altitude, state.tas);
    let altitude = state.altitude + state.tas * dt * path_angle.sin();

    let (cas, mach) = if let Some(accel) = accel {
        let cas = state.cas + accel * dt;
        (cas, atmosphere.cas_to_mach(cas, altitude))
    } else if options.mach_mode {
        (atmosphere.mach_to_cas(state.mach, altitude), state.mach)
    } else {
        (state.cas, atmosphere.cas_to_mach(state.cas, altitude))
    };
    let tas = atmosphere.mach_to_tas(mach, altitude);
    let distance = state.distance + options.step;

    AircraftState {
        distance,
        altitude,
        time: state.time + dt,
        cas,
        tas,
        mach,
        ground_speed: ground_speed(ctx, options.wind, distance, altitude, tas),
        weight: state.weight - fuel_flow * dt,
        config: state.config,
        speed_target: state.speed_target,
        reason: None,
    }
}
