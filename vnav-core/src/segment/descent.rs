use math::{Altitude, Angle, Length, Speed};
use store::FlightPhase;

use super::{Node, Plan, Segment, last_state, options, speed_chain, walk};
use crate::builder::{BuildDirection, ProfileBuilder};
use crate::constraints::{AltitudeConstraintExt, AltitudeRestriction};
use crate::context::Context;
use crate::integrate::{EndConditions, integrate};
use crate::interpolate;
use crate::perf::ThrustSetting;
use crate::propagate::{ControlLaw, PitchTarget, path_angle_between, propagate};
use crate::pseudo::{McduPseudoWaypoint, NdPseudoWaypoint};
use crate::state::{AircraftState, Phase, SpeedTarget};

/// A path angle shallower than requested by more than this is not flyable.
const PATH_ANGLE_TOLERANCE_DEGREES: f64 = 0.1;

/// Longest distance of a single geometric deceleration.
const MAX_DECELERATION_DISTANCE: Length = Length::from_nm(20.);

/// Highest altitude gained by a single geometric deceleration, built backward.
const MAX_DECELERATION_ALTITUDE_GAIN: Length = Length::from_feet(6000.);

/// Vertical speed of a deceleration on the idle path.
const IDLE_DECELERATION_RATE: Speed = Speed::from_fpm(-500.);

/// The managed descent from the deceleration point back to the top of descent.
///
/// Built backward from the last checkpoint.
/// Below the geometric path point, the path is geometric and meets every altitude constraint;
/// above it, the path is flown at idle thrust.
#[derive(Debug, Clone)]
pub struct ManagedDescent;

impl Node for ManagedDescent {
    fn label(&self) -> &'static str { "managed descent" }

    fn should_compute(&self, ctx: &Context) -> bool {
        ctx.params.flight_phase <= FlightPhase::Descent
    }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        builder.switch_phase(Phase::Descent);
        let Some(decel) = last_state(builder, self.label()) else { return Vec::new() };

        let gpp = geometric_path_point(ctx, builder.direction(), decel);
        let params = ctx.params;
        let managed = params.managed_descent_speed;
        let crossover = ctx.descent_crossover();
        let cruise = params.cruise_altitude;

        let mut children = Vec::new();
        if let Some(limit) = params.descent_speed_limit
            && limit.speed < managed
        {
            children.push(
                GeometricPath {
                    gpp,
                    max_speed: limit.speed,
                    max_altitude: limit.under_altitude.min(crossover).min(cruise),
                }
                .into(),
            );
        }
        children.extend([
            GeometricPath { gpp, max_speed: managed, max_altitude: crossover.min(cruise) }.into(),
            GeometricPath { gpp, max_speed: managed, max_altitude: cruise }.into(),
            IdlePath.into(),
        ]);
        children
    }

    fn after_children(&self, _ctx: &Context, builder: &mut ProfileBuilder) {
        if let Some(&top) = builder.last_state() {
            builder.request_mcdu(McduPseudoWaypoint::TopOfDescent, top);
            builder.request_nd(NdPseudoWaypoint::TopOfDescent1, top);
        }
    }
}

/// Checkpoints of the idle path built from `from` on a scratch builder.
fn idle_profile(ctx: &Context, direction: BuildDirection, from: AircraftState) -> Vec<AircraftState> {
    let mut scratch = ProfileBuilder::new(from, Phase::Descent, direction);
    walk(&Segment::from(IdlePath), ctx, &mut scratch);
    scratch.checkpoints(Phase::Descent).to_vec()
}

/// The farthest point at which the idle path stops violating descent altitude constraints.
///
/// Starting from the deceleration point, each constraint the idle path violates
/// moves the geometric path point to the constraint, at the nearest altitude meeting it.
fn geometric_path_point(
    ctx: &Context,
    direction: BuildDirection,
    decel: AircraftState,
) -> AircraftState {
    let tolerance = ctx.tuning.altitude_tolerance;
    let mut gpp = decel;
    let mut idle = idle_profile(ctx, direction, gpp);

    for restriction in ctx.constraints.descent_altitude.iter().rev() {
        if restriction.distance > gpp.distance {
            continue;
        }
        let Some(predicted) = interpolate::at_distance_descending(&idle, restriction.distance)
        else {
            continue;
        };
        if restriction.constraint.is_met(predicted.altitude, tolerance) {
            continue;
        }

        let altitude = restriction.constraint.nearest_met(predicted.altitude, tolerance);
        let mach = ctx.atmosphere.cas_to_mach(predicted.cas, altitude);
        gpp = AircraftState {
            altitude,
            mach,
            tas: ctx.atmosphere.mach_to_tas(mach, altitude),
            reason: Some("geometric path point"),
            ..predicted
        };
        idle = idle_profile(ctx, direction, gpp);
    }
    gpp
}

/// A point on a geometric path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub distance: Length,
    pub altitude: Altitude,
}

/// A straight leg of a geometric path, ending at `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricLeg {
    pub end: PathPoint,
    /// Flight path angle of the leg in the direction of flight.
    pub fpa: Angle,
}

/// Plans straight legs from `start` back to `end` meeting every restriction between them.
///
/// `start` is the later point along track.
/// A restriction violated by the straight line from `start` to `end` splits the line
/// at the altitude the restriction requires, and both halves are planned again,
/// up to `max_depth` levels of splitting.
/// Legs are returned in backward build order.
#[must_use]
pub fn plan_geometric_path(
    restrictions: &[AltitudeRestriction],
    start: PathPoint,
    end: PathPoint,
    tolerance: Length,
    max_depth: usize,
) -> Vec<GeometricLeg> {
    let mut legs = Vec::new();
    if start.distance > end.distance {
        split_path(restrictions, start, end, tolerance, max_depth, 0, &mut legs);
    }
    legs
}

fn split_path(
    restrictions: &[AltitudeRestriction],
    start: PathPoint,
    end: PathPoint,
    tolerance: Length,
    max_depth: usize,
    depth: usize,
    legs: &mut Vec<GeometricLeg>,
) {
    let run = start.distance - end.distance;
    let gradient = if run.abs() < Length::from_feet(1e-6) {
        0.
    } else {
        (start.altitude - end.altitude) / run
    };

    if depth < max_depth {
        let violation = restrictions
            .iter()
            .rev()
            .filter(|r| r.distance > end.distance && r.distance < start.distance)
            .find_map(|r| {
                let on_line = end.altitude + (r.distance - end.distance) * gradient;
                r.constraint
                    .correction_target(on_line, tolerance)
                    .map(|altitude| PathPoint { distance: r.distance, altitude })
            });
        if let Some(mid) = violation {
            split_path(restrictions, start, mid, tolerance, max_depth, depth + 1, legs);
            split_path(restrictions, mid, end, tolerance, max_depth, depth + 1, legs);
            return;
        }
    }

    legs.push(GeometricLeg { end, fpa: Angle::from_radians(gradient.atan()) });
}

/// The geometric part of the descent between the deceleration point and the geometric path point.
#[derive(Debug, Clone)]
pub struct GeometricPath {
    pub gpp:          AircraftState,
    pub max_speed:    Speed,
    pub max_altitude: Altitude,
}

impl Node for GeometricPath {
    fn label(&self) -> &'static str { "geometric path" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        plan_geometric_path(
            &ctx.constraints.descent_altitude,
            PathPoint { distance: state.distance, altitude: state.altitude },
            PathPoint { distance: self.gpp.distance, altitude: self.gpp.altitude },
            ctx.tuning.altitude_tolerance,
            ctx.tuning.geometric_max_depth,
        )
        .into_iter()
        .map(|leg| {
            DescentAltitudeConstraint {
                to_distance:  leg.end.distance,
                fpa:          leg.fpa,
                max_speed:    self.max_speed,
                max_altitude: self.max_altitude,
            }
            .into()
        })
        .collect()
    }
}

/// One geometric leg, decelerating for speed constraints on the way.
#[derive(Debug, Clone)]
pub struct DescentAltitudeConstraint {
    pub to_distance:  Length,
    pub fpa:          Angle,
    pub max_speed:    Speed,
    pub max_altitude: Altitude,
}

impl Node for DescentAltitudeConstraint {
    fn label(&self) -> &'static str { "geometric leg" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };
        if state.altitude >= self.max_altitude {
            return Vec::new();
        }

        let base = ctx
            .constraints
            .descent_speed_before(self.to_distance)
            .map_or(self.max_speed, |speed| speed.min(self.max_speed));
        speed_chain(
            ctx.constraints.descent_speed.iter().copied(),
            state.distance,
            Some(self.to_distance),
            base,
        )
        .into_iter()
        .flat_map(|link| {
            [
                PureGeometricDeceleration {
                    fpa:          self.fpa,
                    to_speed:     link.speed,
                    to_distance:  link.until,
                    max_altitude: Some(self.max_altitude),
                }
                .into(),
                PureConstantFlightPathAngle {
                    fpa:          self.fpa,
                    to_distance:  link.until,
                    max_altitude: Some(self.max_altitude),
                }
                .into(),
            ]
        })
        .collect()
    }
}

/// Deceleration at idle thrust along a fixed path angle, built backward.
///
/// Speedbrakes are extended if the path is too steep to decelerate at idle.
#[derive(Debug, Clone)]
pub struct PureGeometricDeceleration {
    pub fpa:          Angle,
    pub to_speed:     Speed,
    pub to_distance:  Option<Length>,
    /// Defaults to the cruise altitude.
    pub max_altitude: Option<Altitude>,
}

impl Node for PureGeometricDeceleration {
    fn label(&self) -> &'static str { "geometric deceleration" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };
        let start = state.with_config(state.config.with_speedbrakes(false));

        let farthest = start.distance - MAX_DECELERATION_DISTANCE;
        let ends = EndConditions::new()
            .distance_min(self.to_distance.map_or(farthest, |to| to.max(farthest)))
            .altitude_max(
                self.max_altitude
                    .unwrap_or(ctx.params.cruise_altitude)
                    .min(start.altitude + MAX_DECELERATION_ALTITUDE_GAIN),
            )
            .cas_max(self.to_speed)
            .mach_max(ctx.params.managed_descent_mach);
        let law = ControlLaw::SpeedChange {
            pitch:        PitchTarget::FlightPathAngle(self.fpa),
            thrust:       ThrustSetting::Idle,
            accelerating: false,
        };
        let options = options(ctx, builder);

        let mut integration = integrate(ctx, start, law, &options, &ends);
        if !integration.advanced() {
            return Vec::new();
        }
        let mut reason = "FPA decel";
        if too_shallow(path_angle_between(&start, integration.last()), self.fpa) {
            let braked = start.with_config(start.config.with_speedbrakes(true));
            integration = integrate(ctx, braked, law, &options, &ends);
            reason = "FPA decel with speedbrakes";
            if too_shallow(path_angle_between(&braked, integration.last()), self.fpa) {
                bevy::log::warn!(
                    "TOO STEEP PATH: cannot decelerate to {:?} along {:?} at {:?}",
                    self.to_speed,
                    self.fpa,
                    start.distance,
                );
            }
        }

        if integration.advanced() {
            builder.push(integration.last().with_reason(reason));
        }
        Vec::new()
    }
}

fn too_shallow(achieved: Angle, requested: Angle) -> bool {
    achieved.into_degrees() - requested.into_degrees() > PATH_ANGLE_TOLERANCE_DEGREES
}

/// Descent at constant speed along a fixed path angle, built backward.
#[derive(Debug, Clone)]
pub struct PureConstantFlightPathAngle {
    pub fpa:          Angle,
    pub to_distance:  Option<Length>,
    /// Defaults to the cruise altitude.
    pub max_altitude: Option<Altitude>,
}

impl Node for PureConstantFlightPathAngle {
    fn label(&self) -> &'static str { "constant path angle" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };
        let ends = EndConditions::new()
            .distance_min_opt(self.to_distance)
            .altitude_max(self.max_altitude.unwrap_or(ctx.params.cruise_altitude));
        if ends.is_satisfied(&state) {
            return Vec::new();
        }

        let options = options(ctx, builder);
        let clean = state.with_config(state.config.with_speedbrakes(false));
        let idle = ControlLaw::ConstantThrust(ThrustSetting::Idle);
        let mut start = clean;
        if too_shallow(path_angle_between(&clean, &propagate(ctx, &clean, idle, &options)), self.fpa)
        {
            start = clean.with_config(clean.config.with_speedbrakes(true));
            if too_shallow(path_angle_between(&start, &propagate(ctx, &start, idle, &options)), self.fpa)
            {
                bevy::log::warn!(
                    "TOO STEEP PATH: idle descent with speedbrakes is shallower than {:?} at {:?}",
                    self.fpa,
                    start.distance,
                );
            }
        }

        let integration = integrate(
            ctx,
            start,
            ControlLaw::ConstantPitch(PitchTarget::FlightPathAngle(self.fpa)),
            &options,
            &ends,
        );
        if integration.advanced() {
            builder.push(integration.last().with_reason("constant FPA"));
        }
        Vec::new()
    }
}

/// Idle descent from the geometric path point back to the cruise altitude.
#[derive(Debug, Clone)]
pub struct IdlePath;

impl Node for IdlePath {
    fn label(&self) -> &'static str { "idle path" }

    fn compute(&self, ctx: &Context, _builder: &mut ProfileBuilder) -> Plan {
        let params = ctx.params;
        let managed = params.managed_descent_speed;
        let crossover = ctx.descent_crossover();
        let cruise = params.cruise_altitude;

        let mut children = Vec::new();
        if let Some(limit) = params.descent_speed_limit
            && limit.speed < managed
        {
            children.push(
                IdlePathToAltitude {
                    to_altitude: limit.under_altitude.min(crossover).min(cruise),
                    max_speed:   limit.speed,
                }
                .into(),
            );
        }
        children.extend([
            IdlePathToAltitude { to_altitude: crossover.min(cruise), max_speed: managed }.into(),
            PureIdlePathConstantMach { to_altitude: cruise }.into(),
        ]);
        children
    }
}

/// Idle descent at CAS up to an altitude, decelerating for speed constraints.
#[derive(Debug, Clone)]
pub struct IdlePathToAltitude {
    pub to_altitude: Altitude,
    pub max_speed:   Speed,
}

impl Node for IdlePathToAltitude {
    fn label(&self) -> &'static str { "idle path to altitude" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };
        if state.altitude >= self.to_altitude {
            return Vec::new();
        }

        speed_chain(ctx.constraints.descent_speed.iter().copied(), state.distance, None, self.max_speed)
            .into_iter()
            .flat_map(|link| {
                [
                    PureIdlePathDeceleration {
                        to_altitude: self.to_altitude,
                        to_speed:    link.speed,
                        to_distance: link.until,
                    }
                    .into(),
                    PureIdlePathConstantSpeed {
                        to_altitude: self.to_altitude,
                        to_distance: link.until,
                    }
                    .into(),
                ]
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PureIdlePathDeceleration {
    pub to_altitude: Altitude,
    pub to_speed:    Speed,
    pub to_distance: Option<Length>,
}

impl Node for PureIdlePathDeceleration {
    fn label(&self) -> &'static str { "idle path deceleration" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let integration = integrate(
            ctx,
            state,
            ControlLaw::SpeedChange {
                pitch:        PitchTarget::VerticalSpeed(IDLE_DECELERATION_RATE),
                thrust:       ThrustSetting::Idle,
                accelerating: false,
            },
            &options(ctx, builder),
            &EndConditions::new()
                .altitude_max(self.to_altitude)
                .cas_max(self.to_speed)
                .distance_min_opt(self.to_distance),
        );
        if integration.advanced() {
            builder.push(integration.last().with_reason("idle path decel"));
        }
        Vec::new()
    }
}

#[derive(Debug, Clone)]
pub struct PureIdlePathConstantSpeed {
    pub to_altitude: Altitude,
    pub to_distance: Option<Length>,
}

impl Node for PureIdlePathConstantSpeed {
    fn label(&self) -> &'static str { "idle path at constant speed" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let integration = integrate(
            ctx,
            state,
            ControlLaw::ConstantThrust(ThrustSetting::Idle),
            &options(ctx, builder),
            &EndConditions::new()
                .altitude_max(self.to_altitude)
                .distance_min_opt(self.to_distance),
        );
        builder.extend(integration.advanced_states().iter().copied());
        Vec::new()
    }
}

#[derive(Debug, Clone)]
pub struct PureIdlePathConstantMach {
    pub to_altitude: Altitude,
}

impl Node for PureIdlePathConstantMach {
    fn label(&self) -> &'static str { "idle path at constant Mach" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };
        if state.altitude >= self.to_altitude {
            return Vec::new();
        }

        let target = SpeedTarget::Mach(state.mach);
        builder.update_last(|last| last.speed_target = Some(target));
        let integration = integrate(
            ctx,
            state.with_speed_target(target),
            ControlLaw::ConstantThrust(ThrustSetting::Idle),
            &options(ctx, builder).with_mach_mode(true),
            &EndConditions::new().altitude_max(self.to_altitude),
        );
        builder.extend(integration.advanced_states().iter().copied());
        Vec::new()
    }
}
