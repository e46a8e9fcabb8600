use math::{Altitude, Angle, Length, Speed};
use store::{FlightPhase, SpeedLimit};

use super::{Node, Plan, last_state, options};
use crate::builder::ProfileBuilder;
use crate::constraints::{ClimbConstraint, climb_constraints_descending};
use crate::context::Context;
use crate::integrate::{EndConditions, integrate};
use crate::interpolate;
use crate::perf::ThrustSetting;
use crate::propagate::{ControlLaw, PitchTarget};
use crate::pseudo::{McduPseudoWaypoint, NdPseudoWaypoint, Request};
use crate::state::{AircraftState, Configuration, Phase, SpeedTarget};

/// Control laws and targets of a climb.
#[derive(Debug, Clone, Copy)]
pub struct ClimbRequest {
    /// Law flown while climbing at constant speed.
    pub climb_law:        ControlLaw,
    /// Law flown while accelerating to the next speed target.
    pub accel_law:        ControlLaw,
    pub max_speed:        Speed,
    pub max_mach:         f64,
    pub to_altitude:      Altitude,
    pub speed_limit:      Option<SpeedLimit>,
    /// Whether climb altitude and speed constraints are flown.
    pub obey_constraints: bool,
}

impl ClimbRequest {
    /// The managed climb to the cruise altitude.
    #[must_use]
    pub fn managed(params: &store::Parameters) -> Self {
        Self {
            climb_law:        ControlLaw::ConstantThrust(ThrustSetting::Climb),
            accel_law:        ControlLaw::Acceleration(ThrustSetting::Climb),
            max_speed:        params.managed_climb_speed,
            max_mach:         params.managed_climb_mach,
            to_altitude:      params.cruise_altitude,
            speed_limit:      params.climb_speed_limit,
            obey_constraints: true,
        }
    }
}

/// Takeoff at takeoff thrust, thrust reduction and flap retraction at the acceleration altitude.
#[derive(Debug, Clone)]
pub struct Takeoff;

impl Node for Takeoff {
    fn label(&self) -> &'static str { "takeoff" }

    fn should_compute(&self, ctx: &Context) -> bool {
        ctx.params.flight_phase <= FlightPhase::Takeoff
    }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        builder.switch_phase(Phase::Takeoff);
        vec![
            PureClimbToAltitude {
                law:         ControlLaw::ConstantThrust(ThrustSetting::Takeoff),
                to_altitude: ctx.params.thrust_reduction_altitude,
                to_distance: None,
                mach_mode:   false,
            }
            .into(),
            PureClimbToAltitude {
                law:         ControlLaw::ConstantThrust(ThrustSetting::Climb),
                to_altitude: ctx.params.acceleration_altitude,
                to_distance: None,
                mach_mode:   false,
            }
            .into(),
            ConfigurationChange { config: Configuration::CLEAN, request: None }.into(),
        ]
    }
}

/// Climb to the target altitude below the speed limit, below crossover and in Mach.
#[derive(Debug, Clone)]
pub struct Climb {
    pub request: ClimbRequest,
    /// Skip the climb once the climb phase has been flown.
    pub gated:   bool,
}

impl Node for Climb {
    fn label(&self) -> &'static str { "climb" }

    fn should_compute(&self, ctx: &Context) -> bool {
        !self.gated || ctx.params.flight_phase <= FlightPhase::Climb
    }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        builder.switch_phase(Phase::Climb);

        let request = self.request;
        let crossover = ctx.performance.crossover_altitude(request.max_speed, request.max_mach);
        let mut children = Vec::new();
        if let Some(limit) = request.speed_limit
            && limit.speed < request.max_speed
        {
            children.push(
                ManagedClimb {
                    max_speed: limit.speed,
                    to_altitude: limit.under_altitude.min(request.to_altitude).min(crossover),
                    request,
                }
                .into(),
            );
        }
        children.push(
            ManagedClimb {
                max_speed: request.max_speed,
                to_altitude: crossover.min(request.to_altitude),
                request,
            }
            .into(),
        );
        children.push(
            ManagedClimbMach {
                to_altitude: request.to_altitude,
                mach: request.max_mach,
                request,
            }
            .into(),
        );
        children
    }

    fn after_children(&self, ctx: &Context, builder: &mut ProfileBuilder) {
        if let Some(limit) = self.request.speed_limit
            && let Some(crossing) =
                interpolate::climbing_through(builder.checkpoints(Phase::Climb), limit.under_altitude)
        {
            builder.requests_mut().mcdu.push(Request {
                kind:             McduPseudoWaypoint::SpeedLimit,
                state:            crossing,
                speed_constraint: Some(limit.speed),
            });
        }

        let Some(&top) = builder.last_state() else { return };
        if top.altitude >= self.request.to_altitude - ctx.tuning.altitude_tolerance {
            builder.request_mcdu(McduPseudoWaypoint::TopOfClimb, top);
            builder.request_nd(NdPseudoWaypoint::Level1Climb, top);
        }
    }
}

/// Climb at CAS up to an altitude, levelling off and slowing down for climb constraints.
#[derive(Debug, Clone)]
pub struct ManagedClimb {
    pub max_speed:   Speed,
    pub to_altitude: Altitude,
    pub request:     ClimbRequest,
}

impl Node for ManagedClimb {
    fn label(&self) -> &'static str { "managed climb" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let law = self.request.climb_law;
        let accel_law = self.request.accel_law;

        // Planned in reverse, from the unconstrained climb back to the nearest constraint.
        let mut reversed: Plan = vec![
            PureClimbToAltitude {
                law,
                to_altitude: self.to_altitude,
                to_distance: None,
                mach_mode: false,
            }
            .into(),
            PureAcceleration {
                law:         accel_law,
                to_cas:      Some(self.max_speed),
                to_mach:     self.request.max_mach,
                to_altitude: self.to_altitude,
                to_distance: None,
                mach_mode:   false,
            }
            .into(),
        ];

        if !self.request.obey_constraints {
            reversed.reverse();
            return reversed;
        }
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let mut altitude = self.to_altitude;
        let mut speed = self.max_speed;
        for constraint in climb_constraints_descending(ctx.constraints, state.distance) {
            match constraint {
                ClimbConstraint::Speed(constraint) if constraint.speed < speed => {
                    let distance = constraint.distance;
                    reversed.extend([
                        PureLevel { to_distance: distance }.into(),
                        PureLevelAcceleration { to_cas: constraint.speed, to_distance: distance }
                            .into(),
                        PureClimbToAltitude {
                            law,
                            to_altitude: altitude,
                            to_distance: Some(distance),
                            mach_mode: false,
                        }
                        .into(),
                        PureAcceleration {
                            law: accel_law,
                            to_cas: Some(constraint.speed),
                            to_mach: self.request.max_mach,
                            to_altitude: altitude,
                            to_distance: Some(distance),
                            mach_mode: false,
                        }
                        .into(),
                    ]);
                    speed = constraint.speed;
                }
                ClimbConstraint::Altitude(constraint) if constraint.altitude <= self.to_altitude => {
                    let distance = constraint.distance;
                    reversed.extend([
                        PureLevel { to_distance: distance }.into(),
                        PureClimbToAltitude {
                            law,
                            to_altitude: constraint.altitude,
                            to_distance: Some(distance),
                            mach_mode: false,
                        }
                        .into(),
                        PureLevelAcceleration { to_cas: speed, to_distance: distance }.into(),
                        PureAcceleration {
                            law: accel_law,
                            to_cas: Some(speed),
                            to_mach: self.request.max_mach,
                            to_altitude: constraint.altitude,
                            to_distance: Some(distance),
                            mach_mode: false,
                        }
                        .into(),
                    ]);
                    altitude = altitude.min(constraint.altitude);
                }
                _ => {}
            }
        }

        reversed.reverse();
        reversed
    }
}

/// Acceleration to the climb Mach number, then climb at constant Mach.
#[derive(Debug, Clone)]
pub struct ManagedClimbMach {
    pub to_altitude: Altitude,
    pub mach:        f64,
    pub request:     ClimbRequest,
}

impl Node for ManagedClimbMach {
    fn label(&self) -> &'static str { "managed climb in Mach" }

    fn compute(&self, _ctx: &Context, _builder: &mut ProfileBuilder) -> Plan {
        vec![
            PureAcceleration {
                law:         self.request.accel_law,
                to_cas:      None,
                to_mach:     self.mach,
                to_altitude: self.to_altitude,
                to_distance: None,
                mach_mode:   true,
            }
            .into(),
            PureClimbToAltitude {
                law:         self.request.climb_law,
                to_altitude: self.to_altitude,
                to_distance: None,
                mach_mode:   true,
            }
            .into(),
        ]
    }
}

/// Climb at constant speed until an altitude or a distance.
#[derive(Debug, Clone)]
pub struct PureClimbToAltitude {
    pub law:         ControlLaw,
    pub to_altitude: Altitude,
    pub to_distance: Option<Length>,
    pub mach_mode:   bool,
}

impl Node for PureClimbToAltitude {
    fn label(&self) -> &'static str { "climb to altitude" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let integration = integrate(
            ctx,
            state,
            self.law,
            &options(ctx, builder).with_mach_mode(self.mach_mode),
            &EndConditions::new()
                .altitude_max(self.to_altitude)
                .distance_max_opt(self.to_distance),
        );
        builder.extend(integration.advanced_states().iter().copied());
        Vec::new()
    }
}

/// Acceleration while climbing, until a speed, an altitude or a distance.
#[derive(Debug, Clone)]
pub struct PureAcceleration {
    pub law:         ControlLaw,
    /// `None` to accelerate to `to_mach` only.
    pub to_cas:      Option<Speed>,
    pub to_mach:     f64,
    pub to_altitude: Altitude,
    pub to_distance: Option<Length>,
    pub mach_mode:   bool,
}

impl PureAcceleration {
    fn target(&self) -> SpeedTarget {
        match self.to_cas {
            Some(cas) if !self.mach_mode => SpeedTarget::Cas(cas),
            _ => SpeedTarget::Mach(self.to_mach),
        }
    }
}

impl Node for PureAcceleration {
    fn label(&self) -> &'static str { "acceleration" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let mut ends = EndConditions::new()
            .mach_max(self.to_mach)
            .altitude_max(self.to_altitude)
            .distance_max_opt(self.to_distance);
        if let Some(cas) = self.to_cas {
            ends = ends.cas_max(cas);
        }

        let integration = integrate(
            ctx,
            state,
            self.law,
            &options(ctx, builder).with_mach_mode(self.mach_mode),
            &ends,
        );

        let target = self.target();
        if integration.advanced() {
            builder.push(integration.last().with_speed_target(target).with_reason("acceleration"));
            return Vec::new();
        }

        // Already at speed: only the target changes.
        let changes_target = match (state.speed_target, target) {
            (Some(SpeedTarget::Mach(_)), SpeedTarget::Mach(_)) => false,
            (_, SpeedTarget::Mach(_)) => true,
            (Some(SpeedTarget::Cas(current)), SpeedTarget::Cas(cas)) => current < cas,
            (_, SpeedTarget::Cas(_)) => true,
        };
        if changes_target {
            builder.push(state.with_speed_target(target).with_reason("speed target change"));
        }
        Vec::new()
    }
}

/// Level flight at constant speed until a distance.
#[derive(Debug, Clone)]
pub struct PureLevel {
    pub to_distance: Length,
}

impl Node for PureLevel {
    fn label(&self) -> &'static str { "level segment" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let integration = integrate(
            ctx,
            state,
            ControlLaw::ConstantPitch(PitchTarget::FlightPathAngle(Angle::ZERO)),
            &options(ctx, builder),
            &EndConditions::new().distance_max(self.to_distance),
        );
        if integration.advanced() {
            builder.push(integration.last().with_reason("level off"));
        }
        Vec::new()
    }
}

/// Level acceleration at climb thrust until a speed or a distance.
#[derive(Debug, Clone)]
pub struct PureLevelAcceleration {
    pub to_cas:      Speed,
    pub to_distance: Length,
}

impl Node for PureLevelAcceleration {
    fn label(&self) -> &'static str { "level acceleration" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let integration = integrate(
            ctx,
            state,
            ControlLaw::SpeedChange {
                pitch:        PitchTarget::FlightPathAngle(Angle::ZERO),
                thrust:       ThrustSetting::Climb,
                accelerating: true,
            },
            &options(ctx, builder),
            &EndConditions::new().cas_max(self.to_cas).distance_max(self.to_distance),
        );
        if integration.advanced() {
            builder.push(
                integration
                    .last()
                    .with_speed_target(SpeedTarget::Cas(self.to_cas))
                    .with_reason("level acceleration"),
            );
        }
        Vec::new()
    }
}

/// Selection of a new configuration at the current checkpoint.
#[derive(Debug, Clone)]
pub struct ConfigurationChange {
    pub config:  Configuration,
    /// Pseudo-waypoint marking the change, if any.
    pub request: Option<McduPseudoWaypoint>,
}

impl Node for ConfigurationChange {
    fn label(&self) -> &'static str { "configuration change" }

    fn compute(&self, _ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let changed: AircraftState = state.with_config(self.config).with_reason("configuration change");
        builder.push(changed);
        if let Some(kind) = self.request {
            builder.request_mcdu(kind, changed);
        }
        Vec::new()
    }
}
