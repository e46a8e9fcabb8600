use math::{Altitude, Angle, Length, Speed};
use store::{AltitudeConstraint, FlapSetting};

use super::{
    ConfigurationChange, Node, Plan, PureConstantFlightPathAngle, PureGeometricDeceleration,
    last_state, options, speed_chain,
};
use crate::builder::ProfileBuilder;
use crate::constraints::{AltitudeRestriction, MaxSpeed};
use crate::context::Context;
use crate::integrate::{EndConditions, integrate};
use crate::propagate::{ControlLaw, PitchTarget};
use crate::pseudo::{McduPseudoWaypoint, NdPseudoWaypoint};
use crate::state::{AircraftState, Configuration, Phase, SpeedTarget};

/// Path angle of the final approach.
const GLIDE_PATH: Angle = Angle::from_degrees(-3.);

/// Height above the runway where the final approach starts.
const FINAL_APPROACH_HEIGHT: Length = Length::from_feet(1000.);

/// Preferred path angle of decelerations during the approach.
const APPROACH_DECELERATION_PATH: Angle = Angle::from_degrees(-1.5);

/// Steepest path angle flown to meet an at-or-above constraint.
const STEEPEST_APPROACH_PATH: Angle = Angle::from_degrees(-20.);

/// The approach from the runway back to the deceleration point.
///
/// Built backward from the landing state.
/// Each flap retraction speed is reached before the configuration change that requires it.
#[derive(Debug, Clone)]
pub struct Approach;

impl Node for Approach {
    fn label(&self) -> &'static str { "approach" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        builder.switch_phase(Phase::Approach);
        let params = ctx.params;

        let mut children: Plan = vec![FinalApproach.into()];
        if !params.landing_flaps_3 {
            children.extend([
                ApproachFlap { next_speed: (params.flap_retraction_speed + params.approach_speed) / 2. }
                    .into(),
                ConfigurationChange {
                    config:  Configuration::CLEAN.with_flaps(FlapSetting::Conf3).with_gear_down(true),
                    request: None,
                }
                .into(),
            ]);
        }
        children.extend([
            ApproachFlap { next_speed: params.flap_retraction_speed }.into(),
            ConfigurationChange {
                config:  Configuration::CLEAN.with_flaps(FlapSetting::Conf2),
                request: None,
            }
            .into(),
            ApproachFlap { next_speed: params.slat_retraction_speed }.into(),
            ConfigurationChange {
                config:  Configuration::CLEAN.with_flaps(FlapSetting::Conf1),
                request: Some(McduPseudoWaypoint::Flap2),
            }
            .into(),
            ApproachFlap { next_speed: params.clean_speed }.into(),
            ConfigurationChange {
                config:  Configuration::CLEAN,
                request: Some(McduPseudoWaypoint::Flap1),
            }
            .into(),
            ApproachInitialDeceleration.into(),
        ]);
        children
    }

    fn after_children(&self, _ctx: &Context, builder: &mut ProfileBuilder) {
        builder.update_last(|state| state.speed_target = Some(SpeedTarget::Cas(state.cas)));
        if let Some(&decel) = builder.last_state() {
            builder.request_mcdu(McduPseudoWaypoint::Decel, decel);
            builder.request_nd(NdPseudoWaypoint::Decel, decel);
        }
    }
}

/// The final approach on the glide path, up to the stabilization height.
#[derive(Debug, Clone)]
pub struct FinalApproach;

impl Node for FinalApproach {
    fn label(&self) -> &'static str { "final approach" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let integration = integrate(
            ctx,
            state,
            ControlLaw::ConstantPitch(PitchTarget::FlightPathAngle(GLIDE_PATH)),
            &options(ctx, builder),
            &EndConditions::new()
                .altitude_max(ctx.params.destination_elevation + FINAL_APPROACH_HEIGHT),
        );
        if integration.advanced() {
            builder.push(integration.last().with_reason("final approach"));
        }
        Vec::new()
    }
}

/// Deceleration to the minimum speed of the next configuration, flown backward.
#[derive(Debug, Clone)]
pub struct ApproachFlap {
    pub next_speed: Speed,
}

impl Node for ApproachFlap {
    fn label(&self) -> &'static str { "approach flap segment" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let mut children = constraints_behind(ctx, state.distance, self.next_speed);
        let slower: Vec<MaxSpeed> = ctx
            .constraints
            .descent_speed
            .iter()
            .filter(|c| c.speed <= self.next_speed)
            .copied()
            .collect();
        for link in speed_chain(slower, state.distance, None, self.next_speed) {
            children.push(
                PureGeometricDeceleration {
                    fpa:          APPROACH_DECELERATION_PATH,
                    to_speed:     link.speed,
                    to_distance:  link.until,
                    max_altitude: None,
                }
                .into(),
            );
            if link.until.is_some() {
                children.push(
                    PureConstantFlightPathAngle {
                        fpa:          APPROACH_DECELERATION_PATH,
                        to_distance:  link.until,
                        max_altitude: None,
                    }
                    .into(),
                );
            }
        }
        children
    }
}

/// Decelerations toward each altitude constraint before `distance`, nearest first.
fn constraints_behind(ctx: &Context, distance: Length, max_speed: Speed) -> Plan {
    ctx.constraints
        .descent_altitude
        .iter()
        .rev()
        .filter(|restriction| restriction.distance < distance)
        .map(|&restriction| ApproachAltitudeConstraint { restriction, max_speed }.into())
        .collect()
}

/// Deceleration toward an altitude constraint, along a path angle meeting it.
///
/// Does nothing if the speed is already reached,
/// leaving the constraint to the next segment passing over it.
/// If the preferred path angle would break the constraint,
/// the path is held at the meeting angle up to the constraint after the deceleration.
#[derive(Debug, Clone)]
pub struct ApproachAltitudeConstraint {
    pub restriction: AltitudeRestriction,
    pub max_speed:   Speed,
}

impl Node for ApproachAltitudeConstraint {
    fn label(&self) -> &'static str { "approach altitude constraint" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };
        let to_distance = self.restriction.distance;
        if to_distance >= state.distance || state.cas >= self.max_speed {
            return Vec::new();
        }

        let fpa = meeting_path_angle(ctx, &self.restriction, &state);
        let links = speed_chain(
            ctx.constraints.descent_speed.iter().copied().filter(|c| c.speed <= self.max_speed),
            state.distance,
            Some(to_distance),
            self.max_speed,
        );
        let last_link = links.len().saturating_sub(1);
        let mut children = Vec::new();
        for (index, link) in links.into_iter().enumerate() {
            children.push(
                PureGeometricDeceleration {
                    fpa,
                    to_speed: link.speed,
                    to_distance: link.until,
                    max_altitude: None,
                }
                .into(),
            );
            if index < last_link {
                children.push(
                    PureConstantFlightPathAngle { fpa, to_distance: link.until, max_altitude: None }
                        .into(),
                );
            }
        }
        if fpa != APPROACH_DECELERATION_PATH {
            children.push(ApproachConstraintHold { restriction: self.restriction }.into());
        }
        children
    }
}

/// Constant path angle up to an altitude constraint, chosen from the state it starts at.
#[derive(Debug, Clone)]
pub struct ApproachConstraintHold {
    pub restriction: AltitudeRestriction,
}

impl Node for ApproachConstraintHold {
    fn label(&self) -> &'static str { "approach constraint hold" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };
        let to_distance = self.restriction.distance;
        if to_distance >= state.distance {
            return Vec::new();
        }

        vec![
            PureConstantFlightPathAngle {
                fpa:          meeting_path_angle(ctx, &self.restriction, &state),
                to_distance:  Some(to_distance),
                max_altitude: None,
            }
            .into(),
        ]
    }
}

/// The preferred approach path angle, clamped to the angles from `state`
/// that cross the restriction within its bounds.
fn meeting_path_angle(
    ctx: &Context,
    restriction: &AltitudeRestriction,
    state: &AircraftState,
) -> Angle {
    let (steepest, shallowest) = path_angle_range(
        restriction.constraint,
        state.altitude,
        state.distance - restriction.distance,
        ctx.tuning.altitude_tolerance / 2.,
    );
    APPROACH_DECELERATION_PATH.max(steepest).min(shallowest)
}

/// Path angles from a constraint to a point at `altitude`, `run` later along track,
/// that cross the constraint at least `margin` inside its bounds.
///
/// The margin never exceeds half the width of a range.
pub(crate) fn path_angle_range(
    constraint: AltitudeConstraint,
    altitude: Altitude,
    run: Length,
    margin: Length,
) -> (Angle, Angle) {
    let angle_to = |target: Altitude| Angle::from_radians(((altitude - target) / run).atan());
    match constraint {
        AltitudeConstraint::At { altitude: target } => (angle_to(target), angle_to(target)),
        AltitudeConstraint::AtOrAbove { altitude: target } => {
            (STEEPEST_APPROACH_PATH, angle_to(target + margin))
        }
        AltitudeConstraint::AtOrBelow { altitude: target } => {
            (angle_to(target - margin), Angle::ZERO)
        }
        AltitudeConstraint::Range { low, high } => {
            let margin = margin.min((high - low) / 2.);
            (angle_to(high - margin), angle_to(low + margin))
        }
    }
}

/// Level deceleration from the descent speed to the clean configuration.
#[derive(Debug, Clone)]
pub struct ApproachInitialDeceleration;

impl Node for ApproachInitialDeceleration {
    fn label(&self) -> &'static str { "approach initial deceleration" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };
        let params = ctx.params;

        let mut target = params.managed_descent_speed;
        if let Some(limit) = params.descent_speed_limit
            && state.altitude < limit.under_altitude
        {
            target = target.min(limit.speed);
        }
        if let Some(constraint) = ctx.constraints.descent_speed_before(state.distance) {
            target = target.min(constraint);
        }

        let mut children = constraints_behind(ctx, state.distance, target);
        children.push(
            PureGeometricDeceleration {
                fpa:          Angle::ZERO,
                to_speed:     target,
                to_distance:  None,
                max_altitude: None,
            }
            .into(),
        );
        children
    }
}
