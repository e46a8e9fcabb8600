use math::{Altitude, Angle, Length, Speed};
use store::FlightPhase;

use super::{Node, Plan, last_state, options};
use crate::builder::ProfileBuilder;
use crate::context::Context;
use crate::integrate::{EndConditions, integrate};
use crate::perf::ThrustSetting;
use crate::propagate::{ControlLaw, PitchTarget};
use crate::pseudo::McduPseudoWaypoint;
use crate::reconcile::reconcile;
use crate::state::Phase;

/// Speed is held in Mach above this altitude during cruise.
const MACH_MODE_ALTITUDE: Altitude = Altitude::from_feet(25000.);

/// Vertical speed of a step descent.
const STEP_DESCENT_RATE: Speed = Speed::from_fpm(-1000.);

/// Cruise and descent, built separately and joined at the top of descent.
#[derive(Debug, Clone)]
pub struct CruiseAndDescent;

impl Node for CruiseAndDescent {
    fn label(&self) -> &'static str { "cruise and descent" }

    fn should_compute(&self, ctx: &Context) -> bool {
        ctx.params.flight_phase <= FlightPhase::Approach
    }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let outcome = reconcile(ctx, builder);
        builder.record_reconciliation(outcome);
        Vec::new()
    }
}

/// Cruise until a distance, flying the cruise steps on the way.
#[derive(Debug, Clone)]
pub struct Cruise {
    pub to_distance: Length,
}

impl Node for Cruise {
    fn label(&self) -> &'static str { "cruise" }

    fn should_compute(&self, ctx: &Context) -> bool {
        ctx.params.flight_phase <= FlightPhase::Cruise
    }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        builder.switch_phase(Phase::Cruise);
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let mut altitude = ctx.params.cruise_altitude;
        let mut children = Vec::new();
        for step in ctx
            .constraints
            .cruise_steps
            .iter()
            .filter(|step| step.distance > state.distance && step.distance < self.to_distance)
        {
            children.push(PureCruiseToDistance { to_distance: step.distance, altitude }.into());
            children.push(
                PureCruiseStep { to_altitude: step.to_altitude, to_distance: self.to_distance }
                    .into(),
            );
            altitude = step.to_altitude;
        }
        children.push(PureCruiseToDistance { to_distance: self.to_distance, altitude }.into());
        children
    }
}

/// A step climb or step descent to a new cruise altitude.
#[derive(Debug, Clone)]
pub struct PureCruiseStep {
    pub to_altitude: Altitude,
    /// The step is abandoned at this distance.
    pub to_distance: Length,
}

impl Node for PureCruiseStep {
    fn label(&self) -> &'static str { "cruise step" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let climbing = state.altitude < self.to_altitude;
        let (law, ends, kind) = if climbing {
            (
                ControlLaw::ConstantThrust(ThrustSetting::Climb),
                EndConditions::new().altitude_max(self.to_altitude),
                McduPseudoWaypoint::StepClimb,
            )
        } else {
            (
                ControlLaw::ConstantPitch(PitchTarget::VerticalSpeed(STEP_DESCENT_RATE)),
                EndConditions::new().altitude_min(self.to_altitude),
                McduPseudoWaypoint::StepDescent,
            )
        };

        let integration = integrate(
            ctx,
            state,
            law,
            &options(ctx, builder).with_mach_mode(state.altitude > MACH_MODE_ALTITUDE),
            &ends.distance_max(self.to_distance),
        );
        if integration.advanced() {
            builder.request_mcdu(kind, state);
            builder.push(integration.last().with_reason("cruise step"));
        }
        Vec::new()
    }
}

/// Level cruise at the cruise altitude until a distance.
#[derive(Debug, Clone)]
pub struct PureCruiseToDistance {
    pub to_distance: Length,
    pub altitude:    Altitude,
}

impl Node for PureCruiseToDistance {
    fn label(&self) -> &'static str { "cruise to distance" }

    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan {
        let Some(state) = last_state(builder, self.label()) else { return Vec::new() };

        let step = builder.direction().signed(ctx.tuning.cruise_step_size);
        let integration = integrate(
            ctx,
            state,
            ControlLaw::ConstantPitch(PitchTarget::FlightPathAngle(Angle::ZERO)),
            &options(ctx, builder)
                .with_step(step)
                .with_mach_mode(self.altitude > MACH_MODE_ALTITUDE),
            &EndConditions::new().distance_max(self.to_distance),
        );
        if integration.advanced() {
            builder.push(integration.last().with_reason("cruise"));
        }
        Vec::new()
    }
}
