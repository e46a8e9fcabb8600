//! The segment tree encoding the procedural logic of each flight phase.
//!
//! A segment is a value computed fresh for every build.
//! Traversal is depth-first:
//! [`compute`](Node::compute) runs in pre-order and returns the children to walk next,
//! [`after_children`](Node::after_children) runs in post-order.
//! Children are planned from the constraint lists when their parent is computed,
//! and are never mutated afterwards.

use math::{Length, Speed};

use crate::builder::ProfileBuilder;
use crate::constraints::MaxSpeed;
use crate::context::Context;
use crate::propagate::PropagatorOptions;
use crate::state::AircraftState;
use crate::try_log;
use crate::wind::WindSelector;

mod approach;
pub use approach::*;
mod climb;
pub use climb::*;
mod cruise;
pub use cruise::*;
mod descent;
pub use descent::*;

#[cfg(test)]
mod tests;

/// The children planned by a segment, in traversal order.
pub type Plan = Vec<Segment>;

#[portrait::make]
pub trait Node {
    /// Short description for diagnostics.
    fn label(&self) -> &'static str;

    /// Whether the segment applies to the flight phase of the build.
    fn should_compute(&self, _ctx: &Context) -> bool { true }

    /// Emits checkpoints into `builder` and plans the children to walk next.
    fn compute(&self, ctx: &Context, builder: &mut ProfileBuilder) -> Plan;

    /// Reacts to the checkpoints emitted by the children.
    fn after_children(&self, _ctx: &Context, _builder: &mut ProfileBuilder) {}
}

#[derive(Debug, Clone, derive_more::From)]
#[portrait::derive(Node with portrait::derive_delegate)]
pub enum Segment {
    McduProfile(McduProfile),
    Takeoff(Takeoff),
    Climb(Climb),
    ManagedClimb(ManagedClimb),
    ManagedClimbMach(ManagedClimbMach),
    PureClimbToAltitude(PureClimbToAltitude),
    PureAcceleration(PureAcceleration),
    PureLevel(PureLevel),
    PureLevelAcceleration(PureLevelAcceleration),
    ConfigurationChange(ConfigurationChange),
    CruiseAndDescent(CruiseAndDescent),
    Cruise(Cruise),
    PureCruiseStep(PureCruiseStep),
    PureCruiseToDistance(PureCruiseToDistance),
    ManagedDescent(ManagedDescent),
    GeometricPath(GeometricPath),
    DescentAltitudeConstraint(DescentAltitudeConstraint),
    PureGeometricDeceleration(PureGeometricDeceleration),
    PureConstantFlightPathAngle(PureConstantFlightPathAngle),
    IdlePath(IdlePath),
    IdlePathToAltitude(IdlePathToAltitude),
    PureIdlePathDeceleration(PureIdlePathDeceleration),
    PureIdlePathConstantSpeed(PureIdlePathConstantSpeed),
    PureIdlePathConstantMach(PureIdlePathConstantMach),
    Approach(Approach),
    FinalApproach(FinalApproach),
    ApproachFlap(ApproachFlap),
    ApproachAltitudeConstraint(ApproachAltitudeConstraint),
    ApproachConstraintHold(ApproachConstraintHold),
    ApproachInitialDeceleration(ApproachInitialDeceleration),
}

/// Walks `segment` and its descendants, emitting checkpoints into `builder`.
pub fn walk(segment: &Segment, ctx: &Context, builder: &mut ProfileBuilder) {
    if !segment.should_compute(ctx) {
        bevy::log::trace!("Skipping {}", segment.label());
        return;
    }

    bevy::log::trace!("Computing {}", segment.label());
    let children = segment.compute(ctx, builder);
    for child in &children {
        walk(child, ctx, builder);
    }
    segment.after_children(ctx, builder);
}

/// The root of the flight management profile: takeoff, climb, cruise and descent.
#[derive(Debug, Clone)]
pub struct McduProfile;

impl Node for McduProfile {
    fn label(&self) -> &'static str { "MCDU profile" }

    fn compute(&self, ctx: &Context, _builder: &mut ProfileBuilder) -> Plan {
        vec![
            Takeoff.into(),
            Climb { request: ClimbRequest::managed(ctx.params), gated: true }.into(),
            CruiseAndDescent.into(),
        ]
    }
}

/// Propagator options for the current phase and direction of `builder`.
fn options(ctx: &Context, builder: &ProfileBuilder) -> PropagatorOptions {
    PropagatorOptions::new(
        builder.direction().signed(ctx.tuning.step_size),
        WindSelector::from(builder.phase()),
    )
}

/// The most recent checkpoint, logging an error if the build has none.
fn last_state(builder: &ProfileBuilder, label: &str) -> Option<AircraftState> {
    let state = try_log!(
        builder.last_state(),
        expect "{} computed without any checkpoint in the build" (label)
        or return None
    );
    Some(*state)
}

/// A speed to decelerate to and the distance until which it applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedChainLink {
    pub speed: Speed,
    /// `None` if the link extends until another end condition.
    pub until: Option<Length>,
}

/// Splits a backward-built path from `from` toward `to` at each speed constraint.
///
/// A speed constraint binds every point flown after it,
/// so the speed allowed at a point is the minimum of `base`
/// and all constraints at or before that point.
/// Links are returned in backward build order, i.e. by decreasing distance;
/// the last link extends to `to` at `base`.
#[must_use]
pub fn speed_chain(
    constraints: impl IntoIterator<Item = MaxSpeed>,
    from: Length,
    to: Option<Length>,
    base: Speed,
) -> Vec<SpeedChainLink> {
    let mut within: Vec<MaxSpeed> = constraints
        .into_iter()
        .filter(|c| c.distance <= from && to.is_none_or(|to| c.distance > to))
        .collect();
    within.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let mut links = vec![SpeedChainLink { speed: base, until: to }];
    let mut allowed = base;
    for constraint in within {
        allowed = allowed.min(constraint.speed);
        links.push(SpeedChainLink { speed: allowed, until: Some(constraint.distance) });
    }
    links.reverse();
    links
}
