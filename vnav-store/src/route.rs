use math::{Altitude, Length, Speed};
use serde::{Deserialize, Serialize};

/// The lateral route reduced to one dimension.
///
/// Each waypoint records the length of the leg terminating at it.
/// The first waypoint is the origin and its leg length is ignored.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Route {
    /// Waypoints in flight order.
    pub waypoints:                    Vec<Waypoint>,
    /// Index of the waypoint terminating the active leg.
    #[serde(default = "default_active_leg_index")]
    pub active_leg_index:             usize,
    /// Remaining distance to the terminator of the active leg.
    #[serde(default)]
    pub distance_to_active_terminator: Length,
}

fn default_active_leg_index() -> usize { 1 }

/// A waypoint terminating a leg.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Waypoint {
    /// Identifier displayed to the crew.
    pub ident:                 String,
    /// Length of the leg terminating at this waypoint, excluding transitions.
    #[serde(default)]
    pub leg_length:            Length,
    /// Length of the turn transition into this leg.
    #[serde(default)]
    pub inbound_transition:    Length,
    /// Length of the turn transition out of this leg.
    #[serde(default)]
    pub outbound_transition:   Length,
    /// If there is a discontinuity before this waypoint,
    /// the straight-line distance across the discontinuity.
    #[serde(default)]
    pub discontinuity_before:  Option<Length>,
    /// Which part of the vertical profile the constraints of this waypoint belong to.
    #[serde(default)]
    pub segment:               ConstraintSegment,
    /// Altitude constraint at this waypoint.
    #[serde(default)]
    pub altitude_constraint:   Option<AltitudeConstraint>,
    /// Speed constraint at this waypoint.
    #[serde(default)]
    pub speed_constraint:      Option<SpeedConstraint>,
    /// Cruise step starting at this waypoint.
    #[serde(default)]
    pub cruise_step:           Option<CruiseStep>,
}

/// Classification of waypoint constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum ConstraintSegment {
    /// The waypoint has no vertical constraints relevant to the profile.
    #[default]
    None,
    /// Constraints apply during climb.
    Climb,
    /// Constraints apply during descent and approach.
    Descent,
}

/// An altitude constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum AltitudeConstraint {
    /// The aircraft must cross at the altitude.
    At {
        /// The constraining altitude.
        altitude: Altitude,
    },
    /// The aircraft must cross at or above the altitude.
    AtOrAbove {
        /// The constraining altitude.
        altitude: Altitude,
    },
    /// The aircraft must cross at or below the altitude.
    AtOrBelow {
        /// The constraining altitude.
        altitude: Altitude,
    },
    /// The aircraft must cross between the two altitudes.
    Range {
        /// The lower bound.
        low:  Altitude,
        /// The upper bound.
        high: Altitude,
    },
}

/// A speed constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct SpeedConstraint {
    /// How the speed constrains the crossing.
    #[serde(default)]
    pub kind:  SpeedConstraintKind,
    /// The constraining calibrated airspeed.
    pub speed: Speed,
}

/// Kind of a speed constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum SpeedConstraintKind {
    /// The aircraft must cross at the speed.
    At,
    /// The aircraft must cross at or below the speed.
    #[default]
    AtOrBelow,
    /// The aircraft must cross at or above the speed.
    AtOrAbove,
}

/// A cruise step request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CruiseStep {
    /// The new cruise altitude.
    pub to_altitude: Altitude,
    /// Whether the crew has chosen to ignore the step.
    #[serde(default)]
    pub ignored:     bool,
}
