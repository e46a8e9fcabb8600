//! Pseudo-waypoints: synthetic markers such as the top of climb, placed on the lateral path.

use math::{Length, Speed};
use serde::Serialize;

use crate::constraints::LegGeometry;
use crate::state::AircraftState;

#[cfg(test)]
mod tests;

/// Pseudo-waypoints listed on the MCDU flight plan page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum McduPseudoWaypoint {
    SpeedLimit,
    TopOfClimb,
    TopOfDescent,
    StepClimb,
    StepDescent,
    Decel,
    Flap1,
    Flap2,
}

/// Pseudo-waypoints drawn on the navigation display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum NdPseudoWaypoint {
    /// Level-off arrow at the end of the climb.
    Level1Climb,
    TopOfDescent1,
    Decel,
}

/// A request queued by a segment during a build, placed on the route after the build.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Request<K> {
    pub kind:             K,
    pub state:            AircraftState,
    /// The speed constraint the marker is associated with, if any.
    pub speed_constraint: Option<Speed>,
}

/// Request queues of both displays.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Requests {
    pub mcdu: Vec<Request<McduPseudoWaypoint>>,
    pub nd:   Vec<Request<NdPseudoWaypoint>>,
}

impl Requests {
    pub fn request_mcdu(&mut self, kind: McduPseudoWaypoint, state: AircraftState) {
        self.mcdu.push(Request { kind, state, speed_constraint: None });
    }

    pub fn request_nd(&mut self, kind: NdPseudoWaypoint, state: AircraftState) {
        self.nd.push(Request { kind, state, speed_constraint: None });
    }

    /// Appends all requests of `other`.
    pub fn extend(&mut self, other: Self) {
        self.mcdu.extend(other.mcdu);
        self.nd.extend(other.nd);
    }

    /// Keeps only the requests whose state satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&AircraftState) -> bool) {
        self.mcdu.retain(|request| keep(&request.state));
        self.nd.retain(|request| keep(&request.state));
    }

    pub fn clear(&mut self) {
        self.mcdu.clear();
        self.nd.clear();
    }
}

/// The part of a leg a pseudo-waypoint falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LegPart {
    Inbound,
    Leg,
    Outbound,
}

/// Position of a pseudo-waypoint on the route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Index of the waypoint terminating the leg.
    pub leg_index:                  usize,
    pub part:                       LegPart,
    /// Distance from the start of the leg, excluding the discontinuity.
    pub distance_from_last_fix:     Length,
    pub distance_before_terminator: Length,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlacementError {
    #[error("distance {0:?} is before the origin")]
    Negative(Length),
    #[error("distance {distance:?} is beyond the end of the path at {end:?}")]
    BeyondPath { distance: Length, end: Length },
    #[error("distance {distance:?} falls in the discontinuity before leg {leg_index}")]
    InsideDiscontinuity { distance: Length, leg_index: usize },
}

/// Maps a distance from the origin onto the leg containing it.
///
/// `legs` and `waypoint_distances` are indexed by the terminating waypoint,
/// as provided by [`ConstraintReader`](crate::constraints::ConstraintReader).
pub fn place(
    legs: &[LegGeometry],
    waypoint_distances: &[Length],
    distance: Length,
) -> Result<Placement, PlacementError> {
    if distance.is_negative() {
        return Err(PlacementError::Negative(distance));
    }

    let end = waypoint_distances.last().copied().unwrap_or(Length::ZERO);
    for (leg_index, (leg, pair)) in
        legs.iter().skip(1).zip(waypoint_distances.windows(2)).enumerate().map(|(i, v)| (i + 1, v))
    {
        let &[start, terminator] = pair else { continue };
        if distance > terminator {
            continue;
        }

        let offset = distance - start;
        if offset < leg.discontinuity {
            return Err(PlacementError::InsideDiscontinuity { distance, leg_index });
        }
        let from_fix = offset - leg.discontinuity;
        let part = if from_fix < leg.inbound {
            LegPart::Inbound
        } else if from_fix < leg.inbound + leg.leg {
            LegPart::Leg
        } else {
            LegPart::Outbound
        };

        return Ok(Placement {
            leg_index,
            part,
            distance_from_last_fix: from_fix,
            distance_before_terminator: terminator - distance,
        });
    }

    Err(PlacementError::BeyondPath { distance, end })
}
