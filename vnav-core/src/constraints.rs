//! Extraction of vertical constraints from the route.

use math::{Altitude, Length, Speed};
use ordered_float::OrderedFloat;
use store::{AltitudeConstraint, ConstraintSegment, SpeedConstraint, SpeedConstraintKind};

#[cfg(test)]
mod tests;

/// Speed constraints at or below this speed are placeholders and are not extracted.
const PLACEHOLDER_SPEED: Speed = Speed::from_knots(100.);

/// Comparisons against constraint bounds are exact within this margin.
const COMPARISON_EPSILON: Length = Length::from_feet(1e-6);

/// A climb altitude constraint reduced to the altitude it must not exceed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxAltitude {
    pub distance: Length,
    pub altitude: Altitude,
}

/// A speed constraint reduced to the speed it must not exceed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxSpeed {
    pub distance: Length,
    pub speed:    Speed,
}

/// A speed constraint of any kind at a route position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRestriction {
    pub distance:   Length,
    pub constraint: SpeedConstraint,
}

/// An altitude constraint at a route position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeRestriction {
    pub distance:   Length,
    pub constraint: AltitudeConstraint,
}

/// A cruise step that has not been ignored by the crew.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CruiseStepAt {
    pub distance:       Length,
    pub to_altitude:    Altitude,
    pub waypoint_index: usize,
}

/// Constraint lists read by all segments during a build.
///
/// All lists are sorted by ascending distance from the origin.
#[derive(Debug, Clone, Default)]
pub struct ConstraintLists {
    pub climb_altitude:             Vec<MaxAltitude>,
    /// Speed caps of the climb, from at and at-or-below constraints.
    pub climb_speed:                Vec<MaxSpeed>,
    /// Every climb speed constraint, including at-or-above ones.
    pub climb_speed_restrictions:   Vec<SpeedRestriction>,
    pub descent_altitude:           Vec<AltitudeRestriction>,
    pub descent_speed:              Vec<MaxSpeed>,
    pub descent_speed_restrictions: Vec<SpeedRestriction>,
    pub cruise_steps:               Vec<CruiseStepAt>,
    pub waypoint_count:             usize,
    pub total_distance:             Length,
    pub present_position_distance:  Length,
}

impl ConstraintLists {
    /// The lowest descent speed constraint at or before `distance`.
    #[must_use]
    pub fn descent_speed_before(&self, distance: Length) -> Option<Speed> {
        self.descent_speed
            .iter()
            .filter(|c| c.distance <= distance)
            .map(|c| c.speed)
            .min_by(Speed::total_cmp)
    }
}

/// The parts of a leg, in flight order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegGeometry {
    pub discontinuity: Length,
    pub inbound:       Length,
    pub leg:           Length,
    pub outbound:      Length,
}

impl LegGeometry {
    #[must_use]
    pub fn total(&self) -> Length { self.discontinuity + self.inbound + self.leg + self.outbound }
}

/// Reads constraint lists and distances from the route.
#[derive(Debug, Clone, Default)]
pub struct ConstraintReader {
    lists:              ConstraintLists,
    /// Cumulative distance from the origin to each waypoint.
    waypoint_distances: Vec<Length>,
    /// Geometry of the leg terminating at each waypoint.
    /// The entry of the origin is zero.
    legs:               Vec<LegGeometry>,
    idents:             Vec<String>,
}

impl ConstraintReader {
    #[must_use]
    pub fn new(route: &store::Route) -> Self {
        let mut reader = Self::default();
        reader.update_geometry(route);
        reader
    }

    #[must_use]
    pub fn lists(&self) -> &ConstraintLists { &self.lists }

    #[must_use]
    pub fn waypoint_distance(&self, index: usize) -> Option<Length> {
        self.waypoint_distances.get(index).copied()
    }

    #[must_use]
    pub fn waypoint_distances(&self) -> &[Length] { &self.waypoint_distances }

    #[must_use]
    pub fn legs(&self) -> &[LegGeometry] { &self.legs }

    #[must_use]
    pub fn ident(&self, index: usize) -> Option<&str> { self.idents.get(index).map(String::as_str) }

    /// Re-extracts all constraint lists after a change of the route geometry.
    pub fn update_geometry(&mut self, route: &store::Route) {
        self.legs = route
            .waypoints
            .iter()
            .enumerate()
            .map(|(index, waypoint)| {
                if index == 0 {
                    LegGeometry {
                        discontinuity: Length::ZERO,
                        inbound:       Length::ZERO,
                        leg:           Length::ZERO,
                        outbound:      Length::ZERO,
                    }
                } else {
                    LegGeometry {
                        discontinuity: waypoint.discontinuity_before.unwrap_or(Length::ZERO),
                        inbound:       waypoint.inbound_transition,
                        leg:           waypoint.leg_length,
                        outbound:      waypoint.outbound_transition,
                    }
                }
            })
            .collect();
        self.waypoint_distances = self
            .legs
            .iter()
            .scan(Length::ZERO, |cumulative, leg| {
                *cumulative += leg.total();
                Some(*cumulative)
            })
            .collect();
        self.idents = route.waypoints.iter().map(|waypoint| waypoint.ident.clone()).collect();

        let mut lists = ConstraintLists {
            waypoint_count: route.waypoints.len(),
            total_distance: self.waypoint_distances.last().copied().unwrap_or(Length::ZERO),
            ..ConstraintLists::default()
        };

        for ((index, waypoint), &distance) in
            route.waypoints.iter().enumerate().zip(&self.waypoint_distances)
        {
            let restriction = waypoint
                .speed_constraint
                .filter(|c| c.speed > PLACEHOLDER_SPEED)
                .map(|constraint| SpeedRestriction { distance, constraint });
            let max_speed = restriction.and_then(|r| {
                r.constraint.max_speed().map(|speed| MaxSpeed { distance, speed })
            });

            match waypoint.segment {
                ConstraintSegment::Climb => {
                    if let Some(altitude) =
                        waypoint.altitude_constraint.and_then(|c| c.max_altitude())
                    {
                        lists.climb_altitude.push(MaxAltitude { distance, altitude });
                    }
                    lists.climb_speed.extend(max_speed);
                    lists.climb_speed_restrictions.extend(restriction);
                }
                ConstraintSegment::Descent => {
                    if let Some(constraint) = waypoint.altitude_constraint {
                        lists.descent_altitude.push(AltitudeRestriction { distance, constraint });
                    }
                    lists.descent_speed.extend(max_speed);
                    lists.descent_speed_restrictions.extend(restriction);
                }
                ConstraintSegment::None => {}
            }

            if let Some(step) = waypoint.cruise_step
                && !step.ignored
            {
                lists.cruise_steps.push(CruiseStepAt {
                    distance,
                    to_altitude: step.to_altitude,
                    waypoint_index: index,
                });
            }
        }

        self.lists = lists;
        self.update_present_position(route);
    }

    /// Refreshes the distance from the origin to the present position.
    pub fn update_present_position(&mut self, route: &store::Route) {
        let Some(&terminator) = self.waypoint_distances.get(route.active_leg_index) else {
            bevy::log::warn!(
                "Active leg index {} is outside the route of {} waypoints",
                route.active_leg_index,
                self.waypoint_distances.len(),
            );
            self.lists.present_position_distance = Length::ZERO;
            return;
        };
        self.lists.present_position_distance =
            (terminator - route.distance_to_active_terminator).max(Length::ZERO);
    }
}

/// Evaluation of an altitude constraint against a predicted altitude.
pub trait AltitudeConstraintExt {
    /// The altitude the constraint must not exceed, if it has an upper bound.
    fn max_altitude(&self) -> Option<Altitude>;

    /// Signed distance from `altitude` to the constraint, zero if within its bounds.
    ///
    /// An `At` constraint has no zero band; its error is the full difference.
    fn error(&self, altitude: Altitude) -> Length;

    fn is_met(&self, altitude: Altitude, tolerance: Length) -> bool {
        self.error(altitude).abs() <= tolerance + COMPARISON_EPSILON
    }

    /// The altitude closest to `altitude` that meets the constraint within `tolerance`.
    fn nearest_met(&self, altitude: Altitude, tolerance: Length) -> Altitude;

    /// The altitude a path violating the constraint by more than `tolerance` must pass through.
    fn correction_target(&self, altitude: Altitude, tolerance: Length) -> Option<Altitude>;
}

impl AltitudeConstraintExt for AltitudeConstraint {
    fn max_altitude(&self) -> Option<Altitude> {
        match *self {
            Self::At { altitude } | Self::AtOrBelow { altitude } => Some(altitude),
            Self::Range { high, .. } => Some(high),
            Self::AtOrAbove { .. } => None,
        }
    }

    fn error(&self, altitude: Altitude) -> Length {
        match *self {
            Self::At { altitude: target } => altitude - target,
            Self::AtOrAbove { altitude: target } => (altitude - target).min(Length::ZERO),
            Self::AtOrBelow { altitude: target } => (altitude - target).max(Length::ZERO),
            Self::Range { low, high } => {
                if altitude > high {
                    altitude - high
                } else if altitude < low {
                    altitude - low
                } else {
                    Length::ZERO
                }
            }
        }
    }

    fn nearest_met(&self, altitude: Altitude, tolerance: Length) -> Altitude {
        match *self {
            Self::At { altitude: target } => {
                altitude.max(target - tolerance).min(target + tolerance)
            }
            Self::AtOrAbove { altitude: target } => altitude.max(target - tolerance),
            Self::AtOrBelow { altitude: target } => altitude.min(target + tolerance),
            Self::Range { low, high } => altitude.max(low - tolerance).min(high + tolerance),
        }
    }

    fn correction_target(&self, altitude: Altitude, tolerance: Length) -> Option<Altitude> {
        if self.is_met(altitude, tolerance) {
            return None;
        }
        Some(match *self {
            Self::At { altitude: target }
            | Self::AtOrAbove { altitude: target }
            | Self::AtOrBelow { altitude: target } => target,
            Self::Range { low, high } => altitude.max(low).min(high),
        })
    }
}

/// Evaluation of a speed constraint against a predicted calibrated airspeed.
pub trait SpeedConstraintExt {
    /// The speed the constraint must not exceed, if it has an upper bound.
    fn max_speed(&self) -> Option<Speed>;

    fn is_met(&self, cas: Speed, tolerance: Speed) -> bool;
}

impl SpeedConstraintExt for SpeedConstraint {
    fn max_speed(&self) -> Option<Speed> {
        match self.kind {
            SpeedConstraintKind::At | SpeedConstraintKind::AtOrBelow => Some(self.speed),
            SpeedConstraintKind::AtOrAbove => None,
        }
    }

    fn is_met(&self, cas: Speed, tolerance: Speed) -> bool {
        match self.kind {
            SpeedConstraintKind::At => (cas - self.speed).abs() <= tolerance,
            SpeedConstraintKind::AtOrBelow => cas <= self.speed + tolerance,
            SpeedConstraintKind::AtOrAbove => cas >= self.speed - tolerance,
        }
    }
}

/// Merges climb altitude and speed constraints ahead of `from` into descending distance order.
pub(crate) fn climb_constraints_descending(
    lists: &ConstraintLists,
    from: Length,
) -> Vec<ClimbConstraint> {
    let mut merged: Vec<_> = lists
        .climb_altitude
        .iter()
        .filter(|c| c.distance > from)
        .map(|&c| ClimbConstraint::Altitude(c))
        .chain(
            lists.climb_speed.iter().filter(|c| c.distance > from).map(|&c| ClimbConstraint::Speed(c)),
        )
        .collect();
    merged.sort_by_key(|c| std::cmp::Reverse(OrderedFloat(c.distance().into_raw())));
    merged
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum ClimbConstraint {
    Altitude(MaxAltitude),
    Speed(MaxSpeed),
}

impl ClimbConstraint {
    fn distance(&self) -> Length {
        match self {
            Self::Altitude(c) => c.distance,
            Self::Speed(c) => c.distance,
        }
    }
}
