use math::Altitude;

use crate::{AltitudeConstraint, FlightPhase, Scenario};

/// A semantic error in a scenario that serde cannot detect.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The route must contain an origin and at least one more waypoint.
    #[error("route has {0} waypoints, at least 2 are required")]
    RouteTooShort(usize),
    /// The active leg does not exist in the route.
    #[error("active leg index {index} is out of range for {len} waypoints")]
    ActiveLegOutOfRange {
        /// The configured active leg index.
        index: usize,
        /// The number of waypoints.
        len:   usize,
    },
    /// A leg length is negative.
    #[error("waypoint {ident} has a negative leg or transition length")]
    NegativeLength {
        /// Identifier of the offending waypoint.
        ident: String,
    },
    /// A range constraint has its bounds swapped.
    #[error("waypoint {ident} has a range constraint with low {low:?} above high {high:?}")]
    InvertedRange {
        /// Identifier of the offending waypoint.
        ident: String,
        /// The lower bound.
        low:   Altitude,
        /// The upper bound.
        high:  Altitude,
    },
    /// The cruise altitude is not above both airfields.
    #[error("cruise altitude {0:?} must be above the origin and destination elevations")]
    CruiseAltitudeTooLow(Altitude),
    /// A weight is not positive.
    #[error("zero fuel weight and fuel on board must be positive")]
    NonPositiveWeight,
    /// The present position is required once airborne.
    #[error("present position is required in flight phase {0}")]
    MissingPresentPosition(FlightPhase),
    /// Thrust ratings are not ordered idle < climb <= takeoff.
    #[error("thrust ratios must satisfy 0 <= idle < climb <= takeoff")]
    UnorderedThrustRatios,
}

impl Scenario {
    /// Checks the semantic consistency of the scenario.
    ///
    /// # Errors
    /// Returns all detected errors.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let route = &self.route;
        if route.waypoints.len() < 2 {
            errors.push(ValidationError::RouteTooShort(route.waypoints.len()));
        } else if route.active_leg_index == 0 || route.active_leg_index >= route.waypoints.len() {
            errors.push(ValidationError::ActiveLegOutOfRange {
                index: route.active_leg_index,
                len:   route.waypoints.len(),
            });
        }

        for waypoint in &route.waypoints {
            let lengths = [
                Some(waypoint.leg_length),
                Some(waypoint.inbound_transition),
                Some(waypoint.outbound_transition),
                waypoint.discontinuity_before,
            ];
            if lengths.into_iter().flatten().any(|length| length.is_negative()) {
                errors.push(ValidationError::NegativeLength { ident: waypoint.ident.clone() });
            }

            if let Some(AltitudeConstraint::Range { low, high }) = waypoint.altitude_constraint
                && low > high
            {
                errors.push(ValidationError::InvertedRange {
                    ident: waypoint.ident.clone(),
                    low,
                    high,
                });
            }
        }

        let params = &self.parameters;
        if params.cruise_altitude <= params.origin_elevation
            || params.cruise_altitude <= params.destination_elevation
        {
            errors.push(ValidationError::CruiseAltitudeTooLow(params.cruise_altitude));
        }

        if !params.zero_fuel_weight.is_positive() || !params.fuel_on_board.is_positive() {
            errors.push(ValidationError::NonPositiveWeight);
        }

        if params.flight_phase > FlightPhase::Takeoff && params.present_position.is_none() {
            errors.push(ValidationError::MissingPresentPosition(params.flight_phase));
        }

        let aircraft = &self.aircraft;
        if !(0. <= aircraft.idle_thrust_ratio
            && aircraft.idle_thrust_ratio < aircraft.climb_thrust_ratio
            && aircraft.climb_thrust_ratio <= aircraft.takeoff_thrust_ratio)
        {
            errors.push(ValidationError::UnorderedThrustRatios);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
