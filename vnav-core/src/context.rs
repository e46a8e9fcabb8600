//! Read-only inputs shared by every segment of a build.

use math::{Altitude, Atmosphere, Length, Speed};
use store::FlightPhase;

use crate::constraints::ConstraintLists;
use crate::perf::Performance;
use crate::state::{AircraftState, Configuration, SpeedTarget};
use crate::wind::HeadwindRepository;

/// Speed above V2 at which the takeoff is predicted.
const TAKEOFF_SPEED_MARGIN: Speed = Speed::from_knots(10.);

/// Everything a build reads but never mutates.
///
/// The parameters are a snapshot taken when the build starts.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub params:      &'a store::Parameters,
    pub tuning:      &'a store::Tuning,
    pub performance: &'a dyn Performance,
    pub winds:       &'a HeadwindRepository,
    pub constraints: &'a ConstraintLists,
    pub atmosphere:  Atmosphere,
}

impl<'a> Context<'a> {
    #[must_use]
    pub fn new(
        params: &'a store::Parameters,
        tuning: &'a store::Tuning,
        performance: &'a dyn Performance,
        winds: &'a HeadwindRepository,
        constraints: &'a ConstraintLists,
    ) -> Self {
        Self {
            params,
            tuning,
            performance,
            winds,
            constraints,
            atmosphere: Atmosphere {
                isa_deviation: params.isa_deviation,
                tropopause:    params.tropopause,
            },
        }
    }

    #[must_use]
    pub fn climb_crossover(&self) -> Altitude {
        self.performance
            .crossover_altitude(self.params.managed_climb_speed, self.params.managed_climb_mach)
    }

    #[must_use]
    pub fn cruise_crossover(&self) -> Altitude {
        self.performance
            .crossover_altitude(self.params.managed_cruise_speed, self.params.managed_cruise_mach)
    }

    #[must_use]
    pub fn descent_crossover(&self) -> Altitude {
        self.performance
            .crossover_altitude(self.params.managed_descent_speed, self.params.managed_descent_mach)
    }

    #[must_use]
    pub fn total_distance(&self) -> Length { self.constraints.total_distance }

    /// The state from which the profile is built.
    ///
    /// Before takeoff this is the takeoff roll on the runway;
    /// afterwards it is the present position, or `None` if no present position is known.
    #[must_use]
    pub fn initial_state(&self) -> Option<AircraftState> {
        let params = self.params;
        let weight = params.zero_fuel_weight + params.fuel_on_board;

        if params.flight_phase <= FlightPhase::Takeoff {
            let speed = params.v2_speed + TAKEOFF_SPEED_MARGIN;
            let state = AircraftState::from_cas(
                &self.atmosphere,
                Length::ZERO,
                params.origin_elevation,
                speed,
                weight,
                Configuration::CLEAN.with_flaps(params.takeoff_flaps).with_gear_down(true),
            );
            return Some(state.with_speed_target(SpeedTarget::Cas(speed)).with_reason("takeoff"));
        }

        let present = params.present_position?;
        let mut state = AircraftState::from_cas(
            &self.atmosphere,
            self.constraints.present_position_distance,
            present.altitude,
            present.calibrated_airspeed,
            weight,
            Configuration::CLEAN.with_flaps(present.flaps),
        );
        state.speed_target = present
            .mach_target
            .map(SpeedTarget::Mach)
            .or(present.speed_target.map(SpeedTarget::Cas));
        Some(state.with_reason("present position"))
    }
}
