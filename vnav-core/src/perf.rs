//! Aircraft performance seam.

use math::{Altitude, Atmosphere, Force, FuelFlow, Mass, Speed};

use crate::state::Configuration;

#[cfg(test)]
mod tests;

/// Sea-level standard pressure in pounds per square foot.
const SEA_LEVEL_PRESSURE_PSF: f64 = 2116.22;

/// Half of the specific heat ratio of air, used for the dynamic pressure `0.7 * p * M^2`.
const HALF_GAMMA: f64 = 0.7;

/// Coefficient of the compressibility drag rise above the critical Mach number.
const COMPRESSIBILITY_DRAG_FACTOR: f64 = 20.;

/// An engine rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ThrustSetting {
    Takeoff,
    Climb,
    Idle,
}

#[derive(Debug, Clone, Copy)]
pub struct ThrustAndFuelFlow {
    pub thrust:    Force,
    pub fuel_flow: FuelFlow,
}

/// Aerodynamic and engine performance of an aircraft.
///
/// `delta` and `theta` are the pressure and temperature ratios at the current altitude.
pub trait Performance {
    fn drag(&self, weight: Mass, mach: f64, delta: f64, config: Configuration) -> Force;

    fn thrust_and_fuel_flow(
        &self,
        setting: ThrustSetting,
        mach: f64,
        delta: f64,
        theta: f64,
    ) -> ThrustAndFuelFlow;

    /// Fuel flow required to produce `thrust`.
    fn fuel_flow_for_thrust(&self, thrust: Force, mach: f64, delta: f64, theta: f64) -> FuelFlow;

    /// Altitude at which climbing at `cas` reaches `mach`.
    fn crossover_altitude(&self, cas: Speed, mach: f64) -> Altitude {
        Atmosphere::default().crossover_altitude(cas, mach)
    }
}

/// Performance computed from the parametric [`store::AircraftModel`].
pub struct ParametricPerformance {
    model: store::AircraftModel,
}

impl ParametricPerformance {
    #[must_use]
    pub fn new(model: store::AircraftModel) -> Self { Self { model } }

    #[must_use]
    pub fn model(&self) -> &store::AircraftModel { &self.model }

    fn rating_ratio(&self, setting: ThrustSetting) -> f64 {
        match setting {
            ThrustSetting::Takeoff => self.model.takeoff_thrust_ratio,
            ThrustSetting::Climb => self.model.climb_thrust_ratio,
            ThrustSetting::Idle => self.model.idle_thrust_ratio,
        }
    }

    fn available_thrust(&self, ratio: f64, mach: f64, delta: f64) -> Force {
        let [mach_linear, mach_square] = self.model.thrust_mach_lapse;
        let mach_lapse = (1. + mach_linear * mach + mach_square * mach * mach).max(0.);
        self.model.max_thrust * (ratio * delta.powf(self.model.thrust_lapse) * mach_lapse)
    }
}

impl Performance for ParametricPerformance {
    fn drag(&self, weight: Mass, mach: f64, delta: f64, config: Configuration) -> Force {
        let dynamic_pressure = HALF_GAMMA * SEA_LEVEL_PRESSURE_PSF * delta * mach * mach;
        let reference_force = dynamic_pressure * self.model.wing_area;
        if reference_force <= 0. {
            return Force::ZERO;
        }

        // a mass in pounds is numerically its weight in pounds-force
        let lift_coef = weight.into_pounds() / reference_force;

        let polar = self.model.drag_polars.get(config.flaps);
        let mut drag_coef = polar.cd0 + polar.k * lift_coef * lift_coef;
        if config.gear_down {
            drag_coef += self.model.gear_drag;
        }
        if config.speedbrakes {
            drag_coef += self.model.speedbrake_drag;
        }
        if mach > self.model.critical_mach {
            drag_coef += COMPRESSIBILITY_DRAG_FACTOR * (mach - self.model.critical_mach).powi(4);
        }

        Force::from_pounds_force(reference_force * drag_coef)
    }

    fn thrust_and_fuel_flow(
        &self,
        setting: ThrustSetting,
        mach: f64,
        delta: f64,
        theta: f64,
    ) -> ThrustAndFuelFlow {
        let thrust = self.available_thrust(self.rating_ratio(setting), mach, delta);
        ThrustAndFuelFlow { thrust, fuel_flow: self.fuel_flow_for_thrust(thrust, mach, delta, theta) }
    }

    fn fuel_flow_for_thrust(&self, thrust: Force, _mach: f64, delta: f64, theta: f64) -> FuelFlow {
        let flow = FuelFlow::from_pounds_per_hour(
            self.model.tsfc * thrust.into_pounds_force() * theta.max(0.).sqrt(),
        );
        flow.max(self.model.idle_fuel_flow * delta)
    }
}
