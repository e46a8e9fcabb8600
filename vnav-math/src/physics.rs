//! Standard atmosphere and airspeed conversions used by vertical predictions.

use crate::{Accel, Altitude, Length, Pressure, Speed, Temp, TempDelta};


/// Altitude of the tropopause in the standard atmosphere.
pub const ISA_TROPOPAUSE_ALTITUDE: Altitude = Altitude::from_feet(36089.24);

/// Standard pressure at sea level.
pub const ISA_SEA_LEVEL_PRESSURE: Pressure = Pressure::from_pascals(101325.0);

/// Standard sea level temperature.
pub const ISA_SEA_LEVEL_TEMPERATURE: Temp = Temp::from_kelvins(288.15);

/// Standard temperature lapse rate in K/ft.
pub const ISA_LAPSE_RATE_PER_FOOT: f64 = 0.0019812;

/// Speed of sound at ISA sea level.
pub const SEA_LEVEL_SPEED_OF_SOUND: Speed = Speed::from_knots(661.4786);

/// Standard gravity at Earth's surface.
pub const EARTH_SURFACE_GRAVITY: Accel = Accel::from_meters_per_sec2(9.80665);

/// Ratio of specific heats of dry air.
const GAMMA: f64 = 1.4;

/// `g0 / (R * L)`, the exponent of the tropospheric pressure ratio.
const TROPOSPHERE_PRESSURE_EXPONENT: f64 = 5.2558797;

/// `L / T0` per foot.
const TROPOSPHERE_LAPSE_FACTOR: f64 = 6.8755856e-6;

/// `g0 / (R * T_tropopause)` per foot, the exponential decay of pressure above the tropopause.
const STRATOSPHERE_DECAY_PER_FOOT: f64 = 4.806346e-5;

/// `kappa * R * L / (2 * g0)` in SI units, with the sign of a temperature decreasing with
/// altitude.
const ENERGY_SHARE_LAPSE_TERM: f64 = -0.133184;

/// Which speed is held constant while the altitude changes.
///
/// This determines how excess thrust is shared between altitude and speed changes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize, serde::Deserialize,
)]
pub enum AccelFactorMode {
    ConstantCas,
    ConstantMach,
}

/// Atmospheric conditions along the predicted path.
///
/// All methods are pure functions of the altitude and the configured deviations.
#[derive(Debug, Clone, Copy)]
pub struct Atmosphere {
    /// Deviation of the actual temperature from ISA at all altitudes.
    pub isa_deviation: TempDelta,
    /// Altitude above which the temperature stops decreasing.
    pub tropopause:    Altitude,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self { isa_deviation: TempDelta::ZERO, tropopause: ISA_TROPOPAUSE_ALTITUDE }
    }
}

impl Atmosphere {
    fn is_above_tropopause(&self, altitude: Altitude) -> bool { altitude > self.tropopause }

    /// Standard temperature at `altitude`, without the ISA deviation.
    #[must_use]
    pub fn isa_temperature(&self, altitude: Altitude) -> Temp {
        let capped = altitude.min(self.tropopause).max(Altitude::SEA_LEVEL);
        ISA_SEA_LEVEL_TEMPERATURE
            - TempDelta::from_kelvins(ISA_LAPSE_RATE_PER_FOOT * capped.into_feet())
    }

    /// Outside air temperature at `altitude`.
    #[must_use]
    pub fn temperature(&self, altitude: Altitude) -> Temp {
        self.isa_temperature(altitude) + self.isa_deviation
    }

    /// Temperature ratio `T / T0`.
    #[must_use]
    pub fn theta(&self, altitude: Altitude) -> f64 {
        self.temperature(altitude) / ISA_SEA_LEVEL_TEMPERATURE
    }

    /// Pressure ratio `p / p0`.
    #[must_use]
    pub fn delta(&self, altitude: Altitude) -> f64 {
        if self.is_above_tropopause(altitude) {
            let tropopause_delta = troposphere_delta(self.tropopause);
            tropopause_delta
                * (-STRATOSPHERE_DECAY_PER_FOOT * (altitude - self.tropopause).into_feet()).exp()
        } else {
            troposphere_delta(altitude)
        }
    }

    #[must_use]
    pub fn pressure(&self, altitude: Altitude) -> Pressure {
        ISA_SEA_LEVEL_PRESSURE * self.delta(altitude)
    }

    /// Inverse of [`delta`](Self::delta), assuming the standard tropopause pressure.
    #[must_use]
    pub fn altitude_for_delta(&self, delta: f64) -> Altitude {
        let tropopause_delta = troposphere_delta(self.tropopause);
        if delta < tropopause_delta {
            self.tropopause
                + Length::from_feet((delta / tropopause_delta).ln() / -STRATOSPHERE_DECAY_PER_FOOT)
        } else {
            Altitude::from_feet(
                (1. - delta.powf(TROPOSPHERE_PRESSURE_EXPONENT.recip())) / TROPOSPHERE_LAPSE_FACTOR,
            )
        }
    }

    #[must_use]
    pub fn speed_of_sound(&self, altitude: Altitude) -> Speed {
        SEA_LEVEL_SPEED_OF_SOUND * self.theta(altitude).sqrt()
    }

    #[must_use]
    pub fn cas_to_mach(&self, cas: Speed, altitude: Altitude) -> f64 {
        let impact_ratio = impact_pressure_ratio_from_cas(cas);
        mach_from_impact_ratio(impact_ratio / self.delta(altitude))
    }

    #[must_use]
    pub fn mach_to_cas(&self, mach: f64, altitude: Altitude) -> Speed {
        let impact_ratio = impact_pressure_ratio_from_mach(mach) * self.delta(altitude);
        SEA_LEVEL_SPEED_OF_SOUND * mach_from_impact_ratio(impact_ratio)
    }

    #[must_use]
    pub fn mach_to_tas(&self, mach: f64, altitude: Altitude) -> Speed {
        self.speed_of_sound(altitude) * mach
    }

    #[must_use]
    pub fn tas_to_mach(&self, tas: Speed, altitude: Altitude) -> f64 {
        tas / self.speed_of_sound(altitude)
    }

    #[must_use]
    pub fn cas_to_tas(&self, cas: Speed, altitude: Altitude) -> Speed {
        self.mach_to_tas(self.cas_to_mach(cas, altitude), altitude)
    }

    #[must_use]
    pub fn tas_to_cas(&self, tas: Speed, altitude: Altitude) -> Speed {
        self.mach_to_cas(self.tas_to_mach(tas, altitude), altitude)
    }

    /// Total air temperature sensed at `mach`.
    #[must_use]
    pub fn total_air_temperature(&self, altitude: Altitude, mach: f64) -> Temp {
        let static_temp = self.temperature(altitude);
        Temp::from_kelvins(static_temp.into_kelvins() * (1. + 0.2 * mach * mach))
    }

    /// Altitude at which `cas` and `mach` correspond to the same true airspeed.
    ///
    /// Climbing at constant CAS, Mach increases until it reaches `mach` at this altitude.
    /// The result does not depend on temperature.
    #[must_use]
    pub fn crossover_altitude(&self, cas: Speed, mach: f64) -> Altitude {
        let delta = impact_pressure_ratio_from_cas(cas) / impact_pressure_ratio_from_mach(mach);
        self.altitude_for_delta(delta)
    }

    /// Factor dividing the available gradient to obtain the climb gradient.
    ///
    /// This is the reciprocal of the energy share factor:
    /// a factor of 1 means all excess thrust is converted into altitude change.
    #[must_use]
    pub fn acceleration_factor(&self, mach: f64, altitude: Altitude, mode: AccelFactorMode) -> f64 {
        let above_tropopause = self.is_above_tropopause(altitude);
        let temperature_ratio = self.isa_temperature(altitude) / self.temperature(altitude);
        let mach2 = mach * mach;

        let lapse_term = if above_tropopause {
            0.
        } else {
            ENERGY_SHARE_LAPSE_TERM * mach2 * temperature_ratio
        };

        let cas_term = match mode {
            AccelFactorMode::ConstantMach => 0.,
            AccelFactorMode::ConstantCas => {
                let base = 1. + (GAMMA - 1.) / 2. * mach2;
                base.powf(-1. / (GAMMA - 1.)) * (base.powf(GAMMA / (GAMMA - 1.)) - 1.)
            }
        };

        1. + lapse_term + cas_term
    }
}

fn troposphere_delta(altitude: Altitude) -> f64 {
    (1. - TROPOSPHERE_LAPSE_FACTOR * altitude.into_feet()).powf(TROPOSPHERE_PRESSURE_EXPONENT)
}

/// `qc / p0` for a calibrated airspeed.
fn impact_pressure_ratio_from_cas(cas: Speed) -> f64 {
    let ratio = cas / SEA_LEVEL_SPEED_OF_SOUND;
    (1. + 0.2 * ratio * ratio).powf(3.5) - 1.
}

/// `qc / p` for a Mach number.
fn impact_pressure_ratio_from_mach(mach: f64) -> f64 { (1. + 0.2 * mach * mach).powf(3.5) - 1. }

/// Inverse of [`impact_pressure_ratio_from_mach`].
fn mach_from_impact_ratio(impact_ratio: f64) -> f64 {
    (5. * ((impact_ratio + 1.).powf(2. / 7.) - 1.)).max(0.).sqrt()
}
