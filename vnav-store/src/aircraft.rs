use math::{Force, FuelFlow};
use serde::{Deserialize, Serialize};

/// A parametric aircraft performance model.
///
/// Drag follows a parabolic polar per flap setting with a compressibility rise above the critical
/// Mach number; thrust lapses with pressure ratio and Mach number; fuel flow is proportional to
/// thrust.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct AircraftModel {
    /// Display name of the aircraft type.
    pub name:                 String,
    /// Reference wing area in square feet.
    pub wing_area:            f64,
    /// Total static thrust of all engines at sea level, at maximum rating.
    pub max_thrust:           Force,
    /// Fraction of `max_thrust` available at takeoff rating.
    #[serde(default = "default_takeoff_thrust_ratio")]
    pub takeoff_thrust_ratio: f64,
    /// Fraction of `max_thrust` available at climb rating.
    pub climb_thrust_ratio:   f64,
    /// Fraction of `max_thrust` produced at flight idle.
    pub idle_thrust_ratio:    f64,
    /// Exponent applied to the pressure ratio for the altitude lapse of thrust.
    pub thrust_lapse:         f64,
    /// Coefficients `[a, b]` of the Mach lapse of thrust, `1 + a * M + b * M^2`.
    pub thrust_mach_lapse:    [f64; 2],
    /// Thrust specific fuel consumption at sea level, in pounds per hour per pound-force.
    pub tsfc:                 f64,
    /// Minimum fuel flow of all engines at sea level.
    pub idle_fuel_flow:       FuelFlow,
    /// Drag polars per flap setting.
    pub drag_polars:          DragPolars,
    /// Drag coefficient increment with the landing gear extended.
    pub gear_drag:            f64,
    /// Drag coefficient increment with speedbrakes extended.
    pub speedbrake_drag:      f64,
    /// Mach number above which compressibility drag applies.
    pub critical_mach:        f64,
}

fn default_takeoff_thrust_ratio() -> f64 { 1.0 }

/// Parabolic drag polars `CD = cd0 + k * CL^2` for each flap setting.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct DragPolars {
    /// Polar with flaps and slats retracted.
    pub clean:  DragPolar,
    /// Polar in configuration 1.
    pub conf1:  DragPolar,
    /// Polar in configuration 1+F.
    pub conf1f: DragPolar,
    /// Polar in configuration 2.
    pub conf2:  DragPolar,
    /// Polar in configuration 3.
    pub conf3:  DragPolar,
    /// Polar in configuration full.
    pub full:   DragPolar,
}

impl DragPolars {
    /// Returns the polar for a flap setting.
    #[must_use]
    pub fn get(&self, flaps: FlapSetting) -> DragPolar {
        match flaps {
            FlapSetting::Clean => self.clean,
            FlapSetting::Conf1 => self.conf1,
            FlapSetting::Conf1F => self.conf1f,
            FlapSetting::Conf2 => self.conf2,
            FlapSetting::Conf3 => self.conf3,
            FlapSetting::Full => self.full,
        }
    }
}

/// A parabolic drag polar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct DragPolar {
    /// Zero-lift drag coefficient.
    pub cd0: f64,
    /// Induced drag factor.
    pub k:   f64,
}

/// Flap and slat configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[derive(strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum FlapSetting {
    /// Flaps and slats retracted.
    #[default]
    Clean,
    /// Slats extended.
    Conf1,
    /// Slats and flaps in the takeoff position 1+F.
    Conf1F,
    /// Configuration 2.
    Conf2,
    /// Configuration 3.
    Conf3,
    /// Landing configuration.
    Full,
}
