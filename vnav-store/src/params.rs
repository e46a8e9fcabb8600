use math::{Altitude, Angle, Mass, Speed, TempDelta, ISA_TROPOPAUSE_ALTITUDE};
use serde::{Deserialize, Serialize};

use crate::FlapSetting;

/// Performance parameters entered into the flight management system.
///
/// The predictor reads this snapshot once per profile computation.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Parameters {
    /// The current flight phase.
    ///
    /// Phases before this one are considered flown and are not predicted.
    #[serde(default)]
    pub flight_phase:              FlightPhase,
    /// Managed climb speed below crossover altitude.
    pub managed_climb_speed:       Speed,
    /// Managed climb Mach number above crossover altitude.
    pub managed_climb_mach:        f64,
    /// Managed cruise speed.
    pub managed_cruise_speed:      Speed,
    /// Managed cruise Mach number.
    pub managed_cruise_mach:       f64,
    /// Managed descent speed below crossover altitude.
    pub managed_descent_speed:     Speed,
    /// Managed descent Mach number above crossover altitude.
    pub managed_descent_mach:      f64,
    /// Cruise flight level.
    pub cruise_altitude:           Altitude,
    /// Speed limit applicable during climb.
    pub climb_speed_limit:         Option<SpeedLimit>,
    /// Speed limit applicable during descent.
    pub descent_speed_limit:       Option<SpeedLimit>,
    /// Minimum speed for flap retraction to configuration 1 ("F" speed).
    pub flap_retraction_speed:     Speed,
    /// Minimum speed for slat retraction ("S" speed).
    pub slat_retraction_speed:     Speed,
    /// Green dot speed, the best lift-to-drag speed in clean configuration.
    pub clean_speed:               Speed,
    /// Takeoff safety speed.
    pub v2_speed:                  Speed,
    /// Final approach speed.
    pub approach_speed:            Speed,
    /// Altitude at which takeoff thrust is reduced to climb thrust.
    pub thrust_reduction_altitude: Altitude,
    /// Altitude at which the aircraft starts accelerating after takeoff.
    pub acceleration_altitude:     Altitude,
    /// Elevation of the departure airfield.
    pub origin_elevation:          Altitude,
    /// Elevation of the destination airfield.
    pub destination_elevation:     Altitude,
    /// Zero fuel weight.
    pub zero_fuel_weight:          Mass,
    /// Fuel on board.
    pub fuel_on_board:             Mass,
    /// Deviation of the outside temperature from ISA.
    #[serde(default)]
    pub isa_deviation:             TempDelta,
    /// Tropopause altitude.
    #[serde(default = "default_tropopause")]
    pub tropopause:                Altitude,
    /// Whether the landing is planned in configuration 3 instead of full.
    #[serde(default)]
    pub landing_flaps_3:           bool,
    /// Flap setting used for takeoff.
    #[serde(default = "default_takeoff_flaps")]
    pub takeoff_flaps:             FlapSetting,
    /// The aircraft state at present position.
    ///
    /// Required when `flight_phase` is after takeoff.
    #[serde(default)]
    pub present_position:          Option<PresentPosition>,
    /// Selections on the flight control unit.
    #[serde(default)]
    pub fcu:                       FcuSelections,
}

fn default_tropopause() -> Altitude { ISA_TROPOPAUSE_ALTITUDE }

fn default_takeoff_flaps() -> FlapSetting { FlapSetting::Conf1F }

/// Flight phases in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[derive(strum::Display)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum FlightPhase {
    /// On ground before takeoff.
    #[default]
    Preflight,
    /// From takeoff thrust application to the acceleration altitude.
    Takeoff,
    /// Climb to the cruise altitude.
    Climb,
    /// Cruise at the cruise altitude, including steps.
    Cruise,
    /// Descent from the top of descent.
    Descent,
    /// Deceleration and approach.
    Approach,
    /// Missed approach.
    GoAround,
    /// Flight completed.
    Done,
}

/// A speed limit below an altitude, such as 250 kt below 10000 ft.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct SpeedLimit {
    /// Maximum calibrated airspeed.
    pub speed:          Speed,
    /// The limit applies below this altitude.
    pub under_altitude: Altitude,
}

/// The aircraft state at present position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PresentPosition {
    /// Current altitude.
    pub altitude:            Altitude,
    /// Current calibrated airspeed.
    pub calibrated_airspeed: Speed,
    /// Current speed target, if a CAS target is active.
    #[serde(default)]
    pub speed_target:        Option<Speed>,
    /// Current Mach target, if a Mach target is active.
    #[serde(default)]
    pub mach_target:         Option<f64>,
    /// Current flap setting.
    #[serde(default)]
    pub flaps:               FlapSetting,
}

/// Selections on the flight control unit, used for tactical predictions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct FcuSelections {
    /// Selected altitude.
    pub altitude:     Option<Altitude>,
    /// Selected speed. `None` if the speed is managed.
    pub speed:        Option<Speed>,
    /// Selected vertical mode.
    #[serde(default)]
    pub vertical:     SelectedVerticalMode,
}

/// A selected vertical mode.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum SelectedVerticalMode {
    /// Open climb at climb thrust.
    #[default]
    OpenClimb,
    /// Expedite climb at climb thrust and green dot speed.
    Expedite,
    /// Hold a vertical speed.
    VerticalSpeed(Speed),
    /// Hold a flight path angle.
    FlightPathAngle(Angle),
}
