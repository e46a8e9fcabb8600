use math::{Altitude, Atmosphere, Length, Mass, Speed, Time};
use serde::Serialize;
use store::FlapSetting;

/// A flight phase, also used as the key of the per-phase checkpoint map.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    enum_map::Enum,
    strum::Display,
    strum::EnumIter,
)]
pub enum Phase {
    Preflight,
    Takeoff,
    Climb,
    Cruise,
    Descent,
    Approach,
    GoAround,
    Done,
}

impl From<store::FlightPhase> for Phase {
    fn from(phase: store::FlightPhase) -> Self {
        match phase {
            store::FlightPhase::Preflight => Self::Preflight,
            store::FlightPhase::Takeoff => Self::Takeoff,
            store::FlightPhase::Climb => Self::Climb,
            store::FlightPhase::Cruise => Self::Cruise,
            store::FlightPhase::Descent => Self::Descent,
            store::FlightPhase::Approach => Self::Approach,
            store::FlightPhase::GoAround => Self::GoAround,
            store::FlightPhase::Done => Self::Done,
        }
    }
}

/// High-lift, speedbrake and landing gear configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub flaps:       FlapSetting,
    pub speedbrakes: bool,
    pub gear_down:   bool,
}

impl Configuration {
    pub const CLEAN: Self =
        Self { flaps: FlapSetting::Clean, speedbrakes: false, gear_down: false };

    #[must_use]
    pub fn with_flaps(self, flaps: FlapSetting) -> Self { Self { flaps, ..self } }

    #[must_use]
    pub fn with_speedbrakes(self, speedbrakes: bool) -> Self { Self { speedbrakes, ..self } }

    #[must_use]
    pub fn with_gear_down(self, gear_down: bool) -> Self { Self { gear_down, ..self } }
}

/// The speed the guidance would be holding at a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SpeedTarget {
    Cas(Speed),
    Mach(f64),
}

impl SpeedTarget {
    #[must_use]
    pub fn is_mach(self) -> bool { matches!(self, Self::Mach(_)) }
}

/// A point-in-time sample along the predicted path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AircraftState {
    /// Distance along track from the origin.
    pub distance:     Length,
    pub altitude:     Altitude,
    /// Elapsed time since the start of the build.
    pub time:         Time,
    pub cas:          Speed,
    pub tas:          Speed,
    pub mach:         f64,
    pub ground_speed: Speed,
    pub weight:       Mass,
    pub config:       Configuration,
    pub speed_target: Option<SpeedTarget>,
    /// Why this checkpoint was emitted, for diagnostics.
    pub reason:       Option<&'static str>,
}

impl AircraftState {
    /// Creates a state from its calibrated airspeed, deriving Mach and TAS from `atmosphere`.
    ///
    /// Ground speed is initialized to TAS; the propagator accounts for wind.
    #[must_use]
    pub fn from_cas(
        atmosphere: &Atmosphere,
        distance: Length,
        altitude: Altitude,
        cas: Speed,
        weight: Mass,
        config: Configuration,
    ) -> Self {
        let mach = atmosphere.cas_to_mach(cas, altitude);
        let tas = atmosphere.mach_to_tas(mach, altitude);
        Self {
            distance,
            altitude,
            time: Time::ZERO,
            cas,
            tas,
            mach,
            ground_speed: tas,
            weight,
            config,
            speed_target: None,
            reason: None,
        }
    }

    /// Interpolates the scalar fields linearly between `self` and `other`.
    ///
    /// Discrete fields are taken from `self`.
    #[must_use]
    pub fn lerp(&self, other: &Self, s: f64) -> Self {
        Self {
            distance: self.distance.lerp(other.distance, s),
            altitude: self.altitude.lerp(other.altitude, s),
            time: self.time.lerp(other.time, s),
            cas: self.cas.lerp(other.cas, s),
            tas: self.tas.lerp(other.tas, s),
            mach: self.mach + (other.mach - self.mach) * s,
            ground_speed: self.ground_speed.lerp(other.ground_speed, s),
            weight: self.weight.lerp(other.weight, s),
            ..*self
        }
    }

    #[must_use]
    pub fn with_reason(self, reason: &'static str) -> Self {
        Self { reason: Some(reason), ..self }
    }

    #[must_use]
    pub fn with_speed_target(self, target: SpeedTarget) -> Self {
        Self { speed_target: Some(target), ..self }
    }

    #[must_use]
    pub fn with_config(self, config: Configuration) -> Self { Self { config, ..self } }
}
