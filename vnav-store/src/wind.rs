use math::{Altitude, Speed};
use serde::{Deserialize, Serialize};

/// Forecast headwinds entered per flight phase.
///
/// Each list is interpolated linearly in altitude and held constant beyond its ends.
/// An empty list means no wind.
#[derive(Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Winds {
    /// Headwinds during takeoff and climb.
    #[serde(default)]
    pub climb:   Vec<WindLevel>,
    /// Headwinds during cruise.
    #[serde(default)]
    pub cruise:  Vec<WindLevel>,
    /// Headwinds during descent and approach.
    #[serde(default)]
    pub descent: Vec<WindLevel>,
}

/// The headwind component at an altitude.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct WindLevel {
    /// Altitude of the entry.
    pub altitude: Altitude,
    /// Headwind component. Negative for tailwinds.
    pub headwind: Speed,
}
