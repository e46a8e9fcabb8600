//! Schema for prediction scenario files.

#![warn(clippy::pedantic)]
#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]
#![allow(clippy::collapsible_else_if)] // this is usually intentional
#![allow(clippy::missing_panics_doc)] // 5:21 PM conrad.lock().expect("luscious")[tty0] : Worst clippy lint
#![cfg_attr(not(feature = "precommit-checks"), allow(dead_code, unused_variables, unused_imports))]
#![cfg_attr(feature = "rust-analyzer", warn(warnings, clippy::pedantic, clippy::dbg_macro))]
#![forbid(missing_docs)]

use serde::{Deserialize, Serialize};

mod aircraft;
pub use aircraft::*;

mod params;
pub use params::*;

mod route;
pub use route::*;

mod wind;
pub use wind::*;

mod tuning;
pub use tuning::*;

pub mod sample;

mod validate;
pub use validate::ValidationError;

#[cfg(test)]
mod tests;

/// Root structure for a scenario file.
///
/// A scenario is everything needed to compute one vertical profile:
/// the aircraft, the pilot entries, the route and the forecast winds.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Scenario {
    /// Metadata about the scenario.
    #[serde(default)]
    pub meta:       Meta,
    /// Performance model of the aircraft.
    pub aircraft:   AircraftModel,
    /// Snapshot of performance parameters entered into the flight management system.
    pub parameters: Parameters,
    /// The lateral route with its vertical constraints.
    pub route:      Route,
    /// Forecast headwinds per flight phase.
    #[serde(default)]
    pub winds:      Winds,
    /// Numeric tunables of the predictor.
    #[serde(default)]
    pub tuning:     Tuning,
}

/// Metadata about a scenario.
#[derive(Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Meta {
    /// Short name of the scenario.
    #[serde(default)]
    pub title:       String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}
