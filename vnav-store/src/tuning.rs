use math::{Length, Mass, Speed, Time};
use serde::{Deserialize, Serialize};

/// Numeric tunables of the predictor.
///
/// The defaults are suitable for all scenarios;
/// overriding them is mostly useful for tests and experiments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Tuning {
    /// Maximum number of propagation steps in one integration.
    pub integrator_max_steps:      usize,
    /// Maximum number of cruise/descent reconciliation iterations.
    pub reconcile_max_iterations:  usize,
    /// Reconciliation is converged when the weight error is within this tolerance.
    pub reconcile_weight_tolerance: Mass,
    /// Reconciliation is converged when the time error is within this tolerance.
    pub reconcile_time_tolerance:  Time,
    /// Maximum recursion depth when bisecting the geometric descent path.
    pub geometric_max_depth:       usize,
    /// Distance advanced by each propagation step.
    pub step_size:                 Length,
    /// Distance advanced by each propagation step in cruise.
    pub cruise_step_size:          Length,
    /// Altitude constraints are considered met within this tolerance.
    pub altitude_tolerance:        Length,
    /// Speed constraints are considered met within this tolerance.
    pub speed_tolerance:           Speed,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            integrator_max_steps:       1000,
            reconcile_max_iterations:   4,
            reconcile_weight_tolerance: Mass::from_pounds(1.0),
            reconcile_time_tolerance:   Time::from_seconds(1.0),
            geometric_max_depth:        10,
            step_size:                  Length::from_nm(0.1),
            cruise_step_size:           Length::from_nm(1.0),
            altitude_tolerance:         Length::from_feet(250.0),
            speed_tolerance:            Speed::from_knots(5.0),
        }
    }
}
