//! Repeated propagation until a boundary condition.

use math::{Altitude, Length, Mass, Speed, Time};
use smallvec::SmallVec;

use crate::Status;
use crate::context::Context;
use crate::propagate::{ControlLaw, PropagatorOptions, propagate};
use crate::state::AircraftState;

#[cfg(test)]
mod tests;

/// Bounds are considered reached within this tolerance, in the internal unit of the field.
const BOUND_EPSILON: f64 = 1e-9;

/// A scalar field of [`AircraftState`] that an end condition can bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum StateField {
    Altitude,
    Distance,
    Cas,
    Mach,
    Tas,
    Time,
    Weight,
}

impl StateField {
    fn get(self, state: &AircraftState) -> f64 {
        match self {
            Self::Altitude => state.altitude.amsl().into_raw(),
            Self::Distance => state.distance.into_raw(),
            Self::Cas => state.cas.into_raw(),
            Self::Mach => state.mach,
            Self::Tas => state.tas.into_raw(),
            Self::Time => state.time.into_raw(),
            Self::Weight => state.weight.into_raw(),
        }
    }
}

/// Terminates an integration when `field` reaches `min` or `max`.
#[derive(Debug, Clone, Copy)]
pub struct EndCondition {
    pub field: StateField,
    pub min:   Option<f64>,
    pub max:   Option<f64>,
}

impl EndCondition {
    fn is_satisfied(&self, state: &AircraftState) -> bool {
        let value = self.field.get(state);
        self.max.is_some_and(|max| value >= max - BOUND_EPSILON)
            || self.min.is_some_and(|min| value <= min + BOUND_EPSILON)
    }

    /// Fraction of the step from `prev` to `next` at which a bound is crossed.
    fn crossing_fraction(&self, prev: &AircraftState, next: &AircraftState) -> Option<f64> {
        if !self.is_satisfied(next) {
            return None;
        }

        let (prev_value, next_value) = (self.field.get(prev), self.field.get(next));
        let bound = match (self.min, self.max) {
            (_, Some(max)) if next_value >= max - BOUND_EPSILON => max,
            (Some(min), _) => min,
            (None, None) => return None,
            (None, Some(max)) => max,
        };
        Some(math::inverse_lerp(prev_value, next_value, bound).clamp(0., 1.))
    }
}

/// A set of end conditions, any of which terminates the integration.
#[derive(Debug, Clone, Default)]
pub struct EndConditions(SmallVec<[EndCondition; 4]>);

macro_rules! bound_builders {
    ($($min_fn:ident, $max_fn:ident: $field:ident, $ty:ty, $raw:expr;)*) => {
        $(
            #[must_use]
            pub fn $min_fn(self, value: $ty) -> Self { self.with(StateField::$field, Some($raw(value)), None) }

            #[must_use]
            pub fn $max_fn(self, value: $ty) -> Self { self.with(StateField::$field, None, Some($raw(value))) }
        )*
    }
}

impl EndConditions {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with(mut self, field: StateField, min: Option<f64>, max: Option<f64>) -> Self {
        self.0.push(EndCondition { field, min, max });
        self
    }

    bound_builders! {
        altitude_min, altitude_max: Altitude, Altitude, |v: Altitude| v.amsl().into_raw();
        distance_min, distance_max: Distance, Length, Length::into_raw;
        cas_min, cas_max: Cas, Speed, Speed::into_raw;
        mach_min, mach_max: Mach, f64, |v: f64| v;
        tas_min, tas_max: Tas, Speed, Speed::into_raw;
        time_min, time_max: Time, Time, Time::into_raw;
        weight_min, weight_max: Weight, Mass, Mass::into_raw;
    }

    /// Adds a minimum distance bound if `value` is `Some`.
    #[must_use]
    pub fn distance_min_opt(self, value: Option<Length>) -> Self {
        match value {
            Some(value) => self.distance_min(value),
            None => self,
        }
    }

    /// Adds a maximum distance bound if `value` is `Some`.
    #[must_use]
    pub fn distance_max_opt(self, value: Option<Length>) -> Self {
        match value {
            Some(value) => self.distance_max(value),
            None => self,
        }
    }

    #[must_use]
    pub fn is_satisfied(&self, state: &AircraftState) -> bool {
        self.0.iter().any(|cond| cond.is_satisfied(state))
    }

    fn earliest_crossing(&self, prev: &AircraftState, next: &AircraftState) -> Option<f64> {
        self.0
            .iter()
            .filter_map(|cond| cond.crossing_fraction(prev, next))
            .min_by(f64::total_cmp)
    }
}

/// States visited by an integration.
#[derive(Debug, Clone)]
pub struct Integration {
    /// The first state is the starting state and the last state is the terminal state.
    pub states: Vec<AircraftState>,
    pub status: Status,
}

impl Integration {
    #[must_use]
    pub fn last(&self) -> &AircraftState {
        // `states` always contains at least the starting state.
        &self.states[self.states.len() - 1]
    }

    /// Whether the integration advanced beyond its starting state.
    #[must_use]
    pub fn advanced(&self) -> bool { self.states.len() > 1 }

    /// The states after the starting state.
    #[must_use]
    pub fn advanced_states(&self) -> &[AircraftState] { &self.states[1..] }
}

/// Propagates `start` under `law` until any of `ends` is satisfied.
///
/// The last step is rescaled by linear interpolation so that the terminal state lies on the
/// earliest crossed bound.
/// After `ctx.tuning.integrator_max_steps` steps the integration stops at the last computed
/// state with [`Status::IterationCapReached`].
#[must_use]
pub fn integrate(
    ctx: &Context,
    start: AircraftState,
    law: ControlLaw,
    options: &PropagatorOptions,
    ends: &EndConditions,
) -> Integration {
    let mut states = vec![start];
    if ends.is_satisfied(&start) {
        return Integration { states, status: Status::Converged };
    }

    let mut prev = start;
    for _ in 0..ctx.tuning.integrator_max_steps {
        let next = propagate(ctx, &prev, law, options);
        if let Some(fraction) = ends.earliest_crossing(&prev, &next) {
            states.push(prev.lerp(&next, fraction));
            return Integration { states, status: Status::Converged };
        }
        states.push(next);
        prev = next;
    }

    bevy::log::warn!(
        "Integration under {law:?} stopped after {} steps at {:?}",
        ctx.tuning.integrator_max_steps,
        prev.distance,
    );
    Integration { states, status: Status::IterationCapReached }
}
