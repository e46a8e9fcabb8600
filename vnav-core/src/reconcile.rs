//! Joining the forward-built cruise with the backward-built descent.
//!
//! The descent is built backward from the landing state,
//! whose weight and time are not known until the cruise has been built.
//! Both are built with a guess, and the guess is corrected by the mismatch at the junction
//! until the mismatch is within tolerance.

use itertools::Itertools;
use math::{Altitude, Length, Mass, Time};
use serde::Serialize;
use store::{FlapSetting, FlightPhase};
use strum::IntoEnumIterator;

use crate::Status;
use crate::builder::{BuildDirection, ProfileBuilder};
use crate::context::Context;
use crate::interpolate;
use crate::pseudo::{McduPseudoWaypoint, NdPseudoWaypoint};
use crate::segment::{Approach, Cruise, ManagedDescent, Segment, walk};
use crate::state::{AircraftState, Configuration, Phase, SpeedTarget};


/// Height above the runway threshold of the landing state.
const THRESHOLD_HEIGHT: Length = Length::from_feet(50.);

/// Fuel expected on board at landing, for the first guess of the landing weight.
const LANDING_FUEL_GUESS: Mass = Mass::from_pounds(2500.);

/// Descent checkpoints this close before the junction are still appended.
const JUNCTION_EPSILON: Length = Length::from_feet(1e-6);

/// Bisections locating the descent intercept between two climb checkpoints.
const INTERCEPT_BISECTIONS: usize = 40;

/// Mismatch between the cruise and the descent at their junction.
///
/// Positive values mean the cruise arrives heavier or later than the descent expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JunctionError {
    pub weight: Mass,
    pub time:   Time,
}

impl JunctionError {
    fn within(&self, tuning: &store::Tuning) -> bool {
        self.weight.abs() <= tuning.reconcile_weight_tolerance
            && self.time.abs() <= tuning.reconcile_time_tolerance
    }
}

/// The result of reconciling the cruise with the descent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileOutcome {
    pub status: Status,
    /// The junction error of each iteration.
    pub errors: Vec<JunctionError>,
}

impl ReconcileOutcome {
    #[must_use]
    pub fn iterations(&self) -> usize { self.errors.len() }

    #[must_use]
    pub fn final_error(&self) -> Option<JunctionError> { self.errors.last().copied() }
}

/// The state at the runway threshold from which the descent is built backward.
#[must_use]
pub fn landing_state(ctx: &Context, time: Time) -> AircraftState {
    let params = ctx.params;
    let flaps = if params.landing_flaps_3 { FlapSetting::Conf3 } else { FlapSetting::Full };
    let altitude: Altitude = params.destination_elevation + THRESHOLD_HEIGHT;
    AircraftState {
        time,
        ..AircraftState::from_cas(
            &ctx.atmosphere,
            ctx.total_distance(),
            altitude,
            params.approach_speed,
            params.zero_fuel_weight + LANDING_FUEL_GUESS,
            Configuration::CLEAN.with_flaps(flaps).with_gear_down(true),
        )
        .with_speed_target(SpeedTarget::Cas(params.approach_speed))
        .with_reason("landing")
    }
}

/// Where the forward-built profile meets the descent.
#[derive(Debug, Clone, Copy)]
enum Junction {
    /// The climb reaches the descent path before leveling off at the cruise altitude.
    Intercept(AircraftState),
    /// A cruise is flown up to the top of descent.
    Cruise,
    /// The present position is already past the top of descent.
    PresentPosition,
}

/// Builds the cruise and the descent after the last checkpoint of `main`
/// and appends them to `main` once their junction agrees.
///
/// If the climb reaches the descent path first, as on a short route,
/// the climb is cut at the intercept and the cruise has no length.
pub fn reconcile(ctx: &Context, main: &mut ProfileBuilder) -> ReconcileOutcome {
    let Some(&cruise_start) = main.last_state() else {
        bevy::log::error!("Cannot build the cruise and descent without a starting state");
        return ReconcileOutcome { status: Status::InputMissing, errors: Vec::new() };
    };
    let cruise_flown = ctx.params.flight_phase <= FlightPhase::Cruise;
    let flown: Vec<AircraftState> =
        Phase::iter().flat_map(|phase| main.checkpoints(phase)).copied().collect();

    let mut landing = landing_state(ctx, Time::ZERO);
    let mut descent = ProfileBuilder::new(landing, Phase::Approach, BuildDirection::Backward);
    let mut cruise = ProfileBuilder::new(cruise_start, Phase::Cruise, BuildDirection::Forward);
    let mut outcome = ReconcileOutcome { status: Status::IterationCapReached, errors: Vec::new() };
    let mut junction = Junction::PresentPosition;

    for _ in 0..ctx.tuning.reconcile_max_iterations {
        descent.reset(landing);
        walk(&Segment::from(Approach), ctx, &mut descent);
        walk(&Segment::from(ManagedDescent), ctx, &mut descent);
        let path = descent_path(&descent);
        let Some(&top_of_descent) = path.first() else {
            outcome.status = Status::InputMissing;
            return outcome;
        };

        junction = if !cruise_flown {
            Junction::PresentPosition
        } else if let Some(intercept) = descent_intercept(&flown, &path) {
            Junction::Intercept(intercept)
        } else if cruise_start.distance >= top_of_descent.distance {
            Junction::PresentPosition
        } else {
            Junction::Cruise
        };

        let arriving = match junction {
            Junction::Intercept(intercept) => intercept,
            Junction::Cruise => {
                cruise.reset(cruise_start);
                walk(
                    &Segment::from(Cruise { to_distance: top_of_descent.distance }),
                    ctx,
                    &mut cruise,
                );
                let Some(&cruise_end) = cruise.last_state() else {
                    outcome.status = Status::InputMissing;
                    return outcome;
                };
                cruise_end
            }
            Junction::PresentPosition => cruise_start,
        };
        let Some(expected) = interpolate::at_distance(&path, arriving.distance) else {
            outcome.status = Status::InputMissing;
            return outcome;
        };

        let error = JunctionError {
            weight: arriving.weight - expected.weight,
            time:   arriving.time - expected.time,
        };
        outcome.errors.push(error);
        bevy::log::debug!("Reconciliation error {error:?} at {junction:?}");
        if error.within(ctx.tuning) {
            outcome.status = Status::Converged;
            break;
        }
        landing.weight += error.weight;
        landing.time += error.time;
    }

    if outcome.status == Status::IterationCapReached {
        bevy::log::warn!(
            "Cruise and descent did not reconcile after {} iterations, last error {:?}",
            outcome.iterations(),
            outcome.final_error(),
        );
    }

    let mut descent_requests = descent.take_requests();
    let joined_at = match junction {
        Junction::Intercept(intercept) => {
            bevy::log::debug!("Climb intercepts the descent path at {:?}", intercept.distance);
            main.truncate_after(intercept.distance);
            main.switch_phase(Phase::Cruise);
            main.push(intercept.with_reason("descent intercept"));
            if !main.requests().mcdu.iter().any(|r| r.kind == McduPseudoWaypoint::TopOfClimb) {
                main.request_mcdu(McduPseudoWaypoint::TopOfClimb, intercept);
                main.request_nd(NdPseudoWaypoint::Level1Climb, intercept);
            }
            descent_requests
                .retain(|state| state.distance >= intercept.distance - JUNCTION_EPSILON);
            descent_requests.request_mcdu(McduPseudoWaypoint::TopOfDescent, intercept);
            descent_requests.request_nd(NdPseudoWaypoint::TopOfDescent1, intercept);
            intercept.distance
        }
        Junction::Cruise => {
            let cruise_states = cruise.checkpoints(Phase::Cruise);
            let joined_at = cruise_states.last().map_or(cruise_start.distance, |last| last.distance);
            main.switch_phase(Phase::Cruise);
            main.extend(cruise_states.iter().skip(1).copied());
            main.requests_mut().extend(cruise.take_requests());
            joined_at
        }
        Junction::PresentPosition => cruise_start.distance,
    };
    for phase in [Phase::Descent, Phase::Approach] {
        main.switch_phase(phase);
        main.extend(
            descent
                .checkpoints(phase)
                .iter()
                .rev()
                .filter(|state| state.distance >= joined_at - JUNCTION_EPSILON)
                .copied(),
        );
    }
    main.requests_mut().extend(descent_requests);

    outcome
}

/// The descent checkpoints by ascending distance, from the top of descent to the landing.
fn descent_path(descent: &ProfileBuilder) -> Vec<AircraftState> {
    descent
        .checkpoints(Phase::Descent)
        .iter()
        .rev()
        .chain(descent.checkpoints(Phase::Approach).iter().rev())
        .copied()
        .collect()
}

/// The first point where the forward-built checkpoints climb onto the descent path.
///
/// `path` is sorted by ascending distance.
/// Before the top of descent and after the landing, the path cannot be intercepted.
fn descent_intercept(flown: &[AircraftState], path: &[AircraftState]) -> Option<AircraftState> {
    let (top, landing) = (path.first()?, path.last()?);
    let on_or_above = |state: &AircraftState| {
        state.distance >= top.distance
            && state.distance <= landing.distance
            && interpolate::at_distance(path, state.distance)
                .is_some_and(|point| state.altitude >= point.altitude)
    };

    flown.iter().tuple_windows().find_map(|(prev, next)| {
        if on_or_above(prev) || !on_or_above(next) {
            return None;
        }
        let (mut below, mut above) = (0., 1.);
        for _ in 0..INTERCEPT_BISECTIONS {
            let mid = f64::midpoint(below, above);
            if on_or_above(&prev.lerp(next, mid)) {
                above = mid;
            } else {
                below = mid;
            }
        }
        Some(prev.lerp(next, above))
    })
}
