//! Lookup of states between checkpoints.

use itertools::Itertools;
use math::{Altitude, Length};

use crate::state::AircraftState;


/// Interpolates the state at `distance` in checkpoints sorted by ascending distance.
///
/// Distances outside the checkpoints are clamped to the first or last checkpoint.
#[must_use]
pub fn at_distance(states: &[AircraftState], distance: Length) -> Option<AircraftState> {
    let first = states.first()?;
    let last = states.last()?;
    if distance <= first.distance {
        return Some(*first);
    }
    if distance >= last.distance {
        return Some(*last);
    }

    let upper = states.partition_point(|state| state.distance < distance);
    let (prev, next) = (&states[upper - 1], &states[upper]);
    Some(prev.lerp(next, distance.ratio_between(prev.distance, next.distance)))
}

/// Like [`at_distance`], for checkpoints sorted by descending distance.
#[must_use]
pub fn at_distance_descending(
    states: &[AircraftState],
    distance: Length,
) -> Option<AircraftState> {
    let first = states.first()?;
    let last = states.last()?;
    if distance >= first.distance {
        return Some(*first);
    }
    if distance <= last.distance {
        return Some(*last);
    }

    let upper = states.partition_point(|state| state.distance > distance);
    let (prev, next) = (&states[upper - 1], &states[upper]);
    Some(prev.lerp(next, distance.ratio_between(prev.distance, next.distance)))
}

/// Finds the first point where the checkpoints climb through `altitude`.
#[must_use]
pub fn climbing_through(states: &[AircraftState], altitude: Altitude) -> Option<AircraftState> {
    states.iter().tuple_windows().find_map(|(prev, next)| {
        (prev.altitude < altitude && next.altitude >= altitude).then(|| {
            prev.lerp(next, altitude.amsl().ratio_between(prev.altitude.amsl(), next.altitude.amsl()))
        })
    })
}
