//! Headwind profiles along the predicted path.

use enum_map::EnumMap;
use math::{Altitude, Length, Speed};
use ordered_float::OrderedFloat;
use store::WindLevel;

use crate::state::Phase;


/// Signed headwind component as a function of position.
pub trait HeadwindProfile {
    /// Negative values are tailwinds.
    fn headwind(&self, distance: Length, altitude: Altitude) -> Speed;
}

/// A headwind profile interpolated linearly in altitude from entered levels.
#[derive(Debug, Clone, Default)]
pub struct TabulatedHeadwind {
    /// Sorted by ascending altitude.
    levels: Vec<WindLevel>,
}

impl TabulatedHeadwind {
    #[must_use]
    pub fn new(mut levels: Vec<WindLevel>) -> Self {
        levels.sort_by_key(|level| OrderedFloat(level.altitude.into_feet()));
        Self { levels }
    }
}

impl HeadwindProfile for TabulatedHeadwind {
    fn headwind(&self, _distance: Length, altitude: Altitude) -> Speed {
        let upper_index = self.levels.partition_point(|level| level.altitude <= altitude);
        match (upper_index.checked_sub(1).map(|i| &self.levels[i]), self.levels.get(upper_index)) {
            (None, None) => Speed::ZERO,
            (Some(only), None) | (None, Some(only)) => only.headwind,
            (Some(lower), Some(upper)) => {
                let s = altitude.amsl().ratio_between(lower.altitude.amsl(), upper.altitude.amsl());
                lower.headwind.lerp(upper.headwind, s)
            }
        }
    }
}

/// Which entered wind profile applies to a part of the flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, enum_map::Enum, strum::Display)]
pub enum WindSelector {
    Climb,
    Cruise,
    Descent,
}

impl From<Phase> for WindSelector {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Preflight | Phase::Takeoff | Phase::Climb | Phase::GoAround => Self::Climb,
            Phase::Cruise => Self::Cruise,
            Phase::Descent | Phase::Approach | Phase::Done => Self::Descent,
        }
    }
}

/// The headwind profiles of all flight phases.
pub struct HeadwindRepository {
    profiles: EnumMap<WindSelector, Box<dyn HeadwindProfile + Send + Sync>>,
}

impl HeadwindRepository {
    #[must_use]
    pub fn new(profiles: EnumMap<WindSelector, Box<dyn HeadwindProfile + Send + Sync>>) -> Self {
        Self { profiles }
    }

    /// A repository with no wind in any phase.
    #[must_use]
    pub fn calm() -> Self {
        Self::new(EnumMap::from_fn(|_| {
            Box::new(TabulatedHeadwind::default()) as Box<dyn HeadwindProfile + Send + Sync>
        }))
    }

    #[must_use]
    pub fn from_store(winds: &store::Winds) -> Self {
        Self::new(EnumMap::from_fn(|selector| {
            let levels = match selector {
                WindSelector::Climb => &winds.climb,
                WindSelector::Cruise => &winds.cruise,
                WindSelector::Descent => &winds.descent,
            };
            Box::new(TabulatedHeadwind::new(levels.clone()))
                as Box<dyn HeadwindProfile + Send + Sync>
        }))
    }

    #[must_use]
    pub fn headwind(&self, selector: WindSelector, distance: Length, altitude: Altitude) -> Speed {
        self.profiles[selector].headwind(distance, altitude)
    }
}
