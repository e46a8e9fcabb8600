//! Accumulation of checkpoints into per-phase sequences.

use enum_map::EnumMap;
use math::Length;
use strum::IntoEnumIterator;

use crate::pseudo::{McduPseudoWaypoint, NdPseudoWaypoint, Requests};
use crate::reconcile::ReconcileOutcome;
use crate::state::{AircraftState, Phase};


/// The direction in which distance advances during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildDirection {
    /// From the origin toward the destination, as flown.
    Forward,
    /// From the destination toward the origin.
    Backward,
}

impl BuildDirection {
    /// Applies the direction to an unsigned step size.
    #[must_use]
    pub fn signed(self, step: Length) -> Length {
        match self {
            Self::Forward => step.abs(),
            Self::Backward => -step.abs(),
        }
    }

    /// The direction in which to look for the most recent checkpoint.
    #[must_use]
    pub fn scan(self) -> ScanDirection {
        match self {
            Self::Forward => ScanDirection::TowardEarlier,
            Self::Backward => ScanDirection::TowardLater,
        }
    }
}

/// Order in which phases are scanned when looking for the most recent checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// Scan the current phase, then earlier phases.
    TowardEarlier,
    /// Scan the current phase, then later phases.
    TowardLater,
}

/// Mutable context of a single build.
///
/// Segments may only mutate the builder through
/// [`push`](Self::push), [`switch_phase`](Self::switch_phase),
/// [`update_last`](Self::update_last) and the request methods.
/// The origin state passed at construction is the first checkpoint of the origin phase.
pub struct ProfileBuilder {
    phases:    EnumMap<Phase, Option<Vec<AircraftState>>>,
    cursor:    Phase,
    direction: BuildDirection,
    origin:    (Phase, AircraftState),
    requests:  Requests,
    reconcile: Option<ReconcileOutcome>,
}

impl ProfileBuilder {
    #[must_use]
    pub fn new(origin: AircraftState, phase: Phase, direction: BuildDirection) -> Self {
        let mut builder = Self {
            phases: EnumMap::default(),
            cursor: phase,
            direction,
            origin: (phase, origin),
            requests: Requests::default(),
            reconcile: None,
        };
        builder.phases[phase] = Some(vec![origin]);
        builder
    }

    #[must_use]
    pub fn direction(&self) -> BuildDirection { self.direction }

    /// The phase receiving pushed checkpoints.
    #[must_use]
    pub fn phase(&self) -> Phase { self.cursor }

    /// Moves the cursor to `phase`, creating an empty checkpoint list if absent.
    pub fn switch_phase(&mut self, phase: Phase) {
        self.cursor = phase;
        self.phases[phase].get_or_insert_with(Vec::new);
    }

    /// Appends a checkpoint to the current phase.
    pub fn push(&mut self, state: AircraftState) {
        self.phases[self.cursor].get_or_insert_with(Vec::new).push(state);
    }

    pub fn extend(&mut self, states: impl IntoIterator<Item = AircraftState>) {
        self.phases[self.cursor].get_or_insert_with(Vec::new).extend(states);
    }

    /// Resets `phase` to the state it had when the builder was created.
    pub fn reset_phase(&mut self, phase: Phase) {
        let (origin_phase, origin) = self.origin;
        self.phases[phase] = (phase == origin_phase).then(|| vec![origin]);
    }

    /// Resets all phases and restarts the build from a new origin state.
    pub fn reset(&mut self, origin: AircraftState) {
        self.origin.1 = origin;
        for phase in Phase::iter() {
            self.reset_phase(phase);
        }
        self.cursor = self.origin.0;
        self.requests.clear();
        self.reconcile = None;
    }

    /// Drops every checkpoint and request beyond `distance` along track.
    pub fn truncate_after(&mut self, distance: Length) {
        for states in self.phases.values_mut().flatten() {
            states.retain(|state| state.distance <= distance);
        }
        self.requests.retain(|state| state.distance <= distance);
    }

    /// The checkpoints of `phase`, in build order.
    #[must_use]
    pub fn checkpoints(&self, phase: Phase) -> &[AircraftState] {
        self.phases[phase].as_deref().unwrap_or_default()
    }

    /// Phases scanned from the cursor in `direction`.
    fn scan_order(&self, direction: ScanDirection) -> Vec<Phase> {
        let cursor = self.cursor;
        match direction {
            ScanDirection::TowardEarlier => Phase::iter().rev().filter(|&p| p <= cursor).collect(),
            ScanDirection::TowardLater => Phase::iter().filter(|&p| p >= cursor).collect(),
        }
    }

    /// The most recent checkpoint, scanning phases from the cursor in `direction`.
    #[must_use]
    pub fn last_state_scanning(&self, direction: ScanDirection) -> Option<&AircraftState> {
        self.scan_order(direction).into_iter().find_map(|phase| self.phases[phase].as_ref()?.last())
    }

    /// The most recent checkpoint in the direction of the build.
    #[must_use]
    pub fn last_state(&self) -> Option<&AircraftState> {
        self.last_state_scanning(self.direction.scan())
    }

    /// Mutates the most recent checkpoint in the direction of the build.
    ///
    /// Returns `false` if there is no checkpoint.
    pub fn update_last(&mut self, update: impl FnOnce(&mut AircraftState)) -> bool {
        let Some(phase) = self.scan_order(self.direction.scan()).into_iter().find(|&phase| {
            self.phases[phase].as_ref().is_some_and(|states| !states.is_empty())
        }) else {
            return false;
        };
        match self.phases[phase].as_mut().and_then(|states| states.last_mut()) {
            Some(state) => {
                update(state);
                true
            }
            None => false,
        }
    }

    pub fn request_mcdu(&mut self, kind: McduPseudoWaypoint, state: AircraftState) {
        self.requests.request_mcdu(kind, state);
    }

    pub fn request_nd(&mut self, kind: NdPseudoWaypoint, state: AircraftState) {
        self.requests.request_nd(kind, state);
    }

    #[must_use]
    pub fn requests(&self) -> &Requests { &self.requests }

    pub fn requests_mut(&mut self) -> &mut Requests { &mut self.requests }

    /// Removes and returns all queued requests.
    pub fn take_requests(&mut self) -> Requests { std::mem::take(&mut self.requests) }

    pub fn record_reconciliation(&mut self, outcome: ReconcileOutcome) {
        self.reconcile = Some(outcome);
    }

    #[must_use]
    pub fn reconciliation(&self) -> Option<&ReconcileOutcome> { self.reconcile.as_ref() }

    /// Consumes the builder into the checkpoints of each phase.
    #[must_use]
    pub fn finish(self) -> BuiltProfile {
        BuiltProfile {
            phases:    self.phases.map(|_, states| states.unwrap_or_default()),
            requests:  self.requests,
            reconcile: self.reconcile,
        }
    }
}

/// The result of a completed build.
#[derive(Debug, Clone)]
pub struct BuiltProfile {
    pub phases:    EnumMap<Phase, Vec<AircraftState>>,
    pub requests:  Requests,
    pub reconcile: Option<ReconcileOutcome>,
}

impl BuiltProfile {
    /// All checkpoints in flight order.
    ///
    /// Every phase must already be sorted by ascending distance.
    pub fn flattened(&self) -> impl Iterator<Item = &AircraftState> {
        self.phases.values().flatten()
    }
}
