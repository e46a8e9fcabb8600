//! Profile management and waypoint predictions.
//!
//! [`ProfileManager`] owns the inputs of a build and the last built profile.
//! In a bevy app it is a resource rebuilt by [`Plug`] upon [`RebuildMessage`]s.

use bevy::app::{self, App, Plugin};
use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::ecs::resource::Resource;
use bevy::ecs::system::ResMut;
use math::{Altitude, Length, Speed, Time};
use serde::Serialize;

use crate::Status;
use crate::builder::{BuildDirection, BuiltProfile, ProfileBuilder};
use crate::constraints::{AltitudeConstraintExt, ConstraintReader, SpeedConstraintExt};
use crate::context::Context;
use crate::interpolate;
use crate::perf::{ParametricPerformance, Performance};
use crate::pseudo::{self, McduPseudoWaypoint, NdPseudoWaypoint, Placement, Request};
use crate::segment::{McduProfile, Segment, walk};
use crate::state::{AircraftState, Phase};
use crate::tactical::{TacticalProfile, TacticalRequest};
use crate::try_log_return;
use crate::wind::HeadwindRepository;


pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.add_message::<RebuildMessage>();
        app.add_message::<ProfileUpdatedMessage>();
        app.add_systems(app::Update, rebuild_system);
    }
}

/// Requests a rebuild of the profile, optionally with new inputs.
///
/// Messages received in the same frame are coalesced into one rebuild
/// using the latest input of each kind.
#[derive(Message, Default)]
pub struct RebuildMessage {
    pub route:      Option<store::Route>,
    pub parameters: Option<Box<store::Parameters>>,
}

/// Sent after each rebuild.
#[derive(Message, Debug, Clone, Copy)]
pub struct ProfileUpdatedMessage {
    pub version: u64,
    pub status:  Status,
}

fn rebuild_system(
    mut messages: MessageReader<RebuildMessage>,
    manager: Option<ResMut<ProfileManager>>,
    mut updated: MessageWriter<ProfileUpdatedMessage>,
) {
    let mut requested = false;
    let mut route = None;
    let mut parameters = None;
    for message in messages.read() {
        requested = true;
        if let Some(new_route) = &message.route {
            route = Some(new_route.clone());
        }
        if let Some(new_parameters) = &message.parameters {
            parameters = Some(new_parameters.clone());
        }
    }
    if !requested {
        return;
    }

    let mut manager =
        try_log_return!(manager, expect "Profile rebuild requested without a profile manager");
    if let Some(parameters) = parameters {
        manager.set_parameters(*parameters);
    }
    let status = match route {
        Some(route) => manager.update_profile(&route),
        None => manager.rebuild(),
    };
    updated.write(ProfileUpdatedMessage { version: manager.version(), status });
}

/// Builds the flight management profile from the initial state.
#[must_use]
pub fn build_profile(ctx: &Context) -> (Status, Option<BuiltProfile>) {
    let waypoints = ctx.constraints.waypoint_count;
    if waypoints < 2 {
        bevy::log::warn!("Cannot build a profile along a route of {waypoints} waypoints");
        return (Status::InputMissing, None);
    }
    let Some(origin) = ctx.initial_state() else {
        bevy::log::warn!("Cannot build a profile without a present position");
        return (Status::InputMissing, None);
    };

    let mut builder =
        ProfileBuilder::new(origin, Phase::from(ctx.params.flight_phase), BuildDirection::Forward);
    walk(&Segment::from(McduProfile), ctx, &mut builder);
    let status = builder.reconciliation().map_or(Status::Converged, |outcome| outcome.status);
    let profile = builder.finish();
    bevy::log::debug!(
        "Built profile with {} checkpoints: {status}",
        profile.flattened().count()
    );
    (status, Some(profile))
}

/// Owns the inputs of the predictor and the last built profile.
#[derive(Resource)]
pub struct ProfileManager {
    performance: Box<dyn Performance + Send + Sync>,
    winds:       HeadwindRepository,
    params:      store::Parameters,
    tuning:      store::Tuning,
    route:       store::Route,
    reader:      ConstraintReader,
    profile:     Option<BuiltProfile>,
    status:      Status,
    version:     u64,
}

impl ProfileManager {
    /// Creates a manager without building a profile.
    #[must_use]
    pub fn new(
        performance: Box<dyn Performance + Send + Sync>,
        winds: HeadwindRepository,
        params: store::Parameters,
        tuning: store::Tuning,
        route: store::Route,
    ) -> Self {
        Self {
            performance,
            winds,
            params,
            tuning,
            reader: ConstraintReader::new(&route),
            route,
            profile: None,
            status: Status::InputMissing,
            version: 0,
        }
    }

    #[must_use]
    pub fn from_scenario(scenario: &store::Scenario) -> Self {
        Self::new(
            Box::new(ParametricPerformance::new(scenario.aircraft.clone())),
            HeadwindRepository::from_store(&scenario.winds),
            scenario.parameters.clone(),
            scenario.tuning.clone(),
            scenario.route.clone(),
        )
    }

    fn context(&self) -> Context<'_> {
        Context::new(
            &self.params,
            &self.tuning,
            &*self.performance,
            &self.winds,
            self.reader.lists(),
        )
    }

    /// Replaces the parameter snapshot read by the next build.
    pub fn set_parameters(&mut self, params: store::Parameters) { self.params = params; }

    #[must_use]
    pub fn params(&self) -> &store::Parameters { &self.params }

    /// Re-reads the route and rebuilds the whole profile.
    pub fn update_profile(&mut self, route: &store::Route) -> Status {
        self.route = route.clone();
        self.reader.update_geometry(route);
        self.rebuild()
    }

    /// Moves the present position along the route without re-reading its geometry.
    ///
    /// Takes effect on the next build.
    pub fn update_present_position(
        &mut self,
        active_leg_index: usize,
        distance_to_active_terminator: Length,
    ) {
        self.route.active_leg_index = active_leg_index;
        self.route.distance_to_active_terminator = distance_to_active_terminator;
        self.reader.update_present_position(&self.route);
    }

    /// Rebuilds the profile from the current inputs.
    pub fn rebuild(&mut self) -> Status {
        let (status, profile) = build_profile(&self.context());
        self.profile = profile;
        self.status = status;
        self.version += 1;
        status
    }

    /// Incremented by each rebuild.
    #[must_use]
    pub fn version(&self) -> u64 { self.version }

    #[must_use]
    pub fn status(&self) -> Status { self.status }

    /// The last built profile, or `None` before the first build.
    #[must_use]
    pub fn profile(&self) -> Option<&BuiltProfile> { self.profile.as_ref() }

    #[must_use]
    pub fn constraint_reader(&self) -> &ConstraintReader { &self.reader }

    #[must_use]
    pub fn crossovers(&self) -> Crossovers {
        let ctx = self.context();
        Crossovers {
            climb:   ctx.climb_crossover(),
            cruise:  ctx.cruise_crossover(),
            descent: ctx.descent_crossover(),
        }
    }

    /// Predicts the state over the waypoint at `index`.
    ///
    /// Returns `None` before the first build or if the waypoint does not exist.
    #[must_use]
    pub fn waypoint_prediction(&self, index: usize) -> Option<WaypointPrediction> {
        let profile = self.profile.as_ref()?;
        let waypoint = self.route.waypoints.get(index)?;
        let distance = self.reader.waypoint_distance(index)?;

        let states: Vec<AircraftState> = profile.flattened().copied().collect();
        let state = interpolate::at_distance(&states, distance)?;

        let crossovers = self.crossovers();
        let crossover = match phase_at(profile, distance) {
            Phase::Preflight | Phase::Takeoff | Phase::Climb => crossovers.climb,
            Phase::Cruise => crossovers.cruise,
            Phase::Descent | Phase::Approach | Phase::GoAround | Phase::Done => crossovers.descent,
        };
        let speed = if state.altitude >= crossover {
            PredictedSpeed::Mach(state.mach)
        } else {
            PredictedSpeed::Cas(state.cas)
        };

        let tolerance = self.tuning.altitude_tolerance;
        let speed_tolerance = self.tuning.speed_tolerance;
        Some(WaypointPrediction {
            index,
            distance,
            time: state.time,
            altitude: state.altitude,
            speed,
            altitude_constraint_met: waypoint
                .altitude_constraint
                .map(|constraint| constraint.is_met(state.altitude, tolerance)),
            speed_constraint_met: waypoint
                .speed_constraint
                .map(|constraint| constraint.is_met(state.cas, speed_tolerance)),
            altitude_error: waypoint
                .altitude_constraint
                .map_or(Length::ZERO, |constraint| constraint.error(state.altitude)),
        })
    }

    /// Places a pseudo-waypoint at `distance` from the origin.
    ///
    /// Logs a warning and returns `None` if the distance is not on a leg.
    #[must_use]
    pub fn place_pseudo_waypoint(&self, distance: Length) -> Option<Placement> {
        match pseudo::place(self.reader.legs(), self.reader.waypoint_distances(), distance) {
            Ok(placement) => Some(placement),
            Err(err) => {
                bevy::log::warn!("Skipping pseudo-waypoint: {err}");
                None
            }
        }
    }

    /// Removes the pseudo-waypoint requests of the last build and places them on the route.
    ///
    /// Requests that cannot be placed are skipped.
    pub fn drain_requests(&mut self) -> PlacedRequests {
        let Some(profile) = self.profile.as_mut() else { return PlacedRequests::default() };
        let requests = std::mem::take(&mut profile.requests);
        PlacedRequests {
            mcdu: requests.mcdu.into_iter().filter_map(|request| self.place_request(request)).collect(),
            nd:   requests.nd.into_iter().filter_map(|request| self.place_request(request)).collect(),
        }
    }

    fn place_request<K>(&self, request: Request<K>) -> Option<PlacedRequest<K>> {
        let placement = self.place_pseudo_waypoint(request.state.distance)?;
        Some(PlacedRequest { request, placement })
    }

    /// Predicts a climb in the modes selected on the flight control unit.
    #[must_use]
    pub fn tactical(&self) -> TacticalProfile {
        TacticalProfile::predict(&self.context(), &TacticalRequest::from(&self.params.fcu))
    }
}

/// The phase containing `distance`, by the last checkpoint of each phase.
fn phase_at(profile: &BuiltProfile, distance: Length) -> Phase {
    profile
        .phases
        .iter()
        .find(|(_, states)| states.last().is_some_and(|last| last.distance >= distance))
        .map_or(Phase::Done, |(phase, _)| phase)
}

/// Crossover altitudes of the managed speeds of each phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Crossovers {
    pub climb:   Altitude,
    pub cruise:  Altitude,
    pub descent: Altitude,
}

/// The speed displayed for a prediction, in Mach above the crossover altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PredictedSpeed {
    Cas(Speed),
    Mach(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaypointPrediction {
    pub index:                   usize,
    pub distance:                Length,
    pub time:                    Time,
    pub altitude:                Altitude,
    pub speed:                   PredictedSpeed,
    /// `None` if the waypoint has no altitude constraint.
    pub altitude_constraint_met: Option<bool>,
    /// `None` if the waypoint has no speed constraint.
    pub speed_constraint_met:    Option<bool>,
    /// Signed distance from the predicted altitude to the constraint bounds, zero if absent.
    pub altitude_error:          Length,
}

/// A pseudo-waypoint request with its position on the route.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlacedRequest<K> {
    pub request:   Request<K>,
    pub placement: Placement,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlacedRequests {
    pub mcdu: Vec<PlacedRequest<McduPseudoWaypoint>>,
    pub nd:   Vec<PlacedRequest<NdPseudoWaypoint>>,
}
