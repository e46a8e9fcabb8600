//! Short-horizon climb predictions for the modes selected on the flight control unit.

use math::{Altitude, Speed};
use store::{FcuSelections, FlightPhase, SelectedVerticalMode};

use crate::Status;
use crate::builder::{BuildDirection, BuiltProfile, ProfileBuilder};
use crate::context::Context;
use crate::perf::ThrustSetting;
use crate::propagate::{ControlLaw, PitchTarget};
use crate::segment::{Climb, ClimbRequest, Segment, Takeoff, walk};
use crate::state::Phase;


/// A climb in a selected vertical mode.
#[derive(Debug, Clone, Copy)]
pub struct TacticalRequest {
    pub mode:           SelectedVerticalMode,
    pub to_altitude:    Option<Altitude>,
    /// `None` if the speed is managed.
    pub selected_speed: Option<Speed>,
}

impl From<&FcuSelections> for TacticalRequest {
    fn from(fcu: &FcuSelections) -> Self {
        Self { mode: fcu.vertical, to_altitude: fcu.altitude, selected_speed: fcu.speed }
    }
}

impl TacticalRequest {
    fn climb_request(&self, params: &store::Parameters, to_altitude: Altitude) -> ClimbRequest {
        let (climb_law, accel_law) = match self.mode {
            SelectedVerticalMode::OpenClimb | SelectedVerticalMode::Expedite => (
                ControlLaw::ConstantThrust(ThrustSetting::Climb),
                ControlLaw::Acceleration(ThrustSetting::Climb),
            ),
            SelectedVerticalMode::VerticalSpeed(speed) => pitch_laws(PitchTarget::VerticalSpeed(speed)),
            SelectedVerticalMode::FlightPathAngle(angle) => {
                pitch_laws(PitchTarget::FlightPathAngle(angle))
            }
        };
        let expedite = matches!(self.mode, SelectedVerticalMode::Expedite);
        let max_speed = if expedite {
            params.clean_speed
        } else {
            self.selected_speed.unwrap_or(params.managed_climb_speed)
        };

        ClimbRequest {
            climb_law,
            accel_law,
            max_speed,
            max_mach: params.managed_climb_mach,
            to_altitude,
            speed_limit: params.climb_speed_limit,
            obey_constraints: self.selected_speed.is_none() && !expedite,
        }
    }
}

fn pitch_laws(pitch: PitchTarget) -> (ControlLaw, ControlLaw) {
    (
        ControlLaw::ConstantPitch(pitch),
        ControlLaw::SpeedChange { pitch, thrust: ThrustSetting::Climb, accelerating: true },
    )
}

/// The predicted climb to the selected altitude.
#[derive(Debug, Clone)]
pub struct TacticalProfile {
    /// `Converged` if the selected altitude is reached,
    /// `IterationCapReached` if the climb stops short of it.
    pub status:  Status,
    pub profile: Option<BuiltProfile>,
}

impl TacticalProfile {
    /// Predicts a climb from the initial state in the mode of `request`.
    #[must_use]
    pub fn predict(ctx: &Context, request: &TacticalRequest) -> Self {
        let Some(to_altitude) = request.to_altitude else {
            bevy::log::warn!("No altitude selected for the tactical climb");
            return Self { status: Status::InputMissing, profile: None };
        };
        let Some(origin) = ctx.initial_state() else {
            bevy::log::warn!("No initial state for the tactical climb");
            return Self { status: Status::InputMissing, profile: None };
        };

        let on_ground = ctx.params.flight_phase <= FlightPhase::Takeoff;
        let origin_phase =
            if on_ground { Phase::from(ctx.params.flight_phase) } else { Phase::Climb };
        let mut builder = ProfileBuilder::new(origin, origin_phase, BuildDirection::Forward);
        if on_ground {
            walk(&Segment::from(Takeoff), ctx, &mut builder);
        }
        walk(
            &Segment::from(Climb {
                request: request.climb_request(ctx.params, to_altitude),
                gated:   false,
            }),
            ctx,
            &mut builder,
        );

        let reached = builder
            .last_state()
            .is_some_and(|last| last.altitude >= to_altitude - ctx.tuning.altitude_tolerance);
        Self {
            status:  if reached { Status::Converged } else { Status::IterationCapReached },
            profile: Some(builder.finish()),
        }
    }
}
