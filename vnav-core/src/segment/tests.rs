use math::{Altitude, Length, Mass, Speed};
use store::{AltitudeConstraint, ConstraintSegment, CruiseStep, FlapSetting};

use super::{
    ApproachAltitudeConstraint, Climb, ClimbRequest, ConfigurationChange, Cruise, IdlePath,
    PathPoint, Segment, path_angle_range, plan_geometric_path, speed_chain, walk,
};
use crate::builder::{BuildDirection, ProfileBuilder};
use crate::constraints::{AltitudeRestriction, MaxSpeed};
use crate::pseudo::McduPseudoWaypoint;
use crate::state::{AircraftState, Configuration, Phase, SpeedTarget};
use crate::test_util::Fixture;

fn nm(value: f64) -> Length { Length::from_nm(value) }

fn feet(value: f64) -> Altitude { Altitude::from_feet(value) }

fn knots(value: f64) -> Speed { Speed::from_knots(value) }

fn builder_at(
    fixture: &Fixture,
    distance: f64,
    altitude: f64,
    cas: Speed,
    phase: Phase,
    direction: BuildDirection,
) -> ProfileBuilder {
    let origin = AircraftState::from_cas(
        &fixture.ctx().atmosphere,
        nm(distance),
        feet(altitude),
        cas,
        Mass::from_pounds(145_000.),
        Configuration::CLEAN,
    );
    ProfileBuilder::new(origin, phase, direction)
}

fn assert_monotonic(states: &[AircraftState], direction: BuildDirection) {
    for pair in states.windows(2) {
        match direction {
            BuildDirection::Forward => {
                assert!(pair[1].distance >= pair[0].distance, "{pair:?}");
                assert!(pair[1].time >= pair[0].time, "{pair:?}");
            }
            BuildDirection::Backward => {
                assert!(pair[1].distance <= pair[0].distance, "{pair:?}");
                assert!(pair[1].time <= pair[0].time, "{pair:?}");
            }
        }
    }
}

fn max_speed(distance: f64, speed: f64) -> MaxSpeed {
    MaxSpeed { distance: nm(distance), speed: knots(speed) }
}

#[test]
fn speed_chain_binds_points_after_each_constraint() {
    let links = speed_chain(
        [max_speed(20., 250.), max_speed(10., 200.), max_speed(40., 180.)],
        nm(30.),
        Some(nm(5.)),
        knots(280.),
    );

    let summary: Vec<_> =
        links.iter().map(|link| (link.speed.into_knots(), link.until.map(Length::into_nm))).collect();
    assert_eq!(summary.len(), 3);
    math::assert_approx_f64(summary[0].0, 200., 1e-9).unwrap();
    math::assert_approx_f64(summary[0].1.unwrap(), 20., 1e-9).unwrap();
    math::assert_approx_f64(summary[1].0, 200., 1e-9).unwrap();
    math::assert_approx_f64(summary[1].1.unwrap(), 10., 1e-9).unwrap();
    math::assert_approx_f64(summary[2].0, 280., 1e-9).unwrap();
    math::assert_approx_f64(summary[2].1.unwrap(), 5., 1e-9).unwrap();
}

#[test]
fn speed_chain_without_constraints() {
    let links = speed_chain([max_speed(50., 200.)], nm(30.), None, knots(250.));
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].speed, knots(250.));
    assert_eq!(links[0].until, None);
}

#[test]
fn geometric_path_splits_at_violated_constraint() {
    let restriction = AltitudeRestriction {
        distance:   nm(250.),
        constraint: AltitudeConstraint::AtOrBelow { altitude: feet(10000.) },
    };
    let start = PathPoint { distance: nm(300.), altitude: feet(1500.) };
    let end = PathPoint { distance: nm(150.), altitude: feet(35000.) };

    let legs = plan_geometric_path(&[restriction], start, end, Length::from_feet(250.), 10);
    assert_eq!(legs.len(), 2);
    legs[0].end.distance.assert_approx(nm(250.), nm(1e-9)).unwrap();
    legs[0].end.altitude.assert_approx(feet(10000.), Length::from_feet(1e-6)).unwrap();
    assert_eq!(legs[1].end, end);

    let unconstrained = plan_geometric_path(&[], start, end, Length::from_feet(250.), 10);
    assert_eq!(unconstrained.len(), 1);
    assert!(legs[0].fpa.into_degrees() < 0.);
    assert!(legs[0].fpa.into_degrees() >= unconstrained[0].fpa.into_degrees());
}

#[test]
fn geometric_path_keeps_line_meeting_constraints() {
    let restriction = AltitudeRestriction {
        distance:   nm(250.),
        constraint: AltitudeConstraint::Range { low: feet(10000.), high: feet(14000.) },
    };
    let start = PathPoint { distance: nm(300.), altitude: feet(1500.) };
    let end = PathPoint { distance: nm(150.), altitude: feet(35000.) };

    let legs = plan_geometric_path(&[restriction], start, end, Length::from_feet(250.), 10);
    assert_eq!(legs.len(), 1);
    assert_eq!(legs[0].end, end);
}

#[test]
fn geometric_path_depth_is_capped() {
    let restriction = AltitudeRestriction {
        distance:   nm(250.),
        constraint: AltitudeConstraint::AtOrBelow { altitude: feet(10000.) },
    };
    let start = PathPoint { distance: nm(300.), altitude: feet(1500.) };
    let end = PathPoint { distance: nm(150.), altitude: feet(35000.) };

    let legs = plan_geometric_path(&[restriction], start, end, Length::from_feet(250.), 0);
    assert_eq!(legs.len(), 1);
    assert_eq!(legs[0].end, end);

    assert!(plan_geometric_path(&[restriction], end, start, Length::from_feet(250.), 10).is_empty());
}

#[test]
fn managed_climb_respects_speed_limit_and_levels_off() {
    let fixture = Fixture::calm();
    let ctx = fixture.ctx();
    let mut builder =
        builder_at(&fixture, 0., 0., knots(250.), Phase::Climb, BuildDirection::Forward);
    walk(
        &Segment::from(Climb { request: ClimbRequest::managed(ctx.params), gated: true }),
        &ctx,
        &mut builder,
    );

    let climb = builder.checkpoints(Phase::Climb);
    assert_monotonic(climb, BuildDirection::Forward);
    for state in climb.iter().filter(|state| state.altitude < feet(9999.)) {
        assert!(state.cas <= knots(250.) + knots(1e-6), "{state:?}");
    }
    assert!(climb.iter().any(|state| (state.cas - knots(300.)).abs() < knots(1e-6)));

    let top = climb.last().unwrap();
    top.altitude.assert_approx(feet(35000.), Length::from_feet(1e-6)).unwrap();

    let mcdu = &builder.requests().mcdu;
    assert!(mcdu.iter().any(|request| request.kind == McduPseudoWaypoint::TopOfClimb));
    let limit = mcdu.iter().find(|request| request.kind == McduPseudoWaypoint::SpeedLimit).unwrap();
    assert_eq!(limit.speed_constraint, Some(knots(250.)));
    limit.state.altitude.assert_approx(feet(10000.), Length::from_feet(1e-6)).unwrap();
}

#[test]
fn managed_climb_levels_off_below_constraint() {
    let fixture = Fixture::calm().with_route(|route| {
        route.waypoints[2].segment = ConstraintSegment::Climb;
        route.waypoints[2].altitude_constraint =
            Some(AltitudeConstraint::AtOrBelow { altitude: feet(5000.) });
    });
    let ctx = fixture.ctx();
    let mut builder =
        builder_at(&fixture, 0., 0., knots(250.), Phase::Climb, BuildDirection::Forward);
    walk(
        &Segment::from(Climb { request: ClimbRequest::managed(ctx.params), gated: true }),
        &ctx,
        &mut builder,
    );

    let climb = builder.checkpoints(Phase::Climb);
    assert_monotonic(climb, BuildDirection::Forward);
    for state in climb.iter().filter(|state| state.distance < nm(28.) - nm(1e-9)) {
        assert!(state.altitude <= feet(5000.) + Length::from_feet(1e-6), "{state:?}");
    }
    let level = crate::interpolate::at_distance(climb, nm(20.)).unwrap();
    level.altitude.assert_approx(feet(5000.), Length::from_feet(1e-6)).unwrap();
    climb.last().unwrap().altitude.assert_approx(feet(35000.), Length::from_feet(1e-6)).unwrap();
}

#[test]
fn climb_is_skipped_after_climb_phase() {
    let fixture = Fixture::calm().with_params(|params| params.flight_phase = store::FlightPhase::Cruise);
    let ctx = fixture.ctx();
    let mut builder =
        builder_at(&fixture, 100., 35000., knots(270.), Phase::Cruise, BuildDirection::Forward);
    walk(
        &Segment::from(Climb { request: ClimbRequest::managed(ctx.params), gated: true }),
        &ctx,
        &mut builder,
    );
    assert!(builder.checkpoints(Phase::Climb).is_empty());
    assert_eq!(builder.checkpoints(Phase::Cruise).len(), 1);
}

#[test]
fn cruise_flies_step_climb() {
    let fixture = Fixture::calm().with_route(|route| {
        route.waypoints[4].cruise_step = Some(CruiseStep { to_altitude: feet(37000.), ignored: false });
    });
    let ctx = fixture.ctx();
    let cas = ctx.atmosphere.mach_to_cas(0.78, feet(35000.));
    let mut builder = builder_at(&fixture, 150., 35000., cas, Phase::Cruise, BuildDirection::Forward);
    walk(&Segment::from(Cruise { to_distance: nm(250.) }), &ctx, &mut builder);

    let cruise = builder.checkpoints(Phase::Cruise);
    assert_monotonic(cruise, BuildDirection::Forward);
    let at_step = crate::interpolate::at_distance(cruise, nm(168.)).unwrap();
    at_step.altitude.assert_approx(feet(35000.), Length::from_feet(1e-6)).unwrap();
    math::assert_approx_f64(at_step.mach, 0.78, 1e-9).unwrap();

    let last = cruise.last().unwrap();
    last.distance.assert_approx(nm(250.), nm(1e-9)).unwrap();
    last.altitude.assert_approx(feet(37000.), Length::from_feet(1e-6)).unwrap();

    let step = builder
        .requests()
        .mcdu
        .iter()
        .find(|request| request.kind == McduPseudoWaypoint::StepClimb)
        .unwrap();
    step.state.distance.assert_approx(nm(168.), nm(1e-9)).unwrap();
}

#[test]
fn idle_path_climbs_back_to_cruise_altitude() {
    let fixture = Fixture::calm();
    let ctx = fixture.ctx();
    let mut builder =
        builder_at(&fixture, 300., 3000., knots(250.), Phase::Descent, BuildDirection::Backward);
    walk(&Segment::from(IdlePath), &ctx, &mut builder);

    let descent = builder.checkpoints(Phase::Descent);
    assert_monotonic(descent, BuildDirection::Backward);
    for pair in descent.windows(2) {
        assert!(pair[1].altitude >= pair[0].altitude, "{pair:?}");
    }
    for state in descent {
        assert!(state.cas <= knots(290.) + knots(1e-6), "{state:?}");
        if state.altitude < feet(9999.) {
            assert!(state.cas <= knots(250.) + knots(1e-6), "{state:?}");
        }
    }

    let top = descent.last().unwrap();
    top.altitude.assert_approx(feet(35000.), Length::from_feet(1e-6)).unwrap();
    assert!(matches!(top.speed_target, Some(SpeedTarget::Mach(_))));
    assert!(top.weight > descent[0].weight);
}

#[test]
fn configuration_change_requests_marker() {
    let fixture = Fixture::calm();
    let ctx = fixture.ctx();
    let mut builder =
        builder_at(&fixture, 300., 3000., knots(200.), Phase::Approach, BuildDirection::Backward);
    let config = Configuration::CLEAN.with_flaps(FlapSetting::Conf1);
    walk(
        &Segment::from(ConfigurationChange { config, request: Some(McduPseudoWaypoint::Flap2) }),
        &ctx,
        &mut builder,
    );

    let approach = builder.checkpoints(Phase::Approach);
    assert_eq!(approach.len(), 2);
    assert_eq!(approach[1].config, config);
    assert_eq!(approach[1].distance, approach[0].distance);
    assert_eq!(builder.requests().mcdu[0].kind, McduPseudoWaypoint::Flap2);
}

#[test]
fn approach_constraint_holds_path_up_to_range() {
    let fixture = Fixture::calm();
    let ctx = fixture.ctx();
    let mut builder =
        builder_at(&fixture, 312.5, 2600., knots(200.), Phase::Approach, BuildDirection::Backward);
    let restriction = AltitudeRestriction {
        distance:   nm(303.),
        constraint: AltitudeConstraint::Range { low: feet(5000.), high: feet(9000.) },
    };
    walk(
        &Segment::from(ApproachAltitudeConstraint { restriction, max_speed: knots(210.) }),
        &ctx,
        &mut builder,
    );

    let approach = builder.checkpoints(Phase::Approach);
    assert_monotonic(approach, BuildDirection::Backward);
    let last = approach.last().unwrap();
    last.distance.assert_approx(nm(303.), nm(1e-6)).unwrap();
    assert!(last.altitude >= feet(5000.), "{last:?}");
    assert!(last.altitude <= feet(9000.), "{last:?}");
    assert!(last.cas <= knots(210.) + knots(1e-6), "{last:?}");
}

#[test]
fn approach_constraint_at_speed_is_left_to_later_segments() {
    let fixture = Fixture::calm();
    let ctx = fixture.ctx();
    let mut builder =
        builder_at(&fixture, 312.5, 2600., knots(210.), Phase::Approach, BuildDirection::Backward);
    let restriction = AltitudeRestriction {
        distance:   nm(303.),
        constraint: AltitudeConstraint::AtOrAbove { altitude: feet(5000.) },
    };
    walk(
        &Segment::from(ApproachAltitudeConstraint { restriction, max_speed: knots(210.) }),
        &ctx,
        &mut builder,
    );
    assert_eq!(builder.checkpoints(Phase::Approach).len(), 1);
}

#[test]
fn approach_path_angles_stay_inside_bounds() {
    let run = Length::from_feet(60_000.);
    let margin = Length::from_feet(125.);

    let (steepest, shallowest) = path_angle_range(
        AltitudeConstraint::Range { low: feet(5000.), high: feet(9000.) },
        feet(3000.),
        run,
        margin,
    );
    math::assert_approx_f64(steepest.tan(), -5875. / 60_000., 1e-9).unwrap();
    math::assert_approx_f64(shallowest.tan(), -2125. / 60_000., 1e-9).unwrap();

    let (steepest, shallowest) = path_angle_range(
        AltitudeConstraint::Range { low: feet(5000.), high: feet(5100.) },
        feet(3000.),
        run,
        margin,
    );
    math::assert_approx_f64(steepest.tan(), shallowest.tan(), 1e-9).unwrap();

    let (steepest, shallowest) =
        path_angle_range(AltitudeConstraint::AtOrBelow { altitude: feet(4000.) }, feet(3000.), run, margin);
    math::assert_approx_f64(steepest.tan(), -875. / 60_000., 1e-9).unwrap();
    assert_eq!(shallowest.into_degrees(), 0.);
}
