use math::{Altitude, Length, Speed};
use store::{
    AltitudeConstraint, ConstraintSegment, CruiseStep, SpeedConstraint, SpeedConstraintKind,
};

use super::{
    AltitudeConstraintExt, ClimbConstraint, ConstraintReader, SpeedConstraintExt,
    climb_constraints_descending,
};

fn feet(value: f64) -> Altitude { Altitude::from_feet(value) }

#[test]
fn sample_route_distances() {
    let reader = ConstraintReader::new(&store::sample::route());
    let expected = [0., 8., 28., 88., 168., 238., 278., 303., 315., 321.];
    assert_eq!(reader.waypoint_distances().len(), expected.len());
    for (&actual, expect) in reader.waypoint_distances().iter().zip(expected) {
        actual.assert_approx(Length::from_nm(expect), Length::from_nm(1e-9)).unwrap();
    }
    reader.lists().total_distance.assert_approx(Length::from_nm(321.), Length::from_nm(1e-9)).unwrap();
    assert_eq!(reader.ident(8), Some("FAF"));
    assert_eq!(reader.ident(10), None);
}

#[test]
fn sample_route_lists() {
    let reader = ConstraintReader::new(&store::sample::route());
    let lists = reader.lists();

    // DEP01 is at-or-above and does not cap the climb.
    assert!(lists.climb_altitude.is_empty());
    assert!(lists.climb_speed.is_empty());
    assert!(lists.cruise_steps.is_empty());

    let descent: Vec<_> = lists.descent_altitude.iter().map(|c| c.distance.into_nm()).collect();
    assert_eq!(descent.len(), 3);
    math::assert_approx_f64(descent[0], 278., 1e-9).unwrap();
    math::assert_approx_f64(descent[1], 303., 1e-9).unwrap();
    math::assert_approx_f64(descent[2], 315., 1e-9).unwrap();

    assert_eq!(lists.descent_speed.len(), 1);
    lists.descent_speed[0].speed.assert_approx(Speed::from_knots(230.), Speed::from_knots(1e-9)).unwrap();
}

#[test]
fn present_position_from_active_leg() {
    let mut route = store::sample::route();
    let mut reader = ConstraintReader::new(&route);
    reader.lists().present_position_distance.assert_approx(Length::ZERO, Length::from_nm(1e-9)).unwrap();

    route.active_leg_index = 3;
    route.distance_to_active_terminator = Length::from_nm(15.);
    reader.update_present_position(&route);
    reader
        .lists()
        .present_position_distance
        .assert_approx(Length::from_nm(73.), Length::from_nm(1e-9))
        .unwrap();

    route.active_leg_index = 42;
    reader.update_present_position(&route);
    assert_eq!(reader.lists().present_position_distance, Length::ZERO);
}

#[test]
fn filters_placeholder_and_minimum_speeds() {
    let mut route = store::sample::route();
    route.waypoints[1].speed_constraint =
        Some(SpeedConstraint { kind: SpeedConstraintKind::AtOrBelow, speed: Speed::from_knots(90.) });
    route.waypoints[2].segment = ConstraintSegment::Climb;
    route.waypoints[2].speed_constraint =
        Some(SpeedConstraint { kind: SpeedConstraintKind::AtOrAbove, speed: Speed::from_knots(200.) });
    route.waypoints[3].segment = ConstraintSegment::Climb;
    route.waypoints[3].speed_constraint =
        Some(SpeedConstraint { kind: SpeedConstraintKind::At, speed: Speed::from_knots(240.) });

    let reader = ConstraintReader::new(&route);
    let speeds = &reader.lists().climb_speed;
    assert_eq!(speeds.len(), 1);
    speeds[0].distance.assert_approx(Length::from_nm(88.), Length::from_nm(1e-9)).unwrap();

    let restrictions = &reader.lists().climb_speed_restrictions;
    assert_eq!(restrictions.len(), 2);
    restrictions[0].distance.assert_approx(Length::from_nm(28.), Length::from_nm(1e-9)).unwrap();
    assert_eq!(restrictions[0].constraint.kind, SpeedConstraintKind::AtOrAbove);
    assert_eq!(restrictions[1].constraint.kind, SpeedConstraintKind::At);
}

#[test]
fn keeps_at_or_above_descent_speeds() {
    let mut route = store::sample::route();
    route.waypoints[8].speed_constraint =
        Some(SpeedConstraint { kind: SpeedConstraintKind::AtOrAbove, speed: Speed::from_knots(160.) });
    let reader = ConstraintReader::new(&route);
    let lists = reader.lists();

    assert_eq!(lists.descent_speed.len(), 1);
    assert_eq!(lists.descent_speed_restrictions.len(), 2);
    let above = lists.descent_speed_restrictions[1];
    above.distance.assert_approx(Length::from_nm(315.), Length::from_nm(1e-9)).unwrap();
    assert_eq!(above.constraint.max_speed(), None);
}

#[test]
fn speed_met_within_tolerance() {
    let tolerance = Speed::from_knots(5.);
    let above = SpeedConstraint { kind: SpeedConstraintKind::AtOrAbove, speed: Speed::from_knots(200.) };
    assert!(above.is_met(Speed::from_knots(196.), tolerance));
    assert!(!above.is_met(Speed::from_knots(194.), tolerance));

    let below = SpeedConstraint { kind: SpeedConstraintKind::AtOrBelow, speed: Speed::from_knots(230.) };
    assert!(below.is_met(Speed::from_knots(180.), tolerance));
    assert!(!below.is_met(Speed::from_knots(236.), tolerance));
    assert_eq!(below.max_speed(), Some(Speed::from_knots(230.)));

    let at = SpeedConstraint { kind: SpeedConstraintKind::At, speed: Speed::from_knots(250.) };
    assert!(at.is_met(Speed::from_knots(254.), tolerance));
    assert!(!at.is_met(Speed::from_knots(244.), tolerance));
}

#[test]
fn extracts_active_cruise_steps() {
    let mut route = store::sample::route();
    route.waypoints[5].cruise_step = Some(CruiseStep { to_altitude: feet(33000.), ignored: false });
    let reader = ConstraintReader::new(&route);

    let steps = &reader.lists().cruise_steps;
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].waypoint_index, 5);
    assert_eq!(steps[0].to_altitude, feet(33000.));
}

#[test]
fn discontinuity_extends_distance() {
    let mut route = store::sample::route();
    route.waypoints[2].discontinuity_before = Some(Length::from_nm(5.));
    route.waypoints[2].inbound_transition = Length::from_nm(1.);
    let reader = ConstraintReader::new(&route);

    reader.waypoint_distance(2).unwrap().assert_approx(Length::from_nm(34.), Length::from_nm(1e-9)).unwrap();
    reader.lists().total_distance.assert_approx(Length::from_nm(327.), Length::from_nm(1e-9)).unwrap();
}

#[test]
fn met_within_tolerance() {
    let tolerance = Length::from_feet(250.);
    let below = AltitudeConstraint::AtOrBelow { altitude: feet(10000.) };
    assert!(below.is_met(feet(9000.), tolerance));
    assert!(below.is_met(feet(10250.), tolerance));
    assert!(!below.is_met(feet(10251.), tolerance));

    let above = AltitudeConstraint::AtOrAbove { altitude: feet(2000.) };
    assert!(above.is_met(feet(1750.), tolerance));
    assert!(!above.is_met(feet(1749.), tolerance));

    let at = AltitudeConstraint::At { altitude: feet(6000.) };
    assert!(at.is_met(feet(6250.), tolerance));
    assert!(!at.is_met(feet(5700.), tolerance));
}

#[test]
fn signed_error() {
    let range = AltitudeConstraint::Range { low: feet(5000.), high: feet(9000.) };
    range.error(feet(7000.)).assert_approx(Length::ZERO, Length::from_feet(1e-9)).unwrap();
    range.error(feet(9500.)).assert_approx(Length::from_feet(500.), Length::from_feet(1e-6)).unwrap();
    range.error(feet(4000.)).assert_approx(Length::from_feet(-1000.), Length::from_feet(1e-6)).unwrap();

    let at = AltitudeConstraint::At { altitude: feet(6000.) };
    at.error(feet(6100.)).assert_approx(Length::from_feet(100.), Length::from_feet(1e-6)).unwrap();
}

#[test]
fn correction_targets() {
    let tolerance = Length::from_feet(250.);
    let range = AltitudeConstraint::Range { low: feet(5000.), high: feet(9000.) };
    assert_eq!(range.correction_target(feet(7000.), tolerance), None);
    assert_eq!(range.correction_target(feet(12000.), tolerance), Some(feet(9000.)));
    assert_eq!(range.correction_target(feet(4000.), tolerance), Some(feet(5000.)));

    let below = AltitudeConstraint::AtOrBelow { altitude: feet(10000.) };
    assert_eq!(below.correction_target(feet(10100.), tolerance), None);
    assert_eq!(below.correction_target(feet(12000.), tolerance), Some(feet(10000.)));

    let at = AltitudeConstraint::At { altitude: feet(5000.) };
    at.nearest_met(feet(6000.), tolerance).assert_approx(feet(5250.), Length::from_feet(1e-6)).unwrap();
    assert_eq!(at.nearest_met(feet(5100.), tolerance), feet(5100.));
}

#[test]
fn max_altitude_of_constraints() {
    assert_eq!(AltitudeConstraint::AtOrAbove { altitude: feet(4000.) }.max_altitude(), None);
    assert_eq!(
        AltitudeConstraint::Range { low: feet(5000.), high: feet(9000.) }.max_altitude(),
        Some(feet(9000.))
    );
}

#[test]
fn descent_speed_before_distance() {
    let reader = ConstraintReader::new(&store::sample::route());
    let lists = reader.lists();
    assert_eq!(lists.descent_speed_before(Length::from_nm(300.)), None);
    assert_eq!(lists.descent_speed_before(Length::from_nm(310.)), Some(Speed::from_knots(230.)));
}

#[test]
fn climb_constraints_merge_in_descending_distance() {
    let mut route = store::sample::route();
    route.waypoints[1].altitude_constraint = Some(AltitudeConstraint::AtOrBelow { altitude: feet(5000.) });
    route.waypoints[2].segment = ConstraintSegment::Climb;
    route.waypoints[2].speed_constraint =
        Some(SpeedConstraint { kind: SpeedConstraintKind::AtOrBelow, speed: Speed::from_knots(220.) });
    let reader = ConstraintReader::new(&route);

    let merged = climb_constraints_descending(reader.lists(), Length::ZERO);
    assert_eq!(merged.len(), 2);
    assert!(matches!(merged[0], ClimbConstraint::Speed(c) if c.speed == Speed::from_knots(220.)));
    assert!(matches!(merged[1], ClimbConstraint::Altitude(c) if c.altitude == feet(5000.)));

    let ahead = climb_constraints_descending(reader.lists(), Length::from_nm(8.));
    assert_eq!(ahead.len(), 1);
}
