use math::Length;

use super::{LegPart, PlacementError, Requests, place};
use crate::constraints::ConstraintReader;
use crate::state::{AircraftState, Configuration};

fn nm(value: f64) -> Length { Length::from_nm(value) }

fn place_on(route: &store::Route, distance: Length) -> Result<super::Placement, PlacementError> {
    let reader = ConstraintReader::new(route);
    place(reader.legs(), reader.waypoint_distances(), distance)
}

#[test]
fn places_on_containing_leg() {
    let route = store::sample::route();

    let placement = place_on(&route, nm(0.)).unwrap();
    assert_eq!(placement.leg_index, 1);
    assert_eq!(placement.part, LegPart::Leg);
    placement.distance_before_terminator.assert_approx(nm(8.), nm(1e-9)).unwrap();

    let placement = place_on(&route, nm(30.)).unwrap();
    assert_eq!(placement.leg_index, 3);
    placement.distance_from_last_fix.assert_approx(nm(2.), nm(1e-9)).unwrap();
    placement.distance_before_terminator.assert_approx(nm(58.), nm(1e-9)).unwrap();

    let placement = place_on(&route, nm(321.)).unwrap();
    assert_eq!(placement.leg_index, 9);
}

#[test]
fn rejects_negative_distance() {
    assert_eq!(
        place_on(&store::sample::route(), nm(-1.)),
        Err(PlacementError::Negative(nm(-1.)))
    );
}

#[test]
fn rejects_distance_beyond_path() {
    let err = place_on(&store::sample::route(), nm(321.5)).unwrap_err();
    assert!(matches!(err, PlacementError::BeyondPath { end, .. } if end == nm(321.)));
}

#[test]
fn rejects_distance_inside_discontinuity() {
    let mut route = store::sample::route();
    route.waypoints[2].discontinuity_before = Some(nm(5.));

    assert_eq!(
        place_on(&route, nm(10.)),
        Err(PlacementError::InsideDiscontinuity { distance: nm(10.), leg_index: 2 })
    );

    let placement = place_on(&route, nm(14.)).unwrap();
    assert_eq!(placement.leg_index, 2);
    placement.distance_from_last_fix.assert_approx(nm(1.), nm(1e-9)).unwrap();
    placement.distance_before_terminator.assert_approx(nm(19.), nm(1e-9)).unwrap();
}

#[test]
fn identifies_transition_parts() {
    let mut route = store::sample::route();
    route.waypoints[2].discontinuity_before = Some(nm(5.));
    route.waypoints[2].inbound_transition = nm(1.);
    route.waypoints[2].outbound_transition = nm(2.);

    assert_eq!(place_on(&route, nm(13.5)).unwrap().part, LegPart::Inbound);
    assert_eq!(place_on(&route, nm(20.)).unwrap().part, LegPart::Leg);
    assert_eq!(place_on(&route, nm(35.)).unwrap().part, LegPart::Outbound);
}

#[test]
fn requests_accumulate_and_clear() {
    let state = AircraftState::from_cas(
        &math::Atmosphere::default(),
        nm(100.),
        math::Altitude::from_feet(35000.),
        math::Speed::from_knots(280.),
        math::Mass::from_pounds(140_000.),
        Configuration::CLEAN,
    );
    let mut requests = Requests::default();
    requests.request_mcdu(super::McduPseudoWaypoint::TopOfClimb, state);
    let mut other = Requests::default();
    other.request_nd(super::NdPseudoWaypoint::Level1Climb, state);
    requests.extend(other);

    assert_eq!(requests.mcdu.len(), 1);
    assert_eq!(requests.nd.len(), 1);
    assert_eq!(requests.mcdu[0].speed_constraint, None);
    requests.clear();
    assert!(requests.mcdu.is_empty() && requests.nd.is_empty());
}
