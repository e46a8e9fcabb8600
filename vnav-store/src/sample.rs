//! A built-in sample scenario.
//!
//! The aircraft model loosely resembles a narrow-body twinjet.
//! It is suitable for demonstrations and tests, not for operational use.

use math::{Altitude, Force, FuelFlow, Length, Mass, Speed, TempDelta, ISA_TROPOPAUSE_ALTITUDE};

use crate::{
    AircraftModel, AltitudeConstraint, ConstraintSegment, CruiseStep, DragPolar, DragPolars,
    FcuSelections, FlapSetting, FlightPhase, Meta, Parameters, Route, Scenario, SpeedConstraint,
    SpeedConstraintKind, SpeedLimit, Tuning, WindLevel, Winds, Waypoint,
};

/// A short domestic flight cruising at FL350.
#[must_use]
pub fn scenario() -> Scenario {
    Scenario {
        meta:       Meta {
            title:       "Sample".into(),
            description: "A 321 NM flight with climb and descent constraints".into(),
        },
        aircraft:   aircraft(),
        parameters: parameters(),
        route:      route(),
        winds:      winds(),
        tuning:     Tuning::default(),
    }
}

/// The aircraft model used by [`scenario`].
#[must_use]
pub fn aircraft() -> AircraftModel {
    AircraftModel {
        name:                 "Generic twinjet".into(),
        wing_area:            1318.,
        max_thrust:           Force::from_pounds_force(54000.),
        takeoff_thrust_ratio: 1.0,
        climb_thrust_ratio:   0.85,
        idle_thrust_ratio:    0.05,
        thrust_lapse:         0.6,
        thrust_mach_lapse:    [-0.55, 0.15],
        tsfc:                 0.6,
        idle_fuel_flow:       FuelFlow::from_pounds_per_hour(1000.),
        drag_polars:          DragPolars {
            clean:  DragPolar { cd0: 0.024, k: 0.0375 },
            conf1:  DragPolar { cd0: 0.034, k: 0.042 },
            conf1f: DragPolar { cd0: 0.040, k: 0.045 },
            conf2:  DragPolar { cd0: 0.055, k: 0.047 },
            conf3:  DragPolar { cd0: 0.070, k: 0.048 },
            full:   DragPolar { cd0: 0.090, k: 0.050 },
        },
        gear_drag:            0.015,
        speedbrake_drag:      0.02,
        critical_mach:        0.75,
    }
}

/// The performance parameters used by [`scenario`], in the preflight phase.
#[must_use]
pub fn parameters() -> Parameters {
    Parameters {
        flight_phase:              FlightPhase::Preflight,
        managed_climb_speed:       Speed::from_knots(300.),
        managed_climb_mach:        0.78,
        managed_cruise_speed:      Speed::from_knots(280.),
        managed_cruise_mach:       0.78,
        managed_descent_speed:     Speed::from_knots(290.),
        managed_descent_mach:      0.78,
        cruise_altitude:           Altitude::from_feet(35000.),
        climb_speed_limit:         Some(SpeedLimit {
            speed:          Speed::from_knots(250.),
            under_altitude: Altitude::from_feet(10000.),
        }),
        descent_speed_limit:       Some(SpeedLimit {
            speed:          Speed::from_knots(250.),
            under_altitude: Altitude::from_feet(10000.),
        }),
        flap_retraction_speed:     Speed::from_knots(175.),
        slat_retraction_speed:     Speed::from_knots(205.),
        clean_speed:               Speed::from_knots(220.),
        v2_speed:                  Speed::from_knots(145.),
        approach_speed:            Speed::from_knots(138.),
        thrust_reduction_altitude: Altitude::from_feet(1500.),
        acceleration_altitude:     Altitude::from_feet(3000.),
        origin_elevation:          Altitude::SEA_LEVEL,
        destination_elevation:     Altitude::from_feet(400.),
        zero_fuel_weight:          Mass::from_pounds(130_000.),
        fuel_on_board:             Mass::from_pounds(20_000.),
        isa_deviation:             TempDelta::ZERO,
        tropopause:                ISA_TROPOPAUSE_ALTITUDE,
        landing_flaps_3:           false,
        takeoff_flaps:             FlapSetting::Conf1F,
        present_position:          None,
        fcu:                       FcuSelections::default(),
    }
}

fn waypoint(ident: &str, leg_nm: f64) -> Waypoint {
    Waypoint {
        ident:                ident.into(),
        leg_length:           Length::from_nm(leg_nm),
        inbound_transition:   Length::ZERO,
        outbound_transition:  Length::ZERO,
        discontinuity_before: None,
        segment:              ConstraintSegment::None,
        altitude_constraint:  None,
        speed_constraint:     None,
        cruise_step:          None,
    }
}

/// The route used by [`scenario`].
#[must_use]
pub fn route() -> Route {
    Route {
        waypoints:                     vec![
            waypoint("ORIGN", 0.),
            Waypoint {
                segment: ConstraintSegment::Climb,
                altitude_constraint: Some(AltitudeConstraint::AtOrAbove {
                    altitude: Altitude::from_feet(4000.),
                }),
                ..waypoint("DEP01", 8.)
            },
            waypoint("DEP02", 20.),
            waypoint("ENR01", 60.),
            Waypoint {
                cruise_step: Some(CruiseStep {
                    to_altitude: Altitude::from_feet(37000.),
                    ignored:     true,
                }),
                ..waypoint("ENR02", 80.)
            },
            waypoint("ENR03", 70.),
            Waypoint {
                segment: ConstraintSegment::Descent,
                altitude_constraint: Some(AltitudeConstraint::AtOrBelow {
                    altitude: Altitude::from_feet(20000.),
                }),
                ..waypoint("ARR01", 40.)
            },
            Waypoint {
                segment: ConstraintSegment::Descent,
                altitude_constraint: Some(AltitudeConstraint::Range {
                    low:  Altitude::from_feet(5000.),
                    high: Altitude::from_feet(9000.),
                }),
                speed_constraint: Some(SpeedConstraint {
                    kind:  SpeedConstraintKind::AtOrBelow,
                    speed: Speed::from_knots(230.),
                }),
                ..waypoint("ARR02", 25.)
            },
            Waypoint {
                segment: ConstraintSegment::Descent,
                altitude_constraint: Some(AltitudeConstraint::AtOrAbove {
                    altitude: Altitude::from_feet(2000.),
                }),
                ..waypoint("FAF", 12.)
            },
            Waypoint { segment: ConstraintSegment::Descent, ..waypoint("RWY", 6.) },
        ],
        active_leg_index:              1,
        distance_to_active_terminator: Length::from_nm(8.),
    }
}

/// The forecast winds used by [`scenario`].
#[must_use]
pub fn winds() -> Winds {
    Winds {
        climb:   vec![
            WindLevel { altitude: Altitude::SEA_LEVEL, headwind: Speed::from_knots(10.) },
            WindLevel { altitude: Altitude::from_feet(35000.), headwind: Speed::from_knots(40.) },
        ],
        cruise:  vec![WindLevel {
            altitude: Altitude::from_feet(35000.),
            headwind: Speed::from_knots(50.),
        }],
        descent: vec![
            WindLevel { altitude: Altitude::SEA_LEVEL, headwind: Speed::from_knots(5.) },
            WindLevel { altitude: Altitude::from_feet(35000.), headwind: Speed::from_knots(30.) },
        ],
    }
}
