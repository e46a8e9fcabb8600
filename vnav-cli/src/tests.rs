use vnav::Status;
use vnav::state::Phase;

use super::{predict, write_json_to};

#[test]
fn predicts_sample_scenario() {
    let scenario = store::sample::scenario();
    let report = predict(&scenario, false, None).unwrap();

    assert_eq!(report.version, 1);
    assert_eq!(report.status, Status::Converged);
    assert!(report.tactical.is_none());

    let phases: Vec<Phase> = report.phases.iter().map(|phase| phase.phase).collect();
    for phase in [Phase::Climb, Phase::Cruise, Phase::Descent, Phase::Approach] {
        assert!(phases.contains(&phase), "missing {phase} in {phases:?}");
    }

    assert_eq!(report.waypoints.len(), scenario.route.waypoints.len());
    assert!(report.waypoints.iter().all(|waypoint| waypoint.prediction.is_some()));
    assert!(!report.pseudo_waypoints.mcdu.is_empty());
}

#[test]
fn tactical_report_without_selected_altitude() {
    let report = predict(&store::sample::scenario(), true, None).unwrap();

    let tactical = report.tactical.unwrap();
    assert_eq!(tactical.status, Status::InputMissing);
    assert!(tactical.checkpoints.is_empty());
}

#[test]
fn rejects_invalid_scenario() {
    let mut scenario = store::sample::scenario();
    scenario.route.waypoints.truncate(1);

    let err = predict(&scenario, false, None).err().unwrap();
    assert!(err.to_string().contains("at least 2 are required"), "{err}");
}

#[test]
fn example_is_a_valid_scenario() {
    let mut buf = Vec::new();
    write_json_to(&mut buf, &store::sample::scenario(), false).unwrap();

    let scenario: store::Scenario = serde_json::from_slice(&buf).unwrap();
    scenario.validate().unwrap();
    assert_eq!(scenario.route.waypoints.len(), store::sample::route().waypoints.len());
}

#[test]
fn schema_describes_scenario() {
    let mut buf = Vec::new();
    write_json_to(&mut buf, &schemars::schema_for!(store::Scenario), true).unwrap();

    let schema: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    for field in ["aircraft", "parameters", "route", "winds", "tuning"] {
        assert!(schema["properties"][field].is_object(), "missing {field}");
    }
}
