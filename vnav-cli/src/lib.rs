//! Command-line driver of the vertical trajectory predictor.

#![warn(clippy::pedantic)]
#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]
#![allow(clippy::collapsible_else_if)] // this is usually intentional
#![cfg_attr(not(feature = "precommit-checks"), allow(dead_code, unused_variables, unused_imports))]
#![cfg_attr(feature = "rust-analyzer", warn(warnings, clippy::pedantic, clippy::dbg_macro))]

use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bevy::app::App;
use bevy::log::{Level, LogPlugin};
use serde::Serialize;
use vnav::Status;
use vnav::predict::{
    Crossovers, PlacedRequests, ProfileManager, RebuildMessage, WaypointPrediction,
};
use vnav::reconcile::ReconcileOutcome;
use vnav::state::{AircraftState, Phase};

#[cfg(test)]
mod tests;

#[derive(clap::Parser)]
#[clap(version, about)]
pub struct Options {
    /// Increase log verbosity. May be repeated.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
    /// Compute the vertical profile of a scenario.
    Predict {
        /// Path to the scenario JSON file. The built-in sample is used if omitted.
        scenario: Option<PathBuf>,
        /// Also predict a climb in the modes selected on the flight control unit.
        #[clap(long)]
        tactical: bool,
        /// Write the report to this file instead of stdout.
        #[clap(short, long)]
        output:   Option<PathBuf>,
        /// Write the report on a single line.
        #[clap(long)]
        compact:  bool,
    },
    /// Check a scenario file for semantic errors.
    Validate {
        /// Path to the scenario JSON file.
        scenario: PathBuf,
    },
    /// Write the JSON schema of scenario files.
    Schema {
        /// Write the schema to this file instead of stdout.
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the built-in sample scenario.
    Example {
        /// Write the scenario to this file instead of stdout.
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(options: Options) -> Result<()> {
    match options.command {
        Command::Predict { scenario, tactical, output, compact } => {
            let scenario = match scenario {
                Some(path) => load_scenario(&path)?,
                None => store::sample::scenario(),
            };
            let report = predict(&scenario, tactical, Some(log_level(options.verbose)))?;
            write_json(output.as_deref(), &report, compact)
        }
        Command::Validate { scenario } => {
            let scenario = load_scenario(&scenario)?;
            check(&scenario)?;
            println!("{} is valid", scenario.meta.title);
            Ok(())
        }
        Command::Schema { output } => {
            write_json(output.as_deref(), &schemars::schema_for!(store::Scenario), false)
        }
        Command::Example { output } => {
            write_json(output.as_deref(), &store::sample::scenario(), false)
        }
    }
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn load_scenario(path: &Path) -> Result<store::Scenario> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse scenario {}", path.display()))
}

fn check(scenario: &store::Scenario) -> Result<()> {
    if let Err(errors) = scenario.validate() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("invalid scenario: {}", messages.join("; "));
    }
    Ok(())
}

/// Runs one rebuild of the profile manager in a headless app.
///
/// Logging is only installed if `log_level` is given,
/// since the global subscriber can only be set once per process.
pub fn predict(
    scenario: &store::Scenario,
    tactical: bool,
    log_level: Option<Level>,
) -> Result<Report> {
    check(scenario)?;

    let mut app = App::new();
    app.add_plugins((bevy::MinimalPlugins, vnav::predict::Plug));
    if let Some(level) = log_level {
        app.add_plugins(LogPlugin { level, ..Default::default() });
    }
    app.insert_resource(ProfileManager::from_scenario(scenario));
    app.world_mut().write_message(RebuildMessage::default());
    app.update();

    let mut manager = app.world_mut().resource_mut::<ProfileManager>();
    let Some(profile) = manager.profile() else {
        bail!("no profile was built: {}", manager.status());
    };
    let phases = profile
        .phases
        .iter()
        .filter(|(_, states)| !states.is_empty())
        .map(|(phase, states)| PhaseReport { phase, checkpoints: states.clone() })
        .collect();
    let reconcile = profile.reconcile.clone();

    let waypoints = scenario
        .route
        .waypoints
        .iter()
        .enumerate()
        .map(|(index, waypoint)| WaypointReport {
            ident:      waypoint.ident.clone(),
            prediction: manager.waypoint_prediction(index),
        })
        .collect();

    let tactical = tactical.then(|| {
        let profile = manager.tactical();
        TacticalReport {
            status:      profile.status,
            checkpoints: profile
                .profile
                .map(|profile| profile.flattened().copied().collect())
                .unwrap_or_default(),
        }
    });

    Ok(Report {
        title: scenario.meta.title.clone(),
        version: manager.version(),
        status: manager.status(),
        reconcile,
        phases,
        waypoints,
        crossovers: manager.crossovers(),
        pseudo_waypoints: manager.drain_requests(),
        tactical,
    })
}

fn write_json(output: Option<&Path>, value: &impl Serialize, compact: bool) -> Result<()> {
    match output {
        Some(path) => {
            let file =
                fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
            write_json_to(BufWriter::new(file), value, compact)
        }
        None => write_json_to(io::stdout().lock(), value, compact),
    }
}

fn write_json_to(mut writer: impl Write, value: &impl Serialize, compact: bool) -> Result<()> {
    if compact {
        serde_json::to_writer(&mut writer, value).context("write json")?;
    } else {
        serde_json::to_writer_pretty(&mut writer, value).context("write json")?;
    }
    writeln!(writer).context("write json")?;
    writer.flush().context("flush output")
}

/// Everything computed by one run of the `predict` command.
#[derive(Serialize)]
pub struct Report {
    pub title:            String,
    pub version:          u64,
    pub status:           Status,
    pub reconcile:        Option<ReconcileOutcome>,
    /// Non-empty phases in flight order.
    pub phases:           Vec<PhaseReport>,
    pub waypoints:        Vec<WaypointReport>,
    pub crossovers:       Crossovers,
    pub pseudo_waypoints: PlacedRequests,
    pub tactical:         Option<TacticalReport>,
}

#[derive(Serialize)]
pub struct PhaseReport {
    pub phase:       Phase,
    pub checkpoints: Vec<AircraftState>,
}

#[derive(Serialize)]
pub struct WaypointReport {
    pub ident:      String,
    pub prediction: Option<WaypointPrediction>,
}

#[derive(Serialize)]
pub struct TacticalReport {
    pub status:      Status,
    pub checkpoints: Vec<AircraftState>,
}
