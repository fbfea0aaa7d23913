#![forbid(unsafe_code)]
//! Run playoff simulations against a snapshot file from the command line.
use fps_core::league::LeagueSnapshot;
use fps_core::magic::calculate_magic_numbers;
use fps_core::scenario::generate_scenarios;
use fps_core::sport::Sport;
use fps_core::CoreError;
use fps_platforms::{load_snapshot, LoadError, SnapshotAdapter};
use fps_server::{
    run_simulation, ResultCache, SimulationRequest, TaskStatus, TaskStore,
};
use fps_core::sim::CancelToken;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;
use thiserror::Error;

fn main() {
    let opt = Opt::from_args();
    if let Err(error) = dispatch(opt) {
        eprintln!("error: {}", error);
        process::exit(1);
    }
}

fn dispatch(opt: Opt) -> Result<(), CliError> {
    match opt {
        Opt::Run {
            common,
            trials,
            quick,
            json,
        } => run(common, trials, quick, json),
        Opt::Magic { common } => magic(common),
        Opt::Scenarios { common } => scenarios(common),
    }
}

/// Full pipeline: simulate and print the report.
fn run(common: Common, trials: u32, quick: bool, json: bool) -> Result<(), CliError> {
    let adapter = SnapshotAdapter::from_path(&common.snapshot)?;
    let store = TaskStore::new();
    let cache = ResultCache::new();
    let task_id = store.create();

    let mut request = SimulationRequest::new(common.league_id.clone(), common.sport);
    request.season = common.season;
    request.n_trials = trials;
    request.quick_mode = quick;
    request.seed = common.seed;

    let mut adapter = adapter;
    run_simulation(
        &mut adapter,
        &request,
        &store,
        &cache,
        task_id,
        &CancelToken::new(),
    );

    let task = store.get(task_id).expect("task was just created");
    match task.status {
        TaskStatus::Completed => {
            let report = task.report.expect("completed tasks carry a report");
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        _ => Err(CliError::Simulation(
            task.error.unwrap_or_else(|| String::from("unknown failure")),
        )),
    }
}

/// Print magic numbers only; no simulation.
fn magic(common: Common) -> Result<(), CliError> {
    let snapshot = snapshot_from(&common)?;
    let magic = calculate_magic_numbers(
        &snapshot.teams,
        &snapshot.remaining,
        &snapshot.h2h,
        snapshot.settings.playoff_spots,
    );

    println!(
        "{:<20} {:>10} {:>10} {:>10} {:>10}",
        "team", "division", "playoffs", "#1 seed", "last"
    );
    for team in snapshot.teams.values() {
        let numbers = magic[&team.id];
        println!(
            "{:<20} {:>10} {:>10} {:>10} {:>10}",
            team.name.to_string(),
            fmt_magic(numbers.magic_division),
            fmt_magic(numbers.magic_playoffs),
            fmt_magic(numbers.magic_first_seed),
            fmt_magic(numbers.magic_last),
        );
    }
    Ok(())
}

/// Print this week's clinch and elimination scenarios.
fn scenarios(common: Common) -> Result<(), CliError> {
    let snapshot = snapshot_from(&common)?;
    let magic = calculate_magic_numbers(
        &snapshot.teams,
        &snapshot.remaining,
        &snapshot.h2h,
        snapshot.settings.playoff_spots,
    );
    let mut rng = match common.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let scenarios =
        generate_scenarios(&snapshot, &magic, &mut rng).map_err(CoreError::from)?;

    println!("Clinch scenarios (week {}):", snapshot.current_week);
    for line in &scenarios.clinch {
        println!("  {}", line);
    }
    if scenarios.clinch.is_empty() {
        println!("  none");
    }
    println!("Elimination scenarios:");
    for line in &scenarios.elimination {
        println!("  {}", line);
    }
    if scenarios.elimination.is_empty() {
        println!("  none");
    }
    Ok(())
}

fn snapshot_from(common: &Common) -> Result<LeagueSnapshot, CliError> {
    let mut adapter = SnapshotAdapter::from_path(&common.snapshot)?;
    let season = common
        .season
        .unwrap_or_else(|| fps_core::sport::current_season(common.sport));
    Ok(load_snapshot(&mut adapter, &common.league_id, season)?)
}

fn print_report(report: &fps_core::report::SimulationReport) {
    println!(
        "{} — season {}, week {}/{} ({} simulations)",
        report.league_name,
        report.season,
        report.current_week,
        report.total_weeks,
        report.n_simulations
    );
    println!(
        "{:<20} {:>8} {:>9} {:>9} {:>9} {:>9}",
        "team", "record", "playoff%", "div%", "#1 seed%", "last%"
    );
    for team in &report.teams {
        println!(
            "{:<20} {:>8} {:>8.1}% {:>8.1}% {:>8.1}% {:>8.1}%",
            team.name,
            team.record,
            team.playoff_pct * 100.0,
            team.division_pct * 100.0,
            team.first_seed_pct * 100.0,
            team.last_place_pct * 100.0
        );
    }
    if !report.clinch_scenarios.is_empty() {
        println!("Clinch scenarios:");
        for line in &report.clinch_scenarios {
            println!("  {}", line);
        }
    }
    if !report.elimination_scenarios.is_empty() {
        println!("Elimination scenarios:");
        for line in &report.elimination_scenarios {
            println!("  {}", line);
        }
    }
}

fn fmt_magic(value: Option<u32>) -> String {
    match value {
        Some(n) => n.to_string(),
        None => String::from("-"),
    }
}

#[derive(Debug, StructOpt)]
struct Common {
    /// Path to a league snapshot JSON file
    #[structopt(long, parse(from_os_str))]
    snapshot: PathBuf,
    /// League id expected by the snapshot
    #[structopt(long, default_value = "local")]
    league_id: String,
    /// Sport: basketball, football, baseball or hockey
    #[structopt(long, default_value = "football")]
    sport: Sport,
    /// Season year; inferred from the sport when omitted
    #[structopt(long)]
    season: Option<i32>,
    /// RNG seed for reproducible output
    #[structopt(long)]
    seed: Option<u64>,
}

#[derive(Debug, StructOpt)]
#[structopt(name = "fps", about = "fantasy playoff simulator")]
enum Opt {
    /// Run the full simulation and print the report
    #[structopt(name = "run")]
    Run {
        #[structopt(flatten)]
        common: Common,
        /// Number of Monte Carlo trials
        #[structopt(long, default_value = "10000")]
        trials: u32,
        /// Cap trials for a fast answer
        #[structopt(long)]
        quick: bool,
        /// Print the report as JSON
        #[structopt(long)]
        json: bool,
    },
    /// Print magic numbers without simulating
    #[structopt(name = "magic")]
    Magic {
        #[structopt(flatten)]
        common: Common,
    },
    /// Print this week's clinch and elimination scenarios
    #[structopt(name = "scenarios")]
    Scenarios {
        #[structopt(flatten)]
        common: Common,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Platform(#[from] fps_platforms::PlatformError),
    #[error("{0}")]
    Load(#[from] LoadError),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("simulation failed: {0}")]
    Simulation(String),
    #[error("could not serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
