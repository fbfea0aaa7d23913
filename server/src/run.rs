//! # Simulation pipeline
//!
//! Drives an adapter through fetch, magic numbers, scenarios and Monte
//! Carlo, recording progress on the task as it goes. Fetch and preparation
//! milestones land in the `[0..50)` band; simulation progress is mapped
//! into `[50..95]` with the remainder spent assembling and caching the
//! report.
use crate::cache::{CacheKey, ResultCache};
use crate::task::{TaskId, TaskStore};
use fps_core::league::LeagueSnapshot;
use fps_core::magic::calculate_magic_numbers;
use fps_core::report::{build_report, LeagueRef, SimulationReport};
use fps_core::scenario::generate_scenarios;
use fps_core::sim::{simulate_season, CancelToken, SimError, SimulationConfig};
use fps_core::sport::{current_season, Sport};
use fps_core::CoreError;
use fps_platforms::{PlatformAdapter, PlatformError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Trial count used when the caller asks for a quick answer.
pub const QUICK_MODE_TRIALS: u32 = 1000;

/// Parameters of one simulation request.
#[derive(Debug, Clone)]
pub struct SimulationRequest {
    pub league_id: String,
    pub sport: Sport,
    /// Defaults to the sport's current season.
    pub season: Option<i32>,
    pub n_trials: u32,
    pub quick_mode: bool,
    /// Fixed seed for reproducible runs; fresh entropy otherwise.
    pub seed: Option<u64>,
}

impl SimulationRequest {
    pub fn new(league_id: impl Into<String>, sport: Sport) -> Self {
        SimulationRequest {
            league_id: league_id.into(),
            sport,
            season: None,
            n_trials: 10_000,
            quick_mode: false,
            seed: None,
        }
    }

    fn trials(&self) -> u32 {
        if self.quick_mode {
            QUICK_MODE_TRIALS
        } else {
            self.n_trials
        }
    }
}

/// Anything the task wrapper can record as a failure.
#[derive(Error, Debug)]
pub enum TaskError {
    /// Provider failure, surfaced verbatim with its provider tag.
    #[error("{platform}: {source}")]
    Provider {
        platform: String,
        source: PlatformError,
    },
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<SimError> for TaskError {
    fn from(e: SimError) -> Self {
        TaskError::Core(CoreError::from(e))
    }
}

/// Run a simulation synchronously, recording progress and outcome on the
/// task. This is the whole pipeline; [`spawn_simulation`] only wraps it in
/// a thread.
pub fn run_simulation(
    adapter: &mut dyn PlatformAdapter,
    request: &SimulationRequest,
    store: &TaskStore,
    cache: &ResultCache,
    task_id: TaskId,
    cancel: &CancelToken,
) {
    store.set_running(task_id);
    match execute(adapter, request, store, cache, task_id, cancel) {
        Ok(report) => store.complete(task_id, report),
        Err(error) => store.fail(task_id, error.to_string()),
    }
}

fn execute(
    adapter: &mut dyn PlatformAdapter,
    request: &SimulationRequest,
    store: &TaskStore,
    cache: &ResultCache,
    task_id: TaskId,
    cancel: &CancelToken,
) -> Result<SimulationReport, TaskError> {
    let season = request.season.unwrap_or_else(|| current_season(request.sport));
    let league_id = request.league_id.as_str();
    let platform = adapter.platform_name();
    let tag = |source: PlatformError| TaskError::Provider {
        platform: String::from(platform),
        source,
    };

    adapter.validate_league(league_id, season).map_err(tag)?;
    store.update_progress(task_id, 5);

    let (teams, division_names) = adapter.fetch_standings(league_id, season).map_err(tag)?;
    store.update_progress(task_id, 15);

    let (remaining, current_week, total_weeks) = adapter
        .fetch_schedule(league_id, season, &teams)
        .map_err(tag)?;
    store.update_progress(task_id, 25);

    let h2h = adapter
        .fetch_head_to_head(league_id, season, &teams)
        .map_err(tag)?;
    let settings = adapter.fetch_league_settings(league_id, season).map_err(tag)?;
    store.update_progress(task_id, 35);

    let snapshot = LeagueSnapshot::try_new(
        teams,
        division_names,
        remaining,
        current_week,
        total_weeks,
        h2h,
        settings,
    )
    .map_err(CoreError::from)?;

    let playoff_spots = snapshot.settings.playoff_spots;
    let magic = calculate_magic_numbers(
        &snapshot.teams,
        &snapshot.remaining,
        &snapshot.h2h,
        playoff_spots,
    );
    store.update_progress(task_id, 40);

    let mut rng = match request.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let scenarios = generate_scenarios(&snapshot, &magic, &mut rng)?;
    store.update_progress(task_id, 50);

    let config = SimulationConfig::new(request.trials(), playoff_spots);
    let outcome = simulate_season(
        &snapshot,
        &config,
        |pct| {
            let banded = 50 + (f64::from(pct) * 0.45) as u8;
            store.update_progress(task_id, banded);
        },
        cancel,
        &mut rng,
    )?;
    store.update_progress(task_id, 95);

    let league = LeagueRef {
        platform: String::from(platform),
        league_id: String::from(league_id),
        season,
        sport: request.sport,
    };
    let report = build_report(&snapshot, &league, &outcome, &magic, scenarios);

    cache.set(
        CacheKey {
            platform: league.platform.clone(),
            league_id: league.league_id.clone(),
            season,
            sport: request.sport,
            week: snapshot.current_week,
        },
        report.clone(),
    );

    Ok(report)
}

/// Handle on a spawned background simulation.
pub struct TaskHandle {
    pub task_id: TaskId,
    pub cancel: CancelToken,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Block until the background thread finishes.
    pub fn join(self) {
        // The worker never panics across this boundary; the pipeline
        // records failures on the task instead.
        let _ = self.join.join();
    }
}

/// Run the pipeline on a background thread.
///
/// The returned handle carries the task id for polling the store and a
/// cancellation token checked at trial boundaries.
pub fn spawn_simulation<A>(
    mut adapter: A,
    request: SimulationRequest,
    store: TaskStore,
    cache: ResultCache,
) -> TaskHandle
where
    A: PlatformAdapter + Send + 'static,
{
    let task_id = store.create();
    let cancel = CancelToken::new();
    let thread_cancel = cancel.clone();
    let join = thread::spawn(move || {
        run_simulation(
            &mut adapter,
            &request,
            &store,
            &cache,
            task_id,
            &thread_cancel,
        );
    });
    TaskHandle {
        task_id,
        cancel,
        join,
    }
}
