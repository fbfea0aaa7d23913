#![forbid(unsafe_code)]
#![warn(
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]

//! # Simulation task host
//!
//! Runs the analytical core behind background tasks with the lifecycle
//! `pending → running → {completed, failed}`. Fetch and preparation map to
//! the `[0..50)` progress band, Monte Carlo simulation to `[50..100]`.
//! Finished reports are cached by `(platform, league, season, sport, week)`.
//!
//! Storage is in-memory; a persistent store is a host concern behind the
//! same shapes.

pub mod cache;
pub mod run;
pub mod task;

pub use cache::{CacheKey, ResultCache};
pub use run::{run_simulation, spawn_simulation, SimulationRequest, TaskError, TaskHandle};
pub use task::{SimulationTask, TaskId, TaskStatus, TaskStore};
