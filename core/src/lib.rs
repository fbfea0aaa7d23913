#![forbid(unsafe_code)]
// Enable as many useful Rust warnings as we can stand.
#![warn(
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]

//! # Fantasy playoff simulation core
//!
//! Pure, synchronous computation pipeline over a single immutable
//! [`league::LeagueSnapshot`]: magic numbers, this-week clinch/elimination
//! scenarios and Monte Carlo playoff odds, backed by an ESPN-style
//! tiebreaker chain.
//!
//! Provider I/O, task scheduling and persistence are host concerns and live
//! in the sibling crates. Everything here is deterministic given the
//! injected random number generator.

pub mod error;
pub mod h2h;
pub mod league;
pub mod magic;
pub mod report;
pub mod scenario;
pub mod schedule;
pub mod sim;
pub mod sport;
pub mod standings;
pub mod team;
pub mod tiebreak;

pub use error::CoreError;
