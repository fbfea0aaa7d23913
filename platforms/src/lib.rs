#![forbid(unsafe_code)]
#![warn(
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]

//! # Fantasy platform adapters
//!
//! A provider is, to the analytical core, nothing more than a source of
//! standings, schedule, head-to-head records and league settings. This crate
//! defines that contract ([`PlatformAdapter`]), the provider error kinds,
//! the OAuth credential handling shared by authenticated providers, and a
//! file-backed adapter used by the CLI and the test suites.
//!
//! The concrete HTTP providers (ESPN, Yahoo, Sleeper, Fantrax, CBS) parse
//! their responses into exactly these shapes; their transports live outside
//! this repository's scope.

pub mod adapter;
pub mod credential;
pub mod file;

pub use adapter::{load_snapshot, LoadError, PlatformAdapter, PlatformError};
pub use credential::{OAuthCredential, TokenRefresh};
pub use file::SnapshotAdapter;
