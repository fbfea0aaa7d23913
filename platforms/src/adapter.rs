//! Provider adapter contract
use fps_core::h2h::HeadToHead;
use fps_core::league::{LeagueSettings, LeagueSnapshot, SnapshotError};
use fps_core::schedule::{Matchup, Week};
use fps_core::team::{DivisionId, Teams};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors a provider can surface.
///
/// These are passed through to the caller verbatim, tagged with the
/// provider's name by whoever drives the adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("league {0} not found")]
    LeagueNotFound(String),
    #[error("league {0} is private; only public leagues can be simulated")]
    LeaguePrivate(String),
    #[error("authentication expired; reconnect the account")]
    TokenExpired,
    #[error("transport error: {0}")]
    Transport(String),
}

/// A source of league state.
///
/// The core calls these operations once per snapshot, in order: validate,
/// standings, schedule, head-to-head, settings. Contracts are synchronous;
/// the host supplies whatever concurrency it wants around them. Adapters
/// take `&mut self` because authenticated providers may refresh their
/// credential mid-call.
pub trait PlatformAdapter {
    /// Short provider tag, e.g. `"espn"`.
    fn platform_name(&self) -> &'static str;

    /// Check that the league exists and is readable.
    fn validate_league(&mut self, league_id: &str, season: i32) -> Result<(), PlatformError>;

    /// Current standings and division names.
    fn fetch_standings(
        &mut self,
        league_id: &str,
        season: i32,
    ) -> Result<(Teams, BTreeMap<DivisionId, String>), PlatformError>;

    /// Remaining matchups plus current and total week numbers.
    ///
    /// Takes the already-fetched teams so the adapter can mark division
    /// games.
    fn fetch_schedule(
        &mut self,
        league_id: &str,
        season: i32,
        teams: &Teams,
    ) -> Result<(Vec<Matchup>, Week, Week), PlatformError>;

    /// Head-to-head records between all teams.
    fn fetch_head_to_head(
        &mut self,
        league_id: &str,
        season: i32,
        teams: &Teams,
    ) -> Result<HeadToHead, PlatformError>;

    /// League configuration (name, playoff spots, divisions, weeks).
    fn fetch_league_settings(
        &mut self,
        league_id: &str,
        season: i32,
    ) -> Result<LeagueSettings, PlatformError>;
}

/// Failure while assembling a snapshot from an adapter.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Drive an adapter through all five operations and validate the result.
pub fn load_snapshot(
    adapter: &mut dyn PlatformAdapter,
    league_id: &str,
    season: i32,
) -> Result<LeagueSnapshot, LoadError> {
    adapter.validate_league(league_id, season)?;
    let (teams, division_names) = adapter.fetch_standings(league_id, season)?;
    let (remaining, current_week, total_weeks) =
        adapter.fetch_schedule(league_id, season, &teams)?;
    let h2h = adapter.fetch_head_to_head(league_id, season, &teams)?;
    let settings = adapter.fetch_league_settings(league_id, season)?;
    let snapshot = LeagueSnapshot::try_new(
        teams,
        division_names,
        remaining,
        current_week,
        total_weeks,
        h2h,
        settings,
    )?;
    Ok(snapshot)
}
