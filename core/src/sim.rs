//! # Monte Carlo season completion
//!
//! Runs N independent trials of the remaining schedule. Every unplayed game
//! is a fair coin; simulated games always produce a winner, never a tie.
//! Each trial works on its own copy of the standings and its own sim
//! head-to-head table, so trials are independent and commute.
//!
//! Within a trial, games are processed in list order and counters are
//! updated in a fixed order (wins, losses, division record, sim H2H), which
//! keeps results reproducible for a given seed.
use crate::h2h::HeadToHead;
use crate::league::LeagueSnapshot;
use crate::schedule::Matchup;
use crate::standings::determine_playoffs;
use crate::team::{Team, TeamId, Teams};
use crate::tiebreak::{resolve_tiebreaker, Bias};
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Trials between two progress reports.
const PROGRESS_STRIDE: u32 = 100;

/// Per-team outcome counters accumulated over all trials.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TeamTally {
    pub division_titles: u32,
    pub playoff_berths: u32,
    pub first_seeds: u32,
    pub last_places: u32,
}

pub type Tallies = BTreeMap<TeamId, TeamTally>;

/// Result of a simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutcome {
    pub tallies: Tallies,
    /// Trials actually performed; lower than requested only after a
    /// cancellation with [`CancelPolicy::KeepPartial`].
    pub trials_run: u32,
}

/// What to do when the cancellation signal fires mid-run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CancelPolicy {
    /// Discard everything and report [`SimError::Cancelled`].
    #[default]
    Discard,
    /// Return the tallies accumulated so far.
    KeepPartial,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub n_trials: u32,
    pub playoff_spots: usize,
    pub on_cancel: CancelPolicy,
}

impl SimulationConfig {
    pub fn new(n_trials: u32, playoff_spots: usize) -> Self {
        SimulationConfig {
            n_trials,
            playoff_spots,
            on_cancel: CancelPolicy::default(),
        }
    }
}

/// Cooperative cancellation signal, checked at trial boundaries.
#[derive(Debug, Default, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Simulation failures; provider problems never reach this layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("simulation cancelled")]
    Cancelled,
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

/// Run `config.n_trials` Monte Carlo completions of the season.
///
/// `progress` receives a monotone percentage and is guaranteed a final call
/// with 100 on every non-cancelled run; it must not block. All randomness is
/// drawn from `rng`, so a seeded generator makes the run reproducible.
pub fn simulate_season<R, F>(
    snapshot: &LeagueSnapshot,
    config: &SimulationConfig,
    mut progress: F,
    cancel: &CancelToken,
    rng: &mut R,
) -> Result<SimulationOutcome, SimError>
where
    R: Rng,
    F: FnMut(u8),
{
    let mut tallies: Tallies = snapshot
        .teams
        .keys()
        .map(|id| (*id, TeamTally::default()))
        .collect();
    let mut trials_run = 0;

    for trial in 0..config.n_trials {
        if cancel.is_cancelled() {
            match config.on_cancel {
                CancelPolicy::Discard => return Err(SimError::Cancelled),
                CancelPolicy::KeepPartial => break,
            }
        }
        if trial % PROGRESS_STRIDE == 0 {
            let pct = u64::from(trial) * 100 / u64::from(config.n_trials.max(1));
            progress(pct as u8);
        }

        let (sim_teams, sim_h2h) = play_out_remaining(snapshot, rng);
        let seeding = determine_playoffs(
            &sim_teams,
            &snapshot.h2h,
            &sim_h2h,
            config.playoff_spots,
            Bias::none(),
            rng,
        )?;

        for id in &seeding.division_winners {
            tally(&mut tallies, *id).division_titles += 1;
        }
        for id in &seeding.seeds {
            tally(&mut tallies, *id).playoff_berths += 1;
        }
        if let Some(first) = seeding.first_seed() {
            tally(&mut tallies, first).first_seeds += 1;
        }
        let last = last_place(&sim_teams, &snapshot.h2h, &sim_h2h, rng);
        tally(&mut tallies, last).last_places += 1;

        trials_run += 1;
    }

    progress(100);
    Ok(SimulationOutcome {
        tallies,
        trials_run,
    })
}

/// Complete the remaining schedule with fair coin flips.
///
/// Returns the trial standings and the head-to-head table of the simulated
/// games only.
fn play_out_remaining<R: Rng>(snapshot: &LeagueSnapshot, rng: &mut R) -> (Teams, HeadToHead) {
    let mut sim_teams = snapshot.teams.clone();
    let mut sim_h2h = HeadToHead::new();
    for matchup in &snapshot.remaining {
        let (winner, loser) = if rng.gen::<bool>() {
            (matchup.home, matchup.away)
        } else {
            (matchup.away, matchup.home)
        };
        record_result(&mut sim_teams, matchup, winner, loser, &mut sim_h2h);
    }
    (sim_teams, sim_h2h)
}

/// Apply an explicit winner vector to the standings.
///
/// Shared with the scenario generator's brute-force enumeration; `winners`
/// holds one winning team id per matchup, in matchup order.
pub fn apply_outcome(teams: &Teams, matchups: &[Matchup], winners: &[TeamId]) -> (Teams, HeadToHead) {
    debug_assert_eq!(matchups.len(), winners.len());
    let mut sim_teams = teams.clone();
    let mut sim_h2h = HeadToHead::new();
    for (matchup, &winner) in matchups.iter().zip(winners) {
        let loser = if winner == matchup.home {
            matchup.away
        } else {
            matchup.home
        };
        record_result(&mut sim_teams, matchup, winner, loser, &mut sim_h2h);
    }
    (sim_teams, sim_h2h)
}

/// # Panics
///
/// Unwraps do not panic: matchup ids are checked against the team map by
/// the snapshot constructor, and `apply_outcome` winners come from the
/// matchups themselves.
fn record_result(
    teams: &mut Teams,
    matchup: &Matchup,
    winner: TeamId,
    loser: TeamId,
    sim_h2h: &mut HeadToHead,
) {
    teams.get_mut(&winner).unwrap().record.wins += 1;
    teams.get_mut(&loser).unwrap().record.losses += 1;
    if matchup.is_division_game {
        teams.get_mut(&winner).unwrap().division_record.wins += 1;
        teams.get_mut(&loser).unwrap().division_record.losses += 1;
    }
    sim_h2h.add_win(winner, loser);
}

/// # Panics
///
/// Does not panic: tallies were initialized from the same team set that
/// produces every id handed in here.
fn tally(tallies: &mut Tallies, id: TeamId) -> &mut TeamTally {
    tallies.get_mut(&id).unwrap()
}

/// The unique last-place team of a trial.
///
/// Ties at the bottom are resolved with an unbiased tiebreaker call; the
/// team sorting last in the resolved order takes last place.
fn last_place<R: Rng>(
    teams: &Teams,
    h2h: &HeadToHead,
    sim_h2h: &HeadToHead,
    rng: &mut R,
) -> TeamId {
    let worst = teams
        .values()
        .map(|t| t.win_pct())
        .fold(f64::INFINITY, f64::min);
    let tied: Vec<&Team> = teams.values().filter(|t| t.win_pct() == worst).collect();
    if tied.len() == 1 {
        return tied[0].id;
    }
    let ordered = resolve_tiebreaker(tied, h2h, sim_h2h, Bias::none(), rng);
    // Teams are non-empty by snapshot invariant.
    ordered[ordered.len() - 1].id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::mock_data;
    use crate::schedule::Week;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_schedule_repeats_current_standings() {
        let snapshot = mock_data::snapshot(
            [(10, 0, 0), (4, 6, 0), (4, 6, 0), (2, 8, 0)],
            [0, 0, 0, 0],
            vec![],
            HeadToHead::new(),
            2,
        );
        let config = SimulationConfig::new(500, 2);
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = simulate_season(
            &snapshot,
            &config,
            |_| {},
            &CancelToken::new(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(outcome.trials_run, 500);
        assert_eq!(outcome.tallies[&TeamId(1)].playoff_berths, 500);
        assert_eq!(outcome.tallies[&TeamId(1)].first_seeds, 500);
        assert_eq!(outcome.tallies[&TeamId(4)].last_places, 500);
    }

    #[test]
    fn same_seed_reproduces_tallies() {
        let snapshot = mock_data::snapshot(
            [(5, 5, 0), (5, 5, 0), (5, 5, 0), (5, 5, 0)],
            [0, 0, 0, 0],
            vec![
                Matchup::new(TeamId(1), TeamId(3), Week(11), false),
                Matchup::new(TeamId(2), TeamId(4), Week(11), false),
            ],
            HeadToHead::new(),
            2,
        );
        let config = SimulationConfig::new(2000, 2);

        let mut rng = StdRng::seed_from_u64(99);
        let first = simulate_season(&snapshot, &config, |_| {}, &CancelToken::new(), &mut rng)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        let second = simulate_season(&snapshot, &config, |_| {}, &CancelToken::new(), &mut rng)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn progress_is_monotone_and_ends_at_hundred() {
        let snapshot = mock_data::snapshot(
            [(5, 5, 0), (5, 5, 0), (5, 5, 0), (5, 5, 0)],
            [0, 0, 0, 0],
            vec![Matchup::new(TeamId(1), TeamId(2), Week(11), false)],
            HeadToHead::new(),
            2,
        );
        let config = SimulationConfig::new(1000, 2);
        let mut reported: Vec<u8> = Vec::new();
        let mut rng = StdRng::seed_from_u64(0);
        simulate_season(
            &snapshot,
            &config,
            |pct| reported.push(pct),
            &CancelToken::new(),
            &mut rng,
        )
        .unwrap();

        assert!(reported.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reported.last(), Some(&100));
    }

    #[test]
    fn cancellation_discards_by_default() {
        let snapshot = mock_data::snapshot(
            [(5, 5, 0), (5, 5, 0), (5, 5, 0), (5, 5, 0)],
            [0, 0, 0, 0],
            vec![],
            HeadToHead::new(),
            2,
        );
        let config = SimulationConfig::new(1000, 2);
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut rng = StdRng::seed_from_u64(0);
        let result = simulate_season(&snapshot, &config, |_| {}, &cancel, &mut rng);
        assert_eq!(result.unwrap_err(), SimError::Cancelled);
    }

    #[test]
    fn cancellation_can_keep_partial_tallies() {
        let snapshot = mock_data::snapshot(
            [(5, 5, 0), (5, 5, 0), (5, 5, 0), (5, 5, 0)],
            [0, 0, 0, 0],
            vec![],
            HeadToHead::new(),
            2,
        );
        let mut config = SimulationConfig::new(1000, 2);
        config.on_cancel = CancelPolicy::KeepPartial;
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = simulate_season(&snapshot, &config, |_| {}, &cancel, &mut rng).unwrap();
        assert_eq!(outcome.trials_run, 0);
    }

    #[test]
    fn counters_are_conserved_each_trial() {
        let snapshot = mock_data::snapshot(
            [(6, 4, 0), (5, 5, 0), (5, 5, 0), (4, 6, 0)],
            [1, 1, 2, 2],
            vec![
                Matchup::new(TeamId(1), TeamId(3), Week(11), false),
                Matchup::new(TeamId(2), TeamId(4), Week(11), false),
            ],
            HeadToHead::new(),
            3,
        );
        let n = 1500;
        let config = SimulationConfig::new(n, 3);
        let mut rng = StdRng::seed_from_u64(5);
        let outcome = simulate_season(&snapshot, &config, |_| {}, &CancelToken::new(), &mut rng)
            .unwrap();

        let totals = outcome
            .tallies
            .values()
            .fold(TeamTally::default(), |acc, t| TeamTally {
                division_titles: acc.division_titles + t.division_titles,
                playoff_berths: acc.playoff_berths + t.playoff_berths,
                first_seeds: acc.first_seeds + t.first_seeds,
                last_places: acc.last_places + t.last_places,
            });
        assert_eq!(totals.playoff_berths, n * 3);
        assert_eq!(totals.division_titles, n * 2);
        assert_eq!(totals.first_seeds, n);
        assert_eq!(totals.last_places, n);
    }
}
