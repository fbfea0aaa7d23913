//! # Magic numbers
//!
//! Closed-form bounds on what each team still needs: wins to clinch the
//! division, a playoff spot or the #1 seed, and losses tolerated before
//! last place is locked in. Purely arithmetic, no simulation and no
//! randomness.
//!
//! The arithmetic works on *effective wins* (`W + 0.5T`) and compares a
//! team's reachable total against each rival's ceiling, twice per rival:
//! conservatively (the rival wins out) and subtraction-aided (the team
//! takes all their remaining direct meetings away from the rival). Whether
//! a tie in effective wins suffices depends on the tiebreaker oracle: a
//! team that owns the tiebreaker rounds a non-positive gap down to zero,
//! anyone else needs strict excess, encoded as `+0.001` before the ceiling.
//! The epsilon is safe because fantasy records only move in halves.
use crate::h2h::HeadToHead;
use crate::schedule::Matchup;
use crate::team::{DivisionId, Team, TeamId, Teams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strict-excess nudge applied before `ceil` when a tie does not suffice.
const TIEBREAK_EPSILON: f64 = 0.001;

/// Wins still needed (or losses still tolerated, for `magic_last`).
///
/// `None` means already clinched/eliminated, or mathematically impossible.
#[derive(Deserialize, Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MagicNumbers {
    pub magic_division: Option<u32>,
    pub magic_playoffs: Option<u32>,
    pub magic_first_seed: Option<u32>,
    pub magic_last: Option<u32>,
}

/// Verdict of the conservative tiebreaker oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ownership {
    Wins,
    Loses,
    Uncertain,
}

/// Remaining-schedule lookup tables.
struct RemainingGames {
    per_team: BTreeMap<TeamId, u32>,
    per_pair: BTreeMap<(TeamId, TeamId), u32>,
}

impl RemainingGames {
    fn build(remaining: &[Matchup]) -> Self {
        let mut per_team: BTreeMap<TeamId, u32> = BTreeMap::new();
        let mut per_pair: BTreeMap<(TeamId, TeamId), u32> = BTreeMap::new();
        for matchup in remaining {
            *per_team.entry(matchup.home).or_default() += 1;
            *per_team.entry(matchup.away).or_default() += 1;
            let key = (matchup.home.min(matchup.away), matchup.home.max(matchup.away));
            *per_pair.entry(key).or_default() += 1;
        }
        RemainingGames { per_team, per_pair }
    }

    fn left_for(&self, id: TeamId) -> u32 {
        self.per_team.get(&id).copied().unwrap_or(0)
    }

    fn between(&self, a: TeamId, b: TeamId) -> u32 {
        self.per_pair
            .get(&(a.min(b), a.max(b)))
            .copied()
            .unwrap_or(0)
    }
}

/// Compute the four magic numbers for every team.
pub fn calculate_magic_numbers(
    teams: &Teams,
    remaining: &[Matchup],
    h2h: &HeadToHead,
    playoff_spots: usize,
) -> BTreeMap<TeamId, MagicNumbers> {
    let games = RemainingGames::build(remaining);

    let mut divisions: BTreeMap<DivisionId, Vec<&Team>> = BTreeMap::new();
    for team in teams.values() {
        divisions.entry(team.division).or_default().push(team);
    }

    teams
        .values()
        .map(|team| {
            let team_remaining = games.left_for(team.id);
            let team_eff_wins = team.effective_wins();

            let div_rivals: Vec<&Team> = divisions[&team.division]
                .iter()
                .copied()
                .filter(|t| t.id != team.id)
                .collect();
            let magic_division = magic_over_rivals(
                team,
                &div_rivals,
                h2h,
                &games,
                team_remaining,
                team_eff_wins,
            );

            let other_teams: Vec<&Team> =
                teams.values().filter(|t| t.id != team.id).collect();
            let magic_playoffs = magic_playoffs(
                team,
                &other_teams,
                teams,
                h2h,
                &games,
                playoff_spots,
                team_remaining,
                team_eff_wins,
            );
            let magic_first_seed = magic_over_rivals(
                team,
                &other_teams,
                h2h,
                &games,
                team_remaining,
                team_eff_wins,
            );
            let magic_last = magic_last(&other_teams, team_remaining, team_eff_wins);

            (
                team.id,
                MagicNumbers {
                    magic_division,
                    magic_playoffs,
                    magic_first_seed,
                    magic_last,
                },
            )
        })
        .collect()
}

/// Wins needed to finish strictly ahead of every rival in the list.
///
/// Used for the division title (division rivals) and the #1 seed (all other
/// teams): both targets require beating out every listed rival, so the
/// worst per-rival need decides.
fn magic_over_rivals(
    team: &Team,
    rivals: &[&Team],
    h2h: &HeadToHead,
    games: &RemainingGames,
    team_remaining: u32,
    team_eff_wins: f64,
) -> Option<u32> {
    if rivals.is_empty() {
        return None;
    }

    let mut needed_conservative = 0;
    let mut needed_with_sub = 0;
    for rival in rivals {
        let direct = games.between(rival.id, team.id);
        let rival_max_full = rival.effective_wins() + f64::from(games.left_for(rival.id));
        let rival_max_sub = rival_max_full - f64::from(direct);

        let owns = owns_tiebreaker(team, rival, h2h, games) == Ownership::Wins;
        needed_conservative =
            needed_conservative.max(wins_needed(rival_max_full - team_eff_wins, owns));
        needed_with_sub = needed_with_sub.max(wins_needed(rival_max_sub - team_eff_wins, owns));
    }

    finalize(needed_conservative, needed_with_sub, team_remaining)
}

/// Wins needed to stay ahead of the team currently setting the playoff bar.
///
/// The bar is the Nth-best rival ceiling (N = playoff spots), computed under
/// both the conservative and the subtraction-aided ordering.
#[allow(clippy::too_many_arguments)]
fn magic_playoffs(
    team: &Team,
    other_teams: &[&Team],
    teams: &Teams,
    h2h: &HeadToHead,
    games: &RemainingGames,
    playoff_spots: usize,
    team_remaining: u32,
    team_eff_wins: f64,
) -> Option<u32> {
    if other_teams.len() < playoff_spots {
        return None;
    }

    let mut conservative: Vec<(TeamId, f64)> = Vec::with_capacity(other_teams.len());
    let mut with_sub: Vec<(TeamId, f64)> = Vec::with_capacity(other_teams.len());
    for other in other_teams {
        let direct = games.between(other.id, team.id);
        let other_max_full = other.effective_wins() + f64::from(games.left_for(other.id));
        conservative.push((other.id, other_max_full));
        with_sub.push((other.id, other_max_full - f64::from(direct)));
    }
    conservative.sort_by(|a, b| b.1.total_cmp(&a.1));
    with_sub.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (nth_cons_id, nth_cons_max) = conservative[playoff_spots - 1];
    let (nth_sub_id, nth_sub_max) = with_sub[playoff_spots - 1];

    let owns_cons = owns_tiebreaker(team, &teams[&nth_cons_id], h2h, games) == Ownership::Wins;
    let needed_cons = wins_needed(nth_cons_max - team_eff_wins, owns_cons);
    let owns_sub = owns_tiebreaker(team, &teams[&nth_sub_id], h2h, games) == Ownership::Wins;
    let needed_sub = wins_needed(nth_sub_max - team_eff_wins, owns_sub);

    finalize(needed_cons, needed_sub, team_remaining)
}

/// Losses after which last place can no longer be escaped.
fn magic_last(other_teams: &[&Team], team_remaining: u32, team_eff_wins: f64) -> Option<u32> {
    let min_other = other_teams
        .iter()
        .map(|t| t.effective_wins())
        .fold(f64::INFINITY, f64::min);
    if !min_other.is_finite() {
        return None;
    }
    let gap = team_eff_wins + f64::from(team_remaining) - min_other;
    if gap < 0.0 {
        // Already locked into last place.
        return None;
    }
    let magic = (gap + TIEBREAK_EPSILON).ceil() as u32;
    if magic > team_remaining {
        // Can no longer fall to last.
        None
    } else {
        Some(magic)
    }
}

/// Wins needed to cover `gap`, given whether a tie suffices.
fn wins_needed(gap: f64, owns_tiebreaker: bool) -> u32 {
    if owns_tiebreaker {
        if gap <= 0.0 {
            0
        } else {
            gap.ceil() as u32
        }
    } else if gap < 0.0 {
        0
    } else {
        (gap + TIEBREAK_EPSILON).ceil() as u32
    }
}

/// Conservative-if-it-fits, else must-run-the-table, else impossible.
/// A result of zero means already clinched and is reported as `None`.
fn finalize(needed_conservative: u32, needed_with_sub: u32, team_remaining: u32) -> Option<u32> {
    let magic = if needed_conservative <= team_remaining {
        needed_conservative
    } else if needed_with_sub <= team_remaining {
        team_remaining
    } else {
        return None;
    };
    if magic == 0 {
        None
    } else {
        Some(magic)
    }
}

/// Conservative tiebreaker oracle for a pair of teams under tied records.
///
/// Walks head-to-head first, assigning the still-to-play direct games
/// adversarially: a verdict is only returned when one side stays ahead even
/// if the other wins every remaining meeting. Falls through to division
/// record; exact equality there means the pair would go to a coin flip.
fn owns_tiebreaker(
    team: &Team,
    rival: &Team,
    h2h: &HeadToHead,
    games: &RemainingGames,
) -> Ownership {
    let (team_wins, rival_wins, _) = h2h.record_between(team.id, rival.id);
    let remaining_direct = games.between(team.id, rival.id);

    let h2h_verdict = if remaining_direct > 0 {
        let rival_potential = rival_wins + remaining_direct;
        let team_potential = team_wins + remaining_direct;
        if team_wins > rival_potential {
            Some(Ownership::Wins)
        } else if rival_wins > team_potential {
            Some(Ownership::Loses)
        } else {
            None
        }
    } else if team_wins > rival_wins {
        Some(Ownership::Wins)
    } else if rival_wins > team_wins {
        Some(Ownership::Loses)
    } else {
        None
    };
    if let Some(verdict) = h2h_verdict {
        return verdict;
    }

    if team.division_win_pct() > rival.division_win_pct() {
        Ownership::Wins
    } else if rival.division_win_pct() > team.division_win_pct() {
        Ownership::Loses
    } else {
        Ownership::Uncertain
    }
}
