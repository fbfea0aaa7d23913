//! # Clinch and elimination scenarios
//!
//! Short narrative strings describing what this week's games can decide.
//!
//! When the whole remaining schedule is small enough, every outcome vector
//! of the current week is enumerated and each team is probed twice against
//! the playoff determiner: once with the team disfavored in every coin flip
//! (worst case, proves a clinch) and once favored (best case, proves an
//! elimination). Each probe is repeated a fixed number of times to average
//! over the *other* teams' coin flips.
//!
//! With more games remaining, an analytical fallback reads the magic
//! numbers for clinch lines and uses a guaranteed-minimum-wins count for
//! elimination lines. The brute-force answer is the canonical one; the
//! fallback may miss fringe cases.
use crate::h2h::HeadToHead;
use crate::league::LeagueSnapshot;
use crate::magic::MagicNumbers;
use crate::schedule::{Matchup, Week};
use crate::sim::{apply_outcome, SimError};
use crate::standings::determine_playoffs;
use crate::team::{Team, TeamId, Teams};
use crate::tiebreak::Bias;
use itertools::Itertools;
use rand::Rng;
use std::collections::BTreeMap;

/// Largest remaining-schedule size handled by exhaustive enumeration.
pub const BRUTE_FORCE_MAX_REMAINING: usize = 10;

/// Resolver repetitions per probe, averaging out other teams' coin flips.
pub const COIN_FLIP_RUNS: usize = 25;

/// Scenario strings, deduplicated in first-seen order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Scenarios {
    pub clinch: Vec<String>,
    pub elimination: Vec<String>,
}

/// Generate this week's scenarios, choosing the path by schedule size.
pub fn generate_scenarios<R: Rng>(
    snapshot: &LeagueSnapshot,
    magic: &BTreeMap<TeamId, MagicNumbers>,
    rng: &mut R,
) -> Result<Scenarios, SimError> {
    if snapshot.remaining.len() <= BRUTE_FORCE_MAX_REMAINING {
        brute_force_scenarios(
            &snapshot.teams,
            &snapshot.remaining,
            &snapshot.h2h,
            snapshot.current_week,
            snapshot.settings.playoff_spots,
            rng,
        )
    } else {
        Ok(analytical_scenarios(
            &snapshot.teams,
            &snapshot.remaining,
            magic,
            snapshot.current_week,
            snapshot.settings.playoff_spots,
        ))
    }
}

/// This week's opponent for each team.
fn week_opponents(week_matchups: &[&Matchup]) -> BTreeMap<TeamId, TeamId> {
    let mut opponents = BTreeMap::new();
    for matchup in week_matchups {
        opponents.insert(matchup.home, matchup.away);
        opponents.insert(matchup.away, matchup.home);
    }
    opponents
}

/// Per-team probe verdicts accumulated over all outcome vectors.
#[derive(Debug, Clone, Copy)]
struct ProbeFlags {
    clinch_all: bool,
    elim_all: bool,
    clinch_when_wins: bool,
    elim_when_loses: bool,
    div_clinch_all: bool,
    div_elim_all: bool,
    div_clinch_when_wins: bool,
    div_elim_when_loses: bool,
}

impl Default for ProbeFlags {
    fn default() -> Self {
        ProbeFlags {
            clinch_all: true,
            elim_all: true,
            clinch_when_wins: true,
            elim_when_loses: true,
            div_clinch_all: true,
            div_elim_all: true,
            div_clinch_when_wins: true,
            div_elim_when_loses: true,
        }
    }
}

/// Exhaustive enumeration over the current week's games.
///
/// For every outcome vector, a team is "secured" when the disfavored probe
/// puts it in the playoffs (or atop its division) in all repetitions, and
/// "blocked" when the favored probe keeps it out in all repetitions. A
/// clinch is reported when secured in every vector the team wins but not in
/// every vector outright; eliminations mirror that for losses.
pub fn brute_force_scenarios<R: Rng>(
    teams: &Teams,
    remaining: &[Matchup],
    h2h: &HeadToHead,
    current_week: Week,
    playoff_spots: usize,
    rng: &mut R,
) -> Result<Scenarios, SimError> {
    let week_matchups: Vec<&Matchup> = remaining
        .iter()
        .filter(|m| m.week == current_week)
        .collect();
    if week_matchups.is_empty() {
        return Ok(Scenarios::default());
    }

    let opponents = week_opponents(&week_matchups);
    let mut game_index: BTreeMap<TeamId, usize> = BTreeMap::new();
    for (idx, matchup) in week_matchups.iter().enumerate() {
        game_index.insert(matchup.home, idx);
        game_index.insert(matchup.away, idx);
    }

    let mut flags: BTreeMap<TeamId, ProbeFlags> = teams
        .keys()
        .map(|id| (*id, ProbeFlags::default()))
        .collect();

    let n_games = week_matchups.len();
    let owned_matchups: Vec<Matchup> = week_matchups.iter().map(|m| **m).collect();

    for outcome in 0u32..(1u32 << n_games) {
        let winners: Vec<TeamId> = (0..n_games)
            .map(|game| {
                if (outcome >> game) & 1 == 0 {
                    owned_matchups[game].home
                } else {
                    owned_matchups[game].away
                }
            })
            .collect();

        let (sim_teams, sim_h2h) = apply_outcome(teams, &owned_matchups, &winners);

        for (&tid, team_flags) in flags.iter_mut() {
            // Clinch probe: every coin flip goes against the team.
            let mut made_playoffs_all = true;
            let mut won_division_all = true;
            for _ in 0..COIN_FLIP_RUNS {
                let seeding = determine_playoffs(
                    &sim_teams,
                    h2h,
                    &sim_h2h,
                    playoff_spots,
                    Bias::disfavoring(tid),
                    rng,
                )?;
                if !seeding.seeds.contains(&tid) {
                    made_playoffs_all = false;
                }
                if !seeding.division_winners.contains(&tid) {
                    won_division_all = false;
                }
                if !made_playoffs_all && !won_division_all {
                    break;
                }
            }
            let won_own_game = game_index
                .get(&tid)
                .map(|&g| winners[g] == tid)
                .unwrap_or(false);
            if !made_playoffs_all {
                team_flags.clinch_all = false;
                if won_own_game {
                    team_flags.clinch_when_wins = false;
                }
            }
            if !won_division_all {
                team_flags.div_clinch_all = false;
                if won_own_game {
                    team_flags.div_clinch_when_wins = false;
                }
            }

            // Elimination probe: every coin flip goes the team's way.
            let mut missed_playoffs_all = true;
            let mut missed_division_all = true;
            for _ in 0..COIN_FLIP_RUNS {
                let seeding = determine_playoffs(
                    &sim_teams,
                    h2h,
                    &sim_h2h,
                    playoff_spots,
                    Bias::favoring(tid),
                    rng,
                )?;
                if seeding.seeds.contains(&tid) {
                    missed_playoffs_all = false;
                }
                if seeding.division_winners.contains(&tid) {
                    missed_division_all = false;
                }
                if !missed_playoffs_all && !missed_division_all {
                    break;
                }
            }
            let lost_own_game = game_index
                .get(&tid)
                .map(|&g| winners[g] != tid)
                .unwrap_or(false);
            if !missed_playoffs_all {
                team_flags.elim_all = false;
                if lost_own_game {
                    team_flags.elim_when_loses = false;
                }
            }
            if !missed_division_all {
                team_flags.div_elim_all = false;
                if lost_own_game {
                    team_flags.div_elim_when_loses = false;
                }
            }
        }
    }

    let mut clinch: Vec<String> = Vec::new();
    let mut elimination: Vec<String> = Vec::new();
    for (tid, team_flags) in &flags {
        let team = &teams[tid];
        let opponent = opponents.get(tid).map(|id| &teams[id]);
        let opponent = match opponent {
            Some(opponent) => opponent,
            None => continue,
        };

        // "Secured in every vector" means already clinched; no line then.
        if !team_flags.clinch_all && team_flags.clinch_when_wins {
            clinch.push(format!(
                "{} clinches playoff spot with a WIN vs {}",
                team.name, opponent.name
            ));
        }
        if !team_flags.div_clinch_all && team_flags.div_clinch_when_wins {
            clinch.push(format!(
                "{} clinches division with a WIN vs {}",
                team.name, opponent.name
            ));
        }
        if !team_flags.elim_all && team_flags.elim_when_loses {
            elimination.push(format!(
                "{} eliminated from playoffs if: LOSS to {}",
                team.name, opponent.name
            ));
        }
        if !team_flags.div_elim_all && team_flags.div_elim_when_loses {
            elimination.push(format!(
                "{} eliminated from division race if: LOSS to {}",
                team.name, opponent.name
            ));
        }
    }

    Ok(Scenarios {
        clinch: clinch.into_iter().unique().collect(),
        elimination: elimination.into_iter().unique().collect(),
    })
}

/// Magic-number based fallback for large remaining schedules.
pub fn analytical_scenarios(
    teams: &Teams,
    remaining: &[Matchup],
    magic: &BTreeMap<TeamId, MagicNumbers>,
    current_week: Week,
    playoff_spots: usize,
) -> Scenarios {
    let week_matchups: Vec<&Matchup> = remaining
        .iter()
        .filter(|m| m.week == current_week)
        .collect();
    let opponents = week_opponents(&week_matchups);

    let mut games_left: BTreeMap<TeamId, u32> = BTreeMap::new();
    for matchup in remaining {
        *games_left.entry(matchup.home).or_default() += 1;
        *games_left.entry(matchup.away).or_default() += 1;
    }

    let mut clinch: Vec<String> = Vec::new();
    let mut elimination: Vec<String> = Vec::new();

    for team in teams.values() {
        let team_magic = magic.get(&team.id).copied().unwrap_or_default();
        let opponent = opponents.get(&team.id).map(|id| &teams[id]);

        if let Some(opponent) = opponent {
            if team_magic.magic_division == Some(1) {
                clinch.push(format!(
                    "{} clinches division with a WIN vs {}",
                    team.name, opponent.name
                ));
            }
            if team_magic.magic_playoffs == Some(1) {
                clinch.push(format!(
                    "{} clinches playoff spot with a WIN vs {}",
                    team.name, opponent.name
                ));
            }
            if team_magic.magic_first_seed == Some(1) {
                clinch.push(format!(
                    "{} clinches #1 seed with a WIN vs {}",
                    team.name, opponent.name
                ));
            }

            if let Some(line) =
                elimination_this_week(team, opponent, teams, &games_left, playoff_spots)
            {
                elimination.push(line);
            }
        }
    }

    Scenarios {
        clinch: clinch.into_iter().unique().collect(),
        elimination: elimination.into_iter().unique().collect(),
    }
}

/// Elimination check for one team under "team loses, opponent wins".
///
/// Counts how many rivals are guaranteed to finish strictly above the
/// team's ceiling; at least `playoff_spots` such rivals means the loss
/// eliminates. Guarded so that already-dead teams are not listed.
fn elimination_this_week(
    team: &Team,
    opponent: &Team,
    teams: &Teams,
    games_left: &BTreeMap<TeamId, u32>,
    playoff_spots: usize,
) -> Option<String> {
    let left = games_left.get(&team.id).copied().unwrap_or(0);
    let team_max = team.effective_wins() + f64::from(left);
    let team_max_if_loses = team_max - 1.0;

    let mut scenario_mins: Vec<f64> = teams
        .values()
        .filter(|other| other.id != team.id)
        .map(|other| {
            if other.id == opponent.id {
                other.effective_wins() + 1.0
            } else {
                other.effective_wins()
            }
        })
        .collect();
    scenario_mins.sort_by(|a, b| b.total_cmp(a));

    let mut current: Vec<f64> = teams
        .values()
        .filter(|other| other.id != team.id)
        .map(Team::effective_wins)
        .collect();
    current.sort_by(|a, b| b.total_cmp(a));
    let bar_current = if current.len() >= playoff_spots {
        current[playoff_spots - 1]
    } else {
        0.0
    };
    let not_already_eliminated = team_max >= bar_current;

    if scenario_mins.len() >= playoff_spots {
        let bar_min = scenario_mins[playoff_spots - 1];
        if bar_min > team_max_if_loses && not_already_eliminated {
            return Some(format!(
                "{} eliminated from playoffs if: LOSS to {}",
                team.name, opponent.name
            ));
        }
    }
    None
}
