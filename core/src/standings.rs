//! # Playoff determination
//!
//! Given (per-trial) standings, produces the seeded playoff field:
//! division winners first, wild cards by win percentage, with every tied
//! stratum handed to the tiebreaker as a group. Division winners get no
//! seeding bonus; the #1 seed is decided purely by record and tiebreakers.
use crate::h2h::HeadToHead;
use crate::sim::SimError;
use crate::team::{DivisionId, Team, TeamId, Teams};
use crate::tiebreak::{resolve_tiebreaker, Bias};
use rand::Rng;
use std::collections::BTreeMap;

/// Outcome of one playoff determination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seeding {
    /// Playoff qualifiers in seed order, #1 seed first.
    pub seeds: Vec<TeamId>,
    /// One winner per division, in division-id order.
    pub division_winners: Vec<TeamId>,
}

impl Seeding {
    pub fn first_seed(&self) -> Option<TeamId> {
        self.seeds.first().copied()
    }
}

/// Determine playoff teams and seeding from standings and tiebreakers.
///
/// Teams with division id 0 are grouped as a single division, which is what
/// a division-less league amounts to.
///
/// # Errors
///
/// Returns an internal-assertion error when fewer seats were filled than the
/// league configuration demands; that indicates a bug, not bad input.
pub fn determine_playoffs<R: Rng>(
    teams: &Teams,
    h2h: &HeadToHead,
    sim_h2h: &HeadToHead,
    playoff_spots: usize,
    bias: Bias,
    rng: &mut R,
) -> Result<Seeding, SimError> {
    let mut divisions: BTreeMap<DivisionId, Vec<&Team>> = BTreeMap::new();
    for team in teams.values() {
        divisions.entry(team.division).or_default().push(team);
    }

    let mut division_winners: Vec<TeamId> = Vec::new();
    for group in divisions.values() {
        let best = best_pct(group.iter().copied());
        let tied: Vec<&Team> = group
            .iter()
            .copied()
            .filter(|t| t.win_pct() == best)
            .collect();
        let ordered = if tied.len() > 1 {
            resolve_tiebreaker(tied, h2h, sim_h2h, bias, rng)
        } else {
            tied
        };
        // Non-empty: the division entry only exists because a team was pushed.
        division_winners.push(ordered[0].id);
    }

    // Wild cards: remaining teams by win percentage, tied strata resolved as
    // groups, taken until the field is full.
    let mut candidates: Vec<&Team> = teams
        .values()
        .filter(|t| !division_winners.contains(&t.id))
        .collect();
    candidates.sort_by(|a, b| b.win_pct().total_cmp(&a.win_pct()));

    let spots_needed = playoff_spots.saturating_sub(division_winners.len());
    let mut wild_cards: Vec<TeamId> = Vec::new();
    let mut idx = 0;
    while wild_cards.len() < spots_needed && idx < candidates.len() {
        let current = candidates[idx].win_pct();
        let tied: Vec<&Team> = candidates[idx..]
            .iter()
            .copied()
            .filter(|t| t.win_pct() == current)
            .collect();
        let stratum_len = tied.len();
        let ordered = if stratum_len > 1 {
            resolve_tiebreaker(tied, h2h, sim_h2h, bias, rng)
        } else {
            tied
        };
        for team in ordered {
            if wild_cards.len() < spots_needed {
                wild_cards.push(team.id);
            } else {
                break;
            }
        }
        idx += stratum_len;
    }

    // Seeding: all qualifiers by win percentage; only a tie at the top is
    // re-resolved, since only the #1 seed matters beyond qualification.
    let mut seeds: Vec<TeamId> = division_winners
        .iter()
        .chain(wild_cards.iter())
        .copied()
        .collect();
    seeds.sort_by(|a, b| teams[b].win_pct().total_cmp(&teams[a].win_pct()));

    if seeds.len() >= 2 {
        let best = teams[&seeds[0]].win_pct();
        let tied: Vec<&Team> = seeds
            .iter()
            .map(|id| &teams[id])
            .filter(|t| t.win_pct() == best)
            .collect();
        if tied.len() > 1 {
            let ordered = resolve_tiebreaker(tied, h2h, sim_h2h, bias, rng);
            let mut reordered: Vec<TeamId> = ordered.iter().map(|t| t.id).collect();
            reordered.extend(
                seeds
                    .iter()
                    .copied()
                    .filter(|id| teams[id].win_pct() != best),
            );
            seeds = reordered;
        }
    }

    let expected = playoff_spots.min(teams.len());
    if seeds.len() < expected {
        return Err(SimError::Invariant(format!(
            "seeded {} teams where {} were expected",
            seeds.len(),
            expected
        )));
    }

    Ok(Seeding {
        seeds,
        division_winners,
    })
}

fn best_pct<'a>(teams: impl Iterator<Item = &'a Team>) -> f64 {
    teams.map(|t| t.win_pct()).fold(f64::NEG_INFINITY, f64::max)
}
