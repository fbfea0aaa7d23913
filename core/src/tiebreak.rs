//! # Tiebreaker resolution
//!
//! Teams tied on overall win percentage are put into a strict total order by
//! an ESPN-style multi-level chain:
//!
//! 1. Head-to-head record among the tied teams, only usable when every pair
//!    in the group has played the same number of games against each other.
//! 1b. Pairwise elimination: a team that lost to every other team in the
//!    group is ranked behind the rest, even when the full head-to-head
//!    comparison is unusable.
//! 2. Division record (intra-division win percentage).
//! 3. Coin flip.
//!
//! The resolver seats one team and restarts from head-to-head for the
//! remaining group; when a level separates the group into more than one
//! stratum without singling anyone out, the strata are resolved recursively
//! and concatenated.
//!
//! The coin flip accepts a [`Bias`]: a disfavored team loses every flip and
//! a favored team wins every flip. Normal teams draw a key whose absolute
//! value is strictly below 1, so no draw can overturn the bias. This is what
//! makes clinch and elimination proofs deterministic: "disfavor the team"
//! yields the worst case for a clinch check, "favor the team" the best case
//! for an elimination check.
use crate::h2h::HeadToHead;
use crate::team::{Team, TeamId};
use itertools::Itertools;
use rand::Rng;
use std::collections::HashMap;

/// Coin-flip bias for a single resolver call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Bias {
    pub favor: Option<TeamId>,
    pub disfavor: Option<TeamId>,
}

impl Bias {
    /// Fair coin flips for everyone.
    pub fn none() -> Self {
        Self::default()
    }

    /// `id` wins every coin flip.
    pub fn favoring(id: TeamId) -> Self {
        Bias {
            favor: Some(id),
            disfavor: None,
        }
    }

    /// `id` loses every coin flip.
    pub fn disfavoring(id: TeamId) -> Self {
        Bias {
            favor: None,
            disfavor: Some(id),
        }
    }

    /// Sort key for the coin-flip level; lower sorts better.
    ///
    /// Unbiased keys are scaled so they can never reach the biased values.
    fn coin_key<R: Rng>(&self, id: TeamId, rng: &mut R) -> f64 {
        if self.disfavor == Some(id) {
            1.0
        } else if self.favor == Some(id) {
            -1.0
        } else {
            rng.gen::<f64>() * 1e-4
        }
    }
}

/// Order a group of teams tied on win percentage, best first.
///
/// `h2h` holds the historical records, `sim_h2h` the games generated within
/// the current simulation trial; the chain always reads their sum.
pub fn resolve_tiebreaker<'a, R: Rng>(
    tied: Vec<&'a Team>,
    h2h: &HeadToHead,
    sim_h2h: &HeadToHead,
    bias: Bias,
    rng: &mut R,
) -> Vec<&'a Team> {
    if tied.len() <= 1 {
        return tied;
    }
    let combined = h2h.combined(sim_h2h);
    resolve_group(tied, &combined, bias, rng)
}

/// Seat-one-and-restart loop over the combined head-to-head table.
fn resolve_group<'a, R: Rng>(
    tied: Vec<&'a Team>,
    combined: &HeadToHead,
    bias: Bias,
    rng: &mut R,
) -> Vec<&'a Team> {
    let mut remaining = tied;
    let mut seated: Vec<&Team> = Vec::new();

    while remaining.len() > 1 {
        // Level 1: head-to-head among the remaining group.
        if let Some(pcts) = h2h_group_pcts(&remaining, combined) {
            let best = max_value(pcts.values().copied());
            let best_teams: Vec<&Team> = remaining
                .iter()
                .copied()
                .filter(|t| pcts[&t.id] == best)
                .collect();

            if best_teams.len() == 1 {
                let winner = best_teams[0];
                seated.push(winner);
                remaining.retain(|t| t.id != winner.id);
                continue;
            }
            if best_teams.len() < remaining.len() {
                let rest: Vec<&Team> = remaining
                    .iter()
                    .copied()
                    .filter(|t| !best_teams.iter().any(|b| b.id == t.id))
                    .collect();
                seated.extend(resolve_group(best_teams, combined, bias, rng));
                seated.extend(resolve_group(rest, combined, bias, rng));
                return seated;
            }
        }

        // Level 1b: teams that lost every pairwise meeting go to the bottom.
        let (kept, swept): (Vec<&Team>, Vec<&Team>) = remaining
            .iter()
            .copied()
            .partition(|t| !lost_to_all(t, &remaining, combined));
        if !swept.is_empty() && swept.len() < remaining.len() {
            seated.extend(resolve_group(kept, combined, bias, rng));
            seated.extend(resolve_group(swept, combined, bias, rng));
            return seated;
        }

        // Level 2: division record.
        let best_div = max_value(remaining.iter().map(|t| t.division_win_pct()));
        let best_teams: Vec<&Team> = remaining
            .iter()
            .copied()
            .filter(|t| t.division_win_pct() == best_div)
            .collect();

        if best_teams.len() == 1 {
            let winner = best_teams[0];
            seated.push(winner);
            remaining.retain(|t| t.id != winner.id);
        } else if best_teams.len() < remaining.len() {
            let rest: Vec<&Team> = remaining
                .iter()
                .copied()
                .filter(|t| !best_teams.iter().any(|b| b.id == t.id))
                .collect();
            seated.extend(resolve_group(best_teams, combined, bias, rng));
            seated.extend(resolve_group(rest, combined, bias, rng));
            return seated;
        } else {
            // Level 3: coin flip, biased ids pinned to the extremes.
            let mut keyed: Vec<(f64, &Team)> = remaining
                .iter()
                .map(|t| (bias.coin_key(t.id, rng), *t))
                .collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            seated.extend(keyed.into_iter().map(|(_, t)| t));
            return seated;
        }
    }

    seated.extend(remaining);
    seated
}

/// Head-to-head win percentages within `group`.
///
/// Returns `None` when the pair totals differ, in which case head-to-head
/// cannot be applied to this group. A team with no games against the group
/// gets 0.5.
fn h2h_group_pcts(group: &[&Team], combined: &HeadToHead) -> Option<HashMap<TeamId, f64>> {
    let pair_totals: Vec<u32> = group
        .iter()
        .tuple_combinations()
        .map(|(a, b)| combined.games_between(a.id, b.id))
        .collect();
    if pair_totals.iter().unique().count() > 1 {
        return None;
    }

    let pcts = group
        .iter()
        .map(|team| {
            let (wins, losses, ties) = group
                .iter()
                .filter(|other| other.id != team.id)
                .fold((0, 0, 0), |acc, other| {
                    let (w, l, t) = combined.record_between(team.id, other.id);
                    (acc.0 + w, acc.1 + l, acc.2 + t)
                });
            let total = wins + losses + ties;
            let pct = if total > 0 {
                (f64::from(wins) + 0.5 * f64::from(ties)) / f64::from(total)
            } else {
                0.5
            };
            (team.id, pct)
        })
        .collect();
    Some(pcts)
}

/// Strictly more losses than wins against every other team in the group.
fn lost_to_all(team: &Team, group: &[&Team], combined: &HeadToHead) -> bool {
    group
        .iter()
        .filter(|other| other.id != team.id)
        .all(|other| {
            let (wins, losses, _) = combined.record_between(team.id, other.id);
            wins < losses
        })
}

/// Maximum over a non-empty iterator of floats.
fn max_value(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::{DivisionId, Record, Team};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn team(id: u32, division: u32, division_record: (u32, u32, u32)) -> Team {
        Team::new(
            TeamId(id),
            format!("Team {}", id).as_str(),
            DivisionId(division),
            Record::new(6, 4, 0),
            Record::new(division_record.0, division_record.1, division_record.2),
        )
    }

    fn ids(order: &[&Team]) -> Vec<TeamId> {
        order.iter().map(|t| t.id).collect()
    }

    #[test]
    fn h2h_decides_two_teams() {
        let a = team(1, 0, (0, 0, 0));
        let b = team(2, 0, (0, 0, 0));
        let mut h2h = HeadToHead::new();
        h2h.set_record(TeamId(1), TeamId(2), 2, 0, 0);
        let mut rng = StdRng::seed_from_u64(0);

        let order = resolve_tiebreaker(
            vec![&a, &b],
            &h2h,
            &HeadToHead::new(),
            Bias::none(),
            &mut rng,
        );
        assert_eq!(ids(&order), vec![TeamId(1), TeamId(2)]);
    }

    #[test]
    fn sim_games_count_toward_h2h() {
        let a = team(1, 0, (0, 0, 0));
        let b = team(2, 0, (0, 0, 0));
        let mut historical = HeadToHead::new();
        historical.set_record(TeamId(1), TeamId(2), 1, 1, 0);
        let mut sim = HeadToHead::new();
        sim.add_win(TeamId(2), TeamId(1));
        sim.add_win(TeamId(2), TeamId(1));
        let mut rng = StdRng::seed_from_u64(0);

        let order = resolve_tiebreaker(vec![&a, &b], &historical, &sim, Bias::none(), &mut rng);
        assert_eq!(ids(&order), vec![TeamId(2), TeamId(1)]);
    }

    #[test]
    fn unequal_pair_totals_disable_h2h() {
        // A beat B twice; A and C never met; C's division record is best.
        // With the equal-games gate failing, division record must decide.
        let a = team(1, 1, (2, 2, 0));
        let b = team(2, 1, (2, 2, 0));
        let c = team(3, 1, (3, 1, 0));
        let mut h2h = HeadToHead::new();
        h2h.set_record(TeamId(1), TeamId(2), 2, 0, 0);
        let mut rng = StdRng::seed_from_u64(0);

        let order = resolve_tiebreaker(
            vec![&a, &b, &c],
            &h2h,
            &HeadToHead::new(),
            Bias::none(),
            &mut rng,
        );
        assert_eq!(order[0].id, TeamId(3));
    }

    #[test]
    fn sweep_loser_goes_last() {
        // Pair totals differ (gate fails) but B lost to both A and C.
        let a = team(1, 0, (0, 0, 0));
        let b = team(2, 0, (0, 0, 0));
        let c = team(3, 0, (0, 0, 0));
        let mut h2h = HeadToHead::new();
        h2h.set_record(TeamId(1), TeamId(2), 2, 0, 0);
        h2h.set_record(TeamId(2), TeamId(3), 0, 1, 0);
        let mut rng = StdRng::seed_from_u64(1);

        let order = resolve_tiebreaker(
            vec![&a, &b, &c],
            &h2h,
            &HeadToHead::new(),
            Bias::none(),
            &mut rng,
        );
        assert_eq!(order[2].id, TeamId(2));
    }

    #[test]
    fn division_record_breaks_h2h_silence() {
        let a = team(1, 1, (4, 0, 0));
        let b = team(2, 1, (2, 2, 0));
        let mut rng = StdRng::seed_from_u64(0);

        let order = resolve_tiebreaker(
            vec![&b, &a],
            &HeadToHead::new(),
            &HeadToHead::new(),
            Bias::none(),
            &mut rng,
        );
        assert_eq!(ids(&order), vec![TeamId(1), TeamId(2)]);
    }

    #[test]
    fn disfavored_team_always_flips_last() {
        let teams: Vec<Team> = (1..=4).map(|id| team(id, 0, (0, 0, 0))).collect();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let order = resolve_tiebreaker(
                teams.iter().collect(),
                &HeadToHead::new(),
                &HeadToHead::new(),
                Bias::disfavoring(TeamId(3)),
                &mut rng,
            );
            assert_eq!(order[3].id, TeamId(3), "seed {}", seed);
        }
    }

    #[test]
    fn favored_team_always_flips_first() {
        let teams: Vec<Team> = (1..=4).map(|id| team(id, 0, (0, 0, 0))).collect();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let order = resolve_tiebreaker(
                teams.iter().collect(),
                &HeadToHead::new(),
                &HeadToHead::new(),
                Bias::favoring(TeamId(2)),
                &mut rng,
            );
            assert_eq!(order[0].id, TeamId(2), "seed {}", seed);
        }
    }

    #[test]
    fn resolution_is_idempotent_without_coin_flips() {
        // Fully decided by head-to-head: re-resolving the output must not
        // change the order.
        let a = team(1, 0, (0, 0, 0));
        let b = team(2, 0, (0, 0, 0));
        let c = team(3, 0, (0, 0, 0));
        let mut h2h = HeadToHead::new();
        h2h.set_record(TeamId(1), TeamId(2), 2, 0, 0);
        h2h.set_record(TeamId(1), TeamId(3), 2, 0, 0);
        h2h.set_record(TeamId(2), TeamId(3), 2, 0, 0);
        let empty = HeadToHead::new();
        let mut rng = StdRng::seed_from_u64(7);

        let first = resolve_tiebreaker(vec![&c, &a, &b], &h2h, &empty, Bias::none(), &mut rng);
        let second = resolve_tiebreaker(first.clone(), &h2h, &empty, Bias::none(), &mut rng);
        assert_eq!(ids(&first), vec![TeamId(1), TeamId(2), TeamId(3)]);
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn partial_h2h_separation_recurses_on_strata() {
        // All pairs have met exactly twice. A swept everyone; B and C split
        // their series but B has the better division record.
        let a = team(1, 1, (1, 3, 0));
        let b = team(2, 1, (3, 1, 0));
        let c = team(3, 1, (1, 3, 0));
        let mut h2h = HeadToHead::new();
        h2h.set_record(TeamId(1), TeamId(2), 2, 0, 0);
        h2h.set_record(TeamId(1), TeamId(3), 2, 0, 0);
        h2h.set_record(TeamId(2), TeamId(3), 1, 1, 0);
        let mut rng = StdRng::seed_from_u64(0);

        let order = resolve_tiebreaker(
            vec![&b, &c, &a],
            &h2h,
            &HeadToHead::new(),
            Bias::none(),
            &mut rng,
        );
        assert_eq!(ids(&order), vec![TeamId(1), TeamId(2), TeamId(3)]);
    }

    #[test]
    fn no_games_yield_half_pct_and_coin_flip() {
        let a = team(1, 0, (0, 0, 0));
        let b = team(2, 0, (0, 0, 0));
        let mut rng = StdRng::seed_from_u64(3);
        let order = resolve_tiebreaker(
            vec![&a, &b],
            &HeadToHead::new(),
            &HeadToHead::new(),
            Bias::none(),
            &mut rng,
        );
        assert_eq!(order.len(), 2);
    }
}
