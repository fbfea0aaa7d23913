//! End-to-end simulation properties on small leagues with fixed seeds.
use fps_core::h2h::HeadToHead;
use fps_core::league::{LeagueSettings, LeagueSnapshot};
use fps_core::magic::calculate_magic_numbers;
use fps_core::schedule::{Matchup, Week};
use fps_core::sim::{simulate_season, CancelToken, SimulationConfig, TeamTally};
use fps_core::team::{DivisionId, Record, Team, TeamId, Teams};
use more_asserts::{assert_ge, assert_le};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

const N: u32 = 10_000;

fn league(
    specs: &[(u32, &str, u32, (u32, u32))],
    remaining: Vec<Matchup>,
    h2h: HeadToHead,
    playoff_spots: usize,
    current_week: u32,
) -> LeagueSnapshot {
    let teams: Teams = specs
        .iter()
        .map(|&(id, name, division, (wins, losses))| {
            (
                TeamId(id),
                Team::new(
                    TeamId(id),
                    name,
                    DivisionId(division),
                    Record::new(wins, losses, 0),
                    Record::default(),
                ),
            )
        })
        .collect();
    let num_divisions = specs
        .iter()
        .map(|s| s.2)
        .collect::<std::collections::BTreeSet<_>>()
        .len() as u32;
    LeagueSnapshot::try_new(
        teams,
        BTreeMap::new(),
        remaining,
        Week(current_week),
        Week(current_week + 2),
        h2h,
        LeagueSettings {
            league_name: String::from("Test League"),
            playoff_spots,
            num_divisions,
            total_weeks: Week(current_week + 2),
        },
    )
    .expect("fixture snapshot must be valid")
}

fn run(snapshot: &LeagueSnapshot, seed: u64) -> BTreeMap<TeamId, TeamTally> {
    let config = SimulationConfig::new(N, snapshot.settings.playoff_spots);
    let mut rng = StdRng::seed_from_u64(seed);
    simulate_season(snapshot, &config, |_| {}, &CancelToken::new(), &mut rng)
        .expect("simulation must succeed")
        .tallies
}

#[test]
fn already_clinched_leader_sweeps_every_trial() {
    let snapshot = league(
        &[
            (1, "Alpha", 0, (10, 0)),
            (2, "Bravo", 0, (0, 10)),
            (3, "Charlie", 0, (0, 10)),
            (4, "Delta", 0, (0, 10)),
        ],
        vec![],
        HeadToHead::new(),
        2,
        11,
    );
    let tallies = run(&snapshot, 7);

    assert_eq!(tallies[&TeamId(1)].playoff_berths, N);
    assert_eq!(tallies[&TeamId(1)].first_seeds, N);
    assert_eq!(tallies[&TeamId(1)].division_titles, N);
    assert_eq!(tallies[&TeamId(1)].last_places, 0);

    // Mathematically clinched, so no magic number is reported.
    let magic =
        calculate_magic_numbers(&snapshot.teams, &snapshot.remaining, &snapshot.h2h, 2);
    assert_eq!(magic[&TeamId(1)].magic_playoffs, None);
    assert_eq!(magic[&TeamId(1)].magic_first_seed, None);
}

#[test]
fn toss_up_league_splits_evenly() {
    // Four teams at 5-5, one cross-matchup each; winning the game is
    // exactly qualifying, so each playoff probability hovers around 0.5.
    let snapshot = league(
        &[
            (1, "Alpha", 0, (5, 5)),
            (2, "Bravo", 0, (5, 5)),
            (3, "Charlie", 0, (5, 5)),
            (4, "Delta", 0, (5, 5)),
        ],
        vec![
            Matchup::new(TeamId(1), TeamId(3), Week(11), false),
            Matchup::new(TeamId(2), TeamId(4), Week(11), false),
        ],
        HeadToHead::new(),
        2,
        11,
    );
    let tallies = run(&snapshot, 11);

    for id in 1..=4 {
        let pct = f64::from(tallies[&TeamId(id)].playoff_berths) / f64::from(N);
        assert_ge!(pct, 0.48, "team {}", id);
        assert_le!(pct, 0.52, "team {}", id);
    }
}

#[test]
fn head_to_head_edge_breaks_symmetry() {
    // Alpha and Bravo share a record; Alpha swept the season series and the
    // remaining schedule never lets Bravo answer on the field.
    let mut h2h = HeadToHead::new();
    h2h.set_record(TeamId(1), TeamId(2), 2, 0, 0);
    let snapshot = league(
        &[
            (1, "Alpha", 0, (6, 4)),
            (2, "Bravo", 0, (6, 4)),
            (3, "Charlie", 0, (5, 5)),
            (4, "Delta", 0, (3, 7)),
        ],
        vec![
            Matchup::new(TeamId(1), TeamId(4), Week(11), false),
            Matchup::new(TeamId(2), TeamId(3), Week(11), false),
        ],
        h2h,
        2,
        11,
    );
    let tallies = run(&snapshot, 13);

    let alpha = tallies[&TeamId(1)];
    let bravo = tallies[&TeamId(2)];
    assert_ge!(
        alpha.playoff_berths,
        bravo.playoff_berths + N / 10,
        "sweep must show up in playoff odds"
    );
    assert_ge!(alpha.first_seeds, bravo.first_seeds + N / 10);
}

#[test]
fn outcome_counters_are_conserved() {
    let snapshot = league(
        &[
            (1, "Alpha", 1, (6, 4)),
            (2, "Bravo", 1, (5, 5)),
            (3, "Charlie", 2, (5, 5)),
            (4, "Delta", 2, (4, 6)),
        ],
        vec![
            Matchup::new(TeamId(1), TeamId(3), Week(11), false),
            Matchup::new(TeamId(2), TeamId(4), Week(11), false),
            Matchup::new(TeamId(1), TeamId(2), Week(12), true),
            Matchup::new(TeamId(3), TeamId(4), Week(12), true),
        ],
        HeadToHead::new(),
        3,
        11,
    );
    let tallies = run(&snapshot, 17);

    let sum = |f: fn(&TeamTally) -> u32| tallies.values().map(f).sum::<u32>();
    assert_eq!(sum(|t| t.playoff_berths), N * 3);
    assert_eq!(sum(|t| t.division_titles), N * 2);
    assert_eq!(sum(|t| t.first_seeds), N);
    assert_eq!(sum(|t| t.last_places), N);

    for (id, tally) in &tallies {
        assert_ge!(tally.playoff_berths, tally.first_seeds, "team {}", id);
        assert_ge!(tally.playoff_berths, tally.division_titles, "team {}", id);
    }
}

#[test]
fn single_division_title_equals_top_of_the_table() {
    // Everyone equal, everything decided by coin flips: each team wins the
    // lone division (and the #1 seed) about a quarter of the time.
    let snapshot = league(
        &[
            (1, "Alpha", 0, (5, 5)),
            (2, "Bravo", 0, (5, 5)),
            (3, "Charlie", 0, (5, 5)),
            (4, "Delta", 0, (5, 5)),
        ],
        vec![
            Matchup::new(TeamId(1), TeamId(2), Week(11), false),
            Matchup::new(TeamId(3), TeamId(4), Week(11), false),
        ],
        HeadToHead::new(),
        2,
        11,
    );
    let tallies = run(&snapshot, 19);

    assert_eq!(
        tallies.values().map(|t| t.division_titles).sum::<u32>(),
        N
    );
    for (id, tally) in &tallies {
        assert_ge!(tally.division_titles, N / 5, "team {}", id);
        assert_le!(tally.division_titles, N * 3 / 10, "team {}", id);
        assert_ge!(tally.first_seeds, N / 5, "team {}", id);
        assert_le!(tally.first_seeds, N * 3 / 10, "team {}", id);
    }
}

#[test]
fn same_seed_same_tallies_across_runs() {
    let snapshot = league(
        &[
            (1, "Alpha", 0, (6, 4)),
            (2, "Bravo", 0, (5, 5)),
            (3, "Charlie", 0, (5, 5)),
            (4, "Delta", 0, (4, 6)),
        ],
        vec![
            Matchup::new(TeamId(1), TeamId(2), Week(11), false),
            Matchup::new(TeamId(3), TeamId(4), Week(11), false),
            Matchup::new(TeamId(1), TeamId(3), Week(12), false),
        ],
        HeadToHead::new(),
        2,
        11,
    );
    assert_eq!(run(&snapshot, 23), run(&snapshot, 23));
}
