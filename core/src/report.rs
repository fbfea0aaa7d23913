//! # Result surface
//!
//! The caller-facing report assembled after magic numbers, scenarios and
//! simulation have all run. Frequencies are per-team trial counts divided
//! by the number of trials actually performed.
//!
//! A frequency may round to certainty while the magic number says the team
//! has not mathematically clinched (or been locked into last place); such
//! values are clamped to 0.999 so the report never displays a false
//! certainty.
use crate::league::LeagueSnapshot;
use crate::magic::MagicNumbers;
use crate::scenario::Scenarios;
use crate::sim::SimulationOutcome;
use crate::sport::Sport;
use crate::team::{DivisionId, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Frequencies at or above this round to 1.000 in display.
const CERTAINTY_THRESHOLD: f64 = 0.9995;
/// Reported instead of a false 1.000.
const CLAMPED_CERTAINTY: f64 = 0.999;

/// Per-team entry of a simulation report.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TeamReport {
    pub id: TeamId,
    pub name: String,
    pub division_id: DivisionId,
    pub division_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub record: String,
    pub division_record: String,
    pub win_pct: f64,
    pub division_pct: f64,
    pub playoff_pct: f64,
    pub first_seed_pct: f64,
    pub last_place_pct: f64,
    pub magic_division: Option<u32>,
    pub magic_playoffs: Option<u32>,
    pub magic_first_seed: Option<u32>,
    pub magic_last: Option<u32>,
}

/// Complete result of one simulation request.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub league_name: String,
    pub platform: String,
    pub league_id: String,
    pub season: i32,
    pub sport: Sport,
    pub current_week: u32,
    pub total_weeks: u32,
    pub n_simulations: u32,
    pub teams: Vec<TeamReport>,
    pub clinch_scenarios: Vec<String>,
    pub elimination_scenarios: Vec<String>,
}

/// Identification of the league a report belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueRef {
    pub platform: String,
    pub league_id: String,
    pub season: i32,
    pub sport: Sport,
}

/// Assemble the report, applying probability clamping and ordering teams by
/// playoff probability.
pub fn build_report(
    snapshot: &LeagueSnapshot,
    league: &LeagueRef,
    outcome: &SimulationOutcome,
    magic: &BTreeMap<TeamId, MagicNumbers>,
    scenarios: Scenarios,
) -> SimulationReport {
    let trials = f64::from(outcome.trials_run.max(1));

    let mut teams: Vec<TeamReport> = snapshot
        .teams
        .values()
        .map(|team| {
            let tally = outcome.tallies.get(&team.id).copied().unwrap_or_default();
            let team_magic = magic.get(&team.id).copied().unwrap_or_default();

            let division_pct = clamp_unless_clinched(
                f64::from(tally.division_titles) / trials,
                team_magic.magic_division,
            );
            let playoff_pct = clamp_unless_clinched(
                f64::from(tally.playoff_berths) / trials,
                team_magic.magic_playoffs,
            );
            let first_seed_pct = clamp_unless_clinched(
                f64::from(tally.first_seeds) / trials,
                team_magic.magic_first_seed,
            );
            let last_place_pct = clamp_unless_clinched(
                f64::from(tally.last_places) / trials,
                team_magic.magic_last,
            );

            TeamReport {
                id: team.id,
                name: team.name.to_string(),
                division_id: team.division,
                division_name: snapshot.division_name(team.division),
                wins: team.record.wins,
                losses: team.record.losses,
                ties: team.record.ties,
                record: team.record.to_string(),
                division_record: team.division_record.to_string(),
                win_pct: team.win_pct(),
                division_pct,
                playoff_pct,
                first_seed_pct,
                last_place_pct,
                magic_division: team_magic.magic_division,
                magic_playoffs: team_magic.magic_playoffs,
                magic_first_seed: team_magic.magic_first_seed,
                magic_last: team_magic.magic_last,
            }
        })
        .collect();
    teams.sort_by(|a, b| b.playoff_pct.total_cmp(&a.playoff_pct));

    SimulationReport {
        league_name: snapshot.settings.league_name.clone(),
        platform: league.platform.clone(),
        league_id: league.league_id.clone(),
        season: league.season,
        sport: league.sport,
        current_week: snapshot.current_week.into(),
        total_weeks: snapshot.total_weeks.into(),
        n_simulations: outcome.trials_run,
        teams,
        clinch_scenarios: scenarios.clinch,
        elimination_scenarios: scenarios.elimination,
    }
}

/// Clamp a near-certain frequency unless the category is mathematically
/// decided (magic number `None`).
fn clamp_unless_clinched(pct: f64, magic: Option<u32>) -> f64 {
    if magic.is_some() && pct >= CERTAINTY_THRESHOLD {
        CLAMPED_CERTAINTY
    } else {
        pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::h2h::HeadToHead;
    use crate::league::mock_data;
    use crate::sim::{TeamTally, Tallies};

    fn outcome_with(playoffs: [u32; 4], n: u32) -> SimulationOutcome {
        let tallies: Tallies = playoffs
            .iter()
            .enumerate()
            .map(|(idx, &berths)| {
                (
                    TeamId(idx as u32 + 1),
                    TeamTally {
                        playoff_berths: berths,
                        ..TeamTally::default()
                    },
                )
            })
            .collect();
        SimulationOutcome {
            tallies,
            trials_run: n,
        }
    }

    fn league_ref() -> LeagueRef {
        LeagueRef {
            platform: String::from("espn"),
            league_id: String::from("123"),
            season: 2026,
            sport: Sport::Basketball,
        }
    }

    #[test]
    fn near_certainty_is_clamped_until_clinched() {
        let snapshot = mock_data::snapshot(
            [(9, 1, 0), (5, 5, 0), (4, 6, 0), (2, 8, 0)],
            [0, 0, 0, 0],
            vec![],
            HeadToHead::new(),
            2,
        );
        let outcome = outcome_with([10000, 9996, 4, 0], 10000);
        let mut magic: BTreeMap<TeamId, MagicNumbers> = BTreeMap::new();
        for id in snapshot.teams.keys() {
            magic.insert(*id, MagicNumbers::default());
        }
        // Team 2 has not clinched yet.
        magic.get_mut(&TeamId(2)).unwrap().magic_playoffs = Some(1);

        let report = build_report(
            &snapshot,
            &league_ref(),
            &outcome,
            &magic,
            Scenarios::default(),
        );
        let by_id = |id: u32| {
            report
                .teams
                .iter()
                .find(|t| t.id == TeamId(id))
                .unwrap()
                .clone()
        };
        // Mathematically clinched: full certainty stands.
        assert_eq!(by_id(1).playoff_pct, 1.0);
        // Not clinched: clamped below certainty.
        assert_eq!(by_id(2).playoff_pct, 0.999);
        assert_eq!(by_id(3).playoff_pct, 0.0004);
    }

    #[test]
    fn teams_ordered_by_playoff_probability() {
        let snapshot = mock_data::snapshot(
            [(2, 8, 0), (5, 5, 0), (9, 1, 0), (4, 6, 0)],
            [0, 0, 0, 0],
            vec![],
            HeadToHead::new(),
            2,
        );
        let outcome = outcome_with([100, 6000, 9900, 4000], 10000);
        let magic: BTreeMap<TeamId, MagicNumbers> = snapshot
            .teams
            .keys()
            .map(|id| (*id, MagicNumbers::default()))
            .collect();

        let report = build_report(
            &snapshot,
            &league_ref(),
            &outcome,
            &magic,
            Scenarios::default(),
        );
        let ids: Vec<TeamId> = report.teams.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TeamId(3), TeamId(2), TeamId(4), TeamId(1)]);
    }

    #[test]
    fn report_serializes_round_trip() {
        let snapshot = mock_data::snapshot(
            [(5, 5, 0), (5, 5, 0), (5, 5, 0), (5, 5, 0)],
            [0, 0, 0, 0],
            vec![],
            HeadToHead::new(),
            2,
        );
        let outcome = outcome_with([5000, 5000, 5000, 5000], 10000);
        let magic: BTreeMap<TeamId, MagicNumbers> = snapshot
            .teams
            .keys()
            .map(|id| (*id, MagicNumbers::default()))
            .collect();
        let report = build_report(
            &snapshot,
            &league_ref(),
            &outcome,
            &magic,
            Scenarios::default(),
        );

        let json = serde_json::to_string(&report).unwrap();
        let parsed: SimulationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
