//! League snapshot
//!
//! A snapshot is built once per request from provider data, consumed by the
//! magic-number, scenario and simulation passes, then discarded. All
//! components treat it as immutable.
use crate::h2h::HeadToHead;
use crate::schedule::{Matchup, Week};
use crate::team::{DivisionId, TeamId, Teams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// League configuration as reported by the provider.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LeagueSettings {
    pub league_name: String,
    pub playoff_spots: usize,
    pub num_divisions: u32,
    pub total_weeks: Week,
}

/// Complete input state for one simulation request.
#[derive(Debug, Clone)]
pub struct LeagueSnapshot {
    pub teams: Teams,
    pub division_names: BTreeMap<DivisionId, String>,
    pub remaining: Vec<Matchup>,
    pub current_week: Week,
    pub total_weeks: Week,
    pub h2h: HeadToHead,
    pub settings: LeagueSettings,
}

impl LeagueSnapshot {
    /// Fallible constructor enforcing snapshot invariants.
    ///
    /// # Errors
    ///
    /// - the league must contain at least one team,
    /// - every matchup must reference two distinct team ids present in the
    ///   snapshot,
    /// - the division-game flag on a matchup must equal "both teams share a
    ///   real division".
    pub fn try_new(
        teams: Teams,
        division_names: BTreeMap<DivisionId, String>,
        remaining: Vec<Matchup>,
        current_week: Week,
        total_weeks: Week,
        h2h: HeadToHead,
        settings: LeagueSettings,
    ) -> Result<Self, SnapshotError> {
        if teams.is_empty() {
            return Err(SnapshotError::NoTeams);
        }
        for matchup in &remaining {
            if matchup.home == matchup.away {
                return Err(SnapshotError::SelfPaired {
                    week: matchup.week,
                    id: matchup.home,
                });
            }
            for id in [matchup.home, matchup.away] {
                if !teams.contains_key(&id) {
                    return Err(SnapshotError::UnknownTeam {
                        week: matchup.week,
                        id,
                    });
                }
            }
            let home_division = teams[&matchup.home].division;
            let away_division = teams[&matchup.away].division;
            let divisional = home_division == away_division && !home_division.is_none();
            if matchup.is_division_game != divisional {
                return Err(SnapshotError::DivisionFlag {
                    home: matchup.home,
                    away: matchup.away,
                });
            }
        }
        Ok(LeagueSnapshot {
            teams,
            division_names,
            remaining,
            current_week,
            total_weeks,
            h2h,
            settings,
        })
    }

    /// Display name for a division, falling back to a generic label.
    pub fn division_name(&self, id: DivisionId) -> String {
        self.division_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Division {}", id))
    }
}

/// Inconsistent provider data; fatal to the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("league snapshot contains no teams")]
    NoTeams,
    #[error("matchup in week {week} references unknown team id {id}")]
    UnknownTeam { week: Week, id: TeamId },
    #[error("matchup in week {week} pairs team {id} against itself")]
    SelfPaired { week: Week, id: TeamId },
    #[error("division-game flag on matchup {home} vs {away} contradicts team divisions")]
    DivisionFlag { home: TeamId, away: TeamId },
}

#[cfg(test)]
pub(crate) mod mock_data {
    use super::*;
    use crate::team::{Record, Team};

    /// Four-team league, configurable records and schedule.
    pub fn snapshot(
        records: [(u32, u32, u32); 4],
        divisions: [u32; 4],
        remaining: Vec<Matchup>,
        h2h: HeadToHead,
        playoff_spots: usize,
    ) -> LeagueSnapshot {
        let names = ["Alpha", "Bravo", "Charlie", "Delta"];
        let teams: Teams = records
            .iter()
            .zip(divisions.iter())
            .enumerate()
            .map(|(idx, (&(w, l, t), &div))| {
                let id = TeamId(idx as u32 + 1);
                (
                    id,
                    Team::new(
                        id,
                        names[idx],
                        DivisionId(div),
                        Record::new(w, l, t),
                        Record::default(),
                    ),
                )
            })
            .collect();
        let num_divisions = {
            let mut ids: Vec<u32> = divisions.to_vec();
            ids.sort_unstable();
            ids.dedup();
            ids.len() as u32
        };
        LeagueSnapshot::try_new(
            teams,
            BTreeMap::new(),
            remaining,
            Week(11),
            Week(13),
            h2h,
            LeagueSettings {
                league_name: String::from("Mock League"),
                playoff_spots,
                num_divisions,
                total_weeks: Week(13),
            },
        )
        .expect("mock snapshot must be valid")
    }
}
