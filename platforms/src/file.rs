//! # Snapshot file adapter
//!
//! An adapter over a JSON league document. Handy for the CLI, for test
//! fixtures, and for replaying a league state captured from a real
//! provider. The document schema deliberately mirrors what the HTTP
//! providers produce, one parse struct per section, converted into the core
//! domain types on fetch.
use crate::adapter::{PlatformAdapter, PlatformError};
use fps_core::h2h::HeadToHead;
use fps_core::league::LeagueSettings;
use fps_core::schedule::{Matchup, Week};
use fps_core::team::{DivisionId, Record, Team, TeamId, Teams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Root of the snapshot document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeagueFile {
    pub league_name: String,
    /// When present, [`PlatformAdapter::validate_league`] checks it.
    #[serde(default)]
    pub league_id: Option<String>,
    pub playoff_spots: usize,
    pub current_week: u32,
    pub total_weeks: u32,
    #[serde(default)]
    pub divisions: Vec<ParseDivision>,
    pub teams: Vec<ParseTeam>,
    #[serde(default)]
    pub matchups: Vec<ParseMatchup>,
    #[serde(default)]
    pub head_to_head: Vec<ParseH2h>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParseDivision {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParseTeam {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub division: u32,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    #[serde(default)]
    pub division_wins: u32,
    #[serde(default)]
    pub division_losses: u32,
    #[serde(default)]
    pub division_ties: u32,
}

impl From<&ParseTeam> for Team {
    fn from(parsed: &ParseTeam) -> Team {
        Team::new(
            TeamId(parsed.id),
            parsed.name.as_str(),
            DivisionId(parsed.division),
            Record::new(parsed.wins, parsed.losses, parsed.ties),
            Record::new(
                parsed.division_wins,
                parsed.division_losses,
                parsed.division_ties,
            ),
        )
    }
}

/// Unplayed matchup; the division-game flag is derived from the teams.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParseMatchup {
    pub home: u32,
    pub away: u32,
    pub week: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParseH2h {
    pub team_a: u32,
    pub team_b: u32,
    pub wins_a: u32,
    pub wins_b: u32,
    #[serde(default)]
    pub ties: u32,
}

/// [`PlatformAdapter`] backed by a [`LeagueFile`].
#[derive(Debug, Clone)]
pub struct SnapshotAdapter {
    file: LeagueFile,
}

impl SnapshotAdapter {
    pub fn new(file: LeagueFile) -> Self {
        SnapshotAdapter { file }
    }

    /// Load a snapshot document from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PlatformError> {
        let data = fs::read_to_string(&path)
            .map_err(|e| PlatformError::Transport(format!("reading snapshot file: {}", e)))?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, PlatformError> {
        let file: LeagueFile = serde_json::from_str(data)
            .map_err(|e| PlatformError::Transport(format!("parsing snapshot file: {}", e)))?;
        Ok(SnapshotAdapter::new(file))
    }
}

impl PlatformAdapter for SnapshotAdapter {
    fn platform_name(&self) -> &'static str {
        "file"
    }

    fn validate_league(&mut self, league_id: &str, _season: i32) -> Result<(), PlatformError> {
        match &self.file.league_id {
            Some(stored) if stored != league_id => {
                Err(PlatformError::LeagueNotFound(String::from(league_id)))
            }
            _ => Ok(()),
        }
    }

    fn fetch_standings(
        &mut self,
        _league_id: &str,
        _season: i32,
    ) -> Result<(Teams, BTreeMap<DivisionId, String>), PlatformError> {
        let teams: Teams = self
            .file
            .teams
            .iter()
            .map(|parsed| (TeamId(parsed.id), Team::from(parsed)))
            .collect();
        let division_names: BTreeMap<DivisionId, String> = self
            .file
            .divisions
            .iter()
            .map(|division| (DivisionId(division.id), division.name.clone()))
            .collect();
        Ok((teams, division_names))
    }

    fn fetch_schedule(
        &mut self,
        _league_id: &str,
        _season: i32,
        teams: &Teams,
    ) -> Result<(Vec<Matchup>, Week, Week), PlatformError> {
        let remaining = self
            .file
            .matchups
            .iter()
            .map(|parsed| {
                let home = TeamId(parsed.home);
                let away = TeamId(parsed.away);
                let divisional = match (teams.get(&home), teams.get(&away)) {
                    (Some(home_team), Some(away_team)) => {
                        home_team.division == away_team.division
                            && !home_team.division.is_none()
                    }
                    // Unknown ids are left for snapshot validation to reject.
                    _ => false,
                };
                Matchup::new(home, away, Week(parsed.week), divisional)
            })
            .collect();
        Ok((
            remaining,
            Week(self.file.current_week),
            Week(self.file.total_weeks),
        ))
    }

    fn fetch_head_to_head(
        &mut self,
        _league_id: &str,
        _season: i32,
        _teams: &Teams,
    ) -> Result<HeadToHead, PlatformError> {
        let mut h2h = HeadToHead::new();
        for entry in &self.file.head_to_head {
            h2h.set_record(
                TeamId(entry.team_a),
                TeamId(entry.team_b),
                entry.wins_a,
                entry.wins_b,
                entry.ties,
            );
        }
        Ok(h2h)
    }

    fn fetch_league_settings(
        &mut self,
        _league_id: &str,
        _season: i32,
    ) -> Result<LeagueSettings, PlatformError> {
        let num_divisions = if self.file.divisions.is_empty() {
            self.file
                .teams
                .iter()
                .map(|t| t.division)
                .collect::<std::collections::BTreeSet<_>>()
                .len() as u32
        } else {
            self.file.divisions.len() as u32
        };
        Ok(LeagueSettings {
            league_name: self.file.league_name.clone(),
            playoff_spots: self.file.playoff_spots,
            num_divisions,
            total_weeks: Week(self.file.total_weeks),
        })
    }
}
