//! Teams and their records
use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique team identifier within a league snapshot.
#[derive(
    Deserialize,
    Serialize,
    Debug,
    Display,
    Clone,
    Copy,
    std::cmp::Eq,
    std::cmp::PartialEq,
    std::cmp::Ord,
    std::cmp::PartialOrd,
    std::hash::Hash,
    From,
    Into,
)]
pub struct TeamId(pub u32);

/// Division identifier.
///
/// Providers that do not support divisions report id 0 for every team.
#[derive(
    Deserialize,
    Serialize,
    Debug,
    Display,
    Default,
    Clone,
    Copy,
    std::cmp::Eq,
    std::cmp::PartialEq,
    std::cmp::Ord,
    std::cmp::PartialOrd,
    std::hash::Hash,
    From,
    Into,
)]
pub struct DivisionId(pub u32);

impl DivisionId {
    pub const NONE: DivisionId = DivisionId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

#[derive(Display, Debug, Clone, AsRef, From, Into, Deserialize, Serialize, PartialEq, Eq)]
#[as_ref(forward)]
pub struct TeamName(pub String);

impl From<&str> for TeamName {
    fn from(name: &str) -> Self {
        TeamName(String::from(name))
    }
}

/// Win-loss-tie record, overall or intra-division.
#[derive(Deserialize, Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Record {
    pub fn new(wins: u32, losses: u32, ties: u32) -> Self {
        Record { wins, losses, ties }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Winning percentage with ties worth half a win. 0 when no games played.
    pub fn win_pct(&self) -> f64 {
        let total = self.games_played();
        if total == 0 {
            return 0.0;
        }
        self.effective_wins() / f64::from(total)
    }

    /// Wins plus half a win per tie.
    pub fn effective_wins(&self) -> f64 {
        f64::from(self.wins) + 0.5 * f64::from(self.ties)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wins, self.losses, self.ties)
    }
}

/// Fantasy team with overall and intra-division records.
///
/// Snapshot teams are never mutated in place; the simulator clones the whole
/// team map per trial and mutates the copies.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Team {
    pub id: TeamId,
    pub name: TeamName,
    pub division: DivisionId,
    pub record: Record,
    pub division_record: Record,
}

impl Team {
    pub fn new<TN: Into<TeamName>>(
        id: TeamId,
        name: TN,
        division: DivisionId,
        record: Record,
        division_record: Record,
    ) -> Self {
        Team {
            id,
            name: name.into(),
            division,
            record,
            division_record,
        }
    }

    pub fn win_pct(&self) -> f64 {
        self.record.win_pct()
    }

    pub fn division_win_pct(&self) -> f64 {
        self.division_record.win_pct()
    }

    pub fn effective_wins(&self) -> f64 {
        self.record.effective_wins()
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Teams keyed by id.
///
/// A `BTreeMap` keeps iteration order deterministic, which the simulation
/// relies on for seed reproducibility.
pub type Teams = BTreeMap<TeamId, Team>;
