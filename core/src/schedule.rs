//! Scheduled matchups
use crate::team::TeamId;
use derive_more::{Add, AddAssign, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Week number within a season.
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
    Add,
    AddAssign,
)]
pub struct Week(pub u32);

/// An unplayed matchup.
///
/// There is no score: outcomes are only ever assigned by the simulator or by
/// scenario enumeration.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matchup {
    pub home: TeamId,
    pub away: TeamId,
    pub week: Week,
    pub is_division_game: bool,
}

impl Matchup {
    pub fn new(home: TeamId, away: TeamId, week: Week, is_division_game: bool) -> Self {
        Matchup {
            home,
            away,
            week,
            is_division_game,
        }
    }

    pub fn involves(&self, id: TeamId) -> bool {
        self.home == id || self.away == id
    }

    /// The other side of the matchup, if `id` plays in it.
    pub fn opponent_of(&self, id: TeamId) -> Option<TeamId> {
        if self.home == id {
            Some(self.away)
        } else if self.away == id {
            Some(self.home)
        } else {
            None
        }
    }
}
