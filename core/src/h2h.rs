//! # Head-to-head table
//!
//! Records between pairs of teams, keyed canonically by `(min(id), max(id))`.
//! Any pair absent from the table has record `(0, 0, 0)`.
//!
//! Two tables of this shape circulate: the historical table from the
//! provider, and a transient per-trial table holding games generated during
//! a single simulation. The tiebreaker always consumes their component-wise
//! sum, built eagerly with [`HeadToHead::combined`] so that simulated games
//! can never be silently dropped.
use crate::team::TeamId;
use std::collections::BTreeMap;

/// Wins and ties between one pair of teams, stored in canonical orientation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PairRecord {
    /// Wins of the team with the lower id.
    pub lower_wins: u32,
    /// Wins of the team with the higher id.
    pub higher_wins: u32,
    pub ties: u32,
}

impl PairRecord {
    pub fn total_games(&self) -> u32 {
        self.lower_wins + self.higher_wins + self.ties
    }
}

/// Head-to-head records for all pairs that have met.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeadToHead(BTreeMap<(TeamId, TeamId), PairRecord>);

impl HeadToHead {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: TeamId, b: TeamId) -> (TeamId, TeamId) {
        (a.min(b), a.max(b))
    }

    /// Set the record between `a` and `b`, given oriented to `a`.
    pub fn set_record(&mut self, a: TeamId, b: TeamId, a_wins: u32, b_wins: u32, ties: u32) {
        let record = if a < b {
            PairRecord {
                lower_wins: a_wins,
                higher_wins: b_wins,
                ties,
            }
        } else {
            PairRecord {
                lower_wins: b_wins,
                higher_wins: a_wins,
                ties,
            }
        };
        self.0.insert(Self::key(a, b), record);
    }

    /// Record a decided game.
    pub fn add_win(&mut self, winner: TeamId, loser: TeamId) {
        let entry = self.0.entry(Self::key(winner, loser)).or_default();
        if winner < loser {
            entry.lower_wins += 1;
        } else {
            entry.higher_wins += 1;
        }
    }

    /// Record between `a` and `b` as `(a_wins, b_wins, ties)`.
    pub fn record_between(&self, a: TeamId, b: TeamId) -> (u32, u32, u32) {
        let record = self
            .0
            .get(&Self::key(a, b))
            .copied()
            .unwrap_or_default();
        if a < b {
            (record.lower_wins, record.higher_wins, record.ties)
        } else {
            (record.higher_wins, record.lower_wins, record.ties)
        }
    }

    /// Total games played between `a` and `b`.
    pub fn games_between(&self, a: TeamId, b: TeamId) -> u32 {
        self.0
            .get(&Self::key(a, b))
            .map(PairRecord::total_games)
            .unwrap_or(0)
    }

    /// Component-wise sum of two tables.
    pub fn combined(&self, other: &HeadToHead) -> HeadToHead {
        let mut sum = self.clone();
        for (key, record) in &other.0 {
            let entry = sum.0.entry(*key).or_default();
            entry.lower_wins += record.lower_wins;
            entry.higher_wins += record.higher_wins;
            entry.ties += record.ties;
        }
        sum
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(TeamId, TeamId), &PairRecord)> {
        self.0.iter()
    }
}
