//! Supported sports and season inference
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fantasy sports the simulator understands.
#[derive(
    Deserialize,
    Serialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Basketball,
    Football,
    Baseball,
    Hockey,
}

impl Sport {
    pub const ALL: [Sport; 4] = [
        Sport::Basketball,
        Sport::Football,
        Sport::Baseball,
        Sport::Hockey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Basketball => "basketball",
            Sport::Football => "football",
            Sport::Baseball => "baseball",
            Sport::Hockey => "hockey",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sport '{0}'; supported: basketball, football, baseball, hockey")]
pub struct ParseSportError(String);

impl FromStr for Sport {
    type Err = ParseSportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basketball" => Ok(Sport::Basketball),
            "football" => Ok(Sport::Football),
            "baseball" => Ok(Sport::Baseball),
            "hockey" => Ok(Sport::Hockey),
            _ => Err(ParseSportError(String::from(s))),
        }
    }
}

/// The season year currently in progress for a sport.
pub fn current_season(sport: Sport) -> i32 {
    let now = Local::now();
    season_for(sport, now.year(), now.month())
}

/// Season year for a given calendar year and month.
///
/// Basketball and hockey seasons span two calendar years and are named
/// after the later one; football played in January or February belongs to
/// the previous year's season; baseball stays within one calendar year.
fn season_for(sport: Sport, year: i32, month: u32) -> i32 {
    match sport {
        Sport::Basketball | Sport::Hockey => {
            if month >= 10 {
                year + 1
            } else {
                year
            }
        }
        Sport::Football => {
            if month <= 2 {
                year - 1
            } else {
                year
            }
        }
        Sport::Baseball => year,
    }
}
