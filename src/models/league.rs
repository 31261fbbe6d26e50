//! League, LeagueStatus, MatchFormat and Division.

use crate::models::profile::ProfileId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a league.
pub type LeagueId = Uuid;

/// Unique identifier for a division.
pub type DivisionId = Uuid;

/// Lifecycle of a league. Only moves forward, one step at a time.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeagueStatus {
    /// Being set up; only its managers see it.
    #[default]
    Draft,
    /// Teams may join.
    RegistrationOpen,
    /// Matches are played and scored.
    Active,
    Completed,
}

impl LeagueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeagueStatus::Draft => "draft",
            LeagueStatus::RegistrationOpen => "registration_open",
            LeagueStatus::Active => "active",
            LeagueStatus::Completed => "completed",
        }
    }

    pub fn next(self) -> Option<LeagueStatus> {
        match self {
            LeagueStatus::Draft => Some(LeagueStatus::RegistrationOpen),
            LeagueStatus::RegistrationOpen => Some(LeagueStatus::Active),
            LeagueStatus::Active => Some(LeagueStatus::Completed),
            LeagueStatus::Completed => None,
        }
    }

    pub fn can_advance_to(self, to: LeagueStatus) -> bool {
        self.next() == Some(to)
    }
}

impl fmt::Display for LeagueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many sets a match is played over.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFormat {
    #[default]
    BestOfThree,
    BestOfFive,
}

impl MatchFormat {
    /// Sets a side must win to take the match.
    pub fn sets_to_win(self) -> u8 {
        match self {
            MatchFormat::BestOfThree => 2,
            MatchFormat::BestOfFive => 3,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeagueStatus,
    pub match_format: MatchFormat,
    pub created_by: ProfileId,
    pub created_at: DateTime<Utc>,
}

impl League {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        match_format: MatchFormat,
        created_by: ProfileId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            start_date,
            end_date,
            status: LeagueStatus::Draft,
            match_format,
            created_by,
            created_at: Utc::now(),
        }
    }
}

/// Skill tier inside a league. Level 1 is the top division.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub id: DivisionId,
    pub league_id: LeagueId,
    pub name: String,
    pub level: u32,
    pub max_teams: u32,
}

impl Division {
    pub fn new(league_id: LeagueId, name: impl Into<String>, level: u32, max_teams: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            league_id,
            name: name.into(),
            level,
            max_teams,
        }
    }
}
