//! Match (game), Side and SetScore for league fixtures.

use crate::models::league::{DivisionId, LeagueId};
use crate::models::team::TeamId;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of a fixture: team 1 or team 2.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting for both teams to confirm date and time.
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Confirmed => "confirmed",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }

    /// Date and time can still be negotiated.
    pub fn is_open(self) -> bool {
        matches!(self, MatchStatus::Pending | MatchStatus::Confirmed)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Games won by each side in one set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub team1: u8,
    pub team2: u8,
}

impl SetScore {
    pub fn new(team1: u8, team2: u8) -> Self {
        Self { team1, team2 }
    }
}

impl fmt::Display for SetScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.team1, self.team2)
    }
}

/// A fixture between two registered teams of one division.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub league_id: LeagueId,
    pub division_id: DivisionId,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub venue: Option<String>,
    pub status: MatchStatus,
    /// Per-set games, empty until a score is recorded.
    pub sets: Vec<SetScore>,
    /// Sets won by team 1.
    pub team1_score: Option<u8>,
    /// Sets won by team 2.
    pub team2_score: Option<u8>,
    pub winner_team_id: Option<TeamId>,
    pub updated_at: DateTime<Utc>,
}

impl GameMatch {
    pub fn new(
        league_id: LeagueId,
        division_id: DivisionId,
        team1_id: TeamId,
        team2_id: TeamId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            league_id,
            division_id,
            team1_id,
            team2_id,
            scheduled_date: None,
            scheduled_time: None,
            venue: None,
            status: MatchStatus::Pending,
            sets: Vec::new(),
            team1_score: None,
            team2_score: None,
            winner_team_id: None,
            updated_at: Utc::now(),
        }
    }

    pub fn team(&self, side: Side) -> TeamId {
        match side {
            Side::One => self.team1_id,
            Side::Two => self.team2_id,
        }
    }

    /// Side played by `team`, if it takes part in this match.
    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        if team == self.team1_id {
            Some(Side::One)
        } else if team == self.team2_id {
            Some(Side::Two)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, team: TeamId) -> Option<TeamId> {
        self.side_of(team).map(|side| self.team(side.other()))
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.side_of(team).is_some()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_date.is_some()
    }

    /// Unordered pairing key, equal for (a, b) and (b, a).
    pub fn pairing(&self) -> (TeamId, TeamId) {
        pairing(self.team1_id, self.team2_id)
    }
}

pub(crate) fn pairing(a: TeamId, b: TeamId) -> (TeamId, TeamId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
