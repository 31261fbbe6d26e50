//! LeagueRegistration: a team's place in a league division, carrying its standings.

use crate::models::league::{DivisionId, LeagueId};
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a registration.
pub type RegistrationId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Approved,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LeagueRegistration {
    pub id: RegistrationId,
    pub league_id: LeagueId,
    pub division_id: DivisionId,
    pub team_id: TeamId,
    /// Win/loss points (3 per win, 1 per loss).
    pub points: u32,
    pub bonus_points: u32,
    pub matches_played: u32,
    pub matches_won: u32,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
}

impl LeagueRegistration {
    pub fn new(league_id: LeagueId, division_id: DivisionId, team_id: TeamId) -> Self {
        Self {
            id: Uuid::new_v4(),
            league_id,
            division_id,
            team_id,
            points: 0,
            bonus_points: 0,
            matches_played: 0,
            matches_won: 0,
            status: RegistrationStatus::Pending,
            registered_at: Utc::now(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == RegistrationStatus::Approved
    }

    pub fn total_points(&self) -> u32 {
        self.points + self.bonus_points
    }

    /// Share of played matches won, 0.0 when nothing was played.
    pub fn win_percentage(&self) -> f64 {
        if self.matches_played == 0 {
            0.0
        } else {
            f64::from(self.matches_won) * 100.0 / f64::from(self.matches_played)
        }
    }
}
