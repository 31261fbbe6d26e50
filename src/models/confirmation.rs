//! Per-team acceptance record for a match, with an optional reschedule proposal.

use crate::models::game::MatchId;
use crate::models::profile::ProfileId;
use crate::models::team::TeamId;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reschedule proposals allowed per match (proposals and counter-proposals together).
pub const MAX_RESCHEDULE_ROUNDS: u8 = 3;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    #[default]
    Pending,
    Confirmed,
    /// This team proposed another date and waits for the opponent.
    RescheduleProposed,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchConfirmation {
    pub id: Uuid,
    pub match_id: MatchId,
    pub team_id: TeamId,
    pub status: ConfirmationStatus,
    pub proposed_date: Option<NaiveDate>,
    pub proposed_time: Option<NaiveTime>,
    pub message: Option<String>,
    /// Round number of this team's latest proposal (0 = never proposed).
    pub reschedule_round: u8,
    pub confirmed_by: Option<ProfileId>,
    pub updated_at: DateTime<Utc>,
}

impl MatchConfirmation {
    pub fn new(match_id: MatchId, team_id: TeamId) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id,
            team_id,
            status: ConfirmationStatus::Pending,
            proposed_date: None,
            proposed_time: None,
            message: None,
            reschedule_round: 0,
            confirmed_by: None,
            updated_at: Utc::now(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ConfirmationStatus::Confirmed
    }

    pub fn has_proposal(&self) -> bool {
        self.status == ConfirmationStatus::RescheduleProposed
    }

    /// Back to pending, dropping any proposal.
    pub fn reset(&mut self) {
        self.status = ConfirmationStatus::Pending;
        self.clear_proposal();
        self.confirmed_by = None;
        self.updated_at = Utc::now();
    }

    pub fn clear_proposal(&mut self) {
        self.proposed_date = None;
        self.proposed_time = None;
        self.message = None;
    }
}
