//! Team (two players) and TeamInvitation.

use crate::models::profile::ProfileId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// Unique identifier for a team invitation.
pub type InvitationId = Uuid;

/// A padel pair. `player2_id` stays empty until an invitation is accepted.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub player1_id: ProfileId,
    pub player2_id: Option<ProfileId>,
    pub created_by: ProfileId,
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// New team with the creator as first player.
    pub fn new(name: impl Into<String>, creator: ProfileId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            player1_id: creator,
            player2_id: None,
            created_by: creator,
            created_at: Utc::now(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.player2_id.is_some()
    }

    pub fn has_player(&self, profile: ProfileId) -> bool {
        self.player1_id == profile || self.player2_id == Some(profile)
    }

    /// The partner of `profile` on this team, if `profile` plays here and the team is complete.
    pub fn other_player(&self, profile: ProfileId) -> Option<ProfileId> {
        if self.player1_id == profile {
            self.player2_id
        } else if self.player2_id == Some(profile) {
            Some(self.player1_id)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Cancelled,
    /// Left unanswered for too long.
    Expired,
}

/// Invitation for a second player to join a team, addressed by email.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamInvitation {
    pub id: InvitationId,
    pub team_id: TeamId,
    pub invited_email: String,
    pub invited_by: ProfileId,
    /// Short code carried in the invitation link.
    pub code: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

impl TeamInvitation {
    pub fn new(
        team_id: TeamId,
        invited_email: impl Into<String>,
        invited_by: ProfileId,
        code: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_id,
            invited_email: invited_email.into(),
            invited_by,
            code: code.into(),
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }
}
