//! Profile, Role and the Account credentials behind a profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a profile (one per signed-up user).
pub type ProfileId = Uuid;

/// What a user is allowed to do.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Player,
    /// Creates and runs leagues once a super admin approved the account.
    LeagueAdmin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::LeagueAdmin => "league_admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public profile of a user.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Players are approved on creation; league admins wait for a super admin.
    pub is_approved: bool,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(email: impl Into<String>, full_name: impl Into<String>, role: Role) -> Self {
        Self::with_id(Uuid::new_v4(), email, full_name, role)
    }

    pub fn with_id(
        id: ProfileId,
        email: impl Into<String>,
        full_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            full_name: full_name.into(),
            role,
            is_approved: role != Role::LeagueAdmin,
            phone: None,
            country: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// Super admins always; league admins only once approved.
    pub fn can_create_leagues(&self) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::LeagueAdmin => self.is_approved,
            Role::Player => false,
        }
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

/// Sign-in credentials. Never sent to clients.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    /// argon2id PHC string.
    pub password_hash: String,
    pub profile_id: ProfileId,
}
