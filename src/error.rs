//! Errors returned by league operations. `Display` is the message shown to users.

use crate::models::{LeagueStatus, MatchStatus, SetScore};
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LeagueError {
    #[error("Please sign in first")]
    Unauthenticated,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("An account with this email already exists")]
    DuplicateEmail,
    #[error("{0}")]
    InvalidInput(String),

    #[error("Profile not found")]
    ProfileNotFound(Uuid),
    #[error("Team not found")]
    TeamNotFound(Uuid),
    #[error("League not found")]
    LeagueNotFound(Uuid),
    #[error("Division not found")]
    DivisionNotFound(Uuid),
    #[error("Registration not found")]
    RegistrationNotFound(Uuid),
    #[error("Match not found")]
    MatchNotFound(Uuid),
    #[error("Invitation not found")]
    InvitationNotFound,

    #[error("{0}")]
    Forbidden(&'static str),
    #[error("Your league admin account is waiting for approval")]
    AdminNotApproved,
    #[error("You cannot change the role of your own account")]
    CannotChangeOwnRole,
    #[error("You are not a player of this team")]
    NotOnTeam,

    #[error("A team with this name already exists")]
    DuplicateTeamName,
    #[error("The team needs two players first")]
    TeamIncomplete,
    #[error("The team already has two players")]
    TeamFull,
    #[error("The team is registered in a league that has not finished")]
    TeamInLeague,
    #[error("This email already has a pending invitation for the team")]
    DuplicateInvitation,
    #[error("This invitation was sent to another email address")]
    InvitationNotForYou,

    #[error("This team is already registered in the league")]
    AlreadyRegistered,
    #[error("The division is full ({max_teams} teams)")]
    DivisionFull { max_teams: u32 },
    #[error("A division with this name already exists in the league")]
    DuplicateDivisionName,
    #[error("Add at least one division before opening registration")]
    NoDivisions,
    #[error("Only pending registrations can be withdrawn")]
    RegistrationApproved,
    #[error("The league is {status}; this needs it to be {required}")]
    WrongLeagueStatus {
        status: LeagueStatus,
        required: &'static str,
    },
    #[error("A league cannot go from {from} to {to}")]
    InvalidStatusTransition { from: LeagueStatus, to: LeagueStatus },

    #[error("Need at least 2 approved teams in the division to generate matches")]
    NotEnoughTeams,
    #[error("The match is {0}")]
    InvalidMatchState(MatchStatus),
    #[error("The match has no date yet; propose one first")]
    NotScheduled,
    #[error("Your team already confirmed this match")]
    AlreadyConfirmed,
    #[error("A reschedule proposal is waiting for an answer")]
    ProposalPending,
    #[error("There is no reschedule proposal from the other team")]
    NoProposal,
    #[error("The reschedule limit of {max} rounds is reached")]
    RescheduleLimit { max: u8 },

    #[error("Set {set} ({score}) is not a valid score: {reason}")]
    InvalidSetScore {
        set: usize,
        score: SetScore,
        reason: &'static str,
    },
    #[error("The match was already decided after set {decided_after}")]
    ExtraSets { decided_after: usize },
    #[error("The match is not decided: a side needs {needed} sets")]
    UndecidedMatch { needed: u8 },

    #[error("Password could not be processed: {0}")]
    PasswordHash(String),
    #[error("Session error: {0}")]
    Session(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Export error: {0}")]
    Export(String),
    #[error("Internal lock error")]
    LockPoisoned,
}

impl LeagueError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        LeagueError::InvalidInput(msg.into())
    }

    /// Errors caused by the server rather than by the request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            LeagueError::PasswordHash(_)
                | LeagueError::Session(_)
                | LeagueError::Storage(_)
                | LeagueError::Export(_)
                | LeagueError::LockPoisoned
        )
    }
}
