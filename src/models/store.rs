//! Store: every table of the league organizer, kept in memory and optionally snapshotted to JSON.

use crate::error::LeagueError;
use crate::models::confirmation::MatchConfirmation;
use crate::models::game::{GameMatch, MatchId};
use crate::models::league::{Division, DivisionId, League, LeagueId};
use crate::models::profile::{Account, Profile, ProfileId};
use crate::models::registration::{LeagueRegistration, RegistrationId};
use crate::models::team::{Team, TeamId, TeamInvitation};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Store {
    pub accounts: Vec<Account>,
    pub profiles: Vec<Profile>,
    pub teams: Vec<Team>,
    pub invitations: Vec<TeamInvitation>,
    pub leagues: Vec<League>,
    pub divisions: Vec<Division>,
    /// In registration order (drives round-robin order).
    pub registrations: Vec<LeagueRegistration>,
    pub matches: Vec<GameMatch>,
    pub confirmations: Vec<MatchConfirmation>,
    /// Bumped after every committed change; clients compare it to know when to refetch.
    #[serde(default)]
    pub revision: u64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot; a missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, LeagueError> {
        match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| {
                    LeagueError::Storage(format!("invalid snapshot {}: {e}", path.display()))
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(LeagueError::Storage(format!("could not read {}: {e}", path.display()))),
        }
    }

    /// Write a snapshot next to `path` and move it into place, so readers never see half a file.
    pub fn save(&self, path: &Path) -> Result<(), LeagueError> {
        let raw =
            serde_json::to_string_pretty(self).map_err(|e| LeagueError::Storage(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, raw)
            .map_err(|e| LeagueError::Storage(format!("could not write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, path)
            .map_err(|e| LeagueError::Storage(format!("could not replace {}: {e}", path.display())))
    }

    /// Mark a committed change and return the new revision.
    pub fn touch(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    pub fn account_by_email(&self, email: &str) -> Option<&Account> {
        let email = email.trim();
        self.accounts.iter().find(|a| a.email.eq_ignore_ascii_case(email))
    }

    pub fn profile(&self, id: ProfileId) -> Result<&Profile, LeagueError> {
        self.profiles
            .iter()
            .find(|p| p.id == id)
            .ok_or(LeagueError::ProfileNotFound(id))
    }

    pub fn profile_mut(&mut self, id: ProfileId) -> Result<&mut Profile, LeagueError> {
        self.profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LeagueError::ProfileNotFound(id))
    }

    pub fn team(&self, id: TeamId) -> Result<&Team, LeagueError> {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .ok_or(LeagueError::TeamNotFound(id))
    }

    pub fn team_mut(&mut self, id: TeamId) -> Result<&mut Team, LeagueError> {
        self.teams
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(LeagueError::TeamNotFound(id))
    }

    /// Team name for display; unknown ids render as "Unknown team".
    pub fn team_name(&self, id: TeamId) -> String {
        self.team(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|_| "Unknown team".to_string())
    }

    pub fn league(&self, id: LeagueId) -> Result<&League, LeagueError> {
        self.leagues
            .iter()
            .find(|l| l.id == id)
            .ok_or(LeagueError::LeagueNotFound(id))
    }

    pub fn league_mut(&mut self, id: LeagueId) -> Result<&mut League, LeagueError> {
        self.leagues
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(LeagueError::LeagueNotFound(id))
    }

    /// Division by id, which must belong to `league_id`.
    pub fn division(&self, league_id: LeagueId, id: DivisionId) -> Result<&Division, LeagueError> {
        self.divisions
            .iter()
            .find(|d| d.id == id && d.league_id == league_id)
            .ok_or(LeagueError::DivisionNotFound(id))
    }

    pub fn registration(&self, id: RegistrationId) -> Result<&LeagueRegistration, LeagueError> {
        self.registrations
            .iter()
            .find(|r| r.id == id)
            .ok_or(LeagueError::RegistrationNotFound(id))
    }

    pub fn registration_mut(
        &mut self,
        id: RegistrationId,
    ) -> Result<&mut LeagueRegistration, LeagueError> {
        self.registrations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(LeagueError::RegistrationNotFound(id))
    }

    pub fn game(&self, id: MatchId) -> Result<&GameMatch, LeagueError> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(LeagueError::MatchNotFound(id))
    }

    pub fn game_mut(&mut self, id: MatchId) -> Result<&mut GameMatch, LeagueError> {
        self.matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(LeagueError::MatchNotFound(id))
    }

    /// Confirmation record of `team` for `match_id`, created pending if missing.
    pub fn confirmation_mut(&mut self, match_id: MatchId, team: TeamId) -> &mut MatchConfirmation {
        let idx = match self
            .confirmations
            .iter()
            .position(|c| c.match_id == match_id && c.team_id == team)
        {
            Some(idx) => idx,
            None => {
                self.confirmations.push(MatchConfirmation::new(match_id, team));
                self.confirmations.len() - 1
            }
        };
        &mut self.confirmations[idx]
    }

    pub fn confirmation(&self, match_id: MatchId, team: TeamId) -> Option<&MatchConfirmation> {
        self.confirmations
            .iter()
            .find(|c| c.match_id == match_id && c.team_id == team)
    }

    /// Registrations of a team in leagues that are not completed.
    pub fn team_in_running_league(&self, team: TeamId) -> bool {
        self.registrations.iter().any(|r| {
            r.team_id == team
                && self
                    .league(r.league_id)
                    .map(|l| l.status != crate::models::LeagueStatus::Completed)
                    .unwrap_or(false)
        })
    }
}
