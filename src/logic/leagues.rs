//! Leagues, divisions and team registrations.

use crate::error::LeagueError;
use crate::logic::access::{is_league_manager, require_can_create_league, require_league_manager};
use crate::models::{
    Division, DivisionId, League, LeagueId, LeagueRegistration, LeagueStatus, MatchFormat,
    ProfileId, RegistrationId, RegistrationStatus, Store, TeamId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize)]
pub struct NewLeague {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub match_format: MatchFormat,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LeagueUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub match_format: Option<MatchFormat>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewDivision {
    pub name: String,
    pub level: u32,
    pub max_teams: u32,
}

/// A registration with the team name filled in, for league pages.
#[derive(Clone, Debug, Serialize)]
pub struct RegistrationView {
    #[serde(flatten)]
    pub registration: LeagueRegistration,
    pub team_name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LeagueDetail {
    pub league: League,
    /// Ordered by level.
    pub divisions: Vec<Division>,
    pub registrations: Vec<RegistrationView>,
}

fn check_dates(start: NaiveDate, end: NaiveDate) -> Result<(), LeagueError> {
    if end < start {
        return Err(LeagueError::invalid("The league cannot end before it starts"));
    }
    Ok(())
}

fn require_status(
    league: &League,
    allowed: &[LeagueStatus],
    required: &'static str,
) -> Result<(), LeagueError> {
    if allowed.contains(&league.status) {
        Ok(())
    } else {
        Err(LeagueError::WrongLeagueStatus {
            status: league.status,
            required,
        })
    }
}

/// Create a draft league owned by the actor.
pub fn create_league(
    store: &mut Store,
    actor: ProfileId,
    new: NewLeague,
) -> Result<League, LeagueError> {
    require_can_create_league(store.profile(actor)?)?;
    let name = new.name.trim();
    if name.is_empty() {
        return Err(LeagueError::invalid("League name cannot be empty"));
    }
    check_dates(new.start_date, new.end_date)?;
    let league = League::new(
        name,
        new.description.trim(),
        new.start_date,
        new.end_date,
        new.match_format,
        actor,
    );
    log::info!("League '{}' created", league.name);
    store.leagues.push(league.clone());
    Ok(league)
}

/// Edit league details. The match format is fixed once the league is active.
pub fn update_league(
    store: &mut Store,
    actor: ProfileId,
    league_id: LeagueId,
    update: LeagueUpdate,
) -> Result<League, LeagueError> {
    let league = store.league(league_id)?.clone();
    require_league_manager(store.profile(actor)?, &league)?;
    require_status(
        &league,
        &[LeagueStatus::Draft, LeagueStatus::RegistrationOpen, LeagueStatus::Active],
        "not completed",
    )?;
    if update.match_format.is_some_and(|f| f != league.match_format) {
        require_status(
            &league,
            &[LeagueStatus::Draft, LeagueStatus::RegistrationOpen],
            "draft or registration_open",
        )?;
    }
    let start = update.start_date.unwrap_or(league.start_date);
    let end = update.end_date.unwrap_or(league.end_date);
    check_dates(start, end)?;

    let league = store.league_mut(league_id)?;
    if let Some(name) = update.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(LeagueError::invalid("League name cannot be empty"));
        }
        league.name = name.to_string();
    }
    if let Some(description) = update.description {
        league.description = description.trim().to_string();
    }
    if let Some(format) = update.match_format {
        league.match_format = format;
    }
    league.start_date = start;
    league.end_date = end;
    Ok(league.clone())
}

/// Move the league one step forward: draft -> registration_open -> active -> completed.
pub fn advance_league_status(
    store: &mut Store,
    actor: ProfileId,
    league_id: LeagueId,
    to: LeagueStatus,
) -> Result<League, LeagueError> {
    let league = store.league(league_id)?.clone();
    require_league_manager(store.profile(actor)?, &league)?;
    if !league.status.can_advance_to(to) {
        return Err(LeagueError::InvalidStatusTransition {
            from: league.status,
            to,
        });
    }
    let has_divisions = store.divisions.iter().any(|d| d.league_id == league_id);
    if to == LeagueStatus::RegistrationOpen && !has_divisions {
        return Err(LeagueError::NoDivisions);
    }
    let league = store.league_mut(league_id)?;
    league.status = to;
    log::info!("League '{}' is now {}", league.name, to);
    Ok(league.clone())
}

pub fn add_division(
    store: &mut Store,
    actor: ProfileId,
    league_id: LeagueId,
    new: NewDivision,
) -> Result<Division, LeagueError> {
    let league = store.league(league_id)?.clone();
    require_league_manager(store.profile(actor)?, &league)?;
    require_status(
        &league,
        &[LeagueStatus::Draft, LeagueStatus::RegistrationOpen],
        "draft or registration_open",
    )?;
    let name = new.name.trim();
    if name.is_empty() {
        return Err(LeagueError::invalid("Division name cannot be empty"));
    }
    if new.level == 0 {
        return Err(LeagueError::invalid("Division level starts at 1"));
    }
    if new.max_teams < 2 {
        return Err(LeagueError::invalid("A division needs room for at least 2 teams"));
    }
    let duplicate = store
        .divisions
        .iter()
        .any(|d| d.league_id == league_id && d.name.eq_ignore_ascii_case(name));
    if duplicate {
        return Err(LeagueError::DuplicateDivisionName);
    }
    let division = Division::new(league_id, name, new.level, new.max_teams);
    store.divisions.push(division.clone());
    Ok(division)
}

fn is_visible(store: &Store, viewer: Option<ProfileId>, league: &League) -> bool {
    league.status != LeagueStatus::Draft
        || viewer
            .and_then(|id| store.profile(id).ok())
            .is_some_and(|p| is_league_manager(p, league))
}

/// The league, unless it is a draft the viewer does not manage: drafts answer `LeagueNotFound`.
pub fn require_visible(
    store: &Store,
    viewer: Option<ProfileId>,
    league_id: LeagueId,
) -> Result<&League, LeagueError> {
    let league = store.league(league_id)?;
    if is_visible(store, viewer, league) {
        Ok(league)
    } else {
        Err(LeagueError::LeagueNotFound(league_id))
    }
}

/// Leagues visible to the viewer: drafts only to their managers. Newest start first.
pub fn list_leagues(store: &Store, viewer: Option<ProfileId>) -> Vec<League> {
    let mut leagues: Vec<League> = store
        .leagues
        .iter()
        .filter(|l| is_visible(store, viewer, l))
        .cloned()
        .collect();
    leagues.sort_by(|a, b| b.start_date.cmp(&a.start_date).then_with(|| a.name.cmp(&b.name)));
    leagues
}

pub fn league_detail(store: &Store, league_id: LeagueId) -> Result<LeagueDetail, LeagueError> {
    let league = store.league(league_id)?.clone();
    let mut divisions: Vec<Division> = store
        .divisions
        .iter()
        .filter(|d| d.league_id == league_id)
        .cloned()
        .collect();
    divisions.sort_by_key(|d| d.level);
    let registrations = store
        .registrations
        .iter()
        .filter(|r| r.league_id == league_id)
        .map(|r| RegistrationView {
            registration: r.clone(),
            team_name: store.team_name(r.team_id),
        })
        .collect();
    Ok(LeagueDetail {
        league,
        divisions,
        registrations,
    })
}

/// Register a complete team into a division of a league open for registration.
///
/// A team joins a league once; a division never holds more than its `max_teams`.
pub fn join_league(
    store: &mut Store,
    actor: ProfileId,
    league_id: LeagueId,
    team_id: TeamId,
    division_id: DivisionId,
) -> Result<LeagueRegistration, LeagueError> {
    let league = store.league(league_id)?;
    require_status(league, &[LeagueStatus::RegistrationOpen], "registration_open")?;
    let division = store.division(league_id, division_id)?;
    let team = store.team(team_id)?;
    if !team.has_player(actor) {
        return Err(LeagueError::NotOnTeam);
    }
    if !team.is_complete() {
        return Err(LeagueError::TeamIncomplete);
    }
    if store
        .registrations
        .iter()
        .any(|r| r.league_id == league_id && r.team_id == team_id)
    {
        return Err(LeagueError::AlreadyRegistered);
    }
    let taken = store
        .registrations
        .iter()
        .filter(|r| r.division_id == division_id)
        .count();
    if taken >= division.max_teams as usize {
        return Err(LeagueError::DivisionFull {
            max_teams: division.max_teams,
        });
    }
    let registration = LeagueRegistration::new(league_id, division_id, team_id);
    log::info!("Team '{}' registered in league '{}'", team.name, league.name);
    store.registrations.push(registration.clone());
    Ok(registration)
}

pub fn approve_registration(
    store: &mut Store,
    actor: ProfileId,
    registration_id: RegistrationId,
) -> Result<LeagueRegistration, LeagueError> {
    let league_id = store.registration(registration_id)?.league_id;
    let league = store.league(league_id)?;
    require_league_manager(store.profile(actor)?, league)?;
    let registration = store.registration_mut(registration_id)?;
    registration.status = RegistrationStatus::Approved;
    Ok(registration.clone())
}

/// Withdraw a pending registration (a player of the team, or a league manager).
pub fn withdraw_registration(
    store: &mut Store,
    actor: ProfileId,
    registration_id: RegistrationId,
) -> Result<LeagueRegistration, LeagueError> {
    let registration = store.registration(registration_id)?.clone();
    let league = store.league(registration.league_id)?;
    let on_team = store.team(registration.team_id)?.has_player(actor);
    if !on_team && !is_league_manager(store.profile(actor)?, league) {
        return Err(LeagueError::NotOnTeam);
    }
    if registration.is_approved() {
        return Err(LeagueError::RegistrationApproved);
    }
    store.registrations.retain(|r| r.id != registration_id);
    Ok(registration)
}
