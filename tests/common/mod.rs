//! Shared fixtures: players, complete teams and a league with registered teams.
#![allow(dead_code)]

use chrono::NaiveDate;
use padel_league_web::logic::leagues::{self, NewDivision, NewLeague};
use padel_league_web::logic::teams;
use padel_league_web::models::{DivisionId, LeagueStatus, Profile};
use padel_league_web::{LeagueId, MatchFormat, ProfileId, Role, Store, TeamId};

pub struct Fixture {
    pub store: Store,
    /// Approved league admin who created the league.
    pub admin: ProfileId,
    pub league: LeagueId,
    pub division: DivisionId,
    /// (team, player 1, player 2) in registration order.
    pub teams: Vec<(TeamId, ProfileId, ProfileId)>,
}

pub fn player(store: &mut Store, name: &str) -> ProfileId {
    let profile = Profile::new(format!("{}@example.com", name.to_lowercase()), name, Role::Player);
    let id = profile.id;
    store.profiles.push(profile);
    id
}

pub fn approved_admin(store: &mut Store, name: &str) -> ProfileId {
    let email = format!("{}@example.com", name.to_lowercase());
    let mut profile = Profile::new(email, name, Role::LeagueAdmin);
    profile.is_approved = true;
    let id = profile.id;
    store.profiles.push(profile);
    id
}

/// A team with two players, formed through an accepted invitation.
pub fn complete_team(store: &mut Store, name: &str) -> (TeamId, ProfileId, ProfileId) {
    let p1 = player(store, &format!("{name}One"));
    let p2 = player(store, &format!("{name}Two"));
    let team = teams::create_team(store, p1, name).unwrap();
    let email = format!("{}two@example.com", name.to_lowercase());
    let sent = teams::invite_player(store, p1, team.id, &email).unwrap();
    teams::accept_invitation(store, p2, &sent.invitation.code).unwrap();
    (team.id, p1, p2)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// League open for registration with one division of `max_teams`, no teams yet.
pub fn open_league(format: MatchFormat, max_teams: u32) -> Fixture {
    let mut store = Store::new();
    let admin = approved_admin(&mut store, "Admin");
    let league = leagues::create_league(
        &mut store,
        admin,
        NewLeague {
            name: "Spring League".to_string(),
            description: "Weeknight padel".to_string(),
            start_date: date(2026, 3, 1),
            end_date: date(2026, 6, 30),
            match_format: format,
        },
    )
    .unwrap();
    let division = leagues::add_division(
        &mut store,
        admin,
        league.id,
        NewDivision {
            name: "Division 1".to_string(),
            level: 1,
            max_teams,
        },
    )
    .unwrap();
    leagues::advance_league_status(&mut store, admin, league.id, LeagueStatus::RegistrationOpen)
        .unwrap();
    Fixture {
        store,
        admin,
        league: league.id,
        division: division.id,
        teams: Vec::new(),
    }
}

/// Register and approve a new complete team.
pub fn add_team(fixture: &mut Fixture, name: &str) -> TeamId {
    let (team, p1, p2) = complete_team(&mut fixture.store, name);
    let registration =
        leagues::join_league(&mut fixture.store, p1, fixture.league, team, fixture.division)
            .unwrap();
    leagues::approve_registration(&mut fixture.store, fixture.admin, registration.id).unwrap();
    fixture.teams.push((team, p1, p2));
    team
}

/// Active league with `names.len()` approved teams in one division.
pub fn active_league(format: MatchFormat, names: &[&str]) -> Fixture {
    let mut fixture = open_league(format, 8);
    for name in names {
        add_team(&mut fixture, name);
    }
    let (admin, league) = (fixture.admin, fixture.league);
    leagues::advance_league_status(&mut fixture.store, admin, league, LeagueStatus::Active)
        .unwrap();
    fixture
}
