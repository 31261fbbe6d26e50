//! Leagues, divisions, registrations and standings.

use super::{optional_session_user, session_user, AppState, IdPath};
use crate::error::LeagueError;
use crate::events::RefreshEvent;
use crate::logic::leagues::{self, LeagueUpdate, NewDivision, NewLeague};
use crate::logic::standings;
use crate::models::{DivisionId, LeagueStatus, TeamId};
use actix_session::Session;
use actix_web::http::header;
use actix_web::web::{self, Json, Path};
use actix_web::{delete, get, post, put, HttpResponse};
use serde::Deserialize;

#[derive(Deserialize)]
struct StatusBody {
    status: LeagueStatus,
}

#[derive(Deserialize)]
struct JoinBody {
    team_id: TeamId,
    division_id: DivisionId,
}

/// Leagues visible to the visitor (drafts only to their admins).
#[get("/api/leagues")]
async fn api_list_leagues(ctx: AppState, session: Session) -> Result<HttpResponse, LeagueError> {
    let store = ctx.read()?;
    Ok(HttpResponse::Ok().json(leagues::list_leagues(&store, optional_session_user(&session))))
}

#[post("/api/leagues")]
async fn api_create_league(
    ctx: AppState,
    session: Session,
    body: Json<NewLeague>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let league = leagues::create_league(&mut store, actor, body.into_inner()).inspect_err(|e| {
        log::warn!("League creation by {} rejected: {}", actor, e);
    })?;
    let revision = ctx.commit(&mut store);
    ctx.publish(RefreshEvent::league(league.id, revision));
    Ok(HttpResponse::Created().json(league))
}

/// League with divisions and registrations.
#[get("/api/leagues/{id}")]
async fn api_get_league(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
) -> Result<HttpResponse, LeagueError> {
    let store = ctx.read()?;
    leagues::require_visible(&store, optional_session_user(&session), path.id)?;
    Ok(HttpResponse::Ok().json(leagues::league_detail(&store, path.id)?))
}

#[put("/api/leagues/{id}")]
async fn api_update_league(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<LeagueUpdate>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let league = leagues::update_league(&mut store, actor, path.id, body.into_inner())?;
    let revision = ctx.commit(&mut store);
    ctx.publish(RefreshEvent::league(league.id, revision));
    Ok(HttpResponse::Ok().json(league))
}

/// Advance the league: draft -> registration_open -> active -> completed.
#[post("/api/leagues/{id}/status")]
async fn api_set_league_status(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<StatusBody>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let league = leagues::advance_league_status(&mut store, actor, path.id, body.status)?;
    let revision = ctx.commit(&mut store);
    ctx.publish(RefreshEvent::league(league.id, revision));
    Ok(HttpResponse::Ok().json(league))
}

#[post("/api/leagues/{id}/divisions")]
async fn api_add_division(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<NewDivision>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let division = leagues::add_division(&mut store, actor, path.id, body.into_inner())?;
    let revision = ctx.commit(&mut store);
    ctx.publish(RefreshEvent::league(path.id, revision));
    Ok(HttpResponse::Created().json(division))
}

/// Register one of the player's teams in a division.
#[post("/api/leagues/{id}/registrations")]
async fn api_join_league(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<JoinBody>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let registration =
        leagues::join_league(&mut store, actor, path.id, body.team_id, body.division_id)?;
    let revision = ctx.commit(&mut store);
    ctx.publish(RefreshEvent::league(path.id, revision));
    Ok(HttpResponse::Created().json(registration))
}

#[post("/api/registrations/{id}/approve")]
async fn api_approve_registration(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let registration = leagues::approve_registration(&mut store, actor, path.id)?;
    let revision = ctx.commit(&mut store);
    ctx.publish(RefreshEvent::standings(
        registration.league_id,
        registration.division_id,
        vec![registration.team_id],
        revision,
    ));
    Ok(HttpResponse::Ok().json(registration))
}

#[delete("/api/registrations/{id}")]
async fn api_withdraw_registration(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let registration = leagues::withdraw_registration(&mut store, actor, path.id)?;
    let revision = ctx.commit(&mut store);
    ctx.publish(RefreshEvent::league(registration.league_id, revision));
    Ok(HttpResponse::Ok().json(registration))
}

/// Fresh standings of every division of the league.
#[get("/api/leagues/{id}/standings")]
async fn api_standings(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
) -> Result<HttpResponse, LeagueError> {
    let store = ctx.read()?;
    leagues::require_visible(&store, optional_session_user(&session), path.id)?;
    Ok(HttpResponse::Ok().json(standings::leaderboard(&store, path.id)?))
}

#[get("/api/leagues/{id}/standings.csv")]
async fn api_standings_csv(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
) -> Result<HttpResponse, LeagueError> {
    let board = {
        let store = ctx.read()?;
        leagues::require_visible(&store, optional_session_user(&session), path.id)?;
        standings::leaderboard(&store, path.id)?
    };
    let csv = standings::standings_csv(&board)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"standings-{}.csv\"", board.league.id),
        ))
        .body(csv))
}

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_list_leagues)
        .service(api_create_league)
        .service(api_standings_csv)
        .service(api_standings)
        .service(api_get_league)
        .service(api_update_league)
        .service(api_set_league_status)
        .service(api_add_division)
        .service(api_join_league)
        .service(api_approve_registration)
        .service(api_withdraw_registration);
}
