//! Fixtures: generation, scheduling, confirmations, reschedules and scores.

use super::{optional_session_user, session_user, AppContext, AppState, IdPath};
use crate::error::LeagueError;
use crate::events::RefreshEvent;
use crate::logic::confirmation::{self, ConfirmationStatusView, Proposal};
use crate::logic::{leagues, schedule, scoring};
use crate::models::{DivisionId, LeagueId, MatchId, ProfileId, SetScore, Store, TeamId};
use actix_session::Session;
use actix_web::web::{self, Json, Path};
use actix_web::{get, post, put, HttpResponse};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

/// Path segments: league id and division id
#[derive(Deserialize)]
struct LeagueDivisionPath {
    id: LeagueId,
    division_id: DivisionId,
}

#[derive(Deserialize)]
struct ScheduleBody {
    scheduled_date: NaiveDate,
    scheduled_time: Option<NaiveTime>,
    venue: Option<String>,
}

#[derive(Deserialize)]
struct ScoreBody {
    sets: Vec<SetScore>,
}

#[derive(Deserialize)]
struct TeamBody {
    team_id: TeamId,
}

#[derive(Deserialize)]
struct ProposalBody {
    team_id: TeamId,
    #[serde(flatten)]
    proposal: Proposal,
}

/// Round-robin matches for a division (only the missing pairs).
#[post("/api/leagues/{id}/divisions/{division_id}/matches/generate")]
async fn api_generate_matches(
    ctx: AppState,
    session: Session,
    path: Path<LeagueDivisionPath>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let created =
        schedule::generate_division_matches(&mut store, actor, path.id, path.division_id)?;
    let revision = ctx.commit(&mut store);
    ctx.publish(RefreshEvent::league(path.id, revision));
    Ok(HttpResponse::Created().json(created))
}

#[get("/api/leagues/{id}/matches")]
async fn api_league_matches(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
) -> Result<HttpResponse, LeagueError> {
    let store = ctx.read()?;
    leagues::require_visible(&store, optional_session_user(&session), path.id)?;
    Ok(HttpResponse::Ok().json(schedule::matches_for_league(&store, path.id)?))
}

/// Matches of the signed-in player's teams.
#[get("/api/matches")]
async fn api_my_matches(ctx: AppState, session: Session) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let store = ctx.read()?;
    Ok(HttpResponse::Ok().json(schedule::matches_for_player(&store, actor)))
}

#[get("/api/matches/{id}")]
async fn api_get_match(ctx: AppState, path: Path<IdPath>) -> Result<HttpResponse, LeagueError> {
    let store = ctx.read()?;
    Ok(HttpResponse::Ok().json(store.game(path.id)?))
}

#[put("/api/matches/{id}/schedule")]
async fn api_schedule_match(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<ScheduleBody>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let body = body.into_inner();
    let mut store = ctx.write()?;
    let game = schedule::schedule_match(
        &mut store,
        actor,
        path.id,
        body.scheduled_date,
        body.scheduled_time,
        body.venue,
    )?;
    let revision = ctx.commit(&mut store);
    ctx.publish(RefreshEvent::game(game.league_id, game.id, revision));
    Ok(HttpResponse::Ok().json(game))
}

#[post("/api/matches/{id}/cancel")]
async fn api_cancel_match(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let game = schedule::cancel_match(&mut store, actor, path.id)?;
    let revision = ctx.commit(&mut store);
    ctx.publish(RefreshEvent::game(game.league_id, game.id, revision));
    Ok(HttpResponse::Ok().json(game))
}

/// Record (or correct) a result. Match and standings are updated under the same lock.
#[post("/api/matches/{id}/score")]
async fn api_record_score(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<ScoreBody>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let recorded = scoring::record_score(&mut store, actor, path.id, &body.sets)?;
    let revision = ctx.commit(&mut store);
    ctx.publish(RefreshEvent::game(recorded.league_id, recorded.match_id, revision));
    ctx.publish(RefreshEvent::standings(
        recorded.league_id,
        recorded.division_id,
        recorded.team_ids,
        revision,
    ));
    Ok(HttpResponse::Ok().json(store.game(path.id)?))
}

/// Run one confirmation step under the write lock, then commit and announce the match.
fn confirmation_step(
    ctx: &AppContext,
    match_id: MatchId,
    step: impl FnOnce(&mut Store) -> Result<ConfirmationStatusView, LeagueError>,
) -> Result<HttpResponse, LeagueError> {
    let mut store = ctx.write()?;
    let view = step(&mut store)?;
    let league_id = store.game(match_id)?.league_id;
    let revision = ctx.commit(&mut store);
    ctx.publish(RefreshEvent::game(league_id, match_id, revision));
    Ok(HttpResponse::Ok().json(view))
}

fn actor_and_match(session: &Session, path: &IdPath) -> Result<(ProfileId, MatchId), LeagueError> {
    Ok((session_user(session)?, path.id))
}

#[post("/api/matches/{id}/confirm")]
async fn api_confirm_match(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<TeamBody>,
) -> Result<HttpResponse, LeagueError> {
    let (actor, match_id) = actor_and_match(&session, &path)?;
    confirmation_step(&ctx, match_id, |store| {
        confirmation::confirm_match_for_team(store, actor, match_id, body.team_id)
    })
}

#[post("/api/matches/{id}/reschedule")]
async fn api_propose_reschedule(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<ProposalBody>,
) -> Result<HttpResponse, LeagueError> {
    let (actor, match_id) = actor_and_match(&session, &path)?;
    let body = body.into_inner();
    confirmation_step(&ctx, match_id, |store| {
        confirmation::propose_reschedule(store, actor, match_id, body.team_id, body.proposal)
    })
}

#[post("/api/matches/{id}/reschedule/counter")]
async fn api_counter_propose(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<ProposalBody>,
) -> Result<HttpResponse, LeagueError> {
    let (actor, match_id) = actor_and_match(&session, &path)?;
    let body = body.into_inner();
    confirmation_step(&ctx, match_id, |store| {
        confirmation::counter_propose_reschedule(
            store,
            actor,
            match_id,
            body.team_id,
            body.proposal,
        )
    })
}

#[post("/api/matches/{id}/reschedule/accept")]
async fn api_accept_reschedule(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<TeamBody>,
) -> Result<HttpResponse, LeagueError> {
    let (actor, match_id) = actor_and_match(&session, &path)?;
    confirmation_step(&ctx, match_id, |store| {
        confirmation::accept_reschedule(store, actor, match_id, body.team_id)
    })
}

#[get("/api/matches/{id}/confirmations")]
async fn api_confirmations_status(
    ctx: AppState,
    path: Path<IdPath>,
) -> Result<HttpResponse, LeagueError> {
    let store = ctx.read()?;
    Ok(HttpResponse::Ok().json(confirmation::match_confirmations_status(&store, path.id)?))
}

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_generate_matches)
        .service(api_league_matches)
        .service(api_my_matches)
        .service(api_get_match)
        .service(api_schedule_match)
        .service(api_cancel_match)
        .service(api_record_score)
        .service(api_confirm_match)
        .service(api_propose_reschedule)
        .service(api_counter_propose)
        .service(api_accept_reschedule)
        .service(api_confirmations_status);
}
