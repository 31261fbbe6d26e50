//! Teams and partner invitations.

use super::{session_user, AppState, IdPath};
use crate::error::LeagueError;
use crate::logic::teams;
use crate::notify::invitation_email;
use actix_session::Session;
use actix_web::web::{self, Json, Path};
use actix_web::{delete, get, post, put, HttpResponse};
use serde::Deserialize;

#[derive(Deserialize)]
struct TeamNameBody {
    name: String,
}

#[derive(Deserialize)]
struct InviteBody {
    email: String,
}

/// Path segment: invitation code (e.g. /api/invitations/{code}/accept)
#[derive(Deserialize)]
struct CodePath {
    code: String,
}

/// Teams the signed-in player is on.
#[get("/api/teams")]
async fn api_my_teams(ctx: AppState, session: Session) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let store = ctx.read()?;
    Ok(HttpResponse::Ok().json(teams::teams_for(&store, actor)))
}

#[post("/api/teams")]
async fn api_create_team(
    ctx: AppState,
    session: Session,
    body: Json<TeamNameBody>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let team = teams::create_team(&mut store, actor, &body.name)?;
    ctx.commit(&mut store);
    Ok(HttpResponse::Created().json(team))
}

#[get("/api/teams/{id}")]
async fn api_get_team(ctx: AppState, path: Path<IdPath>) -> Result<HttpResponse, LeagueError> {
    let store = ctx.read()?;
    Ok(HttpResponse::Ok().json(store.team(path.id)?))
}

#[put("/api/teams/{id}")]
async fn api_rename_team(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<TeamNameBody>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let team = teams::rename_team(&mut store, actor, path.id, &body.name)?;
    ctx.commit(&mut store);
    Ok(HttpResponse::Ok().json(team))
}

/// Leave a team; the answer is the remaining team, or 204 when it was dissolved.
#[post("/api/teams/{id}/leave")]
async fn api_leave_team(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let remaining = teams::leave_team(&mut store, actor, path.id)?;
    ctx.commit(&mut store);
    Ok(match remaining {
        Some(team) => HttpResponse::Ok().json(team),
        None => HttpResponse::NoContent().finish(),
    })
}

/// Invite a partner. The invitation is stored even if the email relay fails.
#[post("/api/teams/{id}/invitations")]
async fn api_invite_player(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<InviteBody>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let sent = {
        let mut store = ctx.write()?;
        let sent = teams::invite_player(&mut store, actor, path.id, &body.email)?;
        ctx.commit(&mut store);
        sent
    };
    let email = invitation_email(
        &sent.invitation,
        &sent.team_name,
        &sent.inviter_name,
        &ctx.config.public_url,
    );
    let emailed = match ctx.mailer.send(&email).await {
        Ok(()) => ctx.mailer.is_enabled(),
        Err(e) => {
            log::warn!("Invitation email to {} failed: {}", email.to, e);
            false
        }
    };
    Ok(HttpResponse::Created().json(serde_json::json!({
        "invitation": sent.invitation,
        "emailed": emailed,
    })))
}

/// Pending invitations addressed to the signed-in player.
#[get("/api/invitations")]
async fn api_my_invitations(ctx: AppState, session: Session) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let store = ctx.read()?;
    Ok(HttpResponse::Ok().json(teams::invitations_for(&store, actor)?))
}

#[post("/api/invitations/{code}/accept")]
async fn api_accept_invitation(
    ctx: AppState,
    session: Session,
    path: Path<CodePath>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let team = teams::accept_invitation(&mut store, actor, &path.code)?;
    ctx.commit(&mut store);
    Ok(HttpResponse::Ok().json(team))
}

#[post("/api/invitations/{code}/decline")]
async fn api_decline_invitation(
    ctx: AppState,
    session: Session,
    path: Path<CodePath>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let invitation = teams::decline_invitation(&mut store, actor, &path.code)?;
    ctx.commit(&mut store);
    Ok(HttpResponse::Ok().json(invitation))
}

#[delete("/api/invitations/{id}")]
async fn api_cancel_invitation(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let invitation = teams::cancel_invitation(&mut store, actor, path.id)?;
    ctx.commit(&mut store);
    Ok(HttpResponse::Ok().json(invitation))
}

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_my_teams)
        .service(api_create_team)
        .service(api_get_team)
        .service(api_rename_team)
        .service(api_leave_team)
        .service(api_invite_player)
        .service(api_my_invitations)
        .service(api_accept_invitation)
        .service(api_decline_invitation)
        .service(api_cancel_invitation);
}
