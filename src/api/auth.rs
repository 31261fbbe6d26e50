//! Accounts, sessions, profile and the super-admin dashboard.

use super::{session_user, start_session, AppState, IdPath};
use crate::error::LeagueError;
use crate::logic::access;
use crate::logic::auth::{self, NewAccount, ProfileUpdate};
use crate::models::Role;
use actix_session::Session;
use actix_web::web::{self, Json, Path};
use actix_web::{get, post, put, HttpResponse};
use serde::Deserialize;

#[derive(Deserialize)]
struct SignInBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct RoleBody {
    role: Role,
}

#[derive(Deserialize)]
struct ApprovalBody {
    approved: bool,
}

/// Create an account and sign in. The password is hashed before the store is locked.
#[post("/api/auth/register")]
async fn api_register(
    ctx: AppState,
    session: Session,
    body: Json<NewAccount>,
) -> Result<HttpResponse, LeagueError> {
    if ctx.read()?.account_by_email(&body.email).is_some() {
        return Err(LeagueError::DuplicateEmail);
    }
    let prepared = auth::prepare_account(body.into_inner())?;
    let mut store = ctx.write()?;
    let admin_email = ctx.config.super_admin_email.as_deref();
    let profile = auth::insert_account(&mut store, prepared, admin_email)?;
    ctx.commit(&mut store);
    start_session(&session, profile.id)?;
    Ok(HttpResponse::Created().json(profile))
}

/// Sign in. The password is verified outside the store lock.
#[post("/api/auth/sign-in")]
async fn api_sign_in(
    ctx: AppState,
    session: Session,
    body: Json<SignInBody>,
) -> Result<HttpResponse, LeagueError> {
    let account = ctx.read()?.account_by_email(&body.email).cloned();
    let account = auth::verify_credentials(account, &body.email, &body.password)?;
    let mut store = ctx.write()?;
    let known = store.profiles.len();
    let profile = auth::profile_for_account(&mut store, &account);
    if store.profiles.len() != known {
        ctx.commit(&mut store);
    }
    start_session(&session, profile.id)?;
    Ok(HttpResponse::Ok().json(profile))
}

#[post("/api/auth/sign-out")]
async fn api_sign_out(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Current profile (401 if not signed in).
#[get("/api/me")]
async fn api_me(ctx: AppState, session: Session) -> Result<HttpResponse, LeagueError> {
    let store = ctx.read()?;
    let profile = auth::current_profile(&store, session_user(&session).ok())?;
    Ok(HttpResponse::Ok().json(profile))
}

#[put("/api/me")]
async fn api_update_me(
    ctx: AppState,
    session: Session,
    body: Json<ProfileUpdate>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let profile = auth::update_profile(&mut store, actor, body.into_inner())?;
    ctx.commit(&mut store);
    Ok(HttpResponse::Ok().json(profile))
}

/// All profiles (super admin).
#[get("/api/admin/profiles")]
async fn api_list_profiles(ctx: AppState, session: Session) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let store = ctx.read()?;
    Ok(HttpResponse::Ok().json(access::list_profiles(&store, actor)?))
}

/// League admins waiting for approval (super admin).
#[get("/api/admin/pending-admins")]
async fn api_pending_admins(ctx: AppState, session: Session) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let store = ctx.read()?;
    Ok(HttpResponse::Ok().json(access::pending_admins(&store, actor)?))
}

#[put("/api/admin/profiles/{id}/role")]
async fn api_change_role(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<RoleBody>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let profile = access::change_role(&mut store, actor, path.id, body.role).inspect_err(|e| {
        log::warn!("Role change by {} rejected: {}", actor, e);
    })?;
    ctx.commit(&mut store);
    Ok(HttpResponse::Ok().json(profile))
}

#[put("/api/admin/profiles/{id}/approval")]
async fn api_set_approval(
    ctx: AppState,
    session: Session,
    path: Path<IdPath>,
    body: Json<ApprovalBody>,
) -> Result<HttpResponse, LeagueError> {
    let actor = session_user(&session)?;
    let mut store = ctx.write()?;
    let profile = access::set_approval(&mut store, actor, path.id, body.approved)?;
    ctx.commit(&mut store);
    Ok(HttpResponse::Ok().json(profile))
}

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_register)
        .service(api_sign_in)
        .service(api_sign_out)
        .service(api_me)
        .service(api_update_me)
        .service(api_list_profiles)
        .service(api_pending_admins)
        .service(api_change_role)
        .service(api_set_approval);
}
