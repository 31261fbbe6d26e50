//! HTTP API: HTML shell at `/`, JSON under `/api`, sessions in a signed cookie.

mod auth;
mod events;
mod leagues;
mod matches;
mod teams;

use crate::config::Config;
use crate::error::LeagueError;
use crate::events::{EventBus, RefreshEvent};
use crate::models::{ProfileId, Store};
use crate::notify::Mailer;
use actix_session::config::PersistentSession;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::{time, Key};
use actix_web::http::StatusCode;
use actix_web::web::{self, Data};
use actix_web::{get, HttpResponse, ResponseError};
use serde::Deserialize;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "padel_session";
const SESSION_USER_KEY: &str = "profile_id";
const SESSION_DAYS: i64 = 30;

/// Shared server state: the store behind one lock, so every multi-row change is atomic.
pub struct AppContext {
    pub store: RwLock<Store>,
    pub events: EventBus,
    pub mailer: Mailer,
    pub config: Config,
}

pub type AppState = Data<AppContext>;

impl AppContext {
    pub fn new(store: Store, config: Config) -> Self {
        Self {
            store: RwLock::new(store),
            events: EventBus::default(),
            mailer: Mailer::new(config.email_function_url.clone()),
            config,
        }
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, Store>, LeagueError> {
        self.store.read().map_err(|_| LeagueError::LockPoisoned)
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, Store>, LeagueError> {
        self.store.write().map_err(|_| LeagueError::LockPoisoned)
    }

    /// Bump the revision and write the snapshot (if configured). Returns the new revision.
    pub fn commit(&self, store: &mut Store) -> u64 {
        let revision = store.touch();
        if let Some(path) = &self.config.data_file {
            if let Err(e) = store.save(path) {
                log::error!("Could not persist revision {}: {}", revision, e);
            }
        }
        revision
    }

    pub fn publish(&self, event: RefreshEvent) {
        self.events.publish(event);
    }
}

impl ResponseError for LeagueError {
    fn status_code(&self) -> StatusCode {
        use LeagueError::*;
        match self {
            Unauthenticated | InvalidCredentials => StatusCode::UNAUTHORIZED,
            Forbidden(_) | AdminNotApproved | NotOnTeam | InvitationNotForYou => {
                StatusCode::FORBIDDEN
            }
            ProfileNotFound(_) | TeamNotFound(_) | LeagueNotFound(_) | DivisionNotFound(_)
            | RegistrationNotFound(_) | MatchNotFound(_) | InvitationNotFound => {
                StatusCode::NOT_FOUND
            }
            DuplicateEmail | DuplicateTeamName | DuplicateDivisionName | DuplicateInvitation
            | AlreadyRegistered => StatusCode::CONFLICT,
            e if e.is_internal() => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_internal() {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

/// Profile id stored in the session, or `Unauthenticated`.
pub fn session_user(session: &Session) -> Result<ProfileId, LeagueError> {
    session
        .get::<ProfileId>(SESSION_USER_KEY)
        .map_err(|e| LeagueError::Session(e.to_string()))?
        .ok_or(LeagueError::Unauthenticated)
}

/// Like [`session_user`] but `None` for anonymous visitors.
pub fn optional_session_user(session: &Session) -> Option<ProfileId> {
    session.get::<ProfileId>(SESSION_USER_KEY).ok().flatten()
}

fn start_session(session: &Session, profile: ProfileId) -> Result<(), LeagueError> {
    session.renew();
    session
        .insert(SESSION_USER_KEY, profile)
        .map_err(|e| LeagueError::Session(e.to_string()))
}

/// Cookie session middleware; the cookie is signed and kept for 30 days.
pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_secure(secure)
        .session_lifecycle(
            PersistentSession::default().session_ttl(time::Duration::days(SESSION_DAYS)),
        )
        .build()
}

/// Path segment: a single id (e.g. /api/teams/{id})
#[derive(Deserialize)]
struct IdPath {
    id: Uuid,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[get("/api/health")]
async fn api_health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "padel-league-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Client-side pages all load the same shell.
async fn serve_index() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

/// Malformed JSON bodies answer with the same `{"error": ...}` shape as everything else.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = serde_json::json!({ "error": err.to_string() });
        actix_web::error::InternalError::from_response(err, HttpResponse::BadRequest().json(body))
            .into()
    })
}

/// Register every route of the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    for page in [
        "/",
        "/teams",
        "/matches",
        "/leagues",
        "/admin",
        "/standings",
        "/create-league",
        "/create-team",
        "/manage-league/{league_id}",
        "/join-league/{team_id}",
        "/manage-team/{team_id}",
        "/invitations/{code}",
    ] {
        cfg.route(page, web::get().to(serve_index));
    }
    cfg.service(api_health).service(favicon);
    auth::configure(cfg);
    teams::configure(cfg);
    leagues::configure(cfg);
    matches::configure(cfg);
    events::configure(cfg);
}
