//! Single binary web server: HTML shell from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Configuration comes from the environment (see `padel_league_web::config`).

use actix_files::Files;
use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use chrono::Utc;
use padel_league_web::api::{self, AppContext};
use padel_league_web::logic::teams::expire_invitations;
use padel_league_web::{Config, Store};
use std::io;
use std::time::Duration;

/// How often stale invitations are expired.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let store = match &config.data_file {
        Some(path) => {
            let store = Store::load(path).map_err(io::Error::other)?;
            log::info!(
                "Loaded {} (revision {}, {} leagues)",
                path.display(),
                store.revision,
                store.leagues.len()
            );
            store
        }
        None => {
            log::warn!("DATA_FILE not set; data lives in memory only");
            Store::new()
        }
    };
    let key = match &config.session_key {
        Some(bytes) => Key::from(bytes.as_slice()),
        None => {
            log::warn!("SESSION_KEY not set; sessions end when the server restarts");
            Key::generate()
        }
    };
    let secure = config.secure_cookies;
    let (host, port) = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", host, port);

    let ctx = Data::new(AppContext::new(store, config));

    // Background task: every 30 minutes, expire invitations nobody answered
    let ctx_cleanup = ctx.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let mut store = match ctx_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let expired = expire_invitations(&mut store, Utc::now());
            if expired > 0 {
                ctx_cleanup.commit(&mut store);
                log::info!("Expired {} unanswered invitation(s)", expired);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(ctx.clone())
            .wrap(api::session_middleware(key.clone(), secure))
            .wrap(Logger::default())
            .configure(api::configure)
            .service(Files::new("/static", "static"))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
