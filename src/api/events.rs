//! Refresh stream (SSE) and the store revision for polling clients.

use super::AppState;
use crate::error::LeagueError;
use crate::events::frames;
use actix_web::http::header;
use actix_web::web::{self, Bytes};
use actix_web::{get, HttpResponse};
use futures_util::stream::{self, StreamExt};
use std::convert::Infallible;

#[get("/api/events")]
async fn api_events(ctx: AppState) -> HttpResponse {
    let rx = ctx.events.subscribe();
    let hello =
        stream::once(async { Ok::<Bytes, Infallible>(Bytes::from_static(b": connected\n\n")) });
    let updates = frames(rx).map(|frame| Ok::<Bytes, Infallible>(Bytes::from(frame)));
    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(hello.chain(updates))
}

#[get("/api/revision")]
async fn api_revision(ctx: AppState) -> Result<HttpResponse, LeagueError> {
    let revision = ctx.read()?.revision;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "revision": revision })))
}

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_events).service(api_revision);
}
