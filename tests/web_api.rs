mod common;

use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::web::Data;
use actix_web::{test, App};
use common::active_league;
use futures_util::future::poll_fn;
use padel_league_web::api::{configure, session_middleware, AppContext, SESSION_COOKIE};
use padel_league_web::{Config, MatchFormat, Store};
use serde_json::{json, Value};
use std::pin::Pin;
use std::time::Duration;

fn session_cookie(resp: &ServiceResponse) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("session cookie")
        .into_owned()
}

/// Next chunk of a streaming body, as text.
async fn next_chunk<B: MessageBody>(body: &mut Pin<Box<B>>) -> String {
    let next = poll_fn(|cx| body.as_mut().poll_next(cx));
    let chunk = tokio::time::timeout(Duration::from_secs(5), next)
        .await
        .expect("chunk before timeout")
        .and_then(Result::ok)
        .expect("open stream");
    String::from_utf8(chunk.to_vec()).unwrap()
}

fn account(email: &str, role: &str) -> Value {
    json!({
        "email": email,
        "password": "correct horse",
        "full_name": "Test User",
        "role": role,
    })
}

#[actix_web::test]
async fn register_signs_in_and_first_account_is_super_admin() {
    let ctx = Data::new(AppContext::new(Store::new(), Config::default()));
    let app = test::init_service(
        App::new()
            .app_data(ctx.clone())
            .wrap(session_middleware(Key::generate(), false))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(account("root@example.com", "player"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::get().uri("/api/me").cookie(cookie).to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["email"], "root@example.com");
    assert_eq!(me["role"], "super_admin");
    assert_eq!(ctx.read().unwrap().profiles.len(), 1);
}

#[actix_web::test]
async fn duplicate_email_conflicts() {
    let ctx = Data::new(AppContext::new(Store::new(), Config::default()));
    let app = test::init_service(
        App::new()
            .app_data(ctx.clone())
            .wrap(session_middleware(Key::generate(), false))
            .configure(configure),
    )
    .await;

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(account("same@example.com", "player"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }
}

#[actix_web::test]
async fn unapproved_league_admin_gets_forbidden() {
    let ctx = Data::new(AppContext::new(Store::new(), Config::default()));
    let app = test::init_service(
        App::new()
            .app_data(ctx.clone())
            .wrap(session_middleware(Key::generate(), false))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(account("root@example.com", "player"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(account("organizer@example.com", "league_admin"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::post()
        .uri("/api/leagues")
        .cookie(cookie)
        .set_json(json!({
            "name": "Winter League",
            "start_date": "2026-11-01",
            "end_date": "2027-02-28",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Your league admin account is waiting for approval");
    assert!(ctx.read().unwrap().leagues.is_empty());
}

#[actix_web::test]
async fn super_admin_cannot_change_own_role() {
    let ctx = Data::new(AppContext::new(Store::new(), Config::default()));
    let app = test::init_service(
        App::new()
            .app_data(ctx.clone())
            .wrap(session_middleware(Key::generate(), false))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(account("root@example.com", "player"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp);
    let me: Value = test::read_body_json(resp).await;
    let id = me["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/profiles/{id}/role"))
        .cookie(cookie)
        .set_json(json!({ "role": "player" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "You cannot change the role of your own account");
}

#[actix_web::test]
async fn sign_in_with_wrong_password_is_unauthorized() {
    let ctx = Data::new(AppContext::new(Store::new(), Config::default()));
    let app = test::init_service(
        App::new()
            .app_data(ctx.clone())
            .wrap(session_middleware(Key::generate(), false))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(account("player@example.com", "player"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-in")
        .set_json(json!({ "email": "player@example.com", "password": "wrong password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-in")
        .set_json(json!({ "email": "player@example.com", "password": "correct horse" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn malformed_json_gets_json_error() {
    let ctx = Data::new(AppContext::new(Store::new(), Config::default()));
    let app = test::init_service(
        App::new()
            .app_data(ctx.clone())
            .wrap(session_middleware(Key::generate(), false))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn health_and_pages_are_public() {
    let ctx = Data::new(AppContext::new(Store::new(), Config::default()));
    let app = test::init_service(
        App::new()
            .app_data(ctx.clone())
            .wrap(session_middleware(Key::generate(), false))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let health: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(health["ok"], true);

    for uri in ["/", "/standings", "/invitations/abc123"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }

    let req = test::TestRequest::get().uri("/api/leagues").to_request();
    let leagues: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(leagues, json!([]));
}

#[actix_web::test]
async fn draft_league_is_hidden_from_visitors() {
    let ctx = Data::new(AppContext::new(Store::new(), Config::default()));
    let app = test::init_service(
        App::new()
            .app_data(ctx.clone())
            .wrap(session_middleware(Key::generate(), false))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(account("root@example.com", "player"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let admin = session_cookie(&resp);

    let req = test::TestRequest::post()
        .uri("/api/leagues")
        .cookie(admin.clone())
        .set_json(json!({
            "name": "Winter League",
            "start_date": "2026-11-01",
            "end_date": "2027-02-28",
        }))
        .to_request();
    let league: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(league["status"], "draft");
    let id = league["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(account("visitor@example.com", "player"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let visitor = session_cookie(&resp);

    for path in ["", "/standings", "/standings.csv", "/matches"] {
        let uri = format!("/api/leagues/{id}{path}");

        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "anonymous {uri}");

        let req = test::TestRequest::get().uri(&uri).cookie(visitor.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "player {uri}");

        let req = test::TestRequest::get().uri(&uri).cookie(admin.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "manager {uri}");
    }
}

#[actix_web::test]
async fn only_accepted_changes_raise_the_revision() {
    let ctx = Data::new(AppContext::new(Store::new(), Config::default()));
    let app = test::init_service(
        App::new()
            .app_data(ctx.clone())
            .wrap(session_middleware(Key::generate(), false))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(account("player@example.com", "player"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::get().uri("/api/revision").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let before = body["revision"].as_u64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/teams")
        .cookie(cookie.clone())
        .set_json(json!({ "name": "Net Ninjas" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/api/revision").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["revision"].as_u64().unwrap(), before + 1);

    let req = test::TestRequest::post()
        .uri("/api/teams")
        .cookie(cookie)
        .set_json(json!({ "name": "Net Ninjas" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());

    let req = test::TestRequest::post()
        .uri("/api/teams")
        .set_json(json!({ "name": "Lob Stars" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get().uri("/api/revision").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["revision"].as_u64().unwrap(), before + 1);
    assert_eq!(ctx.read().unwrap().teams.len(), 1);
}

#[actix_web::test]
async fn event_stream_announces_recorded_scores() {
    let fixture = active_league(MatchFormat::BestOfThree, &["Aces", "Volleys"]);
    let (league, division) = (fixture.league, fixture.division);
    let ctx = Data::new(AppContext::new(fixture.store, Config::default()));
    let app = test::init_service(
        App::new()
            .app_data(ctx.clone())
            .wrap(session_middleware(Key::generate(), false))
            .configure(configure),
    )
    .await;

    // First account in the store, so it manages every league.
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(account("root@example.com", "player"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::post()
        .uri(&format!("/api/leagues/{league}/divisions/{division}/matches/generate"))
        .cookie(cookie.clone())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let match_id = created[0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get().uri("/api/events").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/event-stream");
    let mut body = Box::pin(resp.into_body());
    assert_eq!(next_chunk(&mut body).await, ": connected\n\n");

    let req = test::TestRequest::post()
        .uri(&format!("/api/matches/{match_id}/score"))
        .cookie(cookie)
        .set_json(json!({ "sets": [{ "team1": 6, "team2": 3 }, { "team1": 6, "team2": 4 }] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let frame = next_chunk(&mut body).await;
    assert!(frame.starts_with("event: match_updated\n"), "{frame}");
    assert!(frame.contains(&match_id));
    let frame = next_chunk(&mut body).await;
    assert!(frame.starts_with("event: standings_updated\n"), "{frame}");
}
