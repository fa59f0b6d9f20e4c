//! Smoke tests for the end-to-end registration flows, against a file-backed
//! database with sessions persisted in SQLite.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use roster::config::Config;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> (Arc<roster::api::AppState>, Router, PathBuf) {
    let db_path =
        std::env::temp_dir().join(format!("roster-smoke-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.persist_sessions = true;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = roster::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    let router = roster::api::router(state.clone())
        .await
        .expect("failed to build router");

    (state, router, db_path)
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    (
        status,
        cookie,
        serde_json::from_slice(&bytes).unwrap_or(Value::Null),
    )
}

async fn register(app: &Router, name: &str) -> (String, i64) {
    let (status, cookie, body) = call(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "password": "correct horse",
            "password2": "correct horse",
            "shirt_size": "M",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    (
        cookie.expect("missing session cookie"),
        body["data"]["id"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn smoke_site_admin_removes_team_admin() {
    let (state, app, db_path) = spawn_app().await;

    let (ada, ada_id) = register(&app, "Ada").await;
    let (bob, _) = register(&app, "Bob").await;
    let (carol, _) = register(&app, "Carol").await;

    let (status, _, body) = call(
        &app,
        Method::POST,
        "/api/teams/register",
        Some(&ada),
        Some(json!({ "name": "Alpha" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let team_id = body["data"]["id"].as_i64().unwrap();

    let (status, _, _) = call(
        &app,
        Method::POST,
        "/api/teams/register",
        Some(&bob),
        Some(json!({ "select_name": "Alpha" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    state
        .auth_service()
        .promote("carol@example.com")
        .await
        .expect("promote should succeed");

    let (status, _, body) = call(
        &app,
        Method::DELETE,
        &format!("/api/users/{ada_id}"),
        Some(&carol),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        body["message"],
        "Ada has been deleted. Bob is now the team admin."
    );

    // The deleted user's session no longer authenticates.
    let (status, _, _) = call(&app, Method::GET, "/api/auth/me", Some(&ada), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, body) = call(
        &app,
        Method::POST,
        &format!("/api/teams/{team_id}/leave"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You left Alpha. Alpha was disbanded.");

    let (_, _, body) = call(&app, Method::GET, "/api/stats", None, None).await;
    assert_eq!(body["data"]["user_count"], 2);
    assert_eq!(body["data"]["team_count"], 0);

    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn smoke_sessions_survive_router_rebuild() {
    let (state, app, db_path) = spawn_app().await;
    let (cookie, _) = register(&app, "Ada").await;

    // A second router over the same state shares the persisted session table.
    let rebuilt = roster::api::router(state)
        .await
        .expect("failed to rebuild router");

    let (status, _, body) = call(&rebuilt, Method::GET, "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ada");

    let _ = std::fs::remove_file(db_path);
}
