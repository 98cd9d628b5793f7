#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use scenra_ai::mock::ScriptedLlm;
use scenra_ai::LlmChat;
use scenra_api::auth::jwt::JwtConfig;
use scenra_api::config::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use scenra_api::router::build_app_router;
use scenra_api::state::AppState;
use scenra_core::storage::LocalStorage;
use serde_json::{json, Value};
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

/// A router plus the temporary directory backing its object storage.
///
/// The directory is removed when the `TestApp` is dropped.
pub struct TestApp {
    pub router: Router,
    pub storage: Arc<LocalStorage>,
    _storage_dir: TempDir,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(storage_dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        storage_root: storage_dir.path().to_path_buf(),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 30,
        },
        ai: None,
    }
}

fn build(pool: PgPool, llm: Option<Arc<dyn LlmChat>>) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("tempdir should be creatable");
    let config = test_config(&storage_dir);
    let storage = Arc::new(LocalStorage::new(storage_dir.path()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage: Arc::clone(&storage),
        llm,
    };

    TestApp {
        router: build_app_router(state, &config),
        storage,
        _storage_dir: storage_dir,
    }
}

/// Build the full application with AI disabled.
pub fn build_test_app(pool: PgPool) -> TestApp {
    build(pool, None)
}

/// Build the full application backed by a scripted model.
pub fn build_test_app_with_llm(pool: PgPool, llm: Arc<ScriptedLlm>) -> TestApp {
    build(pool, Some(llm as Arc<dyn LlmChat>))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &TestApp, request: Request<Body>) -> Response {
    app.router
        .clone()
        .oneshot(request)
        .await
        .expect("router should not fail")
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
}

async fn send_json(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Response {
    let req = request(method, uri, token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    send(app, req).await
}

async fn send_empty(app: &TestApp, method: Method, uri: &str, token: Option<&str>) -> Response {
    let req = request(method, uri, token)
        .body(Body::empty())
        .expect("request should build");
    send(app, req).await
}

pub async fn get(app: &TestApp, uri: &str) -> Response {
    send_empty(app, Method::GET, uri, None).await
}

pub async fn get_auth(app: &TestApp, uri: &str, token: &str) -> Response {
    send_empty(app, Method::GET, uri, Some(token)).await
}

pub async fn delete_auth(app: &TestApp, uri: &str, token: &str) -> Response {
    send_empty(app, Method::DELETE, uri, Some(token)).await
}

pub async fn post_auth(app: &TestApp, uri: &str, token: &str) -> Response {
    send_empty(app, Method::POST, uri, Some(token)).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: Value) -> Response {
    send_json(app, Method::POST, uri, None, body).await
}

pub async fn post_json_auth(app: &TestApp, uri: &str, token: &str, body: Value) -> Response {
    send_json(app, Method::POST, uri, Some(token), body).await
}

pub async fn patch_json_auth(app: &TestApp, uri: &str, token: &str, body: Value) -> Response {
    send_json(app, Method::PATCH, uri, Some(token), body).await
}

pub async fn put_json_auth(app: &TestApp, uri: &str, token: &str, body: Value) -> Response {
    send_json(app, Method::PUT, uri, Some(token), body).await
}

pub async fn put_auth(app: &TestApp, uri: &str, token: &str) -> Response {
    send_empty(app, Method::PUT, uri, Some(token)).await
}

/// POST a single-file multipart upload under the field name `file`.
pub async fn upload_auth(
    app: &TestApp,
    uri: &str,
    token: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Response {
    let boundary = "scenra-test-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
         filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let req = request(Method::POST, uri, Some(token))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("request should build");
    send(app, req).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).expect("body should be UTF-8")
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const TEST_PASSWORD: &str = "correct-horse-42";

/// Register a user through the API and return `(access_token, user_id)`.
pub async fn register_user(app: &TestApp, email: &str) -> (String, i64) {
    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({ "email": email, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let token = json["access_token"]
        .as_str()
        .expect("access_token")
        .to_string();
    let id = json["user"]["id"].as_i64().expect("user id");
    (token, id)
}

/// POST a JSON body and return the `data` id of the 201 response.
pub async fn create_ok(app: &TestApp, uri: &str, token: &str, body: Value) -> i64 {
    let response = post_json_auth(app, uri, token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {uri}");
    body_json(response).await["data"]["id"]
        .as_i64()
        .expect("created id")
}

pub async fn create_series(app: &TestApp, token: &str, title: &str) -> i64 {
    create_ok(app, "/api/v1/series", token, json!({ "title": title })).await
}

pub async fn create_episode(app: &TestApp, token: &str, series_id: i64, title: &str) -> i64 {
    create_ok(
        app,
        &format!("/api/v1/series/{series_id}/episodes"),
        token,
        json!({ "title": title }),
    )
    .await
}

pub async fn create_character(app: &TestApp, token: &str, series_id: i64, name: &str) -> i64 {
    create_ok(
        app,
        &format!("/api/v1/series/{series_id}/characters"),
        token,
        json!({ "name": name, "role": "protagonist" }),
    )
    .await
}

pub async fn create_segment(app: &TestApp, token: &str, episode_id: i64, body: Value) -> i64 {
    create_ok(
        app,
        &format!("/api/v1/episodes/{episode_id}/segments"),
        token,
        body,
    )
    .await
}

/// A valid 1x1 PNG.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];
