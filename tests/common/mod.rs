//! Common test utilities and fixtures
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use ecopulse_backend::config::Config;
use ecopulse_backend::database::{MemoryUserStore, UserStore};
use ecopulse_backend::routes::create_app;
use ecopulse_backend::state::AppState;
use serde_json::Value;
use tower::util::ServiceExt;

pub mod fixtures {
    pub const EMAIL: &str = "jane@ecopulse.test";
    pub const USERNAME: &str = "jane";
    pub const PASSWORD: &str = "Gr33n-Planet-2024";
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryUserStore>,
}

pub fn test_config(spa_index_path: PathBuf) -> Config {
    let mut config = Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some("test-secret-key".to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("test config is valid");
    config.spa_index_path = spa_index_path;
    config
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_index(PathBuf::from("does/not/exist/index.html"))
}

pub fn create_test_app_with_index(spa_index_path: PathBuf) -> TestApp {
    let config = test_config(spa_index_path);
    let store = Arc::new(MemoryUserStore::new());
    let state = AppState::new(store.clone(), &config);
    TestApp { router: create_app(state, &config.cors_allowed_origins), store }
}

/// Router over an arbitrary store, for exercising storage failures.
pub fn create_test_router_with_store(store: Arc<dyn UserStore>) -> Router {
    let config = test_config(PathBuf::from("does/not/exist/index.html"));
    create_app(AppState::new(store, &config), &config.cors_allowed_origins)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).expect("response body is JSON")
    }

    /// The `Set-Cookie` header, if any.
    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().expect("ascii cookie").to_string())
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.expect("request is served");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body is readable");
    TestResponse { status, headers, text: String::from_utf8_lossy(&bytes).into_owned() }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).expect("request builds")
}

/// Extracts `value` from a `jwt=value; ...` Set-Cookie header.
pub fn cookie_value(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, v)| v.to_string())
        .expect("cookie has a value")
}

pub async fn register(router: &Router, email: &str, username: &str, password: &str) -> TestResponse {
    let body = serde_json::json!({ "email": email, "username": username, "password": password });
    send(router, json_request("POST", "/api/users/register/", body)).await
}

pub async fn login(router: &Router, email: &str, password: &str) -> TestResponse {
    let body = serde_json::json!({ "email": email, "password": password });
    send(router, json_request("POST", "/api/users/login/", body)).await
}

pub struct Session {
    pub access: String,
    pub refresh: String,
    pub user_id: i64,
}

/// Registers the fixture user and logs in.
pub async fn signed_in(router: &Router) -> Session {
    let registered = register(router, fixtures::EMAIL, fixtures::USERNAME, fixtures::PASSWORD).await;
    assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.text);
    let logged_in = login(router, fixtures::EMAIL, fixtures::PASSWORD).await;
    assert_eq!(logged_in.status, StatusCode::OK, "{}", logged_in.text);
    let body = logged_in.json();
    Session {
        access: body["access"].as_str().unwrap().to_string(),
        refresh: body["refresh"].as_str().unwrap().to_string(),
        user_id: body["user"]["id"].as_i64().unwrap(),
    }
}
