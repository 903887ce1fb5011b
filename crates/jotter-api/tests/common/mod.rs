//! Shared helpers for HTTP tests: an in-memory app and a JSON request driver.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use jotter_api::config::parse_allowed_origins;
use jotter_api::{router, AppState};
use jotter_core::{AccountService, AuthConfig, HashParams, MemoryStore};

pub const PASSWORD: &str = "Passw0rd";

/// Router over a fresh `MemoryStore` with fast password hashing.
pub fn test_app() -> Router {
    let config = AuthConfig::new("integration-test-secret")
        .with_hash_params(HashParams::insecure_fast());
    let accounts = AccountService::new(&config).expect("account service");
    let state = AppState::new(Arc::new(MemoryStore::new()), accounts);
    router(state, parse_allowed_origins(""))
}

/// Send one request and decode the JSON response body (`Null` when empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = auth {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Sign up and log in; returns the bearer header value.
pub async fn signup_and_login(app: &Router, username: &str) -> String {
    let email = format!("{}@example.com", username);
    let (status, _) = send(
        app,
        Method::POST,
        "/api/signup",
        None,
        Some(json!({ "username": username, "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    bearer(body["token"].as_str().expect("token"))
}

/// Create a note and return its id.
pub async fn create_note(app: &Router, auth: &str, title: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/notes",
        Some(auth),
        Some(json!({ "title": title })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["note"]["id"].as_str().expect("note id").to_string()
}
