//! Token gate, account endpoints and error shapes over HTTP.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{send, signup_and_login, test_app, PASSWORD};

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = test_app();
    let auth = signup_and_login(&app, "alice").await;

    let (status, body) = send(&app, Method::POST, "/api/logout", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully logged out");

    let (status, body) = send(&app, Method::GET, "/api/notes", Some(&auth), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token has been revoked");

    let (status, body) = send(&app, Method::POST, "/api/logout", Some(&auth), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token has been revoked");
}

#[tokio::test]
async fn test_auth_login_alias() {
    let app = test_app();
    signup_and_login(&app, "bob").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "BOB@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let auth = common::bearer(body["token"].as_str().expect("token"));

    let (status, _) = send(&app, Method::GET, "/api/notes", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_authorization_headers() {
    let app = test_app();
    for header in [None, Some("Token abc"), Some("Bearer"), Some("Bearer a b"), Some("Bearer ")] {
        let (status, body) = send(&app, Method::GET, "/api/notes", header, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {:?}", header);
        assert_eq!(body["error"], "Missing or invalid token format");
    }
}

#[tokio::test]
async fn test_forged_token_rejected() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/tags",
        Some("Bearer not.a.token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_signup_errors() {
    let app = test_app();
    signup_and_login(&app, "carol").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/signup",
        None,
        Some(json!({ "username": "carol2", "email": "not-an-email", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/signup",
        None,
        Some(json!({ "username": "carol3", "email": "c3@example.com", "password": "lowercase1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/signup",
        None,
        Some(json!({ "username": "other", "email": "CAROL@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username or email already exists");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = test_app();
    signup_and_login(&app, "dave").await;

    let (status_a, body_a) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "dave@example.com", "password": "WrongPass1" })),
    )
    .await;
    let (status_b, body_b) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
    )
    .await;

    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_a, status_b);
    assert_eq!(body_a, body_b);
    assert_eq!(body_a["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_change_password() {
    let app = test_app();
    let auth = signup_and_login(&app, "erin").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/change-password",
        Some(&auth),
        Some(json!({ "old_password": "WrongPass1", "new_password": "NewPassw0rd" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Old password is incorrect");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/change-password",
        Some(&auth),
        Some(json!({ "old_password": PASSWORD, "new_password": "NewPassw0rd" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password changed successfully");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "erin@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "erin@example.com", "password": "NewPassw0rd" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let (status, body) = send(&app, Method::GET, "/api/ping", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "pong");
}

#[tokio::test]
async fn test_cors_preflight_respects_allow_list() {
    let app = test_app();

    let preflight = |origin: &'static str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/notes")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .expect("request")
    };

    let response = app
        .clone()
        .oneshot(preflight("http://localhost:5173"))
        .await
        .expect("response");
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("allow-origin"),
        "http://localhost:5173"
    );

    let response = app
        .clone()
        .oneshot(preflight("https://evil.example"))
        .await
        .expect("response");
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_missing_fields_use_domain_messages() {
    let app = test_app();
    let auth = signup_and_login(&app, "frank").await;

    for (uri, auth, body) in [
        ("/api/signup", None, json!({})),
        ("/api/signup", None, json!({ "username": "frank2", "email": "f2@example.com" })),
        ("/api/login", None, json!({ "email": "frank@example.com" })),
        ("/api/change-password", Some(auth.as_str()), json!({ "new_password": "NewPassw0rd" })),
    ] {
        let (status, body) = send(&app, Method::POST, uri, auth, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "Missing required fields", "{}", uri);
    }
}

#[tokio::test]
async fn test_malformed_json_is_a_json_error() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"email\": "))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json error body");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_stalled_upload_does_not_block_other_requests() {
    let app = test_app();
    let auth = signup_and_login(&app, "grace").await;

    let stalled = Request::builder()
        .method(Method::POST)
        .uri("/api/notes")
        .header(header::AUTHORIZATION, auth.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from_stream(futures::stream::pending::<
            Result<Vec<u8>, std::io::Error>,
        >()))
        .expect("request");
    let upload = tokio::spawn(app.clone().oneshot(stalled));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (status, _) = tokio::time::timeout(
        Duration::from_secs(2),
        send(&app, Method::GET, "/api/notes", Some(&auth), None),
    )
    .await
    .expect("list request waited on the stalled upload");
    assert_eq!(status, StatusCode::OK);

    upload.abort();
}
