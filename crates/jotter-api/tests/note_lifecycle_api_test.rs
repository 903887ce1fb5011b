//! End-to-end note lifecycle over HTTP against the in-memory store.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{create_note, send, signup_and_login, test_app, PASSWORD};

fn ids(body: &Value) -> Vec<String> {
    body["notes"]
        .as_array()
        .expect("notes array")
        .iter()
        .map(|n| n["id"].as_str().expect("id").to_string())
        .collect()
}

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/signup",
        None,
        Some(json!({ "username": "alice", "email": "alice@x.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "alice@x.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let auth = common::bearer(body["token"].as_str().expect("token"));

    let (status, body) = send(&app, Method::GET, "/api/notes", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], json!([]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/notes",
        Some(&auth),
        Some(json!({ "title": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["note"]["state"], "active");
    assert_eq!(body["note"]["content"], "");
    let id = body["note"]["id"].as_str().expect("id").to_string();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{}/archive", id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"]["archived"], true);
    assert_eq!(body["note"]["state"], "archived");

    let (_, body) = send(&app, Method::GET, "/api/notes", Some(&auth), None).await;
    assert!(ids(&body).is_empty());
    let (_, body) = send(&app, Method::GET, "/api/notes/archived", Some(&auth), None).await;
    assert_eq!(ids(&body), vec![id.clone()]);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/notes/{}", id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"]["state"], "trashed");

    let (_, body) = send(&app, Method::GET, "/api/notes/archived", Some(&auth), None).await;
    assert!(ids(&body).is_empty());
    let (_, body) = send(&app, Method::GET, "/api/notes/trash", Some(&auth), None).await;
    assert_eq!(ids(&body), vec![id.clone()]);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/notes/{}/permanent", id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Note permanently deleted");

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/notes/{}", id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_recover_returns_note_to_active() {
    let app = test_app();
    let auth = signup_and_login(&app, "bob").await;
    let id = create_note(&app, &auth, "draft").await;

    send(&app, Method::PUT, &format!("/api/notes/{}/archive", id), Some(&auth), None).await;
    send(&app, Method::DELETE, &format!("/api/notes/{}", id), Some(&auth), None).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{}/recover", id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"]["state"], "active");
    assert_eq!(body["note"]["archived"], false);

    let (_, body) = send(&app, Method::GET, "/api/notes", Some(&auth), None).await;
    assert_eq!(ids(&body), vec![id]);
}

#[tokio::test]
async fn test_illegal_transitions_conflict() {
    let app = test_app();
    let auth = signup_and_login(&app, "carol").await;
    let id = create_note(&app, &auth, "keep").await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/notes/{}/permanent", id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{}/unarchive", id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{}/recover", id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_note() {
    let app = test_app();
    let auth = signup_and_login(&app, "dave").await;
    let id = create_note(&app, &auth, "before").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{}", id),
        Some(&auth),
        Some(json!({ "title": "after", "content": "body" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"]["title"], "after");
    assert_eq!(body["note"]["content"], "body");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{}", id),
        Some(&auth),
        Some(json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_without_title_is_rejected() {
    let app = test_app();
    let auth = signup_and_login(&app, "gina").await;

    for body in [json!({}), json!({ "content": "no title" })] {
        let (status, body) = send(&app, Method::POST, "/api/notes", Some(&auth), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Title is required");
    }

    let (status, body) = send(&app, Method::POST, "/api/tags", Some(&auth), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Tag name is required");
}

#[tokio::test]
async fn test_tagging_over_http() {
    let app = test_app();
    let auth = signup_and_login(&app, "erin").await;
    let id = create_note(&app, &auth, "tagged").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tags",
        Some(&auth),
        Some(json!({ "name": "work" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tag_id = body["tag"]["id"].as_str().expect("tag id").to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tags",
        Some(&auth),
        Some(json!({ "name": "work" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let attach_uri = format!("/api/notes/{}/tags", id);
    let attach_body = json!({ "tag_id": tag_id });

    let (status, body) = send(
        &app,
        Method::POST,
        &attach_uri,
        Some(&auth),
        Some(attach_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"]["tags"][0]["name"], "work");

    let (status, _) = send(&app, Method::POST, &attach_uri, Some(&auth), Some(attach_body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/notes?tag_id={}", tag_id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(ids(&body), vec![id.clone()]);

    let detach_uri = format!("/api/notes/{}/tags/{}", id, tag_id);
    let (status, body) = send(&app, Method::DELETE, &detach_uri, Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"]["tags"], json!([]));

    let (status, _) = send(&app, Method::DELETE, &detach_uri, Some(&auth), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/tags/{}", tag_id),
        Some(&auth),
        Some(json!({ "name": "office" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tag"]["name"], "office");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/tags/{}", tag_id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/tags/{}", tag_id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notes_are_invisible_to_other_users() {
    let app = test_app();
    let alice = signup_and_login(&app, "alice").await;
    let mallory = signup_and_login(&app, "mallory").await;
    let id = create_note(&app, &alice, "secret").await;

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/notes/{}", id),
        Some(&mallory),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/notes/{}", id),
        Some(&mallory),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/notes", Some(&mallory), None).await;
    assert!(ids(&body).is_empty());
}

#[tokio::test]
async fn test_list_order_and_pagination() {
    let app = test_app();
    let auth = signup_and_login(&app, "frank").await;
    let first = create_note(&app, &auth, "one").await;
    let second = create_note(&app, &auth, "two").await;
    let third = create_note(&app, &auth, "three").await;

    let (_, body) = send(&app, Method::GET, "/api/notes", Some(&auth), None).await;
    assert_eq!(ids(&body), vec![third.clone(), second.clone(), first.clone()]);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/notes?order=asc&limit=2&offset=1",
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(ids(&body), vec![second, third]);
}
