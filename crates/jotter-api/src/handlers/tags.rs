//! Tag CRUD endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use jotter_core::service::tags;

use crate::extract::{AuthSession, Credentials, JsonBody};
use crate::{ApiError, AppState};

/// Request body for creating or renaming a tag.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TagRequest {
    pub name: String,
}

/// The caller's tags, ordered by name.
pub async fn list_tags(
    State(state): State<AppState>,
    credentials: Credentials,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let tags = tags::list(session.uow.as_mut(), session.user_id).await?;
    session.commit().await?;
    Ok(Json(json!({ "tags": tags })))
}

/// Create a tag.
///
/// # Returns
/// - 201 Created with `{message, tag}`
/// - 400 Bad Request if the name is blank or too long
/// - 409 Conflict if the caller already has a tag with that name
pub async fn create_tag(
    State(state): State<AppState>,
    credentials: Credentials,
    JsonBody(req): JsonBody<TagRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let tag = tags::create(session.uow.as_mut(), session.user_id, &req.name).await?;
    session.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Tag created", "tag": tag })),
    ))
}

pub async fn get_tag(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let tag = tags::get(session.uow.as_mut(), session.user_id, id).await?;
    session.commit().await?;
    Ok(Json(json!({ "tag": tag })))
}

pub async fn update_tag(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<TagRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let tag = tags::rename(session.uow.as_mut(), session.user_id, id, &req.name).await?;
    session.commit().await?;
    Ok(Json(json!({ "message": "Tag updated", "tag": tag })))
}

/// Delete a tag; notes that carried it keep everything else.
pub async fn delete_tag(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    tags::delete(session.uow.as_mut(), session.user_id, id).await?;
    session.commit().await?;
    Ok(Json(json!({ "message": "Tag deleted" })))
}
