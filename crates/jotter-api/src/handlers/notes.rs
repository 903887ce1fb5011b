//! Note CRUD, lifecycle and tagging endpoints.
//!
//! Every route is owner-scoped: a note that belongs to another user answers
//! exactly like one that does not exist.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use jotter_core::service::notes;
use jotter_core::{CreateNoteRequest, ListNotesRequest, NoteView, SortOrder, UpdateNoteRequest};

use crate::extract::{AuthSession, Credentials, JsonBody};
use crate::{ApiError, AppState};

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Query parameters shared by the three list views.
#[derive(Debug, Default, Deserialize)]
pub struct ListNotesQuery {
    /// `asc` or `desc` (default `desc`)
    pub order: Option<SortOrder>,
    /// Only notes carrying this tag
    pub tag_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListNotesQuery {
    fn into_request(self, view: NoteView) -> ListNotesRequest {
        ListNotesRequest {
            view,
            order: self.order.unwrap_or_default(),
            tag_id: self.tag_id,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Request body for attaching a tag.
#[derive(Debug, Deserialize)]
pub struct AttachTagRequest {
    pub tag_id: Uuid,
}

// =============================================================================
// LIST
// =============================================================================

async fn list_view(
    state: AppState,
    credentials: Credentials,
    query: ListNotesQuery,
    view: NoteView,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let notes = notes::list(
        session.uow.as_mut(),
        session.user_id,
        query.into_request(view),
    )
    .await?;
    session.commit().await?;
    Ok(Json(json!({ "notes": notes })))
}

/// Active notes, newest first by default.
pub async fn list_notes(
    State(state): State<AppState>,
    credentials: Credentials,
    Query(query): Query<ListNotesQuery>,
) -> Result<Json<Value>, ApiError> {
    list_view(state, credentials, query, NoteView::Active).await
}

/// Archived notes that are not in the trash.
pub async fn list_archived_notes(
    State(state): State<AppState>,
    credentials: Credentials,
    Query(query): Query<ListNotesQuery>,
) -> Result<Json<Value>, ApiError> {
    list_view(state, credentials, query, NoteView::Archived).await
}

/// Trashed notes, most recently trashed first by default.
pub async fn list_trash(
    State(state): State<AppState>,
    credentials: Credentials,
    Query(query): Query<ListNotesQuery>,
) -> Result<Json<Value>, ApiError> {
    list_view(state, credentials, query, NoteView::Trash).await
}

// =============================================================================
// CRUD
// =============================================================================

/// Create a note.
///
/// # Returns
/// - 201 Created with `{message, note}`; the note is Active
/// - 400 Bad Request if the title is empty or too long
/// - 404 Not Found if a listed tag is not the caller's
pub async fn create_note(
    State(state): State<AppState>,
    credentials: Credentials,
    JsonBody(req): JsonBody<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let note = notes::create(session.uow.as_mut(), session.user_id, req).await?;
    session.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Note created", "note": note })),
    ))
}

/// Fetch one note in any state.
pub async fn get_note(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let note = notes::get(session.uow.as_mut(), session.user_id, id).await?;
    session.commit().await?;
    Ok(Json(json!({ "note": note })))
}

/// Edit title and/or content.
///
/// # Returns
/// - 200 OK with `{message, note}`
/// - 409 Conflict if the note is in the trash
pub async fn update_note(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<UpdateNoteRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let note = notes::update(session.uow.as_mut(), session.user_id, id, req).await?;
    session.commit().await?;
    Ok(Json(json!({ "message": "Note updated", "note": note })))
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Move a note to the trash.
pub async fn soft_delete_note(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let note = notes::soft_delete(session.uow.as_mut(), session.user_id, id).await?;
    session.commit().await?;
    Ok(Json(json!({ "message": "Note moved to trash", "note": note })))
}

pub async fn archive_note(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let note = notes::archive(session.uow.as_mut(), session.user_id, id).await?;
    session.commit().await?;
    Ok(Json(json!({ "message": "Note archived", "note": note })))
}

pub async fn unarchive_note(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let note = notes::unarchive(session.uow.as_mut(), session.user_id, id).await?;
    session.commit().await?;
    Ok(Json(json!({ "message": "Note unarchived", "note": note })))
}

/// Bring a note back from the trash. It always comes back Active.
pub async fn recover_note(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let note = notes::recover(session.uow.as_mut(), session.user_id, id).await?;
    session.commit().await?;
    Ok(Json(json!({ "message": "Note recovered", "note": note })))
}

/// Delete a trashed note for good.
///
/// # Returns
/// - 200 OK with `{message}`
/// - 409 Conflict if the note is not in the trash
pub async fn permanent_delete_note(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    notes::permanent_delete(session.uow.as_mut(), session.user_id, id).await?;
    session.commit().await?;
    Ok(Json(json!({ "message": "Note permanently deleted" })))
}

// =============================================================================
// TAGGING
// =============================================================================

pub async fn attach_tag(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<AttachTagRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let note = notes::attach_tag(session.uow.as_mut(), session.user_id, id, req.tag_id).await?;
    session.commit().await?;
    Ok(Json(json!({ "message": "Tag attached to note", "note": note })))
}

pub async fn detach_tag(
    State(state): State<AppState>,
    credentials: Credentials,
    Path((id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    let note = notes::detach_tag(session.uow.as_mut(), session.user_id, id, tag_id).await?;
    session.commit().await?;
    Ok(Json(json!({ "message": "Tag detached from note", "note": note })))
}
