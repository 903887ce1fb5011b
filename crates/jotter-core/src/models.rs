//! Core data models for jotter.
//!
//! These types are shared across all jotter crates and represent the core
//! domain entities plus the request shapes the services accept.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Drop sub-microsecond digits so a timestamp compares equal after a
/// round trip through a `TIMESTAMPTZ` column.
pub fn to_storage_precision(t: DateTime<Utc>) -> DateTime<Utc> {
    t.trunc_subsecs(6)
}

// =============================================================================
// USER TYPES
// =============================================================================

/// A registered account.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Stored trimmed and lower-cased.
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Request for creating an account. Absent fields arrive empty.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A note owned by exactly one user.
///
/// `archived` and `deleted` are independent flags; [`Note::state`] collapses
/// them into the externally meaningful lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived: bool,
    pub deleted: bool,
}

impl Note {
    /// Build a fresh Active note.
    pub fn new(user_id: Uuid, title: String, content: String, now: DateTime<Utc>) -> Self {
        let now = to_storage_precision(now);
        Self {
            id: Uuid::now_v7(),
            user_id,
            title,
            content,
            created_at: now,
            updated_at: now,
            archived: false,
            deleted: false,
        }
    }

    /// Current lifecycle state. Trash wins over the archived flag.
    pub fn state(&self) -> NoteState {
        if self.deleted {
            NoteState::Trashed
        } else if self.archived {
            NoteState::Archived
        } else {
            NoteState::Active
        }
    }
}

/// Externally meaningful lifecycle state of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteState {
    Active,
    Archived,
    Trashed,
}

impl std::fmt::Display for NoteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NoteState::Active => "active",
            NoteState::Archived => "archived",
            NoteState::Trashed => "trashed",
        };
        f.write_str(s)
    }
}

/// A note with its tags, as returned by every note operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteDetail {
    #[serde(flatten)]
    pub note: Note,
    pub state: NoteState,
    /// Ordered by tag name.
    pub tags: Vec<TagRef>,
}

impl NoteDetail {
    pub fn new(note: Note, mut tags: Vec<Tag>) -> Self {
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            state: note.state(),
            note,
            tags: tags.into_iter().map(TagRef::from).collect(),
        }
    }
}

/// Request for creating a new note.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

/// Request for editing a note's text. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Which filtered view of a user's notes to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteView {
    /// Not archived and not trashed; ordered by creation time.
    #[default]
    Active,
    /// Archived but not trashed; ordered by creation time.
    Archived,
    /// Trashed; ordered by last update.
    Trash,
}

impl NoteView {
    /// Whether a note belongs in this view.
    pub fn includes(&self, note: &Note) -> bool {
        match self {
            NoteView::Active => !note.archived && !note.deleted,
            NoteView::Archived => note.archived && !note.deleted,
            NoteView::Trash => note.deleted,
        }
    }

    /// Timestamp the view is ordered by.
    pub fn sort_key(&self, note: &Note) -> DateTime<Utc> {
        match self {
            NoteView::Trash => note.updated_at,
            NoteView::Active | NoteView::Archived => note.created_at,
        }
    }
}

/// Sort direction for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Request for listing notes.
#[derive(Debug, Clone, Default)]
pub struct ListNotesRequest {
    pub view: NoteView,
    pub order: SortOrder,
    /// Restrict to notes carrying this tag
    pub tag_id: Option<Uuid>,
    /// Maximum results
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: Option<i64>,
}

// =============================================================================
// TAG TYPES
// =============================================================================

/// A tag owned by exactly one user; the name is unique within that user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(user_id: Uuid, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            name,
            created_at: to_storage_precision(now),
        }
    }
}

/// Compact tag reference embedded in note responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagRef {
    pub id: Uuid,
    pub name: String,
}

impl From<Tag> for TagRef {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

// =============================================================================
// REVOCATION TYPES
// =============================================================================

/// Result of recording a token in the revocation ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevokeOutcome {
    /// The token was not in the ledger and now is.
    Revoked,
    /// The token was already in the ledger; nothing changed.
    AlreadyRevoked,
}
