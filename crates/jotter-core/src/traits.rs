//! Core traits for jotter storage.
//!
//! Every service operation runs against a [`UnitOfWork`]: one atomic
//! storage session that exposes all repositories. Changes become visible to
//! other sessions only after [`UnitOfWork::commit`]; dropping a unit of work
//! without committing discards everything it did.
//!
//! Repository methods that take an `owner` only ever see rows belonging to
//! that user. A row owned by someone else is indistinguishable from a row
//! that does not exist.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Credential store.
#[async_trait]
pub trait UserRepository: Send {
    /// Insert a new user. Duplicate username or email is a `Conflict`.
    async fn insert_user(&mut self, user: &User) -> Result<()>;

    /// Fetch a user by id.
    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>>;

    /// Fetch a user by normalized email.
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>>;

    /// Whether a user already holds this username or email.
    async fn user_exists(&mut self, username: &str, email: &str) -> Result<bool>;

    /// Replace a user's password hash.
    async fn update_password_hash(&mut self, id: Uuid, password_hash: &str) -> Result<()>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Owner-scoped note storage.
#[async_trait]
pub trait NoteRepository: Send {
    /// Insert a new note.
    async fn insert_note(&mut self, note: &Note) -> Result<()>;

    /// Fetch a note in any lifecycle state.
    async fn find_note(&mut self, owner: Uuid, id: Uuid) -> Result<Option<Note>>;

    /// Persist title, content, flags and `updated_at` of an existing note.
    async fn update_note(&mut self, note: &Note) -> Result<()>;

    /// Remove a note and its tag links. Returns false when nothing matched.
    async fn delete_note(&mut self, owner: Uuid, id: Uuid) -> Result<bool>;

    /// List notes in one view, ordered by that view's sort key.
    async fn list_notes(&mut self, owner: Uuid, req: &ListNotesRequest) -> Result<Vec<Note>>;

    /// Tags attached to a note, ordered by name.
    async fn note_tags(&mut self, note_id: Uuid) -> Result<Vec<Tag>>;

    /// Tags for many notes in one round trip. Notes without tags are absent
    /// from the map.
    async fn tags_for_notes(&mut self, note_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>>;

    /// Link a tag to a note. Linking an already linked pair is a no-op.
    async fn attach_tag(&mut self, note_id: Uuid, tag_id: Uuid) -> Result<()>;

    /// Unlink a tag from a note. Returns false when the pair was not linked.
    async fn detach_tag(&mut self, note_id: Uuid, tag_id: Uuid) -> Result<bool>;
}

// =============================================================================
// TAG REPOSITORY
// =============================================================================

/// Owner-scoped tag storage.
#[async_trait]
pub trait TagRepository: Send {
    /// Insert a new tag. A duplicate name for the same owner is a `Conflict`.
    async fn insert_tag(&mut self, tag: &Tag) -> Result<()>;

    async fn find_tag(&mut self, owner: Uuid, id: Uuid) -> Result<Option<Tag>>;

    async fn find_tag_by_name(&mut self, owner: Uuid, name: &str) -> Result<Option<Tag>>;

    /// All of an owner's tags, ordered by name.
    async fn list_tags(&mut self, owner: Uuid) -> Result<Vec<Tag>>;

    /// Persist a renamed tag. A duplicate name is a `Conflict`.
    async fn update_tag(&mut self, tag: &Tag) -> Result<()>;

    /// Remove a tag and every link to it. Returns false when nothing matched.
    async fn delete_tag(&mut self, owner: Uuid, id: Uuid) -> Result<bool>;
}

// =============================================================================
// REVOCATION LEDGER
// =============================================================================

/// Set of bearer tokens that have been logged out.
///
/// Entries are keyed by the exact token string and are never removed.
#[async_trait]
pub trait RevocationLedger: Send {
    /// Record a token. Idempotent: a second call reports `AlreadyRevoked`.
    async fn revoke(&mut self, token: &str, at: DateTime<Utc>) -> Result<RevokeOutcome>;

    /// Whether the exact token string has been revoked.
    async fn is_revoked(&mut self, token: &str) -> Result<bool>;
}

// =============================================================================
// UNIT OF WORK
// =============================================================================

/// One atomic storage session spanning every repository.
#[async_trait]
pub trait UnitOfWork: UserRepository + NoteRepository + TagRepository + RevocationLedger {
    /// Make every change in this session durable and visible.
    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Source of units of work; shared across request handlers.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a new unit of work.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}
