//! In-process implementation of the storage traits.
//!
//! A unit of work holds the store's lock for its whole lifetime and edits a
//! private copy of the state. Commit swaps the copy in; drop discards it. Units
//! of work therefore run one at a time, which gives the same all-or-nothing
//! visibility as a database transaction.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;
use crate::traits::*;
use crate::validation::normalize_email;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    notes: HashMap<Uuid, Note>,
    tags: HashMap<Uuid, Tag>,
    /// (note_id, tag_id)
    note_tags: BTreeSet<(Uuid, Uuid)>,
    revoked: HashMap<String, DateTime<Utc>>,
}

/// Shared in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }
}

/// Unit of work over a [`MemoryStore`].
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryUnitOfWork {
    async fn insert_user(&mut self, user: &User) -> Result<()> {
        if self.user_exists(&user.username, &user.email).await? {
            return Err(Error::Conflict(
                "Username or email already exists".to_string(),
            ));
        }
        self.working.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn user_exists(&mut self, username: &str, email: &str) -> Result<bool> {
        let email = normalize_email(email);
        Ok(self
            .working
            .users
            .values()
            .any(|u| u.username == username || u.email == email))
    }

    async fn update_password_hash(&mut self, id: Uuid, password_hash: &str) -> Result<()> {
        let user = self
            .working
            .users
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl NoteRepository for MemoryUnitOfWork {
    async fn insert_note(&mut self, note: &Note) -> Result<()> {
        if self.working.notes.contains_key(&note.id) {
            return Err(Error::Conflict(format!("Note {} already exists", note.id)));
        }
        self.working.notes.insert(note.id, note.clone());
        Ok(())
    }

    async fn find_note(&mut self, owner: Uuid, id: Uuid) -> Result<Option<Note>> {
        Ok(self
            .working
            .notes
            .get(&id)
            .filter(|n| n.user_id == owner)
            .cloned())
    }

    async fn update_note(&mut self, note: &Note) -> Result<()> {
        match self.working.notes.get_mut(&note.id) {
            Some(stored) if stored.user_id == note.user_id => {
                *stored = note.clone();
                Ok(())
            }
            _ => Err(Error::note_not_found(note.id)),
        }
    }

    async fn delete_note(&mut self, owner: Uuid, id: Uuid) -> Result<bool> {
        let owned = matches!(self.working.notes.get(&id), Some(n) if n.user_id == owner);
        if !owned {
            return Ok(false);
        }
        self.working.notes.remove(&id);
        self.working.note_tags.retain(|(note_id, _)| *note_id != id);
        Ok(true)
    }

    async fn list_notes(&mut self, owner: Uuid, req: &ListNotesRequest) -> Result<Vec<Note>> {
        let state = &self.working;
        let mut notes: Vec<Note> = state
            .notes
            .values()
            .filter(|n| n.user_id == owner && req.view.includes(n))
            .filter(|n| match req.tag_id {
                Some(tag_id) => state.note_tags.contains(&(n.id, tag_id)),
                None => true,
            })
            .cloned()
            .collect();

        notes.sort_by(|a, b| {
            req.view
                .sort_key(a)
                .cmp(&req.view.sort_key(b))
                .then_with(|| a.id.cmp(&b.id))
        });
        if req.order == SortOrder::Desc {
            notes.reverse();
        }

        let offset = req.offset.unwrap_or(0).max(0) as usize;
        let limit = req.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(notes.into_iter().skip(offset).take(limit).collect())
    }

    async fn note_tags(&mut self, note_id: Uuid) -> Result<Vec<Tag>> {
        let mut tags: Vec<Tag> = self
            .working
            .note_tags
            .iter()
            .filter(|(n, _)| *n == note_id)
            .filter_map(|(_, t)| self.working.tags.get(t).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn tags_for_notes(&mut self, note_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>> {
        let mut out: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for (note_id, tag_id) in &self.working.note_tags {
            if !note_ids.contains(note_id) {
                continue;
            }
            if let Some(tag) = self.working.tags.get(tag_id) {
                out.entry(*note_id).or_default().push(tag.clone());
            }
        }
        for tags in out.values_mut() {
            tags.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(out)
    }

    async fn attach_tag(&mut self, note_id: Uuid, tag_id: Uuid) -> Result<()> {
        self.working.note_tags.insert((note_id, tag_id));
        Ok(())
    }

    async fn detach_tag(&mut self, note_id: Uuid, tag_id: Uuid) -> Result<bool> {
        Ok(self.working.note_tags.remove(&(note_id, tag_id)))
    }
}

impl MemoryUnitOfWork {
    fn tag_name_taken(&self, tag: &Tag) -> bool {
        self.working
            .tags
            .values()
            .any(|t| t.user_id == tag.user_id && t.name == tag.name && t.id != tag.id)
    }
}

#[async_trait]
impl TagRepository for MemoryUnitOfWork {
    async fn insert_tag(&mut self, tag: &Tag) -> Result<()> {
        if self.tag_name_taken(tag) {
            return Err(Error::Conflict("Tag already exists".to_string()));
        }
        self.working.tags.insert(tag.id, tag.clone());
        Ok(())
    }

    async fn find_tag(&mut self, owner: Uuid, id: Uuid) -> Result<Option<Tag>> {
        Ok(self
            .working
            .tags
            .get(&id)
            .filter(|t| t.user_id == owner)
            .cloned())
    }

    async fn find_tag_by_name(&mut self, owner: Uuid, name: &str) -> Result<Option<Tag>> {
        Ok(self
            .working
            .tags
            .values()
            .find(|t| t.user_id == owner && t.name == name)
            .cloned())
    }

    async fn list_tags(&mut self, owner: Uuid) -> Result<Vec<Tag>> {
        let mut tags: Vec<Tag> = self
            .working
            .tags
            .values()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn update_tag(&mut self, tag: &Tag) -> Result<()> {
        if self.tag_name_taken(tag) {
            return Err(Error::Conflict("Tag already exists".to_string()));
        }
        match self.working.tags.get_mut(&tag.id) {
            Some(stored) if stored.user_id == tag.user_id => {
                *stored = tag.clone();
                Ok(())
            }
            _ => Err(Error::tag_not_found(tag.id)),
        }
    }

    async fn delete_tag(&mut self, owner: Uuid, id: Uuid) -> Result<bool> {
        let owned = matches!(self.working.tags.get(&id), Some(t) if t.user_id == owner);
        if !owned {
            return Ok(false);
        }
        self.working.tags.remove(&id);
        self.working.note_tags.retain(|(_, tag_id)| *tag_id != id);
        Ok(true)
    }
}

#[async_trait]
impl RevocationLedger for MemoryUnitOfWork {
    async fn revoke(&mut self, token: &str, at: DateTime<Utc>) -> Result<RevokeOutcome> {
        if self.working.revoked.contains_key(token) {
            return Ok(RevokeOutcome::AlreadyRevoked);
        }
        self.working.revoked.insert(token.to_string(), at);
        Ok(RevokeOutcome::Revoked)
    }

    async fn is_revoked(&mut self, token: &str) -> Result<bool> {
        Ok(self.working.revoked.contains_key(token))
    }
}
