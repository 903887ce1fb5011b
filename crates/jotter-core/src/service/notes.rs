//! Note operations: CRUD, lifecycle transitions and tag association.
//!
//! All functions are scoped to `owner`. A note or tag owned by someone else
//! is reported as not found.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::defaults::PAGE_LIMIT_MAX;
use crate::error::{Error, Result};
use crate::lifecycle;
use crate::models::*;
use crate::traits::UnitOfWork;
use crate::validation;

async fn load(uow: &mut dyn UnitOfWork, owner: Uuid, id: Uuid) -> Result<Note> {
    uow.find_note(owner, id)
        .await?
        .ok_or_else(|| Error::note_not_found(id))
}

async fn load_tag(uow: &mut dyn UnitOfWork, owner: Uuid, id: Uuid) -> Result<Tag> {
    uow.find_tag(owner, id)
        .await?
        .ok_or_else(|| Error::tag_not_found(id))
}

async fn detail(uow: &mut dyn UnitOfWork, note: Note) -> Result<NoteDetail> {
    let tags = uow.note_tags(note.id).await?;
    Ok(NoteDetail::new(note, tags))
}

/// Create an Active note, optionally tagged with some of the owner's tags.
pub async fn create(
    uow: &mut dyn UnitOfWork,
    owner: Uuid,
    req: CreateNoteRequest,
) -> Result<NoteDetail> {
    let title = validation::title(&req.title)?;

    let mut tag_ids: Vec<Uuid> = Vec::with_capacity(req.tag_ids.len());
    for tag_id in req.tag_ids {
        if !tag_ids.contains(&tag_id) {
            load_tag(uow, owner, tag_id).await?;
            tag_ids.push(tag_id);
        }
    }

    let note = Note::new(owner, title, req.content.unwrap_or_default(), Utc::now());
    uow.insert_note(&note).await?;
    for tag_id in &tag_ids {
        uow.attach_tag(note.id, *tag_id).await?;
    }

    info!(
        subsystem = "notes",
        op = "create",
        user_id = %owner,
        note_id = %note.id,
        tag_count = tag_ids.len(),
        "Note created"
    );
    detail(uow, note).await
}

/// Fetch a note in any state.
pub async fn get(uow: &mut dyn UnitOfWork, owner: Uuid, id: Uuid) -> Result<NoteDetail> {
    let note = load(uow, owner, id).await?;
    detail(uow, note).await
}

/// Edit a note's title and/or content. Trashed notes cannot be edited.
pub async fn update(
    uow: &mut dyn UnitOfWork,
    owner: Uuid,
    id: Uuid,
    req: UpdateNoteRequest,
) -> Result<NoteDetail> {
    let mut note = load(uow, owner, id).await?;
    lifecycle::ensure_editable(&note)?;

    if let Some(title) = req.title.as_deref() {
        note.title = validation::title(title)?;
    }
    if let Some(content) = req.content {
        note.content = content;
    }
    lifecycle::touch(&mut note, Utc::now());
    uow.update_note(&note).await?;

    info!(subsystem = "notes", op = "update", user_id = %owner, note_id = %id, "Note updated");
    detail(uow, note).await
}

/// List one view of the owner's notes.
pub async fn list(
    uow: &mut dyn UnitOfWork,
    owner: Uuid,
    mut req: ListNotesRequest,
) -> Result<Vec<NoteDetail>> {
    req.limit = req.limit.map(|l| l.clamp(0, PAGE_LIMIT_MAX));
    req.offset = req.offset.map(|o| o.max(0));

    let notes = uow.list_notes(owner, &req).await?;
    debug!(
        subsystem = "notes",
        op = "list",
        user_id = %owner,
        view = ?req.view,
        result_count = notes.len(),
        "Listed notes"
    );

    let ids: Vec<Uuid> = notes.iter().map(|n| n.id).collect();
    let mut tags = uow.tags_for_notes(&ids).await?;
    Ok(notes
        .into_iter()
        .map(|note| {
            let note_tags = tags.remove(&note.id).unwrap_or_default();
            NoteDetail::new(note, note_tags)
        })
        .collect())
}

async fn transition(
    uow: &mut dyn UnitOfWork,
    owner: Uuid,
    id: Uuid,
    op: &'static str,
    apply: fn(&mut Note, chrono::DateTime<Utc>) -> Result<()>,
) -> Result<NoteDetail> {
    let mut note = load(uow, owner, id).await?;
    let from = note.state();
    apply(&mut note, Utc::now())?;
    uow.update_note(&note).await?;

    info!(
        subsystem = "notes",
        component = "lifecycle",
        op,
        user_id = %owner,
        note_id = %id,
        from = %from,
        to = %note.state(),
        "Note transitioned"
    );
    detail(uow, note).await
}

/// Active → Archived.
pub async fn archive(uow: &mut dyn UnitOfWork, owner: Uuid, id: Uuid) -> Result<NoteDetail> {
    transition(uow, owner, id, "archive", lifecycle::archive).await
}

/// Archived → Active.
pub async fn unarchive(uow: &mut dyn UnitOfWork, owner: Uuid, id: Uuid) -> Result<NoteDetail> {
    transition(uow, owner, id, "unarchive", lifecycle::unarchive).await
}

/// Active or Archived → Trashed.
pub async fn soft_delete(
    uow: &mut dyn UnitOfWork,
    owner: Uuid,
    id: Uuid,
) -> Result<NoteDetail> {
    transition(uow, owner, id, "soft_delete", lifecycle::soft_delete).await
}

/// Trashed → Active.
pub async fn recover(uow: &mut dyn UnitOfWork, owner: Uuid, id: Uuid) -> Result<NoteDetail> {
    transition(uow, owner, id, "recover", lifecycle::recover).await
}

/// Remove a trashed note and its tag links for good.
pub async fn permanent_delete(uow: &mut dyn UnitOfWork, owner: Uuid, id: Uuid) -> Result<()> {
    let note = load(uow, owner, id).await?;
    lifecycle::ensure_purgeable(&note)?;
    if !uow.delete_note(owner, id).await? {
        return Err(Error::note_not_found(id));
    }

    info!(
        subsystem = "notes",
        component = "lifecycle",
        op = "permanent_delete",
        user_id = %owner,
        note_id = %id,
        "Note permanently deleted"
    );
    Ok(())
}

/// Attach one of the owner's tags to a note. Trashed notes cannot be tagged.
pub async fn attach_tag(
    uow: &mut dyn UnitOfWork,
    owner: Uuid,
    note_id: Uuid,
    tag_id: Uuid,
) -> Result<NoteDetail> {
    let mut note = load(uow, owner, note_id).await?;
    lifecycle::ensure_editable(&note)?;
    load_tag(uow, owner, tag_id).await?;

    let attached = uow.note_tags(note_id).await?;
    if attached.iter().any(|t| t.id == tag_id) {
        return Err(Error::Conflict("Tag already attached to note".to_string()));
    }
    uow.attach_tag(note_id, tag_id).await?;
    lifecycle::touch(&mut note, Utc::now());
    uow.update_note(&note).await?;

    info!(
        subsystem = "notes",
        op = "attach_tag",
        user_id = %owner,
        note_id = %note_id,
        tag_id = %tag_id,
        "Tag attached"
    );
    detail(uow, note).await
}

/// Detach a tag from a note. Trashed notes keep their tags.
pub async fn detach_tag(
    uow: &mut dyn UnitOfWork,
    owner: Uuid,
    note_id: Uuid,
    tag_id: Uuid,
) -> Result<NoteDetail> {
    let mut note = load(uow, owner, note_id).await?;
    lifecycle::ensure_editable(&note)?;
    load_tag(uow, owner, tag_id).await?;

    if !uow.detach_tag(note_id, tag_id).await? {
        return Err(Error::Conflict("Tag is not attached to note".to_string()));
    }
    lifecycle::touch(&mut note, Utc::now());
    uow.update_note(&note).await?;

    info!(
        subsystem = "notes",
        op = "detach_tag",
        user_id = %owner,
        note_id = %note_id,
        tag_id = %tag_id,
        "Tag detached"
    );
    detail(uow, note).await
}
