//! Tag operations, scoped to the owning user.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Tag;
use crate::traits::UnitOfWork;
use crate::validation;

fn duplicate() -> Error {
    Error::Conflict("Tag already exists".to_string())
}

/// Create a tag. Names are trimmed and unique per user.
pub async fn create(uow: &mut dyn UnitOfWork, owner: Uuid, name: &str) -> Result<Tag> {
    let name = validation::tag_name(name)?;
    if uow.find_tag_by_name(owner, &name).await?.is_some() {
        return Err(duplicate());
    }

    let tag = Tag::new(owner, name, Utc::now());
    uow.insert_tag(&tag).await?;

    info!(subsystem = "tags", op = "create", user_id = %owner, tag_id = %tag.id, "Tag created");
    Ok(tag)
}

/// All of the owner's tags, ordered by name.
pub async fn list(uow: &mut dyn UnitOfWork, owner: Uuid) -> Result<Vec<Tag>> {
    uow.list_tags(owner).await
}

pub async fn get(uow: &mut dyn UnitOfWork, owner: Uuid, id: Uuid) -> Result<Tag> {
    uow.find_tag(owner, id)
        .await?
        .ok_or_else(|| Error::tag_not_found(id))
}

/// Rename a tag. Keeping the current name is allowed.
pub async fn rename(uow: &mut dyn UnitOfWork, owner: Uuid, id: Uuid, name: &str) -> Result<Tag> {
    let mut tag = get(uow, owner, id).await?;
    let name = validation::tag_name(name)?;
    if name == tag.name {
        return Ok(tag);
    }
    if let Some(other) = uow.find_tag_by_name(owner, &name).await? {
        if other.id != id {
            return Err(duplicate());
        }
    }

    tag.name = name;
    uow.update_tag(&tag).await?;

    info!(subsystem = "tags", op = "rename", user_id = %owner, tag_id = %id, "Tag renamed");
    Ok(tag)
}

/// Delete a tag and detach it from every note.
pub async fn delete(uow: &mut dyn UnitOfWork, owner: Uuid, id: Uuid) -> Result<()> {
    if !uow.delete_tag(owner, id).await? {
        return Err(Error::tag_not_found(id));
    }
    info!(subsystem = "tags", op = "delete", user_id = %owner, tag_id = %id, "Tag deleted");
    Ok(())
}
