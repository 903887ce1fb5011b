//! Per-user tag storage.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use jotter_core::{Error, Result, Tag, TagRepository};

use crate::unit_of_work::{unique_conflict, PgUnitOfWork};

pub(crate) fn tag_from_row(row: &PgRow) -> Result<Tag> {
    Ok(Tag {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at_utc")?,
    })
}

#[async_trait]
impl TagRepository for PgUnitOfWork {
    async fn insert_tag(&mut self, tag: &Tag) -> Result<()> {
        sqlx::query(
            "INSERT INTO tag (id, user_id, name, created_at_utc) VALUES ($1, $2, $3, $4)",
        )
        .bind(tag.id)
        .bind(tag.user_id)
        .bind(&tag.name)
        .bind(tag.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(unique_conflict("Tag already exists"))?;
        Ok(())
    }

    async fn find_tag(&mut self, owner: Uuid, id: Uuid) -> Result<Option<Tag>> {
        let row = sqlx::query(
            "SELECT id, user_id, name, created_at_utc FROM tag WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(Error::Database)?;
        row.as_ref().map(tag_from_row).transpose()
    }

    async fn find_tag_by_name(&mut self, owner: Uuid, name: &str) -> Result<Option<Tag>> {
        let row = sqlx::query(
            "SELECT id, user_id, name, created_at_utc FROM tag WHERE user_id = $1 AND name = $2",
        )
        .bind(owner)
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(Error::Database)?;
        row.as_ref().map(tag_from_row).transpose()
    }

    async fn list_tags(&mut self, owner: Uuid) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, created_at_utc FROM tag WHERE user_id = $1 ORDER BY name",
        )
        .bind(owner)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(Error::Database)?;
        rows.iter().map(tag_from_row).collect()
    }

    async fn update_tag(&mut self, tag: &Tag) -> Result<()> {
        let result = sqlx::query("UPDATE tag SET name = $1 WHERE id = $2 AND user_id = $3")
            .bind(&tag.name)
            .bind(tag.id)
            .bind(tag.user_id)
            .execute(&mut *self.tx)
            .await
            .map_err(unique_conflict("Tag already exists"))?;
        if result.rows_affected() == 0 {
            return Err(Error::tag_not_found(tag.id));
        }
        Ok(())
    }

    async fn delete_tag(&mut self, owner: Uuid, id: Uuid) -> Result<bool> {
        // note_tag rows go with the tag (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM tag WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *self.tx)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
