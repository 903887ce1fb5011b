//! Note storage and note↔tag links.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::trace;
use uuid::Uuid;

use jotter_core::{
    Error, ListNotesRequest, Note, NoteRepository, NoteView, Result, SortOrder, Tag,
};

use crate::tags::tag_from_row;
use crate::unit_of_work::PgUnitOfWork;

const NOTE_COLUMNS: &str =
    "n.id, n.user_id, n.title, n.content, n.created_at_utc, n.updated_at_utc, n.archived, n.deleted";

fn note_from_row(row: &PgRow) -> Result<Note> {
    Ok(Note {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at_utc")?,
        updated_at: row.try_get("updated_at_utc")?,
        archived: row.try_get("archived")?,
        deleted: row.try_get("deleted")?,
    })
}

/// WHERE fragment and ordering column for a list view.
fn view_clause(view: NoteView) -> (&'static str, &'static str) {
    match view {
        NoteView::Active => ("n.archived = FALSE AND n.deleted = FALSE", "n.created_at_utc"),
        NoteView::Archived => ("n.archived = TRUE AND n.deleted = FALSE", "n.created_at_utc"),
        NoteView::Trash => ("n.deleted = TRUE", "n.updated_at_utc"),
    }
}

/// Build the list query. Parameters: $1 owner, then tag id when filtering,
/// then limit and offset.
fn list_sql(req: &ListNotesRequest) -> String {
    let (filter, sort_col) = view_clause(req.view);
    let direction = match req.order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };

    let mut sql = format!(
        "SELECT {} FROM note n WHERE n.user_id = $1 AND {}",
        NOTE_COLUMNS, filter
    );
    let mut next_param = 2;
    if req.tag_id.is_some() {
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM note_tag nt WHERE nt.note_id = n.id AND nt.tag_id = ${})",
            next_param
        ));
        next_param += 1;
    }
    sql.push_str(&format!(
        " ORDER BY {col} {dir}, n.id {dir} LIMIT ${} OFFSET ${}",
        next_param,
        next_param + 1,
        col = sort_col,
        dir = direction,
    ));
    sql
}

#[async_trait]
impl NoteRepository for PgUnitOfWork {
    async fn insert_note(&mut self, note: &Note) -> Result<()> {
        sqlx::query(
            "INSERT INTO note
                 (id, user_id, title, content, created_at_utc, updated_at_utc, archived, deleted)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(note.id)
        .bind(note.user_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.created_at)
        .bind(note.updated_at)
        .bind(note.archived)
        .bind(note.deleted)
        .execute(&mut *self.tx)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn find_note(&mut self, owner: Uuid, id: Uuid) -> Result<Option<Note>> {
        let sql = format!(
            "SELECT {} FROM note n WHERE n.id = $1 AND n.user_id = $2",
            NOTE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(note_from_row).transpose()
    }

    async fn update_note(&mut self, note: &Note) -> Result<()> {
        let result = sqlx::query(
            "UPDATE note
             SET title = $1, content = $2, updated_at_utc = $3, archived = $4, deleted = $5
             WHERE id = $6 AND user_id = $7",
        )
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.updated_at)
        .bind(note.archived)
        .bind(note.deleted)
        .bind(note.id)
        .bind(note.user_id)
        .execute(&mut *self.tx)
        .await
        .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::note_not_found(note.id));
        }
        Ok(())
    }

    async fn delete_note(&mut self, owner: Uuid, id: Uuid) -> Result<bool> {
        // note_tag rows go with the note (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM note WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *self.tx)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_notes(&mut self, owner: Uuid, req: &ListNotesRequest) -> Result<Vec<Note>> {
        let sql = list_sql(req);
        let mut query = sqlx::query(&sql).bind(owner);
        if let Some(tag_id) = req.tag_id {
            query = query.bind(tag_id);
        }
        // LIMIT NULL means no limit.
        let rows = query
            .bind(req.limit)
            .bind(req.offset.unwrap_or(0))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(Error::Database)?;

        trace!(
            subsystem = "database",
            component = "notes",
            op = "list",
            result_count = rows.len(),
            "Fetched note rows"
        );
        rows.iter().map(note_from_row).collect()
    }

    async fn note_tags(&mut self, note_id: Uuid) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT t.id, t.user_id, t.name, t.created_at_utc
             FROM tag t
             JOIN note_tag nt ON nt.tag_id = t.id
             WHERE nt.note_id = $1
             ORDER BY t.name",
        )
        .bind(note_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(Error::Database)?;
        rows.iter().map(tag_from_row).collect()
    }

    async fn tags_for_notes(&mut self, note_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>> {
        if note_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(
            "SELECT nt.note_id, t.id, t.user_id, t.name, t.created_at_utc
             FROM tag t
             JOIN note_tag nt ON nt.tag_id = t.id
             WHERE nt.note_id = ANY($1)
             ORDER BY t.name",
        )
        .bind(note_ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(Error::Database)?;

        trace!(
            subsystem = "database",
            component = "notes",
            op = "tags_for_notes",
            note_count = note_ids.len(),
            result_count = rows.len(),
            "Fetched tags for notes"
        );
        let mut out: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in &rows {
            let note_id: Uuid = row.try_get("note_id")?;
            out.entry(note_id).or_default().push(tag_from_row(row)?);
        }
        Ok(out)
    }

    async fn attach_tag(&mut self, note_id: Uuid, tag_id: Uuid) -> Result<()> {
        sqlx::query(
            "INSERT INTO note_tag (note_id, tag_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(note_id)
        .bind(tag_id)
        .execute(&mut *self.tx)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn detach_tag(&mut self, note_id: Uuid, tag_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM note_tag WHERE note_id = $1 AND tag_id = $2")
            .bind(note_id)
            .bind(tag_id)
            .execute(&mut *self.tx)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
