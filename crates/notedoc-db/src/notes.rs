//! PostgreSQL note repository.

use std::collections::BTreeSet;
use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::debug;
use uuid::Uuid;

use notedoc_core::{
    new_v7, Error, Note, NoteDraft, NoteRepository, Page, PageRequest, Result,
};

use crate::{escape_like, timestamp_now};

/// Columns selected for every note read. Tags are folded in as an array so a
/// page is a single round trip.
const NOTE_COLUMNS: &str = "n.id, n.title, n.content, n.pinned, n.archived, n.deleted, \
     n.user_id, n.created_at, n.updated_at, \
     ARRAY(SELECT t.tag FROM note_tag t WHERE t.note_id = n.id ORDER BY t.tag) AS tags";

/// Predicate shared by all reads: owned by `$1` and not soft-deleted.
const ACTIVE_FOR_USER: &str = "n.user_id = $1 AND n.deleted = FALSE";

/// Predicate for substring search over title or content, pattern in `$2`.
const MATCHES_QUERY: &str = "(n.title ILIKE $2 ESCAPE '\\' OR n.content ILIKE $2 ESCAPE '\\')";

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Map a database row to a Note.
fn map_row_to_note(row: PgRow) -> Note {
    let tags: Vec<String> = row.get("tags");
    Note {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        tags: tags.into_iter().collect::<BTreeSet<_>>(),
        pinned: row.get("pinned"),
        archived: row.get("archived"),
        deleted: row.get("deleted"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// `%query%` with LIKE wildcards in the user text matched literally.
fn contains_pattern(query: &str) -> String {
    format!("%{}%", escape_like(query))
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn find_active_by_user(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Note>> {
        let start = Instant::now();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM note n WHERE {ACTIVE_FOR_USER}"
        ))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM note n WHERE {ACTIVE_FOR_USER} \
             ORDER BY {} LIMIT $2 OFFSET $3",
            page.sort.order_clause("n")
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        let notes: Vec<Note> = rows.into_iter().map(map_row_to_note).collect();
        debug!(
            subsystem = "database",
            component = "notes",
            op = "find_active_by_user",
            user_id = %user_id,
            page = page.page,
            size = page.size,
            sort = page.sort.field.as_str(),
            result_count = notes.len(),
            total = total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed active notes"
        );
        Ok(Page::new(notes, &page, total))
    }

    async fn find_active_by_id_and_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM note n WHERE {ACTIVE_FOR_USER} AND n.id = $2");
        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "notes",
            op = "find_active_by_id_and_user",
            note_id = %id,
            user_id = %user_id,
            found = row.is_some(),
            "Looked up active note"
        );
        Ok(row.map(map_row_to_note))
    }

    async fn search_active(
        &self,
        query: &str,
        user_id: Uuid,
        page: u32,
        size: u32,
    ) -> Result<Page<Note>> {
        let start = Instant::now();
        let request = PageRequest::new(page, size)?;
        let pattern = contains_pattern(query);
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM note n WHERE {ACTIVE_FOR_USER} AND {MATCHES_QUERY}"
        ))
        .bind(user_id)
        .bind(&pattern)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM note n WHERE {ACTIVE_FOR_USER} AND {MATCHES_QUERY} \
             ORDER BY {} LIMIT $3 OFFSET $4",
            request.sort.order_clause("n")
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(&pattern)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        let notes: Vec<Note> = rows.into_iter().map(map_row_to_note).collect();
        debug!(
            subsystem = "database",
            component = "notes",
            op = "search_active",
            user_id = %user_id,
            query = %query,
            result_count = notes.len(),
            total = total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Searched active notes"
        );
        Ok(Page::new(notes, &request, total))
    }

    async fn save(&self, draft: NoteDraft) -> Result<Note> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let note = self.save_tx(&mut tx, draft).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(note)
    }

    async fn count_active_by_user(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM note n WHERE {ACTIVE_FOR_USER}"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(count)
    }
}

// =============================================================================
// TRANSACTION-AWARE VARIANTS
// =============================================================================

impl PgNoteRepository {
    /// Upsert a note within an existing transaction.
    pub async fn save_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        draft: NoteDraft,
    ) -> Result<Note> {
        let now = timestamp_now();
        let (note_id, op) = match draft.id {
            None => {
                let note_id = new_v7();
                sqlx::query(
                    "INSERT INTO note (id, title, content, pinned, archived, deleted, user_id, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)",
                )
                .bind(note_id)
                .bind(&draft.title)
                .bind(&draft.content)
                .bind(draft.pinned)
                .bind(draft.archived)
                .bind(draft.deleted)
                .bind(draft.user_id)
                .bind(now)
                .execute(&mut **tx)
                .await
                .map_err(Error::Database)?;
                (note_id, "insert")
            }
            Some(note_id) => {
                // updated_at must move forward even if the clock has not.
                let updated = sqlx::query(
                    "UPDATE note
                     SET title = $1, content = $2, pinned = $3, archived = $4, deleted = $5,
                         updated_at = GREATEST($6, updated_at + INTERVAL '1 microsecond')
                     WHERE id = $7 AND user_id = $8 AND deleted = FALSE",
                )
                .bind(&draft.title)
                .bind(&draft.content)
                .bind(draft.pinned)
                .bind(draft.archived)
                .bind(draft.deleted)
                .bind(now)
                .bind(note_id)
                .bind(draft.user_id)
                .execute(&mut **tx)
                .await
                .map_err(Error::Database)?;

                if updated.rows_affected() == 0 {
                    return Err(Error::NoteNotFound(note_id));
                }

                sqlx::query("DELETE FROM note_tag WHERE note_id = $1")
                    .bind(note_id)
                    .execute(&mut **tx)
                    .await
                    .map_err(Error::Database)?;
                (note_id, "update")
            }
        };

        if !draft.tags.is_empty() {
            let tags: Vec<String> = draft.tags.into_iter().collect();
            sqlx::query(
                "INSERT INTO note_tag (note_id, tag) SELECT $1, UNNEST($2::text[]) ON CONFLICT DO NOTHING",
            )
            .bind(note_id)
            .bind(&tags)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        }

        let row = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM note n WHERE n.id = $1"))
            .bind(note_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(Error::Database)?;
        let note = map_row_to_note(row);

        debug!(
            subsystem = "database",
            component = "notes",
            op = op,
            note_id = %note.id,
            user_id = %note.user_id,
            deleted = note.deleted,
            "Saved note"
        );
        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("meeting"), "%meeting%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_queries_always_scope_to_active_owner() {
        assert!(ACTIVE_FOR_USER.contains("n.user_id = $1"));
        assert!(ACTIVE_FOR_USER.contains("n.deleted = FALSE"));
        assert!(MATCHES_QUERY.contains("n.title ILIKE $2"));
        assert!(MATCHES_QUERY.contains("n.content ILIKE $2"));
    }
}
