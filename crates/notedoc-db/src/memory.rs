//! In-process note repository.
//!
//! Mirrors the PostgreSQL repository's semantics (scoping, ordering,
//! timestamp rules) on a map behind an async lock. Used by service tests
//! and by the server when started with `STORAGE=memory`.
//!
//! ## Usage
//!
//! ```rust
//! use notedoc_core::{NoteDraft, NoteRepository};
//! use notedoc_db::MemoryNoteRepository;
//! use uuid::Uuid;
//!
//! # tokio_test_block(async {
//! let repo = MemoryNoteRepository::new();
//! let user = Uuid::new_v4();
//! let note = repo.save(NoteDraft::new(user, "Hello")).await.unwrap();
//! assert_eq!(repo.count_active_by_user(user).await.unwrap(), 1);
//! # let _ = note;
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use notedoc_core::{
    new_v7, Error, Note, NoteDraft, NoteRepository, Page, PageRequest, Result,
};

use crate::timestamp_now;

/// Note repository backed by a `HashMap`.
///
/// Cloning shares the underlying store.
#[derive(Clone, Default)]
pub struct MemoryNoteRepository {
    notes: Arc<RwLock<HashMap<Uuid, Note>>>,
}

impl MemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored row, deleted ones included, in no particular order.
    ///
    /// Lets tests observe that soft-deleted notes are retained.
    pub async fn all_rows(&self) -> Vec<Note> {
        self.notes.read().await.values().cloned().collect()
    }

    fn matches(note: &Note, needle: &str) -> bool {
        note.title.to_lowercase().contains(needle)
            || note
                .content
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(needle))
    }

    fn paginate(mut notes: Vec<Note>, request: &PageRequest) -> Page<Note> {
        notes.sort_by(|a, b| request.sort.compare(a, b));
        let total = notes.len() as i64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let content = notes
            .into_iter()
            .skip(offset)
            .take(request.size as usize)
            .collect();
        Page::new(content, request, total)
    }
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn find_active_by_user(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Note>> {
        let notes = self.notes.read().await;
        let owned: Vec<Note> = notes
            .values()
            .filter(|n| n.user_id == user_id && n.is_active())
            .cloned()
            .collect();
        drop(notes);

        let result = Self::paginate(owned, &page);
        debug!(
            subsystem = "database",
            component = "memory",
            op = "find_active_by_user",
            user_id = %user_id,
            result_count = result.content.len(),
            total = result.total_elements,
            "Listed active notes"
        );
        Ok(result)
    }

    async fn find_active_by_id_and_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>> {
        let notes = self.notes.read().await;
        Ok(notes
            .get(&id)
            .filter(|n| n.user_id == user_id && n.is_active())
            .cloned())
    }

    async fn search_active(
        &self,
        query: &str,
        user_id: Uuid,
        page: u32,
        size: u32,
    ) -> Result<Page<Note>> {
        let request = PageRequest::new(page, size)?;
        let needle = query.to_lowercase();
        let notes = self.notes.read().await;
        let hits: Vec<Note> = notes
            .values()
            .filter(|n| n.user_id == user_id && n.is_active() && Self::matches(n, &needle))
            .cloned()
            .collect();
        drop(notes);

        let result = Self::paginate(hits, &request);
        debug!(
            subsystem = "database",
            component = "memory",
            op = "search_active",
            user_id = %user_id,
            query = %query,
            result_count = result.content.len(),
            total = result.total_elements,
            "Searched active notes"
        );
        Ok(result)
    }

    async fn save(&self, draft: NoteDraft) -> Result<Note> {
        let now = timestamp_now();
        let mut notes = self.notes.write().await;

        let note = match draft.id {
            None => Note {
                id: new_v7(),
                title: draft.title,
                content: draft.content,
                tags: draft.tags,
                pinned: draft.pinned,
                archived: draft.archived,
                deleted: draft.deleted,
                user_id: draft.user_id,
                created_at: now,
                updated_at: now,
            },
            Some(id) => {
                let existing = notes
                    .get(&id)
                    .filter(|n| n.user_id == draft.user_id && n.is_active())
                    .ok_or(Error::NoteNotFound(id))?;
                Note {
                    id,
                    title: draft.title,
                    content: draft.content,
                    tags: draft.tags,
                    pinned: draft.pinned,
                    archived: draft.archived,
                    deleted: draft.deleted,
                    user_id: existing.user_id,
                    created_at: existing.created_at,
                    updated_at: now.max(existing.updated_at + Duration::microseconds(1)),
                }
            }
        };

        notes.insert(note.id, note.clone());
        debug!(
            subsystem = "database",
            component = "memory",
            op = "save",
            note_id = %note.id,
            user_id = %note.user_id,
            deleted = note.deleted,
            "Saved note"
        );
        Ok(note)
    }

    async fn count_active_by_user(&self, user_id: Uuid) -> Result<i64> {
        let notes = self.notes.read().await;
        Ok(notes
            .values()
            .filter(|n| n.user_id == user_id && n.is_active())
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notedoc_core::{Sort, SortDirection, SortField};

    #[tokio::test]
    async fn test_insert_assigns_identity_and_equal_timestamps() {
        let repo = MemoryNoteRepository::new();
        let user = Uuid::new_v4();
        let note = repo
            .save(NoteDraft::new(user, "Shopping").with_content("milk, eggs"))
            .await
            .unwrap();

        assert!(notedoc_core::is_v7(&note.id));
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(note.user_id, user);
        assert!(!note.deleted);
    }

    #[tokio::test]
    async fn test_update_advances_updated_at_and_keeps_created_at() {
        let repo = MemoryNoteRepository::new();
        let user = Uuid::new_v4();
        let first = repo.save(NoteDraft::new(user, "a")).await.unwrap();

        let mut draft = first.clone().into_draft();
        draft.pinned = true;
        let second = repo.save(draft).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
        assert!(second.pinned);
    }

    #[tokio::test]
    async fn test_update_of_foreign_or_deleted_note_is_not_found() {
        let repo = MemoryNoteRepository::new();
        let owner = Uuid::new_v4();
        let note = repo.save(NoteDraft::new(owner, "mine")).await.unwrap();

        let mut foreign = note.clone().into_draft();
        foreign.user_id = Uuid::new_v4();
        assert!(matches!(
            repo.save(foreign).await,
            Err(Error::NoteNotFound(id)) if id == note.id
        ));

        let mut delete = note.clone().into_draft();
        delete.deleted = true;
        repo.save(delete).await.unwrap();

        assert!(matches!(
            repo.save(note.into_draft()).await,
            Err(Error::NoteNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_deleted_rows_are_retained_but_hidden() {
        let repo = MemoryNoteRepository::new();
        let user = Uuid::new_v4();
        let note = repo.save(NoteDraft::new(user, "gone")).await.unwrap();
        let mut draft = note.clone().into_draft();
        draft.deleted = true;
        repo.save(draft).await.unwrap();

        assert_eq!(repo.all_rows().await.len(), 1);
        assert_eq!(repo.count_active_by_user(user).await.unwrap(), 0);
        assert!(repo
            .find_active_by_id_and_user(note.id, user)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_listing_sorts_and_paginates() {
        let repo = MemoryNoteRepository::new();
        let user = Uuid::new_v4();
        for title in ["charlie", "alpha", "Bravo"] {
            repo.save(NoteDraft::new(user, title)).await.unwrap();
        }

        let by_title = PageRequest::new(0, 2)
            .unwrap()
            .with_sort(Sort::new(SortField::Title, SortDirection::Asc));
        let page = repo.find_active_by_user(user, by_title).await.unwrap();
        let titles: Vec<_> = page.content.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["alpha", "Bravo"]);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);

        let second = repo
            .find_active_by_user(user, PageRequest { page: 1, ..by_title })
            .await
            .unwrap();
        assert_eq!(second.content.len(), 1);
        assert_eq!(second.content[0].title, "charlie");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_over_title_and_content() {
        let repo = MemoryNoteRepository::new();
        let user = Uuid::new_v4();
        repo.save(NoteDraft::new(user, "Meeting Notes")).await.unwrap();
        repo.save(NoteDraft::new(user, "Groceries").with_content("Buy NOTEBOOK"))
            .await
            .unwrap();
        repo.save(NoteDraft::new(user, "Unrelated")).await.unwrap();

        let hits = repo.search_active("notes", user, 0, 10).await.unwrap();
        assert_eq!(hits.total_elements, 1);

        let hits = repo.search_active("note", user, 0, 10).await.unwrap();
        assert_eq!(hits.total_elements, 2);

        let hits = repo.search_active("eting not", user, 0, 10).await.unwrap();
        assert_eq!(hits.content[0].title, "Meeting Notes");
    }

    #[tokio::test]
    async fn test_search_rejects_zero_page_size() {
        let repo = MemoryNoteRepository::new();
        assert!(matches!(
            repo.search_active("x", Uuid::new_v4(), 0, 0).await,
            Err(Error::InvalidInput(_))
        ));
    }
}
