//! Note service: validation and partial-update rules on top of a
//! [`NoteRepository`].
//!
//! ## Argument Handling
//!
//! Every operation takes its arguments as `Option`s. A missing argument is
//! reported as [`Error::InvalidInput`] before any storage access, so the
//! adapter can pass through whatever it extracted from the request.
//!
//! ## Ownership
//!
//! The owning user id always comes from the caller, never from a request
//! body. Notes of other users, and soft-deleted notes, surface as
//! [`Error::NoteNotFound`].

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use notedoc_core::defaults::TITLE_MAX_CHARS;
use notedoc_core::{
    CreateNoteRequest, Error, Note, NoteDraft, NoteRepository, NoteResponse, Page, PageRequest,
    Result, UpdateNoteRequest,
};

/// Note operations exposed to the HTTP adapter.
#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self { repo }
    }

    /// Create a note owned by `user_id`.
    ///
    /// The title is trimmed; `deleted` always starts out `false`.
    pub async fn create_note(
        &self,
        request: Option<CreateNoteRequest>,
        user_id: Option<Uuid>,
    ) -> Result<NoteResponse> {
        let request = required(request, "Note creation request cannot be null")?;
        let user_id = required_user(user_id)?;
        let title = validated_title(
            request.title.as_deref(),
            "Title is required and cannot be empty",
        )?;

        let mut draft = NoteDraft::new(user_id, title);
        draft.content = request.content;
        draft.tags = tag_set(request.tags);
        draft.pinned = request.pinned.unwrap_or(false);
        draft.archived = request.archived.unwrap_or(false);
        draft.deleted = false;

        let note = self.repo.save(draft).await?;
        info!(
            subsystem = "service",
            component = "notes",
            op = "create",
            note_id = %note.id,
            user_id = %user_id,
            "Created note"
        );
        Ok(note.into())
    }

    /// One page of the user's active notes.
    pub async fn get_all_notes(
        &self,
        user_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<NoteResponse>> {
        let user_id = required_user(user_id)?;
        let notes = self.repo.find_active_by_user(user_id, page).await?;
        Ok(notes.map(NoteResponse::from))
    }

    pub async fn get_note_by_id(
        &self,
        id: Option<Uuid>,
        user_id: Option<Uuid>,
    ) -> Result<NoteResponse> {
        let id = required(id, "Note ID cannot be null")?;
        let user_id = required_user(user_id)?;
        Ok(self.find_owned(id, user_id).await?.into())
    }

    /// Apply the fields present in `request`; absent fields stay as stored.
    ///
    /// Present `tags` replace the whole set.
    pub async fn update_note(
        &self,
        id: Option<Uuid>,
        request: Option<UpdateNoteRequest>,
        user_id: Option<Uuid>,
    ) -> Result<NoteResponse> {
        let id = required(id, "Note ID cannot be null")?;
        let request = required(request, "Note update request cannot be null")?;
        let user_id = required_user(user_id)?;

        let mut draft = self.find_owned(id, user_id).await?.into_draft();

        if let Some(title) = request.title.as_deref() {
            draft.title = validated_title(Some(title), "Title cannot be empty")?;
        }
        if let Some(content) = request.content {
            draft.content = Some(content);
        }
        if request.tags.is_some() {
            draft.tags = tag_set(request.tags);
        }
        if let Some(pinned) = request.pinned {
            draft.pinned = pinned;
        }
        if let Some(archived) = request.archived {
            draft.archived = archived;
        }

        let note = self.repo.save(draft).await?;
        info!(
            subsystem = "service",
            component = "notes",
            op = "update",
            note_id = %note.id,
            user_id = %user_id,
            "Updated note"
        );
        Ok(note.into())
    }

    /// Soft-delete: the row is kept with `deleted = true`.
    pub async fn delete_note(&self, id: Option<Uuid>, user_id: Option<Uuid>) -> Result<()> {
        let id = required(id, "Note ID cannot be null")?;
        let user_id = required_user(user_id)?;

        let mut draft = self.find_owned(id, user_id).await?.into_draft();
        draft.deleted = true;
        self.repo.save(draft).await?;

        info!(
            subsystem = "service",
            component = "notes",
            op = "delete",
            note_id = %id,
            user_id = %user_id,
            "Soft-deleted note"
        );
        Ok(())
    }

    /// Case-insensitive substring search over title and content.
    ///
    /// A missing or blank query lists the user's notes instead.
    pub async fn search_notes(
        &self,
        query: Option<&str>,
        user_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<NoteResponse>> {
        let user_id = required_user(user_id)?;
        let query = query.map(str::trim).filter(|q| !q.is_empty());

        let Some(query) = query else {
            return self.get_all_notes(Some(user_id), page).await;
        };

        let notes = self
            .repo
            .search_active(query, user_id, page.page, page.size)
            .await?;
        debug!(
            subsystem = "service",
            component = "notes",
            op = "search",
            user_id = %user_id,
            query = %query,
            result_count = notes.content.len(),
            total = notes.total_elements,
            "Searched notes"
        );
        Ok(notes.map(NoteResponse::from))
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Note> {
        self.repo
            .find_active_by_id_and_user(id, user_id)
            .await?
            .ok_or(Error::NoteNotFound(id))
    }
}

fn required<T>(value: Option<T>, message: &str) -> Result<T> {
    value.ok_or_else(|| {
        debug!(subsystem = "service", component = "notes", reason = message, "Rejected request");
        Error::invalid(message)
    })
}

fn required_user(user_id: Option<Uuid>) -> Result<Uuid> {
    required(user_id, "User ID cannot be null")
}

/// Trimmed title, or `InvalidInput` with `blank_message` when nothing is
/// left, or when it is too long.
fn validated_title(title: Option<&str>, blank_message: &str) -> Result<String> {
    let trimmed = title.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(Error::invalid(blank_message));
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(Error::invalid(format!(
            "Title must not exceed {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn tag_set(tags: Option<Vec<String>>) -> BTreeSet<String> {
    tags.unwrap_or_default().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_title_trims() {
        assert_eq!(validated_title(Some("  Hello "), "x").unwrap(), "Hello");
    }

    #[test]
    fn test_validated_title_rejects_blank_and_missing() {
        for title in [None, Some(""), Some("   \t\n")] {
            let err = validated_title(title, "Title cannot be empty").unwrap_err();
            assert_eq!(err.to_string(), "Invalid input: Title cannot be empty");
        }
    }

    #[test]
    fn test_validated_title_length_counts_chars_after_trim() {
        let exact = "é".repeat(TITLE_MAX_CHARS);
        assert!(validated_title(Some(&format!("  {exact}  ")), "x").is_ok());

        let over = "a".repeat(TITLE_MAX_CHARS + 1);
        assert!(matches!(
            validated_title(Some(&over), "x"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_tag_set_collapses_duplicates() {
        let tags = tag_set(Some(vec!["b".into(), "a".into(), "b".into()]));
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(tag_set(None).is_empty());
    }
}
