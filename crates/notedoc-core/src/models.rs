//! Core data models for notedoc.
//!
//! [`Note`] is the persisted entity. [`NoteDraft`] is what gets handed to
//! [`crate::NoteRepository::save`]. The request/response types are the
//! transfer shapes exchanged with callers and serialize as camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

// =============================================================================
// ENTITY
// =============================================================================

/// A persisted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub tags: BTreeSet<String>,
    pub pinned: bool,
    pub archived: bool,
    pub deleted: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// A note is active until it has been soft-deleted.
    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Convert back into a draft for a subsequent save.
    ///
    /// Timestamps are dropped: `created_at` is owned by the store and
    /// `updated_at` is refreshed on every save.
    pub fn into_draft(self) -> NoteDraft {
        NoteDraft {
            id: Some(self.id),
            title: self.title,
            content: self.content,
            tags: self.tags,
            pinned: self.pinned,
            archived: self.archived,
            deleted: self.deleted,
            user_id: self.user_id,
        }
    }
}

/// Note state handed to the repository for an upsert.
///
/// `id == None` means the note has never been saved; the repository assigns
/// the id and both timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub id: Option<Uuid>,
    pub title: String,
    pub content: Option<String>,
    pub tags: BTreeSet<String>,
    pub pinned: bool,
    pub archived: bool,
    pub deleted: bool,
    pub user_id: Uuid,
}

impl NoteDraft {
    /// A fresh, unsaved, active draft owned by `user_id`.
    pub fn new(user_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: None,
            tags: BTreeSet::new(),
            pinned: false,
            archived: false,
            deleted: false,
            user_id,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

// =============================================================================
// TRANSFER TYPES
// =============================================================================

/// Body of a create request.
///
/// `title` is optional at the wire level so that a missing title is reported
/// by the service as invalid input rather than as a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateNoteRequest {
    #[schema(example = "Meeting Notes", max_length = 255)]
    pub title: Option<String>,
    #[schema(example = "## Agenda\n- Discuss project timeline\n- Review budget")]
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub pinned: Option<bool>,
    pub archived: Option<bool>,
}

impl CreateNoteRequest {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// Body of an update request. Every field is optional; absent fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateNoteRequest {
    #[schema(example = "Updated Meeting Notes", max_length = 255)]
    pub title: Option<String>,
    pub content: Option<String>,
    /// Replaces the stored tag set when present.
    pub tags: Option<Vec<String>>,
    pub pinned: Option<bool>,
    pub archived: Option<bool>,
}

/// Note representation returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub tags: BTreeSet<String>,
    pub pinned: bool,
    pub archived: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            tags: note.tags,
            pinned: note.pinned,
            archived: note.archived,
            user_id: note.user_id,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}
