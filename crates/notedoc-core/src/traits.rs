//! Core traits for notedoc abstractions.
//!
//! These traits define the interfaces that storage backends must satisfy,
//! enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Note, NoteDraft};
use crate::pagination::{Page, PageRequest};

// =============================================================================
// NOTE REPOSITORY TRAITS
// =============================================================================

/// Access layer for notes.
///
/// Every query is scoped to one owning user and sees active notes only.
/// Implementations apply that filter themselves; callers never filter
/// deleted or foreign notes out of a result.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Page through the user's active notes in the requested order.
    async fn find_active_by_user(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Note>>;

    /// Fetch one active note owned by `user_id`, or `None`.
    async fn find_active_by_id_and_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>>;

    /// Active notes of the user whose title or content contains `query`,
    /// compared case-insensitively. Ordered by most recently updated.
    ///
    /// `query` must already be trimmed and non-empty.
    async fn search_active(
        &self,
        query: &str,
        user_id: Uuid,
        page: u32,
        size: u32,
    ) -> Result<Page<Note>>;

    /// Insert a draft without an id, or update the active note the draft
    /// identifies. Assigns id and `created_at` on insert; refreshes
    /// `updated_at` on every call.
    ///
    /// Returns [`crate::Error::NoteNotFound`] when the draft carries an id
    /// that does not match an active note of the same user.
    async fn save(&self, draft: NoteDraft) -> Result<Note>;

    /// Number of active notes owned by `user_id`.
    async fn count_active_by_user(&self, user_id: Uuid) -> Result<i64>;
}
