//! Note CRUD and search handlers.
//!
//! Mounted under both `/api/notes` and `/notes`. Handlers only translate
//! HTTP input into [`NoteService`](crate::services::NoteService) calls; the
//! owning user comes from server state.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use notedoc_core::defaults::{PAGE_INDEX, PAGE_SIZE, PAGE_SIZE_MAX};
use notedoc_core::{
    CreateNoteRequest, NotePage, NoteResponse, PageRequest, Sort, SortDirection,
    UpdateNoteRequest,
};

use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListNotesQuery {
    /// Zero-based page index.
    #[param(example = 0)]
    pub page: Option<i64>,
    /// Page size, at least 1. Values above 2000 are clamped.
    #[param(example = 10)]
    pub size: Option<i64>,
    /// `field[,direction]`, e.g. `title,asc`. Defaults to `updatedAt,desc`.
    pub sort: Option<String>,
    /// Overrides the direction given in `sort` (`asc` or `desc`).
    pub direction: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchNotesQuery {
    /// Text to look for in title or content. Blank lists all notes.
    pub q: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Build a page request from raw query values.
///
/// Negative page or a size below one is rejected; an oversized page is
/// clamped to [`PAGE_SIZE_MAX`].
fn page_request(page: Option<i64>, size: Option<i64>) -> Result<PageRequest, ApiError> {
    let page = page.unwrap_or(i64::from(PAGE_INDEX));
    if page < 0 {
        return Err(ApiError::BadRequest(
            "Page index must not be less than zero".into(),
        ));
    }
    let page = u32::try_from(page)
        .map_err(|_| ApiError::BadRequest("Page index is too large".into()))?;

    let size = size.unwrap_or(i64::from(PAGE_SIZE));
    if size < 1 {
        return Err(ApiError::BadRequest(
            "Page size must not be less than one".into(),
        ));
    }
    let size = size.min(i64::from(PAGE_SIZE_MAX)) as u32;

    Ok(PageRequest::new(page, size)?)
}

fn sort_from(sort: Option<&str>, direction: Option<&str>) -> Result<Sort, ApiError> {
    let mut parsed = match sort {
        Some(raw) => Sort::parse(raw)?,
        None => Sort::default(),
    };
    if let Some(direction) = direction {
        parsed.direction = SortDirection::parse_lenient(direction);
    }
    Ok(parsed)
}

/// Create a note.
#[utoipa::path(post, path = "/api/notes", tag = "Notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = NoteResponse),
        (status = 400, description = "Missing or invalid title", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_note(
    State(state): State<AppState>,
    Json(body): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .notes
        .create_note(Some(body), Some(state.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// List active notes, paged and sorted.
#[utoipa::path(get, path = "/api/notes", tag = "Notes",
    params(ListNotesQuery),
    responses(
        (status = 200, description = "One page of notes", body = NotePage),
        (status = 400, description = "Bad paging or sort parameter", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<ListNotesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let sort = sort_from(query.sort.as_deref(), query.direction.as_deref())?;
    let request = page_request(query.page, query.size)?.with_sort(sort);
    let page = state
        .notes
        .get_all_notes(Some(state.user_id), request)
        .await?;
    Ok(Json(page))
}

/// Search notes by title or content, most recently updated first.
#[utoipa::path(get, path = "/api/notes/search", tag = "Notes",
    params(SearchNotesQuery),
    responses(
        (status = 200, description = "Matching notes", body = NotePage),
        (status = 400, description = "Bad paging parameter", body = crate::error::ErrorResponse),
    )
)]
pub async fn search_notes(
    State(state): State<AppState>,
    Query(query): Query<SearchNotesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request = page_request(query.page, query.size)?;
    let page = state
        .notes
        .search_notes(query.q.as_deref(), Some(state.user_id), request)
        .await?;
    Ok(Json(page))
}

/// Fetch one note.
#[utoipa::path(get, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "The note", body = NoteResponse),
        (status = 404, description = "No such active note", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .notes
        .get_note_by_id(Some(id), Some(state.user_id))
        .await?;
    Ok(Json(note))
}

/// Partially update a note. Absent fields keep their value.
#[utoipa::path(put, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note id")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Updated note", body = NoteResponse),
        (status = 400, description = "Blank or over-long title", body = crate::error::ErrorResponse),
        (status = 404, description = "No such active note", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .notes
        .update_note(Some(id), Some(body), Some(state.user_id))
        .await?;
    Ok(Json(note))
}

/// Soft-delete a note.
#[utoipa::path(delete, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 404, description = "No such active note", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .notes
        .delete_note(Some(id), Some(state.user_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notedoc_core::SortField;

    #[test]
    fn test_page_request_defaults() {
        let req = page_request(None, None).unwrap();
        assert_eq!(req.page, 0);
        assert_eq!(req.size, 10);
        assert_eq!(req.sort, Sort::default());
    }

    #[test]
    fn test_page_request_clamps_size() {
        let req = page_request(Some(2), Some(1_000_000)).unwrap();
        assert_eq!(req.page, 2);
        assert_eq!(req.size, PAGE_SIZE_MAX);
    }

    #[test]
    fn test_page_request_rejects_negative_page_and_small_size() {
        assert!(matches!(page_request(Some(-1), None), Err(ApiError::BadRequest(_))));
        assert!(matches!(page_request(None, Some(0)), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_sort_from_direction_overrides() {
        let sort = sort_from(Some("title,asc"), None).unwrap();
        assert_eq!(sort, Sort::new(SortField::Title, SortDirection::Asc));

        let sort = sort_from(Some("createdAt"), Some("ASC")).unwrap();
        assert_eq!(sort, Sort::new(SortField::CreatedAt, SortDirection::Asc));

        let sort = sort_from(None, Some("sideways")).unwrap();
        assert_eq!(sort, Sort::new(SortField::UpdatedAt, SortDirection::Desc));
    }

    #[test]
    fn test_sort_from_unknown_field_is_bad_request() {
        assert!(matches!(
            sort_from(Some("colour"), None),
            Err(ApiError::BadRequest(m)) if m.contains("colour")
        ));
    }
}
