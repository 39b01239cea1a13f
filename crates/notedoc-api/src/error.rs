//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

/// JSON body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `NOTE_NOT_FOUND`.
    #[schema(example = "NOTE_NOT_FOUND")]
    pub code: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Errors surfaced by handlers.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(notedoc_core::Error),
}

impl From<notedoc_core::Error> for ApiError {
    fn from(err: notedoc_core::Error) -> Self {
        match err {
            notedoc_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            notedoc_core::Error::NoteNotFound(_) => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            ApiError::BadRequest(msg) => ("INVALID_NOTE_DATA", msg),
            ApiError::NotFound(msg) => ("NOTE_NOT_FOUND", msg),
            ApiError::Internal(err) => {
                error!(
                    subsystem = "api",
                    code = err.code(),
                    error = %err,
                    "Request failed"
                );
                (err.code(), "An unexpected error occurred".to_string())
            }
        };

        let body = Json(ErrorResponse {
            code: code.to_string(),
            message,
            timestamp: Utc::now(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let err = ApiError::from(notedoc_core::Error::invalid("Title cannot be empty"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Title cannot be empty"));
    }

    #[test]
    fn test_not_found_keeps_id_in_message() {
        let id = Uuid::nil();
        let err = ApiError::from(notedoc_core::Error::NoteNotFound(id));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(matches!(err, ApiError::NotFound(ref m) if m.contains(&id.to_string())));
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err = ApiError::from(notedoc_core::Error::Internal("boom".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
