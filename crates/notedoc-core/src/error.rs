//! Error types for notedoc.

use thiserror::Error;

/// Result type alias using notedoc's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for notedoc operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No active note with this id exists for the requesting user.
    ///
    /// Raised alike for ids that never existed and for soft-deleted notes.
    #[error("Note not found with id: {0}")]
    NoteNotFound(uuid::Uuid),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for an [`Error::InvalidInput`] with the given message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Stable machine-readable code for client-facing error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Database(_) => "DATABASE_ERROR",
            Error::NoteNotFound(_) => "NOTE_NOT_FOUND",
            Error::InvalidInput(_) => "INVALID_NOTE_DATA",
            Error::Config(_) => "CONFIGURATION_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_note_not_found() {
        let id = Uuid::nil();
        let err = Error::NoteNotFound(id);
        assert_eq!(err.to_string(), format!("Note not found with id: {}", id));
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::invalid("Title is required and cannot be empty");
        assert_eq!(
            err.to_string(),
            "Invalid input: Title is required and cannot be empty"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("PORT must be a number".to_string());
        assert_eq!(err.to_string(), "Configuration error: PORT must be a number");
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let codes = [
            Error::NoteNotFound(Uuid::nil()).code(),
            Error::invalid("x").code(),
            Error::Config("x".into()).code(),
            Error::Internal("x".into()).code(),
            Error::Database(sqlx::Error::RowNotFound).code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_from_sqlx_error() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::Database(_)));
        assert!(err.to_string().starts_with("Database error:"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
