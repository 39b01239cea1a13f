//! Centralized default constants for notedoc.
//!
//! Crates reference these constants instead of defining their own magic
//! numbers.

use uuid::Uuid;

// =============================================================================
// NOTES
// =============================================================================

/// Maximum title length in characters, measured after trimming.
pub const TITLE_MAX_CHARS: usize = 255;

/// Owner used by the HTTP adapter until authentication exists.
pub const DEFAULT_USER_ID: Uuid = Uuid::from_u128(0x1111_1111_1111_1111_1111_1111_1111_1111);

// =============================================================================
// PAGINATION
// =============================================================================

/// Default zero-based page index.
pub const PAGE_INDEX: u32 = 0;

/// Default page size for list and search endpoints.
pub const PAGE_SIZE: u32 = 10;

/// Largest page size accepted from clients; larger values are clamped.
pub const PAGE_SIZE_MAX: u32 = 2000;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8080;

/// Default request body limit in bytes.
pub const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Origins allowed by CORS when `CORS_ALLOWED_ORIGINS` is unset.
pub const CORS_ALLOWED_ORIGINS: &str =
    "http://localhost:3000,http://localhost:5173,http://localhost:4200,https://notedoc-alpha.vercel.app";

/// Methods allowed by CORS when `CORS_ALLOWED_METHODS` is unset.
pub const CORS_ALLOWED_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS,PATCH,HEAD";

/// CORS preflight cache lifetime in seconds.
pub const CORS_MAX_AGE_SECS: u64 = 3600;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_id_literal() {
        assert_eq!(
            DEFAULT_USER_ID.to_string(),
            "11111111-1111-1111-1111-111111111111"
        );
    }

    #[test]
    fn test_page_defaults_within_bounds() {
        assert!(PAGE_SIZE >= 1);
        assert!(PAGE_SIZE <= PAGE_SIZE_MAX);
    }
}
