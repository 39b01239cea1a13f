//! UUID v7 utilities for time-ordered note identifiers.
//!
//! UUIDv7 embeds a millisecond Unix timestamp in its first 48 bits, so note
//! ids sort in creation order and make a stable pagination tiebreaker.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// # Example
///
/// ```
/// use notedoc_core::uuid_utils::{is_v7, new_v7};
///
/// let id = new_v7();
/// assert!(is_v7(&id));
/// ```
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Check if a UUID is version 7.
#[inline]
pub fn is_v7(uuid: &Uuid) -> bool {
    uuid.get_version_num() == 7
}
