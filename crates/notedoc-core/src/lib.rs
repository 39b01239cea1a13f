//! # notedoc-core
//!
//! Core types, traits, and abstractions for the notedoc backend.
//!
//! This crate provides the note entity, the transfer shapes exchanged with
//! callers, pagination primitives, and the [`NoteRepository`] trait that the
//! storage crates implement.

pub mod defaults;
pub mod error;
pub mod models;
pub mod pagination;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use pagination::{NotePage, Page, PageRequest, Sort, SortDirection, SortField};
pub use traits::*;
pub use uuid_utils::{is_v7, new_v7};
