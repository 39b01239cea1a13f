//! HTTP handler modules for notedoc-api.

pub mod health;
pub mod notes;
