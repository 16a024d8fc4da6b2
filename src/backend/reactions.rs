//! Reaction Table Paths
//!
//! Filters use PostgREST `eq.` operators; values are percent-encoded since
//! glyphs are multi-byte.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

pub use crate::config::REACTIONS_TABLE as TABLE;

pub fn list_path() -> String {
    format!("{}?select=*", TABLE)
}

/// Filter matching every reaction with `emoji` on `note_id`, whoever left it
pub fn delete_reactions_path(note_id: &str, emoji: &str) -> String {
    format!(
        "{}?comment_id=eq.{}&emoji=eq.{}",
        TABLE,
        utf8_percent_encode(note_id, NON_ALPHANUMERIC),
        utf8_percent_encode(emoji, NON_ALPHANUMERIC)
    )
}
